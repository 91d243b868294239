// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message timeline for the Parley chat engine.
//!
//! [`Timeline`] is the authoritative, append-only log of a session's
//! messages. [`SharedTimeline`] wraps it behind a single writer lock so the
//! delivery simulator, the attachment path and the session facade can all
//! hold a handle.

pub mod shared;
pub mod timeline;

pub use shared::SharedTimeline;
pub use timeline::{Listener, SubscriptionId, Timeline, TimelineChange};
