// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat session for the Parley engine.
//!
//! [`ChatSession`] is the surface a rendering layer talks to: it sends text
//! and images, exposes the ordered timeline snapshot to subscribers, and
//! tears everything down at the end of the conversation. The
//! [`ViewSynchronizer`] keeps the newest message scrolled into view.

pub mod session;
pub mod view;

pub use session::{ChatSession, ChatSessionBuilder, HistoryEntry, SessionState};
pub use view::ViewSynchronizer;
