// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley chat engine.
//!
//! This crate provides the message data model, the error taxonomy and the
//! seam traits used throughout the Parley workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{AttachmentError, ParleyError, TimelineError};
pub use traits::{Counterpart, NullAnchor, ScrollAnchor};
pub use types::{
    IdGenerator, ImagePayload, Message, MessageBody, MessageId, Origin, SessionId, Status,
};
