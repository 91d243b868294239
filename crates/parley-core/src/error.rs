// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parley chat engine.
//!
//! Every variant here is local and recoverable: callers surface a message to
//! the user and allow a retry. None of them is fatal to a chat session.

use thiserror::Error;

use crate::types::{MessageId, Status};

/// Errors raised by the message timeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    /// A message with this id is already in the timeline.
    #[error("duplicate message id {0}")]
    DuplicateId(MessageId),

    /// No message with this id exists.
    #[error("message {0} not found")]
    NotFound(MessageId),

    /// The requested status precedes the message's current status.
    #[error("invalid status transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: MessageId,
        from: Status,
        to: Status,
    },

    /// The timeline was closed by session teardown.
    #[error("timeline is closed")]
    Closed,
}

/// Errors raised by the attachment pipeline.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// The declared content type is not an image.
    #[error("unsupported attachment type `{content_type}`")]
    UnsupportedType { content_type: String },

    /// The per-session attachment cap has been reached.
    #[error("attachment limit of {limit} reached")]
    LimitExceeded { limit: usize },

    /// Reading or encoding the attachment failed.
    #[error("attachment conversion failed: {message}")]
    ConversionFailure {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AttachmentError {
    /// Builds a [`AttachmentError::ConversionFailure`] without an underlying source.
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::ConversionFailure {
            message: message.into(),
            source: None,
        }
    }
}

/// The primary error type returned by chat session operations.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// The timeline rejected a mutation.
    #[error("timeline error: {0}")]
    Timeline(#[from] TimelineError),

    /// The attachment pipeline rejected a file.
    #[error("attachment error: {0}")]
    Attachment(#[from] AttachmentError),

    /// The session has been torn down.
    #[error("chat session is closed")]
    SessionClosed,

    /// Configuration errors (invalid TOML, failed validation).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
