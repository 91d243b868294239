// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Counterpart trait for the remote side of a conversation.

use async_trait::async_trait;

use crate::types::{Message, MessageBody};

/// The remote peer of a chat session.
///
/// The delivery simulator asks the counterpart for a reply once a local text
/// message has been delivered. Returning `None` means the peer stays silent.
#[async_trait]
pub trait Counterpart: Send + Sync + 'static {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Produces the reply body for a delivered local message, if any.
    async fn reply_to(&self, message: &Message) -> Option<MessageBody>;
}
