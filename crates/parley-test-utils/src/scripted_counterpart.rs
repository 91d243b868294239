// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Counterpart with pre-configured replies for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use parley_core::{Counterpart, Message, MessageBody};

/// A counterpart that answers from a FIFO queue.
///
/// Each reply is popped in order. When the queue is empty the counterpart
/// answers with "mock reply". Every message it was asked to answer is
/// recorded for assertions.
pub struct ScriptedCounterpart {
    replies: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<Message>>>,
    silent: bool,
}

impl ScriptedCounterpart {
    /// Create a counterpart with an empty reply queue.
    pub fn new() -> Self {
        Self::with_replies(Vec::new())
    }

    /// Create a counterpart pre-loaded with the given replies.
    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            prompts: Arc::new(Mutex::new(Vec::new())),
            silent: false,
        }
    }

    /// Create a counterpart that never answers.
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::new()
        }
    }

    /// Add a reply to the end of the queue.
    pub async fn add_reply(&self, text: impl Into<String>) {
        self.replies.lock().await.push_back(text.into());
    }

    /// Messages this counterpart was asked to answer, in order.
    pub async fn prompts(&self) -> Vec<Message> {
        self.prompts.lock().await.clone()
    }

    async fn next_reply(&self) -> String {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock reply".to_string())
    }
}

impl Default for ScriptedCounterpart {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Counterpart for ScriptedCounterpart {
    fn name(&self) -> &str {
        "scripted-counterpart"
    }

    async fn reply_to(&self, message: &Message) -> Option<MessageBody> {
        self.prompts.lock().await.push(message.clone());
        if self.silent {
            return None;
        }
        Some(MessageBody::text(self.next_reply().await))
    }
}

#[cfg(test)]
mod tests {
    use parley_core::MessageId;

    use super::*;

    fn prompt(text: &str) -> Message {
        Message::outgoing(MessageId(1), MessageBody::text(text))
    }

    #[tokio::test]
    async fn pops_replies_in_order_then_defaults() {
        let counterpart = ScriptedCounterpart::with_replies(vec!["first".into()]);
        counterpart.add_reply("second").await;

        let texts: Vec<_> = [
            counterpart.reply_to(&prompt("a")).await,
            counterpart.reply_to(&prompt("b")).await,
            counterpart.reply_to(&prompt("c")).await,
        ]
        .into_iter()
        .map(|b| b.and_then(|b| b.as_text().map(str::to_string)))
        .collect();
        assert_eq!(
            texts,
            vec![
                Some("first".to_string()),
                Some("second".to_string()),
                Some("mock reply".to_string())
            ]
        );
        assert_eq!(counterpart.prompts().await.len(), 3);
    }

    #[tokio::test]
    async fn silent_counterpart_records_but_never_answers() {
        let counterpart = ScriptedCounterpart::silent();
        assert!(counterpart.reply_to(&prompt("hello?")).await.is_none());
        let prompts = counterpart.prompts().await;
        assert_eq!(prompts[0].body.as_text(), Some("hello?"));
    }
}
