// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end session testing.
//!
//! `TestHarness` assembles a [`ChatSession`] with a scripted counterpart and
//! a recording anchor, and offers helpers to let the delivery simulator run
//! its course. Pair it with `#[tokio::test(start_paused = true)]` so delays
//! elapse in virtual time.

use std::sync::Arc;
use std::time::Duration;

use parley_config::ParleyConfig;
use parley_core::{MessageId, ParleyError, Status};
use parley_session::ChatSession;
use tracing::debug;

use crate::recording_anchor::RecordingAnchor;
use crate::scripted_counterpart::ScriptedCounterpart;

/// Builder for creating test sessions with configurable options.
pub struct TestHarnessBuilder {
    config: ParleyConfig,
    replies: Vec<String>,
    silent: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: ParleyConfig::default(),
            replies: Vec::new(),
            silent: false,
        }
    }

    /// Start from a full configuration instead of the defaults.
    pub fn with_config(mut self, config: ParleyConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the counterpart's scripted replies.
    pub fn with_replies(mut self, replies: Vec<String>) -> Self {
        self.replies = replies;
        self
    }

    /// Make the counterpart never answer.
    pub fn with_silent_counterpart(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Override the delivery and reply delays.
    pub fn with_delays(mut self, delivery_ms: u64, reply_ms: u64) -> Self {
        self.config.delivery.delivery_delay_ms = delivery_ms;
        self.config.delivery.reply_delay_ms = reply_ms;
        self
    }

    /// Override the per-session attachment cap.
    pub fn with_max_attachments(mut self, max: usize) -> Self {
        self.config.attachment.max_attachments = max;
        self
    }

    /// Build the harness. Must run inside a Tokio runtime.
    pub fn build(self) -> Result<TestHarness, ParleyError> {
        let counterpart = Arc::new(if self.silent {
            ScriptedCounterpart::silent()
        } else {
            ScriptedCounterpart::with_replies(self.replies)
        });
        let anchor = Arc::new(RecordingAnchor::new());

        let session = ChatSession::builder(self.config.clone())
            .session_id("test-session")
            .counterpart(counterpart.clone())
            .anchor(anchor.clone())
            .build()?;
        debug!(
            silent = self.silent,
            delivery_delay_ms = self.config.delivery.delivery_delay_ms,
            reply_delay_ms = self.config.delivery.reply_delay_ms,
            "test harness ready"
        );

        Ok(TestHarness {
            session,
            counterpart,
            anchor,
            config: self.config,
        })
    }
}

/// A chat session wired to deterministic test doubles.
pub struct TestHarness {
    /// The session under test.
    pub session: ChatSession,
    /// The scripted counterpart answering text messages.
    pub counterpart: Arc<ScriptedCounterpart>,
    /// The anchor the view synchronizer scrolls.
    pub anchor: Arc<RecordingAnchor>,
    /// Configuration the session was built from.
    pub config: ParleyConfig,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Advances time by `ms` milliseconds.
    pub async fn advance(&self, ms: u64) {
        debug!(ms, "advancing test clock");
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Advances time past the delivery step only.
    pub async fn await_delivery(&self) {
        self.advance(self.config.delivery.delivery_delay_ms + 1).await;
    }

    /// Advances time until every chain started so far has finished.
    pub async fn settle(&self) {
        let delivery = &self.config.delivery;
        self.advance(delivery.delivery_delay_ms + delivery.reply_delay_ms + 1)
            .await;
    }

    /// `(id, status)` for every message, in timeline order.
    pub fn statuses(&self) -> Vec<(MessageId, Status)> {
        self.session
            .snapshot()
            .into_iter()
            .map(|m| (m.id, m.status))
            .collect()
    }

    /// Text bodies in timeline order; image messages are skipped.
    pub fn texts(&self) -> Vec<String> {
        self.session
            .snapshot()
            .iter()
            .filter_map(|m| m.body.as_text().map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn harness_runs_a_full_exchange() {
        let harness = TestHarness::builder()
            .with_replies(vec!["Yes, plenty left".into()])
            .with_delays(10, 20)
            .build()
            .unwrap();

        let id = harness.session.send_text("Any left?").unwrap().unwrap();
        harness.settle().await;

        assert_eq!(harness.texts(), vec!["Any left?", "Yes, plenty left"]);
        assert_eq!(harness.statuses()[0], (id, Status::Delivered));
        assert_eq!(harness.counterpart.prompts().await[0].id, id);
        assert_eq!(harness.anchor.current(), Some(harness.session.snapshot()[1].id));
    }
}
