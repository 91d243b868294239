// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parley chat engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Parley configuration.
///
/// Every section is optional. The defaults give a 1s delivery
/// acknowledgment, a 2s reply delay, four canned replies and at most four
/// attachments per session.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// Session identity and logging.
    #[serde(default)]
    pub session: SessionConfig,

    /// Delivery simulator timing.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Canned counterpart replies.
    #[serde(default)]
    pub counterpart: CounterpartConfig,

    /// Attachment pipeline limits.
    #[serde(default)]
    pub attachment: AttachmentConfig,
}

/// Session identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Display name of the local participant.
    #[serde(default = "default_session_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: default_session_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_session_name() -> String {
    "me".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Delivery simulator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Delay before a pending message is marked delivered, in milliseconds.
    #[serde(default = "default_delivery_delay_ms")]
    pub delivery_delay_ms: u64,

    /// Delay between delivery and the counterpart reply, in milliseconds.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,

    /// Whether delivered text messages trigger a counterpart reply.
    #[serde(default = "default_true")]
    pub replies_enabled: bool,

    /// Advance the local message to `seen` once the reply arrives.
    #[serde(default)]
    pub mark_seen_on_reply: bool,
}

impl DeliveryConfig {
    pub fn delivery_delay(&self) -> Duration {
        Duration::from_millis(self.delivery_delay_ms)
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            delivery_delay_ms: default_delivery_delay_ms(),
            reply_delay_ms: default_reply_delay_ms(),
            replies_enabled: true,
            mark_seen_on_reply: false,
        }
    }
}

fn default_delivery_delay_ms() -> u64 {
    1_000
}

fn default_reply_delay_ms() -> u64 {
    2_000
}

fn default_true() -> bool {
    true
}

/// Counterpart configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CounterpartConfig {
    /// Display name of the remote participant.
    #[serde(default = "default_counterpart_name")]
    pub name: String,

    /// Candidate replies, one of which is picked uniformly at random.
    #[serde(default = "default_replies")]
    pub replies: Vec<String>,
}

impl Default for CounterpartConfig {
    fn default() -> Self {
        Self {
            name: default_counterpart_name(),
            replies: default_replies(),
        }
    }
}

fn default_counterpart_name() -> String {
    "seller".to_string()
}

fn default_replies() -> Vec<String> {
    vec![
        "Sounds good! I'll have them ready for you.".to_string(),
        "Great! Don't forget to bring cash.".to_string(),
        "Perfect timing! The tomatoes are at their peak freshness.".to_string(),
        "I'll be waiting. Text me when you're nearby!".to_string(),
    ]
}

/// Attachment pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentConfig {
    /// Maximum number of accepted attachments per session.
    #[serde(default = "default_max_attachments")]
    pub max_attachments: usize,

    /// Maximum raw size of one attachment in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            max_attachments: default_max_attachments(),
            max_bytes: default_max_bytes(),
        }
    }
}

fn default_max_attachments() -> usize {
    4
}

fn default_max_bytes() -> u64 {
    10 * 1024 * 1024
}
