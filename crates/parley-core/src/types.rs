// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the timeline, delivery simulator and session.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session-local message identifier.
///
/// Ids are handed out by [`IdGenerator`] in strictly increasing order, so
/// comparing two ids compares their creation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = std::num::ParseIntError;

    /// Accepts both the display form (`msg-7`) and a bare number (`7`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix("msg-").unwrap_or(s);
        digits.parse().map(MessageId)
    }
}

/// Strictly monotonic id source scoped to one session.
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Creates a generator whose first id is `msg-1`.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns the next id. Never repeats, even under concurrent callers.
    pub fn next_id(&self) -> MessageId {
        MessageId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Who authored a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Written on this device.
    Local,
    /// Written by the remote counterpart.
    Remote,
}

/// Delivery state of a message.
///
/// Variants are declared in lifecycle order; the derived `Ord` is the
/// forward ordering `Pending < Sent < Delivered < Seen`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Sent,
    Delivered,
    Seen,
}

impl Status {
    /// Returns true if moving from `self` to `next` does not go backwards.
    pub fn can_advance_to(self, next: Status) -> bool {
        next >= self
    }
}

/// An image converted to an inline, renderable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Declared MIME type, e.g. `image/png`.
    pub content_type: String,
    /// Original file name, kept for display.
    pub file_name: String,
    /// Size of the raw (pre-encoding) content.
    pub size_bytes: u64,
    /// `data:<content_type>;base64,<payload>`.
    pub data_uri: String,
}

/// Content of a message. Exactly one kind is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MessageBody {
    Text(String),
    Image(ImagePayload),
}

impl MessageBody {
    /// Convenience constructor for text bodies.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Returns the text content, if this is a text body.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageBody::Text(t) => Some(t),
            MessageBody::Image(_) => None,
        }
    }

    /// Returns the image payload, if this is an image body.
    pub fn as_image(&self) -> Option<&ImagePayload> {
        match self {
            MessageBody::Image(img) => Some(img),
            MessageBody::Text(_) => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, MessageBody::Image(_))
    }

    /// Short human-readable summary used in logs and the shell.
    pub fn preview(&self) -> String {
        match self {
            MessageBody::Text(t) => t.clone(),
            MessageBody::Image(img) => {
                format!("[image {} ({} bytes)]", img.file_name, img.size_bytes)
            }
        }
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub body: MessageBody,
    pub origin: Origin,
    pub created_at: DateTime<Utc>,
    pub status: Status,
}

impl Message {
    /// Creates a message stamped with the current time.
    pub fn new(id: MessageId, origin: Origin, body: MessageBody, status: Status) -> Self {
        Self::at(id, origin, body, status, Utc::now())
    }

    /// Creates a message with an explicit creation time (history import).
    pub fn at(
        id: MessageId,
        origin: Origin,
        body: MessageBody,
        status: Status,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            body,
            origin,
            created_at,
            status,
        }
    }

    /// A freshly authored local message, waiting for delivery.
    pub fn outgoing(id: MessageId, body: MessageBody) -> Self {
        Self::new(id, Origin::Local, body, Status::Pending)
    }

    /// A message received from the counterpart.
    pub fn incoming(id: MessageId, body: MessageBody) -> Self {
        Self::new(id, Origin::Remote, body, Status::Delivered)
    }

    pub fn is_local(&self) -> bool {
        self.origin == Origin::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ordering_follows_lifecycle() {
        assert!(Status::Pending < Status::Sent);
        assert!(Status::Sent < Status::Delivered);
        assert!(Status::Delivered < Status::Seen);
        assert!(Status::Pending.can_advance_to(Status::Delivered));
        assert!(Status::Delivered.can_advance_to(Status::Delivered));
        assert!(!Status::Seen.can_advance_to(Status::Delivered));
    }

    #[test]
    fn status_display_and_parse() {
        assert_eq!(Status::Delivered.to_string(), "delivered");
        assert_eq!("seen".parse::<Status>().unwrap(), Status::Seen);
        assert_eq!(Origin::Remote.to_string(), "remote");
    }

    #[test]
    fn message_id_parses_both_forms() {
        assert_eq!("msg-12".parse::<MessageId>().unwrap(), MessageId(12));
        assert_eq!(" 3 ".parse::<MessageId>().unwrap(), MessageId(3));
        assert!("msg-x".parse::<MessageId>().is_err());
        assert_eq!(MessageId(4).to_string(), "msg-4");
    }

    #[test]
    fn id_generator_is_strictly_monotonic() {
        let ids = IdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();
        assert_eq!(a, MessageId(1));
        assert!(a < b && b < c);
    }

    #[test]
    fn outgoing_and_incoming_defaults() {
        let out = Message::outgoing(MessageId(1), MessageBody::text("hi"));
        assert_eq!(out.origin, Origin::Local);
        assert_eq!(out.status, Status::Pending);

        let inc = Message::incoming(MessageId(2), MessageBody::text("hello"));
        assert_eq!(inc.origin, Origin::Remote);
        assert_eq!(inc.status, Status::Delivered);
    }

    #[test]
    fn body_serializes_with_kind_tag() {
        let body = MessageBody::text("ping");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["value"], "ping");
        assert_eq!(body.as_text(), Some("ping"));
        assert!(body.as_image().is_none());
    }
}
