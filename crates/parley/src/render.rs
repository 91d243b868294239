// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering of timeline messages.

use std::collections::HashMap;

use colored::Colorize;
use parley_core::{Message, MessageId, Origin, Status};

/// Status glyph shown after local messages.
pub fn status_glyph(status: Status) -> &'static str {
    match status {
        Status::Pending => "…",
        Status::Sent => "✓",
        Status::Delivered => "✓✓",
        Status::Seen => "✓✓ seen",
    }
}

/// One line for a message: `[msg-3 12:04] me: hello ✓✓`.
pub fn render_line(message: &Message, local_name: &str, remote_name: &str) -> String {
    let stamp = message.created_at.format("%H:%M");
    let header = format!("[{} {stamp}]", message.id).dimmed();
    match message.origin {
        Origin::Local => format!(
            "{header} {}: {} {}",
            local_name.green(),
            message.body.preview(),
            status_glyph(message.status).cyan()
        ),
        Origin::Remote => format!(
            "{header} {}: {}",
            remote_name.yellow(),
            message.body.preview()
        ),
    }
}

/// Tracks the last rendered status of every message so only changes are
/// printed when a new snapshot arrives.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    seen: HashMap<MessageId, Status>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages that are new or whose status moved since the last call.
    pub fn changed<'a>(&mut self, snapshot: &'a [Message]) -> Vec<&'a Message> {
        snapshot
            .iter()
            .filter(|m| self.seen.insert(m.id, m.status) != Some(m.status))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use parley_core::MessageBody;

    use super::*;

    #[test]
    fn tracker_reports_only_changes() {
        let mut tracker = ChangeTracker::new();
        let mut snapshot = vec![Message::outgoing(MessageId(1), MessageBody::text("hi"))];
        assert_eq!(tracker.changed(&snapshot).len(), 1);
        assert!(tracker.changed(&snapshot).is_empty());

        snapshot[0].status = Status::Delivered;
        snapshot.push(Message::incoming(MessageId(2), MessageBody::text("hello")));
        let ids: Vec<_> = tracker.changed(&snapshot).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![MessageId(1), MessageId(2)]);
    }

    #[test]
    fn local_lines_carry_status() {
        colored::control::set_override(false);
        let msg = Message::outgoing(MessageId(4), MessageBody::text("price?"));
        let line = render_line(&msg, "me", "seller");
        assert!(line.contains("msg-4"));
        assert!(line.contains("me: price? …"));

        let reply = Message::incoming(MessageId(5), MessageBody::text("10 each"));
        let line = render_line(&reply, "me", "seller");
        assert!(line.ends_with("seller: 10 each"));
    }
}
