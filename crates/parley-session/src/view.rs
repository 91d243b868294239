// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keeps the newest message in view.
//!
//! After every timeline mutation the synchronizer asks the rendering layer's
//! [`ScrollAnchor`] to reveal the last message of the snapshot, whatever the
//! mutation was.

use std::sync::Arc;

use parley_core::ScrollAnchor;
use parley_timeline::{SharedTimeline, SubscriptionId};
use tracing::trace;

/// Timeline listener that scrolls the anchor to the bottom.
#[derive(Debug)]
pub struct ViewSynchronizer {
    subscription: SubscriptionId,
}

impl ViewSynchronizer {
    /// Subscribes to `timeline` and reveals the last message after each change.
    pub fn attach(timeline: &SharedTimeline, anchor: Arc<dyn ScrollAnchor>) -> Self {
        let subscription = timeline.subscribe(Box::new(move |change, messages| {
            if let Some(last) = messages.last() {
                trace!(change = ?change, message_id = %last.id, "scroll to bottom");
                anchor.reveal(last.id);
            }
        }));
        Self { subscription }
    }

    /// Stops following the timeline.
    pub fn detach(&self, timeline: &SharedTimeline) -> bool {
        timeline.unsubscribe(self.subscription)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use parley_core::{Message, MessageBody, MessageId, Status};

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<MessageId>>);

    impl ScrollAnchor for Recorder {
        fn reveal(&self, id: MessageId) {
            self.0.lock().unwrap().push(id);
        }
    }

    #[test]
    fn reveals_last_message_after_every_change() {
        let timeline = SharedTimeline::new();
        let anchor = Arc::new(Recorder::default());
        let _view = ViewSynchronizer::attach(&timeline, anchor.clone());

        timeline
            .append(Message::outgoing(MessageId(1), MessageBody::text("a")))
            .unwrap();
        timeline
            .append(Message::outgoing(MessageId(2), MessageBody::text("b")))
            .unwrap();
        // A status change on an older message still scrolls to the newest.
        timeline.update_status(MessageId(1), Status::Delivered).unwrap();

        assert_eq!(
            *anchor.0.lock().unwrap(),
            vec![MessageId(1), MessageId(2), MessageId(2)]
        );
    }

    #[test]
    fn detach_stops_scrolling() {
        let timeline = SharedTimeline::new();
        let anchor = Arc::new(Recorder::default());
        let view = ViewSynchronizer::attach(&timeline, anchor.clone());

        assert!(view.detach(&timeline));
        timeline
            .append(Message::outgoing(MessageId(1), MessageBody::text("a")))
            .unwrap();
        assert!(anchor.0.lock().unwrap().is_empty());
        assert!(!view.detach(&timeline));
    }
}
