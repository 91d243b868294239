// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ordered, append-only message log.
//!
//! Messages are never removed or reordered once inserted; the only in-place
//! mutation is a forward status transition. Every mutation is announced to
//! the registered listeners together with the full ordered snapshot.

use std::collections::HashMap;

use parley_core::{Message, MessageId, Status, TimelineError};
use tracing::debug;

/// Callback invoked after every timeline mutation.
pub type Listener = Box<dyn Fn(&TimelineChange, &[Message]) + Send + Sync>;

/// Handle returned by [`Timeline::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Describes a single timeline mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineChange {
    /// A message was added at the end.
    Appended { id: MessageId },
    /// A message moved forward in its lifecycle.
    StatusChanged {
        id: MessageId,
        from: Status,
        to: Status,
    },
}

impl TimelineChange {
    /// The message this change refers to.
    pub fn id(&self) -> MessageId {
        match self {
            TimelineChange::Appended { id } | TimelineChange::StatusChanged { id, .. } => *id,
        }
    }
}

/// Ordered, append-only log of chat messages.
#[derive(Default)]
pub struct Timeline {
    messages: Vec<Message>,
    /// Position of each message in `messages`.
    index: HashMap<MessageId, usize>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    closed: bool,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a message at the end of the timeline.
    pub fn append(&mut self, message: Message) -> Result<(), TimelineError> {
        self.ensure_open()?;
        if self.index.contains_key(&message.id) {
            return Err(TimelineError::DuplicateId(message.id));
        }

        let id = message.id;
        debug!(
            message_id = %id,
            origin = %message.origin,
            status = %message.status,
            "timeline append"
        );
        self.index.insert(id, self.messages.len());
        self.messages.push(message);
        self.notify(TimelineChange::Appended { id });
        Ok(())
    }

    /// Moves a message forward to `new_status`.
    ///
    /// Returns the previous status. Re-applying the current status succeeds
    /// without notifying listeners.
    pub fn update_status(
        &mut self,
        id: MessageId,
        new_status: Status,
    ) -> Result<Status, TimelineError> {
        self.ensure_open()?;
        let pos = *self.index.get(&id).ok_or(TimelineError::NotFound(id))?;
        let message = &mut self.messages[pos];
        let from = message.status;

        if !from.can_advance_to(new_status) {
            return Err(TimelineError::InvalidTransition {
                id,
                from,
                to: new_status,
            });
        }
        if from == new_status {
            return Ok(from);
        }

        message.status = new_status;
        debug!(message_id = %id, %from, to = %new_status, "timeline status change");
        self.notify(TimelineChange::StatusChanged {
            id,
            from,
            to: new_status,
        });
        Ok(from)
    }

    /// Returns an ordered copy of every message.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.index.get(&id).map(|&pos| &self.messages[pos])
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Registers a listener called after every mutation.
    ///
    /// Listeners run synchronously, in registration order, while the owning
    /// lock is held. They must not call back into the timeline.
    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Rejects every later mutation with [`TimelineError::Closed`].
    ///
    /// Reads keep working so a renderer can show the final state.
    pub fn close(&mut self) {
        if !self.closed {
            debug!(messages = self.messages.len(), "timeline closed");
        }
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), TimelineError> {
        if self.closed {
            Err(TimelineError::Closed)
        } else {
            Ok(())
        }
    }

    fn notify(&self, change: TimelineChange) {
        for (_, listener) in &self.listeners {
            listener(&change, &self.messages);
        }
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("messages", &self.messages)
            .field("listeners", &self.listeners.len())
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use parley_core::{MessageBody, Origin};

    use super::*;

    fn text(id: u64, body: &str) -> Message {
        Message::outgoing(MessageId(id), MessageBody::text(body))
    }

    fn recorder(timeline: &mut Timeline) -> Arc<Mutex<Vec<(TimelineChange, usize)>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        timeline.subscribe(Box::new(move |change, snapshot| {
            sink.lock().unwrap().push((*change, snapshot.len()));
        }));
        seen
    }

    #[test]
    fn append_preserves_insertion_order() {
        let mut timeline = Timeline::new();
        timeline.append(text(1, "a")).unwrap();
        timeline.append(text(2, "b")).unwrap();
        timeline.append(text(3, "c")).unwrap();

        let ids: Vec<_> = timeline.snapshot().iter().map(|m| m.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(timeline.last().unwrap().id, MessageId(3));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut timeline = Timeline::new();
        timeline.append(text(1, "a")).unwrap();
        let err = timeline.append(text(1, "again")).unwrap_err();
        assert_eq!(err, TimelineError::DuplicateId(MessageId(1)));
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.get(MessageId(1)).unwrap().body.as_text(), Some("a"));
    }

    #[test]
    fn update_status_moves_forward() {
        let mut timeline = Timeline::new();
        timeline.append(text(1, "a")).unwrap();

        let prev = timeline.update_status(MessageId(1), Status::Delivered).unwrap();
        assert_eq!(prev, Status::Pending);
        assert_eq!(timeline.get(MessageId(1)).unwrap().status, Status::Delivered);
    }

    #[test]
    fn update_status_rejects_regression() {
        let mut timeline = Timeline::new();
        timeline.append(text(1, "a")).unwrap();
        timeline.update_status(MessageId(1), Status::Seen).unwrap();

        let err = timeline
            .update_status(MessageId(1), Status::Delivered)
            .unwrap_err();
        assert_eq!(
            err,
            TimelineError::InvalidTransition {
                id: MessageId(1),
                from: Status::Seen,
                to: Status::Delivered,
            }
        );
        assert_eq!(timeline.get(MessageId(1)).unwrap().status, Status::Seen);
    }

    #[test]
    fn update_status_unknown_id() {
        let mut timeline = Timeline::new();
        let err = timeline.update_status(MessageId(42), Status::Sent).unwrap_err();
        assert_eq!(err, TimelineError::NotFound(MessageId(42)));
    }

    #[test]
    fn listeners_see_every_mutation() {
        let mut timeline = Timeline::new();
        let seen = recorder(&mut timeline);

        timeline.append(text(1, "a")).unwrap();
        timeline.update_status(MessageId(1), Status::Delivered).unwrap();
        timeline
            .append(Message::incoming(MessageId(2), MessageBody::text("b")))
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (TimelineChange::Appended { id: MessageId(1) }, 1),
                (
                    TimelineChange::StatusChanged {
                        id: MessageId(1),
                        from: Status::Pending,
                        to: Status::Delivered,
                    },
                    1
                ),
                (TimelineChange::Appended { id: MessageId(2) }, 2),
            ]
        );
    }

    #[test]
    fn same_status_is_silent_noop() {
        let mut timeline = Timeline::new();
        timeline
            .append(Message::incoming(MessageId(1), MessageBody::text("hi")))
            .unwrap();
        let seen = recorder(&mut timeline);

        let prev = timeline.update_status(MessageId(1), Status::Delivered).unwrap();
        assert_eq!(prev, Status::Delivered);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn rejected_mutations_do_not_notify() {
        let mut timeline = Timeline::new();
        timeline.append(text(1, "a")).unwrap();
        let seen = recorder(&mut timeline);

        let _ = timeline.append(text(1, "dup"));
        let _ = timeline.update_status(MessageId(9), Status::Seen);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut timeline = Timeline::new();
        let count = Arc::new(Mutex::new(0));
        let sink = count.clone();
        let sub = timeline.subscribe(Box::new(move |_, _| *sink.lock().unwrap() += 1));

        timeline.append(text(1, "a")).unwrap();
        assert!(timeline.unsubscribe(sub));
        assert!(!timeline.unsubscribe(sub));
        timeline.append(text(2, "b")).unwrap();

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn closed_timeline_rejects_mutation_but_allows_reads() {
        let mut timeline = Timeline::new();
        timeline.append(text(1, "a")).unwrap();
        timeline.close();

        assert_eq!(timeline.append(text(2, "b")), Err(TimelineError::Closed));
        assert_eq!(
            timeline.update_status(MessageId(1), Status::Delivered),
            Err(TimelineError::Closed)
        );
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.snapshot()[0].status, Status::Pending);
        assert_eq!(timeline.snapshot()[0].origin, Origin::Local);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        fn status_strategy() -> impl Strategy<Value = Status> {
            prop_oneof![
                Just(Status::Pending),
                Just(Status::Sent),
                Just(Status::Delivered),
                Just(Status::Seen),
            ]
        }

        proptest! {
            /// Whatever sequence of updates is attempted, each message's
            /// observed status never goes backwards and order never changes.
            #[test]
            fn status_is_monotonic_and_order_stable(
                count in 1u64..8,
                updates in proptest::collection::vec((0u64..8, status_strategy()), 0..40),
            ) {
                let mut timeline = Timeline::new();
                let observed: Arc<Mutex<HashMap<MessageId, Vec<Status>>>> = Arc::default();
                let sink = observed.clone();
                timeline.subscribe(Box::new(move |change, snapshot| {
                    let id = change.id();
                    if let Some(m) = snapshot.iter().find(|m| m.id == id) {
                        sink.lock().unwrap().entry(id).or_default().push(m.status);
                    }
                }));

                for id in 1..=count {
                    timeline.append(text(id, "x")).unwrap();
                }
                for (id, status) in updates {
                    let _ = timeline.update_status(MessageId(id), status);
                }

                let ids: Vec<u64> = timeline.snapshot().iter().map(|m| m.id.0).collect();
                let expected: Vec<u64> = (1..=count).collect();
                prop_assert_eq!(ids, expected);

                for history in observed.lock().unwrap().values() {
                    prop_assert!(history.windows(2).all(|w| w[0] <= w[1]));
                }
            }
        }
    }
}
