// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread-safe handle to a [`Timeline`] guarded by a single writer lock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use parley_core::{Message, MessageId, Status, TimelineError};

use crate::timeline::{Listener, SubscriptionId, Timeline};

/// Cloneable handle to a session's timeline.
///
/// `append` and `update_status` are mutually exclusive through one mutex.
#[derive(Debug, Clone, Default)]
pub struct SharedTimeline {
    inner: Arc<Mutex<Timeline>>,
}

impl SharedTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, message: Message) -> Result<(), TimelineError> {
        self.lock().append(message)
    }

    /// Builds and appends a message under one lock acquisition.
    ///
    /// Ids allocated inside `build` therefore land in the log in allocation
    /// order even when several threads append at once.
    pub fn append_with(
        &self,
        build: impl FnOnce() -> Message,
    ) -> Result<MessageId, TimelineError> {
        let mut timeline = self.lock();
        if timeline.is_closed() {
            return Err(TimelineError::Closed);
        }
        let message = build();
        let id = message.id;
        timeline.append(message)?;
        Ok(id)
    }

    pub fn update_status(&self, id: MessageId, status: Status) -> Result<Status, TimelineError> {
        self.lock().update_status(id, status)
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().snapshot()
    }

    pub fn get(&self, id: MessageId) -> Option<Message> {
        self.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn subscribe(&self, listener: Listener) -> SubscriptionId {
        self.lock().subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().unsubscribe(id)
    }

    pub fn close(&self) {
        self.lock().close();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().is_closed()
    }

    // A panicking listener poisons the mutex; the log itself stays
    // consistent because notification happens after the mutation completes.
    fn lock(&self) -> MutexGuard<'_, Timeline> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use parley_core::MessageBody;

    use super::*;

    #[test]
    fn clones_share_state() {
        let a = SharedTimeline::new();
        let b = a.clone();
        a.append(Message::outgoing(MessageId(1), MessageBody::text("hi")))
            .unwrap();
        assert_eq!(b.len(), 1);
        b.update_status(MessageId(1), Status::Delivered).unwrap();
        assert_eq!(a.get(MessageId(1)).unwrap().status, Status::Delivered);
    }

    #[test]
    fn concurrent_appends_keep_unique_ids() {
        let timeline = SharedTimeline::new();
        let ids = Arc::new(parley_core::IdGenerator::new());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let timeline = timeline.clone();
                let ids = ids.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        let msg = Message::outgoing(ids.next_id(), MessageBody::text("x"));
                        timeline.append(msg).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let snapshot = timeline.snapshot();
        assert_eq!(snapshot.len(), 100);
        let mut seen: Vec<_> = snapshot.iter().map(|m| m.id).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 100);
    }

    #[test]
    fn append_with_keeps_allocation_order() {
        let timeline = SharedTimeline::new();
        let ids = Arc::new(parley_core::IdGenerator::new());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let timeline = timeline.clone();
                let ids = ids.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        timeline
                            .append_with(|| Message::outgoing(ids.next_id(), MessageBody::text("x")))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let order: Vec<_> = timeline.snapshot().iter().map(|m| m.id).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
    }

    #[test]
    fn close_is_visible_through_clones() {
        let a = SharedTimeline::new();
        let b = a.clone();
        b.close();
        assert!(a.is_closed());
        assert_eq!(
            a.append(Message::outgoing(MessageId(1), MessageBody::text("late"))),
            Err(TimelineError::Closed)
        );
        assert_eq!(
            a.append_with(|| unreachable!("closed timeline must not build")),
            Err(TimelineError::Closed)
        );
    }
}
