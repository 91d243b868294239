// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery simulator standing in for a real transport.
//!
//! For every local message handed over it schedules, on the session's
//! [`Scheduler`]:
//! 1. after the delivery delay, `pending -> delivered`;
//! 2. for text only, after the reply delay, a counterpart reply appended as
//!    a remote message with status `delivered`.
//!
//! The simulator never surfaces errors. A rejected timeline mutation is
//! logged and the scheduled step is dropped. A message that was already
//! read before its delivery step fired keeps its status and still gets
//! its reply.

use std::sync::Arc;

use parley_config::model::DeliveryConfig;
use parley_core::{
    Counterpart, IdGenerator, Message, MessageId, SessionId, Status, TimelineError,
};
use parley_timeline::SharedTimeline;
use tracing::{debug, info, warn};

use crate::scheduler::{JobHandle, Scheduler};

/// Drives status transitions and synthetic replies for one session.
#[derive(Clone)]
pub struct DeliverySimulator {
    inner: Arc<Inner>,
}

struct Inner {
    session_id: SessionId,
    scheduler: Scheduler,
    timeline: SharedTimeline,
    counterpart: Arc<dyn Counterpart>,
    ids: Arc<IdGenerator>,
    config: DeliveryConfig,
}

impl DeliverySimulator {
    pub fn new(
        session_id: SessionId,
        scheduler: Scheduler,
        timeline: SharedTimeline,
        counterpart: Arc<dyn Counterpart>,
        ids: Arc<IdGenerator>,
        config: DeliveryConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                session_id,
                scheduler,
                timeline,
                counterpart,
                ids,
                config,
            }),
        }
    }

    /// Hands over a freshly appended local text message.
    ///
    /// Schedules the delivery transition; the counterpart reply is chained
    /// from it once delivery succeeds.
    pub fn track_text(&self, id: MessageId) -> JobHandle {
        self.schedule_delivery(id, true)
    }

    /// Hands over a freshly appended local image message (delivery only).
    pub fn track_image(&self, id: MessageId) -> JobHandle {
        self.schedule_delivery(id, false)
    }

    pub fn counterpart(&self) -> &Arc<dyn Counterpart> {
        &self.inner.counterpart
    }

    fn schedule_delivery(&self, id: MessageId, then_reply: bool) -> JobHandle {
        let sim = self.clone();
        let handle = self
            .inner
            .scheduler
            .schedule(self.inner.config.delivery_delay(), move || async move {
                sim.deliver(id, then_reply);
            });
        debug!(
            session_id = %self.inner.session_id,
            message_id = %id,
            delay_ms = self.inner.config.delivery_delay_ms,
            "delivery scheduled"
        );
        handle
    }

    fn deliver(&self, id: MessageId, then_reply: bool) {
        let inner = &self.inner;
        match inner.timeline.update_status(id, Status::Delivered) {
            Ok(_) => {
                info!(session_id = %inner.session_id, message_id = %id, "message delivered");
            }
            Err(TimelineError::InvalidTransition { from, .. }) if from > Status::Delivered => {
                debug!(
                    session_id = %inner.session_id,
                    message_id = %id,
                    status = %from,
                    "message already past delivery"
                );
            }
            Err(e) => {
                warn!(
                    session_id = %inner.session_id,
                    message_id = %id,
                    error = %e,
                    "dropping scheduled delivery"
                );
                return;
            }
        }

        if then_reply && inner.config.replies_enabled {
            let sim = self.clone();
            inner
                .scheduler
                .schedule(inner.config.reply_delay(), move || async move {
                    sim.reply(id).await;
                });
        }
    }

    async fn reply(&self, id: MessageId) {
        let inner = &self.inner;
        let Some(original) = inner.timeline.get(id) else {
            warn!(session_id = %inner.session_id, message_id = %id, "reply target vanished");
            return;
        };

        let Some(body) = inner.counterpart.reply_to(&original).await else {
            debug!(
                session_id = %inner.session_id,
                message_id = %id,
                counterpart = inner.counterpart.name(),
                "counterpart chose not to reply"
            );
            return;
        };

        let reply_id = match inner
            .timeline
            .append_with(|| Message::incoming(inner.ids.next_id(), body))
        {
            Ok(reply_id) => reply_id,
            Err(e) => {
                warn!(
                    session_id = %inner.session_id,
                    message_id = %id,
                    error = %e,
                    "dropping synthetic reply"
                );
                return;
            }
        };
        info!(
            session_id = %inner.session_id,
            message_id = %reply_id,
            in_reply_to = %id,
            counterpart = inner.counterpart.name(),
            "counterpart replied"
        );

        if inner.config.mark_seen_on_reply
            && let Err(e) = inner.timeline.update_status(id, Status::Seen)
        {
            warn!(
                session_id = %inner.session_id,
                message_id = %id,
                error = %e,
                "could not mark message seen"
            );
        }
    }
}

impl std::fmt::Debug for DeliverySimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliverySimulator")
            .field("session_id", &self.inner.session_id)
            .field("counterpart", &self.inner.counterpart.name())
            .field("scheduler", &self.inner.scheduler)
            .finish()
    }
}
