// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat session facade tying the components together.
//!
//! A [`ChatSession`] owns one timeline, one attachment pipeline, one
//! scheduler and the delivery simulator running on it. Sessions go through
//! the states Active -> Draining -> Closed; once teardown has started every
//! mutating operation fails with [`ParleyError::SessionClosed`].

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use parley_attachment::{AttachmentPipeline, FileHandle};
use parley_config::ParleyConfig;
use parley_core::{
    Counterpart, IdGenerator, Message, MessageBody, MessageId, NullAnchor, Origin, ParleyError,
    ScrollAnchor, SessionId, Status, TimelineError,
};
use parley_delivery::{CannedCounterpart, DeliverySimulator, Scheduler};
use parley_timeline::{SharedTimeline, SubscriptionId};
use tracing::{debug, info, warn};

use crate::view::ViewSynchronizer;

/// Lifecycle states of a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting sends and running scheduled deliveries.
    Active,
    /// Teardown started: the timeline is closed, the scheduler is stopping.
    Draining,
    /// Teardown finished. Nothing will mutate the timeline again.
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Active => write!(f, "active"),
            SessionState::Draining => write!(f, "draining"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// A message from an earlier conversation, used to seed a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub origin: Origin,
    pub body: MessageBody,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(origin: Origin, body: MessageBody, created_at: DateTime<Utc>) -> Self {
        Self {
            origin,
            body,
            created_at,
        }
    }
}

/// Builder for [`ChatSession`].
///
/// The counterpart defaults to canned replies from the configuration and the
/// anchor to [`NullAnchor`].
pub struct ChatSessionBuilder {
    config: ParleyConfig,
    session_id: Option<SessionId>,
    counterpart: Option<Arc<dyn Counterpart>>,
    anchor: Option<Arc<dyn ScrollAnchor>>,
}

impl ChatSessionBuilder {
    fn new(config: ParleyConfig) -> Self {
        Self {
            config,
            session_id: None,
            counterpart: None,
            anchor: None,
        }
    }

    /// Use a fixed session id instead of a random one.
    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(SessionId(id.into()));
        self
    }

    /// Set the peer that answers text messages.
    pub fn counterpart(mut self, counterpart: Arc<dyn Counterpart>) -> Self {
        self.counterpart = Some(counterpart);
        self
    }

    /// Set the rendering element kept scrolled to the newest message.
    pub fn anchor(mut self, anchor: Arc<dyn ScrollAnchor>) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Assembles the session and starts its scheduler.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> Result<ChatSession, ParleyError> {
        tokio::runtime::Handle::try_current()
            .map_err(|e| ParleyError::Internal(format!("no async runtime: {e}")))?;

        let session_id = self
            .session_id
            .unwrap_or_else(|| SessionId(uuid::Uuid::new_v4().to_string()));
        let counterpart = self
            .counterpart
            .unwrap_or_else(|| Arc::new(CannedCounterpart::from_config(&self.config.counterpart)));
        let anchor = self.anchor.unwrap_or_else(|| Arc::new(NullAnchor));

        let timeline = SharedTimeline::new();
        let ids = Arc::new(IdGenerator::new());
        let scheduler = Scheduler::start();
        let view = ViewSynchronizer::attach(&timeline, anchor);
        let simulator = DeliverySimulator::new(
            session_id.clone(),
            scheduler.clone(),
            timeline.clone(),
            counterpart,
            ids.clone(),
            self.config.delivery.clone(),
        );

        info!(
            session_id = %session_id,
            counterpart = simulator.counterpart().name(),
            max_attachments = self.config.attachment.max_attachments,
            "chat session started"
        );

        Ok(ChatSession {
            session_id,
            timeline,
            ids,
            attachments: AttachmentPipeline::new(&self.config.attachment),
            scheduler,
            simulator,
            _view: view,
            state: Mutex::new(SessionState::Active),
        })
    }
}

/// One conversation between the local user and a counterpart.
pub struct ChatSession {
    session_id: SessionId,
    timeline: SharedTimeline,
    ids: Arc<IdGenerator>,
    attachments: AttachmentPipeline,
    scheduler: Scheduler,
    simulator: DeliverySimulator,
    _view: ViewSynchronizer,
    state: Mutex<SessionState>,
}

impl ChatSession {
    pub fn builder(config: ParleyConfig) -> ChatSessionBuilder {
        ChatSessionBuilder::new(config)
    }

    /// Sends a text message.
    ///
    /// Input that is blank after trimming is ignored and yields `Ok(None)`,
    /// even on a closed session. The stored body is kept exactly as typed.
    pub fn send_text(&self, body: &str) -> Result<Option<MessageId>, ParleyError> {
        if body.trim().is_empty() {
            debug!(session_id = %self.session_id, "ignoring blank message");
            return Ok(None);
        }
        self.ensure_open()?;

        let id = self
            .timeline
            .append_with(|| Message::outgoing(self.ids.next_id(), MessageBody::text(body)))
            .map_err(closed_as_session)?;
        info!(session_id = %self.session_id, message_id = %id, "text sent");
        self.simulator.track_text(id);
        Ok(Some(id))
    }

    /// Sends an image attachment.
    ///
    /// Nothing is appended when the pipeline rejects the file.
    pub async fn send_image(&self, file: FileHandle) -> Result<MessageId, ParleyError> {
        self.ensure_open()?;

        let payload = self.attachments.accept(file).await?;
        let id = self
            .timeline
            .append_with(|| Message::outgoing(self.ids.next_id(), MessageBody::Image(payload)))
            .map_err(closed_as_session)?;
        info!(
            session_id = %self.session_id,
            message_id = %id,
            remaining = self.attachments.remaining(),
            "image sent"
        );
        self.simulator.track_image(id);
        Ok(id)
    }

    /// Merges a message received from the counterpart.
    pub fn receive(&self, body: MessageBody) -> Result<MessageId, ParleyError> {
        self.ensure_open()?;
        let id = self
            .timeline
            .append_with(|| Message::incoming(self.ids.next_id(), body))
            .map_err(closed_as_session)?;
        debug!(session_id = %self.session_id, message_id = %id, "message received");
        Ok(id)
    }

    /// Records a read receipt for `id`.
    pub fn mark_seen(&self, id: MessageId) -> Result<(), ParleyError> {
        self.ensure_open()?;
        let previous = self
            .timeline
            .update_status(id, Status::Seen)
            .map_err(closed_as_session)?;
        if previous != Status::Seen {
            debug!(session_id = %self.session_id, message_id = %id, from = %previous, "message seen");
        }
        Ok(())
    }

    /// Seeds the timeline with an earlier conversation, in the given order.
    ///
    /// Imported messages are stored as seen and never handed to the
    /// delivery simulator.
    pub fn import_history(
        &self,
        entries: impl IntoIterator<Item = HistoryEntry>,
    ) -> Result<Vec<MessageId>, ParleyError> {
        self.ensure_open()?;
        let mut imported = Vec::new();
        for entry in entries {
            let id = self
                .timeline
                .append_with(|| {
                    Message::at(
                        self.ids.next_id(),
                        entry.origin,
                        entry.body,
                        Status::Seen,
                        entry.created_at,
                    )
                })
                .map_err(closed_as_session)?;
            imported.push(id);
        }
        info!(session_id = %self.session_id, count = imported.len(), "history imported");
        Ok(imported)
    }

    /// Registers `callback` to receive the full ordered snapshot after every
    /// timeline mutation.
    ///
    /// Callbacks run synchronously while the timeline is locked and must not
    /// call back into the session.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&[Message]) + Send + Sync + 'static,
    {
        self.timeline
            .subscribe(Box::new(move |_change, messages| callback(messages)))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.timeline.unsubscribe(id)
    }

    /// Ordered copy of every message in the session.
    pub fn snapshot(&self) -> Vec<Message> {
        self.timeline.snapshot()
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Attachment slots still free in this session.
    pub fn attachments_remaining(&self) -> usize {
        self.attachments.remaining()
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_closed(&self) -> bool {
        self.timeline.is_closed()
    }

    /// Ends the session.
    ///
    /// Closes the timeline first so no scheduled job can mutate it, then
    /// cancels every outstanding job and waits for the scheduler to stop.
    /// Calling this again is a no-op.
    pub async fn teardown(&self) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state != SessionState::Active {
                debug!(session_id = %self.session_id, state = %*state, "teardown already started");
            } else {
                *state = SessionState::Draining;
                info!(
                    session_id = %self.session_id,
                    pending_jobs = self.scheduler.pending(),
                    "tearing down chat session"
                );
            }
        }

        self.timeline.close();
        self.scheduler.shutdown().await;

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != SessionState::Closed {
            *state = SessionState::Closed;
            info!(session_id = %self.session_id, messages = self.timeline.len(), "chat session closed");
        }
    }

    fn ensure_open(&self) -> Result<(), ParleyError> {
        if self.timeline.is_closed() {
            return Err(ParleyError::SessionClosed);
        }
        Ok(())
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if !self.timeline.is_closed() {
            warn!(session_id = %self.session_id, "chat session dropped without teardown");
        }
        self.timeline.close();
        self.scheduler.cancel_all();
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("session_id", &self.session_id)
            .field("state", &self.state())
            .field("messages", &self.timeline.len())
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

fn closed_as_session(err: TimelineError) -> ParleyError {
    match err {
        TimelineError::Closed => ParleyError::SessionClosed,
        other => ParleyError::Timeline(other),
    }
}
