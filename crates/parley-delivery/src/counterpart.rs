// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned counterpart that answers with a random stock reply.

use std::sync::Mutex;

use async_trait::async_trait;
use parley_config::model::CounterpartConfig;
use parley_core::{Counterpart, Message, MessageBody};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Stand-in for a remote peer: picks one reply uniformly at random.
pub struct CannedCounterpart {
    name: String,
    replies: Vec<String>,
    rng: Mutex<StdRng>,
}

impl CannedCounterpart {
    /// Creates a counterpart seeded from OS entropy.
    pub fn new(name: impl Into<String>, replies: Vec<String>) -> Self {
        Self::with_rng(name, replies, StdRng::from_entropy())
    }

    /// Creates a counterpart with a fixed seed, for reproducible runs.
    pub fn seeded(name: impl Into<String>, replies: Vec<String>, seed: u64) -> Self {
        Self::with_rng(name, replies, StdRng::seed_from_u64(seed))
    }

    pub fn from_config(config: &CounterpartConfig) -> Self {
        Self::new(config.name.clone(), config.replies.clone())
    }

    fn with_rng(name: impl Into<String>, replies: Vec<String>, rng: StdRng) -> Self {
        Self {
            name: name.into(),
            replies,
            rng: Mutex::new(rng),
        }
    }

    pub fn replies(&self) -> &[String] {
        &self.replies
    }
}

#[async_trait]
impl Counterpart for CannedCounterpart {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reply_to(&self, _message: &Message) -> Option<MessageBody> {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.replies.choose(&mut *rng).cloned().map(MessageBody::Text)
    }
}

impl std::fmt::Debug for CannedCounterpart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CannedCounterpart")
            .field("name", &self.name)
            .field("replies", &self.replies.len())
            .finish()
    }
}
