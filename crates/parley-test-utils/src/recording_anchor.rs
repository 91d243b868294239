// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scroll anchor that records reveals for assertions.

use std::sync::{Mutex, PoisonError};

use parley_core::{MessageId, ScrollAnchor};

/// Captures every id the view synchronizer asked to reveal.
#[derive(Debug, Default)]
pub struct RecordingAnchor {
    revealed: Mutex<Vec<MessageId>>,
}

impl RecordingAnchor {
    pub fn new() -> Self {
        Self::default()
    }

    /// All reveal requests, oldest first.
    pub fn revealed(&self) -> Vec<MessageId> {
        self.revealed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The id currently scrolled into view.
    pub fn current(&self) -> Option<MessageId> {
        self.revealed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }

    pub fn reveal_count(&self) -> usize {
        self.revealed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl ScrollAnchor for RecordingAnchor {
    fn reveal(&self, id: MessageId) {
        self.revealed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id);
    }
}
