// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scroll anchor trait implemented by rendering layers.

use crate::types::MessageId;

/// The element a renderer scrolls into view.
pub trait ScrollAnchor: Send + Sync + 'static {
    /// Brings the row for `id` into the visible area.
    fn reveal(&self, id: MessageId);
}

/// Anchor for headless sessions. Does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAnchor;

impl ScrollAnchor for NullAnchor {
    fn reveal(&self, _id: MessageId) {}
}
