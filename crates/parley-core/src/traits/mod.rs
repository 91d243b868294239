// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam traits between the chat engine and its collaborators.
//!
//! [`Counterpart`] stands in for the remote peer (a real transport replaces
//! it); [`ScrollAnchor`] is the rendering layer's handle on its newest row.

pub mod anchor;
pub mod counterpart;

pub use anchor::{NullAnchor, ScrollAnchor};
pub use counterpart::Counterpart;
