// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley integration tests.
//!
//! Provides deterministic stand-ins for the session seams and a harness
//! that wires them into a [`ChatSession`](parley_session::ChatSession).
//!
//! # Components
//!
//! - [`ScriptedCounterpart`] - Counterpart replying from a pre-configured queue
//! - [`RecordingAnchor`] - Scroll anchor that records every reveal
//! - [`TestHarness`] - Session builder with scripted seams and short delays

pub mod harness;
pub mod recording_anchor;
pub mod scripted_counterpart;

pub use harness::TestHarness;
pub use recording_anchor::RecordingAnchor;
pub use scripted_counterpart::ScriptedCounterpart;
