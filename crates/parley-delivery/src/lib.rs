// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery simulation for the Parley chat engine.
//!
//! There is no real transport. A [`DeliverySimulator`] advances local
//! messages to `delivered` after a delay and has a [`Counterpart`] answer
//! text messages after a further delay. All timing runs on a per-session
//! [`Scheduler`] so that teardown can cancel every outstanding step.
//!
//! [`Counterpart`]: parley_core::Counterpart

pub mod counterpart;
pub mod scheduler;
pub mod simulator;

pub use counterpart::CannedCounterpart;
pub use scheduler::{JobHandle, Scheduler};
pub use simulator::DeliverySimulator;
