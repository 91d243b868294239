// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment pipeline for the Parley chat engine.
//!
//! Turns a user-selected [`FileHandle`] into an inline [`ImagePayload`]
//! (a base64 `data:` URI) after checking its type, the per-session cap and
//! its size.
//!
//! [`ImagePayload`]: parley_core::ImagePayload

pub mod file;
pub mod pipeline;

pub use file::{guess_content_type, FileHandle, FileSource};
pub use pipeline::AttachmentPipeline;
