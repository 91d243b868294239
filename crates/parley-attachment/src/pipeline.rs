// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Validates user-selected files and converts them into inline image payloads.
//!
//! A file goes through three gates before it becomes an [`ImagePayload`]:
//! its declared content type must be an image, the session must still have
//! an attachment slot free, and its bytes must be readable and within the
//! size limit. Conversion to a base64 data URI runs off the async runtime.

use std::sync::atomic::{AtomicUsize, Ordering};

use base64::Engine;
use parley_config::model::AttachmentConfig;
use parley_core::{AttachmentError, ImagePayload};
use tracing::{debug, info};

use crate::file::{FileHandle, FileSource};

/// Per-session attachment gate and converter.
#[derive(Debug)]
pub struct AttachmentPipeline {
    max_attachments: usize,
    max_bytes: u64,
    /// Slots taken by accepted attachments plus in-flight conversions.
    used: AtomicUsize,
}

impl AttachmentPipeline {
    pub fn new(config: &AttachmentConfig) -> Self {
        Self {
            max_attachments: config.max_attachments,
            max_bytes: config.max_bytes,
            used: AtomicUsize::new(0),
        }
    }

    /// Validates and converts a file into an inline image payload.
    ///
    /// A slot is reserved before conversion starts so concurrent calls can
    /// never exceed the cap; it is released again if conversion fails.
    pub async fn accept(&self, file: FileHandle) -> Result<ImagePayload, AttachmentError> {
        if !file.is_image() {
            debug!(file = %file.name, content_type = %file.content_type, "rejected non-image attachment");
            return Err(AttachmentError::UnsupportedType {
                content_type: file.content_type,
            });
        }

        let slot = self.reserve()?;
        let payload = convert(file, self.max_bytes).await?;
        slot.commit();

        info!(
            file = %payload.file_name,
            size_bytes = payload.size_bytes,
            remaining = self.remaining(),
            "attachment accepted"
        );
        Ok(payload)
    }

    /// Number of attachments accepted so far (including in-flight ones).
    pub fn accepted(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    /// Slots still available in this session.
    pub fn remaining(&self) -> usize {
        self.max_attachments.saturating_sub(self.accepted())
    }

    fn reserve(&self) -> Result<Slot<'_>, AttachmentError> {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                (used < self.max_attachments).then_some(used + 1)
            })
            .map_err(|_| AttachmentError::LimitExceeded {
                limit: self.max_attachments,
            })?;
        Ok(Slot {
            used: &self.used,
            committed: false,
        })
    }
}

/// A reserved attachment slot, returned to the pool unless committed.
struct Slot<'a> {
    used: &'a AtomicUsize,
    committed: bool,
}

impl Slot<'_> {
    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.used.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

/// Reads the file content and encodes it as a `data:` URI.
async fn convert(file: FileHandle, max_bytes: u64) -> Result<ImagePayload, AttachmentError> {
    let bytes = match file.source {
        FileSource::Bytes(bytes) => bytes,
        FileSource::Path(path) => {
            let meta = tokio::fs::metadata(&path).await.map_err(|e| {
                AttachmentError::ConversionFailure {
                    message: format!("cannot stat {}: {e}", path.display()),
                    source: Some(Box::new(e)),
                }
            })?;
            check_size(meta.len(), max_bytes)?;
            tokio::fs::read(&path)
                .await
                .map_err(|e| AttachmentError::ConversionFailure {
                    message: format!("cannot read {}: {e}", path.display()),
                    source: Some(Box::new(e)),
                })?
        }
    };

    let size_bytes = bytes.len() as u64;
    check_size(size_bytes, max_bytes)?;
    if bytes.is_empty() {
        return Err(AttachmentError::conversion(format!("{} is empty", file.name)));
    }

    let content_type = file.content_type.trim().to_ascii_lowercase();
    let prefix = format!("data:{content_type};base64,");
    let data_uri = tokio::task::spawn_blocking(move || {
        let mut uri = prefix;
        base64::engine::general_purpose::STANDARD.encode_string(&bytes, &mut uri);
        uri
    })
    .await
    .map_err(|e| AttachmentError::ConversionFailure {
        message: format!("encoding task failed: {e}"),
        source: Some(Box::new(e)),
    })?;

    Ok(ImagePayload {
        content_type,
        file_name: file.name,
        size_bytes,
        data_uri,
    })
}

fn check_size(size: u64, max_bytes: u64) -> Result<(), AttachmentError> {
    if size > max_bytes {
        return Err(AttachmentError::conversion(format!(
            "attachment is {size} bytes, limit is {max_bytes}"
        )));
    }
    Ok(())
}
