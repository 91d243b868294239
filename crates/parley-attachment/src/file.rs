// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-selected files handed to the attachment pipeline.

use std::path::{Path, PathBuf};

/// Content type used when nothing better is known.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Where the file's bytes live.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Already in memory (drag-and-drop, clipboard, tests).
    Bytes(Vec<u8>),
    /// On disk, read lazily during conversion.
    Path(PathBuf),
}

/// A file picked by the user, with its declared content type.
#[derive(Debug, Clone)]
pub struct FileHandle {
    pub name: String,
    pub content_type: String,
    pub source: FileSource,
}

impl FileHandle {
    /// Wraps in-memory content with an explicit content type.
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            source: FileSource::Bytes(bytes),
        }
    }

    /// Refers to a file on disk; the content type is guessed from the extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            content_type: guess_content_type(&path).to_string(),
            source: FileSource::Path(path),
        }
    }

    /// True if the declared content type is in the `image/` family.
    pub fn is_image(&self) -> bool {
        self.content_type
            .trim()
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    }
}

/// Maps common image extensions to MIME types.
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        Some("heic") => "image/heic",
        _ => FALLBACK_CONTENT_TYPE,
    }
}
