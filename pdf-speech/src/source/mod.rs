//! Source acquisition: PDF extraction and clipboard text.

mod clipboard;
mod pdf;

pub use clipboard::read_clipboard;
#[cfg(test)]
pub use clipboard::clipboard_source;
pub use pdf::{extract_pdf_text, validate_pdf_path};
#[cfg(test)]
pub(crate) use pdf::test_support;

use crate::text::normalize_text;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Base name used for clipboard-derived output files.
pub const CLIPBOARD_BASE_NAME: &str = "clipboard";

/// Problems with the requested input, detected before a job starts.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Please select a PDF file or use the clipboard")]
    NoSource,

    #[error("Clipboard is empty")]
    EmptyClipboard,

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("The selected file is not a PDF: {}", .0.display())]
    NotPdf(PathBuf),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Failures turning a PDF into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to read PDF {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("No extractable text in {}", .0.display())]
    NoText(PathBuf),
}

/// Where a source text came from. Only used for naming output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    File(PathBuf),
    Clipboard,
}

/// Text to synthesize, normalized and immutable once obtained.
#[derive(Debug, Clone)]
pub struct SourceText {
    text: String,
    origin: SourceOrigin,
}

impl SourceText {
    /// Normalize raw text and tag it with its origin.
    pub fn new(raw: &str, origin: SourceOrigin) -> Self {
        Self {
            text: normalize_text(raw),
            origin,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    #[cfg(test)]
    pub fn origin(&self) -> &SourceOrigin {
        &self.origin
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Base name for output files.
    pub fn base_name(&self) -> String {
        match &self.origin {
            SourceOrigin::File(path) => file_base_name(path),
            SourceOrigin::Clipboard => CLIPBOARD_BASE_NAME.to_string(),
        }
    }
}

/// File name up to its first `.` (`report.v2.pdf` gives `report`).
pub fn file_base_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.split('.').next() {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => "document".to_string(),
    }
}
