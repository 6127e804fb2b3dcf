// PDF validation and text extraction

use super::{ExtractionError, InputError, SourceOrigin, SourceText};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Validate a user-supplied PDF path.
///
/// Drag-and-drop on some platforms wraps paths containing spaces in braces,
/// so `{/path/with space.pdf}` is unwrapped first.
pub fn validate_pdf_path(raw: &Path) -> Result<PathBuf, InputError> {
    let raw = raw.to_string_lossy();
    let trimmed = raw.trim().trim_matches(|c| c == '{' || c == '}');
    if trimmed.is_empty() {
        return Err(InputError::NoSource);
    }

    let path = PathBuf::from(trimmed);
    let is_pdf = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(InputError::NotPdf(path));
    }

    if !path.exists() {
        return Err(InputError::NotFound(path));
    }

    Ok(path)
}

/// Extract the text of every page of a PDF.
///
/// Pages without text (or whose text cannot be decoded) are skipped.
pub fn extract_pdf_text(path: &Path) -> Result<SourceText, ExtractionError> {
    let doc = lopdf::Document::load(path).map_err(|e| ExtractionError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let pages = doc.get_pages();
    debug!("{}: {} page(s)", path.display(), pages.len());

    let page_texts = pages.keys().filter_map(|page_number| {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Skipping page {} of {}: {}", page_number, path.display(), e);
                None
            }
        }
    });

    let text = join_pages(page_texts).ok_or_else(|| ExtractionError::NoText(path.to_path_buf()))?;

    Ok(SourceText::new(&text, SourceOrigin::File(path.to_path_buf())))
}

/// Join page texts with single spaces, flattening line breaks and skipping
/// pages with no text. Returns `None` when no page had text.
fn join_pages(pages: impl IntoIterator<Item = String>) -> Option<String> {
    let texts: Vec<String> = pages
        .into_iter()
        .map(|t| t.replace('\n', " "))
        .filter(|t| !t.trim().is_empty())
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.join(" "))
    }
}
