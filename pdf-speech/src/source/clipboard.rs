//! Clipboard text source.

use super::{InputError, SourceOrigin, SourceText};

/// Read text from the system clipboard.
pub fn read_clipboard() -> Result<SourceText, InputError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| InputError::Clipboard(e.to_string()))?;

    let text = clipboard.get_text().map_err(|e| match e {
        arboard::Error::ContentNotAvailable => InputError::EmptyClipboard,
        other => InputError::Clipboard(other.to_string()),
    })?;

    clipboard_source(&text)
}

/// Wrap clipboard text as a source, rejecting blank content.
pub fn clipboard_source(text: &str) -> Result<SourceText, InputError> {
    let source = SourceText::new(text, SourceOrigin::Clipboard);
    if source.is_empty() {
        return Err(InputError::EmptyClipboard);
    }
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_clipboard_rejected() {
        assert!(matches!(
            clipboard_source(" \n\t "),
            Err(InputError::EmptyClipboard)
        ));
    }

    #[test]
    fn test_clipboard_source() {
        let source = clipboard_source("  Read this aloud.  ").unwrap();
        assert_eq!(source.text(), "Read this aloud.");
        assert_eq!(source.origin(), &SourceOrigin::Clipboard);
    }
}
