//! Normalization of extracted PDF and clipboard text before chunking.

/// Characters that PDF extraction commonly produces and their replacements.
const PROBLEMATIC_CHARS: &[(char, &str)] = &[
    ('\u{2018}', "'"),   // Left single quote
    ('\u{2019}', "'"),   // Right single quote
    ('\u{201c}', "\""),  // Left double quote
    ('\u{201d}', "\""),  // Right double quote
    ('\u{2013}', "-"),   // En dash
    ('\u{2014}', "-"),   // Em dash
    ('\u{00a0}', " "),   // Non-breaking space
    ('\u{00ad}', ""),    // Soft hyphen
    ('\u{200b}', ""),    // Zero-width space
    ('\u{feff}', ""),    // BOM
    ('\u{fb00}', "ff"),  // Ligatures
    ('\u{fb01}', "fi"),
    ('\u{fb02}', "fl"),
    ('\u{fb03}', "ffi"),
    ('\u{fb04}', "ffl"),
];

/// Normalize text for synthesis.
///
/// Replaces typographic characters and ligatures, drops control characters,
/// turns line breaks into spaces and collapses runs of whitespace.
pub fn normalize_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        if let Some((_, r)) = PROBLEMATIC_CHARS.iter().find(|(ch, _)| *ch == c) {
            result.push_str(r);
        } else if c == '\n' || c == '\r' || c == '\t' {
            result.push(' ');
        } else if !c.is_control() {
            result.push(c);
        }
    }

    collapse_whitespace(&result)
}

/// Collapse runs of spaces into one and trim the ends.
fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_space = false;

    for c in text.chars() {
        if c == ' ' {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            prev_was_space = false;
            result.push(c);
        }
    }

    result.trim().to_string()
}
