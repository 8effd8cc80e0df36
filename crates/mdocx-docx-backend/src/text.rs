//! Text escaping for XML parts

use std::borrow::Cow;

use quick_xml::escape::escape;

/// Characters XML 1.0 does not allow in element content.
fn is_forbidden(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

/// Escape `text` for element or attribute content, dropping characters
/// XML 1.0 forbids.
pub(crate) fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_forbidden) {
        return escape(text);
    }
    let cleaned: String = text.chars().filter(|&c| !is_forbidden(c)).collect();
    Cow::Owned(escape(cleaned.as_str()).into_owned())
}
