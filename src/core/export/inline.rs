//! Inline splicing of math and emphasis

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `$$...$$` or `$...$`, shortest match, no nesting.
    static ref MATH_RE: Regex = Regex::new(r"\$\$(.+?)\$\$|\$(.+?)\$").unwrap();
    static ref BOLD_RE: Regex = Regex::new(r"\*\*([^*]+)\*\*").unwrap();
    static ref ITALIC_RE: Regex = Regex::new(r"\*([^*]+)\*").unwrap();
}

/// One piece of a paragraph after splicing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineSegment {
    Text {
        text: String,
        bold: bool,
        italic: bool,
    },
    /// LaTeX source without its delimiters.
    Math(String),
}

impl InlineSegment {
    pub fn plain(text: impl Into<String>) -> Self {
        InlineSegment::Text {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }
}

/// Split paragraph text into math and styled text segments.
///
/// Math delimiters are matched first, so `*` inside `$...$` is never
/// emphasis. Text is then split on `**bold**` and finally `*italic*`.
/// Empty markers such as `**` or `****` stay literal.
pub fn split_inline(text: &str) -> Vec<InlineSegment> {
    let mut out = Vec::new();
    let mut last = 0;
    for caps in MATH_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        split_bold(&text[last..whole.start()], &mut out);
        let latex = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        out.push(InlineSegment::Math(latex.to_string()));
        last = whole.end();
    }
    split_bold(&text[last..], &mut out);
    out
}

fn split_bold(text: &str, out: &mut Vec<InlineSegment>) {
    let mut last = 0;
    for caps in BOLD_RE.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        split_italic(&text[last..whole.start()], out);
        push_text(out, inner.as_str(), true, false);
        last = whole.end();
    }
    split_italic(&text[last..], out);
}

fn split_italic(text: &str, out: &mut Vec<InlineSegment>) {
    let mut last = 0;
    for caps in ITALIC_RE.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_text(out, &text[last..whole.start()], false, false);
        push_text(out, inner.as_str(), false, true);
        last = whole.end();
    }
    push_text(out, &text[last..], false, false);
}

fn push_text(out: &mut Vec<InlineSegment>, text: &str, bold: bool, italic: bool) {
    if text.is_empty() {
        return;
    }
    out.push(InlineSegment::Text {
        text: text.to_string(),
        bold,
        italic,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bold(text: &str) -> InlineSegment {
        InlineSegment::Text {
            text: text.into(),
            bold: true,
            italic: false,
        }
    }

    fn italic(text: &str) -> InlineSegment {
        InlineSegment::Text {
            text: text.into(),
            bold: false,
            italic: true,
        }
    }

    #[test]
    fn test_scenario_paragraph() {
        assert_eq!(
            split_inline("Hello **world** with $x^2$."),
            vec![
                InlineSegment::plain("Hello "),
                bold("world"),
                InlineSegment::plain(" with "),
                InlineSegment::Math("x^2".into()),
                InlineSegment::plain("."),
            ]
        );
    }

    #[test]
    fn test_math_takes_priority_over_emphasis() {
        assert_eq!(
            split_inline("$a*b*c$ and *it*"),
            vec![
                InlineSegment::Math("a*b*c".into()),
                InlineSegment::plain(" and "),
                italic("it"),
            ]
        );
    }

    #[test]
    fn test_display_delimiters_inline() {
        assert_eq!(
            split_inline("see $$\\frac{1}{2}$$ here"),
            vec![
                InlineSegment::plain("see "),
                InlineSegment::Math("\\frac{1}{2}".into()),
                InlineSegment::plain(" here"),
            ]
        );
    }

    #[test]
    fn test_mixed_emphasis() {
        assert_eq!(
            split_inline("**b** then *i* end"),
            vec![
                bold("b"),
                InlineSegment::plain(" then "),
                italic("i"),
                InlineSegment::plain(" end"),
            ]
        );
    }

    #[test]
    fn test_degenerate_markers_are_literal() {
        assert_eq!(split_inline("a ** b"), vec![InlineSegment::plain("a ** b")]);
        assert_eq!(split_inline("****"), vec![InlineSegment::plain("****")]);
        assert_eq!(split_inline("$ only one"), vec![InlineSegment::plain("$ only one")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_inline("").is_empty());
    }
}
