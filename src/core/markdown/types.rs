//! Structural model produced by the Markdown parser.

use serde::Serialize;

/// Title given to content that precedes the first heading.
pub const DEFAULT_SECTION_TITLE: &str = "Introduction";

/// Fence info string reserved for captured `$$ ... $$` blocks.
pub const MATH_LANGUAGE: &str = "math";

/// A heading and the blocks beneath it until the next heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub level: u8,
    pub blocks: Vec<ContentBlock>,
}

impl Section {
    pub fn new(title: impl Into<String>, level: u8) -> Self {
        Self {
            title: title.into(),
            level,
            blocks: Vec::new(),
        }
    }

    pub fn introduction() -> Self {
        Self::new(DEFAULT_SECTION_TITLE, 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockKind {
    Paragraph,
    CodeBlock,
    Table,
    ListItem,
    Blockquote,
    Hr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBlock {
    pub kind: BlockKind,
    /// Raw text, code or table rows; empty for rules.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<ParsedTable>,
}

impl ContentBlock {
    fn with_kind(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            language: None,
            table: None,
        }
    }

    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::with_kind(BlockKind::Paragraph, content)
    }

    pub fn list_item(content: impl Into<String>) -> Self {
        Self::with_kind(BlockKind::ListItem, content)
    }

    pub fn blockquote(content: impl Into<String>) -> Self {
        Self::with_kind(BlockKind::Blockquote, content)
    }

    pub fn rule() -> Self {
        Self::with_kind(BlockKind::Hr, "")
    }

    pub fn code(content: impl Into<String>, language: Option<String>) -> Self {
        Self {
            language,
            ..Self::with_kind(BlockKind::CodeBlock, content)
        }
    }

    pub fn math(content: impl Into<String>) -> Self {
        Self::code(content, Some(MATH_LANGUAGE.to_string()))
    }

    pub fn table(content: impl Into<String>, table: ParsedTable) -> Self {
        Self {
            table: Some(table),
            ..Self::with_kind(BlockKind::Table, content)
        }
    }

    /// True for code blocks tagged `math` (captured `$$` blocks).
    pub fn is_math_block(&self) -> bool {
        self.kind == BlockKind::CodeBlock && self.language.as_deref() == Some(MATH_LANGUAGE)
    }
}

/// Rows may be ragged; nothing forces `rows[i].len() == headers.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
