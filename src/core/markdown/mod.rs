//! Markdown structural parsing
//!
//! Splits a Markdown document into [`Section`]s holding typed
//! [`ContentBlock`]s. Only the subset the exporter understands is
//! recognized: ATX headings, paragraphs, bullet and ordered list items,
//! pipe tables, fenced code, `$$` math blocks, block quotes and rules.

mod parser;
mod table;
pub mod types;

pub use parser::MarkdownParser;
pub use table::{is_separator_row, parse_table, split_row};
pub use types::{
    BlockKind, ContentBlock, ParsedTable, Section, DEFAULT_SECTION_TITLE, MATH_LANGUAGE,
};

/// Parse Markdown text into sections. Never fails.
pub fn parse_markdown(text: &str) -> Vec<Section> {
    MarkdownParser::new().parse(text)
}
