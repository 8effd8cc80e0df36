//! Line-oriented Markdown structural parser
//!
//! Segments Markdown into [`Section`]s of typed [`ContentBlock`]s. The parser
//! never fails: malformed tables degrade to paragraphs and unterminated
//! fences, math blocks and quotes are closed at end of input.

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

use super::table::parse_table;
use super::types::{ContentBlock, Section};

lazy_static! {
    static ref HEADING_RE: Regex = Regex::new(r"^(#+)\s*(.*)$").unwrap();
    static ref LIST_ITEM_RE: Regex = Regex::new(r"^\s*(?:[-*+]|\d+\.)\s+(.*)$").unwrap();
}

/// Multi-line region currently being accumulated. At most one is open.
#[derive(Debug)]
enum OpenBlock {
    None,
    Code {
        language: Option<String>,
        lines: Vec<String>,
    },
    Math {
        lines: Vec<String>,
    },
    Table {
        lines: Vec<String>,
    },
    Quote {
        lines: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Code,
    Math,
    Table,
    Quote,
}

impl OpenBlock {
    fn mode(&self) -> Mode {
        match self {
            OpenBlock::None => Mode::Normal,
            OpenBlock::Code { .. } => Mode::Code,
            OpenBlock::Math { .. } => Mode::Math,
            OpenBlock::Table { .. } => Mode::Table,
            OpenBlock::Quote { .. } => Mode::Quote,
        }
    }

    fn push_line(&mut self, line: &str) {
        match self {
            OpenBlock::None => {}
            OpenBlock::Code { lines, .. }
            | OpenBlock::Math { lines }
            | OpenBlock::Table { lines }
            | OpenBlock::Quote { lines } => lines.push(line.to_string()),
        }
    }
}

/// Streaming structural parser. Create one per document.
pub struct MarkdownParser {
    sections: Vec<Section>,
    current: Section,
    open: OpenBlock,
    /// Source of tables that were kept as paragraphs.
    degraded_tables: Vec<String>,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            current: Section::introduction(),
            open: OpenBlock::None,
            degraded_tables: Vec::new(),
        }
    }

    pub fn parse(self, text: &str) -> Vec<Section> {
        self.parse_with_report(text).0
    }

    /// Parse and also return the source of every table-like run that had
    /// to be kept as plain paragraphs.
    pub fn parse_with_report(mut self, text: &str) -> (Vec<Section>, Vec<String>) {
        let lines: Vec<&str> = text.lines().collect();
        for (idx, line) in lines.iter().enumerate() {
            self.feed_line(line, lines.get(idx + 1).copied());
        }
        self.close_open_block();
        self.flush_section();
        debug!("parsed {} sections", self.sections.len());
        (self.sections, self.degraded_tables)
    }

    fn feed_line(&mut self, line: &str, next: Option<&str>) {
        let trimmed = line.trim();

        match self.open.mode() {
            // A fence inside a math block is math content.
            Mode::Math => {
                if trimmed == "$$" {
                    self.close_open_block();
                } else {
                    self.open.push_line(line);
                }
                return;
            }
            Mode::Code => {
                if trimmed.starts_with("```") {
                    self.close_open_block();
                } else {
                    self.open.push_line(line);
                }
                return;
            }
            Mode::Quote if quote_body(line).is_none() => self.close_open_block(),
            _ => {}
        }

        if trimmed == "$$" {
            self.close_open_block();
            self.open = OpenBlock::Math { lines: Vec::new() };
            return;
        }

        if let Some(inner) = single_line_display_math(trimmed) {
            self.close_open_block();
            self.push_block(ContentBlock::math(inner));
            return;
        }

        if trimmed.starts_with("```") {
            self.close_open_block();
            let language = trimmed.trim_start_matches('`').trim();
            self.open = OpenBlock::Code {
                language: (!language.is_empty()).then(|| language.to_string()),
                lines: Vec::new(),
            };
            return;
        }

        if trimmed.starts_with('#') {
            self.close_open_block();
            self.start_section(trimmed);
            return;
        }

        if line.contains('|') && quote_body(line).is_none() {
            self.feed_table_line(line, trimmed, next);
            return;
        }

        if let Some(body) = quote_body(line) {
            if self.open.mode() != Mode::Quote {
                self.close_open_block();
                self.open = OpenBlock::Quote { lines: Vec::new() };
            }
            self.open.push_line(body);
            return;
        }

        if trimmed.is_empty() {
            return;
        }

        if let Some(caps) = LIST_ITEM_RE.captures(line) {
            self.push_block(ContentBlock::list_item(caps[1].trim()));
            return;
        }

        if matches!(trimmed, "---" | "***" | "___") {
            self.push_block(ContentBlock::rule());
            return;
        }

        self.push_block(ContentBlock::paragraph(trimmed));
    }

    /// Tables need a separator-looking lookahead line to open and close as
    /// soon as the following line has no pipe.
    fn feed_table_line(&mut self, line: &str, trimmed: &str, next: Option<&str>) {
        if self.open.mode() == Mode::Table {
            self.open.push_line(line);
        } else if next.is_some_and(|n| n.contains('|') && n.contains('-')) {
            self.close_open_block();
            self.open = OpenBlock::Table {
                lines: vec![line.to_string()],
            };
        } else {
            self.push_block(ContentBlock::paragraph(trimmed));
            return;
        }

        if !next.is_some_and(|n| n.contains('|')) {
            self.close_open_block();
        }
    }

    fn start_section(&mut self, heading: &str) {
        let (level, title) = match HEADING_RE.captures(heading) {
            Some(caps) => (
                caps[1].len().min(u8::MAX as usize) as u8,
                caps[2].trim().to_string(),
            ),
            None => (1, heading.trim_start_matches('#').trim().to_string()),
        };
        self.flush_section();
        self.current = Section::new(title, level);
    }

    /// Sections without blocks are never emitted.
    fn flush_section(&mut self) {
        let section = std::mem::replace(&mut self.current, Section::introduction());
        if !section.blocks.is_empty() {
            self.sections.push(section);
        }
    }

    fn push_block(&mut self, block: ContentBlock) {
        self.current.blocks.push(block);
    }

    fn close_open_block(&mut self) {
        match std::mem::replace(&mut self.open, OpenBlock::None) {
            OpenBlock::None => {}
            OpenBlock::Code { language, lines } => {
                self.push_block(ContentBlock::code(lines.join("\n"), language));
            }
            OpenBlock::Math { lines } => self.push_block(ContentBlock::math(lines.join("\n"))),
            OpenBlock::Quote { lines } => {
                self.push_block(ContentBlock::blockquote(lines.join("\n")));
            }
            OpenBlock::Table { lines } => {
                let rows: Vec<&str> = lines.iter().map(String::as_str).collect();
                match parse_table(&rows) {
                    Some(table) => self.push_block(ContentBlock::table(lines.join("\n"), table)),
                    None => {
                        warn!("table without content rows, keeping {} lines as text", lines.len());
                        for row in &lines {
                            self.push_block(ContentBlock::paragraph(row.trim()));
                        }
                        self.degraded_tables.push(lines.join("\n"));
                    }
                }
            }
        }
    }
}

/// Text after one `>` and at most one following space.
fn quote_body(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// `$$ ... $$` written on a single line.
fn single_line_display_math(trimmed: &str) -> Option<&str> {
    let inner = trimmed.strip_prefix("$$")?.strip_suffix("$$")?;
    if inner.trim().is_empty() || inner.contains("$$") {
        return None;
    }
    Some(inner.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::markdown::types::{BlockKind, ParsedTable};
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Vec<Section> {
        MarkdownParser::new().parse(text)
    }

    fn only_blocks(text: &str) -> Vec<ContentBlock> {
        let sections = parse(text);
        assert_eq!(sections.len(), 1, "expected one section for {:?}", text);
        sections.into_iter().next().map(|s| s.blocks).unwrap_or_default()
    }

    #[test]
    fn test_pipe_line_without_separator_is_paragraph() {
        let blocks = only_blocks("A|B\nfoo");
        assert_eq!(
            blocks,
            vec![ContentBlock::paragraph("A|B"), ContentBlock::paragraph("foo")]
        );
    }

    #[test]
    fn test_table_with_separator() {
        let blocks = only_blocks("A|B\n---|---\n1|2");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Table);
        assert_eq!(
            blocks[0].table,
            Some(ParsedTable {
                headers: vec!["A".into(), "B".into()],
                rows: vec![vec!["1".into(), "2".into()]],
            })
        );
    }

    #[test]
    fn test_table_closes_on_line_without_pipe() {
        let blocks = only_blocks("| A | B |\n|---|---|\n| 1 | 2 |\nafter");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Table);
        assert_eq!(blocks[1], ContentBlock::paragraph("after"));
    }

    #[test]
    fn test_math_block() {
        let blocks = only_blocks("$$\nx^2\n$$");
        assert_eq!(blocks, vec![ContentBlock::math("x^2")]);
        assert!(blocks[0].is_math_block());
    }

    #[test]
    fn test_math_block_keeps_blank_lines_and_fences() {
        let blocks = only_blocks("$$\na\n\n```\nb\n$$");
        assert_eq!(blocks, vec![ContentBlock::math("a\n\n```\nb")]);
    }

    #[test]
    fn test_single_line_display_math() {
        let blocks = only_blocks("$$E = mc^2$$");
        assert_eq!(blocks, vec![ContentBlock::math("E = mc^2")]);
    }

    #[test]
    fn test_fenced_code_preserves_content() {
        let blocks = only_blocks("```rust\nfn main() {\n\n    let x = 1;\n}\n```");
        assert_eq!(
            blocks,
            vec![ContentBlock::code(
                "fn main() {\n\n    let x = 1;\n}",
                Some("rust".to_string())
            )]
        );
    }

    #[test]
    fn test_code_fence_without_language() {
        let blocks = only_blocks("```\n# not a heading\n| a | b |\n```");
        assert_eq!(blocks[0].language, None);
        assert_eq!(blocks[0].content, "# not a heading\n| a | b |");
    }

    #[test]
    fn test_unterminated_blocks_flush_at_eof() {
        assert_eq!(
            only_blocks("```python\nprint(1)"),
            vec![ContentBlock::code("print(1)", Some("python".into()))]
        );
        assert_eq!(only_blocks("$$\n\\frac{1}{2}"), vec![ContentBlock::math("\\frac{1}{2}")]);
        assert_eq!(only_blocks("> quoted"), vec![ContentBlock::blockquote("quoted")]);
    }

    #[test]
    fn test_headings_open_sections() {
        let sections = parse("intro text\n# One\npara\n### Three\n- item");
        let titles: Vec<_> = sections.iter().map(|s| (s.title.as_str(), s.level)).collect();
        assert_eq!(titles, vec![("Introduction", 1), ("One", 1), ("Three", 3)]);
        assert_eq!(sections[2].blocks, vec![ContentBlock::list_item("item")]);
    }

    #[test]
    fn test_empty_introduction_is_dropped() {
        let sections = parse("\n\n# Title\ntext");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Title");
    }

    #[test]
    fn test_heading_without_blocks_is_dropped() {
        let sections = parse("# Empty\n## Filled\ntext\n# Trailing");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Filled");
        assert_eq!(sections[0].level, 2);
    }

    #[test]
    fn test_blockquote_strips_marker() {
        let blocks = only_blocks(">  two spaces\n>tight\n> | pipe |\nafter");
        assert_eq!(
            blocks,
            vec![
                ContentBlock::blockquote(" two spaces\ntight\n| pipe |"),
                ContentBlock::paragraph("after"),
            ]
        );
    }

    #[test]
    fn test_blank_line_ends_blockquote() {
        let blocks = only_blocks("> one\n\n> two");
        assert_eq!(
            blocks,
            vec![ContentBlock::blockquote("one"), ContentBlock::blockquote("two")]
        );
    }

    #[test]
    fn test_list_items_and_rules() {
        let blocks = only_blocks("- dash\n* star\n12. ordered\n---\n***\n___\n**bold** text");
        let kinds: Vec<_> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::ListItem,
                BlockKind::ListItem,
                BlockKind::ListItem,
                BlockKind::Hr,
                BlockKind::Hr,
                BlockKind::Hr,
                BlockKind::Paragraph,
            ]
        );
        assert_eq!(blocks[2].content, "ordered");
        assert_eq!(blocks[6].content, "**bold** text");
    }

    #[test]
    fn test_scenario_document() {
        let input = "# Title\n\nHello **world** with $x^2$.\n\n| A | B |\n|---|---|\n| 1 | 2 |";
        let sections = parse(input);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Title");
        assert_eq!(sections[0].level, 1);
        let blocks = &sections[0].blocks;
        assert_eq!(blocks[0], ContentBlock::paragraph("Hello **world** with $x^2$."));
        let table = blocks[1].table.as_ref().expect("table");
        assert_eq!(table.headers, vec!["A", "B"]);
        assert_eq!(table.rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_code_round_trip() {
        let original = ContentBlock::code("let a = 1;\n\nlet b = 2;", Some("rust".into()));
        let source = format!(
            "```{}\n{}\n```",
            original.language.as_deref().unwrap_or(""),
            original.content
        );
        assert_eq!(only_blocks(&source), vec![original]);
    }

    #[test]
    fn test_separator_only_table_degrades() {
        let (sections, degraded) =
            MarkdownParser::new().parse_with_report("|---|---|\n|:-:|---|\ntext");
        assert_eq!(
            sections[0].blocks,
            vec![
                ContentBlock::paragraph("|---|---|"),
                ContentBlock::paragraph("|:-:|---|"),
                ContentBlock::paragraph("text"),
            ]
        );
        assert_eq!(degraded, vec!["|---|---|\n|:-:|---|".to_string()]);
    }

    #[test]
    fn test_crlf_input() {
        let blocks = only_blocks("$$\r\nx\r\n$$\r\ntext\r\n");
        assert_eq!(
            blocks,
            vec![ContentBlock::math("x"), ContentBlock::paragraph("text")]
        );
    }
}
