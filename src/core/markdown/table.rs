//! Pipe table parsing

use super::types::ParsedTable;

/// Parse accumulated pipe-table lines into headers and rows.
///
/// The separator row (`|---|:--:|`) is dropped wherever it appears. The
/// first remaining row becomes the header; returns `None` when nothing but
/// separators is left.
pub fn parse_table(lines: &[&str]) -> Option<ParsedTable> {
    let mut content = lines
        .iter()
        .filter(|line| !line.trim().is_empty() && !is_separator_row(line))
        .map(|line| split_row(line));

    let headers = content.next()?;
    let rows = content.collect();
    Some(ParsedTable { headers, rows })
}

/// A row made only of `-`, `:` and whitespace once pipes are removed.
pub fn is_separator_row(line: &str) -> bool {
    let stripped: String = line.chars().filter(|&c| c != '|').collect();
    stripped.contains('-')
        && stripped
            .chars()
            .all(|c| c == '-' || c == ':' || c.is_whitespace())
}

/// Split one row on `|`. The empty outer cells are dropped only when the
/// row is pipe-delimited on both ends, as in `| a | b |`.
pub fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let mut cells: Vec<&str> = trimmed.split('|').collect();
    let delimited = trimmed.len() > 1 && trimmed.starts_with('|') && trimmed.ends_with('|');
    if delimited && cells.len() >= 2 {
        cells.remove(0);
        cells.pop();
    }
    cells.into_iter().map(|cell| cell.trim().to_string()).collect()
}
