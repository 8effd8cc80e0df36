//! Recursive-descent LaTeX math parser
//!
//! Produces a flat-ish [`MathNode`] sequence: braces, fractions, radicals
//! and accents nest, while `^` and `_` are left as bare marker nodes for
//! [`build_math_tree`](super::tree::build_math_tree) to attach. Parsing never
//! fails; problems are collected as [`MathWarning`]s.

use std::fmt;

use log::debug;
use serde::Serialize;

use super::lexer::Cursor;
use super::symbols::{
    is_literal_char, lookup_symbol, ACCENTS, FONT_COMMANDS, FUNCTIONS, SPACING, TEXT_COMMANDS,
};

/// Nesting bound for groups and command arguments.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    /// Upright: digits, functions, operators.
    Plain,
    /// Variables.
    Italic,
}

/// Big operators that take limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NaryKind {
    Sum,
    Product,
    Coproduct,
    Integral,
    DoubleIntegral,
    ContourIntegral,
}

impl NaryKind {
    pub fn from_command(name: &str) -> Option<Self> {
        Some(match name {
            "sum" => NaryKind::Sum,
            "prod" => NaryKind::Product,
            "coprod" => NaryKind::Coproduct,
            "int" => NaryKind::Integral,
            "iint" => NaryKind::DoubleIntegral,
            "oint" => NaryKind::ContourIntegral,
            _ => return None,
        })
    }

    pub fn symbol(self) -> char {
        match self {
            NaryKind::Sum => '∑',
            NaryKind::Product => '∏',
            NaryKind::Coproduct => '∐',
            NaryKind::Integral => '∫',
            NaryKind::DoubleIntegral => '∬',
            NaryKind::ContourIntegral => '∮',
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            NaryKind::Integral | NaryKind::DoubleIntegral | NaryKind::ContourIntegral
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MathNode {
    Text {
        val: String,
        style: TextStyle,
    },
    /// Unrecognized command, kept with its backslash.
    Cmd {
        val: String,
    },
    Group {
        children: Vec<MathNode>,
    },
    Fraction {
        num: Vec<MathNode>,
        den: Vec<MathNode>,
    },
    Radical {
        #[serde(skip_serializing_if = "Option::is_none")]
        deg: Option<Vec<MathNode>>,
        children: Vec<MathNode>,
    },
    Sum {
        kind: NaryKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        sub: Option<Vec<MathNode>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        sup: Option<Vec<MathNode>>,
    },
    Limit {
        base: String,
        sub: Vec<MathNode>,
    },
    Accent {
        accent: char,
        children: Vec<MathNode>,
    },
    Script {
        base: Vec<MathNode>,
        #[serde(skip_serializing_if = "Option::is_none")]
        sub: Option<Vec<MathNode>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        sup: Option<Vec<MathNode>>,
    },
}

impl MathNode {
    pub fn plain(val: impl Into<String>) -> Self {
        MathNode::Text {
            val: val.into(),
            style: TextStyle::Plain,
        }
    }

    pub fn italic(val: impl Into<String>) -> Self {
        MathNode::Text {
            val: val.into(),
            style: TextStyle::Italic,
        }
    }
}

/// Problems found while parsing. All but `UnknownCommand` mean the
/// structure could not be trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathWarning {
    UnbalancedBrace { position: usize },
    UnclosedBracket { position: usize },
    MissingArgument { command: String },
    UnknownCommand { name: String },
    DepthExceeded,
}

impl MathWarning {
    pub fn is_structural(&self) -> bool {
        !matches!(self, MathWarning::UnknownCommand { .. })
    }
}

impl fmt::Display for MathWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathWarning::UnbalancedBrace { position } => {
                write!(f, "unbalanced brace at byte {}", position)
            }
            MathWarning::UnclosedBracket { position } => {
                write!(f, "unclosed '[' opened at byte {}", position)
            }
            MathWarning::MissingArgument { command } => {
                write!(f, "missing argument for \\{}", command)
            }
            MathWarning::UnknownCommand { name } => write!(f, "unknown command \\{}", name),
            MathWarning::DepthExceeded => {
                write!(f, "nesting deeper than {} levels", MAX_DEPTH)
            }
        }
    }
}

/// Parse LaTeX math into nodes, ignoring warnings.
pub fn parse_latex_to_structure(latex: &str) -> Vec<MathNode> {
    parse_latex_with_report(latex).0
}

/// Parse LaTeX math into nodes and the warnings raised on the way.
pub fn parse_latex_with_report(latex: &str) -> (Vec<MathNode>, Vec<MathWarning>) {
    LatexParser::new(latex).parse()
}

pub struct LatexParser<'a> {
    cursor: Cursor<'a>,
    depth: usize,
    warnings: Vec<MathWarning>,
}

impl<'a> LatexParser<'a> {
    pub fn new(src: &'a str) -> Self {
        LatexParser {
            cursor: Cursor::new(src),
            depth: 0,
            warnings: Vec::new(),
        }
    }

    pub fn parse(mut self) -> (Vec<MathNode>, Vec<MathWarning>) {
        let mut nodes = Vec::new();
        while !self.cursor.is_eof() {
            if let Some(node) = self.next_node() {
                nodes.push(node);
            }
        }
        (nodes, self.warnings)
    }

    fn warn(&mut self, warning: MathWarning) {
        debug!("latex: {}", warning);
        if warning != MathWarning::DepthExceeded || !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    /// Read one token. Always consumes at least one character when input
    /// remains; `None` means the token produces no node.
    fn next_node(&mut self) -> Option<MathNode> {
        if self.depth >= MAX_DEPTH {
            self.warn(MathWarning::DepthExceeded);
            self.cursor.advance();
            return None;
        }
        self.depth += 1;
        let node = self.read_token();
        self.depth -= 1;
        node
    }

    fn read_token(&mut self) -> Option<MathNode> {
        let c = self.cursor.peek()?;
        match c {
            '{' => {
                self.cursor.advance();
                Some(MathNode::Group {
                    children: self.read_until('}'),
                })
            }
            '}' => {
                self.warn(MathWarning::UnbalancedBrace {
                    position: self.cursor.position(),
                });
                self.cursor.advance();
                Some(MathNode::plain("}"))
            }
            '\\' => {
                self.cursor.advance();
                self.read_command()
            }
            '^' | '_' => {
                self.cursor.advance();
                Some(MathNode::plain(c))
            }
            c if c.is_ascii_digit() || c == '.' => {
                let number = self.cursor.read_while(|c| c.is_ascii_digit() || c == '.');
                Some(MathNode::plain(number))
            }
            c if is_literal_char(c) => {
                self.cursor.advance();
                Some(MathNode::plain(c))
            }
            c if c.is_whitespace() => {
                self.cursor.advance();
                None
            }
            c => {
                self.cursor.advance();
                Some(MathNode::italic(c))
            }
        }
    }

    /// Read nodes up to and including `close`.
    fn read_until(&mut self, close: char) -> Vec<MathNode> {
        let opened_at = self.cursor.position().saturating_sub(1);
        let mut nodes = Vec::new();
        loop {
            match self.cursor.peek() {
                None => {
                    self.warn(if close == ']' {
                        MathWarning::UnclosedBracket {
                            position: opened_at,
                        }
                    } else {
                        MathWarning::UnbalancedBrace {
                            position: opened_at,
                        }
                    });
                    break;
                }
                Some(c) if c == close => {
                    self.cursor.advance();
                    break;
                }
                Some(_) => {
                    if let Some(node) = self.next_node() {
                        nodes.push(node);
                    }
                }
            }
        }
        nodes
    }

    fn read_command(&mut self) -> Option<MathNode> {
        let name = self.cursor.read_command_name();
        if name.is_empty() {
            return Some(MathNode::Cmd { val: "\\".into() });
        }
        if name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            self.cursor.skip_whitespace();
        }

        match name {
            "left" | "right" => {
                self.cursor.eat('.');
                None
            }
            "frac" | "dfrac" | "tfrac" => {
                let num = self.read_argument(name);
                let den = self.read_argument(name);
                Some(MathNode::Fraction { num, den })
            }
            "sqrt" => {
                let deg = self.read_optional_bracket();
                let children = self.read_argument(name);
                Some(MathNode::Radical { deg, children })
            }
            "lim" => Some(MathNode::Limit {
                base: "lim".into(),
                sub: Vec::new(),
            }),
            _ => {
                if let Some(&accent) = ACCENTS.get(name) {
                    let children = self.read_argument(name);
                    Some(MathNode::Accent { accent, children })
                } else if let Some(kind) = NaryKind::from_command(name) {
                    Some(MathNode::Sum {
                        kind,
                        sub: None,
                        sup: None,
                    })
                } else if FUNCTIONS.contains(name) {
                    Some(MathNode::plain(name))
                } else if TEXT_COMMANDS.contains(name) {
                    let arg = self.read_argument(name);
                    Some(MathNode::plain(flatten_text(&arg)))
                } else if FONT_COMMANDS.contains(name) {
                    Some(MathNode::Group {
                        children: self.read_argument(name),
                    })
                } else if let Some(&space) = SPACING.get(name) {
                    (!space.is_empty()).then(|| MathNode::plain(space))
                } else if let Some(symbol) = lookup_symbol(name) {
                    Some(MathNode::plain(symbol))
                } else {
                    self.warn(MathWarning::UnknownCommand {
                        name: name.to_string(),
                    });
                    Some(MathNode::Cmd {
                        val: format!("\\{}", name),
                    })
                }
            }
        }
    }

    /// A braced group or a single token. A bare digit counts as one token,
    /// so `\frac12` reads `1` and `2`.
    fn read_argument(&mut self, command: &str) -> Vec<MathNode> {
        self.cursor.skip_whitespace();
        match self.cursor.peek() {
            None | Some('}') => {
                self.warn(MathWarning::MissingArgument {
                    command: command.to_string(),
                });
                Vec::new()
            }
            Some('{') => {
                self.cursor.advance();
                if self.depth >= MAX_DEPTH {
                    self.warn(MathWarning::DepthExceeded);
                    self.skip_group();
                    return Vec::new();
                }
                self.depth += 1;
                let nodes = self.read_until('}');
                self.depth -= 1;
                nodes
            }
            Some(c) if c.is_ascii_digit() => {
                self.cursor.advance();
                vec![MathNode::plain(c)]
            }
            Some(_) => self.next_node().into_iter().collect(),
        }
    }

    /// `[...]` after whitespace, if present.
    fn read_optional_bracket(&mut self) -> Option<Vec<MathNode>> {
        self.cursor.skip_whitespace();
        if !self.cursor.eat('[') {
            return None;
        }
        Some(self.read_until(']'))
    }

    /// Skip to the brace closing an already opened group.
    fn skip_group(&mut self) {
        let mut level = 1usize;
        while let Some(c) = self.cursor.advance() {
            match c {
                '\\' => {
                    self.cursor.advance();
                }
                '{' => level += 1,
                '}' => {
                    level -= 1;
                    if level == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}

/// Concatenate the text nodes of a group, dropping anything structural.
fn flatten_text(nodes: &[MathNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            MathNode::Text { val, .. } => out.push_str(val),
            MathNode::Group { children } => out.push_str(&flatten_text(children)),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_digit_grouping() {
        assert_eq!(parse_latex_to_structure("3.14"), vec![MathNode::plain("3.14")]);
    }

    #[test]
    fn test_fraction() {
        assert_eq!(
            parse_latex_to_structure("\\frac{1}{2}"),
            vec![MathNode::Fraction {
                num: vec![MathNode::plain("1")],
                den: vec![MathNode::plain("2")],
            }]
        );
    }

    #[test]
    fn test_fraction_with_bare_digits() {
        assert_eq!(
            parse_latex_to_structure("\\frac12"),
            vec![MathNode::Fraction {
                num: vec![MathNode::plain("1")],
                den: vec![MathNode::plain("2")],
            }]
        );
    }

    #[test]
    fn test_variables_are_italic() {
        assert_eq!(
            parse_latex_to_structure("x+y"),
            vec![
                MathNode::italic("x"),
                MathNode::plain("+"),
                MathNode::italic("y"),
            ]
        );
    }

    #[test]
    fn test_script_markers_stay_flat() {
        assert_eq!(
            parse_latex_to_structure("x^2"),
            vec![MathNode::italic("x"), MathNode::plain("^"), MathNode::plain("2")]
        );
    }

    #[test]
    fn test_sqrt_with_degree() {
        assert_eq!(
            parse_latex_to_structure("\\sqrt[3]{x}"),
            vec![MathNode::Radical {
                deg: Some(vec![MathNode::plain("3")]),
                children: vec![MathNode::italic("x")],
            }]
        );
        assert_eq!(
            parse_latex_to_structure("\\sqrt {x}"),
            vec![MathNode::Radical {
                deg: None,
                children: vec![MathNode::italic("x")],
            }]
        );
    }

    #[test]
    fn test_left_right_emit_nothing() {
        assert_eq!(
            parse_latex_to_structure("\\left( x \\right."),
            vec![
                MathNode::plain("("),
                MathNode::plain(" "),
                MathNode::italic("x"),
                MathNode::plain(" "),
            ]
        );
    }

    #[test]
    fn test_spacing_commands() {
        let nodes = parse_latex_to_structure("a\\,b\\!c\\quad d");
        assert_eq!(
            nodes,
            vec![
                MathNode::italic("a"),
                MathNode::plain(" "),
                MathNode::italic("b"),
                MathNode::italic("c"),
                MathNode::plain(" "),
                MathNode::italic("d"),
            ]
        );
    }

    #[test]
    fn test_functions_and_symbols() {
        assert_eq!(
            parse_latex_to_structure("\\sin\\alpha"),
            vec![MathNode::plain("sin"), MathNode::plain("α")]
        );
    }

    #[test]
    fn test_text_flattens_literal_content() {
        assert_eq!(
            parse_latex_to_structure("\\text{if }\\mathrm{d}"),
            vec![MathNode::plain("if "), MathNode::plain("d")]
        );
        assert_eq!(
            parse_latex_to_structure("\\text{a\\frac{1}{2}b}"),
            vec![MathNode::plain("ab")]
        );
    }

    #[test]
    fn test_operators_and_accents() {
        assert_eq!(
            parse_latex_to_structure("\\int\\vec{v}"),
            vec![
                MathNode::Sum {
                    kind: NaryKind::Integral,
                    sub: None,
                    sup: None,
                },
                MathNode::Accent {
                    accent: '\u{20D7}',
                    children: vec![MathNode::italic("v")],
                },
            ]
        );
        assert!(NaryKind::Integral.is_integral());
        assert!(!NaryKind::Product.is_integral());
    }

    #[test]
    fn test_unknown_command_is_kept() {
        let (nodes, warnings) = parse_latex_with_report("\\foo x");
        assert_eq!(
            nodes,
            vec![
                MathNode::Cmd {
                    val: "\\foo".into()
                },
                MathNode::italic("x"),
            ]
        );
        assert_eq!(
            warnings,
            vec![MathWarning::UnknownCommand { name: "foo".into() }]
        );
        assert!(!warnings[0].is_structural());
    }

    #[test]
    fn test_unbalanced_braces_are_reported() {
        let (_, warnings) = parse_latex_with_report("\\frac{1}{2");
        assert_eq!(warnings, vec![MathWarning::UnbalancedBrace { position: 8 }]);

        let (nodes, warnings) = parse_latex_with_report("a}");
        assert_eq!(nodes, vec![MathNode::italic("a"), MathNode::plain("}")]);
        assert!(warnings[0].is_structural());
    }

    #[test]
    fn test_missing_argument() {
        let (_, warnings) = parse_latex_with_report("\\frac{1}");
        assert_eq!(
            warnings,
            vec![MathWarning::MissingArgument {
                command: "frac".into()
            }]
        );
    }

    #[test]
    fn test_deep_nesting_is_bounded() {
        let source = format!("{}x{}", "{".repeat(500), "}".repeat(500));
        let (_, warnings) = parse_latex_with_report(&source);
        assert!(warnings.contains(&MathWarning::DepthExceeded));

        let source = "\\sqrt".repeat(500);
        let (_, warnings) = parse_latex_with_report(&source);
        assert!(warnings.iter().any(MathWarning::is_structural));
    }
}
