//! LaTeX math to OMML primitives
//!
//! Three stages, each usable on its own:
//! - [`parse_latex_to_structure`]: recursive-descent parse into [`MathNode`]s
//! - [`build_math_tree`]: attach sub/superscripts and limits
//! - [`render_to_docx_math`]: lower to [`MathPrimitive`]s
//!
//! [`convert_latex_to_math`] composes them and never fails: input whose
//! structure cannot be trusted falls back to a single literal run.

pub mod lexer;
pub mod parser;
pub mod render;
pub mod symbols;
pub mod tree;

use log::warn;
use mdocx_ir::MathPrimitive;

pub use parser::{
    parse_latex_to_structure, parse_latex_with_report, MathNode, MathWarning, NaryKind, TextStyle,
};
pub use render::render_to_docx_math;
pub use tree::build_math_tree;

/// Result of a native math conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathConversion {
    pub primitives: Vec<MathPrimitive>,
    /// True when the source was emitted verbatim instead of structured.
    pub fell_back: bool,
}

/// Convert LaTeX math into native primitives. Never returns an empty list.
pub fn convert_latex_to_math(latex: &str) -> Vec<MathPrimitive> {
    convert_latex_with_report(latex).primitives
}

pub fn convert_latex_with_report(latex: &str) -> MathConversion {
    if latex.trim().is_empty() {
        return MathConversion {
            primitives: vec![MathPrimitive::blank()],
            fell_back: false,
        };
    }

    let (nodes, warnings) = parse_latex_with_report(latex);

    if let Some(problem) = warnings.iter().find(|w| w.is_structural()) {
        warn!("math fallback to raw source ({}): {}", problem, latex);
        return MathConversion {
            primitives: vec![MathPrimitive::plain(latex)],
            fell_back: true,
        };
    }

    let mut primitives = render_to_docx_math(&build_math_tree(nodes));
    if primitives.is_empty() {
        primitives.push(MathPrimitive::blank());
    }
    MathConversion {
        primitives,
        fell_back: false,
    }
}

/// Resolved math tree, as printed by `mdocx math`.
pub fn resolve_latex(latex: &str) -> Vec<MathNode> {
    build_math_tree(parse_latex_to_structure(latex))
}
