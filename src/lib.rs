//! # mdocx
//!
//! Markdown to Word (`.docx`) conversion with native LaTeX math.
//!
//! ## Pipeline
//!
//! 1. [`parse_markdown`] splits the input into sections of typed blocks.
//! 2. Inline and display math go through [`parse_latex_to_structure`],
//!    [`build_math_tree`] and [`render_to_docx_math`] to become OMML.
//! 3. The [`Exporter`] assembles the document model and packages it.
//!
//! ## Quick start
//!
//! ```no_run
//! use mdocx::{export_document, ExportOptions};
//!
//! let bytes = export_document("# Notes\n\nEuler: $e^{i\\pi} + 1 = 0$", &ExportOptions::default())
//!     .expect("export");
//! std::fs::write("notes.docx", bytes).expect("write");
//! ```
//!
//! Diagrams (` ```mermaid ` blocks) and image-mode math are rendered by
//! injected collaborators, see [`external`].

pub mod config;
pub mod core;
pub mod external;
pub mod utils;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{ChartTheme, ExportOptions, MathMode};
pub use crate::core::export::{
    export_bytes, export_document, DocumentPackager, DocxPackager, Exporter,
};
pub use crate::core::latex2omml::{
    build_math_tree, convert_latex_to_math, convert_latex_with_report, parse_latex_to_structure,
    parse_latex_with_report, render_to_docx_math, MathConversion, MathNode, MathWarning,
};
pub use crate::core::markdown::{parse_markdown, BlockKind, ContentBlock, ParsedTable, Section};
pub use utils::{Degradation, DegradationKind, ExportError, ExportReport, ExportResult};

pub use mdocx_ir as ir;
