//! Conversion stages: Markdown structure, LaTeX math, document assembly.

pub mod export;
pub mod latex2omml;
pub mod markdown;
