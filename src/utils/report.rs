//! Degradation reporting for exports that succeeded with fallbacks.

use serde::Serialize;

/// Longest snippet kept in a record, in characters.
const SNIPPET_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DegradationKind {
    /// Math emitted as raw source text.
    MathFallback,
    /// Image mode was requested but rasterization failed.
    MathRasterFailed,
    /// A diagram block was replaced by an error label.
    DiagramFailed,
    /// Pipe-table lines kept as paragraphs.
    MalformedTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Degradation {
    pub kind: DegradationKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl Degradation {
    pub fn new(kind: DegradationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            snippet: None,
        }
    }

    pub fn with_snippet(mut self, source: &str) -> Self {
        let mut snippet: String = source.chars().take(SNIPPET_CHARS).collect();
        if source.chars().nth(SNIPPET_CHARS).is_some() {
            snippet.push('…');
        }
        self.snippet = Some(snippet);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub degradations: Vec<Degradation>,
}

impl ExportReport {
    pub fn push(&mut self, degradation: Degradation) {
        self.degradations.push(degradation);
    }

    pub fn is_empty(&self) -> bool {
        self.degradations.is_empty()
    }

    pub fn count(&self, kind: DegradationKind) -> usize {
        self.degradations.iter().filter(|d| d.kind == kind).count()
    }
}
