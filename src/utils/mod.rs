//! Utility modules
//!
//! - Error types and result types
//! - Degradation reporting

pub mod error;
pub mod report;

// Re-export commonly used items
pub use error::{ExportError, ExportResult};
pub use report::{Degradation, DegradationKind, ExportReport};
