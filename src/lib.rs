//! toolscout library
//!
//! Analyzes a tool's landing page through a capability-probing browser adapter and returns a
//! structured [`ToolProfile`].

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod errors;

pub use analyzer::ToolAnalyzer;
pub use config::{AnalyzeConfig, Config};
pub use errors::AnalysisError;
pub use toolscout_core_types::{CodeExample, DependencySet, ToolProfile};
