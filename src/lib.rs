//! Codepulse - asynchronous code quality analysis engine.
//!
//! Codepulse inspects a submitted set of source files, runs per-language
//! detectors over them, and produces a quality report: prioritized
//! findings, a 0-100 quality score, recommendations, and a technical-debt
//! estimate. Each analysis runs as an asynchronous job with observable
//! progress, and finished jobs expose a retrieval index for answering
//! follow-up questions about the analyzed code.
//!
//! # Architecture
//!
//! - `analyzers`: detector registry and the per-language detectors
//!   (tree-sitter AST walkers and line-pattern scanners)
//! - `score`: quality score calculation
//! - `priority`: severity/category ordering of findings
//! - `debt`: recommendations and technical-debt estimation
//! - `report`: report assembly
//! - `index`: chunk-based retrieval index and context packing
//! - `job`: job state machine, store, and the async engine
//!
//! # Adding a New Language
//!
//! See `src/analyzers/languages/` for tree-sitter based detectors and
//! `src/analyzers/patterns.rs` for pattern-table detectors. Register the
//! extension mapping in the respective `register_all`.

pub mod analyzers;
pub mod cli;
pub mod config;
pub mod debt;
pub mod errors;
pub mod index;
pub mod job;
pub mod priority;
pub mod report;
pub mod score;

pub use config::EngineOptions;
pub use errors::AnalysisError;
pub use job::{AnalysisEngine, JobStatus};
pub use report::AnalysisReport;

/// Register all built-in detectors. Call once at startup; safe to call
/// again (re-registration overwrites identically).
pub fn init() {
    analyzers::register_all();
}
