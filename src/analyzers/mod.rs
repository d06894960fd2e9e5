//! Language detector registry and dispatch.
//!
//! This module provides:
//! - `Detector` trait: a pure, per-file analysis unit
//! - a factory-based registry mapping file extensions to detectors
//! - a no-op detector for unrecognized extensions
//!
//! Detectors come in two families: tree-walking detectors backed by a
//! tree-sitter grammar (see `treesitter`), and line-oriented text-pattern
//! detectors for languages the engine has no grammar for (see `patterns`).

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

pub mod languages;
pub mod patterns;
pub mod treesitter;
mod types;

pub use types::{
    count_lines, Category, ComplexityMetric, FileAnalysis, Finding, Severity, SourceFile,
};

/// A language-specific analysis unit.
///
/// `analyze` is a pure function of its single-file input: no shared state,
/// safe to run in parallel across files. Implementations must never panic
/// or return an error past the file boundary - internal failures are
/// converted into a single parse-error finding for that file.
pub trait Detector: Send + Sync {
    /// Language this detector handles (e.g. "python", "typescript").
    fn language(&self) -> &'static str;

    /// Analyze one file, returning findings and a complexity value.
    fn analyze(&self, path: &str, content: &str) -> FileAnalysis;
}

/// Factory function type for creating detector instances.
pub type DetectorFactory = fn() -> Box<dyn Detector>;

lazy_static::lazy_static! {
    /// Global detector registry mapping file extensions to factories.
    static ref REGISTRY: RwLock<HashMap<String, DetectorFactory>> = RwLock::new(HashMap::new());
}

/// Register a detector factory for a file extension.
/// Extension should include the dot (e.g. ".py", ".ts").
pub fn register(ext: &str, factory: DetectorFactory) {
    let mut registry = REGISTRY.write().unwrap();
    registry.insert(ext.to_string(), factory);
}

/// Resolve the detector for a file path. Unrecognized extensions map to the
/// no-op detector, which contributes file/line totals but no findings.
pub fn detector_for_path(path: &str) -> Box<dyn Detector> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let registry = REGISTRY.read().unwrap();
    match registry.get(&ext) {
        Some(factory) => factory(),
        None => Box::new(NoopDetector),
    }
}

/// Language name for a file path, "unknown" when no detector is registered.
pub fn language_for_path(path: &str) -> String {
    detector_for_path(path).language().to_string()
}

/// Return all registered file extensions.
pub fn supported_extensions() -> Vec<String> {
    let registry = REGISTRY.read().unwrap();
    registry.keys().cloned().collect()
}

/// Initialize the registry with all available detectors.
/// Call once at startup before dispatching files.
pub fn register_all() {
    languages::register_all();
    patterns::register_all();
}

/// Detector for unrecognized extensions: produces no findings, no
/// complexity, and no error.
pub struct NoopDetector;

impl Detector for NoopDetector {
    fn language(&self) -> &'static str {
        "unknown"
    }

    fn analyze(&self, _path: &str, _content: &str) -> FileAnalysis {
        FileAnalysis::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDetector;

    impl Detector for MockDetector {
        fn language(&self) -> &'static str {
            "mock"
        }

        fn analyze(&self, path: &str, _content: &str) -> FileAnalysis {
            FileAnalysis {
                findings: vec![Finding::new(
                    path,
                    Category::Quality,
                    Severity::Low,
                    Some(1),
                    "mock finding",
                    "none",
                )],
                complexity: Some(1.0),
            }
        }
    }

    fn mock_factory() -> Box<dyn Detector> {
        Box::new(MockDetector)
    }

    #[test]
    fn test_registry_dispatch() {
        register(".mock", mock_factory);

        let detector = detector_for_path("src/thing.mock");
        assert_eq!(detector.language(), "mock");

        let analysis = detector.analyze("src/thing.mock", "content");
        assert_eq!(analysis.findings.len(), 1);
    }

    #[test]
    fn test_unknown_extension_is_noop() {
        let detector = detector_for_path("binary.xyzzy");
        assert_eq!(detector.language(), "unknown");

        let analysis = detector.analyze("binary.xyzzy", "anything at all");
        assert!(analysis.findings.is_empty());
        assert!(analysis.complexity.is_none());
    }

    #[test]
    fn test_no_extension_is_noop() {
        let detector = detector_for_path("Makefile");
        assert_eq!(detector.language(), "unknown");
    }
}
