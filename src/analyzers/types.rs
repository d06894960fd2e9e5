//! Core types for analysis results.

use serde::{Deserialize, Serialize};

/// Severity levels for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Ordering weight used by the prioritizer (higher sorts first).
    pub fn weight(&self) -> u32 {
        match self {
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Finding categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Security,
    Performance,
    Quality,
    Documentation,
    TypeSafety,
    ParseError,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Security => "security",
            Category::Performance => "performance",
            Category::Quality => "quality",
            Category::Documentation => "documentation",
            Category::TypeSafety => "type_safety",
            Category::ParseError => "parse_error",
        }
    }

    /// Ordering weight used by the prioritizer (higher sorts first).
    pub fn weight(&self) -> u32 {
        match self {
            Category::Security => 4,
            Category::Performance => 3,
            Category::Quality => 2,
            Category::Documentation => 1,
            Category::TypeSafety | Category::ParseError => 0,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single detected concern, tied to a file and optionally a line.
///
/// Findings are created by detectors and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub file: String,
    pub category: Category,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
    pub suggestion: String,
    /// Detector confidence in [0, 1].
    pub confidence: f32,
}

impl Finding {
    pub fn new(
        file: &str,
        category: Category,
        severity: Severity,
        line: Option<usize>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            file: file.to_string(),
            category,
            severity,
            line,
            message: message.into(),
            suggestion: suggestion.into(),
            confidence: 0.8,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }
}

/// An immutable source file submitted for analysis.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
    /// Language name resolved from the extension ("python", "typescript",
    /// "unknown" for unrecognized extensions).
    pub language: String,
    pub line_count: usize,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>, language: &str) -> Self {
        let path = path.into();
        let content = content.into();
        let line_count = count_lines(&content);
        Self {
            path,
            content,
            language: language.to_string(),
            line_count,
        }
    }
}

/// Count logical lines: a trailing newline does not start a new line.
pub fn count_lines(content: &str) -> usize {
    if content.is_empty() {
        return 0;
    }
    content.lines().count()
}

/// Per-file cyclomatic-style complexity value (>= 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityMetric {
    pub file: String,
    pub value: f64,
}

/// Output of one detector run over one file.
#[derive(Debug, Clone, Default)]
pub struct FileAnalysis {
    pub findings: Vec<Finding>,
    /// Complexity for the file; None for files the engine does not analyze.
    pub complexity: Option<f64>,
}

impl FileAnalysis {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the single-finding result used when a file cannot be parsed.
    pub fn parse_failure(path: &str, line: usize, message: impl Into<String>) -> Self {
        Self {
            findings: vec![Finding::new(
                path,
                Category::ParseError,
                Severity::High,
                Some(line.max(1)),
                message,
                "Fix the syntax error so the file can be fully analyzed",
            )
            .with_confidence(1.0)],
            complexity: Some(1.0),
        }
    }
}
