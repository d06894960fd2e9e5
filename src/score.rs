//! Quality score aggregation.
//!
//! Turns the full finding list plus per-file complexity values into a
//! 0-100 health score. Pure and deterministic: the same inputs always
//! produce the same score, and empty input scores exactly 100.

use crate::analyzers::{ComplexityMetric, Finding, Severity};

/// Score deductions per finding severity.
pub mod deductions {
    pub const HIGH: f64 = 15.0;
    pub const MEDIUM: f64 = 8.0;
    pub const LOW: f64 = 3.0;
}

/// Average-complexity penalty thresholds.
pub mod complexity_penalty {
    pub const HEAVY_THRESHOLD: f64 = 10.0;
    pub const HEAVY: f64 = 10.0;
    pub const MODERATE_THRESHOLD: f64 = 5.0;
    pub const MODERATE: f64 = 5.0;
}

fn deduction(severity: Severity) -> f64 {
    match severity {
        Severity::High => deductions::HIGH,
        Severity::Medium => deductions::MEDIUM,
        Severity::Low => deductions::LOW,
    }
}

/// Calculate the aggregate quality score.
///
/// Starts at 100, subtracts per-severity deductions for every finding,
/// applies a penalty when average file complexity is elevated, then clamps
/// to [0, 100]. All deductions are summed before clamping.
pub fn quality_score(findings: &[Finding], metrics: &[ComplexityMetric]) -> f64 {
    let mut score = 100.0;

    for finding in findings {
        score -= deduction(finding.severity);
    }

    if !metrics.is_empty() {
        let avg = metrics.iter().map(|m| m.value).sum::<f64>() / metrics.len() as f64;
        if avg > complexity_penalty::HEAVY_THRESHOLD {
            score -= complexity_penalty::HEAVY;
        } else if avg > complexity_penalty::MODERATE_THRESHOLD {
            score -= complexity_penalty::MODERATE;
        }
    }

    score.clamp(0.0, 100.0)
}
