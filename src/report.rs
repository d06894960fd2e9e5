//! Analysis report assembly.
//!
//! Combines per-file detector output into the final immutable report:
//! summary totals, prioritized findings, complexity metrics,
//! recommendations, critical areas, and the technical-debt estimate.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::analyzers::{ComplexityMetric, FileAnalysis, Finding, SourceFile};
use crate::debt::{self, TechnicalDebt};
use crate::priority;
use crate::score;

/// Aggregate totals for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_files: usize,
    pub total_lines: usize,
    /// Languages detected across the submission (sorted for determinism).
    pub languages: BTreeSet<String>,
    /// Aggregate health score in [0, 100].
    pub quality_score: f64,
}

/// The full analysis report. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: AnalysisSummary,
    /// Findings in priority order.
    pub findings: Vec<Finding>,
    pub metrics: Vec<ComplexityMetric>,
    pub recommendations: Vec<String>,
    pub critical_areas: Vec<String>,
    pub technical_debt: TechnicalDebt,
}

/// Assemble the report from per-file results. `files` and `analyses` are
/// index-aligned (one analysis per submitted file).
pub fn build_report(files: &[SourceFile], analyses: &[FileAnalysis]) -> AnalysisReport {
    debug_assert_eq!(files.len(), analyses.len());

    let mut findings: Vec<Finding> = Vec::new();
    let mut metrics: Vec<ComplexityMetric> = Vec::new();
    let mut languages = BTreeSet::new();
    let mut total_lines = 0;

    for (file, analysis) in files.iter().zip(analyses.iter()) {
        total_lines += file.line_count;
        if file.language != "unknown" {
            languages.insert(file.language.clone());
        }
        findings.extend(analysis.findings.iter().cloned());
        if let Some(value) = analysis.complexity {
            metrics.push(ComplexityMetric {
                file: file.path.clone(),
                value,
            });
        }
    }

    let quality_score = score::quality_score(&findings, &metrics);
    let recommendations = debt::recommendations(&findings);
    let critical_areas = debt::critical_areas(&findings);
    let technical_debt = debt::estimate_debt(&findings);
    let findings = priority::prioritize(findings);

    AnalysisReport {
        summary: AnalysisSummary {
            total_files: files.len(),
            total_lines,
            languages,
            quality_score,
        },
        findings,
        metrics,
        recommendations,
        critical_areas,
        technical_debt,
    }
}
