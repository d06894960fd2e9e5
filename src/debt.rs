//! Recommendations, critical areas, and technical-debt estimation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analyzers::{Category, Finding, Severity};

/// Maximum number of recommendations in a report.
pub const MAX_RECOMMENDATIONS: usize = 8;

/// Maximum number of critical-area entries in a report.
pub const MAX_CRITICAL_AREAS: usize = 5;

/// Per-category threshold before a recommendation fires.
mod thresholds {
    pub const PERFORMANCE: usize = 2;
    pub const QUALITY: usize = 5;
    pub const DOCUMENTATION: usize = 3;
}

/// Base remediation hours per finding severity.
fn base_hours(severity: Severity) -> f64 {
    match severity {
        Severity::High => 4.0,
        Severity::Medium => 2.0,
        Severity::Low => 0.5,
    }
}

/// Category multiplier applied on top of the severity base.
fn category_multiplier(category: Category) -> f64 {
    match category {
        Category::Security => 2.0,
        Category::Performance => 1.5,
        Category::Quality => 1.0,
        Category::Documentation => 0.5,
        _ => 1.0,
    }
}

/// Estimated remediation effort for a finding set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalDebt {
    /// Weighted sum over all findings.
    pub total_hours: f64,
    /// `total_hours / 8`.
    pub total_days: f64,
    /// Simplified rollup: 4 hours per high-severity finding. Kept
    /// independent of the weighted sum, so the two figures can disagree.
    pub priority_hours: f64,
}

/// Estimate technical debt from the finding list.
pub fn estimate_debt(findings: &[Finding]) -> TechnicalDebt {
    let total_hours: f64 = findings
        .iter()
        .map(|f| base_hours(f.severity) * category_multiplier(f.category))
        .sum();

    let high_count = findings
        .iter()
        .filter(|f| f.severity == Severity::High)
        .count();

    TechnicalDebt {
        total_hours,
        total_days: total_hours / 8.0,
        priority_hours: 4.0 * high_count as f64,
    }
}

/// Derive human-facing recommendations from per-category counts.
/// Most urgent first, capped at `MAX_RECOMMENDATIONS`.
pub fn recommendations(findings: &[Finding]) -> Vec<String> {
    let mut counts: HashMap<Category, usize> = HashMap::new();
    for f in findings {
        *counts.entry(f.category).or_insert(0) += 1;
    }
    let count = |c: Category| counts.get(&c).copied().unwrap_or(0);

    let mut out = Vec::new();
    if count(Category::Security) > 0 {
        out.push(
            "Address security findings immediately: hardcoded credentials and dynamic \
             code evaluation are exploitable"
                .to_string(),
        );
    }
    if count(Category::Performance) > thresholds::PERFORMANCE {
        out.push(
            "Review hot paths: nested loops and repeated accumulation suggest avoidable \
             quadratic work"
                .to_string(),
        );
    }
    if count(Category::Quality) > thresholds::QUALITY {
        out.push(
            "Refactor oversized functions and long parameter lists to improve \
             maintainability"
                .to_string(),
        );
    }
    if count(Category::Documentation) > thresholds::DOCUMENTATION {
        out.push("Document public functions and types to ease onboarding".to_string());
    }

    if out.is_empty() {
        out.push("Code looks healthy; keep up current practices".to_string());
    }
    out.truncate(MAX_RECOMMENDATIONS);
    out
}

/// List files that concentrate high-severity findings, plus a general
/// security entry when any security finding exists. Capped at
/// `MAX_CRITICAL_AREAS` overall.
pub fn critical_areas(findings: &[Finding]) -> Vec<String> {
    let mut high_per_file: HashMap<&str, usize> = HashMap::new();
    for f in findings {
        if f.severity == Severity::High {
            *high_per_file.entry(f.file.as_str()).or_insert(0) += 1;
        }
    }

    let mut hot: Vec<(&str, usize)> = high_per_file
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .collect();
    hot.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    // The general security entry always appears when a security finding
    // exists, so it gets a reserved slot under the cap.
    let has_security = findings.iter().any(|f| f.category == Category::Security);
    let file_cap = if has_security {
        MAX_CRITICAL_AREAS - 1
    } else {
        MAX_CRITICAL_AREAS
    };

    let mut out: Vec<String> = hot
        .into_iter()
        .take(file_cap)
        .map(|(file, _)| format!("{} — multiple high-severity issues", file))
        .collect();

    if has_security {
        out.push("Security review required before release".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(file: &str, category: Category, severity: Severity) -> Finding {
        Finding::new(file, category, severity, Some(1), "test", "none")
    }

    #[test]
    fn test_debt_weighted_sum() {
        let findings = vec![
            finding("a.py", Category::Security, Severity::High), // 4 * 2.0 = 8
            finding("a.py", Category::Performance, Severity::Medium), // 2 * 1.5 = 3
            finding("a.py", Category::Documentation, Severity::Low), // 0.5 * 0.5 = 0.25
        ];
        let debt = estimate_debt(&findings);
        assert_eq!(debt.total_hours, 11.25);
        assert_eq!(debt.total_days, 11.25 / 8.0);
    }

    #[test]
    fn test_priority_hours_independent_of_weighted_sum() {
        let findings = vec![
            finding("a.py", Category::Security, Severity::High),
            finding("b.py", Category::Documentation, Severity::High),
        ];
        let debt = estimate_debt(&findings);
        // Weighted: 4*2.0 + 4*0.5 = 10; rollup: 4 * 2 = 8. They disagree
        // on purpose.
        assert_eq!(debt.total_hours, 10.0);
        assert_eq!(debt.priority_hours, 8.0);
    }

    #[test]
    fn test_security_recommendation_first() {
        let findings = vec![
            finding("a.py", Category::Documentation, Severity::Low),
            finding("a.py", Category::Documentation, Severity::Low),
            finding("a.py", Category::Documentation, Severity::Low),
            finding("a.py", Category::Documentation, Severity::Low),
            finding("a.py", Category::Security, Severity::High),
        ];
        let recs = recommendations(&findings);
        assert!(recs[0].contains("security"));
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn test_positive_message_when_clean() {
        let recs = recommendations(&[]);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("healthy"));
    }

    #[test]
    fn test_performance_threshold_is_strict() {
        let two = vec![
            finding("a.py", Category::Performance, Severity::Medium),
            finding("a.py", Category::Performance, Severity::Medium),
        ];
        assert!(recommendations(&two)[0].contains("healthy"));

        let mut three = two;
        three.push(finding("b.py", Category::Performance, Severity::Medium));
        assert!(recommendations(&three)[0].contains("hot paths"));
    }

    #[test]
    fn test_critical_areas_need_two_highs() {
        let findings = vec![
            finding("one.py", Category::Quality, Severity::High),
            finding("two.py", Category::Quality, Severity::High),
            finding("two.py", Category::Quality, Severity::High),
        ];
        let areas = critical_areas(&findings);
        assert_eq!(areas.len(), 1);
        assert!(areas[0].starts_with("two.py"));
    }

    #[test]
    fn test_security_adds_general_area() {
        let findings = vec![finding("a.py", Category::Security, Severity::Medium)];
        let areas = critical_areas(&findings);
        assert_eq!(areas.len(), 1);
        assert!(areas[0].contains("Security review"));
    }

    #[test]
    fn test_security_entry_survives_cap() {
        let mut findings = Vec::new();
        for i in 0..6 {
            let file = format!("file{}.py", i);
            findings.push(finding(&file, Category::Security, Severity::High));
            findings.push(finding(&file, Category::Security, Severity::High));
        }
        let areas = critical_areas(&findings);
        assert_eq!(areas.len(), MAX_CRITICAL_AREAS);
        assert!(areas.last().unwrap().contains("Security review"));
    }

    #[test]
    fn test_critical_areas_capped() {
        let mut findings = Vec::new();
        for i in 0..8 {
            let file = format!("file{}.py", i);
            findings.push(finding(&file, Category::Quality, Severity::High));
            findings.push(finding(&file, Category::Quality, Severity::High));
        }
        findings.push(finding("x.py", Category::Security, Severity::High));
        let areas = critical_areas(&findings);
        assert_eq!(areas.len(), MAX_CRITICAL_AREAS);
    }
}
