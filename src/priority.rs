//! Issue prioritization.
//!
//! Reorders the finding list by a composite severity/category key. The
//! sort is stable and the output is always a permutation of the input:
//! nothing is dropped, merged, or invented, and ties keep detection order.

use crate::analyzers::Finding;

/// Composite priority key: severity dominates, category breaks ties.
pub fn priority_key(finding: &Finding) -> u32 {
    finding.severity.weight() * 10 + finding.category.weight()
}

/// Stable-sort findings by descending priority key.
pub fn prioritize(mut findings: Vec<Finding>) -> Vec<Finding> {
    findings.sort_by_key(|f| std::cmp::Reverse(priority_key(f)));
    findings
}
