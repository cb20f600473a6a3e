//! Partitioning of detected issues by severity and category, plus the
//! summary statistics the planner and reporters consume.

use crate::core::{Category, Issue, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate statistics over the full issue set.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct IssueSummary {
    pub total_issues: usize,
    pub critical_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
    pub info_count: usize,
    pub total_hours: f64,
    /// Arithmetic mean of issue complexity; 0.0 when there are no issues.
    pub average_complexity: f64,
}

impl IssueSummary {
    pub fn severity_count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical_count,
            Severity::High => self.high_count,
            Severity::Medium => self.medium_count,
            Severity::Low => self.low_count,
            Severity::Info => self.info_count,
        }
    }
}

/// Issues grouped along both reporting dimensions. Every issue appears in
/// exactly one severity bucket and exactly one category bucket; the issue
/// set itself is owned here and only ever filtered into views.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClassifiedIssues {
    pub by_severity: BTreeMap<Severity, Vec<Issue>>,
    pub by_category: BTreeMap<Category, Vec<Issue>>,
    pub summary: IssueSummary,
}

impl ClassifiedIssues {
    pub fn severity_bucket(&self, severity: Severity) -> &[Issue] {
        self.by_severity.get(&severity).map_or(&[], Vec::as_slice)
    }

    pub fn category_bucket(&self, category: Category) -> &[Issue] {
        self.by_category.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Count of issues above the given complexity rating.
    pub fn count_complexity_above(&self, threshold: u8) -> usize {
        self.by_severity
            .values()
            .flatten()
            .filter(|i| i.complexity > threshold)
            .count()
    }
}

/// Group issues by severity and category and compute summary statistics.
/// Pure: the input order is preserved within each bucket.
pub fn classify(issues: Vec<Issue>) -> ClassifiedIssues {
    let total_issues = issues.len();
    let total_hours: f64 = issues.iter().map(|i| i.estimated_hours).sum();
    let average_complexity = if total_issues == 0 {
        0.0
    } else {
        issues.iter().map(|i| i.complexity as f64).sum::<f64>() / total_issues as f64
    };

    let mut summary = IssueSummary {
        total_issues,
        total_hours,
        average_complexity,
        ..Default::default()
    };

    let mut by_severity: BTreeMap<Severity, Vec<Issue>> = BTreeMap::new();
    let mut by_category: BTreeMap<Category, Vec<Issue>> = BTreeMap::new();

    for issue in issues {
        match issue.severity {
            Severity::Critical => summary.critical_count += 1,
            Severity::High => summary.high_count += 1,
            Severity::Medium => summary.medium_count += 1,
            Severity::Low => summary.low_count += 1,
            Severity::Info => summary.info_count += 1,
        }
        by_category
            .entry(issue.category)
            .or_default()
            .push(issue.clone());
        by_severity.entry(issue.severity).or_default().push(issue);
    }

    ClassifiedIssues {
        by_severity,
        by_category,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn issue(severity: Severity, category: Category, complexity: u8, hours: f64) -> Issue {
        Issue {
            file_path: "src/app.js".to_string(),
            line_number: 1,
            severity,
            category,
            title: "test issue".to_string(),
            description: String::new(),
            code_snippet: String::new(),
            suggested_fix: String::new(),
            complexity,
            estimated_hours: hours,
            requires_test: false,
        }
    }

    #[test]
    fn empty_set_has_zero_summary() {
        let classified = classify(vec![]);
        assert_eq!(classified.summary, IssueSummary::default());
        assert!(classified.by_severity.is_empty());
        assert!(classified.by_category.is_empty());
    }

    #[test]
    fn counts_and_totals() {
        let classified = classify(vec![
            issue(Severity::Critical, Category::Security, 8, 4.0),
            issue(Severity::Critical, Category::Security, 6, 2.0),
            issue(Severity::Low, Category::Maintainability, 1, 0.5),
        ]);
        let summary = &classified.summary;
        assert_eq!(summary.total_issues, 3);
        assert_eq!(summary.critical_count, 2);
        assert_eq!(summary.low_count, 1);
        assert_eq!(summary.high_count, 0);
        assert_eq!(summary.total_hours, 6.5);
        assert_eq!(summary.average_complexity, 5.0);
    }

    #[test]
    fn every_issue_lands_in_one_bucket_per_dimension() {
        let classified = classify(vec![
            issue(Severity::High, Category::Performance, 3, 1.0),
            issue(Severity::High, Category::Reliability, 2, 0.5),
            issue(Severity::Info, Category::Maintainability, 1, 0.5),
        ]);

        let severity_total: usize = classified.by_severity.values().map(Vec::len).sum();
        let category_total: usize = classified.by_category.values().map(Vec::len).sum();
        assert_eq!(severity_total, 3);
        assert_eq!(category_total, 3);
        assert_eq!(classified.severity_bucket(Severity::High).len(), 2);
        assert_eq!(classified.category_bucket(Category::Performance).len(), 1);
        assert!(classified.severity_bucket(Severity::Critical).is_empty());
    }

    #[test]
    fn complexity_threshold_count() {
        let classified = classify(vec![
            issue(Severity::Critical, Category::Security, 8, 4.0),
            issue(Severity::Medium, Category::Accessibility, 1, 0.2),
            issue(Severity::High, Category::Security, 7, 3.0),
        ]);
        assert_eq!(classified.count_complexity_above(6), 2);
    }
}
