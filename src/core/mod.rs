use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::classify::ClassifiedIssues;
use crate::plan::Plan;

/// How urgent a finding is. Ordering is by urgency: `Critical` sorts first.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    /// All severities in priority order (most urgent first).
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What kind of problem a finding represents.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Security,
    Performance,
    Reliability,
    Maintainability,
    Accessibility,
    Testing,
    Compatibility,
}

impl Category {
    /// All categories in planning order. Task construction iterates this
    /// array so task numbering is stable across runs.
    pub const ALL: [Category; 7] = [
        Category::Security,
        Category::Performance,
        Category::Reliability,
        Category::Maintainability,
        Category::Accessibility,
        Category::Testing,
        Category::Compatibility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Security => "security",
            Category::Performance => "performance",
            Category::Reliability => "reliability",
            Category::Maintainability => "maintainability",
            Category::Accessibility => "accessibility",
            Category::Testing => "testing",
            Category::Compatibility => "compatibility",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Language group a file belongs to, derived from its extension. Each group
/// enables a different subset of detection rules.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// JavaScript/TypeScript sources, including JSX/TSX markup.
    Script,
    Python,
    /// Structured configuration formats (JSON, YAML, TOML).
    Config,
    Shell,
    Other,
}

impl FileKind {
    pub fn from_extension(ext: &str) -> Self {
        static EXTENSION_MAP: &[(&[&str], FileKind)] = &[
            (&["js", "jsx", "ts", "tsx", "mjs", "cjs"], FileKind::Script),
            (&["py"], FileKind::Python),
            (&["json", "yaml", "yml", "toml"], FileKind::Config),
            (&["sh", "bash"], FileKind::Shell),
        ];

        EXTENSION_MAP
            .iter()
            .find(|(exts, _)| exts.contains(&ext))
            .map(|(_, kind)| *kind)
            .unwrap_or(FileKind::Other)
    }

    pub fn from_path(path: &std::path::Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(FileKind::Other)
    }
}

/// A single detected occurrence of a rule pattern.
///
/// All rating fields are copied from the producing rule at detection time;
/// an issue never reads a rule again after creation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    /// Path relative to the scan root.
    pub file_path: String,
    /// 1-based line of the match start; 0 for file-level findings.
    pub line_number: usize,
    pub severity: Severity,
    pub category: Category,
    pub title: String,
    pub description: String,
    /// The offending line, trimmed. Empty for file-level findings.
    pub code_snippet: String,
    pub suggested_fix: String,
    pub complexity: u8,
    pub estimated_hours: f64,
    pub requires_test: bool,
}

/// Why a file was skipped during the scan.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Unreadable,
    NonUtf8,
    TooLarge,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::Unreadable => "unreadable",
            SkipReason::NonUtf8 => "non-utf8 content",
            SkipReason::TooLarge => "exceeds size limit",
        };
        write!(f, "{s}")
    }
}

/// Non-fatal record of a file the scan skipped. Surfaced alongside the
/// plan so skipped files are never silently dropped from reporting.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub reason: SkipReason,
    pub detail: Option<String>,
}

impl Diagnostic {
    pub fn new(path: PathBuf, reason: SkipReason) -> Self {
        Self {
            path,
            reason,
            detail: None,
        }
    }

    pub fn with_detail(path: PathBuf, reason: SkipReason, detail: String) -> Self {
        Self {
            path,
            reason,
            detail: Some(detail),
        }
    }
}

/// Complete result of one scan run: the flat issue list, its groupings,
/// the remediation plan built from them, and skip diagnostics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanReport {
    pub root: PathBuf,
    pub generated_at: DateTime<Utc>,
    pub issues: Vec<Issue>,
    pub classified: ClassifiedIssues,
    pub plan: Plan,
    pub diagnostics: Vec<Diagnostic>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_by_urgency() {
        assert!(Severity::Critical < Severity::High);
        assert!(Severity::High < Severity::Medium);
        assert!(Severity::Low < Severity::Info);
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
        let json = serde_json::to_string(&Category::Security).unwrap();
        assert_eq!(json, "\"security\"");
    }

    #[test]
    fn file_kind_from_extension() {
        assert_eq!(FileKind::from_extension("tsx"), FileKind::Script);
        assert_eq!(FileKind::from_extension("py"), FileKind::Python);
        assert_eq!(FileKind::from_extension("yml"), FileKind::Config);
        assert_eq!(FileKind::from_extension("bash"), FileKind::Shell);
        assert_eq!(FileKind::from_extension("rs"), FileKind::Other);
    }

    #[test]
    fn file_kind_from_path_without_extension() {
        assert_eq!(
            FileKind::from_path(std::path::Path::new("Makefile")),
            FileKind::Other
        );
    }
}
