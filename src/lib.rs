// Export modules for library usage
pub mod classify;
pub mod cli;
pub mod config;
pub mod core;
pub mod detect;
pub mod errors;
pub mod io;
pub mod plan;
pub mod rules;
pub mod scanner;

// Re-export commonly used types
pub use crate::core::{
    Category, Diagnostic, FileKind, Issue, ScanReport, Severity, SkipReason,
};

pub use crate::classify::{classify, ClassifiedIssues, IssueSummary};
pub use crate::config::ScanConfig;
pub use crate::detect::detect;
pub use crate::errors::FixmapError;
pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};
pub use crate::io::walker::FileWalker;
pub use crate::plan::{build_plan, Phase, Plan, PlanSummary, RiskLevel, Subtask, Task};
pub use crate::rules::{Rule, RuleRegistry, RuleSpec, BUILTIN_RULES};
pub use crate::scanner::{scan, scan_with_registry};
