//! Scan orchestration: walk, detect in parallel, classify, plan.
//!
//! Detection is a pure function of rules and file content, so files fan
//! out across the rayon pool with no shared mutable state; each worker
//! returns its own issue list and the collect step fans them back in.

use crate::classify::classify;
use crate::config::ScanConfig;
use crate::core::{Diagnostic, Issue, ScanReport, SkipReason};
use crate::detect::detect;
use crate::errors::FixmapError;
use crate::io::walker::FileWalker;
use crate::plan::build_plan;
use crate::rules::{RuleRegistry, DEFAULT_REGISTRY};
use chrono::Utc;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Per-file outcome: issues found, or a reason the file was skipped.
enum FileOutcome {
    Scanned(Vec<Issue>),
    Skipped(Diagnostic),
}

/// Scan `root` with the built-in rule registry.
pub fn scan(root: &Path, config: &ScanConfig) -> Result<ScanReport, FixmapError> {
    scan_with_registry(root, config, &DEFAULT_REGISTRY)
}

/// Scan `root` with a caller-provided registry. The root is validated up
/// front; everything after that recovers per file.
pub fn scan_with_registry(
    root: &Path,
    config: &ScanConfig,
    registry: &RuleRegistry,
) -> Result<ScanReport, FixmapError> {
    if !root.is_dir() {
        return Err(FixmapError::InvalidRoot {
            path: root.to_path_buf(),
            reason: if root.exists() {
                "not a directory".to_string()
            } else {
                "no such directory".to_string()
            },
        });
    }

    let files = FileWalker::from_config(root.to_path_buf(), config).walk();
    log::info!("scanning {} candidate files under {}", files.len(), root.display());

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|path| process_file(root, path, config, registry))
        .collect();

    let mut issues = Vec::new();
    let mut diagnostics = Vec::new();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Scanned(found) => issues.extend(found),
            FileOutcome::Skipped(diag) => {
                log::warn!("skipped {}: {}", diag.path.display(), diag.reason);
                diagnostics.push(diag);
            }
        }
    }

    let classified = classify(issues.clone());
    let plan = build_plan(&classified)?;

    Ok(ScanReport {
        root: root.to_path_buf(),
        generated_at: Utc::now(),
        issues,
        classified,
        plan,
        diagnostics,
    })
}

fn process_file(
    root: &Path,
    path: &Path,
    config: &ScanConfig,
    registry: &RuleRegistry,
) -> FileOutcome {
    let rel = relative_path(root, path);

    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            return FileOutcome::Skipped(Diagnostic::with_detail(
                rel,
                SkipReason::Unreadable,
                e.to_string(),
            ))
        }
    };
    if size > config.max_file_size {
        return FileOutcome::Skipped(Diagnostic::with_detail(
            rel,
            SkipReason::TooLarge,
            format!("{size} bytes (limit {})", config.max_file_size),
        ));
    }

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            return FileOutcome::Skipped(Diagnostic::with_detail(
                rel,
                SkipReason::Unreadable,
                e.to_string(),
            ))
        }
    };
    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(_) => return FileOutcome::Skipped(Diagnostic::new(rel, SkipReason::NonUtf8)),
    };

    FileOutcome::Scanned(detect(&rel, &content, registry))
}

fn relative_path(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}
