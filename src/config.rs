//! Scan configuration: what to look at and how hard to look.
//!
//! Values come from built-in defaults, optionally overridden by a
//! `.fixmap.toml` at the scan root, then by CLI flags.

use crate::errors::FixmapError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = ".fixmap.toml";

/// Default cap on file size handed to the detector. Oversized files are
/// skipped with a diagnostic; this is the explicit bound standing in for
/// pathological pattern-matching cost.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Default bound on directory recursion depth. Symlinks are never
/// followed, so together these make the walk finite even on hostile trees.
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// File extensions eligible for scanning.
    pub include_extensions: Vec<String>,
    /// Directory names pruned at every depth.
    pub exclude_dirs: Vec<String>,
    /// Glob patterns matched against the full file path; matching files
    /// are skipped.
    pub exclude_patterns: Vec<String>,
    /// Files larger than this many bytes are skipped with a diagnostic.
    pub max_file_size: u64,
    pub max_depth: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_extensions: [
                "js", "jsx", "ts", "tsx", "py", "json", "yaml", "yml", "toml", "sh", "bash",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            exclude_dirs: [
                ".git",
                "node_modules",
                "__pycache__",
                ".next",
                "dist",
                "build",
                "target",
                ".vscode",
                ".idea",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            exclude_patterns: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ScanConfig {
    /// Load configuration from a TOML file. Missing fields fall back to
    /// defaults; unknown fields are rejected.
    pub fn from_file(path: &Path) -> Result<Self, FixmapError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| FixmapError::Config {
            message: format!("{}: {e}", path.display()),
        })
    }

    /// Use `.fixmap.toml` under `root` when present, defaults otherwise.
    pub fn discover(root: &Path) -> Result<Self, FixmapError> {
        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            log::debug!("loading config from {}", candidate.display());
            Self::from_file(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}
