//! Unified error type for fixmap operations.
//!
//! Fatal errors only: invalid configuration before a scan starts, and
//! planning-template defects. Per-file problems are never errors; they
//! surface as diagnostics on the scan report instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixmapError {
    /// The scan root does not exist or is not a directory.
    #[error("invalid scan root {}: {reason}", path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    /// Malformed configuration file or value.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Defect in the fixed phase template: an unknown or forward task
    /// dependency, or a dependency cycle. Indicates a programming bug,
    /// not bad scan input.
    #[error("planning template error: {message}")]
    PlanTemplate { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_with_context() {
        let err = FixmapError::InvalidRoot {
            path: PathBuf::from("/missing"),
            reason: "no such directory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid scan root /missing: no such directory"
        );
    }
}
