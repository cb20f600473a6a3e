//! Candidate-file enumeration under a scan root.
//!
//! Filtering is a pure predicate over the entry: excluded directory names
//! are pruned at every depth, dot-files are skipped, and only allow-listed
//! extensions (or exact file names some rules need) pass. Symlinks are not
//! followed and depth is bounded, so the walk is finite even when the tree
//! contains link cycles.

use crate::config::ScanConfig;
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub struct FileWalker {
    root: PathBuf,
    filters: FilterSet,
    max_depth: usize,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        let defaults = ScanConfig::default();
        Self::from_config(root, &defaults)
    }

    pub fn from_config(root: PathBuf, config: &ScanConfig) -> Self {
        Self {
            root,
            filters: FilterSet {
                extensions: config.include_extensions.iter().cloned().collect(),
                excluded_dirs: config.exclude_dirs.iter().cloned().collect(),
                exclude_patterns: compile_patterns(&config.exclude_patterns),
            },
            max_depth: config.max_depth,
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.filters.extensions = extensions.into_iter().collect();
        self
    }

    pub fn with_excluded_dirs(mut self, dirs: Vec<String>) -> Self {
        self.filters.excluded_dirs = dirs.into_iter().collect();
        self
    }

    pub fn with_exclude_patterns(mut self, patterns: &[String]) -> Self {
        self.filters.exclude_patterns = compile_patterns(patterns);
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Whether the walk should descend into or emit this path. The same
    /// predicate backs the `filter_entry` closure in `iter`.
    pub fn should_visit(&self, path: &Path) -> bool {
        self.filters.should_visit(path)
    }

    /// Lazy enumeration of candidate files in directory-traversal order.
    /// Unreadable entries are skipped, not fatal.
    pub fn iter(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false)
            .max_depth(Some(self.max_depth))
            .filter_entry({
                let filters = self.filters.clone();
                // The root itself always passes, even when dot-named.
                move |entry| entry.depth() == 0 || filters.should_visit(entry.path())
            })
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.into_path())
    }

    /// All candidate files, sorted for deterministic scan output.
    pub fn walk(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.iter().collect();
        files.sort();
        files
    }
}

fn compile_patterns(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                log::warn!("ignoring invalid exclude pattern '{p}': {e}");
                None
            }
        })
        .collect()
}

/// Filter state shared by the public predicate and the walk closure, which
/// takes an owned clone because `filter_entry` requires `'static`.
#[derive(Clone)]
struct FilterSet {
    extensions: BTreeSet<String>,
    excluded_dirs: BTreeSet<String>,
    exclude_patterns: Vec<glob::Pattern>,
}

impl FilterSet {
    fn should_visit(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if name.starts_with('.') {
            return false;
        }
        if path.is_dir() {
            return !self.excluded_dirs.contains(name);
        }
        let allowed = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(ext))
            .unwrap_or(false);
        allowed
            && !self
                .exclude_patterns
                .iter()
                .any(|p| p.matches(&path.to_string_lossy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x\n").unwrap();
    }

    #[test]
    fn filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("app.js"));
        touch(&dir.path().join("readme.txt"));
        touch(&dir.path().join("binary"));

        let files = FileWalker::new(dir.path().to_path_buf()).walk();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["app.js"]);
    }

    #[test]
    fn excluded_dirs_pruned_at_every_depth() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("src/app.js"));
        touch(&dir.path().join("src/node_modules/dep/index.js"));
        touch(&dir.path().join("node_modules/other/index.js"));

        let files = FileWalker::new(dir.path().to_path_buf()).walk();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/app.js"));
    }

    #[test]
    fn dot_files_and_dot_dirs_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join(".hidden.js"));
        touch(&dir.path().join(".cache/a.js"));
        touch(&dir.path().join("visible.js"));

        let files = FileWalker::new(dir.path().to_path_buf()).walk();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("visible.js"));
    }

    #[test]
    fn walk_is_sorted_and_restartable() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.py"));
        touch(&dir.path().join("a.py"));

        let walker = FileWalker::new(dir.path().to_path_buf());
        let first = walker.walk();
        let second = walker.walk();
        assert_eq!(first, second);
        assert!(first[0].ends_with("a.py"));
        assert!(first[1].ends_with("b.py"));
    }

    #[test]
    fn depth_bound_is_respected() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("one/two/three/deep.js"));
        touch(&dir.path().join("shallow.js"));

        let files = FileWalker::new(dir.path().to_path_buf())
            .with_max_depth(2)
            .walk();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("shallow.js"));
    }

    #[test]
    fn public_predicate_agrees_with_walk_results() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.js"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("vendored.min.js"));

        let walker = FileWalker::new(dir.path().to_path_buf())
            .with_exclude_patterns(&["*.min.js".to_string()]);
        for path in walker.walk() {
            assert!(walker.should_visit(&path), "{} emitted but rejected", path.display());
        }
        assert!(!walker.should_visit(&dir.path().join("notes.txt")));
        assert!(!walker.should_visit(&dir.path().join("vendored.min.js")));
    }

    #[test]
    fn exclude_patterns_drop_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("app.js"));
        touch(&dir.path().join("app.min.js"));
        touch(&dir.path().join("generated/schema.py"));

        let files = FileWalker::new(dir.path().to_path_buf())
            .with_exclude_patterns(&["*.min.js".to_string(), "*/generated/*".to_string()])
            .walk();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("app.js"));
    }

    #[test]
    fn empty_tree_yields_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = FileWalker::new(dir.path().to_path_buf()).walk();
        assert!(files.is_empty());
    }
}
