//! Rule-driven issue detection over raw file content.
//!
//! `detect` is a pure function of the rules and the file content: no
//! filesystem access, no shared state, so callers can fan it out across
//! files freely.

use crate::core::{FileKind, Issue};
use crate::rules::{Rule, RuleKind, RuleRegistry};
use std::path::Path;

/// Byte offsets at which each line starts. Lets us map a match offset to a
/// 1-based line number with a binary search, which stays correct for
/// patterns spanning multiple lines (the line of the match start wins).
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(content: &str) -> Self {
        let mut starts = vec![0];
        for (i, b) in content.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    /// 1-based line containing the given byte offset.
    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset)
    }

    /// The full text of a 1-based line, without its terminator.
    fn line_text<'a>(&self, content: &'a str, line: usize) -> &'a str {
        let start = self.starts[line - 1];
        let end = self.starts.get(line).copied().unwrap_or(content.len());
        content[start..end].trim_end_matches(['\n', '\r'])
    }
}

/// Run every applicable rule against `content`, emitting one issue per
/// match (or one file-level issue for absence rules). A single line may
/// yield several issues when distinct rules match it.
pub fn detect(file_path: &Path, content: &str, registry: &RuleRegistry) -> Vec<Issue> {
    let kind = FileKind::from_path(file_path);
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let index = LineIndex::new(content);
    let rel = file_path.display().to_string();

    let mut issues = Vec::new();
    for rule in registry.rules_for(kind, file_name) {
        match rule.spec.kind {
            RuleKind::Presence => {
                detect_presence(rule, content, &index, &rel, &mut issues);
            }
            RuleKind::Absence => {
                if !rule.pattern.is_match(content) {
                    issues.push(make_issue(rule, &rel, 0, String::new()));
                }
            }
            RuleKind::JsonSyntax => {
                if serde_json::from_str::<serde_json::Value>(content).is_err() {
                    issues.push(make_issue(rule, &rel, 0, String::new()));
                }
            }
        }
    }
    issues
}

fn detect_presence(
    rule: &Rule,
    content: &str,
    index: &LineIndex,
    rel: &str,
    issues: &mut Vec<Issue>,
) {
    if let Some(content_guard) = &rule.content_guard {
        if content_guard.is_match(content) {
            return;
        }
    }
    for m in rule.pattern.find_iter(content) {
        let line_number = index.line_of(m.start());
        let line = index.line_text(content, line_number);

        if let Some(guard) = &rule.guard {
            if guard.is_match(line) {
                continue;
            }
        }

        issues.push(make_issue(rule, rel, line_number, line.trim().to_string()));
    }
}

fn make_issue(rule: &Rule, file_path: &str, line_number: usize, code_snippet: String) -> Issue {
    let spec = &rule.spec;
    Issue {
        file_path: file_path.to_string(),
        line_number,
        severity: spec.severity,
        category: spec.category,
        title: spec.title.to_string(),
        description: spec.description.to_string(),
        code_snippet,
        suggested_fix: spec.suggested_fix.to_string(),
        complexity: spec.complexity,
        estimated_hours: spec.base_effort_hours,
        requires_test: spec.requires_test,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Category, Severity};
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn registry() -> &'static RuleRegistry {
        &crate::rules::DEFAULT_REGISTRY
    }

    #[test]
    fn reports_correct_lines_for_security_issues() {
        // eval on line 10, innerHTML on line 12
        let mut content = String::new();
        for _ in 0..9 {
            content.push_str("const a = 1;\n");
        }
        content.push_str("eval(userInput);\n");
        content.push_str("const b = 2;\n");
        content.push_str("element.innerHTML = x;\n");

        let issues = detect(Path::new("app.js"), &content, registry());
        assert_eq!(issues.len(), 2);

        let eval = issues
            .iter()
            .find(|i| i.title == "Dangerous eval() usage")
            .unwrap();
        assert_eq!(eval.line_number, 10);
        assert_eq!(eval.category, Category::Security);
        assert_eq!(eval.severity, Severity::Critical);
        assert_eq!(eval.code_snippet, "eval(userInput);");

        let inner = issues
            .iter()
            .find(|i| i.title == "Dangerous innerHTML usage")
            .unwrap();
        assert_eq!(inner.line_number, 12);
        assert_eq!(inner.category, Category::Security);
    }

    #[test]
    fn bare_except_matches_only_unqualified() {
        let bare = "try:\n    pass\nexcept:\n    pass\n";
        let issues = detect(Path::new("app.py"), bare, registry());
        let bare_issues: Vec<_> = issues
            .iter()
            .filter(|i| i.title == "Bare except clause")
            .collect();
        assert_eq!(bare_issues.len(), 1);
        assert_eq!(bare_issues[0].line_number, 3);
        assert_eq!(bare_issues[0].severity, Severity::High);
        assert_eq!(bare_issues[0].category, Category::Reliability);

        let qualified = "try:\n    pass\nexcept Exception:\n    pass\n";
        let issues = detect(Path::new("app.py"), qualified, registry());
        assert!(issues.iter().all(|i| i.title != "Bare except clause"));
    }

    #[test]
    fn guard_suppresses_matching_line() {
        let with_key = r#"items.map(item => <li key={item.id}>{item.name}</li>)"#;
        let issues = detect(Path::new("list.jsx"), with_key, registry());
        assert!(issues
            .iter()
            .all(|i| i.title != "Missing key prop in map function"));

        let without_key = r#"items.map(item => <li>{item.name}</li>)"#;
        let issues = detect(Path::new("list.jsx"), without_key, registry());
        assert!(issues
            .iter()
            .any(|i| i.title == "Missing key prop in map function"));
    }

    #[test]
    fn one_line_can_yield_multiple_issues() {
        let line = "console.log(eval(data));\n";
        let issues = detect(Path::new("app.js"), line, registry());
        let titles: Vec<_> = issues.iter().map(|i| i.title.as_str()).collect();
        assert!(titles.contains(&"Dangerous eval() usage"));
        assert!(titles.contains(&"Console statement in production code"));
        assert!(issues.iter().all(|i| i.line_number == 1));
    }

    #[test]
    fn absence_rule_fires_at_file_level() {
        let script = "echo hello\n";
        let issues = detect(Path::new("run.sh"), script, registry());
        let shebang = issues
            .iter()
            .find(|i| i.title == "Missing shebang in shell script")
            .unwrap();
        assert_eq!(shebang.line_number, 0);
        assert_eq!(shebang.code_snippet, "");

        let with_shebang = "#!/bin/bash\necho hello\n";
        let issues = detect(Path::new("run.sh"), with_shebang, registry());
        assert!(issues
            .iter()
            .all(|i| i.title != "Missing shebang in shell script"));
    }

    #[test]
    fn package_json_script_checks() {
        let missing_both = indoc! {r#"
            {
              "name": "demo",
              "scripts": { "build": "vite build" }
            }
        "#};
        let issues = detect(Path::new("package.json"), missing_both, registry());
        let titles: Vec<_> = issues.iter().map(|i| i.title.as_str()).collect();
        assert!(titles.contains(&"Missing test script"));
        assert!(titles.contains(&"Missing lint script"));

        let complete = indoc! {r#"
            {
              "scripts": { "test": "jest", "lint": "eslint ." }
            }
        "#};
        let issues = detect(Path::new("package.json"), complete, registry());
        assert!(issues.is_empty());
    }

    #[test]
    fn invalid_package_json_is_a_file_level_reliability_issue() {
        let issues = detect(Path::new("package.json"), "{ not json ", registry());
        let invalid = issues
            .iter()
            .find(|i| i.title == "Invalid JSON in package.json")
            .unwrap();
        assert_eq!(invalid.line_number, 0);
        assert_eq!(invalid.severity, Severity::High);
        assert_eq!(invalid.category, Category::Reliability);

        let valid = r#"{ "scripts": { "test": "jest", "lint": "eslint ." } }"#;
        let issues = detect(Path::new("package.json"), valid, registry());
        assert!(issues
            .iter()
            .all(|i| i.title != "Invalid JSON in package.json"));
    }

    #[test]
    fn pre_v2_dependency_ranges_flagged() {
        let manifest = indoc! {r#"
            {
              "scripts": { "test": "jest", "lint": "eslint ." },
              "dependencies": { "left-pad": "^1.3.0", "react": "^18.2.0" }
            }
        "#};
        let issues = detect(Path::new("package.json"), manifest, registry());
        let outdated: Vec<_> = issues
            .iter()
            .filter(|i| i.title == "Potentially outdated dependency")
            .collect();
        assert_eq!(outdated.len(), 1);
        assert_eq!(outdated[0].line_number, 3);
        assert!(outdated[0].code_snippet.contains("left-pad"));
        assert_eq!(outdated[0].category, Category::Security);
    }

    #[test]
    fn listener_without_cleanup_flagged() {
        let leaky = indoc! {r#"
            useEffect(() => {
              window.addEventListener('resize', onResize);
            }, []);
        "#};
        let issues = detect(Path::new("App.jsx"), leaky, registry());
        let leak = issues
            .iter()
            .find(|i| i.title == "Missing cleanup in useEffect")
            .unwrap();
        assert_eq!(leak.line_number, 2);
        assert_eq!(leak.severity, Severity::High);

        let cleaned = indoc! {r#"
            useEffect(() => {
              window.addEventListener('resize', onResize);
              return () => window.removeEventListener('resize', onResize);
            }, []);
        "#};
        let issues = detect(Path::new("App.jsx"), cleaned, registry());
        assert!(issues.iter().all(|i| i.title != "Missing cleanup in useEffect"));
    }

    #[test]
    fn expensive_render_work_flagged_unless_memoized() {
        let unmemoized = "function C({ d }) {\n  return JSON.parse(d);\n}\n";
        let issues = detect(Path::new("C.jsx"), unmemoized, registry());
        let expensive = issues
            .iter()
            .find(|i| i.title == "Expensive operation in render")
            .unwrap();
        assert_eq!(expensive.line_number, 2);
        assert_eq!(expensive.category, Category::Performance);

        let memoized =
            "function C({ d }) {\n  const v = useMemo(() => JSON.parse(d), [d]);\n  return v;\n}\n";
        let issues = detect(Path::new("C.jsx"), memoized, registry());
        assert!(issues
            .iter()
            .all(|i| i.title != "Expensive operation in render"));
    }

    #[test]
    fn generic_rules_apply_to_every_kind() {
        let content = "# TODO: finish this\n";
        let issues = detect(Path::new("notes.py"), content, registry());
        let todo = issues
            .iter()
            .find(|i| i.title == "Unfinished work marker")
            .unwrap();
        assert_eq!(todo.severity, Severity::Info);
        assert_eq!(todo.line_number, 1);
    }

    #[test]
    fn issue_fields_copied_from_rule() {
        let issues = detect(Path::new("app.js"), "eval(x)\n", registry());
        let issue = &issues[0];
        assert_eq!(issue.complexity, 8);
        assert_eq!(issue.estimated_hours, 4.0);
        assert!(issue.requires_test);
        assert!(!issue.suggested_fix.is_empty());
    }

    #[test]
    fn empty_content_yields_no_presence_issues() {
        let issues = detect(Path::new("empty.js"), "", registry());
        assert!(issues.is_empty());
    }

    #[test]
    fn line_index_handles_offsets_at_boundaries() {
        let idx = LineIndex::new("ab\ncd\nef");
        assert_eq!(idx.line_of(0), 1);
        assert_eq!(idx.line_of(2), 1);
        assert_eq!(idx.line_of(3), 2);
        assert_eq!(idx.line_of(6), 3);
        assert_eq!(idx.line_text("ab\ncd\nef", 2), "cd");
        assert_eq!(idx.line_text("ab\ncd\nef", 3), "ef");
    }
}
