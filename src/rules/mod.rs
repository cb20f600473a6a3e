//! Detection rule schema and the built-in rule table.
//!
//! Rules are plain data: a pattern bound to a fixed severity, category,
//! complexity rating, and remediation template. The registry compiles the
//! table once at startup; a rule whose pattern fails to compile is dropped
//! with a warning so one bad rule never blocks a scan.

use crate::core::{Category, FileKind, Severity};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Compiled regex size limit. Bounds pattern compilation so a pathological
/// pattern fails at load time rather than exploding at match time.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Whether a rule fires on matches or on the absence of any match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleKind {
    /// One issue per non-overlapping match of the pattern.
    Presence,
    /// One file-level issue when the pattern never matches the content.
    Absence,
    /// One file-level issue when the content is not syntactically valid
    /// JSON. The pattern is ignored.
    JsonSyntax,
}

/// Static rule definition as it appears in the built-in table.
#[derive(Clone, Copy, Debug)]
pub struct RuleSpec {
    pub pattern: &'static str,
    /// Suppresses a match whose line also matches this pattern. Covers
    /// checks of the form "X without Y on the same line".
    pub guard: Option<&'static str>,
    /// Suppresses every match when this pattern matches anywhere in the
    /// file. Covers checks of the form "X unless the file also does Y".
    pub content_guard: Option<&'static str>,
    pub kind: RuleKind,
    /// Language groups the rule applies to. Empty means every text file.
    pub applies_to: &'static [FileKind],
    /// Restricts the rule to files with this exact name.
    pub file_name: Option<&'static str>,
    pub title: &'static str,
    pub description: &'static str,
    pub suggested_fix: &'static str,
    pub severity: Severity,
    pub category: Category,
    pub complexity: u8,
    pub base_effort_hours: f64,
    pub requires_test: bool,
}

/// A rule with its pattern compiled, ready for matching.
#[derive(Clone, Debug)]
pub struct Rule {
    pub spec: RuleSpec,
    pub pattern: Regex,
    pub guard: Option<Regex>,
    pub content_guard: Option<Regex>,
}

impl Rule {
    fn compile(spec: &RuleSpec) -> Result<Self, regex::Error> {
        let build = |source| {
            RegexBuilder::new(source)
                .size_limit(REGEX_SIZE_LIMIT)
                .build()
        };
        Ok(Self {
            spec: *spec,
            pattern: build(spec.pattern)?,
            guard: spec.guard.map(build).transpose()?,
            content_guard: spec.content_guard.map(build).transpose()?,
        })
    }

    /// Whether this rule should run against a file of the given kind/name.
    pub fn applies(&self, kind: FileKind, file_name: &str) -> bool {
        if let Some(required) = self.spec.file_name {
            if required != file_name {
                return false;
            }
        }
        self.spec.applies_to.is_empty() || self.spec.applies_to.contains(&kind)
    }
}

/// Ordered set of compiled detection rules. Registration order is total
/// order: overlapping rules may both report the same line, and both do.
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    /// Compile the built-in rule table. Rules with invalid patterns are
    /// dropped with a logged warning.
    pub fn load() -> Self {
        Self::from_specs(BUILTIN_RULES)
    }

    pub fn from_specs(specs: &[RuleSpec]) -> Self {
        let mut rules = Vec::with_capacity(specs.len());
        for spec in specs {
            match Rule::compile(spec) {
                Ok(rule) => rules.push(rule),
                Err(e) => {
                    log::warn!("dropping rule '{}': pattern failed to compile: {e}", spec.title);
                }
            }
        }
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules applicable to one file, in registration order.
    pub fn rules_for<'a>(
        &'a self,
        kind: FileKind,
        file_name: &'a str,
    ) -> impl Iterator<Item = &'a Rule> {
        self.rules.iter().filter(move |r| r.applies(kind, file_name))
    }
}

/// Shared default registry. Compiling the rule table is cheap but not free;
/// callers that scan repeatedly reuse this.
pub static DEFAULT_REGISTRY: Lazy<RuleRegistry> = Lazy::new(RuleRegistry::load);

const SCRIPT: &[FileKind] = &[FileKind::Script];
const PYTHON: &[FileKind] = &[FileKind::Python];
const SHELL: &[FileKind] = &[FileKind::Shell];
const CONFIG: &[FileKind] = &[FileKind::Config];
const ANY: &[FileKind] = &[];

/// The built-in rule table, in priority registration order.
pub static BUILTIN_RULES: &[RuleSpec] = &[
    RuleSpec {
        pattern: r"\beval\s*\(",
        guard: None,
        content_guard: None,
        kind: RuleKind::Presence,
        applies_to: SCRIPT,
        file_name: None,
        title: "Dangerous eval() usage",
        description: "eval() can execute arbitrary code and is a major security risk",
        suggested_fix: "Use JSON.parse for JSON data or find safer alternatives",
        severity: Severity::Critical,
        category: Category::Security,
        complexity: 8,
        base_effort_hours: 4.0,
        requires_test: true,
    },
    RuleSpec {
        pattern: r#"(?i)(password|api_key|secret|token)\s*=\s*["'][^"']+["']"#,
        guard: None,
        content_guard: None,
        kind: RuleKind::Presence,
        applies_to: PYTHON,
        file_name: None,
        title: "Hardcoded credentials",
        description: "Hardcoded credentials are a major security risk",
        suggested_fix: "Use environment variables or secure configuration management",
        severity: Severity::Critical,
        category: Category::Security,
        complexity: 7,
        base_effort_hours: 3.0,
        requires_test: true,
    },
    RuleSpec {
        pattern: r"innerHTML\s*=",
        guard: None,
        content_guard: None,
        kind: RuleKind::Presence,
        applies_to: SCRIPT,
        file_name: None,
        title: "Dangerous innerHTML usage",
        description: "innerHTML can lead to XSS attacks if user input is not properly sanitized",
        suggested_fix: "Use textContent instead or sanitize HTML with DOMPurify",
        severity: Severity::High,
        category: Category::Security,
        complexity: 6,
        base_effort_hours: 3.0,
        requires_test: true,
    },
    RuleSpec {
        pattern: r"\bexcept\s*:",
        guard: None,
        content_guard: None,
        kind: RuleKind::Presence,
        applies_to: PYTHON,
        file_name: None,
        title: "Bare except clause",
        description: "Bare except clauses catch all exceptions including KeyboardInterrupt and SystemExit",
        suggested_fix: "Use 'except Exception:' to catch only non-system exceptions",
        severity: Severity::High,
        category: Category::Reliability,
        complexity: 2,
        base_effort_hours: 0.5,
        requires_test: true,
    },
    RuleSpec {
        pattern: r"useEffect\s*\(\s*\(\s*\)\s*=>",
        guard: Some(r"\[[^\]]*\]\s*\)"),
        content_guard: None,
        kind: RuleKind::Presence,
        applies_to: SCRIPT,
        file_name: None,
        title: "useEffect without dependency array",
        description: "useEffect without a dependency array runs on every render, causing performance issues",
        suggested_fix: "Add a dependency array: useEffect(() => { ... }, []) for mount-only effects",
        severity: Severity::High,
        category: Category::Performance,
        complexity: 3,
        base_effort_hours: 1.0,
        requires_test: true,
    },
    RuleSpec {
        pattern: r"\.map\s*\([^)]*=>",
        guard: Some(r"key"),
        content_guard: None,
        kind: RuleKind::Presence,
        applies_to: SCRIPT,
        file_name: None,
        title: "Missing key prop in map function",
        description: "React requires a unique 'key' prop for list items to optimize rendering",
        suggested_fix: "Add a unique 'key' prop to the mapped element, e.g., key={item.id}",
        severity: Severity::Medium,
        category: Category::Reliability,
        complexity: 2,
        base_effort_hours: 0.5,
        requires_test: true,
    },
    RuleSpec {
        pattern: r"on\w+\s*=\s*\{[^}]*=>",
        guard: None,
        content_guard: None,
        kind: RuleKind::Presence,
        applies_to: SCRIPT,
        file_name: None,
        title: "Inline function in render",
        description: "Inline functions create new instances on every render, causing unnecessary re-renders",
        suggested_fix: "Move the function outside render or use the useCallback hook",
        severity: Severity::Medium,
        category: Category::Performance,
        complexity: 3,
        base_effort_hours: 1.0,
        requires_test: false,
    },
    RuleSpec {
        pattern: r"addEventListener\s*\(",
        guard: None,
        content_guard: Some(r"removeEventListener|return\s*\(\s*\)\s*=>"),
        kind: RuleKind::Presence,
        applies_to: SCRIPT,
        file_name: None,
        title: "Missing cleanup in useEffect",
        description: "Event listeners and timers added in useEffect should be cleaned up to prevent memory leaks",
        suggested_fix: "Return a cleanup function: return () => { removeEventListener(...) }",
        severity: Severity::High,
        category: Category::Performance,
        complexity: 4,
        base_effort_hours: 1.5,
        requires_test: true,
    },
    RuleSpec {
        pattern: r"return\b[^;\n]*\b(JSON\.(parse|stringify)|Array\.from|Object\.(keys|values))\s*\(",
        guard: None,
        content_guard: Some(r"useMemo"),
        kind: RuleKind::Presence,
        applies_to: SCRIPT,
        file_name: None,
        title: "Expensive operation in render",
        description: "Expensive operations should be memoized to avoid running on every render",
        suggested_fix: "Use the useMemo hook to memoize expensive calculations",
        severity: Severity::Medium,
        category: Category::Performance,
        complexity: 4,
        base_effort_hours: 1.5,
        requires_test: false,
    },
    RuleSpec {
        pattern: r"document\.(querySelector|getElementById|createElement)",
        guard: None,
        content_guard: Some(r"useEffect|useLayoutEffect"),
        kind: RuleKind::Presence,
        applies_to: SCRIPT,
        file_name: None,
        title: "Direct DOM manipulation",
        description: "Direct DOM manipulation should happen in effects to avoid hydration mismatches",
        suggested_fix: "Move DOM manipulation inside useEffect or use refs",
        severity: Severity::Medium,
        category: Category::Maintainability,
        complexity: 5,
        base_effort_hours: 2.0,
        requires_test: true,
    },
    RuleSpec {
        pattern: r"<img\b[^>]*>",
        guard: Some(r"alt\s*="),
        content_guard: None,
        kind: RuleKind::Presence,
        applies_to: SCRIPT,
        file_name: None,
        title: "Missing alt attribute on image",
        description: "Images must have alt attributes for screen readers",
        suggested_fix: "Add an alt attribute: <img src=\"...\" alt=\"Description\" />",
        severity: Severity::Medium,
        category: Category::Accessibility,
        complexity: 1,
        base_effort_hours: 0.2,
        requires_test: false,
    },
    RuleSpec {
        pattern: r"<button\b[^>]*>",
        guard: Some(r"type\s*="),
        content_guard: None,
        kind: RuleKind::Presence,
        applies_to: SCRIPT,
        file_name: None,
        title: "Missing button type attribute",
        description: "Buttons should have explicit type attributes for accessibility",
        suggested_fix: "Add a type attribute: <button type=\"button\"> or <button type=\"submit\">",
        severity: Severity::Low,
        category: Category::Accessibility,
        complexity: 1,
        base_effort_hours: 0.1,
        requires_test: false,
    },
    RuleSpec {
        pattern: r"\bopen\s*\([^)]*\)",
        guard: Some(r"encoding\s*="),
        content_guard: None,
        kind: RuleKind::Presence,
        applies_to: PYTHON,
        file_name: None,
        title: "Missing encoding in file operations",
        description: "File operations should specify an encoding for cross-platform behavior",
        suggested_fix: "Add an encoding parameter: open(file, 'r', encoding='utf-8')",
        severity: Severity::Medium,
        category: Category::Compatibility,
        complexity: 1,
        base_effort_hours: 0.2,
        requires_test: false,
    },
    RuleSpec {
        pattern: r"\A#!",
        guard: None,
        content_guard: None,
        kind: RuleKind::Absence,
        applies_to: SHELL,
        file_name: None,
        title: "Missing shebang in shell script",
        description: "Shell scripts should declare their interpreter with a shebang line",
        suggested_fix: "Add a shebang: #!/bin/bash or #!/bin/sh",
        severity: Severity::Medium,
        category: Category::Compatibility,
        complexity: 1,
        base_effort_hours: 0.1,
        requires_test: false,
    },
    RuleSpec {
        pattern: r#"\$[A-Za-z_][A-Za-z0-9_]*[^"'A-Za-z0-9_{]"#,
        guard: Some(r"^\s*#"),
        content_guard: None,
        kind: RuleKind::Presence,
        applies_to: SHELL,
        file_name: None,
        title: "Unquoted variable in shell script",
        description: "Unquoted variables break on spaces and special characters",
        suggested_fix: "Quote variables: \"$VAR\" instead of $VAR",
        severity: Severity::Medium,
        category: Category::Reliability,
        complexity: 2,
        base_effort_hours: 0.3,
        requires_test: false,
    },
    RuleSpec {
        pattern: r#""test"\s*:"#,
        guard: None,
        content_guard: None,
        kind: RuleKind::Absence,
        applies_to: CONFIG,
        file_name: Some("package.json"),
        title: "Missing test script",
        description: "No test script defined in package.json",
        suggested_fix: "Add a test script: \"test\": \"jest\" or your preferred framework",
        severity: Severity::Medium,
        category: Category::Testing,
        complexity: 2,
        base_effort_hours: 0.5,
        requires_test: false,
    },
    RuleSpec {
        pattern: r#""lint"\s*:"#,
        guard: None,
        content_guard: None,
        kind: RuleKind::Absence,
        applies_to: CONFIG,
        file_name: Some("package.json"),
        title: "Missing lint script",
        description: "No lint script defined for code quality checks",
        suggested_fix: "Add a lint script: \"lint\": \"eslint .\"",
        severity: Severity::Low,
        category: Category::Maintainability,
        complexity: 1,
        base_effort_hours: 0.2,
        requires_test: false,
    },
    RuleSpec {
        pattern: r#""[A-Za-z0-9@/._-]+"\s*:\s*"\^[01]\.[^"]*""#,
        guard: None,
        content_guard: None,
        kind: RuleKind::Presence,
        applies_to: CONFIG,
        file_name: Some("package.json"),
        title: "Potentially outdated dependency",
        description: "Dependencies pinned below major version 2 may be outdated and contain security vulnerabilities",
        suggested_fix: "Update to the latest stable version and test thoroughly",
        severity: Severity::Medium,
        category: Category::Security,
        complexity: 5,
        base_effort_hours: 2.0,
        requires_test: true,
    },
    RuleSpec {
        pattern: "",
        guard: None,
        content_guard: None,
        kind: RuleKind::JsonSyntax,
        applies_to: CONFIG,
        file_name: Some("package.json"),
        title: "Invalid JSON in package.json",
        description: "package.json contains invalid JSON syntax",
        suggested_fix: "Fix the JSON syntax errors",
        severity: Severity::High,
        category: Category::Reliability,
        complexity: 2,
        base_effort_hours: 0.5,
        requires_test: false,
    },
    RuleSpec {
        pattern: r"(?i)\b(TODO|FIXME|HACK|XXX)\b\s*[:;]",
        guard: None,
        content_guard: None,
        kind: RuleKind::Presence,
        applies_to: ANY,
        file_name: None,
        title: "Unfinished work marker",
        description: "TODO/FIXME comments indicate unfinished work or known issues",
        suggested_fix: "Complete the item or track it in a proper issue ticket",
        severity: Severity::Info,
        category: Category::Maintainability,
        complexity: 1,
        base_effort_hours: 0.5,
        requires_test: false,
    },
    RuleSpec {
        pattern: r"console\.(log|warn|error|info)\s*\(",
        guard: None,
        content_guard: None,
        kind: RuleKind::Presence,
        applies_to: ANY,
        file_name: None,
        title: "Console statement in production code",
        description: "Console statements should be removed or routed through a logging framework",
        suggested_fix: "Remove the console statement or use a proper logger",
        severity: Severity::Low,
        category: Category::Maintainability,
        complexity: 1,
        base_effort_hours: 0.1,
        requires_test: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rules_all_compile() {
        let registry = RuleRegistry::load();
        assert_eq!(registry.len(), BUILTIN_RULES.len());
    }

    #[test]
    fn invalid_pattern_is_dropped_not_fatal() {
        let specs = [
            RuleSpec {
                pattern: r"(unclosed",
                ..BUILTIN_RULES[0]
            },
            BUILTIN_RULES[1],
        ];
        let registry = RuleRegistry::from_specs(&specs);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.rules()[0].spec.title, "Hardcoded credentials");
    }

    #[test]
    fn applicability_by_kind() {
        let registry = RuleRegistry::load();
        let python: Vec<_> = registry
            .rules_for(FileKind::Python, "app.py")
            .map(|r| r.spec.title)
            .collect();
        assert!(python.contains(&"Bare except clause"));
        assert!(!python.contains(&"Dangerous eval() usage"));
        // Generic rules apply everywhere.
        assert!(python.contains(&"Unfinished work marker"));
    }

    #[test]
    fn file_name_filter() {
        let registry = RuleRegistry::load();
        let pkg: Vec<_> = registry
            .rules_for(FileKind::Config, "package.json")
            .map(|r| r.spec.title)
            .collect();
        assert!(pkg.contains(&"Missing test script"));

        let other: Vec<_> = registry
            .rules_for(FileKind::Config, "settings.json")
            .map(|r| r.spec.title)
            .collect();
        assert!(!other.contains(&"Missing test script"));
    }

    #[test]
    fn registration_order_preserved() {
        let registry = RuleRegistry::load();
        assert_eq!(registry.rules()[0].spec.title, "Dangerous eval() usage");
    }
}
