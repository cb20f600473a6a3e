//! Remediation plan construction.
//!
//! Maps classified issues onto a fixed five-phase template (critical
//! through documentation), builds a task/subtask tree per phase with
//! dependency edges between phases, and rolls up effort, risk, and team
//! recommendations. The planner only reads issues; it never mutates them.

use crate::classify::ClassifiedIssues;
use crate::core::{Category, Issue, Severity};
use crate::errors::FixmapError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Nominal full-time hours per week used for duration estimates.
const WEEKLY_CAPACITY_HOURS: f64 = 40.0;
/// Fixed planning buffer added to every non-empty schedule.
const PLANNING_BUFFER_WEEKS: u32 = 1;

/// Static definition of one remediation phase. The template is fixed
/// configuration, not derived from scan data.
struct PhaseTemplate {
    number: u8,
    severity: Severity,
    name: &'static str,
    description: &'static str,
    objectives: &'static [&'static str],
    duration: &'static str,
    team_size: &'static str,
    testing_required: &'static str,
}

static PHASE_TEMPLATES: [PhaseTemplate; 5] = [
    PhaseTemplate {
        number: 1,
        severity: Severity::Critical,
        name: "Critical Security & Stability Fixes",
        description: "Address critical security vulnerabilities and stability issues that could cause system failures",
        objectives: &[
            "Fix all critical severity issues",
            "Address security vulnerabilities",
            "Ensure no data loss or corruption",
        ],
        duration: "1-2 weeks",
        team_size: "2-3 developers",
        testing_required: "Extensive security testing and penetration testing",
    },
    PhaseTemplate {
        number: 2,
        severity: Severity::High,
        name: "High Priority Performance & Reliability",
        description: "Fix high-priority performance and reliability problems that affect user experience",
        objectives: &[
            "Fix all high severity issues",
            "Improve application performance",
            "Enhance error handling and recovery",
        ],
        duration: "2-3 weeks",
        team_size: "3-4 developers",
        testing_required: "Performance testing and load testing",
    },
    PhaseTemplate {
        number: 3,
        severity: Severity::Medium,
        name: "Medium Priority Quality Improvements",
        description: "Address medium priority issues that improve code quality and maintainability",
        objectives: &[
            "Fix all medium severity issues",
            "Improve code maintainability",
            "Enhance accessibility",
        ],
        duration: "3-4 weeks",
        team_size: "4-5 developers",
        testing_required: "Regression testing and code review",
    },
    PhaseTemplate {
        number: 4,
        severity: Severity::Low,
        name: "Low Priority Polish & Optimization",
        description: "Address low priority issues and minor optimizations for a better user experience",
        objectives: &[
            "Fix all low severity issues",
            "Clean up technical debt",
            "Optimize minor performance issues",
        ],
        duration: "2-3 weeks",
        team_size: "2-3 developers",
        testing_required: "User acceptance testing and UI testing",
    },
    PhaseTemplate {
        number: 5,
        severity: Severity::Info,
        name: "Documentation & Process Improvements",
        description: "Complete documentation, resolve informational findings, and establish preventive processes",
        objectives: &[
            "Resolve all informational findings",
            "Update documentation",
            "Establish preventive processes",
        ],
        duration: "1-2 weeks",
        team_size: "1-2 developers",
        testing_required: "Documentation review and process validation",
    },
];

fn severity_adjective(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Critical",
        Severity::High => "High-Priority",
        Severity::Medium => "Medium-Priority",
        Severity::Low => "Low-Priority",
        Severity::Info => "Outstanding",
    }
}

/// Fixed verb/noun pair per category used to compose task titles, e.g.
/// Security at critical severity becomes "Fix Critical Security
/// Vulnerabilities".
fn category_task_text(category: Category) -> (&'static str, &'static str, &'static str) {
    match category {
        Category::Security => (
            "Fix",
            "Security Vulnerabilities",
            "Eliminate injection, XSS, and credential exposure findings",
        ),
        Category::Performance => (
            "Optimize",
            "Performance Issues",
            "Remove render-time waste and unnecessary recomputation",
        ),
        Category::Reliability => (
            "Resolve",
            "Reliability Problems",
            "Harden error handling and failure recovery paths",
        ),
        Category::Maintainability => (
            "Clean Up",
            "Maintainability Debt",
            "Standardize patterns and remove leftover development artifacts",
        ),
        Category::Accessibility => (
            "Improve",
            "Accessibility Shortfalls",
            "Make the interface usable with assistive technology",
        ),
        Category::Testing => (
            "Strengthen",
            "Test Coverage Gaps",
            "Add the missing automated test entry points",
        ),
        Category::Compatibility => (
            "Fix",
            "Compatibility Problems",
            "Remove platform- and encoding-dependent behavior",
        ),
    }
}

/// Overall risk rating for a plan or a single risk factor.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub description: String,
    pub estimated_hours: f64,
    pub requires_test: bool,
    pub bugs_affected: usize,
    pub files_affected: Vec<String>,
    /// Ids of subtasks within the same task that must complete first.
    pub dependencies: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub bugs_affected: usize,
    pub estimated_hours: f64,
    pub requires_test: bool,
    /// Ids of tasks in the same or an earlier phase.
    pub dependencies: Vec<String>,
    pub files_affected: Vec<String>,
    pub subtasks: Vec<Subtask>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Phase {
    pub phase_number: u8,
    pub name: String,
    pub description: String,
    pub priority: u8,
    pub objectives: Vec<String>,
    pub duration: String,
    pub team_size: String,
    pub testing_required: String,
    pub tasks: Vec<Task>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanSummary {
    pub total_issues: usize,
    pub critical_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
    pub info_count: usize,
    pub total_hours: f64,
    pub average_complexity: f64,
    pub overall_risk: RiskLevel,
    pub estimated_duration_weeks: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RiskFactor {
    pub level: RiskLevel,
    pub description: String,
    pub mitigation: String,
    pub impact: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub overall_risk_level: RiskLevel,
    pub risks: Vec<RiskFactor>,
    pub contingency_plans: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TeamRecommendation {
    pub team_size: u32,
    pub roles: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TestingStage {
    pub name: String,
    pub description: String,
    pub coverage_target: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TestingStrategy {
    pub stages: Vec<TestingStage>,
}

/// Complete remediation plan for one scan run. Immutable after
/// construction; consumed only by exporters.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub summary: PlanSummary,
    pub phases: Vec<Phase>,
    pub risk_assessment: RiskAssessment,
    pub team_recommendation: TeamRecommendation,
    pub testing_strategy: TestingStrategy,
}

/// Build the remediation plan from classified issues.
///
/// All five phases are always present, with empty task lists where no
/// issue maps to them, so phase ordering stays stable across runs. Fails
/// only on a planning-template defect (invalid dependency edge), never on
/// scan data.
pub fn build_plan(classified: &ClassifiedIssues) -> Result<Plan, FixmapError> {
    let mut phases = Vec::with_capacity(PHASE_TEMPLATES.len());
    let mut prior_task_ids: Vec<String> = Vec::new();

    for template in &PHASE_TEMPLATES {
        let issues = classified.severity_bucket(template.severity);
        let tasks = build_tasks(template, issues, &prior_task_ids);
        if !tasks.is_empty() {
            prior_task_ids = tasks.iter().map(|t| t.id.clone()).collect();
        }
        phases.push(Phase {
            phase_number: template.number,
            name: template.name.to_string(),
            description: template.description.to_string(),
            priority: template.number,
            objectives: template.objectives.iter().map(|o| o.to_string()).collect(),
            duration: template.duration.to_string(),
            team_size: template.team_size.to_string(),
            testing_required: template.testing_required.to_string(),
            tasks,
        });
    }

    validate_dependencies(&phases)?;

    let summary = build_summary(classified, &phases);
    let risk_assessment = build_risk_assessment(classified, summary.overall_risk);
    let team_recommendation = build_team_recommendation(classified);
    let testing_strategy = build_testing_strategy(classified);

    Ok(Plan {
        summary,
        phases,
        risk_assessment,
        team_recommendation,
        testing_strategy,
    })
}

/// One task per category present in the phase, in fixed category order.
/// Each task depends on every task of the most recent non-empty earlier
/// phase: later work does not start before higher-priority work is planned.
fn build_tasks(template: &PhaseTemplate, issues: &[Issue], prior_task_ids: &[String]) -> Vec<Task> {
    let mut by_category: BTreeMap<Category, Vec<&Issue>> = BTreeMap::new();
    for issue in issues {
        by_category.entry(issue.category).or_default().push(issue);
    }

    let mut tasks = Vec::new();
    let mut task_no = 0;
    for category in Category::ALL {
        let Some(members) = by_category.get_mut(&category) else {
            continue;
        };
        // Deterministic grouping regardless of detection order.
        members.sort_by(|a, b| {
            (&a.file_path, a.line_number, &a.title).cmp(&(&b.file_path, b.line_number, &b.title))
        });

        task_no += 1;
        let task_id = format!("P{}-T{}", template.number, task_no);
        let subtasks = build_subtasks(&task_id, members);

        let estimated_hours: f64 = subtasks.iter().map(|s| s.estimated_hours).sum();
        let requires_test = subtasks.iter().any(|s| s.requires_test);
        let files_affected = collect_files(members.iter().copied());

        let (verb, noun, description) = category_task_text(category);
        tasks.push(Task {
            id: task_id,
            title: format!("{verb} {} {noun}", severity_adjective(template.severity)),
            description: description.to_string(),
            bugs_affected: members.len(),
            estimated_hours,
            requires_test,
            dependencies: prior_task_ids.to_vec(),
            files_affected,
            subtasks,
        });
    }
    tasks
}

/// Distinct issue titles within a task become distinct subtasks, hours
/// summed and the test requirement OR-ed across member issues.
fn build_subtasks(task_id: &str, members: &[&Issue]) -> Vec<Subtask> {
    let mut by_title: BTreeMap<&str, Vec<&Issue>> = BTreeMap::new();
    for issue in members {
        by_title.entry(issue.title.as_str()).or_default().push(issue);
    }

    by_title
        .into_iter()
        .enumerate()
        .map(|(i, (title, group))| Subtask {
            id: format!("{task_id}-S{}", i + 1),
            title: title.to_string(),
            description: group[0].suggested_fix.clone(),
            estimated_hours: group.iter().map(|i| i.estimated_hours).sum(),
            requires_test: group.iter().any(|i| i.requires_test),
            bugs_affected: group.len(),
            files_affected: collect_files(group.iter().copied()),
            dependencies: Vec::new(),
        })
        .collect()
}

fn collect_files<'a>(issues: impl Iterator<Item = &'a Issue>) -> Vec<String> {
    let set: BTreeSet<String> = issues.map(|i| i.file_path.clone()).collect();
    set.into_iter().collect()
}

/// Dependency edges may only point at tasks in the same or an earlier
/// phase, and the graph must be acyclic. A violation is a template bug,
/// not bad scan data, so it fails the whole run.
fn validate_dependencies(phases: &[Phase]) -> Result<(), FixmapError> {
    let mut phase_of: HashMap<&str, u8> = HashMap::new();
    for phase in phases {
        for task in &phase.tasks {
            phase_of.insert(task.id.as_str(), phase.phase_number);
        }
    }

    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for phase in phases {
        for task in &phase.tasks {
            in_degree.entry(task.id.as_str()).or_insert(0);
            for dep in &task.dependencies {
                let Some(&dep_phase) = phase_of.get(dep.as_str()) else {
                    return Err(FixmapError::PlanTemplate {
                        message: format!("task {} depends on unknown task {dep}", task.id),
                    });
                };
                if dep_phase > phase.phase_number {
                    return Err(FixmapError::PlanTemplate {
                        message: format!(
                            "task {} in phase {} depends on later-phase task {dep}",
                            task.id, phase.phase_number
                        ),
                    });
                }
                *in_degree.entry(task.id.as_str()).or_insert(0) += 1;
                dependents.entry(dep.as_str()).or_default().push(&task.id);
            }
        }
    }

    // Kahn's algorithm; anything left unprocessed sits on a cycle.
    let mut queue: Vec<&str> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&id, _)| id)
        .collect();
    let mut processed = 0;
    while let Some(id) = queue.pop() {
        processed += 1;
        if let Some(next) = dependents.get(id) {
            for &n in next {
                if let Some(d) = in_degree.get_mut(n) {
                    *d -= 1;
                    if *d == 0 {
                        queue.push(n);
                    }
                }
            }
        }
    }
    if processed != in_degree.len() {
        return Err(FixmapError::PlanTemplate {
            message: "cyclic task dependency in phase template".to_string(),
        });
    }
    Ok(())
}

fn build_summary(classified: &ClassifiedIssues, phases: &[Phase]) -> PlanSummary {
    let s = &classified.summary;
    let total_hours: f64 = phases
        .iter()
        .flat_map(|p| &p.tasks)
        .map(|t| t.estimated_hours)
        .sum();

    let overall_risk = if s.critical_count > 0 {
        RiskLevel::High
    } else if s.total_issues > 0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let estimated_duration_weeks = if s.total_issues == 0 {
        0
    } else {
        (total_hours / WEEKLY_CAPACITY_HOURS).ceil() as u32 + PLANNING_BUFFER_WEEKS
    };

    PlanSummary {
        total_issues: s.total_issues,
        critical_count: s.critical_count,
        high_count: s.high_count,
        medium_count: s.medium_count,
        low_count: s.low_count,
        info_count: s.info_count,
        total_hours,
        average_complexity: s.average_complexity,
        overall_risk,
        estimated_duration_weeks,
    }
}

fn build_risk_assessment(classified: &ClassifiedIssues, overall: RiskLevel) -> RiskAssessment {
    let mut risks = Vec::new();
    let critical = classified.summary.critical_count;
    let complex = classified.count_complexity_above(7);

    if critical > 0 {
        risks.push(RiskFactor {
            level: RiskLevel::High,
            description: format!("{critical} critical security/stability issues found"),
            mitigation: "Prioritize phase 1 and ensure thorough testing".to_string(),
            impact: "System security and stability".to_string(),
        });
    }
    if complex > 5 {
        risks.push(RiskFactor {
            level: RiskLevel::Medium,
            description: format!("{complex} high-complexity issues requiring expert attention"),
            mitigation: "Assign senior developers and allow extra time for complex fixes"
                .to_string(),
            impact: "Project timeline and resource allocation".to_string(),
        });
    }

    RiskAssessment {
        overall_risk_level: overall,
        risks,
        contingency_plans: vec![
            "Extend the timeline for critical fixes".to_string(),
            "Bring in additional senior developers if needed".to_string(),
            "Ship fixes in smaller, more frequent releases".to_string(),
            "Increase testing time for complex changes".to_string(),
        ],
    }
}

/// Team size grows monotonically with the number of critical and
/// high-complexity issues; a security specialist is added whenever a
/// critical security issue exists.
fn build_team_recommendation(classified: &ClassifiedIssues) -> TeamRecommendation {
    let critical = classified.summary.critical_count;
    let complex = classified.count_complexity_above(6);

    let mut team_size = 3;
    if critical > 0 {
        team_size += 2;
    }
    if complex > 5 {
        team_size += 1;
    }
    if complex > 10 {
        team_size += 1;
    }

    let mut roles = vec![
        "Senior Developer (Team Lead)".to_string(),
        "QA Engineer".to_string(),
    ];
    let critical_security = classified
        .severity_bucket(Severity::Critical)
        .iter()
        .any(|i| i.category == Category::Security);
    if critical_security {
        roles.insert(1, "Security Specialist".to_string());
    }
    if complex > 5 {
        roles.push("Additional Senior Developer".to_string());
    }

    TeamRecommendation { team_size, roles }
}

fn build_testing_strategy(classified: &ClassifiedIssues) -> TestingStrategy {
    let mut stages = vec![
        TestingStage {
            name: "Unit Testing".to_string(),
            description: "Test individual fixes at component level".to_string(),
            coverage_target: "90%+".to_string(),
        },
        TestingStage {
            name: "Integration Testing".to_string(),
            description: "Test interactions between fixed components".to_string(),
            coverage_target: "80%+".to_string(),
        },
    ];
    if !classified.category_bucket(Category::Security).is_empty() {
        stages.push(TestingStage {
            name: "Security Testing".to_string(),
            description: "Penetration-test every security fix".to_string(),
            coverage_target: "100% of security fixes".to_string(),
        });
    }
    if !classified.category_bucket(Category::Performance).is_empty() {
        stages.push(TestingStage {
            name: "Performance Testing".to_string(),
            description: "Benchmark the performance improvements".to_string(),
            coverage_target: "All performance fixes".to_string(),
        });
    }
    stages.push(TestingStage {
        name: "Regression Testing".to_string(),
        description: "Ensure no new issues are introduced".to_string(),
        coverage_target: "Full application".to_string(),
    });
    TestingStrategy { stages }
}
