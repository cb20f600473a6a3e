use crate::core::{ScanReport, Severity};
use crate::plan::RiskLevel;
use colored::*;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &ScanReport) -> anyhow::Result<()>;
}

impl std::fmt::Debug for dyn OutputWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OutputWriter")
    }
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &ScanReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_all(json.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_report(&mut self, report: &ScanReport) -> anyhow::Result<()> {
        self.write_header(report)?;
        self.write_summary(report)?;
        self.write_phases(report)?;
        self.write_diagnostics(report)?;
        Ok(())
    }
}

impl<W: Write> MarkdownWriter<W> {
    fn write_header(&mut self, report: &ScanReport) -> anyhow::Result<()> {
        writeln!(self.writer, "# Fixmap Remediation Plan")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Generated: {}",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(self.writer, "Root: {}", report.root.display())?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_summary(&mut self, report: &ScanReport) -> anyhow::Result<()> {
        let summary = &report.plan.summary;
        writeln!(self.writer, "## Summary")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Value |")?;
        writeln!(self.writer, "|--------|-------|")?;
        writeln!(self.writer, "| Total issues | {} |", summary.total_issues)?;
        for severity in Severity::ALL {
            writeln!(
                self.writer,
                "| {severity} | {} |",
                report.classified.summary.severity_count(severity)
            )?;
        }
        writeln!(self.writer, "| Estimated hours | {:.1} |", summary.total_hours)?;
        writeln!(
            self.writer,
            "| Estimated duration | {} weeks |",
            summary.estimated_duration_weeks
        )?;
        writeln!(self.writer, "| Overall risk | {:?} |", summary.overall_risk)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_phases(&mut self, report: &ScanReport) -> anyhow::Result<()> {
        for phase in &report.plan.phases {
            writeln!(
                self.writer,
                "## Phase {}: {} ({:.1}h)",
                phase.phase_number,
                phase.name,
                phase.tasks.iter().map(|t| t.estimated_hours).sum::<f64>()
            )?;
            writeln!(self.writer)?;
            writeln!(self.writer, "{}", phase.description)?;
            writeln!(self.writer)?;
            for task in &phase.tasks {
                writeln!(
                    self.writer,
                    "- [ ] **{}** `{}` — {} issues, {:.1}h",
                    task.title, task.id, task.bugs_affected, task.estimated_hours
                )?;
                for subtask in &task.subtasks {
                    writeln!(
                        self.writer,
                        "  - [ ] {} `{}` ({:.1}h{})",
                        subtask.title,
                        subtask.id,
                        subtask.estimated_hours,
                        if subtask.requires_test {
                            ", tests required"
                        } else {
                            ""
                        }
                    )?;
                }
            }
            if phase.tasks.is_empty() {
                writeln!(self.writer, "_No issues in this phase._")?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn write_diagnostics(&mut self, report: &ScanReport) -> anyhow::Result<()> {
        if report.diagnostics.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "## Skipped Files")?;
        writeln!(self.writer)?;
        for diag in &report.diagnostics {
            writeln!(
                self.writer,
                "- `{}` — {}",
                diag.path.display(),
                diag.reason
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

pub struct TerminalWriter;

impl Default for TerminalWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalWriter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputWriter for TerminalWriter {
    fn write_report(&mut self, report: &ScanReport) -> anyhow::Result<()> {
        print_header();
        print_summary(report);
        print_top_issues(report);
        print_phases(report);
        print_diagnostics(report);
        Ok(())
    }
}

fn print_header() {
    println!("{}", "Fixmap Remediation Plan".bold().blue());
    println!("{}", "=======================".blue());
    println!();
}

fn print_summary(report: &ScanReport) {
    let summary = &report.plan.summary;
    println!("Summary:");
    println!("  Total issues: {}", summary.total_issues);
    println!(
        "  Critical: {}  High: {}  Medium: {}  Low: {}  Info: {}",
        summary.critical_count.to_string().red(),
        summary.high_count.to_string().yellow(),
        summary.medium_count,
        summary.low_count,
        summary.info_count
    );
    println!("  Estimated hours: {:.1}", summary.total_hours);
    println!(
        "  Estimated duration: {} weeks",
        summary.estimated_duration_weeks
    );
    let risk = match summary.overall_risk {
        RiskLevel::High => "HIGH".red().bold(),
        RiskLevel::Medium => "MEDIUM".yellow().bold(),
        RiskLevel::Low => "LOW".green().bold(),
    };
    println!("  Overall risk: {risk}");
    println!(
        "  Recommended team: {} people",
        report.plan.team_recommendation.team_size
    );
    println!();
}

fn print_top_issues(report: &ScanReport) {
    let urgent: Vec<_> = report
        .issues
        .iter()
        .filter(|i| matches!(i.severity, Severity::Critical | Severity::High))
        .collect();
    if urgent.is_empty() {
        return;
    }
    println!("{} ({}):", "Urgent issues".red().bold(), urgent.len());
    for issue in urgent.iter().take(10) {
        println!(
            "  {}:{} - {}",
            issue.file_path,
            issue.line_number,
            issue.title.yellow()
        );
    }
    println!();
}

fn print_phases(report: &ScanReport) {
    println!("Phases:");
    for phase in &report.plan.phases {
        let hours: f64 = phase.tasks.iter().map(|t| t.estimated_hours).sum();
        println!(
            "  Phase {}: {} — {} tasks, {hours:.1}h",
            phase.phase_number,
            phase.name,
            phase.tasks.len()
        );
    }
    println!();
}

fn print_diagnostics(report: &ScanReport) {
    if report.diagnostics.is_empty() {
        return;
    }
    println!(
        "{} {} file(s) skipped:",
        "Note:".yellow(),
        report.diagnostics.len()
    );
    for diag in &report.diagnostics {
        println!("  {} ({})", diag.path.display(), diag.reason);
    }
    println!();
}

pub fn create_writer(format: OutputFormat) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(std::io::stdout())),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(std::io::stdout())),
        OutputFormat::Terminal => Box::new(TerminalWriter::new()),
    }
}

/// Writer targeting a file. The terminal format only prints to stdout, so
/// combining it with an output file is rejected before the file is created.
pub fn create_file_writer(
    format: OutputFormat,
    path: &std::path::Path,
) -> anyhow::Result<Box<dyn OutputWriter>> {
    match format {
        OutputFormat::Json => Ok(Box::new(JsonWriter::new(std::fs::File::create(path)?))),
        OutputFormat::Markdown => Ok(Box::new(MarkdownWriter::new(std::fs::File::create(path)?))),
        OutputFormat::Terminal => {
            anyhow::bail!("terminal format writes to stdout; use json or markdown for file output")
        }
    }
}
