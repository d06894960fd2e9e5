//! Command-line interface for codepulse.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use walkdir::WalkDir;

use crate::analyzers;
use crate::analyzers::Severity;
use crate::config::EngineOptions;
use crate::job::{AnalysisEngine, JobStatus};
use crate::report::AnalysisReport;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Maximum findings shown in pretty output.
const MAX_SHOWN_FINDINGS: usize = 10;

/// Asynchronous code quality analysis engine.
///
/// Codepulse runs per-language detectors over a source tree and reports
/// prioritized findings, a 0-100 quality score, recommendations, and a
/// technical-debt estimate. Finished analyses can answer follow-up
/// questions through a retrieval index over the analyzed code.
#[derive(Parser)]
#[command(name = "codepulse")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a file or directory and print the quality report
    #[command(visible_alias = "check")]
    Analyze(AnalyzeArgs),
    /// Analyze a path, then retrieve code context for a question
    Ask(AskArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Path to analyze (file or directory)
    pub path: PathBuf,

    /// Emit the full report as JSON instead of the summary
    #[arg(long)]
    pub json: bool,

    /// Path to an engine options YAML file
    #[arg(short, long)]
    pub options: Option<PathBuf>,

    /// Minimum acceptable quality score (exit non-zero below it)
    #[arg(short, long)]
    pub threshold: Option<f64>,
}

/// Arguments for the ask command.
#[derive(Parser)]
pub struct AskArgs {
    /// Path to analyze (file or directory)
    pub path: PathBuf,

    /// Question about the analyzed code
    pub question: String,

    /// Number of code chunks to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Path to an engine options YAML file
    #[arg(short, long)]
    pub options: Option<PathBuf>,
}

/// Load engine options, falling back to defaults when no file is given.
fn load_options(path: &Option<PathBuf>) -> anyhow::Result<EngineOptions> {
    match path {
        Some(p) => EngineOptions::from_file(p),
        None => Ok(EngineOptions::default()),
    }
}

/// Collect analyzable files under a path into a path -> content map.
///
/// Only extensions with a registered detector are picked up; hidden
/// directories and dependency trees are skipped.
fn collect_files(root: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    let extensions = analyzers::supported_extensions();
    let mut files = BTreeMap::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            if e.file_type().is_dir()
                && (name.starts_with('.')
                    || name == "node_modules"
                    || name == "vendor"
                    || name == "target")
            {
                return false;
            }
            true
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        if !extensions.contains(&ext) {
            continue;
        }
        match std::fs::read_to_string(path) {
            Ok(content) => {
                files.insert(path.display().to_string(), content);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
            }
        }
    }

    Ok(files)
}

/// Run a full analysis job to a terminal state and return its report.
async fn analyze_path(
    engine: &AnalysisEngine,
    path: &Path,
) -> anyhow::Result<Result<(uuid::Uuid, AnalysisReport), String>> {
    if !path.exists() {
        anyhow::bail!("path does not exist: {}", path.display());
    }
    let files = collect_files(path)?;

    let id = engine.submit(files);
    let record = engine
        .wait(id)
        .await
        .ok_or_else(|| anyhow::anyhow!("job record disappeared"))?;

    match record.status {
        JobStatus::Completed => {
            let report = record
                .report
                .ok_or_else(|| anyhow::anyhow!("completed job has no report"))?;
            Ok(Ok((id, report)))
        }
        _ => Ok(Err(record
            .error
            .unwrap_or_else(|| format!("job ended as {}", record.status)))),
    }
}

/// Run the analyze command.
pub async fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    let options = load_options(&args.options)?;
    let threshold = args.threshold.unwrap_or(options.score_threshold);
    let engine = AnalysisEngine::new(options);

    let (_, report) = match analyze_path(&engine, &args.path).await? {
        Ok(ok) => ok,
        Err(message) => {
            eprintln!("{} {}", "Error:".red().bold(), message);
            return Ok(EXIT_ERROR);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, threshold);
    }

    if report.summary.quality_score < threshold {
        return Ok(EXIT_FAILED);
    }
    Ok(EXIT_SUCCESS)
}

/// Run the ask command.
pub async fn run_ask(args: &AskArgs) -> anyhow::Result<i32> {
    let options = load_options(&args.options)?;
    let engine = AnalysisEngine::new(options);

    let (id, _) = match analyze_path(&engine, &args.path).await? {
        Ok(ok) => ok,
        Err(message) => {
            eprintln!("{} {}", "Error:".red().bold(), message);
            return Ok(EXIT_ERROR);
        }
    };

    match engine.context(id, &args.question, args.top_k) {
        Some(context) => {
            println!("{}", context);
            Ok(EXIT_SUCCESS)
        }
        None => {
            eprintln!("{} job record disappeared", "Error:".red().bold());
            Ok(EXIT_ERROR)
        }
    }
}

/// Pretty-print the report summary to stdout.
fn print_report(report: &AnalysisReport, threshold: f64) {
    let summary = &report.summary;
    let score = summary.quality_score;
    let score_str = format!("{:.1}", score);
    let score_colored = if score >= 80.0 {
        score_str.green().bold()
    } else if score >= threshold {
        score_str.yellow().bold()
    } else {
        score_str.red().bold()
    };

    println!("{}", "Codepulse Analysis".bold());
    println!(
        "  {} files, {} lines ({})",
        summary.total_files,
        summary.total_lines,
        if summary.languages.is_empty() {
            "no recognized languages".to_string()
        } else {
            summary
                .languages
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        }
    );
    println!("  Quality score: {}/100", score_colored);
    println!();

    if report.findings.is_empty() {
        println!("{}", "No issues found.".green());
    } else {
        let high = count_by(report, Severity::High);
        let medium = count_by(report, Severity::Medium);
        let low = count_by(report, Severity::Low);
        println!(
            "{} ({} high, {} medium, {} low)",
            format!("{} findings", report.findings.len()).bold(),
            high.to_string().red(),
            medium.to_string().yellow(),
            low
        );
        for finding in report.findings.iter().take(MAX_SHOWN_FINDINGS) {
            let severity = match finding.severity {
                Severity::High => finding.severity.as_str().red(),
                Severity::Medium => finding.severity.as_str().yellow(),
                Severity::Low => finding.severity.as_str().normal(),
            };
            let line = finding
                .line
                .map(|l| format!(":{}", l))
                .unwrap_or_default();
            println!(
                "  [{}] {}{} - {}",
                severity, finding.file, line, finding.message
            );
        }
        if report.findings.len() > MAX_SHOWN_FINDINGS {
            println!(
                "  ... and {} more (use --json for the full list)",
                report.findings.len() - MAX_SHOWN_FINDINGS
            );
        }
    }
    println!();

    if !report.recommendations.is_empty() {
        println!("{}", "Recommendations".bold());
        for rec in &report.recommendations {
            println!("  - {}", rec);
        }
        println!();
    }

    if !report.critical_areas.is_empty() {
        println!("{}", "Critical areas".bold());
        for area in &report.critical_areas {
            println!("  - {}", area.red());
        }
        println!();
    }

    let debt = &report.technical_debt;
    println!(
        "{} {:.1} hours ({:.1} days), {:.1} hours high-priority",
        "Estimated debt:".bold(),
        debt.total_hours,
        debt.total_days,
        debt.priority_hours
    );
}

fn count_by(report: &AnalysisReport, severity: Severity) -> usize {
    report
        .findings
        .iter()
        .filter(|f| f.severity == severity)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_files_filters_by_extension() {
        crate::init();
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        fs::write(dir.path().join("b.ts"), "let x = 1;\n").unwrap();
        fs::write(dir.path().join("notes.md"), "# notes\n").unwrap();

        let files = collect_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.keys().any(|k| k.ends_with("a.py")));
        assert!(files.keys().any(|k| k.ends_with("b.ts")));
    }

    #[test]
    fn test_collect_files_skips_hidden_and_vendor_dirs() {
        crate::init();
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git").join("hook.py"), "x = 1\n").unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules").join("dep.js"), "x\n").unwrap();
        fs::write(dir.path().join("main.py"), "x = 1\n").unwrap();

        let files = collect_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files.keys().next().unwrap().ends_with("main.py"));
    }

    #[tokio::test]
    async fn test_analyze_path_reports_missing_path() {
        crate::init();
        let engine = AnalysisEngine::new(EngineOptions::default());
        let result = analyze_path(&engine, Path::new("/nonexistent/nowhere")).await;
        assert!(result.is_err());
    }
}
