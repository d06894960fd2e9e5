//! End-to-end pipeline tests: submit file sets through the engine and
//! check the terminal records, reports, and retrieval context.

use std::collections::BTreeMap;

use codepulse::analyzers::{Category, Severity};
use codepulse::job::JobStatus;
use codepulse::{AnalysisEngine, EngineOptions};

fn engine() -> AnalysisEngine {
    codepulse::init();
    AnalysisEngine::new(EngineOptions::default())
}

fn files(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(p, c)| (p.to_string(), c.to_string()))
        .collect()
}

#[tokio::test]
async fn analyzes_mixed_submission_to_completion() {
    let engine = engine();
    let id = engine.submit(files(&[
        (
            "src/auth.py",
            "password = \"hunter2\"\nfor a in items:\n    for b in a:\n        for c in b:\n            total = total + c\n",
        ),
        ("README.txt", "not source code\n"),
    ]));

    let record = engine.wait(id).await.expect("job exists");
    assert_eq!(record.status, JobStatus::Completed);
    assert_eq!(record.progress, 100);

    let report = record.report.expect("completed job carries a report");
    // Unrecognized files count toward totals but not languages.
    assert_eq!(report.summary.total_files, 2);
    assert!(report.summary.languages.contains("python"));
    assert!(!report.summary.languages.contains("unknown"));

    assert!(report
        .findings
        .iter()
        .any(|f| f.category == Category::Security && f.severity == Severity::High));
    assert!(report
        .findings
        .iter()
        .any(|f| f.category == Category::Performance));
    assert!(report.summary.quality_score < 100.0);

    // Findings come back prioritized: severities never increase.
    let weights: Vec<u32> = report.findings.iter().map(|f| f.severity.weight()).collect();
    assert!(weights.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn clean_simple_file_scores_high() {
    let engine = engine();
    let id = engine.submit(files(&[("util.py", "x = 1\ny = 2\n")]));

    let record = engine.wait(id).await.unwrap();
    let report = record.report.unwrap();
    assert_eq!(report.summary.quality_score, 100.0);
    assert!(report.findings.is_empty());
    assert_eq!(
        report.recommendations,
        vec!["Code looks healthy; keep up current practices".to_string()]
    );
}

#[tokio::test]
async fn single_high_finding_deducts_fifteen() {
    let engine = engine();
    let id = engine.submit(files(&[("cfg.py", "api_key = \"abc123\"\n")]));

    let record = engine.wait(id).await.unwrap();
    let report = record.report.unwrap();
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.summary.quality_score, 85.0);
}

#[tokio::test]
async fn empty_submission_fails_validation() {
    let engine = engine();
    let id = engine.submit(BTreeMap::new());

    // The record is already terminal when first observed.
    let record = engine.status(id).expect("record exists immediately");
    assert_eq!(record.status, JobStatus::Failed);
    assert!(record.error.unwrap().contains("no files"));
    assert!(record.report.is_none());
}

#[tokio::test]
async fn cancel_before_pipeline_starts() {
    // Current-thread runtime: the spawned pipeline cannot run until the
    // first await, so cancelling right after submit always lands first.
    let engine = engine();
    let id = engine.submit(files(&[("a.py", "x = 1\n")]));
    assert!(engine.cancel(id));

    let record = engine.wait(id).await.unwrap();
    assert_eq!(record.status, JobStatus::Cancelled);
    assert!(record.report.is_none());

    // Cancel is a no-op on terminal jobs.
    assert!(!engine.cancel(id));
}

#[tokio::test]
async fn exhausted_time_budget_fails_the_job() {
    codepulse::init();
    let engine = AnalysisEngine::new(EngineOptions {
        timeout_secs: 0,
        ..EngineOptions::default()
    });
    let id = engine.submit(files(&[("a.py", "x = 1\n")]));

    let record = engine.wait(id).await.unwrap();
    assert_eq!(record.status, JobStatus::Failed);
    assert!(record.error.unwrap().contains("timed out"));
    assert!(record.report.is_none());
}

#[tokio::test]
async fn parse_failure_is_isolated_to_one_file() {
    let engine = engine();
    let id = engine.submit(files(&[
        ("broken.py", "def f(:\n"),
        ("fine.py", "x = 1\n"),
    ]));

    let record = engine.wait(id).await.unwrap();
    assert_eq!(record.status, JobStatus::Completed);

    let report = record.report.unwrap();
    let parse_errors: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.category == Category::ParseError)
        .collect();
    assert_eq!(parse_errors.len(), 1);
    assert_eq!(parse_errors[0].file, "broken.py");
    assert_eq!(parse_errors[0].severity, Severity::High);
}

#[tokio::test]
async fn context_retrieves_relevant_chunks() {
    let engine = engine();
    let id = engine.submit(files(&[
        (
            "login.py",
            "def check_password(user):\n    password = \"letmein\"\n    return password\n",
        ),
        ("math_utils.py", "def add(a, b):\n    return a + b\n"),
    ]));
    engine.wait(id).await.unwrap();

    let context = engine.context(id, "password security issue", None).unwrap();
    assert!(context.contains("login.py"));
    assert!(context.contains("lines 1-"));
}

#[tokio::test]
async fn context_degrades_for_failed_job() {
    let engine = engine();
    let id = engine.submit(BTreeMap::new());

    let context = engine.context(id, "anything", None).unwrap();
    assert!(context.contains("No retrieval index"));
}

#[tokio::test]
async fn typescript_pattern_detection_end_to_end() {
    let engine = engine();
    let id = engine.submit(files(&[(
        "app.ts",
        "const data: any = eval(input);\nconsole.log(data);\n",
    )]));

    let record = engine.wait(id).await.unwrap();
    let report = record.report.unwrap();
    assert!(report
        .findings
        .iter()
        .any(|f| f.category == Category::Security && f.message.contains("eval")));
    assert!(report
        .findings
        .iter()
        .any(|f| f.category == Category::TypeSafety));
    assert!(report.summary.languages.contains("typescript"));
}
