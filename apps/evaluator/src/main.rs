use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use frr_evaluator::config::Config;
use frr_evaluator::evaluation::{
    load_candidates, EvaluationRunner, JobCatalog, KeywordScreener, MultiStageScreener, RunOutput,
};
use frr_evaluator::extraction::RequirementExtractor;
use frr_evaluator::llm_client::{self, LlmClient};
use frr_evaluator::models::outcome::{EvaluationFailure, EvaluationOutcome};
use frr_evaluator::scoring::ScoringEngine;
use frr_evaluator::skills::{MatchMode, SkillMatcher};
use frr_evaluator::stats::{
    compare, load_ledger, render_report, save_comparison, validate_targets, Ledger, ReportInput,
    RunSummary,
};
use frr_evaluator::triage::{
    AuditLog, Critic, HeuristicCritic, LlmCritic, RetryPolicy, ReviewRequest, ReviewTriage,
};

#[derive(Serialize)]
struct SystemResults<'a> {
    summary: &'a RunSummary,
    outcomes: &'a [EvaluationOutcome],
    failures: &'a [EvaluationFailure],
}

/// Measures the false rejection rate of keyword screening against
/// multi-stage screening on the same candidates.
#[derive(Parser, Debug)]
#[command(name = "frr-evaluator", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate every candidate with both systems (the default)
    Run,
    /// Compare two previously saved results files without re-evaluating
    Compare {
        /// Baseline results, e.g. results/baseline_results.json
        baseline: PathBuf,
        /// Compared results, e.g. results/multistage_results.json
        compared: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        None | Some(Command::Run) => run(&config).await,
        Some(Command::Compare { baseline, compared }) => compare_saved(&config, &baseline, &compared),
    }
}

async fn run(config: &Config) -> Result<()> {
    info!("Starting FRR evaluator v{}", env!("CARGO_PKG_VERSION"));

    let matcher = SkillMatcher::standard();
    let extractor = RequirementExtractor::new(matcher.clone());

    let llm = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone()).context("Failed to build LLM client")?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(client)
        }
        None => {
            info!("No ANTHROPIC_API_KEY set, running rule-based only");
            None
        }
    };
    if config.use_llm_decomposition && llm.is_none() {
        warn!("USE_LLM_DECOMPOSITION is set but no API key is configured; ignoring");
    }
    let decomposer = llm.as_ref().filter(|_| config.use_llm_decomposition);

    let catalog = JobCatalog::load(&config.jobs_dir, &extractor, decomposer)
        .await
        .with_context(|| format!("Failed to load job descriptions from {}", config.jobs_dir.display()))?;
    let catalog = Arc::new(catalog);
    info!("Job catalog ready: {} categories", catalog.len());

    let candidates = load_candidates(&config.candidates_file).with_context(|| {
        format!("Failed to load candidates from {}", config.candidates_file.display())
    })?;

    // ── Baseline: exact keyword matching ────────────────────────────────────
    let baseline_engine = ScoringEngine::new(
        matcher.clone(),
        config.weights,
        config.baseline_thresholds,
        MatchMode::Exact,
    );
    let baseline_runner = EvaluationRunner::new(
        Arc::new(KeywordScreener::new(baseline_engine)),
        catalog.clone(),
        config.batch_size,
    );
    let baseline = baseline_runner.run(&candidates).await;

    // ── Multi-stage: fuzzy scoring plus review triage ───────────────────────
    let critic: Arc<dyn Critic> = match &llm {
        Some(client) => Arc::new(LlmCritic::new(client.clone())),
        None => Arc::new(HeuristicCritic::new(matcher.clone())),
    };
    info!("Triage critic: {}", critic.name());

    let (audit, mut review_rx) = AuditLog::with_channel();
    let audit = Arc::new(audit);
    let triage = ReviewTriage::new(
        matcher.clone(),
        critic,
        RetryPolicy::default(),
        config.hitl_confidence_threshold,
        audit.clone(),
    );
    let multi_engine = ScoringEngine::new(
        matcher.clone(),
        config.weights,
        config.multistage_thresholds,
        MatchMode::Fuzzy,
    );
    let multi_runner = EvaluationRunner::new(
        Arc::new(MultiStageScreener::new(multi_engine, matcher, triage)),
        catalog,
        config.batch_size,
    );
    let multi = multi_runner.run(&candidates).await;

    let mut review_requests: Vec<ReviewRequest> = Vec::new();
    while let Ok(request) = review_rx.try_recv() {
        review_requests.push(request);
    }
    info!(
        "Triage: {} completed, {} sent to review ({:.1}%)",
        audit.completed(),
        audit.needs_review(),
        audit.review_rate() * 100.0
    );

    // ── Output ──────────────────────────────────────────────────────────────
    let out = &config.output_dir;
    tokio::fs::create_dir_all(out)
        .await
        .with_context(|| format!("Failed to create {}", out.display()))?;

    let baseline_summary = summarize(&baseline, config.baseline_target_frr, config.frr_tolerance);
    let multi_summary = summarize(&multi, config.improvement_target_frr, config.frr_tolerance);

    write_json(
        &out.join("baseline_results.json"),
        &SystemResults {
            summary: &baseline_summary,
            outcomes: baseline.ledger.entries(),
            failures: &baseline.failures,
        },
    )
    .await?;
    write_json(
        &out.join("multistage_results.json"),
        &SystemResults {
            summary: &multi_summary,
            outcomes: multi.ledger.entries(),
            failures: &multi.failures,
        },
    )
    .await?;
    write_json(&out.join("triage_reports.json"), &multi.triage_reports).await?;
    write_json(&out.join("review_requests.json"), &review_requests).await?;

    publish_comparison(
        config,
        (&baseline.ledger, &baseline_summary),
        (&multi.ledger, &multi_summary),
    )
}

/// Re-runs the statistics over two saved results files.
fn compare_saved(config: &Config, baseline_path: &Path, compared_path: &Path) -> Result<()> {
    let baseline = load_ledger(baseline_path)
        .with_context(|| format!("Failed to load {}", baseline_path.display()))?;
    let compared = load_ledger(compared_path)
        .with_context(|| format!("Failed to load {}", compared_path.display()))?;

    let label = |path: &Path| {
        path.file_stem()
            .map(|s| s.to_string_lossy().trim_end_matches("_results").to_string())
            .unwrap_or_default()
    };
    let baseline_summary = RunSummary::from_ledger(
        label(baseline_path),
        &baseline,
        config.baseline_target_frr,
        config.frr_tolerance,
        0,
        0,
    );
    let compared_summary = RunSummary::from_ledger(
        label(compared_path),
        &compared,
        config.improvement_target_frr,
        config.frr_tolerance,
        0,
        0,
    );

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;
    publish_comparison(
        config,
        (&baseline, &baseline_summary),
        (&compared, &compared_summary),
    )
}

/// Compares, validates, and writes `comparison.json` and `frr_report.md`.
fn publish_comparison(
    config: &Config,
    (baseline, baseline_summary): (&Ledger, &RunSummary),
    (compared, compared_summary): (&Ledger, &RunSummary),
) -> Result<()> {
    let record = compare(baseline, compared, config.significance_alpha);
    let validation = validate_targets(
        &record,
        config.baseline_target_frr,
        config.improvement_target_frr,
    );
    let report = render_report(&ReportInput {
        record: &record,
        validation: &validation,
        baseline: baseline_summary,
        compared: compared_summary,
        alpha: config.significance_alpha,
    });

    let out = &config.output_dir;
    let comparison_path = out.join("comparison.json");
    save_comparison(&comparison_path, &record, &validation)
        .with_context(|| format!("Failed to write {}", comparison_path.display()))?;
    let report_path = out.join("frr_report.md");
    std::fs::write(&report_path, &report)
        .with_context(|| format!("Failed to write {}", report_path.display()))?;

    info!("Results written to {}", out.display());
    println!("{report}");
    Ok(())
}

fn summarize(output: &RunOutput, target: f64, tolerance: f64) -> RunSummary {
    RunSummary::from_ledger(
        output.system.clone(),
        &output.ledger,
        target,
        tolerance,
        output.failures.len(),
        output.skipped,
    )
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
