//! Bounded-batch evaluation of a candidate set against one screener.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::errors::AppError;
use crate::evaluation::loader::JobCatalog;
use crate::evaluation::screeners::{ScreeningResult, Screener};
use crate::models::candidate::CandidateProfile;
use crate::models::outcome::EvaluationFailure;
use crate::stats::ledger::Ledger;
use crate::triage::TriageReport;

/// Everything one system produced over one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOutput {
    pub system: String,
    pub ledger: Ledger,
    pub triage_reports: Vec<TriageReport>,
    pub failures: Vec<EvaluationFailure>,
    /// Candidates with no job category in the catalog.
    pub skipped: usize,
}

pub struct EvaluationRunner {
    screener: Arc<dyn Screener>,
    catalog: Arc<JobCatalog>,
    batch_size: usize,
}

impl EvaluationRunner {
    pub fn new(screener: Arc<dyn Screener>, catalog: Arc<JobCatalog>, batch_size: usize) -> Self {
        Self {
            screener,
            catalog,
            batch_size: batch_size.max(1),
        }
    }

    /// Evaluates one candidate against a named category. Unknown categories
    /// are an error here; `run` skips them instead.
    pub async fn evaluate_one(
        &self,
        candidate: &CandidateProfile,
        category: &str,
    ) -> Result<ScreeningResult, AppError> {
        let job = self.catalog.get(category)?;
        self.screener.screen(candidate, &job).await
    }

    /// Screens every resolvable candidate, `batch_size` at a time. Each batch
    /// is fully gathered before its outcomes are appended, in input order.
    pub async fn run(&self, candidates: &[CandidateProfile]) -> RunOutput {
        let system = self.screener.name();
        let mut output = RunOutput {
            system: system.to_string(),
            ..RunOutput::default()
        };

        let mut work = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match self.catalog.resolve(candidate) {
                Some(category) => match self.catalog.get(category) {
                    Ok(job) => work.push((candidate.clone(), job)),
                    Err(e) => {
                        warn!("{}: candidate {} skipped: {}", system, candidate.id, e);
                        output.skipped += 1;
                    }
                },
                None => {
                    debug!(
                        "{}: no job category for candidate {} (actual {:?}, predicted {:?})",
                        system, candidate.id, candidate.actual_category, candidate.predicted_position
                    );
                    output.skipped += 1;
                }
            }
        }

        let batches = work.len().div_ceil(self.batch_size);
        info!(
            "{}: evaluating {} candidates in {} batches ({} skipped)",
            system,
            work.len(),
            batches,
            output.skipped
        );

        for (batch_no, batch) in work.chunks(self.batch_size).enumerate() {
            let mut set = JoinSet::new();
            for (idx, (candidate, job)) in batch.iter().enumerate() {
                let screener = self.screener.clone();
                let candidate = candidate.clone();
                let job = job.clone();
                set.spawn(async move {
                    let result = screener.screen(&candidate, &job).await;
                    (idx, result)
                });
            }

            let mut slots: Vec<Option<Result<ScreeningResult, AppError>>> =
                (0..batch.len()).map(|_| None).collect();
            while let Some(res) = set.join_next().await {
                match res {
                    Ok((idx, result)) => slots[idx] = Some(result),
                    Err(e) => error!(%e, "{} evaluation task failed", system),
                }
            }

            let mut outcomes = Vec::with_capacity(batch.len());
            for ((candidate, job), slot) in batch.iter().zip(slots) {
                let result = slot.unwrap_or_else(|| {
                    Err(AppError::Internal(anyhow::anyhow!("evaluation task panicked")))
                });
                match result {
                    Ok(screened) => {
                        outcomes.push(screened.outcome);
                        if let Some(report) = screened.triage {
                            output.triage_reports.push(report);
                        }
                    }
                    Err(e) => {
                        warn!("{}: candidate {} failed: {}", system, candidate.id, e);
                        output.failures.push(EvaluationFailure {
                            candidate_id: candidate.id.clone(),
                            job_category: Some(job.category.clone()),
                            code: e.code().to_string(),
                            message: e.to_string(),
                        });
                    }
                }
            }

            output.ledger.append_batch(outcomes);
            debug!(
                "{}: batch {}/{} done, ledger at {}",
                system,
                batch_no + 1,
                batches,
                output.ledger.len()
            );
        }

        info!(
            "{}: finished with {} outcomes, {} failures, FRR {:.3}",
            system,
            output.ledger.len(),
            output.failures.len(),
            output.ledger.frr()
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::screeners::KeywordScreener;
    use crate::models::job::JobRequirement;
    use crate::models::outcome::{Decision, DimensionScores, EvaluationOutcome};
    use crate::scoring::{ScoringEngine, ScoringWeights, Thresholds};
    use crate::skills::{MatchMode, SkillMatcher};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn catalog() -> Arc<JobCatalog> {
        let mut catalog = JobCatalog::new();
        catalog.insert(JobRequirement {
            required_skills: vec!["python".to_string(), "django".to_string()],
            min_experience_years: 2,
            ..JobRequirement::empty("Python Developer")
        });
        Arc::new(catalog)
    }

    fn candidate(id: &str, category: Option<&str>) -> CandidateProfile {
        CandidateProfile {
            id: id.to_string(),
            skills: Some("Python, Django".to_string()),
            experience: Some("3 years".to_string()),
            actual_category: category.map(str::to_string),
            ..Default::default()
        }
    }

    /// Fails on ids starting with "bad", panics on "boom", and finishes in
    /// reverse id order so completion order differs from input order.
    struct FlakyScreener;

    #[async_trait]
    impl Screener for FlakyScreener {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn screen(
            &self,
            candidate: &CandidateProfile,
            job: &JobRequirement,
        ) -> Result<ScreeningResult, AppError> {
            let n: u64 = candidate.id.trim_start_matches(|c: char| !c.is_ascii_digit()).parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(100 - n)).await;
            if candidate.id.starts_with("bad") {
                return Err(AppError::Critique("retries exhausted".to_string()));
            }
            if candidate.id.starts_with("boom") {
                panic!("screener blew up");
            }
            Ok(ScreeningResult {
                outcome: EvaluationOutcome {
                    candidate_id: candidate.id.clone(),
                    job_category: job.category.clone(),
                    scores: DimensionScores::default(),
                    matched_skills: vec![],
                    missing_skills: vec![],
                    overall_score: 0.6,
                    qualified: true,
                    decision: Decision::Accept,
                    rejection_reason: None,
                },
                triage: None,
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_keeps_input_order_and_isolates_failures() {
        let runner = EvaluationRunner::new(Arc::new(FlakyScreener), catalog(), 3);
        let candidates = vec![
            candidate("c1", Some("Python Developer")),
            candidate("bad2", Some("Python Developer")),
            candidate("c3", Some("Python Developer")),
            candidate("boom4", Some("Python Developer")),
            candidate("c5", Some("Astronaut")),
            candidate("c6", Some("Python Developer")),
        ];

        let output = runner.run(&candidates).await;

        let ids: Vec<_> = output
            .ledger
            .entries()
            .iter()
            .map(|o| o.candidate_id.as_str())
            .collect();
        assert_eq!(ids, vec!["c1", "c3", "c6"]);
        assert_eq!(output.skipped, 1);
        assert_eq!(output.failures.len(), 2);
        assert_eq!(output.failures[0].candidate_id, "bad2");
        assert_eq!(output.failures[0].code, "CRITIQUE_FAILED");
        assert_eq!(output.failures[1].candidate_id, "boom4");
        assert_eq!(output.failures[1].code, "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_evaluate_one_unknown_category() {
        let engine = ScoringEngine::new(
            SkillMatcher::standard(),
            ScoringWeights::default(),
            Thresholds::baseline(),
            MatchMode::Exact,
        );
        let runner = EvaluationRunner::new(Arc::new(KeywordScreener::new(engine)), catalog(), 10);
        let err = runner
            .evaluate_one(&candidate("c1", None), "Astronaut")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownJobCategory(_)));

        let ok = runner
            .evaluate_one(&candidate("c1", None), "Python Developer")
            .await
            .unwrap();
        assert_eq!(ok.outcome.job_category, "Python Developer");
    }

    #[tokio::test]
    async fn test_keyword_run_fills_ledger() {
        let engine = ScoringEngine::new(
            SkillMatcher::standard(),
            ScoringWeights::default(),
            Thresholds::baseline(),
            MatchMode::Exact,
        );
        let runner = EvaluationRunner::new(Arc::new(KeywordScreener::new(engine)), catalog(), 2);
        let candidates: Vec<_> = (0..5)
            .map(|i| candidate(&format!("c{i}"), Some("Python Developer")))
            .collect();

        let output = runner.run(&candidates).await;
        assert_eq!(output.system, "keyword");
        assert_eq!(output.ledger.len(), 5);
        assert!(output.failures.is_empty());
        assert!(output.triage_reports.is_empty());
    }
}
