//! The two decision systems under comparison, behind one trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::extraction::StructuredProfile;
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobRequirement;
use crate::models::outcome::EvaluationOutcome;
use crate::scoring::{adjusted_overall, ScoringEngine};
use crate::skills::SkillMatcher;
use crate::triage::{ReviewTriage, TriageReport};

/// Result of screening one candidate. `triage` is only set by systems that
/// run the review pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub outcome: EvaluationOutcome,
    pub triage: Option<TriageReport>,
}

/// A hiring decision system. Implement this to put another system into the
/// comparison without touching the runner.
///
/// Carried by the runner as `Arc<dyn Screener>`.
#[async_trait]
pub trait Screener: Send + Sync {
    fn name(&self) -> &'static str;

    async fn screen(
        &self,
        candidate: &CandidateProfile,
        job: &JobRequirement,
    ) -> Result<ScreeningResult, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordScreener
// ────────────────────────────────────────────────────────────────────────────

/// Exact keyword matching, the baseline system.
pub struct KeywordScreener {
    engine: ScoringEngine,
}

impl KeywordScreener {
    pub fn new(engine: ScoringEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Screener for KeywordScreener {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn screen(
        &self,
        candidate: &CandidateProfile,
        job: &JobRequirement,
    ) -> Result<ScreeningResult, AppError> {
        Ok(ScreeningResult {
            outcome: self.engine.evaluate(candidate, job),
            triage: None,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MultiStageScreener
// ────────────────────────────────────────────────────────────────────────────

/// Fuzzy scoring plus review triage.
///
/// The fuzzy engine's overall score is shifted by the critique (its
/// confidence and reviewed score) before the thresholds decide. A candidate
/// whose critique cannot be obtained fails as a whole and stays out of the
/// ledger.
pub struct MultiStageScreener {
    engine: ScoringEngine,
    matcher: SkillMatcher,
    triage: ReviewTriage,
}

impl MultiStageScreener {
    pub fn new(engine: ScoringEngine, matcher: SkillMatcher, triage: ReviewTriage) -> Self {
        Self {
            engine,
            matcher,
            triage,
        }
    }

    pub fn triage(&self) -> &ReviewTriage {
        &self.triage
    }
}

#[async_trait]
impl Screener for MultiStageScreener {
    fn name(&self) -> &'static str {
        "multi_stage"
    }

    async fn screen(
        &self,
        candidate: &CandidateProfile,
        job: &JobRequirement,
    ) -> Result<ScreeningResult, AppError> {
        let fuzzy = self.engine.evaluate(candidate, job);
        let profile = StructuredProfile::from_candidate(candidate, &self.matcher);

        let report = self
            .triage
            .run(job, &profile)
            .await
            .map_err(|e| AppError::Critique(e.to_string()))?;

        let base = fuzzy.overall_score;
        let overall = adjusted_overall(base, report.critic_confidence, report.critic_score);
        let outcome = self.engine.rescore(fuzzy, overall);

        debug!(
            workflow_id = %report.workflow_id,
            "{} screened: fuzzy {:.3} -> {:.3} ({:?}), triage confidence {:.3}",
            candidate.id,
            base,
            outcome.overall_score,
            outcome.decision,
            report.confidence
        );

        Ok(ScreeningResult {
            outcome,
            triage: Some(report),
        })
    }
}
