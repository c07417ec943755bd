//! Confidence-based human-review triage.
//!
//! Stages run strictly in order: initial screening, critique, confidence
//! synthesis, review classification, explanation, audit. Only the critique
//! touches the outside world.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::extraction::StructuredProfile;
use crate::models::job::JobRequirement;
use crate::models::outcome::SkillMatch;
use crate::skills::{LearningPath, SkillGapAnalysis, SkillMatcher};
use crate::triage::audit::AuditLog;
use crate::triage::critique::{Critic, CritiqueError, CritiqueResult, RetryPolicy, TransferableSkillPair};

const SKILL_WEIGHT: f64 = 0.7;
const EXPERIENCE_WEIGHT: f64 = 0.3;
/// Confidence of a requirement covered through a related skill.
pub const RELATED_MATCH_CONFIDENCE: f64 = 0.7;
/// Initial scores below this always go to a human.
const LOW_INITIAL_SCORE: f64 = 0.4;
const LARGE_SCORE_GAP: f64 = 0.3;
const HIDDEN_GEM_MIN_INDICATORS: usize = 2;
const FULL_REVIEW_CONFIDENCE: f64 = 0.6;

// ────────────────────────────────────────────────────────────────────────────
// Records
// ────────────────────────────────────────────────────────────────────────────

/// Identifiers for one pass through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowContext {
    pub workflow_id: String,
    pub job_id: String,
    pub candidate_id: String,
}

impl WorkflowContext {
    pub fn new(job_id: impl Into<String>, candidate_id: impl Into<String>) -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self {
            workflow_id: format!("wf_{}", &hex[..8]),
            job_id: job_id.into(),
            candidate_id: candidate_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialScreening {
    pub score: f64,
    pub skill_similarity: f64,
    pub experience_score: f64,
    pub matched_skills: Vec<SkillMatch>,
    pub missing_skills: Vec<String>,
    pub experience_match: bool,
    pub skill_coverage: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialCases {
    pub hidden_gem: bool,
    pub high_bias_risk: bool,
    pub large_score_gap: bool,
}

impl SpecialCases {
    pub fn any(&self) -> bool {
        self.hidden_gem || self.high_bias_risk || self.large_score_gap
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewType {
    None,
    Deep,
    ScoreReconciliation,
    Full,
    Quick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPriority {
    Normal,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceAssessment {
    pub confidence: f64,
    pub score_difference: f64,
    pub special_cases: SpecialCases,
    pub needs_review: bool,
    pub review_type: ReviewType,
    pub review_priority: ReviewPriority,
}

/// Everything the pipeline decided about one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageReport {
    pub workflow_id: String,
    pub job_id: String,
    pub candidate_id: String,
    pub screening_score: f64,
    pub critic_score: f64,
    /// The critic's confidence in its own assessment.
    pub critic_confidence: f64,
    pub confidence: f64,
    pub needs_review: bool,
    pub review_type: ReviewType,
    pub review_priority: ReviewPriority,
    pub hidden_gem: bool,
    pub explanation: String,
    pub bias_flags: Vec<String>,
    pub matched_skills: Vec<SkillMatch>,
    pub missing_skills: Vec<String>,
    pub transferable_skills: Vec<TransferableSkillPair>,
    pub skill_gaps: SkillGapAnalysis,
    pub learning_path: LearningPath,
    pub reasoning: String,
    pub critic: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Stages
// ────────────────────────────────────────────────────────────────────────────

/// 0.7 × skill similarity + 0.3 × experience ratio. Requirements the
/// candidate lacks but covers through a related skill are listed as matched
/// with confidence 0.7.
pub fn initial_screening(
    profile: &StructuredProfile,
    requirement: &JobRequirement,
    matcher: &SkillMatcher,
) -> InitialScreening {
    let required = matcher.canonical_set(requirement.required_skills.iter().map(String::as_str));
    let candidate: BTreeSet<String> = profile.skills.iter().cloned().collect();

    let mut matched_skills: Vec<SkillMatch> = required
        .intersection(&candidate)
        .map(|skill| SkillMatch {
            required: skill.clone(),
            found: skill.clone(),
            confidence: 1.0,
        })
        .collect();

    let mut missing_skills = Vec::new();
    for skill in required.difference(&candidate) {
        let substitute = matcher
            .related_skills(skill)
            .into_iter()
            .find(|related| candidate.contains(related));
        match substitute {
            Some(found) => matched_skills.push(SkillMatch {
                required: skill.clone(),
                found,
                confidence: RELATED_MATCH_CONFIDENCE,
            }),
            None => missing_skills.push(skill.clone()),
        }
    }

    let required_years = requirement.min_experience_years as f64;
    let skill_similarity = matcher.skill_similarity(&required, &candidate);
    let experience_score = (profile.total_experience_years / required_years.max(1.0)).min(1.0);

    InitialScreening {
        score: SKILL_WEIGHT * skill_similarity + EXPERIENCE_WEIGHT * experience_score,
        skill_similarity,
        experience_score,
        experience_match: profile.total_experience_years >= required_years,
        skill_coverage: matched_skills.len() as f64 / required.len().max(1) as f64,
        matched_skills,
        missing_skills,
    }
}

pub fn is_hidden_gem(critique: &CritiqueResult, initial_score: f64) -> bool {
    critique.hidden_gem_indicators.len() >= HIDDEN_GEM_MIN_INDICATORS
        || critique.adjusted_score - initial_score > LARGE_SCORE_GAP
}

pub fn assess_confidence(
    initial_score: f64,
    critique: &CritiqueResult,
    hidden_gem: bool,
    hitl_threshold: f64,
) -> ConfidenceAssessment {
    let score_difference = (initial_score - critique.adjusted_score).abs();
    let confidence = critique.confidence * (1.0 - score_difference);
    let special_cases = SpecialCases {
        hidden_gem,
        high_bias_risk: critique.bias_flags.len() > 1,
        large_score_gap: score_difference > LARGE_SCORE_GAP,
    };

    let needs_review =
        confidence < hitl_threshold || special_cases.any() || initial_score < LOW_INITIAL_SCORE;
    let (review_type, review_priority) = if needs_review {
        classify_review(&special_cases, confidence)
    } else {
        (ReviewType::None, ReviewPriority::Normal)
    };

    ConfidenceAssessment {
        confidence,
        score_difference,
        special_cases,
        needs_review,
        review_type,
        review_priority,
    }
}

/// First matching rule wins.
pub fn classify_review(special: &SpecialCases, confidence: f64) -> (ReviewType, ReviewPriority) {
    if special.hidden_gem {
        (ReviewType::Deep, ReviewPriority::High)
    } else if special.large_score_gap {
        (ReviewType::ScoreReconciliation, ReviewPriority::High)
    } else if confidence < FULL_REVIEW_CONFIDENCE {
        (ReviewType::Full, ReviewPriority::Medium)
    } else {
        (ReviewType::Quick, ReviewPriority::Low)
    }
}

pub fn explain(
    screening: &InitialScreening,
    critique: &CritiqueResult,
    assessment: &ConfidenceAssessment,
) -> String {
    if assessment.special_cases.hidden_gem {
        let indicators: Vec<&str> = critique
            .hidden_gem_indicators
            .iter()
            .take(2)
            .map(String::as_str)
            .collect();
        return format!(
            "Potential hidden gem candidate! Initial score: {:.2}, Adjusted score: {:.2}. Positive indicators: {}",
            screening.score,
            critique.adjusted_score,
            indicators.join(", ")
        );
    }

    let matched = screening.matched_skills.len();
    let missing = screening.missing_skills.len();
    if screening.score >= 0.8 {
        format!(
            "Strong match with {matched} skills aligned. Confidence: {:.2}",
            assessment.confidence
        )
    } else if screening.score >= 0.6 {
        format!(
            "Good candidate with {matched} matching skills, {missing} gaps. Consider for interview."
        )
    } else {
        let gaps: Vec<&str> = screening
            .missing_skills
            .iter()
            .take(3)
            .map(String::as_str)
            .collect();
        format!(
            "Limited match ({:.2}). Missing key skills: {}",
            screening.score,
            gaps.join(", ")
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

pub struct ReviewTriage {
    matcher: SkillMatcher,
    critic: Arc<dyn Critic>,
    retry: RetryPolicy,
    hitl_threshold: f64,
    audit: Arc<AuditLog>,
}

impl ReviewTriage {
    pub fn new(
        matcher: SkillMatcher,
        critic: Arc<dyn Critic>,
        retry: RetryPolicy,
        hitl_threshold: f64,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            matcher,
            critic,
            retry,
            hitl_threshold,
            audit,
        }
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Runs every stage for one candidate. A critic that keeps failing ends
    /// the run with `CritiqueError::Exhausted` and nothing is audited.
    pub async fn run(
        &self,
        requirement: &JobRequirement,
        profile: &StructuredProfile,
    ) -> Result<TriageReport, CritiqueError> {
        let ctx = WorkflowContext::new(&requirement.category, &profile.candidate_id);
        debug!(workflow_id = %ctx.workflow_id, "triage started for {}", ctx.candidate_id);

        let screening = initial_screening(profile, requirement, &self.matcher);

        let critique = self
            .retry
            .run(self.critic.name(), || {
                self.critic.critique(profile, requirement, &screening)
            })
            .await?;

        let hidden_gem = is_hidden_gem(&critique, screening.score);
        let assessment =
            assess_confidence(screening.score, &critique, hidden_gem, self.hitl_threshold);
        let explanation = explain(&screening, &critique, &assessment);
        let skill_gaps = self.matcher.analyze_skill_gaps(
            &requirement.required_skills,
            &requirement.nice_to_have,
            &profile.skills,
        );
        let learning_path = self
            .matcher
            .suggest_learning_path(&profile.skills, &requirement.required_skills);

        let report = TriageReport {
            workflow_id: ctx.workflow_id,
            job_id: ctx.job_id,
            candidate_id: ctx.candidate_id,
            screening_score: screening.score,
            critic_score: critique.adjusted_score,
            critic_confidence: critique.confidence,
            confidence: assessment.confidence,
            needs_review: assessment.needs_review,
            review_type: assessment.review_type,
            review_priority: assessment.review_priority,
            hidden_gem,
            explanation,
            bias_flags: critique.bias_flags,
            matched_skills: screening.matched_skills,
            missing_skills: screening.missing_skills,
            transferable_skills: critique.transferable_skills,
            skill_gaps,
            learning_path,
            reasoning: critique.reasoning,
            critic: self.critic.name().to_string(),
        };

        self.audit.record(&report);
        if report.hidden_gem {
            info!(
                workflow_id = %report.workflow_id,
                "hidden gem flagged: {} for {}",
                report.candidate_id,
                report.job_id
            );
        }
        Ok(report)
    }
}
