use serde::{Deserialize, Serialize};

/// System decision for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

/// Which cell of the confusion matrix an outcome lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionClass {
    CorrectAccept,
    CorrectReject,
    FalseRejection,
    FalseAcceptance,
}

/// A required skill and the candidate skill that satisfied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub required: String,
    pub found: String,
    pub confidence: f64,
}

/// Per-dimension scores, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub domain: f64,
}

/// The result of scoring one candidate against one job.
///
/// `qualified` and `decision` are derived from `overall_score` alone, against
/// the qualification and acceptance thresholds respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub candidate_id: String,
    pub job_category: String,
    pub scores: DimensionScores,
    pub matched_skills: Vec<SkillMatch>,
    pub missing_skills: Vec<String>,
    pub overall_score: f64,
    pub qualified: bool,
    pub decision: Decision,
    pub rejection_reason: Option<String>,
}

impl EvaluationOutcome {
    pub fn is_rejected(&self) -> bool {
        self.decision == Decision::Reject
    }

    pub fn classify(&self) -> DecisionClass {
        match (self.qualified, self.decision) {
            (true, Decision::Accept) => DecisionClass::CorrectAccept,
            (true, Decision::Reject) => DecisionClass::FalseRejection,
            (false, Decision::Accept) => DecisionClass::FalseAcceptance,
            (false, Decision::Reject) => DecisionClass::CorrectReject,
        }
    }
}

/// A candidate whose evaluation did not produce an outcome.
/// Kept out of the ledger and reported separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationFailure {
    pub candidate_id: String,
    pub job_category: Option<String>,
    pub code: String,
    pub message: String,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Bare outcome with the given labels, for statistics tests.
    pub fn outcome(id: &str, qualified: bool, decision: Decision) -> EvaluationOutcome {
        EvaluationOutcome {
            candidate_id: id.to_string(),
            job_category: "Python Developer".to_string(),
            scores: DimensionScores::default(),
            matched_skills: vec![],
            missing_skills: vec![],
            overall_score: 0.0,
            qualified,
            decision,
            rejection_reason: None,
        }
    }
}
