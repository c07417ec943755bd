//! Four-dimension qualification scoring and the accept/reject decision.

use crate::extraction::education::detect_education;
use crate::extraction::experience::extract_experience_years;
use crate::models::candidate::CandidateProfile;
use crate::models::job::{EducationLevel, JobRequirement};
use crate::models::outcome::{Decision, DimensionScores, EvaluationOutcome, SkillMatch};
use crate::scoring::weights::{ScoringWeights, Thresholds};
use crate::skills::{MatchMode, SkillMatcher};

/// Role words that earn partial domain credit.
const GENERIC_ROLE_KEYWORDS: &[&str] = &["developer", "engineer", "analyst"];

/// Dimensions below this are named in the rejection reason.
const WEAK_DIMENSION: f64 = 0.5;
const MAX_LISTED_MISSING: usize = 3;

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    matcher: SkillMatcher,
    weights: ScoringWeights,
    thresholds: Thresholds,
    mode: MatchMode,
}

impl ScoringEngine {
    pub fn new(
        matcher: SkillMatcher,
        weights: ScoringWeights,
        thresholds: Thresholds,
        mode: MatchMode,
    ) -> Self {
        Self {
            matcher,
            weights,
            thresholds,
            mode,
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Scores one candidate against one job. Degraded candidate data scores
    /// low rather than failing.
    pub fn evaluate(&self, candidate: &CandidateProfile, job: &JobRequirement) -> EvaluationOutcome {
        let (skills, matched_skills, missing_skills) = self.score_skills(candidate, job);
        let scores = DimensionScores {
            skills,
            experience: score_experience(candidate.experience_text(), job.min_experience_years),
            education: score_education(candidate.education.as_deref(), job.education_level),
            domain: score_domain(candidate, &job.category),
        };

        let overall_score = self.weights.combine(&scores);
        let outcome = EvaluationOutcome {
            candidate_id: candidate.id.clone(),
            job_category: job.category.clone(),
            scores,
            matched_skills,
            missing_skills,
            overall_score,
            qualified: false,
            decision: Decision::Reject,
            rejection_reason: None,
        };
        self.rescore(outcome, overall_score)
    }

    /// Replaces the overall score and re-applies both thresholds and the
    /// rejection reason.
    pub fn rescore(&self, mut outcome: EvaluationOutcome, overall_score: f64) -> EvaluationOutcome {
        outcome.overall_score = overall_score.clamp(0.0, 1.0);
        outcome.qualified = self.thresholds.is_qualified(outcome.overall_score);
        outcome.decision = if self.thresholds.accepts(outcome.overall_score) {
            Decision::Accept
        } else {
            Decision::Reject
        };
        outcome.rejection_reason = (outcome.decision == Decision::Reject)
            .then(|| rejection_reason(&outcome.scores, &outcome.missing_skills));
        outcome
    }

    /// matched ÷ required under this engine's match mode. Missing skills are
    /// always computed with fuzzy matching.
    pub fn score_skills(
        &self,
        candidate: &CandidateProfile,
        job: &JobRequirement,
    ) -> (f64, Vec<SkillMatch>, Vec<String>) {
        let text = candidate.skills_text();
        let matched = self.matcher.match_skills(&job.required_skills, text, self.mode);
        let missing = self.matcher.skill_gaps(&job.required_skills, text);

        let score = if job.required_skills.is_empty() {
            0.0
        } else {
            matched.len() as f64 / job.required_skills.len() as f64
        };
        (score, matched, missing)
    }
}

/// min(1, candidate ÷ required). No requirement is full credit.
pub fn score_experience(candidate_text: &str, required_years: u32) -> f64 {
    if required_years == 0 {
        return 1.0;
    }
    let candidate_years = extract_experience_years(candidate_text);
    (candidate_years as f64 / required_years as f64).min(1.0)
}

/// Ordinal comparison on the five-level hierarchy.
pub fn score_education(candidate_text: Option<&str>, required: Option<EducationLevel>) -> f64 {
    let Some(required) = required else {
        return 1.0;
    };
    let Some(text) = candidate_text.filter(|t| !t.trim().is_empty()) else {
        return 0.0;
    };
    let Some(level) = detect_education(text) else {
        // something is written there, we just can't place it
        return 0.5;
    };

    if level.rank() >= required.rank() {
        1.0
    } else {
        level.rank() as f64 / required.rank() as f64
    }
}

/// Coarse role relevance from the candidate's labels.
pub fn score_domain(candidate: &CandidateProfile, job_category: &str) -> f64 {
    let category = job_category.trim().to_lowercase();
    let predicted = candidate.predicted_label().to_lowercase();
    let actual = candidate.actual_label().to_lowercase();

    if !category.is_empty() && (predicted.contains(&category) || actual.contains(&category)) {
        return 1.0;
    }
    if GENERIC_ROLE_KEYWORDS.iter().any(|k| predicted.contains(k)) {
        0.5
    } else {
        0.3
    }
}

/// Names every weak dimension, plus up to three missing skills after a weak
/// skills score.
pub fn rejection_reason(scores: &DimensionScores, missing_skills: &[String]) -> String {
    let mut reasons = Vec::new();

    if scores.skills < WEAK_DIMENSION {
        reasons.push(format!("Skills insufficient ({})", percent(scores.skills)));
        if !missing_skills.is_empty() {
            let listed: Vec<&str> = missing_skills
                .iter()
                .take(MAX_LISTED_MISSING)
                .map(String::as_str)
                .collect();
            reasons.push(format!("Missing skills: {}", listed.join(", ")));
        }
    }
    if scores.experience < WEAK_DIMENSION {
        reasons.push(format!("Experience insufficient ({})", percent(scores.experience)));
    }
    if scores.education < WEAK_DIMENSION {
        reasons.push(format!("Education insufficient ({})", percent(scores.education)));
    }
    if scores.domain < WEAK_DIMENSION {
        reasons.push(format!("Domain insufficient ({})", percent(scores.domain)));
    }

    if reasons.is_empty() {
        "Overall score below threshold".to_string()
    } else {
        reasons.join("; ")
    }
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candidate(skills: &str, experience: &str, education: &str, role: &str) -> CandidateProfile {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        CandidateProfile {
            id: "cand-1".to_string(),
            skills: opt(skills),
            experience: opt(experience),
            education: opt(education),
            companies: None,
            predicted_position: opt(role),
            actual_category: None,
        }
    }

    fn job(skills: &[&str], years: u32, education: Option<EducationLevel>) -> JobRequirement {
        JobRequirement {
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            min_experience_years: years,
            preferred_experience_years: years,
            education_level: education,
            ..JobRequirement::empty("Python Developer")
        }
    }

    fn engine(mode: MatchMode) -> ScoringEngine {
        ScoringEngine::new(
            SkillMatcher::standard(),
            ScoringWeights::default(),
            Thresholds::baseline(),
            mode,
        )
    }

    #[test]
    fn test_exact_skill_score_two_of_three() {
        let e = engine(MatchMode::Exact);
        let c = candidate("Python, MySQL, JavaScript", "", "", "");
        let (score, matched, missing) = e.score_skills(&c, &job(&["Python", "MySQL", "HTML"], 0, None));

        assert!((score - 2.0 / 3.0).abs() < 1e-9);
        let names: Vec<&str> = matched.iter().map(|m| m.required.as_str()).collect();
        assert_eq!(names, vec!["Python", "MySQL"]);
        assert_eq!(missing, vec!["HTML".to_string()]);
    }

    #[test]
    fn test_skill_score_zero_without_requirements_or_skills() {
        let e = engine(MatchMode::Exact);
        let (score, _, _) = e.score_skills(&candidate("Python", "", "", ""), &job(&[], 0, None));
        assert_eq!(score, 0.0);

        let (score, matched, missing) =
            e.score_skills(&candidate("", "", "", ""), &job(&["Python", "Go"], 0, None));
        assert_eq!(score, 0.0);
        assert!(matched.is_empty());
        assert_eq!(missing, vec!["Python".to_string(), "Go".to_string()]);
    }

    #[test]
    fn test_experience_ratio() {
        assert!((score_experience("2 years", 3) - 2.0 / 3.0).abs() < 0.01);
        assert_eq!(score_experience("10 years", 3), 1.0);
        assert_eq!(score_experience("", 0), 1.0);
        assert_eq!(score_experience("lots", 3), 0.0);
    }

    #[test]
    fn test_education_ordinal_rules() {
        let bachelors = Some(EducationLevel::Bachelors);
        assert!((score_education(Some("Associate degree"), bachelors) - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(score_education(Some("MSc Physics"), bachelors), 1.0);
        assert_eq!(score_education(None, bachelors), 0.0);
        assert_eq!(score_education(Some("   "), bachelors), 0.0);
        assert_eq!(score_education(Some("Coursera certificates"), bachelors), 0.5);
        assert_eq!(score_education(None, None), 1.0);
    }

    #[test]
    fn test_domain_tiers() {
        let exact = candidate("", "", "", "Senior Python Developer");
        assert_eq!(score_domain(&exact, "Python Developer"), 1.0);

        let generic = candidate("", "", "", "Java Engineer");
        assert_eq!(score_domain(&generic, "Python Developer"), 0.5);

        let unrelated = candidate("", "", "", "Chef");
        assert_eq!(score_domain(&unrelated, "Python Developer"), 0.3);

        let mut by_actual = candidate("", "", "", "Chef");
        by_actual.actual_category = Some("python developer".to_string());
        assert_eq!(score_domain(&by_actual, "Python Developer"), 1.0);
    }

    #[test]
    fn test_evaluate_strong_candidate_accepted() {
        let e = engine(MatchMode::Exact);
        let c = candidate(
            "Python, Django, PostgreSQL",
            "5 years",
            "Bachelor of Science",
            "Python Developer",
        );
        let outcome = e.evaluate(
            &c,
            &job(&["python", "django", "postgresql"], 3, Some(EducationLevel::Bachelors)),
        );

        assert!((outcome.overall_score - 1.0).abs() < 1e-9);
        assert!(outcome.qualified);
        assert_eq!(outcome.decision, Decision::Accept);
        assert_eq!(outcome.rejection_reason, None);
    }

    #[test]
    fn test_evaluate_weak_candidate_gets_reason() {
        let e = engine(MatchMode::Exact);
        let c = candidate("Excel", "", "", "Chef");
        let outcome = e.evaluate(&c, &job(&["python", "django"], 3, None));

        // skills 0, experience 0, education 1, domain 0.3
        assert!((outcome.overall_score - (0.15 + 0.03)).abs() < 1e-9);
        assert!(!outcome.qualified);
        assert_eq!(outcome.decision, Decision::Reject);
        assert_eq!(
            outcome.rejection_reason.as_deref(),
            Some(
                "Skills insufficient (0.0%); Missing skills: python, django; \
                 Experience insufficient (0.0%); Domain insufficient (30.0%)"
            )
        );
    }

    #[test]
    fn test_qualified_and_decision_use_separate_thresholds() {
        let e = engine(MatchMode::Exact);
        // skills 1/2, experience 1, education 1, domain 0.3 → 0.25+0.25+0.15+0.03 = 0.68
        let c = candidate("Python", "", "", "Chef");
        let outcome = e.evaluate(&c, &job(&["python", "django"], 0, None));
        assert!(outcome.qualified);
        assert_eq!(outcome.decision, Decision::Accept);

        // skills 0, experience 1, education 1, domain 0.3 → 0.43
        let c = candidate("Rust", "", "", "Chef");
        let outcome = e.evaluate(&c, &job(&["python", "django"], 0, None));
        assert!(outcome.qualified);
        assert_eq!(outcome.decision, Decision::Reject);
        assert_eq!(outcome.classify(), crate::models::outcome::DecisionClass::FalseRejection);
    }

    #[test]
    fn test_rescore_reapplies_thresholds() {
        let e = engine(MatchMode::Exact);
        let c = candidate("Rust", "", "", "Chef");
        let rejected = e.evaluate(&c, &job(&["python", "django"], 0, None));
        assert!(rejected.rejection_reason.is_some());

        let accepted = e.rescore(rejected.clone(), 0.55);
        assert_eq!(accepted.decision, Decision::Accept);
        assert_eq!(accepted.rejection_reason, None);
        assert_eq!(accepted.scores, rejected.scores);

        let dropped = e.rescore(accepted, -0.2);
        assert_eq!(dropped.overall_score, 0.0);
        assert!(!dropped.qualified);
        assert_eq!(dropped.decision, Decision::Reject);
    }

    #[test]
    fn test_generic_reason_when_no_dimension_is_weak() {
        let scores = DimensionScores {
            skills: 0.6,
            experience: 0.6,
            education: 0.6,
            domain: 0.6,
        };
        assert_eq!(rejection_reason(&scores, &[]), "Overall score below threshold");
    }

    #[test]
    fn test_fuzzy_mode_credits_containment() {
        let exact = engine(MatchMode::Exact);
        let fuzzy = engine(MatchMode::Fuzzy);
        let c = candidate("Visualization", "", "", "");
        let j = job(&["data visualization"], 0, None);
        assert_eq!(exact.score_skills(&c, &j).0, 0.0);
        assert_eq!(fuzzy.score_skills(&c, &j).0, 1.0);
    }
}
