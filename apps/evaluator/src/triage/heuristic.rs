//! Deterministic critic built on the skill ontology. Used when no LLM key is
//! configured, and as the reference behaviour in tests.

use async_trait::async_trait;

use crate::extraction::StructuredProfile;
use crate::models::job::{EducationLevel, JobRequirement};
use crate::skills::SkillMatcher;
use crate::triage::critique::{Critic, CritiqueError, CritiqueResult, TransferableSkillPair};
use crate::triage::pipeline::{InitialScreening, RELATED_MATCH_CONFIDENCE};

const RELATED_HIT_BONUS: f64 = 0.1;
const MAX_RELATED_BONUS: f64 = 0.3;
const TRANSFERABILITY_BONUS: f64 = 0.1;
const STRONG_TRANSFERABILITY: f64 = 0.5;
/// Required years above this are flagged as a possible bias.
const HIGH_EXPERIENCE_REQUIREMENT: u32 = 5;
const NON_TRADITIONAL_MARKERS: &[&str] = &["bootcamp", "self-taught", "self taught", "certif"];

pub struct HeuristicCritic {
    matcher: SkillMatcher,
}

impl HeuristicCritic {
    pub fn new(matcher: SkillMatcher) -> Self {
        Self { matcher }
    }

    pub fn assess(
        &self,
        profile: &StructuredProfile,
        requirement: &JobRequirement,
        screening: &InitialScreening,
    ) -> CritiqueResult {
        let related: Vec<_> = screening
            .matched_skills
            .iter()
            .filter(|m| m.confidence <= RELATED_MATCH_CONFIDENCE)
            .collect();
        let transferable = self
            .matcher
            .transferable_skills(profile.skills.iter().map(String::as_str));

        let related_bonus = (RELATED_HIT_BONUS * related.len() as f64).min(MAX_RELATED_BONUS);
        let adjusted_score =
            (screening.score + related_bonus + TRANSFERABILITY_BONUS * transferable.score).clamp(0.0, 1.0);

        let required = requirement.required_skills.len().max(1) as f64;
        let confidence = if screening.missing_skills.is_empty() {
            0.95
        } else {
            (0.9 - 0.3 * screening.missing_skills.len() as f64 / required).clamp(0.5, 0.95)
        };

        let mut bias_flags = Vec::new();
        let degree_gate = requirement
            .education_level
            .is_some_and(|level| level >= EducationLevel::Bachelors);
        if degree_gate && profile.education_level.is_none() {
            bias_flags.push("degree requirement may exclude non-traditional backgrounds".to_string());
        }
        if requirement.min_experience_years > HIGH_EXPERIENCE_REQUIREMENT {
            bias_flags.push(format!(
                "{}+ years requirement may screen out capable candidates",
                requirement.min_experience_years
            ));
        }

        let mut hidden_gem_indicators: Vec<String> = related
            .iter()
            .map(|m| format!("{} experience covers {}", m.found, m.required))
            .collect();
        if transferable.score >= STRONG_TRANSFERABILITY {
            hidden_gem_indicators.push("strong transferable skill base".to_string());
        }
        let background = format!(
            "{} {}",
            profile.education.as_deref().unwrap_or(""),
            profile.skills.join(" ")
        )
        .to_lowercase();
        if NON_TRADITIONAL_MARKERS.iter().any(|m| background.contains(m)) {
            hidden_gem_indicators.push("non-traditional learning path".to_string());
        }

        let transferable_skills = related
            .iter()
            .map(|m| TransferableSkillPair {
                from: m.found.clone(),
                to: m.required.clone(),
                relevance: "related".to_string(),
            })
            .collect();

        let reasoning = format!(
            "{} requirement(s) covered through related skills, transferability {:.2}, {} gap(s) remaining",
            related.len(),
            transferable.score,
            screening.missing_skills.len()
        );

        CritiqueResult {
            adjusted_score,
            confidence,
            bias_flags,
            hidden_gem_indicators,
            transferable_skills,
            reasoning,
        }
    }
}

#[async_trait]
impl Critic for HeuristicCritic {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn critique(
        &self,
        profile: &StructuredProfile,
        requirement: &JobRequirement,
        screening: &InitialScreening,
    ) -> Result<CritiqueResult, CritiqueError> {
        Ok(self.assess(profile, requirement, screening))
    }
}
