//! LLM-backed requirement decomposition. Used instead of the rule-based
//! extractor when `USE_LLM_DECOMPOSITION` is set.

use serde::Deserialize;

use crate::errors::AppError;
use crate::extraction::education::detect_education;
use crate::extraction::experience::ExperienceYears;
use crate::extraction::prompts::{DECOMPOSE_PROMPT_TEMPLATE, DECOMPOSE_SYSTEM};
use crate::llm_client::LlmClient;
use crate::models::job::JobRequirement;
use crate::skills::SkillMatcher;
use crate::triage::critique::RetryPolicy;

/// Raw decomposition payload. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DecomposedRequirements {
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub experience_years: ExperienceYears,
    pub education: EducationField,
    pub nice_to_have: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EducationField {
    pub level: Option<String>,
}

impl DecomposedRequirements {
    /// Canonicalizes skills and fills defaults.
    pub fn into_requirement(
        self,
        category: &str,
        raw_text: &str,
        matcher: &SkillMatcher,
    ) -> JobRequirement {
        let minimum = self.experience_years.minimum;
        JobRequirement {
            category: category.to_string(),
            required_skills: matcher
                .canonical_set(self.technical_skills.iter().map(String::as_str))
                .into_iter()
                .collect(),
            nice_to_have: matcher
                .canonical_set(self.nice_to_have.iter().map(String::as_str))
                .into_iter()
                .collect(),
            min_experience_years: minimum,
            preferred_experience_years: self.experience_years.preferred.max(minimum),
            education_level: self.education.level.as_deref().and_then(detect_education),
            raw_text: raw_text.to_string(),
        }
    }
}

/// Asks the model for the requirement breakdown, retrying under `retry`.
pub async fn decompose_requirements(
    category: &str,
    text: &str,
    llm: &LlmClient,
    matcher: &SkillMatcher,
    retry: &RetryPolicy,
) -> Result<JobRequirement, AppError> {
    let prompt = DECOMPOSE_PROMPT_TEMPLATE.replace("{job_text}", text);
    let payload = retry
        .run("requirement decomposition", || {
            llm.call_json::<DecomposedRequirements>(&prompt, DECOMPOSE_SYSTEM)
        })
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;
    Ok(payload.into_requirement(category, text, matcher))
}
