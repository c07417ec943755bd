use async_trait::async_trait;

use crate::extraction::StructuredProfile;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::job::JobRequirement;
use crate::triage::critique::{Critic, CritiqueError, CritiqueResult, RawCritique};
use crate::triage::pipeline::InitialScreening;
use crate::triage::prompts::{CRITIC_PROMPT_TEMPLATE, CRITIC_ROLE};

/// Critic backed by the Messages API. One request per attempt; retries are
/// the pipeline's job.
pub struct LlmCritic {
    llm: LlmClient,
    system: String,
}

impl LlmCritic {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            system: format!("{CRITIC_ROLE} {JSON_ONLY_SYSTEM}"),
        }
    }
}

pub fn build_critic_prompt(
    profile: &StructuredProfile,
    requirement: &JobRequirement,
    screening: &InitialScreening,
) -> String {
    let matched: Vec<String> = screening
        .matched_skills
        .iter()
        .map(|m| format!("{} ({} @ {:.1})", m.required, m.found, m.confidence))
        .collect();

    CRITIC_PROMPT_TEMPLATE
        .replace("{job_category}", &requirement.category)
        .replace("{required_skills}", &or_none(&requirement.required_skills.join(", ")))
        .replace("{required_years}", &requirement.min_experience_years.to_string())
        .replace(
            "{required_education}",
            requirement.education_level.map(|l| l.label()).unwrap_or("none"),
        )
        .replace("{screening_score}", &format!("{:.2}", screening.score))
        .replace("{matched_skills}", &or_none(&matched.join(", ")))
        .replace("{missing_skills}", &or_none(&screening.missing_skills.join(", ")))
        .replace("{candidate_skills}", &or_none(&profile.skills.join(", ")))
        .replace("{candidate_years}", &format!("{:.1}", profile.total_experience_years))
        .replace(
            "{candidate_education}",
            profile.education.as_deref().unwrap_or("not stated"),
        )
}

fn or_none(list: &str) -> String {
    if list.is_empty() {
        "none".to_string()
    } else {
        list.to_string()
    }
}

#[async_trait]
impl Critic for LlmCritic {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn critique(
        &self,
        profile: &StructuredProfile,
        requirement: &JobRequirement,
        screening: &InitialScreening,
    ) -> Result<CritiqueResult, CritiqueError> {
        let prompt = build_critic_prompt(profile, requirement, screening);
        let raw: RawCritique = self
            .llm
            .call_json(&prompt, &self.system)
            .await
            .map_err(|e| match e {
                LlmError::Malformed(detail) => CritiqueError::Malformed(detail),
                other => CritiqueError::Transport(other.to_string()),
            })?;
        Ok(CritiqueResult::from_raw(raw, screening.score))
    }
}
