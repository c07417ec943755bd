// LLM prompts for requirement decomposition.

/// System prompt for job requirement decomposition.
pub const DECOMPOSE_SYSTEM: &str = "You are an expert technical recruiter. \
    Decompose a job description into structured hiring requirements. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Decomposition prompt template. Replace `{job_text}` before sending.
pub const DECOMPOSE_PROMPT_TEMPLATE: &str = r#"Analyze this job description and extract structured requirements.

{job_text}

Return a JSON object with this EXACT schema:
{
  "technical_skills": ["Python", "PostgreSQL"],
  "soft_skills": ["communication"],
  "experience_years": {"minimum": 3, "preferred": 5},
  "education": {"level": "Bachelor's"},
  "nice_to_have": ["Kubernetes"]
}

Rules:
- technical_skills lists only skills the posting states as required.
- experience_years.minimum is 0 when the posting gives no number.
- education.level is one of "High School", "Associate", "Bachelor's", "Master's", "PhD", or null.
- nice_to_have lists skills marked preferred, bonus or nice to have."#;
