// LLM prompts for the secondary critique.

/// Role preamble for the critic. Combined with the shared JSON-only rules.
pub const CRITIC_ROLE: &str = "You are a fair-hiring reviewer. \
    You audit automated candidate screenings for bias and for strengths the screening missed.";

/// Critique prompt template. Replace every `{placeholder}` before sending.
pub const CRITIC_PROMPT_TEMPLATE: &str = r#"Review this candidate evaluation for potential biases and hidden qualities.

Job: {job_category}
Required skills: {required_skills}
Minimum experience: {required_years} years
Required education: {required_education}

Screening score: {screening_score}
Matched skills: {matched_skills}
Missing skills: {missing_skills}

Candidate skills: {candidate_skills}
Candidate experience: {candidate_years} years
Candidate education: {candidate_education}

Consider:
1. Non-traditional backgrounds (bootcamps, self-taught)
2. Transferable skills from other domains
3. Potential biases in the requirements
4. Hidden gem indicators

Return a JSON object with this EXACT schema:
{
  "adjusted_score": 0.65,
  "confidence_in_assessment": 0.8,
  "bias_flags": ["..."],
  "hidden_gem_indicators": ["..."],
  "transferable_skills": [{"from": "flask", "to": "django", "relevance": "high"}],
  "reasoning": "one paragraph"
}

Both scores are between 0 and 1."#;
