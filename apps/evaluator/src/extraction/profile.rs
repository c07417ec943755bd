use serde::{Deserialize, Serialize};

use crate::extraction::education::detect_education;
use crate::extraction::experience::parse_duration_years;
use crate::models::candidate::CandidateProfile;
use crate::models::job::EducationLevel;
use crate::skills::SkillMatcher;

/// Candidate record in the shape the review pipeline consumes: canonical
/// skills, total years and a detected education level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredProfile {
    pub candidate_id: String,
    pub skills: Vec<String>,
    pub total_experience_years: f64,
    pub education_level: Option<EducationLevel>,
    /// Raw education text, kept for critics that read prose.
    pub education: Option<String>,
    pub companies: Vec<String>,
    pub target_role: Option<String>,
}

impl StructuredProfile {
    pub fn from_candidate(candidate: &CandidateProfile, matcher: &SkillMatcher) -> Self {
        let skills = matcher
            .candidate_skills(candidate.skills_text())
            .into_iter()
            .collect();

        let companies = candidate
            .companies
            .as_deref()
            .map(|c| {
                c.split([',', ';', '|', '\n'])
                    .map(|s| s.trim().trim_matches(|ch| ch == '[' || ch == ']' || ch == '\''))
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            candidate_id: candidate.id.clone(),
            skills,
            total_experience_years: parse_duration_years(candidate.experience_text()),
            education_level: candidate.education.as_deref().and_then(detect_education),
            education: candidate.education.clone(),
            companies,
            target_role: candidate.predicted_position.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candidate() -> CandidateProfile {
        CandidateProfile {
            id: "c-17".to_string(),
            skills: Some("Python, JS, Docker".to_string()),
            experience: Some("3 years 6 months".to_string()),
            education: Some("B.S. Computer Science".to_string()),
            companies: Some("['Acme', 'Globex']".to_string()),
            predicted_position: Some("Backend Engineer".to_string()),
            actual_category: None,
        }
    }

    #[test]
    fn test_from_candidate() {
        let profile = StructuredProfile::from_candidate(&candidate(), &SkillMatcher::standard());
        assert_eq!(profile.candidate_id, "c-17");
        assert_eq!(
            profile.skills,
            vec!["docker".to_string(), "javascript".to_string(), "python".to_string()]
        );
        assert!((profile.total_experience_years - 3.5).abs() < 1e-9);
        assert_eq!(profile.education_level, Some(EducationLevel::Bachelors));
        assert_eq!(profile.companies, vec!["Acme".to_string(), "Globex".to_string()]);
        assert_eq!(profile.target_role.as_deref(), Some("Backend Engineer"));
    }

    #[test]
    fn test_empty_candidate_degrades_to_defaults() {
        let empty = CandidateProfile {
            id: "c-0".to_string(),
            skills: None,
            experience: None,
            education: None,
            companies: None,
            predicted_position: None,
            actual_category: None,
        };
        let profile = StructuredProfile::from_candidate(&empty, &SkillMatcher::standard());
        assert!(profile.skills.is_empty());
        assert_eq!(profile.total_experience_years, 0.0);
        assert_eq!(profile.education_level, None);
        assert!(profile.companies.is_empty());
    }
}
