use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordinal education level. The discriminant is the rank used by scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    HighSchool = 1,
    Associate = 2,
    Bachelors = 3,
    Masters = 4,
    Phd = 5,
}

impl EducationLevel {
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            EducationLevel::HighSchool => "High School",
            EducationLevel::Associate => "Associate",
            EducationLevel::Bachelors => "Bachelor's",
            EducationLevel::Masters => "Master's",
            EducationLevel::Phd => "PhD",
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured requirements for one job category.
///
/// Built once when the job catalog is loaded and shared read-only afterwards.
/// Skill lists hold canonical skill names, sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequirement {
    pub category: String,
    pub required_skills: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub min_experience_years: u32,
    pub preferred_experience_years: u32,
    pub education_level: Option<EducationLevel>,
    pub raw_text: String,
}

impl JobRequirement {
    /// A requirement with nothing in it. Used for empty job text.
    pub fn empty(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            required_skills: Vec::new(),
            nice_to_have: Vec::new(),
            min_experience_years: 0,
            preferred_experience_years: 0,
            education_level: None,
            raw_text: String::new(),
        }
    }
}
