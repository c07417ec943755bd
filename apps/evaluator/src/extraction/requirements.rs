//! Rule-based job requirement extraction.
//!
//! A pure function of the job text: empty input yields an empty requirement,
//! never an error.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extraction::education::detect_education;
use crate::extraction::experience::{extract_experience, ExperienceYears};
use crate::models::job::{EducationLevel, JobRequirement};
use crate::skills::{SkillCategory, SkillMatcher};

/// Lines that end a captured section.
const SECTION_END: &str = r"(?:\n[ \t]*\n|\n[ \t]*(?:experience|education|qualifications|responsibilities|nice to have|preferred|bonus|about)\b|\z)";

static REQUIRED_SECTIONS: OnceLock<Vec<Regex>> = OnceLock::new();
static NICE_SECTIONS: OnceLock<Vec<Regex>> = OnceLock::new();
static BULLETS: OnceLock<Regex> = OnceLock::new();

fn section_patterns(headings: &[&str]) -> Vec<Regex> {
    headings
        .iter()
        .map(|h| {
            Regex::new(&format!(r"(?is){h}\s*:?[ \t]*\n?(.+?){SECTION_END}")).expect("valid regex")
        })
        .collect()
}

fn required_sections() -> &'static [Regex] {
    REQUIRED_SECTIONS.get_or_init(|| {
        section_patterns(&[
            r"required skills?",
            r"requirements?",
            r"technical skills?",
            r"must have",
        ])
    })
}

fn nice_sections() -> &'static [Regex] {
    NICE_SECTIONS.get_or_init(|| section_patterns(&[r"nice to have", r"preferred", r"bonus"]))
}

fn bullets() -> &'static Regex {
    BULLETS.get_or_init(|| Regex::new(r"(?m)^[ \t]*[•\-*][ \t]*(.+)$").expect("valid regex"))
}

/// Skill lists of a job text, plus every listed skill grouped by family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillRequirements {
    pub required: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub by_category: BTreeMap<SkillCategory, Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct RequirementExtractor {
    matcher: SkillMatcher,
}

impl RequirementExtractor {
    pub fn new(matcher: SkillMatcher) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &SkillMatcher {
        &self.matcher
    }

    /// Builds the full requirement record for one job category.
    pub fn parse(&self, category: &str, text: &str) -> JobRequirement {
        if text.trim().is_empty() {
            return JobRequirement::empty(category);
        }

        let ExperienceYears { minimum, preferred } = self.extract_experience(text);
        JobRequirement {
            category: category.to_string(),
            required_skills: self.extract_required_skills(text),
            nice_to_have: self.extract_nice_to_have(text),
            min_experience_years: minimum,
            preferred_experience_years: preferred,
            education_level: self.extract_education(text),
            raw_text: text.to_string(),
        }
    }

    /// Union of skill-section blocks, bullet points and known-vocabulary hits,
    /// canonicalized, deduplicated and sorted.
    pub fn extract_required_skills(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return vec![];
        }

        let mut raw: Vec<String> = Vec::new();
        for pattern in required_sections() {
            for caps in pattern.captures_iter(text) {
                if let Some(block) = caps.get(1) {
                    raw.extend(self.matcher.parse_skill_list(block.as_str()));
                }
            }
        }
        for caps in bullets().captures_iter(text) {
            if let Some(line) = caps.get(1) {
                raw.extend(self.matcher.parse_skill_list(line.as_str()));
            }
        }

        let mut skills = self.canonicalize(raw.iter().map(String::as_str));
        skills.extend(self.matcher.scan_vocabulary(text));
        skills.into_iter().collect()
    }

    pub fn extract_nice_to_have(&self, text: &str) -> Vec<String> {
        let mut raw: Vec<String> = Vec::new();
        for pattern in nice_sections() {
            for caps in pattern.captures_iter(text) {
                if let Some(block) = caps.get(1) {
                    raw.extend(self.matcher.parse_skill_list(block.as_str()));
                }
            }
        }
        self.canonicalize(raw.iter().map(String::as_str))
            .into_iter()
            .collect()
    }

    pub fn skill_requirements(&self, text: &str) -> SkillRequirements {
        let required = self.extract_required_skills(text);
        let nice_to_have = self.extract_nice_to_have(text);
        let by_category = self
            .matcher
            .group_by_category(required.iter().chain(&nice_to_have).map(String::as_str));
        SkillRequirements {
            required,
            nice_to_have,
            by_category,
        }
    }

    pub fn extract_experience(&self, text: &str) -> ExperienceYears {
        extract_experience(text)
    }

    pub fn extract_education(&self, text: &str) -> Option<EducationLevel> {
        detect_education(text)
    }

    /// Canonical names longer than one character.
    fn canonicalize<'a, I>(&self, skills: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.matcher
            .canonical_set(skills)
            .into_iter()
            .filter(|s| s.chars().count() > 1)
            .collect()
    }
}

impl Default for RequirementExtractor {
    fn default() -> Self {
        Self::new(SkillMatcher::standard())
    }
}
