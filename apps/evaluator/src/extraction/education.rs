use std::sync::OnceLock;

use regex::Regex;

use crate::models::job::EducationLevel;

static PATTERNS: OnceLock<Vec<(Regex, EducationLevel)>> = OnceLock::new();

/// Highest level first. Abbreviations are word-bounded so "programs" is not a
/// master's degree, and a bare "master" needs degree wording after it.
fn patterns() -> &'static [(Regex, EducationLevel)] {
    PATTERNS.get_or_init(|| {
        [
            (r"\bph\.?d\b|doctorate|doctoral", EducationLevel::Phd),
            (
                r"\bmaster'?s\b|\bmaster\s+(?:degree|of|in)\b|\bmsc\b|\bms\b|\bm\.s\.|\bmba\b",
                EducationLevel::Masters,
            ),
            (
                r"bachelor'?s?\b|\bbsc\b|\bbs\b|\bb\.s\.|\bb\.?tech\b|undergraduate",
                EducationLevel::Bachelors,
            ),
            (r"associate'?s?\b", EducationLevel::Associate),
            (r"high school|diploma|\bged\b", EducationLevel::HighSchool),
        ]
        .into_iter()
        .map(|(p, level)| (Regex::new(p).expect("valid regex"), level))
        .collect()
    })
}

/// Detects the highest education level mentioned in `text`.
pub fn detect_education(text: &str) -> Option<EducationLevel> {
    let text = text.to_lowercase();
    if text.trim().is_empty() {
        return None;
    }
    patterns()
        .iter()
        .find(|(re, _)| re.is_match(&text))
        .map(|(_, level)| *level)
}
