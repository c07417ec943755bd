use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Years of experience a text asks for (or claims).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceYears {
    pub minimum: u32,
    /// Upper bound of an "N-M years" range, otherwise equal to `minimum`.
    pub preferred: u32,
}

impl ExperienceYears {
    fn exactly(years: u32) -> Self {
        Self {
            minimum: years,
            preferred: years,
        }
    }
}

static RANGE: OnceLock<Regex> = OnceLock::new();
static SINGLE: OnceLock<Regex> = OnceLock::new();
static AT_LEAST: OnceLock<Regex> = OnceLock::new();
static OF_EXPERIENCE: OnceLock<Regex> = OnceLock::new();
static DURATION_YEARS: OnceLock<Regex> = OnceLock::new();
static DURATION_MONTHS: OnceLock<Regex> = OnceLock::new();
static DURATION_PLUS: OnceLock<Regex> = OnceLock::new();

fn range_pattern() -> &'static Regex {
    RANGE.get_or_init(|| Regex::new(r"(\d+)\s*[-–]\s*(\d+)\s*(?:years?|yrs?)").expect("valid regex"))
}

fn single_pattern() -> &'static Regex {
    SINGLE.get_or_init(|| Regex::new(r"(\d+)\+?\s*(?:years?|yrs?)").expect("valid regex"))
}

fn at_least_pattern() -> &'static Regex {
    AT_LEAST.get_or_init(|| {
        Regex::new(r"(?:minimum|at least)\s+(?:of\s+)?(\d+)\s*(?:years?|yrs?)").expect("valid regex")
    })
}

fn of_experience_pattern() -> &'static Regex {
    OF_EXPERIENCE.get_or_init(|| {
        Regex::new(r"(\d+)\s*(?:years?|yrs?)\s+(?:of\s+)?(?:relevant\s+)?experience")
            .expect("valid regex")
    })
}

/// Reads an experience requirement out of free text.
///
/// Rules are tried in order and the first hit wins:
/// a range takes its lower bound, then "N+ years" / "N years", then
/// "minimum / at least N years", then "N years of experience". Entry-level
/// phrasing and text with no number both mean zero.
pub fn extract_experience(text: &str) -> ExperienceYears {
    let text = text.to_lowercase();
    if text.trim().is_empty() {
        return ExperienceYears::default();
    }

    if let Some(caps) = range_pattern().captures(&text) {
        let low = caps.get(1).and_then(|m| saturating_years(m.as_str()));
        let high = caps.get(2).and_then(|m| saturating_years(m.as_str()));
        if let Some(low) = low {
            return ExperienceYears {
                minimum: low,
                preferred: high.unwrap_or(low).max(low),
            };
        }
    }

    for pattern in [single_pattern(), at_least_pattern(), of_experience_pattern()] {
        if let Some(years) = first_number(pattern, &text) {
            return ExperienceYears::exactly(years);
        }
    }

    // "entry level", "fresh graduate", "no experience" and anything else
    ExperienceYears::default()
}

/// Minimum years a text asks for. Unparsable text is zero.
pub fn extract_experience_years(text: &str) -> u32 {
    extract_experience(text).minimum
}

fn first_number(pattern: &Regex, text: &str) -> Option<u32> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| saturating_years(m.as_str()))
}

/// Digit run as a year count; too large for `u32` is `u32::MAX`.
fn saturating_years(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse().unwrap_or(u32::MAX))
}

/// Parses a candidate's stated experience duration into fractional years.
///
/// "5+ years" → 5.0, "2 years 6 months" → 2.5, "18 months" → 1.5.
/// Blank, "n/a" and "no experience" are zero.
pub fn parse_duration_years(text: &str) -> f64 {
    let text = text.trim().to_lowercase();
    if text.is_empty() || text == "n/a" || text.contains("no experience") {
        return 0.0;
    }

    let plus = DURATION_PLUS.get_or_init(|| Regex::new(r"(\d+)\+\s*years?").expect("valid regex"));
    if let Some(years) = first_number(plus, &text) {
        return years as f64;
    }

    let years_re = DURATION_YEARS
        .get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(?:years?|yrs?)").expect("valid regex"));
    let months_re = DURATION_MONTHS
        .get_or_init(|| Regex::new(r"(\d+)\s*(?:months?|mos?)").expect("valid regex"));

    let years: f64 = years_re
        .captures(&text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0);
    let months: f64 = months_re
        .captures(&text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0);

    years + months / 12.0
}
