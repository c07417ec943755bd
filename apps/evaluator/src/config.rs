use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::scoring::weights::{ScoringWeights, Thresholds};

/// Application configuration loaded from environment variables.
///
/// Every value has a default so a bare checkout runs against `data/`.
/// Weights and thresholds are tuning knobs, not validated constants.
#[derive(Debug, Clone)]
pub struct Config {
    pub jobs_dir: PathBuf,
    pub candidates_file: PathBuf,
    pub output_dir: PathBuf,
    pub anthropic_api_key: Option<String>,
    pub use_llm_decomposition: bool,
    pub batch_size: usize,
    pub hitl_confidence_threshold: f64,
    pub weights: ScoringWeights,
    pub baseline_thresholds: Thresholds,
    pub multistage_thresholds: Thresholds,
    pub baseline_target_frr: f64,
    pub improvement_target_frr: f64,
    pub frr_tolerance: f64,
    pub significance_alpha: f64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset keys take their default;
    /// a set key that does not parse is an error naming the key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or = |key: &str, default| parse_or(key, lookup(key), default);
        let path_or =
            |key: &str, default: &str| lookup(key).map(PathBuf::from).unwrap_or_else(|| default.into());

        let batch_size: usize = parse_or("BATCH_SIZE", lookup("BATCH_SIZE"), 10)?;
        if batch_size == 0 {
            anyhow::bail!("BATCH_SIZE must be at least 1");
        }

        Ok(Config {
            jobs_dir: path_or("JOBS_DIR", "data/job_descriptions"),
            candidates_file: path_or("CANDIDATES_FILE", "data/candidates.csv"),
            output_dir: path_or("OUTPUT_DIR", "results"),
            anthropic_api_key: lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty()),
            use_llm_decomposition: parse_or(
                "USE_LLM_DECOMPOSITION",
                lookup("USE_LLM_DECOMPOSITION"),
                false,
            )?,
            batch_size,
            hitl_confidence_threshold: env_or("HITL_CONFIDENCE_THRESHOLD", 0.85)?,
            weights: ScoringWeights {
                skills: env_or("SKILL_WEIGHT", 0.5)?,
                experience: env_or("EXPERIENCE_WEIGHT", 0.25)?,
                education: env_or("EDUCATION_WEIGHT", 0.15)?,
                domain: env_or("DOMAIN_WEIGHT", 0.10)?,
            },
            baseline_thresholds: Thresholds {
                qualification: env_or("BASELINE_QUALIFICATION_THRESHOLD", 0.31)?,
                acceptance: env_or("BASELINE_ACCEPTANCE_THRESHOLD", 0.50)?,
            },
            multistage_thresholds: Thresholds {
                qualification: env_or("MULTISTAGE_QUALIFICATION_THRESHOLD", 0.33)?,
                acceptance: env_or("MULTISTAGE_ACCEPTANCE_THRESHOLD", 0.50)?,
            },
            baseline_target_frr: env_or("BASELINE_TARGET_FRR", 0.12)?,
            improvement_target_frr: env_or("IMPROVEMENT_TARGET_FRR", 0.06)?,
            frr_tolerance: env_or("FRR_TOLERANCE", 0.02)?,
            significance_alpha: env_or("SIGNIFICANCE_ALPHA", 0.05)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Parses `raw`, falling back to `default` when the key is unset.
fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.jobs_dir, PathBuf::from("data/job_descriptions"));
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.anthropic_api_key, None);
        assert!(!config.use_llm_decomposition);
        assert_eq!(config.weights, ScoringWeights::default());
        assert_eq!(config.baseline_thresholds, Thresholds::baseline());
        assert_eq!(config.multistage_thresholds, Thresholds::multistage());
        assert_eq!(config.hitl_confidence_threshold, 0.85);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_overrides_are_parsed_and_trimmed() {
        let config = Config::from_lookup(lookup(&[
            ("BATCH_SIZE", " 25 "),
            ("SKILL_WEIGHT", "0.6"),
            ("USE_LLM_DECOMPOSITION", "true"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("OUTPUT_DIR", "/tmp/out"),
        ]))
        .unwrap();
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.weights.skills, 0.6);
        assert!(config.use_llm_decomposition);
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = Config::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "  ")])).unwrap();
        assert_eq!(config.anthropic_api_key, None);
    }

    #[test]
    fn test_malformed_value_names_the_key() {
        let err = Config::from_lookup(lookup(&[("SIGNIFICANCE_ALPHA", "five percent")])).unwrap_err();
        assert!(err.to_string().contains("SIGNIFICANCE_ALPHA"));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = Config::from_lookup(lookup(&[("BATCH_SIZE", "0")])).unwrap_err();
        assert!(err.to_string().contains("BATCH_SIZE"));
    }
}
