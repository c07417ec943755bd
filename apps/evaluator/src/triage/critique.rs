//! Secondary critique: the collaborator contract, its result record, and the
//! retry wrapper every call goes through.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::extraction::StructuredProfile;
use crate::models::job::JobRequirement;
use crate::triage::pipeline::InitialScreening;

/// Reviewer confidence assumed when the critic does not report one.
pub const DEFAULT_ASSESSMENT_CONFIDENCE: f64 = 0.8;

// ────────────────────────────────────────────────────────────────────────────
// Records
// ────────────────────────────────────────────────────────────────────────────

/// A skill the candidate holds that carries over to a requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferableSkillPair {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub relevance: String,
}

/// Critique payload as a critic returns it. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCritique {
    #[serde(default)]
    pub adjusted_score: Option<f64>,
    #[serde(default)]
    pub confidence_in_assessment: Option<f64>,
    #[serde(default)]
    pub bias_flags: Vec<String>,
    #[serde(default)]
    pub hidden_gem_indicators: Vec<String>,
    #[serde(default)]
    pub transferable_skills: Vec<TransferableSkillPair>,
    #[serde(default)]
    pub reasoning: String,
}

/// Critique with defaults filled in and both scores in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritiqueResult {
    pub adjusted_score: f64,
    pub confidence: f64,
    pub bias_flags: Vec<String>,
    pub hidden_gem_indicators: Vec<String>,
    pub transferable_skills: Vec<TransferableSkillPair>,
    pub reasoning: String,
}

impl CritiqueResult {
    /// A missing adjusted score keeps the initial score; a missing confidence
    /// becomes 0.8.
    pub fn from_raw(raw: RawCritique, initial_score: f64) -> Self {
        Self {
            adjusted_score: unit(raw.adjusted_score.unwrap_or(initial_score)),
            confidence: unit(
                raw.confidence_in_assessment
                    .unwrap_or(DEFAULT_ASSESSMENT_CONFIDENCE),
            ),
            bias_flags: raw.bias_flags,
            hidden_gem_indicators: raw.hidden_gem_indicators,
            transferable_skills: raw.transferable_skills,
            reasoning: raw.reasoning,
        }
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CritiqueError {
    #[error("critic transport failed: {0}")]
    Transport(String),

    #[error("critic returned a malformed payload: {0}")]
    Malformed(String),

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Trait
// ────────────────────────────────────────────────────────────────────────────

/// Second opinion on an initial screening. Implementations may be
/// nondeterministic; everything downstream of them is not.
///
/// Carried by the triage pipeline as `Arc<dyn Critic>`.
#[async_trait]
pub trait Critic: Send + Sync {
    fn name(&self) -> &'static str;

    async fn critique(
        &self,
        profile: &StructuredProfile,
        requirement: &JobRequirement,
        screening: &InitialScreening,
    ) -> Result<CritiqueResult, CritiqueError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Retry
// ────────────────────────────────────────────────────────────────────────────

/// Fixed-count retry with doubling delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): base, 2×base, 4×base, ...
    pub fn delay_before(&self, retry: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry.saturating_sub(1))
    }

    /// Runs `op` until it succeeds or the attempt budget is spent. `op` is
    /// called at most `max_attempts` times.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, CritiqueError>
    where
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.delay_before(attempt);
                warn!(
                    "{} attempt {} failed, retrying after {}ms...",
                    label,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => last = e.to_string(),
            }
        }

        Err(CritiqueError::Exhausted { attempts, last })
    }
}
