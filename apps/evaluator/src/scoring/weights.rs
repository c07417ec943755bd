use serde::{Deserialize, Serialize};

use crate::models::outcome::DimensionScores;

/// Per-dimension weights for the overall score. Not normalized: callers that
/// pass weights summing above 1.0 get a clamped overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub domain: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills: 0.5,
            experience: 0.25,
            education: 0.15,
            domain: 0.10,
        }
    }
}

impl ScoringWeights {
    /// Weighted sum of the four dimensions, clamped to [0, 1].
    pub fn combine(&self, scores: &DimensionScores) -> f64 {
        (self.skills * scores.skills
            + self.experience * scores.experience
            + self.education * scores.education
            + self.domain * scores.domain)
            .clamp(0.0, 1.0)
    }
}

/// The two independent cut-offs applied to the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// overall ≥ this ⇒ the candidate counts as qualified
    pub qualification: f64,
    /// overall ≥ this ⇒ the system accepts
    pub acceptance: f64,
}

impl Thresholds {
    pub fn baseline() -> Self {
        Self {
            qualification: 0.31,
            acceptance: 0.50,
        }
    }

    pub fn multistage() -> Self {
        Self {
            qualification: 0.33,
            acceptance: 0.50,
        }
    }

    pub fn is_qualified(&self, overall: f64) -> bool {
        overall >= self.qualification
    }

    pub fn accepts(&self, overall: f64) -> bool {
        overall >= self.acceptance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = ScoringWeights::default();
        assert!((w.skills + w.experience + w.education + w.domain - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_combine_weighted_sum() {
        let scores = DimensionScores {
            skills: 2.0 / 3.0,
            experience: 1.0,
            education: 1.0,
            domain: 0.3,
        };
        let expected = 0.5 * (2.0 / 3.0) + 0.25 + 0.15 + 0.03;
        assert!((ScoringWeights::default().combine(&scores) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_combine_clamps_unnormalized_weights() {
        let w = ScoringWeights {
            skills: 1.0,
            experience: 1.0,
            education: 1.0,
            domain: 1.0,
        };
        let full = DimensionScores {
            skills: 1.0,
            experience: 1.0,
            education: 1.0,
            domain: 1.0,
        };
        assert_eq!(w.combine(&full), 1.0);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let t = Thresholds::baseline();
        assert!(t.is_qualified(0.31));
        assert!(!t.is_qualified(0.3099));
        assert!(t.accepts(0.5));
        assert!(!t.accepts(0.4999));
    }
}
