//! Review-informed shift of the overall score, applied by the multi-stage
//! system before its thresholds.

/// Score shift from the critic's confidence and its reviewed score. Rewards
/// only clearly strong reviews; penalizes doubtful or weak ones harder.
///
/// | confidence | reviewed score | shift |
/// |------------|----------------|-------|
/// | > 0.90     | > 0.70         | +0.10 |
/// | > 0.85     | > 0.65         | +0.05 |
/// | < 0.75     | or < 0.40      | -0.15 |
/// | < 0.80     | or < 0.50      | -0.08 |
/// | any        | < 0.60         | -0.05 |
///
/// Rows are tried top to bottom; none matching is no shift.
pub fn critique_adjustment(confidence: f64, reviewed_score: f64) -> f64 {
    if confidence > 0.9 && reviewed_score > 0.7 {
        0.10
    } else if confidence > 0.85 && reviewed_score > 0.65 {
        0.05
    } else if confidence < 0.75 || reviewed_score < 0.4 {
        -0.15
    } else if confidence < 0.8 || reviewed_score < 0.5 {
        -0.08
    } else if reviewed_score < 0.6 {
        -0.05
    } else {
        0.0
    }
}

/// `base + shift`, kept in [0, 1].
pub fn adjusted_overall(base: f64, confidence: f64, reviewed_score: f64) -> f64 {
    (base + critique_adjustment(confidence, reviewed_score)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_tiers() {
        assert_eq!(critique_adjustment(0.95, 0.8), 0.10);
        assert_eq!(critique_adjustment(0.88, 0.7), 0.05);
        // strong score does not save a doubtful reviewer
        assert_eq!(critique_adjustment(0.7, 0.9), -0.15);
        assert_eq!(critique_adjustment(0.95, 0.3), -0.15);
        assert_eq!(critique_adjustment(0.78, 0.7), -0.08);
        assert_eq!(critique_adjustment(0.82, 0.45), -0.08);
        assert_eq!(critique_adjustment(0.82, 0.55), -0.05);
        assert_eq!(critique_adjustment(0.82, 0.62), 0.0);
    }

    #[test]
    fn test_adjusted_overall_is_clamped() {
        assert_eq!(adjusted_overall(0.95, 0.95, 0.9), 1.0);
        assert_eq!(adjusted_overall(0.1, 0.5, 0.2), 0.0);
        assert!((adjusted_overall(0.45, 0.95, 0.8) - 0.55).abs() < 1e-12);
    }
}
