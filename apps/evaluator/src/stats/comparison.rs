//! Two-system FRR comparison: improvement, significance and effect size.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::outcome::EvaluationOutcome;
use crate::stats::frr::{cohens_h, z_critical, ConfidenceLevel};
use crate::stats::ledger::{Ledger, LedgerStats};

/// Literature baseline counts as reproduced within this distance.
const BASELINE_MATCH_DISTANCE: f64 = 0.05;
/// Allowed overshoot of the improvement target.
const IMPROVEMENT_SLACK: f64 = 0.02;
const EFFECT_SIZE_CRITERION: f64 = 0.5;
const RELATIVE_IMPROVEMENT_CRITERION: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectMagnitude {
    Small,
    Medium,
    Large,
}

impl EffectMagnitude {
    pub fn from_h(h: f64) -> Self {
        if h > 0.8 {
            EffectMagnitude::Large
        } else if h > 0.5 {
            EffectMagnitude::Medium
        } else {
            EffectMagnitude::Small
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EffectMagnitude::Small => "Small",
            EffectMagnitude::Medium => "Medium",
            EffectMagnitude::Large => "Large",
        }
    }
}

/// Derived comparison between a baseline ledger and a compared ledger.
/// Computed on demand, never stored alongside the ledgers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub baseline_frr: f64,
    pub compared_frr: f64,
    pub absolute_improvement: f64,
    /// absolute ÷ baseline FRR, 0 when the baseline FRR is 0
    pub relative_improvement: f64,
    pub statistically_significant: bool,
    pub effect_size: f64,
    /// 95% interval on the FRR difference
    pub confidence_interval: (f64, f64),
    /// Smaller of the two ledgers' totals.
    pub sample_size: usize,
    pub baseline_stats: LedgerStats,
    pub compared_stats: LedgerStats,
}

impl ComparisonRecord {
    pub fn effect_magnitude(&self) -> EffectMagnitude {
        EffectMagnitude::from_h(self.effect_size)
    }
}

pub fn compare(baseline: &Ledger, compared: &Ledger, alpha: f64) -> ComparisonRecord {
    compare_stats(&baseline.stats(), &compared.stats(), alpha)
}

pub fn compare_stats(baseline: &LedgerStats, compared: &LedgerStats, alpha: f64) -> ComparisonRecord {
    let baseline_frr = baseline.frr();
    let compared_frr = compared.frr();
    let absolute_improvement = baseline_frr - compared_frr;
    let relative_improvement = if baseline_frr > 0.0 {
        absolute_improvement / baseline_frr
    } else {
        0.0
    };

    ComparisonRecord {
        baseline_frr,
        compared_frr,
        absolute_improvement,
        relative_improvement,
        statistically_significant: is_significant(
            baseline_frr,
            compared_frr,
            baseline.qualified,
            compared.qualified,
            alpha,
        ),
        effect_size: effect_size(baseline_frr, compared_frr),
        confidence_interval: improvement_interval(
            baseline_frr,
            compared_frr,
            baseline.qualified,
            compared.qualified,
            ConfidenceLevel::P95,
        ),
        sample_size: baseline.total.min(compared.total),
        baseline_stats: *baseline,
        compared_stats: *compared,
    }
}

/// Cohen's h with both rates pulled into [0.001, 0.999]. Zero when both
/// systems never falsely reject.
pub fn effect_size(p1: f64, p2: f64) -> f64 {
    if p1 == 0.0 && p2 == 0.0 {
        return 0.0;
    }
    cohens_h(p1.clamp(0.001, 0.999), p2.clamp(0.001, 0.999))
}

/// Pooled two-proportion z-test, two-tailed.
pub fn is_significant(p1: f64, p2: f64, n1: usize, n2: usize, alpha: f64) -> bool {
    if n1 == 0 || n2 == 0 {
        return false;
    }
    let (n1, n2) = (n1 as f64, n2 as f64);
    let pooled = (p1 * n1 + p2 * n2) / (n1 + n2);
    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();
    if se == 0.0 {
        return p1 != p2;
    }
    (p1 - p2).abs() / se > z_critical(alpha)
}

/// Normal-approximation interval on p1 − p2 with unpooled variances,
/// clamped to [-1, 1].
pub fn improvement_interval(
    p1: f64,
    p2: f64,
    n1: usize,
    n2: usize,
    level: ConfidenceLevel,
) -> (f64, f64) {
    if n1 == 0 || n2 == 0 {
        return (0.0, 0.0);
    }
    let se = (p1 * (1.0 - p1) / n1 as f64 + p2 * (1.0 - p2) / n2 as f64).sqrt();
    let margin = level.z() * se;
    let diff = p1 - p2;
    ((diff - margin).clamp(-1.0, 1.0), (diff + margin).clamp(-1.0, 1.0))
}

/// Pass/fail against the published baseline and the improvement goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetValidation {
    pub baseline_matches_literature: bool,
    pub achieves_target_frr: bool,
    pub significant_improvement: bool,
    pub large_effect_size: bool,
    pub practical_significance: bool,
    pub meets_all_criteria: bool,
}

impl TargetValidation {
    /// Criteria in report order, with display names.
    pub fn criteria(&self) -> [(&'static str, bool); 6] {
        [
            ("Baseline Matches Literature", self.baseline_matches_literature),
            ("Achieves Target FRR", self.achieves_target_frr),
            ("Significant Improvement", self.significant_improvement),
            ("Large Effect Size", self.large_effect_size),
            ("Practical Significance", self.practical_significance),
            ("Meets All Criteria", self.meets_all_criteria),
        ]
    }
}

pub fn validate_targets(
    record: &ComparisonRecord,
    baseline_target: f64,
    improvement_target: f64,
) -> TargetValidation {
    let baseline_matches_literature =
        (record.baseline_frr - baseline_target).abs() < BASELINE_MATCH_DISTANCE;
    let achieves_target_frr = record.compared_frr <= improvement_target + IMPROVEMENT_SLACK;
    let significant_improvement = record.statistically_significant;
    let large_effect_size = record.effect_size > EFFECT_SIZE_CRITERION;
    let practical_significance = record.relative_improvement > RELATIVE_IMPROVEMENT_CRITERION;

    TargetValidation {
        baseline_matches_literature,
        achieves_target_frr,
        significant_improvement,
        large_effect_size,
        practical_significance,
        meets_all_criteria: baseline_matches_literature
            && achieves_target_frr
            && significant_improvement
            && large_effect_size
            && practical_significance,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Saved runs
// ────────────────────────────────────────────────────────────────────────────

/// A results file as the evaluator writes it, or a bare outcome array.
#[derive(Deserialize)]
#[serde(untagged)]
enum SavedOutcomes {
    Results { outcomes: Vec<EvaluationOutcome> },
    Bare(Vec<EvaluationOutcome>),
}

/// Rebuilds a ledger from a saved `*_results.json`.
pub fn load_ledger(path: &Path) -> Result<Ledger, AppError> {
    let body = std::fs::read_to_string(path)?;
    let outcomes = match serde_json::from_str::<SavedOutcomes>(&body)? {
        SavedOutcomes::Results { outcomes } | SavedOutcomes::Bare(outcomes) => outcomes,
    };
    info!("Loaded {} outcomes from {}", outcomes.len(), path.display());
    Ok(outcomes.into_iter().collect())
}

/// Comparison and target validation as written to `comparison.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonFile {
    pub comparison: ComparisonRecord,
    pub validation: TargetValidation,
}

pub fn save_comparison(
    path: &Path,
    record: &ComparisonRecord,
    validation: &TargetValidation,
) -> Result<(), AppError> {
    let file = ComparisonFile {
        comparison: record.clone(),
        validation: *validation,
    };
    std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
    Ok(())
}
