//! FRR statistics: interval estimates, target checks and power analysis.

use serde::{Deserialize, Serialize};

use crate::stats::ledger::{Ledger, LedgerStats};

/// Share of a screened population assumed to be qualified when planning.
const ASSUMED_QUALIFICATION_RATE: f64 = 0.70;

/// Supported interval levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    P95,
    P99,
}

impl ConfidenceLevel {
    pub fn z(self) -> f64 {
        match self {
            ConfidenceLevel::P95 => 1.96,
            ConfidenceLevel::P99 => 2.58,
        }
    }
}

/// Two-tailed critical value. Only α = 0.05 gets 1.96; everything else is
/// treated as α = 0.01.
pub fn z_critical(alpha: f64) -> f64 {
    if (alpha - 0.05).abs() < f64::EPSILON {
        1.96
    } else {
        2.58
    }
}

pub fn frr(ledger: &Ledger) -> f64 {
    ledger.frr()
}

/// target − tolerance ≤ frr ≤ target + tolerance.
pub fn validate_target(frr: f64, target: f64, tolerance: f64) -> bool {
    // absorb representation error at the bounds (0.12 + 0.02 < 0.14 in f64)
    const SLACK: f64 = 1e-12;
    frr >= target - tolerance - SLACK && frr <= target + tolerance + SLACK
}

/// Wilson score interval for the qualified subset's reject rate.
pub fn confidence_interval(ledger: &Ledger, level: ConfidenceLevel) -> (f64, f64) {
    wilson_interval(&ledger.stats(), level)
}

pub fn wilson_interval(stats: &LedgerStats, level: ConfidenceLevel) -> (f64, f64) {
    if stats.qualified == 0 {
        return (0.0, 0.0);
    }
    let n = stats.qualified as f64;
    let p = stats.frr();
    let z = level.z();
    let z2 = z * z;

    let denominator = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denominator;
    let margin = z * ((p * (1.0 - p) + z2 / (4.0 * n)) / n).sqrt() / denominator;

    ((center - margin).clamp(0.0, 1.0), (center + margin).clamp(0.0, 1.0))
}

/// Cohen's h between two proportions, as an absolute value.
pub fn cohens_h(p1: f64, p2: f64) -> f64 {
    (2.0 * (p1.sqrt().asin() - p2.sqrt().asin())).abs()
}

/// Probability of detecting a drop from `baseline_frr` to `target_frr` with
/// `sample_size` screened candidates, assuming 70% of them qualify.
pub fn statistical_power(sample_size: usize, baseline_frr: f64, target_frr: f64, alpha: f64) -> f64 {
    let qualified_estimate = (sample_size as f64 * ASSUMED_QUALIFICATION_RATE).floor();
    if qualified_estimate == 0.0 {
        return 0.0;
    }

    let effect = cohens_h(baseline_frr.clamp(0.0, 1.0), target_frr.clamp(0.0, 1.0));
    let z_beta = effect * (qualified_estimate / 4.0).sqrt() - z_critical(alpha);
    normal_cdf(z_beta).clamp(0.0, 1.0)
}

pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Abramowitz & Stegun 7.1.26, max error 1.5e-7.
pub fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}
