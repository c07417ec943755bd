use serde::{Deserialize, Serialize};

use crate::stats::frr::{confidence_interval, validate_target, ConfidenceLevel};
use crate::stats::ledger::{Ledger, LedgerStats};

/// Per-system result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub system: String,
    pub frr: f64,
    pub stats: LedgerStats,
    pub confidence_interval: (f64, f64),
    pub target: f64,
    pub tolerance: f64,
    pub validated: bool,
    /// Candidates whose evaluation errored and were kept out of the ledger.
    pub failures: usize,
    /// Candidates with no resolvable job category.
    pub skipped: usize,
}

impl RunSummary {
    pub fn from_ledger(
        system: impl Into<String>,
        ledger: &Ledger,
        target: f64,
        tolerance: f64,
        failures: usize,
        skipped: usize,
    ) -> Self {
        let stats = ledger.stats();
        let frr = stats.frr();
        Self {
            system: system.into(),
            frr,
            stats,
            confidence_interval: confidence_interval(ledger, ConfidenceLevel::P95),
            target,
            tolerance,
            validated: validate_target(frr, target, tolerance),
            failures,
            skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::outcome::fixtures::outcome;
    use crate::models::outcome::Decision;

    #[test]
    fn test_summary_from_ledger() {
        let ledger: Ledger = (0..100)
            .map(|i| {
                let decision = if i < 12 { Decision::Reject } else { Decision::Accept };
                outcome(&format!("c{i}"), true, decision)
            })
            .collect();
        let summary = RunSummary::from_ledger("keyword", &ledger, 0.12, 0.02, 3, 1);

        assert_eq!(summary.system, "keyword");
        assert_eq!(summary.frr, 0.12);
        assert!(summary.validated);
        assert_eq!(summary.stats.qualified, 100);
        assert_eq!(summary.failures, 3);
        assert_eq!(summary.skipped, 1);
        assert!(summary.confidence_interval.0 < 0.12);
    }

    #[test]
    fn test_summary_serializes_interval_as_pair() {
        let summary = RunSummary::from_ledger("multi_stage", &Ledger::new(), 0.06, 0.02, 0, 0);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["confidence_interval"], serde_json::json!([0.0, 0.0]));
        assert_eq!(json["validated"], serde_json::json!(false));
    }
}
