use serde::{Deserialize, Serialize};

use crate::models::outcome::{DecisionClass, EvaluationOutcome};

/// Confusion-matrix counts over one ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total: usize,
    pub qualified: usize,
    pub unqualified: usize,
    pub false_rejections: usize,
    pub false_acceptances: usize,
    pub correct_decisions: usize,
}

impl LedgerStats {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct_decisions as f64 / self.total as f64
    }

    /// false rejections ÷ qualified, 0 when nobody qualified.
    pub fn frr(&self) -> f64 {
        if self.qualified == 0 {
            return 0.0;
        }
        self.false_rejections as f64 / self.qualified as f64
    }
}

/// Append-only record of outcomes for one system over one run.
///
/// Owned by a single writer (the runner). Outcomes are never edited once
/// appended; `reset` clears everything between independent runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    entries: Vec<EvaluationOutcome>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, outcome: EvaluationOutcome) {
        self.entries.push(outcome);
    }

    /// Appends a whole batch at once. Either every outcome lands or none does.
    pub fn append_batch(&mut self, outcomes: Vec<EvaluationOutcome>) {
        self.entries.extend(outcomes);
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[EvaluationOutcome] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> LedgerStats {
        let mut stats = LedgerStats {
            total: self.entries.len(),
            ..LedgerStats::default()
        };
        for outcome in &self.entries {
            if outcome.qualified {
                stats.qualified += 1;
            } else {
                stats.unqualified += 1;
            }
            match outcome.classify() {
                DecisionClass::FalseRejection => stats.false_rejections += 1,
                DecisionClass::FalseAcceptance => stats.false_acceptances += 1,
                DecisionClass::CorrectAccept | DecisionClass::CorrectReject => {
                    stats.correct_decisions += 1
                }
            }
        }
        stats
    }

    pub fn frr(&self) -> f64 {
        self.stats().frr()
    }
}

impl FromIterator<EvaluationOutcome> for Ledger {
    fn from_iter<T: IntoIterator<Item = EvaluationOutcome>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
