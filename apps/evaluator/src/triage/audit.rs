use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::triage::pipeline::{ReviewPriority, ReviewType, TriageReport};

/// Event asking a human to look at one triaged candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub channel: String,
    pub workflow_id: String,
    pub job_id: String,
    pub candidate_id: String,
    pub review_type: ReviewType,
    pub priority: ReviewPriority,
    pub screening_score: f64,
    pub critic_score: f64,
    pub requested_at: DateTime<Utc>,
}

impl ReviewRequest {
    pub fn from_report(report: &TriageReport) -> Self {
        Self {
            channel: format!("review_{}", report.workflow_id),
            workflow_id: report.workflow_id.clone(),
            job_id: report.job_id.clone(),
            candidate_id: report.candidate_id.clone(),
            review_type: report.review_type,
            priority: report.review_priority,
            screening_score: report.screening_score,
            critic_score: report.critic_score,
            requested_at: Utc::now(),
        }
    }
}

/// Per-run audit counters and the outbound review-request channel.
///
/// One instance per run, shared by the triage tasks through an `Arc`.
#[derive(Debug, Default)]
pub struct AuditLog {
    completed: AtomicU64,
    needs_review: AtomicU64,
    sender: Option<mpsc::UnboundedSender<ReviewRequest>>,
}

impl AuditLog {
    /// Counters only; review requests are logged and dropped.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel() -> (Self, mpsc::UnboundedReceiver<ReviewRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(tx),
                ..Self::default()
            },
            rx,
        )
    }

    pub fn record(&self, report: &TriageReport) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if !report.needs_review {
            return;
        }
        self.needs_review.fetch_add(1, Ordering::Relaxed);

        let request = ReviewRequest::from_report(report);
        info!(
            workflow_id = %request.workflow_id,
            review_type = ?request.review_type,
            priority = ?request.priority,
            "review requested for candidate {}",
            request.candidate_id
        );

        if let Some(tx) = &self.sender {
            if tx.send(request).is_err() {
                warn!("review channel closed, request for {} dropped", report.candidate_id);
            }
        }
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn needs_review(&self) -> u64 {
        self.needs_review.load(Ordering::Relaxed)
    }

    /// Share of completed triages that asked for a human, 0 before any.
    pub fn review_rate(&self) -> f64 {
        let completed = self.completed();
        if completed == 0 {
            return 0.0;
        }
        self.needs_review() as f64 / completed as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(needs_review: bool) -> TriageReport {
        TriageReport {
            workflow_id: "wf_0a1b2c3d".to_string(),
            job_id: "Data Analyst".to_string(),
            candidate_id: "7".to_string(),
            screening_score: 0.35,
            critic_score: 0.5,
            critic_confidence: 0.8,
            confidence: 0.7,
            needs_review,
            review_type: if needs_review { ReviewType::Quick } else { ReviewType::None },
            review_priority: if needs_review { ReviewPriority::Low } else { ReviewPriority::Normal },
            hidden_gem: false,
            explanation: String::new(),
            bias_flags: vec![],
            matched_skills: vec![],
            missing_skills: vec![],
            transferable_skills: vec![],
            skill_gaps: Default::default(),
            learning_path: Default::default(),
            reasoning: String::new(),
            critic: "heuristic".to_string(),
        }
    }

    #[test]
    fn test_counters() {
        let audit = AuditLog::new();
        audit.record(&report(true));
        audit.record(&report(false));
        audit.record(&report(true));
        assert_eq!(audit.completed(), 3);
        assert_eq!(audit.needs_review(), 2);
        assert!((audit.review_rate() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(AuditLog::new().review_rate(), 0.0);
    }

    #[test]
    fn test_only_reviewed_reports_are_published() {
        let (audit, mut rx) = AuditLog::with_channel();
        audit.record(&report(false));
        audit.record(&report(true));

        let request = rx.try_recv().unwrap();
        assert_eq!(request.channel, "review_wf_0a1b2c3d");
        assert_eq!(request.review_type, ReviewType::Quick);
        assert_eq!(request.priority, ReviewPriority::Low);
        assert_eq!(request.screening_score, 0.35);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_channel_does_not_panic() {
        let (audit, rx) = AuditLog::with_channel();
        drop(rx);
        audit.record(&report(true));
        assert_eq!(audit.needs_review(), 1);
    }
}
