pub mod audit;
pub mod critique;
pub mod heuristic;
pub mod llm;
pub mod pipeline;
pub mod prompts;

pub use audit::{AuditLog, ReviewRequest};
pub use critique::{Critic, CritiqueError, CritiqueResult, RetryPolicy};
pub use heuristic::HeuristicCritic;
pub use llm::LlmCritic;
pub use pipeline::{ReviewTriage, TriageReport};
