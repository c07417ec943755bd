pub mod adjustment;
pub mod engine;
pub mod weights;

pub use adjustment::{adjusted_overall, critique_adjustment};
pub use engine::ScoringEngine;
pub use weights::{ScoringWeights, Thresholds};
