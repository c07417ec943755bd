pub mod loader;
pub mod runner;
pub mod screeners;

pub use loader::{category_from_filename, load_candidates, JobCatalog};
pub use runner::{EvaluationRunner, RunOutput};
pub use screeners::{KeywordScreener, MultiStageScreener, Screener, ScreeningResult};
