pub mod matcher;
pub mod ontology;

pub use matcher::{LearningPath, MatchMode, SkillGapAnalysis, SkillMatcher, TransferableSkills};
pub use ontology::{SkillCategory, SkillOntology};
