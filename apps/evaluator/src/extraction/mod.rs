pub mod decompose;
pub mod education;
pub mod experience;
pub mod profile;
pub mod prompts;
pub mod requirements;

pub use profile::StructuredProfile;
pub use requirements::{RequirementExtractor, SkillRequirements};
