//! Job catalog and candidate loading.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::extraction::decompose::decompose_requirements;
use crate::extraction::RequirementExtractor;
use crate::llm_client::LlmClient;
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobRequirement;
use crate::triage::critique::RetryPolicy;

const FILE_PREFIX: &str = "JD_";
const FILE_SUFFIX: &str = "_job_description";
const JOB_FILE_EXTENSIONS: &[&str] = &["md", "txt"];

/// Dataset labels whose job file is named differently.
const CATEGORY_ALIASES: &[(&str, &str)] = &[("Application Developer", "Python Developer")];

/// "JD_Python_Developer_job_description.md" → "Python Developer".
pub fn category_from_filename(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = stem.strip_prefix(FILE_PREFIX).unwrap_or(&stem);
    stem.replace(FILE_SUFFIX, "").replace('_', " ").trim().to_string()
}

/// Job requirements keyed by category. Built once per run, read-only after.
#[derive(Debug, Clone)]
pub struct JobCatalog {
    jobs: BTreeMap<String, Arc<JobRequirement>>,
    aliases: BTreeMap<String, String>,
}

impl JobCatalog {
    pub fn new() -> Self {
        Self {
            jobs: BTreeMap::new(),
            aliases: CATEGORY_ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    /// Reads every job file in `dir`. With an LLM client, requirements are
    /// decomposed by the model and fall back to the rule-based extractor when
    /// that fails.
    pub async fn load(
        dir: &Path,
        extractor: &RequirementExtractor,
        llm: Option<&LlmClient>,
    ) -> Result<Self, AppError> {
        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_job_file = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| JOB_FILE_EXTENSIONS.contains(&e));
            if is_job_file {
                paths.push(path);
            }
        }
        paths.sort();

        let mut catalog = Self::new();
        for path in paths {
            let category = category_from_filename(&path);
            let text = tokio::fs::read_to_string(&path).await?;

            let requirement = match llm {
                Some(llm) => {
                    let retry = RetryPolicy::default();
                    match decompose_requirements(&category, &text, llm, extractor.matcher(), &retry)
                        .await
                    {
                        Ok(req) => req,
                        Err(e) => {
                            warn!("{category}: {e}, using rule-based extraction");
                            extractor.parse(&category, &text)
                        }
                    }
                }
                None => extractor.parse(&category, &text),
            };

            info!(
                "Loaded job '{}' ({} required skills, {}+ years)",
                category,
                requirement.required_skills.len(),
                requirement.min_experience_years
            );
            let families = extractor
                .matcher()
                .group_by_category(requirement.required_skills.iter().map(String::as_str));
            debug!("{category}: required skills by family {families:?}");
            catalog.insert(requirement);
        }

        if catalog.is_empty() {
            return Err(AppError::Validation(format!(
                "no job descriptions found in {}",
                dir.display()
            )));
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, requirement: JobRequirement) {
        self.jobs
            .insert(requirement.category.clone(), Arc::new(requirement));
    }

    pub fn with_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.aliases.insert(from.into(), to.into());
        self
    }

    pub fn get(&self, category: &str) -> Result<Arc<JobRequirement>, AppError> {
        self.jobs
            .get(category)
            .cloned()
            .ok_or_else(|| AppError::UnknownJobCategory(category.to_string()))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.jobs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Category to evaluate `candidate` against: the actual category, then
    /// the predicted position, each through the alias table first.
    pub fn resolve(&self, candidate: &CandidateProfile) -> Option<&str> {
        [&candidate.actual_category, &candidate.predicted_position]
            .into_iter()
            .flatten()
            .find_map(|label| self.lookup(label))
    }

    fn lookup(&self, label: &str) -> Option<&str> {
        let label = label.trim();
        if let Some(target) = self.aliases.get(label) {
            if let Some((key, _)) = self.jobs.get_key_value(target) {
                return Some(key.as_str());
            }
        }
        self.jobs.get_key_value(label).map(|(key, _)| key.as_str())
    }
}

impl Default for JobCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads candidate rows. Blank cells become absent values.
pub fn load_candidates(path: &Path) -> Result<Vec<CandidateProfile>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut candidates = Vec::new();
    for row in reader.deserialize::<CandidateProfile>() {
        candidates.push(row?);
    }
    info!("Loaded {} candidates from {}", candidates.len(), path.display());
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const PYTHON_JD: &str = "Python Developer\n\nRequired Skills:\n- Python\n- Django\n- MySQL\n\n3+ years of experience\nBachelor's degree in Computer Science";

    fn candidate(actual: Option<&str>, predicted: Option<&str>) -> CandidateProfile {
        CandidateProfile {
            id: "1".to_string(),
            actual_category: actual.map(str::to_string),
            predicted_position: predicted.map(str::to_string),
            ..Default::default()
        }
    }

    fn catalog_with(categories: &[&str]) -> JobCatalog {
        let mut catalog = JobCatalog::new();
        for c in categories {
            catalog.insert(JobRequirement::empty(*c));
        }
        catalog
    }

    #[test]
    fn test_category_from_filename() {
        assert_eq!(
            category_from_filename(Path::new("jobs/JD_Python_Developer_job_description.md")),
            "Python Developer"
        );
        assert_eq!(
            category_from_filename(Path::new("Data_Scientist_job_description.md")),
            "Data Scientist"
        );
        assert_eq!(category_from_filename(Path::new("DevOps_Engineer.txt")), "DevOps Engineer");
    }

    #[test]
    fn test_get_unknown_category_fails() {
        let catalog = catalog_with(&["Python Developer"]);
        assert!(catalog.get("Python Developer").is_ok());
        match catalog.get("Astronaut") {
            Err(AppError::UnknownJobCategory(c)) => assert_eq!(c, "Astronaut"),
            other => panic!("expected unknown category, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_order() {
        let catalog = catalog_with(&["Python Developer", "Data Science"]);

        assert_eq!(
            catalog.resolve(&candidate(Some("Data Science"), Some("Python Developer"))),
            Some("Data Science")
        );
        assert_eq!(
            catalog.resolve(&candidate(Some("Application Developer"), None)),
            Some("Python Developer")
        );
        assert_eq!(
            catalog.resolve(&candidate(Some("Sales"), Some("Data Science"))),
            Some("Data Science")
        );
        assert_eq!(catalog.resolve(&candidate(None, Some(" Python Developer "))), Some("Python Developer"));
        assert_eq!(catalog.resolve(&candidate(Some("Sales"), Some("HR"))), None);
        assert_eq!(catalog.resolve(&candidate(None, None)), None);
    }

    #[test]
    fn test_custom_alias() {
        let catalog = catalog_with(&["DevOps Engineer"]).with_alias("SRE", "DevOps Engineer");
        assert_eq!(catalog.resolve(&candidate(Some("SRE"), None)), Some("DevOps Engineer"));
    }

    #[tokio::test]
    async fn test_load_reads_job_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("JD_Python_Developer_job_description.md"), PYTHON_JD).unwrap();
        std::fs::write(dir.path().join("notes.csv"), "ignored").unwrap();

        let catalog = JobCatalog::load(dir.path(), &RequirementExtractor::default(), None)
            .await
            .unwrap();

        assert_eq!(catalog.categories().collect::<Vec<_>>(), vec!["Python Developer"]);
        let job = catalog.get("Python Developer").unwrap();
        assert!(job.required_skills.contains(&"django".to_string()));
        assert_eq!(job.min_experience_years, 3);
    }

    #[tokio::test]
    async fn test_load_empty_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JobCatalog::load(dir.path(), &RequirementExtractor::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_load_candidates_blank_cells() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "id,skills,experience,education,companies,predicted_position,actual_category"
        )
        .unwrap();
        writeln!(file, "1,\"Python, SQL\",3 years,B.Sc,Acme,Python Developer,").unwrap();
        writeln!(file, "2,,,,,,Data Science").unwrap();
        file.flush().unwrap();

        let candidates = load_candidates(file.path()).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].skills.as_deref(), Some("Python, SQL"));
        assert_eq!(candidates[0].actual_category, None);
        assert_eq!(candidates[1].skills, None);
        assert_eq!(candidates[1].experience, None);
        assert_eq!(candidates[1].actual_category.as_deref(), Some("Data Science"));
    }
}
