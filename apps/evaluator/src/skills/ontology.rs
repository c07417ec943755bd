//! Static alias, relatedness and category tables for skills.
//!
//! All names on the right-hand side of these tables are canonical skill names:
//! lowercase, and already in the form `SkillMatcher::normalize` produces.

use std::collections::{BTreeSet, HashMap};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Raw (already cleaned) spelling → canonical name.
const ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("es6", "javascript"),
    ("ecmascript", "javascript"),
    ("ts", "typescript"),
    ("py", "python"),
    ("golang", "go"),
    ("cpp", "c++"),
    ("csharp", "c#"),
    ("ml", "machine learning"),
    ("ai", "artificial intelligence"),
    ("nlp", "natural language processing"),
    ("db", "database"),
    ("postgres", "postgresql"),
    ("mongo", "mongodb"),
    ("node", "nodejs"),
    ("node.js", "nodejs"),
    ("node js", "nodejs"),
    ("react.js", "react"),
    ("reactjs", "react"),
    ("vue.js", "vue"),
    ("vuejs", "vue"),
    ("angular.js", "angular"),
    ("angularjs", "angular"),
    ("express.js", "express"),
    ("expressjs", "express"),
    ("next.js", "nextjs"),
    ("tf", "tensorflow"),
    ("k8s", "kubernetes"),
    ("aws", "amazon web services"),
    ("gcp", "google cloud platform"),
    ("google cloud", "google cloud platform"),
    ("cicd", "continuous integration"),
    ("ci cd", "continuous integration"),
    ("sql server", "sql"),
    ("mssql", "sql"),
    ("sklearn", "scikit-learn"),
    ("scikitlearn", "scikit-learn"),
    ("scikit learn", "scikit-learn"),
    ("rest", "rest api"),
    ("restful", "rest api"),
    ("restful api", "rest api"),
    ("springboot", "spring boot"),
    ("powerbi", "power bi"),
    ("ms excel", "excel"),
    ("microsoft excel", "excel"),
];

/// Vocabulary scanned for in free text (job descriptions, skill blocks).
/// Entries may be aliases; hits are canonicalized afterwards.
const KNOWN_SKILLS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "typescript",
    "c++",
    "c#",
    "golang",
    "rust",
    "html",
    "css",
    "react",
    "angular",
    "vue",
    "nodejs",
    "node.js",
    "express",
    "mysql",
    "postgresql",
    "mongodb",
    "redis",
    "sql",
    "nosql",
    "docker",
    "kubernetes",
    "aws",
    "azure",
    "gcp",
    "terraform",
    "git",
    "jenkins",
    "gitlab",
    "github",
    "ci/cd",
    "machine learning",
    "deep learning",
    "tensorflow",
    "pytorch",
    "pandas",
    "numpy",
    "scikit-learn",
    "statistics",
    "data science",
    "fastapi",
    "django",
    "flask",
    "spring",
    "rest api",
    "graphql",
    "microservices",
    "cloud",
    "devops",
    "agile",
    "scrum",
    "linux",
    "excel",
    "tableau",
    "power bi",
    "selenium",
    "hadoop",
    "spark",
    "kafka",
];

/// Directed relatedness edges. Read symmetrically.
const RELATED: &[(&str, &[&str])] = &[
    (
        "python",
        &[
            "django",
            "flask",
            "fastapi",
            "pandas",
            "numpy",
            "scikit-learn",
            "pytorch",
            "tensorflow",
        ],
    ),
    (
        "javascript",
        &["typescript", "react", "vue", "angular", "nodejs", "express"],
    ),
    (
        "java",
        &["spring", "spring boot", "hibernate", "maven", "gradle"],
    ),
    (
        "react",
        &["javascript", "typescript", "redux", "nextjs", "react native"],
    ),
    ("django", &["python", "postgresql", "celery"]),
    ("docker", &["kubernetes", "docker compose", "podman"]),
    (
        "amazon web services",
        &["ec2", "s3", "lambda", "cloudformation"],
    ),
    (
        "postgresql",
        &[
            "sql",
            "database design",
            "query optimization",
            "mysql",
            "database",
        ],
    ),
    (
        "mysql",
        &[
            "sql",
            "database design",
            "query optimization",
            "postgresql",
            "database",
        ],
    ),
    (
        "machine learning",
        &[
            "python",
            "tensorflow",
            "pytorch",
            "scikit-learn",
            "pandas",
            "numpy",
        ],
    ),
];

/// Broad skill families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    ProgrammingLanguage,
    Framework,
    Database,
    DevOps,
    CloudPlatform,
    VersionControl,
    DataScience,
    SoftSkills,
    Other,
}

impl SkillCategory {
    /// Categories whose skills carry over between roles.
    pub fn is_transferable(self) -> bool {
        matches!(
            self,
            SkillCategory::VersionControl
                | SkillCategory::Database
                | SkillCategory::DevOps
                | SkillCategory::CloudPlatform
        )
    }
}

const CATEGORIES: &[(SkillCategory, &[&str])] = &[
    (
        SkillCategory::ProgrammingLanguage,
        &[
            "python",
            "javascript",
            "java",
            "c++",
            "c#",
            "go",
            "ruby",
            "php",
            "swift",
            "kotlin",
            "rust",
            "typescript",
            "r",
            "matlab",
            "scala",
        ],
    ),
    (
        SkillCategory::Framework,
        &[
            "django",
            "flask",
            "fastapi",
            "react",
            "vue",
            "angular",
            "express",
            "spring",
            "spring boot",
            "ruby on rails",
            "laravel",
            "asp.net",
        ],
    ),
    (
        SkillCategory::Database,
        &[
            "postgresql",
            "mysql",
            "mongodb",
            "redis",
            "elasticsearch",
            "cassandra",
            "oracle",
            "sql",
            "dynamodb",
            "neo4j",
            "database",
        ],
    ),
    (
        SkillCategory::DevOps,
        &[
            "docker",
            "kubernetes",
            "jenkins",
            "gitlab ci",
            "github actions",
            "terraform",
            "ansible",
            "helm",
            "continuous integration",
        ],
    ),
    (
        SkillCategory::CloudPlatform,
        &["amazon web services", "google cloud platform", "azure", "heroku"],
    ),
    (
        SkillCategory::VersionControl,
        &["git", "github", "gitlab", "bitbucket", "svn"],
    ),
    (
        SkillCategory::DataScience,
        &[
            "machine learning",
            "deep learning",
            "tensorflow",
            "pytorch",
            "scikit-learn",
            "pandas",
            "numpy",
            "data analysis",
            "statistics",
            "data science",
        ],
    ),
    (
        SkillCategory::SoftSkills,
        &[
            "communication",
            "leadership",
            "problem solving",
            "teamwork",
            "agile",
            "scrum",
            "project management",
        ],
    ),
];

/// Lowercases and strips everything but letters, digits, spaces and `+ # .`,
/// then collapses runs of whitespace.
pub fn clean_skill_text(text: &str) -> String {
    let filtered: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '+' | '#' | '.'))
        .collect();
    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The loaded ontology. Immutable after construction; share it behind an `Arc`.
#[derive(Debug)]
pub struct SkillOntology {
    aliases: HashMap<String, String>,
    /// Canonical names longer than two characters, longest first.
    substring_candidates: Vec<String>,
    related: HashMap<String, BTreeSet<String>>,
    categories: HashMap<String, SkillCategory>,
    vocabulary: Vec<(String, Regex)>,
}

impl SkillOntology {
    /// Builds the ontology from the built-in tables.
    pub fn standard() -> Self {
        let aliases: HashMap<String, String> = ALIASES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut related: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (skill, neighbours) in RELATED {
            for n in *neighbours {
                related
                    .entry(skill.to_string())
                    .or_default()
                    .insert(n.to_string());
                related
                    .entry(n.to_string())
                    .or_default()
                    .insert(skill.to_string());
            }
        }

        let categories: HashMap<String, SkillCategory> = CATEGORIES
            .iter()
            .flat_map(|(cat, skills)| skills.iter().map(move |s| (s.to_string(), *cat)))
            .collect();

        let mut canonical: BTreeSet<String> = aliases.values().cloned().collect();
        canonical.extend(
            KNOWN_SKILLS
                .iter()
                .filter(|s| clean_skill_text(s) == **s)
                .map(|s| s.to_string()),
        );
        canonical.extend(related.keys().cloned());
        canonical.extend(categories.keys().cloned());
        canonical.retain(|s| !aliases.contains_key(s));

        let mut substring_candidates: Vec<String> =
            canonical.into_iter().filter(|s| s.len() > 2).collect();
        substring_candidates.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let vocabulary = KNOWN_SKILLS
            .iter()
            .filter_map(|s| {
                let pattern = format!(
                    r"(?:^|[^a-z0-9+#.]){}(?:$|[^a-z0-9+#])",
                    regex::escape(s)
                );
                Regex::new(&pattern).ok().map(|re| (s.to_string(), re))
            })
            .collect();

        Self {
            aliases,
            substring_candidates,
            related,
            categories,
            vocabulary,
        }
    }

    pub fn alias(&self, cleaned: &str) -> Option<&str> {
        self.aliases.get(cleaned).map(String::as_str)
    }

    /// Longest canonical name contained in `cleaned`, if any.
    pub fn longest_canonical_in(&self, cleaned: &str) -> Option<&str> {
        self.substring_candidates
            .iter()
            .find(|c| cleaned.contains(c.as_str()))
            .map(String::as_str)
    }

    pub fn related(&self, canonical: &str) -> Option<&BTreeSet<String>> {
        self.related.get(canonical)
    }

    pub fn category(&self, canonical: &str) -> SkillCategory {
        self.categories
            .get(canonical)
            .copied()
            .unwrap_or(SkillCategory::Other)
    }

    /// Known-skill vocabulary entries that occur in `text` as whole terms.
    pub fn scan(&self, text: &str) -> Vec<&str> {
        let lower = text.to_lowercase();
        self.vocabulary
            .iter()
            .filter(|(_, re)| re.is_match(&lower))
            .map(|(s, _)| s.as_str())
            .collect()
    }

    pub fn is_known_skill(&self, lowered: &str) -> bool {
        KNOWN_SKILLS.contains(&lowered)
    }

    pub fn contains_known_skill(&self, lowered: &str) -> bool {
        KNOWN_SKILLS.iter().any(|k| lowered.contains(k))
    }
}

impl Default for SkillOntology {
    fn default() -> Self {
        Self::standard()
    }
}
