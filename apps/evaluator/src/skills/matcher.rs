//! Skill canonicalization, relatedness and skill-set overlap.
//!
//! Every comparison happens between canonical names. Raw strings from job
//! text or candidate rows go through `normalize` first.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::outcome::SkillMatch;
use crate::skills::ontology::{clean_skill_text, SkillCategory, SkillOntology};

/// Confidence attached to a canonical-equal match.
pub const EXACT_MATCH_CONFIDENCE: f64 = 1.0;
/// Confidence attached to a match accepted only by the fuzzy rules.
pub const FUZZY_MATCH_CONFIDENCE: f64 = 0.8;

/// Names this short only match a whole word in fuzzy mode.
const SHORT_SKILL_LEN: usize = 2;

/// Abbreviation pairs treated as equivalent in fuzzy mode.
const ABBREVIATION_PAIRS: &[(&str, &str)] = &[
    ("javascript", "js"),
    ("machine learning", "ml"),
    ("artificial intelligence", "ai"),
    ("database", "db"),
];

/// Fragments mentioning these are requirement prose, not skills.
const NON_SKILL_WORDS: &[&str] = &[
    "experience",
    "education",
    "degree",
    "years",
    "bachelor",
    "master",
    "phd",
];

/// How strictly a required skill must match a candidate skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Canonical equality only.
    Exact,
    /// Canonical equality, substring containment, or a known abbreviation pair.
    Fuzzy,
}

/// Skills that carry over to a new role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferableSkills {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
    /// transferable ÷ total candidate skills, 0 when the candidate lists none
    pub score: f64,
}

/// Where a candidate stands against a job's skill lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGapAnalysis {
    pub missing_required: Vec<String>,
    pub missing_nice_to_have: Vec<String>,
    /// Candidate skills related to a missing requirement.
    pub related_skills: Vec<String>,
    /// Required skills held, as a percentage. 100 when nothing is required.
    pub match_percentage: f64,
    pub recommendations: Vec<String>,
}

/// Skills to pick up for a target role, in suggested order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    /// Missing languages and frameworks.
    pub must_learn: Vec<String>,
    pub recommended: Vec<String>,
    pub already_have: Vec<String>,
    /// Current skills outside the target that still carry over.
    pub transferable: Vec<String>,
    /// Languages, then frameworks, then everything else.
    pub learning_order: Vec<String>,
}

const MAX_RECOMMENDED: usize = 3;

#[derive(Debug, Clone)]
pub struct SkillMatcher {
    ontology: Arc<SkillOntology>,
}

impl SkillMatcher {
    pub fn new(ontology: Arc<SkillOntology>) -> Self {
        Self { ontology }
    }

    /// Matcher over the built-in ontology.
    pub fn standard() -> Self {
        Self::new(Arc::new(SkillOntology::standard()))
    }

    pub fn ontology(&self) -> &SkillOntology {
        &self.ontology
    }

    /// Canonical form of a skill string. Idempotent.
    pub fn normalize(&self, text: &str) -> String {
        let cleaned = clean_skill_text(text);
        if cleaned.is_empty() {
            return cleaned;
        }

        let canonical = match self.ontology.alias(&cleaned) {
            Some(alias) => alias.to_string(),
            None => match self.ontology.longest_canonical_in(&cleaned) {
                Some(known) => self.ontology.alias(known).unwrap_or(known).to_string(),
                None => cleaned,
            },
        };

        collapse_sql(canonical)
    }

    /// Normalizes every entry, dropping ones that clean down to nothing.
    pub fn canonical_set<'a, I>(&self, skills: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        skills
            .into_iter()
            .map(|s| self.normalize(s))
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Canonical skills listed in a free-text candidate skills cell.
    pub fn candidate_skills(&self, text: &str) -> BTreeSet<String> {
        let parsed = self.parse_skill_list(text);
        self.canonical_set(parsed.iter().map(String::as_str))
    }

    /// Skills adjacent to `skill` in either direction, never including itself.
    pub fn related_skills(&self, skill: &str) -> BTreeSet<String> {
        let canonical = self.normalize(skill);
        let mut related = self
            .ontology
            .related(&canonical)
            .cloned()
            .unwrap_or_default();
        related.remove(&canonical);
        related
    }

    /// Overlap between two canonical skill sets, with half credit for a
    /// missing requirement the candidate covers through a related skill.
    pub fn skill_similarity(
        &self,
        required: &BTreeSet<String>,
        candidate: &BTreeSet<String>,
    ) -> f64 {
        if required.is_empty() || candidate.is_empty() {
            return 0.0;
        }

        let direct = required.intersection(candidate).count() as f64;
        let related = required
            .iter()
            .filter(|r| !candidate.contains(*r))
            .filter(|r| {
                self.ontology
                    .related(r)
                    .map(|rel| rel.iter().any(|s| candidate.contains(s)))
                    .unwrap_or(false)
            })
            .count() as f64;

        ((direct + 0.5 * related) / required.len() as f64).min(1.0)
    }

    /// Required skills satisfied by the candidate's skills text. `required`
    /// keeps its original casing in the result.
    pub fn match_skills(
        &self,
        required: &[String],
        candidate_text: &str,
        mode: MatchMode,
    ) -> Vec<SkillMatch> {
        let candidate = self.candidate_skills(candidate_text);
        if candidate.is_empty() {
            return vec![];
        }

        let mut matches = Vec::new();
        for skill in required {
            let wanted = self.normalize(skill);
            if wanted.is_empty() {
                continue;
            }

            if candidate.contains(&wanted) {
                matches.push(SkillMatch {
                    required: skill.clone(),
                    found: wanted,
                    confidence: EXACT_MATCH_CONFIDENCE,
                });
                continue;
            }

            if mode == MatchMode::Fuzzy {
                if let Some(found) = candidate.iter().find(|c| is_fuzzy_match(&wanted, c)) {
                    matches.push(SkillMatch {
                        required: skill.clone(),
                        found: found.clone(),
                        confidence: FUZZY_MATCH_CONFIDENCE,
                    });
                }
            }
        }
        matches
    }

    /// Required skills with no fuzzy match in the candidate's skills text.
    pub fn skill_gaps(&self, required: &[String], candidate_text: &str) -> Vec<String> {
        let matched: BTreeSet<String> = self
            .match_skills(required, candidate_text, MatchMode::Fuzzy)
            .into_iter()
            .map(|m| self.normalize(&m.required))
            .collect();

        required
            .iter()
            .filter(|s| !matched.contains(&self.normalize(s)))
            .cloned()
            .collect()
    }

    /// Splits a free-text skills block into individual skill fragments.
    pub fn parse_skill_list(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return vec![];
        }

        list_separator()
            .split(text)
            .filter_map(|fragment| {
                let trimmed = leading_marker().replace(fragment, "");
                let cleaned = stray_chars()
                    .replace_all(trimmed.trim(), "")
                    .trim()
                    .to_string();
                if cleaned.chars().count() <= 1 {
                    return None;
                }

                let lowered = cleaned.to_lowercase();
                if NON_SKILL_WORDS.iter().any(|w| lowered.contains(w)) {
                    return None;
                }

                let looks_like_skill = self.ontology.is_known_skill(&lowered)
                    || self.ontology.contains_known_skill(&lowered)
                    || cleaned.split_whitespace().count() <= 3;
                looks_like_skill.then_some(cleaned)
            })
            .collect()
    }

    /// Canonical skills from the known vocabulary that occur anywhere in `text`.
    pub fn scan_vocabulary(&self, text: &str) -> BTreeSet<String> {
        self.canonical_set(self.ontology.scan(text))
    }

    pub fn category(&self, skill: &str) -> SkillCategory {
        self.ontology.category(&self.normalize(skill))
    }

    pub fn transferable_skills<'a, I>(&self, candidate_skills: I) -> TransferableSkills
    where
        I: IntoIterator<Item = &'a str>,
    {
        let normalized: Vec<String> = candidate_skills
            .into_iter()
            .map(|s| self.normalize(s))
            .filter(|s| !s.is_empty())
            .collect();

        let mut result = TransferableSkills::default();
        for skill in &normalized {
            let category = self.ontology.category(skill);
            if category == SkillCategory::SoftSkills {
                result.soft.push(skill.clone());
            } else if category.is_transferable() {
                result.technical.push(skill.clone());
            }
        }

        if !normalized.is_empty() {
            result.score =
                (result.technical.len() + result.soft.len()) as f64 / normalized.len() as f64;
        }
        result
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gap analysis
// ────────────────────────────────────────────────────────────────────────────

impl SkillMatcher {
    /// Canonical skills grouped by family, each group sorted.
    pub fn group_by_category<'a, I>(&self, skills: I) -> BTreeMap<SkillCategory, Vec<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut groups: BTreeMap<SkillCategory, Vec<String>> = BTreeMap::new();
        for skill in self.canonical_set(skills) {
            groups
                .entry(self.ontology.category(&skill))
                .or_default()
                .push(skill);
        }
        groups
    }

    pub fn analyze_skill_gaps(
        &self,
        required: &[String],
        nice_to_have: &[String],
        candidate: &[String],
    ) -> SkillGapAnalysis {
        let required = self.canonical_set(required.iter().map(String::as_str));
        let nice = self.canonical_set(nice_to_have.iter().map(String::as_str));
        let held = self.canonical_set(candidate.iter().map(String::as_str));

        let missing_required: Vec<String> = required.difference(&held).cloned().collect();
        let missing_nice_to_have: Vec<String> = nice.difference(&held).cloned().collect();

        let related: BTreeSet<String> = missing_required
            .iter()
            .flat_map(|skill| self.related_skills(skill))
            .filter(|skill| held.contains(skill))
            .collect();
        let related_skills: Vec<String> = related.into_iter().collect();

        let match_percentage = if required.is_empty() {
            100.0
        } else {
            required.intersection(&held).count() as f64 / required.len() as f64 * 100.0
        };

        let mut recommendations = Vec::new();
        if !missing_required.is_empty() {
            recommendations.push(format!("Focus on learning: {}", first_few(&missing_required)));
        }
        if !related_skills.is_empty() {
            recommendations.push(format!(
                "Leverage your experience with: {}",
                first_few(&related_skills)
            ));
        }

        SkillGapAnalysis {
            missing_required,
            missing_nice_to_have,
            related_skills,
            match_percentage,
            recommendations,
        }
    }

    pub fn suggest_learning_path(&self, current: &[String], target: &[String]) -> LearningPath {
        let current = self.canonical_set(current.iter().map(String::as_str));
        let target = self.canonical_set(target.iter().map(String::as_str));

        let mut path = LearningPath {
            already_have: current.intersection(&target).cloned().collect(),
            ..LearningPath::default()
        };

        let mut languages = Vec::new();
        let mut frameworks = Vec::new();
        for skill in target.difference(&current) {
            match self.ontology.category(skill) {
                SkillCategory::ProgrammingLanguage => languages.push(skill.clone()),
                SkillCategory::Framework => frameworks.push(skill.clone()),
                _ => path.recommended.push(skill.clone()),
            }
        }

        path.transferable = current
            .difference(&target)
            .filter(|skill| {
                matches!(
                    self.ontology.category(skill),
                    SkillCategory::Database | SkillCategory::VersionControl | SkillCategory::SoftSkills
                )
            })
            .cloned()
            .collect();

        path.must_learn = languages.iter().chain(&frameworks).cloned().collect();
        path.learning_order = path
            .must_learn
            .iter()
            .chain(&path.recommended)
            .cloned()
            .collect();
        path
    }
}

fn first_few(skills: &[String]) -> String {
    skills
        .iter()
        .take(MAX_RECOMMENDED)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Default for SkillMatcher {
    fn default() -> Self {
        Self::standard()
    }
}

static LIST_SEPARATOR: OnceLock<Regex> = OnceLock::new();
static LEADING_MARKER: OnceLock<Regex> = OnceLock::new();
static STRAY_CHARS: OnceLock<Regex> = OnceLock::new();

fn list_separator() -> &'static Regex {
    LIST_SEPARATOR.get_or_init(|| Regex::new(r"[,;•*|\n]").expect("valid regex"))
}

/// Bullets and list numbering at the start of a fragment.
fn leading_marker() -> &'static Regex {
    LEADING_MARKER.get_or_init(|| Regex::new(r"^[\d.)\s\-•*]+").expect("valid regex"))
}

fn stray_chars() -> &'static Regex {
    STRAY_CHARS.get_or_init(|| Regex::new(r"[^\w\s\-+.#]").expect("valid regex"))
}

/// `mysql`, `postgresql` and `mongodb` stay distinct; any other SQL flavour is `sql`.
fn collapse_sql(skill: String) -> String {
    match skill.as_str() {
        "mysql" | "postgresql" | "mongodb" => skill,
        s if s.contains("sql") => "sql".to_string(),
        _ => skill,
    }
}

fn is_fuzzy_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let contained = if short.chars().count() <= SHORT_SKILL_LEN {
        // "r" must not match "react"
        long.split(|c: char| c.is_whitespace() || c == '-' || c == '/')
            .any(|word| word == short)
    } else {
        long.contains(short)
    };
    if contained {
        return true;
    }
    ABBREVIATION_PAIRS
        .iter()
        .any(|(long, short)| (a == *long || a == *short) && (b == *long || b == *short))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn matcher() -> SkillMatcher {
        SkillMatcher::standard()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_aliases() {
        let m = matcher();
        assert_eq!(m.normalize("JS"), "javascript");
        assert_eq!(m.normalize("React.js"), "react");
        assert_eq!(m.normalize("  K8s "), "kubernetes");
        assert_eq!(m.normalize("Postgres"), "postgresql");
        assert_eq!(m.normalize("sklearn"), "scikit-learn");
    }

    #[test]
    fn test_normalize_substring_prefers_longest() {
        let m = matcher();
        assert_eq!(m.normalize("Advanced JavaScript (ES2020)"), "javascript");
        assert_eq!(m.normalize("Spring Boot services"), "spring boot");
    }

    #[test]
    fn test_normalize_sql_collapse_keeps_named_engines() {
        let m = matcher();
        assert_eq!(m.normalize("MySQL"), "mysql");
        assert_eq!(m.normalize("PostgreSQL 14"), "postgresql");
        assert_eq!(m.normalize("MongoDB"), "mongodb");
        assert_eq!(m.normalize("T-SQL"), "sql");
        assert_eq!(m.normalize("NoSQL"), "sql");
        assert_eq!(m.normalize("SQL Server"), "sql");
    }

    #[test]
    fn test_normalize_unknown_passes_through_cleaned() {
        let m = matcher();
        assert_eq!(m.normalize("Underwater   Basket-Weaving!"), "underwater basketweaving");
        assert_eq!(m.normalize("!!!"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let m = matcher();
        let samples = [
            "JS",
            "Node.js",
            "node js",
            "C++",
            "C#",
            "Machine Learning (ML)",
            "scikit learn",
            "Google Cloud",
            "AWS Lambda",
            "ci/cd pipelines",
            "Microsoft SQL Server",
            "React Native apps",
            "  Python   3.11 ",
            "Tableau dashboards",
            "R",
            "Go",
        ];
        for s in samples {
            let once = m.normalize(s);
            assert_eq!(m.normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_related_skills_union_of_both_directions() {
        let m = matcher();
        let related = m.related_skills("Django");
        assert!(related.contains("python"));
        assert!(related.contains("postgresql"));
        assert!(related.contains("celery"));
        assert!(!related.contains("django"));

        // reverse edge only: pandas appears only as a neighbour
        let pandas = m.related_skills("pandas");
        assert!(pandas.contains("python"));
        assert!(pandas.contains("machine learning"));

        assert!(m.related_skills("cobol").is_empty());
    }

    #[test]
    fn test_skill_similarity_direct_and_related() {
        let m = matcher();
        let required = set(&["python", "docker", "react"]);
        let candidate = set(&["python", "kubernetes"]);
        // python direct, docker via kubernetes (0.5), react nothing
        let sim = m.skill_similarity(&required, &candidate);
        assert!((sim - 1.5 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_skill_similarity_empty_sets_are_zero() {
        let m = matcher();
        assert_eq!(m.skill_similarity(&set(&[]), &set(&["python"])), 0.0);
        assert_eq!(m.skill_similarity(&set(&["python"]), &set(&[])), 0.0);
    }

    #[test]
    fn test_exact_match_keeps_original_casing() {
        let m = matcher();
        let required = vec!["Python".to_string(), "MySQL".to_string(), "HTML".to_string()];
        let matches = m.match_skills(&required, "Python, MySQL, JavaScript", MatchMode::Exact);
        let names: Vec<&str> = matches.iter().map(|s| s.required.as_str()).collect();
        assert_eq!(names, vec!["Python", "MySQL"]);
        assert!(matches.iter().all(|s| s.confidence == EXACT_MATCH_CONFIDENCE));
    }

    #[test]
    fn test_fuzzy_match_accepts_containment() {
        let m = matcher();
        let required = vec!["Data Visualization".to_string()];
        let text = "Visualization, Excel";
        assert!(m.match_skills(&required, text, MatchMode::Exact).is_empty());

        let fuzzy = m.match_skills(&required, text, MatchMode::Fuzzy);
        assert_eq!(fuzzy.len(), 1);
        assert_eq!(fuzzy[0].found, "visualization");
        assert_eq!(fuzzy[0].confidence, FUZZY_MATCH_CONFIDENCE);
    }

    #[test]
    fn test_short_names_need_a_whole_word() {
        let m = matcher();
        let required = vec!["Go".to_string(), "R".to_string()];
        assert!(m.match_skills(&required, "Django, React", MatchMode::Fuzzy).is_empty());

        assert!(is_fuzzy_match("r", "r programming"));
        assert!(!is_fuzzy_match("go", "mongodb"));
        assert!(is_fuzzy_match("sql", "nosql"));
    }

    #[test]
    fn test_abbreviation_pairs() {
        assert!(is_fuzzy_match("machine learning", "ml"));
        assert!(is_fuzzy_match("db", "database"));
        assert!(!is_fuzzy_match("ml", "ai"));
        assert!(!is_fuzzy_match("", "python"));
    }

    #[test]
    fn test_skill_gaps_uses_fuzzy_matching() {
        let m = matcher();
        let required = vec!["Python".to_string(), "Docker".to_string(), "Go".to_string()];
        let gaps = m.skill_gaps(&required, "python 3, golang");
        assert_eq!(gaps, vec!["Docker".to_string()]);
    }

    #[test]
    fn test_empty_candidate_text_matches_nothing() {
        let m = matcher();
        let required = vec!["Python".to_string()];
        assert!(m.match_skills(&required, "", MatchMode::Fuzzy).is_empty());
        assert_eq!(m.skill_gaps(&required, ""), vec!["Python".to_string()]);
    }

    #[test]
    fn test_parse_skill_list_filters_prose() {
        let m = matcher();
        let parsed = m.parse_skill_list(
            "1. Python\n2) Django; REST APIs\n• 5 years of experience\n* Bachelor degree | Docker",
        );
        assert_eq!(parsed, vec!["Python", "Django", "REST APIs", "Docker"]);
    }

    #[test]
    fn test_parse_skill_list_handles_list_literals() {
        let m = matcher();
        let parsed = m.parse_skill_list("['Python', 'Machine Learning', 'SQL']");
        assert_eq!(parsed, vec!["Python", "Machine Learning", "SQL"]);
    }

    #[test]
    fn test_scan_vocabulary_canonicalizes_hits() {
        let m = matcher();
        let hits = m.scan_vocabulary("Experience with AWS, Node.js and NoSQL stores.");
        assert!(hits.contains("amazon web services"));
        assert!(hits.contains("nodejs"));
        assert!(hits.contains("sql"));
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_analyze_skill_gaps() {
        let m = matcher();
        let analysis = m.analyze_skill_gaps(
            &strings(&["Python", "Django", "Docker", "AWS"]),
            &strings(&["GraphQL", "Git"]),
            &strings(&["python", "Flask", "Kubernetes", "git"]),
        );

        assert_eq!(
            analysis.missing_required,
            strings(&["amazon web services", "django", "docker"])
        );
        assert_eq!(analysis.missing_nice_to_have, strings(&["graphql"]));
        assert!((analysis.match_percentage - 25.0).abs() < 1e-9);
        assert!(analysis.related_skills.contains(&"python".to_string()));
        assert!(analysis.related_skills.contains(&"kubernetes".to_string()));
        assert_eq!(analysis.recommendations.len(), 2);
        assert_eq!(
            analysis.recommendations[0],
            "Focus on learning: amazon web services, django, docker"
        );
    }

    #[test]
    fn test_gap_analysis_without_requirements_is_full_match() {
        let analysis = matcher().analyze_skill_gaps(&[], &[], &strings(&["rust"]));
        assert_eq!(analysis.match_percentage, 100.0);
        assert!(analysis.missing_required.is_empty());
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn test_learning_path_orders_languages_before_frameworks() {
        let m = matcher();
        let path = m.suggest_learning_path(
            &strings(&["Python", "MySQL", "Git", "Excel"]),
            &strings(&["Python", "React", "TypeScript", "Docker"]),
        );

        assert_eq!(path.already_have, strings(&["python"]));
        assert_eq!(path.must_learn, strings(&["typescript", "react"]));
        assert_eq!(path.recommended, strings(&["docker"]));
        assert_eq!(path.learning_order, strings(&["typescript", "react", "docker"]));
        assert_eq!(path.transferable, strings(&["git", "mysql"]));
    }

    #[test]
    fn test_group_by_category() {
        let groups = matcher().group_by_category(["Django", "Python", "Postgres", "Flask", "Basket weaving"]);
        assert_eq!(groups[&SkillCategory::ProgrammingLanguage], strings(&["python"]));
        assert_eq!(groups[&SkillCategory::Framework], strings(&["django", "flask"]));
        assert_eq!(groups[&SkillCategory::Database], strings(&["postgresql"]));
        assert_eq!(groups[&SkillCategory::Other], strings(&["basket weaving"]));
    }

    #[test]
    fn test_transferable_skills_score() {
        let m = matcher();
        let t = m.transferable_skills(["Git", "Leadership", "Python", "Docker"]);
        assert_eq!(t.technical, vec!["git".to_string(), "docker".to_string()]);
        assert_eq!(t.soft, vec!["leadership".to_string()]);
        assert!((t.score - 0.75).abs() < 1e-9);

        assert_eq!(m.transferable_skills(Vec::<&str>::new()).score, 0.0);
    }
}
