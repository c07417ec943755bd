use serde::{Deserialize, Deserializer, Serialize};

/// One candidate row. Read-only input to scoring.
///
/// Blank or missing cells deserialize to `None`; nothing here is an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(deserialize_with = "id_or_unknown", default = "unknown_id")]
    pub id: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub skills: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub education: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub companies: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub predicted_position: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub actual_category: Option<String>,
}

impl CandidateProfile {
    pub fn skills_text(&self) -> &str {
        self.skills.as_deref().unwrap_or("")
    }

    pub fn experience_text(&self) -> &str {
        self.experience.as_deref().unwrap_or("")
    }

    pub fn predicted_label(&self) -> &str {
        self.predicted_position.as_deref().unwrap_or("")
    }

    pub fn actual_label(&self) -> &str {
        self.actual_category.as_deref().unwrap_or("")
    }

    /// Renders the row as plain resume text for collaborators that take prose.
    pub fn as_resume_text(&self) -> String {
        let mut parts = vec![format!("Candidate ID: {}", self.id)];
        let fields = [
            ("Skills", &self.skills),
            ("Experience", &self.experience),
            ("Education", &self.education),
            ("Companies", &self.companies),
            ("Target Role", &self.predicted_position),
        ];
        for (label, value) in fields {
            if let Some(v) = value {
                parts.push(format!("{label}: {v}"));
            }
        }
        parts.join("\n")
    }
}

fn unknown_id() -> String {
    "unknown".to_string()
}

fn id_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(blank_as_none(deserializer)?.unwrap_or_else(unknown_id))
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("nan")))
}
