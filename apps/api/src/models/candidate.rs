use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Structured candidate profile, as produced by the upstream resume parser.
/// The engine only reads it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateProfile {
    pub current_title: Option<String>,
    /// Malformed values (text, negatives, null) are coerced to 0.
    #[serde(deserialize_with = "lenient_years")]
    pub years_of_experience: u32,
    /// Declared skills in priority order.
    #[serde(deserialize_with = "null_as_empty")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub preferred_locations: Vec<String>,
    /// Most recent first.
    #[serde(deserialize_with = "null_as_empty")]
    pub work_history: Vec<WorkEntry>,
    #[serde(deserialize_with = "null_as_empty")]
    pub projects: Vec<ProjectEntry>,
    #[serde(deserialize_with = "null_as_empty")]
    pub education: Vec<EducationEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkEntry {
    pub company: Option<String>,
    pub role: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ProjectEntry {
    /// `name`, then `title`, if either is present.
    pub fn label(&self) -> Option<&str> {
        self.name.as_deref().or(self.title.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub degree: Option<String>,
    pub institution: Option<String>,
    #[serde(deserialize_with = "lenient_year")]
    pub graduation_year: Option<u32>,
}

fn lenient_years<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_non_negative).unwrap_or(0))
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_non_negative))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts numbers and numeric strings; fractions truncate toward zero.
fn coerce_non_negative(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() || number < 0.0 {
        return None;
    }
    Some(number.min(u32::MAX as f64) as u32)
}
