use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobDescription {
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "description_text")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub must_have_skills: Vec<String>,
    #[serde(default)]
    pub good_to_have_skills: Vec<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobDescription {
    /// `"Title @ Company (ID: n)"`, the label used in selectors and panels.
    pub fn label(&self) -> String {
        if self.company.is_empty() {
            format!("{} (ID: {})", self.title, self.id)
        } else {
            format!("{} @ {} (ID: {})", self.title, self.company, self.id)
        }
    }

    /// Jobs without an explicit flag are not counted as active.
    pub fn is_active(&self) -> bool {
        self.is_active.unwrap_or(false)
    }
}

/// Body of `POST /jobs/jobs/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub must_have_skills: Vec<String>,
    #[serde(default)]
    pub good_to_have_skills: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Body of `PUT /jobs/jobs/{id}`; only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JobUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl JobUpdate {
    pub fn is_empty(&self) -> bool {
        *self == JobUpdate::default()
    }
}

/// Body of `POST /admin/job-descriptions` on the placement dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewJobDescription {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    pub description_text: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
}

/// Splits a comma-separated skills field, dropping blanks.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
