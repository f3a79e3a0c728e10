use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::RecordId;

/// Suitability label computed by the backend. Labels this portal doesn't know
/// are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Verdict {
    High,
    Medium,
    Low,
    Other(String),
}

impl From<String> for Verdict {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "high" => Verdict::High,
            "medium" => Verdict::Medium,
            "low" => Verdict::Low,
            _ => Verdict::Other(raw),
        }
    }
}

impl From<Verdict> for String {
    fn from(verdict: Verdict) -> Self {
        verdict.to_string()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::High => f.write_str("High"),
            Verdict::Medium => f.write_str("Medium"),
            Verdict::Low => f.write_str("Low"),
            Verdict::Other(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub user_id: Option<RecordId>,
    #[serde(default)]
    pub resume_id: Option<RecordId>,
    #[serde(default)]
    pub job_id: Option<RecordId>,
    #[serde(default, alias = "score")]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub hard_match_score: Option<f64>,
    #[serde(default)]
    pub semantic_match_score: Option<f64>,
    #[serde(default)]
    pub verdict: Option<Verdict>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Evaluation {
    pub fn summary(&self) -> String {
        let id = self
            .id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "?".to_string());
        let summary = match (self.relevance_score, &self.verdict) {
            (Some(score), Some(verdict)) => {
                format!("Evaluation #{id} - Score: {score:.1}% - {verdict}")
            }
            (Some(score), None) => format!("Evaluation #{id} - Score: {score:.1}%"),
            _ => format!("Evaluation #{id}"),
        };
        match self.created_date() {
            Some(date) => format!("{summary} ({date})"),
            None => summary,
        }
    }

    /// Date part of `created_at` (`YYYY-MM-DD`), when present.
    pub fn created_date(&self) -> Option<&str> {
        self.created_at.as_deref().map(|ts| ts.get(..10).unwrap_or(ts))
    }
}

/// Candidate filters on the placement dashboard. Bounds at their extremes and
/// the "All" verdict are not sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EvaluationFilters {
    #[serde(default)]
    pub min_score: Option<u8>,
    #[serde(default)]
    pub max_score: Option<u8>,
    #[serde(default)]
    pub verdict: Option<String>,
}

impl EvaluationFilters {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(min) = self.min_score.filter(|&min| min > 0) {
            query.push(("min_score".to_string(), min.to_string()));
        }
        if let Some(max) = self.max_score.filter(|&max| max < 100) {
            query.push(("max_score".to_string(), max.to_string()));
        }
        if let Some(verdict) = self
            .verdict
            .as_deref()
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        {
            query.push(("verdict".to_string(), verdict.to_string()));
        }
        query
    }
}
