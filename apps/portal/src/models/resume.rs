use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resume {
    pub id: RecordId,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub skills: Vec<Value>,
    #[serde(default)]
    pub education: Vec<Value>,
    #[serde(default)]
    pub experience: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resume {
    pub fn label(&self) -> String {
        format!(
            "{} ({}) - ID {}",
            self.student_name.as_deref().unwrap_or("Unnamed"),
            self.email.as_deref().unwrap_or("no email"),
            self.id
        )
    }
}

/// Body of `POST /resumes/resumes/`. Parsing fills skills/education/experience
/// later on the backend, so they start empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewResume {
    pub student_name: String,
    pub email: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub skills: Vec<Value>,
    #[serde(default)]
    pub education: Vec<Value>,
    #[serde(default)]
    pub experience: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resume_label_with_missing_fields() {
        let resume: Resume = serde_json::from_value(json!({"id": "r-9"})).unwrap();
        assert_eq!(resume.label(), "Unnamed (no email) - ID r-9");
    }

    #[test]
    fn test_new_resume_defaults_lists() {
        let resume: NewResume =
            serde_json::from_value(json!({"student_name": "Asha", "email": "asha@x.com"})).unwrap();
        assert!(resume.skills.is_empty());
        assert_eq!(resume.file_path, "");
    }
}
