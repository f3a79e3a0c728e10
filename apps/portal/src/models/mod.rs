//! Records exchanged with the evaluation backend.
//!
//! The backend schema drifts between deployments, so every record is read
//! leniently: missing fields default, unknown fields are kept in `extra` and
//! shown as-is.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod evaluation;
pub mod job;
pub mod resume;
pub mod user;

pub use evaluation::{Evaluation, EvaluationFilters};
pub use job::{JobDescription, JobUpdate, NewJob, NewJobDescription};
pub use resume::{NewResume, Resume};
pub use user::{AdminUser, NewAccount, TokenResponse};

/// Identifier of a backend record (job, resume, evaluation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{id}"),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}
