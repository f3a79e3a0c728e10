//! Form submissions: validate input, call the backend, mutate the session.
//!
//! Each flow runs under the caller's action ticket (carried by `Backend`), so
//! a superseded submission can't leave a trace in the session.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::gateway::ApiError;
use crate::normalize::envelope_message;
use crate::session::{AuthState, Role, Session, SessionError};

pub mod auth;
pub mod dashboard;

#[derive(Debug, Error, PartialEq)]
pub enum FlowError {
    /// Input rejected before anything was sent.
    #[error("{0}")]
    Validation(String),

    /// The backend answered, but said no.
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Please login first")]
    LoginRequired,

    #[error("Placement team access required")]
    Forbidden,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// What a successful submission reports back: a message for the user, where
/// to go next (if anywhere), and the backend's answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing_page: Option<&'static str>,
    pub data: Value,
}

impl ActionOutcome {
    pub fn new(message: impl Into<String>, data: Value) -> Self {
        Self {
            message: message.into(),
            landing_page: None,
            data,
        }
    }

    pub fn landing(mut self, page: &'static str) -> Self {
        self.landing_page = Some(page);
        self
    }
}

pub(crate) fn require_login(session: &Session) -> Result<(), FlowError> {
    if session.is_authenticated() {
        Ok(())
    } else {
        Err(FlowError::LoginRequired)
    }
}

pub(crate) fn require_admin(session: &Session) -> Result<(), FlowError> {
    match session.auth_state() {
        AuthState::Authenticated(Role::Admin) => Ok(()),
        AuthState::Authenticated(_) => Err(FlowError::Forbidden),
        AuthState::Guest => Err(FlowError::LoginRequired),
    }
}

/// Some endpoints report failure as `200 {"status": "error", ...}`.
pub(crate) fn accepted(payload: Value) -> Result<Value, FlowError> {
    let failed = matches!(payload.get("status"), Some(status) if status.as_str() != Some("success"));
    if !failed {
        return Ok(payload);
    }
    let message = envelope_message(&payload).unwrap_or("The backend reported an error");
    Err(FlowError::Rejected(message.to_string()))
}

/// Maps a backend refusal (4xx) to `Rejected(message)`; transport failures and
/// session failures pass through untouched.
pub(crate) fn refused(error: ApiError, message: &str) -> FlowError {
    match error {
        ApiError::Api { status, .. } if (400..500).contains(&status) => {
            FlowError::Rejected(message.to_string())
        }
        other => FlowError::Api(other),
    }
}

fn record_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("record id pattern compiles"))
}

/// Checks an id taken from a request path before it becomes part of a
/// backend path. Separators, dots and encoded characters are refused.
pub(crate) fn record_id<'a>(raw: &'a str, kind: &str) -> Result<&'a str, FlowError> {
    if record_id_pattern().is_match(raw) {
        Ok(raw)
    } else {
        Err(FlowError::Validation(format!("Invalid {kind} id")))
    }
}

pub(crate) fn required(value: &str, message: &str) -> Result<(), FlowError> {
    if value.trim().is_empty() {
        Err(FlowError::Validation(message.to_string()))
    } else {
        Ok(())
    }
}
