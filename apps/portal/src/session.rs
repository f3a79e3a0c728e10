//! Per-browser session state.
//!
//! A `SessionStore` owns one `Session` plus the bookkeeping that decides which
//! backend responses may still touch it. Every user action takes an
//! [`ActionTicket`]; a newer action or a 401 makes older tickets stale, and
//! stale results are discarded instead of applied.

use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::pages::{self, DEFAULT_PAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Guest,
    Student,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend user ids are integers on most deployments, strings on some.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Int(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Int(id) => write!(f, "{id}"),
            UserId::Text(id) => f.write_str(id),
        }
    }
}

/// Authentication state machine: `Guest --login--> Authenticated(role)`,
/// `Authenticated --logout | 401--> Guest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Guest,
    Authenticated(Role),
}

/// Snapshot of a session. Fields are private so the only way to reach a
/// non-guest role is through [`SessionStore::login`], which always sets a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    #[serde(skip_serializing)]
    token: Option<String>,
    user_id: Option<UserId>,
    email: Option<String>,
    role: Role,
    current_page: String,
}

impl Session {
    fn guest() -> Self {
        Self {
            token: None,
            user_id: None,
            email: None,
            role: Role::Guest,
            current_page: DEFAULT_PAGE.to_string(),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn current_page(&self) -> &str {
        &self.current_page
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn auth_state(&self) -> AuthState {
        match self.role {
            Role::Guest => AuthState::Guest,
            role => AuthState::Authenticated(role),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::guest()
    }
}

/// Identifies one user action. Only the most recently issued ticket of the
/// current epoch is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTicket {
    seq: u64,
    epoch: u64,
}

impl ActionTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unknown page: {0}")]
    UnknownPage(String),

    #[error("Cannot log in with the guest role")]
    InvalidRole,

    #[error("Cannot log in with an empty token")]
    EmptyToken,

    #[error("Superseded by a newer action")]
    Stale,
}

#[derive(Debug)]
struct Inner {
    session: Session,
    latest_seq: u64,
    epoch: u64,
    last_active: DateTime<Utc>,
}

impl Inner {
    fn is_current(&self, ticket: ActionTicket) -> bool {
        ticket.seq == self.latest_seq && ticket.epoch == self.epoch
    }

    fn apply_login(&mut self, token: String, user_id: UserId, email: Option<String>, role: Role) {
        self.session.token = Some(token);
        self.session.user_id = Some(user_id);
        self.session.email = email;
        self.session.role = role;
    }

    fn reset(&mut self) {
        self.session = Session::guest();
    }
}

/// Owner of one browser session. All mutation happens under a single write
/// lock, so readers always see a whole session.
#[derive(Debug)]
pub struct SessionStore {
    inner: RwLock<Inner>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                session: Session::guest(),
                latest_seq: 0,
                epoch: 0,
                last_active: Utc::now(),
            }),
        }
    }

    pub fn get(&self) -> Session {
        self.inner.read().session.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.read().session.token.clone()
    }

    pub fn login(&self, token: String, user_id: UserId, role: Role) -> Result<(), SessionError> {
        self.login_with_email(token, user_id, None, role)
    }

    pub fn login_with_email(
        &self,
        token: String,
        user_id: UserId,
        email: Option<String>,
        role: Role,
    ) -> Result<(), SessionError> {
        validate_login(&token, role)?;
        let mut inner = self.inner.write();
        inner.apply_login(token, user_id, email, role);
        inner.last_active = Utc::now();
        info!("Session logged in as {role}");
        Ok(())
    }

    /// Applies a login only if `ticket` is still the live action; the check and
    /// the update share one write lock.
    pub fn login_if_current(
        &self,
        ticket: ActionTicket,
        token: String,
        user_id: UserId,
        email: Option<String>,
        role: Role,
    ) -> Result<(), SessionError> {
        validate_login(&token, role)?;
        let mut inner = self.inner.write();
        if !inner.is_current(ticket) {
            warn!("Discarding login result from superseded action #{}", ticket.seq);
            return Err(SessionError::Stale);
        }
        inner.apply_login(token, user_id, email, role);
        inner.last_active = Utc::now();
        info!("Session logged in as {role}");
        Ok(())
    }

    pub fn logout(&self) {
        let mut inner = self.inner.write();
        inner.reset();
        inner.last_active = Utc::now();
        info!("Session logged out");
    }

    /// Forced logout (rejected token or idle timeout). Bumps the epoch so
    /// every in-flight action is discarded.
    pub fn expire(&self) {
        let mut inner = self.inner.write();
        inner.reset();
        inner.epoch += 1;
        warn!("Session expired; epoch now {}", inner.epoch);
    }

    /// Expires the session on behalf of an action's 401, unless the token that
    /// was rejected is no longer the session's token (logged out, logged in
    /// again, or already expired by an earlier 401).
    pub fn expire_from(&self, ticket: ActionTicket, sent_token: &str) -> bool {
        let mut inner = self.inner.write();
        if ticket.epoch != inner.epoch || inner.session.token.as_deref() != Some(sent_token) {
            debug!("Ignoring 401 from action #{} for a replaced token", ticket.seq);
            return false;
        }
        inner.reset();
        inner.epoch += 1;
        warn!("Session expired by backend; epoch now {}", inner.epoch);
        true
    }

    pub fn set_current_page(&self, key: &str) -> Result<(), SessionError> {
        let page = pages::lookup(key).ok_or_else(|| SessionError::UnknownPage(key.to_string()))?;
        let mut inner = self.inner.write();
        inner.session.current_page = page.key.to_string();
        Ok(())
    }

    /// Starts a new user action, superseding any earlier one.
    pub fn begin_action(&self) -> ActionTicket {
        let mut inner = self.inner.write();
        inner.latest_seq += 1;
        inner.last_active = Utc::now();
        let ticket = ActionTicket {
            seq: inner.latest_seq,
            epoch: inner.epoch,
        };
        debug!("Action #{} started", ticket.seq);
        ticket
    }

    pub fn is_current(&self, ticket: ActionTicket) -> bool {
        self.inner.read().is_current(ticket)
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.inner.read().last_active
    }

    /// Whether the session has been idle longer than `ttl_seconds`.
    pub fn is_idle(&self, ttl_seconds: i64) -> bool {
        let age = Utc::now().signed_duration_since(self.last_active());
        age.num_seconds() > ttl_seconds
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_login(token: &str, role: Role) -> Result<(), SessionError> {
    if role == Role::Guest {
        return Err(SessionError::InvalidRole);
    }
    if token.trim().is_empty() {
        return Err(SessionError::EmptyToken);
    }
    Ok(())
}
