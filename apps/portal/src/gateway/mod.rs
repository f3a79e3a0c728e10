//! API gateway: the single point of entry for every call to the evaluation backend.
//!
//! No other module talks to the backend over HTTP. Every call comes back as an
//! `ApiResult`; transport failures, auth failures and bad bodies are values,
//! not panics. A 401 expires the calling session on the spot.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::normalize::envelope_message;
use crate::session::{ActionTicket, SessionStore};

mod request;

pub use request::{ApiRequest, Base, Body};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Session expired. Please log in again.")]
    Unauthorized,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Authentication required")]
    AuthRequired,

    #[error("Result discarded: a newer action superseded this one")]
    Stale,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "NETWORK_ERROR",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Api { .. } => "API_ERROR",
            ApiError::AuthRequired => "AUTH_REQUIRED",
            ApiError::Stale => "STALE",
        }
    }
}

/// Raw outcome of a request before any session bookkeeping is applied.
enum Outcome {
    Unauthorized,
    Done(ApiResult<Value>),
}

#[derive(Clone)]
pub struct ApiGateway {
    client: Client,
    api_base_url: String,
    admin_api_base_url: String,
    health_timeout: Duration,
}

impl ApiGateway {
    pub fn new(config: &Config) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_base_url: config.api_base_url.clone(),
            admin_api_base_url: config.admin_api_base_url.clone(),
            health_timeout: config.health_timeout,
        })
    }

    /// Timeout for lightweight liveness probes.
    pub fn health_timeout(&self) -> Duration {
        self.health_timeout
    }

    fn url(&self, base: Base, path: &str) -> String {
        let root = match base {
            Base::Public => &self.api_base_url,
            Base::Admin => &self.admin_api_base_url,
        };
        if path.starts_with('/') {
            format!("{root}{path}")
        } else {
            format!("{root}/{path}")
        }
    }

    /// Makes a call on behalf of `session` as part of the action `ticket`.
    ///
    /// The session's token is attached whenever there is one, required or not.
    /// The result is discarded (`ApiError::Stale`) when a newer action has been
    /// started or the session was reset while the call was in flight.
    pub async fn call(
        &self,
        session: &SessionStore,
        ticket: ActionTicket,
        request: ApiRequest,
    ) -> ApiResult<Value> {
        let token = session.token();
        if request.auth_required && token.is_none() {
            return Err(ApiError::AuthRequired);
        }

        match self.execute(request, token.clone()).await {
            Outcome::Unauthorized => {
                // Only reached when a token was sent.
                let sent = token.as_deref().unwrap_or_default();
                if session.expire_from(ticket, sent) {
                    Err(ApiError::Unauthorized)
                } else {
                    Err(ApiError::Stale)
                }
            }
            Outcome::Done(result) => {
                if !session.is_current(ticket) {
                    warn!("Discarding result of superseded action #{}", ticket.seq());
                    return Err(ApiError::Stale);
                }
                result
            }
        }
    }

    /// Makes a call outside any session, e.g. the portal's own health probe.
    pub async fn call_unscoped(&self, request: ApiRequest) -> ApiResult<Value> {
        if request.auth_required {
            return Err(ApiError::AuthRequired);
        }
        match self.execute(request, None).await {
            Outcome::Unauthorized => Err(ApiError::Unauthorized),
            Outcome::Done(result) => result,
        }
    }

    async fn execute(&self, request: ApiRequest, token: Option<String>) -> Outcome {
        let url = self.url(request.base, &request.path);
        debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.clone(), &url);
        let sent_token = token.is_some();
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            Body::Empty => builder,
            Body::Json(body) => builder.json(&body),
            Body::Form(fields) => builder.form(&fields),
        };
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => return Outcome::Done(Err(network_error(&e))),
        };

        // Without a token a 401 is a plain rejection (e.g. bad credentials),
        // not an expiry.
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED && sent_token {
            warn!("Backend rejected credentials for {} {}", request.method, request.path);
            return Outcome::Unauthorized;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Outcome::Done(Err(network_error(&e))),
        };

        if !status.is_success() {
            warn!("Backend returned {} for {}: {}", status, request.path, body);
            return Outcome::Done(Err(ApiError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
            }));
        }

        Outcome::Done(parse_body(status, &body))
    }
}

fn network_error(e: &reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Network(format!("Request timed out: {e}"))
    } else {
        ApiError::Network(e.to_string())
    }
}

fn parse_body(status: StatusCode, body: &str) -> ApiResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| ApiError::Api {
        status: status.as_u16(),
        message: format!("Backend returned malformed JSON: {e}"),
    })
}

/// Prefers the backend's own message (`detail` / `message`), then the raw
/// body, then the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string();
    }
    serde_json::from_str::<Value>(trimmed)
        .ok()
        .and_then(|json| envelope_message(&json).map(str::to_string))
        .unwrap_or_else(|| trimmed.to_string())
}
