//! Typed operations over the evaluation backend.
//!
//! `Backend` binds the gateway to one session and one action ticket, so every
//! call made while handling a user action shares the same staleness check.
//! List endpoints are normalized here; single-record and mutation endpoints
//! hand back the raw JSON for display.

use serde::Serialize;
use serde_json::{json, Value};

use crate::gateway::{ApiError, ApiGateway, ApiRequest, ApiResult};
use crate::models::{
    AdminUser, Evaluation, EvaluationFilters, JobDescription, JobUpdate, NewAccount, NewJob,
    NewJobDescription, NewResume, Resume, TokenResponse,
};
use crate::normalize::{normalize_entity, normalize_list_as, NormalizedList};
use crate::session::{ActionTicket, SessionStore};

const HEALTHY: &str = "healthy";

#[derive(Clone, Copy)]
pub struct Backend<'a> {
    gateway: &'a ApiGateway,
    session: &'a SessionStore,
    ticket: ActionTicket,
}

impl<'a> Backend<'a> {
    pub fn new(gateway: &'a ApiGateway, session: &'a SessionStore, ticket: ActionTicket) -> Self {
        Self {
            gateway,
            session,
            ticket,
        }
    }

    pub fn session(&self) -> &'a SessionStore {
        self.session
    }

    pub fn ticket(&self) -> ActionTicket {
        self.ticket
    }

    async fn send(&self, request: ApiRequest) -> ApiResult<Value> {
        self.gateway.call(self.session, self.ticket, request).await
    }

    // ── Health ──────────────────────────────────────────────────────────────

    pub async fn health(&self) -> ApiResult<Value> {
        self.send(ApiRequest::get("/health").timeout(self.gateway.health_timeout()))
            .await
    }

    // ── Auth ────────────────────────────────────────────────────────────────

    /// OAuth2 password grant. A 200 whose body isn't a token is an `ApiError`.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<TokenResponse> {
        let request = ApiRequest::post("/auth/token").form([
            ("username", email),
            ("password", password),
            ("grant_type", "password"),
        ]);
        let body = self.send(request).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Api {
            status: 200,
            message: format!("Unexpected token response: {e}"),
        })
    }

    pub async fn register(&self, account: &NewAccount) -> ApiResult<()> {
        self.send(ApiRequest::post("/auth/register").json(to_json(account)))
            .await
            .map(|_| ())
    }

    pub async fn forgot_password(&self, email: &str) -> ApiResult<()> {
        self.send(ApiRequest::post("/auth/forgot-password").json(json!({ "email": email })))
            .await
            .map(|_| ())
    }

    // ── Jobs ────────────────────────────────────────────────────────────────

    pub async fn jobs(&self) -> ApiResult<NormalizedList<JobDescription>> {
        self.send(ApiRequest::get("/jobs/jobs/"))
            .await
            .map(normalize_list_as)
    }

    pub async fn job(&self, id: &str) -> ApiResult<Option<Value>> {
        self.send(ApiRequest::get(format!("/jobs/jobs/{id}")))
            .await
            .map(normalize_entity)
    }

    pub async fn create_job(&self, job: &NewJob) -> ApiResult<Value> {
        self.send(ApiRequest::post("/jobs/jobs/").json(to_json(job)))
            .await
    }

    pub async fn update_job(&self, id: &str, update: &JobUpdate) -> ApiResult<Value> {
        self.send(ApiRequest::put(format!("/jobs/jobs/{id}")).json(to_json(update)))
            .await
    }

    pub async fn delete_job(&self, id: &str) -> ApiResult<Value> {
        self.send(ApiRequest::delete(format!("/jobs/jobs/{id}")))
            .await
    }

    // ── Resumes ─────────────────────────────────────────────────────────────

    pub async fn resumes(&self) -> ApiResult<NormalizedList<Resume>> {
        self.send(ApiRequest::get("/resumes/resumes/"))
            .await
            .map(normalize_list_as)
    }

    pub async fn resume(&self, id: &str) -> ApiResult<Option<Value>> {
        self.send(ApiRequest::get(format!("/resumes/resumes/{id}")))
            .await
            .map(normalize_entity)
    }

    pub async fn create_resume(&self, resume: &NewResume) -> ApiResult<Value> {
        self.send(ApiRequest::post("/resumes/resumes/").json(to_json(resume)))
            .await
    }

    pub async fn update_resume(&self, id: &str, changes: Value) -> ApiResult<Value> {
        self.send(ApiRequest::put(format!("/resumes/resumes/{id}")).json(changes))
            .await
    }

    pub async fn delete_resume(&self, id: &str) -> ApiResult<Value> {
        self.send(ApiRequest::delete(format!("/resumes/resumes/{id}")))
            .await
    }

    pub async fn parse_resume(&self, id: &str) -> ApiResult<Value> {
        self.send(ApiRequest::post(format!("/resumes/resumes/{id}/parse")))
            .await
    }

    // ── Evaluations ─────────────────────────────────────────────────────────

    /// Form-encoded, as the evaluation endpoint expects.
    pub async fn evaluate(&self, resume_id: &str, job_id: &str) -> ApiResult<Value> {
        let request = ApiRequest::post("/evaluations/evaluation/")
            .form([("resume_id", resume_id), ("job_id", job_id)]);
        self.send(request).await
    }

    pub async fn evaluations(&self) -> ApiResult<NormalizedList<Evaluation>> {
        self.send(ApiRequest::get("/evaluations"))
            .await
            .map(normalize_list_as)
    }

    // ── Admin ───────────────────────────────────────────────────────────────

    pub async fn admin_users(&self) -> ApiResult<NormalizedList<AdminUser>> {
        self.send(ApiRequest::get("/admin/users").admin())
            .await
            .map(normalize_list_as)
    }

    pub async fn admin_evaluations(
        &self,
        filters: &EvaluationFilters,
    ) -> ApiResult<NormalizedList<Evaluation>> {
        let request = filters
            .to_query()
            .into_iter()
            .fold(ApiRequest::get("/admin/evaluations").admin(), |req, (k, v)| {
                req.query(k, v)
            });
        self.send(request).await.map(normalize_list_as)
    }

    pub async fn admin_job_descriptions(
        &self,
        active_only: bool,
    ) -> ApiResult<NormalizedList<JobDescription>> {
        let mut request = ApiRequest::get("/admin/job-descriptions").admin();
        if active_only {
            request = request.query("active_only", "true");
        }
        self.send(request).await.map(normalize_list_as)
    }

    pub async fn create_job_description(&self, job: &NewJobDescription) -> ApiResult<Value> {
        self.send(ApiRequest::post("/admin/job-descriptions").admin().json(to_json(job)))
            .await
    }
}

/// Whether a `/health` payload reports the backend as healthy.
pub fn is_healthy(payload: &Value) -> bool {
    payload.get("status").and_then(Value::as_str) == Some(HEALTHY)
}

fn to_json<T: Serialize>(value: &T) -> Value {
    // Plain data structs with string keys always serialize.
    serde_json::to_value(value).unwrap_or(Value::Null)
}
