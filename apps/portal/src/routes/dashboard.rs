use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::Value;

use super::{begin, ensure_current};
use crate::errors::AppError;
use crate::flows::dashboard::{
    self, EvaluationForm, JobDescriptionForm, JobForm, ResumeForm,
};
use crate::flows::ActionOutcome;
use crate::models::{Evaluation, EvaluationFilters, JobUpdate};
use crate::session::SessionStore;
use crate::state::AppState;

type Store = Extension<Arc<SessionStore>>;

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Extension(store): Store,
    Json(form): Json<JobForm>,
) -> Result<Json<ActionOutcome>, AppError> {
    Ok(Json(dashboard::create_job(&begin(&state, &store), &form).await?))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Extension(store): Store,
    Path(id): Path<String>,
) -> Result<Json<ActionOutcome>, AppError> {
    Ok(Json(dashboard::get_job(&begin(&state, &store), &id).await?))
}

/// PUT /api/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Extension(store): Store,
    Path(id): Path<String>,
    Json(update): Json<JobUpdate>,
) -> Result<Json<ActionOutcome>, AppError> {
    Ok(Json(
        dashboard::update_job(&begin(&state, &store), &id, &update).await?,
    ))
}

/// DELETE /api/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Extension(store): Store,
    Path(id): Path<String>,
) -> Result<Json<ActionOutcome>, AppError> {
    Ok(Json(dashboard::delete_job(&begin(&state, &store), &id).await?))
}

/// POST /api/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Extension(store): Store,
    Json(form): Json<ResumeForm>,
) -> Result<Json<ActionOutcome>, AppError> {
    Ok(Json(
        dashboard::create_resume(&begin(&state, &store), &form).await?,
    ))
}

/// GET /api/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Extension(store): Store,
    Path(id): Path<String>,
) -> Result<Json<ActionOutcome>, AppError> {
    Ok(Json(dashboard::get_resume(&begin(&state, &store), &id).await?))
}

/// PUT /api/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Extension(store): Store,
    Path(id): Path<String>,
    Json(changes): Json<Value>,
) -> Result<Json<ActionOutcome>, AppError> {
    Ok(Json(
        dashboard::update_resume(&begin(&state, &store), &id, changes).await?,
    ))
}

/// DELETE /api/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Extension(store): Store,
    Path(id): Path<String>,
) -> Result<Json<ActionOutcome>, AppError> {
    Ok(Json(
        dashboard::delete_resume(&begin(&state, &store), &id).await?,
    ))
}

/// POST /api/resumes/:id/parse
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    Extension(store): Store,
    Path(id): Path<String>,
) -> Result<Json<ActionOutcome>, AppError> {
    Ok(Json(
        dashboard::parse_resume(&begin(&state, &store), &id).await?,
    ))
}

/// POST /api/evaluations
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Extension(store): Store,
    Json(form): Json<EvaluationForm>,
) -> Result<Json<ActionOutcome>, AppError> {
    Ok(Json(dashboard::evaluate(&begin(&state, &store), &form).await?))
}

/// GET /api/admin/evaluations
pub async fn handle_filter_candidates(
    State(state): State<AppState>,
    Extension(store): Store,
    Query(filters): Query<EvaluationFilters>,
) -> Result<Json<Vec<Evaluation>>, AppError> {
    let backend = begin(&state, &store);
    let candidates = dashboard::filter_candidates(&backend, &filters).await?;
    ensure_current(backend)?;
    Ok(Json(candidates))
}

/// POST /api/admin/job-descriptions
pub async fn handle_create_job_description(
    State(state): State<AppState>,
    Extension(store): Store,
    Json(form): Json<JobDescriptionForm>,
) -> Result<Json<ActionOutcome>, AppError> {
    Ok(Json(
        dashboard::create_job_description(&begin(&state, &store), &form).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock(server: &MockServer, verb: &str, route: &str, status: u16, body: Value) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    /// Logs in through the portal and returns the session cookie.
    async fn login(app: &axum::Router, server: &MockServer, is_admin: bool) -> String {
        mock(
            server,
            "POST",
            "/auth/token",
            200,
            json!({"access_token": "tok", "user_id": 3, "is_admin": is_admin}),
        )
        .await;
        for route in [
            "/health",
            "/jobs/jobs/",
            "/resumes/resumes/",
            "/evaluations",
            "/api/v1/admin/users",
            "/api/v1/admin/job-descriptions",
        ] {
            mock(server, "GET", route, 200, json!([])).await;
        }
        let form = json!({"email": "u@x.com", "password": "secret"});
        let (status, cookie, _) = send(app, Method::POST, "/api/auth/login", None, Some(form)).await;
        assert_eq!(status, StatusCode::OK);
        cookie.expect("session cookie")
    }

    #[tokio::test]
    async fn test_guest_cannot_create_job() {
        let app = test_app("http://127.0.0.1:9");
        let (status, _, body) =
            send(&app, Method::POST, "/api/jobs", None, Some(json!({"title": "QA"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Please login first");
    }

    #[tokio::test]
    async fn test_create_job() {
        let server = MockServer::start().await;
        let app = test_app(&server.uri());
        let cookie = login(&app, &server, false).await;
        Mock::given(method("POST"))
            .and(path("/jobs/jobs/"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "success", "data": {"id": 9, "title": "QA"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let form = json!({"title": "QA", "company": "Acme"});
        let (status, _, body) =
            send(&app, Method::POST, "/api/jobs", Some(&cookie), Some(form)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Job created");
        assert_eq!(body["data"]["id"], 9);
    }

    #[tokio::test]
    async fn test_missing_job_is_not_found() {
        let server = MockServer::start().await;
        mock(&server, "GET", "/jobs/jobs/42", 200, json!({"status": "error"})).await;
        let app = test_app(&server.uri());

        let (status, _, body) = send(&app, Method::GET, "/api/jobs/42", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Job 42 not found");
    }

    #[tokio::test]
    async fn test_encoded_path_ids_are_refused() {
        let server = MockServer::start().await;
        let app = test_app(&server.uri());
        let cookie = login(&app, &server, false).await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "LEAK"})))
            .expect(0)
            .mount(&server)
            .await;

        for uri in [
            "/api/jobs/..%2F..%2Fapi%2Fv1%2Fadmin%2Fusers",
            "/api/resumes/..%2F..%2Fjobs%2Fjobs%2F3",
        ] {
            let (status, _, body) = send(&app, Method::DELETE, uri, Some(&cookie), None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }
        let (status, _, _) = send(
            &app,
            Method::GET,
            "/api/jobs/..%2F..%2Fapi%2Fv1%2Fadmin%2Fusers",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_resume_unwraps_envelope() {
        let server = MockServer::start().await;
        let app = test_app(&server.uri());
        let cookie = login(&app, &server, false).await;
        mock(
            &server,
            "GET",
            "/resumes/resumes/8",
            200,
            json!({"status": "success", "data": {"id": 8, "student_name": "Asha"}}),
        )
        .await;

        let (status, _, body) =
            send(&app, Method::GET, "/api/resumes/8", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Resume 8");
        assert_eq!(body["data"]["student_name"], "Asha");
    }

    #[tokio::test]
    async fn test_evaluate_reports_score_and_verdict() {
        let server = MockServer::start().await;
        let app = test_app(&server.uri());
        let cookie = login(&app, &server, false).await;
        Mock::given(method("POST"))
            .and(path("/evaluations/evaluation/"))
            .and(body_string_contains("resume_id=1"))
            .and(body_string_contains("job_id=2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"relevance_score": 82.5, "verdict": "High"}),
            ))
            .mount(&server)
            .await;

        let form = json!({"resume_id": 1, "job_id": "2"});
        let (status, _, body) =
            send(&app, Method::POST, "/api/evaluations", Some(&cookie), Some(form)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Score: 82.5 | Verdict: High");
    }

    #[tokio::test]
    async fn test_expired_token_resets_session() {
        let server = MockServer::start().await;
        let app = test_app(&server.uri());
        let cookie = login(&app, &server, false).await;
        mock(&server, "DELETE", "/resumes/resumes/5", 401, json!({"detail": "expired"})).await;

        let (status, _, _) =
            send(&app, Method::DELETE, "/api/resumes/5", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, _, session) = send(&app, Method::GET, "/api/session", Some(&cookie), None).await;
        assert_eq!(session["role"], "guest");
    }

    #[tokio::test]
    async fn test_filter_candidates_requires_admin() {
        let server = MockServer::start().await;
        let app = test_app(&server.uri());
        let cookie = login(&app, &server, false).await;

        let (status, _, _) = send(
            &app,
            Method::GET,
            "/api/admin/evaluations?min_score=50",
            Some(&cookie),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_filter_candidates_forwards_filters() {
        let server = MockServer::start().await;
        let app = test_app(&server.uri());
        let cookie = login(&app, &server, true).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/admin/evaluations"))
            .and(query_param("min_score", "50"))
            .and(query_param("verdict", "High"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": [{"id": 1, "relevance_score": 77.0, "verdict": "High"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, _, body) = send(
            &app,
            Method::GET,
            "/api/admin/evaluations?min_score=50&max_score=100&verdict=High",
            Some(&cookie),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["relevance_score"], 77.0);
    }

    #[tokio::test]
    async fn test_invalid_filter_range() {
        let server = MockServer::start().await;
        let app = test_app(&server.uri());
        let cookie = login(&app, &server, true).await;

        let (status, _, _) = send(
            &app,
            Method::GET,
            "/api/admin/evaluations?min_score=80&max_score=20",
            Some(&cookie),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
