pub mod auth;
pub mod dashboard;
pub mod health;
pub mod pages;

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;
use uuid::Uuid;

use crate::backend::Backend;
use crate::errors::AppError;
use crate::flows::ActionOutcome;
use crate::session::SessionStore;
use crate::state::AppState;
use crate::views::PageView;

pub const SESSION_COOKIE: &str = "portal_session";

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/session", get(pages::handle_session))
        // Navigation
        .route("/api/pages", get(pages::handle_menu))
        .route("/api/page", get(pages::handle_current_page))
        .route("/api/pages/:key", get(pages::handle_navigate))
        // Auth
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/logout", post(auth::handle_logout))
        .route("/api/auth/register", post(auth::handle_register))
        .route(
            "/api/auth/forgot-password",
            post(auth::handle_forgot_password),
        )
        // Dashboards
        .route("/api/jobs", post(dashboard::handle_create_job))
        .route(
            "/api/jobs/:id",
            get(dashboard::handle_get_job)
                .put(dashboard::handle_update_job)
                .delete(dashboard::handle_delete_job),
        )
        .route("/api/resumes", post(dashboard::handle_create_resume))
        .route(
            "/api/resumes/:id",
            get(dashboard::handle_get_resume)
                .put(dashboard::handle_update_resume)
                .delete(dashboard::handle_delete_resume),
        )
        .route(
            "/api/resumes/:id/parse",
            post(dashboard::handle_parse_resume),
        )
        .route("/api/evaluations", post(dashboard::handle_evaluate))
        .route(
            "/api/admin/evaluations",
            get(dashboard::handle_filter_candidates),
        )
        .route(
            "/api/admin/job-descriptions",
            post(dashboard::handle_create_job_description),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(api)
        .with_state(state)
}

/// Attaches the browser's `SessionStore` to the request, creating one (and
/// its cookie) when the cookie is missing or refers to a pruned session.
async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let id = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());
    let (id, store, created) = state.sessions.get_or_create(id);
    request.extensions_mut().insert(store);

    let response = next.run(request).await;
    if !created {
        return response;
    }
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .build();
    (jar.add(cookie), response).into_response()
}

/// Result of a form submission, plus the page it landed on (if any).
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    #[serde(flatten)]
    pub outcome: ActionOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageView>,
}

/// Renders the outcome's landing page under the same action. A submission
/// superseded meanwhile is answered with `409`.
async fn land(
    state: &AppState,
    backend: Backend<'_>,
    outcome: ActionOutcome,
) -> Result<Json<ActionResponse>, AppError> {
    let page = match outcome.landing_page {
        Some(key) => Some(state.pages.navigate(backend, key).await),
        None => None,
    };
    ensure_current(backend)?;
    Ok(Json(ActionResponse { outcome, page }))
}

fn ensure_current(backend: Backend<'_>) -> Result<(), AppError> {
    if backend.session().is_current(backend.ticket()) {
        Ok(())
    } else {
        Err(AppError::Stale)
    }
}

/// Starts a new action for `store`; superseding whatever it was doing.
fn begin<'a>(state: &'a AppState, store: &'a Arc<SessionStore>) -> Backend<'a> {
    Backend::new(&state.gateway, store, store.begin_action())
}
