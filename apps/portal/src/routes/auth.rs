use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use super::{begin, land, ActionResponse};
use crate::errors::AppError;
use crate::flows::auth::{self, ForgotPasswordForm, LoginForm, RegistrationForm};
use crate::session::SessionStore;
use crate::state::AppState;

/// POST /api/auth/login
/// Logs in and renders the dashboard the account lands on.
pub async fn handle_login(
    State(state): State<AppState>,
    Extension(store): Extension<Arc<SessionStore>>,
    Json(form): Json<LoginForm>,
) -> Result<Json<ActionResponse>, AppError> {
    let backend = begin(&state, &store);
    let outcome = auth::login(&backend, &form).await?;
    land(&state, backend, outcome).await
}

/// POST /api/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    Extension(store): Extension<Arc<SessionStore>>,
) -> Result<Json<ActionResponse>, AppError> {
    // Supersede any login still in flight before clearing the session.
    let backend = begin(&state, &store);
    let outcome = auth::logout(backend.session());
    land(&state, backend, outcome).await
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Extension(store): Extension<Arc<SessionStore>>,
    Json(form): Json<RegistrationForm>,
) -> Result<Json<ActionResponse>, AppError> {
    let backend = begin(&state, &store);
    let outcome = auth::register(&backend, &form).await?;
    land(&state, backend, outcome).await
}

/// POST /api/auth/forgot-password
pub async fn handle_forgot_password(
    State(state): State<AppState>,
    Extension(store): Extension<Arc<SessionStore>>,
    Json(form): Json<ForgotPasswordForm>,
) -> Result<Json<ActionResponse>, AppError> {
    let backend = begin(&state, &store);
    let outcome = auth::forgot_password(&backend, &form).await?;
    land(&state, backend, outcome).await
}
