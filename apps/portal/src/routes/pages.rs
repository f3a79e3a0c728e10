use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::{begin, ensure_current};
use crate::errors::AppError;
use crate::navigation::{self, MenuEntry};
use crate::session::{Session, SessionStore};
use crate::state::AppState;
use crate::views::PageView;

/// GET /api/session
pub async fn handle_session(Extension(store): Extension<Arc<SessionStore>>) -> Json<Session> {
    Json(store.get())
}

/// GET /api/pages
pub async fn handle_menu(Extension(store): Extension<Arc<SessionStore>>) -> Json<Vec<MenuEntry>> {
    Json(navigation::menu(&store.get()))
}

/// GET /api/page
pub async fn handle_current_page(
    State(state): State<AppState>,
    Extension(store): Extension<Arc<SessionStore>>,
) -> Result<Json<PageView>, AppError> {
    let backend = begin(&state, &store);
    let view = state.pages.render_current(backend).await;
    ensure_current(backend)?;
    Ok(Json(view))
}

/// GET /api/pages/:key
pub async fn handle_navigate(
    State(state): State<AppState>,
    Extension(store): Extension<Arc<SessionStore>>,
    Path(key): Path<String>,
) -> Result<Json<PageView>, AppError> {
    let backend = begin(&state, &store);
    let view = state.pages.navigate(backend, &key).await;
    ensure_current(backend)?;
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn backend() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
            .mount(&server)
            .await;
        for route in ["/jobs/jobs/", "/resumes/resumes/", "/evaluations"] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
                .mount(&server)
                .await;
        }
        server
    }

    #[tokio::test]
    async fn test_menu_for_guest() {
        let app = test_app("http://127.0.0.1:9");
        let (status, _, body) = send(&app, Method::GET, "/api/pages", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 8);
        let home = entries.iter().find(|e| e["key"] == "Home").unwrap();
        assert_eq!(home["accessible"], true);
        assert_eq!(home["current"], true);
        let admin = entries.iter().find(|e| e["key"] == "Admin_Dashboard").unwrap();
        assert_eq!(admin["accessible"], false);
    }

    #[tokio::test]
    async fn test_guest_redirected_from_gated_page() {
        let server = backend().await;
        let app = test_app(&server.uri());

        let (status, cookie, body) =
            send(&app, Method::GET, "/api/pages/Student_Dashboard", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], "Home");
        assert_eq!(body["redirected_from"], "Student_Dashboard");
        assert_eq!(body["notice"]["message"], "Please login first.");

        let (_, _, session) =
            send(&app, Method::GET, "/api/session", cookie.as_deref(), None).await;
        assert_eq!(session["role"], "guest");
        assert_eq!(session["current_page"], "Home");
    }

    #[tokio::test]
    async fn test_navigation_is_remembered() {
        let server = backend().await;
        let app = test_app(&server.uri());

        let (_, cookie, body) = send(&app, Method::GET, "/api/pages/Register", None, None).await;
        assert_eq!(body["page"], "Register");

        let (status, _, body) = send(&app, Method::GET, "/api/page", cookie.as_deref(), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], "Register");
    }

    #[tokio::test]
    async fn test_unknown_page_falls_back_home() {
        let server = backend().await;
        let app = test_app(&server.uri());

        let (_, _, body) = send(&app, Method::GET, "/api/pages/Nowhere", None, None).await;
        assert_eq!(body["page"], "Home");
        assert_eq!(body["notice"]["message"], "Page 'Nowhere' does not exist.");
    }
}
