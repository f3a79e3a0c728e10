use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::debug;

use crate::backend::is_healthy;
use crate::gateway::ApiRequest;
use crate::state::AppState;

/// GET /health
/// Portal liveness plus whether the evaluation backend answers its own probe.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let probe = ApiRequest::get("/health").timeout(state.gateway.health_timeout());
    let backend = match state.gateway.call_unscoped(probe).await {
        Ok(payload) if is_healthy(&payload) => "online",
        Ok(payload) => {
            debug!("Backend reported unhealthy: {payload}");
            "offline"
        }
        Err(e) => {
            debug!("Backend health probe failed: {e}");
            "offline"
        }
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "placement-portal",
        "backend": backend
    }))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_backend_online() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
            .mount(&server)
            .await;

        let app = test_app(&server.uri());
        let (status, _, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["backend"], "online");
    }

    #[tokio::test]
    async fn test_backend_degraded_is_offline() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "degraded"})))
            .mount(&server)
            .await;

        let app = test_app(&server.uri());
        let (_, _, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(body["backend"], "offline");
    }
}
