pub mod health;

use axum::{
    http::{header, Method},
    routing::get,
    routing::post,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // API Gateway posts to the stage root; /analyze is the explicit alias.
        .route(
            "/",
            post(handlers::handle_analyze).options(handlers::handle_preflight),
        )
        .route(
            "/analyze",
            post(handlers::handle_analyze).options(handlers::handle_preflight),
        )
        .with_state(state)
}

/// Browser clients call from arbitrary origins; only POST + preflight are allowed.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::mock::MockModel;

    fn state(model: Arc<MockModel>) -> AppState {
        AppState {
            llm: model,
            config: Config::from_lookup(|_| None).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_browser_preflight_is_answered_by_cors_layer() {
        let model = Arc::new(MockModel::replying("{}"));
        let app = build_router(state(model.clone())).layer(cors_layer());
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/analyze")
                    .header(header::ORIGIN, "https://interview.example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
        assert!(methods.contains("POST"), "{methods}");
        let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        assert!(allowed.contains("content-type"), "{allowed}");
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_cross_origin_post_gets_allow_origin() {
        let model = Arc::new(MockModel::replying("{\"overview\": \"ok\"}"));
        let app = build_router(state(model.clone())).layer(cors_layer());
        let body = serde_json::json!({
            "transcript": [{"role": "user", "content": "Hello"}],
            "dpp": {"mode": "interview"}
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/")
                    .header(header::ORIGIN, "https://interview.example.com")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_health_reports_model() {
        let response = build_router(state(Arc::new(MockModel::replying("{}"))))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], "mock-model");
        assert_eq!(body["max_tokens"], 4096);
    }
}
