//! HTTP endpoints.
//!
//! The config endpoint the widget bootstrap calls, the embed snippet
//! endpoint, and liveness.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.settings.cors_origins, state.settings.cors_enabled);

    Router::new()
        .route("/api/config/:chatbot_id", get(tenant_config))
        .route("/embed/:chatbot_id", get(embed_snippet))
        .route("/health", get(health_check))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build CORS layer from configured origins.
///
/// - cors_enabled false ⇒ permissive (development only)
/// - empty origins ⇒ localhost:3000
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(%origin, "invalid CORS origin");
                None
            })
        })
        .collect();

    if parsed.is_empty() {
        tracing::info!("no CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost:3000"))
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!(origins = parsed.len(), "CORS configured");
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TenantConfigResponse {
    supabase_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    supabase_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

fn bad_request(error: &'static str, message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error,
            message: message.into(),
        }),
    )
        .into_response()
}

/// Tenant credentials for the widget bootstrap. Responses are cacheable
/// for a short window so repeat mounts don't hammer the endpoint.
async fn tenant_config(
    State(state): State<AppState>,
    Path(chatbot_id): Path<String>,
) -> Response {
    if Uuid::parse_str(chatbot_id.trim()).is_err() {
        return bad_request("invalid_chatbot_id", "Chatbot id must be a UUID");
    }
    if state.settings.supabase_url.is_empty() {
        tracing::error!("tenant config requested but no backend is configured");
        return bad_request("not_configured", "No backend configured for this chatbot");
    }

    let body = TenantConfigResponse {
        supabase_url: state.settings.supabase_url.clone(),
        supabase_key: state.settings.supabase_key.clone(),
    };
    (
        [(
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.settings.config_cache_seconds),
        )],
        Json(body),
    )
        .into_response()
}

/// Installation snippet for one chatbot.
async fn embed_snippet(
    State(state): State<AppState>,
    Path(chatbot_id): Path<String>,
) -> Response {
    if Uuid::parse_str(chatbot_id.trim()).is_err() {
        return bad_request("invalid_chatbot_id", "Chatbot id must be a UUID");
    }

    let snippet = leadflow_widget::embed::snippet(
        chatbot_id.trim(),
        &state.settings.widget_script_url,
        "/api/config",
    );
    (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        snippet,
    )
        .into_response()
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use leadflow_config::ServerSettings;

    fn router() -> Router {
        let settings = ServerSettings {
            supabase_url: "https://x.supabase.co".into(),
            supabase_key: Some("anon".into()),
            ..Default::default()
        };
        create_router(AppState::new(settings))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn config_returns_credentials_with_cache_header() {
        let response = router()
            .oneshot(
                Request::get("/api/config/8b0bff5a-9f24-4399-84bd-ab21a7c85f43")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cache = response.headers()[header::CACHE_CONTROL].to_str().unwrap();
        assert!(cache.contains("max-age=300"));
        let body = body_json(response).await;
        assert_eq!(body["supabaseUrl"], "https://x.supabase.co");
        assert_eq!(body["supabaseKey"], "anon");
    }

    #[tokio::test]
    async fn malformed_id_rejected_with_error_shape() {
        let response = router()
            .oneshot(
                Request::get("/api/config/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid_chatbot_id");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn embed_serves_snippet() {
        let response = router()
            .oneshot(
                Request::get("/embed/8b0bff5a-9f24-4399-84bd-ab21a7c85f43")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("window.LEADFLOW_CHATBOT_ID"));
        assert!(html.contains("<script src="));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
