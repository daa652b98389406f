use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;

use crate::AppState;
use crate::models::error::ErrorResponse;
use crate::services::groq::GroqError;

/// Required inbound shape: a `model` key and a `messages` array. Anything
/// beyond that (roles, content, an empty list) is the provider's concern.
fn has_required_shape(payload: &Value) -> bool {
    payload.get("model").is_some()
        && payload
            .get("messages")
            .map(|m| m.is_array())
            .unwrap_or(false)
}

/// Handler for POST /api/chat
/// Validates the request shape, forwards it to Groq with the server-side
/// credential attached, and relays the provider's response or a translated
/// error. Invalid requests are rejected locally; no outbound call is made.
pub async fn chat_completion(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<ErrorResponse>)> {
    if !has_required_shape(&payload) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "Request must include 'model' and 'messages' list",
            )),
        ));
    }

    match state.groq.chat_completion(&payload).await {
        Ok((status, body)) => Ok((status, Json(body))),
        Err(GroqError::NonJsonResponse { status, raw }) => Err((
            status,
            Json(ErrorResponse::with_details(
                "Groq returned a non-JSON response",
                raw,
            )),
        )),
        Err(GroqError::Unreachable(detail)) => {
            tracing::error!("Chat proxy request failed: {}", detail);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_details("Failed to contact Groq", detail)),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        routing::post,
    };
    use http_body_util::BodyExt;
    use sea_orm::Database;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::services::groq::GroqService;

    async fn setup_test_app(groq_base_url: &str, api_key: Option<&str>) -> Router {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");

        let state = AppState {
            db,
            groq: GroqService::new(api_key.map(str::to_string), groq_base_url.to_string()),
        };

        Router::new()
            .route("/api/chat", post(chat_completion))
            .with_state(state)
    }

    /// Serve a throwaway upstream on an ephemeral port, returning its base URL.
    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn post_chat(app: Router, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_chat_missing_messages_is_rejected_locally() {
        // Unroutable upstream: a forwarded request would surface as a 500,
        // so a 400 here proves the request never left the process
        let app = setup_test_app("http://127.0.0.1:1", Some("test-key")).await;

        let (status, body) = post_chat(app, json!({"model": "x"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": "Request must include 'model' and 'messages' list"})
        );
    }

    #[tokio::test]
    async fn test_chat_missing_model_is_rejected_locally() {
        let app = setup_test_app("http://127.0.0.1:1", Some("test-key")).await;

        let (status, body) = post_chat(app, json!({"messages": []})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": "Request must include 'model' and 'messages' list"})
        );
    }

    #[tokio::test]
    async fn test_chat_messages_must_be_a_list() {
        let app = setup_test_app("http://127.0.0.1:1", Some("test-key")).await;

        let (status, _body) =
            post_chat(app, json!({"model": "x", "messages": "hello"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_relays_json_response_verbatim() {
        let upstream_body =
            json!({"choices": [{"message": {"role": "assistant", "content": "hi"}}]});
        let reply = upstream_body.clone();
        let upstream = Router::new().route(
            "/chat/completions",
            post(move || {
                let reply = reply.clone();
                async move { Json(reply) }
            }),
        );
        let base_url = spawn_upstream(upstream).await;

        let app = setup_test_app(&base_url, Some("test-key")).await;
        let (status, body) = post_chat(app, json!({"model": "x", "messages": []})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, upstream_body);
    }

    #[tokio::test]
    async fn test_chat_relays_upstream_error_status() {
        let upstream = Router::new().route(
            "/chat/completions",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"error": {"message": "rate limit"}})),
                )
            }),
        );
        let base_url = spawn_upstream(upstream).await;

        let app = setup_test_app(&base_url, Some("test-key")).await;
        let (status, body) = post_chat(app, json!({"model": "x", "messages": []})).await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["message"], "rate limit");
    }

    #[tokio::test]
    async fn test_chat_non_json_upstream_keeps_status_replaces_body() {
        let upstream = Router::new().route(
            "/chat/completions",
            post(|| async { "Internal text dump" }),
        );
        let base_url = spawn_upstream(upstream).await;

        let app = setup_test_app(&base_url, Some("test-key")).await;
        let (status, body) = post_chat(app, json!({"model": "x", "messages": []})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "error": "Groq returned a non-JSON response",
                "details": "Internal text dump"
            })
        );
    }

    #[tokio::test]
    async fn test_chat_unreachable_upstream_maps_to_500() {
        let app = setup_test_app("http://127.0.0.1:1", Some("test-key")).await;

        let (status, body) = post_chat(app, json!({"model": "x", "messages": []})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to contact Groq");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_chat_missing_credential_fails_per_request() {
        let app = setup_test_app("http://127.0.0.1:1", None).await;

        let (status, body) = post_chat(app, json!({"model": "x", "messages": []})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to contact Groq");
        assert_eq!(body["details"], "GROQ_API_KEY is not configured");
    }
}
