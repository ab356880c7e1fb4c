//! Axum router configuration with middleware.
//!
//! Paths are part of the external contract and must stay stable:
//! `/`, `/api/chat` (GET streaming, POST blocking), `/api/clear`,
//! `/api/session`. Middleware: CORS, request tracing.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use conversa_core::llm::LlmProvider;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router<P: LlmProvider + 'static>(state: AppState<P>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::page::index))
        .route(
            "/api/chat",
            get(handlers::chat::stream_chat::<P>).post(handlers::chat::send_chat::<P>),
        )
        .route("/api/clear", post(handlers::session::clear_session::<P>))
        .route("/api/session", get(handlers::session::new_session::<P>))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use futures_util::Stream;
    use tower::ServiceExt;
    use uuid::Uuid;

    use conversa_types::config::AppConfig;
    use conversa_types::llm::{
        CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason,
        StreamEvent, Usage,
    };

    /// Provider that replays a fixed reply for every request.
    struct FixedProvider {
        fragments: Vec<&'static str>,
        capabilities: ProviderCapabilities,
    }

    impl FixedProvider {
        fn new(fragments: Vec<&'static str>) -> Self {
            Self {
                fragments,
                capabilities: ProviderCapabilities {
                    streaming: true,
                    max_context_tokens: 200_000,
                    max_output_tokens: 8_192,
                },
            }
        }
    }

    impl LlmProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                id: "msg_test".to_string(),
                content: self.fragments.concat(),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }

        fn stream(
            &self,
            _request: CompletionRequest,
        ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
            let mut events: Vec<Result<StreamEvent, LlmError>> = self
                .fragments
                .iter()
                .map(|text| {
                    Ok(StreamEvent::TextDelta {
                        index: 0,
                        text: text.to_string(),
                    })
                })
                .collect();
            events.push(Ok(StreamEvent::Done));
            Box::pin(futures_util::stream::iter(events))
        }
    }

    fn test_router() -> Router {
        let (state, _store) = AppState::new(
            Arc::new(FixedProvider::new(vec!["Hel", "lo"])),
            &AppConfig::default(),
        );
        build_router(state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = test_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_index_serves_chat_page() {
        let response = test_router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("<html"));
        assert!(html.contains("/api/chat"));
    }

    #[tokio::test]
    async fn test_new_session_returns_fresh_id() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let id = json["conversationId"].as_str().unwrap();
        assert!(id.parse::<Uuid>().is_ok());
    }

    #[tokio::test]
    async fn test_post_chat_returns_full_content() {
        let session = Uuid::now_v7();
        let body = serde_json::json!({
            "message": "hi there",
            "conversationId": session.to_string(),
        });
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["content"], "Hello");
    }

    #[tokio::test]
    async fn test_post_chat_empty_message_is_rejected() {
        let body = serde_json::json!({
            "message": "   ",
            "conversationId": Uuid::now_v7().to_string(),
        });
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_get_chat_invalid_conversation_id_is_rejected() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/chat?message=hi&conversationId=not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_chat_streams_fragments_as_sse() {
        let session = Uuid::now_v7();
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/chat?message=hi&conversationId={session}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "text/event-stream"
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        let hel = text.find("data: Hel").expect("first fragment present");
        let lo = text.find("data: lo").expect("second fragment present");
        assert!(hel < lo, "fragments must arrive in order");
    }

    #[tokio::test]
    async fn test_streamed_turn_lands_in_history_then_clear_empties_it() {
        let (state, store) = AppState::new(
            Arc::new(FixedProvider::new(vec!["Hel", "lo"])),
            &AppConfig::default(),
        );
        let router = build_router(state);
        let session = Uuid::now_v7();

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/chat?message=hi&conversationId={session}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        // Drain the SSE body so the turn completes and commits.
        let _ = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let history = store.history(&session).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, "Hello");

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/clear?conversationId={session}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "cleared");

        assert!(store.history(&session).await.is_empty());
    }
}
