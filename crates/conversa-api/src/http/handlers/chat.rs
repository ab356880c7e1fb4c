//! Chat endpoints: SSE streaming and blocking.
//!
//! - `GET  /api/chat` — query params `message`, `conversationId`; streams
//!   the reply as SSE data events, one per text fragment, in order. The
//!   stream closing is the sole termination signal, for completion and for
//!   upstream failure alike.
//! - `POST /api/chat` — body `{message, conversationId}`; returns the full
//!   reply as `{content}`. Provider failure maps to an HTTP error rather
//!   than an empty body, so clients can tell "no response" from "empty
//!   answer".
//!
//! Field validation happens here; invalid requests never reach the chat
//! service.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_stream::Stream;
use uuid::Uuid;

use conversa_core::llm::LlmProvider;

use crate::http::error::AppError;
use crate::state::AppState;

/// Query parameters for the streaming chat endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatQuery {
    pub message: String,
    pub conversation_id: String,
}

/// Request body for the blocking chat endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: String,
}

/// Response body for the blocking chat endpoint.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub content: String,
}

fn validate(message: &str, conversation_id: &str) -> Result<Uuid, AppError> {
    if message.trim().is_empty() {
        return Err(AppError::Validation("message is required".to_string()));
    }
    conversation_id
        .parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("invalid conversationId: {conversation_id}")))
}

/// GET /api/chat — SSE streaming chat.
pub async fn stream_chat<P: LlmProvider + 'static>(
    State(state): State<AppState<P>>,
    Query(query): Query<ChatQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let session_id = validate(&query.message, &query.conversation_id)?;

    let mut fragments = state.chat.stream_message(session_id, query.message);

    let sse_stream = async_stream::stream! {
        while let Some(item) = fragments.next().await {
            match item {
                Ok(text) => {
                    yield Ok::<_, Infallible>(Event::default().data(text));
                }
                Err(e) => {
                    // Closing the channel is the error signal; fragments
                    // already flushed stay delivered.
                    tracing::warn!(session_id = %session_id, error = %e, "stream terminated early");
                    break;
                }
            }
        }
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

/// POST /api/chat — blocking chat, full reply in one response.
pub async fn send_chat<P: LlmProvider + 'static>(
    State(state): State<AppState<P>>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let session_id = validate(&body.message, &body.conversation_id)?;

    let content = state.chat.send_message(session_id, &body.message).await?;

    Ok(Json(ChatResponse { content }))
}
