//! Session endpoints.
//!
//! - `GET  /api/session` — issue a fresh conversation identifier.
//! - `POST /api/clear`   — drop a conversation's retained history.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use conversa_core::llm::LlmProvider;

use crate::http::error::AppError;
use crate::state::AppState;

/// Response body for `GET /api/session`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionResponse {
    pub conversation_id: Uuid,
}

/// Query parameters for `POST /api/clear`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearQuery {
    pub conversation_id: String,
}

/// Response body for `POST /api/clear`.
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub status: &'static str,
}

/// GET /api/session — issue a new conversation identifier.
///
/// No side effect on the store; the conversation is created lazily on the
/// first chat turn.
pub async fn new_session<P: LlmProvider + 'static>(
    State(state): State<AppState<P>>,
) -> Json<NewSessionResponse> {
    let conversation_id = state.sessions.new_session();
    tracing::debug!(conversation_id = %conversation_id, "issued new session");
    Json(NewSessionResponse { conversation_id })
}

/// POST /api/clear — remove all history for a conversation.
///
/// Safe to call for unknown identifiers.
pub async fn clear_session<P: LlmProvider + 'static>(
    State(state): State<AppState<P>>,
    Query(query): Query<ClearQuery>,
) -> Result<Json<ClearResponse>, AppError> {
    let session_id = query
        .conversation_id
        .parse::<Uuid>()
        .map_err(|_| {
            AppError::Validation(format!("invalid conversationId: {}", query.conversation_id))
        })?;

    state.chat.clear_conversation(&session_id).await;

    Ok(Json(ClearResponse { status: "cleared" }))
}
