//! Chat page handler.
//!
//! GET / serves the embedded single-page chat client. The page talks to
//! `/api/session`, `/api/chat` (EventSource), and `/api/clear`.

use axum::response::Html;

/// GET / — the chat page.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../../assets/index.html"))
}
