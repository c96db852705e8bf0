//! Liveness placeholder.

use axum::response::Html;

/// Handle `GET /`. Body is fixed for compatibility with existing clients.
pub async fn handle_root() -> Html<&'static str> {
    Html("<p>Hello, World!</p>")
}
