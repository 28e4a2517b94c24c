use axum::response::Html;

/// Handler: GET /
///
/// Single static page with a question form and an upload form; both talk to
/// the JSON endpoints.
pub async fn index_route() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}
