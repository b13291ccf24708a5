use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../templates/index.html");

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Landing page", content_type = "text/html", body = String),
    ),
    tag = "Pages"
)]
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
