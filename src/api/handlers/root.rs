use axum::response::IntoResponse;

use crate::api::pages;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Landing page", content_type = "text/html", body = String)
    ),
    tag = "pages"
)]
pub async fn root() -> impl IntoResponse {
    pages::home()
}
