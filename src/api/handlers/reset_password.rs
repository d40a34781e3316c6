//! Password reset placeholder. Both methods render the same page and change nothing.

use axum::response::IntoResponse;

use crate::api::pages;

#[utoipa::path(
    get,
    path = "/reset_password",
    responses(
        (status = 200, description = "Password reset placeholder", content_type = "text/html", body = String)
    ),
    tag = "auth"
)]
pub async fn reset_password_form() -> impl IntoResponse {
    pages::reset_password()
}

#[utoipa::path(
    post,
    path = "/reset_password",
    responses(
        (status = 200, description = "Password reset placeholder, no action taken", content_type = "text/html", body = String)
    ),
    tag = "auth"
)]
pub async fn reset_password() -> impl IntoResponse {
    pages::reset_password()
}
