use axum::{
    extract::{rejection::FormRejection, Extension, Form},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

use crate::{
    api::pages,
    identity::{valid_password, valid_username, CreateOutcome, UserRepo, MAX_USERNAME_LEN},
};

#[derive(ToSchema, Deserialize, Debug)]
pub struct RegisterForm {
    username: String,
    #[schema(value_type = String, format = Password)]
    password: SecretString,
}

#[utoipa::path(
    get,
    path = "/register",
    responses(
        (status = 200, description = "Registration form", content_type = "text/html", body = String)
    ),
    tag = "auth"
)]
pub async fn register_form() -> impl IntoResponse {
    pages::register(None, "")
}

#[utoipa::path(
    post,
    path = "/register",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "User created, redirect to /login"),
        (status = 400, description = "Invalid username or password", content_type = "text/html", body = String),
        (status = 409, description = "Username already taken", content_type = "text/html", body = String)
    ),
    tag = "auth"
)]
#[instrument(skip(pool, payload))]
pub async fn register(
    pool: Extension<SqlitePool>,
    payload: Result<Form<RegisterForm>, FormRejection>,
) -> Response {
    let Ok(Form(form)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            pages::register(Some("Username and password are required"), ""),
        )
            .into_response();
    };

    debug!("form: {:?}", form);

    if !valid_username(&form.username) {
        let message = format!(
            "Username must be 1 to {MAX_USERNAME_LEN} characters without spaces"
        );
        return (
            StatusCode::BAD_REQUEST,
            pages::register(Some(&message), &form.username),
        )
            .into_response();
    }

    if !valid_password(form.password.expose_secret()) {
        return (
            StatusCode::BAD_REQUEST,
            pages::register(Some("Password is required"), &form.username),
        )
            .into_response();
    }

    match UserRepo::create(&pool, &form.username, form.password.expose_secret()).await {
        Ok(CreateOutcome::Created(user)) => {
            info!(user_id = user.id, "user registered");
            Redirect::to("/login").into_response()
        }
        Ok(CreateOutcome::DuplicateUsername) => {
            info!("registration rejected: username already taken");
            (
                StatusCode::CONFLICT,
                pages::register(Some("Username already taken"), &form.username),
            )
                .into_response()
        }
        Err(err) => {
            error!("Error creating user: {err:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
