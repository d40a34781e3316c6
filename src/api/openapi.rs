use super::handlers::{
    admin, auth, dashboard, health, reset_password, root, user_login, user_register,
};
use utoipa::openapi::{InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI spec.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both served
/// and included in the generated `OpenAPI` spec.
pub(crate) fn api_router() -> OpenApiRouter {
    // `routes!` reads #[utoipa::path] to bind HTTP method + path and add the route to OpenAPI.
    let mut router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(root::root))
        .routes(routes!(health::health))
        .routes(routes!(user_login::login_form, user_login::login))
        .routes(routes!(user_register::register_form, user_register::register))
        .routes(routes!(
            reset_password::reset_password_form,
            reset_password::reset_password
        ))
        .routes(routes!(auth::session::logout))
        .routes(routes!(dashboard::user_dashboard))
        .routes(routes!(admin::admin_dashboard))
        .routes(routes!(admin::admin_users))
        .routes(routes!(admin::block_user))
        .routes(routes!(admin::unblock_user))
        .routes(routes!(admin::delete_user));

    let mut pages_tag = Tag::new("pages");
    pages_tag.description = Some("Landing page and user dashboard".to_string());

    let mut auth_tag = Tag::new("auth");
    auth_tag.description = Some("Registration, login and logout".to_string());

    let mut admin_tag = Tag::new("admin");
    admin_tag.description = Some("Account management for admins".to_string());

    let mut health_tag = Tag::new("health");
    health_tag.description = Some("Service and database health".to_string());

    router.get_openapi_mut().tags = Some(vec![pages_tag, auth_tag, admin_tag, health_tag]);

    router
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    let license = env!("CARGO_PKG_LICENSE");
    if !license.is_empty() {
        info.license = Some(License::new(license));
    }

    OpenApiBuilder::new().info(info).build()
}
