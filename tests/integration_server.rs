//! End-to-end tests for the gatehouse HTTP surface.
//!
//! Each test builds the full application (middleware included) on top of a
//! private in-memory `SQLite` database and drives it with `tower::ServiceExt::oneshot`,
//! carrying the session cookie between requests the way a browser would.

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Method, Request, StatusCode,
    },
    response::Response,
    Router,
};
use gatehouse::{
    api::{self, AuthConfig, AuthState},
    db,
    identity::{CreateOutcome, UserRepo},
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::sync::Arc;
use tower::ServiceExt;

const SESSION_COOKIE: &str = "gatehouse_session";

struct TestApp {
    pool: SqlitePool,
    app: Router,
}

impl TestApp {
    async fn new() -> Result<Self> {
        // A single long-lived connection keeps the in-memory database alive.
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;
        db::apply_schema(&pool).await?;

        let auth_state = Arc::new(AuthState::new(AuthConfig::new()));
        let app = api::app(pool.clone(), auth_state);

        Ok(Self { pool, app })
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        form: Option<&str>,
    ) -> Result<Response> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, format!("{SESSION_COOKIE}={cookie}"));
        }
        let body = match form {
            Some(form) => {
                builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form.to_string())
            }
            None => Body::empty(),
        };
        let response = self.app.clone().oneshot(builder.body(body)?).await?;
        Ok(response)
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Result<Response> {
        self.send(Method::GET, uri, cookie, None).await
    }

    async fn post(&self, uri: &str, cookie: Option<&str>, form: &str) -> Result<Response> {
        self.send(Method::POST, uri, cookie, Some(form)).await
    }

    async fn register(&self, username: &str, password: &str) -> Result<Response> {
        self.post(
            "/register",
            None,
            &format!("username={username}&password={password}"),
        )
        .await
    }

    async fn login(&self, username: &str, password: &str) -> Result<Response> {
        self.post(
            "/login",
            None,
            &format!("username={username}&password={password}"),
        )
        .await
    }

    /// Register (through HTTP), log in and return the raw session token.
    async fn signed_in(&self, username: &str, password: &str) -> Result<String> {
        let response = self.register(username, password).await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let response = self.login(username, password).await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_token(&response).context("login did not set a session cookie")
    }

    /// Create an admin out-of-band (the way the `admin` subcommand does) and log in.
    async fn signed_in_admin(&self, username: &str, password: &str) -> Result<String> {
        let outcome = UserRepo::create(&self.pool, username, password).await?;
        assert!(matches!(outcome, CreateOutcome::Created(_)));
        UserRepo::set_admin(&self.pool, username, true)
            .await?
            .context("admin user vanished")?;
        let response = self.login(username, password).await?;
        assert_eq!(location(&response), Some("/admin"));
        session_token(&response).context("login did not set a session cookie")
    }

    async fn user_id(&self, username: &str) -> Result<i64> {
        let user = UserRepo::find_by_username(&self.pool, username)
            .await?
            .context("user not found")?;
        Ok(user.id)
    }
}

fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
}

fn session_token(response: &Response) -> Option<String> {
    let header = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    let pair = header.split(';').next()?;
    let value = pair.strip_prefix(&format!("{SESSION_COOKIE}="))?;
    (!value.is_empty()).then(|| value.to_string())
}

async fn body_text(response: Response) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[tokio::test]
async fn public_pages_render() -> Result<()> {
    let app = TestApp::new().await?;

    for uri in ["/", "/login", "/register", "/reset_password"] {
        let response = app.get(uri, None).await?;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/html"), "GET {uri}: {content_type}");
    }

    let response = app.post("/reset_password", None, "").await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn responses_carry_a_request_id() -> Result<()> {
    let app = TestApp::new().await?;
    let response = app.get("/", None).await?;
    assert!(response.headers().contains_key("x-request-id"));
    Ok(())
}

#[tokio::test]
async fn health_reports_database_ok() -> Result<()> {
    let app = TestApp::new().await?;
    let response = app.get("/health", None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-app"));

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await?)?;
    assert_eq!(json["database"], "ok");
    assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
    Ok(())
}

#[tokio::test]
async fn register_then_login_lands_on_user_dashboard() -> Result<()> {
    let app = TestApp::new().await?;

    let response = app.register("alice", "wonderland").await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    let response = app.login("alice", "wonderland").await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/user"));
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    let token = session_token(&response).context("missing session cookie")?;

    let response = app.get("/user", Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.contains("alice"));
    Ok(())
}

#[tokio::test]
async fn password_is_never_stored_in_plaintext() -> Result<()> {
    let app = TestApp::new().await?;
    app.register("alice", "wonderland").await?;

    let user = UserRepo::find_by_username(&app.pool, "alice")
        .await?
        .context("user not found")?;
    assert_ne!(user.password_hash, "wonderland");
    assert!(user.password_hash.starts_with("$argon2id$"));
    assert!(!user.is_admin);
    assert!(!user.is_blocked);
    Ok(())
}

#[tokio::test]
async fn registration_ignores_role_fields() -> Result<()> {
    let app = TestApp::new().await?;

    let response = app
        .post(
            "/register",
            None,
            "username=eve&password=pw&is_admin=true&is_blocked=true",
        )
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    let eve = UserRepo::find_by_username(&app.pool, "eve")
        .await?
        .context("user not found")?;
    assert!(!eve.is_admin);
    assert!(!eve.is_blocked);

    let response = app.login("eve", "pw").await?;
    assert_eq!(location(&response), Some("/user"));
    Ok(())
}

#[tokio::test]
async fn duplicate_username_is_rejected() -> Result<()> {
    let app = TestApp::new().await?;
    app.register("alice", "wonderland").await?;

    let response = app.register("alice", "looking-glass").await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_text(response).await?.contains("Username already taken"));

    // The original credentials still work.
    let response = app.login("alice", "wonderland").await?;
    assert_eq!(location(&response), Some("/user"));
    Ok(())
}

#[tokio::test]
async fn invalid_registration_input_is_rejected() -> Result<()> {
    let app = TestApp::new().await?;

    let response = app.register("", "secret").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.register("bob", "").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let too_long = "x".repeat(51);
    let response = app.register(&too_long, "secret").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.post("/register", None, "username=bob").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let users = UserRepo::list_all(&app.pool).await?;
    assert!(users.is_empty());
    Ok(())
}

#[tokio::test]
async fn bad_credentials_get_the_same_answer() -> Result<()> {
    let app = TestApp::new().await?;
    app.register("alice", "wonderland").await?;

    let wrong_password = app.login("alice", "nope").await?;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert!(session_token(&wrong_password).is_none());
    let wrong_password = body_text(wrong_password).await?;

    let unknown_user = app.login("mallory", "nope").await?;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let unknown_user = body_text(unknown_user).await?;

    assert!(wrong_password.contains("Invalid credentials"));
    assert!(unknown_user.contains("Invalid credentials"));
    Ok(())
}

#[tokio::test]
async fn login_with_missing_fields_is_a_bad_request() -> Result<()> {
    let app = TestApp::new().await?;
    let response = app.post("/login", None, "username=alice").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn anonymous_requests_are_sent_to_login() -> Result<()> {
    let app = TestApp::new().await?;

    for uri in ["/user", "/admin", "/admin/users", "/logout"] {
        let response = app.get(uri, None).await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "GET {uri}");
        assert_eq!(location(&response), Some("/login"), "GET {uri}");
    }

    let response = app.get("/user", Some("not-a-real-token")).await?;
    assert_eq!(location(&response), Some("/login"));
    Ok(())
}

#[tokio::test]
async fn authenticated_users_skip_the_login_page() -> Result<()> {
    let app = TestApp::new().await?;
    let user = app.signed_in("alice", "wonderland").await?;
    let admin = app.signed_in_admin("root", "hunter2").await?;

    let response = app.get("/login", Some(&user)).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/user"));

    let response = app.get("/login", Some(&admin)).await?;
    assert_eq!(location(&response), Some("/admin"));

    let response = app
        .post("/login", Some(&user), "username=alice&password=wonderland")
        .await?;
    assert_eq!(location(&response), Some("/user"));
    Ok(())
}

#[tokio::test]
async fn standard_users_cannot_reach_the_admin_console() -> Result<()> {
    let app = TestApp::new().await?;
    let alice = app.signed_in("alice", "wonderland").await?;
    app.register("bob", "builder").await?;
    let bob_id = app.user_id("bob").await?;
    app.register("carol", "singer").await?;
    let carol_id = app.user_id("carol").await?;
    UserRepo::set_blocked(&app.pool, carol_id, true).await?;

    for uri in ["/admin", "/admin/users"] {
        let response = app.get(uri, Some(&alice)).await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "GET {uri}");
        assert_eq!(location(&response), Some("/user"), "GET {uri}");
    }

    for (action, target) in [
        ("block_user", bob_id),
        ("delete_user", bob_id),
        ("unblock_user", carol_id),
        ("delete_user", carol_id),
    ] {
        let response = app
            .post(&format!("/admin/{action}/{target}"), Some(&alice), "")
            .await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "POST {action}");
        assert_eq!(location(&response), Some("/user"), "POST {action}");
    }

    let bob = UserRepo::find_by_id(&app.pool, bob_id)
        .await?
        .context("bob was deleted by a non-admin")?;
    assert!(!bob.is_blocked);
    let carol = UserRepo::find_by_id(&app.pool, carol_id)
        .await?
        .context("carol was deleted by a non-admin")?;
    assert!(carol.is_blocked);
    Ok(())
}

#[tokio::test]
async fn admin_lists_users() -> Result<()> {
    let app = TestApp::new().await?;
    let admin = app.signed_in_admin("root", "hunter2").await?;
    app.register("alice", "wonderland").await?;

    let response = app.get("/admin", Some(&admin)).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/admin/users", Some(&admin)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await?;
    assert!(page.contains("alice"));
    assert!(page.contains("root"));

    // Admins can still open the standard dashboard.
    let response = app.get("/user", Some(&admin)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn blocking_revokes_access_and_is_idempotent() -> Result<()> {
    let app = TestApp::new().await?;
    let admin = app.signed_in_admin("root", "hunter2").await?;
    let alice = app.signed_in("alice", "wonderland").await?;
    let alice_id = app.user_id("alice").await?;
    let hash_before = UserRepo::find_by_id(&app.pool, alice_id)
        .await?
        .context("alice missing")?
        .password_hash;

    for _ in 0..2 {
        let response = app
            .post(&format!("/admin/block_user/{alice_id}"), Some(&admin), "")
            .await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/admin/users"));
    }

    let blocked = UserRepo::find_by_id(&app.pool, alice_id)
        .await?
        .context("alice missing")?;
    assert!(blocked.is_blocked);
    assert_eq!(blocked.password_hash, hash_before);

    // The existing session no longer works.
    let response = app.get("/user", Some(&alice)).await?;
    assert_eq!(location(&response), Some("/login"));

    // The correct password is answered with a distinct blocked message.
    let response = app.login("alice", "wonderland").await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(session_token(&response).is_none());
    assert!(body_text(response).await?.contains("Account is blocked"));

    // A wrong password does not reveal the block.
    let response = app.login("alice", "nope").await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    for _ in 0..2 {
        let response = app
            .post(&format!("/admin/unblock_user/{alice_id}"), Some(&admin), "")
            .await?;
        assert_eq!(location(&response), Some("/admin/users"));
    }

    let response = app.login("alice", "wonderland").await?;
    assert_eq!(location(&response), Some("/user"));
    Ok(())
}

#[tokio::test]
async fn deleted_users_disappear_and_repeats_are_noops() -> Result<()> {
    let app = TestApp::new().await?;
    let admin = app.signed_in_admin("root", "hunter2").await?;
    let alice = app.signed_in("alice", "wonderland").await?;
    let alice_id = app.user_id("alice").await?;

    let response = app
        .post(&format!("/admin/delete_user/{alice_id}"), Some(&admin), "")
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin/users"));
    assert!(UserRepo::find_by_id(&app.pool, alice_id).await?.is_none());

    let response = app.get("/user", Some(&alice)).await?;
    assert_eq!(location(&response), Some("/login"));

    let response = app.login("alice", "wonderland").await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    for action in ["delete_user", "block_user", "unblock_user"] {
        let response = app
            .post(&format!("/admin/{action}/{alice_id}"), Some(&admin), "")
            .await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "POST {action}");
        assert_eq!(location(&response), Some("/admin/users"), "POST {action}");
    }

    // The name is free again.
    let response = app.register("alice", "again").await?;
    assert_eq!(location(&response), Some("/login"));
    Ok(())
}

#[tokio::test]
async fn non_numeric_user_id_is_a_bad_request() -> Result<()> {
    let app = TestApp::new().await?;
    let admin = app.signed_in_admin("root", "hunter2").await?;

    let response = app.post("/admin/block_user/abc", Some(&admin), "").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie_of_revoked_session() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.signed_in("alice", "wonderland").await?;
    let alice_id = app.user_id("alice").await?;

    // Blocked directly in storage, so the session row is still there.
    UserRepo::set_blocked(&app.pool, alice_id, true).await?;

    for cookie in [Some(token.as_str()), Some("not-a-real-token"), None] {
        let response = app.get("/logout", cookie).await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/login"));
        let cleared = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(cleared.contains("Max-Age=0"), "cookie {cookie:?}: {cleared}");
    }

    // The blocked user's session row went with the logout.
    UserRepo::set_blocked(&app.pool, alice_id, false).await?;
    let response = app.get("/user", Some(&token)).await?;
    assert_eq!(location(&response), Some("/login"));
    Ok(())
}

#[tokio::test]
async fn logout_ends_the_session() -> Result<()> {
    let app = TestApp::new().await?;
    let token = app.signed_in("alice", "wonderland").await?;

    let response = app.get("/logout", Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
    let cleared = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cleared.contains("Max-Age=0"));

    let response = app.get("/user", Some(&token)).await?;
    assert_eq!(location(&response), Some("/login"));
    Ok(())
}
