//! Minimal server-rendered pages.

use axum::response::Html;
use std::fmt::Write;

use super::handlers::auth::principal::Identity;
use crate::identity::User;

/// Escape text for HTML element and attribute content.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{} - Gatehouse</title></head>\n<body>\n<h1>{}</h1>\n{body}\n</body>\n</html>\n",
        escape(title),
        escape(title),
    ))
}

fn error_block(error: Option<&str>) -> String {
    error.map_or_else(String::new, |error| {
        format!("<p class=\"error\" role=\"alert\">{}</p>\n", escape(error))
    })
}

fn credentials_form(action: &str, submit: &str, username: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{action}\">\n\
         <label>Username <input name=\"username\" value=\"{}\" required></label>\n\
         <label>Password <input name=\"password\" type=\"password\" required></label>\n\
         <button type=\"submit\">{submit}</button>\n</form>\n",
        escape(username)
    )
}

pub(crate) fn home() -> Html<String> {
    layout(
        "Welcome",
        "<p><a href=\"/login\">Log in</a> or <a href=\"/register\">create an account</a>.</p>",
    )
}

pub(crate) fn login(error: Option<&str>, username: &str) -> Html<String> {
    let body = format!(
        "{}{}<p><a href=\"/register\">Register</a> | <a href=\"/reset_password\">Forgot password?</a></p>",
        error_block(error),
        credentials_form("/login", "Log in", username)
    );
    layout("Log in", &body)
}

pub(crate) fn register(error: Option<&str>, username: &str) -> Html<String> {
    let body = format!(
        "{}{}<p>Already registered? <a href=\"/login\">Log in</a></p>",
        error_block(error),
        credentials_form("/register", "Register", username)
    );
    layout("Register", &body)
}

pub(crate) fn reset_password() -> Html<String> {
    layout(
        "Reset password",
        "<p>Password reset is not available. Contact an administrator.</p>\n<p><a href=\"/login\">Back to login</a></p>",
    )
}

pub(crate) fn user_dashboard(identity: &Identity) -> Html<String> {
    let body = format!(
        "<p>Signed in as <strong>{}</strong>.</p>\n<p><a href=\"/logout\">Log out</a></p>",
        escape(&identity.username)
    );
    layout("Dashboard", &body)
}

pub(crate) fn admin_dashboard(identity: &Identity, users: &[User]) -> Html<String> {
    let mut body = format!(
        "<p>Signed in as <strong>{}</strong> (admin).</p>\n<p>{} registered user(s). <a href=\"/admin/users\">Manage users</a> | <a href=\"/logout\">Log out</a></p>\n<ul>\n",
        escape(&identity.username),
        users.len()
    );
    for user in users {
        let _ = writeln!(body, "<li>{}</li>", escape(&user.username));
    }
    body.push_str("</ul>");
    layout("Admin dashboard", &body)
}

pub(crate) fn admin_users(identity: &Identity, users: &[User]) -> Html<String> {
    let mut body = format!(
        "<p>Signed in as <strong>{}</strong> (admin). <a href=\"/admin\">Dashboard</a> | <a href=\"/logout\">Log out</a></p>\n\
         <table>\n<thead><tr><th>ID</th><th>Username</th><th>Role</th><th>Status</th><th>Actions</th></tr></thead>\n<tbody>\n",
        escape(&identity.username)
    );
    for user in users {
        let role = if user.is_admin { "admin" } else { "user" };
        let (status, toggle) = if user.is_blocked {
            ("blocked", "unblock_user")
        } else {
            ("active", "block_user")
        };
        let toggle_label = if user.is_blocked { "Unblock" } else { "Block" };
        let _ = writeln!(
            body,
            "<tr><td>{id}</td><td>{name}</td><td>{role}</td><td>{status}</td><td>\
             <form method=\"post\" action=\"/admin/{toggle}/{id}\"><button type=\"submit\">{toggle_label}</button></form>\
             <form method=\"post\" action=\"/admin/delete_user/{id}\"><button type=\"submit\">Delete</button></form>\
             </td></tr>",
            id = user.id,
            name = escape(&user.username),
        );
    }
    body.push_str("</tbody>\n</table>");
    layout("Users", &body)
}
