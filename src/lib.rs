//! # Gatehouse (username/password auth and admin console)
//!
//! `gatehouse` lets users register with a username and password, log in, and land
//! on either the admin or the standard dashboard. Admins list, block, unblock and
//! delete accounts.
//!
//! ## Identity Store
//!
//! A single `users` table. Passwords are stored as Argon2id PHC strings; the
//! plaintext never touches the database. `is_admin` is never writable over HTTP,
//! it is granted out-of-band with `gatehouse admin --username <name>`.
//!
//! ## Sessions & Authorization
//!
//! Login issues a random session token in an `HttpOnly` cookie; the database keeps
//! only its SHA-256 hash. Every handler resolves the identity explicitly from the
//! request headers and applies its own policy:
//!
//! - **Public:** `/`, `/login`, `/register`, `/reset_password`.
//! - **Authenticated:** `/user`, `/logout`.
//! - **Admin:** `/admin`, `/admin/users` and the block/unblock/delete actions.
//!   Non-admins are redirected to `/user`.
//!
//! Blocked accounts are rejected at login and their sessions are revoked; the
//! stored password hash is never touched by blocking.

pub mod api;
pub mod cli;
pub mod db;
pub mod identity;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
