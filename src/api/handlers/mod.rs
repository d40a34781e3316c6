//! Route handlers.
//!
//! Each handler resolves the request identity itself and applies the policy of
//! its route: public, any authenticated identity, or authenticated admin.

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod reset_password;
pub mod root;
pub mod user_login;
pub mod user_register;
