//! Session & Authorization Layer.
//!
//! Login establishes a server-side session keyed by the SHA-256 of a random
//! token; the raw token only lives in the `gatehouse_session` cookie. Every
//! handler resolves the current identity explicitly through
//! [`principal::resolve_identity`] and applies its own access policy.
//!
//! ## Blocked accounts
//!
//! Blocking never rewrites the password hash. A blocked user is rejected at
//! login after the password verifies, their existing sessions are revoked when
//! the block is applied, and any session that still points at a blocked user
//! resolves as anonymous.

pub(crate) mod credentials;
pub(crate) mod principal;
pub(crate) mod session;
mod state;
pub(crate) mod storage;
mod utils;

pub use state::{AuthConfig, AuthState};
