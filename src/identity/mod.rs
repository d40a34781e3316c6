//! Identity Store: user records, password hashing and persistence.

pub mod crypto;
pub mod models;
pub mod repo;

pub use models::User;
pub use repo::{CreateOutcome, UserRepo};

use regex::Regex;

/// Maximum username length, in characters.
pub const MAX_USERNAME_LEN: usize = 50;

/// Usernames are case-sensitive, 1 to 50 characters, without whitespace.
pub fn valid_username(username: &str) -> bool {
    Regex::new(r"^\S{1,50}$").is_ok_and(|re| re.is_match(username))
}

/// Any non-empty password is accepted.
pub fn valid_password(password: &str) -> bool {
    !password.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_username_accepts_case_sensitive_names() {
        assert!(valid_username("alice"));
        assert!(valid_username("Alice"));
        assert!(valid_username("a.l-i_c@e"));
    }

    #[test]
    fn valid_username_rejects_whitespace_and_empty() {
        assert!(!valid_username(""));
        assert!(!valid_username("alice smith"));
        assert!(!valid_username(" alice"));
        assert!(!valid_username("alice\n"));
    }

    #[test]
    fn valid_username_enforces_max_len() {
        assert!(valid_username(&"a".repeat(MAX_USERNAME_LEN)));
        assert!(!valid_username(&"a".repeat(MAX_USERNAME_LEN + 1)));
    }

    #[test]
    fn valid_password_requires_content() {
        assert!(valid_password("x"));
        assert!(!valid_password(""));
    }
}
