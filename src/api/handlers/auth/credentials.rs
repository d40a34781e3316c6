//! Username/password verification.

use anyhow::Result;
use once_cell::sync::Lazy;
use sqlx::SqlitePool;

use crate::identity::{crypto, User, UserRepo};

/// Hash verified against when the username is unknown, so both failure paths
/// cost one Argon2 run.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| crypto::hash_password("gatehouse-dummy-password").ok());

#[derive(Debug)]
pub(crate) enum LoginOutcome {
    Authenticated(User),
    /// Unknown username or wrong password; callers must not tell them apart.
    InvalidCredentials,
    /// Correct password for a blocked account.
    Blocked,
}

pub(crate) async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<LoginOutcome> {
    let Some(user) = UserRepo::find_by_username(pool, username).await? else {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            let _ = crypto::verify_password(dummy, password);
        }
        return Ok(LoginOutcome::InvalidCredentials);
    };

    if !user.verify_password(password) {
        return Ok(LoginOutcome::InvalidCredentials);
    }

    if user.is_blocked {
        return Ok(LoginOutcome::Blocked);
    }

    Ok(LoginOutcome::Authenticated(user))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::db::test_pool::memory_pool;
    use crate::identity::CreateOutcome;

    async fn seed(pool: &SqlitePool) -> User {
        let CreateOutcome::Created(user) = UserRepo::create(pool, "alice", "wonderland")
            .await
            .unwrap()
        else {
            panic!("duplicate");
        };
        user
    }

    #[tokio::test]
    async fn correct_password_authenticates() {
        let pool = memory_pool().await;
        let alice = seed(&pool).await;

        let outcome = authenticate(&pool, "alice", "wonderland").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::Authenticated(user) if user.id == alice.id));
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let pool = memory_pool().await;
        seed(&pool).await;

        let wrong = authenticate(&pool, "alice", "nope").await.unwrap();
        let unknown = authenticate(&pool, "mallory", "wonderland").await.unwrap();
        assert!(matches!(wrong, LoginOutcome::InvalidCredentials));
        assert!(matches!(unknown, LoginOutcome::InvalidCredentials));
    }

    #[tokio::test]
    async fn blocked_user_is_rejected_only_with_correct_password() {
        let pool = memory_pool().await;
        let mut alice = seed(&pool).await;
        alice.is_blocked = true;
        UserRepo::update(&pool, &alice).await.unwrap();

        let blocked = authenticate(&pool, "alice", "wonderland").await.unwrap();
        assert!(matches!(blocked, LoginOutcome::Blocked));

        let wrong = authenticate(&pool, "alice", "nope").await.unwrap();
        assert!(matches!(wrong, LoginOutcome::InvalidCredentials));
    }

    #[test]
    fn dummy_hash_is_available() {
        assert!(DUMMY_HASH.is_some());
    }
}
