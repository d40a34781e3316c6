use super::crypto;

/// A registered account. `id` is assigned by the database.
#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_blocked: bool,
}

impl User {
    /// Check a candidate password against the stored hash.
    #[must_use]
    pub fn verify_password(&self, candidate: &str) -> bool {
        crypto::verify_password(&self.password_hash, candidate)
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"***")
            .field("is_admin", &self.is_admin)
            .field("is_blocked", &self.is_blocked)
            .finish()
    }
}
