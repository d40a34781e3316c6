//! Auth state and configuration.

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_ttl_seconds: i64,
    session_cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_cookie_secure: false,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }
}

/// Process-wide auth state, built once at startup and injected into handlers.
#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}
