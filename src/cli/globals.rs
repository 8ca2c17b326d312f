use crate::identity::{HashingConfig, DEFAULT_RESET_TTL_SECONDS};
use chrono::Duration;
use url::Url;

#[derive(Clone)]
pub struct GlobalArgs {
    pub dsn: String,
    pub hashing: HashingConfig,
    pub reset_ttl_seconds: i64,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(dsn: String) -> Self {
        Self {
            dsn,
            hashing: HashingConfig::default(),
            reset_ttl_seconds: DEFAULT_RESET_TTL_SECONDS,
        }
    }

    #[must_use]
    pub const fn with_hashing(mut self, hashing: HashingConfig) -> Self {
        self.hashing = hashing;
        self
    }

    #[must_use]
    pub const fn with_reset_ttl_seconds(mut self, seconds: i64) -> Self {
        self.reset_ttl_seconds = seconds;
        self
    }

    /// `None` when the configured lifetime does not fit a `Duration`.
    #[must_use]
    pub fn reset_ttl(&self) -> Option<Duration> {
        Duration::try_seconds(self.reset_ttl_seconds)
    }

    /// DSN with any password masked, safe for logs.
    #[must_use]
    pub fn redacted_dsn(&self) -> String {
        match Url::parse(&self.dsn) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("***"));
                }
                url.to_string()
            }
            Err(_) => "***".to_string(),
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("dsn", &self.redacted_dsn())
            .field("hashing", &self.hashing)
            .field("reset_ttl_seconds", &self.reset_ttl_seconds)
            .finish()
    }
}
