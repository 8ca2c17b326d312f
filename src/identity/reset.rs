//! Password reset tokens.
//!
//! The raw token is returned once to be mailed to the user; the record keeps
//! only its SHA-256 digest and an expiry.

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use secrecy::SecretString;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::{
    credential::CredentialHasher,
    error::{CredentialError, ResetError},
    record::UserRecord,
};

pub const DEFAULT_RESET_TTL_SECONDS: i64 = 60 * 60;
/// One year.
pub const MAX_RESET_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

const RESET_TOKEN_BYTES: usize = 32;

fn hash_reset_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.trim().as_bytes()))
}

fn generate_reset_token() -> Result<String, CredentialError> {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CredentialError::Hashing(format!("entropy source failure: {e}")))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

impl UserRecord {
    /// Start a reset, replacing any pending one. Returns the raw token.
    ///
    /// # Errors
    /// - `ResetError::TtlOutOfRange` if `now + ttl` is not a representable time
    /// - `ResetError::Credential` if the entropy source fails
    pub fn issue_password_reset(
        &mut self,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, ResetError> {
        let expires = now
            .checked_add_signed(ttl)
            .ok_or(ResetError::TtlOutOfRange(ttl.num_seconds()))?;
        let token = generate_reset_token()?;
        self.password_reset_token = Some(hash_reset_token(&token));
        self.password_reset_expires = Some(expires);
        self.touch();
        Ok(token)
    }

    #[must_use]
    pub fn reset_pending(&self, now: DateTime<Utc>) -> bool {
        self.password_reset_token.is_some()
            && self
                .password_reset_expires
                .is_some_and(|expires| now < expires)
    }

    #[must_use]
    pub const fn password_reset_expires(&self) -> Option<DateTime<Utc>> {
        self.password_reset_expires
    }

    /// Drop a reset whose expiry has passed. Returns true if one was cleared.
    pub fn clear_expired_reset(&mut self, now: DateTime<Utc>) -> bool {
        if self.password_reset_token.is_none() || self.reset_pending(now) {
            return false;
        }
        self.clear_reset();
        true
    }

    fn clear_reset(&mut self) {
        self.password_reset_token = None;
        self.password_reset_expires = None;
        self.touch();
    }

    /// Check `token` against the pending reset. An expired reset is cleared.
    fn check_reset_token(&mut self, token: &str, now: DateTime<Utc>) -> Result<(), ResetError> {
        let Some(stored) = self.password_reset_token.as_deref() else {
            return Err(ResetError::NotRequested);
        };

        let matches: bool = hash_reset_token(token)
            .as_bytes()
            .ct_eq(stored.as_bytes())
            .into();
        if !matches {
            return Err(ResetError::InvalidToken);
        }

        if !self.reset_pending(now) {
            self.clear_reset();
            return Err(ResetError::Expired);
        }

        Ok(())
    }

    /// Consume a reset token and set a new credential.
    ///
    /// # Errors
    /// - `ResetError::NotRequested` if no reset is pending
    /// - `ResetError::Expired` if the token expired (the reset is cleared)
    /// - `ResetError::InvalidToken` on a wrong token
    /// - `ResetError::Credential` if hashing fails (the reset stays pending)
    pub fn reset_credential(
        &mut self,
        token: &str,
        new_password: &SecretString,
        hasher: &CredentialHasher,
        now: DateTime<Utc>,
    ) -> Result<(), ResetError> {
        self.check_reset_token(token, now)?;
        self.set_credential(new_password, hasher)?;
        self.clear_reset();
        Ok(())
    }

    /// [`UserRecord::reset_credential`] with the hash computed on the blocking pool.
    ///
    /// # Errors
    /// Same as [`UserRecord::reset_credential`].
    pub async fn reset_credential_async(
        &mut self,
        token: &str,
        new_password: SecretString,
        hasher: &CredentialHasher,
        now: DateTime<Utc>,
    ) -> Result<(), ResetError> {
        self.check_reset_token(token, now)?;
        self.set_credential_async(new_password, hasher).await?;
        self.clear_reset();
        Ok(())
    }
}
