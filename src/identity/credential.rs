//! Argon2id credential hashing.
//!
//! Every hash gets a fresh 16-byte salt from the OS entropy source and is
//! stored as a PHC string, so the cost parameters travel with the hash and
//! older hashes keep verifying after the configured cost is raised.

use argon2::{
    password_hash::{self, SaltString},
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
};
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretString};

use super::error::CredentialError;

/// 64 MiB, 3 passes, 1 lane: roughly 100-200ms on current commodity CPUs.
/// Revisit as hardware gets faster.
pub const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;
pub const DEFAULT_ITERATIONS: u32 = 3;
pub const DEFAULT_PARALLELISM: u32 = 1;

const SALT_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_KIB, DEFAULT_ITERATIONS, DEFAULT_PARALLELISM)
    }
}

impl HashingConfig {
    #[must_use]
    pub const fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    #[must_use]
    pub const fn with_memory_kib(mut self, memory_kib: u32) -> Self {
        self.memory_kib = memory_kib;
        self
    }

    #[must_use]
    pub const fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub const fn with_parallelism(mut self, parallelism: u32) -> Self {
        self.parallelism = parallelism;
        self
    }

    #[must_use]
    pub const fn memory_kib(&self) -> u32 {
        self.memory_kib
    }

    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    #[must_use]
    pub const fn parallelism(&self) -> u32 {
        self.parallelism
    }
}

/// Hashes and verifies credentials with a fixed Argon2id cost.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
    salt_len: usize,
}

impl CredentialHasher {
    /// # Errors
    /// Returns `CredentialError::Hashing` if Argon2 rejects the cost parameters
    /// (for example a memory cost below `8 * parallelism` KiB).
    pub fn new(config: HashingConfig) -> Result<Self, CredentialError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| CredentialError::Hashing(format!("invalid argon2 parameters: {e}")))?;

        Ok(Self {
            params,
            salt_len: SALT_LEN,
        })
    }

    /// A hasher whose salts are too short for Argon2, so every `hash` fails.
    #[cfg(test)]
    pub(crate) fn failing() -> Self {
        Self {
            params: Params::default(),
            salt_len: 4,
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Derive a PHC hash string from `raw` with a fresh salt.
    ///
    /// # Errors
    /// Returns `CredentialError::Hashing` on entropy or primitive failure.
    pub fn hash(&self, raw: &SecretString) -> Result<String, CredentialError> {
        let salt = generate_salt(self.salt_len)?;
        self.argon2()
            .hash_password(raw.expose_secret().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    /// Check `candidate` against a stored PHC string.
    ///
    /// The parameters embedded in `stored` are used, not the configured ones.
    ///
    /// # Errors
    /// Returns `CredentialError::Hashing` if `stored` is not a valid PHC string
    /// or the primitive fails. A mismatch is `Ok(false)`.
    pub fn verify(&self, candidate: &SecretString, stored: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| CredentialError::Hashing(format!("invalid stored hash: {e}")))?;

        match self
            .argon2()
            .verify_password(candidate.expose_secret().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::Hashing(e.to_string())),
        }
    }

    /// True when `stored` was produced with a different algorithm or cost than
    /// the one currently configured. Unparseable hashes always need a rehash.
    #[must_use]
    pub fn needs_rehash(&self, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return true;
        };

        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }

        Params::try_from(&parsed).map_or(true, |params| {
            params.m_cost() != self.params.m_cost()
                || params.t_cost() != self.params.t_cost()
                || params.p_cost() != self.params.p_cost()
        })
    }

    /// [`CredentialHasher::hash`] on the blocking pool.
    ///
    /// # Errors
    /// Returns `CredentialError::Hashing` on primitive failure or if the
    /// blocking task panics.
    pub async fn hash_async(&self, raw: SecretString) -> Result<String, CredentialError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&raw))
            .await
            .map_err(|e| CredentialError::Hashing(format!("hashing task failed: {e}")))?
    }

    /// [`CredentialHasher::verify`] on the blocking pool.
    ///
    /// # Errors
    /// Same as [`CredentialHasher::verify`], plus a panicked blocking task.
    pub async fn verify_async(
        &self,
        candidate: SecretString,
        stored: String,
    ) -> Result<bool, CredentialError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&candidate, &stored))
            .await
            .map_err(|e| CredentialError::Hashing(format!("verification task failed: {e}")))?
    }
}

fn generate_salt(len: usize) -> Result<SaltString, CredentialError> {
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CredentialError::Hashing(format!("entropy source failure: {e}")))?;

    SaltString::encode_b64(&bytes).map_err(|e| CredentialError::Hashing(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cheap() -> CredentialHasher {
        CredentialHasher::new(HashingConfig::new(8, 1, 1)).unwrap()
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn default_config_is_calibrated_for_slow_hashing() {
        let config = HashingConfig::default();
        assert_eq!(config.memory_kib(), 65536);
        assert_eq!(config.iterations(), 3);
        assert_eq!(config.parallelism(), 1);
        assert!(CredentialHasher::new(config).is_ok());
    }

    #[test]
    fn rejects_memory_below_minimum() {
        let err = CredentialHasher::new(HashingConfig::new(1, 1, 1)).unwrap_err();
        assert!(matches!(err, CredentialError::Hashing(_)));
    }

    #[test]
    fn hash_is_argon2id_phc() {
        let hash = cheap().hash(&secret("hunter2")).unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=8,t=1,p=1$"));
        assert!(!hash.contains("hunter2"));
    }

    #[test]
    fn salts_differ_between_calls() {
        let hasher = cheap();
        let first = hasher.hash(&secret("hunter2")).unwrap();
        let second = hasher.hash(&secret("hunter2")).unwrap();
        assert_ne!(first, second);
        assert!(hasher.verify(&secret("hunter2"), &first).unwrap());
        assert!(hasher.verify(&secret("hunter2"), &second).unwrap());
    }

    #[test]
    fn mismatch_is_not_an_error() {
        let hasher = cheap();
        let hash = hasher.hash(&secret("hunter2")).unwrap();
        assert_eq!(hasher.verify(&secret("hunter3"), &hash), Ok(false));
    }

    #[test]
    fn garbage_hash_is_an_error() {
        let result = cheap().verify(&secret("hunter2"), "not-a-phc-string");
        assert!(matches!(result, Err(CredentialError::Hashing(_))));
    }

    #[test]
    fn verify_uses_embedded_parameters() {
        let old = cheap().hash(&secret("hunter2")).unwrap();
        let stronger = CredentialHasher::new(HashingConfig::new(16, 2, 1)).unwrap();
        assert!(stronger.verify(&secret("hunter2"), &old).unwrap());
        assert!(stronger.needs_rehash(&old));
        assert!(!cheap().needs_rehash(&old));
    }

    #[test]
    fn short_salt_fails_hashing() {
        assert!(matches!(
            CredentialHasher::failing().hash(&secret("hunter2")),
            Err(CredentialError::Hashing(_))
        ));
    }

    #[test]
    fn unparseable_hash_needs_rehash() {
        assert!(cheap().needs_rehash("plaintext"));
    }

    #[tokio::test]
    async fn async_round_trip() {
        let hasher = cheap();
        let hash = hasher.hash_async(secret("hunter2")).await.unwrap();
        assert!(hasher
            .verify_async(secret("hunter2"), hash.clone())
            .await
            .unwrap());
        assert!(!hasher.verify_async(secret("nope"), hash).await.unwrap());
    }
}
