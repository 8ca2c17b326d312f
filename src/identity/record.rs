use chrono::{DateTime, Utc};
use regex::Regex;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{
    credential::CredentialHasher,
    error::CredentialError,
    roster::Character,
};

pub const DEFAULT_AVATAR_SIZE: u32 = 200;

const GRAVATAR_BASE_URL: &str = "https://gravatar.com/avatar/";

/// Canonical form of an email used for lookups, uniqueness and avatars.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
#[must_use]
pub fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedProvider {
    pub provider: String,
    pub account_id: String,
}

/// Opaque bearer credential issued by a linked provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    pub kind: String,
}

impl AuthToken {
    #[must_use]
    pub fn new(kind: &str, access_token: &str) -> Self {
        Self {
            access_token: access_token.to_string(),
            kind: kind.to_string(),
        }
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("access_token", &"***")
            .field("kind", &self.kind)
            .finish()
    }
}

/// One registered user: credential, linked providers and character roster.
#[derive(Clone)]
pub struct UserRecord {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) credential_hash: Option<String>,
    pub(crate) password_reset_token: Option<String>,
    pub(crate) password_reset_expires: Option<DateTime<Utc>>,
    pub(crate) linked_providers: Vec<LinkedProvider>,
    pub(crate) tokens: Vec<AuthToken>,
    pub(crate) primary_character: Option<String>,
    pub(crate) characters: Vec<Character>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) version: u64,
}

impl UserRecord {
    /// A record with no credential, e.g. created from an OAuth login.
    #[must_use]
    pub fn new(email: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            credential_hash: None,
            password_reset_token: None,
            password_reset_expires: None,
            linked_providers: Vec::new(),
            tokens: Vec::new(),
            primary_character: None,
            characters: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// A record whose credential is hashed before it is ever persisted.
    ///
    /// # Errors
    /// Returns `CredentialError::Hashing` if hashing fails.
    pub fn signup(
        email: &str,
        raw_password: &SecretString,
        hasher: &CredentialHasher,
    ) -> Result<Self, CredentialError> {
        let mut record = Self::new(email);
        record.set_credential(raw_password, hasher)?;
        Ok(record)
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Store-owned optimistic concurrency counter, 0 until first persisted.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn set_email(&mut self, email: &str) {
        let email = normalize_email(email);
        if email != self.email {
            self.email = email;
            self.touch();
        }
    }

    #[must_use]
    pub const fn has_credential(&self) -> bool {
        self.credential_hash.is_some()
    }

    #[must_use]
    pub fn credential_hash(&self) -> Option<&str> {
        self.credential_hash.as_deref()
    }

    /// Replace the credential with a fresh salted hash of `raw_password`.
    ///
    /// Call this only from code that knows the password changed; every call
    /// re-salts. The record is untouched if hashing fails.
    ///
    /// # Errors
    /// Returns `CredentialError::Hashing` if hashing fails.
    pub fn set_credential(
        &mut self,
        raw_password: &SecretString,
        hasher: &CredentialHasher,
    ) -> Result<(), CredentialError> {
        let hash = hasher.hash(raw_password)?;
        self.credential_hash = Some(hash);
        self.touch();
        Ok(())
    }

    /// [`UserRecord::set_credential`] with the hash computed on the blocking pool.
    ///
    /// # Errors
    /// Returns `CredentialError::Hashing` if hashing fails.
    pub async fn set_credential_async(
        &mut self,
        raw_password: SecretString,
        hasher: &CredentialHasher,
    ) -> Result<(), CredentialError> {
        let hash = hasher.hash_async(raw_password).await?;
        self.credential_hash = Some(hash);
        self.touch();
        Ok(())
    }

    /// Records without a credential never verify.
    ///
    /// # Errors
    /// Returns `CredentialError::Hashing` on primitive failure, never on mismatch.
    pub fn verify_credential(
        &self,
        candidate: &SecretString,
        hasher: &CredentialHasher,
    ) -> Result<bool, CredentialError> {
        match &self.credential_hash {
            Some(stored) => hasher.verify(candidate, stored),
            None => Ok(false),
        }
    }

    /// # Errors
    /// Returns `CredentialError::Hashing` on primitive failure, never on mismatch.
    pub async fn verify_credential_async(
        &self,
        candidate: SecretString,
        hasher: &CredentialHasher,
    ) -> Result<bool, CredentialError> {
        match &self.credential_hash {
            Some(stored) => hasher.verify_async(candidate, stored.clone()).await,
            None => Ok(false),
        }
    }

    #[must_use]
    pub fn credential_needs_rehash(&self, hasher: &CredentialHasher) -> bool {
        self.credential_hash
            .as_deref()
            .is_some_and(|stored| hasher.needs_rehash(stored))
    }

    #[must_use]
    pub fn gravatar_url(&self, size: u32) -> String {
        let email = normalize_email(&self.email);
        if email.is_empty() {
            return format!("{GRAVATAR_BASE_URL}?s={size}&d=retro");
        }

        let digest = Sha256::digest(email.as_bytes());
        format!("{GRAVATAR_BASE_URL}{digest:x}?s={size}&d=retro")
    }

    #[must_use]
    pub fn linked_providers(&self) -> &[LinkedProvider] {
        &self.linked_providers
    }

    /// Linked account id for `provider`.
    #[must_use]
    pub fn provider(&self, provider: &str) -> Option<&str> {
        self.linked_providers
            .iter()
            .find(|linked| linked.provider == provider)
            .map(|linked| linked.account_id.as_str())
    }

    pub fn link_provider(&mut self, provider: &str, account_id: &str) {
        match self
            .linked_providers
            .iter_mut()
            .find(|linked| linked.provider == provider)
        {
            Some(linked) => account_id.clone_into(&mut linked.account_id),
            None => self.linked_providers.push(LinkedProvider {
                provider: provider.to_string(),
                account_id: account_id.to_string(),
            }),
        }
        self.touch();
    }

    /// Drops the provider link and every token it issued.
    pub fn unlink_provider(&mut self, provider: &str) {
        let providers = self.linked_providers.len();
        let tokens = self.tokens.len();

        self.linked_providers
            .retain(|linked| linked.provider != provider);
        self.tokens.retain(|token| token.kind != provider);

        if providers != self.linked_providers.len() || tokens != self.tokens.len() {
            self.touch();
        }
    }

    #[must_use]
    pub fn tokens(&self) -> &[AuthToken] {
        &self.tokens
    }

    pub fn push_token(&mut self, token: AuthToken) {
        self.tokens.push(token);
        self.touch();
    }

    /// First token issued by `kind`.
    #[must_use]
    pub fn token(&self, kind: &str) -> Option<&AuthToken> {
        self.tokens.iter().find(|token| token.kind == kind)
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("credential_hash", &self.credential_hash.as_ref().map(|_| "***"))
            .field(
                "password_reset_token",
                &self.password_reset_token.as_ref().map(|_| "***"),
            )
            .field("password_reset_expires", &self.password_reset_expires)
            .field("linked_providers", &self.linked_providers)
            .field("tokens", &self.tokens)
            .field("primary_character", &self.primary_character)
            .field("characters", &self.characters)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("version", &self.version)
            .finish()
    }
}
