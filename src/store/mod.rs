//! Persistence for user records.
//!
//! Every store enforces email uniqueness and serializes writes per record with
//! an optimistic version check: `save` only succeeds if the stored version is
//! the one the record was loaded with.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgUserStore;

use thiserror::Error;

use crate::identity::UserRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user {0} not found")]
    NotFound(String),
    #[error("email {0} is already registered")]
    EmailTaken(String),
    #[error("user {email} was modified concurrently (loaded version {expected})")]
    Conflict { email: String, expected: u64 },
    #[error("stored record is invalid: {0}")]
    Corrupt(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[allow(async_fn_in_trait)]
pub trait UserStore {
    /// Persist a new record and set its version to 1.
    ///
    /// # Errors
    /// Returns `StoreError::EmailTaken` if the email is already registered.
    async fn create(&self, record: &mut UserRecord) -> Result<(), StoreError>;

    /// # Errors
    /// Returns an error if the backend fails.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Write back a loaded record and bump its version.
    ///
    /// # Errors
    /// Returns `StoreError::Conflict` if the record changed since it was loaded,
    /// `StoreError::NotFound` if it was deleted, and `StoreError::EmailTaken`
    /// if its new email belongs to another record.
    async fn save(&self, record: &mut UserRecord) -> Result<(), StoreError>;

    /// Delete the account. Terminal; nothing is kept.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if no record has that email.
    async fn delete(&self, email: &str) -> Result<(), StoreError>;
}
