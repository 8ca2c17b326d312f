use thiserror::Error;

/// The hashing primitive or its entropy source failed.
///
/// A wrong password is never reported through this type; verification
/// returns `Ok(false)` for a mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("credential hashing failed: {0}")]
    Hashing(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("a character named {0} is already on the roster")]
    DuplicateCharacterName(String),
    #[error("no character named {0} on the roster")]
    UnknownCharacter(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResetError {
    #[error("no password reset was requested")]
    NotRequested,
    #[error("password reset token has expired")]
    Expired,
    #[error("password reset token is invalid")]
    InvalidToken,
    #[error("password reset lifetime of {0} seconds is out of range")]
    TtlOutOfRange(i64),
    #[error(transparent)]
    Credential(#[from] CredentialError),
}
