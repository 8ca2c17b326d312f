pub mod credential;
pub mod error;
pub mod record;
pub mod reset;
pub mod roster;

pub use credential::{CredentialHasher, HashingConfig};
pub use error::{CredentialError, ResetError, RosterError};
pub use record::{
    normalize_email, valid_email, AuthToken, LinkedProvider, UserRecord, DEFAULT_AVATAR_SIZE,
};
pub use reset::{DEFAULT_RESET_TTL_SECONDS, MAX_RESET_TTL_SECONDS};
pub use roster::Character;
