//! # LFG identity
//!
//! `lfg-identity` is the identity core of the LFG community site. It owns the
//! user record: the Argon2id credential, linked external-login providers and
//! their tokens, and the roster of game characters with one designated
//! "primary" character used for display.
//!
//! ## Records
//!
//! [`identity::UserRecord`] is a plain owned value. Every mutation is an
//! explicit in-memory state transition; nothing is persisted until the caller
//! hands the record to a [`store::UserStore`].
//!
//! - **Credentials:** the raw password is only ever seen by
//!   [`identity::UserRecord::set_credential`], which stores a salted Argon2id
//!   PHC string. Hashing is deliberately slow, so async callers should use the
//!   `_async` variants which run on the blocking pool.
//! - **Primary character:** resolved by name on every read. A pointer to a
//!   character that no longer exists resolves to "no primary character".
//!
//! ## Persistence
//!
//! Stores serialize writes per record with an optimistic `version`
//! compare-and-swap. A save against a stale version fails with
//! [`store::StoreError::Conflict`] and the caller reloads.

pub mod cli;
pub mod identity;
pub mod reference;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
