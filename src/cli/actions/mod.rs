pub mod account;
pub mod character;

use crate::{
    cli::globals::GlobalArgs,
    identity::{Character, CredentialHasher, LinkedProvider, UserRecord, DEFAULT_AVATAR_SIZE},
    reference::ReferenceData,
    store::{PgUserStore, UserStore},
};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug)]
pub enum Action {
    Migrate,
    Account(account::Request),
    Character(character::Request),
}

/// What presentation layers show for an account.
#[derive(Debug, Serialize)]
pub struct Profile<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub gravatar: String,
    pub class_icon: String,
    pub primary_character: Option<&'a Character>,
    pub characters: &'a [Character],
    pub providers: &'a [LinkedProvider],
    pub has_password: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a UserRecord> for Profile<'a> {
    fn from(record: &'a UserRecord) -> Self {
        Self {
            id: record.id(),
            email: record.email(),
            gravatar: record.gravatar_url(DEFAULT_AVATAR_SIZE),
            class_icon: record.class_icon(),
            primary_character: record.primary_character(),
            characters: record.characters(),
            providers: record.linked_providers(),
            has_password: record.has_credential(),
            created_at: record.created_at(),
            updated_at: record.updated_at(),
        }
    }
}

/// Load a record or fail with a readable error.
///
/// # Errors
/// Returns an error if the store fails or no account has `email`.
pub async fn load<S: UserStore>(store: &S, email: &str) -> Result<UserRecord> {
    store
        .find_by_email(email)
        .await
        .context("Failed to load account")?
        .ok_or_else(|| anyhow!("no account registered for {email}"))
}

/// Execute an action against the configured database and print its result.
///
/// # Errors
/// Returns an error if the database is unreachable or the action fails.
pub async fn execute(globals: &GlobalArgs, action: Action) -> Result<()> {
    debug!("Global args: {:?}", globals);

    let store = PgUserStore::connect(&globals.dsn)
        .await
        .context("Failed to connect to database")?;

    let output = match action {
        Action::Migrate => {
            store.migrate().await.context("Failed to apply schema")?;
            info!("schema applied");
            serde_json::json!({ "migrated": true })
        }
        Action::Account(request) => {
            let hasher =
                CredentialHasher::new(globals.hashing).context("Invalid Argon2 configuration")?;
            let reset_ttl = globals
                .reset_ttl()
                .context("password reset lifetime is out of range")?;
            account::handle(&store, &hasher, reset_ttl, request).await?
        }
        Action::Character(request) => {
            let reference = ReferenceData::classic();
            character::handle(&store, &reference, request).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
