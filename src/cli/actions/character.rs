use super::{load, Profile};
use crate::{identity::Character, reference::ReferenceData, store::UserStore};
use anyhow::{anyhow, Result};
use serde_json::Value;
use tracing::{debug, info};

#[derive(Debug)]
pub enum Request {
    Add { email: String, character: Character },
    Remove { email: String, name: String },
    Primary { email: String, name: String },
}

/// # Errors
/// Returns an error if the account is missing, the character is rejected by
/// the roster or the reference data, or the store rejects the write.
pub async fn handle<S: UserStore>(
    store: &S,
    reference: &ReferenceData,
    request: Request,
) -> Result<Value> {
    let record = match request {
        Request::Add { email, character } => {
            let character = reference.canonicalize(character)?;
            let mut record = load(store, &email).await?;
            record.add_character(character)?;
            store.save(&mut record).await?;
            info!("character added");
            record
        }
        Request::Remove { email, name } => {
            let mut record = load(store, &email).await?;
            if record.remove_character(&name).is_some() {
                store.save(&mut record).await?;
                info!("character removed");
            } else {
                debug!("no character named {name}, nothing to remove");
            }
            record
        }
        Request::Primary { email, name } => {
            let mut record = load(store, &email).await?;
            record
                .set_primary_character(&name)
                .map_err(|e| anyhow!("cannot set primary character: {e}"))?;
            store.save(&mut record).await?;
            record
        }
    };

    Ok(serde_json::to_value(Profile::from(&record))?)
}
