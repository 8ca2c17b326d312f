use super::{load, Profile};
use crate::{
    identity::{normalize_email, valid_email, AuthToken, CredentialHasher, ResetError, UserRecord},
    store::UserStore,
};
use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

#[derive(Debug)]
pub enum Request {
    Signup {
        email: String,
        password: Option<SecretString>,
    },
    Login {
        email: String,
        password: SecretString,
    },
    Password {
        email: String,
        password: SecretString,
    },
    SetEmail {
        email: String,
        new_email: String,
    },
    Delete {
        email: String,
    },
    Show {
        email: String,
    },
    Link {
        email: String,
        provider: String,
        account_id: String,
        access_token: Option<SecretString>,
    },
    Unlink {
        email: String,
        provider: String,
    },
    ResetRequest {
        email: String,
    },
    Reset {
        email: String,
        token: SecretString,
        password: SecretString,
    },
}

fn profile(record: &UserRecord) -> Result<Value> {
    Ok(serde_json::to_value(Profile::from(record))?)
}

/// # Errors
/// Returns an error if the account is missing, validation fails, hashing
/// fails, or the store rejects the write.
pub async fn handle<S: UserStore>(
    store: &S,
    hasher: &CredentialHasher,
    reset_ttl: Duration,
    request: Request,
) -> Result<Value> {
    match request {
        Request::Signup { email, password } => signup(store, hasher, &email, password).await,
        Request::Login { email, password } => login(store, hasher, &email, password).await,
        Request::Password { email, password } => {
            let mut record = load(store, &email).await?;
            record.set_credential_async(password, hasher).await?;
            store.save(&mut record).await?;
            info!("password changed");
            profile(&record)
        }
        Request::SetEmail { email, new_email } => {
            let new_email = normalize_email(&new_email);
            if !valid_email(&new_email) {
                return Err(anyhow!("invalid email address: {new_email}"));
            }
            let mut record = load(store, &email).await?;
            record.set_email(&new_email);
            store.save(&mut record).await?;
            profile(&record)
        }
        Request::Delete { email } => {
            store.delete(&email).await?;
            warn!("account deleted");
            Ok(json!({ "email": normalize_email(&email), "deleted": true }))
        }
        Request::Show { email } => profile(&load(store, &email).await?),
        Request::Link {
            email,
            provider,
            account_id,
            access_token,
        } => {
            let mut record = load(store, &email).await?;
            record.link_provider(&provider, &account_id);
            if let Some(token) = access_token {
                record.push_token(AuthToken::new(&provider, token.expose_secret()));
            }
            store.save(&mut record).await?;
            profile(&record)
        }
        Request::Unlink { email, provider } => {
            let mut record = load(store, &email).await?;
            record.unlink_provider(&provider);
            store.save(&mut record).await?;
            profile(&record)
        }
        Request::ResetRequest { email } => {
            let mut record = load(store, &email).await?;
            let now = Utc::now();
            let token = record.issue_password_reset(reset_ttl, now)?;
            store.save(&mut record).await?;
            info!("password reset issued");
            Ok(json!({
                "email": record.email(),
                "token": token,
                "expires": record.password_reset_expires(),
            }))
        }
        Request::Reset {
            email,
            token,
            password,
        } => {
            let mut record = load(store, &email).await?;
            match record
                .reset_credential_async(token.expose_secret(), password, hasher, Utc::now())
                .await
            {
                Ok(()) => {
                    store.save(&mut record).await?;
                    info!("password reset completed");
                    profile(&record)
                }
                Err(ResetError::Expired) => {
                    // persist the cleared token
                    store.save(&mut record).await?;
                    Err(ResetError::Expired.into())
                }
                Err(err) => Err(err.into()),
            }
        }
    }
}

#[instrument(skip(store, hasher, password))]
async fn signup<S: UserStore>(
    store: &S,
    hasher: &CredentialHasher,
    email: &str,
    password: Option<SecretString>,
) -> Result<Value> {
    let email = normalize_email(email);
    if !valid_email(&email) {
        return Err(anyhow!("invalid email address: {email}"));
    }

    let mut record = UserRecord::new(&email);
    if let Some(password) = password {
        record
            .set_credential_async(password, hasher)
            .await
            .context("Failed to hash password")?;
    }

    store.create(&mut record).await?;
    info!(id = %record.id(), "account created");

    profile(&record)
}

/// Verify the password; on success, re-hash if the stored cost is outdated.
#[instrument(skip(store, hasher, password))]
async fn login<S: UserStore>(
    store: &S,
    hasher: &CredentialHasher,
    email: &str,
    password: SecretString,
) -> Result<Value> {
    let Some(mut record) = store.find_by_email(email).await? else {
        // same Argon2 cost as a real verification
        hasher.hash_async(password).await?;
        return Ok(json!({ "email": normalize_email(email), "authenticated": false }));
    };

    let candidate = SecretString::from(password.expose_secret().to_owned());
    let authenticated = record.verify_credential_async(candidate, hasher).await?;

    if authenticated && record.credential_needs_rehash(hasher) {
        record.set_credential_async(password, hasher).await?;
        store.save(&mut record).await?;
        info!("credential re-hashed with current parameters");
    }

    Ok(json!({ "email": record.email(), "authenticated": authenticated }))
}
