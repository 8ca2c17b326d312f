//! PostgreSQL store. Roster, providers and tokens are JSONB columns on the
//! `users` row; see `sql/schema.sql`.

use sqlx::{
    postgres::{PgPool, PgPoolOptions, PgRow},
    types::Json,
    Row,
};
use std::time::Duration;
use tracing::{debug, instrument, Instrument};

use super::{StoreError, UserStore};
use crate::identity::{normalize_email, AuthToken, Character, LinkedProvider, UserRecord};

pub const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

const SELECT_USER: &str = r"
    SELECT id, email, credential_hash, password_reset_token, password_reset_expires,
           linked_providers, tokens, primary_character, characters,
           created_at, updated_at, version
    FROM users
    WHERE email = $1
";

fn db_span(operation: &'static str, statement: &'static str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn version_to_db(version: u64) -> Result<i64, StoreError> {
    i64::try_from(version).map_err(|_| StoreError::Corrupt(format!("version {version} overflows")))
}

fn record_from_row(row: &PgRow) -> Result<UserRecord, StoreError> {
    let version: i64 = row.try_get("version")?;
    let linked_providers: Json<Vec<LinkedProvider>> = row.try_get("linked_providers")?;
    let tokens: Json<Vec<AuthToken>> = row.try_get("tokens")?;
    let characters: Json<Vec<Character>> = row.try_get("characters")?;

    Ok(UserRecord {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        credential_hash: row.try_get("credential_hash")?,
        password_reset_token: row.try_get("password_reset_token")?,
        password_reset_expires: row.try_get("password_reset_expires")?,
        linked_providers: linked_providers.0,
        tokens: tokens.0,
        primary_character: row.try_get("primary_character")?,
        characters: characters.0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        version: u64::try_from(version)
            .map_err(|_| StoreError::Corrupt(format!("negative version {version}")))?,
    })
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    /// Returns `StoreError::Database` if the pool cannot connect.
    pub async fn connect(dsn: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await?;

        Ok(Self::new(pool))
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `users` table if it does not exist.
    ///
    /// # Errors
    /// Returns `StoreError::Database` if the statements fail.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .instrument(db_span("CREATE", "sql/schema.sql"))
            .await?;
        Ok(())
    }
}

impl UserStore for PgUserStore {
    #[instrument(skip(self, record), fields(email = %record.email()))]
    async fn create(&self, record: &mut UserRecord) -> Result<(), StoreError> {
        let query = r"
            INSERT INTO users
                (id, email, credential_hash, password_reset_token, password_reset_expires,
                 linked_providers, tokens, primary_character, characters,
                 created_at, updated_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 1)
        ";
        let result = sqlx::query(query)
            .bind(record.id)
            .bind(&record.email)
            .bind(&record.credential_hash)
            .bind(&record.password_reset_token)
            .bind(record.password_reset_expires)
            .bind(Json(&record.linked_providers))
            .bind(Json(&record.tokens))
            .bind(&record.primary_character)
            .bind(Json(&record.characters))
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .instrument(db_span("INSERT", query))
            .await;

        match result {
            Ok(_) => {
                record.version = 1;
                debug!(id = %record.id, "created user record");
                Ok(())
            }
            Err(err) if is_unique_violation(&err) => Err(StoreError::EmailTaken(record.email.clone())),
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let email = normalize_email(email);
        let row = sqlx::query(SELECT_USER)
            .bind(&email)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", SELECT_USER))
            .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    #[instrument(skip(self, record), fields(email = %record.email(), version = record.version()))]
    async fn save(&self, record: &mut UserRecord) -> Result<(), StoreError> {
        let query = r"
            UPDATE users SET
                email = $2,
                credential_hash = $3,
                password_reset_token = $4,
                password_reset_expires = $5,
                linked_providers = $6,
                tokens = $7,
                primary_character = $8,
                characters = $9,
                updated_at = $10,
                version = version + 1
            WHERE id = $1 AND version = $11
            RETURNING version
        ";
        let result = sqlx::query(query)
            .bind(record.id)
            .bind(&record.email)
            .bind(&record.credential_hash)
            .bind(&record.password_reset_token)
            .bind(record.password_reset_expires)
            .bind(Json(&record.linked_providers))
            .bind(Json(&record.tokens))
            .bind(&record.primary_character)
            .bind(Json(&record.characters))
            .bind(record.updated_at)
            .bind(version_to_db(record.version)?)
            .fetch_optional(&self.pool)
            .instrument(db_span("UPDATE", query))
            .await;

        let row = match result {
            Ok(row) => row,
            Err(err) if is_unique_violation(&err) => {
                return Err(StoreError::EmailTaken(record.email.clone()))
            }
            Err(err) => return Err(err.into()),
        };

        if let Some(row) = row {
            let version: i64 = row.try_get("version")?;
            record.version = u64::try_from(version)
                .map_err(|_| StoreError::Corrupt(format!("negative version {version}")))?;
            return Ok(());
        }

        // No row matched: either the record is gone or someone saved first.
        let exists_query = "SELECT 1 FROM users WHERE id = $1";
        let exists = sqlx::query(exists_query)
            .bind(record.id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", exists_query))
            .await?
            .is_some();

        if exists {
            Err(StoreError::Conflict {
                email: record.email.clone(),
                expected: record.version,
            })
        } else {
            Err(StoreError::NotFound(record.email.clone()))
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, email: &str) -> Result<(), StoreError> {
        let email = normalize_email(email);
        let query = "DELETE FROM users WHERE email = $1";
        let result = sqlx::query(query)
            .bind(&email)
            .execute(&self.pool)
            .instrument(db_span("DELETE", query))
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(email));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_defines_users_table() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS users"));
        assert!(SCHEMA_SQL.contains("email TEXT NOT NULL UNIQUE"));
    }

    #[test]
    fn version_bounds() {
        assert_eq!(version_to_db(7).ok(), Some(7));
        assert!(matches!(
            version_to_db(u64::MAX),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
