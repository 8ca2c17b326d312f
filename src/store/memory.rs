use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{StoreError, UserStore};
use crate::identity::{normalize_email, UserRecord};

/// In-process store keyed by record id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Uuid, UserRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn email_owner(records: &HashMap<Uuid, UserRecord>, email: &str) -> Option<Uuid> {
    records
        .values()
        .find(|record| record.email == email)
        .map(|record| record.id)
}

impl UserStore for MemoryStore {
    #[instrument(skip(self, record), fields(email = %record.email()))]
    async fn create(&self, record: &mut UserRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;

        if email_owner(&records, &record.email).is_some() {
            return Err(StoreError::EmailTaken(record.email.clone()));
        }

        record.version = 1;
        records.insert(record.id, record.clone());
        debug!(id = %record.id, "created user record");

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let email = normalize_email(email);
        let records = self.records.read().await;
        Ok(email_owner(&records, &email).and_then(|id| records.get(&id).cloned()))
    }

    #[instrument(skip(self, record), fields(email = %record.email(), version = record.version()))]
    async fn save(&self, record: &mut UserRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;

        let stored_version = records
            .get(&record.id)
            .map(|stored| stored.version)
            .ok_or_else(|| StoreError::NotFound(record.email.clone()))?;

        if stored_version != record.version {
            return Err(StoreError::Conflict {
                email: record.email.clone(),
                expected: record.version,
            });
        }

        if email_owner(&records, &record.email).is_some_and(|owner| owner != record.id) {
            return Err(StoreError::EmailTaken(record.email.clone()));
        }

        record.version += 1;
        records.insert(record.id, record.clone());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, email: &str) -> Result<(), StoreError> {
        let email = normalize_email(email);
        let mut records = self.records.write().await;

        let id = email_owner(&records, &email).ok_or_else(|| StoreError::NotFound(email.clone()))?;
        records.remove(&id);
        debug!(%id, "deleted user record");

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::identity::Character;

    #[tokio::test]
    async fn create_assigns_first_version() {
        let store = MemoryStore::new();
        let mut record = UserRecord::new("a@b.com");
        store.create(&mut record).await.unwrap();

        assert_eq!(record.version(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn email_is_unique() {
        let store = MemoryStore::new();
        store.create(&mut UserRecord::new("a@b.com")).await.unwrap();

        let err = store
            .create(&mut UserRecord::new(" A@B.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken(email) if email == "a@b.com"));
    }

    #[tokio::test]
    async fn find_normalizes_lookup() {
        let store = MemoryStore::new();
        store.create(&mut UserRecord::new("a@b.com")).await.unwrap();

        assert!(store.find_by_email("  A@b.COM ").await.unwrap().is_some());
        assert!(store.find_by_email("c@d.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stale_save_conflicts() {
        let store = MemoryStore::new();
        store.create(&mut UserRecord::new("a@b.com")).await.unwrap();

        let mut first = store.find_by_email("a@b.com").await.unwrap().unwrap();
        let mut second = store.find_by_email("a@b.com").await.unwrap().unwrap();

        first
            .add_character(Character::new("Firemaw", "Thrall", "horde", "shaman", "healer", 60))
            .unwrap();
        store.save(&mut first).await.unwrap();
        assert_eq!(first.version(), 2);

        second.link_provider("facebook", "123");
        let err = store.save(&mut second).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { expected: 1, .. }));

        let stored = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(stored.characters().len(), 1);
        assert!(stored.linked_providers().is_empty());
    }

    #[tokio::test]
    async fn email_change_cannot_steal_address() {
        let store = MemoryStore::new();
        store.create(&mut UserRecord::new("a@b.com")).await.unwrap();
        store.create(&mut UserRecord::new("c@d.com")).await.unwrap();

        let mut record = store.find_by_email("c@d.com").await.unwrap().unwrap();
        record.set_email("a@b.com");
        assert!(matches!(
            store.save(&mut record).await,
            Err(StoreError::EmailTaken(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_terminal() {
        let store = MemoryStore::new();
        store.create(&mut UserRecord::new("a@b.com")).await.unwrap();
        let mut loaded = store.find_by_email("a@b.com").await.unwrap().unwrap();

        store.delete("a@b.com").await.unwrap();
        assert!(store.is_empty().await);
        assert!(matches!(
            store.save(&mut loaded).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("a@b.com").await,
            Err(StoreError::NotFound(_))
        ));
    }
}
