#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use lfg_identity::{
    identity::{
        AuthToken, Character, CredentialHasher, HashingConfig, ResetError, RosterError, UserRecord,
    },
    reference::ReferenceData,
    store::{MemoryStore, StoreError, UserStore},
};
use secrecy::SecretString;

fn hasher() -> CredentialHasher {
    CredentialHasher::new(HashingConfig::new(8, 1, 1)).unwrap()
}

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

#[tokio::test]
async fn signup_roster_and_login() {
    let store = MemoryStore::new();
    let hasher = hasher();
    let reference = ReferenceData::classic();

    let mut record = UserRecord::signup(" Sylvanas@Undercity.GG ", &secret("banshee"), &hasher)
        .unwrap();
    store.create(&mut record).await.unwrap();
    assert_eq!(record.email(), "sylvanas@undercity.gg");
    assert_eq!(record.class_icon(), "/images/profileicons/egg.png");

    let mut record = store
        .find_by_email("SYLVANAS@undercity.gg")
        .await
        .unwrap()
        .unwrap();

    for (name, class) in [("Sylvanas", "Hunter"), ("Nathanos", "warrior")] {
        let character = Character::new("gehennas", name, "horde", class, "dps", 60);
        match reference.canonicalize(character) {
            Ok(character) => record.add_character(character).unwrap(),
            Err(err) => assert_eq!(err.to_string(), "unknown class: Hunter"),
        }
    }
    assert_eq!(record.characters().len(), 1);
    assert_eq!(record.characters()[0].realm, "Gehennas");

    record.set_primary_character("Nathanos").unwrap();
    assert_eq!(
        record.set_primary_character("Arthas"),
        Err(RosterError::UnknownCharacter("Arthas".to_string()))
    );
    assert_eq!(record.primary_character_name(), Some("Nathanos"));
    store.save(&mut record).await.unwrap();

    let stored = store.find_by_email("sylvanas@undercity.gg").await.unwrap().unwrap();
    assert_eq!(stored.class_icon(), "/images/profileicons/warrior.png");
    assert!(stored.verify_credential(&secret("banshee"), &hasher).unwrap());
    assert!(!stored.verify_credential(&secret("Banshee"), &hasher).unwrap());
}

#[tokio::test]
async fn oauth_account_links_providers_without_password() {
    let store = MemoryStore::new();
    let hasher = hasher();

    let mut record = UserRecord::new("anduin@stormwind.gg");
    record.link_provider("facebook", "1001");
    record.push_token(AuthToken::new("facebook", "fb-access"));
    store.create(&mut record).await.unwrap();

    let mut record = store.find_by_email("anduin@stormwind.gg").await.unwrap().unwrap();
    assert!(!record.has_credential());
    assert!(!record.verify_credential(&secret(""), &hasher).unwrap());
    assert_eq!(record.provider("facebook"), Some("1001"));

    record.link_provider("facebook", "2002");
    record.link_provider("google", "g-1");
    record.unlink_provider("facebook");
    store.save(&mut record).await.unwrap();

    let record = store.find_by_email("anduin@stormwind.gg").await.unwrap().unwrap();
    assert_eq!(record.provider("facebook"), None);
    assert_eq!(record.provider("google"), Some("g-1"));
    assert!(record.token("facebook").is_none());
}

#[tokio::test]
async fn password_reset_round() {
    let store = MemoryStore::new();
    let hasher = hasher();
    let now = Utc::now();

    let mut record = UserRecord::signup("varian@stormwind.gg", &secret("old"), &hasher).unwrap();
    store.create(&mut record).await.unwrap();

    let token = record.issue_password_reset(Duration::minutes(30), now).unwrap();
    store.save(&mut record).await.unwrap();

    let mut record = store.find_by_email("varian@stormwind.gg").await.unwrap().unwrap();
    assert!(record.reset_pending(now));
    assert_eq!(
        record.reset_credential("wrong", &secret("new"), &hasher, now),
        Err(ResetError::InvalidToken)
    );
    record
        .reset_credential(&token, &secret("new"), &hasher, now + Duration::minutes(5))
        .unwrap();
    store.save(&mut record).await.unwrap();

    let record = store.find_by_email("varian@stormwind.gg").await.unwrap().unwrap();
    assert!(!record.reset_pending(now));
    assert!(record.verify_credential(&secret("new"), &hasher).unwrap());
    assert!(!record.verify_credential(&secret("old"), &hasher).unwrap());
}

#[tokio::test]
async fn stale_copy_cannot_overwrite_newer_write() {
    let store = MemoryStore::new();

    let mut record = UserRecord::new("garrosh@orgrimmar.gg");
    store.create(&mut record).await.unwrap();

    let mut first = store.find_by_email("garrosh@orgrimmar.gg").await.unwrap().unwrap();
    let mut second = first.clone();

    first
        .add_character(Character::new("Firemaw", "Garrosh", "horde", "warrior", "tank", 60))
        .unwrap();
    store.save(&mut first).await.unwrap();

    second
        .add_character(Character::new("Firemaw", "Grom", "horde", "warrior", "dps", 60))
        .unwrap();
    assert!(matches!(
        store.save(&mut second).await,
        Err(StoreError::Conflict { expected: 1, .. })
    ));

    let stored = store.find_by_email("garrosh@orgrimmar.gg").await.unwrap().unwrap();
    assert_eq!(stored.characters().len(), 1);
    assert_eq!(stored.version(), 2);
}

#[tokio::test]
async fn deleted_account_frees_email() {
    let store = MemoryStore::new();

    let mut record = UserRecord::new("illidan@blacktemple.gg");
    store.create(&mut record).await.unwrap();

    let mut duplicate = UserRecord::new("Illidan@BlackTemple.gg");
    assert!(matches!(
        store.create(&mut duplicate).await,
        Err(StoreError::EmailTaken(_))
    ));

    store.delete("illidan@blacktemple.gg").await.unwrap();
    assert!(matches!(
        store.delete("illidan@blacktemple.gg").await,
        Err(StoreError::NotFound(_))
    ));
    store.create(&mut duplicate).await.unwrap();
    assert_eq!(store.len().await, 1);
}
