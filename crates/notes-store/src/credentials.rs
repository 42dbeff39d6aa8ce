//! Credential store: registered users, their hashed secrets, and API keys.
//!
//! Secrets are kept as Argon2 PHC strings and API keys as BLAKE3 digests, so
//! nothing outside this module can recover either. The only access offered
//! is an equality test.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use notes_core::UserId;
use rand::RngCore;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};

/// Random bytes per API key (256 bits).
pub const API_KEY_BYTES: usize = 32;

/// An API key issued at registration.
///
/// The plaintext exists only in the value handed back to the registering
/// caller; `Debug` does not print it.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    fn generate() -> Self {
        let mut bytes = [0u8; API_KEY_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// The URL-safe key material to hand to the user.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(..)")
    }
}

fn api_key_digest(key: &str) -> [u8; 32] {
    *blake3::hash(key.as_bytes()).as_bytes()
}

fn hash_secret(secret: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Hashing(e.to_string()))
}

/// Hash verified for unknown users so a miss costs as much as a wrong secret.
static UNKNOWN_USER_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_secret("unknown-user-placeholder").ok());

#[cfg(test)]
thread_local! {
    static VERIFY_CALLS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

fn verify_secret(secret: &str, hash: &str) -> bool {
    #[cfg(test)]
    VERIFY_CALLS.with(|calls| calls.set(calls.get() + 1));

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Stored secret hash is unreadable");
            false
        }
    }
}

struct UserRecord {
    secret_hash: String,
}

#[derive(Default)]
struct Users {
    by_id: HashMap<UserId, UserRecord>,
    by_api_key: HashMap<[u8; 32], UserId>,
}

/// Registered users, guarded by a single lock.
///
/// Hashing runs outside the lock; the duplicate check and insert happen under
/// one write guard, so concurrent registrations of the same ID produce exactly
/// one success.
#[derive(Default)]
pub struct CredentialStore {
    users: RwLock<Users>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new user and issue their API key.
    pub async fn register(&self, user_id: UserId, secret: &str) -> StoreResult<ApiKey> {
        // Skip the hashing cost for IDs that are obviously taken.
        if self.exists(&user_id).await {
            return Err(StoreError::DuplicateUser(user_id));
        }

        let secret_hash = hash_secret(secret)?;
        let api_key = ApiKey::generate();
        let digest = api_key_digest(api_key.expose());

        let mut users = self.users.write().await;
        if users.by_id.contains_key(&user_id) {
            return Err(StoreError::DuplicateUser(user_id));
        }
        users.by_api_key.insert(digest, user_id.clone());
        users.by_id.insert(user_id.clone(), UserRecord { secret_hash });
        drop(users);

        tracing::debug!(user_id = %user_id, "Stored credentials");
        Ok(api_key)
    }

    /// Check a secret against the stored one. Unknown users verify as `false`
    /// after running the same Argon2 check against a placeholder hash.
    pub async fn verify(&self, user_id: &UserId, secret: &str) -> bool {
        let hash = {
            let users = self.users.read().await;
            users
                .by_id
                .get(user_id)
                .map(|record| record.secret_hash.clone())
        };

        match hash {
            Some(hash) => verify_secret(secret, &hash),
            None => {
                if let Some(placeholder) = UNKNOWN_USER_HASH.as_deref() {
                    verify_secret(secret, placeholder);
                }
                false
            }
        }
    }

    pub async fn exists(&self, user_id: &UserId) -> bool {
        self.users.read().await.by_id.contains_key(user_id)
    }

    /// Resolve the owner of an API key, if any.
    pub async fn authenticate_api_key(&self, key: &str) -> Option<UserId> {
        let digest = api_key_digest(key);
        self.users.read().await.by_api_key.get(&digest).cloned()
    }

    /// Number of registered users.
    pub async fn len(&self) -> usize {
        self.users.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    #[tokio::test]
    async fn test_register_then_verify() {
        let store = CredentialStore::new();
        store.register(user("alice"), "s3cret").await.unwrap();

        assert!(store.exists(&user("alice")).await);
        assert!(store.verify(&user("alice"), "s3cret").await);
        assert!(!store.verify(&user("alice"), "wrong").await);
    }

    #[tokio::test]
    async fn test_verify_unknown_user_is_false() {
        let store = CredentialStore::new();
        assert!(!store.verify(&user("ghost"), "anything").await);
        assert!(!store.exists(&user("ghost")).await);
    }

    fn verify_calls() -> usize {
        VERIFY_CALLS.with(|calls| calls.get())
    }

    #[tokio::test]
    async fn test_unknown_user_still_runs_verifier() {
        let store = CredentialStore::new();
        store.register(user("alice"), "pw").await.unwrap();

        let before = verify_calls();
        assert!(!store.verify(&user("alice"), "wrong").await);
        assert_eq!(verify_calls(), before + 1);

        assert!(!store.verify(&user("ghost"), "wrong").await);
        assert_eq!(verify_calls(), before + 2);

        // The placeholder's own secret does not log anyone in.
        assert!(!store.verify(&user("ghost"), "unknown-user-placeholder").await);
    }

    #[tokio::test]
    async fn test_second_register_conflicts() {
        let store = CredentialStore::new();
        store.register(user("alice"), "one").await.unwrap();

        let err = store.register(user("alice"), "two").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUser(ref id) if id.as_str() == "alice"));
        // The original secret is untouched.
        assert!(store.verify(&user("alice"), "one").await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_register_single_winner() {
        let store = Arc::new(CredentialStore::new());

        let a = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.register(user("racer"), "a").await }
        });
        let b = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.register(user("racer"), "b").await }
        });

        let results = [a.await.unwrap(), b.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(StoreError::DuplicateUser(_)))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_api_key_shape() {
        let store = CredentialStore::new();
        let key = store.register(user("alice"), "pw").await.unwrap();

        // 32 bytes, unpadded URL-safe base64.
        assert_eq!(key.expose().len(), 43);
        assert!(key
            .expose()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(format!("{:?}", key), "ApiKey(..)");
    }

    #[tokio::test]
    async fn test_api_keys_are_unique() {
        let store = CredentialStore::new();
        let a = store.register(user("a"), "pw").await.unwrap();
        let b = store.register(user("b"), "pw").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_authenticate_api_key() {
        let store = CredentialStore::new();
        let key = store.register(user("alice"), "pw").await.unwrap();

        assert_eq!(
            store.authenticate_api_key(key.expose()).await,
            Some(user("alice"))
        );
        assert_eq!(store.authenticate_api_key("not-a-key").await, None);
    }
}
