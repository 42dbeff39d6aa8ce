//! Request gate: the single path from an inbound call to the stores.
//!
//! Every note operation moves through the same stages, in this order:
//!
//! 1. **Authenticate**: the bearer token is validated and the caller resolved
//!    (`authenticate` → [`AuthenticatedUser`]).
//! 2. **Resolve**: the target note is read; a missing note is `NotFound`
//!    before any policy runs, so authorization status never leaks for notes
//!    that do not exist.
//! 3. **Authorize**: the access policy is evaluated on that snapshot;
//!    denial is `Forbidden`.
//! 4. **Apply**: the store operation runs in its own critical section. If the
//!    note vanished since stage 2, the store's `NotFound` is passed on as an
//!    ordinary `NotFound`.
//!
//! This is also the only place store and token errors become [`ApiError`]s.

use std::sync::Arc;

use notes_core::{Note, NoteId, UserId, Visibility, can_modify, can_read, input};
use notes_store::{ApiKey, CredentialStore, NoteStore, StoreError};

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::token::{IssuedToken, TokenError, TokenService};

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Copy)]
enum Action {
    Read,
    Modify,
}

impl Action {
    fn permitted(self, user: &UserId, note: &Note) -> bool {
        match self {
            Self::Read => can_read(user, note),
            Self::Modify => can_modify(user, note),
        }
    }
}

/// Composes token validation, the access policy, and the stores.
#[derive(Debug)]
pub struct RequestGate {
    users: Arc<CredentialStore>,
    notes: Arc<NoteStore>,
    tokens: Arc<TokenService>,
    require_known_subject: bool,
}

impl RequestGate {
    pub fn new(
        users: Arc<CredentialStore>,
        notes: Arc<NoteStore>,
        tokens: Arc<TokenService>,
        require_known_subject: bool,
    ) -> Self {
        Self {
            users,
            notes,
            tokens,
            require_known_subject,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Register a user and return their API key.
    pub async fn register(&self, user_id: &str, secret: &str) -> ApiResult<(UserId, ApiKey)> {
        let user_id = UserId::parse(user_id)?;
        if secret.is_empty() {
            return Err(ApiError::BadRequest("password must not be empty".to_string()));
        }

        let api_key = self
            .users
            .register(user_id.clone(), secret)
            .await
            .map_err(translate)?;

        tracing::info!(user_id = %user_id, "User registered");
        Ok((user_id, api_key))
    }

    /// Exchange a user ID and secret for a bearer token.
    pub async fn login(&self, user_id: &str, secret: &str) -> ApiResult<IssuedToken> {
        if user_id.trim().is_empty() || secret.is_empty() {
            return Err(ApiError::BadRequest(
                "user_id and password are required".to_string(),
            ));
        }

        let invalid = || ApiError::Unauthorized("Invalid user ID or password".to_string());
        let user_id = UserId::parse(user_id).map_err(|_| invalid())?;
        if !self.users.verify(&user_id, secret).await {
            tracing::info!(user_id = %user_id, "Login rejected");
            return Err(invalid());
        }

        let issued = self.issue(&user_id)?;
        tracing::info!(user_id = %user_id, "User logged in");
        Ok(issued)
    }

    /// Exchange an API key for a bearer token.
    pub async fn exchange_api_key(&self, api_key: Option<&str>) -> ApiResult<IssuedToken> {
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Missing API key".to_string()))?;

        let user_id = self
            .users
            .authenticate_api_key(api_key)
            .await
            .ok_or_else(|| {
                tracing::info!("API key rejected");
                ApiError::Unauthorized("Invalid API key".to_string())
            })?;

        let issued = self.issue(&user_id)?;
        tracing::info!(user_id = %user_id, "Token issued for API key");
        Ok(issued)
    }

    fn issue(&self, user_id: &UserId) -> ApiResult<IssuedToken> {
        self.tokens
            .issue(user_id)
            .map_err(|e| ApiError::Internal(e.to_string()))
    }

    // ========================================================================
    // Stage 1: authenticate
    // ========================================================================

    /// Validate the credential from an `Authorization` header value.
    ///
    /// Every failure is the same `Unauthorized` to the caller; the precise
    /// reason only goes to the log.
    pub async fn authenticate(&self, credential: Option<&str>) -> ApiResult<AuthenticatedUser> {
        let credential = credential.ok_or_else(|| {
            ApiError::Unauthorized("Missing Authorization header".to_string())
        })?;
        let token = credential
            .strip_prefix(BEARER_PREFIX)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ApiError::Unauthorized("Authorization header must be Bearer <token>".to_string())
            })?;

        let rejected = || ApiError::Unauthorized("Invalid or expired token".to_string());

        let user_id = self.tokens.validate(token).map_err(|e| {
            match e {
                TokenError::BadSignature => {
                    tracing::warn!(reason = e.reason(), "Bearer token rejected")
                }
                _ => tracing::debug!(reason = e.reason(), "Bearer token rejected"),
            }
            rejected()
        })?;

        if self.require_known_subject && !self.users.exists(&user_id).await {
            tracing::warn!(
                user_id = %user_id,
                reason = "unknown_subject",
                "Bearer token rejected"
            );
            return Err(rejected());
        }

        Ok(AuthenticatedUser::new(user_id))
    }

    // ========================================================================
    // Stages 2-4: resolve, authorize, apply
    // ========================================================================

    /// Create a note owned by the caller.
    pub async fn create_note(
        &self,
        user: &AuthenticatedUser,
        id: NoteId,
        text: &str,
        visibility: Visibility,
    ) -> ApiResult<Note> {
        let text = normalize_text(text)?;
        let note = self
            .notes
            .create(id, user.user_id().clone(), text, visibility)
            .await
            .map_err(translate)?;

        tracing::info!(
            note_id = %note.id,
            user_id = %note.author,
            visibility = %note.visibility,
            "Note created"
        );
        Ok(note)
    }

    pub async fn read_note(&self, user: &AuthenticatedUser, id: &NoteId) -> ApiResult<Note> {
        let note = self.resolve(id).await?;
        authorize(user, &note, Action::Read)?;
        Ok(note)
    }

    /// Replace the text of a note the caller wrote. Visibility changes only
    /// when `visibility` is given.
    pub async fn update_note(
        &self,
        user: &AuthenticatedUser,
        id: &NoteId,
        text: &str,
        visibility: Option<Visibility>,
    ) -> ApiResult<Note> {
        let current = self.resolve(id).await?;
        authorize(user, &current, Action::Modify)?;

        let text = normalize_text(text)?;
        let note = self
            .notes
            .update_owned(id, user.user_id(), text, visibility)
            .await
            .map_err(translate)?;

        tracing::info!(note_id = %note.id, visibility = %note.visibility, "Note updated");
        Ok(note)
    }

    pub async fn delete_note(&self, user: &AuthenticatedUser, id: &NoteId) -> ApiResult<()> {
        let current = self.resolve(id).await?;
        authorize(user, &current, Action::Modify)?;

        self.notes
            .delete_owned(id, user.user_id())
            .await
            .map_err(translate)?;

        tracing::info!(note_id = %id, "Note deleted");
        Ok(())
    }

    /// Every note the caller may read, ordered by ID.
    pub async fn list_notes(&self, user: &AuthenticatedUser) -> Vec<Note> {
        let user_id = user.user_id().clone();
        let listing = self.notes.list(move |note| can_read(&user_id, note)).await;
        let notes: Vec<Note> = listing.iter().cloned().collect();

        tracing::debug!(user_id = %user.user_id(), count = notes.len(), "Listed notes");
        notes
    }

    async fn resolve(&self, id: &NoteId) -> ApiResult<Note> {
        self.notes.read(id).await.map_err(translate)
    }
}

fn authorize(user: &AuthenticatedUser, note: &Note, action: Action) -> ApiResult<()> {
    if action.permitted(user.user_id(), note) {
        return Ok(());
    }
    tracing::info!(
        user_id = %user.user_id(),
        note_id = %note.id,
        action = ?action,
        "Access denied"
    );
    Err(match action {
        Action::Read => ApiError::Forbidden("Note is private".to_string()),
        Action::Modify => ApiError::Forbidden("Only the author can modify a note".to_string()),
    })
}

fn normalize_text(text: &str) -> ApiResult<String> {
    input::validate_text(text)?;
    Ok(input::sanitize_text(text))
}

fn translate(e: StoreError) -> ApiError {
    match e {
        StoreError::DuplicateUser(id) => ApiError::Conflict(format!("User {} already exists", id)),
        StoreError::DuplicateNote(id) => ApiError::Conflict(format!("Note {} already exists", id)),
        StoreError::NoteNotFound(id) => ApiError::NotFound(format!("Note {} not found", id)),
        StoreError::Hashing(message) => ApiError::Internal(message),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::token::ManualClock;

    const SECRET: &[u8] = b"gate_test_secret_0123456789abcdef";

    struct Fixture {
        gate: RequestGate,
        clock: Arc<ManualClock>,
    }

    impl Fixture {
        fn new(require_known_subject: bool) -> Self {
            let clock = Arc::new(ManualClock::new(
                Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            ));
            let tokens = TokenService::new(SECRET, Duration::hours(1), clock.clone());
            let gate = RequestGate::new(
                Arc::new(CredentialStore::new()),
                Arc::new(NoteStore::new()),
                Arc::new(tokens),
                require_known_subject,
            );
            Self { gate, clock }
        }

        async fn user(&self, name: &str) -> AuthenticatedUser {
            self.gate.register(name, "pw").await.unwrap();
            let issued = self.gate.login(name, "pw").await.unwrap();
            self.gate
                .authenticate(Some(format!("Bearer {}", issued.token).as_str()))
                .await
                .unwrap()
        }
    }

    fn id(raw: &str) -> NoteId {
        NoteId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_private_note_scenario() {
        let fx = Fixture::new(true);
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;

        fx.gate
            .create_note(&alice, id("n1"), "hello", Visibility::Private)
            .await
            .unwrap();

        let err = fx.gate.read_note(&bob, &id("n1")).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert_eq!(fx.gate.read_note(&alice, &id("n1")).await.unwrap().text, "hello");

        let err = fx
            .gate
            .update_note(&bob, &id("n1"), "bye", Some(Visibility::Public))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        fx.gate
            .update_note(&alice, &id("n1"), "bye", Some(Visibility::Public))
            .await
            .unwrap();
        let note = fx.gate.read_note(&bob, &id("n1")).await.unwrap();
        assert_eq!(note.text, "bye");
        assert_eq!(note.author.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_text_only_update_keeps_visibility() {
        let fx = Fixture::new(true);
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        fx.gate
            .create_note(&alice, id("p"), "x", Visibility::Public)
            .await
            .unwrap();

        let note = fx.gate.update_note(&alice, &id("p"), "y", None).await.unwrap();
        assert!(note.is_public());
        assert_eq!(fx.gate.read_note(&bob, &id("p")).await.unwrap().text, "y");
    }

    #[tokio::test]
    async fn test_missing_note_is_not_found_before_policy() {
        let fx = Fixture::new(true);
        let bob = fx.user("bob").await;

        for err in [
            fx.gate.read_note(&bob, &id("ghost")).await.unwrap_err(),
            fx.gate
                .update_note(&bob, &id("ghost"), "x", Some(Visibility::Public))
                .await
                .unwrap_err(),
            fx.gate.delete_note(&bob, &id("ghost")).await.unwrap_err(),
        ] {
            assert!(matches!(err, ApiError::NotFound(_)), "got {err:?}");
        }
    }

    #[tokio::test]
    async fn test_delete_requires_author_and_is_not_idempotent() {
        let fx = Fixture::new(true);
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        fx.gate
            .create_note(&alice, id("n1"), "x", Visibility::Public)
            .await
            .unwrap();

        let err = fx.gate.delete_note(&bob, &id("n1")).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        fx.gate.delete_note(&alice, &id("n1")).await.unwrap();
        let err = fx.gate.delete_note(&alice, &id("n1")).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_conflict_and_sanitizing() {
        let fx = Fixture::new(true);
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;

        let note = fx
            .gate
            .create_note(&alice, id("n2"), "<b>hi</b>", Visibility::Private)
            .await
            .unwrap();
        assert_eq!(note.text, "&lt;b&gt;hi&lt;/b&gt;");

        let err = fx
            .gate
            .create_note(&bob, id("n2"), "mine", Visibility::Public)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(fx.gate.read_note(&alice, &id("n2")).await.unwrap().author.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_oversized_text_is_bad_request() {
        let fx = Fixture::new(true);
        let alice = fx.user("alice").await;
        let text = "a".repeat(input::MAX_NOTE_LEN + 1);

        let err = fx
            .gate
            .create_note(&alice, id("big"), &text, Visibility::Private)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_list_filters_by_policy() {
        let fx = Fixture::new(true);
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;

        for (note, visibility) in [
            ("a-private", Visibility::Private),
            ("a-public", Visibility::Public),
        ] {
            fx.gate
                .create_note(&alice, id(note), "x", visibility)
                .await
                .unwrap();
        }
        fx.gate
            .create_note(&bob, id("b-private"), "x", Visibility::Private)
            .await
            .unwrap();

        let ids = |notes: Vec<Note>| -> Vec<String> {
            notes.into_iter().map(|n| n.id.to_string()).collect()
        };
        assert_eq!(
            ids(fx.gate.list_notes(&alice).await),
            vec!["a-private", "a-public"]
        );
        assert_eq!(
            ids(fx.gate.list_notes(&bob).await),
            vec!["a-public", "b-private"]
        );
    }

    #[tokio::test]
    async fn test_authenticate_rejects_bad_credentials() {
        let fx = Fixture::new(true);
        fx.user("alice").await;

        for credential in [
            None,
            Some("Basic abc"),
            Some("Bearer "),
            Some("Bearer not.a.token"),
            Some("bearer whatever"),
        ] {
            let err = fx.gate.authenticate(credential).await.unwrap_err();
            assert!(matches!(err, ApiError::Unauthorized(_)), "{credential:?}");
        }
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let fx = Fixture::new(true);
        fx.gate.register("alice", "pw").await.unwrap();
        let issued = fx.gate.login("alice", "pw").await.unwrap();
        let header = format!("Bearer {}", issued.token);

        assert!(fx.gate.authenticate(Some(header.as_str())).await.is_ok());
        fx.clock.advance(Duration::hours(1) + Duration::seconds(1));
        let err = fx.gate.authenticate(Some(header.as_str())).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_unknown_subject() {
        let strict = Fixture::new(true);
        let token = strict
            .gate
            .tokens()
            .issue(&UserId::parse("nobody").unwrap())
            .unwrap()
            .token;
        let header = format!("Bearer {}", token);
        assert!(matches!(
            strict.gate.authenticate(Some(header.as_str())).await,
            Err(ApiError::Unauthorized(_))
        ));

        let lenient = Fixture::new(false);
        let token = lenient
            .gate
            .tokens()
            .issue(&UserId::parse("nobody").unwrap())
            .unwrap()
            .token;
        let user = lenient
            .gate
            .authenticate(Some(format!("Bearer {}", token).as_str()))
            .await
            .unwrap();
        assert_eq!(user.user_id().as_str(), "nobody");
    }

    #[tokio::test]
    async fn test_register_and_login_outcomes() {
        let fx = Fixture::new(true);
        let (user_id, api_key) = fx.gate.register("alice", "pw").await.unwrap();
        assert_eq!(user_id.as_str(), "alice");

        assert!(matches!(
            fx.gate.register("alice", "other").await,
            Err(ApiError::Conflict(_))
        ));
        assert!(matches!(
            fx.gate.register("", "pw").await,
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            fx.gate.register("carol", "").await,
            Err(ApiError::BadRequest(_))
        ));

        assert!(matches!(
            fx.gate.login("alice", "wrong").await,
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            fx.gate.login("nobody", "pw").await,
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            fx.gate.login("alice", "").await,
            Err(ApiError::BadRequest(_))
        ));

        let issued = fx.gate.exchange_api_key(Some(api_key.expose())).await.unwrap();
        assert_eq!(fx.gate.tokens().validate(&issued.token).unwrap(), user_id);
        assert!(matches!(
            fx.gate.exchange_api_key(Some("bogus")).await,
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            fx.gate.exchange_api_key(None).await,
            Err(ApiError::Unauthorized(_))
        ));
    }
}
