//! Bearer token issuance and validation.
//!
//! Tokens are HS256 JWTs carrying `sub`, `iat`, and `exp`. They are not stored
//! anywhere; a token stays valid until its `exp` passes. Validation depends
//! only on the token, the signing key, and the injected clock.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use notes_core::UserId;
use serde::{Deserialize, Serialize};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// JWT claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID (subject).
    pub sub: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration time (unix timestamp).
    pub exp: i64,
}

/// Why a token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token has expired")]
    Expired,

    #[error("token signature does not verify")]
    BadSignature,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl TokenError {
    /// Short label for log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::Expired => "expired",
            Self::BadSignature => "bad_signature",
            Self::Signing(_) => "signing",
        }
    }
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies bearer tokens with one process-wide secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        // Expiry is checked against `clock`, not the system time the library uses.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
            clock,
        }
    }

    /// Validity window applied to every issued token.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token asserting `user` until `now + ttl`.
    pub fn issue(&self, user: &UserId) -> Result<IssuedToken, TokenError> {
        let now = self.clock.now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: user.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Validate a token against the current time.
    pub fn validate(&self, token: &str) -> Result<UserId, TokenError> {
        self.validate_at(token, self.clock.now())
    }

    /// Validate a token as of `now`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        UserId::parse(&data.claims.sub).map_err(|_| TokenError::Malformed)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const SECRET: &[u8] = b"test_secret_key_0123456789abcdef";

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn service(clock: Arc<ManualClock>) -> TokenService {
        TokenService::new(SECRET, Duration::hours(1), clock)
    }

    fn alice() -> UserId {
        UserId::parse("alice").unwrap()
    }

    #[test]
    fn test_issue_then_validate() {
        let clock = Arc::new(ManualClock::new(start()));
        let tokens = service(clock);
        assert_eq!(tokens.ttl(), Duration::hours(1));

        let issued = tokens.issue(&alice()).unwrap();
        assert_eq!(issued.expires_at, start() + tokens.ttl());
        assert_eq!(tokens.validate(&issued.token).unwrap(), alice());
    }

    #[test]
    fn test_expires_after_window() {
        let clock = Arc::new(ManualClock::new(start()));
        let tokens = service(Arc::clone(&clock));
        let issued = tokens.issue(&alice()).unwrap();

        clock.advance(Duration::minutes(59));
        assert!(tokens.validate(&issued.token).is_ok());

        clock.advance(Duration::minutes(1));
        assert_eq!(tokens.validate(&issued.token), Err(TokenError::Expired));

        clock.advance(Duration::days(1));
        assert_eq!(tokens.validate(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_bad_signature() {
        let clock = Arc::new(ManualClock::new(start()));
        let issued = service(Arc::clone(&clock)).issue(&alice()).unwrap();

        let other = TokenService::new(b"another_secret_0123456789abcdef!", Duration::hours(1), clock);
        assert_eq!(other.validate(&issued.token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_tampered_payload_is_bad_signature() {
        let clock = Arc::new(ManualClock::new(start()));
        let tokens = service(Arc::clone(&clock));
        let issued = tokens.issue(&alice()).unwrap();
        let forged = tokens_for_subject(&tokens, "mallory");

        // Graft mallory's claims onto alice's signature.
        let parts: Vec<&str> = issued.token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert_eq!(tokens.validate(&spliced), Err(TokenError::BadSignature));
    }

    fn tokens_for_subject(tokens: &TokenService, sub: &str) -> String {
        tokens.issue(&UserId::parse(sub).unwrap()).unwrap().token
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tokens = service(Arc::new(ManualClock::new(start())));
        assert_eq!(tokens.validate(""), Err(TokenError::Malformed));
        assert_eq!(tokens.validate("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(tokens.validate("a.b.c"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_missing_subject_is_malformed() {
        let tokens = service(Arc::new(ManualClock::new(start())));
        let claims = serde_json::json!({ "exp": start().timestamp() + 3600 });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(tokens.validate(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_validate_is_pure_in_time() {
        let clock = Arc::new(ManualClock::new(start()));
        let tokens = service(Arc::clone(&clock));
        let issued = tokens.issue(&alice()).unwrap();

        let later = start() + Duration::hours(2);
        assert_eq!(
            tokens.validate_at(&issued.token, later),
            Err(TokenError::Expired)
        );
        // The injected clock is untouched by validate_at.
        assert_eq!(tokens.validate(&issued.token).unwrap(), alice());
    }

    #[test]
    fn test_manual_clock_set() {
        let clock = ManualClock::new(start());
        let later = start() + Duration::days(3);
        clock.set(later);
        assert_eq!(clock.now(), later);
    }
}
