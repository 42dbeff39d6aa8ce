//! Authenticated caller extraction from the `Authorization` header.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use notes_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// A caller whose bearer token has been validated.
///
/// Only [`RequestGate::authenticate`](crate::gate::RequestGate::authenticate)
/// constructs this, so holding one means the token check already passed.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user_id: UserId,
}

impl AuthenticatedUser {
    pub(crate) fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// The user the token asserts.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(header::AUTHORIZATION)
            .map(|value| {
                value.to_str().map_err(|_| {
                    ApiError::Unauthorized(
                        "Authorization header contains invalid characters".to_string(),
                    )
                })
            })
            .transpose()?;

        state.gate().authenticate(credential).await
    }
}
