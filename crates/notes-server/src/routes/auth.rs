//! Account routes: register, login, API-key exchange.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::token::IssuedToken;

/// Header carrying an API key for `POST /api/token`.
pub const API_KEY_HEADER: &str = "x-api-key";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of register and login requests. Missing fields read as empty and are
/// rejected by the gate.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: String,
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
}

impl TokenResponse {
    fn new(issued: IssuedToken, state: &AppState) -> Self {
        Self {
            token: issued.token,
            expires_in: u64::try_from(state.gate().tokens().ttl().num_seconds())
                .unwrap_or_default(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/register
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(request) = payload?;
    let (user_id, api_key) = state
        .gate()
        .register(&request.user_id, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user_id.to_string(),
            api_key: api_key.into_string(),
        }),
    ))
}

/// POST /api/login
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(request) = payload?;
    let issued = state
        .gate()
        .login(&request.user_id, &request.password)
        .await?;

    Ok(Json(TokenResponse::new(issued, &state)))
}

/// POST /api/token - trade an `X-Api-Key` for a bearer token.
async fn token(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<TokenResponse>> {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    let issued = state.gate().exchange_api_key(api_key).await?;

    Ok(Json(TokenResponse::new(issued, &state)))
}

/// Build account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/token", post(token))
}
