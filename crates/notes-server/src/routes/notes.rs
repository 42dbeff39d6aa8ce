//! Note routes.
//!
//! - POST /api/notes - Create a note owned by the caller
//! - GET /api/notes - List notes the caller may read
//! - GET /api/notes/{id} - Read a note
//! - PUT /api/notes/{id} - Replace a note's text and visibility (author only)
//! - DELETE /api/notes/{id} - Delete a note (author only)
//!
//! Handlers take [`AuthenticatedUser`] first, so authentication runs before
//! the path or body is looked at.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use notes_core::{Note, NoteId, Visibility, input::parse_flag};
use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /api/notes.
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub id: String,
    pub text: String,
    #[serde(rename = "isPublic", default, deserialize_with = "deserialize_flag")]
    pub is_public: bool,
}

/// Request body for PUT /api/notes/{id}. Omitting `isPublic` keeps the
/// note's current visibility.
#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub text: String,
    #[serde(
        rename = "isPublic",
        default,
        deserialize_with = "deserialize_optional_flag"
    )]
    pub is_public: Option<bool>,
}

/// A note as returned to callers.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteResponse {
    pub id: String,
    pub text: String,
    pub author: String,
    #[serde(rename = "isPublic")]
    pub is_public: bool,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            is_public: note.is_public(),
            id: note.id.to_string(),
            text: note.text,
            author: note.author.to_string(),
        }
    }
}

/// Acknowledgement for create, update, and delete.
#[derive(Debug, Serialize)]
pub struct NoteIdResponse {
    pub id: String,
}

/// Accept `true`/`false` or a form-style string for `isPublic`.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Text(value) => parse_flag(&value),
    })
}

fn deserialize_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "deserialize_flag")] bool);

    Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(value)| value))
}

/// Parse a note ID taken from the URL path.
///
/// Unlike body fields, path segments are matched exactly: surrounding
/// whitespace is rejected rather than trimmed.
fn path_note_id(path: Result<Path<String>, PathRejection>) -> ApiResult<NoteId> {
    let Path(raw) = path?;
    if raw.trim() != raw {
        return Err(ApiError::BadRequest(
            "id must not have leading or trailing whitespace".to_string(),
        ));
    }
    Ok(NoteId::parse(&raw)?)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/notes
///
/// - 201 Created: `{ "id": "..." }`
/// - 400 Bad Request: malformed body or identifier
/// - 401 Unauthorized: missing or invalid token
/// - 409 Conflict: identifier already taken
async fn create_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<NoteIdResponse>)> {
    let Json(request) = payload?;
    let id = NoteId::parse(&request.id)?;

    let note = state
        .gate()
        .create_note(
            &user,
            id,
            &request.text,
            Visibility::from_public_flag(request.is_public),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(NoteIdResponse {
            id: note.id.to_string(),
        }),
    ))
}

/// GET /api/notes
async fn list_notes(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<NoteResponse>>> {
    let notes = state.gate().list_notes(&user).await;
    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

/// GET /api/notes/{id}
///
/// - 200 OK: `{ "id", "text", "author", "isPublic" }`
/// - 403 Forbidden: private note of another author
/// - 404 Not Found
async fn read_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<NoteResponse>> {
    let id = path_note_id(path)?;
    let note = state.gate().read_note(&user, &id).await?;
    Ok(Json(note.into()))
}

/// PUT /api/notes/{id}
async fn update_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> ApiResult<Json<NoteIdResponse>> {
    let id = path_note_id(path)?;
    let Json(request) = payload?;

    let note = state
        .gate()
        .update_note(
            &user,
            &id,
            &request.text,
            request.is_public.map(Visibility::from_public_flag),
        )
        .await?;

    Ok(Json(NoteIdResponse {
        id: note.id.to_string(),
    }))
}

/// DELETE /api/notes/{id}
async fn delete_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<NoteIdResponse>> {
    let id = path_note_id(path)?;
    state.gate().delete_note(&user, &id).await?;
    Ok(Json(NoteIdResponse { id: id.to_string() }))
}

/// Build note routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route(
            "/api/notes/{id}",
            get(read_note).put(update_note).delete(delete_note),
        )
}
