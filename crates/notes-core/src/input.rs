//! Input normalization applied before anything reaches a store.

use thiserror::Error;

/// Maximum identifier length in characters.
pub const MAX_ID_LEN: usize = 128;

/// Maximum note body length in bytes, measured before sanitizing.
pub const MAX_NOTE_LEN: usize = 64 * 1024;

/// Rejected caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{0} contains a forbidden character")]
    ForbiddenCharacter(&'static str),
}

/// Validate a user or note identifier, returning the trimmed value.
///
/// Identifiers appear in URL paths, so `/` and control characters are
/// rejected.
pub fn validate_identifier(field: &'static str, raw: &str) -> Result<String, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty(field));
    }
    if trimmed.chars().count() > MAX_ID_LEN {
        return Err(InputError::TooLong {
            field,
            max: MAX_ID_LEN,
        });
    }
    if trimmed.chars().any(|c| c == '/' || c.is_control()) {
        return Err(InputError::ForbiddenCharacter(field));
    }
    Ok(trimmed.to_string())
}

/// Validate a note body's size. Empty bodies are allowed.
pub fn validate_text(text: &str) -> Result<(), InputError> {
    if text.len() > MAX_NOTE_LEN {
        return Err(InputError::TooLong {
            field: "text",
            max: MAX_NOTE_LEN,
        });
    }
    Ok(())
}

/// Escape HTML-significant characters so stored text is inert when rendered.
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

/// Interpret a form-style boolean. Only `"true"` (any case) is true.
pub fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}
