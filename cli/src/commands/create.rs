//! CREATE command - Create a note.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, endpoint, make_request, output};

/// Arguments for the create command.
#[derive(Args)]
pub struct CreateArgs {
    /// Identifier for the new note
    pub id: String,

    /// Note text
    pub text: String,

    /// Make the note readable by every authenticated user
    #[arg(long)]
    pub public: bool,
}

/// Request body shared by create and update.
#[derive(Serialize)]
pub(crate) struct NoteBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    pub text: &'a str,
    #[serde(rename = "isPublic", skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// Acknowledgement carrying the affected note's identifier.
#[derive(Debug, Deserialize, Serialize)]
pub struct NoteIdResponse {
    pub id: String,
}

impl HumanReadable for NoteIdResponse {
    fn print_human(&self) {
        println!("{} {}", "Note:".cyan(), self.id);
    }
}

/// Execute the create command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: CreateArgs,
) -> Result<()> {
    let body = NoteBody {
        id: Some(&args.id),
        text: &args.text,
        is_public: Some(args.public),
    };

    let response: NoteIdResponse =
        make_request(client.post(endpoint(base_url, "/api/notes")).json(&body)).await?;

    if human {
        println!("{}", "Note created successfully!".green().bold());
        println!();
    }
    output(&response, human)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_body_wire_format() {
        let body = NoteBody {
            id: Some("n1"),
            text: "hello",
            is_public: Some(true),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "id": "n1", "text": "hello", "isPublic": true })
        );

        let body = NoteBody {
            id: None,
            text: "bye",
            is_public: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "text": "bye" })
        );
    }
}
