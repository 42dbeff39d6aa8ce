//! READ command - Read a note.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, make_request, note_url, output};

/// Arguments for the read command.
#[derive(Args)]
pub struct ReadArgs {
    /// Note to read
    pub id: String,
}

/// A note as the server returns it.
#[derive(Debug, Deserialize, Serialize)]
pub struct NoteResponse {
    pub id: String,
    pub text: String,
    pub author: String,
    #[serde(rename = "isPublic")]
    pub is_public: bool,
}

impl NoteResponse {
    pub(crate) fn visibility_label(&self) -> colored::ColoredString {
        if self.is_public {
            "public".green()
        } else {
            "private".yellow()
        }
    }
}

impl HumanReadable for NoteResponse {
    fn print_human(&self) {
        println!("{} {}", self.id.bold(), self.visibility_label());
        println!("  {} {}", "Author:".cyan(), self.author);
        println!();
        println!("{}", self.text);
    }
}

/// Execute the read command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: ReadArgs,
) -> Result<()> {
    let url = note_url(base_url, &args.id)?;

    let response: NoteResponse = make_request(client.get(url)).await?;

    output(&response, human)
}
