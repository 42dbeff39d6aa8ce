//! LIST command - List notes visible to the caller.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::read::NoteResponse;
use super::{HumanReadable, endpoint, make_request, output, truncate};

const PREVIEW_CHARS: usize = 60;

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Only show notes written by this user
    #[arg(long)]
    pub author: Option<String>,
}

/// Notes visible to the caller, ordered by ID.
#[derive(Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct NoteList {
    pub notes: Vec<NoteResponse>,
}

impl HumanReadable for NoteList {
    fn print_human(&self) {
        println!("{}", "Visible Notes".green().bold());
        println!("{}", "=".repeat(80));
        println!();

        if self.notes.is_empty() {
            println!("  {}", "(No notes visible)".dimmed());
            return;
        }

        for note in &self.notes {
            println!("  {} {}", note.id.bold(), note.visibility_label());
            println!("    {} {}", "Author:".cyan(), note.author);
            println!(
                "    {} {}",
                "Text:".cyan(),
                truncate(&note.text.replace('\n', " "), PREVIEW_CHARS)
            );
            println!();
        }

        println!("  {} {}", "Total:".cyan(), self.notes.len());
    }
}

/// Execute the list command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: ListArgs,
) -> Result<()> {
    let mut response: NoteList = make_request(client.get(endpoint(base_url, "/api/notes"))).await?;

    if let Some(author) = &args.author {
        response.notes.retain(|note| &note.author == author);
    }

    output(&response, human)
}
