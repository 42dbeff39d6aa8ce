//! DELETE command - Delete a note.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::create::NoteIdResponse;
use super::{make_request, note_url, output};

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Note to delete
    pub id: String,

    /// Skip confirmation prompt (for non-interactive use)
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Execute the delete command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: DeleteArgs,
) -> Result<()> {
    if human && !args.yes {
        eprint!(
            "{} Are you sure you want to delete note {}? [y/N] ",
            "Warning:".yellow().bold(),
            args.id
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            eprintln!("Aborted.");
            return Ok(());
        }
    }

    let url = note_url(base_url, &args.id)?;

    let response: NoteIdResponse = make_request(client.delete(url)).await?;

    if human {
        println!("{}", "Note deleted successfully!".green().bold());
        println!();
    }
    output(&response, human)
}
