//! UPDATE command - Replace a note's text and visibility.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::create::{NoteBody, NoteIdResponse};
use super::{make_request, note_url, output};

/// Arguments for the update command.
#[derive(Args)]
pub struct UpdateArgs {
    /// Note to update
    pub id: String,

    /// New note text
    pub text: String,

    /// Make the note public
    #[arg(long, conflicts_with = "private")]
    pub public: bool,

    /// Make the note private
    #[arg(long)]
    pub private: bool,
}

impl UpdateArgs {
    /// Requested visibility; `None` leaves it as it is.
    fn is_public(&self) -> Option<bool> {
        match (self.public, self.private) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Execute the update command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: UpdateArgs,
) -> Result<()> {
    let body = NoteBody {
        id: None,
        text: &args.text,
        is_public: args.is_public(),
    };
    let url = note_url(base_url, &args.id)?;

    let response: NoteIdResponse = make_request(client.put(url).json(&body)).await?;

    if human {
        println!("{}", "Note updated successfully!".green().bold());
        println!();
    }
    output(&response, human)
}
