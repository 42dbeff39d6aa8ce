//! Command-line interface for the shared notes service.
//!
//! Commands:
//! - register: Create an account and print its API key
//! - login: Exchange a password or API key for a bearer token
//! - create: Create a note
//! - read: Read a note
//! - update: Replace a note's text and visibility
//! - delete: Delete a note
//! - list: List notes visible to the caller
//!
//! Configuration via environment:
//! - NOTES_URL: Base URL of the notes server (default: http://localhost:3000)
//! - NOTES_TOKEN: Bearer token for authentication

mod commands;

use clap::{Parser, Subcommand};

use commands::{
    create::CreateArgs, delete::DeleteArgs, list::ListArgs, login::LoginArgs, read::ReadArgs,
    register::RegisterArgs, update::UpdateArgs,
};

/// Shared notes CLI
///
/// Prints JSON by default; pass --human for formatted output.
#[derive(Parser)]
#[command(name = "notes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// Notes server URL
    #[arg(
        long,
        env = "NOTES_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    url: String,

    /// Bearer token for authentication
    #[arg(long, env = "NOTES_TOKEN", global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new user
    Register(RegisterArgs),

    /// Obtain a bearer token
    Login(LoginArgs),

    /// Create a note
    Create(CreateArgs),

    /// Read a note
    Read(ReadArgs),

    /// Replace a note's text and visibility
    Update(UpdateArgs),

    /// Delete a note
    Delete(DeleteArgs),

    /// List visible notes
    List(ListArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let client = match commands::build_client(cli.token.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Register(args) => {
            commands::register::execute(&client, &cli.url, cli.human, args).await
        }
        Commands::Login(args) => commands::login::execute(&client, &cli.url, cli.human, args).await,
        Commands::Create(args) => {
            commands::create::execute(&client, &cli.url, cli.human, args).await
        }
        Commands::Read(args) => commands::read::execute(&client, &cli.url, cli.human, args).await,
        Commands::Update(args) => {
            commands::update::execute(&client, &cli.url, cli.human, args).await
        }
        Commands::Delete(args) => {
            commands::delete::execute(&client, &cli.url, cli.human, args).await
        }
        Commands::List(args) => commands::list::execute(&client, &cli.url, cli.human, args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
