//! LOGIN command - Obtain a bearer token.
//!
//! Either `--password` or `--api-key` must be given.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, endpoint, make_request, output};

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// User ID to log in as (required with --password)
    pub user_id: Option<String>,

    /// Account password
    #[arg(long, env = "NOTES_PASSWORD", conflicts_with = "api_key")]
    pub password: Option<String>,

    /// API key issued at registration
    #[arg(long, env = "NOTES_API_KEY")]
    pub api_key: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    user_id: &'a str,
    password: &'a str,
}

/// Response carrying a fresh token.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_in: u64,
}

impl HumanReadable for TokenResponse {
    fn print_human(&self) {
        println!("{}", "Logged in.".green().bold());
        println!();
        println!("  {} {}", "Token:".cyan(), self.token);
        println!("  {} {}s", "Expires in:".cyan(), self.expires_in);
        println!();
        println!(
            "  {}",
            "export NOTES_TOKEN=<token> to use it for later commands".dimmed()
        );
    }
}

/// Execute the login command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: LoginArgs,
) -> Result<()> {
    let request = match (&args.api_key, &args.user_id, &args.password) {
        (Some(api_key), _, _) => client
            .post(endpoint(base_url, "/api/token"))
            .header("X-Api-Key", api_key),
        (None, Some(user_id), Some(password)) => client
            .post(endpoint(base_url, "/api/login"))
            .json(&LoginRequest { user_id, password }),
        _ => bail!("login needs a user ID with --password, or --api-key"),
    };

    let response: TokenResponse = make_request(request).await?;

    output(&response, human)
}
