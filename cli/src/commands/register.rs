//! REGISTER command - Create an account.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, endpoint, make_request, output};

/// Arguments for the register command.
#[derive(Args)]
pub struct RegisterArgs {
    /// User ID to register
    pub user_id: String,

    /// Password for the new account
    #[arg(long, env = "NOTES_PASSWORD")]
    pub password: String,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    user_id: &'a str,
    password: &'a str,
}

/// Response from registering.
#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterResponse {
    pub user_id: String,
    pub api_key: String,
}

impl HumanReadable for RegisterResponse {
    fn print_human(&self) {
        println!("{}", "Registered successfully!".green().bold());
        println!();
        println!("  {} {}", "User:".cyan(), self.user_id);
        println!("  {} {}", "API key:".cyan(), self.api_key);
        println!();
        println!("  {}", "The API key is shown only once.".dimmed());
    }
}

/// Execute the register command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: RegisterArgs,
) -> Result<()> {
    let request = RegisterRequest {
        user_id: &args.user_id,
        password: &args.password,
    };

    let response: RegisterResponse = make_request(
        client
            .post(endpoint(base_url, "/api/register"))
            .json(&request),
    )
    .await?;

    output(&response, human)
}
