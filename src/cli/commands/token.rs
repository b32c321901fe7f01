use anyhow::{anyhow, Context};
use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::connect_repository;
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Issue a bearer token for an existing user")]
    Issue {
        #[arg(long)]
        user_id: Uuid,

        #[arg(long, help = "Override SECURITY_JWT_EXPIRY_HOURS")]
        hours: Option<u64>,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();

    match cmd {
        TokenCommands::Issue { user_id, hours } => {
            let repo = connect_repository(config).await?;
            let user = repo
                .get_user(user_id)
                .await
                .context("failed to look up user")?
                .ok_or_else(|| anyhow!("user {} not found", user_id))?;
            if !user.is_active {
                return Err(anyhow!("user {} is inactive", user.email));
            }

            let hours = hours.unwrap_or(config.security.jwt_expiry_hours);
            let claims = Claims::new(user.id, user.email.clone(), user.role, hours);
            let token = generate_jwt(&claims, &config.security.jwt_secret)?;

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "token": token,
                            "userId": user.id,
                            "role": user.role,
                            "expiresAt": claims.exp,
                        }))?
                    );
                }
                // Bare token so it can be captured with $(casectl token issue ...)
                OutputFormat::Text => println!("{}", token),
            }
            Ok(())
        }
    }
}
