use anyhow::Context;
use clap::Subcommand;

use crate::cli::utils::{connect_repository, output_empty_collection, output_success};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::models::NewUser;
use crate::types::Role;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user")]
    Add {
        #[arg(long)]
        email: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long, default_value = "client", help = "client, agent or admin")]
        role: Role,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        nationality: Option<String>,
    },

    #[command(about = "List users")]
    List {
        #[arg(long, help = "Only users with this role")]
        role: Option<Role>,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let repo = connect_repository(config()).await?;

    match cmd {
        UserCommands::Add {
            email,
            first_name,
            last_name,
            role,
            phone,
            nationality,
        } => {
            let user = repo
                .create_user(NewUser {
                    email: email.trim().to_lowercase(),
                    first_name,
                    last_name,
                    phone,
                    nationality,
                    role,
                    is_verified: true,
                })
                .await
                .context("failed to create user")?;

            output_success(
                output_format,
                &format!("Created {} {} ({})", user.role, user.email, user.id),
                Some(serde_json::to_value(&user)?),
            )
        }
        UserCommands::List { role } => {
            let users = repo.list_users(role).await.context("failed to list users")?;
            if users.is_empty() {
                return output_empty_collection(output_format, "users", "No users found");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "users": users }))?);
                }
                OutputFormat::Text => {
                    println!("{:<38} {:<8} {:<6} {:<30} {}", "ID", "ROLE", "ACTIVE", "EMAIL", "NAME");
                    println!("{}", "-".repeat(100));
                    for user in &users {
                        println!(
                            "{:<38} {:<8} {:<6} {:<30} {}",
                            user.id,
                            user.role,
                            if user.is_active { "yes" } else { "no" },
                            user.email,
                            user.full_name()
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
