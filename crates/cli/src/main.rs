//! Bramble CLI - Database migrations and maintenance jobs.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! bramble migrate
//!
//! # Recompute every product's recommendation score
//! bramble recommendations recalculate
//!
//! # Look up or assign a user's role
//! bramble roles show 6f1c2d3e-0000-4000-8000-000000000001
//! bramble roles set 6f1c2d3e-0000-4000-8000-000000000001 moderator
//! ```
//!
//! All commands read `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bramble")]
#[command(author, version, about = "Bramble storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Maintain product recommendation scores
    Recommendations {
        #[command(subcommand)]
        action: RecommendationAction,
    },
    /// Inspect and assign user roles
    Roles {
        #[command(subcommand)]
        action: RoleAction,
    },
}

#[derive(Subcommand)]
enum RecommendationAction {
    /// Recompute every product's score from views, stock and popularity
    Recalculate,
}

#[derive(Subcommand)]
enum RoleAction {
    /// Show a user's role
    Show {
        /// User ID (UUID)
        user_id: String,
    },
    /// Assign a role to a user
    Set {
        /// User ID (UUID)
        user_id: String,

        /// Role (`admin`, `moderator`, `customer`)
        role: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Recommendations { action } => match action {
            RecommendationAction::Recalculate => {
                commands::recommendations::recalculate().await?;
            }
        },
        Commands::Roles { action } => match action {
            RoleAction::Show { user_id } => commands::roles::show(&user_id).await?,
            RoleAction::Set { user_id, role } => commands::roles::set(&user_id, &role).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_role_set() {
        let cli = Cli::try_parse_from(["bramble", "roles", "set", "abc", "admin"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Roles {
                action: RoleAction::Set { .. }
            })
        ));
    }
}
