//! Sitedesk CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! sitedesk migrate
//!
//! # Create a user, or set a password later
//! sitedesk user create -e admin@example.com -n "Admin Name" -r admin --password 'change me now'
//! sitedesk user set-password -e admin@example.com --password 'another secret'
//!
//! # Inspect and edit site settings
//! sitedesk settings list
//! sitedesk settings set hero_title '"Welcome"'
//! sitedesk settings set social_links '{"twitter":"https://x.com/acme"}' --type json
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` / `user set-password` - Create users and set passwords
//! - `settings list` / `settings set` - Read and write site settings

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sitedesk")]
#[command(author, version, about = "Sitedesk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage site settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`admin`, `editor`, `viewer`)
        #[arg(short, long, default_value = "viewer")]
        role: String,

        /// Initial password (at least 8 characters)
        #[arg(long)]
        password: Option<String>,
    },
    /// Set or replace a user's password
    SetPassword {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// New password (at least 8 characters)
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// List all settings
    List,
    /// Create or update a setting
    Set {
        /// Setting key
        key: String,

        /// Raw stored value (JSON-encoded for `json`)
        value: String,

        /// Declared type (`string`, `json`)
        #[arg(short = 't', long = "type", default_value = "string")]
        setting_type: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                role,
                password,
            } => {
                commands::user::create(&email, &name, &role, password.as_deref()).await?;
            }
            UserAction::SetPassword { email, password } => {
                commands::user::set_password(&email, &password).await?;
            }
        },
        Commands::Settings { action } => match action {
            SettingsAction::List => commands::settings::list().await?,
            SettingsAction::Set {
                key,
                value,
                setting_type,
            } => commands::settings::set(&key, &value, &setting_type).await?,
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
    fn test_settings_set_parses_type_flag() {
        let cli = Cli::try_parse_from([
            "sitedesk",
            "settings",
            "set",
            "about_stats",
            "[]",
            "--type",
            "json",
        ])
        .map_err(|e| e.to_string());
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::Settings {
                    action: SettingsAction::Set { ref setting_type, .. }
                }
            }) if setting_type == "json"
        ));
    }

    #[test]
    fn test_user_set_password_parses() {
        let cli = Cli::try_parse_from([
            "sitedesk",
            "user",
            "set-password",
            "-e",
            "editor@example.com",
            "--password",
            "another secret",
        ])
        .map_err(|e| e.to_string());
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::User {
                    action: UserAction::SetPassword { ref email, ref password }
                }
            }) if email == "editor@example.com" && password == "another secret"
        ));
    }

    #[test]
    fn test_user_set_password_requires_password() {
        assert!(
            Cli::try_parse_from(["sitedesk", "user", "set-password", "-e", "a@example.com"])
                .is_err()
        );
    }
}
