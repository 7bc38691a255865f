//! Operator command line for the file-writer service.

pub mod commands;

use clap::{Parser, Subcommand};

/// File-writer service: an audited HTTP API for agent-driven file operations
#[derive(Parser)]
#[command(name = "filewriter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    #[command(alias = "-d", alias = "--daemon")]
    Serve,

    /// Write a default config.toml if none exists
    #[command(alias = "--init")]
    Init,

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Show recent API request logs
    #[command(alias = "history")]
    Logs {
        /// Number of entries to show
        #[arg(long, short = 'n', default_value = "20")]
        limit: u64,
    },

    /// Show files written through the API
    #[command(alias = "ls")]
    Files,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create an account; the password is read from stdin
    Create {
        username: String,
        email: String,
        /// Grant administrator rights
        #[arg(long)]
        admin: bool,
    },

    /// Enable or disable login for an account
    SetActive {
        email: String,
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },

    /// Grant or revoke administrator rights
    SetAdmin {
        email: String,
        #[arg(action = clap::ArgAction::Set)]
        admin: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["filewriter"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_user_create_parses() {
        let cli =
            Cli::try_parse_from(["filewriter", "user", "create", "amaru", "a@b.c", "--admin"])
                .unwrap();
        match cli.command {
            Some(Commands::User {
                command:
                    UserCommands::Create {
                        username,
                        email,
                        admin,
                    },
            }) => {
                assert_eq!(username, "amaru");
                assert_eq!(email, "a@b.c");
                assert!(admin);
            }
            _ => panic!("expected user create"),
        }
    }

    #[test]
    fn test_set_active_takes_explicit_bool() {
        let cli =
            Cli::try_parse_from(["filewriter", "user", "set-active", "a@b.c", "false"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::User {
                command: UserCommands::SetActive { active: false, .. }
            })
        ));
        assert!(Cli::try_parse_from(["filewriter", "user", "set-active", "a@b.c", "maybe"]).is_err());
    }

    #[test]
    fn test_logs_limit() {
        let cli = Cli::try_parse_from(["filewriter", "logs", "--limit", "5"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Logs { limit: 5 })));
    }
}
