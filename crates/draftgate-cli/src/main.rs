//! `draftgate` -- CLI binary for the domain-restricted email drafting
//! assistant.
//!
//! - `draftgate login` -- Authenticate a Gmail account (allowed domains only).
//! - `draftgate logout` -- Forget a stored account.
//! - `draftgate accounts` -- List stored accounts.
//! - `draftgate compose` -- Generate an email and leave it as a draft.
//! - `draftgate draft` -- Generate, review, then send or cancel.
//! - `draftgate shell` -- Interactive session.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

/// Domain-restricted email drafting assistant.
#[derive(Parser)]
#[command(name = "draftgate", about = "Domain-restricted email drafting assistant", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate a Gmail account in the browser.
    Login,

    /// Delete the stored credential of an account.
    Logout(commands::accounts::LogoutArgs),

    /// List accounts with a stored credential.
    Accounts,

    /// Generate an email body and create a plain-text draft.
    Compose(commands::compose::ComposeArgs),

    /// Generate subject and body, create a draft, then send or cancel it.
    Draft(commands::draft::DraftArgs),

    /// Start an interactive session.
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Login => commands::accounts::login(&config).await?,
        Commands::Logout(args) => commands::accounts::logout(args, &config)?,
        Commands::Accounts => commands::accounts::list(&config)?,
        Commands::Compose(args) => commands::compose::run(args, &config).await?,
        Commands::Draft(args) => commands::draft::run(args, &config).await?,
        Commands::Shell => commands::shell::run(&config).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["draftgate", "accounts", "--verbose", "-c", "/tmp/c.json"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
        assert!(matches!(cli.command, Commands::Accounts));
    }

    #[test]
    fn draft_arguments() {
        let cli = Cli::try_parse_from([
            "draftgate",
            "draft",
            "--account",
            "alice@iands.com",
            "--to",
            "a@x.com, b@y.com",
            "--cc",
            "c@z.com",
            "Follow up on invoice #123",
        ])
        .unwrap();
        match cli.command {
            Commands::Draft(args) => {
                assert_eq!(args.account.as_deref(), Some("alice@iands.com"));
                assert_eq!(args.to, "a@x.com, b@y.com");
                assert_eq!(args.cc.as_deref(), Some("c@z.com"));
                assert_eq!(args.description.as_deref(), Some("Follow up on invoice #123"));
            }
            _ => panic!("expected draft"),
        }
    }

    #[test]
    fn logout_requires_account() {
        assert!(Cli::try_parse_from(["draftgate", "logout"]).is_err());
    }
}
