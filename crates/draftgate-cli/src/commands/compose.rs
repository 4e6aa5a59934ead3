//! `draftgate compose` -- generate a body and leave it as a draft.

use clap::Args;
use draftgate_core::Session;
use draftgate_types::{Config, join_addresses};

use super::{Prompter, build_assistant, sign_in};

/// Arguments for `draftgate compose`.
#[derive(Args)]
pub struct ComposeArgs {
    /// Stored account to act as (runs the browser login when omitted).
    #[arg(short, long)]
    pub account: Option<String>,

    /// Recipients, comma-separated.
    #[arg(long)]
    pub to: String,

    /// Subject line.
    #[arg(short, long, default_value = "")]
    pub subject: String,

    /// What the email should say (read from stdin when omitted).
    pub description: Option<String>,
}

pub async fn run(args: ComposeArgs, config: &Config) -> anyhow::Result<()> {
    let assistant = build_assistant(config);
    let mut session = Session::new();
    sign_in(&assistant, &mut session, config, args.account.as_deref()).await?;

    let description = match args.description {
        Some(d) => d,
        None => Prompter::stdin()
            .ask("Describe the email: ")
            .await?
            .unwrap_or_default(),
    };

    let receipt = assistant
        .compose(&mut session, &description, &args.to, &args.subject)
        .await?;
    println!("Draft {} created for {}", receipt.draft_id, join_addresses(&receipt.to));
    println!();
    println!("{}", receipt.body);
    Ok(())
}
