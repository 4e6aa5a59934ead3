//! `draftgate draft` -- generate, create a draft, and ask for approval.

use clap::Args;
use draftgate_core::{Assistant, AssistantError, SendReport, Session};
use draftgate_types::{Config, join_addresses};

use super::{Prompter, build_assistant, render_review, sign_in};

/// Arguments for `draftgate draft`.
#[derive(Args)]
pub struct DraftArgs {
    /// Stored account to act as (runs the browser login when omitted).
    #[arg(short, long)]
    pub account: Option<String>,

    /// Recipients, comma-separated.
    #[arg(long)]
    pub to: String,

    /// CC recipients, comma-separated.
    #[arg(long)]
    pub cc: Option<String>,

    /// What the email should say (read from stdin when omitted).
    pub description: Option<String>,
}

/// The operator's answer to the review prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Send,
    Cancel,
}

impl Decision {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "send" | "s" | "y" | "yes" => Some(Self::Send),
            "cancel" | "c" | "n" | "no" => Some(Self::Cancel),
            _ => None,
        }
    }
}

pub async fn run(args: DraftArgs, config: &Config) -> anyhow::Result<()> {
    let assistant = build_assistant(config);
    let mut session = Session::new();
    let mut prompter = Prompter::stdin();
    sign_in(&assistant, &mut session, config, args.account.as_deref()).await?;

    let description = match args.description {
        Some(d) => d,
        None => prompter
            .ask("Describe the email: ")
            .await?
            .unwrap_or_default(),
    };

    let draft = assistant
        .prepare_draft(
            &mut session,
            &description,
            &args.to,
            args.cc.as_deref().unwrap_or_default(),
        )
        .await?;
    println!("Draft created. Please review before sending.");
    println!("{}", render_review(&draft));

    approve(&assistant, &mut session, &mut prompter).await
}

/// Ask until the operator sends or cancels. EOF cancels; a failed send
/// asks again.
pub async fn approve(
    assistant: &Assistant,
    session: &mut Session,
    prompter: &mut Prompter,
) -> anyhow::Result<()> {
    loop {
        let Some(answer) = prompter.ask("Send this email? [send/cancel]: ").await? else {
            assistant.cancel(session)?;
            println!("Cancelled. The draft stays in your mailbox.");
            return Ok(());
        };
        match Decision::parse(&answer) {
            Some(Decision::Send) => match assistant.send(session).await {
                Ok(report) => {
                    print_report(&report);
                    return Ok(());
                }
                Err(err @ AssistantError::SendFailed(_)) => {
                    eprintln!("error: {err}");
                }
                Err(err) => return Err(err.into()),
            },
            Some(Decision::Cancel) => {
                assistant.cancel(session)?;
                println!("Cancelled. The draft stays in your mailbox.");
                return Ok(());
            }
            None => eprintln!("Please answer 'send' or 'cancel'."),
        }
    }
}

pub fn print_report(report: &SendReport) {
    println!("Email sent to {}", join_addresses(&report.to));
    if let Some(err) = report.deletion_error() {
        eprintln!("warning: {err}");
    }
}
