//! `draftgate shell` -- interactive loop over one session.
//!
//! The session lives as long as the loop. Every failed command is
//! printed and the loop carries on.

use draftgate_core::{Assistant, Session};
use draftgate_types::Config;

use super::draft::print_report;
use super::{Prompter, build_assistant, render_review, sign_in};

const HELP: &str = "\
Commands:
  login            Sign in with the browser
  resume <email>   Sign in from a stored credential
  switch           Leave the current account (credential kept)
  logout           Leave the current account and delete its credential
  accounts         List stored accounts
  compose          Generate an email and leave it as a plain-text draft
  draft            Generate an email and hold the draft for approval
  send             Send the draft awaiting approval
  cancel           Discard the draft awaiting approval
  status           Show the session state
  help             Show this help
  exit             Leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Login,
    Resume(String),
    Switch,
    Logout,
    Accounts,
    Compose,
    Draft,
    Send,
    Cancel,
    Status,
    Help,
    Exit,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err("empty command".into());
        };
        let arg = words.next();
        if words.next().is_some() {
            return Err(format!("too many arguments for '{name}'"));
        }

        let command = match (name.to_ascii_lowercase().as_str(), arg) {
            ("resume", Some(email)) => Self::Resume(email.to_string()),
            ("resume", None) => return Err("usage: resume <email>".into()),
            (_, Some(_)) => return Err(format!("'{name}' takes no arguments")),
            ("login", None) => Self::Login,
            ("switch", None) => Self::Switch,
            ("logout", None) => Self::Logout,
            ("accounts", None) => Self::Accounts,
            ("compose", None) => Self::Compose,
            ("draft", None) => Self::Draft,
            ("send", None) => Self::Send,
            ("cancel", None) => Self::Cancel,
            ("status", None) => Self::Status,
            ("help" | "?", None) => Self::Help,
            ("exit" | "quit", None) => Self::Exit,
            _ => return Err(format!("unknown command '{name}' (try 'help')")),
        };
        Ok(command)
    }
}

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let assistant = build_assistant(config);
    let mut session = Session::new();
    let mut prompter = Prompter::stdin();

    println!("draftgate shell. Type 'help' for commands.");
    loop {
        let prompt = match session.principal() {
            Some(p) if session.pending_draft().is_some() => format!("{p} (draft pending)> "),
            Some(p) => format!("{p}> "),
            None => "> ".to_string(),
        };
        let Some(line) = prompter.ask(&prompt).await? else {
            break;
        };
        if line.is_empty() {
            continue;
        }

        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        if command == ShellCommand::Exit {
            break;
        }

        if let Err(err) = execute(&assistant, &mut session, &mut prompter, config, command).await
        {
            eprintln!("error: {err}");
        }
    }

    println!("Goodbye.");
    Ok(())
}

async fn execute(
    assistant: &Assistant,
    session: &mut Session,
    prompter: &mut Prompter,
    config: &Config,
    command: ShellCommand,
) -> anyhow::Result<()> {
    match command {
        ShellCommand::Login => sign_in(assistant, session, config, None).await?,
        ShellCommand::Resume(email) => sign_in(assistant, session, config, Some(&email)).await?,
        ShellCommand::Switch => {
            let principal = assistant.switch_account(session)?;
            println!("Signed out of {principal}; credential kept.");
        }
        ShellCommand::Logout => {
            let principal = assistant.logout(session)?;
            println!("Logged out {principal}.");
        }
        ShellCommand::Accounts => {
            for account in assistant.stored_accounts()? {
                println!("  {account}");
            }
        }
        ShellCommand::Compose => {
            let description = ask(prompter, "Describe the email: ").await?;
            let to = ask(prompter, "To: ").await?;
            let subject = ask(prompter, "Subject: ").await?;
            let receipt = assistant
                .compose(session, &description, &to, &subject)
                .await?;
            println!("Draft {} created.", receipt.draft_id);
            println!();
            println!("{}", receipt.body);
        }
        ShellCommand::Draft => {
            let description = ask(prompter, "Describe the email: ").await?;
            let to = ask(prompter, "To (comma-separated): ").await?;
            let cc = ask(prompter, "CC (optional, comma-separated): ").await?;
            let draft = assistant
                .prepare_draft(session, &description, &to, &cc)
                .await?;
            println!("Draft created. Review it, then 'send' or 'cancel'.");
            println!("{}", render_review(&draft));
        }
        ShellCommand::Send => {
            let report = assistant.send(session).await?;
            print_report(&report);
        }
        ShellCommand::Cancel => {
            assistant.cancel(session)?;
            println!("Cancelled. The draft stays in your mailbox.");
        }
        ShellCommand::Status => {
            match session.principal() {
                Some(p) => println!("{} as {p}", session.state_name()),
                None => println!("{}", session.state_name()),
            }
            if let Some(draft) = session.pending_draft() {
                println!("{}", render_review(draft));
            }
        }
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Exit => {}
    }
    Ok(())
}

async fn ask(prompter: &mut Prompter, label: &str) -> anyhow::Result<String> {
    prompter
        .ask(label)
        .await?
        .ok_or_else(|| anyhow::anyhow!("input closed"))
}
