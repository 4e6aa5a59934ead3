//! `draftgate login`, `draftgate logout`, `draftgate accounts`.

use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL};
use draftgate_core::Session;
use draftgate_types::Config;

use super::{build_assistant, sign_in};

/// Arguments for `draftgate logout`.
#[derive(Args)]
pub struct LogoutArgs {
    /// Account whose stored credential should be deleted.
    #[arg(short, long)]
    pub account: String,
}

/// Run the browser handshake and store the credential.
pub async fn login(config: &Config) -> anyhow::Result<()> {
    let assistant = build_assistant(config);
    let mut session = Session::new();
    sign_in(&assistant, &mut session, config, None).await?;
    println!(
        "Credential stored in {}",
        assistant.store().dir().display()
    );
    Ok(())
}

pub fn logout(args: LogoutArgs, config: &Config) -> anyhow::Result<()> {
    let assistant = build_assistant(config);
    if assistant.forget_account(&args.account)? {
        println!("Logged out {}", args.account);
    } else {
        println!("No stored credential for {}", args.account);
    }
    Ok(())
}

pub fn list(config: &Config) -> anyhow::Result<()> {
    let assistant = build_assistant(config);
    let accounts = assistant.stored_accounts()?;
    let dir = assistant.store().dir().display();

    if accounts.is_empty() {
        println!("No stored accounts.");
        println!("  Dir: {dir}");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["ACCOUNT", "ALLOWED"]);
    for account in &accounts {
        let allowed = if assistant.gate().is_allowed(account) {
            "yes"
        } else {
            "no"
        };
        table.add_row([account.as_str(), allowed]);
    }

    println!("{table}");
    println!("  {} account(s)", accounts.len());
    println!("  Dir: {dir}");
    Ok(())
}
