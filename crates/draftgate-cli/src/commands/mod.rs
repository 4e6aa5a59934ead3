//! CLI command implementations for `draftgate`.
//!
//! - [`accounts`] -- `login`, `logout`, `accounts`.
//! - [`compose`] -- Basic variant: generate and draft.
//! - [`draft`] -- Approval variant: generate, draft, review, send/cancel.
//! - [`shell`] -- Interactive loop over one session.

pub mod accounts;
pub mod compose;
pub mod draft;
pub mod shell;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use comfy_table::{Table, presets::UTF8_FULL};
use draftgate_core::{Assistant, LlmEmailGenerator, PendingDraft, Session};
use draftgate_gmail::GmailClient;
use draftgate_llm::{LlmProviderConfig, OpenAiCompatProvider};
use draftgate_oauth2::{CredentialStore, LoopbackAuthenticator};
use draftgate_types::{Config, join_addresses};
use draftgate_types::config::LlmConfig;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

/// Load configuration from the given path override or via auto-discovery
/// (`DRAFTGATE_CONFIG`, then `~/.draftgate/config.json`).
pub fn load_config(path_override: Option<&Path>) -> anyhow::Result<Config> {
    draftgate_types::loader::load_config(path_override)
        .map_err(|e| anyhow::anyhow!("failed to load config: {e}"))
}

/// Wire the production collaborators from configuration.
pub fn build_assistant(config: &Config) -> Assistant {
    let provider = Arc::new(llm_provider(&config.llm));
    let generator = LlmEmailGenerator::new(provider);
    let store = CredentialStore::with_dir(config.storage.resolve_tokens_dir());
    debug!(
        tokens_dir = %store.dir().display(),
        model = %config.llm.model,
        gmail = %config.gmail.base_url,
        "assistant configured"
    );

    Assistant::new(
        Arc::new(LoopbackAuthenticator::new(config.oauth.clone())),
        Arc::new(GmailClient::new(config.gmail.base_url.clone())),
        Arc::new(generator),
        store,
    )
}

/// An inline key in the config wins over the environment variable.
fn llm_provider(llm: &LlmConfig) -> OpenAiCompatProvider {
    let provider_config = LlmProviderConfig {
        base_url: llm.base_url.clone(),
        api_key_env: llm.api_key_env.clone(),
        timeout_secs: llm.timeout_secs,
        ..LlmProviderConfig::openai(llm.model.clone())
    };
    if llm.api_key.is_empty() {
        OpenAiCompatProvider::new(provider_config)
    } else {
        OpenAiCompatProvider::with_api_key(provider_config, llm.api_key.expose().to_string())
    }
}

/// Sign in as `account` from its stored credential, or run the browser
/// handshake when no account is named.
pub async fn sign_in(
    assistant: &Assistant,
    session: &mut Session,
    config: &Config,
    account: Option<&str>,
) -> anyhow::Result<()> {
    let principal = match account {
        Some(email) => assistant.resume(session, email).await?,
        None => {
            config.validate_oauth()?;
            eprintln!("Opening the browser to sign in...");
            assistant.authenticate(session).await?
        }
    };
    eprintln!("Signed in as {principal}");
    Ok(())
}

/// Line-oriented prompts on stdin, shared by every interactive command.
pub struct Prompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompter {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `label` on stderr and read one trimmed line. `None` at EOF.
    pub async fn ask(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        eprint!("{label}");
        std::io::stderr().flush().ok();
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }
}

/// The review shown before a send/cancel decision.
pub fn render_review(draft: &PendingDraft) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.add_row(["To", &join_addresses(&draft.to)]);
    table.add_row(["CC", &join_addresses(&draft.cc)]);
    table.add_row(["Subject", &draft.subject]);
    table.add_row(["Draft", draft.draft_id.as_str()]);
    format!("{table}\n\n{}\n", draft.body)
}
