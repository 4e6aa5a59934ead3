//! Outgoing message model and MIME construction.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;

use crate::error::{MailError, Result};

/// How the body text is presented to the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyFormat {
    /// `text/plain`, sent as-is.
    #[default]
    PlainText,
    /// `text/html`; the body is already markup (see [`render_html_body`]).
    Html,
}

impl BodyFormat {
    fn content_type(self) -> ContentType {
        match self {
            Self::PlainText => ContentType::TEXT_PLAIN,
            Self::Html => ContentType::TEXT_HTML,
        }
    }
}

/// Opaque identifier of a remote draft.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DraftId(pub String);

impl DraftId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DraftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single-part message ready to be drafted or sent.
///
/// `from` is the signed-in principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub format: BodyFormat,
}

impl OutgoingMessage {
    /// Build the RFC 5322 message.
    ///
    /// Fails when there are no `To` recipients or an address does not
    /// parse as a mailbox.
    pub fn build(&self) -> Result<Message> {
        if self.to.is_empty() {
            return Err(MailError::InvalidMessage("no recipients".into()));
        }

        let mut builder = Message::builder().from(mailbox(&self.from)?);
        for address in &self.to {
            builder = builder.to(mailbox(address)?);
        }
        for address in &self.cc {
            builder = builder.cc(mailbox(address)?);
        }
        builder
            .subject(self.subject.as_str())
            .header(self.format.content_type())
            .body(self.body.clone())
            .map_err(|e| MailError::InvalidMessage(e.to_string()))
    }

    /// The message as the API's `raw` field: base64url of the formatted
    /// message.
    pub fn to_raw(&self) -> Result<String> {
        Ok(URL_SAFE.encode(self.build()?.formatted()))
    }
}

fn mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| MailError::InvalidMessage(format!("invalid address '{address}': {e}")))
}

/// Convert plain text into minimal HTML: escape `&`, `<` and `>`, then
/// turn each newline into `<br>`.
pub fn render_html_body(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("<br>"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}
