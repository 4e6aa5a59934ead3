//! Installed-application authorization code flow.
//!
//! [`LoopbackAuthenticator`] listens on `127.0.0.1` on an ephemeral port,
//! sends the user's browser to the provider's consent page, and waits for
//! the redirect carrying the authorization code. The code is exchanged
//! for tokens by [`TokenClient`], which also performs refreshes.
//!
//! Nothing here persists credentials: the caller decides whether the
//! authenticated principal may keep them.

use std::time::Duration;

use async_trait::async_trait;
use draftgate_types::SecretString;
use draftgate_types::config::OAuthConfig;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::credential::Credential;
use crate::error::{OAuthError, Result};
use crate::pkce;

/// How long an issued `state` stays valid.
pub const AUTH_STATE_TTL: Duration = Duration::from_secs(600);

/// Performs the OAuth handshake and token refresh.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Run the full interactive handshake.
    ///
    /// The returned credential is not yet bound to a principal.
    async fn authorize(&self) -> Result<Credential>;

    /// Obtain a fresh access token using the credential's refresh token.
    async fn refresh(&self, credential: &Credential) -> Result<Credential>;
}

// ---------------------------------------------------------------------------
// TokenClient
// ---------------------------------------------------------------------------

/// Talks to the provider's token endpoint.
#[derive(Debug, Clone)]
pub struct TokenClient {
    config: OAuthConfig,
    http: reqwest::Client,
    client_secret: Option<SecretString>,
}

impl TokenClient {
    /// A client that reads its secret from `config.client_secret_ref`.
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            client_secret: None,
        }
    }

    /// Use `secret` instead of the environment variable.
    pub fn with_client_secret(mut self, secret: SecretString) -> Self {
        self.client_secret = Some(secret);
        self
    }

    /// The client configuration.
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    fn endpoint(&self) -> Result<String> {
        self.config
            .token_endpoint()
            .map_err(|e| OAuthError::NotConfigured(e.to_string()))
    }

    fn client_secret(&self) -> Result<String> {
        if let Some(secret) = &self.client_secret {
            return Ok(secret.expose().to_string());
        }
        self.config
            .client_secret_ref
            .resolve()
            .map(|s| s.expose().to_string())
            .map_err(|e| OAuthError::NotConfigured(e.to_string()))
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> Result<Credential> {
        let secret = self.client_secret()?;
        let body = self
            .post_form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", &self.config.client_id),
                ("client_secret", &secret),
                ("code_verifier", verifier),
            ])
            .await?;

        let credential = credential_from_response(&body, None, &self.config.scopes)?;
        debug!(
            has_refresh_token = credential.refresh_token.is_some(),
            "authorization code exchanged"
        );
        Ok(credential)
    }

    /// Refresh `existing`, keeping its refresh token unless the server
    /// rotates it.
    pub async fn refresh(&self, existing: &Credential) -> Result<Credential> {
        let refresh_token = existing
            .refresh_token
            .as_deref()
            .ok_or(OAuthError::NoRefreshToken)?;
        let secret = self.client_secret()?;

        let body = self
            .post_form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", &self.config.client_id),
                ("client_secret", &secret),
            ])
            .await?;

        let mut refreshed = credential_from_response(&body, Some(existing), &existing.scopes)?;
        refreshed.principal = existing.principal.clone();
        debug!(principal = %existing.principal, "access token refreshed");
        Ok(refreshed)
    }

    async fn post_form(&self, form: &[(&str, &str)]) -> Result<serde_json::Value> {
        let response = self.http.post(self.endpoint()?).form(form).send().await?;
        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OAuthError::TokenRequest(format!("unreadable token response: {e}")))?;

        if !status.is_success() {
            let error = body
                .get("error_description")
                .or_else(|| body.get("error"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            return Err(OAuthError::TokenRequest(format!("{status}: {error}")));
        }
        Ok(body)
    }
}

fn credential_from_response(
    body: &serde_json::Value,
    previous: Option<&Credential>,
    requested_scopes: &[String],
) -> Result<Credential> {
    let access_token = body
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| OAuthError::TokenRequest("no access_token in response".into()))?
        .to_string();

    let now = chrono::Utc::now().timestamp();
    let refresh_token = body
        .get("refresh_token")
        .and_then(|v| v.as_str())
        .map(String::from)
        .or_else(|| previous.and_then(|p| p.refresh_token.clone()));

    Ok(Credential {
        principal: String::new(),
        access_token,
        refresh_token,
        token_type: body
            .get("token_type")
            .and_then(|v| v.as_str())
            .unwrap_or("Bearer")
            .to_string(),
        expires_at: body
            .get("expires_in")
            .and_then(|v| v.as_i64())
            .map(|secs| now + secs),
        scopes: body
            .get("scope")
            .and_then(|v| v.as_str())
            .map(|s| s.split(' ').map(String::from).collect())
            .unwrap_or_else(|| requested_scopes.to_vec()),
    })
}

// ---------------------------------------------------------------------------
// LoopbackAuthenticator
// ---------------------------------------------------------------------------

/// Authorization over a `127.0.0.1` redirect.
pub struct LoopbackAuthenticator {
    tokens: TokenClient,
    open_browser: bool,
}

impl LoopbackAuthenticator {
    pub fn new(config: OAuthConfig) -> Self {
        Self::with_token_client(TokenClient::new(config))
    }

    /// Build around an existing token client.
    pub fn with_token_client(tokens: TokenClient) -> Self {
        Self {
            tokens,
            open_browser: true,
        }
    }

    /// Only print the authorization URL instead of launching a browser.
    pub fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }

    /// Bind the loopback listener and build the authorization URL.
    pub async fn begin(&self) -> Result<PendingAuthorization> {
        let config = self.tokens.config();
        if config.client_id.trim().is_empty() {
            return Err(OAuthError::NotConfigured("oauth.client_id is empty".into()));
        }
        let auth_endpoint = config
            .auth_endpoint()
            .map_err(|e| OAuthError::NotConfigured(e.to_string()))?;

        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://127.0.0.1:{port}/");

        let state = pkce::generate_state();
        let verifier = pkce::generate_verifier();

        let mut url = url::Url::parse(&auth_endpoint)
            .map_err(|e| OAuthError::NotConfigured(format!("invalid auth URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &config.client_id)
            .append_pair("redirect_uri", &redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &config.scopes.join(" "))
            .append_pair("state", &state)
            .append_pair("code_challenge", &pkce::challenge_for(&verifier))
            .append_pair("code_challenge_method", "S256")
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");

        debug!(port, "loopback listener ready");
        Ok(PendingAuthorization {
            listener,
            authorize_url: url.to_string(),
            redirect_uri,
            state,
            verifier,
            tokens: self.tokens.clone(),
        })
    }
}

#[async_trait]
impl Authenticator for LoopbackAuthenticator {
    async fn authorize(&self) -> Result<Credential> {
        let pending = self.begin().await?;

        info!(url = %pending.authorize_url, "open this URL to authorize draftgate");
        if self.open_browser {
            if let Err(e) = open::that(&pending.authorize_url) {
                warn!(error = %e, "could not launch a browser; open the URL manually");
            }
        }

        pending.complete().await
    }

    async fn refresh(&self, credential: &Credential) -> Result<Credential> {
        self.tokens.refresh(credential).await
    }
}

/// An authorization in flight: listener bound, URL issued.
pub struct PendingAuthorization {
    listener: TcpListener,
    authorize_url: String,
    redirect_uri: String,
    state: String,
    verifier: String,
    tokens: TokenClient,
}

impl PendingAuthorization {
    /// URL the user must visit.
    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    /// The loopback redirect URI registered in the URL.
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Wait for the redirect, validate it, and exchange the code.
    pub async fn complete(self) -> Result<Credential> {
        let code = tokio::time::timeout(AUTH_STATE_TTL, self.wait_for_code())
            .await
            .map_err(|_| OAuthError::Expired)??;

        self.tokens
            .exchange_code(&code, &self.verifier, &self.redirect_uri)
            .await
    }

    async fn wait_for_code(&self) -> Result<String> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            debug!(%peer, "loopback connection");

            match handle_callback(stream, &self.state).await? {
                Some(code) => return Ok(code),
                None => continue,
            }
        }
    }
}

/// Read one request. `Ok(None)` means "not the callback, keep waiting".
///
/// Only a forged `state` or a provider `error=` ends the flow; dropped
/// connections and malformed requests are logged and skipped.
async fn handle_callback(stream: TcpStream, expected_state: &str) -> Result<Option<String>> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if let Err(e) = reader.read_line(&mut request_line).await {
        debug!(error = %e, "loopback read failed");
        return Ok(None);
    }
    if request_line.trim().is_empty() {
        debug!("loopback connection closed without a request");
        return Ok(None);
    }

    // Drain headers so the browser sees a clean response.
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) if line == "\r\n" || line == "\n" => break,
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "loopback read failed");
                return Ok(None);
            }
        }
    }

    let outcome = parse_callback(&request_line, expected_state);
    let mut stream = reader.into_inner();
    let written = match &outcome {
        Ok(Some(_)) => {
            respond(&mut stream, "200 OK", "Authorization complete. You can close this tab.").await
        }
        Ok(None) => respond(&mut stream, "404 Not Found", "Not found.").await,
        Err(e) => respond(&mut stream, "400 Bad Request", &format!("Authorization failed: {e}")).await,
    };
    if let Err(e) = written {
        debug!(error = %e, "could not answer the browser");
    }
    outcome
}

/// Extract the authorization code from a request line such as
/// `GET /?state=..&code=.. HTTP/1.1`.
fn parse_callback(request_line: &str, expected_state: &str) -> Result<Option<String>> {
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        debug!(request = request_line.trim(), "malformed request line");
        return Ok(None);
    };
    if method != "GET" {
        return Ok(None);
    }

    let url = match url::Url::parse(&format!("http://127.0.0.1{target}")) {
        Ok(url) => url,
        Err(e) => {
            debug!(error = %e, "unparseable callback target");
            return Ok(None);
        }
    };
    if url.path() != "/" {
        return Ok(None);
    }

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if state.is_none() && code.is_none() && error.is_none() {
        return Ok(None);
    }
    if state.as_deref() != Some(expected_state) {
        return Err(OAuthError::StateMismatch);
    }
    if let Some(error) = error {
        return Err(OAuthError::Denied(error));
    }
    if code.is_none() {
        debug!("callback carried no code");
    }
    Ok(code)
}

async fn respond(stream: &mut TcpStream, status: &str, message: &str) -> Result<()> {
    let body = format!(
        "<!doctype html><html><body><p>{}</p></body></html>",
        message.replace('<', "&lt;")
    );
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
