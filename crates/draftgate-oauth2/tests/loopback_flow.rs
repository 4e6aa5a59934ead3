//! End-to-end loopback authorization against a mock token endpoint.
//!
//! The test plays the browser: it reads the issued URL, then hits the
//! loopback redirect URI the way the provider's consent page would.

use std::collections::HashMap;

use draftgate_oauth2::{Authenticator, Credential, LoopbackAuthenticator, OAuthError, TokenClient};
use draftgate_types::SecretString;
use draftgate_types::config::{OAuthConfig, OAuthPreset};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> OAuthConfig {
    OAuthConfig {
        preset: OAuthPreset::Custom,
        client_id: "test-client".into(),
        auth_url: Some("https://auth.example.com/authorize".into()),
        token_url: Some(format!("{}/token", server.uri())),
        ..OAuthConfig::default()
    }
}

fn authenticator(server: &MockServer) -> LoopbackAuthenticator {
    let tokens = TokenClient::new(config(server)).with_client_secret(SecretString::new("s3cret"));
    LoopbackAuthenticator::with_token_client(tokens).without_browser()
}

fn query(url: &str) -> HashMap<String, String> {
    url::Url::parse(url).unwrap().query_pairs().into_owned().collect()
}

#[tokio::test]
async fn callback_code_is_exchanged_for_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code-1"))
        .and(body_string_contains("code_verifier="))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.fresh",
            "refresh_token": "1//refresh",
            "expires_in": 3599,
            "token_type": "Bearer",
            "scope": "https://www.googleapis.com/auth/gmail.compose"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pending = authenticator(&server).begin().await.unwrap();
    let params = query(pending.authorize_url());
    let callback = format!(
        "{}?state={}&code=auth-code-1",
        pending.redirect_uri(),
        params["state"]
    );

    let browser = tokio::spawn(async move { reqwest::get(callback).await.unwrap().status() });
    let credential = pending.complete().await.unwrap();

    assert_eq!(browser.await.unwrap(), 200);
    assert_eq!(credential.access_token, "ya29.fresh");
    assert_eq!(credential.refresh_token.as_deref(), Some("1//refresh"));
    assert!(credential.principal.is_empty());
    assert!(!credential.is_expired());
}

#[tokio::test]
async fn stray_connections_do_not_end_the_wait() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("code=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.after-preconnect",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pending = authenticator(&server).begin().await.unwrap();
    let params = query(pending.authorize_url());
    let redirect = url::Url::parse(pending.redirect_uri()).unwrap();
    let addr = format!("{}:{}", redirect.host_str().unwrap(), redirect.port().unwrap());
    let callback = format!("{}?state={}&code=abc", pending.redirect_uri(), params["state"]);

    let browser = tokio::spawn(async move {
        // A speculative preconnect that never sends a request.
        drop(TcpStream::connect(&addr).await.unwrap());

        let mut garbled = TcpStream::connect(&addr).await.unwrap();
        garbled.write_all(b"\x16\x03\x01 junk\r\n\r\n").await.unwrap();
        garbled.shutdown().await.unwrap();

        reqwest::get(callback).await.unwrap().status()
    });
    let credential = pending.complete().await.unwrap();

    assert_eq!(browser.await.unwrap(), 200);
    assert_eq!(credential.access_token, "ya29.after-preconnect");
}

#[tokio::test]
async fn forged_state_aborts_without_token_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pending = authenticator(&server).begin().await.unwrap();
    let callback = format!("{}?state=forged&code=c", pending.redirect_uri());

    let browser = tokio::spawn(async move { reqwest::get(callback).await.unwrap().status() });
    let err = pending.complete().await.unwrap_err();

    assert_eq!(browser.await.unwrap(), 400);
    assert!(matches!(err, OAuthError::StateMismatch));
}

#[tokio::test]
async fn token_endpoint_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Bad Request"
        })))
        .mount(&server)
        .await;

    let pending = authenticator(&server).begin().await.unwrap();
    let params = query(pending.authorize_url());
    let callback = format!("{}?state={}&code=stale", pending.redirect_uri(), params["state"]);

    let browser = tokio::spawn(async move { reqwest::get(callback).await.map(|r| r.status()) });
    let err = pending.complete().await.unwrap_err();
    let _ = browser.await;

    assert!(matches!(err, OAuthError::TokenRequest(ref m) if m.contains("Bad Request")));
}

#[tokio::test]
async fn refresh_keeps_principal_and_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.refreshed",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let existing = Credential {
        principal: "ana@kogo.ai".into(),
        access_token: "ya29.old".into(),
        refresh_token: Some("1//keep".into()),
        token_type: "Bearer".into(),
        expires_at: Some(0),
        scopes: vec!["https://www.googleapis.com/auth/gmail.compose".into()],
    };

    let refreshed = authenticator(&server).refresh(&existing).await.unwrap();
    assert_eq!(refreshed.principal, "ana@kogo.ai");
    assert_eq!(refreshed.access_token, "ya29.refreshed");
    assert_eq!(refreshed.refresh_token.as_deref(), Some("1//keep"));
    assert!(!refreshed.is_expired());
}

#[tokio::test]
async fn refresh_without_refresh_token_fails_fast() {
    let server = MockServer::start().await;
    let existing = Credential {
        principal: "ana@kogo.ai".into(),
        access_token: "t".into(),
        refresh_token: None,
        token_type: "Bearer".into(),
        expires_at: Some(0),
        scopes: vec![],
    };
    let err = authenticator(&server).refresh(&existing).await.unwrap_err();
    assert!(matches!(err, OAuthError::NoRefreshToken));
}
