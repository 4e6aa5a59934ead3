//! CSRF state and PKCE helpers.

use base64::Engine;
use rand::Rng;
use sha2::Digest;

/// 32 random bytes, hex encoded (64 characters).
pub fn generate_state() -> String {
    random_bytes().iter().map(|b| format!("{b:02x}")).collect()
}

/// A PKCE code verifier: 32 random bytes, base64url without padding.
pub fn generate_verifier() -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes())
}

/// S256 code challenge for `verifier`.
pub fn challenge_for(verifier: &str) -> String {
    let hash = sha2::Sha256::digest(verifier.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash)
}

fn random_bytes() -> [u8; 32] {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    bytes
}
