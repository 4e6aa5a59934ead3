//! Domain allow-list check.

use std::collections::BTreeSet;

use crate::error::{AssistantError, Result};

/// Domains whose users may use the assistant.
pub const ALLOWED_DOMAINS: &[&str] = &["iands.com", "kogo.ai"];

/// Decides whether a principal may act, from the domain of its email
/// address alone.
///
/// Matching is exact and case-insensitive on the part after the last
/// `@`; subdomains of an allowed domain are not allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGate {
    domains: BTreeSet<String>,
}

impl AccessGate {
    /// The compiled-in allow-list.
    pub fn builtin() -> Self {
        Self::new(ALLOWED_DOMAINS.iter().copied())
    }

    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.as_ref().trim().to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }

    /// The text after the last `@`, or `None` when there is no `@` or
    /// nothing follows it.
    pub fn domain_of(email: &str) -> Option<&str> {
        let (_, domain) = email.rsplit_once('@')?;
        (!domain.is_empty()).then_some(domain)
    }

    pub fn is_allowed(&self, email: &str) -> bool {
        Self::domain_of(email)
            .is_some_and(|domain| self.domains.contains(&domain.to_ascii_lowercase()))
    }

    pub fn check(&self, email: &str) -> Result<()> {
        if self.is_allowed(email) {
            Ok(())
        } else {
            Err(AssistantError::AuthorizationDenied {
                email: email.to_string(),
            })
        }
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_domains() {
        let gate = AccessGate::builtin();
        assert_eq!(gate.domains().collect::<Vec<_>>(), vec!["iands.com", "kogo.ai"]);
    }

    #[test]
    fn allowed_domains_pass() {
        let gate = AccessGate::builtin();
        assert!(gate.is_allowed("alice@iands.com"));
        assert!(gate.is_allowed("bob@kogo.ai"));
    }

    #[test]
    fn case_insensitive() {
        let gate = AccessGate::builtin();
        assert!(gate.is_allowed("Alice@IANDS.COM"));
        assert!(gate.is_allowed("bob@Kogo.Ai"));
    }

    #[test]
    fn local_part_is_irrelevant() {
        let gate = AccessGate::builtin();
        for local in ["a", "first.last", "x+tag", "weird@local", ""] {
            assert!(gate.is_allowed(&format!("{local}@kogo.ai")), "{local}");
            assert!(!gate.is_allowed(&format!("{local}@gmail.com")), "{local}");
        }
    }

    #[test]
    fn other_domains_rejected() {
        let gate = AccessGate::builtin();
        assert!(!gate.is_allowed("eve@gmail.com"));
        assert!(!gate.is_allowed("eve@iands.com.evil.io"));
        assert!(!gate.is_allowed("eve@notiands.com"));
    }

    #[test]
    fn subdomains_rejected() {
        let gate = AccessGate::builtin();
        assert!(!gate.is_allowed("ops@mail.iands.com"));
    }

    #[test]
    fn malformed_addresses_rejected() {
        let gate = AccessGate::builtin();
        assert!(!gate.is_allowed("iands.com"));
        assert!(!gate.is_allowed("alice@"));
        assert!(!gate.is_allowed(""));
    }

    #[test]
    fn domain_of_uses_last_at() {
        assert_eq!(AccessGate::domain_of("a@b@iands.com"), Some("iands.com"));
        assert_eq!(AccessGate::domain_of("nobody"), None);
        assert_eq!(AccessGate::domain_of("x@"), None);
    }

    #[test]
    fn repeated_calls_agree() {
        let gate = AccessGate::builtin();
        for email in ["alice@iands.com", "eve@gmail.com", "", "x@KOGO.AI"] {
            assert_eq!(gate.is_allowed(email), gate.is_allowed(email));
        }
    }

    #[test]
    fn check_reports_denied_email() {
        let gate = AccessGate::builtin();
        assert!(gate.check("alice@iands.com").is_ok());
        match gate.check("eve@gmail.com") {
            Err(AssistantError::AuthorizationDenied { email }) => assert_eq!(email, "eve@gmail.com"),
            other => panic!("expected AuthorizationDenied, got {other:?}"),
        }
    }

    #[test]
    fn custom_gate_normalizes_entries() {
        let gate = AccessGate::new([" Example.COM ", ""]);
        assert!(gate.is_allowed("x@example.com"));
        assert_eq!(gate.domains().count(), 1);
    }
}
