//! Address list handling.
//!
//! Recipient fields are entered as comma-separated text. Parsing only
//! splits and trims; no RFC 5322 validation is attempted.

/// Split a comma-separated list, trimming whitespace and dropping
/// empty entries. Order is preserved.
pub fn parse_address_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Join addresses for display.
pub fn join_addresses(addresses: &[String]) -> String {
    addresses.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_entries() {
        assert_eq!(
            parse_address_list("a@x.com,  b@y.com "),
            vec!["a@x.com".to_string(), "b@y.com".to_string()]
        );
    }

    #[test]
    fn drops_empty_entries() {
        assert_eq!(parse_address_list(" , a@x.com,,"), vec!["a@x.com".to_string()]);
        assert!(parse_address_list("   ").is_empty());
        assert!(parse_address_list("").is_empty());
    }

    #[test]
    fn keeps_order_and_duplicates() {
        assert_eq!(
            parse_address_list("z@x.com, a@x.com, z@x.com"),
            vec!["z@x.com", "a@x.com", "z@x.com"]
        );
    }

    #[test]
    fn join_uses_comma_space() {
        let list = vec!["a@x.com".to_string(), "b@y.com".to_string()];
        assert_eq!(join_addresses(&list), "a@x.com, b@y.com");
        assert_eq!(join_addresses(&[]), "");
    }
}
