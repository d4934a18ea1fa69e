//! Small text helpers shared by config, adapters and the CLI.

/// Trim optional text and drop it when nothing is left.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

const ERROR_TEXT_LIMIT: usize = 180;

/// Whether `value` has an `http` or `https` scheme (scheme matched case-insensitively).
pub fn is_http_url(value: &str) -> bool {
    value.split_once("://").is_some_and(|(scheme, rest)| {
        !rest.is_empty()
            && (scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"))
    })
}

/// Trim a response body and cut it down for use in an error message.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(ERROR_TEXT_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_option_rejects_empty() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some("   ".to_string())), None);
    }

    #[test]
    fn normalize_text_option_trims_value() {
        assert_eq!(
            normalize_text_option(Some(" https://api.example.com/graphql ".to_string())),
            Some("https://api.example.com/graphql".to_string())
        );
    }

    #[test]
    fn is_http_url_accepts_valid_schemes() {
        assert!(is_http_url("http://localhost:20002/graphql"));
        assert!(is_http_url("https://example.appsync-api.eu-west-1.amazonaws.com/graphql"));
        assert!(is_http_url("HTTPS://api.example.com/graphql"));
        assert!(!is_http_url("wss://example.com"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("example.com"));
    }

    #[test]
    fn compact_text_caps_length() {
        let long = "x".repeat(500);
        assert_eq!(compact_text(&long).len(), ERROR_TEXT_LIMIT);
        assert_eq!(compact_text("  short  "), "short");
    }
}
