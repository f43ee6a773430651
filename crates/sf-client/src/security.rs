//! Security utilities for Salesforce API operations.
//!
//! ## SOQL string literals
//!
//! Values substituted into SOQL must be escaped. The query builder in
//! `sfrecord-rest` does this for every parameter; use [`soql::escape_string`]
//! directly only when assembling a query by hand.
//!
//! ```rust
//! use sfrecord_client::security::soql;
//!
//! let name = soql::escape_string("O'Brien");
//! let query = format!("SELECT Id FROM Account WHERE Name = '{}'", name);
//! assert_eq!(query, r"SELECT Id FROM Account WHERE Name = 'O\'Brien'");
//! ```
//!
//! ## URL path segments
//!
//! ```rust
//! use sfrecord_client::security::url;
//!
//! let encoded_id = url::encode_param("001/test");
//! assert_eq!(encoded_id, "001%2Ftest");
//! ```
//!
//! ## Secrets
//!
//! Passwords and client secrets are never written to errors or logs as-is;
//! [`secret::digest`] replaces them with a SHA-256 hex digest.

/// SOQL escaping utilities for injection prevention.
pub mod soql {
    /// Escape a string value for use inside a single-quoted SOQL literal.
    ///
    /// | input            | output |
    /// |------------------|--------|
    /// | newline          | `\n`   |
    /// | carriage return  | `\r`   |
    /// | tab              | `\t`   |
    /// | bell (`\x07`)    | `\b`   |
    /// | form feed        | `\f`   |
    /// | `"`              | `\"`   |
    /// | `'`              | `\'`   |
    /// | `\`              | `\\`   |
    ///
    /// # Example
    ///
    /// ```rust
    /// use sfrecord_client::security::soql;
    ///
    /// let safe = soql::escape_string("' OR Name LIKE '%");
    /// assert_eq!(safe, r"\' OR Name LIKE \'%");
    /// ```
    #[must_use]
    pub fn escape_string(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 16);
        for ch in value.chars() {
            match ch {
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                '\u{07}' => escaped.push_str("\\b"),
                '\u{0c}' => escaped.push_str("\\f"),
                '"' => escaped.push_str("\\\""),
                '\'' => escaped.push_str("\\'"),
                '\\' => escaped.push_str("\\\\"),
                _ => escaped.push(ch),
            }
        }
        escaped
    }
}

/// URL encoding utilities for parameter safety.
pub mod url {
    /// URL-encode a path segment or parameter value.
    ///
    /// Slashes are encoded, so a value can never escape its segment.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sfrecord_client::security::url;
    ///
    /// assert_eq!(url::encode_param("001/../../secret"), "001%2F..%2F..%2Fsecret");
    /// ```
    #[must_use]
    pub fn encode_param(value: &str) -> String {
        urlencoding::encode(value).into_owned()
    }
}

/// Helpers for keeping secrets out of messages.
pub mod secret {
    use sha2::{Digest, Sha256};

    const MAX_MESSAGE_LENGTH: usize = 500;

    /// SHA-256 hex digest of a secret value.
    ///
    /// ```rust
    /// use sfrecord_client::security::secret;
    ///
    /// let hashed = secret::digest("hunter2");
    /// assert_eq!(hashed.len(), 64);
    /// assert_ne!(hashed, "hunter2");
    /// ```
    #[must_use]
    pub fn digest(value: &str) -> String {
        format!("{:x}", Sha256::digest(value.as_bytes()))
    }

    /// Strip access tokens and session ids from a remote message and cap its
    /// length.
    #[must_use]
    pub fn sanitize_message(message: &str) -> String {
        let mut sanitized = message.to_string();

        // Access tokens look like `00D...!...`
        if let Ok(token) = regex_lite::Regex::new(r"00[A-Za-z0-9]{13,}[!][A-Za-z0-9_.]+") {
            sanitized = token
                .replace_all(&sanitized, "[REDACTED_TOKEN]")
                .into_owned();
        }

        if let Ok(session) = regex_lite::Regex::new(r"sid=[A-Za-z0-9]{20,}") {
            sanitized = session
                .replace_all(&sanitized, "sid=[REDACTED]")
                .into_owned();
        }

        if sanitized.chars().count() > MAX_MESSAGE_LENGTH {
            sanitized = sanitized.chars().take(MAX_MESSAGE_LENGTH).collect();
            sanitized.push_str("...[truncated]");
        }

        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod soql_tests {
        use super::*;

        #[test]
        fn test_escape_string_basic() {
            assert_eq!(soql::escape_string("O'Brien"), "O\\'Brien");
            assert_eq!(soql::escape_string("plain text"), "plain text");
        }

        #[test]
        fn test_escape_string_each_special_char() {
            let cases = [
                ("\n", "\\n"),
                ("\r", "\\r"),
                ("\t", "\\t"),
                ("\u{07}", "\\b"),
                ("\u{0c}", "\\f"),
                ("\"", "\\\""),
                ("'", "\\'"),
                ("\\", "\\\\"),
            ];

            for (input, expected) in cases {
                assert_eq!(soql::escape_string(input), expected, "input {:?}", input);
            }
        }

        #[test]
        fn test_escape_string_injection_attempts() {
            assert_eq!(
                soql::escape_string("' OR '1'='1"),
                "\\' OR \\'1\\'=\\'1"
            );
            // A trailing backslash cannot swallow the closing quote.
            assert_eq!(soql::escape_string("abc\\"), "abc\\\\");
        }
    }

    mod url_tests {
        use super::*;

        #[test]
        fn test_encode_param() {
            assert_eq!(url::encode_param("simple"), "simple");
            assert_eq!(url::encode_param("with space"), "with%20space");
            assert_eq!(url::encode_param("a/b?c=d"), "a%2Fb%3Fc%3Dd");
        }
    }

    mod secret_tests {
        use super::*;

        #[test]
        fn test_digest_is_stable_sha256() {
            assert_eq!(
                secret::digest("abc"),
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
            );
        }

        #[test]
        fn test_sanitize_message() {
            let message = "bad token 00D000000000001!AQ.abc_def and sid=abcdefghijklmnopqrstuvwxyz";
            let sanitized = secret::sanitize_message(message);
            assert!(sanitized.contains("[REDACTED_TOKEN]"));
            assert!(sanitized.contains("sid=[REDACTED]"));
            assert!(!sanitized.contains("AQ.abc_def"));
        }

        #[test]
        fn test_sanitize_truncates() {
            let long = "é".repeat(600);
            let sanitized = secret::sanitize_message(&long);
            assert!(sanitized.ends_with("...[truncated]"));
            assert_eq!(sanitized.chars().count(), 500 + "...[truncated]".len());
        }
    }
}
