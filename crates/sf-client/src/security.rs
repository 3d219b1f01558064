//! Security utilities shared by every crate that builds Salesforce requests.
//!
//! ## API name validation
//!
//! SObject and field names end up inside URL paths (collections upsert,
//! describe). They MUST be validated before being interpolated:
//!
//! ```rust
//! use cloudy_sf_client::security::names;
//!
//! assert!(names::is_safe_api_name("Account"));
//! assert!(names::is_safe_api_name("External_Key__c"));
//! assert!(!names::is_safe_api_name("Account/../../limits"));
//! ```
//!
//! ## XML escaping
//!
//! Values placed into SOAP envelopes (login username, password) MUST be
//! escaped with [`xml::escape`].

use std::sync::LazyLock;

/// Validation of Salesforce API names (SObjects, fields, relationships).
pub mod names {
    /// Validate that an API name contains only safe characters.
    ///
    /// API names start with a letter and contain only ASCII alphanumerics and
    /// underscores, which covers custom suffixes such as `__c`, `__r`, `__mdt`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cloudy_sf_client::security::names;
    ///
    /// assert!(names::is_safe_api_name("Custom_Field__c"));
    /// assert!(!names::is_safe_api_name("Bad'; DROP TABLE--"));
    /// assert!(!names::is_safe_api_name("1Account"));
    /// ```
    #[must_use]
    pub fn is_safe_api_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {}
            _ => return false,
        }
        chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    }
}

/// XML escaping utilities for SOAP envelopes.
pub mod xml {
    /// Escape a string for safe inclusion in XML content.
    ///
    /// This escapes the five predefined XML entities.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cloudy_sf_client::security::xml;
    ///
    /// let safe = xml::escape("p&ss<word>");
    /// assert_eq!(safe, "p&amp;ss&lt;word&gt;");
    /// ```
    #[must_use]
    pub fn escape(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 16);
        for ch in value.chars() {
            match ch {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                _ => escaped.push(ch),
            }
        }
        escaped
    }
}

// Salesforce session ids start with the org id ("00D...") followed by '!'.
static TOKEN_PATTERN: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"00[A-Za-z0-9]{13,}[!][A-Za-z0-9_.]+").expect("valid token pattern")
});

static SESSION_PATTERN: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"sid=[A-Za-z0-9]{20,}").expect("valid sid pattern"));

const MAX_DISPLAY_LENGTH: usize = 500;

/// Redact session tokens from text meant for display and cap its length.
///
/// Used for `Display` of HTTP errors; the raw body stays available on the
/// error value itself.
#[must_use]
pub fn redact(text: &str) -> String {
    let redacted = TOKEN_PATTERN.replace_all(text, "[REDACTED_TOKEN]");
    let mut redacted = SESSION_PATTERN
        .replace_all(&redacted, "sid=[REDACTED]")
        .into_owned();

    if redacted.len() > MAX_DISPLAY_LENGTH {
        let mut cut = MAX_DISPLAY_LENGTH;
        while !redacted.is_char_boundary(cut) {
            cut -= 1;
        }
        redacted.truncate(cut);
        redacted.push_str("...[truncated]");
    }

    redacted
}
