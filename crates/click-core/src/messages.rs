//! Message catalogue for control labels and validation errors.

use std::collections::HashMap;
use std::fmt::Display;

/// Default control messages.
const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    ("field-required-error", "You must enter a value for {0}"),
    ("field-minlength-error", "{0} must be at least {1} characters"),
    ("field-maxlength-error", "{0} must be no longer than {1} characters"),
    ("integer-format-error", "{0} must be a whole number"),
    ("double-format-error", "{0} must be a number"),
    ("number-minvalue-error", "{0} must not be smaller than {1}"),
    ("number-maxvalue-error", "{0} must not be larger than {1}"),
    ("not-checked-error", "You must select {0}"),
    ("select-error", "You must choose a value for {0}"),
    ("label-required-prefix", ""),
    ("label-required-postfix", "<span class=\"required\">*</span>"),
    ("table-first-label", "First"),
    ("table-previous-label", "Prev"),
    ("table-next-label", "Next"),
    ("table-last-label", "Last"),
    ("table-no-rows-found", "No records found."),
    ("table-page-banner", "{0} items found, displaying {1} to {2}."),
    ("table-page-banner-nolinks", "{0} items found."),
];

/// Replace `{0}`, `{1}`, ... in `pattern` with the given arguments.
///
/// Placeholders without a matching argument are left as written.
pub fn format_message(pattern: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(pattern.len() + 16);
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let index = &after[..close];
                match index.parse::<usize>().ok().and_then(|i| args.get(i)) {
                    Some(arg) => out.push_str(&arg.to_string()),
                    None => {
                        out.push('{');
                        out.push_str(index);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// A catalogue of named messages.
///
/// Starts from the framework defaults; applications override entries
/// through configuration.
#[derive(Debug, Clone)]
pub struct Messages {
    entries: HashMap<String, String>,
}

impl Messages {
    /// Catalogue with the framework defaults.
    pub fn new() -> Self {
        Self {
            entries: DEFAULT_MESSAGES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Catalogue with no entries.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add overrides on top of the current entries.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.extend(overrides);
        self
    }

    /// Add or replace entries.
    pub fn extend<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.entries
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Get a raw message.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    /// Get a message, or an empty string when missing.
    pub fn text(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// Format a message with arguments.
    ///
    /// A missing key formats to the key itself so the gap is visible.
    pub fn format(&self, key: &str, args: &[&dyn Display]) -> String {
        match self.get(key) {
            Some(pattern) => format_message(pattern, args),
            None => {
                tracing::warn!(key, "message not found");
                key.to_string()
            }
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        assert_eq!(
            format_message("{0} must be at least {1} characters", &[&"Name", &3]),
            "Name must be at least 3 characters"
        );
    }

    #[test]
    fn test_format_message_missing_argument() {
        assert_eq!(format_message("{0} and {1}", &[&"a"]), "a and {1}");
        assert_eq!(format_message("open { brace", &[]), "open { brace");
        assert_eq!(format_message("{x}", &[&1]), "{x}");
    }

    #[test]
    fn test_defaults_present() {
        let messages = Messages::new();

        assert_eq!(
            messages.format("field-required-error", &[&"Username"]),
            "You must enter a value for Username"
        );
        assert_eq!(messages.text("table-next-label"), "Next");
        assert!(!messages.is_empty());
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let messages = Messages::new()
            .with_overrides([("field-required-error", "{0} is required")]);

        assert_eq!(
            messages.format("field-required-error", &[&"Email"]),
            "Email is required"
        );
    }

    #[test]
    fn test_missing_key_formats_to_key() {
        let messages = Messages::empty();

        assert_eq!(messages.format("nope", &[]), "nope");
        assert_eq!(messages.text("nope"), "");
        assert_eq!(messages.len(), 0);
    }
}
