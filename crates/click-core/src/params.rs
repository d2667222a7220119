//! Ordered, multi-valued request parameters.

use std::collections::BTreeMap;

use url::form_urlencoded;

/// Request parameters decoded from a query string or a form body.
///
/// Order and duplicates are preserved so multi-select fields see every
/// submitted value. Names are matched exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    entries: Vec<(String, String)>,
}

impl RequestParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `application/x-www-form-urlencoded` text.
    ///
    /// A leading `?` is ignored.
    pub fn parse(encoded: &str) -> Self {
        let encoded = encoded.strip_prefix('?').unwrap_or(encoded);
        form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect()
    }

    /// Get the first value of a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get every value of a parameter in submission order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Check whether a parameter was submitted.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    /// Distinct parameter names in first-seen order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (k, _) in &self.entries {
            if !names.contains(&k.as_str()) {
                names.push(k);
            }
        }
        names
    }

    /// Append a value, keeping existing values of the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replace every value of a parameter with a single value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.entries.push((name, value.into()));
    }

    /// Remove every value of a parameter.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(k, _)| k != name);
    }

    /// Append all parameters from another set.
    pub fn extend(&mut self, other: RequestParams) {
        self.entries.extend(other.entries);
    }

    /// Iterate over all name/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of name/value pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no parameters were submitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First value of each parameter keyed by name, sorted.
    pub fn sorted(&self) -> BTreeMap<&str, &str> {
        let mut sorted = BTreeMap::new();
        for (k, v) in &self.entries {
            sorted.entry(k.as_str()).or_insert(v.as_str());
        }
        sorted
    }

    /// Encode back into a query string (without the leading `?`).
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.entries {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }
}

impl FromIterator<(String, String)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let params = RequestParams::parse("?actionLink=delete&value=42");

        assert_eq!(params.get("actionLink"), Some("delete"));
        assert_eq!(params.get("value"), Some("42"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_parse_decodes_plus_and_percent() {
        let params = RequestParams::parse("name=John+Smith&note=a%26b%3Dc");

        assert_eq!(params.get("name"), Some("John Smith"));
        assert_eq!(params.get("note"), Some("a&b=c"));
    }

    #[test]
    fn test_multi_values_preserve_order() {
        let params = RequestParams::parse("state=QLD&state=NSW&other=1&state=VIC");

        assert_eq!(params.get("state"), Some("QLD"));
        assert_eq!(params.get_all("state"), vec!["QLD", "NSW", "VIC"]);
        assert_eq!(params.names(), vec!["state", "other"]);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let params = RequestParams::parse("Name=a");

        assert!(params.contains("Name"));
        assert!(!params.contains("name"));
    }

    #[test]
    fn test_empty_value_is_present() {
        let params = RequestParams::parse("ok=&other");

        assert!(params.contains("ok"));
        assert_eq!(params.get("ok"), Some(""));
        assert_eq!(params.get("other"), Some(""));
    }

    #[test]
    fn test_set_replaces_all_values() {
        let mut params = RequestParams::parse("a=1&a=2");
        params.set("a", "3");

        assert_eq!(params.get_all("a"), vec!["3"]);
    }

    #[test]
    fn test_extend_appends() {
        let mut query = RequestParams::parse("page=2");
        query.extend(RequestParams::parse("page=3&form_name=form"));

        assert_eq!(query.get_all("page"), vec!["2", "3"]);
        assert_eq!(query.get("form_name"), Some("form"));
    }

    #[test]
    fn test_sorted_uses_first_value() {
        let params = RequestParams::parse("b=2&a=1&b=3");
        let sorted: Vec<_> = params.sorted().into_iter().collect();

        assert_eq!(sorted, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_query_string_encodes() {
        let params: RequestParams = vec![("q", "a b&c"), ("page", "1")].into_iter().collect();

        assert_eq!(params.to_query_string(), "q=a+b%26c&page=1");
        assert_eq!(RequestParams::parse(&params.to_query_string()), params);
    }
}
