//! Loosely-typed form payloads.
//!
//! The web layer extracts per-type fields into a string-keyed map; the
//! request model builder is the only place that imposes structure on it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single form value: free text or a list (member pickers, account lists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Text(String),
    List(Vec<String>),
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for FormValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for FormValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Extracted form fields for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(HashMap<String, FormValue>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mainly for tests.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Text value if the field is present and textual.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(FormValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Text value with an empty-string default.
    pub fn text(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// List value with an empty default; a lone text value becomes a
    /// one-element list.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(FormValue::List(items)) => items.clone(),
            Some(FormValue::Text(s)) => vec![s.clone()],
            None => Vec::new(),
        }
    }

    /// Whether the field was submitted at all.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_defaults_to_empty_string() {
        let form = FormData::new().with("comment", "hello");
        assert_eq!(form.text("comment"), "hello");
        assert_eq!(form.text("missing"), "");
    }

    #[test]
    fn list_defaults_to_empty() {
        let form = FormData::new().with("target_users", vec!["alice", "bob"]);
        assert_eq!(form.list("target_users"), vec!["alice", "bob"]);
        assert!(form.list("missing").is_empty());
    }

    #[test]
    fn list_promotes_single_text_value() {
        let form = FormData::new().with("accounts", "12345");
        assert_eq!(form.list("accounts"), vec!["12345"]);
    }

    #[test]
    fn contains_distinguishes_absent_from_empty() {
        let form = FormData::new().with("job_id", "");
        assert!(form.contains("job_id"));
        assert!(!form.contains("error_message"));
    }

    #[test]
    fn deserializes_mixed_values() {
        let form: FormData = serde_json::from_value(serde_json::json!({
            "software_name": "gromacs",
            "target_users": ["alice", "bob"],
        }))
        .unwrap();
        assert_eq!(form.get("software_name"), Some("gromacs"));
        assert_eq!(form.list("target_users"), vec!["alice", "bob"]);
    }
}
