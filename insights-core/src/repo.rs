//! Repository metadata record — the form input that drives the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary language choices offered by the input form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    Python,
    JavaScript,
    Java,
    #[serde(rename = "C++")]
    Cpp,
    Other,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::Java => "Java",
            Language::Cpp => "C++",
            Language::Other => "Other",
        };
        f.write_str(name)
    }
}

/// User-entered repository metadata. Immutable once built; passed by value
/// into prompt construction and storage. No sanitization is applied to the
/// free-text fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoRecord {
    pub url: String,
    pub description: String,
    pub stars: u64,
    pub language: Language,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_display_matches_form_labels() {
        assert_eq!(Language::Python.to_string(), "Python");
        assert_eq!(Language::JavaScript.to_string(), "JavaScript");
        assert_eq!(Language::Java.to_string(), "Java");
        assert_eq!(Language::Cpp.to_string(), "C++");
        assert_eq!(Language::Other.to_string(), "Other");
    }

    #[test]
    fn test_language_serde_roundtrip_cpp() {
        let json = serde_json::to_string(&Language::Cpp).unwrap();
        assert_eq!(json, "\"C++\"");
        let back: Language = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Language::Cpp);
    }

    #[test]
    fn test_record_serializes_all_fields() {
        let record = RepoRecord {
            url: "https://github.com/a/b".to_string(),
            description: "A CLI tool".to_string(),
            stars: 42,
            language: Language::Other,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["url"], "https://github.com/a/b");
        assert_eq!(value["description"], "A CLI tool");
        assert_eq!(value["stars"], 42);
        assert_eq!(value["language"], "Other");
    }
}
