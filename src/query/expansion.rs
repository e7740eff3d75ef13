//! Synonym-based query expansion.
//!
//! Expansion is strictly best-effort: it appends a bounded number of
//! synonym terms after the original cleaned query and never removes or
//! reorders the original text. When the lexical resource cannot be loaded
//! the expander degrades to pass-through instead of failing the pipeline.
//! Expanded text feeds only the embedding step; explanations always use
//! the original cleaned query.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::tokenize;
use crate::error::{LoupeError, Result};

/// Default cap on synonyms appended per query token.
pub const DEFAULT_MAX_TERMS_PER_TOKEN: usize = 2;

/// Synonym dictionary for term expansion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynonymDictionary {
    synonyms: HashMap<String, Vec<String>>,
}

impl SynonymDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a synonym dictionary from a JSON file.
    ///
    /// The file contains an array of synonym groups, each group an array
    /// of terms that are synonyms of each other:
    ///
    /// ```json
    /// [
    ///   ["ml", "machine learning", "machine-learning"],
    ///   ["ai", "artificial intelligence"]
    /// ]
    /// ```
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LoupeError::other(format!("failed to read synonym dictionary '{path}': {e}"))
        })?;

        let groups: Vec<Vec<String>> = serde_json::from_str(&content).map_err(|e| {
            LoupeError::other(format!("failed to parse synonym dictionary '{path}': {e}"))
        })?;

        let mut dict = Self::new();
        for group in groups {
            if !group.is_empty() {
                dict.add_synonym_group(group);
            }
        }
        Ok(dict)
    }

    /// Look up synonyms for a term.
    pub fn get_synonyms(&self, term: &str) -> Option<&Vec<String>> {
        self.synonyms.get(term)
    }

    /// Register a group of mutually synonymous terms.
    pub fn add_synonym_group(&mut self, terms: Vec<String>) {
        for (i, term) in terms.iter().enumerate() {
            let mut synonyms = Vec::new();
            for (j, other_term) in terms.iter().enumerate() {
                if i != j {
                    synonyms.push(other_term.clone());
                }
            }
            self.synonyms.insert(term.clone(), synonyms);
        }
    }

    /// Number of terms with at least one synonym.
    pub fn len(&self) -> usize {
        self.synonyms.len()
    }

    /// Whether the dictionary holds no synonyms.
    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty()
    }
}

/// Best-effort query expander over a synonym dictionary.
#[derive(Debug, Clone)]
pub struct QueryExpander {
    dictionary: SynonymDictionary,
    max_terms_per_token: usize,
}

impl QueryExpander {
    /// Create an expander over the given dictionary.
    pub fn new(dictionary: SynonymDictionary) -> Self {
        Self {
            dictionary,
            max_terms_per_token: DEFAULT_MAX_TERMS_PER_TOKEN,
        }
    }

    /// Create an expander from a JSON dictionary file, degrading to
    /// pass-through (an empty dictionary) when the resource is missing or
    /// unparsable.
    pub fn from_file_or_passthrough(path: &str) -> Self {
        match SynonymDictionary::load_from_file(path) {
            Ok(dictionary) => {
                log::info!(
                    "loaded synonym dictionary '{path}': {} terms",
                    dictionary.len()
                );
                Self::new(dictionary)
            }
            Err(e) => {
                log::warn!("query expansion degraded to pass-through: {e}");
                Self::new(SynonymDictionary::new())
            }
        }
    }

    /// Override the per-token synonym cap.
    pub fn with_max_terms_per_token(mut self, max_terms_per_token: usize) -> Self {
        self.max_terms_per_token = max_terms_per_token;
        self
    }

    /// Expand a cleaned query with synonym terms.
    ///
    /// The original query is kept verbatim at the front; synonyms are
    /// appended after it. Tokens that are not purely alphabetic are
    /// skipped.
    pub fn expand(&self, cleaned_query: &str) -> String {
        let mut expanded_terms: Vec<&str> = Vec::new();
        for token in tokenize(cleaned_query) {
            if !token.chars().all(|c| c.is_alphabetic()) {
                continue;
            }
            if let Some(synonyms) = self.dictionary.get_synonyms(token) {
                for synonym in synonyms.iter().take(self.max_terms_per_token) {
                    expanded_terms.push(synonym);
                }
            }
        }

        if expanded_terms.is_empty() {
            return cleaned_query.to_string();
        }
        format!("{cleaned_query} {}", expanded_terms.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> SynonymDictionary {
        let mut dict = SynonymDictionary::new();
        dict.add_synonym_group(vec![
            "big".to_string(),
            "large".to_string(),
            "huge".to_string(),
        ]);
        dict
    }

    #[test]
    fn test_synonym_group_excludes_self() {
        let dict = dictionary();
        let synonyms = dict.get_synonyms("big").unwrap();
        assert!(synonyms.contains(&"large".to_string()));
        assert!(synonyms.contains(&"huge".to_string()));
        assert!(!synonyms.contains(&"big".to_string()));
    }

    #[test]
    fn test_expand_keeps_original_prefix() {
        let expander = QueryExpander::new(dictionary());
        let expanded = expander.expand("big data");
        assert!(expanded.starts_with("big data"));
        assert!(expanded.contains("large"));
    }

    #[test]
    fn test_expand_bounds_terms_per_token() {
        let expander = QueryExpander::new(dictionary()).with_max_terms_per_token(1);
        let expanded = expander.expand("big");
        // Original plus exactly one synonym.
        assert_eq!(expanded.split_whitespace().count(), 2);
    }

    #[test]
    fn test_expand_skips_non_alphabetic_tokens() {
        let mut dict = dictionary();
        dict.add_synonym_group(vec!["42".to_string(), "forty-two".to_string()]);
        let expander = QueryExpander::new(dict);
        assert_eq!(expander.expand("42"), "42");
    }

    #[test]
    fn test_expand_without_matches_is_identity() {
        let expander = QueryExpander::new(dictionary());
        assert_eq!(expander.expand("quantum physics"), "quantum physics");
    }

    #[test]
    fn test_missing_resource_degrades_to_passthrough() {
        let expander = QueryExpander::from_file_or_passthrough("/nonexistent/synonyms.json");
        assert_eq!(expander.expand("big data"), "big data");
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("synonyms.json");
        std::fs::write(&path, r#"[["ml", "machine learning"], ["ai"]]"#)?;

        let dict = SynonymDictionary::load_from_file(path.to_str().unwrap())?;
        assert!(dict.get_synonyms("ml").is_some());
        // Single-term groups produce no synonyms for that term.
        assert_eq!(dict.get_synonyms("ai").map(|s| s.len()), Some(0));
        Ok(())
    }
}
