//! Candidate provider for autocompletion suggestions
//!
//! This module provides the lookup trait the completion core consumes and an
//! in-memory implementation backed by a list of records. Matching rules:
//! - Relation: the stored value must equal the query
//! - Hashtag / at-mention: the stored value must start with the query
//!
//! Results keep the provider's own order.

use std::fs;
use std::path::Path;
use std::sync::RwLock;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::category::TriggerCategory;
use crate::error::ProviderError;

/// A record the provider can suggest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Category the record belongs to
    #[serde(deserialize_with = "deserialize_category")]
    pub category: TriggerCategory,

    /// Stored value, matched against the query
    pub value: String,

    /// Extra text shown (and inserted) for relation records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_metadata: Option<String>,
}

impl CandidateRecord {
    /// Create a record without metadata
    pub fn new(category: TriggerCategory, value: impl Into<String>) -> Self {
        Self {
            category,
            value: value.into(),
            related_metadata: None,
        }
    }

    /// Attach related metadata
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.related_metadata = Some(metadata.into());
        self
    }

    /// Check whether this record answers `query` in `category`
    pub fn matches(&self, category: TriggerCategory, query: &str) -> bool {
        if self.category != category {
            return false;
        }
        match category {
            TriggerCategory::Relation => self.value == query,
            _ => self.value.starts_with(query),
        }
    }
}

/// Accept a category either by name or by numeric id
fn deserialize_category<'de, D>(deserializer: D) -> Result<TriggerCategory, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Id(u8),
        Name(String),
    }

    let raw = Raw::deserialize(deserializer)?;
    let category = match &raw {
        Raw::Id(id) => TriggerCategory::from_id(*id),
        Raw::Name(name) => TriggerCategory::from_name(name),
    };
    category.ok_or_else(|| {
        let shown = match raw {
            Raw::Id(id) => id.to_string(),
            Raw::Name(name) => name,
        };
        serde::de::Error::custom(format!("unknown category '{shown}'"))
    })
}

/// Trait for providing completion candidates
pub trait CandidateProvider: Send + Sync {
    /// Get the records matching `query` in `category`, in provider order
    fn lookup(
        &self,
        category: TriggerCategory,
        query: &str,
    ) -> Result<Vec<CandidateRecord>, ProviderError>;
}

/// Shape of a TOML candidate file
#[derive(Debug, Deserialize)]
struct CandidateFile {
    #[serde(default)]
    candidates: Vec<CandidateRecord>,
}

/// Thread-safe in-memory candidate store
#[derive(Debug, Default)]
pub struct MemoryCandidateProvider {
    records: RwLock<Vec<CandidateRecord>>,
}

impl MemoryCandidateProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider holding `records`
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = CandidateRecord>,
    {
        Self {
            records: RwLock::new(records.into_iter().collect()),
        }
    }

    /// Create a provider holding the sample set used by the terminal host
    pub fn with_samples() -> Self {
        Self::with_records(sample_records())
    }

    /// Load records from a TOML (`[[candidates]]`) or JSON (array) file.
    ///
    /// The format is chosen from the file extension; anything other than
    /// `.json` is read as TOML.
    ///
    /// # Arguments
    /// * `path` - Candidate file
    ///
    /// # Returns
    /// * `Result<Self, ProviderError>` - Loaded provider or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ProviderError::Unavailable(format!("{}: {e}", path.display()))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let records = if is_json {
            serde_json::from_str::<Vec<CandidateRecord>>(&content)
                .map_err(|e| ProviderError::InvalidData(e.to_string()))?
        } else {
            toml::from_str::<CandidateFile>(&content)
                .map_err(|e| ProviderError::InvalidData(e.to_string()))?
                .candidates
        };

        debug!("Loaded {} candidates from {}", records.len(), path.display());
        Ok(Self::with_records(records))
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CandidateProvider for MemoryCandidateProvider {
    fn lookup(
        &self,
        category: TriggerCategory,
        query: &str,
    ) -> Result<Vec<CandidateRecord>, ProviderError> {
        let records = self
            .records
            .read()
            .map_err(|_| ProviderError::Unavailable("candidate store poisoned".to_string()))?;

        Ok(records
            .iter()
            .filter(|record| record.matches(category, query))
            .cloned()
            .collect())
    }
}

/// Small demo set: two hashtags, two people and one relation
pub fn sample_records() -> Vec<CandidateRecord> {
    vec![
        CandidateRecord::new(TriggerCategory::Hashtag, "idea"),
        CandidateRecord::new(TriggerCategory::Hashtag, "idle"),
        CandidateRecord::new(TriggerCategory::AtMention, "Jacob Cole"),
        CandidateRecord::new(TriggerCategory::AtMention, "JSON Derulo"),
        CandidateRecord::new(TriggerCategory::Relation, "foods")
            .with_metadata("foodslists.tk - Google doc of foods people eat"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_provider() -> MemoryCandidateProvider {
        MemoryCandidateProvider::with_samples()
    }

    fn values(records: &[CandidateRecord]) -> Vec<&str> {
        records.iter().map(|r| r.value.as_str()).collect()
    }

    #[test]
    fn test_hashtag_prefix_match() {
        let provider = create_test_provider();
        let found = provider.lookup(TriggerCategory::Hashtag, "id").unwrap();
        assert_eq!(values(&found), vec!["idea", "idle"]);

        let found = provider.lookup(TriggerCategory::Hashtag, "ide").unwrap();
        assert_eq!(values(&found), vec!["idea"]);
    }

    #[test]
    fn test_mention_prefix_match_with_space() {
        let provider = create_test_provider();
        let found = provider.lookup(TriggerCategory::AtMention, "J").unwrap();
        assert_eq!(values(&found), vec!["Jacob Cole", "JSON Derulo"]);

        let found = provider.lookup(TriggerCategory::AtMention, "Jacob ").unwrap();
        assert_eq!(values(&found), vec!["Jacob Cole"]);
    }

    #[test]
    fn test_relation_exact_match() {
        let provider = create_test_provider();
        assert!(provider.lookup(TriggerCategory::Relation, "foo").unwrap().is_empty());

        let found = provider.lookup(TriggerCategory::Relation, "foods").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].related_metadata.as_deref(),
            Some("foodslists.tk - Google doc of foods people eat")
        );
    }

    #[test]
    fn test_category_isolation() {
        let provider = create_test_provider();
        assert!(provider.lookup(TriggerCategory::AtMention, "id").unwrap().is_empty());
    }

    #[test]
    fn test_order_is_preserved() {
        let provider = MemoryCandidateProvider::with_records([
            CandidateRecord::new(TriggerCategory::Hashtag, "zeta"),
            CandidateRecord::new(TriggerCategory::Hashtag, "zebra"),
        ]);
        let found = provider.lookup(TriggerCategory::Hashtag, "ze").unwrap();
        assert_eq!(values(&found), vec!["zeta", "zebra"]);
        assert_eq!(provider.len(), 2);
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[[candidates]]
category = "hashtag"
value = "rust"

[[candidates]]
category = 3
value = "roadmap"
related_metadata = "design doc"
"#
        )
        .unwrap();

        let provider = MemoryCandidateProvider::from_file(file.path()).unwrap();
        assert_eq!(provider.len(), 2);
        let found = provider.lookup(TriggerCategory::Relation, "roadmap").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].related_metadata.as_deref(), Some("design doc"));
        assert!(provider.lookup(TriggerCategory::Relation, "road").unwrap().is_empty());
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"category": "mention", "value": "Ada"}}, {{"category": 1, "value": "ops"}}]"#
        )
        .unwrap();

        let provider = MemoryCandidateProvider::from_file(file.path()).unwrap();
        let found = provider.lookup(TriggerCategory::AtMention, "A").unwrap();
        assert_eq!(values(&found), vec!["Ada"]);
    }

    #[test]
    fn test_load_rejects_unknown_category() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"category": "emoji", "value": "x"}}]"#).unwrap();

        let err = MemoryCandidateProvider::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidData(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = MemoryCandidateProvider::from_file("/nonexistent/candidates.toml").unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
