//! Generator configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

pub const DEFAULT_PLACEHOLDER: &str = "<blank>";
pub const DEFAULT_POOL_SIZE: usize = 10;
pub const DEFAULT_DISTRACTOR_COUNT: usize = 3;

/// How candidate answers are pulled out of a text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ExtractionConfig {
    /// Named entities whose label is in `labels`
    NamedEntities { labels: Vec<String> },
    /// The `top_n` best ranked keyphrases
    Keyphrases { top_n: usize },
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig::NamedEntities {
            labels: vec!["GPE".to_string(), "PERSON".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of similar phrases requested from the similarity service
    pub similarity_pool_size: usize,
    pub distractor_count: usize,
    /// Token substituted for the answer in the question sentence
    pub placeholder: String,
    pub extraction: ExtractionConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            similarity_pool_size: DEFAULT_POOL_SIZE,
            distractor_count: DEFAULT_DISTRACTOR_COUNT,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GeneratorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.placeholder.is_empty() {
            return Err(Error::InvalidConfig("placeholder must not be empty".to_string()));
        }
        if self.distractor_count == 0 {
            return Err(Error::InvalidConfig("distractor_count must be at least 1".to_string()));
        }
        if let ExtractionConfig::NamedEntities { labels } = &self.extraction {
            if labels.is_empty() {
                return Err(Error::InvalidConfig("entity label allow-list is empty".to_string()));
            }
        }
        if self.similarity_pool_size < self.distractor_count {
            tracing::warn!(
                pool = self.similarity_pool_size,
                distractors = self.distractor_count,
                "similarity pool is smaller than the distractor count, no question can be produced"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.similarity_pool_size, 10);
        assert_eq!(config.distractor_count, 3);
        assert_eq!(config.placeholder, "<blank>");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GeneratorConfig::from_json_str(r#"{"distractor_count": 2}"#).unwrap();
        assert_eq!(config.distractor_count, 2);
        assert_eq!(config.similarity_pool_size, 10);
        assert_eq!(config.extraction, ExtractionConfig::default());
    }

    #[test]
    fn test_keyphrase_strategy_from_json() {
        let config = GeneratorConfig::from_json_str(
            r#"{"extraction": {"strategy": "keyphrases", "top_n": 5}}"#,
        )
        .unwrap();
        assert_eq!(config.extraction, ExtractionConfig::Keyphrases { top_n: 5 });
    }

    #[test]
    fn test_rejects_empty_placeholder() {
        let result = GeneratorConfig::from_json_str(r#"{"placeholder": ""}"#);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_empty_label_list() {
        let result = GeneratorConfig::from_json_str(
            r#"{"extraction": {"strategy": "named_entities", "labels": []}}"#,
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_distractors() {
        let config = GeneratorConfig {
            distractor_count: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
