//! Sense-tagged phrases and the similarity service boundary

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Separates the phrase from its sense tag, as in `polar_bear|NOUN`
pub const SENSE_DELIMITER: char = '|';
/// Joins the words of a multi-word phrase inside a key
pub const JOIN_TOKEN: char = '_';

/// A phrase paired with the sense tag disambiguating it.
///
/// The textual form is `phrase|SENSE`. [`SenseKey::parse`] splits on the last
/// delimiter and rejects keys with no delimiter or an empty side;
/// `to_string()` produces the same form back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SenseKey {
    pub phrase: String,
    pub sense: String,
}

impl SenseKey {
    pub fn new(phrase: impl Into<String>, sense: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            sense: sense.into(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw.rsplit_once(SENSE_DELIMITER) {
            Some((phrase, sense)) if !phrase.is_empty() && !sense.is_empty() => {
                Ok(Self::new(phrase, sense))
            }
            _ => Err(Error::MalformedSenseKey(raw.to_string())),
        }
    }

    /// Phrase as it would be shown to a reader (join tokens become spaces)
    pub fn display_phrase(&self) -> String {
        self.phrase.replace(JOIN_TOKEN, " ")
    }

    pub fn same_sense(&self, other: &SenseKey) -> bool {
        self.sense == other.sense
    }
}

impl fmt::Display for SenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.phrase, SENSE_DELIMITER, self.sense)
    }
}

impl FromStr for SenseKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SenseKey::parse(s)
    }
}

/// Turn a keyword into a lookup key: lowercase, spaces joined with `_`
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase().replace(' ', &JOIN_TOKEN.to_string())
}

/// Semantic-similarity model (sense2vec-style).
pub trait SimilarityService: Send + Sync {
    /// Best sense for a normalized phrase, `None` when the phrase is unknown
    fn best_sense(&self, normalized: &str) -> Result<Option<SenseKey>>;

    /// Up to `n` keys most similar to `key`, best first, with their scores
    fn most_similar(&self, key: &SenseKey, n: usize) -> Result<Vec<(SenseKey, f32)>>;
}
