//! Candidate answer extraction: named entities or ranked keyphrases

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::config::ExtractionConfig;
use crate::error::Result;

/// A recognized span and its category label (`GPE`, `PERSON`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: String,
}

/// Named-entity recognizer
pub trait EntityRecognizer: Send + Sync {
    fn entities(&self, text: &str) -> Result<Vec<EntitySpan>>;
}

/// Statistical keyphrase ranker, best phrase first
pub trait KeyphraseRanker: Send + Sync {
    fn rank(&self, text: &str) -> Result<Vec<(String, f64)>>;
}

/// Pulls candidate answers out of a text
pub trait CandidateExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Result<Vec<String>>;
}

/// Entities restricted to an allow-list of labels
pub struct NamedEntityExtractor {
    recognizer: Box<dyn EntityRecognizer>,
    labels: Vec<String>,
}

impl NamedEntityExtractor {
    pub fn new(recognizer: Box<dyn EntityRecognizer>, labels: Vec<String>) -> Self {
        Self { recognizer, labels }
    }

    /// People and geopolitical entities
    pub fn people_and_places(recognizer: Box<dyn EntityRecognizer>) -> Self {
        Self::new(recognizer, vec!["GPE".to_string(), "PERSON".to_string()])
    }
}

impl CandidateExtractor for NamedEntityExtractor {
    fn extract(&self, text: &str) -> Result<Vec<String>> {
        Ok(self
            .recognizer
            .entities(text)?
            .into_iter()
            .filter(|span| self.labels.iter().any(|l| *l == span.label))
            .map(|span| span.text)
            .collect())
    }
}

/// Top ranked keyphrases
pub struct KeyphraseExtractor {
    ranker: Box<dyn KeyphraseRanker>,
    top_n: usize,
}

impl KeyphraseExtractor {
    pub fn new(ranker: Box<dyn KeyphraseRanker>, top_n: usize) -> Self {
        Self { ranker, top_n }
    }
}

impl CandidateExtractor for KeyphraseExtractor {
    fn extract(&self, text: &str) -> Result<Vec<String>> {
        Ok(self
            .ranker
            .rank(text)?
            .into_iter()
            .take(self.top_n)
            .map(|(phrase, _)| phrase)
            .collect())
    }
}

/// Build the extractor selected by `config`.
///
/// `recognizer` is only used by the named-entity strategy; the keyphrase
/// strategy ranks with [`Rake`].
pub fn extractor_from_config(
    config: &ExtractionConfig,
    recognizer: Box<dyn EntityRecognizer>,
) -> Box<dyn CandidateExtractor> {
    match config {
        ExtractionConfig::NamedEntities { labels } => {
            Box::new(NamedEntityExtractor::new(recognizer, labels.clone()))
        }
        ExtractionConfig::Keyphrases { top_n } => {
            Box::new(KeyphraseExtractor::new(Box::new(Rake::default()), *top_n))
        }
    }
}

// ============= Gazetteer =============

/// Dictionary-based recognizer.
///
/// Scans left to right and takes the longest known surface form starting at
/// each word boundary; matches never overlap. Matching is case sensitive.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    entries: HashMap<String, String>,
    max_words: usize,
}

impl Gazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, surface: impl Into<String>, label: impl Into<String>) {
        let surface: String = surface.into();
        let surface = surface.trim().to_string();
        if surface.is_empty() {
            return;
        }
        self.max_words = self.max_words.max(surface.split_whitespace().count());
        self.entries.insert(surface, label.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn recognize(&self, text: &str) -> Vec<EntitySpan> {
        let words = word_spans(text);
        let mut spans = Vec::new();
        let mut i = 0;

        while i < words.len() {
            let longest = (1..=self.max_words.min(words.len() - i)).rev().find_map(|n| {
                let (start, _) = words[i];
                let (_, end) = words[i + n - 1];
                let surface = &text[start..end];
                self.entries.get(surface).map(|label| (n, surface, label))
            });

            match longest {
                Some((n, surface, label)) => {
                    spans.push(EntitySpan {
                        text: surface.to_string(),
                        label: label.clone(),
                    });
                    i += n;
                }
                None => i += 1,
            }
        }

        spans
    }
}

impl<S: Into<String>, L: Into<String>> FromIterator<(S, L)> for Gazetteer {
    fn from_iter<I: IntoIterator<Item = (S, L)>>(iter: I) -> Self {
        let mut gazetteer = Gazetteer::new();
        for (surface, label) in iter {
            gazetteer.insert(surface, label);
        }
        gazetteer
    }
}

impl EntityRecognizer for Gazetteer {
    fn entities(&self, text: &str) -> Result<Vec<EntitySpan>> {
        Ok(self.recognize(text))
    }
}

/// Byte ranges of words, with surrounding punctuation stripped
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for token in text.split_whitespace() {
        let Some(pos) = text[offset..].find(token) else {
            continue;
        };
        let token_start = offset + pos;
        offset = token_start + token.len();

        let trimmed_front = token.trim_start_matches(|c: char| !c.is_alphanumeric());
        let trimmed = trimmed_front.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '.');
        let trimmed = if trimmed.ends_with('.') && !trimmed[..trimmed.len() - 1].contains('.') {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
        if trimmed.is_empty() {
            continue;
        }
        let start = token_start + (token.len() - trimmed_front.len());
        spans.push((start, start + trimmed.len()));
    }
    spans
}

// ============= RAKE =============

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or",
    "other", "our", "ours", "out", "over", "own", "same", "she", "should", "so", "some",
    "such", "than", "that", "the", "their", "theirs", "them", "then", "there", "these", "they",
    "this", "those", "through", "to", "too", "under", "until", "up", "very", "was", "we",
    "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with",
    "would", "you", "your",
];

/// Rapid Automatic Keyword Extraction.
///
/// Candidate phrases are maximal runs of content words between stopwords and
/// punctuation. A word scores degree / frequency over all candidates and a
/// phrase scores the sum of its words.
#[derive(Debug, Clone)]
pub struct Rake {
    stopwords: HashSet<String>,
    max_words: usize,
}

impl Default for Rake {
    fn default() -> Self {
        Self::new(STOPWORDS.iter().map(|s| s.to_string()), 4)
    }
}

impl Rake {
    pub fn new(stopwords: impl IntoIterator<Item = String>, max_words: usize) -> Self {
        Self {
            stopwords: stopwords.into_iter().map(|s| s.to_lowercase()).collect(),
            max_words,
        }
    }

    fn candidate_phrases<'t>(&self, text: &'t str) -> Vec<Vec<&'t str>> {
        let mut phrases = Vec::new();
        for fragment in text.split(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '(' | ')' | '"' | '\n')) {
            let mut current: Vec<&str> = Vec::new();
            for raw in fragment.split_whitespace() {
                let word = raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '-');
                if word.is_empty() || self.stopwords.contains(&word.to_lowercase()) {
                    if !current.is_empty() {
                        phrases.push(std::mem::take(&mut current));
                    }
                    continue;
                }
                current.push(word);
            }
            if !current.is_empty() {
                phrases.push(current);
            }
        }
        phrases
            .into_iter()
            .filter(|p| p.len() <= self.max_words)
            .filter(|p| !p.iter().all(|w| w.chars().all(|c| c.is_ascii_digit())))
            .collect()
    }

    pub fn rank_phrases(&self, text: &str) -> Vec<(String, f64)> {
        let phrases = self.candidate_phrases(text);

        let mut frequency: HashMap<String, f64> = HashMap::new();
        let mut degree: HashMap<String, f64> = HashMap::new();
        for phrase in &phrases {
            let len = phrase.len() as f64;
            for word in phrase {
                let key = word.to_lowercase();
                *frequency.entry(key.clone()).or_default() += 1.0;
                *degree.entry(key).or_default() += len;
            }
        }

        let mut seen = HashSet::new();
        let mut ranked: Vec<(usize, String, f64)> = Vec::new();
        for (order, phrase) in phrases.iter().enumerate() {
            let surface = phrase.join(" ");
            if !seen.insert(surface.to_lowercase()) {
                continue;
            }
            let score: f64 = phrase
                .iter()
                .map(|w| {
                    let key = w.to_lowercase();
                    degree[&key] / frequency[&key]
                })
                .sum();
            ranked.push((order, surface, score));
        }

        ranked.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)));
        ranked.into_iter().map(|(_, phrase, score)| (phrase, score)).collect()
    }
}

impl KeyphraseRanker for Rake {
    fn rank(&self, text: &str) -> Result<Vec<(String, f64)>> {
        Ok(self.rank_phrases(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gazetteer() -> Gazetteer {
        [
            ("Jackson", "PERSON"),
            ("Indiana", "GPE"),
            ("New York", "GPE"),
            ("New York City", "GPE"),
            ("Microsoft", "ORG"),
            ("U.S.", "GPE"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_gazetteer_longest_match() {
        let spans = gazetteer().entities("He moved to New York City in May.").unwrap();
        assert_eq!(
            spans,
            vec![EntitySpan {
                text: "New York City".to_string(),
                label: "GPE".to_string()
            }]
        );
    }

    #[test]
    fn test_gazetteer_strips_punctuation_keeps_abbreviations() {
        let spans = gazetteer().entities("Jackson, who left the U.S. for Indiana.").unwrap();
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Jackson", "U.S.", "Indiana"]);
    }

    #[test]
    fn test_named_entity_extractor_filters_labels() {
        let extractor = NamedEntityExtractor::people_and_places(Box::new(gazetteer()));
        let found = extractor.extract("Jackson joined Microsoft in Indiana.").unwrap();
        assert_eq!(found, vec!["Jackson", "Indiana"]);
    }

    #[test]
    fn test_rake_prefers_longer_content_phrases() {
        let rake = Rake::default();
        let ranked = rake.rank_phrases(
            "Compatibility of systems of linear constraints over the set of natural numbers.",
        );
        assert_eq!(ranked[0].0, "linear constraints");
        assert!(ranked.iter().any(|(p, _)| p == "natural numbers"));
        assert!(ranked.iter().all(|(p, _)| !p.split(' ').any(|w| w == "of")));
    }

    #[test]
    fn test_rake_dedupes_case_insensitively() {
        let ranked = Rake::default().rank_phrases("Paris is big. paris is old.");
        let paris: Vec<_> = ranked.iter().filter(|(p, _)| p.eq_ignore_ascii_case("paris")).collect();
        assert_eq!(paris.len(), 1);
        assert_eq!(paris[0].0, "Paris");
    }

    #[test]
    fn test_keyphrase_extractor_takes_top_n() {
        let extractor = KeyphraseExtractor::new(Box::new(Rake::default()), 2);
        let found = extractor
            .extract("The Nile river flows north. Cairo sits on the delta. Ancient temples remain.")
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_extractor_from_config() {
        let config = ExtractionConfig::NamedEntities {
            labels: vec!["PERSON".to_string()],
        };
        let extractor = extractor_from_config(&config, Box::new(gazetteer()));
        assert_eq!(extractor.extract("Jackson was from Indiana.").unwrap(), vec!["Jackson"]);

        let extractor = extractor_from_config(&ExtractionConfig::Keyphrases { top_n: 1 }, Box::new(gazetteer()));
        assert_eq!(extractor.extract("Jackson was from Indiana.").unwrap().len(), 1);
    }
}
