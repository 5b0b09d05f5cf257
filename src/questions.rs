//! Fill-in-the-blank MCQ generation from free text

#[cfg(feature = "python")]
use pyo3::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::GeneratorConfig;
use crate::distractors::get_distractors;
use crate::error::Result;
use crate::extract::CandidateExtractor;
use crate::matching::{blank_keyword, contains_keyword, keywords_in_sentence};
use crate::sense::SimilarityService;
use crate::sentences::{RuleSentencizer, SentenceSplitter};

/// A generated question: `sentence` has its first occurrence of `answer`
/// replaced by the placeholder.
#[cfg_attr(feature = "python", pyclass(get_all, frozen))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub sentence: String,
    pub answer: String,
    pub distractors: Vec<String>,
}

#[cfg(feature = "python")]
#[pymethods]
impl Question {
    fn __repr__(&self) -> String {
        format!("Question(answer='{}', sentence='{}...')",
                self.answer, &self.sentence.chars().take(40).collect::<String>())
    }
}

/// MCQ generator over a similarity model, a candidate extractor and a sentence splitter
pub struct Generator {
    similarity: Box<dyn SimilarityService>,
    extractor: Box<dyn CandidateExtractor>,
    splitter: Box<dyn SentenceSplitter>,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(
        similarity: Box<dyn SimilarityService>,
        extractor: Box<dyn CandidateExtractor>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            similarity,
            extractor,
            splitter: Box::new(RuleSentencizer::new()),
            config,
        }
    }

    pub fn with_splitter(mut self, splitter: Box<dyn SentenceSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Distractors for `keyword`, see [`get_distractors`]
    pub fn get_distractors<R: Rng + ?Sized>(
        &self,
        keyword: &str,
        pool_size: usize,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<String>> {
        get_distractors(self.similarity.as_ref(), keyword, pool_size, count, rng)
    }

    /// Sentences of `text` paired with the extracted keywords each contains.
    ///
    /// Keywords are extracted once from the whole text. Repeated sentences are
    /// kept, each with its own entry.
    pub fn sentence_keywords(&self, text: &str) -> Result<Vec<(String, Vec<String>)>> {
        let sentences = self.splitter.split(text)?;
        let keywords = unique(self.extractor.extract(text)?);

        Ok(sentences
            .into_iter()
            .map(|sentence| {
                let found = keywords_in_sentence(&sentence, &keywords)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                (sentence, found)
            })
            .collect())
    }

    /// Every question the text supports, in sentence order then keyword order.
    pub fn generate_mcq<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Result<Vec<Question>> {
        let mut questions = Vec::new();
        for (sentence, keywords) in self.sentence_keywords(text)? {
            for keyword in keywords {
                if let Some(question) = self.build_question(&sentence, &keyword, rng)? {
                    questions.push(question);
                }
            }
        }

        tracing::info!(questions = questions.len(), "batch generation finished");
        Ok(questions)
    }

    /// One question from a randomly chosen sentence, `None` once every sentence failed.
    ///
    /// Keywords are extracted from the chosen sentence alone. A sentence is
    /// dropped from the pool when it has no keyword or its keyword gets no
    /// distractors.
    pub fn generate_single_mcq<R: Rng + ?Sized>(
        &self,
        text: &str,
        rng: &mut R,
    ) -> Result<Option<Question>> {
        let mut pool = self.splitter.split(text)?;

        while !pool.is_empty() {
            let idx = rng.gen_range(0..pool.len());
            let sentence = &pool[idx];

            let keywords: Vec<String> = unique(self.extractor.extract(sentence)?)
                .into_iter()
                .filter(|k| contains_keyword(sentence, k))
                .collect();

            if let Some(keyword) = keywords.choose(rng) {
                if let Some(question) = self.build_question(sentence, keyword, rng)? {
                    return Ok(Some(question));
                }
            }

            tracing::debug!(sentence = %pool[idx], "sentence dropped from pool");
            pool.swap_remove(idx);
        }

        Ok(None)
    }

    fn build_question<R: Rng + ?Sized>(
        &self,
        sentence: &str,
        keyword: &str,
        rng: &mut R,
    ) -> Result<Option<Question>> {
        let distractors = self.get_distractors(
            keyword,
            self.config.similarity_pool_size,
            self.config.distractor_count,
            rng,
        )?;
        if distractors.is_empty() {
            return Ok(None);
        }

        Ok(Some(Question {
            sentence: blank_keyword(sentence, keyword, &self.config.placeholder),
            answer: keyword.to_string(),
            distractors,
        }))
    }
}

/// Drop repeated keywords, keeping first occurrences in order
fn unique(keywords: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords.into_iter().filter(|k| seen.insert(k.clone())).collect()
}

/// A random question whose answer is not the topic itself
pub fn relevant_question<'q, R: Rng + ?Sized>(
    questions: &'q [Question],
    topic: &str,
    rng: &mut R,
) -> Option<&'q Question> {
    let topic = topic.to_lowercase();
    let relevant: Vec<&Question> = questions
        .iter()
        .filter(|q| q.answer.to_lowercase() != topic)
        .collect();
    relevant.choose(rng).copied()
}

// ============= Python Binding =============

#[cfg(feature = "python")]
#[pyclass(name = "Generator")]
pub struct PyGenerator {
    inner: Generator,
}

#[cfg(feature = "python")]
#[pymethods]
impl PyGenerator {
    /// `entities` are (surface form, label) pairs for the gazetteer; country
    /// names from `countries_path` are added as `GPE`.
    #[new]
    #[pyo3(signature = (model_path, entities=None, countries_path=None, config_json=None))]
    fn new(
        model_path: &str,
        entities: Option<Vec<(String, String)>>,
        countries_path: Option<&str>,
        config_json: Option<&str>,
    ) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => GeneratorConfig::from_json_str(json)?,
            None => GeneratorConfig::default(),
        };

        let mut gazetteer: crate::extract::Gazetteer = entities.unwrap_or_default().into_iter().collect();
        if let Some(path) = countries_path {
            let countries = crate::corpus::parse_file(path)?;
            crate::corpus::extend_gazetteer(&mut gazetteer, &countries);
        }

        let similarity = crate::vectors::SenseVectors::open(model_path)?;
        let extractor = crate::extract::extractor_from_config(&config.extraction, Box::new(gazetteer));

        Ok(Self {
            inner: Generator::new(Box::new(similarity), extractor, config),
        })
    }

    #[pyo3(signature = (keyword, number_of_similar_words, number_of_distractors=3))]
    fn get_distractors(
        &self,
        keyword: &str,
        number_of_similar_words: usize,
        number_of_distractors: usize,
    ) -> PyResult<Vec<String>> {
        let mut rng = rand::thread_rng();
        Ok(self.inner.get_distractors(keyword, number_of_similar_words, number_of_distractors, &mut rng)?)
    }

    fn generate_mcq(&self, text: &str) -> PyResult<Vec<Question>> {
        let mut rng = rand::thread_rng();
        Ok(self.inner.generate_mcq(text, &mut rng)?)
    }

    fn generate_single_mcq(&self, text: &str) -> PyResult<Option<Question>> {
        let mut rng = rand::thread_rng();
        Ok(self.inner.generate_single_mcq(text, &mut rng)?)
    }
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "relevant_question")]
pub fn py_relevant_question(questions: Vec<Question>, topic: &str) -> Option<Question> {
    let mut rng = rand::thread_rng();
    relevant_question(&questions, topic, &mut rng).cloned()
}
