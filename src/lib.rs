//! MCQ Core - Rust core for the country quiz
//!
//! Generates fill-in-the-blank multiple-choice questions from text: candidate
//! answers come from an entity recognizer or a keyphrase ranker, distractors
//! from a sense-vector similarity model.

pub mod config;
pub mod corpus;
pub mod distractors;
pub mod error;
pub mod extract;
pub mod grading;
pub mod matching;
pub mod questions;
pub mod sense;
pub mod sentences;
pub mod vectors;

#[cfg(feature = "python")]
use pyo3::prelude::*;
use tracing_subscriber::EnvFilter;

pub use config::{ExtractionConfig, GeneratorConfig};
pub use corpus::{parse_file, random_country, sparql_to_table, Country, Table};
pub use distractors::get_distractors;
pub use error::{Error, Result};
pub use extract::{
    CandidateExtractor, EntityRecognizer, EntitySpan, Gazetteer, KeyphraseExtractor, KeyphraseRanker,
    NamedEntityExtractor, Rake,
};
pub use grading::{check_choice, ChoiceResult, MultipleChoice};
pub use questions::{relevant_question, Generator, Question};
pub use sense::{normalize_keyword, SenseKey, SimilarityService};
pub use sentences::{RuleSentencizer, SentenceSplitter};
pub use vectors::{add_sense, init_store, load_senses, SenseEntry, SenseVectors};

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// MCQ Core Python Module
#[cfg(feature = "python")]
#[pymodule]
fn mcq_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    init_logging();

    // Question generation
    m.add_class::<questions::PyGenerator>()?;
    m.add_function(wrap_pyfunction!(questions::py_relevant_question, m)?)?;

    // Options and grading
    m.add_function(wrap_pyfunction!(grading::py_to_multiple_choice, m)?)?;
    m.add_function(wrap_pyfunction!(grading::py_check_choice, m)?)?;

    // Corpus loading
    m.add_function(wrap_pyfunction!(corpus::py_load_countries, m)?)?;
    m.add_function(wrap_pyfunction!(corpus::py_random_country, m)?)?;
    m.add_function(wrap_pyfunction!(corpus::py_sparql_to_table, m)?)?;

    // Sense store
    m.add_function(wrap_pyfunction!(vectors::py_init_store, m)?)?;
    m.add_function(wrap_pyfunction!(vectors::py_add_sense, m)?)?;

    // Register classes
    m.add_class::<questions::Question>()?;
    m.add_class::<grading::MultipleChoice>()?;
    m.add_class::<grading::ChoiceResult>()?;

    Ok(())
}
