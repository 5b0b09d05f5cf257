//! Presenting questions as options and grading the picked option

#[cfg(feature = "python")]
use pyo3::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::questions::Question;

/// A question laid out as shuffled options
#[cfg_attr(feature = "python", pyclass(get_all, frozen))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoice {
    pub sentence: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub answer: String,
}

impl MultipleChoice {
    /// Distractors plus the answer, the answer at a uniformly random position
    pub fn from_question<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Self {
        let correct_index = rng.gen_range(0..=question.distractors.len());
        let mut options = question.distractors.clone();
        options.insert(correct_index, question.answer.clone());

        Self {
            sentence: question.sentence.clone(),
            options,
            correct_index,
            answer: question.answer.clone(),
        }
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl MultipleChoice {
    fn __repr__(&self) -> String {
        format!("MultipleChoice(options={}, sentence='{}...')",
                self.options.len(), &self.sentence.chars().take(40).collect::<String>())
    }
}

/// Outcome of picking one option
#[cfg_attr(feature = "python", pyclass(get_all, frozen))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceResult {
    pub is_correct: bool,
    pub picked: String,
    pub feedback: String,
}

#[cfg(feature = "python")]
#[pymethods]
impl ChoiceResult {
    fn __repr__(&self) -> String {
        format!("ChoiceResult(is_correct={}, picked='{}')", self.is_correct, self.picked)
    }
}

/// Grade the option picked at `index`
pub fn check_choice(choice: &MultipleChoice, index: usize) -> Result<ChoiceResult> {
    let picked = choice.options.get(index).ok_or(Error::OptionOutOfRange {
        index,
        len: choice.options.len(),
    })?;

    let is_correct = index == choice.correct_index;
    let feedback = if is_correct {
        "Correct Answer !".to_string()
    } else {
        format!("Wrong Answer ! Correct answer was: {}", choice.answer)
    };

    Ok(ChoiceResult {
        is_correct,
        picked: picked.clone(),
        feedback,
    })
}

// ============= Python Binding =============

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "to_multiple_choice")]
pub fn py_to_multiple_choice(question: Question) -> MultipleChoice {
    let mut rng = rand::thread_rng();
    MultipleChoice::from_question(&question, &mut rng)
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "check_choice")]
pub fn py_check_choice(choice: MultipleChoice, index: usize) -> PyResult<ChoiceResult> {
    Ok(check_choice(&choice, index)?)
}
