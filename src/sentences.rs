//! Sentence splitting

use crate::error::Result;

/// Splits text into an ordered sequence of trimmed sentences.
pub trait SentenceSplitter: Send + Sync {
    fn split(&self, text: &str) -> Result<Vec<String>>;
}

/// Punctuation-driven sentence boundary detection.
///
/// A sentence ends after a run of `.`, `!` or `?` (plus any closing quotes or
/// brackets) followed by whitespace or the end of the text. A period ending a
/// single capital initial (`J.`) or a dotted abbreviation (`U.S.`) does not end
/// a sentence.
#[derive(Debug, Clone, Default)]
pub struct RuleSentencizer;

impl RuleSentencizer {
    pub fn new() -> Self {
        Self
    }

    pub fn split_sentences(&self, text: &str) -> Vec<String> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < chars.len() {
            let (_, ch) = chars[i];
            if !is_terminal(ch) {
                i += 1;
                continue;
            }

            let run_start = i;
            let mut j = i;
            while j < chars.len() && (is_terminal(chars[j].1) || is_closing(chars[j].1)) {
                j += 1;
            }
            let end = chars.get(j).map(|&(idx, _)| idx).unwrap_or(text.len());
            let at_boundary = j == chars.len() || chars[j].1.is_whitespace();

            let only_period = chars[run_start..j].iter().all(|&(_, c)| c == '.' || is_closing(c));
            let word = word_before(text, chars[run_start].0);
            if at_boundary && !(only_period && is_abbreviation(word)) {
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                start = end;
            }
            i = j;
        }

        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }

        sentences
    }
}

impl SentenceSplitter for RuleSentencizer {
    fn split(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.split_sentences(text))
    }
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closing(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}')
}

/// Token immediately preceding byte offset `end`
fn word_before(text: &str, end: usize) -> &str {
    let head = &text[..end];
    let start = head
        .rfind(|c: char| c.is_whitespace())
        .map(|i| i + 1)
        .unwrap_or(0);
    &head[start..]
}

fn is_abbreviation(word: &str) -> bool {
    let mut chars = word.chars();
    let single_initial = matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase());
    single_initial || word.contains('.')
}
