//! Keyword-to-sentence matching.
//!
//! Matching is plain, case-sensitive substring containment: a keyword also
//! matches inside an unrelated longer word (`Roman` in `Romania`). Callers go
//! through these two functions only, so a tokenized matcher can replace them
//! in one place.

/// Whether `keyword` occurs literally in `sentence`
pub fn contains_keyword(sentence: &str, keyword: &str) -> bool {
    !keyword.is_empty() && sentence.contains(keyword)
}

/// Replace the first occurrence of `keyword` in `sentence` with `placeholder`
pub fn blank_keyword(sentence: &str, keyword: &str, placeholder: &str) -> String {
    sentence.replacen(keyword, placeholder, 1)
}

/// Keywords of `keywords` contained in `sentence`, in keyword order
pub fn keywords_in_sentence<'a>(sentence: &str, keywords: &'a [String]) -> Vec<&'a str> {
    keywords
        .iter()
        .filter(|k| contains_keyword(sentence, k))
        .map(String::as_str)
        .collect()
}
