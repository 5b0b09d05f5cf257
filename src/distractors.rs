//! Distractor selection from a similarity service

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::error::Result;
use crate::sense::{normalize_keyword, SimilarityService, JOIN_TOKEN};

/// Comparison form used to catch abbreviation collisions (`USA` vs `U.S.A.`)
fn fold(text: &str) -> String {
    text.to_lowercase().replace('.', "").replace(JOIN_TOKEN, " ")
}

/// Whether `candidate` is a trivial variant of `keyword`
pub fn collides_with_keyword(candidate: &str, keyword: &str) -> bool {
    let candidate = fold(candidate);
    let keyword = fold(keyword);
    candidate.contains(&keyword) || keyword.contains(&candidate)
}

/// Similar phrases sharing the keyword's best sense, de-duplicated.
///
/// Returns an empty list when the keyword has no sense in the model.
pub fn similar_phrases(
    service: &dyn SimilarityService,
    keyword: &str,
    pool_size: usize,
) -> Result<Vec<String>> {
    let normalized = normalize_keyword(keyword);
    let Some(sense) = service.best_sense(&normalized)? else {
        tracing::debug!(keyword, "no sense resolved");
        return Ok(Vec::new());
    };

    let mut seen = HashSet::new();
    let phrases = service
        .most_similar(&sense, pool_size)?
        .into_iter()
        .filter(|(candidate, _)| candidate.same_sense(&sense))
        .map(|(candidate, _)| candidate.display_phrase())
        .filter(|phrase| seen.insert(phrase.clone()))
        .collect();

    Ok(phrases)
}

/// Pick `count` distractors for `keyword` out of its `pool_size` most similar phrases.
///
/// The result holds exactly `count` distinct phrases, none of which contains or
/// is contained in the keyword, or it is empty. Never a partial list.
pub fn get_distractors<R: Rng + ?Sized>(
    service: &dyn SimilarityService,
    keyword: &str,
    pool_size: usize,
    count: usize,
    rng: &mut R,
) -> Result<Vec<String>> {
    let candidates: Vec<String> = similar_phrases(service, keyword, pool_size)?
        .into_iter()
        .filter(|phrase| !collides_with_keyword(phrase, keyword))
        .collect();

    if candidates.len() < count {
        tracing::debug!(
            keyword,
            available = candidates.len(),
            needed = count,
            "not enough distractor candidates"
        );
        return Ok(Vec::new());
    }

    Ok(candidates.choose_multiple(rng, count).cloned().collect())
}
