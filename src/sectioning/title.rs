/// Section title inference
use super::tokens::tokenize;
use super::Video;
use std::collections::{HashMap, HashSet};

/// Upper-case the first character of every word.
///
/// A word starts at an ASCII alphanumeric or `_` that does not follow
/// another such character.
pub fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_is_word = false;

    for ch in s.chars() {
        let is_word = ch.is_ascii_alphanumeric() || ch == '_';
        if is_word && !prev_is_word {
            result.push(ch.to_ascii_uppercase());
        } else {
            result.push(ch);
        }
        prev_is_word = is_word;
    }

    result
}

/// Infer a title for a group of videos.
///
/// Uses the shared token prefix when every title starts with at least
/// `prefix_min` identical tokens, otherwise the best TF-IDF keyword of the
/// group. Returns `None` when no token scores above zero.
pub fn infer_title(group: &[Video], prefix_min: usize, stopwords: &[String]) -> Option<String> {
    let split: Vec<Vec<String>> = group
        .iter()
        .map(|video| tokenize(&video.title, stopwords))
        .collect();

    let first = split.first()?;

    let shared: Vec<&str> = first
        .iter()
        .enumerate()
        .take_while(|(i, token)| split.iter().all(|tokens| tokens.get(*i) == Some(*token)))
        .map(|(_, token)| token.as_str())
        .collect();

    if shared.len() >= prefix_min {
        return Some(title_case(&shared.join(" ")));
    }

    best_keyword(&split).map(|keyword| title_case(&keyword))
}

/// Highest scoring token by `tf * ln((N + 1) / (df + 1))`.
///
/// Ties keep the token encountered first.
fn best_keyword(split: &[Vec<String>]) -> Option<String> {
    // (token, term frequency, document frequency) in first-seen order
    let mut stats: Vec<(&str, usize, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for tokens in split {
        let mut seen: HashSet<&str> = HashSet::new();
        for token in tokens {
            let slot = *index.entry(token.as_str()).or_insert_with(|| {
                stats.push((token.as_str(), 0, 0));
                stats.len() - 1
            });
            stats[slot].1 += 1;
            if seen.insert(token.as_str()) {
                stats[slot].2 += 1;
            }
        }
    }

    let docs = split.len() as f64;
    let mut best: Option<&str> = None;
    let mut best_score = 0.0_f64;

    for (token, tf, df) in stats {
        let score = tf as f64 * ((docs + 1.0) / (df as f64 + 1.0)).ln();
        if score > best_score {
            best_score = score;
            best = Some(token);
        }
    }

    best.map(str::to_string)
}
