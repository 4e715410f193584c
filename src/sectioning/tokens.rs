/// Title normalization and pairwise similarity signals
use regex::Regex;
use std::sync::OnceLock;

/// Trailing "Part 3", "Lesson 12" or "#4" marker
const SERIES_PATTERN: &str = r"(?i)(?:part|lesson|#)\s*([0-9]+)$";

fn series_regex() -> &'static Regex {
    static SERIES: OnceLock<Regex> = OnceLock::new();
    SERIES.get_or_init(|| Regex::new(SERIES_PATTERN).expect("series pattern is valid"))
}

/// Normalize a title into comparable tokens.
///
/// Lower-cases the title, turns every character other than ASCII letters,
/// digits, `#` and whitespace into a separator, splits on whitespace and
/// drops stopwords. Titles with nothing usable yield an empty list.
pub fn tokenize(title: &str, stopwords: &[String]) -> Vec<String> {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '#' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| !stopwords.iter().any(|stop| stop == token))
        .map(str::to_string)
        .collect()
}

/// Length of the longest common prefix of two token sequences
pub fn common_prefix_len<S: AsRef<str>>(a: &[S], b: &[S]) -> usize {
    a.iter()
        .zip(b.iter())
        .take_while(|(x, y)| x.as_ref() == y.as_ref())
        .count()
}

/// Number of identical leading tokens shared by two titles
pub fn token_prefix_score(a: &str, b: &str, stopwords: &[String]) -> usize {
    common_prefix_len(&tokenize(a, stopwords), &tokenize(b, stopwords))
}

/// Trailing series number of a title, if it has one
pub fn series_number(title: &str) -> Option<u64> {
    series_regex()
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// True when `b` continues `a` as the next installment ("Part 2" -> "Part 3")
pub fn numeric_series(a: &str, b: &str) -> bool {
    match (series_number(a), series_number(b)) {
        (Some(na), Some(nb)) => na.checked_add(1) == Some(nb),
        _ => false,
    }
}
