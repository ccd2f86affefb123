use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref NON_ALPHA: Regex = Regex::new(r"[^a-z\s]").expect("static pattern");
}

/// Lowercases, drops every character that is not `a-z` or whitespace, then
/// splits on whitespace. Repeated words are kept once, in first-seen order.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_ALPHA.replace_all(&lowered, "");

    let mut seen = HashSet::new();
    cleaned
        .split_whitespace()
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}


pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}
