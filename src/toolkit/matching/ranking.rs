use std::cmp::Ordering;

use super::models::MatchResult;


/// Stable sort by descending confidence, then keep the first `limit`.
pub fn rank_matches(mut matches: Vec<MatchResult>, limit: usize) -> Vec<MatchResult> {
    matches.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
    matches.truncate(limit);
    matches
}
