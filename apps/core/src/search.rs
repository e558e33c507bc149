use std::cmp::Reverse;

use crate::model::{normalize_for_search, CatalogEntry};

/// How a catalog entry matched the query, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    /// Query characters appear in order with gaps.
    Scattered,
    /// Query appears somewhere inside the entry.
    Inner,
    /// A later word of the entry starts with the query.
    WordStart,
    /// The entry starts with the query.
    Prefix,
}

/// Returns up to `limit` entry texts matching `query`.
///
/// Ordered by tier, then catalog weight, then shorter entries, then catalog
/// order.
pub fn rank(entries: &[CatalogEntry], query: &str, limit: usize) -> Vec<String> {
    if limit == 0 || entries.is_empty() {
        return Vec::new();
    }

    let normalized_query = normalize_for_search(query);
    if normalized_query.is_empty() {
        return Vec::new();
    }

    let mut matched: Vec<(MatchTier, usize, &CatalogEntry)> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            match_tier(entry, &normalized_query).map(|tier| (tier, index, entry))
        })
        .collect();

    matched.sort_by_key(|(tier, index, entry)| {
        (
            Reverse(*tier),
            Reverse(entry.weight),
            entry.normalized().len(),
            *index,
        )
    });

    matched
        .into_iter()
        .take(limit)
        .map(|(_, _, entry)| entry.text.clone())
        .collect()
}

pub fn match_tier(entry: &CatalogEntry, normalized_query: &str) -> Option<MatchTier> {
    let normalized = entry.normalized();
    if normalized.is_empty() || normalized_query.is_empty() {
        return None;
    }

    if normalized.starts_with(normalized_query) {
        return Some(MatchTier::Prefix);
    }
    if normalized.contains(normalized_query) {
        let word_start = entry
            .text
            .split(|c: char| !c.is_alphanumeric())
            .skip(1)
            .any(|word| normalize_for_search(word).starts_with(normalized_query));
        return Some(if word_start {
            MatchTier::WordStart
        } else {
            MatchTier::Inner
        });
    }
    is_subsequence(normalized, normalized_query).then_some(MatchTier::Scattered)
}

fn is_subsequence(haystack: &str, needle: &str) -> bool {
    let mut remaining = haystack.chars();
    needle
        .chars()
        .all(|wanted| remaining.by_ref().any(|c| c == wanted))
}
