//! Ranking contract for search over enumerated inodes.
//!
//! # Responsibility
//! - Define the `SearchRanker` seam the graph store hands candidates to.
//! - Provide a default case-insensitive filename ranker.
//!
//! # Invariants
//! - Rankers return a subsequence of their candidates; they never invent
//!   inodes.
//! - Output order is deterministic for equal scores.

use crate::model::inode::ResolvedInode;

/// Orders and filters candidate inodes for a query.
pub trait SearchRanker {
    fn rank(&self, query: &str, candidates: Vec<ResolvedInode>) -> Vec<ResolvedInode>;
}

/// Filename ranker: exact, then prefix, then substring, then in-order
/// subsequence matches. Ties are broken by filename, then id.
///
/// An empty query matches nothing; a whitespace-only query lists everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameRanker;

impl SearchRanker for FilenameRanker {
    fn rank(&self, query: &str, candidates: Vec<ResolvedInode>) -> Vec<ResolvedInode> {
        if query.is_empty() {
            return Vec::new();
        }

        let needle = query.trim().to_lowercase();
        let mut scored: Vec<(u32, String, ResolvedInode)> = candidates
            .into_iter()
            .filter_map(|inode| {
                let name = inode.filename()?.to_lowercase();
                let score = if needle.is_empty() {
                    0
                } else {
                    match_score(&needle, &name)?
                };
                Some((score, name, inode))
            })
            .collect();

        scored.sort_by(|left, right| {
            left.0
                .cmp(&right.0)
                .then_with(|| left.1.cmp(&right.1))
                .then_with(|| left.2.uuid.cmp(&right.2.uuid))
        });
        scored.into_iter().map(|(_, _, inode)| inode).collect()
    }
}

/// Lower is better. `None` means no match.
fn match_score(needle: &str, haystack: &str) -> Option<u32> {
    if haystack == needle {
        return Some(0);
    }
    if haystack.starts_with(needle) {
        return Some(1);
    }
    if haystack.contains(needle) {
        return Some(2);
    }
    subsequence_gaps(needle, haystack).map(|gaps| 3 + gaps)
}

/// Counts skipped characters when matching `needle` as an in-order
/// subsequence of `haystack`.
fn subsequence_gaps(needle: &str, haystack: &str) -> Option<u32> {
    let mut wanted = needle.chars().peekable();
    let mut gaps = 0u32;
    let mut started = false;

    for ch in haystack.chars() {
        match wanted.peek() {
            Some(&next) if next == ch => {
                wanted.next();
                started = true;
            }
            Some(_) if started => gaps = gaps.saturating_add(1),
            Some(_) => {}
            None => break,
        }
    }

    if wanted.peek().is_none() {
        Some(gaps)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{match_score, FilenameRanker, SearchRanker};
    use crate::model::inode::{Entity, Media, Note, ResolvedInode};

    fn note(name: &str) -> ResolvedInode {
        ResolvedInode::new(Entity::Note(Note::new(name, "").unwrap()))
    }

    fn names(result: &[ResolvedInode]) -> Vec<&str> {
        result.iter().filter_map(|inode| inode.filename()).collect()
    }

    #[test]
    fn exact_beats_prefix_beats_substring_beats_subsequence() {
        assert_eq!(match_score("rust", "rust"), Some(0));
        assert_eq!(match_score("rust", "rust-notes"), Some(1));
        assert_eq!(match_score("rust", "learn-rust"), Some(2));
        assert!(match_score("rnt", "rust-notes").unwrap() >= 3);
        assert_eq!(match_score("xyz", "rust"), None);
    }

    #[test]
    fn rank_orders_by_score_then_name() {
        let candidates = vec![note("learn-rust.md"), note("rust"), note("Rust-book.md")];
        let ranked = FilenameRanker.rank("rust", candidates);
        assert_eq!(names(&ranked), vec!["rust", "Rust-book.md", "learn-rust.md"]);
    }

    #[test]
    fn empty_query_matches_nothing_and_blank_query_matches_all() {
        let candidates = vec![note("b"), note("a")];
        assert!(FilenameRanker.rank("", candidates.clone()).is_empty());

        let all = FilenameRanker.rank(" ", candidates);
        assert_eq!(names(&all), vec!["a", "b"]);
    }

    #[test]
    fn media_is_ranked_by_filename_too() {
        let media = ResolvedInode::new(Entity::Media(Media::new("pic.png", "image/png").unwrap()));
        let ranked = FilenameRanker.rank("pic", vec![note("topic"), media]);
        assert_eq!(names(&ranked), vec!["pic.png", "topic"]);
    }
}
