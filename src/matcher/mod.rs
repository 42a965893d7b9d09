//! Keyword matching over fetched posts
//!
//! Pure and order-preserving: posts come out in the order they went in,
//! each annotated with every keyword that hit. Matching is case-insensitive
//! substring search against the post body.

use crate::platform::Post;
use crate::resolve::Target;
use chrono::DateTime;

/// One post that matched at least one keyword
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// The target the post belongs to
    pub target: Target,

    /// Stable link to the post
    pub post_permalink: String,

    /// Post body text, as fetched
    pub text: String,

    /// Every keyword found in the post, in caller-supplied order, deduplicated
    pub matched_keywords: Vec<String>,

    /// Publication time, unix seconds
    pub timestamp: i64,

    pub views: u64,
    pub likes: u64,
    pub reposts: u64,
}

impl MatchResult {
    /// Formats the publication time for the report (`dd.mm.yyyy hh:mm`, UTC)
    pub fn formatted_date(&self) -> String {
        DateTime::from_timestamp(self.timestamp, 0)
            .map(|dt| dt.format("%d.%m.%Y %H:%M").to_string())
            .unwrap_or_default()
    }
}

/// Filters posts against a keyword set
///
/// A post is kept when its body contains at least one keyword,
/// case-insensitively. `matched_keywords` lists every keyword found, in the
/// order the caller supplied them, with duplicates removed. Posts with no
/// match are excluded silently.
pub fn match_posts(target: &Target, posts: &[Post], keywords: &[String]) -> Vec<MatchResult> {
    let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let mut results = Vec::new();

    for post in posts {
        let text = post.text.to_lowercase();

        let mut found = Vec::new();
        for (keyword, needle) in keywords.iter().zip(&lowered) {
            if !needle.is_empty() && text.contains(needle.as_str()) && !found.contains(keyword) {
                found.push(keyword.clone());
            }
        }

        if !found.is_empty() {
            results.push(MatchResult {
                target: target.clone(),
                post_permalink: post.permalink.clone(),
                text: post.text.clone(),
                matched_keywords: found,
                timestamp: post.timestamp,
                views: post.views,
                likes: post.likes,
                reposts: post.reposts,
            });
        }
    }

    results
}

/// Splits a raw keyword string on `;` into trimmed, non-empty keywords
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}
