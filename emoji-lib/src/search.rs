//! Substring search over emoji labels and tags.

use std::collections::HashSet;

use crate::model::EmojiRecord;

/// Score awarded when the label contains the query.
const LABEL_SCORE: u32 = 10;
/// Score awarded per tag containing the query.
const TAG_SCORE: u32 = 1;

/// Filters emojis by a free-text query and an exclusion list.
///
/// - Records whose glyph is in `excluded` are always removed.
/// - With a query (trimmed, case-insensitive), a record matches when its
///   label or any tag contains it. The label is worth 10 points and every
///   matching tag 1 more; results are sorted by descending score, ties
///   keeping dataset order.
/// - Without a query, the remaining records keep dataset order.
///
/// The returned vector borrows from `emojis`; nothing is copied or mutated.
///
/// # Example
///
/// ```ignore
/// let results = search_and_exclude(&data.emojis, Some("heart"), &[]);
/// ```
pub fn search_and_exclude<'a, S: AsRef<str>>(
    emojis: &'a [EmojiRecord],
    query: Option<&str>,
    excluded: &[S],
) -> Vec<&'a EmojiRecord> {
    let query = query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());
    let excluded: HashSet<&str> = excluded.iter().map(AsRef::as_ref).collect();
    let kept = emojis
        .iter()
        .filter(|emoji| !excluded.contains(emoji.emoji.as_str()));

    let Some(query) = query else {
        return kept.collect();
    };

    let mut scored: Vec<(u32, &EmojiRecord)> = kept
        .filter_map(|emoji| {
            let score = score(emoji, &query);
            (score > 0).then_some((score, emoji))
        })
        .collect();

    // Stable, so equal scores keep dataset order
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored.into_iter().map(|(_, emoji)| emoji).collect()
}

fn score(emoji: &EmojiRecord, query: &str) -> u32 {
    let mut score = 0;
    if emoji.label.to_lowercase().contains(query) {
        score += LABEL_SCORE;
    }
    for tag in &emoji.tags {
        if tag.to_lowercase().contains(query) {
            score += TAG_SCORE;
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(emoji: &str, label: &str, tags: &[&str]) -> EmojiRecord {
        EmojiRecord {
            emoji: emoji.to_string(),
            category: 0,
            version: 1.0,
            label: label.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            country_flag: false,
            skins: None,
        }
    }

    fn fixture() -> Vec<EmojiRecord> {
        vec![
            record("🍎", "Red apple", &["fruit", "apple"]),
            record("🍏", "Green apple", &["fruit", "apple", "green"]),
            record("🥦", "Broccoli", &["vegetable", "cabbage"]),
            record("🍍", "Pineapple", &["fruit"]),
            record("🥧", "Pie", &["apple", "pastry"]),
        ]
    }

    fn glyphs(results: &[&EmojiRecord]) -> Vec<String> {
        results.iter().map(|e| e.emoji.clone()).collect()
    }

    #[test]
    fn test_no_query_no_exclusions_is_identity() {
        let emojis = fixture();
        let results = search_and_exclude::<String>(&emojis, None, &[]);
        assert_eq!(results.len(), emojis.len());
        for (result, original) in results.iter().zip(&emojis) {
            assert!(std::ptr::eq(*result, original));
        }
    }

    #[test]
    fn test_blank_query_keeps_order() {
        let emojis = fixture();
        let results = search_and_exclude(&emojis, Some("   "), &["🥦"]);
        assert_eq!(glyphs(&results), vec!["🍎", "🍏", "🍍", "🥧"]);
    }

    #[test]
    fn test_excluded_never_returned() {
        let emojis = fixture();
        let excluded = vec!["🍏".to_string(), "🥧".to_string()];
        for query in [None, Some("apple"), Some("fruit"), Some("")] {
            let results = search_and_exclude(&emojis, query, &excluded);
            assert!(results.iter().all(|e| !excluded.contains(&e.emoji)));
        }
    }

    #[test]
    fn test_scoring_orders_by_label_then_tags() {
        let emojis = fixture();
        let results = search_and_exclude::<String>(&emojis, Some("Apple"), &[]);
        // Red/Green apple: label + "apple" tag = 11
        // Pineapple: label = 10
        // Pie: one tag = 1
        assert_eq!(glyphs(&results), vec!["🍎", "🍏", "🍍", "🥧"]);
    }

    #[test]
    fn test_non_matching_dropped() {
        let emojis = fixture();
        let results = search_and_exclude::<String>(&emojis, Some("broccoli"), &[]);
        assert_eq!(glyphs(&results), vec!["🥦"]);

        let results = search_and_exclude::<String>(&emojis, Some("xyz"), &[]);
        assert!(results.is_empty());
    }

    #[test]
    fn test_tag_matches_accumulate() {
        let emojis = vec![
            record("a", "Alpha", &["veg"]),
            record("b", "Beta", &["veggie", "vegetable"]),
        ];
        let results = search_and_exclude::<String>(&emojis, Some("veg"), &[]);
        assert_eq!(glyphs(&results), vec!["b", "a"]);
    }
}
