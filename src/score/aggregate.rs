//! Language and metatype roll-ups.
//!
//! Every raw row with a language and metatype contributes to up to four
//! aggregate buckets: its own `(language, metatype)` pair plus the `ALL`
//! expansions of each key. Buckets keep their member rows, so bucket means
//! are always recomputable from exact membership. Aggregates are appended
//! after the raw rows, ordered with concrete keys before `ALL` and the
//! `(ALL, ALL)` grand total last.

use super::{Score, ScoreCollection};
use std::collections::BTreeMap;

fn expansions(key: &str, already_all: bool) -> Vec<String> {
    if key == "ALL" || already_all {
        vec![key.to_owned()]
    } else {
        vec![key.to_owned(), "ALL".to_owned()]
    }
}

/// Ordering key: concrete values sort before `ALL` within each position.
fn bucket_order(key: &(String, String)) -> (bool, String, bool, String) {
    (
        key.0 == "ALL",
        key.0.clone(),
        key.1 == "ALL",
        key.1.clone(),
    )
}

/// Append `(language, metatype)` aggregate rows for the raw rows already in
/// `collection`.
///
/// If the raw rows themselves carry an `ALL` language or metatype (some
/// metrics pre-aggregate one axis), that axis is not expanded again.
pub fn aggregate_scores(collection: &mut ScoreCollection, run_id: &str) {
    let raw_has_all_language = collection
        .raw_rows()
        .any(|s| s.language.as_deref() == Some("ALL"));
    let raw_has_all_metatype = collection
        .raw_rows()
        .any(|s| s.metatype.as_deref() == Some("ALL"));

    let mut buckets: BTreeMap<(String, String), Vec<Score>> = BTreeMap::new();
    for row in collection.raw_rows() {
        let (language, metatype) = match (&row.language, &row.metatype) {
            (Some(l), Some(m)) => (l, m),
            _ => continue,
        };
        for language in expansions(language, raw_has_all_language) {
            for metatype in expansions(metatype, raw_has_all_metatype) {
                buckets
                    .entry((language.clone(), metatype))
                    .or_default()
                    .push(row.clone());
            }
        }
    }

    let mut keys: Vec<(String, String)> = buckets.keys().cloned().collect();
    keys.sort_by_key(bucket_order);
    for key in keys {
        let elements = match buckets.remove(&key) {
            Some(elements) => elements,
            None => continue,
        };
        let (language, metatype) = key;
        collection.add(Score {
            run_id: run_id.to_owned(),
            document_id: Some("Summary".to_owned()),
            language: Some(language),
            metatype: Some(metatype),
            summary: true,
            aggregate: true,
            elements,
            ..Score::default()
        });
    }
}
