//! Fuzzy ingredient-name matching for display-time aggregation.
//!
//! Canonical ingredient names are never rewritten; this only decides which
//! bucket a name accumulates into.

/// Minimum similarity for two names to share a bucket.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Case-insensitive normalized Levenshtein similarity in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());

    if max_len == 0 {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    1.0 - strsim::levenshtein(&a, &b) as f64 / max_len as f64
}

/// Returns the existing key most similar to `name`, if any reaches `threshold`.
///
/// Ties on similarity go to the lexicographically smallest key, so the
/// result does not depend on the iteration order of `keys`.
pub fn find_similar_key<'a, I>(keys: I, name: &str, threshold: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f64)> = None;

    for key in keys {
        let score = similarity(key, name);
        if score < threshold {
            continue;
        }
        best = match best {
            Some((best_key, best_score))
                if best_score > score || (best_score == score && best_key <= key) =>
            {
                Some((best_key, best_score))
            }
            _ => Some((key, score)),
        };
    }

    best.map(|(key, _)| key)
}
