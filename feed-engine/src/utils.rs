/// Trimmed, lowercased pubkey; empty when there is nothing usable.
pub fn normalize_author(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Tags compare case-insensitively and without a leading `#`.
pub fn normalize_tag(value: &str) -> String {
    value.trim().trim_start_matches('#').to_lowercase()
}

/// First candidate that is non-empty after trimming.
pub fn first_non_empty<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .map(str::to_string)
}

/// Watch timestamps in unix seconds. Millisecond values are scaled down and
/// anything missing or non-positive becomes 0.
pub fn normalize_watched_at(value: Option<i64>) -> i64 {
    match value {
        Some(value) if value > 10_000_000_000 => value / 1000,
        Some(value) if value > 0 => value,
        _ => 0,
    }
}
