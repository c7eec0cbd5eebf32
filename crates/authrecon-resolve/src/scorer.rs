//! Token-order-insensitive string similarity.

/// Similarity in `0..=100` between two labels, ignoring token order, case
/// and punctuation. Symmetric; `score(a, a) == 100`. Two strings with no
/// tokens score 100; one empty side scores 0.
pub fn token_sort_ratio(a: &str, b: &str) -> u32 {
    let a = sorted_tokens(a);
    let b = sorted_tokens(b);
    if a.is_empty() && b.is_empty() {
        return 100;
    }
    (strsim::normalized_levenshtein(&a, &b) * 100.0).round() as u32
}

fn sorted_tokens(s: &str) -> String {
    let lowered = s.to_lowercase();
    let mut tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
