//! Label normalization for equality comparison.
//!
//! The engine only relies on the [`Normalizer`] contract: deterministic and
//! idempotent. [`TextNormalizer`] is the default used by the server.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalizes a raw label. Implementations must be deterministic and
/// idempotent: `normalize(normalize(s)) == normalize(s)`.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, s: &str) -> String;
}

/// Default normalizer:
/// - NFKD fold with combining marks dropped (diacritic smoothing)
/// - `&` spelled out as `and`
/// - Lowercase conversion
/// - Punctuation replaced with space
/// - Whitespace trimmed and collapsed
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl Normalizer for TextNormalizer {
    fn normalize(&self, s: &str) -> String {
        let folded: String = s
            .nfkd()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase)
            .collect();

        let mut out = String::with_capacity(folded.len());
        for token in folded
            .replace('&', " and ")
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(token);
        }
        out
    }
}
