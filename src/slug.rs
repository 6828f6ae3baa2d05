//! Slug derivation and resolution against a uniqueness oracle.

use rand::Rng;
use unicode_normalization::UnicodeNormalization;

use crate::models::MAX_LENGTH;

const SLUG_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unable to find an unique slug")]
pub struct SlugExhausted;

/// Lowercase ASCII slug: word characters kept, runs of whitespace and
/// hyphens collapsed to a single `-`, leading and trailing `-`/`_` removed.
/// Input is NFKD-decomposed first, so accented letters keep their base
/// letter; whatever is still outside ASCII is dropped.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for c in value.nfkd() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Whether `slug` is non-empty and made only of ASCII letters, digits,
/// `-` and `_`.
pub fn is_url_safe(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Grow `candidate` one random `[a-z0-9]` character at a time until
/// `is_valid_slug` accepts it. An empty candidate is never accepted.
pub fn resolve_slug<R, F>(
    mut candidate: String,
    mut is_valid_slug: F,
    rng: &mut R,
) -> Result<String, SlugExhausted>
where
    R: Rng + ?Sized,
    F: FnMut(&str) -> bool,
{
    while candidate.is_empty() || !is_valid_slug(&candidate) {
        if candidate.chars().count() >= MAX_LENGTH {
            return Err(SlugExhausted);
        }
        let next = SLUG_CHARS[rng.random_range(0..SLUG_CHARS.len())];
        candidate.push(char::from(next));
        tracing::debug!(candidate = %candidate, "probing slug");
    }

    Ok(candidate)
}
