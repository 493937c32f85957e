//! Local, network-free text used when no service is configured or when the
//! service leaves gaps.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::vocab::{
    DESCRIPTION_TEMPLATES, NAME_PREFIXES, NAME_SUFFIXES, NEGATIVE_NOTES, NEUTRAL_NOTES,
    POSITIVE_NOTES,
};
use super::{MetaDraft, REVIEW_TEXT_MAX_CHARS, truncate_chars};

/// Pick one entry of a non-empty static list.
pub fn pick<R: Rng + ?Sized>(rng: &mut R, items: &[&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Template restaurant metadata for a category and district.
pub fn fallback_meta<R: Rng + ?Sized>(rng: &mut R, category: &str, district: &str) -> MetaDraft {
    let name = format!("{} {}", pick(rng, &NAME_PREFIXES), pick(rng, &NAME_SUFFIXES));
    let description = pick(rng, &DESCRIPTION_TEMPLATES)
        .replace("{category}", category)
        .replace("{district}", district);
    MetaDraft {
        name,
        description,
        categories: vec![category.to_string()],
    }
}

/// Template review text and a rating whose band matches the sentiment.
///
/// 60% positive (4.0..=5.0), 30% neutral (3.0..=4.0), 10% negative (2.0..=3.5).
pub fn fallback_review<R: Rng + ?Sized>(
    rng: &mut R,
    name: &str,
    description: &str,
) -> (String, f64) {
    let teaser = truncate_chars(description, 40);
    let roll: f64 = rng.random();
    let (text, low, high) = if roll < 0.6 {
        let note = pick(rng, &POSITIVE_NOTES);
        (
            format!("Visited {name}. {teaser} {note}, very satisfying overall."),
            4.0,
            5.0,
        )
    } else if roll < 0.9 {
        let note = pick(rng, &NEUTRAL_NOTES);
        (
            format!("Notes from {name}. {teaser} {note}, fine for a light meal."),
            3.0,
            4.0,
        )
    } else {
        let note = pick(rng, &NEGATIVE_NOTES);
        (
            format!("Tried {name}, but {note}. It fell a little short of expectations."),
            2.0,
            3.5,
        )
    };
    let rating = tastebase_core::round_rating(rng.random_range(low..=high));
    (truncate_chars(&text, REVIEW_TEXT_MAX_CHARS), rating)
}
