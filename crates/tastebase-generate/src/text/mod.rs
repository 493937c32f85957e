//! Text for restaurant metadata and reviews.
//!
//! An external service is used when a credential is configured; the local
//! templates in [`templates`] cover everything it does not return.

pub mod openai;
pub mod templates;
pub mod vocab;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tastebase_core::Settings;
use thiserror::Error;

pub use openai::OpenAiText;

/// Failures talking to the text service. Generators recover from all of them.
#[derive(Debug, Error)]
pub enum TextError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Request for a batch of restaurant metadata.
#[derive(Debug, Clone, Serialize)]
pub struct MetaRequest {
    pub count: usize,
    pub category_hints: Vec<String>,
    pub district_hints: Vec<String>,
    pub allowed_categories: Vec<String>,
}

/// Restaurant name, description and category names as returned by a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaDraft {
    pub name: String,
    pub description: String,
    pub categories: Vec<String>,
}

/// A planned review waiting for text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSlot {
    pub slot_id: u64,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub description: String,
    pub visited_at: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub slot_id: u64,
    pub review_text: String,
    pub rating: f64,
}

/// External text generation.
///
/// Implementations may return fewer items than requested; callers fill the
/// gaps locally.
#[async_trait]
pub trait TextService: Send + Sync {
    fn name(&self) -> &'static str;

    async fn restaurant_meta(&self, request: &MetaRequest) -> Result<Vec<MetaDraft>, TextError>;

    async fn review_texts(&self, slots: &[ReviewSlot]) -> Result<Vec<ReviewDraft>, TextError>;
}

/// Build the configured service, or `None` when no credential is set.
pub fn text_service_from_settings(settings: &Settings) -> Result<Option<OpenAiText>, TextError> {
    match settings.openai_api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => Ok(Some(OpenAiText::new(
            key,
            &settings.openai_base_url,
            &settings.openai_model,
        )?)),
        _ => Ok(None),
    }
}

/// Maximum review text length in characters.
pub const REVIEW_TEXT_MAX_CHARS: usize = 200;
const NAME_MAX_CHARS: usize = 100;
const DESCRIPTION_MAX_CHARS: usize = 255;

/// Keep the first `max` characters (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Validate a service draft against the allowed categories.
///
/// Drafts with an empty name or description, or with a category list outside
/// 1..=3 entries, are rejected. Unknown category names are dropped; if none
/// remain the draft keeps `fallback_category`.
pub fn accept_meta(
    draft: MetaDraft,
    allowed: &[String],
    fallback_category: &str,
) -> Option<MetaDraft> {
    let name = truncate_chars(draft.name.trim(), NAME_MAX_CHARS);
    let description = truncate_chars(draft.description.trim(), DESCRIPTION_MAX_CHARS);
    if name.is_empty() || description.is_empty() || !(1..=3).contains(&draft.categories.len()) {
        return None;
    }

    let mut categories: Vec<String> = Vec::new();
    for category in draft.categories {
        let category = category.trim().to_string();
        if allowed.contains(&category) && !categories.contains(&category) {
            categories.push(category);
        }
    }
    if categories.is_empty() {
        categories.push(fallback_category.to_string());
    }

    Some(MetaDraft {
        name,
        description,
        categories,
    })
}

/// Validate a review draft: non-empty text, rating clamped and rounded.
pub fn accept_review(draft: ReviewDraft) -> Option<ReviewDraft> {
    let text = truncate_chars(draft.review_text.trim(), REVIEW_TEXT_MAX_CHARS);
    if text.is_empty() || !draft.rating.is_finite() {
        return None;
    }
    Some(ReviewDraft {
        slot_id: draft.slot_id,
        review_text: text,
        rating: tastebase_core::round_rating(draft.rating),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["Korean".to_string(), "Pizza".to_string()]
    }

    #[test]
    fn meta_keeps_only_allowed_categories() {
        let draft = MetaDraft {
            name: " Daon Table ".to_string(),
            description: "Warm bowls".to_string(),
            categories: vec!["Pizza".to_string(), "Sushi".to_string(), "Pizza".to_string()],
        };
        let accepted = accept_meta(draft, &allowed(), "Korean").expect("accepted");
        assert_eq!(accepted.name, "Daon Table");
        assert_eq!(accepted.categories, vec!["Pizza".to_string()]);
    }

    #[test]
    fn meta_with_only_unknown_categories_gets_fallback() {
        let draft = MetaDraft {
            name: "Miso".to_string(),
            description: "Noodles".to_string(),
            categories: vec!["Sushi".to_string()],
        };
        let accepted = accept_meta(draft, &allowed(), "Korean").expect("accepted");
        assert_eq!(accepted.categories, vec!["Korean".to_string()]);
    }

    #[test]
    fn meta_without_description_is_rejected() {
        let draft = MetaDraft {
            name: "Miso".to_string(),
            description: "  ".to_string(),
            categories: vec!["Korean".to_string()],
        };
        assert!(accept_meta(draft, &allowed(), "Korean").is_none());
    }

    #[test]
    fn review_rating_is_clamped_and_text_truncated() {
        let draft = ReviewDraft {
            slot_id: 1,
            review_text: "맛".repeat(300),
            rating: 5.74,
        };
        let accepted = accept_review(draft).expect("accepted");
        assert_eq!(accepted.review_text.chars().count(), REVIEW_TEXT_MAX_CHARS);
        assert_eq!(accepted.rating, 5.0);
    }
}
