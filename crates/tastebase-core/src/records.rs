//! Row records as they appear in the JSON artifacts.
//!
//! Field names mirror the relational columns one to one so loaders can bind
//! them without renaming.

use chrono::{NaiveDate, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Seeded restaurant category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Category {
    pub category_id: i64,
    pub name: String,
    pub is_deleted: bool,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Restaurant {
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub phone_number: Option<String>,
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub updated_at: NaiveDateTime,
}

/// One location per restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RestaurantLocation {
    pub restaurant_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub address_line: String,
    pub region_si_do: String,
    pub region_si_gun_gu: String,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub updated_at: NaiveDateTime,
}

/// Gallery image; `index` orders images within a restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RestaurantImage {
    pub image_id: i64,
    pub restaurant_id: i64,
    pub image_path: String,
    #[serde(default)]
    pub is_deleted: bool,
    pub index: i32,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub updated_at: NaiveDateTime,
}

/// Join row between restaurants and categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RestaurantCategory {
    pub rc_id: i64,
    pub restaurant_id: i64,
    pub category_id: i64,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UserAccount {
    pub user_id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub joined_at: NaiveDateTime,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub updated_at: NaiveDateTime,
}

/// One profile per user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UserProfile {
    pub user_id: i64,
    pub nickname: String,
    pub image_path: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Review {
    pub review_id: i64,
    pub user_id: i64,
    pub restaurant_id: i64,
    /// One decimal digit, 0.0 to 5.0.
    pub rating: f64,
    pub review_text: Option<String>,
    pub visited_at: NaiveDate,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReviewPhoto {
    pub photo_id: i64,
    pub review_id: i64,
    pub image_url: String,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub updated_at: NaiveDateTime,
}

/// Derived per-restaurant aggregate over non-deleted reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RestaurantReviewStats {
    pub restaurant_id: i64,
    pub review_count: i64,
    pub avg_rating: f64,
    #[serde(with = "timestamp")]
    #[schemars(with = "String")]
    pub updated_at: NaiveDateTime,
}

/// Clamp to the rating scale and keep a single decimal digit.
pub fn round_rating(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value.clamp(0.0, 5.0) * 10.0).round() / 10.0
}

/// `YYYY-MM-DD HH:MM:SS` timestamps, the layout every artifact uses.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}
