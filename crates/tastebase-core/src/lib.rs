//! Core contracts and helpers for Tastebase.
//!
//! This crate defines the relational layout, the JSON artifact records, the
//! settings shared by generators and loaders, and the chunk naming rules that
//! let the two sides meet on disk.

pub mod chunks;
pub mod error;
pub mod io;
pub mod records;
pub mod redaction;
pub mod schema;
pub mod settings;

pub use chunks::{ChunkFile, chunk_file_name, list_chunk_files, parse_chunk_index};
pub use error::{Error, Result};
pub use io::{read_json_array, write_json_atomic};
pub use records::{
    Category, Restaurant, RestaurantCategory, RestaurantImage, RestaurantLocation,
    RestaurantReviewStats, Review, ReviewPhoto, UserAccount, UserProfile, round_rating,
};
pub use redaction::{RedactedConnection, redact_connection_string};
pub use schema::{CATEGORY_NAMES, SCHEMA_SQL, Table, category_seed};
pub use settings::{Cohort, CohortSpec, ReviewRange, Settings};

/// Artifact file names shared by generators and loaders.
pub mod files {
    pub const USER_ACCOUNT: &str = "user_account.json";
    pub const USER_PROFILE: &str = "user_profile.json";
    pub const RESTAURANT: &str = "restaurant.json";
    pub const RESTAURANT_LOCATION: &str = "restaurant_location.json";
    pub const RESTAURANT_IMAGE: &str = "restaurant_image.json";
    pub const RESTAURANT_CATEGORY: &str = "restaurant_category.json";
    /// Chunk prefix for `review_<index>.json`.
    pub const REVIEW_PREFIX: &str = "review";
    /// Chunk prefix for `review_photo_<index>.json`.
    pub const REVIEW_PHOTO_PREFIX: &str = "review_photo";
    pub const REPORTS_DIR: &str = "reports";
}
