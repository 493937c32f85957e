//! Fixed relational layout shared by generators and loaders.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use crate::records::Category;

/// Idempotent DDL for every table plus the category seed.
pub const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");

/// Seeded category names; ids are 1-based positions in this list.
pub const CATEGORY_NAMES: [&str; 11] = [
    "Korean",
    "Chinese",
    "Japanese",
    "Western",
    "Asian",
    "Cafe/Dessert",
    "Fast Food",
    "Chicken",
    "Pizza",
    "Pub/Bar",
    "Other",
];

/// Tables of the relational store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    Category,
    Restaurant,
    RestaurantLocation,
    RestaurantImage,
    RestaurantCategory,
    UserAccount,
    UserProfile,
    Review,
    ReviewPhoto,
    RestaurantReviewStats,
}

impl Table {
    pub const ALL: [Table; 10] = [
        Table::Category,
        Table::Restaurant,
        Table::RestaurantLocation,
        Table::RestaurantImage,
        Table::RestaurantCategory,
        Table::UserAccount,
        Table::UserProfile,
        Table::Review,
        Table::ReviewPhoto,
        Table::RestaurantReviewStats,
    ];

    /// Tables cleared by the user loader, children first.
    pub const USER_TABLES: [Table; 2] = [Table::UserProfile, Table::UserAccount];

    /// Tables cleared by the restaurant loader, children first.
    pub const RESTAURANT_TABLES: [Table; 4] = [
        Table::RestaurantCategory,
        Table::RestaurantImage,
        Table::RestaurantLocation,
        Table::Restaurant,
    ];

    /// Tables cleared by the review loader, children first.
    pub const REVIEW_TABLES: [Table; 2] = [Table::ReviewPhoto, Table::Review];

    pub fn name(self) -> &'static str {
        match self {
            Table::Category => "category",
            Table::Restaurant => "restaurant",
            Table::RestaurantLocation => "restaurant_location",
            Table::RestaurantImage => "restaurant_image",
            Table::RestaurantCategory => "restaurant_category",
            Table::UserAccount => "user_account",
            Table::UserProfile => "user_profile",
            Table::Review => "review",
            Table::ReviewPhoto => "review_photo",
            Table::RestaurantReviewStats => "restaurant_review_stats",
        }
    }

    /// Primary-key column used for conflict detection.
    pub fn key_column(self) -> &'static str {
        match self {
            Table::Category => "category_id",
            Table::Restaurant
            | Table::RestaurantLocation
            | Table::RestaurantReviewStats => "restaurant_id",
            Table::RestaurantImage => "image_id",
            Table::RestaurantCategory => "rc_id",
            Table::UserAccount | Table::UserProfile => "user_id",
            Table::Review => "review_id",
            Table::ReviewPhoto => "photo_id",
        }
    }

    /// Tables this one holds foreign keys into.
    pub fn parents(self) -> &'static [Table] {
        match self {
            Table::Category | Table::Restaurant | Table::UserAccount => &[],
            Table::RestaurantLocation | Table::RestaurantImage | Table::RestaurantReviewStats => {
                &[Table::Restaurant]
            }
            Table::RestaurantCategory => &[Table::Restaurant, Table::Category],
            Table::UserProfile => &[Table::UserAccount],
            Table::Review => &[Table::UserAccount, Table::Restaurant],
            Table::ReviewPhoto => &[Table::Review],
        }
    }

    /// `tables` plus every table that references them, directly or not,
    /// i.e. what `TRUNCATE ... CASCADE` empties.
    pub fn cascade(tables: &[Table]) -> BTreeSet<Table> {
        let mut closed: BTreeSet<Table> = tables.iter().copied().collect();
        loop {
            let before = closed.len();
            for table in Table::ALL {
                if table.parents().iter().any(|parent| closed.contains(parent)) {
                    closed.insert(table);
                }
            }
            if closed.len() == before {
                return closed;
            }
        }
    }

    /// Identity column, when the table owns one.
    pub fn identity_column(self) -> Option<&'static str> {
        match self {
            Table::Category => Some("category_id"),
            Table::Restaurant => Some("restaurant_id"),
            Table::RestaurantImage => Some("image_id"),
            Table::RestaurantCategory => Some("rc_id"),
            Table::UserAccount => Some("user_id"),
            Table::Review => Some("review_id"),
            Table::ReviewPhoto => Some("photo_id"),
            Table::RestaurantLocation | Table::UserProfile | Table::RestaurantReviewStats => None,
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The static category rows, matching the seed in [`SCHEMA_SQL`].
pub fn category_seed(now: NaiveDateTime) -> Vec<Category> {
    CATEGORY_NAMES
        .iter()
        .enumerate()
        .map(|(idx, name)| Category {
            category_id: idx as i64 + 1,
            name: (*name).to_string(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_names_are_unique_and_match_ddl() {
        let unique: BTreeSet<&str> = CATEGORY_NAMES.iter().copied().collect();
        assert_eq!(unique.len(), CATEGORY_NAMES.len());

        for (idx, name) in CATEGORY_NAMES.iter().enumerate() {
            let row = format!("({}, '{}')", idx + 1, name);
            assert!(SCHEMA_SQL.contains(&row), "ddl seed missing {row}");
        }
    }

    #[test]
    fn every_table_has_ddl() {
        for table in Table::ALL {
            let ddl = format!("CREATE TABLE IF NOT EXISTS {} (", table.name());
            assert!(SCHEMA_SQL.contains(&ddl), "missing ddl for {table}");
        }
    }

    #[test]
    fn truncating_users_cascades_to_reviews() {
        let cleared = Table::cascade(&Table::USER_TABLES);
        assert!(cleared.contains(&Table::Review));
        assert!(cleared.contains(&Table::ReviewPhoto));
        assert!(!cleared.contains(&Table::Restaurant));
    }

    #[test]
    fn truncating_restaurants_keeps_categories_and_users() {
        let cleared = Table::cascade(&Table::RESTAURANT_TABLES);
        assert!(cleared.contains(&Table::RestaurantReviewStats));
        assert!(cleared.contains(&Table::ReviewPhoto));
        assert!(!cleared.contains(&Table::Category));
        assert!(!cleared.contains(&Table::UserAccount));
    }
}
