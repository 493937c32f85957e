use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use tastebase_core::{
    Restaurant, RestaurantCategory, RestaurantImage, RestaurantLocation, RestaurantReviewStats,
    Review, ReviewPhoto, Table, UserAccount, UserProfile,
};

use crate::errors::LoadResult;

/// Rows a store accepted or skipped as primary-key duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InsertCount {
    pub inserted: u64,
    pub skipped: u64,
}

/// Per-table counts of one committed unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub tables: BTreeMap<Table, InsertCount>,
}

impl InsertOutcome {
    /// Record a statement that offered `offered` rows and inserted `inserted`.
    pub fn record(&mut self, table: Table, offered: usize, inserted: u64) {
        let entry = self.tables.entry(table).or_default();
        entry.inserted += inserted;
        entry.skipped += (offered as u64).saturating_sub(inserted);
    }

    pub fn skipped(&self) -> u64 {
        self.tables.values().map(|count| count.skipped).sum()
    }

    pub fn inserted(&self) -> u64 {
        self.tables.values().map(|count| count.inserted).sum()
    }
}

/// The restaurant file group, inserted as one unit.
#[derive(Debug, Clone, Default)]
pub struct RestaurantRows {
    pub restaurants: Vec<Restaurant>,
    pub locations: Vec<RestaurantLocation>,
    pub images: Vec<RestaurantImage>,
    pub categories: Vec<RestaurantCategory>,
}

/// Relational target of the loaders.
///
/// Every write method is one transaction: parents are written before
/// children, primary-key duplicates are skipped, and any other failure rolls
/// the whole unit back.
#[async_trait]
pub trait Store: Send {
    /// Engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Empty `tables` and everything that references them.
    async fn truncate(&mut self, tables: &[Table]) -> LoadResult<()>;

    async fn insert_users(
        &mut self,
        accounts: &[UserAccount],
        profiles: &[UserProfile],
    ) -> LoadResult<InsertOutcome>;

    async fn insert_restaurants(&mut self, rows: &RestaurantRows) -> LoadResult<InsertOutcome>;

    async fn insert_review_chunk(
        &mut self,
        reviews: &[Review],
        photos: &[ReviewPhoto],
    ) -> LoadResult<InsertOutcome>;

    /// Recompute review count and average rating for every restaurant.
    /// Returns the number of stats rows written.
    async fn rebuild_stats(&mut self) -> LoadResult<u64>;

    /// Move identity sequences past the highest loaded id.
    async fn sync_identities(&mut self, tables: &[Table]) -> LoadResult<()>;

    async fn table_counts(&mut self) -> LoadResult<BTreeMap<Table, u64>>;

    async fn review_stats(&mut self) -> LoadResult<Vec<RestaurantReviewStats>>;
}
