//! In-process store with the same unit semantics as Postgres.
//!
//! Each unit is applied to a staged copy of the tables and swapped in only
//! when every row passes, so a failing unit leaves nothing behind.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tastebase_core::{
    Category, Restaurant, RestaurantCategory, RestaurantImage, RestaurantLocation,
    RestaurantReviewStats, Review, ReviewPhoto, Table, UserAccount, UserProfile, category_seed,
};

use crate::errors::{LoadError, LoadResult};
use crate::store::{InsertOutcome, RestaurantRows, Store};

/// Every row held by a [`MemoryStore`], keyed by primary key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTables {
    categories: BTreeMap<i64, Category>,
    restaurants: BTreeMap<i64, Restaurant>,
    locations: BTreeMap<i64, RestaurantLocation>,
    images: BTreeMap<i64, RestaurantImage>,
    restaurant_categories: BTreeMap<i64, RestaurantCategory>,
    accounts: BTreeMap<i64, UserAccount>,
    profiles: BTreeMap<i64, UserProfile>,
    reviews: BTreeMap<i64, Review>,
    photos: BTreeMap<i64, ReviewPhoto>,
    stats: BTreeMap<i64, RestaurantReviewStats>,
}

impl MemoryTables {
    fn clear(&mut self, table: Table) {
        match table {
            Table::Category => self.categories.clear(),
            Table::Restaurant => self.restaurants.clear(),
            Table::RestaurantLocation => self.locations.clear(),
            Table::RestaurantImage => self.images.clear(),
            Table::RestaurantCategory => self.restaurant_categories.clear(),
            Table::UserAccount => self.accounts.clear(),
            Table::UserProfile => self.profiles.clear(),
            Table::Review => self.reviews.clear(),
            Table::ReviewPhoto => self.photos.clear(),
            Table::RestaurantReviewStats => self.stats.clear(),
        }
    }

    fn len(&self, table: Table) -> usize {
        match table {
            Table::Category => self.categories.len(),
            Table::Restaurant => self.restaurants.len(),
            Table::RestaurantLocation => self.locations.len(),
            Table::RestaurantImage => self.images.len(),
            Table::RestaurantCategory => self.restaurant_categories.len(),
            Table::UserAccount => self.accounts.len(),
            Table::UserProfile => self.profiles.len(),
            Table::Review => self.reviews.len(),
            Table::ReviewPhoto => self.photos.len(),
            Table::RestaurantReviewStats => self.stats.len(),
        }
    }
}

/// Store that keeps every table in memory.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: MemoryTables,
    /// Stamped on seeded categories and rebuilt stats.
    clock: NaiveDateTime,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(chrono::Utc::now().naive_utc())
    }
}

impl MemoryStore {
    /// Empty store with the category seed applied.
    pub fn new(clock: NaiveDateTime) -> Self {
        let mut tables = MemoryTables::default();
        seed_categories(&mut tables, clock);
        Self { tables, clock }
    }

    /// Copy of every row, for comparing whole store contents.
    pub fn snapshot(&self) -> MemoryTables {
        self.tables.clone()
    }

    /// Apply `unit` to a staged copy and keep it only on success.
    fn transaction<F>(&mut self, unit: F) -> LoadResult<InsertOutcome>
    where
        F: FnOnce(&mut MemoryTables, &mut InsertOutcome) -> LoadResult<()>,
    {
        let mut staged = self.tables.clone();
        let mut outcome = InsertOutcome::default();
        unit(&mut staged, &mut outcome)?;
        self.tables = staged;
        Ok(outcome)
    }
}

fn seed_categories(tables: &mut MemoryTables, now: NaiveDateTime) {
    for category in category_seed(now) {
        tables.categories.insert(category.category_id, category);
    }
}

/// Insert unless the key exists; returns whether the row was inserted.
fn insert_new<T: Clone>(map: &mut BTreeMap<i64, T>, key: i64, row: &T) -> bool {
    if map.contains_key(&key) {
        return false;
    }
    map.insert(key, row.clone());
    true
}

fn insert_all<T: Clone>(
    map: &mut BTreeMap<i64, T>,
    table: Table,
    rows: &[T],
    key: impl Fn(&T) -> i64,
    outcome: &mut InsertOutcome,
) {
    let inserted = rows
        .iter()
        .filter(|row| insert_new(map, key(*row), *row))
        .count();
    outcome.record(table, rows.len(), inserted as u64);
}

fn require<T>(map: &BTreeMap<i64, T>, key: i64, table: Table, parent: Table) -> LoadResult<()> {
    if map.contains_key(&key) {
        return Ok(());
    }
    Err(LoadError::Constraint {
        table: table.name().to_string(),
        message: format!("{} = {key} is not present in {parent}", parent.key_column()),
    })
}

/// Sum of ratings in tenths; ratings carry one decimal digit.
fn rating_tenths(rating: f64) -> i64 {
    (rating * 10.0).round() as i64
}

#[async_trait]
impl Store for MemoryStore {
    fn engine(&self) -> &'static str {
        "memory"
    }

    async fn truncate(&mut self, tables: &[Table]) -> LoadResult<()> {
        let cleared: BTreeSet<Table> = Table::cascade(tables);
        for table in &cleared {
            self.tables.clear(*table);
        }
        if cleared.contains(&Table::Category) {
            seed_categories(&mut self.tables, self.clock);
        }
        Ok(())
    }

    async fn insert_users(
        &mut self,
        accounts: &[UserAccount],
        profiles: &[UserProfile],
    ) -> LoadResult<InsertOutcome> {
        self.transaction(|tables, outcome| {
            let mut usernames: BTreeSet<String> = tables
                .accounts
                .values()
                .map(|user| user.username.clone())
                .collect();
            let mut inserted = 0;
            for account in accounts {
                if tables.accounts.contains_key(&account.user_id) {
                    continue;
                }
                if !usernames.insert(account.username.clone()) {
                    return Err(LoadError::Constraint {
                        table: Table::UserAccount.name().to_string(),
                        message: format!("username '{}' already exists", account.username),
                    });
                }
                tables.accounts.insert(account.user_id, account.clone());
                inserted += 1;
            }
            outcome.record(Table::UserAccount, accounts.len(), inserted);

            for profile in profiles {
                require(
                    &tables.accounts,
                    profile.user_id,
                    Table::UserProfile,
                    Table::UserAccount,
                )?;
            }
            insert_all(
                &mut tables.profiles,
                Table::UserProfile,
                profiles,
                |profile| profile.user_id,
                outcome,
            );
            Ok(())
        })
    }

    async fn insert_restaurants(&mut self, rows: &RestaurantRows) -> LoadResult<InsertOutcome> {
        self.transaction(|tables, outcome| {
            insert_all(
                &mut tables.restaurants,
                Table::Restaurant,
                &rows.restaurants,
                |restaurant| restaurant.restaurant_id,
                outcome,
            );

            for location in &rows.locations {
                require(
                    &tables.restaurants,
                    location.restaurant_id,
                    Table::RestaurantLocation,
                    Table::Restaurant,
                )?;
            }
            insert_all(
                &mut tables.locations,
                Table::RestaurantLocation,
                &rows.locations,
                |location| location.restaurant_id,
                outcome,
            );

            for image in &rows.images {
                require(
                    &tables.restaurants,
                    image.restaurant_id,
                    Table::RestaurantImage,
                    Table::Restaurant,
                )?;
            }
            insert_all(
                &mut tables.images,
                Table::RestaurantImage,
                &rows.images,
                |image| image.image_id,
                outcome,
            );

            let mut pairs: BTreeSet<(i64, i64)> = tables
                .restaurant_categories
                .values()
                .map(|link| (link.restaurant_id, link.category_id))
                .collect();
            let mut inserted = 0;
            for link in &rows.categories {
                if tables.restaurant_categories.contains_key(&link.rc_id) {
                    continue;
                }
                require(
                    &tables.restaurants,
                    link.restaurant_id,
                    Table::RestaurantCategory,
                    Table::Restaurant,
                )?;
                require(
                    &tables.categories,
                    link.category_id,
                    Table::RestaurantCategory,
                    Table::Category,
                )?;
                if !pairs.insert((link.restaurant_id, link.category_id)) {
                    return Err(LoadError::Constraint {
                        table: Table::RestaurantCategory.name().to_string(),
                        message: format!(
                            "restaurant {} already linked to category {}",
                            link.restaurant_id, link.category_id
                        ),
                    });
                }
                tables.restaurant_categories.insert(link.rc_id, link.clone());
                inserted += 1;
            }
            outcome.record(Table::RestaurantCategory, rows.categories.len(), inserted);
            Ok(())
        })
    }

    async fn insert_review_chunk(
        &mut self,
        reviews: &[Review],
        photos: &[ReviewPhoto],
    ) -> LoadResult<InsertOutcome> {
        self.transaction(|tables, outcome| {
            for review in reviews {
                require(&tables.accounts, review.user_id, Table::Review, Table::UserAccount)?;
                require(
                    &tables.restaurants,
                    review.restaurant_id,
                    Table::Review,
                    Table::Restaurant,
                )?;
                if !(0.0..=5.0).contains(&review.rating) {
                    return Err(LoadError::Constraint {
                        table: Table::Review.name().to_string(),
                        message: format!(
                            "review {} has rating {} outside 0.0..=5.0",
                            review.review_id, review.rating
                        ),
                    });
                }
            }
            insert_all(
                &mut tables.reviews,
                Table::Review,
                reviews,
                |review| review.review_id,
                outcome,
            );

            for photo in photos {
                require(&tables.reviews, photo.review_id, Table::ReviewPhoto, Table::Review)?;
            }
            insert_all(
                &mut tables.photos,
                Table::ReviewPhoto,
                photos,
                |photo| photo.photo_id,
                outcome,
            );
            Ok(())
        })
    }

    async fn rebuild_stats(&mut self) -> LoadResult<u64> {
        let mut totals: BTreeMap<i64, (i64, i64)> = BTreeMap::new();
        for review in self.tables.reviews.values().filter(|review| !review.is_deleted) {
            let entry = totals.entry(review.restaurant_id).or_default();
            entry.0 += 1;
            entry.1 += rating_tenths(review.rating);
        }

        let mut stats = BTreeMap::new();
        for restaurant_id in self.tables.restaurants.keys() {
            let (count, tenths) = totals.get(restaurant_id).copied().unwrap_or_default();
            // Half-up rounding of the mean in tenths, as NUMERIC ROUND does.
            let avg_rating = if count == 0 {
                0.0
            } else {
                ((2 * tenths + count) / (2 * count)) as f64 / 10.0
            };
            stats.insert(
                *restaurant_id,
                RestaurantReviewStats {
                    restaurant_id: *restaurant_id,
                    review_count: count,
                    avg_rating,
                    updated_at: self.clock,
                },
            );
        }

        let written = stats.len() as u64;
        self.tables.stats = stats;
        Ok(written)
    }

    async fn sync_identities(&mut self, _tables: &[Table]) -> LoadResult<()> {
        Ok(())
    }

    async fn table_counts(&mut self) -> LoadResult<BTreeMap<Table, u64>> {
        Ok(Table::ALL
            .into_iter()
            .map(|table| (table, self.tables.len(table) as u64))
            .collect())
    }

    async fn review_stats(&mut self) -> LoadResult<Vec<RestaurantReviewStats>> {
        Ok(self.tables.stats.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_rounds_half_up_in_tenths() {
        let ratings = [4.0, 4.5];
        let tenths: i64 = ratings.iter().map(|rating| rating_tenths(*rating)).sum();
        let count = ratings.len() as i64;
        assert_eq!(((2 * tenths + count) / (2 * count)) as f64 / 10.0, 4.3);
    }

    #[test]
    fn new_store_is_seeded_with_categories() {
        let store = MemoryStore::default();
        assert_eq!(store.tables.len(Table::Category), 11);
        assert_eq!(store.tables.len(Table::Review), 0);
    }
}
