use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tastebase_core::{
    RestaurantReviewStats, Review, ReviewPhoto, SCHEMA_SQL, Table, UserAccount, UserProfile,
};
use tracing::debug;

use crate::errors::{LoadError, LoadResult};
use crate::store::{InsertOutcome, RestaurantRows, Store};

mod queries;

/// Store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wrap a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> LoadResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create every table (idempotent) and seed the categories.
    pub async fn apply_schema(&self) -> LoadResult<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PostgresStore {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn truncate(&mut self, tables: &[Table]) -> LoadResult<()> {
        if tables.is_empty() {
            return Ok(());
        }
        let sql = queries::truncate_sql(tables);
        let mut tx = self.pool.begin().await?;
        sqlx::query(&sql).execute(&mut *tx).await?;
        tx.commit().await?;
        debug!(sql = %sql, "tables truncated");
        Ok(())
    }

    async fn insert_users(
        &mut self,
        accounts: &[UserAccount],
        profiles: &[UserProfile],
    ) -> LoadResult<InsertOutcome> {
        let mut outcome = InsertOutcome::default();
        let mut tx = self.pool.begin().await?;

        let inserted = queries::insert_user_accounts(&mut tx, accounts)
            .await
            .map_err(LoadError::from_sqlx)?;
        outcome.record(Table::UserAccount, accounts.len(), inserted);
        let inserted = queries::insert_user_profiles(&mut tx, profiles)
            .await
            .map_err(LoadError::from_sqlx)?;
        outcome.record(Table::UserProfile, profiles.len(), inserted);

        tx.commit().await?;
        Ok(outcome)
    }

    async fn insert_restaurants(&mut self, rows: &RestaurantRows) -> LoadResult<InsertOutcome> {
        let mut outcome = InsertOutcome::default();
        let mut tx = self.pool.begin().await?;

        let inserted = queries::insert_restaurants(&mut tx, &rows.restaurants)
            .await
            .map_err(LoadError::from_sqlx)?;
        outcome.record(Table::Restaurant, rows.restaurants.len(), inserted);
        let inserted = queries::insert_locations(&mut tx, &rows.locations)
            .await
            .map_err(LoadError::from_sqlx)?;
        outcome.record(Table::RestaurantLocation, rows.locations.len(), inserted);
        let inserted = queries::insert_images(&mut tx, &rows.images)
            .await
            .map_err(LoadError::from_sqlx)?;
        outcome.record(Table::RestaurantImage, rows.images.len(), inserted);
        let inserted = queries::insert_restaurant_categories(&mut tx, &rows.categories)
            .await
            .map_err(LoadError::from_sqlx)?;
        outcome.record(Table::RestaurantCategory, rows.categories.len(), inserted);

        tx.commit().await?;
        Ok(outcome)
    }

    async fn insert_review_chunk(
        &mut self,
        reviews: &[Review],
        photos: &[ReviewPhoto],
    ) -> LoadResult<InsertOutcome> {
        let mut outcome = InsertOutcome::default();
        let mut tx = self.pool.begin().await?;

        let inserted = queries::insert_reviews(&mut tx, reviews)
            .await
            .map_err(LoadError::from_sqlx)?;
        outcome.record(Table::Review, reviews.len(), inserted);
        let inserted = queries::insert_review_photos(&mut tx, photos)
            .await
            .map_err(LoadError::from_sqlx)?;
        outcome.record(Table::ReviewPhoto, photos.len(), inserted);

        tx.commit().await?;
        Ok(outcome)
    }

    async fn rebuild_stats(&mut self) -> LoadResult<u64> {
        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query(queries::REBUILD_STATS)
            .execute(&mut *tx)
            .await
            .map_err(LoadError::from_sqlx)?
            .rows_affected();
        tx.commit().await?;
        Ok(rows)
    }

    async fn sync_identities(&mut self, tables: &[Table]) -> LoadResult<()> {
        for table in tables {
            if let Some(column) = table.identity_column() {
                sqlx::query(&queries::setval_sql(*table, column))
                    .execute(&self.pool)
                    .await?;
                debug!(table = %table, column, "identity sequence synced");
            }
        }
        Ok(())
    }

    async fn table_counts(&mut self) -> LoadResult<BTreeMap<Table, u64>> {
        let mut counts = BTreeMap::new();
        for table in Table::ALL {
            let count = sqlx::query_scalar::<_, i64>(&queries::count_sql(table))
                .fetch_one(&self.pool)
                .await?;
            counts.insert(table, count.max(0) as u64);
        }
        Ok(counts)
    }

    async fn review_stats(&mut self) -> LoadResult<Vec<RestaurantReviewStats>> {
        let mut conn = self.pool.acquire().await?;
        Ok(queries::fetch_stats(&mut conn).await?)
    }
}
