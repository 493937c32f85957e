use std::env;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use tastebase_core::{RestaurantReviewStats, ReviewRange, Settings, Table};
use tastebase_generate::{generate_restaurants, generate_reviews, generate_users};
use tastebase_load::{LoadOptions, MemoryStore, PostgresStore, Store, load_all};

fn database_url() -> Option<String> {
    env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .ok()
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 8, 1)
        .and_then(|date| date.and_hms_opt(9, 30, 0))
        .unwrap_or_default()
}

async fn generated() -> Result<Settings> {
    let mut settings = Settings::default();
    settings.data_dir =
        env::temp_dir().join(format!("tastebase_pg_{}", uuid::Uuid::new_v4()));
    settings.user_count = 40;
    settings.num_restaurants = 30;
    settings.vip.size = 5;
    settings.vip.reviews = ReviewRange::new(8, 12);
    settings.loyal.size = 10;
    settings.loyal.reviews = ReviewRange::new(3, 5);
    settings.regular.size = 15;
    settings.regular.reviews = ReviewRange::new(1, 2);
    settings.review_chunk_size = 25;

    generate_users(&settings, now())?;
    generate_restaurants(&settings, now(), None).await?;
    generate_reviews(&settings, now(), None).await?;
    Ok(settings)
}

#[tokio::test]
async fn loads_artifacts_into_postgres_and_matches_memory_stats() -> Result<()> {
    let Some(url) = database_url() else {
        eprintln!("TEST_DATABASE_URL or DATABASE_URL not set; skipping");
        return Ok(());
    };
    let settings = generated().await?;
    let options = LoadOptions {
        data_dir: settings.data_dir.clone(),
        truncate: true,
        rebuild_stats: true,
    };

    let mut postgres = PostgresStore::connect(&url)
        .await
        .context("connecting to Postgres")?;
    postgres.apply_schema().await.context("applying schema")?;

    let first = load_all(&mut postgres, &options).await?;
    let counts = postgres.table_counts().await?;
    assert_eq!(counts[&Table::UserAccount], 40);
    assert_eq!(counts[&Table::Restaurant], 30);
    assert_eq!(counts[&Table::RestaurantReviewStats], 30);
    assert_eq!(first.table(Table::Review).inserted, counts[&Table::Review]);

    let second = load_all(&mut postgres, &options).await?;
    assert_eq!(second.skipped(), 0);
    assert_eq!(postgres.table_counts().await?, counts);

    let mut memory = MemoryStore::new(now());
    load_all(&mut memory, &options).await?;
    let summary = |rows: Vec<RestaurantReviewStats>| -> Vec<(i64, i64, f64)> {
        rows.into_iter()
            .map(|row| (row.restaurant_id, row.review_count, row.avg_rating))
            .collect()
    };
    assert_eq!(
        summary(postgres.review_stats().await?),
        summary(memory.review_stats().await?)
    );

    let max_review: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(review_id), 0) FROM review")
        .fetch_one(postgres.pool())
        .await?;
    let next_review: i64 =
        sqlx::query_scalar("SELECT nextval(pg_get_serial_sequence('review', 'review_id'))")
            .fetch_one(postgres.pool())
            .await?;
    assert!(next_review > max_review);
    Ok(())
}
