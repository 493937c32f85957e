use chrono::NaiveDateTime;
use sqlx::query_builder::Separated;
use sqlx::{PgConnection, Postgres, QueryBuilder};

use tastebase_core::{
    Restaurant, RestaurantCategory, RestaurantImage, RestaurantLocation, RestaurantReviewStats,
    Review, ReviewPhoto, Table, UserAccount, UserProfile,
};

/// Postgres caps a statement at 65535 bind parameters.
const BIND_LIMIT: usize = 65_535;

pub const REBUILD_STATS: &str = r#"
INSERT INTO restaurant_review_stats (restaurant_id, review_count, avg_rating, updated_at)
SELECT r.restaurant_id,
       COUNT(v.review_id)::INTEGER,
       COALESCE(ROUND(AVG(v.rating), 1), 0.0),
       NOW()
FROM restaurant r
LEFT JOIN review v
       ON v.restaurant_id = r.restaurant_id
      AND v.is_deleted = FALSE
GROUP BY r.restaurant_id
ON CONFLICT (restaurant_id) DO UPDATE
SET review_count = EXCLUDED.review_count,
    avg_rating   = EXCLUDED.avg_rating,
    updated_at   = EXCLUDED.updated_at
"#;

pub const SELECT_STATS: &str = r#"
SELECT restaurant_id, review_count::BIGINT, avg_rating::FLOAT8, updated_at
FROM restaurant_review_stats
ORDER BY restaurant_id
"#;

pub fn truncate_sql(tables: &[Table]) -> String {
    let names: Vec<&str> = tables.iter().map(|table| table.name()).collect();
    format!("TRUNCATE TABLE {} RESTART IDENTITY CASCADE", names.join(", "))
}

pub fn setval_sql(table: Table, column: &str) -> String {
    format!(
        "SELECT setval(pg_get_serial_sequence('{table}', '{column}'), \
         COALESCE((SELECT MAX({column}) FROM {table}), 0) + 1, false)"
    )
}

pub fn count_sql(table: Table) -> String {
    format!("SELECT COUNT(*) FROM {table}")
}

/// Multi-row insert paged under the bind limit; conflicting keys are skipped.
/// Returns the number of rows actually inserted.
async fn insert_rows<'a, T, F>(
    conn: &mut PgConnection,
    table: Table,
    columns: &[&str],
    rows: &'a [T],
    mut bind: F,
) -> Result<u64, sqlx::Error>
where
    T: Sync,
    F: FnMut(Separated<'_, 'a, Postgres, &'static str>, &'a T) + Send,
{
    let page_size = BIND_LIMIT / columns.len();
    let mut inserted = 0;
    for page in rows.chunks(page_size) {
        let mut builder: QueryBuilder<'a, Postgres> =
            QueryBuilder::new(format!("INSERT INTO {table} ({}) ", columns.join(", ")));
        builder.push_values(page, &mut bind);
        builder.push(format_args!(
            " ON CONFLICT ({}) DO NOTHING",
            table.key_column()
        ));
        inserted += builder.build().execute(&mut *conn).await?.rows_affected();
    }
    Ok(inserted)
}

pub async fn insert_user_accounts(
    conn: &mut PgConnection,
    rows: &[UserAccount],
) -> Result<u64, sqlx::Error> {
    insert_rows(
        conn,
        Table::UserAccount,
        &[
            "user_id",
            "username",
            "password_hash",
            "email",
            "phone_number",
            "joined_at",
            "is_deleted",
            "created_at",
            "updated_at",
        ],
        rows,
        |mut row, user| {
            row.push_bind(user.user_id)
                .push_bind(user.username.as_str())
                .push_bind(user.password_hash.as_str())
                .push_bind(user.email.as_deref())
                .push_bind(user.phone_number.as_deref())
                .push_bind(user.joined_at)
                .push_bind(user.is_deleted)
                .push_bind(user.created_at)
                .push_bind(user.updated_at);
        },
    )
    .await
}

pub async fn insert_user_profiles(
    conn: &mut PgConnection,
    rows: &[UserProfile],
) -> Result<u64, sqlx::Error> {
    insert_rows(
        conn,
        Table::UserProfile,
        &[
            "user_id",
            "nickname",
            "image_path",
            "bio",
            "is_deleted",
            "created_at",
            "updated_at",
        ],
        rows,
        |mut row, profile| {
            row.push_bind(profile.user_id)
                .push_bind(profile.nickname.as_str())
                .push_bind(profile.image_path.as_deref())
                .push_bind(profile.bio.as_deref())
                .push_bind(profile.is_deleted)
                .push_bind(profile.created_at)
                .push_bind(profile.updated_at);
        },
    )
    .await
}

pub async fn insert_restaurants(
    conn: &mut PgConnection,
    rows: &[Restaurant],
) -> Result<u64, sqlx::Error> {
    insert_rows(
        conn,
        Table::Restaurant,
        &[
            "restaurant_id",
            "name",
            "description",
            "phone_number",
            "opening_hours",
            "is_deleted",
            "created_at",
            "updated_at",
        ],
        rows,
        |mut row, restaurant| {
            row.push_bind(restaurant.restaurant_id)
                .push_bind(restaurant.name.as_str())
                .push_bind(restaurant.description.as_deref())
                .push_bind(restaurant.phone_number.as_deref())
                .push_bind(restaurant.opening_hours.as_deref())
                .push_bind(restaurant.is_deleted)
                .push_bind(restaurant.created_at)
                .push_bind(restaurant.updated_at);
        },
    )
    .await
}

pub async fn insert_locations(
    conn: &mut PgConnection,
    rows: &[RestaurantLocation],
) -> Result<u64, sqlx::Error> {
    insert_rows(
        conn,
        Table::RestaurantLocation,
        &[
            "restaurant_id",
            "latitude",
            "longitude",
            "address_line",
            "region_si_do",
            "region_si_gun_gu",
            "created_at",
            "updated_at",
        ],
        rows,
        |mut row, location| {
            row.push_bind(location.restaurant_id)
                .push_bind(location.latitude)
                .push_bind(location.longitude)
                .push_bind(location.address_line.as_str())
                .push_bind(location.region_si_do.as_str())
                .push_bind(location.region_si_gun_gu.as_str())
                .push_bind(location.created_at)
                .push_bind(location.updated_at);
        },
    )
    .await
}

pub async fn insert_images(
    conn: &mut PgConnection,
    rows: &[RestaurantImage],
) -> Result<u64, sqlx::Error> {
    insert_rows(
        conn,
        Table::RestaurantImage,
        &[
            "image_id",
            "restaurant_id",
            "image_path",
            "is_deleted",
            "\"index\"",
            "created_at",
            "updated_at",
        ],
        rows,
        |mut row, image| {
            row.push_bind(image.image_id)
                .push_bind(image.restaurant_id)
                .push_bind(image.image_path.as_str())
                .push_bind(image.is_deleted)
                .push_bind(image.index)
                .push_bind(image.created_at)
                .push_bind(image.updated_at);
        },
    )
    .await
}

pub async fn insert_restaurant_categories(
    conn: &mut PgConnection,
    rows: &[RestaurantCategory],
) -> Result<u64, sqlx::Error> {
    insert_rows(
        conn,
        Table::RestaurantCategory,
        &["rc_id", "restaurant_id", "category_id", "created_at"],
        rows,
        |mut row, link| {
            row.push_bind(link.rc_id)
                .push_bind(link.restaurant_id)
                .push_bind(link.category_id)
                .push_bind(link.created_at);
        },
    )
    .await
}

pub async fn insert_reviews(conn: &mut PgConnection, rows: &[Review]) -> Result<u64, sqlx::Error> {
    insert_rows(
        conn,
        Table::Review,
        &[
            "review_id",
            "user_id",
            "restaurant_id",
            "rating",
            "review_text",
            "visited_at",
            "is_deleted",
            "created_at",
            "updated_at",
        ],
        rows,
        |mut row, review| {
            row.push_bind(review.review_id)
                .push_bind(review.user_id)
                .push_bind(review.restaurant_id)
                .push_bind(review.rating)
                .push_unseparated("::NUMERIC")
                .push_bind(review.review_text.as_deref())
                .push_bind(review.visited_at)
                .push_bind(review.is_deleted)
                .push_bind(review.created_at)
                .push_bind(review.updated_at);
        },
    )
    .await
}

pub async fn insert_review_photos(
    conn: &mut PgConnection,
    rows: &[ReviewPhoto],
) -> Result<u64, sqlx::Error> {
    insert_rows(
        conn,
        Table::ReviewPhoto,
        &[
            "photo_id",
            "review_id",
            "image_url",
            "is_deleted",
            "created_at",
            "updated_at",
        ],
        rows,
        |mut row, photo| {
            row.push_bind(photo.photo_id)
                .push_bind(photo.review_id)
                .push_bind(photo.image_url.as_str())
                .push_bind(photo.is_deleted)
                .push_bind(photo.created_at)
                .push_bind(photo.updated_at);
        },
    )
    .await
}

pub async fn fetch_stats(
    conn: &mut PgConnection,
) -> Result<Vec<RestaurantReviewStats>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, i64, f64, NaiveDateTime)>(SELECT_STATS)
        .fetch_all(conn)
        .await?;
    Ok(rows
        .into_iter()
        .map(
            |(restaurant_id, review_count, avg_rating, updated_at)| RestaurantReviewStats {
                restaurant_id,
                review_count,
                avg_rating,
                updated_at,
            },
        )
        .collect())
}
