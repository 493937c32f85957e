use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use tastebase_core::{
    Restaurant, RestaurantCategory, RestaurantImage, Review, ReviewPhoto, ReviewRange, Settings,
    UserAccount, UserProfile, files, list_chunk_files, read_json_array,
};
use tastebase_generate::text::{
    MetaDraft, MetaRequest, ReviewDraft, ReviewSlot, TextError, TextService,
};
use tastebase_generate::{GenerationError, generate_restaurants, generate_reviews, generate_users};

fn temp_data_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tastebase_{name}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 8, 1)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .unwrap_or_default()
}

fn small_settings(name: &str) -> Settings {
    let mut settings = Settings::default();
    settings.data_dir = temp_data_dir(name);
    settings.user_count = 40;
    settings.num_restaurants = 30;
    settings.vip.size = 5;
    settings.vip.reviews = ReviewRange::new(8, 12);
    settings.loyal.size = 10;
    settings.loyal.reviews = ReviewRange::new(3, 5);
    settings.regular.size = 15;
    settings.regular.reviews = ReviewRange::new(1, 2);
    settings.review_chunk_size = 17;
    settings.restaurant_batch_size = 8;
    settings
}

async fn generate_all(settings: &Settings, text: Option<&dyn TextService>) {
    generate_users(settings, now()).expect("generate users");
    generate_restaurants(settings, now(), text)
        .await
        .expect("generate restaurants");
    generate_reviews(settings, now(), text)
        .await
        .expect("generate reviews");
}

fn read_chunks<T: serde::de::DeserializeOwned>(settings: &Settings, prefix: &str) -> Vec<T> {
    list_chunk_files(&settings.data_dir, prefix)
        .expect("list chunks")
        .iter()
        .flat_map(|chunk| read_json_array::<T>(&chunk.path).expect("read chunk"))
        .collect()
}

#[test]
fn users_have_unique_usernames_and_profiles() {
    let settings = small_settings("users");
    let report = generate_users(&settings, now()).expect("generate users");
    assert_eq!(report.rows_total, 40);

    let accounts: Vec<UserAccount> =
        read_json_array(&settings.data_dir.join(files::USER_ACCOUNT)).expect("read accounts");
    let profiles: Vec<UserProfile> =
        read_json_array(&settings.data_dir.join(files::USER_PROFILE)).expect("read profiles");

    assert_eq!(accounts.len(), 40);
    assert_eq!(profiles.len(), 40);
    let usernames: HashSet<_> = accounts.iter().map(|user| user.username.as_str()).collect();
    assert_eq!(usernames.len(), 40);
    let ids: Vec<i64> = accounts.iter().map(|user| user.user_id).collect();
    assert_eq!(ids, (1..=40).collect::<Vec<_>>());
    assert!(profiles.iter().all(|profile| profile.image_path.as_deref()
        == Some(format!("/u/{}", profile.user_id).as_str())));

    let report_path = settings.data_dir.join("reports").join("users.report.json");
    assert!(report_path.exists());
}

#[tokio::test]
async fn restaurants_without_text_service_are_complete() {
    let settings = small_settings("restaurants");
    let report = generate_restaurants(&settings, now(), None)
        .await
        .expect("generate restaurants");
    assert_eq!(report.rows_total, 30);
    assert_eq!(report.text_requests, 0);

    let restaurants: Vec<Restaurant> =
        read_json_array(&settings.data_dir.join(files::RESTAURANT)).expect("read restaurants");
    assert_eq!(restaurants.len(), 30);
    for restaurant in &restaurants {
        assert!(!restaurant.name.trim().is_empty());
        assert!(
            restaurant
                .description
                .as_deref()
                .is_some_and(|text| !text.trim().is_empty())
        );
    }

    let categories: Vec<RestaurantCategory> =
        read_json_array(&settings.data_dir.join(files::RESTAURANT_CATEGORY))
            .expect("read categories");
    for restaurant in &restaurants {
        let linked = categories
            .iter()
            .filter(|link| link.restaurant_id == restaurant.restaurant_id)
            .count();
        assert!((1..=3).contains(&linked));
    }
    assert!(categories.iter().all(|link| (1..=11).contains(&link.category_id)));

    let images: Vec<RestaurantImage> =
        read_json_array(&settings.data_dir.join(files::RESTAURANT_IMAGE)).expect("read images");
    let image_ids: HashSet<i64> = images.iter().map(|image| image.image_id).collect();
    assert_eq!(image_ids.len(), images.len());
}

#[tokio::test]
async fn reviews_reference_generated_rows() {
    let settings = small_settings("reviews");
    generate_all(&settings, None).await;

    let users: Vec<UserAccount> =
        read_json_array(&settings.data_dir.join(files::USER_ACCOUNT)).expect("read users");
    let restaurants: Vec<Restaurant> =
        read_json_array(&settings.data_dir.join(files::RESTAURANT)).expect("read restaurants");
    let reviews: Vec<Review> = read_chunks(&settings, files::REVIEW_PREFIX);
    let photos: Vec<ReviewPhoto> = read_chunks(&settings, files::REVIEW_PHOTO_PREFIX);

    let user_ids: HashSet<i64> = users.iter().map(|user| user.user_id).collect();
    let restaurant_ids: HashSet<i64> = restaurants.iter().map(|r| r.restaurant_id).collect();
    let review_ids: HashSet<i64> = reviews.iter().map(|review| review.review_id).collect();

    assert!(!reviews.is_empty());
    assert_eq!(review_ids.len(), reviews.len());
    for review in &reviews {
        assert!(user_ids.contains(&review.user_id));
        assert!(restaurant_ids.contains(&review.restaurant_id));
        assert!((0.0..=5.0).contains(&review.rating));
        assert!(review.visited_at >= settings.visit_date_start);
        assert!(review.visited_at <= settings.visit_date_end);
    }
    for photo in &photos {
        assert!(review_ids.contains(&photo.review_id));
        assert!(photo.image_url.starts_with(&format!("/reviews/{}/", photo.review_id)));
    }

    let pairs: HashSet<(i64, i64)> = reviews
        .iter()
        .map(|review| (review.user_id, review.restaurant_id))
        .collect();
    assert_eq!(pairs.len(), reviews.len(), "a user reviewed a restaurant twice");

    let reviewers: HashSet<i64> = reviews.iter().map(|review| review.user_id).collect();
    assert!(reviewers.len() <= 30);
}

#[tokio::test]
async fn review_chunks_follow_the_chunk_size_and_have_companions() {
    let settings = small_settings("chunks");
    generate_all(&settings, None).await;

    let review_chunks = list_chunk_files(&settings.data_dir, files::REVIEW_PREFIX).expect("list");
    let photo_chunks =
        list_chunk_files(&settings.data_dir, files::REVIEW_PHOTO_PREFIX).expect("list");

    let review_indexes: Vec<u64> = review_chunks.iter().map(|chunk| chunk.index).collect();
    let photo_indexes: Vec<u64> = photo_chunks.iter().map(|chunk| chunk.index).collect();
    assert_eq!(review_indexes, photo_indexes);
    assert_eq!(review_indexes, (1..=review_chunks.len() as u64).collect::<Vec<_>>());

    let sizes: Vec<usize> = review_chunks
        .iter()
        .map(|chunk| read_json_array::<Review>(&chunk.path).expect("read").len())
        .collect();
    let total: usize = sizes.iter().sum();
    assert_eq!(sizes, tastebase_generate::plan_chunk_sizes(total, 17));

    for (review_chunk, photo_chunk) in review_chunks.iter().zip(&photo_chunks) {
        let ids: HashSet<i64> = read_json_array::<Review>(&review_chunk.path)
            .expect("read reviews")
            .iter()
            .map(|review| review.review_id)
            .collect();
        let photos: Vec<ReviewPhoto> = read_json_array(&photo_chunk.path).expect("read photos");
        assert!(photos.iter().all(|photo| ids.contains(&photo.review_id)));
    }
}

#[tokio::test]
async fn vip_cohort_writes_reviews_within_range() {
    let mut settings = small_settings("vip");
    settings.user_count = 10;
    settings.num_restaurants = 20;
    settings.vip.size = 10;
    settings.vip.reviews = ReviewRange::new(5, 8);
    settings.loyal.size = 0;
    settings.regular.size = 0;
    generate_all(&settings, None).await;

    let reviews: Vec<Review> = read_chunks(&settings, files::REVIEW_PREFIX);
    assert!((50..=80).contains(&reviews.len()), "got {}", reviews.len());
    let reviewers: HashSet<i64> = reviews.iter().map(|review| review.user_id).collect();
    assert_eq!(reviewers.len(), 10);
}

#[tokio::test]
async fn same_seed_produces_same_artifacts() {
    let settings_a = small_settings("determinism_a");
    let settings_b = small_settings("determinism_b");
    generate_all(&settings_a, None).await;
    generate_all(&settings_b, None).await;

    for file in [files::USER_ACCOUNT, files::RESTAURANT, files::RESTAURANT_LOCATION] {
        let a = fs::read_to_string(settings_a.data_dir.join(file)).expect("read a");
        let b = fs::read_to_string(settings_b.data_dir.join(file)).expect("read b");
        assert_eq!(a, b, "{file} should be deterministic");
    }
    let reviews_a: Vec<Review> = read_chunks(&settings_a, files::REVIEW_PREFIX);
    let reviews_b: Vec<Review> = read_chunks(&settings_b, files::REVIEW_PREFIX);
    assert_eq!(reviews_a, reviews_b);
}

#[tokio::test]
async fn rerun_replaces_stale_chunks() {
    let mut settings = small_settings("rerun");
    settings.review_chunk_size = 5;
    generate_all(&settings, None).await;
    let before = list_chunk_files(&settings.data_dir, files::REVIEW_PREFIX).expect("list");

    settings.review_chunk_size = 1000;
    generate_reviews(&settings, now(), None)
        .await
        .expect("regenerate reviews");
    let after = list_chunk_files(&settings.data_dir, files::REVIEW_PREFIX).expect("list");
    let photos = list_chunk_files(&settings.data_dir, files::REVIEW_PHOTO_PREFIX).expect("list");

    assert!(before.len() > 1);
    assert_eq!(after.len(), 1);
    assert_eq!(photos.len(), 1);
}

#[tokio::test]
async fn empty_review_plan_still_writes_first_chunk() {
    let mut settings = small_settings("zero_reviews");
    generate_all(&settings, None).await;
    for cohort in [&mut settings.vip, &mut settings.loyal, &mut settings.regular] {
        cohort.reviews = ReviewRange::new(0, 0);
    }

    let report = generate_reviews(&settings, now(), None)
        .await
        .expect("generate empty reviews");
    assert_eq!(report.rows_total, 0);

    let reviews = list_chunk_files(&settings.data_dir, files::REVIEW_PREFIX).expect("list");
    let photos = list_chunk_files(&settings.data_dir, files::REVIEW_PHOTO_PREFIX).expect("list");
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].index, 1);
    assert_eq!(photos.len(), 1);
    assert!(read_json_array::<Review>(&reviews[0].path).expect("read").is_empty());
    assert!(read_json_array::<ReviewPhoto>(&photos[0].path).expect("read").is_empty());
}

#[tokio::test]
async fn reviews_require_restaurant_file() {
    let settings = small_settings("missing");
    generate_users(&settings, now()).expect("generate users");

    let result = generate_reviews(&settings, now(), None).await;
    assert!(matches!(result, Err(GenerationError::MissingInput(_))));
}

#[tokio::test]
async fn reviews_reject_user_file_smaller_than_cohorts() {
    let mut settings = small_settings("short_users");
    settings.user_count = 10;
    settings.vip.size = 2;
    settings.loyal.size = 3;
    settings.regular.size = 5;
    generate_users(&settings, now()).expect("generate users");
    generate_restaurants(&settings, now(), None)
        .await
        .expect("generate restaurants");

    settings.user_count = 40;
    settings.regular.size = 20;
    let result = generate_reviews(&settings, now(), None).await;
    assert!(matches!(result, Err(GenerationError::InvalidInput(_))));
}

#[tokio::test]
async fn invalid_settings_fail_before_writing() {
    let mut settings = small_settings("invalid");
    settings.vip.reviews = ReviewRange::new(9, 3);

    let result = generate_restaurants(&settings, now(), None).await;
    assert!(matches!(result, Err(GenerationError::InvalidConfig(_))));
    assert!(!settings.data_dir.join(files::RESTAURANT).exists());
}

/// Returns unusable output for every request.
struct JunkText;

#[async_trait]
impl TextService for JunkText {
    fn name(&self) -> &'static str {
        "junk"
    }

    async fn restaurant_meta(&self, request: &MetaRequest) -> Result<Vec<MetaDraft>, TextError> {
        Ok((0..request.count)
            .map(|_| MetaDraft {
                name: String::new(),
                description: "no name".to_string(),
                categories: vec!["Korean".to_string()],
            })
            .collect())
    }

    async fn review_texts(&self, _slots: &[ReviewSlot]) -> Result<Vec<ReviewDraft>, TextError> {
        Err(TextError::Decode("not json".to_string()))
    }
}

/// Answers the first item of every batch and leaves the rest blank.
struct PartialText;

#[async_trait]
impl TextService for PartialText {
    fn name(&self) -> &'static str {
        "partial"
    }

    async fn restaurant_meta(&self, request: &MetaRequest) -> Result<Vec<MetaDraft>, TextError> {
        Ok(vec![MetaDraft {
            name: "Sodam Table".to_string(),
            description: "Seasonal plates".to_string(),
            categories: vec!["Sushi".to_string(), request.allowed_categories[0].clone()],
        }])
    }

    async fn review_texts(&self, slots: &[ReviewSlot]) -> Result<Vec<ReviewDraft>, TextError> {
        Ok(slots
            .iter()
            .take(1)
            .map(|slot| ReviewDraft {
                slot_id: slot.slot_id,
                review_text: "Great broth".to_string(),
                rating: 9.0,
            })
            .collect())
    }
}

#[tokio::test]
async fn junk_text_service_falls_back_locally() {
    let settings = small_settings("junk");
    let service = JunkText;
    generate_users(&settings, now()).expect("generate users");
    let restaurant_report = generate_restaurants(&settings, now(), Some(&service))
        .await
        .expect("generate restaurants");
    let review_report = generate_reviews(&settings, now(), Some(&service))
        .await
        .expect("generate reviews");

    assert_eq!(restaurant_report.text_service.as_deref(), Some("junk"));
    assert_eq!(restaurant_report.fallback_count, 30);
    assert_eq!(restaurant_report.text_requests, 4);
    assert_eq!(review_report.fallback_count, review_report.rows_total);
    assert_eq!(review_report.text_failures, review_report.text_requests);

    let restaurants: Vec<Restaurant> =
        read_json_array(&settings.data_dir.join(files::RESTAURANT)).expect("read restaurants");
    assert!(restaurants.iter().all(|r| !r.name.is_empty()));
}

#[tokio::test]
async fn partial_text_service_output_is_validated() {
    let settings = small_settings("partial");
    let service = PartialText;
    generate_users(&settings, now()).expect("generate users");
    generate_restaurants(&settings, now(), Some(&service))
        .await
        .expect("generate restaurants");
    let report = generate_reviews(&settings, now(), Some(&service))
        .await
        .expect("generate reviews");

    let restaurants: Vec<Restaurant> =
        read_json_array(&settings.data_dir.join(files::RESTAURANT)).expect("read restaurants");
    let categories: Vec<RestaurantCategory> =
        read_json_array(&settings.data_dir.join(files::RESTAURANT_CATEGORY))
            .expect("read categories");
    assert_eq!(restaurants[0].name, "Sodam Table");
    let first: Vec<i64> = categories
        .iter()
        .filter(|link| link.restaurant_id == 1)
        .map(|link| link.category_id)
        .collect();
    assert_eq!(first, vec![1]);

    let reviews: Vec<Review> = read_chunks(&settings, files::REVIEW_PREFIX);
    let served: Vec<&Review> = reviews
        .iter()
        .filter(|review| review.review_text.as_deref() == Some("Great broth"))
        .collect();
    assert_eq!(served.len() as u64, report.text_requests);
    assert!(served.iter().all(|review| review.rating == 5.0));
    assert_eq!(report.fallback_count, report.rows_total - report.text_requests);
}
