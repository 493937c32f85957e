use chrono::{Duration, NaiveDateTime};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tastebase_core::{
    CATEGORY_NAMES, Restaurant, RestaurantCategory, RestaurantImage, RestaurantLocation, Settings,
    files,
};
use tracing::{info, warn};

use crate::errors::GenerationError;
use crate::model::GenerationReport;
use crate::output::write_table;
use crate::text::templates::{fallback_meta, pick};
use crate::text::vocab::{
    CATEGORY_COUNTS, DISTRICTS, District, IMAGE_COUNTS, OPENING_HOURS, REGION_SI_DO,
};
use crate::text::{MetaDraft, MetaRequest, TextService, accept_meta};

const CREATED_WINDOW_DAYS: i64 = 365 * 2;
const JITTER_MIN_METERS: f64 = 150.0;
const JITTER_MAX_METERS: f64 = 650.0;
const METERS_PER_DEGREE_LAT: f64 = 111_000.0;
const METERS_PER_DEGREE_LON: f64 = 88_800.0;

/// Every table the restaurant generator produces.
#[derive(Debug, Clone, Default)]
pub struct RestaurantSet {
    pub restaurants: Vec<Restaurant>,
    pub locations: Vec<RestaurantLocation>,
    pub images: Vec<RestaurantImage>,
    pub categories: Vec<RestaurantCategory>,
}

/// Generate `NUM_RESTAURANTS` restaurants with locations, images and
/// category links.
///
/// Names, descriptions and categories come from `text` in batches of
/// `RESTAURANT_BATCH_SIZE`; anything the service does not deliver is filled
/// from local templates, so the run never fails on the text service.
pub async fn generate_restaurants(
    settings: &Settings,
    now: NaiveDateTime,
    text: Option<&dyn TextService>,
) -> Result<GenerationReport, GenerationError> {
    settings.validate().map_err(GenerationError::from_core)?;

    let mut report = GenerationReport::new(
        "restaurants",
        settings.restaurant_seed,
        text.map(|service| service.name()),
    );
    info!(
        restaurants = settings.num_restaurants,
        batch_size = settings.restaurant_batch_size,
        text_service = text.map(|service| service.name()).unwrap_or("local"),
        "generating restaurants"
    );

    let set = build_restaurants(settings, now, text, &mut report).await;

    write_table(&settings.data_dir, files::RESTAURANT, &set.restaurants, &mut report)?;
    write_table(
        &settings.data_dir,
        files::RESTAURANT_LOCATION,
        &set.locations,
        &mut report,
    )?;
    write_table(&settings.data_dir, files::RESTAURANT_IMAGE, &set.images, &mut report)?;
    write_table(
        &settings.data_dir,
        files::RESTAURANT_CATEGORY,
        &set.categories,
        &mut report,
    )?;
    report.record_rows(set.restaurants.len());

    let report_path = report.finish(&settings.data_dir)?;
    info!(
        restaurants = set.restaurants.len(),
        images = set.images.len(),
        fallbacks = report.fallback_count,
        duration_ms = report.duration_ms,
        report = %report_path.display(),
        "restaurants generated"
    );
    Ok(report)
}

/// Build the restaurant tables in memory.
pub async fn build_restaurants(
    settings: &Settings,
    now: NaiveDateTime,
    text: Option<&dyn TextService>,
    report: &mut GenerationReport,
) -> RestaurantSet {
    let mut rng = ChaCha8Rng::seed_from_u64(settings.restaurant_seed);
    let count = settings.num_restaurants as usize;
    let districts = spread_districts(&mut rng, count);
    let allowed: Vec<String> = CATEGORY_NAMES.iter().map(|name| name.to_string()).collect();

    let mut set = RestaurantSet::default();
    let mut next_image_id = 1_i64;
    let mut next_rc_id = 1_i64;
    let batch_size = settings.restaurant_batch_size.max(1);

    for (batch_no, batch) in districts.chunks(batch_size).enumerate() {
        let hints: Vec<&'static str> = batch
            .iter()
            .map(|_| pick(&mut rng, &CATEGORY_NAMES))
            .collect();
        let metas = batch_meta(&mut rng, batch, &hints, &allowed, text, batch_no, report).await;

        for (district, meta) in batch.iter().zip(metas) {
            let restaurant_id = set.restaurants.len() as i64 + 1;
            let created_at =
                now - Duration::seconds(rng.random_range(0..=CREATED_WINDOW_DAYS * 86_400));

            for category_id in category_ids(&meta) {
                set.categories.push(RestaurantCategory {
                    rc_id: next_rc_id,
                    restaurant_id,
                    category_id,
                    created_at,
                });
                next_rc_id += 1;
            }

            let image_count = IMAGE_COUNTS.choose(&mut rng).copied().unwrap_or(1);
            for index in 0..image_count {
                set.images.push(RestaurantImage {
                    image_id: next_image_id,
                    restaurant_id,
                    image_path: format!("/{restaurant_id}/{}", index + 1),
                    is_deleted: false,
                    index: index as i32,
                    created_at,
                    updated_at: created_at,
                });
                next_image_id += 1;
            }

            set.locations.push(location(&mut rng, restaurant_id, district, created_at));
            set.restaurants.push(Restaurant {
                restaurant_id,
                name: meta.name,
                description: Some(meta.description),
                phone_number: Some(format!(
                    "02-{}-{}",
                    rng.random_range(1000..=9999),
                    rng.random_range(1000..=9999)
                )),
                opening_hours: Some(pick(&mut rng, &OPENING_HOURS).to_string()),
                is_deleted: false,
                created_at,
                updated_at: created_at,
            });
        }
    }

    set
}

/// Metadata for one batch, one entry per restaurant in the batch.
async fn batch_meta<R: Rng + ?Sized>(
    rng: &mut R,
    batch: &[&'static District],
    hints: &[&'static str],
    allowed: &[String],
    text: Option<&dyn TextService>,
    batch_no: usize,
    report: &mut GenerationReport,
) -> Vec<MetaDraft> {
    let mut accepted: Vec<MetaDraft> = Vec::with_capacity(batch.len());

    if let Some(service) = text {
        let request = MetaRequest {
            count: batch.len(),
            category_hints: hints.iter().map(|hint| hint.to_string()).collect(),
            district_hints: batch.iter().map(|district| district.name.to_string()).collect(),
            allowed_categories: allowed.to_vec(),
        };
        report.record_request();
        match service.restaurant_meta(&request).await {
            Ok(drafts) => {
                accepted.extend(
                    drafts
                        .into_iter()
                        .zip(hints)
                        .filter_map(|(draft, hint)| accept_meta(draft, allowed, hint))
                        .take(batch.len()),
                );
            }
            Err(err) => {
                warn!(
                    batch = batch_no,
                    error = %err,
                    "restaurant text request failed, using local templates"
                );
                report.record_failure(format!("restaurant batch {batch_no}: {err}"));
            }
        }
    }

    let missing = batch.len() - accepted.len();
    if missing > 0 && text.is_some() {
        warn!(batch = batch_no, missing, "filling restaurant metadata locally");
    }
    report.record_fallback(missing);
    for (district, hint) in batch.iter().zip(hints).skip(accepted.len()) {
        let mut draft = fallback_meta(rng, hint, district.name);
        widen_categories(rng, &mut draft, hint);
        accepted.push(draft);
    }
    accepted
}

/// Even district coverage: round-robin assignment, then shuffled.
fn spread_districts<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<&'static District> {
    let mut assigned: Vec<&'static District> =
        (0..count).map(|i| &DISTRICTS[i % DISTRICTS.len()]).collect();
    assigned.shuffle(rng);
    assigned
}

/// Add random distinct categories to a template draft so it links 1..=3.
fn widen_categories<R: Rng + ?Sized>(rng: &mut R, draft: &mut MetaDraft, hint: &str) {
    let target = CATEGORY_COUNTS.choose(rng).copied().unwrap_or(1);
    let mut pool: Vec<&str> = CATEGORY_NAMES
        .iter()
        .copied()
        .filter(|name| *name != hint)
        .collect();
    pool.shuffle(rng);
    draft.categories.extend(
        pool.into_iter()
            .take(target.saturating_sub(1))
            .map(str::to_string),
    );
}

/// Resolve category names to seeded ids, keeping at most three.
fn category_ids(meta: &MetaDraft) -> Vec<i64> {
    let mut ids: Vec<i64> = Vec::new();
    for name in &meta.categories {
        if let Some(position) = CATEGORY_NAMES.iter().position(|known| *known == name.as_str()) {
            let id = position as i64 + 1;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids.truncate(3);
    ids
}

fn location<R: Rng + ?Sized>(
    rng: &mut R,
    restaurant_id: i64,
    district: &District,
    created_at: NaiveDateTime,
) -> RestaurantLocation {
    let distance = rng.random_range(JITTER_MIN_METERS..=JITTER_MAX_METERS);
    let angle = rng.random_range(0.0..std::f64::consts::TAU);
    let latitude = round6(district.latitude + distance * angle.cos() / METERS_PER_DEGREE_LAT);
    let longitude = round6(district.longitude + distance * angle.sin() / METERS_PER_DEGREE_LON);

    let street = pick(rng, district.streets);
    let main_no = rng.random_range(1..=200);
    let address_line = if rng.random_bool(0.5) {
        let sub_no = rng.random_range(1..=50);
        format!("{REGION_SI_DO} {} {street} {main_no}-{sub_no}", district.name)
    } else {
        format!("{REGION_SI_DO} {} {street} {main_no}", district.name)
    };

    RestaurantLocation {
        restaurant_id,
        latitude,
        longitude,
        address_line,
        region_si_do: REGION_SI_DO.to_string(),
        region_si_gun_gu: district.name.to_string(),
        created_at,
        updated_at: created_at,
    }
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn districts_are_evenly_spread() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let assigned = spread_districts(&mut rng, 60);
        let mut per_district: HashMap<&str, usize> = HashMap::new();
        for district in assigned {
            *per_district.entry(district.name).or_default() += 1;
        }
        assert_eq!(per_district.len(), DISTRICTS.len());
        assert!(per_district.values().all(|count| (2..=3).contains(count)));
    }

    #[test]
    fn location_stays_near_district_centre() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let district = &DISTRICTS[0];
        let created = chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid timestamp");
        for id in 1..100 {
            let loc = location(&mut rng, id, district, created);
            let dy = (loc.latitude - district.latitude) * METERS_PER_DEGREE_LAT;
            let dx = (loc.longitude - district.longitude) * METERS_PER_DEGREE_LON;
            let distance = (dx * dx + dy * dy).sqrt();
            assert!(distance > JITTER_MIN_METERS - 1.0 && distance < JITTER_MAX_METERS + 1.0);
            assert!(loc.address_line.starts_with("Seoul Jongno-gu "));
        }
    }

    #[test]
    fn template_categories_are_distinct_and_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..200 {
            let mut meta = fallback_meta(&mut rng, "Pizza", "Mapo-gu");
            widen_categories(&mut rng, &mut meta, "Pizza");
            let ids = category_ids(&meta);
            assert!((1..=3).contains(&ids.len()));
            assert_eq!(ids[0], 9);
            let mut unique = ids.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), ids.len());
        }
    }
}
