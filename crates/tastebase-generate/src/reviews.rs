use std::collections::{BTreeSet, HashMap};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::seq::SliceRandom;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tastebase_core::{
    Cohort, Restaurant, Review, ReviewPhoto, ReviewRange, Settings, UserAccount, files,
    read_json_array,
};
use tracing::{debug, info, warn};

use crate::errors::GenerationError;
use crate::model::GenerationReport;
use crate::output::chunks::{ChunkWriter, WrittenChunk, remove_stale_chunks, write_chunk_at};
use crate::text::templates::fallback_review;
use crate::text::{ReviewSlot, TextService, accept_review};

/// Attempts per wanted date before the adjacency rule is relaxed.
const DATE_ATTEMPTS_PER_VISIT: usize = 200;

/// Users assigned to one cohort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortMembers {
    pub cohort: Cohort,
    pub user_ids: Vec<i64>,
}

/// Generate reviews for the cohort users against `restaurant.json` and
/// `user_account.json`, writing `review_<n>.json` chunks with
/// `review_photo_<n>.json` companions.
pub async fn generate_reviews(
    settings: &Settings,
    now: NaiveDateTime,
    text: Option<&dyn TextService>,
) -> Result<GenerationReport, GenerationError> {
    settings.validate().map_err(GenerationError::from_core)?;

    let restaurants: Vec<Restaurant> =
        read_json_array(&settings.data_dir.join(files::RESTAURANT))
            .map_err(GenerationError::from_core)?;
    let users: Vec<UserAccount> = read_json_array(&settings.data_dir.join(files::USER_ACCOUNT))
        .map_err(GenerationError::from_core)?;

    if restaurants.is_empty() {
        return Err(GenerationError::InvalidInput(format!(
            "{} holds no restaurants",
            files::RESTAURANT
        )));
    }
    if (users.len() as u64) < settings.cohort_total() {
        return Err(GenerationError::InvalidInput(format!(
            "{} holds {} users but the cohorts need {}",
            files::USER_ACCOUNT,
            users.len(),
            settings.cohort_total()
        )));
    }

    let mut report = GenerationReport::new(
        "reviews",
        settings.review_seed,
        text.map(|service| service.name()),
    );
    let mut rng = ChaCha8Rng::seed_from_u64(settings.review_seed);

    let user_ids: Vec<i64> = users.iter().map(|user| user.user_id).collect();
    let cohorts = assign_cohorts(&mut rng, &user_ids, settings);
    for members in &cohorts {
        info!(
            cohort = members.cohort.name(),
            users = members.user_ids.len(),
            range = %settings.cohort(members.cohort).reviews,
            "cohort assigned"
        );
    }

    let slots = plan_slots(&mut rng, &cohorts, &restaurants, settings);
    info!(
        slots = slots.len(),
        restaurants = restaurants.len(),
        users = users.len(),
        "review slots planned"
    );

    std::fs::create_dir_all(&settings.data_dir)?;
    remove_stale_chunks(&settings.data_dir, files::REVIEW_PHOTO_PREFIX)?;
    let mut writer = ChunkWriter::create(
        &settings.data_dir,
        files::REVIEW_PREFIX,
        settings.review_chunk_size,
    )?;

    let photo_range = settings.review_photo_range;
    let mut photos: Vec<ReviewPhoto> = Vec::new();
    let mut next_photo_id = 1_i64;

    for batch in slots.chunks(settings.slots_per_prompt()) {
        let texts = fill_texts(&mut rng, batch, text, &mut report).await;

        for (slot, (review_text, rating)) in batch.iter().zip(texts) {
            let review_id = slot.slot_id as i64;
            let created_at = visit_timestamp(&mut rng, slot.visited_at).min(now);

            for n in 1..=draw(&mut rng, photo_range) {
                photos.push(ReviewPhoto {
                    photo_id: next_photo_id,
                    review_id,
                    image_url: format!("/reviews/{review_id}/{n}"),
                    is_deleted: false,
                    created_at,
                    updated_at: created_at,
                });
                next_photo_id += 1;
            }

            let review = Review {
                review_id,
                user_id: slot.user_id,
                restaurant_id: slot.restaurant_id,
                rating,
                review_text: Some(review_text),
                visited_at: slot.visited_at,
                is_deleted: false,
                created_at,
                updated_at: created_at,
            };
            if let Some(chunk) = writer.push(review)? {
                write_companion(settings, &chunk, &mut photos, &mut report)?;
            }
        }
    }

    let nothing_flushed = writer.next_index() == 1;
    match writer.finish()? {
        Some(chunk) => write_companion(settings, &chunk, &mut photos, &mut report)?,
        // An empty plan still writes chunk 1 and its photo companion.
        None if nothing_flushed => {
            let empty: &[Review] = &[];
            let chunk = write_chunk_at(&settings.data_dir, files::REVIEW_PREFIX, 1, empty)?;
            write_companion(settings, &chunk, &mut photos, &mut report)?;
        }
        None => {}
    }
    report.record_rows(slots.len());

    let report_path = report.finish(&settings.data_dir)?;
    info!(
        reviews = slots.len(),
        photos = next_photo_id - 1,
        fallbacks = report.fallback_count,
        duration_ms = report.duration_ms,
        report = %report_path.display(),
        "reviews generated"
    );
    Ok(report)
}

/// Record a flushed review chunk and write its photo chunk under the same index.
fn write_companion(
    settings: &Settings,
    chunk: &WrittenChunk,
    photos: &mut Vec<ReviewPhoto>,
    report: &mut GenerationReport,
) -> Result<(), GenerationError> {
    report.record_file(&chunk.path, chunk.rows, chunk.bytes);
    let companion = write_chunk_at(
        &settings.data_dir,
        files::REVIEW_PHOTO_PREFIX,
        chunk.index,
        photos.as_slice(),
    )?;
    report.record_file(&companion.path, companion.rows, companion.bytes);
    photos.clear();
    Ok(())
}

/// Shuffle the users and slice VIP, loyal and regular cohorts in that order.
/// Users past the cohort total are left out.
pub fn assign_cohorts<R: Rng + ?Sized>(
    rng: &mut R,
    user_ids: &[i64],
    settings: &Settings,
) -> Vec<CohortMembers> {
    let mut shuffled = user_ids.to_vec();
    shuffled.shuffle(rng);

    let mut offset = 0;
    Cohort::ALL
        .iter()
        .map(|cohort| {
            let size = (settings.cohort(*cohort).size as usize).min(shuffled.len() - offset);
            let members = CohortMembers {
                cohort: *cohort,
                user_ids: shuffled[offset..offset + size].to_vec(),
            };
            offset += size;
            members
        })
        .collect()
}

/// Plan every review slot, interleaved round-robin across cohorts and
/// numbered from 1 in the final order.
fn plan_slots<R: Rng + ?Sized>(
    rng: &mut R,
    cohorts: &[CohortMembers],
    restaurants: &[Restaurant],
    settings: &Settings,
) -> Vec<ReviewSlot> {
    let window_days =
        (settings.visit_date_end - settings.visit_date_start).num_days() as usize + 1;

    let queues: Vec<Vec<ReviewSlot>> = cohorts
        .iter()
        .map(|members| {
            let range = settings.cohort(members.cohort).reviews;
            let mut queue = Vec::new();
            for &user_id in &members.user_ids {
                let wanted = (draw(rng, range) as usize)
                    .min(restaurants.len())
                    .min(window_days);
                let picks = sample(rng, restaurants.len(), wanted);
                let offsets = visit_offsets(rng, wanted, window_days);
                for (index, offset) in picks.into_iter().zip(offsets) {
                    let restaurant = &restaurants[index];
                    queue.push(ReviewSlot {
                        slot_id: 0,
                        user_id,
                        restaurant_id: restaurant.restaurant_id,
                        name: restaurant.name.clone(),
                        description: restaurant.description.clone().unwrap_or_default(),
                        visited_at: settings.visit_date_start + Duration::days(offset as i64),
                    });
                }
            }
            debug!(cohort = members.cohort.name(), slots = queue.len(), "cohort slots planned");
            queue
        })
        .collect();

    let mut slots = interleave(queues);
    for (position, slot) in slots.iter_mut().enumerate() {
        slot.slot_id = position as u64 + 1;
    }
    slots
}

/// Take one item from each queue in turn until all are drained.
fn interleave<T>(queues: Vec<Vec<T>>) -> Vec<T> {
    let total = queues.iter().map(Vec::len).sum();
    let mut iters: Vec<_> = queues.into_iter().map(Vec::into_iter).collect();
    let mut merged = Vec::with_capacity(total);
    while merged.len() < total {
        for iter in iters.iter_mut() {
            merged.extend(iter.next());
        }
    }
    merged
}

/// `count` distinct day offsets in `0..window_days`.
///
/// Offsets are kept at least two days apart while that is possible within
/// `count * DATE_ATTEMPTS_PER_VISIT` random draws; after that only
/// distinctness is required. `count` must not exceed `window_days`.
pub fn visit_offsets<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    window_days: usize,
) -> Vec<usize> {
    let mut chosen: Vec<usize> = Vec::with_capacity(count);
    let mut taken: BTreeSet<usize> = BTreeSet::new();
    if count == 0 || window_days == 0 {
        return chosen;
    }
    let attempts = count * DATE_ATTEMPTS_PER_VISIT;

    for _ in 0..attempts {
        if chosen.len() == count {
            return chosen;
        }
        let day = rng.random_range(0..window_days);
        let adjacent = taken.contains(&(day + 1)) || (day > 0 && taken.contains(&(day - 1)));
        if !adjacent && taken.insert(day) {
            chosen.push(day);
        }
    }

    for _ in 0..attempts {
        if chosen.len() == count {
            return chosen;
        }
        let day = rng.random_range(0..window_days);
        if taken.insert(day) {
            chosen.push(day);
        }
    }

    let mut free: Vec<usize> = (0..window_days).filter(|day| !taken.contains(day)).collect();
    free.shuffle(rng);
    let needed = count.saturating_sub(chosen.len());
    chosen.extend(free.into_iter().take(needed));
    chosen
}

/// Text and rating for each slot of a batch, in slot order.
async fn fill_texts<R: Rng + ?Sized>(
    rng: &mut R,
    batch: &[ReviewSlot],
    text: Option<&dyn TextService>,
    report: &mut GenerationReport,
) -> Vec<(String, f64)> {
    let mut drafts: HashMap<u64, (String, f64)> = HashMap::new();

    if let Some(service) = text {
        report.record_request();
        match service.review_texts(batch).await {
            Ok(returned) => {
                for draft in returned.into_iter().filter_map(accept_review) {
                    drafts.insert(draft.slot_id, (draft.review_text, draft.rating));
                }
            }
            Err(err) => {
                let first = batch.first().map(|slot| slot.slot_id).unwrap_or_default();
                warn!(
                    first_slot = first,
                    slots = batch.len(),
                    error = %err,
                    "review text request failed, using local templates"
                );
                report.record_failure(format!("review batch from slot {first}: {err}"));
            }
        }
    }

    let mut missing = 0;
    let texts = batch
        .iter()
        .map(|slot| match drafts.remove(&slot.slot_id) {
            Some(found) => found,
            None => {
                missing += 1;
                fallback_review(rng, &slot.name, &slot.description)
            }
        })
        .collect();

    if missing > 0 && text.is_some() {
        warn!(slots = batch.len(), missing, "filling review text locally");
    }
    report.record_fallback(missing);
    texts
}

fn draw<R: Rng + ?Sized>(rng: &mut R, range: ReviewRange) -> u32 {
    rng.random_range(range.min..=range.max)
}

/// Posting time on the visit day, between 11:00 and 22:59.
fn visit_timestamp<R: Rng + ?Sized>(rng: &mut R, visited_at: NaiveDate) -> NaiveDateTime {
    let seconds = rng.random_range(11 * 3600..23 * 3600);
    NaiveDateTime::new(visited_at, NaiveTime::MIN) + Duration::seconds(seconds)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn offsets_are_distinct_and_spaced_when_feasible() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            let mut offsets = visit_offsets(&mut rng, 30, 365);
            assert_eq!(offsets.len(), 30);
            offsets.sort_unstable();
            assert!(offsets.windows(2).all(|pair| pair[1] - pair[0] >= 2));
        }
    }

    #[test]
    fn offsets_fill_a_tight_window() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let offsets = visit_offsets(&mut rng, 10, 10);
        let unique: HashSet<_> = offsets.iter().copied().collect();
        assert_eq!(unique.len(), 10);
        assert!(offsets.iter().all(|day| *day < 10));
    }

    #[test]
    fn interleave_alternates_between_queues() {
        let merged = interleave(vec![vec![1, 2, 3], vec![10], vec![20, 21]]);
        assert_eq!(merged, vec![1, 10, 20, 2, 21, 3]);
    }

    #[test]
    fn cohorts_are_disjoint_slices() {
        let mut settings = Settings::default();
        settings.vip.size = 3;
        settings.loyal.size = 4;
        settings.regular.size = 5;
        let user_ids: Vec<i64> = (1..=20).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let cohorts = assign_cohorts(&mut rng, &user_ids, &settings);

        let sizes: Vec<usize> = cohorts.iter().map(|c| c.user_ids.len()).collect();
        assert_eq!(sizes, vec![3, 4, 5]);
        let all: HashSet<i64> = cohorts.iter().flat_map(|c| c.user_ids.clone()).collect();
        assert_eq!(all.len(), 12);
    }

    #[test]
    fn visit_timestamp_falls_on_the_visit_day() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).expect("valid date");
        for _ in 0..100 {
            assert_eq!(visit_timestamp(&mut rng, day).date(), day);
        }
    }
}
