use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tastebase_core::{
    ChunkFile, Review, ReviewPhoto, Settings, Table, UserAccount, UserProfile, chunk_file_name,
    files, list_chunk_files, read_json_array,
};
use tracing::{info, warn};

use crate::errors::{LoadError, LoadResult};
use crate::store::{InsertOutcome, RestaurantRows, Store};

/// What a loader run should do besides inserting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub data_dir: PathBuf,
    pub truncate: bool,
    pub rebuild_stats: bool,
}

impl LoadOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            data_dir: settings.data_dir.clone(),
            truncate: settings.load_truncate,
            rebuild_stats: settings.rebuild_stats,
        }
    }
}

/// Rows read from artifacts and what the store did with them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableLoad {
    pub read: u64,
    pub inserted: u64,
    pub skipped: u64,
}

/// Summary of a loader run.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub run_id: String,
    pub target: String,
    pub engine: String,
    pub truncated: bool,
    pub tables: BTreeMap<String, TableLoad>,
    pub chunks: u64,
    pub stats_rows: Option<u64>,
    pub duration_ms: u64,
    #[serde(skip)]
    started: Option<Instant>,
}

impl LoadReport {
    fn new(target: &str, engine: &str, truncated: bool) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            target: target.to_string(),
            engine: engine.to_string(),
            truncated,
            tables: BTreeMap::new(),
            chunks: 0,
            stats_rows: None,
            duration_ms: 0,
            started: Some(Instant::now()),
        }
    }

    fn record_read(&mut self, table: Table, rows: usize) {
        self.tables.entry(table.name().to_string()).or_default().read += rows as u64;
    }

    fn record_outcome(&mut self, outcome: &InsertOutcome) {
        for (table, count) in &outcome.tables {
            let entry = self.tables.entry(table.name().to_string()).or_default();
            entry.inserted += count.inserted;
            entry.skipped += count.skipped;
        }
    }

    fn merge(&mut self, other: LoadReport) {
        for (table, load) in other.tables {
            let entry = self.tables.entry(table).or_default();
            entry.read += load.read;
            entry.inserted += load.inserted;
            entry.skipped += load.skipped;
        }
        self.chunks += other.chunks;
        if other.stats_rows.is_some() {
            self.stats_rows = other.stats_rows;
        }
    }

    fn finish(mut self) -> Self {
        if let Some(started) = self.started {
            self.duration_ms = started.elapsed().as_millis() as u64;
        }
        self
    }

    pub fn table(&self, table: Table) -> TableLoad {
        self.tables.get(table.name()).copied().unwrap_or_default()
    }

    pub fn skipped(&self) -> u64 {
        self.tables.values().map(|load| load.skipped).sum()
    }
}

fn read_input<T: DeserializeOwned>(data_dir: &Path, file: &str) -> LoadResult<Vec<T>> {
    read_json_array(&data_dir.join(file)).map_err(LoadError::from_core)
}

fn warn_on_skips(unit: &str, outcome: &InsertOutcome) {
    let skipped = outcome.skipped();
    if skipped > 0 {
        warn!(unit, skipped, "rows already present were skipped");
    }
}

/// Load `user_account.json` and `user_profile.json` as one unit.
pub async fn load_users(store: &mut dyn Store, options: &LoadOptions) -> LoadResult<LoadReport> {
    let accounts: Vec<UserAccount> = read_input(&options.data_dir, files::USER_ACCOUNT)?;
    let profiles: Vec<UserProfile> = read_input(&options.data_dir, files::USER_PROFILE)?;

    let mut report = LoadReport::new("users", store.engine(), options.truncate);
    report.record_read(Table::UserAccount, accounts.len());
    report.record_read(Table::UserProfile, profiles.len());

    if options.truncate {
        store.truncate(&Table::USER_TABLES).await?;
        info!(tables = ?Table::USER_TABLES, "user tables truncated");
    }

    let outcome = store.insert_users(&accounts, &profiles).await?;
    warn_on_skips("users", &outcome);
    report.record_outcome(&outcome);
    store.sync_identities(&Table::USER_TABLES).await?;

    info!(
        accounts = accounts.len(),
        inserted = outcome.inserted(),
        skipped = outcome.skipped(),
        "users loaded"
    );
    Ok(report.finish())
}

/// Load the restaurant file group as one unit.
pub async fn load_restaurants(
    store: &mut dyn Store,
    options: &LoadOptions,
) -> LoadResult<LoadReport> {
    let rows = RestaurantRows {
        restaurants: read_input(&options.data_dir, files::RESTAURANT)?,
        locations: read_input(&options.data_dir, files::RESTAURANT_LOCATION)?,
        images: read_input(&options.data_dir, files::RESTAURANT_IMAGE)?,
        categories: read_input(&options.data_dir, files::RESTAURANT_CATEGORY)?,
    };

    let mut report = LoadReport::new("restaurants", store.engine(), options.truncate);
    report.record_read(Table::Restaurant, rows.restaurants.len());
    report.record_read(Table::RestaurantLocation, rows.locations.len());
    report.record_read(Table::RestaurantImage, rows.images.len());
    report.record_read(Table::RestaurantCategory, rows.categories.len());

    if options.truncate {
        store.truncate(&Table::RESTAURANT_TABLES).await?;
        info!(tables = ?Table::RESTAURANT_TABLES, "restaurant tables truncated");
    }

    let outcome = store.insert_restaurants(&rows).await?;
    warn_on_skips("restaurants", &outcome);
    report.record_outcome(&outcome);
    store.sync_identities(&Table::RESTAURANT_TABLES).await?;

    info!(
        restaurants = rows.restaurants.len(),
        images = rows.images.len(),
        inserted = outcome.inserted(),
        skipped = outcome.skipped(),
        "restaurants loaded"
    );
    Ok(report.finish())
}

/// A review chunk paired with its photo companion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPair {
    pub reviews: ChunkFile,
    pub photos: ChunkFile,
}

/// Match every `review_<n>.json` with `review_photo_<n>.json`, in numeric order.
///
/// No review chunk at all, or a review chunk without its companion, is an
/// error; an orphan photo chunk is only reported.
pub fn pair_review_chunks(data_dir: &Path) -> LoadResult<Vec<ChunkPair>> {
    let reviews =
        list_chunk_files(data_dir, files::REVIEW_PREFIX).map_err(LoadError::from_core)?;
    if reviews.is_empty() {
        return Err(LoadError::MissingInput(
            data_dir.join(chunk_file_name(files::REVIEW_PREFIX, 1)),
        ));
    }
    let mut photos: BTreeMap<u64, ChunkFile> =
        list_chunk_files(data_dir, files::REVIEW_PHOTO_PREFIX)
            .map_err(LoadError::from_core)?
            .into_iter()
            .map(|chunk| (chunk.index, chunk))
            .collect();

    let mut pairs = Vec::with_capacity(reviews.len());
    for chunk in reviews {
        let Some(companion) = photos.remove(&chunk.index) else {
            return Err(LoadError::MissingInput(
                data_dir.join(chunk_file_name(files::REVIEW_PHOTO_PREFIX, chunk.index)),
            ));
        };
        pairs.push(ChunkPair {
            reviews: chunk,
            photos: companion,
        });
    }
    for orphan in photos.values() {
        warn!(file = %orphan.path.display(), "photo chunk has no review chunk");
    }
    Ok(pairs)
}

/// Load every review chunk with its photos, one transaction per chunk, then
/// optionally rebuild the per-restaurant stats.
///
/// Chunks are committed in numeric order; a failing chunk stops the run
/// and earlier chunks stay committed.
pub async fn load_reviews(store: &mut dyn Store, options: &LoadOptions) -> LoadResult<LoadReport> {
    let pairs = pair_review_chunks(&options.data_dir)?;
    let mut report = LoadReport::new("reviews", store.engine(), options.truncate);
    info!(chunks = pairs.len(), "review chunks discovered");

    if options.truncate {
        store.truncate(&Table::REVIEW_TABLES).await?;
        info!(tables = ?Table::REVIEW_TABLES, "review tables truncated");
    }

    for pair in &pairs {
        let file = pair.reviews.file_name();
        let reviews: Vec<Review> = read_json_array(&pair.reviews.path)
            .map_err(|err| LoadError::Core(err).in_chunk(file.clone()))?;
        let photos: Vec<ReviewPhoto> = read_json_array(&pair.photos.path)
            .map_err(|err| LoadError::Core(err).in_chunk(pair.photos.file_name()))?;
        report.record_read(Table::Review, reviews.len());
        report.record_read(Table::ReviewPhoto, photos.len());

        let outcome = store
            .insert_review_chunk(&reviews, &photos)
            .await
            .map_err(|err| err.in_chunk(file.clone()))?;
        warn_on_skips(&file, &outcome);
        report.record_outcome(&outcome);
        report.chunks += 1;

        info!(
            file = %file,
            reviews = reviews.len(),
            photos = photos.len(),
            inserted = outcome.inserted(),
            skipped = outcome.skipped(),
            "chunk loaded"
        );
    }
    store.sync_identities(&Table::REVIEW_TABLES).await?;

    if options.rebuild_stats {
        let rows = store.rebuild_stats().await?;
        report.stats_rows = Some(rows);
        info!(rows, "stats rebuilt");
    }

    Ok(report.finish())
}

/// Whole-table artifacts every full load needs.
const TABLE_FILES: [&str; 6] = [
    files::USER_ACCOUNT,
    files::USER_PROFILE,
    files::RESTAURANT,
    files::RESTAURANT_LOCATION,
    files::RESTAURANT_IMAGE,
    files::RESTAURANT_CATEGORY,
];

/// Users, then restaurants, then reviews. Every input is checked for
/// presence before the first insert.
pub async fn load_all(store: &mut dyn Store, options: &LoadOptions) -> LoadResult<LoadReport> {
    for file in TABLE_FILES {
        let path = options.data_dir.join(file);
        if !path.is_file() {
            return Err(LoadError::MissingInput(path));
        }
    }
    pair_review_chunks(&options.data_dir)?;

    let mut report = LoadReport::new("all", store.engine(), options.truncate);
    report.merge(load_users(store, options).await?);
    report.merge(load_restaurants(store, options).await?);
    report.merge(load_reviews(store, options).await?);
    Ok(report.finish())
}
