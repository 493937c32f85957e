//! Loaders that move generated artifacts into a relational store.
//!
//! [`Store`] is the seam: [`PostgresStore`] writes through sqlx,
//! [`MemoryStore`] keeps the same unit semantics in process.

pub mod errors;
pub mod loader;
pub mod memory;
pub mod postgres;
pub mod store;

pub use errors::{LoadError, LoadResult};
pub use loader::{
    ChunkPair, LoadOptions, LoadReport, TableLoad, load_all, load_restaurants, load_reviews,
    load_users, pair_review_chunks,
};
pub use memory::{MemoryStore, MemoryTables};
pub use postgres::PostgresStore;
pub use store::{InsertCount, InsertOutcome, RestaurantRows, Store};
