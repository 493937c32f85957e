//! Synthetic data generators for Tastebase.
//!
//! Each generator takes the shared [`Settings`](tastebase_core::Settings),
//! writes JSON artifacts into `DATA_DIR`, and never touches the database.
//! Output is reproducible for a given seed and reference time when no text
//! service is configured.

pub mod errors;
pub mod model;
pub mod output;
pub mod restaurants;
pub mod reviews;
pub mod text;
pub mod users;

pub use errors::GenerationError;
pub use model::{FileReport, GenerationReport};
pub use output::chunks::{ChunkWriter, WrittenChunk, plan_chunk_sizes, write_chunks};
pub use restaurants::generate_restaurants;
pub use reviews::generate_reviews;
pub use text::{TextService, text_service_from_settings};
pub use users::generate_users;
