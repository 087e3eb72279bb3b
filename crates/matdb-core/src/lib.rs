//! matdb-core
//!
//! Domain types, configuration, backend traits, the canonical fuzzy
//! similarity and the dynamic chunking service shared by every other crate
//! in the workspace.

pub mod chunking;
pub mod config;
pub mod error;
pub mod fuzzy;
pub mod store;
pub mod traits;
pub mod types;

pub use chunking::{chunk, chunk_ids_for, chunks_to_documents, ChunkingConfig};
pub use error::{Error, Result};
pub use fuzzy::fuzzy_match_score;
