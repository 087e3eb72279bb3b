//! matdb-vector
//!
//! Vector index backends for material chunks (LanceDB on disk, exact cosine in
//! memory) and a content-hash embedding cache.
use anyhow::Result;
use std::sync::Arc;

use matdb_core::config::{expand_path, VectorSettings};
use matdb_core::traits::VectorStore;

pub mod cache;
pub mod lance;
pub mod memory;
pub mod schema;
pub mod table;

pub use cache::CachedEmbedder;
pub use lance::LanceVectorStore;
pub use memory::InMemoryVectorStore;

/// URI value that selects the in-process index.
pub const MEMORY_URI: &str = "memory";

pub async fn open_vector_store(settings: &VectorSettings, dim: usize) -> Result<Arc<dyn VectorStore>> {
    if settings.uri == MEMORY_URI {
        return Ok(Arc::new(InMemoryVectorStore::new()));
    }
    let path = expand_path(&settings.uri);
    Ok(Arc::new(LanceVectorStore::connect(&path.to_string_lossy(), dim).await?))
}
