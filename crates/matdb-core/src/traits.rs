use async_trait::async_trait;

use crate::types::{MaterialDocument, MaterialField, VectorHit, VectorRecord};

/// Sentence embedder. Implementations must return L2-normalized vectors of
/// `dim()` length for a given `embedder_id()`.
pub trait Embedder: Send + Sync {
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Structured lookup over material records.
#[async_trait]
pub trait MaterialStore: Send + Sync {
    async fn find_by_code(&self, code: &str) -> anyhow::Result<Option<MaterialDocument>>;

    /// Case-insensitive substring match of `pattern` against any of `fields`.
    async fn search_by_field(
        &self,
        fields: &[MaterialField],
        pattern: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<MaterialDocument>>;

    /// Materials whose names are plausibly close to `text`; scoring is left
    /// to the caller.
    async fn fuzzy_candidates(&self, text: &str, limit: usize) -> anyhow::Result<Vec<MaterialDocument>>;
}

/// Remote or embedded vector index keyed by chunk id.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, collection: &str, records: &[VectorRecord]) -> anyhow::Result<()>;
    async fn query(&self, collection: &str, vector: &[f32], top_k: usize) -> anyhow::Result<Vec<VectorHit>>;
    async fn delete(&self, collection: &str, ids: &[String]) -> anyhow::Result<()>;
}
