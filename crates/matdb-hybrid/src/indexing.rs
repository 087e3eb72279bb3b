use std::sync::Arc;

use matdb_core::chunking::{chunk, chunk_ids_for, chunks_to_documents, ChunkingConfig};
use matdb_core::error::{Error, Result};
use matdb_core::store::normalize_code;
use matdb_core::traits::{Embedder, VectorStore};
use matdb_core::types::{MaterialDocument, VectorRecord};

/// Chunk → embed → upsert pipeline for one material at a time.
///
/// Re-indexing a code first deletes every chunk id that code could have
/// produced, so a shrinking chunk set leaves no stale rows behind.
pub struct MaterialIndexer<V: ?Sized> {
    vector: Arc<V>,
    embedder: Arc<dyn Embedder>,
    collection: String,
    chunking: ChunkingConfig,
}

impl<V> MaterialIndexer<V>
where
    V: VectorStore + ?Sized,
{
    pub fn new(
        vector: Arc<V>,
        embedder: Arc<dyn Embedder>,
        collection: impl Into<String>,
        chunking: ChunkingConfig,
    ) -> Result<Self> {
        chunking.validate()?;
        Ok(Self { vector, embedder, collection: collection.into(), chunking })
    }

    /// Returns the number of chunks written.
    pub async fn index_material(&self, doc: &MaterialDocument) -> Result<usize> {
        let code = normalize_code(&doc.code);
        if code.is_empty() {
            return Err(Error::Operation("cannot index a material without a code".into()));
        }
        let doc = MaterialDocument { code, ..doc.clone() };
        let documents = chunks_to_documents(&chunk(&doc, &self.chunking));

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let embedder = Arc::clone(&self.embedder);
        let vectors = tokio::task::spawn_blocking(move || embedder.embed_batch(&texts))
            .await
            .map_err(|e| Error::Operation(format!("embedding task failed: {e}")))??;
        if vectors.len() != documents.len() {
            return Err(Error::Operation(format!(
                "embedder returned {} vectors for {} chunks",
                vectors.len(),
                documents.len()
            )));
        }

        let records: Vec<VectorRecord> = documents
            .into_iter()
            .zip(vectors)
            .map(|(d, vector)| VectorRecord { id: d.id, vector, text: d.text, metadata: d.metadata })
            .collect();

        self.vector.delete(&self.collection, &chunk_ids_for(&doc.code)).await?;
        self.vector.upsert(&self.collection, &records).await?;
        tracing::info!(code = %doc.code, chunks = records.len(), "indexed material");
        Ok(records.len())
    }

    pub async fn remove_material(&self, code: &str) -> Result<()> {
        let code = normalize_code(code);
        self.vector.delete(&self.collection, &chunk_ids_for(&code)).await?;
        tracing::info!(code = %code, "removed material chunks");
        Ok(())
    }
}
