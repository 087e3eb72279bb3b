//! Embedding cache keyed by `(embedder_id, content_hash)`.
//!
//! Wraps any [`Embedder`] and only forwards texts it has not seen, so chunks
//! whose text is unchanged are not re-embedded on re-index.
use anyhow::{ensure, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use matdb_core::traits::Embedder;

pub fn content_hash(embedder_id: &str, text: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(embedder_id.as_bytes());
    hasher.update(&[0]);
    hasher.update(text.as_bytes());
    hasher.finalize().to_hex().to_string()
}

pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    entries: RwLock<HashMap<String, Vec<f32>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>) -> Self {
        Self { inner, entries: RwLock::new(HashMap::new()), hits: AtomicU64::new(0), misses: AtomicU64::new(0) }
    }

    pub fn len(&self) -> usize { self.entries.read().unwrap_or_else(PoisonError::into_inner).len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// `(hits, misses)` since construction.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }
}

impl Embedder for CachedEmbedder {
    fn embedder_id(&self) -> &str { self.inner.embedder_id() }

    fn dim(&self) -> usize { self.inner.dim() }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let id = self.inner.embedder_id();
        let keys: Vec<String> = texts.iter().map(|t| content_hash(id, t)).collect();

        let mut out: Vec<Option<Vec<f32>>> = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            keys.iter().map(|k| entries.get(k).cloned()).collect()
        };
        let missing: Vec<usize> = (0..texts.len()).filter(|&i| out[i].is_none()).collect();
        self.hits.fetch_add((texts.len() - missing.len()) as u64, Ordering::Relaxed);
        self.misses.fetch_add(missing.len() as u64, Ordering::Relaxed);

        if !missing.is_empty() {
            let batch: Vec<String> = missing.iter().map(|&i| texts[i].clone()).collect();
            let vectors = self.inner.embed_batch(&batch)?;
            ensure!(
                vectors.len() == batch.len(),
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                batch.len()
            );
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            for (&i, v) in missing.iter().zip(vectors) {
                entries.insert(keys[i].clone(), v.clone());
                out[i] = Some(v);
            }
        }
        Ok(out.into_iter().flatten().collect())
    }
}
