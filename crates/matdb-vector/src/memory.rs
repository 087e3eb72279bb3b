use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use matdb_core::traits::VectorStore;
use matdb_core::types::{VectorHit, VectorRecord};

/// Exact cosine search over records held in process. Used for tests and for
/// the `memory` vector URI.
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, BTreeMap<String, VectorRecord>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self { Self::default() }

    pub fn count(&self, collection: &str) -> usize {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        collections.get(collection).map_or(0, |c| c.len())
    }

    pub fn ids(&self, collection: &str) -> Vec<String> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        collections.get(collection).map(|c| c.keys().cloned().collect()).unwrap_or_default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, collection: &str, records: &[VectorRecord]) -> Result<()> {
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        let table = collections.entry(collection.to_string()).or_default();
        if let (Some(existing), Some(first)) = (table.values().next(), records.first()) {
            if existing.vector.len() != first.vector.len() {
                bail!("vector dim {} does not match collection dim {}", first.vector.len(), existing.vector.len());
            }
        }
        for r in records {
            table.insert(r.id.clone(), r.clone());
        }
        Ok(())
    }

    async fn query(&self, collection: &str, vector: &[f32], top_k: usize) -> Result<Vec<VectorHit>> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        let Some(table) = collections.get(collection) else { return Ok(vec![]) };
        let mut hits: Vec<VectorHit> = table
            .values()
            .map(|r| VectorHit { id: r.id.clone(), score: cosine(vector, &r.vector), metadata: r.metadata.clone() })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn delete(&self, collection: &str, ids: &[String]) -> Result<()> {
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = collections.get_mut(collection) {
            for id in ids {
                table.remove(id);
            }
        }
        Ok(())
    }
}

pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 { 0.0 } else { dot / (na * nb) }
}
