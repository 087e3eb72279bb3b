#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use matdb_core::store::InMemoryMaterialStore;
use matdb_core::traits::VectorStore;
use matdb_core::types::{MaterialDocument, VectorHit, VectorRecord};

pub fn catalog() -> Vec<MaterialDocument> {
    let mut hydrasoft = MaterialDocument::new("RM000001").with_trade_name("Hydrasoft HA");
    hydrasoft.inci_name = "Sodium Hyaluronate".to_string();
    hydrasoft.category = "Humectant".to_string();
    hydrasoft.function = "Moisturizing".to_string();
    hydrasoft.supplier = "Bloom Chemicals".to_string();
    hydrasoft.company_name = "บริษัท สยามเคมี จำกัด".to_string();

    let mut tinogard = MaterialDocument::new("RM000002").with_trade_name("Tinogard TT");
    tinogard.inci_name = "Pentaerythrityl Tetra-di-t-butyl Hydroxyhydrocinnamate".to_string();
    tinogard.function = "Antioxidant".to_string();
    tinogard.supplier = "Nordic Actives".to_string();

    let mut serum = MaterialDocument::new("RM000003").with_trade_name("Aquaflex Base");
    serum.function = "Film former".to_string();
    serum.description = Some("Hydrating serum base for dry skin".to_string());

    let mut glycerin = MaterialDocument::new("RM000004").with_trade_name("Glycerin 99");
    glycerin.function = "Moisturizing humectant".to_string();

    vec![hydrasoft, tinogard, serum, glycerin]
}

pub fn store() -> Arc<InMemoryMaterialStore> {
    Arc::new(InMemoryMaterialStore::from_documents(catalog()))
}

/// Vector index that always errors.
pub struct FailingVectorStore;

#[async_trait]
impl VectorStore for FailingVectorStore {
    async fn upsert(&self, _: &str, _: &[VectorRecord]) -> anyhow::Result<()> {
        anyhow::bail!("vector service unavailable")
    }
    async fn query(&self, _: &str, _: &[f32], _: usize) -> anyhow::Result<Vec<VectorHit>> {
        anyhow::bail!("vector service unavailable")
    }
    async fn delete(&self, _: &str, _: &[String]) -> anyhow::Result<()> {
        anyhow::bail!("vector service unavailable")
    }
}

/// Vector index that answers only after `delay`.
pub struct SlowVectorStore {
    pub delay: Duration,
}

#[async_trait]
impl VectorStore for SlowVectorStore {
    async fn upsert(&self, _: &str, _: &[VectorRecord]) -> anyhow::Result<()> {
        Ok(())
    }
    async fn query(&self, _: &str, _: &[f32], _: usize) -> anyhow::Result<Vec<VectorHit>> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![])
    }
    async fn delete(&self, _: &str, _: &[String]) -> anyhow::Result<()> {
        Ok(())
    }
}
