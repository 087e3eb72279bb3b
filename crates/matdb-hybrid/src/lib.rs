//! matdb-hybrid
//!
//! Query-time orchestration: classify, run the planned retrieval strategies
//! concurrently against the structured store and the vector index, then merge
//! into one ranked list. Also hosts the chunk → embed → upsert indexing
//! pipeline that feeds the vector index.
pub mod indexing;
pub mod merge;
pub mod service;
pub mod strategy;

pub use indexing::MaterialIndexer;
pub use service::HybridSearchService;
pub use strategy::Strategy;
