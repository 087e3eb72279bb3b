//! matdb-text
//!
//! Tantivy-backed structured store for material records. Codes are indexed as
//! raw terms for exact lookup, names are tokenized for fuzzy term matching and
//! the full record is stored as JSON so hits come back as
//! [`matdb_core::types::MaterialDocument`]s.
pub mod schema;
pub mod store;

pub use store::TantivyMaterialStore;
