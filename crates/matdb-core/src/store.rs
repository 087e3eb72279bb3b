//! In-memory structured store and JSON material loading.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::fuzzy::fuzzy_match_score;
use crate::traits::MaterialStore;
use crate::types::{MaterialDocument, MaterialField};

/// Material records keyed by canonical code.
#[derive(Default)]
pub struct InMemoryMaterialStore {
    records: RwLock<BTreeMap<String, MaterialDocument>>,
}

impl InMemoryMaterialStore {
    pub fn new() -> Self { Self::default() }

    pub fn from_documents(docs: impl IntoIterator<Item = MaterialDocument>) -> Self {
        let store = Self::new();
        for doc in docs { store.upsert(doc); }
        store
    }

    /// Insert or replace the record with the same code.
    pub fn upsert(&self, mut doc: MaterialDocument) {
        doc.code = normalize_code(&doc.code);
        self.records.write().unwrap_or_else(PoisonError::into_inner).insert(doc.code.clone(), doc);
    }

    pub fn len(&self) -> usize { self.records.read().unwrap_or_else(PoisonError::into_inner).len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn documents(&self) -> Vec<MaterialDocument> {
        self.records.read().unwrap_or_else(PoisonError::into_inner).values().cloned().collect()
    }
}

#[async_trait]
impl MaterialStore for InMemoryMaterialStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<MaterialDocument>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(&normalize_code(code)).cloned())
    }

    async fn search_by_field(
        &self,
        fields: &[MaterialField],
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<MaterialDocument>> {
        let needle = pattern.trim().to_lowercase();
        if needle.is_empty() { return Ok(vec![]); }
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .values()
            .filter(|doc| fields.iter().any(|f| doc.field(*f).to_lowercase().contains(&needle)))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fuzzy_candidates(&self, text: &str, limit: usize) -> Result<Vec<MaterialDocument>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut scored: Vec<(f32, &MaterialDocument)> = records
            .values()
            .map(|doc| {
                let best = MaterialField::NAMES
                    .iter()
                    .map(|f| fuzzy_match_score(text, doc.field(*f)))
                    .fold(0.0f32, f32::max);
                (best, doc)
            })
            .filter(|(score, _)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored.into_iter().take(limit).map(|(_, doc)| doc.clone()).collect())
    }
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Load material records from a `.json` file (one object or an array), a
/// `.jsonl` file (one object per line), or a directory of such files.
/// Records without a code are skipped.
pub fn load_materials(path: &Path) -> Result<Vec<MaterialDocument>> {
    let files = if path.is_dir() { list_material_files(path) } else { vec![path.to_path_buf()] };
    let mut docs = Vec::new();
    for file in &files {
        let content = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
        let parsed: Vec<MaterialDocument> = if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            content
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(serde_json::from_str)
                .collect::<std::result::Result<_, _>>()
                .with_context(|| format!("parsing {}", file.display()))?
        } else {
            let value: serde_json::Value =
                serde_json::from_str(&content).with_context(|| format!("parsing {}", file.display()))?;
            match value {
                serde_json::Value::Array(items) => items
                    .into_iter()
                    .map(serde_json::from_value)
                    .collect::<std::result::Result<_, _>>()?,
                value => vec![serde_json::from_value(value)?],
            }
        };
        for mut doc in parsed {
            doc.code = normalize_code(&doc.code);
            if doc.code.is_empty() {
                tracing::warn!(file = %file.display(), "skipping material without code");
                continue;
            }
            docs.push(doc);
        }
    }
    tracing::debug!(files = files.len(), materials = docs.len(), "loaded materials");
    Ok(docs)
}

fn list_material_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")))
        .collect();
    files.sort();
    files
}
