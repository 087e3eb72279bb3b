use anyhow::Result as AnyResult;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use matdb_classify::classify;
use matdb_core::config::SearchOptions;
use matdb_core::error::Result;
use matdb_core::fuzzy::fuzzy_match_score;
use matdb_core::traits::{Embedder, MaterialStore, VectorStore};
use matdb_core::types::{
    MaterialDocument, MaterialField, MatchType, QueryClassification, QueryType, ResultSource,
    SearchResult,
};

use matdb_core::types::ResultSource::{StructuredStore, VectorIndex};

use crate::merge::rerank;
use crate::strategy::{
    plan, Strategy, EXACT_SCORE, FUZZY_MIN_SIMILARITY, FUZZY_WEIGHT, KEYWORD_SCORE, METADATA_SCORE,
    SEMANTIC_CAP,
};

/// Candidates fetched per strategy, as a multiple of `top_k`.
const CANDIDATE_FACTOR: usize = 5;

const DESCRIPTION_FIELDS: [MaterialField; 4] = [
    MaterialField::Description,
    MaterialField::Supplier,
    MaterialField::CompanyName,
    MaterialField::Function,
];

struct VectorBackend<V: ?Sized> {
    store: Arc<V>,
    embedder: Arc<dyn Embedder>,
    collection: String,
}

/// Stateless search front end over a structured store and an optional vector
/// index. Cheap to share behind an `Arc`; every call is independent.
pub struct HybridSearchService<S: ?Sized, V: ?Sized> {
    store: Arc<S>,
    vector: Option<VectorBackend<V>>,
}

impl<S> HybridSearchService<S, dyn VectorStore>
where
    S: MaterialStore + ?Sized,
{
    /// Service without a vector index; semantic search uses keywords only.
    pub fn structured_only(store: Arc<S>) -> Self {
        Self { store, vector: None }
    }
}

impl<S, V> HybridSearchService<S, V>
where
    S: MaterialStore + ?Sized,
    V: VectorStore + ?Sized,
{
    pub fn new(
        store: Arc<S>,
        vector: Arc<V>,
        embedder: Arc<dyn Embedder>,
        collection: impl Into<String>,
    ) -> Self {
        let vector = VectorBackend { store: vector, embedder, collection: collection.into() };
        Self { store, vector: Some(vector) }
    }

    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        options.validate()?;
        let classification = classify(query);
        tracing::debug!(
            query_type = ?classification.query_type,
            confidence = classification.confidence,
            language = ?classification.language,
            "classified query"
        );
        let planned = plan(&classification, options);
        if planned.is_empty() {
            return Ok(vec![]);
        }
        tracing::debug!(strategies = ?planned, "running strategies");

        let limit = options.top_k.saturating_mul(CANDIDATE_FACTOR);
        let structured = options.strategy_timeout();
        let vector = options.vector_timeout();
        let c = &classification;
        let p = planned.as_slice();
        let (exact, metadata, fuzzy, keywords, vectors) = tokio::join!(
            guarded(Strategy::Exact, "store", p, structured, self.exact(c)),
            guarded(Strategy::Metadata, "store", p, structured, self.metadata(c, limit)),
            guarded(Strategy::Fuzzy, "store", p, structured, self.fuzzy(c, query, limit)),
            guarded(Strategy::Semantic, "keywords", p, structured, self.keywords(c, limit)),
            guarded(Strategy::Semantic, "vector", p, vector, self.semantic_vector(c, query, limit)),
        );

        let candidates: Vec<SearchResult> = exact
            .into_iter()
            .chain(metadata)
            .chain(fuzzy)
            .chain(keywords)
            .chain(vectors)
            .collect();
        let results = rerank(candidates, options, classification.has_exact_code_intent());
        tracing::debug!(results = results.len(), "search complete");
        Ok(results)
    }

    async fn exact(&self, c: &QueryClassification) -> AnyResult<Vec<SearchResult>> {
        let mut out = Vec::new();
        for code in &c.extracted_entities.codes {
            if let Some(doc) = self.store.find_by_code(code).await? {
                let fields = vec![MaterialField::Code.as_str().to_string()];
                out.push(result(doc, EXACT_SCORE, MatchType::Exact, c, fields, StructuredStore));
            }
        }
        Ok(out)
    }

    async fn metadata(
        &self,
        c: &QueryClassification,
        limit: usize,
    ) -> AnyResult<Vec<SearchResult>> {
        let mut out = Vec::new();
        for name in &c.extracted_entities.names {
            for doc in self.store.search_by_field(&MaterialField::NAMES, name, limit).await? {
                let fields = matching_fields(&doc, &MaterialField::NAMES, name);
                out.push(result(
                    doc,
                    METADATA_SCORE,
                    MatchType::Metadata,
                    c,
                    fields,
                    StructuredStore,
                ));
            }
        }
        Ok(out)
    }

    async fn fuzzy(
        &self,
        c: &QueryClassification,
        query: &str,
        limit: usize,
    ) -> AnyResult<Vec<SearchResult>> {
        let targets: Vec<&str> = if c.extracted_entities.names.is_empty() {
            vec![query]
        } else {
            c.extracted_entities.names.iter().map(String::as_str).collect()
        };
        let mut out = Vec::new();
        for target in targets {
            for doc in self.store.fuzzy_candidates(target, limit).await? {
                let best = MaterialField::NAMES
                    .into_iter()
                    .map(|f| (f, fuzzy_match_score(target, doc.field(f))))
                    .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
                if let Some((field, similarity)) = best {
                    if similarity >= FUZZY_MIN_SIMILARITY {
                        let fields = vec![field.as_str().to_string()];
                        let score = similarity * FUZZY_WEIGHT;
                        out.push(result(doc, score, MatchType::Fuzzy, c, fields, StructuredStore));
                    }
                }
            }
        }
        Ok(out)
    }

    /// Properties matched against the descriptive fields of the store.
    async fn keywords(
        &self,
        c: &QueryClassification,
        limit: usize,
    ) -> AnyResult<Vec<SearchResult>> {
        let fields: &[MaterialField] = match c.query_type {
            QueryType::DescriptionSearch => &DESCRIPTION_FIELDS,
            _ => &MaterialField::PROPERTIES,
        };
        let mut out = Vec::new();
        for property in &c.extracted_entities.properties {
            for doc in self.store.search_by_field(fields, property, limit).await? {
                let matched = matching_fields(&doc, fields, property);
                out.push(result(
                    doc,
                    KEYWORD_SCORE,
                    MatchType::Semantic,
                    c,
                    matched,
                    StructuredStore,
                ));
            }
        }
        Ok(out)
    }

    /// Nearest chunks for the query embedding, folded to one hit per code.
    async fn semantic_vector(
        &self,
        c: &QueryClassification,
        query: &str,
        limit: usize,
    ) -> AnyResult<Vec<SearchResult>> {
        let Some(backend) = &self.vector else { return Ok(vec![]) };
        let embedder = Arc::clone(&backend.embedder);
        let text = vec![query.to_string()];
        let vector = tokio::task::spawn_blocking(move || embedder.embed_batch(&text))
            .await??
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))?;

        let hits = backend.store.query(&backend.collection, &vector, limit).await?;
        let mut by_code: HashMap<String, (f32, String)> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for hit in hits {
            let chunk_type = hit.metadata.chunk_type.as_str().to_string();
            match by_code.get_mut(&hit.metadata.code) {
                Some(best) if best.0 >= hit.score => {}
                Some(best) => *best = (hit.score, chunk_type),
                None => {
                    order.push(hit.metadata.code.clone());
                    by_code.insert(hit.metadata.code, (hit.score, chunk_type));
                }
            }
        }

        let mut out = Vec::new();
        for code in order {
            let Some((score, chunk_type)) = by_code.remove(&code) else { continue };
            match self.store.find_by_code(&code).await? {
                Some(doc) => {
                    let score = score.clamp(0.0, SEMANTIC_CAP);
                    let fields = vec![chunk_type];
                    out.push(result(doc, score, MatchType::Semantic, c, fields, VectorIndex));
                }
                None => tracing::debug!(code, "vector hit without a stored record"),
            }
        }
        Ok(out)
    }
}

/// Run one strategy branch under its time budget. Failures and timeouts are
/// logged and contribute nothing.
async fn guarded<F>(
    strategy: Strategy,
    part: &str,
    planned: &[Strategy],
    budget: Duration,
    fut: F,
) -> Vec<SearchResult>
where
    F: Future<Output = AnyResult<Vec<SearchResult>>>,
{
    if !planned.contains(&strategy) {
        return vec![];
    }
    match tokio::time::timeout(budget, fut).await {
        Ok(Ok(results)) => {
            tracing::debug!(%strategy, part, results = results.len(), "strategy finished");
            results
        }
        Ok(Err(e)) => {
            tracing::warn!(%strategy, part, error = %e, "strategy failed");
            vec![]
        }
        Err(_) => {
            let timeout_ms = budget.as_millis() as u64;
            tracing::warn!(%strategy, part, timeout_ms, "strategy timed out");
            vec![]
        }
    }
}

fn matching_fields(doc: &MaterialDocument, fields: &[MaterialField], needle: &str) -> Vec<String> {
    let needle = needle.trim().to_lowercase();
    fields
        .iter()
        .filter(|f| doc.field(**f).to_lowercase().contains(&needle))
        .map(|f| f.as_str().to_string())
        .collect()
}

fn result(
    document: MaterialDocument,
    score: f32,
    match_type: MatchType,
    c: &QueryClassification,
    matched_fields: Vec<String>,
    source: ResultSource,
) -> SearchResult {
    SearchResult {
        document,
        score,
        match_type,
        confidence: c.confidence,
        matched_fields,
        source,
    }
}
