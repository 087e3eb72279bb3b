mod support;

use std::sync::Arc;
use std::time::{Duration, Instant};

use matdb_core::config::SearchOptions;
use matdb_core::types::{MatchType, ResultSource};
use matdb_core::{ChunkingConfig, Error};
use matdb_embed::FakeEmbedder;
use matdb_hybrid::{HybridSearchService, MaterialIndexer};
use matdb_vector::InMemoryVectorStore;

use support::{catalog, store, FailingVectorStore, SlowVectorStore};

const COLLECTION: &str = "material_chunks";

async fn indexed_service() -> HybridSearchService<matdb_core::store::InMemoryMaterialStore, InMemoryVectorStore> {
    let embedder = Arc::new(FakeEmbedder::new(1024));
    let vectors = Arc::new(InMemoryVectorStore::new());
    let indexer =
        MaterialIndexer::new(vectors.clone(), embedder.clone(), COLLECTION, ChunkingConfig::default())
            .unwrap();
    for doc in catalog() {
        indexer.index_material(&doc).await.unwrap();
    }
    HybridSearchService::new(store(), vectors, embedder, COLLECTION)
}

#[tokio::test]
async fn exact_code_is_top_result() {
    let service = indexed_service().await;
    let results = service.search("RM000001", &SearchOptions::default()).await.unwrap();
    let top = &results[0];
    assert_eq!(top.document.code, "RM000001");
    assert!(matches!(top.match_type, MatchType::Exact | MatchType::Metadata));
    assert!(top.score >= 0.95);
    assert_eq!(top.source, ResultSource::StructuredStore);
    assert_eq!(top.matched_fields, vec!["code".to_string()]);
}

#[tokio::test]
async fn absent_code_and_chat_return_nothing() {
    let service = indexed_service().await;
    let opts = SearchOptions::default();
    assert!(service.search("RM999999", &opts).await.unwrap().is_empty());
    assert!(service.search("tell me about ingredients", &opts).await.unwrap().is_empty());
    assert!(service.search("hello", &opts).await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_options_are_rejected_eagerly() {
    let service = HybridSearchService::structured_only(store());
    let err = service.search("RM000001", &SearchOptions { top_k: 0, ..SearchOptions::default() }).await.unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[tokio::test]
async fn code_with_quoted_name_also_runs_metadata() {
    let service = HybridSearchService::structured_only(store());
    let results = service.search(r#"RM000002 or "Hydrasoft HA""#, &SearchOptions::default()).await.unwrap();
    let hits: Vec<(&str, MatchType)> = results.iter().map(|r| (r.document.code.as_str(), r.match_type)).collect();
    assert_eq!(hits, vec![("RM000002", MatchType::Exact), ("RM000001", MatchType::Metadata)]);
    assert_eq!(results[1].score, 0.9);
}

#[tokio::test]
async fn several_codes_return_each_registered_one() {
    let service = HybridSearchService::structured_only(store());
    let results = service.search("RM000002 and RM000001 and RM999999", &SearchOptions::default()).await.unwrap();
    let codes: Vec<&str> = results.iter().map(|r| r.document.code.as_str()).collect();
    assert_eq!(codes, vec!["RM000001", "RM000002"]);
    assert!(results.iter().all(|r| r.match_type == MatchType::Exact));
}

#[tokio::test]
async fn name_query_prefers_metadata_over_fuzzy() {
    let service = HybridSearchService::structured_only(store());
    let results = service.search("What is Tinogard TT?", &SearchOptions::default()).await.unwrap();
    assert_eq!(results[0].document.code, "RM000002");
    assert_eq!(results[0].match_type, MatchType::Metadata);
    assert!((results[0].score - 0.9).abs() < 1e-6);
    assert_eq!(results.iter().filter(|r| r.document.code == "RM000002").count(), 1);
}

#[tokio::test]
async fn misspelled_name_is_found_by_fuzzy_match() {
    let service = HybridSearchService::structured_only(store());
    let results = service.search("do we have \"Tinogrd TT\"", &SearchOptions::default()).await.unwrap();
    assert_eq!(results[0].document.code, "RM000002");
    assert_eq!(results[0].match_type, MatchType::Fuzzy);
    assert!(results[0].score >= 0.6 * 0.85 && results[0].score < 0.9);
}

#[tokio::test]
async fn property_query_uses_semantic_keywords() {
    let service = HybridSearchService::structured_only(store());
    let results = service.search("moisturizing ingredients", &SearchOptions::default()).await.unwrap();
    let codes: Vec<&str> = results.iter().map(|r| r.document.code.as_str()).collect();
    assert!(codes.contains(&"RM000001"));
    assert!(codes.contains(&"RM000004"));
    for r in &results {
        assert_eq!(r.match_type, MatchType::Semantic);
        assert!(r.score <= 0.9);
        assert!(r.matched_fields.contains(&"function".to_string()));
    }

    let one = SearchOptions { top_k: 1, ..SearchOptions::default() };
    let top_one = service.search("moisturizing ingredients", &one).await.unwrap();
    assert_eq!(top_one.len(), 1);
}

#[tokio::test]
async fn supplier_query_matches_commercial_fields() {
    let service = HybridSearchService::structured_only(store());
    let results = service.search("ingredients supplied by Nordic Actives", &SearchOptions::default()).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document.code, "RM000002");
    assert_eq!(results[0].matched_fields, vec!["supplier".to_string()]);
}

#[tokio::test]
async fn vector_index_contributes_semantic_hits() {
    let service = indexed_service().await;
    let opts = SearchOptions { similarity_threshold: 0.1, ..SearchOptions::default() };
    let results = service.search("hydrating serum for dry skin", &opts).await.unwrap();
    let serum = results.iter().find(|r| r.document.code == "RM000003").expect("serum base found");
    assert_eq!(serum.match_type, MatchType::Semantic);
    assert_eq!(serum.source, ResultSource::VectorIndex);
    assert!(serum.score <= 0.9);
    assert!(results.iter().all(|r| r.score <= 0.9));
}

#[tokio::test]
async fn failing_vector_index_does_not_fail_search() {
    let embedder = Arc::new(FakeEmbedder::new(32));
    let service = HybridSearchService::new(store(), Arc::new(FailingVectorStore), embedder, COLLECTION);
    let results = service.search("moisturizing ingredients", &SearchOptions::default()).await.unwrap();
    assert!(results.iter().any(|r| r.document.code == "RM000001"));

    let named = service.search("What is Tinogard TT?", &SearchOptions::default()).await.unwrap();
    assert_eq!(named[0].match_type, MatchType::Metadata);
}

#[tokio::test]
async fn slow_vector_index_is_cut_off() {
    let slow = Arc::new(SlowVectorStore { delay: Duration::from_secs(30) });
    let service = HybridSearchService::new(store(), slow, Arc::new(FakeEmbedder::new(32)), COLLECTION);
    let opts = SearchOptions { vector_timeout_ms: 50, ..SearchOptions::default() };

    let started = Instant::now();
    let results = service.search("moisturizing ingredients", &opts).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(results.iter().any(|r| r.document.code == "RM000004"));
}

#[tokio::test]
async fn disabled_strategies_do_not_run() {
    let service = HybridSearchService::structured_only(store());
    let opts = SearchOptions { enable_exact_match: false, ..SearchOptions::default() };
    assert!(service.search("RM000001", &opts).await.unwrap().is_empty());
}
