use std::fmt;

use matdb_core::config::SearchOptions;
use matdb_core::types::{QueryClassification, SearchStrategy};

pub const EXACT_SCORE: f32 = 1.0;
pub const METADATA_SCORE: f32 = 0.9;
pub const FUZZY_WEIGHT: f32 = 0.85;
pub const FUZZY_MIN_SIMILARITY: f32 = 0.6;
pub const KEYWORD_SCORE: f32 = 0.8;
/// Upper bound for anything the semantic strategy returns.
pub const SEMANTIC_CAP: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Exact,
    Metadata,
    Fuzzy,
    Semantic,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Exact => "exact",
            Strategy::Metadata => "metadata",
            Strategy::Fuzzy => "fuzzy",
            Strategy::Semantic => "semantic",
        }
    }

    fn enabled(self, options: &SearchOptions) -> bool {
        match self {
            Strategy::Exact => options.enable_exact_match,
            Strategy::Metadata => options.enable_metadata_filter,
            Strategy::Fuzzy => options.enable_fuzzy_match,
            Strategy::Semantic => options.enable_semantic_search,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategies to run for a classified query, after the enable flags.
pub fn plan(classification: &QueryClassification, options: &SearchOptions) -> Vec<Strategy> {
    if !classification.is_raw_materials_query {
        return vec![];
    }
    let planned: Vec<Strategy> = match classification.search_strategy {
        SearchStrategy::ExactMatch if classification.extracted_entities.names.is_empty() => vec![Strategy::Exact],
        SearchStrategy::ExactMatch => vec![Strategy::Exact, Strategy::Metadata],
        SearchStrategy::FuzzyMatch => vec![Strategy::Metadata, Strategy::Fuzzy, Strategy::Semantic],
        SearchStrategy::SemanticSearch => vec![Strategy::Semantic],
        SearchStrategy::Hybrid => vec![],
    };
    planned.into_iter().filter(|s| s.enabled(options)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use matdb_core::types::{ExtractedEntities, Language, QueryType};

    fn classification(strategy: SearchStrategy, names: &[&str]) -> QueryClassification {
        QueryClassification {
            is_raw_materials_query: true,
            query_type: QueryType::NameSearch,
            confidence: 0.85,
            search_strategy: strategy,
            extracted_entities: ExtractedEntities {
                names: names.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
            language: Language::English,
        }
    }

    #[test]
    fn plan_follows_strategy_and_flags() {
        let opts = SearchOptions::default();
        assert_eq!(plan(&classification(SearchStrategy::ExactMatch, &[]), &opts), vec![Strategy::Exact]);
        assert_eq!(
            plan(&classification(SearchStrategy::ExactMatch, &["Glycerin"]), &opts),
            vec![Strategy::Exact, Strategy::Metadata]
        );
        let no_fuzzy = SearchOptions { enable_fuzzy_match: false, ..SearchOptions::default() };
        assert_eq!(
            plan(&classification(SearchStrategy::FuzzyMatch, &["x"]), &no_fuzzy),
            vec![Strategy::Metadata, Strategy::Semantic]
        );
        assert!(plan(&classification(SearchStrategy::Hybrid, &[]), &opts).is_empty());
    }
}
