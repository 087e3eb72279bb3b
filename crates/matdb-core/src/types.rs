//! Domain types shared by the classifier, chunker, stores and search engine.

use serde::{Deserialize, Serialize};

pub type ChunkId = String;

/// A raw-material record as maintained by product management.
///
/// `code` is the canonical identifier (uppercase alphanumeric, e.g. `RM000001`).
/// Text fields that are unknown are kept as empty strings so that every
/// consumer can treat "absent" and "blank" the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialDocument {
    pub code: String,
    pub trade_name: String,
    pub inci_name: String,
    pub category: String,
    pub function: String,
    pub supplier: String,
    pub cost_per_unit: Option<f64>,
    pub unit: String,
    pub company_name: String,
    pub description: Option<String>,
}

impl MaterialDocument {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into(), ..Self::default() }
    }

    pub fn with_trade_name(mut self, trade_name: impl Into<String>) -> Self {
        self.trade_name = trade_name.into();
        self
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Value of a single text field, trimmed.
    pub fn field(&self, field: MaterialField) -> &str {
        let raw = match field {
            MaterialField::Code => &self.code,
            MaterialField::TradeName => &self.trade_name,
            MaterialField::InciName => &self.inci_name,
            MaterialField::Category => &self.category,
            MaterialField::Function => &self.function,
            MaterialField::Supplier => &self.supplier,
            MaterialField::CompanyName => &self.company_name,
            MaterialField::Description => self.description(),
        };
        raw.trim()
    }
}

/// Searchable text fields of a [`MaterialDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MaterialField {
    Code,
    TradeName,
    InciName,
    Category,
    Function,
    Supplier,
    CompanyName,
    Description,
}

impl MaterialField {
    pub const NAMES: [MaterialField; 2] = [MaterialField::TradeName, MaterialField::InciName];
    pub const PROPERTIES: [MaterialField; 3] =
        [MaterialField::Function, MaterialField::Category, MaterialField::Description];

    pub fn as_str(self) -> &'static str {
        match self {
            MaterialField::Code => "code",
            MaterialField::TradeName => "tradeName",
            MaterialField::InciName => "inciName",
            MaterialField::Category => "category",
            MaterialField::Function => "function",
            MaterialField::Supplier => "supplier",
            MaterialField::CompanyName => "companyName",
            MaterialField::Description => "description",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    ExactCode,
    NameSearch,
    PropertySearch,
    DescriptionSearch,
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    ExactMatch,
    FuzzyMatch,
    SemanticSearch,
    /// Emitted for non-domain input; signals "do not run domain retrieval".
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    Thai,
    Mixed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub codes: Vec<String>,
    pub names: Vec<String>,
    pub properties: Vec<String>,
}

impl ExtractedEntities {
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty() && self.names.is_empty() && self.properties.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryClassification {
    pub is_raw_materials_query: bool,
    pub query_type: QueryType,
    pub confidence: f32,
    pub search_strategy: SearchStrategy,
    pub extracted_entities: ExtractedEntities,
    pub language: Language,
}

impl QueryClassification {
    /// True when the caller asked for one or more identifier codes.
    pub fn has_exact_code_intent(&self) -> bool {
        self.query_type == QueryType::ExactCode
    }
}

/// Chunk kinds with their fixed priority tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    PrimaryIdentifier,
    CodeExactMatch,
    TechnicalSpecs,
    CommercialInfo,
    CombinedContext,
    ThaiOptimized,
}

impl ChunkType {
    pub const ALL: [ChunkType; 6] = [
        ChunkType::PrimaryIdentifier,
        ChunkType::CodeExactMatch,
        ChunkType::TechnicalSpecs,
        ChunkType::CommercialInfo,
        ChunkType::CombinedContext,
        ChunkType::ThaiOptimized,
    ];

    pub fn priority(self) -> f32 {
        match self {
            ChunkType::PrimaryIdentifier | ChunkType::CodeExactMatch => 1.0,
            ChunkType::TechnicalSpecs | ChunkType::CombinedContext | ChunkType::ThaiOptimized => 0.9,
            ChunkType::CommercialInfo => 0.85,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChunkType::PrimaryIdentifier => "primary_identifier",
            ChunkType::CodeExactMatch => "code_exact_match",
            ChunkType::TechnicalSpecs => "technical_specs",
            ChunkType::CommercialInfo => "commercial_info",
            ChunkType::CombinedContext => "combined_context",
            ChunkType::ThaiOptimized => "thai_optimized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    pub code: String,
    pub chunk_type: ChunkType,
    pub priority: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_name: Option<String>,
    #[serde(default)]
    pub has_thai: bool,
}

/// A bounded span of derived text, the unit of embedding and indexing.
///
/// Chunks are produced deterministically from one [`MaterialDocument`] and are
/// never mutated; re-chunking a code supersedes the previous set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub chunk_type: ChunkType,
    pub priority: f32,
    pub metadata: ChunkMetadata,
}

/// Projection of a [`Chunk`] handed to the embedding/index service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddableDocument {
    pub id: ChunkId,
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// A chunk together with its embedding, ready for upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: ChunkId,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// One nearest-neighbour hit. `score` is a similarity, higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorHit {
    pub id: ChunkId,
    pub score: f32,
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Metadata,
    Fuzzy,
    Semantic,
}

impl MatchType {
    /// Lower rank wins ties between equal scores.
    pub fn rank(self) -> u8 {
        match self {
            MatchType::Exact => 0,
            MatchType::Metadata => 1,
            MatchType::Fuzzy => 2,
            MatchType::Semantic => 3,
        }
    }

    pub fn is_structured(self) -> bool {
        matches!(self, MatchType::Exact | MatchType::Metadata)
    }
}

/// Indicates which backend produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    StructuredStore,
    VectorIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub document: MaterialDocument,
    pub score: f32,
    pub match_type: MatchType,
    pub confidence: f32,
    pub matched_fields: Vec<String>,
    pub source: ResultSource,
}

pub fn is_thai_char(c: char) -> bool {
    ('\u{0E00}'..='\u{0E7F}').contains(&c)
}

pub fn contains_thai(s: &str) -> bool {
    s.chars().any(is_thai_char)
}
