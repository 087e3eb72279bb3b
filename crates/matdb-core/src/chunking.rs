//! Dynamic chunking of material records for embedding and lookup.
//!
//! One [`MaterialDocument`] becomes a small, prioritized set of chunks:
//! identity chunks that are always emitted, field-group chunks emitted only
//! when their source fields are present, a broad-recall combined context and,
//! for records carrying Thai text, a Thai-labelled variant.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{
    contains_thai, Chunk, ChunkMetadata, ChunkType, EmbeddableDocument, MaterialDocument, MaterialField,
};

/// Extra characters a chunk may carry past `max_chunk_size`.
pub const SIZE_TOLERANCE: usize = 50;
/// `code_exact_match` text is always shorter than 200 characters.
pub const CODE_CHUNK_LIMIT: usize = 199;
pub const MAX_CONTEXT_WINDOWS: usize = 3;

const NAME_KEY_SUFFIX: &str = "name";
const FIELD_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_chunk_size: usize,
    pub chunk_overlap: usize,
    pub enable_thai_optimization: bool,
    pub enable_field_weighting: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_chunk_size: 500, chunk_overlap: 50, enable_thai_optimization: true, enable_field_weighting: true }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(Error::InvalidConfig("max_chunk_size must be positive".into()));
        }
        if self.chunk_overlap >= self.max_chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than max_chunk_size ({})",
                self.chunk_overlap, self.max_chunk_size
            )));
        }
        Ok(())
    }
}

/// Chunk one material record. Deterministic; a record with only a code still
/// yields its identity chunks and a combined context.
pub fn chunk(doc: &MaterialDocument, config: &ChunkingConfig) -> Vec<Chunk> {
    let code = doc.code.trim();
    let has_thai = document_has_thai(doc);
    let trade_name = doc.field(MaterialField::TradeName);
    let limit = config.max_chunk_size.max(1) + SIZE_TOLERANCE;

    let builder = ChunkBuilder { code, trade_name, has_thai, weighted: config.enable_field_weighting };
    let mut chunks = Vec::with_capacity(8);

    let primary = identity_text(code, trade_name, doc.field(MaterialField::InciName), limit);
    chunks.push(builder.build(base_id(code, ChunkType::PrimaryIdentifier), ChunkType::PrimaryIdentifier, primary));

    if !trade_name.is_empty() {
        let text = truncate_chars(&format!("{trade_name} ({code})"), limit);
        chunks.push(builder.build(name_key_id(code), ChunkType::PrimaryIdentifier, text));
    }

    chunks.push(builder.build(
        base_id(code, ChunkType::CodeExactMatch),
        ChunkType::CodeExactMatch,
        truncate_chars(code, CODE_CHUNK_LIMIT),
    ));

    let technical = labelled(&[
        ("Category", doc.field(MaterialField::Category)),
        ("Function", doc.field(MaterialField::Function)),
        ("Description", doc.field(MaterialField::Description)),
    ]);
    if !technical.is_empty() {
        chunks.push(builder.build(
            base_id(code, ChunkType::TechnicalSpecs),
            ChunkType::TechnicalSpecs,
            truncate_chars(&technical, limit),
        ));
    }

    let cost = format_cost(doc);
    let commercial = labelled(&[
        ("Supplier", doc.field(MaterialField::Supplier)),
        ("Cost", cost.as_str()),
        ("Company", doc.field(MaterialField::CompanyName)),
    ]);
    if !commercial.is_empty() {
        chunks.push(builder.build(
            base_id(code, ChunkType::CommercialInfo),
            ChunkType::CommercialInfo,
            truncate_chars(&commercial, limit),
        ));
    }

    let combined = labelled(&[
        ("Code", code),
        ("Trade name", trade_name),
        ("INCI name", doc.field(MaterialField::InciName)),
        ("Category", doc.field(MaterialField::Category)),
        ("Function", doc.field(MaterialField::Function)),
        ("Supplier", doc.field(MaterialField::Supplier)),
        ("Cost", cost.as_str()),
        ("Company", doc.field(MaterialField::CompanyName)),
        ("Description", doc.field(MaterialField::Description)),
    ]);
    for (i, window) in windows(&combined, config.max_chunk_size.max(1), config.chunk_overlap).into_iter().enumerate() {
        chunks.push(builder.build(context_id(code, i + 1), ChunkType::CombinedContext, window));
    }

    if config.enable_thai_optimization && has_thai {
        let thai = labelled(&[
            ("รหัส", code),
            ("ชื่อการค้า", trade_name),
            ("ชื่อ INCI", doc.field(MaterialField::InciName)),
            ("หมวดหมู่", doc.field(MaterialField::Category)),
            ("หน้าที่", doc.field(MaterialField::Function)),
            ("ผู้จำหน่าย", doc.field(MaterialField::Supplier)),
            ("บริษัท", doc.field(MaterialField::CompanyName)),
            ("รายละเอียด", doc.field(MaterialField::Description)),
        ]);
        chunks.push(builder.build(
            base_id(code, ChunkType::ThaiOptimized),
            ChunkType::ThaiOptimized,
            truncate_chars(&thai, limit),
        ));
    }

    chunks
}

/// 1:1, order-preserving projection for the embedding/index service.
pub fn chunks_to_documents(chunks: &[Chunk]) -> Vec<EmbeddableDocument> {
    chunks
        .iter()
        .map(|c| EmbeddableDocument { id: c.id.clone(), text: c.text.clone(), metadata: c.metadata.clone() })
        .collect()
}

/// Every chunk id `chunk` can ever produce for `code`. Deleting these before
/// an upsert leaves no orphans from an earlier, larger chunk set.
pub fn chunk_ids_for(code: &str) -> Vec<String> {
    let code = code.trim();
    let mut ids: Vec<String> = ChunkType::ALL.iter().map(|t| base_id(code, *t)).collect();
    ids.push(name_key_id(code));
    ids.extend((2..=MAX_CONTEXT_WINDOWS).map(|i| context_id(code, i)));
    ids
}

struct ChunkBuilder<'a> {
    code: &'a str,
    trade_name: &'a str,
    has_thai: bool,
    weighted: bool,
}

impl ChunkBuilder<'_> {
    fn build(&self, id: String, chunk_type: ChunkType, text: String) -> Chunk {
        let priority = if self.weighted { chunk_type.priority() } else { 1.0 };
        let metadata = ChunkMetadata {
            code: self.code.to_string(),
            chunk_type,
            priority,
            trade_name: (!self.trade_name.is_empty()).then(|| self.trade_name.to_string()),
            has_thai: self.has_thai,
        };
        Chunk { id, text, chunk_type, priority, metadata }
    }
}

fn base_id(code: &str, chunk_type: ChunkType) -> String {
    format!("{code}::{}", chunk_type.as_str())
}

fn name_key_id(code: &str) -> String {
    format!("{}::{NAME_KEY_SUFFIX}", base_id(code, ChunkType::PrimaryIdentifier))
}

fn context_id(code: &str, window: usize) -> String {
    let base = base_id(code, ChunkType::CombinedContext);
    if window <= 1 { base } else { format!("{base}::{window}") }
}

fn document_has_thai(doc: &MaterialDocument) -> bool {
    [
        MaterialField::Code,
        MaterialField::TradeName,
        MaterialField::InciName,
        MaterialField::Category,
        MaterialField::Function,
        MaterialField::Supplier,
        MaterialField::CompanyName,
        MaterialField::Description,
    ]
    .into_iter()
    .any(|f| contains_thai(doc.field(f)))
        || contains_thai(&doc.unit)
}

fn format_cost(doc: &MaterialDocument) -> String {
    match doc.cost_per_unit {
        Some(cost) if !doc.unit.trim().is_empty() => format!("{cost} per {}", doc.unit.trim()),
        Some(cost) => format!("{cost}"),
        None => String::new(),
    }
}

fn labelled(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR)
}

/// Code and trade name first; the INCI name only gets whatever room is left
/// under `limit`.
fn identity_text(code: &str, trade_name: &str, inci_name: &str, limit: usize) -> String {
    let head = labelled(&[("Code", code), ("Trade name", trade_name)]);
    if inci_name.is_empty() {
        return truncate_chars(&head, limit);
    }
    let label = if head.is_empty() { "INCI name: ".to_string() } else { format!("{FIELD_SEPARATOR}INCI name: ") };
    let room = limit.saturating_sub(head.chars().count() + label.chars().count());
    if room == 0 {
        return truncate_chars(&head, limit);
    }
    format!("{head}{label}{}", truncate_chars(inci_name, room))
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

fn windows(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= size + SIZE_TOLERANCE {
        return vec![text.to_string()];
    }
    let step = size.saturating_sub(overlap).max(1);
    let mut out = Vec::new();
    let mut start = 0;
    while start < chars.len() && out.len() < MAX_CONTEXT_WINDOWS {
        let end = (start + size).min(chars.len());
        out.push(chars[start..end].iter().collect::<String>().trim().to_string());
        if end >= chars.len() {
            break;
        }
        start += step;
    }
    out
}
