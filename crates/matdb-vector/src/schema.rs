use arrow_schema::{DataType, Field, Schema, TimeUnit};
use std::sync::Arc;

/// Columns of a chunk collection. `metadata_json` carries the full chunk
/// metadata; `code`, `chunk_type` and `priority` are duplicated for filtering.
pub fn build_chunk_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("id", DataType::Utf8, false),
		Field::new("code", DataType::Utf8, false),
		Field::new("chunk_type", DataType::Utf8, false),
		Field::new("priority", DataType::Float32, false),
		Field::new("text", DataType::Utf8, false),
		Field::new("metadata_json", DataType::Utf8, false),
		Field::new("indexed_at", DataType::Timestamp(TimeUnit::Millisecond, None), false),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}
