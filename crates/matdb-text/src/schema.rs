use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

pub const TOKENIZER: &str = "material_text";

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	schema_builder.add_text_field("code", STRING | STORED);
	let text_indexing = TextFieldIndexing::default()
		.set_tokenizer(TOKENIZER)
		.set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let text_options = TextOptions::default().set_indexing_options(text_indexing);
	schema_builder.add_text_field("names", text_options);
	schema_builder.add_text_field("record", STORED);
	schema_builder.build()
}

pub fn register_tokenizer(index: &Index) {
	let stop_words = ["a", "an", "and", "for", "of", "the", "with", "or", "in", "to"];
	let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(stop_words.into_iter().map(|s| s.to_string())))
		.build();
	index.tokenizers().register(TOKENIZER, tokenizer);
}

#[derive(Debug, Clone, Copy)]
pub struct MaterialFields {
	pub code: Field,
	pub names: Field,
	pub record: Field,
}

impl MaterialFields {
	pub fn from_schema(schema: &Schema) -> anyhow::Result<Self> {
		Ok(Self {
			code: schema.get_field("code")?,
			names: schema.get_field("names")?,
			record: schema.get_field("record")?,
		})
	}
}
