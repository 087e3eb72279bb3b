use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tantivy::collector::{DocSetCollector, TopDocs};
use tantivy::query::{AllQuery, BooleanQuery, FuzzyTermQuery, Occur, Query, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{doc, DocAddress, Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument, Term};

use matdb_core::fuzzy::fuzzy_match_score;
use matdb_core::store::normalize_code;
use matdb_core::traits::MaterialStore;
use matdb_core::types::{MaterialDocument, MaterialField};

use crate::schema::{build_schema, register_tokenizer, MaterialFields};

const WRITER_HEAP: usize = 50_000_000;
const MAX_EDIT_DISTANCE: u8 = 2;
const MIN_FUZZY_TOKEN: usize = 3;

pub struct TantivyMaterialStore {
	reader: IndexReader,
	writer: Mutex<IndexWriter>,
	fields: MaterialFields,
}

impl TantivyMaterialStore {
	/// Create a fresh index in `index_dir`, wiping any previous content.
	pub fn create(index_dir: &Path) -> Result<Self> {
		if index_dir.exists() { std::fs::remove_dir_all(index_dir)?; }
		std::fs::create_dir_all(index_dir)?;
		Self::from_index(Index::create_in_dir(index_dir, build_schema())?)
	}

	pub fn open(index_dir: &Path) -> Result<Self> {
		let index = Index::open_in_dir(index_dir).with_context(|| format!("opening index at {}", index_dir.display()))?;
		Self::from_index(index)
	}

	pub fn open_or_create(index_dir: &Path) -> Result<Self> {
		if index_dir.join("meta.json").exists() { Self::open(index_dir) } else { Self::create(index_dir) }
	}

	pub fn in_memory() -> Result<Self> {
		Self::from_index(Index::create_in_ram(build_schema()))
	}

	fn from_index(index: Index) -> Result<Self> {
		register_tokenizer(&index);
		let fields = MaterialFields::from_schema(&index.schema())?;
		let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
		let writer = index.writer(WRITER_HEAP)?;
		Ok(Self { reader, writer: Mutex::new(writer), fields })
	}

	/// Insert or replace records by code. Records without a code are skipped.
	pub fn index_documents(&self, docs: &[MaterialDocument]) -> Result<usize> {
		let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
		let mut count = 0;
		for doc in docs {
			let code = normalize_code(&doc.code);
			if code.is_empty() { continue; }
			let record = MaterialDocument { code: code.clone(), ..doc.clone() };
			let names = format!("{} {}", record.trade_name, record.inci_name);
			writer.delete_term(Term::from_field_text(self.fields.code, &code));
			writer.add_document(doc!(
				self.fields.code => code,
				self.fields.names => names,
				self.fields.record => serde_json::to_string(&record)?,
			))?;
			count += 1;
		}
		writer.commit()?;
		self.reader.reload()?;
		tracing::debug!(count, "indexed material records");
		Ok(count)
	}

	pub fn remove(&self, code: &str) -> Result<()> {
		let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
		writer.delete_term(Term::from_field_text(self.fields.code, &normalize_code(code)));
		writer.commit()?;
		self.reader.reload()?;
		Ok(())
	}

	pub fn len(&self) -> u64 { self.reader.searcher().num_docs() }

	pub fn is_empty(&self) -> bool { self.len() == 0 }

	fn load(&self, searcher: &Searcher, addr: DocAddress) -> Result<MaterialDocument> {
		let doc: TantivyDocument = searcher.doc(addr)?;
		let raw = doc.get_first(self.fields.record).and_then(|v| v.as_str()).context("stored record missing")?;
		Ok(serde_json::from_str(raw)?)
	}

	/// Every stored record, ordered by code.
	pub fn documents(&self) -> Result<Vec<MaterialDocument>> {
		let searcher = self.reader.searcher();
		let addrs = searcher.search(&AllQuery, &DocSetCollector)?;
		let mut docs = addrs.into_iter().map(|addr| self.load(&searcher, addr)).collect::<Result<Vec<_>>>()?;
		docs.sort_by(|a, b| a.code.cmp(&b.code));
		Ok(docs)
	}
}

#[async_trait]
impl MaterialStore for TantivyMaterialStore {
	async fn find_by_code(&self, code: &str) -> Result<Option<MaterialDocument>> {
		let code = normalize_code(code);
		if code.is_empty() { return Ok(None); }
		let searcher = self.reader.searcher();
		let query = TermQuery::new(Term::from_field_text(self.fields.code, &code), IndexRecordOption::Basic);
		match searcher.search(&query, &TopDocs::with_limit(1))?.first() {
			Some((_, addr)) => Ok(Some(self.load(&searcher, *addr)?)),
			None => Ok(None),
		}
	}

	async fn search_by_field(
		&self,
		fields: &[MaterialField],
		pattern: &str,
		limit: usize,
	) -> Result<Vec<MaterialDocument>> {
		let needle = pattern.trim().to_lowercase();
		if needle.is_empty() || limit == 0 { return Ok(vec![]); }
		Ok(self
			.documents()?
			.into_iter()
			.filter(|doc| fields.iter().any(|f| doc.field(*f).to_lowercase().contains(&needle)))
			.take(limit)
			.collect())
	}

	async fn fuzzy_candidates(&self, text: &str, limit: usize) -> Result<Vec<MaterialDocument>> {
		if limit == 0 { return Ok(vec![]); }
		let tokens: Vec<String> = text
			.split(|c: char| !c.is_alphanumeric())
			.filter(|t| t.chars().count() >= MIN_FUZZY_TOKEN)
			.map(|t| t.to_lowercase())
			.collect();

		let searcher = self.reader.searcher();
		let mut found: Vec<MaterialDocument> = Vec::new();
		if !tokens.is_empty() {
			let clauses: Vec<(Occur, Box<dyn Query>)> = tokens
				.iter()
				.map(|t| {
					let q = FuzzyTermQuery::new(Term::from_field_text(self.fields.names, t), MAX_EDIT_DISTANCE, true);
					(Occur::Should, Box::new(q) as Box<dyn Query>)
				})
				.collect();
			for (_score, addr) in searcher.search(&BooleanQuery::new(clauses), &TopDocs::with_limit(limit))? {
				found.push(self.load(&searcher, addr)?);
			}
		}

		if found.len() < limit {
			// Thai names are not split into words by the tokenizer; fall back to
			// scoring stored names directly.
			let mut rest: Vec<(f32, MaterialDocument)> = self
				.documents()?
				.into_iter()
				.filter(|d| !found.iter().any(|f| f.code == d.code))
				.map(|d| (best_name_score(text, &d), d))
				.filter(|(score, _)| *score > 0.0)
				.collect();
			rest.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
			let room = limit - found.len();
			found.extend(rest.into_iter().take(room).map(|(_, d)| d));
		}
		Ok(found)
	}
}

fn best_name_score(text: &str, doc: &MaterialDocument) -> f32 {
	MaterialField::NAMES.iter().map(|f| fuzzy_match_score(text, doc.field(*f))).fold(0.0, f32::max)
}
