//! LanceDB-backed [`VectorStore`]. Each collection is one table keyed by
//! chunk id; upserts go through `merge_insert` so re-indexing a chunk replaces
//! its row in place.
use anyhow::{anyhow, bail, Context, Result};
use arrow_array::{
	Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
	TimestampMillisecondArray,
};
use arrow_array::types::Float32Type;
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType};
use std::sync::Arc;

use matdb_core::traits::VectorStore;
use matdb_core::types::{ChunkMetadata, VectorHit, VectorRecord};

use crate::schema::build_chunk_schema;
use crate::table::{ensure_table, open_db, table_exists};

pub struct LanceVectorStore {
	conn: Connection,
	dim: usize,
}

impl LanceVectorStore {
	pub async fn connect(uri: &str, dim: usize) -> Result<Self> {
		let conn = open_db(uri).await.with_context(|| format!("opening LanceDB at {uri}"))?;
		Ok(Self { conn, dim })
	}

	pub fn dim(&self) -> usize { self.dim }

	pub async fn count(&self, collection: &str) -> Result<usize> {
		if !table_exists(&self.conn, collection).await? { return Ok(0); }
		let table = self.conn.open_table(collection).execute().await?;
		Ok(table.count_rows(None).await?)
	}

	fn records_to_batch(&self, records: &[VectorRecord]) -> Result<RecordBatch> {
		let schema = build_chunk_schema(self.dim as i32);
		let now = Utc::now().timestamp_millis();
		let mut ids = Vec::with_capacity(records.len());
		let mut codes = Vec::with_capacity(records.len());
		let mut chunk_types = Vec::with_capacity(records.len());
		let mut priorities = Vec::with_capacity(records.len());
		let mut texts = Vec::with_capacity(records.len());
		let mut metadata = Vec::with_capacity(records.len());
		let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(records.len());
		for r in records {
			if r.vector.len() != self.dim {
				bail!("vector for {} has dim {}, expected {}", r.id, r.vector.len(), self.dim);
			}
			ids.push(r.id.clone());
			codes.push(r.metadata.code.clone());
			chunk_types.push(r.metadata.chunk_type.as_str().to_string());
			priorities.push(r.metadata.priority);
			texts.push(r.text.clone());
			metadata.push(serde_json::to_string(&r.metadata)?);
			vectors.push(Some(r.vector.iter().map(|&x| Some(x)).collect()));
		}
		let batch = RecordBatch::try_new(schema, vec![
			Arc::new(StringArray::from(ids)),
			Arc::new(StringArray::from(codes)),
			Arc::new(StringArray::from(chunk_types)),
			Arc::new(Float32Array::from(priorities)),
			Arc::new(StringArray::from(texts)),
			Arc::new(StringArray::from(metadata)),
			Arc::new(TimestampMillisecondArray::from(vec![now; records.len()])),
			Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
				vectors.into_iter(),
				self.dim as i32,
			)),
		])?;
		Ok(batch)
	}
}

#[async_trait]
impl VectorStore for LanceVectorStore {
	async fn upsert(&self, collection: &str, records: &[VectorRecord]) -> Result<()> {
		if records.is_empty() { return Ok(()); }
		let batch = self.records_to_batch(records)?;
		let schema = batch.schema();
		ensure_table(&self.conn, collection, schema.clone()).await?;
		let table = self.conn.open_table(collection).execute().await?;
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
		let mut mi = table.merge_insert(&["id"]);
		mi.when_matched_update_all(None).when_not_matched_insert_all();
		mi.execute(reader).await?;
		tracing::debug!(collection, rows = records.len(), "upserted chunk vectors");
		Ok(())
	}

	async fn query(&self, collection: &str, vector: &[f32], top_k: usize) -> Result<Vec<VectorHit>> {
		if top_k == 0 || !table_exists(&self.conn, collection).await? { return Ok(vec![]); }
		if vector.len() != self.dim {
			bail!("query vector has dim {}, expected {}", vector.len(), self.dim);
		}
		let table = self.conn.open_table(collection).execute().await?;
		let mut stream = table
			.vector_search(vector.to_vec())?
			.distance_type(DistanceType::Cosine)
			.limit(top_k)
			.execute()
			.await?;
		let mut hits = Vec::new();
		while let Some(batch) = stream.try_next().await? {
			let ids = string_column(&batch, "id")?;
			let metadata = string_column(&batch, "metadata_json")?;
			let distances = batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<Float32Array>());
			for i in 0..batch.num_rows() {
				let metadata: ChunkMetadata = serde_json::from_str(metadata.value(i))?;
				let score = match distances {
					Some(d) if d.is_valid(i) => 1.0 - d.value(i),
					_ => 0.0,
				};
				hits.push(VectorHit { id: ids.value(i).to_string(), score, metadata });
			}
		}
		Ok(hits)
	}

	async fn delete(&self, collection: &str, ids: &[String]) -> Result<()> {
		if ids.is_empty() || !table_exists(&self.conn, collection).await? { return Ok(()); }
		let table = self.conn.open_table(collection).execute().await?;
		let list = ids.iter().map(|id| format!("'{}'", id.replace('\'', "''"))).collect::<Vec<_>>().join(", ");
		table.delete(&format!("id IN ({list})")).await?;
		Ok(())
	}
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
	batch
		.column_by_name(name)
		.and_then(|c| c.as_any().downcast_ref::<StringArray>())
		.ok_or_else(|| anyhow!("{name} column missing"))
}
