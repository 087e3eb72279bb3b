use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use matdb_classify::classify;
use matdb_core::config::{expand_path, Config, Settings};
use matdb_core::store::{load_materials, InMemoryMaterialStore};
use matdb_core::traits::{Embedder, MaterialStore, VectorStore};
use matdb_core::types::MaterialDocument;
use matdb_core::{chunk, chunks_to_documents};
use matdb_embed::get_default_embedder;
use matdb_hybrid::{HybridSearchService, MaterialIndexer};
use matdb_text::TantivyMaterialStore;
use matdb_vector::{open_vector_store, CachedEmbedder, MEMORY_URI};

#[derive(Parser)]
#[command(name = "matdb", version, about = "Raw-material lookup: classify, chunk, index and search")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the classification of a query
    Classify { query: String },
    /// Print the chunks produced for material records
    Chunk {
        /// Material JSON/JSONL file or directory (defaults to store.materials_path)
        #[arg(long)]
        materials: Option<PathBuf>,
        /// Only chunk this code
        #[arg(long)]
        code: Option<String>,
        /// Print the embeddable projection instead of full chunks
        #[arg(long)]
        documents: bool,
    },
    /// Load materials into the structured store and the vector index
    Index {
        #[arg(long)]
        materials: Option<PathBuf>,
        /// Skip the vector index
        #[arg(long)]
        skip_vectors: bool,
    },
    /// Run a hybrid search
    Search {
        query: String,
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        threshold: Option<f32>,
        /// Structured store only
        #[arg(long)]
        no_vectors: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,matdb=info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("loading configuration")?;
    let settings = config.settings()?;

    match cli.command {
        Command::Classify { query } => {
            println!("{}", serde_json::to_string_pretty(&classify(&query))?);
        }
        Command::Chunk { materials, code, documents } => {
            let docs = load(&settings, materials)?;
            for doc in docs.iter().filter(|d| code.as_deref().map_or(true, |c| d.code.eq_ignore_ascii_case(c))) {
                let chunks = chunk(doc, &settings.chunking);
                let out = if documents {
                    serde_json::to_string_pretty(&chunks_to_documents(&chunks))?
                } else {
                    serde_json::to_string_pretty(&chunks)?
                };
                println!("{out}");
            }
        }
        Command::Index { materials, skip_vectors } => {
            let docs = load(&settings, materials)?;
            if !settings.store.index_dir.is_empty() {
                let dir = expand_path(&settings.store.index_dir);
                let store = TantivyMaterialStore::create(&dir)?;
                let written = store.index_documents(&docs)?;
                tracing::info!(records = written, dir = %dir.display(), "structured store rebuilt");
            }
            if !skip_vectors {
                if settings.vector.uri == MEMORY_URI {
                    tracing::warn!("vector uri is `memory`; nothing persists after this run");
                }
                let embedder = embedder()?;
                let vectors = open_vector_store(&settings.vector, embedder.dim()).await?;
                index_vectors(&settings, vectors, embedder, &docs).await?;
            }
        }
        Command::Search { query, top_k, threshold, no_vectors } => {
            let mut options = settings.search.clone();
            if let Some(k) = top_k { options.top_k = k; }
            if let Some(t) = threshold { options.similarity_threshold = t; }

            let store = structured_store(&settings)?;
            let results = if no_vectors {
                HybridSearchService::structured_only(store).search(&query, &options).await?
            } else {
                let embedder = embedder()?;
                let vectors = open_vector_store(&settings.vector, embedder.dim()).await?;
                if settings.vector.uri == MEMORY_URI {
                    let docs = load(&settings, None)?;
                    index_vectors(&settings, vectors.clone(), embedder.clone(), &docs).await?;
                }
                HybridSearchService::new(store, vectors, embedder, settings.vector.collection.clone())
                    .search(&query, &options)
                    .await?
            };
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }
    Ok(())
}

fn load(settings: &Settings, materials: Option<PathBuf>) -> Result<Vec<MaterialDocument>> {
    let path = materials.unwrap_or_else(|| expand_path(&settings.store.materials_path));
    load_materials(&path).with_context(|| format!("loading materials from {}", path.display()))
}

fn embedder() -> Result<Arc<dyn Embedder>> {
    Ok(Arc::new(CachedEmbedder::new(get_default_embedder()?)))
}

/// Tantivy index when one is configured and present, otherwise the material
/// files loaded into memory.
fn structured_store(settings: &Settings) -> Result<Arc<dyn MaterialStore>> {
    if !settings.store.index_dir.is_empty() {
        let dir = expand_path(&settings.store.index_dir);
        if dir.join("meta.json").exists() {
            return Ok(Arc::new(TantivyMaterialStore::open(&dir)?));
        }
        tracing::warn!(dir = %dir.display(), "no structured index found; loading material files");
    }
    Ok(Arc::new(InMemoryMaterialStore::from_documents(load(settings, None)?)))
}

async fn index_vectors(
    settings: &Settings,
    vectors: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    docs: &[MaterialDocument],
) -> Result<()> {
    let collection = settings.vector.collection.clone();
    let indexer = MaterialIndexer::new(vectors, embedder, collection, settings.chunking.clone())?;
    let pb = ProgressBar::new(docs.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} materials {msg}",
        )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    let mut chunks = 0usize;
    for doc in docs {
        pb.set_message(doc.code.clone());
        chunks += indexer.index_material(doc).await?;
        pb.inc(1);
    }
    pb.finish_with_message("done");
    tracing::info!(materials = docs.len(), chunks, collection = %settings.vector.collection, "vector index updated");
    Ok(())
}
