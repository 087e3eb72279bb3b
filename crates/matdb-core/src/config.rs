//! Configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys separated by `__`, e.g. `APP_SEARCH__TOP_K=5`). Every section
//! has defaults, so a missing file yields a usable configuration.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::chunking::ChunkingConfig;
use crate::error::{Error, Result};

/// Per-request search options. Validated eagerly by the search service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub top_k: usize,
    pub similarity_threshold: f32,
    pub enable_exact_match: bool,
    pub enable_metadata_filter: bool,
    pub enable_fuzzy_match: bool,
    pub enable_semantic_search: bool,
    /// Budget for the structured-store strategies.
    pub strategy_timeout_ms: u64,
    /// Budget for the embedding + vector-index strategy.
    pub vector_timeout_ms: u64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: 10,
            similarity_threshold: 0.5,
            enable_exact_match: true,
            enable_metadata_filter: true,
            enable_fuzzy_match: true,
            enable_semantic_search: true,
            strategy_timeout_ms: 2_000,
            vector_timeout_ms: 5_000,
        }
    }
}

impl SearchOptions {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(Error::InvalidConfig(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.strategy_timeout_ms == 0 || self.vector_timeout_ms == 0 {
            return Err(Error::InvalidConfig("strategy timeouts must be positive".into()));
        }
        Ok(())
    }

    pub fn strategy_timeout(&self) -> Duration {
        Duration::from_millis(self.strategy_timeout_ms)
    }

    pub fn vector_timeout(&self) -> Duration {
        Duration::from_millis(self.vector_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorSettings {
    /// `memory` for the in-process index, anything else is a LanceDB URI.
    pub uri: String,
    pub collection: String,
}

impl Default for VectorSettings {
    fn default() -> Self {
        Self { uri: "../dev_data/indexes/lancedb".to_string(), collection: "material_chunks".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Directory (or single file) of material JSON / JSONL records.
    pub materials_path: String,
    /// Tantivy index directory; empty keeps the store in memory.
    pub index_dir: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { materials_path: "../dev_data/materials".to_string(), index_dir: String::new() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchOptions,
    pub chunking: ChunkingConfig,
    pub vector: VectorSettings,
    pub store: StoreSettings,
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment.extract().map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))
    }

    fn validate(&self) -> anyhow::Result<()> {
        let settings = self.settings()?;
        settings.search.validate()?;
        settings.chunking.validate()?;
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
