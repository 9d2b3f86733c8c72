use serde::Deserialize;
use config::{Config, Environment, File};
use anyhow::Result;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    pub kg_path: String,
    pub mim2gene_path: String,
    pub abstracts_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            kg_path: "data/kg_definitional_data.json".to_string(),
            mim2gene_path: "data/mim2gene.txt".to_string(),
            abstracts_path: "data/abstracts.jsonl".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub qdrant_url: String,
    pub collection: String,
    pub vector_size: u64,
    pub top_k: u64,
    pub embedding_base_url: String,
    pub embedding_model: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            qdrant_url: "http://localhost:6334".to_string(),
            collection: "pubmed_abstracts".to_string(),
            // BioBERT 句向量维度
            vector_size: 768,
            top_k: 10,
            embedding_base_url: "http://localhost:8080/v1".to_string(),
            embedding_model: "pritamdeka/BioBERT-mnli-snli-scinli-scitail-mednli-stsb".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub timeout_sec: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.1,
            timeout_sec: 120,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    /// Titles in the Sources list are cut to this many characters.
    pub title_max_chars: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { title_max_chars: 100 }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub display: DisplayConfig,
}

impl AppConfig {
    /// `rag_config.toml` is optional; `RAG__LLM__MODEL=...` style variables override it.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name("rag_config").required(false))
            .add_source(Environment::with_prefix("RAG").separator("__"))
            .build()?;

        let cfg: AppConfig = settings.try_deserialize()?;
        Ok(cfg)
    }

    #[cfg(test)]
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(text, ::config::FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
