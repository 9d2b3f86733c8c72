use async_trait::async_trait;
use qdrant_client::{
    Qdrant,
    Payload,
    qdrant::{
        vectors_config::Config, CountPoints, CreateCollection, Distance, PointStruct, SearchPoints,
        UpsertPoints, VectorParams, VectorsConfig, Value as QdrantValue,
    },
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

use super::embedder::Embedder;
use crate::config::app_config::RetrievalConfig;
use crate::errors::{AssistantError, AssistantResult};

const UPSERT_BATCH: usize = 64;

/// One abstract returned by the similarity search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievedAbstract {
    pub pmid: String,
    pub title: String,
    pub content: String,
}

#[async_trait]
pub trait AbstractSearch: Send + Sync {
    async fn similarity_search(&self, query: &str, k: u64) -> AssistantResult<Vec<RetrievedAbstract>>;
}

/// Corpus line: `{"pmid": 12345, "title": "...", "abstract": "..."}`.
#[derive(Debug, Deserialize)]
struct AbstractLine {
    pmid: serde_json::Value,
    #[serde(default)]
    title: String,
    #[serde(rename = "abstract", alias = "page_content", alias = "text")]
    content: String,
}

fn pmid_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn payload_text(payload: &HashMap<String, QdrantValue>, key: &str) -> String {
    match payload.get(key) {
        Some(v) => v
            .as_str()
            .map(|s| s.to_string())
            .or_else(|| v.as_integer().map(|i| i.to_string()))
            .unwrap_or_default(),
        None => String::new(),
    }
}

/// PubMed abstracts in Qdrant. Payload: `pmid`, `title`, `page_content`.
pub struct AbstractStore {
    qdrant: Qdrant,
    embedder: Embedder,
    collection: String,
    vector_size: u64,
}

impl AbstractStore {
    pub fn new(cfg: &RetrievalConfig, embedder: Embedder) -> AssistantResult<Self> {
        let qdrant = Qdrant::from_url(&cfg.qdrant_url).build()?;
        Ok(Self {
            qdrant,
            embedder,
            collection: cfg.collection.clone(),
            vector_size: cfg.vector_size,
        })
    }

    pub async fn init(&self) -> AssistantResult<()> {
        if !self.qdrant.collection_exists(&self.collection).await? {
            info!("📦 Creating Qdrant collection '{}' with dim {}...", self.collection, self.vector_size);
            self.qdrant.create_collection(CreateCollection {
                collection_name: self.collection.clone(),
                vectors_config: Some(VectorsConfig {
                    config: Some(Config::Params(VectorParams {
                        size: self.vector_size,
                        distance: Distance::Cosine.into(),
                        ..Default::default()
                    })),
                }),
                ..Default::default()
            }).await?;
            info!("✅ Qdrant Collection Created.");
        }
        Ok(())
    }

    pub async fn count(&self) -> AssistantResult<u64> {
        let count_info = self.qdrant.count(CountPoints {
            collection_name: self.collection.clone(),
            exact: Some(true),
            ..Default::default()
        }).await?;
        Ok(count_info.result.map(|r| r.count).unwrap_or(0))
    }

    /// Embeds and upserts a JSONL corpus. Returns the number of abstracts stored.
    pub async fn ingest_jsonl(&self, path: impl AsRef<Path>) -> AssistantResult<usize> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AssistantError::Resource(format!("cannot read corpus {}: {}", path.display(), e))
        })?;

        let mut batch: Vec<PointStruct> = Vec::with_capacity(UPSERT_BATCH);
        let mut stored = 0usize;

        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let item: AbstractLine = match serde_json::from_str(line) {
                Ok(v) => v,
                Err(e) => {
                    warn!("⚠️ Skipping corpus line {}: {}", lineno + 1, e);
                    continue;
                }
            };
            if item.content.trim().is_empty() {
                continue;
            }

            let pmid = pmid_text(&item.pmid);
            let embedding = self.embedder.embed(&item.content).await?;
            let payload: Payload = json!({
                "pmid": pmid,
                "title": item.title,
                "page_content": item.content,
            })
            .try_into()?;

            // 数字 PMID 直接作为点 ID，重复导入会覆盖而不是重复
            let point = match pmid.parse::<u64>() {
                Ok(id) => PointStruct::new(id, embedding, payload),
                Err(_) => PointStruct::new(Uuid::new_v4().to_string(), embedding, payload),
            };
            batch.push(point);

            if batch.len() >= UPSERT_BATCH {
                stored += self.flush(&mut batch).await?;
                info!("📥 {} abstracts stored so far", stored);
            }
        }
        stored += self.flush(&mut batch).await?;
        Ok(stored)
    }

    async fn flush(&self, batch: &mut Vec<PointStruct>) -> AssistantResult<usize> {
        if batch.is_empty() {
            return Ok(0);
        }
        let points = std::mem::take(batch);
        let n = points.len();
        self.qdrant.upsert_points(UpsertPoints {
            collection_name: self.collection.clone(),
            points,
            wait: Some(true),
            ..Default::default()
        }).await?;
        Ok(n)
    }
}

#[async_trait]
impl AbstractSearch for AbstractStore {
    async fn similarity_search(&self, query: &str, k: u64) -> AssistantResult<Vec<RetrievedAbstract>> {
        let embedding = self.embedder.embed(query).await?;

        let hits = self.qdrant.search_points(SearchPoints {
            collection_name: self.collection.clone(),
            vector: embedding,
            limit: k,
            with_payload: Some(true.into()),
            ..Default::default()
        }).await?;

        Ok(hits
            .result
            .into_iter()
            .map(|point| RetrievedAbstract {
                pmid: payload_text(&point.payload, "pmid"),
                title: payload_text(&point.payload, "title"),
                content: payload_text(&point.payload, "page_content"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_line_accepts_numeric_and_string_pmids() {
        let a: AbstractLine = serde_json::from_str(r#"{"pmid": 31234567, "title": "T", "abstract": "A"}"#).unwrap();
        assert_eq!(pmid_text(&a.pmid), "31234567");
        let b: AbstractLine = serde_json::from_str(r#"{"pmid": " 42 ", "page_content": "B"}"#).unwrap();
        assert_eq!(pmid_text(&b.pmid), "42");
        assert_eq!(b.title, "");
        assert_eq!(b.content, "B");
    }

    #[test]
    fn payload_values_are_read_as_text() {
        let mut payload = HashMap::new();
        payload.insert("pmid".to_string(), QdrantValue::from(12345_i64));
        payload.insert("title".to_string(), QdrantValue::from("Gene therapy for SMA".to_string()));
        assert_eq!(payload_text(&payload, "pmid"), "12345");
        assert_eq!(payload_text(&payload, "title"), "Gene therapy for SMA");
        assert_eq!(payload_text(&payload, "page_content"), "");
    }
}
