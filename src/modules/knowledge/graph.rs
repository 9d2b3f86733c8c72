use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::errors::{AssistantError, AssistantResult};
use super::diseases;

pub const KG_NOT_FOUND: &str = "No specific rare disease definitional data found in knowledge graph.";

/// One Orphanet class as exported from the triple store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KgRecord {
    pub uri: Option<String>,
    pub label: Option<String>,
    pub comment: Option<String>,
    #[serde(rename = "dbXref")]
    pub db_xref: Option<Value>,
    #[serde(rename = "parentLabel")]
    pub parent_label: Option<String>,
}

/// Quoted list item as the exporter's list literal writes it: `'OMIM:306700'`.
fn quoted(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\");
    if s.contains('\'') && !s.contains('"') {
        format!("\"{}\"", escaped)
    } else {
        format!("'{}'", escaped.replace('\'', "\\'"))
    }
}

fn list_item(v: &Value) -> String {
    match v {
        Value::String(s) => quoted(s),
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Array(items) => format!("[{}]", items.iter().map(list_item).collect::<Vec<_>>().join(", ")),
        other => other.to_string(),
    }
}

impl KgRecord {
    /// Lists keep their bracketed literal form: `['ICD-10:D66', 'OMIM:306700']`.
    fn xref_text(&self) -> Option<String> {
        match self.db_xref.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(list_item(other)),
        }
    }

    pub fn to_context_block(&self) -> String {
        let na = || "N/A".to_string();
        // 名称字段优先取 comment，没有时才用 label
        let name = self.comment.clone().or_else(|| self.label.clone()).unwrap_or_else(na);
        format!(
            "Disease Name: {}\n\
            URI: {}\n\
            Description: {}\n\
            DB Xref: {}\n\
            Parent Class: {}",
            name,
            self.uri.clone().unwrap_or_else(na),
            self.comment.clone().unwrap_or_else(na),
            self.xref_text().unwrap_or_else(na),
            self.parent_label.clone().unwrap_or_else(na),
        )
    }
}

/// URI → record. Read once at startup, never written.
#[derive(Debug, Default)]
pub struct KnowledgeGraph {
    records: HashMap<String, KgRecord>,
}

impl KnowledgeGraph {
    pub fn load(path: impl AsRef<Path>) -> AssistantResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AssistantError::Resource(format!("cannot read knowledge graph {}: {}", path.display(), e))
        })?;
        let graph = Self::from_json(&text)?;
        info!("📖 Knowledge graph loaded: {} classes from {}", graph.len(), path.display());
        Ok(graph)
    }

    pub fn from_json(text: &str) -> AssistantResult<Self> {
        let records: HashMap<String, KgRecord> = serde_json::from_str(text)?;
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, uri: &str) -> Option<&KgRecord> {
        self.records.get(uri)
    }

    pub fn record_for_disease(&self, disease: &str) -> Option<&KgRecord> {
        let uri = diseases::ordo_uri(disease)?;
        self.get(&uri)
    }

    /// Structured disease block for the prompt, or the "not found" sentinel.
    pub fn context_for_query(&self, query: &str) -> String {
        diseases::extract_disease(query)
            .and_then(|d| self.record_for_disease(d))
            .map(KgRecord::to_context_block)
            .unwrap_or_else(|| KG_NOT_FOUND.to_string())
    }
}
