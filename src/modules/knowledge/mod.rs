pub mod diseases;
pub mod graph;
pub mod mim2gene;

pub use graph::KnowledgeGraph;
pub use mim2gene::GeneTable;

use std::path::Path;
use crate::errors::AssistantResult;

/// The two static lookup tables, loaded once at startup and shared read-only.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    pub graph: KnowledgeGraph,
    pub genes: GeneTable,
}

impl KnowledgeBase {
    pub fn load(kg_path: impl AsRef<Path>, mim2gene_path: impl AsRef<Path>) -> AssistantResult<Self> {
        Ok(Self {
            graph: KnowledgeGraph::load(kg_path)?,
            genes: GeneTable::load(mim2gene_path)?,
        })
    }
}
