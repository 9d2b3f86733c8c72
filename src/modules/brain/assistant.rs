use std::sync::Arc;
use tracing::{info, warn};

use super::llm::LanguageModel;
use super::prompt::{build_prompt, PromptContext};
use crate::modules::knowledge::{diseases, KnowledgeBase};
use crate::modules::retrieval::{citations, AbstractSearch};
use crate::modules::session::{ChatMessage, SessionHistory};

/// Result of one question: what the console shows.
#[derive(Debug, Clone)]
pub struct AssistantTurn {
    pub question: String,
    pub answer: String,
    pub evidence: Vec<String>,
}

pub struct Assistant {
    knowledge: Arc<KnowledgeBase>,
    search: Arc<dyn AbstractSearch>,
    llm: Arc<dyn LanguageModel>,
    top_k: u64,
    title_max_chars: usize,
}

impl Assistant {
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        search: Arc<dyn AbstractSearch>,
        llm: Arc<dyn LanguageModel>,
        top_k: u64,
        title_max_chars: usize,
    ) -> Self {
        Self { knowledge, search, llm, top_k, title_max_chars }
    }

    /// Builds the grounded prompt for `query`. Returns it with the citation list.
    pub async fn prepare(&self, query: &str) -> (String, Vec<String>) {
        let docs = match self.search.similarity_search(query, self.top_k).await {
            Ok(docs) => docs,
            Err(e) => {
                // 检索失败不致命，仍用结构化上下文回答
                warn!("⚠️ Abstract search failed, answering without abstracts: {}", e);
                Vec::new()
            }
        };
        let abstracts = citations::join_context(&docs);
        let evidence = citations::evidence_list(&docs, self.title_max_chars);

        let disease_context = self.knowledge.graph.context_for_query(query);
        let gene_context = self.knowledge.genes.context_for_query(query);

        let prompt = build_prompt(&PromptContext {
            abstracts: &abstracts,
            disease_context: &disease_context,
            gene_context: &gene_context,
            question: query,
        });
        (prompt, evidence)
    }

    pub async fn ask(&self, session: &mut SessionHistory, query: &str) -> AssistantTurn {
        session.push(ChatMessage::user(query));

        info!(
            "🔎 Query matched disease={:?} gene={:?}",
            diseases::extract_disease(query),
            self.knowledge.genes.extract_identifier(query)
        );

        let (prompt, evidence) = self.prepare(query).await;

        let answer = match self.llm.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("⚠️ LLM call failed: {}", e);
                format!("An error occurred: {}", e)
            }
        };

        session.push(ChatMessage::assistant(query, &answer, evidence.clone()));

        AssistantTurn {
            question: query.to_string(),
            answer,
            evidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AssistantError, AssistantResult};
    use crate::modules::knowledge::graph::KG_NOT_FOUND;
    use crate::modules::knowledge::mim2gene::GENE_NOT_FOUND;
    use crate::modules::knowledge::{GeneTable, KnowledgeGraph};
    use crate::modules::retrieval::RetrievedAbstract;
    use crate::modules::session::Role;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedSearch(Vec<RetrievedAbstract>);

    #[async_trait]
    impl AbstractSearch for FixedSearch {
        async fn similarity_search(&self, _query: &str, k: u64) -> AssistantResult<Vec<RetrievedAbstract>> {
            Ok(self.0.iter().take(k as usize).cloned().collect())
        }
    }

    struct BrokenSearch;

    #[async_trait]
    impl AbstractSearch for BrokenSearch {
        async fn similarity_search(&self, _query: &str, _k: u64) -> AssistantResult<Vec<RetrievedAbstract>> {
            Err(AssistantError::VectorStore("connection refused".into()))
        }
    }

    /// Records every prompt and answers with a canned reply.
    #[derive(Default)]
    struct EchoModel {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LanguageModel for EchoModel {
        async fn complete(&self, prompt: &str) -> AssistantResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("TL;DR: canned answer.".to_string())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn complete(&self, _prompt: &str) -> AssistantResult<String> {
            Err(AssistantError::LlmProvider("rate limited".into()))
        }
    }

    fn knowledge() -> Arc<KnowledgeBase> {
        let graph = KnowledgeGraph::from_json(
            r#"{"http://www.orpha.net/ORDO/Orphanet_448": {
                "uri": "http://www.orpha.net/ORDO/Orphanet_448",
                "label": "Hemophilia A",
                "comment": "Factor VIII deficiency.",
                "dbXref": "OMIM:306700",
                "parentLabel": "Hemophilia"
            }}"#,
        )
        .unwrap();
        let genes = GeneTable::parse("602421\tgene\t1080\tCFTR\tENSG00000001626\n");
        Arc::new(KnowledgeBase { graph, genes })
    }

    fn docs() -> Vec<RetrievedAbstract> {
        vec![
            RetrievedAbstract {
                pmid: "111".into(),
                title: "Emicizumab prophylaxis".into(),
                content: "Emicizumab reduces bleeding.".into(),
            },
            RetrievedAbstract {
                pmid: "".into(),
                title: "Untracked".into(),
                content: "No pmid here.".into(),
            },
        ]
    }

    #[tokio::test]
    async fn hemophilia_question_end_to_end() {
        let model = Arc::new(EchoModel::default());
        let assistant = Assistant::new(knowledge(), Arc::new(FixedSearch(docs())), model.clone(), 10, 100);
        let mut session = SessionHistory::new();

        let turn = assistant.ask(&mut session, "What is hemophilia A?").await;

        assert_eq!(turn.answer, "TL;DR: canned answer.");
        assert_eq!(turn.evidence, vec!["- PMID: 111, Title: Emicizumab prophylaxis...".to_string()]);

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        let p = &prompts[0];
        assert!(p.contains("Emicizumab reduces bleeding.\n\nNo pmid here."));
        assert!(p.contains("Disease Name: Factor VIII deficiency.\nURI: http://www.orpha.net/ORDO/Orphanet_448"));
        assert!(p.contains(GENE_NOT_FOUND));
        assert!(p.contains("Question: What is hemophilia A?\nAnswer:\n"));

        let msgs = session.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, Role::User);
        assert_eq!(msgs[0].content, "What is hemophilia A?");
        assert_eq!(msgs[1].role, Role::Assistant);
        assert_eq!(msgs[1].evidence.len(), 1);
    }

    #[tokio::test]
    async fn gene_question_fills_gene_slot() {
        let model = Arc::new(EchoModel::default());
        let assistant = Assistant::new(knowledge(), Arc::new(FixedSearch(vec![])), model.clone(), 10, 100);
        let mut session = SessionHistory::new();

        let turn = assistant.ask(&mut session, "How does CFTR relate to cystic fibrosis?").await;

        assert!(turn.evidence.is_empty());
        let p = model.prompts.lock().unwrap()[0].clone();
        assert!(p.contains("MIM Number: 602421\nMIM Entry Type: gene\nEntrez Gene ID: 1080\nApproved Gene Symbol: CFTR"));
        // 识别出疾病但知识图谱里没有条目
        assert!(p.contains(KG_NOT_FOUND));
    }

    #[tokio::test]
    async fn llm_failure_becomes_the_answer_text() {
        let assistant = Assistant::new(knowledge(), Arc::new(FixedSearch(docs())), Arc::new(FailingModel), 10, 100);
        let mut session = SessionHistory::new();

        let turn = assistant.ask(&mut session, "What is hemophilia A?").await;

        assert_eq!(turn.answer, "An error occurred: LLM provider error: rate limited");
        assert_eq!(turn.evidence.len(), 1);
        assert_eq!(session.messages()[1].content, turn.answer);
    }

    #[tokio::test]
    async fn search_failure_still_answers_from_tables() {
        let model = Arc::new(EchoModel::default());
        let assistant = Assistant::new(knowledge(), Arc::new(BrokenSearch), model.clone(), 10, 100);
        let mut session = SessionHistory::new();

        let turn = assistant.ask(&mut session, "What is hemophilia A?").await;

        assert_eq!(turn.answer, "TL;DR: canned answer.");
        assert!(turn.evidence.is_empty());
        let p = model.prompts.lock().unwrap()[0].clone();
        assert!(p.contains("Context from Scientific Abstracts:\n\n\nStructured Knowledge Graph Context"));
    }

    #[tokio::test]
    async fn top_k_limits_retrieval() {
        let (prompt, evidence) = Assistant::new(knowledge(), Arc::new(FixedSearch(docs())), Arc::new(EchoModel::default()), 1, 100)
            .prepare("anything")
            .await;
        assert_eq!(evidence.len(), 1);
        assert!(!prompt.contains("No pmid here."));
        assert!(prompt.contains(KG_NOT_FOUND));
    }
}
