mod config;
mod errors;
mod utils;
mod modules;

use std::env;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use anyhow::Context;
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::utils::http_client::HttpClientFactory;
use crate::modules::brain::{Assistant, ChatModel};
use crate::modules::console::{self, Command};
use crate::modules::knowledge::KnowledgeBase;
use crate::modules::retrieval::{AbstractStore, Embedder};
use crate::modules::session::SessionHistory;

fn init_tracing() {
    // 日志走 stderr，stdout 只留给对话
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// `rare_disease_rag ingest [corpus.jsonl]`: embed the abstracts into Qdrant.
async fn run_ingest(cfg: &AppConfig, path: &str) -> anyhow::Result<()> {
    let embedder = Embedder::new(HttpClientFactory::create()?, &cfg.retrieval);
    let store = AbstractStore::new(&cfg.retrieval, embedder)?;
    store.init().await?;

    info!("📥 Ingesting abstracts from {} into '{}'...", path, cfg.retrieval.collection);
    let stored = store.ingest_jsonl(path).await.with_context(|| format!("ingest of {} failed", path))?;
    let total = store.count().await?;
    info!("✅ Ingest done: {} abstracts upserted, collection now holds {}", stored, total);
    Ok(())
}

async fn run_chat(cfg: &AppConfig) -> anyhow::Result<()> {
    // 1. 静态资源: 启动时加载一次，之后只读共享
    let knowledge = Arc::new(
        KnowledgeBase::load(&cfg.data.kg_path, &cfg.data.mim2gene_path)
            .context("Failed to load knowledge resources")?,
    );

    // 2. 检索 + LLM
    let embedder = Embedder::new(HttpClientFactory::create()?, &cfg.retrieval);
    let store = AbstractStore::new(&cfg.retrieval, embedder)?;
    match store.count().await {
        Ok(0) => warn!("⚠️ Collection '{}' is empty. Run `rare_disease_rag ingest` first.", cfg.retrieval.collection),
        Ok(n) => info!("📚 Abstract index ready: {} abstracts", n),
        Err(e) => error!("Abstract index unavailable, answers will use structured data only: {}", e),
    }
    let llm = ChatModel::new(HttpClientFactory::create_for_llm(cfg.llm.timeout_sec)?, &cfg.llm);
    if env::var("OPENAI_API_KEY").unwrap_or_default().is_empty() {
        warn!("⚠️ OPENAI_API_KEY not set; every answer will report the missing key.");
    }

    let assistant = Assistant::new(
        knowledge,
        Arc::new(store),
        Arc::new(llm),
        cfg.retrieval.top_k,
        cfg.display.title_max_chars,
    );

    // 3. 对话循环
    let mut session = SessionHistory::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    println!("{}", console::banner());
    loop {
        print!("\n{}\n> ", console::PROMPT);
        stdout.flush()?;

        let Some(line) = lines.next_line().await? else { break };
        match Command::parse(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Help => print!("{}", console::help()),
            Command::Diseases => print!("{}", console::disease_columns()),
            Command::History => print!("{}", console::render_history(session.messages())),
            Command::NewChat => {
                session.reset();
                println!("🗑️  Started a new chat.");
            }
            Command::Save(path) => match session.export_jsonl(Path::new(&path)) {
                Ok(()) => println!("💾 Saved {} messages to {}", session.len(), path),
                Err(e) => println!("Could not save chat: {}", e),
            },
            Command::Unknown(cmd) => println!("Unknown command {}. Type /help.", cmd),
            Command::Ask(query) => {
                println!("⏳ Generating answer...");
                let turn = assistant.ask(&mut session, &query).await;
                print!("{}", console::render_turn(&turn));
            }
        }
    }

    info!("👋 Session {} closed ({} messages)", session.session_id, session.len());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();
    info!("Starting Rare Disease RAG Assistant...");

    let cfg = AppConfig::load().context("Failed to load rag_config")?;

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("ingest") => {
            let path = args.get(1).cloned().unwrap_or_else(|| cfg.data.abstracts_path.clone());
            run_ingest(&cfg, &path).await
        }
        Some("chat") | None => run_chat(&cfg).await,
        Some(other) => {
            error!("Unknown subcommand '{}'. Usage: rare_disease_rag [chat | ingest [corpus.jsonl]]", other);
            std::process::exit(2);
        }
    }
}
