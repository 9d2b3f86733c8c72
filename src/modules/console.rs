use crate::modules::brain::AssistantTurn;
use crate::modules::knowledge::diseases;
use crate::modules::session::{ChatMessage, Role};

pub const TITLE: &str = "🧬 Rare Disease RAG Chatbot";
pub const CAPTION: &str =
    "Ask a question about one of 20 rare diseases to get an evidence-backed answer (PubMed, ORDO, mim2gene).";
pub const ABOUT: &str = "This app uses Retrieval-Augmented Generation (RAG) for 20 rare diseases. \
Your questions are matched to ~20,000 PubMed abstracts using a vector database, plus structured \
knowledge from Orphanet and gene-disease mappings. All evidence is cited.";
pub const DISCLAIMER: &str = "Disclaimer: This tool provides information for educational purposes only \
and is not medical advice. Please consult a medical professional for health-related questions.";
pub const PROMPT: &str = "Ask a question about one of the 20 rare diseases...";

const RULE: &str = "------------------------------------------------------------";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Anything that isn't a slash command.
    Ask(String),
    NewChat,
    Diseases,
    History,
    Save(String),
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl Command {
    /// Trimming only decides what the line is; questions keep the exact text typed.
    pub fn parse(raw: &str) -> Self {
        let line = raw.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        if !line.starts_with('/') {
            return Command::Ask(raw.to_string());
        }
        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };
        match cmd {
            "/new" | "/reset" => Command::NewChat,
            "/diseases" => Command::Diseases,
            "/history" => Command::History,
            "/save" if !arg.is_empty() => Command::Save(arg.to_string()),
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

pub fn banner() -> String {
    format!("{TITLE}\n{CAPTION}\n\nℹ️  {ABOUT}\n\n⚠️  {DISCLAIMER}\n{RULE}\nType /help for commands.\n")
}

pub fn help() -> String {
    "Commands:\n  \
    /new            start a new chat\n  \
    /diseases       list the diseases covered\n  \
    /history        replay this chat\n  \
    /save <path>    export this chat as JSON lines\n  \
    /quit           leave\n"
        .to_string()
}

/// Diseases covered, in two columns split at the midpoint.
pub fn disease_columns() -> String {
    let names: Vec<&str> = diseases::disease_names().collect();
    let split_idx = names.len() / 2;
    let (left, right) = names.split_at(split_idx);
    let width = left.iter().map(|n| n.chars().count()).max().unwrap_or(0) + 4;

    let mut out = String::from("Diseases Covered\n");
    for i in 0..left.len().max(right.len()) {
        let l = left.get(i).map(|n| format!("- {}", n)).unwrap_or_default();
        let r = right.get(i).map(|n| format!("- {}", n)).unwrap_or_default();
        let line = format!("{:<width$}{}", l, r, width = width);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn sources_block(evidence: &[String]) -> String {
    let mut out = String::from("📚 Sources\n");
    for e in evidence {
        out.push_str(e);
        out.push('\n');
    }
    out
}

pub fn render_turn(turn: &AssistantTurn) -> String {
    render_answer(&turn.question, &turn.answer, &turn.evidence)
}

fn render_answer(question: &str, answer: &str, evidence: &[String]) -> String {
    let mut out = format!("{RULE}\nQuestion: {}\n\n{}\n", question, answer);
    if !evidence.is_empty() {
        out.push('\n');
        out.push_str(&sources_block(evidence));
    }
    out.push_str(RULE);
    out.push('\n');
    out
}

/// Replays the chat. User messages are folded into the assistant turn that echoes them.
pub fn render_history(messages: &[ChatMessage]) -> String {
    if messages.is_empty() {
        return "(no messages yet)\n".to_string();
    }
    let mut out = String::new();
    for m in messages {
        match m.role {
            Role::User => {}
            Role::Assistant => {
                let q = m.question.as_deref().unwrap_or("");
                out.push_str(&render_answer(q, &m.content, &m.evidence));
            }
        }
    }
    // 最后一条是尚未回答的用户消息
    if let Some(last) = messages.last().filter(|m| m.role == Role::User) {
        out.push_str(&format!("You: {}\n", last.content));
    }
    out
}
