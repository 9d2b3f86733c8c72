pub mod assistant;
pub mod llm;
pub mod prompt;

pub use assistant::{Assistant, AssistantTurn};
pub use llm::{ChatModel, LanguageModel};
