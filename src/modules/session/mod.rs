pub mod history;

pub use history::{ChatMessage, Role, SessionHistory};
