pub mod brain;
pub mod console;
pub mod knowledge;
pub mod retrieval;
pub mod session;
