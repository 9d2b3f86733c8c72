pub mod abstracts;
pub mod citations;
pub mod embedder;

pub use abstracts::{AbstractSearch, AbstractStore, RetrievedAbstract};
pub use embedder::Embedder;
