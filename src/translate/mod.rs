pub mod error;
pub mod interface;
pub mod ollama;
pub mod prompt;

pub use error::*;
pub use interface::*;
pub use ollama::OllamaTranslator;
