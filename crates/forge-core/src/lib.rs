pub mod config;
pub mod decoder;
pub mod error;
pub mod extract;
pub mod models;
pub mod ollama;
pub mod preview;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use config::{Config, ModelSource};
pub use decoder::StreamBuffer;
pub use error::{ClientError, ConfigError};
pub use extract::{extract, ExtractedArtifact, SyntaxMode};
pub use models::{ModelDirectory, ServiceStatus};
pub use ollama::OllamaClient;
pub use session::{Session, FAILURE_MESSAGE};
pub use state::{ChatRequest, ChatRole, ChatTurn};
