use thiserror::Error;

/// Failures talking to the inference server
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to Ollama failed: {0}. Make sure Ollama is running with: ollama serve")]
    Transport(#[from] reqwest::Error),

    #[error("Ollama responded with status {0}")]
    Status(reqwest::StatusCode),

    #[error("could not decode Ollama response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures reading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },
}
