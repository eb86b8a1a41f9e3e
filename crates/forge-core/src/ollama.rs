use reqwest::Client;
use serde::Deserialize;

use crate::decoder;
use crate::error::ClientError;
use crate::state::ChatRequest;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

#[derive(Deserialize)]
struct OllamaModelsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a streaming chat request and feed each content fragment to
    /// `on_fragment` as it arrives. Returns once the server closes the body.
    pub async fn stream_chat<F>(&self, request: &ChatRequest, on_fragment: F) -> Result<(), ClientError>
    where
        F: FnMut(String),
    {
        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!(%url, model = %request.model, turns = request.messages.len(), "starting chat stream");

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        decoder::pump(response.bytes_stream(), on_fragment).await?;
        tracing::debug!("chat stream closed");
        Ok(())
    }

    pub async fn list_models(&self) -> Result<Vec<String>, ClientError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        let bytes = response.bytes().await?;
        let models_response: OllamaModelsResponse = serde_json::from_slice(&bytes)?;
        let model_names: Vec<String> = models_response
            .models
            .into_iter()
            .map(|model| model.name)
            .collect();

        Ok(model_names)
    }
}
