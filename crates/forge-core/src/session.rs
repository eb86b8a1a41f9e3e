//! Conversation state container
//!
//! All chat state lives here and only changes through the transition methods
//! below. Network I/O is left to the caller: `submit` hands back the request
//! to send, and the caller reports what happened with `fragment_received`,
//! `stream_end` and `stream_error`.

use crate::decoder::StreamBuffer;
use crate::extract::{self, SyntaxMode};
use crate::models::ModelDirectory;
use crate::state::{ChatRequest, ChatTurn};

/// First assistant turn shown in a fresh session
pub const GREETING: &str = "Nebula Forge is ready.\n\nDescribe what you want to build. Code from the reply appears in the viewport as it streams.";

/// Replaces the assistant turn when an exchange fails
pub const FAILURE_MESSAGE: &str = "Request failed: could not get a response from the local model server. Make sure Ollama is running with: ollama serve";

#[derive(Debug, Clone)]
pub struct Session {
    turns: Vec<ChatTurn>,
    buffer: StreamBuffer,
    in_progress: bool,
    code: String,
    syntax: SyntaxMode,
    directory: ModelDirectory,
}

impl Session {
    pub fn new(directory: ModelDirectory) -> Self {
        Self {
            turns: vec![ChatTurn::assistant(GREETING)],
            buffer: StreamBuffer::new(),
            in_progress: false,
            code: String::new(),
            syntax: SyntaxMode::default(),
            directory,
        }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    /// Latest extracted code body; empty until a fence has been seen.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn syntax(&self) -> SyntaxMode {
        self.syntax
    }

    pub fn directory(&self) -> &ModelDirectory {
        &self.directory
    }

    /// Whether the prompt input should accept text at all.
    pub fn input_enabled(&self) -> bool {
        self.directory.is_usable()
    }

    pub fn can_submit(&self) -> bool {
        !self.in_progress && self.input_enabled()
    }

    /// Start an exchange. Returns the request to send, or `None` when the
    /// prompt is blank, an exchange is already running, or no model is
    /// available.
    pub fn submit(&mut self, prompt: &str) -> Option<ChatRequest> {
        if prompt.trim().is_empty() || !self.can_submit() {
            return None;
        }
        let model = self.directory.current()?.to_string();

        self.turns.push(ChatTurn::user(prompt));
        let messages = self
            .turns
            .iter()
            .filter(|turn| !turn.content.trim().is_empty())
            .cloned()
            .collect();
        self.turns.push(ChatTurn::assistant(""));
        self.buffer.reset();
        self.in_progress = true;

        tracing::info!(%model, turns = self.turns.len(), "prompt submitted");

        Some(ChatRequest {
            model,
            messages,
            stream: true,
        })
    }

    /// Append a streamed fragment and resync the assistant turn and the
    /// extracted code.
    pub fn fragment_received(&mut self, fragment: &str) {
        if !self.in_progress {
            tracing::debug!("fragment arrived with no exchange running");
            return;
        }

        self.buffer.push(fragment);
        if let Some(last) = self.turns.last_mut() {
            last.content.clear();
            last.content.push_str(self.buffer.as_str());
        }

        if let Some(artifact) = extract::extract(self.buffer.as_str()) {
            self.syntax = self.syntax.refine(&artifact.language_tag);
            self.code = artifact.body;
        }
    }

    pub fn stream_end(&mut self) {
        if self.in_progress {
            tracing::info!(chars = self.buffer.len(), "exchange complete");
        }
        self.in_progress = false;
    }

    pub fn stream_error(&mut self, reason: &str) {
        tracing::error!(reason, "exchange failed");
        if self.in_progress {
            if let Some(last) = self.turns.last_mut() {
                last.content = FAILURE_MESSAGE.to_string();
            }
        }
        self.in_progress = false;
    }

    pub fn probe_success(&mut self, models: Vec<String>) {
        self.directory.apply_probe_success(models);
    }

    pub fn probe_failure(&mut self) {
        self.directory.apply_probe_failure();
    }

    /// Apply the outcome of the start-up model listing.
    pub fn probe_finished<E: std::fmt::Display>(&mut self, result: Result<Vec<String>, E>) {
        match result {
            Ok(models) => self.probe_success(models),
            Err(err) => {
                tracing::warn!(%err, "model probe failed");
                self.probe_failure();
            }
        }
    }

    /// Move to the next model. Refused while an exchange is running so the
    /// request and the displayed model agree.
    pub fn select_next_model(&mut self) -> bool {
        if self.in_progress {
            return false;
        }
        self.directory.select_next();
        true
    }

    pub fn select_prev_model(&mut self) -> bool {
        if self.in_progress {
            return false;
        }
        self.directory.select_prev();
        true
    }
}
