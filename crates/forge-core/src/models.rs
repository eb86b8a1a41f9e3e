//! Directory of models the user can pick from
//!
//! Either a fixed list baked into the configuration or the list reported by
//! the Ollama server at start-up.

/// Reachability of the inference server as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Probing,
    Online,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDirectory {
    models: Vec<String>,
    current: Option<usize>,
    status: ServiceStatus,
}

impl ModelDirectory {
    /// A static list; the server is assumed reachable.
    pub fn fixed(models: Vec<String>, preferred: Option<&str>) -> Self {
        let models = dedup(models);
        let current = preferred
            .and_then(|name| models.iter().position(|m| m == name))
            .or(if models.is_empty() { None } else { Some(0) });

        Self {
            models,
            current,
            status: ServiceStatus::Online,
        }
    }

    /// Empty until a probe result is applied.
    pub fn detecting() -> Self {
        Self {
            models: Vec::new(),
            current: None,
            status: ServiceStatus::Probing,
        }
    }

    pub fn apply_probe_success(&mut self, names: Vec<String>) {
        self.models = dedup(names);
        self.current = if self.models.is_empty() { None } else { Some(0) };
        self.status = ServiceStatus::Online;
        tracing::info!(count = self.models.len(), "model directory populated");
    }

    pub fn apply_probe_failure(&mut self) {
        self.models.clear();
        self.current = None;
        self.status = ServiceStatus::Offline;
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn status(&self) -> ServiceStatus {
        self.status
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&str> {
        self.current
            .and_then(|i| self.models.get(i))
            .map(String::as_str)
    }

    pub fn select_next(&mut self) {
        if let Some(i) = self.current {
            self.current = Some((i + 1) % self.models.len());
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(i) = self.current {
            let len = self.models.len();
            self.current = Some((i + len - 1) % len);
        }
    }

    /// True when a prompt may be typed and sent.
    pub fn is_usable(&self) -> bool {
        self.status != ServiceStatus::Offline && self.current.is_some()
    }
}

fn dedup(names: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
