//! Decoder for Ollama's newline-delimited JSON chat stream
//!
//! Each chunk delivered by the transport is decoded on its own: it is split
//! on line breaks and every non-blank line is parsed as one chat chunk. A line
//! that fails to parse is dropped. Lines are never stitched together across
//! chunk boundaries; Ollama flushes whole objects per write.

use futures_util::{Stream, StreamExt};
use serde::Deserialize;

#[derive(Deserialize)]
struct StreamMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    message: Option<StreamMessage>,
}

/// Decode one transport chunk into the content fragments it carries, in order.
pub fn decode_chunk(chunk: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(chunk);
    let mut fragments = Vec::new();

    for line in text.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<StreamChunk>(line) {
            Ok(parsed) => {
                if let Some(content) = parsed.message.and_then(|m| m.content) {
                    if !content.is_empty() {
                        fragments.push(content);
                    }
                }
            }
            Err(err) => {
                tracing::trace!(%err, line, "dropping unparseable stream line");
            }
        }
    }

    fragments
}

/// Drive a byte stream to completion, handing every decoded fragment to
/// `on_fragment`. The first transport error ends the stream and is returned.
pub async fn pump<S, B, E, F>(stream: S, mut on_fragment: F) -> Result<(), E>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    F: FnMut(String),
{
    futures_util::pin_mut!(stream);

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        for fragment in decode_chunk(chunk.as_ref()) {
            on_fragment(fragment);
        }
    }

    Ok(())
}

/// Accumulated assistant text for the exchange in flight
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamBuffer {
    text: String,
}

impl StreamBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: &str) {
        self.text.push_str(fragment);
    }

    pub fn reset(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
