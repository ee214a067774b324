//! Speech-to-text collaborator
//!
//! Turns recorded audio into the text of a question. Implementations return
//! the raw transcript; deciding whether it is usable is the caller's concern.

use async_trait::async_trait;

#[async_trait]
pub trait Transcriber {
    /// Transcribe an audio file. `mime_type` is e.g. `audio/wav`.
    async fn transcribe(&self, audio: Vec<u8>, mime_type: &str) -> anyhow::Result<String>;
}
