//! Spoken questions
//!
//! Transcription happens before a turn exists. A recording that yields no
//! text never reaches the orchestrator, so no turn is recorded for it.

use llm::Transcriber;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Turn a recording into question text.
///
/// Blank transcripts are `Error::TranscriptionAmbiguous`; collaborator
/// failures are `Error::Provider`.
pub async fn transcribe_question(
    transcriber: &(dyn Transcriber + Send + Sync),
    audio: Vec<u8>,
    mime_type: &str,
) -> Result<String> {
    let bytes = audio.len();
    let text = transcriber
        .transcribe(audio, mime_type)
        .await
        .map_err(Error::provider)?;

    let question = text.trim();
    if question.is_empty() {
        warn!(bytes, mime_type, "Transcription produced no text");
        return Err(Error::TranscriptionAmbiguous);
    }
    debug!(bytes, chars = question.len(), "Transcribed question");
    Ok(question.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedTranscriber(anyhow::Result<String>);

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(&self, _audio: Vec<u8>, _mime_type: &str) -> anyhow::Result<String> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(anyhow::anyhow!("{}", e)),
            }
        }
    }

    #[tokio::test]
    async fn test_transcript_is_trimmed() {
        let t = FixedTranscriber(Ok("  Quantos médicos existem?\n".to_string()));
        let question = transcribe_question(&t, vec![0; 4], "audio/wav").await.unwrap();
        assert_eq!(question, "Quantos médicos existem?");
    }

    #[tokio::test]
    async fn test_blank_transcript_is_ambiguous() {
        let t = FixedTranscriber(Ok(" \n ".to_string()));
        let err = transcribe_question(&t, vec![0; 4], "audio/wav").await.unwrap_err();
        assert_eq!(err, Error::TranscriptionAmbiguous);
    }

    #[tokio::test]
    async fn test_transcriber_failure_is_provider_error() {
        let t = FixedTranscriber(Err(anyhow::anyhow!("connection reset")));
        let err = transcribe_question(&t, vec![], "audio/mpeg").await.unwrap_err();
        assert_eq!(
            err,
            Error::Provider {
                message: "connection reset".to_string()
            }
        );
    }
}
