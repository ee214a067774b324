use crate::client::Client;
use crate::Transcriber;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::chat::api::TranscriptionResponse;

/// Speech-to-text through the OpenAI `audio/transcriptions` endpoint.
#[derive(Clone)]
pub struct OpenAITranscriber {
    client: Client,
    base_url: String,
    model_name: String,
    language: Option<String>,
}

impl OpenAITranscriber {
    pub fn new(
        client: Client,
        base_url: String,
        model_name: String,
        language: Option<String>,
    ) -> Self {
        OpenAITranscriber {
            client,
            base_url,
            model_name,
            language,
        }
    }

    fn transcription_url(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }
}

/// File name with an extension the endpoint uses to detect the container format.
fn file_name_for(mime_type: &str) -> String {
    let ext = mime_type
        .strip_prefix("audio/")
        .map(|f| match f {
            "mpeg" => "mp3",
            "x-wav" | "wave" => "wav",
            other => other,
        })
        .unwrap_or("wav");
    format!("question.{}", ext)
}

#[async_trait]
impl Transcriber for OpenAITranscriber {
    async fn transcribe(&self, audio: Vec<u8>, mime_type: &str) -> anyhow::Result<String> {
        let file_name = file_name_for(mime_type);
        let response: TranscriptionResponse = self
            .client
            .post_multipart(self.transcription_url(), || {
                let part = Part::bytes(audio.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime_type)?;
                let mut form = Form::new()
                    .text("model", self.model_name.clone())
                    .part("file", part);
                if let Some(language) = &self.language {
                    form = form.text("language", language.clone());
                }
                Ok(form)
            })
            .await?;
        Ok(response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_for_mime_types() {
        assert_eq!(file_name_for("audio/wav"), "question.wav");
        assert_eq!(file_name_for("audio/mpeg"), "question.mp3");
        assert_eq!(file_name_for("audio/x-wav"), "question.wav");
        assert_eq!(file_name_for("application/octet-stream"), "question.wav");
    }
}
