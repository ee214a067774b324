//! Application settings management

use crate::PathManager;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// How the two prompts of a stage are handed to the provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptShape {
    /// A system message with the instructions, then a user message
    #[default]
    Split,
    /// One user message carrying instructions and content together
    Combined,
}

/// Backoff for rate-limited or failed provider calls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

impl RetrySettings {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

/// Fixed texts shown to the end user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Messages {
    /// Assistant reply when generated SQL tries to modify the database
    pub refusal: String,
    /// Stand-in for an empty result when asking for the answer
    pub no_results: String,
    /// Prefix of the assistant reply when a turn fails
    pub error_prefix: String,
    /// Text the model returns, as a one-cell SELECT, for unanswerable questions
    pub unanswerable: String,
    /// Warning when a recording could not be understood
    pub transcription_failed: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            refusal: "Desculpe, só posso realizar consultas de leitura no banco de dados."
                .to_string(),
            no_results: "Nenhum resultado encontrado.".to_string(),
            error_prefix: "Erro ao processar a pergunta".to_string(),
            unanswerable: "Pergunta não pode ser respondida com os dados disponíveis".to_string(),
            transcription_failed: "Não foi possível entender o áudio.".to_string(),
        }
    }
}

/// Application settings stored in settings.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Chat model used for both translation and answer synthesis
    pub model: String,
    /// OpenAI-compatible endpoint; the public API when unset
    pub base_url: Option<String>,
    /// Transcription model for spoken questions
    pub transcription_model: String,
    /// SQLite database the questions are asked against
    pub database_path: String,
    /// Prior turns given to the model as context; 0 means all of them
    pub history_window: usize,
    pub prompt_shape: PromptShape,
    /// Language the answers are written in
    pub language: String,
    /// Display form for dates in answers
    pub date_format: String,
    /// Row cap the model is told to apply to non-aggregate queries
    pub row_limit: usize,
    /// Sampling temperature for SQL generation; the provider default when unset
    pub translation_temperature: Option<f32>,
    pub retry: RetrySettings,
    pub messages: Messages,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            transcription_model: "whisper-1".to_string(),
            database_path: "hospital.db".to_string(),
            history_window: 10,
            prompt_shape: PromptShape::Split,
            language: "Brazilian Portuguese".to_string(),
            date_format: "DD/MM/YYYY".to_string(),
            row_limit: 50,
            translation_temperature: None,
            retry: RetrySettings::default(),
            messages: Messages::default(),
        }
    }
}

impl Settings {
    /// Load settings from the settings file, or return defaults if there is none
    pub fn load() -> Result<Self, String> {
        match PathManager::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from `path`. A missing file yields defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::parse(&content).map_err(|e| format!("Invalid settings in {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Bound on the conversation window, `None` for "all prior turns".
    pub fn history_bound(&self) -> Option<usize> {
        (self.history_window > 0).then_some(self.history_window)
    }
}
