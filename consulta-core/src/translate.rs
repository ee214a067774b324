//! Translation stage: question + schema + history -> one SQL statement

use askama::Template;
use config::PromptShape;
use llm::ChatModel;
use tracing::debug;

use crate::conversation::ConversationWindow;
use crate::error::{Error, Result};
use crate::prompt::{chat_request, TranslateSystemPrompt, TranslateUserPrompt};

const FENCE_PREFIXES: [&str; 3] = ["```sql", "```SQL", "```"];
const FENCE: &str = "```";

/// Remove a surrounding fenced-code marker and trim whitespace.
///
/// Repeats until nothing changes, so applying it twice gives the same text as once.
pub fn strip_code_fence(text: &str) -> String {
    let mut current = text.trim();
    loop {
        let mut next = current;
        if let Some(prefix) = FENCE_PREFIXES.iter().find(|p| next.starts_with(**p)) {
            next = &next[prefix.len()..];
        }
        if let Some(stripped) = next.strip_suffix(FENCE) {
            next = stripped;
        }
        let next = next.trim();
        if next == current {
            return current.to_string();
        }
        current = next;
    }
}

pub struct Translator {
    shape: PromptShape,
    row_limit: usize,
    unanswerable: String,
    hints: Vec<String>,
    temperature: Option<f32>,
}

impl Translator {
    pub fn new(shape: PromptShape, row_limit: usize, unanswerable: impl Into<String>) -> Self {
        Self {
            shape,
            row_limit,
            unanswerable: unanswerable.into(),
            hints: Vec::new(),
            temperature: None,
        }
    }

    /// Known domain values listed in the prompt (e.g. the allowed statuses of a column)
    pub fn with_hints(mut self, hints: Vec<String>) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Render the instruction and user prompts.
    pub fn prompts(
        &self,
        question: &str,
        schema: &str,
        history: &ConversationWindow<'_>,
    ) -> Result<(String, String)> {
        // The placeholder ends up inside a SQL string literal
        let unanswerable = self.unanswerable.replace('\'', "''");
        let system = TranslateSystemPrompt {
            schema,
            row_limit: self.row_limit,
            unanswerable: &unanswerable,
            hints: &self.hints,
        }
        .render()?;
        let history = history.render();
        let user = TranslateUserPrompt {
            history: &history,
            question,
        }
        .render()?;
        Ok((system, user))
    }

    /// Ask the model for SQL answering `question`. The text is cleaned of code
    /// fences but otherwise returned as produced; it is not validated here.
    pub async fn translate(
        &self,
        model: &(dyn ChatModel + Send + Sync),
        question: &str,
        schema: &str,
        history: &ConversationWindow<'_>,
    ) -> Result<String> {
        let (system, user) = self.prompts(question, schema, history)?;
        let mut request = chat_request(self.shape, system, user);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        let response = model.chat(&request).await.map_err(Error::provider)?;
        let sql = strip_code_fence(response.get_text());
        debug!(model = model.name(), sql = %sql, "Translated question");
        Ok(sql)
    }
}
