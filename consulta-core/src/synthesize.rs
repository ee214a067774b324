//! Synthesis stage: question + result + history -> natural-language answer

use askama::Template;
use config::PromptShape;
use llm::ChatModel;
use tracing::debug;

use crate::conversation::ConversationWindow;
use crate::error::{Error, Result};
use crate::prompt::{chat_request, SynthesizeSystemPrompt, SynthesizeUserPrompt};
use crate::turn::TabularResult;

pub struct Synthesizer {
    shape: PromptShape,
    language: String,
    date_format: String,
    no_results: String,
}

impl Synthesizer {
    pub fn new(
        shape: PromptShape,
        language: impl Into<String>,
        date_format: impl Into<String>,
        no_results: impl Into<String>,
    ) -> Self {
        Self {
            shape,
            language: language.into(),
            date_format: date_format.into(),
            no_results: no_results.into(),
        }
    }

    /// The text the model sees for `result`: the no-results literal, or the rendered table.
    pub fn serialize_result(&self, result: &TabularResult) -> String {
        if result.is_empty() {
            self.no_results.clone()
        } else {
            result.render()
        }
    }

    pub fn prompts(
        &self,
        question: &str,
        result: &TabularResult,
        history: &ConversationWindow<'_>,
    ) -> Result<(String, String)> {
        let system = SynthesizeSystemPrompt {
            language: &self.language,
            date_format: &self.date_format,
            no_results: &self.no_results,
        }
        .render()?;
        let history = history.render();
        let result = self.serialize_result(result);
        let user = SynthesizeUserPrompt {
            history: &history,
            question,
            result: &result,
        }
        .render()?;
        Ok((system, user))
    }

    pub async fn synthesize(
        &self,
        model: &(dyn ChatModel + Send + Sync),
        question: &str,
        result: &TabularResult,
        history: &ConversationWindow<'_>,
    ) -> Result<String> {
        let (system, user) = self.prompts(question, result, history)?;
        let request = chat_request(self.shape, system, user);
        let response = model.chat(&request).await.map_err(Error::provider)?;
        let answer = response.get_text().trim().to_string();
        debug!(model = model.name(), chars = answer.len(), "Synthesized answer");
        Ok(answer)
    }
}
