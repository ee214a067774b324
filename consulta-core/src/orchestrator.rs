//! Turn orchestration
//!
//! One call to [`TurnOrchestrator::process_turn`] takes a question through
//! `Received -> Translating -> Gating -> Executing -> Synthesizing` and ends
//! in exactly one of `Completed`, `Refused` or `Failed`. Stages run strictly
//! one after another. Whatever the ending, the store gains the user turn on
//! entry and exactly one assistant turn on exit.

use config::{Messages, PromptShape, Settings};
use llm::ChatModel;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::conversation::{ConversationStore, ConversationWindow};
use crate::database::{QueryExecutor, SchemaProvider};
use crate::error::{Error, Result};
use crate::gate;
use crate::synthesize::Synthesizer;
use crate::translate::Translator;
use crate::turn::{TabularResult, Turn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStage {
    Received,
    Translating,
    Gating,
    Executing,
    Synthesizing,
}

impl fmt::Display for TurnStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TurnStage::Received => "Received",
            TurnStage::Translating => "Translating",
            TurnStage::Gating => "Gating",
            TurnStage::Executing => "Executing",
            TurnStage::Synthesizing => "Synthesizing",
        };
        f.write_str(name)
    }
}

/// How a turn ended. The assistant turn describing it is already in the store.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Completed,
    /// The generated statement started with `keyword` and was discarded unexecuted
    Refused { keyword: &'static str },
    Failed { stage: TurnStage, error: Error },
}

impl TurnOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed)
    }
}

/// Everything the pipeline takes from settings
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub shape: PromptShape,
    pub row_limit: usize,
    pub language: String,
    pub date_format: String,
    /// `None` sends every prior turn
    pub history_bound: Option<usize>,
    pub messages: Messages,
    /// Known domain values listed in the translation prompt
    pub hints: Vec<String>,
    pub translation_temperature: Option<f32>,
}

impl PipelineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            shape: settings.prompt_shape,
            row_limit: settings.row_limit,
            language: settings.language.clone(),
            date_format: settings.date_format.clone(),
            history_bound: settings.history_bound(),
            messages: settings.messages.clone(),
            hints: Vec::new(),
            translation_temperature: settings.translation_temperature,
        }
    }

    pub fn with_hints(mut self, hints: Vec<String>) -> Self {
        self.hints = hints;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// What a completed pipeline run produced
struct Answer {
    sql: String,
    result: TabularResult,
    text: String,
}

struct StageFailure {
    stage: TurnStage,
    error: Error,
    /// Set once the statement has been handed to the executor
    sql: Option<String>,
}

trait AtStage<T> {
    fn at(self, stage: TurnStage) -> std::result::Result<T, StageFailure>;

    /// Like `at`, for stages reached after `sql` was executed or attempted
    fn after(self, stage: TurnStage, sql: &str) -> std::result::Result<T, StageFailure>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: TurnStage) -> std::result::Result<T, StageFailure> {
        self.map_err(|error| StageFailure { stage, error, sql: None })
    }

    fn after(self, stage: TurnStage, sql: &str) -> std::result::Result<T, StageFailure> {
        self.map_err(|error| StageFailure {
            stage,
            error,
            sql: Some(sql.to_string()),
        })
    }
}

pub struct TurnOrchestrator {
    model: Arc<dyn ChatModel + Send + Sync>,
    schema: Arc<dyn SchemaProvider + Send + Sync>,
    executor: Arc<dyn QueryExecutor + Send + Sync>,
    translator: Translator,
    synthesizer: Synthesizer,
    history_bound: Option<usize>,
    messages: Messages,
}

impl TurnOrchestrator {
    pub fn new(
        model: Arc<dyn ChatModel + Send + Sync>,
        schema: Arc<dyn SchemaProvider + Send + Sync>,
        executor: Arc<dyn QueryExecutor + Send + Sync>,
        options: PipelineOptions,
    ) -> Self {
        let translator = Translator::new(options.shape, options.row_limit, &options.messages.unanswerable)
            .with_hints(options.hints)
            .with_temperature(options.translation_temperature);
        let synthesizer = Synthesizer::new(
            options.shape,
            options.language,
            options.date_format,
            &options.messages.no_results,
        );
        Self {
            model,
            schema,
            executor,
            translator,
            synthesizer,
            history_bound: options.history_bound,
            messages: options.messages,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Answer `question` in the context of `store`.
    ///
    /// Never fails: every error is turned into the assistant turn appended
    /// for this question, and reported through the returned outcome.
    #[instrument(name = "process_turn", skip_all, fields(turn))]
    pub async fn process_turn(&self, store: &mut ConversationStore, question: &str) -> TurnOutcome {
        let id = store.append(Turn::user(question));
        tracing::Span::current().record("turn", id.index());
        debug!(stage = %TurnStage::Received, "Question recorded");

        let history = store.window_before(id, self.history_bound);
        let run = self.run(question, history).await;

        let (reply, outcome) = match run {
            Ok(answer) => {
                debug!(rows = answer.result.row_count(), "Turn completed");
                (
                    Turn::answered(answer.text, answer.sql, answer.result),
                    TurnOutcome::Completed,
                )
            }
            Err(StageFailure {
                error: Error::UnsafeQueryRefused { keyword },
                ..
            }) => {
                warn!(keyword, "Refused generated statement");
                (
                    Turn::assistant(self.messages.refusal.clone()),
                    TurnOutcome::Refused { keyword },
                )
            }
            Err(StageFailure { stage, error, sql }) => {
                warn!(stage = %stage, error = %error, "Turn failed");
                let content = format!("{}: {}", self.messages.error_prefix, error);
                let reply = match sql {
                    Some(sql) => Turn::executed(content, sql),
                    None => Turn::assistant(content),
                };
                (reply, TurnOutcome::Failed { stage, error })
            }
        };

        store.append(reply);
        outcome
    }

    async fn run(
        &self,
        question: &str,
        history: ConversationWindow<'_>,
    ) -> std::result::Result<Answer, StageFailure> {
        debug!(stage = %TurnStage::Translating, history = history.len());
        let schema = self.schema.schema().at(TurnStage::Translating)?;
        let sql = self
            .translator
            .translate(self.model.as_ref(), question, &schema, &history)
            .await
            .at(TurnStage::Translating)?;

        debug!(stage = %TurnStage::Gating);
        gate::authorize(&sql).at(TurnStage::Gating)?;

        debug!(stage = %TurnStage::Executing);
        let result = self.executor.execute(&sql).after(TurnStage::Executing, &sql)?;

        debug!(stage = %TurnStage::Synthesizing, rows = result.row_count());
        let text = self
            .synthesizer
            .synthesize(self.model.as_ref(), question, &result, &history)
            .await
            .after(TurnStage::Synthesizing, &sql)?;

        Ok(Answer { sql, result, text })
    }
}
