//! Prompt templates for the translation and synthesis stages

use askama::Template;
use config::PromptShape;
use llm::ChatRequest;

/// Instructions for turning a question into a single read-only statement
#[derive(Template)]
#[template(path = "translate_system.txt", escape = "none")]
pub(crate) struct TranslateSystemPrompt<'a> {
    pub schema: &'a str,
    pub row_limit: usize,
    pub unanswerable: &'a str,
    pub hints: &'a [String],
}

#[derive(Template)]
#[template(path = "translate_user.txt", escape = "none")]
pub(crate) struct TranslateUserPrompt<'a> {
    pub history: &'a str,
    pub question: &'a str,
}

/// Instructions for phrasing a query result as an answer
#[derive(Template)]
#[template(path = "synthesize_system.txt", escape = "none")]
pub(crate) struct SynthesizeSystemPrompt<'a> {
    pub language: &'a str,
    pub date_format: &'a str,
    pub no_results: &'a str,
}

#[derive(Template)]
#[template(path = "synthesize_user.txt", escape = "none")]
pub(crate) struct SynthesizeUserPrompt<'a> {
    pub history: &'a str,
    pub question: &'a str,
    pub result: &'a str,
}

/// Package the two prompts in the message layout the provider expects.
pub(crate) fn chat_request(shape: PromptShape, system: String, user: String) -> ChatRequest {
    match shape {
        PromptShape::Split => ChatRequest::system_and_user(system, user),
        PromptShape::Combined => ChatRequest::combined_user(system, user),
    }
}
