use crate::api::{ChatMessage, ChatRequest};
use crate::client::Client;
use crate::ChatModel;
use async_trait::async_trait;

use super::api::{ChatCompletionRequest, ChatCompletionResponse};

#[derive(Clone)]
pub struct OpenAIChatModel {
    client: Client,
    base_url: String,
    model_name: String,
}

impl OpenAIChatModel {
    pub fn new(client: Client, base_url: String, model_name: String) -> Self {
        OpenAIChatModel {
            client,
            base_url,
            model_name,
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatMessage> {
        let openai_request = ChatCompletionRequest::from_request(self.model_name.clone(), request);
        let response: ChatCompletionResponse =
            self.client.post(self.chat_url(), &openai_request).await?;
        ChatMessage::try_from(response)
    }
}
