use async_trait::async_trait;
use consulta_core::database::seed::init_demo_database;
use llm::{ChatMessage, ChatModel, ChatRequest};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Chat model that plays back fixed completions and records what it was asked
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatMessage> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(reply) => Ok(ChatMessage::assistant(reply)),
            None => Err(anyhow::anyhow!("no scripted reply left")),
        }
    }
}

/// Seeded demo database in the temp dir, removed on drop
pub struct TempDatabase {
    pub path: PathBuf,
}

impl TempDatabase {
    pub fn seeded() -> Self {
        let path = std::env::temp_dir().join(format!("consulta-it-{}.db", uuid::Uuid::new_v4()));
        init_demo_database(&path).unwrap();
        Self { path }
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
