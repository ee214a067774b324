use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[default]
    Assistant,
    System,
}

#[derive(Clone, Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn get_text(&self) -> &str {
        &self.content
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct ChatRequest {
    pub(crate) messages: Vec<ChatMessage>,
    pub(crate) temperature: Option<f32>,
}

impl ChatRequest {
    /// A system instruction followed by one user message.
    pub fn system_and_user(system: impl Into<String>, user: impl Into<String>) -> Self {
        ChatRequest {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: None,
        }
    }

    /// A single user message carrying both the instructions and the user content,
    /// for deployments that do not accept a system role.
    pub fn combined_user(system: impl Into<String>, user: impl Into<String>) -> Self {
        let content = format!("{}\n\n{}", system.into(), user.into());
        ChatRequest {
            messages: vec![ChatMessage::user(content)],
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Get a reference to the messages
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Concatenated text of every message with the given role.
    pub fn text_for(&self, role: Role) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == role)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_constructors() {
        let user_msg = ChatMessage::user("Test");
        assert_eq!(user_msg.role, Role::User);
        assert_eq!(user_msg.get_text(), "Test");

        let assistant_msg = ChatMessage::assistant("Test");
        assert_eq!(assistant_msg.role, Role::Assistant);

        let system_msg = ChatMessage::system("Test");
        assert_eq!(system_msg.role, Role::System);
    }

    #[test]
    fn test_system_and_user_shape() {
        let request = ChatRequest::system_and_user("rules", "question");
        assert_eq!(request.messages().len(), 2);
        assert_eq!(request.messages()[0].role, Role::System);
        assert_eq!(request.messages()[1].role, Role::User);
        assert_eq!(request.text_for(Role::System), "rules");
    }

    #[test]
    fn test_combined_user_shape() {
        let request = ChatRequest::combined_user("rules", "question");
        assert_eq!(request.messages().len(), 1);
        assert_eq!(request.messages()[0].role, Role::User);
        assert_eq!(request.messages()[0].content, "rules\n\nquestion");
        assert!(request.text_for(Role::System).is_empty());
    }

    #[test]
    fn test_role_serialization() {
        let msg = ChatMessage::system("Hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"system\""));
        assert!(json.contains("\"content\":\"Hi\""));
    }

    #[test]
    fn test_missing_role_defaults_to_assistant() {
        let msg: ChatMessage = serde_json::from_str(r#"{"content":"ok"}"#).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "ok");
    }
}
