mod audio;
pub(crate) mod chat;
mod provider;

pub use audio::OpenAITranscriber;
pub use chat::OpenAIChatModel;
pub use provider::OpenAIProvider;
