pub mod paths;
pub mod settings;

pub use paths::PathManager;
pub use settings::{Messages, PromptShape, RetrySettings, Settings};

/// Environment variable holding the LLM provider credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Load environment variables from ./.env and ~/.env.
/// Project directory values take precedence over home directory values, and
/// variables already set in the environment are never overwritten.
/// Call this before parsing CLI args to ensure env vars are available.
pub fn load_env_file() {
    // Project directory first: dotenv never overwrites a variable that is already set
    dotenv::dotenv().ok();

    if let Some(home) = dirs::home_dir() {
        let home_env_path = home.join(".env");
        dotenv::from_path(home_env_path).ok();
    }
}

/// Read the provider credential. Blank values count as missing.
pub fn api_key() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}
