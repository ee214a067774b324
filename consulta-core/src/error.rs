use thiserror::Error;

/// Failures a turn can run into. Every variant is caught at the turn boundary
/// and turned into the assistant's reply; none of them is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The LLM collaborator could not be reached or rejected the request
    #[error("{message}")]
    Provider { message: String },

    /// The generated SQL failed against the store
    #[error("{message}")]
    Query { message: String },

    /// The generated SQL was not a read-only statement
    #[error("statement starting with {keyword} refused: only read queries are allowed")]
    UnsafeQueryRefused { keyword: &'static str },

    /// Speech-to-text produced no usable text
    #[error("the recording could not be transcribed with confidence")]
    TranscriptionAmbiguous,

    /// A prompt template failed to render
    #[error("failed to build prompt: {message}")]
    Prompt { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn provider(err: anyhow::Error) -> Self {
        Error::Provider {
            message: format!("{:#}", err),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Error::Query {
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::query(err.to_string())
    }
}

impl From<askama::Error> for Error {
    fn from(err: askama::Error) -> Self {
        Error::Prompt {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_provider_error_keeps_context_chain() {
        let err: anyhow::Result<()> = Err(anyhow::anyhow!("status 401")).context("chat request failed");
        let err = Error::provider(err.unwrap_err());
        assert_eq!(err.to_string(), "chat request failed: status 401");
    }

    #[test]
    fn test_sqlite_error_becomes_query_error() {
        let err: Error = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, Error::Query { .. }));
    }

    #[test]
    fn test_refusal_names_keyword() {
        let err = Error::UnsafeQueryRefused { keyword: "DROP" };
        assert!(err.to_string().contains("DROP"));
    }
}
