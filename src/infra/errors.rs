// src/infra/errors.rs — Error types for suitegen

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SuiteGenError {
    // Provider errors (never retried locally)
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    #[error("Rate limited by '{provider}': {message}")]
    RateLimited { provider: String, message: String },

    #[error("GEMINI_API_KEY is not set. Export it or add it to a .env file.")]
    MissingApiKey,

    // Evaluator reply did not match {"score": int, "feedback": str}
    #[error("Malformed evaluation response: {reason}")]
    EvaluationParse { reason: String, raw: String },

    #[error("Test runner '{program}' could not be started: {source}")]
    Runner {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid loop transition: {event} while {state}")]
    Transition { state: String, event: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SuiteGenError {
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        SuiteGenError::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether the failure came from the model backend.
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            SuiteGenError::Provider { .. } | SuiteGenError::RateLimited { .. }
        )
    }
}
