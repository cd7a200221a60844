//! LLM integration for askdb.
//!
//! Provides the trait and implementations for translating natural-language
//! questions into SQL via a hosted model.

pub mod gemini;
pub mod mock;
pub mod parser;
pub mod prompt;
pub mod types;

pub use gemini::{GeminiClient, GeminiConfig};
pub use mock::MockLlmClient;
pub use parser::extract_sql;
pub use types::{Message, Role};

use async_trait::async_trait;
use std::str::FromStr;

use crate::error::{AskdbError, Result};

/// Trait for LLM clients that can generate completions.
///
/// Implementations must be thread-safe (Send + Sync) to support async
/// operations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates a completion for the given messages.
    ///
    /// Returns the complete response as a single string.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Google Gemini.
    #[default]
    Gemini,
    /// Mock client for testing (no API key required).
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Creates an LLM client for the given provider.
///
/// For Gemini the API key is resolved from `GOOGLE_API_KEY` (or
/// `GEMINI_API_KEY`); `model` selects the model to use.
pub fn create_client(provider: LlmProvider, model: &str) -> Result<Box<dyn LlmClient>> {
    match provider {
        LlmProvider::Gemini => {
            let key = std::env::var("GOOGLE_API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .map_err(|_| {
                    AskdbError::config(
                        "Google API key not found. Set the GOOGLE_API_KEY variable.",
                    )
                })?;
            Ok(Box::new(GeminiClient::new(GeminiConfig::new(key, model))?))
        }
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new())),
    }
}
