//! Mock LLM client for testing.
//!
//! Provides deterministic SQL responses based on input patterns.

use async_trait::async_trait;

use crate::error::Result;
use crate::llm::types::Message;
use crate::llm::LlmClient;

/// Mock LLM client that returns canned SQL based on question patterns.
///
/// Used for unit testing and offline runs without real API calls.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Custom response mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When the input contains `pattern`, the mock will return `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Generates a mock response based on the question.
    fn mock_response(&self, input: &str) -> String {
        let input_lower = input.to_lowercase();

        // Check custom responses first
        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        // Default pattern matching against the t-shirts inventory
        if input_lower.contains("how many") || input_lower.contains("count") {
            return "```sql\nSELECT COUNT(*) FROM t_shirts;\n```".to_string();
        }

        if input_lower.contains("total stock") {
            return "```sql\nSELECT SUM(stock_quantity) FROM t_shirts;\n```".to_string();
        }

        if input_lower.contains("colors") {
            return "```sql\nSELECT DISTINCT color FROM t_shirts;\n```".to_string();
        }

        if input_lower.contains("all") && input_lower.contains("data") {
            return "```sql\nSELECT * FROM t_shirts;\n```".to_string();
        }

        if input_lower.contains("price") {
            return "```sql\nSELECT size, price FROM t_shirts;\n```".to_string();
        }

        "SELECT brand, color, size FROM t_shirts;".to_string()
    }

    /// Extracts the last user message content from a message list.
    fn extract_user_input(messages: &[Message]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == crate::llm::types::Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let input = Self::extract_user_input(messages);
        Ok(self.mock_response(&input))
    }
}
