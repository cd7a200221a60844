//! Prompt construction for SQL generation.
//!
//! Holds the fixed instruction template for the t-shirts inventory database
//! and assembles the message list sent to the LLM.

use crate::llm::types::Message;

/// System prompt for the SQL generation assistant.
///
/// The schema is fixed: one `t_shirts` table. The few-shot examples pin the
/// expected output format (bare SQL, no prose).
const SYSTEM_PROMPT: &str = r#"You are a SQL generation assistant for a t-shirts inventory database.
Generate a SQL SELECT query that fetches only the relevant fields asked by the user.

DO:
- Use only SELECT queries.
- Select only the columns mentioned in the question (like price, size, color, brand) - do NOT use t_shirt_id unless explicitly asked.
- Always filter using WHERE if conditions are given.
- Use lowercase column and table names, valid for PostgreSQL.
- The table is called t_shirts.

DO NOT:
- Do NOT select columns not asked (e.g., avoid t_shirt_id or * unless the user says so).
- Do NOT alias columns or add explanation.
- Do NOT return anything other than SQL code.

Examples:

Q: List the price of all the white t-shirts from Nike Brand in all the sizes.
A: SELECT size, price FROM t_shirts WHERE brand = 'Nike' AND color = 'white';

Q: What colors are available for Puma?
A: SELECT DISTINCT color FROM t_shirts WHERE brand = 'Puma';

Q: Show me all stock data for large size.
A: SELECT * FROM t_shirts WHERE size = 'large';

Return only the SQL query. No explanation."#;

/// Returns the fixed system prompt.
pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// Builds the complete message list for an LLM request.
pub fn build_messages(question: &str) -> Vec<Message> {
    vec![Message::system(SYSTEM_PROMPT), Message::user(question)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::Role;

    #[test]
    fn test_system_prompt_names_the_table() {
        let prompt = system_prompt();
        assert!(prompt.contains("t_shirts"));
        assert!(prompt.contains("SELECT"));
        assert!(prompt.contains("PostgreSQL"));
    }

    #[test]
    fn test_system_prompt_contains_few_shot_examples() {
        let prompt = system_prompt();
        assert!(prompt.contains("Q: What colors are available for Puma?"));
        assert!(prompt.contains("A: SELECT DISTINCT color FROM t_shirts WHERE brand = 'Puma';"));
    }

    #[test]
    fn test_build_messages() {
        let messages = build_messages("How many Nike t-shirts do we have left?");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(
            messages[1].content,
            "How many Nike t-shirts do we have left?"
        );
    }
}
