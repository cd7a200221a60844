//! Response cleanup for LLM outputs.
//!
//! The prompt demands bare SQL, but models routinely wrap it in markdown code
//! fences anyway. This strips them off.

/// Extracts SQL from an LLM response.
///
/// Handles the following shapes:
/// - ```sql ... ```
/// - ``` ... ``` (no language specifier)
/// - bare SQL with no fences
///
/// If multiple fenced blocks are present, the first one is used. The result
/// is whitespace-trimmed; it may be empty if the model returned nothing
/// usable.
pub fn extract_sql(response: &str) -> String {
    if let Some(block) = extract_fenced_block(response) {
        return block.trim().to_string();
    }

    response.trim().to_string()
}

/// Extracts the first fenced code block, tolerating an optional language tag.
fn extract_fenced_block(text: &str) -> Option<String> {
    let start_idx = text.find("```")?;
    let after_fence = &text[start_idx + 3..];

    // Skip the language tag (e.g. "sql") up to the end of the line.
    let content_start = after_fence.find('\n')? + 1;
    let content = &after_fence[content_start..];

    let end_idx = content.find("```")?;
    Some(content[..end_idx].to_string())
}
