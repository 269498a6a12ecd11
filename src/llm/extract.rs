//! Pull JSON out of model output that may be wrapped in markdown or prose.

/// Extract a JSON object (`{...}`) from LLM output.
pub fn extract_json_object(text: &str) -> Option<&str> {
    extract_delimited(text, '{', '}')
}

/// Extract a JSON array (`[...]`) from LLM output.
pub fn extract_json_array(text: &str) -> Option<&str> {
    extract_delimited(text, '[', ']')
}

fn extract_delimited(text: &str, open: char, close: char) -> Option<&str> {
    let trimmed = text.trim();

    // Fenced block first, so prose containing brackets around it is ignored
    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with(open) && inner.ends_with(close) {
                return Some(inner);
            }
        }
    }

    let start = trimmed.find(open)?;
    let end = trimmed.rfind(close)?;
    if end > start {
        Some(&trimmed[start..=end])
    } else {
        None
    }
}

/// Strip surrounding quotes and whitespace from a short free-text reply.
pub fn clean_text_reply(text: &str) -> String {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}
