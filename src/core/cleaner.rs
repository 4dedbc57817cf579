// src/core/cleaner.rs — Strip the Markdown fence wrapped around a model reply

const FENCE: &str = "```";

/// Remove one leading language-tagged fence opener (e.g. "```python\n") and one
/// trailing bare closer ("```") when both are present. Anything else is
/// returned unchanged, including fences in the middle of the text.
pub fn clean_response(content: &str) -> String {
    match strip_fence(content) {
        Some(inner) => inner.to_string(),
        None => content.to_string(),
    }
}

fn strip_fence(content: &str) -> Option<&str> {
    let after_ticks = content.strip_prefix(FENCE)?;
    let (tag, body) = after_ticks.split_once('\n')?;
    if !is_language_tag(tag) {
        return None;
    }
    body.strip_suffix(FENCE)
}

fn is_language_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-' | '.'))
}
