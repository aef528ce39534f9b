use once_cell::sync::Lazy;
use regex::Regex;

static THINK_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>").unwrap());

static REASONING_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<reasoning>[\s\S]*?</reasoning>").unwrap());

/// Removes reasoning blocks some models emit ahead of the answer.
pub fn clean_llm_response(response: &str) -> String {
    let cleaned = THINK_TAG_PATTERN.replace_all(response, "");
    let cleaned = REASONING_TAG_PATTERN.replace_all(&cleaned, "");
    cleaned.trim().to_string()
}

/// Best-effort isolation of the JSON object inside a completion.
///
/// Handles bare JSON, fenced blocks (```json ... ```), and prose wrapped around a
/// single object. The result may still be invalid JSON; callers parse it.
pub fn extract_json_payload(output: &str) -> String {
    let cleaned = clean_llm_response(output);
    let unfenced = strip_code_fence(&cleaned);
    if serde_json::from_str::<serde_json::Value>(&unfenced).is_ok() {
        return unfenced;
    }

    match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => unfenced[start..=end].to_string(),
        _ => unfenced,
    }
}

fn strip_code_fence(value: &str) -> String {
    let trimmed = value.trim();
    if let Some(stripped) = trimmed.strip_prefix("```json") {
        return stripped.trim().trim_end_matches("```").trim().to_string();
    }
    if let Some(stripped) = trimmed.strip_prefix("```") {
        return stripped.trim().trim_end_matches("```").trim().to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_think_tags() {
        let input = "<think>Some reasoning here</think>{\"a\": 1}";
        assert_eq!(clean_llm_response(input), "{\"a\": 1}");
        assert_eq!(clean_llm_response("<think />ok"), "ok");
        assert_eq!(clean_llm_response("<reasoning>x</reasoning> ok "), "ok");
    }

    #[test]
    fn test_extract_fenced_json() {
        let input = "```json\n{\"sql\": \"SELECT 1\"}\n```";
        assert_eq!(extract_json_payload(input), "{\"sql\": \"SELECT 1\"}");

        let bare_fence = "```\n{\"limit\": 5}\n```";
        assert_eq!(extract_json_payload(bare_fence), "{\"limit\": 5}");
    }

    #[test]
    fn test_extract_object_from_prose() {
        let input = "הנה התשובה:\n{\"government_number\": \"37\"}\nבהצלחה";
        assert_eq!(extract_json_payload(input), "{\"government_number\": \"37\"}");
    }

    #[test]
    fn test_non_json_passes_through() {
        assert_eq!(extract_json_payload("  no json here "), "no json here");
    }
}
