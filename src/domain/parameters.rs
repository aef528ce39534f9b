use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DATE_FROM: &str = "date_from";
pub const DATE_TO: &str = "date_to";
pub const YEAR_EXACT: &str = "year_exact";
pub const TAGS_POLICY_AREA: &str = "tags_policy_area";
pub const TOPIC_FREE: &str = "topic_free";
pub const GOVERNMENT_NUMBER: &str = "government_number";
pub const DECISION_NUMBER: &str = "decision_number";
pub const PRIME_MINISTER: &str = "prime_minister";
pub const OPERATIVITY: &str = "operativity";
pub const LIMIT: &str = "limit";
pub const COUNT_ONLY: &str = "count_only";

pub const CANONICAL_KEYS: [&str; 11] = [
    DATE_FROM,
    DATE_TO,
    YEAR_EXACT,
    TAGS_POLICY_AREA,
    TOPIC_FREE,
    GOVERNMENT_NUMBER,
    DECISION_NUMBER,
    PRIME_MINISTER,
    OPERATIVITY,
    LIMIT,
    COUNT_ONLY,
];

/// Maps loose key spellings seen in provider output onto canonical names.
pub fn canonical_key(raw: &str) -> Option<&'static str> {
    let key = raw.trim().to_lowercase().replace(['-', ' '], "_");
    let canonical = match key.as_str() {
        "date_from" | "from_date" | "start_date" | "date_start" => DATE_FROM,
        "date_to" | "to_date" | "end_date" | "date_end" => DATE_TO,
        "year_exact" | "year" => YEAR_EXACT,
        "tags_policy_area" | "tag" | "policy_area" | "topic_tag" => TAGS_POLICY_AREA,
        "topic_free" | "topic" | "free_text" | "keywords" => TOPIC_FREE,
        "government_number" | "government" | "gov_number" => GOVERNMENT_NUMBER,
        "decision_number" | "decision" | "decision_no" => DECISION_NUMBER,
        "prime_minister" | "pm" => PRIME_MINISTER,
        "operativity" => OPERATIVITY,
        "limit" | "top_n" => LIMIT,
        "count_only" | "is_count" => COUNT_ONLY,
        _ => return None,
    };
    Some(canonical)
}

/// Placeholder strings a model emits instead of omitting a key.
pub fn is_placeholder(value: &Value) -> bool {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.is_empty()
                || matches!(
                    trimmed.to_lowercase().as_str(),
                    "null" | "none" | "n/a" | "na" | "unknown" | "undefined" | "-"
                )
                || matches!(trimmed, "לא ידוע" | "אין" | "לא צוין")
        }
        _ => false,
    }
}

/// Flat parameter map. A missing key means absence; an explicit `null` is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedParameters(BTreeMap<String, Value>);

impl ExtractedParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Present and non-null string, numbers rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(Value::Bool(true)))
    }

    pub fn has_date(&self) -> bool {
        [DATE_FROM, DATE_TO, YEAR_EXACT]
            .iter()
            .any(|key| self.text(key).is_some())
    }

    pub fn topic(&self) -> Option<String> {
        self.text(TAGS_POLICY_AREA)
            .or_else(|| self.text(TOPIC_FREE))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.0).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_key_aliases() {
        assert_eq!(canonical_key("Year"), Some(YEAR_EXACT));
        assert_eq!(canonical_key("start-date"), Some(DATE_FROM));
        assert_eq!(canonical_key("government"), Some(GOVERNMENT_NUMBER));
        assert_eq!(canonical_key("mood"), None);
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder(&json!("")));
        assert!(is_placeholder(&json!("N/A")));
        assert!(is_placeholder(&json!("לא ידוע")));
        assert!(!is_placeholder(&json!("חינוך")));
        assert!(!is_placeholder(&json!(0)));
        assert!(!is_placeholder(&Value::Null));
    }

    #[test]
    fn test_explicit_null_is_distinct_from_absence() {
        let mut params = ExtractedParameters::new();
        params.insert(LIMIT, Value::Null);
        assert!(params.contains(LIMIT));
        assert!(!params.contains(COUNT_ONLY));
        assert_eq!(params.integer(LIMIT), None);
    }

    #[test]
    fn test_accessors() {
        let mut params = ExtractedParameters::new();
        params.insert(GOVERNMENT_NUMBER, json!(37));
        params.insert(TOPIC_FREE, json!(" תחבורה "));
        params.insert(COUNT_ONLY, json!(true));
        assert_eq!(params.text(GOVERNMENT_NUMBER).as_deref(), Some("37"));
        assert_eq!(params.topic().as_deref(), Some("תחבורה"));
        assert!(params.flag(COUNT_ONLY));
        assert!(!params.has_date());
    }
}
