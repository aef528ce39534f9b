//! LLM-backed extraction of search parameters for queries no template covers.
//!
//! The provider answers with a flat JSON object. Everything it returns is
//! re-normalized locally: keys are canonicalized, placeholder values dropped,
//! dates turned into ISO bounds and tags snapped onto the taxonomy. Any failure
//! degrades to an empty map so the synthesizer can still try.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::application::use_cases::prompts::{
    build_extraction_system_prompt, build_extraction_user_prompt,
};
use crate::domain::decision_schema::{DECLARATIVE, OPERATIVE};
use crate::domain::error::{AppError, Result};
use crate::domain::parameters::{
    canonical_key, is_placeholder, ExtractedParameters, COUNT_ONLY, DATE_FROM, DATE_TO,
    DECISION_NUMBER, GOVERNMENT_NUMBER, LIMIT, OPERATIVITY, PRIME_MINISTER, TAGS_POLICY_AREA,
    TOPIC_FREE, YEAR_EXACT,
};
use crate::infrastructure::llm_clients::{CompletionClient, CompletionRequest};
use crate::infrastructure::response::extract_json_payload;
use crate::shared::{convert_ordinal, match_tag, normalize_date_at};

pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 100;

pub struct ParameterExtractor {
    client: Arc<dyn CompletionClient>,
}

impl ParameterExtractor {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Never fails: provider and parse errors yield an empty map.
    pub async fn extract(&self, query: &str) -> ExtractedParameters {
        match self.try_extract(query).await {
            Ok(params) => {
                debug!(count = params.len(), "Extracted query parameters");
                params
            }
            Err(err) => {
                warn!(error = %err, code = err.code(), "Parameter extraction degraded to empty");
                ExtractedParameters::new()
            }
        }
    }

    async fn try_extract(&self, query: &str) -> Result<ExtractedParameters> {
        let request = CompletionRequest::json(
            build_extraction_system_prompt(),
            build_extraction_user_prompt(query),
        );
        let response = self.client.complete(request).await?;
        if response.content.trim().is_empty() {
            return Err(AppError::LLMError("Empty completion".to_string()));
        }

        let payload = extract_json_payload(&response.content);
        let value: Value = serde_json::from_str(&payload)
            .map_err(|e| AppError::ParseError(format!("Extraction payload: {}", e)))?;
        match value {
            Value::Object(raw) => Ok(normalize_parameters(raw, Local::now().date_naive())),
            other => Err(AppError::ParseError(format!(
                "Extraction payload is not an object: {}",
                other
            ))),
        }
    }
}

/// Canonicalizes a raw provider object against `today` for relative dates.
pub fn normalize_parameters(raw: Map<String, Value>, today: NaiveDate) -> ExtractedParameters {
    // Exact canonical spellings beat aliases of the same key.
    let mut canonical: BTreeMap<&'static str, (bool, Value)> = BTreeMap::new();
    for (raw_key, value) in raw {
        let Some(key) = canonical_key(&raw_key) else {
            debug!(key = %raw_key, "Dropping unknown extraction key");
            continue;
        };
        if is_placeholder(&value) {
            continue;
        }
        let exact = raw_key == key;
        match canonical.get(key) {
            Some((true, _)) => {}
            Some((false, _)) if !exact => {}
            _ => {
                canonical.insert(key, (exact, value));
            }
        }
    }

    let mut params = ExtractedParameters::new();
    let mut unresolved_tag = None;
    for (key, (_, value)) in canonical {
        if value.is_null() {
            params.insert(key, Value::Null);
            continue;
        }
        let normalized = match key {
            DATE_FROM => date_bound(&value, today, true),
            DATE_TO => date_bound(&value, today, false),
            YEAR_EXACT => year_value(&value, today),
            TAGS_POLICY_AREA => match scalar_text(&value) {
                Some(text) => match match_tag(&text) {
                    Some(tag) => Some(Value::from(tag)),
                    None => {
                        unresolved_tag = Some(text);
                        None
                    }
                },
                None => None,
            },
            TOPIC_FREE | PRIME_MINISTER => scalar_text(&value).map(Value::from),
            GOVERNMENT_NUMBER | DECISION_NUMBER => number_text(&value).map(Value::from),
            OPERATIVITY => operativity_value(&value).map(Value::from),
            LIMIT => limit_value(&value).map(Value::from),
            COUNT_ONLY => flag_value(&value).map(Value::from),
            _ => None,
        };
        match normalized {
            Some(normalized) => params.insert(key, normalized),
            None => debug!(key, "Dropping unusable extraction value"),
        }
    }

    if let Some(text) = unresolved_tag {
        if !params.contains(TOPIC_FREE) {
            debug!(topic = %text, "Unresolved policy tag moved to free-text topic");
            params.insert(TOPIC_FREE, Value::from(text));
        }
    }

    params
}

/// Strings trimmed, numbers rendered, first element of an array.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.iter().find_map(scalar_text),
        _ => None,
    }
}

fn date_bound(value: &Value, today: NaiveDate, start: bool) -> Option<Value> {
    let text = scalar_text(value)?;
    let date = normalize_date_at(&text, today)?;
    let bound = if start {
        date.first_day()
    } else {
        date.last_day()
    }?;
    Some(Value::from(bound.format("%Y-%m-%d").to_string()))
}

fn year_value(value: &Value, today: NaiveDate) -> Option<Value> {
    let text = scalar_text(value)?;
    normalize_date_at(&text, today).map(|date| Value::from(date.year))
}

/// Digits only: "37", " 37 ", "ה-37" and ordinal words all become "37"-style text.
fn number_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n.to_string()),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .trim_start_matches("ה-")
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return Some(digits.trim_start_matches('0').to_string()).filter(|d| !d.is_empty());
            }
            convert_ordinal(s)
        }
        _ => None,
    }
}

fn operativity_value(value: &Value) -> Option<&'static str> {
    let text = scalar_text(value)?.to_lowercase();
    if text.contains("אופרטיב") || text.starts_with("operativ") {
        Some(OPERATIVE)
    } else if text.contains("דקלרטיב") || text.starts_with("declarativ") {
        Some(DECLARATIVE)
    } else {
        None
    }
}

fn limit_value(value: &Value) -> Option<i64> {
    let limit = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    Some(limit.clamp(MIN_LIMIT, MAX_LIMIT))
}

fn flag_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "כן" => Some(true),
            "false" | "no" | "לא" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}
