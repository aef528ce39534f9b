//! SQL synthesis for questions the template registry does not cover.
//!
//! Date+topic questions get a locally built "semi-template" with no provider
//! round-trip. Everything else goes to the completion provider, and its answer
//! passes a confidence gate before anyone may execute it.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::application::use_cases::prompts::{
    build_synthesis_system_prompt, build_synthesis_user_prompt,
};
use crate::application::use_cases::template_registry::{count_placeholders, TemplateRegistry};
use crate::domain::decision_schema::{DECISIONS_TABLE, LIST_COLUMNS};
use crate::domain::error::{AppError, Result};
use crate::domain::parameters::{
    ExtractedParameters, COUNT_ONLY, DATE_FROM, DATE_TO, GOVERNMENT_NUMBER, LIMIT, YEAR_EXACT,
};
use crate::domain::query::{
    ExpectedResultType, SqlConversion, CONFIDENCE_THRESHOLD, SEMI_TEMPLATE_CONFIDENCE,
};
use crate::infrastructure::llm_clients::{CompletionClient, CompletionRequest};
use crate::infrastructure::response::extract_json_payload;
use crate::shared::hebrew_dates::{normalize_date, CanonicalDate};

pub const GUIDANCE_SAMPLE_COUNT: usize = 6;
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Provider reply contract.
#[derive(Debug, Deserialize)]
struct SqlConversionResponse {
    #[serde(default)]
    sql: String,
    #[serde(default)]
    params: Vec<Value>,
    #[serde(default)]
    expected_type: Option<String>,
    #[serde(default)]
    confidence: Value,
    #[serde(default)]
    explanation: Option<String>,
}

impl SqlConversionResponse {
    fn confidence(&self) -> f64 {
        let raw = match &self.confidence {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        raw.filter(|c| c.is_finite()).unwrap_or(0.0).clamp(0.0, 1.0)
    }

    fn into_conversion(self) -> SqlConversion {
        let confidence = self.confidence();
        let sql = self.sql.trim().trim_end_matches(';').trim_end().to_string();
        SqlConversion {
            sql,
            params: self.params,
            expected_type: ExpectedResultType::parse_lenient(
                self.expected_type.as_deref().unwrap_or_default(),
            ),
            confidence,
            template_used: None,
            explanation: self
                .explanation
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| "שאילתה שנבנתה עבור השאלה".to_string()),
        }
    }
}

/// Guidance answer listing phrasings the registry understands.
pub fn guidance_conversion() -> SqlConversion {
    let mut explanation =
        String::from("לא הצלחתי להבין את השאלה בוודאות מספקת. אפשר לנסח אותה למשל כך:");
    for (sample, description) in TemplateRegistry::builtin().samples(GUIDANCE_SAMPLE_COUNT) {
        explanation.push_str(&format!("\n• {} ({})", sample, description));
    }
    SqlConversion::guidance(explanation)
}

/// Sequential `$n` placeholder allocation.
struct Binder {
    params: Vec<Value>,
}

impl Binder {
    fn new() -> Self {
        Self { params: Vec::new() }
    }

    fn bind(&mut self, value: Value) -> usize {
        self.params.push(value);
        self.params.len()
    }
}

fn date_range(params: &ExtractedParameters) -> (Option<String>, Option<String>) {
    let format = |date: chrono::NaiveDate| date.format("%Y-%m-%d").to_string();

    if let Some(year) = params.integer(YEAR_EXACT) {
        if let Some(date) = i32::try_from(year).ok().and_then(CanonicalDate::year) {
            return (date.first_day().map(format), date.last_day().map(format));
        }
    }

    let from = params
        .text(DATE_FROM)
        .and_then(|raw| normalize_date(&raw))
        .and_then(|date| date.first_day())
        .map(format);
    let to = params
        .text(DATE_TO)
        .and_then(|raw| normalize_date(&raw))
        .and_then(|date| date.last_day())
        .map(format);
    (from, to)
}

/// Date constraint + topic, optionally narrowed to one government.
fn semi_template(params: &ExtractedParameters, list_limit: i64) -> Option<SqlConversion> {
    if !params.has_date() {
        return None;
    }
    let topic = params.topic()?;
    let (from, to) = date_range(params);
    if from.is_none() && to.is_none() {
        return None;
    }
    if let (Some(from), Some(to)) = (&from, &to) {
        if from > to {
            return None;
        }
    }

    let mut binder = Binder::new();
    let mut clauses = Vec::new();

    let n = binder.bind(Value::from(format!("%{}%", topic)));
    clauses.push(format!(
        "(tags_policy_area ILIKE ${0} OR decision_title ILIKE ${0} OR summary ILIKE ${0})",
        n
    ));
    if let Some(from) = &from {
        let n = binder.bind(Value::from(from.clone()));
        clauses.push(format!("decision_date >= ${}::date", n));
    }
    if let Some(to) = &to {
        let n = binder.bind(Value::from(to.clone()));
        clauses.push(format!("decision_date <= ${}::date", n));
    }
    let government = params.text(GOVERNMENT_NUMBER);
    if let Some(government) = &government {
        let n = binder.bind(Value::from(government.clone()));
        clauses.push(format!("government_number = ${}", n));
    }

    let filter = clauses.join(" AND ");
    let count_only = params.flag(COUNT_ONLY);
    let (sql, expected_type) = if count_only {
        (
            format!(
                "SELECT COUNT(*) AS count FROM {} WHERE {}",
                DECISIONS_TABLE, filter
            ),
            ExpectedResultType::Count,
        )
    } else {
        let limit = params
            .integer(LIMIT)
            .unwrap_or(list_limit)
            .clamp(1, list_limit.max(1));
        let n = binder.bind(Value::from(limit));
        (
            format!(
                "SELECT {} FROM {} WHERE {} ORDER BY decision_date DESC LIMIT ${}",
                LIST_COLUMNS, DECISIONS_TABLE, filter, n
            ),
            ExpectedResultType::Multiple,
        )
    };

    let mut explanation = format!("החלטות בנושא {}", topic);
    if let Some(government) = &government {
        explanation.push_str(&format!(" של ממשלה {}", government));
    }
    match (&from, &to) {
        (Some(from), Some(to)) => explanation.push_str(&format!(" בין {} ל-{}", from, to)),
        (Some(from), None) => explanation.push_str(&format!(" החל מ-{}", from)),
        (None, Some(to)) => explanation.push_str(&format!(" עד {}", to)),
        (None, None) => {}
    }

    Some(SqlConversion {
        sql,
        params: binder.params,
        expected_type,
        confidence: SEMI_TEMPLATE_CONFIDENCE,
        template_used: None,
        explanation,
    })
}

/// Fatal only when the SQL expects parameters and none were supplied.
fn check_parameter_count(conversion: SqlConversion) -> Result<SqlConversion> {
    let expected = count_placeholders(&conversion.sql);
    let actual = conversion.params.len();
    if expected == actual {
        return Ok(conversion);
    }
    if actual == 0 {
        return Err(AppError::ParameterMismatch { expected, actual });
    }
    // TODO: decide whether a non-empty mismatch should also be fatal once
    // production logs show how often providers over- or under-bind.
    warn!(expected, actual, "Placeholder/parameter count mismatch passed through");
    Ok(conversion)
}

pub struct SqlSynthesizer {
    client: Arc<dyn CompletionClient>,
    list_limit: i64,
}

impl SqlSynthesizer {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    pub fn with_list_limit(mut self, list_limit: i64) -> Self {
        self.list_limit = list_limit.max(1);
        self
    }

    pub async fn synthesize(
        &self,
        query: &str,
        params: &ExtractedParameters,
    ) -> Result<SqlConversion> {
        if let Some(conversion) = semi_template(params, self.list_limit) {
            debug!(sql = %conversion.sql, "Built date+topic semi-template");
            return check_parameter_count(conversion);
        }

        let conversion = match self.request_conversion(query, params).await {
            Ok(conversion) => conversion,
            Err(err) => {
                warn!(error = %err, code = err.code(), "SQL synthesis failed, answering with guidance");
                return Ok(guidance_conversion());
            }
        };

        if conversion.sql.is_empty() || conversion.confidence < CONFIDENCE_THRESHOLD {
            info!(
                confidence = conversion.confidence,
                "Synthesized SQL below confidence threshold, answering with guidance"
            );
            return Ok(guidance_conversion());
        }

        check_parameter_count(conversion)
    }

    async fn request_conversion(
        &self,
        query: &str,
        params: &ExtractedParameters,
    ) -> Result<SqlConversion> {
        let request = CompletionRequest::json(
            build_synthesis_system_prompt(),
            build_synthesis_user_prompt(query, params),
        );
        let response = self.client.complete(request).await?;
        let payload = extract_json_payload(&response.content);
        let parsed: SqlConversionResponse = serde_json::from_str(&payload)
            .map_err(|e| AppError::ParseError(format!("Synthesis payload: {}", e)))?;
        Ok(parsed.into_conversion())
    }
}
