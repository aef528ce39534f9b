use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::AppError;

/// Fixed confidence for results produced by the template registry.
pub const TEMPLATE_CONFIDENCE: f64 = 0.95;
/// Confidence of the locally built date+topic shape in the synthesizer.
pub const SEMI_TEMPLATE_CONFIDENCE: f64 = 0.85;
/// Below this, synthesized SQL is never executed.
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;
/// Zero-row, side-effect-free statement used for guidance answers.
pub const GUIDANCE_SQL: &str = "SELECT NULL AS guidance WHERE FALSE";

/// Envelope `type` values beyond the four result shapes.
pub const GUIDANCE_KIND: &str = "guidance";
pub const ERROR_KIND: &str = "error";

pub type DecisionRow = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedResultType {
    Single,
    Multiple,
    Count,
    Aggregate,
}

impl ExpectedResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpectedResultType::Single => "single",
            ExpectedResultType::Multiple => "multiple",
            ExpectedResultType::Count => "count",
            ExpectedResultType::Aggregate => "aggregate",
        }
    }

    /// Lenient parse for provider output; unknown values fall back to `Multiple`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "single" => ExpectedResultType::Single,
            "count" => ExpectedResultType::Count,
            "aggregate" => ExpectedResultType::Aggregate,
            _ => ExpectedResultType::Multiple,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlConversion {
    pub sql: String,
    pub params: Vec<Value>,
    pub expected_type: ExpectedResultType,
    pub confidence: f64,
    pub template_used: Option<String>,
    pub explanation: String,
}

impl SqlConversion {
    pub fn guidance(explanation: String) -> Self {
        Self {
            sql: GUIDANCE_SQL.to_string(),
            params: Vec::new(),
            expected_type: ExpectedResultType::Multiple,
            confidence: 0.0,
            template_used: None,
            explanation,
        }
    }

    pub fn is_guidance(&self) -> bool {
        self.confidence < CONFIDENCE_THRESHOLD
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub rows: Option<Vec<DecisionRow>>,
    pub row_count: usize,
    pub execution_time_ms: u64,
    pub error_code: Option<String>,
}

impl ExecutionResult {
    pub fn empty() -> Self {
        Self {
            success: true,
            rows: Some(Vec::new()),
            row_count: 0,
            execution_time_ms: 0,
            error_code: None,
        }
    }

    pub fn rows(&self) -> &[DecisionRow] {
        self.rows.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMetadata {
    pub sql_query: Option<String>,
    pub execution_time: u64,
    pub row_count: usize,
    pub session_id: Option<String>,
    pub query_id: String,
    pub confidence: f64,
    pub template_used: Option<String>,
}

/// Uniform response envelope for every processed query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub success: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Vec<DecisionRow>,
    pub formatted: String,
    pub metadata: QueryMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    /// Error envelope: Hebrew text for the user, the operator code in `error`.
    pub fn failure(error: &AppError, metadata: QueryMetadata) -> Self {
        Self {
            success: false,
            kind: ERROR_KIND.to_string(),
            data: Vec::new(),
            formatted: error.user_message().to_string(),
            metadata,
            error: Some(error.code().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub database: bool,
    pub converter: bool,
    pub template_used: Option<String>,
    pub checked_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guidance_is_below_threshold() {
        let conversion = SqlConversion::guidance("נסה לנסח מחדש".to_string());
        assert!(conversion.is_guidance());
        assert_eq!(conversion.sql, GUIDANCE_SQL);
        assert!(conversion.params.is_empty());
    }

    #[test]
    fn test_expected_type_serializes_lowercase() {
        let json = serde_json::to_string(&ExpectedResultType::Aggregate).unwrap();
        assert_eq!(json, "\"aggregate\"");
        assert_eq!(
            ExpectedResultType::parse_lenient(" COUNT "),
            ExpectedResultType::Count
        );
        assert_eq!(
            ExpectedResultType::parse_lenient("table"),
            ExpectedResultType::Multiple
        );
    }

    #[test]
    fn test_query_result_uses_type_key() {
        let result = QueryResult {
            success: true,
            kind: "count".to_string(),
            data: Vec::new(),
            formatted: String::new(),
            metadata: QueryMetadata {
                sql_query: None,
                execution_time: 0,
                row_count: 0,
                session_id: None,
                query_id: "q".to_string(),
                confidence: TEMPLATE_CONFIDENCE,
                template_used: None,
            },
            error: None,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "count");
        assert!(value.get("error").is_none());
    }
}
