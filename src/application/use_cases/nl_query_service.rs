use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::use_cases::query_converter::QueryConverter;
use crate::application::use_cases::response_formatter::ResponseFormatter;
use crate::application::use_cases::sql_validator::SqlValidator;
use crate::domain::error::{AppError, Result};
use crate::domain::query::{
    ExecutionResult, HealthReport, HealthStatus, QueryMetadata, QueryResult, SqlConversion,
    GUIDANCE_KIND,
};
use crate::infrastructure::db::DecisionStore;

/// Probe phrasing for health checks; always answered by a template.
pub const HEALTH_PROBE_QUERY: &str = "החלטה 1 של ממשלה 37";

pub struct NlQueryService {
    converter: QueryConverter,
    validator: SqlValidator,
    store: Arc<dyn DecisionStore>,
    formatter: ResponseFormatter,
}

impl NlQueryService {
    pub fn new(converter: QueryConverter, store: Arc<dyn DecisionStore>) -> Self {
        Self {
            converter,
            validator: SqlValidator::new(),
            store,
            formatter: ResponseFormatter::new(),
        }
    }

    /// Full pipeline: convert, gate, validate, execute, format.
    ///
    /// Always returns an envelope. Fatal errors become
    /// `{success: false, type: "error"}` with Hebrew `formatted` text.
    pub async fn process_natural_query(
        &self,
        query: &str,
        session_id: Option<String>,
    ) -> QueryResult {
        let query_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        info!(query_id = %query_id, session_id = ?session_id, "Processing natural-language query");

        let conversion = match self.converter.convert(query).await {
            Ok(conversion) => conversion,
            Err(err) => return self.error_result(err, None, session_id, query_id, started),
        };

        if conversion.is_guidance() {
            info!(query_id = %query_id, "Answering with guidance, store not queried");
            let formatted = self.formatter.format_guidance(&conversion.explanation);
            let metadata = Self::metadata(&conversion, 0, session_id, query_id, started);
            return QueryResult {
                success: true,
                kind: GUIDANCE_KIND.to_string(),
                data: Vec::new(),
                formatted,
                metadata,
                error: None,
            };
        }

        if let Err(err) = self.validator.validate(&conversion.sql) {
            return self.error_result(err, Some(&conversion), session_id, query_id, started);
        }

        let execution = match self.store.execute(&conversion.sql, &conversion.params).await {
            Ok(execution) => execution,
            Err(err) => {
                return self.error_result(err, Some(&conversion), session_id, query_id, started)
            }
        };

        let rows = execution.rows.unwrap_or_default();
        let formatted = self
            .formatter
            .format(conversion.expected_type, &rows, query);
        let metadata = Self::metadata(&conversion, rows.len(), session_id, query_id, started);
        info!(
            query_id = %metadata.query_id,
            row_count = metadata.row_count,
            execution_time_ms = metadata.execution_time,
            template = ?metadata.template_used,
            "Query processed"
        );

        QueryResult {
            success: true,
            kind: conversion.expected_type.as_str().to_string(),
            data: rows,
            formatted,
            metadata,
            error: None,
        }
    }

    /// Diagnostic path: caller-supplied SQL, still validated.
    pub async fn execute_raw_sql(&self, sql: &str, params: &[Value]) -> Result<ExecutionResult> {
        self.validator.validate(sql)?;
        self.store.execute(sql, params).await
    }

    pub async fn health_check(&self) -> HealthReport {
        let database = match self.store.ping().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "Health check: database unreachable");
                false
            }
        };
        let template_used = self
            .converter
            .convert_with_templates(HEALTH_PROBE_QUERY)
            .and_then(|conversion| conversion.template_used);
        let converter = template_used.is_some();

        let status = match (database, converter) {
            (true, true) => HealthStatus::Healthy,
            (false, false) => HealthStatus::Unhealthy,
            _ => HealthStatus::Degraded,
        };

        HealthReport {
            status,
            database,
            converter,
            template_used,
            checked_at: Utc::now().to_rfc3339(),
        }
    }

    fn metadata(
        conversion: &SqlConversion,
        row_count: usize,
        session_id: Option<String>,
        query_id: String,
        started: Instant,
    ) -> QueryMetadata {
        QueryMetadata {
            sql_query: Some(conversion.sql.clone()),
            execution_time: started.elapsed().as_millis() as u64,
            row_count,
            session_id,
            query_id,
            confidence: conversion.confidence,
            template_used: conversion.template_used.clone(),
        }
    }

    fn error_result(
        &self,
        err: AppError,
        conversion: Option<&SqlConversion>,
        session_id: Option<String>,
        query_id: String,
        started: Instant,
    ) -> QueryResult {
        error!(query_id = %query_id, code = err.code(), error = %err, "Query failed");
        let metadata = QueryMetadata {
            sql_query: conversion.map(|c| c.sql.clone()),
            execution_time: started.elapsed().as_millis() as u64,
            row_count: 0,
            session_id,
            query_id,
            confidence: conversion.map(|c| c.confidence).unwrap_or(0.0),
            template_used: conversion.and_then(|c| c.template_used.clone()),
        };
        QueryResult::failure(&err, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{DecisionRow, CONFIDENCE_THRESHOLD, ERROR_KIND, GUIDANCE_SQL};
    use crate::infrastructure::llm_clients::{
        CompletionClient, CompletionRequest, CompletionResponse,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubClient {
        reply: Result<String>,
    }

    #[async_trait]
    impl CompletionClient for StubClient {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
            self.reply.clone().map(|content| CompletionResponse { content })
        }
    }

    struct StubStore {
        rows: Result<Vec<DecisionRow>>,
        ping: Result<()>,
        calls: AtomicUsize,
    }

    impl StubStore {
        fn returning(rows: Vec<Value>) -> Arc<Self> {
            let rows = rows
                .into_iter()
                .filter_map(|row| match row {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect();
            Arc::new(Self {
                rows: Ok(rows),
                ping: Ok(()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(err: AppError) -> Arc<Self> {
            Arc::new(Self {
                rows: Err(err.clone()),
                ping: Err(err),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DecisionStore for StubStore {
        async fn execute(&self, _sql: &str, _params: &[Value]) -> Result<ExecutionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let rows = self.rows.clone()?;
            Ok(ExecutionResult {
                success: true,
                row_count: rows.len(),
                rows: Some(rows),
                execution_time_ms: 1,
                error_code: None,
            })
        }

        async fn ping(&self) -> Result<()> {
            self.ping.clone()
        }
    }

    fn service(reply: Result<String>, store: Arc<StubStore>) -> NlQueryService {
        let client = Arc::new(StubClient { reply });
        NlQueryService::new(QueryConverter::new(client, 50), store)
    }

    #[tokio::test]
    async fn test_nonsense_query_gets_guidance_without_store() {
        let store = StubStore::returning(vec![]);
        let reply = json!({ "sql": "", "params": [], "confidence": 0.1 }).to_string();
        let service = service(Ok(reply), store.clone());

        let result = service
            .process_natural_query("בננה סגולה רוקדת", Some("s-1".to_string()))
            .await;

        assert!(result.success);
        assert_eq!(result.kind, GUIDANCE_KIND);
        assert!(result.data.is_empty());
        assert!(result.metadata.confidence < CONFIDENCE_THRESHOLD);
        assert_eq!(result.metadata.sql_query.as_deref(), Some(GUIDANCE_SQL));
        assert_eq!(result.metadata.session_id.as_deref(), Some("s-1"));
        assert!(!result.formatted.is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_synthesized_drop_is_rejected_before_store() {
        let store = StubStore::returning(vec![]);
        let reply = json!({
            "sql": "SELECT * FROM israeli_government_decisions; DROP TABLE israeli_government_decisions",
            "params": [],
            "expected_type": "multiple",
            "confidence": 0.95,
            "explanation": "x"
        })
        .to_string();
        let service = service(Ok(reply), store.clone());

        let result = service.process_natural_query("משהו שאין לו תבנית", None).await;

        assert!(!result.success);
        assert_eq!(result.kind, ERROR_KIND);
        assert_eq!(result.error.as_deref(), Some("UNSAFE_QUERY"));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_count_scenario_mentions_topic_and_government() {
        let store = StubStore::returning(vec![json!({ "count": 42 })]);
        let service = service(Err(AppError::LLMError("unused".to_string())), store.clone());

        let result = service
            .process_natural_query("כמה החלטות בנושא חינוך קיבלה ממשלה 37", None)
            .await;

        assert!(result.success);
        assert_eq!(result.kind, "count");
        assert!(result.formatted.contains("חינוך"));
        assert!(result.formatted.contains("37"));
        assert!(result.formatted.contains("42"));
        assert_eq!(
            result.metadata.template_used.as_deref(),
            Some("count_topic_government")
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert!(!result.metadata.query_id.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_becomes_error_envelope() {
        let store = StubStore::failing(AppError::ConnectionError("refused".to_string()));
        let service = service(Err(AppError::LLMError("unused".to_string())), store);

        let result = service.process_natural_query("החלטה 660 של ממשלה 37", None).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("CONNECTION_ERROR"));
        assert!(!result.formatted.contains("refused"));
        assert_eq!(
            result.metadata.template_used.as_deref(),
            Some("decision_with_government")
        );
    }

    #[tokio::test]
    async fn test_raw_sql_is_validated() {
        let store = StubStore::returning(vec![json!({ "n": 1 })]);
        let service = service(Err(AppError::LLMError("unused".to_string())), store.clone());

        let rejected = service
            .execute_raw_sql("DELETE FROM israeli_government_decisions", &[])
            .await;
        assert!(matches!(rejected, Err(AppError::UnsafeQuery(_))));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);

        let accepted = service
            .execute_raw_sql("SELECT 1 AS n WHERE $1 = $1", &[json!(1)])
            .await
            .unwrap();
        assert_eq!(accepted.row_count, 1);
    }

    #[tokio::test]
    async fn test_health_report() {
        let healthy = service(
            Err(AppError::LLMError("unused".to_string())),
            StubStore::returning(vec![]),
        )
        .health_check()
        .await;
        assert_eq!(healthy.status, HealthStatus::Healthy);
        assert_eq!(
            healthy.template_used.as_deref(),
            Some("decision_with_government")
        );

        let degraded = service(
            Err(AppError::LLMError("unused".to_string())),
            StubStore::failing(AppError::ConnectionError("down".to_string())),
        )
        .health_check()
        .await;
        assert_eq!(degraded.status, HealthStatus::Degraded);
        assert!(!degraded.database);
    }
}
