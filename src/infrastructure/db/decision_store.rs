use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, PgPool, Postgres, Row};
use tracing::{debug, error, info};

use super::DecisionStore;
use crate::domain::error::{AppError, Result};
use crate::domain::query::{DecisionRow, ExecutionResult};
use crate::infrastructure::config::DatabaseConfig;

/// Postgres cancels the statement with this SQLSTATE when `statement_timeout` fires.
const QUERY_CANCELED: &str = "57014";

pub struct PgDecisionStore {
    pool: PgPool,
    call_timeout: Duration,
    ping_timeout: Duration,
}

impl PgDecisionStore {
    /// Builds the pool without connecting; the first query opens a connection.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self> {
        let options: PgConnectOptions = config
            .url
            .parse()
            .map_err(|e| AppError::ConfigError(format!("Invalid database URL: {}", e)))?;

        let statement_timeout_ms = config.statement_timeout_secs.saturating_mul(1000);
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    let statement = format!("SET statement_timeout = {}", statement_timeout_ms);
                    sqlx::query(&statement).execute(&mut *conn).await?;
                    Ok(())
                })
            })
            .connect_lazy_with(options);

        info!(
            max_connections = config.max_connections,
            statement_timeout_secs = config.statement_timeout_secs,
            "Configured lazy PostgreSQL pool"
        );

        Ok(Self {
            pool,
            // Covers acquiring a connection plus the server-side statement budget.
            call_timeout: Duration::from_secs(
                config.statement_timeout_secs + config.connect_timeout_secs,
            ),
            ping_timeout: Duration::from_secs(config.connect_timeout_secs.max(1)),
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[Value],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            Value::String(s) => query.bind(s.clone()),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    query.bind(i)
                } else if let Some(f) = n.as_f64() {
                    query.bind(f)
                } else {
                    query.bind(n.to_string())
                }
            }
            Value::Bool(b) => query.bind(*b),
            Value::Null => query.bind(Option::<String>::None),
            _ => query.bind(param.to_string()),
        };
    }
    query
}

fn extract_column_value(row: &PgRow, index: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map(Value::String).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(index) {
        return v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bigdecimal::BigDecimal>, _>(index) {
        return v
            .and_then(|d| d.to_string().parse::<f64>().ok())
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map(Value::Bool).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index) {
        return v
            .map(|dt| Value::String(dt.to_rfc3339()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(index) {
        return v
            .map(|d| Value::String(d.to_string()))
            .unwrap_or(Value::Null);
    }

    Value::Null
}

fn row_to_json(row: &PgRow) -> DecisionRow {
    row.columns()
        .iter()
        .enumerate()
        .map(|(index, column)| (column.name().to_string(), extract_column_value(row, index)))
        .collect()
}

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => AppError::ConnectionError(err.to_string()),
        sqlx::Error::Database(db) if db.code().as_deref() == Some(QUERY_CANCELED) => {
            AppError::StatementTimeout(db.message().to_string())
        }
        _ => AppError::DatabaseError(err.to_string()),
    }
}

#[async_trait]
impl DecisionStore for PgDecisionStore {
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecutionResult> {
        let started = Instant::now();
        let query = bind_params(sqlx::query(sql), params);

        let rows = tokio::time::timeout(self.call_timeout, query.fetch_all(&self.pool))
            .await
            .map_err(|_| {
                AppError::StatementTimeout(format!(
                    "Query exceeded {} seconds",
                    self.call_timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                let mapped = map_sqlx_error(e);
                error!(code = mapped.code(), error = %mapped, "Decision query failed");
                mapped
            })?;

        let rows: Vec<DecisionRow> = rows.iter().map(row_to_json).collect();
        let execution_time_ms = started.elapsed().as_millis() as u64;
        debug!(row_count = rows.len(), execution_time_ms, "Decision query executed");

        Ok(ExecutionResult {
            success: true,
            row_count: rows.len(),
            rows: Some(rows),
            execution_time_ms,
            error_code: None,
        })
    }

    async fn ping(&self) -> Result<()> {
        tokio::time::timeout(self.ping_timeout, sqlx::query("SELECT 1").execute(&self.pool))
            .await
            .map_err(|_| AppError::ConnectionError("Database ping timed out".to_string()))?
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
