pub mod decision_store;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::error::Result;
use crate::domain::query::ExecutionResult;

pub use decision_store::PgDecisionStore;

/// Read-only access to the decisions table.
#[async_trait]
pub trait DecisionStore: Send + Sync {
    /// Runs one parameterized statement; `$n` binds `params[n - 1]`.
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecutionResult>;
    async fn ping(&self) -> Result<()>;
}
