//! Static SQL safety check.
//!
//! Runs before every store call, for template SQL, synthesized SQL and the
//! diagnostic endpoint alike. The store only ever sees read-only statements.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::domain::error::{AppError, Result};

static STACKED_STATEMENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i);\s*(DROP|DELETE|UPDATE|INSERT|ALTER|CREATE|TRUNCATE|GRANT|REVOKE)")
        .unwrap()
});

static READ_ONLY_PREFIX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*\(?\s*(SELECT|WITH)\b").unwrap());

const COMMENT_MARKERS: [&str; 2] = ["--", "/*"];

#[derive(Debug, Default, Clone, Copy)]
pub struct SqlValidator;

impl SqlValidator {
    pub fn new() -> Self {
        Self
    }

    /// Rejects stacked DML/DDL, comment markers and anything that is not a SELECT.
    pub fn validate(&self, sql: &str) -> Result<()> {
        if let Some(reason) = Self::violation(sql) {
            warn!(
                target: "security",
                reason = reason,
                sql = %sql,
                "Blocked unsafe SQL before execution"
            );
            return Err(AppError::UnsafeQuery(reason.to_string()));
        }
        Ok(())
    }

    fn violation(sql: &str) -> Option<&'static str> {
        if sql.trim().is_empty() {
            return Some("empty statement");
        }
        if STACKED_STATEMENT_PATTERN.is_match(sql) {
            return Some("stacked data-modifying statement");
        }
        if COMMENT_MARKERS.iter().any(|marker| sql.contains(marker)) {
            return Some("inline comment marker");
        }
        if !READ_ONLY_PREFIX_PATTERN.is_match(sql) {
            return Some("statement is not a SELECT");
        }
        None
    }
}
