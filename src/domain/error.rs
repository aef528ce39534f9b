use std::fmt;

#[derive(Debug, Clone)]
pub enum AppError {
    Internal(String),
    ValidationError(String),
    ParseError(String),
    ConfigError(String),
    /// Completion provider failed (timeout, HTTP error, malformed payload).
    LLMError(String),
    /// Generated or supplied SQL tripped the blocklist. Never executed.
    UnsafeQuery(String),
    ParameterMismatch { expected: usize, actual: usize },
    ConnectionError(String),
    StatementTimeout(String),
    DatabaseError(String),
}

impl AppError {
    /// Stable code for operators and the `metadata`/`error` fields.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::ParseError(_) => "PARSE_ERROR",
            AppError::ConfigError(_) => "CONFIG_ERROR",
            AppError::LLMError(_) => "PROVIDER_FAILURE",
            AppError::UnsafeQuery(_) => "UNSAFE_QUERY",
            AppError::ParameterMismatch { .. } => "PARAMETER_MISMATCH",
            AppError::ConnectionError(_) => "CONNECTION_ERROR",
            AppError::StatementTimeout(_) => "STATEMENT_TIMEOUT",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    /// Hebrew text shown to the end user. Internal detail never leaks here.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::ConnectionError(_) => {
                "לא ניתן להתחבר כרגע למאגר החלטות הממשלה. אנא נסה שוב בעוד מספר רגעים."
            }
            AppError::StatementTimeout(_) => {
                "החיפוש ארך זמן רב מדי. נסה לצמצם את השאלה (למשל לפי שנה או לפי ממשלה) ונסה שוב."
            }
            AppError::UnsafeQuery(_) => "השאילתה נחסמה מטעמי אבטחה ולא הורצה.",
            AppError::ParameterMismatch { .. } => {
                "אירעה שגיאה בבניית השאילתה עבור השאלה. אנא נסח אותה מחדש."
            }
            AppError::ValidationError(_) => "השאלה אינה תקינה. אנא כתוב שאלה באורך סביר ונסה שוב.",
            AppError::LLMError(_) => "שירות הניתוח אינו זמין כרגע. אנא נסה שוב מאוחר יותר.",
            _ => "אירעה שגיאה בעיבוד הבקשה. אנא נסה שוב מאוחר יותר.",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::LLMError(msg) => write!(f, "LLM error: {}", msg),
            AppError::UnsafeQuery(msg) => write!(f, "Unsafe query: {}", msg),
            AppError::ParameterMismatch { expected, actual } => write!(
                f,
                "Parameter mismatch: SQL has {} placeholders but {} params were supplied",
                expected, actual
            ),
            AppError::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            AppError::StatementTimeout(msg) => write!(f, "Statement timeout: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_for_store_failures() {
        let conn = AppError::ConnectionError("refused".to_string());
        let timeout = AppError::StatementTimeout("57014".to_string());
        assert_eq!(conn.code(), "CONNECTION_ERROR");
        assert_eq!(timeout.code(), "STATEMENT_TIMEOUT");
        assert_ne!(conn.user_message(), timeout.user_message());
    }

    #[test]
    fn test_user_message_hides_internal_detail() {
        let err = AppError::DatabaseError("relation \"secret\" does not exist".to_string());
        assert!(!err.user_message().contains("secret"));
        assert!(err.to_string().contains("secret"));
    }

    #[test]
    fn test_parameter_mismatch_display() {
        let err = AppError::ParameterMismatch {
            expected: 2,
            actual: 0,
        };
        assert_eq!(
            err.to_string(),
            "Parameter mismatch: SQL has 2 placeholders but 0 params were supplied"
        );
        assert_eq!(err.code(), "PARAMETER_MISMATCH");
    }
}
