//! Hebrew rendering of execution results.
//!
//! Dispatches on the expected result type; each shape lives in its own
//! submodule. Rendering is pure and never touches the store.

mod aggregate;
mod count;
mod multiple;
mod single;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::domain::query::{DecisionRow, ExpectedResultType};

pub const SUMMARY_MAX_CHARS: usize = 500;
pub const LIST_MAX_ENTRIES: usize = 20;
pub const BAR_MAX_CELLS: usize = 30;

pub const NO_RESULTS_MESSAGE: &str =
    "לא נמצאו החלטות התואמות לשאלה. אפשר לנסות לנסח אותה מחדש, להרחיב את טווח התאריכים או לבחור נושא כללי יותר.";

#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseFormatter;

impl ResponseFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Renders rows for `expected_type`; `query` feeds the count qualifiers.
    pub fn format(
        &self,
        expected_type: ExpectedResultType,
        rows: &[DecisionRow],
        query: &str,
    ) -> String {
        match expected_type {
            // A count of zero is still an answer.
            ExpectedResultType::Count => count::format_count(rows, query),
            _ if rows.is_empty() => NO_RESULTS_MESSAGE.to_string(),
            ExpectedResultType::Single => single::format_single(&rows[0]),
            ExpectedResultType::Multiple => multiple::format_multiple(rows),
            ExpectedResultType::Aggregate => aggregate::format_aggregate(rows),
        }
    }

    pub fn format_guidance(&self, explanation: &str) -> String {
        explanation.trim().to_string()
    }
}

/// Non-empty text of a column; numbers are rendered.
pub(crate) fn field_text(row: &DecisionRow, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn field_number(row: &DecisionRow, key: &str) -> Option<i64> {
    match row.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        _ => None,
    }
}

/// `dd/mm/yyyy` for ISO dates and timestamps; anything else is returned as is.
pub(crate) fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%d/%m/%Y").to_string();
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return timestamp.format("%d/%m/%Y").to_string();
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

/// Semicolon-delimited tag column as a comma list.
pub(crate) fn format_tags(raw: &str) -> String {
    raw.split(';')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// "החלטה אחת" / "N החלטות".
pub(crate) fn decisions_phrase(count: i64) -> String {
    if count == 1 {
        "החלטה אחת".to_string()
    } else {
        format!("{} החלטות", count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> DecisionRow {
        match value {
            Value::Object(map) => map,
            _ => DecisionRow::new(),
        }
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(format_date("2023-03-15"), "15/03/2023");
        assert_eq!(format_date("2023-03-15T10:00:00+00:00"), "15/03/2023");
        assert_eq!(format_date("2023-03-15 10:00:00"), "15/03/2023");
        assert_eq!(format_date("לא ידוע"), "לא ידוע");
    }

    #[test]
    fn test_truncate_respects_characters() {
        let text = "א".repeat(600);
        let truncated = truncate_text(&text, SUMMARY_MAX_CHARS);
        assert_eq!(truncated.chars().count(), SUMMARY_MAX_CHARS + 3);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_text("קצר", 10), "קצר");
    }

    #[test]
    fn test_field_accessors() {
        let r = row(json!({ "count": "42", "title": "  ", "n": 7 }));
        assert_eq!(field_number(&r, "count"), Some(42));
        assert_eq!(field_text(&r, "title"), None);
        assert_eq!(field_text(&r, "n").as_deref(), Some("7"));
        assert_eq!(format_tags("חינוך; בריאות ורפואה;"), "חינוך, בריאות ורפואה");
    }

    #[test]
    fn test_empty_rows_render_no_results() {
        let formatter = ResponseFormatter::new();
        assert_eq!(
            formatter.format(ExpectedResultType::Multiple, &[], "החלטות בנושא אנרגיה"),
            NO_RESULTS_MESSAGE
        );
        assert_eq!(
            formatter.format(ExpectedResultType::Single, &[], "החלטה מספר 1"),
            NO_RESULTS_MESSAGE
        );
    }
}
