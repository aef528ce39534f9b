use super::{field_text, format_date, truncate_text, LIST_MAX_ENTRIES};
use crate::domain::query::DecisionRow;

const ENTRY_SUMMARY_CHARS: usize = 160;

fn entry_details(row: &DecisionRow) -> String {
    let mut details = Vec::new();
    if let Some(decision) = field_text(row, "decision_number") {
        details.push(format!("החלטה {}", decision));
    }
    if let Some(government) = field_text(row, "government_number") {
        details.push(format!("ממשלה {}", government));
    }
    if let Some(date) = field_text(row, "decision_date") {
        details.push(format_date(&date));
    }
    details.join(", ")
}

/// Numbered list, capped at `LIST_MAX_ENTRIES` with a remainder footer.
pub(super) fn format_multiple(rows: &[DecisionRow]) -> String {
    let header = if rows.len() == 1 {
        "נמצאה החלטה אחת:".to_string()
    } else {
        format!("נמצאו {} החלטות:", rows.len())
    };
    let mut lines = vec![header];

    for (index, row) in rows.iter().take(LIST_MAX_ENTRIES).enumerate() {
        let title = field_text(row, "decision_title").unwrap_or_else(|| "ללא כותרת".to_string());
        let details = entry_details(row);
        lines.push(String::new());
        if details.is_empty() {
            lines.push(format!("{}. {}", index + 1, title));
        } else {
            lines.push(format!("{}. {} ({})", index + 1, title, details));
        }
        if let Some(summary) = field_text(row, "summary") {
            lines.push(format!("   {}", truncate_text(&summary, ENTRY_SUMMARY_CHARS)));
        }
        if let Some(url) = field_text(row, "decision_url") {
            lines.push(format!("   {}", url));
        }
    }

    let remaining = rows.len().saturating_sub(LIST_MAX_ENTRIES);
    if remaining == 1 {
        lines.push(String::new());
        lines.push("ועוד החלטה אחת נוספת".to_string());
    } else if remaining > 1 {
        lines.push(String::new());
        lines.push(format!("ועוד {} החלטות נוספות", remaining));
    }

    lines.join("\n")
}
