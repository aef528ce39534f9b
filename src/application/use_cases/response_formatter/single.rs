use super::{field_text, format_date, format_tags, truncate_text, SUMMARY_MAX_CHARS};
use crate::domain::query::DecisionRow;

/// One decision card.
pub(super) fn format_single(row: &DecisionRow) -> String {
    let mut lines = Vec::new();

    let heading = match (
        field_text(row, "decision_number"),
        field_text(row, "government_number"),
    ) {
        (Some(decision), Some(government)) => {
            format!("החלטה מספר {} של ממשלה {}", decision, government)
        }
        (Some(decision), None) => format!("החלטה מספר {}", decision),
        _ => "פרטי ההחלטה".to_string(),
    };
    lines.push(heading);

    if let Some(title) = field_text(row, "decision_title") {
        lines.push(format!("כותרת: {}", title));
    }
    if let Some(date) = field_text(row, "decision_date") {
        lines.push(format!("תאריך: {}", format_date(&date)));
    }
    if let Some(prime_minister) = field_text(row, "prime_minister") {
        lines.push(format!("ראש הממשלה: {}", prime_minister));
    }
    if let Some(tags) = field_text(row, "tags_policy_area") {
        lines.push(format!("תחומי מדיניות: {}", format_tags(&tags)));
    }
    if let Some(bodies) = field_text(row, "tags_government_body") {
        lines.push(format!("גופים מעורבים: {}", format_tags(&bodies)));
    }
    if let Some(operativity) = field_text(row, "operativity") {
        lines.push(format!("סוג ההחלטה: {}", operativity));
    }
    if let Some(committee) = field_text(row, "committee") {
        lines.push(format!("ועדה: {}", committee));
    }

    let body = field_text(row, "summary").or_else(|| field_text(row, "decision_content"));
    if let Some(body) = body {
        lines.push(String::new());
        lines.push(truncate_text(&body, SUMMARY_MAX_CHARS));
    }

    if let Some(url) = field_text(row, "decision_url") {
        lines.push(String::new());
        lines.push(format!("קישור להחלטה: {}", url));
    }

    lines.join("\n")
}
