use serde_json::Value;

use super::{field_number, field_text, BAR_MAX_CELLS};
use crate::domain::query::DecisionRow;

const BAR_CELL: char = '█';

enum AggregateShape {
    Yearly,
    Monthly,
    PerGovernment,
    Other,
}

fn detect_shape(row: &DecisionRow) -> AggregateShape {
    if !row.contains_key("count") {
        return AggregateShape::Other;
    }
    if row.contains_key("year") {
        AggregateShape::Yearly
    } else if row.contains_key("month") {
        AggregateShape::Monthly
    } else if row.contains_key("government_number") {
        AggregateShape::PerGovernment
    } else {
        AggregateShape::Other
    }
}

/// Cells for `value` against the series maximum; nonzero values get at least one.
fn bar_cells(value: i64, max: i64) -> usize {
    if value <= 0 || max <= 0 {
        return 0;
    }
    let scaled = (value as f64 / max as f64 * BAR_MAX_CELLS as f64).round() as usize;
    scaled.clamp(1, BAR_MAX_CELLS)
}

fn bar_chart(title: &str, series: &[(String, i64)]) -> String {
    let max = series.iter().map(|(_, value)| *value).max().unwrap_or(0);
    let total: i64 = series.iter().map(|(_, value)| *value).sum();
    let mut lines = vec![title.to_string(), String::new()];
    for (label, value) in series {
        let bar: String = std::iter::repeat(BAR_CELL)
            .take(bar_cells(*value, max))
            .collect();
        lines.push(format!("{}: {} {}", label, bar, value));
    }
    lines.push(String::new());
    lines.push(format!("סה\"כ: {}", total));
    lines.join("\n")
}

fn series(rows: &[DecisionRow], key: &str, label: impl Fn(String) -> String) -> Vec<(String, i64)> {
    rows.iter()
        .filter_map(|row| {
            let key = field_text(row, key)?;
            Some((label(key), field_number(row, "count").unwrap_or(0)))
        })
        .collect()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn key_value_list(rows: &[DecisionRow]) -> String {
    let mut lines = vec!["תוצאות:".to_string()];
    for row in rows {
        let entry = row
            .iter()
            .map(|(key, value)| format!("{}: {}", key, render_value(value)))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("• {}", entry));
    }
    lines.join("\n")
}

pub(super) fn format_aggregate(rows: &[DecisionRow]) -> String {
    let Some(first) = rows.first() else {
        return key_value_list(rows);
    };
    match detect_shape(first) {
        AggregateShape::Yearly => {
            bar_chart("התפלגות החלטות לפי שנה:", &series(rows, "year", |year| year))
        }
        AggregateShape::Monthly => {
            bar_chart("התפלגות החלטות לפי חודש:", &series(rows, "month", |month| month))
        }
        AggregateShape::PerGovernment => bar_chart(
            "התפלגות החלטות לפי ממשלה:",
            &series(rows, "government_number", |number| format!("ממשלה {}", number)),
        ),
        AggregateShape::Other => key_value_list(rows),
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
    fn test_yearly_bars_scale_to_max() {
        let rows = vec![
            row(json!({ "year": 2021, "count": 300 })),
            row(json!({ "year": 2022, "count": 150 })),
            row(json!({ "year": 2023, "count": 1 })),
        ];
        let text = format_aggregate(&rows);
        assert!(text.starts_with("התפלגות החלטות לפי שנה:"));
        assert!(text.contains(&format!("2021: {} 300", "█".repeat(30))));
        assert!(text.contains(&format!("2022: {} 150", "█".repeat(15))));
        assert!(text.contains("2023: █ 1"));
        assert!(text.ends_with("סה\"כ: 451"));
    }

    #[test]
    fn test_per_government_labels() {
        let rows = vec![
            row(json!({ "government_number": "36", "count": 10 })),
            row(json!({ "government_number": "37", "count": 0 })),
        ];
        let text = format_aggregate(&rows);
        assert!(text.contains("ממשלה 36: "));
        assert!(text.contains("ממשלה 37:  0"));
    }

    #[test]
    fn test_other_shapes_render_as_list() {
        let rows = vec![row(json!({ "prime_minister": "נפתלי בנט", "avg_len": 12.5 }))];
        let text = format_aggregate(&rows);
        assert!(text.starts_with("תוצאות:"));
        assert!(text.contains("prime_minister: נפתלי בנט"));
    }

    #[test]
    fn test_bar_cells_floor_of_one() {
        assert_eq!(bar_cells(1, 10_000), 1);
        assert_eq!(bar_cells(0, 10), 0);
        assert_eq!(bar_cells(10, 10), BAR_MAX_CELLS);
    }
}
