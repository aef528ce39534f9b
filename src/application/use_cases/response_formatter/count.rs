//! Count phrasing with qualifiers recovered from the original question.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{decisions_phrase, field_number};
use crate::domain::query::DecisionRow;
use crate::shared::phrasing::{prime_minister_marker, topic_marker};
use crate::shared::tag_matcher::match_tag;
use crate::shared::text::normalize_query_text;

static GOVERNMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ממשל(?:ה|ת)\s+(?:ה-?)?(\d{1,3})\b").unwrap());

static TOPIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?:^|\s)",
        topic_marker!(),
        r"\s+(.+?)(?:\s+(?:(?:קיבלה|קיבלו|התקבלו|נתקבלו|היו|יש|בשנת|משנת|של|בין|בתקופת|בראשות|לפי|בכל|לאורך)(?:\s|$)|ב?ה?ממשל|[במ]-?\d)|$)",
    ))
    .unwrap()
});

static YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(?:בשנת|משנת|בשנה|שנת)\s*|(?:^|\s)[במ]-?)(\d{4})\b").unwrap()
});

static RANGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"בין\s+(\S+)\s+(?:ל-?|עד\s+)(\S+)").unwrap());

static PRIME_MINISTER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?:^|\s)",
        prime_minister_marker!(),
        r"(\p{Hebrew}+(?: \p{Hebrew}+)?)"
    ))
    .unwrap()
});

/// Words that end a prime minister's name in free phrasing.
const NAME_TERMINATORS: [&str; 8] = ["בשנת", "משנת", "של", "בין", "בנושא", "בתחום", "על", "לגבי"];

fn prime_minister_name(raw: &str) -> Option<String> {
    let name: Vec<&str> = raw
        .split_whitespace()
        .take_while(|word| !NAME_TERMINATORS.contains(word))
        .collect();
    (!name.is_empty()).then(|| name.join(" "))
}

#[derive(Debug, Default, PartialEq, Eq)]
struct CountQualifiers {
    government: Option<String>,
    topic: Option<String>,
    year: Option<String>,
    range: Option<(String, String)>,
    operativity: Option<&'static str>,
    prime_minister: Option<String>,
}

impl CountQualifiers {
    fn from_query(query: &str) -> Self {
        let text = normalize_query_text(query);
        let capture = |pattern: &Regex| {
            pattern
                .captures(&text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let topic = capture(&TOPIC_PATTERN).map(|raw| {
            match_tag(&raw)
                .map(str::to_string)
                .unwrap_or(raw)
        });
        let range = RANGE_PATTERN
            .captures(&text)
            .map(|caps| (caps[1].to_string(), caps[2].to_string()));
        let operativity = if text.contains("אופרטיב") {
            Some("אופרטיביות")
        } else if text.contains("דקלרטיב") {
            Some("דקלרטיביות")
        } else {
            None
        };

        Self {
            government: capture(&GOVERNMENT_PATTERN),
            topic,
            // A range already names its years.
            year: if range.is_some() {
                None
            } else {
                capture(&YEAR_PATTERN)
            },
            range,
            operativity,
            prime_minister: capture(&PRIME_MINISTER_PATTERN)
                .and_then(|raw| prime_minister_name(&raw)),
        }
    }

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// `count` column, or the first numeric column of the first row.
fn extract_count(rows: &[DecisionRow]) -> Option<i64> {
    let row = rows.first()?;
    field_number(row, "count").or_else(|| {
        row.values().find_map(|value| match value {
            Value::Number(n) => n.as_i64(),
            _ => None,
        })
    })
}

pub(super) fn format_count(rows: &[DecisionRow], query: &str) -> String {
    let count = extract_count(rows).unwrap_or(0);
    let qualifiers = CountQualifiers::from_query(query);

    if qualifiers.is_empty() {
        return match count {
            0 => "לא נמצאו החלטות.".to_string(),
            1 => "נמצאה החלטה אחת.".to_string(),
            n => format!("נמצאו {} החלטות.", n),
        };
    }

    let mut sentence = match count {
        0 => "לא נמצאו החלטות".to_string(),
        1 => "נמצאה החלטה אחת".to_string(),
        n => format!("נמצאו {}", decisions_phrase(n)),
    };

    if let Some(operativity) = qualifiers.operativity {
        let operativity = if count == 1 {
            operativity.trim_end_matches("יות").to_string() + "ית"
        } else {
            operativity.to_string()
        };
        sentence.push(' ');
        sentence.push_str(&operativity);
    }
    if let Some(topic) = &qualifiers.topic {
        sentence.push_str(&format!(" בנושא {}", topic));
    }
    if let Some(government) = &qualifiers.government {
        sentence.push_str(&format!(" של ממשלה {}", government));
    }
    if let Some(prime_minister) = &qualifiers.prime_minister {
        sentence.push_str(&format!(" בתקופת {}", prime_minister));
    }
    if let Some((from, to)) = &qualifiers.range {
        sentence.push_str(&format!(" בין {} ל-{}", from, to));
    } else if let Some(year) = &qualifiers.year {
        sentence.push_str(&format!(" בשנת {}", year));
    }
    sentence.push('.');
    sentence
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn count_rows(count: i64) -> Vec<DecisionRow> {
        let mut row = DecisionRow::new();
        row.insert("count".to_string(), json!(count));
        vec![row]
    }

    #[test]
    fn test_government_and_topic_qualifiers() {
        let text = format_count(&count_rows(42), "כמה החלטות בנושא חינוך קיבלה ממשלה 37");
        assert_eq!(text, "נמצאו 42 החלטות בנושא חינוך של ממשלה 37.");
    }

    #[test]
    fn test_topic_resolves_to_canonical_tag() {
        let text = format_count(&count_rows(3), "כמה החלטות בנושא איכות הסביבה התקבלו בשנת 2022");
        assert_eq!(text, "נמצאו 3 החלטות בנושא סביבה ואקלים בשנת 2022.");
    }

    #[test]
    fn test_single_decision_phrasing() {
        let text = format_count(&count_rows(1), "כמה החלטות אופרטיביות קיבלה ממשלה 36");
        assert_eq!(text, "נמצאה החלטה אחת אופרטיבית של ממשלה 36.");
    }

    #[test]
    fn test_generic_fallback_and_zero() {
        assert_eq!(format_count(&count_rows(7), "כמה החלטות יש"), "נמצאו 7 החלטות.");
        assert_eq!(format_count(&[], "כמה החלטות יש"), "לא נמצאו החלטות.");
        assert_eq!(
            format_count(&count_rows(0), "כמה החלטות התקבלו בתקופת בנט"),
            "לא נמצאו החלטות בתקופת בנט."
        );
    }

    #[test]
    fn test_every_topic_marker_is_recognized() {
        assert_eq!(
            format_count(&count_rows(42), "כמה החלטות על חינוך קיבלה ממשלה 37"),
            "נמצאו 42 החלטות בנושא חינוך של ממשלה 37."
        );
        assert_eq!(
            format_count(&count_rows(42), "כמה החלטות בתחום דיור התקבלו בשנת 2022"),
            "נמצאו 42 החלטות בנושא דיור ובינוי בשנת 2022."
        );
        assert_eq!(
            format_count(&count_rows(5), "כמה החלטות לגבי חינוך בממשלה 36"),
            "נמצאו 5 החלטות בנושא חינוך של ממשלה 36."
        );
        assert_eq!(
            format_count(&count_rows(5), "כמה החלטות על חינוך ב2021"),
            "נמצאו 5 החלטות בנושא חינוך בשנת 2021."
        );
    }

    #[test]
    fn test_every_prime_minister_marker_is_recognized() {
        for query in [
            "כמה החלטות התקבלו בראשות נתניהו",
            "כמה החלטות של ראש הממשלה נתניהו",
            "כמה החלטות התקבלו בתקופת ראש הממשלה נתניהו",
        ] {
            assert_eq!(
                format_count(&count_rows(42), query),
                "נמצאו 42 החלטות בתקופת נתניהו.",
                "{}",
                query
            );
        }
        let qualifiers = CountQualifiers::from_query("כמה החלטות בתקופת יאיר לפיד");
        assert_eq!(qualifiers.prime_minister.as_deref(), Some("יאיר לפיד"));
    }

    #[test]
    fn test_range_supersedes_year() {
        let qualifiers = CountQualifiers::from_query("כמה החלטות התקבלו בין 2020 ל-2022");
        assert_eq!(qualifiers.range, Some(("2020".to_string(), "2022".to_string())));
        assert_eq!(qualifiers.year, None);
    }

    #[test]
    fn test_count_from_string_column() {
        let mut row = DecisionRow::new();
        row.insert("count".to_string(), json!("12"));
        assert_eq!(extract_count(&[row]), Some(12));
    }
}
