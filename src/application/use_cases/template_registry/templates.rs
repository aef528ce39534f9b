//! Built-in templates.
//!
//! Every pattern is anchored at both ends. An optional run of question words
//! ("מה", "הצג", "את", "כל", ...) is accepted before the body. Capture layouts
//! are listed per template; SQL builders index into the normalized captures.

use regex::Captures;
use serde_json::{json, Value};

use super::TemplateSpec;
use crate::domain::decision_schema::{
    CARD_COLUMNS, DECISIONS_TABLE, DECLARATIVE, LIST_COLUMNS, OPERATIVE,
};
use crate::domain::query::ExpectedResultType;
use crate::shared::hebrew_dates::{normalize_date, CanonicalDate};
use crate::shared::ordinals::convert_ordinal;
use crate::shared::phrasing::{prime_minister_marker, topic_marker};
use crate::shared::tag_matcher::match_tag;

const LIST_LIMIT: i64 = 50;
const DEFAULT_LATEST: i64 = 10;
const MAX_LATEST: i64 = 50;

/// Words that signal the topic capture swallowed another constraint.
const TOPIC_STOPWORDS: [&str; 12] = [
    "של", "ממשלה", "הממשלה", "ממשלת", "החלטות", "ההחלטות", "החלטה", "קיבלה", "התקבלו",
    "שנה", "שנת", "בשנת",
];

fn group(caps: &Captures, index: usize) -> Option<String> {
    caps.get(index)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn number(caps: &Captures, index: usize) -> Option<String> {
    group(caps, index)?.parse::<u32>().ok().map(|n| n.to_string())
}

/// Resolved policy tag, or the cleaned free text when no tag is close enough.
fn topic(caps: &Captures, index: usize) -> Option<String> {
    let raw = group(caps, index)?;
    let raw = raw.trim_matches(|c: char| c == '"' || c == '\'' || c == '-').trim();
    if raw.is_empty() || raw.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if raw.split_whitespace().any(|word| TOPIC_STOPWORDS.contains(&word)) {
        return None;
    }
    Some(
        match_tag(raw)
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string()),
    )
}

fn person(caps: &Captures, index: usize) -> Option<String> {
    let name = group(caps, index)?;
    if name
        .split_whitespace()
        .any(|word| TOPIC_STOPWORDS.contains(&word) || word == "ראש")
    {
        return None;
    }
    Some(name)
}

fn bounds(date: CanonicalDate) -> Option<(String, String)> {
    let first = date.first_day()?;
    let last = date.last_day()?;
    Some((
        first.format("%Y-%m-%d").to_string(),
        last.format("%Y-%m-%d").to_string(),
    ))
}

fn year_bounds(caps: &Captures, index: usize) -> Option<(String, String)> {
    let year = group(caps, index)?.parse::<i32>().ok()?;
    bounds(CanonicalDate::year(year)?)
}

fn date_bounds(caps: &Captures, index: usize) -> Option<(String, String)> {
    bounds(normalize_date(&group(caps, index)?)?)
}

/// `(from, to)` spanning two date tokens; rejects reversed ranges.
fn range_bounds(caps: &Captures, from: usize, to: usize) -> Option<(String, String)> {
    let (start, _) = date_bounds(caps, from)?;
    let (_, end) = date_bounds(caps, to)?;
    (start <= end).then_some((start, end))
}

fn topic_filter(n: usize) -> String {
    format!(
        "(tags_policy_area ILIKE ${0} OR decision_title ILIKE ${0} OR summary ILIKE ${0})",
        n
    )
}

fn ilike(value: &str) -> Value {
    json!(format!("%{}%", value))
}

fn limit_value(raw: Option<&String>) -> Value {
    let limit = raw
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_LATEST)
        .clamp(1, MAX_LATEST);
    json!(limit)
}

fn text_params(captures: &[String]) -> Vec<Value> {
    captures.iter().map(|c| json!(c)).collect()
}

/// Captures `[topic, ...rest]` where rest binds verbatim.
fn topic_then_text_params(captures: &[String]) -> Vec<Value> {
    let mut params = Vec::with_capacity(captures.len());
    if let Some((first, rest)) = captures.split_first() {
        params.push(ilike(first));
        params.extend(rest.iter().map(|c| json!(c)));
    }
    params
}

/// Captures `[government, topic]`.
fn government_topic_params(captures: &[String]) -> Vec<Value> {
    match captures {
        [government, topic] => vec![json!(government), ilike(topic)],
        _ => Vec::new(),
    }
}

fn no_captures(_: &Captures) -> Option<Vec<String>> {
    Some(Vec::new())
}

fn no_params(_: &[String]) -> Vec<Value> {
    Vec::new()
}

fn single_topic(caps: &Captures) -> Option<Vec<String>> {
    Some(vec![topic(caps, 1)?])
}

fn single_number(caps: &Captures) -> Option<Vec<String>> {
    Some(vec![number(caps, 1)?])
}

fn year_range(caps: &Captures) -> Option<Vec<String>> {
    let (from, to) = year_bounds(caps, 1)?;
    Some(vec![from, to])
}

fn topic_with_year(caps: &Captures) -> Option<Vec<String>> {
    let (from, to) = year_bounds(caps, 2)?;
    Some(vec![topic(caps, 1)?, from, to])
}

fn sql_topic_count_by_year(_: &[String]) -> String {
    format!(
        "SELECT EXTRACT(YEAR FROM decision_date)::int AS year, COUNT(*) AS count \
         FROM {} WHERE {} GROUP BY 1 ORDER BY 1",
        DECISIONS_TABLE,
        topic_filter(1)
    )
}

fn sql_count_by_year(_: &[String]) -> String {
    format!(
        "SELECT EXTRACT(YEAR FROM decision_date)::int AS year, COUNT(*) AS count \
         FROM {} WHERE decision_date IS NOT NULL GROUP BY 1 ORDER BY 1",
        DECISIONS_TABLE
    )
}

fn sql_count_by_government(_: &[String]) -> String {
    format!(
        "SELECT government_number, COUNT(*) AS count FROM {} \
         GROUP BY government_number ORDER BY MIN(decision_date)",
        DECISIONS_TABLE
    )
}

fn sql_decision_with_government(_: &[String]) -> String {
    format!(
        "SELECT {} FROM {} WHERE decision_number = $1 AND government_number = $2 LIMIT 1",
        CARD_COLUMNS, DECISIONS_TABLE
    )
}

fn normalize_decision_then_government(caps: &Captures) -> Option<Vec<String>> {
    Some(vec![number(caps, 1)?, number(caps, 2)?])
}

fn normalize_government_then_decision(caps: &Captures) -> Option<Vec<String>> {
    Some(vec![number(caps, 2)?, number(caps, 1)?])
}

/// Captures `[government, ordinal]`.
fn normalize_nth_decision(caps: &Captures) -> Option<Vec<String>> {
    let ordinal = convert_ordinal(&group(caps, 1)?)?;
    Some(vec![number(caps, 2)?, ordinal])
}

fn sql_nth_decision(_: &[String]) -> String {
    format!(
        "SELECT {} FROM {} WHERE government_number = $1 \
         ORDER BY decision_date ASC, id ASC LIMIT 1 OFFSET $2",
        CARD_COLUMNS, DECISIONS_TABLE
    )
}

fn params_nth_decision(captures: &[String]) -> Vec<Value> {
    match captures {
        [government, ordinal] => {
            let offset = ordinal.parse::<i64>().unwrap_or(1).saturating_sub(1);
            vec![json!(government), json!(offset)]
        }
        _ => Vec::new(),
    }
}

fn normalize_government_topic(caps: &Captures) -> Option<Vec<String>> {
    Some(vec![number(caps, 1)?, topic(caps, 2)?])
}

fn normalize_topic_government(caps: &Captures) -> Option<Vec<String>> {
    Some(vec![number(caps, 2)?, topic(caps, 1)?])
}

fn sql_count_government_topic(_: &[String]) -> String {
    format!(
        "SELECT COUNT(*) AS count FROM {} WHERE government_number = $1 AND {}",
        DECISIONS_TABLE,
        topic_filter(2)
    )
}

fn sql_count_topic_year(_: &[String]) -> String {
    format!(
        "SELECT COUNT(*) AS count FROM {} WHERE {} \
         AND decision_date BETWEEN $2::date AND $3::date",
        DECISIONS_TABLE,
        topic_filter(1)
    )
}

/// Captures `[operativity]` or `[operativity, government]`.
fn normalize_operativity(caps: &Captures) -> Option<Vec<String>> {
    let operativity = match group(caps, 1)?.as_str() {
        "אופרטיביות" => OPERATIVE,
        "דקלרטיביות" => DECLARATIVE,
        _ => return None,
    };
    let mut captures = vec![operativity.to_string()];
    if caps.get(2).is_some() {
        captures.push(number(caps, 2)?);
    }
    Some(captures)
}

fn sql_count_operativity(captures: &[String]) -> String {
    let mut sql = format!(
        "SELECT COUNT(*) AS count FROM {} WHERE operativity = $1",
        DECISIONS_TABLE
    );
    if captures.len() > 1 {
        sql.push_str(" AND government_number = $2");
    }
    sql
}

fn normalize_prime_minister(caps: &Captures) -> Option<Vec<String>> {
    Some(vec![person(caps, 1)?])
}

fn params_prime_minister(captures: &[String]) -> Vec<Value> {
    captures.iter().map(|c| ilike(c)).collect()
}

fn sql_count_prime_minister(_: &[String]) -> String {
    format!(
        "SELECT COUNT(*) AS count FROM {} WHERE prime_minister ILIKE $1",
        DECISIONS_TABLE
    )
}

fn sql_count_government(_: &[String]) -> String {
    format!(
        "SELECT COUNT(*) AS count FROM {} WHERE government_number = $1",
        DECISIONS_TABLE
    )
}

fn sql_count_year(_: &[String]) -> String {
    format!(
        "SELECT COUNT(*) AS count FROM {} WHERE decision_date BETWEEN $1::date AND $2::date",
        DECISIONS_TABLE
    )
}

fn sql_count_topic(_: &[String]) -> String {
    format!(
        "SELECT COUNT(*) AS count FROM {} WHERE {}",
        DECISIONS_TABLE,
        topic_filter(1)
    )
}

/// Captures `[topic, limit]`.
fn normalize_latest_n_topic(caps: &Captures) -> Option<Vec<String>> {
    Some(vec![topic(caps, 2)?, number(caps, 1)?])
}

fn sql_latest_n_topic(_: &[String]) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} ORDER BY decision_date DESC LIMIT $2",
        LIST_COLUMNS,
        DECISIONS_TABLE,
        topic_filter(1)
    )
}

fn params_latest_n_topic(captures: &[String]) -> Vec<Value> {
    match captures {
        [topic, limit] => vec![ilike(topic), limit_value(Some(limit))],
        _ => Vec::new(),
    }
}

fn sql_latest_decision_topic(_: &[String]) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} ORDER BY decision_date DESC LIMIT 1",
        CARD_COLUMNS,
        DECISIONS_TABLE,
        topic_filter(1)
    )
}

fn normalize_latest_decisions(caps: &Captures) -> Option<Vec<String>> {
    match caps.get(1) {
        Some(_) => Some(vec![number(caps, 1)?]),
        None => Some(Vec::new()),
    }
}

fn sql_latest_decisions(_: &[String]) -> String {
    format!(
        "SELECT {} FROM {} ORDER BY decision_date DESC LIMIT $1",
        LIST_COLUMNS, DECISIONS_TABLE
    )
}

fn params_latest_decisions(captures: &[String]) -> Vec<Value> {
    vec![limit_value(captures.first())]
}

fn normalize_topic_date_range(caps: &Captures) -> Option<Vec<String>> {
    let (from, to) = range_bounds(caps, 2, 3)?;
    Some(vec![topic(caps, 1)?, from, to])
}

fn sql_topic_in_range(_: &[String]) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} AND decision_date BETWEEN $2::date AND $3::date \
         ORDER BY decision_date DESC LIMIT {}",
        LIST_COLUMNS,
        DECISIONS_TABLE,
        topic_filter(1),
        LIST_LIMIT
    )
}

/// Either word order; captures `[government, topic]`.
fn normalize_government_topic_any_order(caps: &Captures) -> Option<Vec<String>> {
    if caps.get(1).is_some() {
        Some(vec![number(caps, 1)?, topic(caps, 2)?])
    } else {
        Some(vec![number(caps, 4)?, topic(caps, 3)?])
    }
}

fn sql_government_topic(_: &[String]) -> String {
    format!(
        "SELECT {} FROM {} WHERE government_number = $1 AND {} \
         ORDER BY decision_date DESC LIMIT {}",
        LIST_COLUMNS,
        DECISIONS_TABLE,
        topic_filter(2),
        LIST_LIMIT
    )
}

fn normalize_date_range(caps: &Captures) -> Option<Vec<String>> {
    let (from, to) = range_bounds(caps, 1, 2)?;
    Some(vec![from, to])
}

fn sql_in_range(_: &[String]) -> String {
    format!(
        "SELECT {} FROM {} WHERE decision_date BETWEEN $1::date AND $2::date \
         ORDER BY decision_date DESC LIMIT {}",
        LIST_COLUMNS, DECISIONS_TABLE, LIST_LIMIT
    )
}

fn sql_decision_by_number(_: &[String]) -> String {
    format!(
        "SELECT {} FROM {} WHERE decision_number = $1 ORDER BY decision_date DESC LIMIT 1",
        CARD_COLUMNS, DECISIONS_TABLE
    )
}

fn sql_prime_minister_decisions(_: &[String]) -> String {
    format!(
        "SELECT {} FROM {} WHERE prime_minister ILIKE $1 ORDER BY decision_date DESC LIMIT {}",
        LIST_COLUMNS, DECISIONS_TABLE, LIST_LIMIT
    )
}

fn sql_government_decisions(_: &[String]) -> String {
    format!(
        "SELECT {} FROM {} WHERE government_number = $1 ORDER BY decision_date DESC LIMIT {}",
        LIST_COLUMNS, DECISIONS_TABLE, LIST_LIMIT
    )
}

fn normalize_single_date(caps: &Captures) -> Option<Vec<String>> {
    let (from, to) = date_bounds(caps, 1)?;
    Some(vec![from, to])
}

fn sql_topic_decisions(_: &[String]) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} ORDER BY decision_date DESC LIMIT {}",
        LIST_COLUMNS,
        DECISIONS_TABLE,
        topic_filter(1),
        LIST_LIMIT
    )
}

pub(super) fn builtin_specs() -> Vec<TemplateSpec> {
    use ExpectedResultType::{Aggregate, Count, Multiple, Single};

    vec![
        TemplateSpec {
            name: "topic_count_by_year",
            priority: 100,
            pattern: concat!(
                r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(?:(?:כמה|מספר) ה?החלטות|התפלגות ה?החלטות) (?:(?:יש|היו|התקבלו) )?",
                topic_marker!(),
                r" (.+?) (?:(?:היו|התקבלו|נתקבלו) )?(?:לפי שנה|לפי שנים|בכל שנה|לאורך השנים)$"
            ),
            expected_type: Aggregate,
            description: "מספר ההחלטות בנושא מסוים בכל שנה",
            sample: "כמה החלטות בנושא חינוך התקבלו בכל שנה",
            normalize: single_topic,
            sql: sql_topic_count_by_year,
            params: topic_then_text_params,
        },
        TemplateSpec {
            name: "count_by_year",
            priority: 95,
            pattern: r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(?:(?:כמה|מספר) ה?החלטות|התפלגות ה?החלטות) (?:(?:היו|התקבלו|נתקבלו) )?(?:לפי שנה|לפי שנים|בכל שנה|לאורך השנים)$",
            expected_type: Aggregate,
            description: "מספר ההחלטות בכל שנה",
            sample: "כמה החלטות התקבלו בכל שנה",
            normalize: no_captures,
            sql: sql_count_by_year,
            params: no_params,
        },
        TemplateSpec {
            name: "count_by_government",
            priority: 94,
            pattern: r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(?:(?:כמה|מספר) ה?החלטות|התפלגות ה?החלטות) (?:(?:קיבלה|היו|התקבלו) )?(?:לפי ממשלה|לפי ממשלות|בכל ממשלה|כל ממשלה)$",
            expected_type: Aggregate,
            description: "מספר ההחלטות של כל ממשלה",
            sample: "כמה החלטות קיבלה כל ממשלה",
            normalize: no_captures,
            sql: sql_count_by_government,
            params: no_params,
        },
        TemplateSpec {
            name: "decision_with_government",
            priority: 90,
            pattern: r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*החלטה (?:מספר |מס' )?(\d+) (?:של |ב)?ממשלה (?:מספר |מס' |ה-?)?(\d+)$",
            expected_type: Single,
            description: "החלטה לפי מספר החלטה ומספר ממשלה",
            sample: "החלטה 660 של ממשלה 37",
            normalize: normalize_decision_then_government,
            sql: sql_decision_with_government,
            params: text_params,
        },
        TemplateSpec {
            name: "government_then_decision",
            priority: 89,
            pattern: r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(?:ב)?ה?ממשלה (?:מספר |מס' |ה-?)?(\d+),? ה?החלטה (?:מספר |מס' )?(\d+)$",
            expected_type: Single,
            description: "החלטה לפי מספר ממשלה ומספר החלטה",
            sample: "ממשלה 37 החלטה 660",
            normalize: normalize_government_then_decision,
            sql: sql_decision_with_government,
            params: text_params,
        },
        TemplateSpec {
            name: "nth_decision_of_government",
            priority: 85,
            pattern: r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*ה?החלטה (ה?\p{Hebrew}+) (?:של |ב)?ה?ממשלה (?:מספר |מס' |ה-?)?(\d+)$",
            expected_type: Single,
            description: "ההחלטה הראשונה, השנייה וכן הלאה של ממשלה",
            sample: "ההחלטה הראשונה של ממשלה 37",
            normalize: normalize_nth_decision,
            sql: sql_nth_decision,
            params: params_nth_decision,
        },
        TemplateSpec {
            name: "count_government_topic",
            priority: 80,
            pattern: concat!(
                r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(?:כמה|מספר) ה?החלטות (?:קיבלה |של |התקבלו ב|היו ב|ב)?ה?ממשלה (?:מספר |מס' |ה-?)?(\d+) ",
                topic_marker!(),
                r" (.+)$"
            ),
            expected_type: Count,
            description: "מספר ההחלטות של ממשלה בנושא מסוים",
            sample: "כמה החלטות קיבלה ממשלה 37 בנושא חינוך",
            normalize: normalize_government_topic,
            sql: sql_count_government_topic,
            params: government_topic_params,
        },
        TemplateSpec {
            name: "count_topic_government",
            priority: 79,
            pattern: concat!(
                r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(?:כמה|מספר) ה?החלטות ",
                topic_marker!(),
                r" (.+?) (?:קיבלה |של |התקבלו ב|היו ב|ב)?ה?ממשלה (?:מספר |מס' |ה-?)?(\d+)$"
            ),
            expected_type: Count,
            description: "מספר ההחלטות בנושא מסוים של ממשלה",
            sample: "כמה החלטות בנושא חינוך קיבלה ממשלה 37",
            normalize: normalize_topic_government,
            sql: sql_count_government_topic,
            params: government_topic_params,
        },
        TemplateSpec {
            name: "count_topic_year",
            priority: 78,
            pattern: concat!(
                r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(?:כמה|מספר) ה?החלטות (?:(?:יש|היו|התקבלו) )?",
                topic_marker!(),
                r" (.+?) (?:(?:היו|התקבלו|נתקבלו) )?(?:בשנת |ב-?)(\d{4})$"
            ),
            expected_type: Count,
            description: "מספר ההחלטות בנושא מסוים בשנה מסוימת",
            sample: "כמה החלטות בנושא דיור התקבלו בשנת 2022",
            normalize: topic_with_year,
            sql: sql_count_topic_year,
            params: topic_then_text_params,
        },
        TemplateSpec {
            name: "count_operativity",
            priority: 75,
            pattern: r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(?:כמה|מספר) ה?החלטות (אופרטיביות|דקלרטיביות)(?: (?:קיבלה |של |התקבלו ב|היו ב|ב)?ה?ממשלה (?:מספר |מס' |ה-?)?(\d+))?$",
            expected_type: Count,
            description: "מספר ההחלטות האופרטיביות או הדקלרטיביות",
            sample: "כמה החלטות אופרטיביות קיבלה ממשלה 37",
            normalize: normalize_operativity,
            sql: sql_count_operativity,
            params: text_params,
        },
        TemplateSpec {
            name: "count_prime_minister",
            priority: 74,
            pattern: concat!(
                r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(?:כמה|מספר) ה?החלטות (?:(?:התקבלו|היו|קיבלה ה?ממשלה) )?",
                prime_minister_marker!(),
                r"(\p{Hebrew}+(?: \p{Hebrew}+)?)$"
            ),
            expected_type: Count,
            description: "מספר ההחלטות בתקופת ראש ממשלה",
            sample: "כמה החלטות התקבלו בתקופת נתניהו",
            normalize: normalize_prime_minister,
            sql: sql_count_prime_minister,
            params: params_prime_minister,
        },
        TemplateSpec {
            name: "count_government",
            priority: 72,
            pattern: r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(?:כמה|מספר) ה?החלטות (?:קיבלה |של |התקבלו ב|היו ב|ב)?ה?ממשלה (?:מספר |מס' |ה-?)?(\d+)$",
            expected_type: Count,
            description: "מספר ההחלטות של ממשלה",
            sample: "כמה החלטות קיבלה ממשלה 36",
            normalize: single_number,
            sql: sql_count_government,
            params: text_params,
        },
        TemplateSpec {
            name: "count_year",
            priority: 71,
            pattern: r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(?:כמה|מספר) ה?החלטות (?:(?:היו|התקבלו|נתקבלו|קיבלה ה?ממשלה) )?(?:בשנת |ב-?)(\d{4})$",
            expected_type: Count,
            description: "מספר ההחלטות בשנה מסוימת",
            sample: "כמה החלטות התקבלו בשנת 2023",
            normalize: year_range,
            sql: sql_count_year,
            params: text_params,
        },
        TemplateSpec {
            name: "count_topic",
            priority: 70,
            pattern: concat!(
                r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(?:כמה|מספר) ה?החלטות (?:(?:יש|היו|התקבלו|קיבלה ה?ממשלה) )?",
                topic_marker!(),
                r" (.+)$"
            ),
            expected_type: Count,
            description: "מספר ההחלטות בנושא מסוים",
            sample: "כמה החלטות יש בנושא תיירות",
            normalize: single_topic,
            sql: sql_count_topic,
            params: topic_then_text_params,
        },
        TemplateSpec {
            name: "latest_n_topic",
            priority: 65,
            pattern: concat!(
                r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(\d+) ה?החלטות ה?אחרונות ",
                topic_marker!(),
                r" (.+)$"
            ),
            expected_type: Multiple,
            description: "ההחלטות האחרונות בנושא מסוים",
            sample: "5 ההחלטות האחרונות בנושא בריאות",
            normalize: normalize_latest_n_topic,
            sql: sql_latest_n_topic,
            params: params_latest_n_topic,
        },
        TemplateSpec {
            name: "latest_decision_topic",
            priority: 64,
            pattern: concat!(
                r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*ה?החלטה ה?אחרונה ",
                topic_marker!(),
                r" (.+)$"
            ),
            expected_type: Single,
            description: "ההחלטה האחרונה בנושא מסוים",
            sample: "ההחלטה האחרונה בנושא דיור",
            normalize: single_topic,
            sql: sql_latest_decision_topic,
            params: topic_then_text_params,
        },
        TemplateSpec {
            name: "latest_decisions",
            priority: 63,
            pattern: r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(?:(\d+) )?ה?החלטות ה?אחרונות$",
            expected_type: Multiple,
            description: "ההחלטות האחרונות שהתקבלו",
            sample: "10 ההחלטות האחרונות",
            normalize: normalize_latest_decisions,
            sql: sql_latest_decisions,
            params: params_latest_decisions,
        },
        TemplateSpec {
            name: "topic_date_range",
            priority: 60,
            pattern: concat!(
                r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*ה?החלטות ",
                topic_marker!(),
                r" (.+?) (?:בין (?:ה-?)?|החל מ-?|מתאריך |מה-|מ-?)(\d[\d./-]*) (?:עד (?:ה-?)?|ועד |לבין |ל-?)(\d[\d./-]*)$"
            ),
            expected_type: Multiple,
            description: "החלטות בנושא מסוים בטווח תאריכים",
            sample: "החלטות בנושא חינוך בין 2020 ל-2022",
            normalize: normalize_topic_date_range,
            sql: sql_topic_in_range,
            params: topic_then_text_params,
        },
        TemplateSpec {
            name: "topic_year",
            priority: 59,
            pattern: concat!(
                r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*ה?החלטות ",
                topic_marker!(),
                r" (.+?) (?:(?:התקבלו|שהתקבלו|של) )?(?:בשנת |משנת |ב-?|מ-?)(\d{4})$"
            ),
            expected_type: Multiple,
            description: "החלטות בנושא מסוים בשנה מסוימת",
            sample: "החלטות בנושא תחבורה בשנת 2021",
            normalize: topic_with_year,
            sql: sql_topic_in_range,
            params: topic_then_text_params,
        },
        TemplateSpec {
            name: "government_topic",
            priority: 58,
            pattern: concat!(
                r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(?:(?:ה?החלטות (?:של )?)?(?:ב)?ה?ממשלה (?:מספר |מס' |ה-?)?(\d+) ",
                topic_marker!(),
                r" (.+)|ה?החלטות ",
                topic_marker!(),
                r" (.+?) (?:של |ב)ה?ממשלה (?:מספר |מס' |ה-?)?(\d+))$"
            ),
            expected_type: Multiple,
            description: "החלטות של ממשלה בנושא מסוים",
            sample: "החלטות ממשלה 37 בנושא חינוך",
            normalize: normalize_government_topic_any_order,
            sql: sql_government_topic,
            params: government_topic_params,
        },
        TemplateSpec {
            name: "date_range",
            priority: 55,
            pattern: r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*ה?החלטות (?:שהתקבלו )?(?:בין (?:ה-?)?|החל מ-?|מתאריך |מה-|מ-?)(\d[\d./-]*) (?:עד (?:ה-?)?|ועד |לבין |ל-?)(\d[\d./-]*)$",
            expected_type: Multiple,
            description: "החלטות בטווח תאריכים",
            sample: "החלטות בין 01/01/2023 ל-31/03/2023",
            normalize: normalize_date_range,
            sql: sql_in_range,
            params: text_params,
        },
        TemplateSpec {
            name: "decision_by_number",
            priority: 50,
            pattern: r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*ה?החלטה (?:מספר |מס' )?(\d+)$",
            expected_type: Single,
            description: "החלטה לפי מספר החלטה",
            sample: "החלטה מספר 1234",
            normalize: single_number,
            sql: sql_decision_by_number,
            params: text_params,
        },
        TemplateSpec {
            name: "prime_minister_decisions",
            priority: 45,
            pattern: concat!(
                r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*ה?החלטות (?:שהתקבלו )?",
                prime_minister_marker!(),
                r"(\p{Hebrew}+(?: \p{Hebrew}+)?)$"
            ),
            expected_type: Multiple,
            description: "החלטות בתקופת ראש ממשלה",
            sample: "החלטות בתקופת נתניהו",
            normalize: normalize_prime_minister,
            sql: sql_prime_minister_decisions,
            params: params_prime_minister,
        },
        TemplateSpec {
            name: "government_decisions",
            priority: 44,
            pattern: r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*(?:ה?החלטות (?:של )?)?(?:ב)?ה?ממשלה (?:מספר |מס' |ה-?)?(\d+)$",
            expected_type: Multiple,
            description: "החלטות של ממשלה",
            sample: "החלטות ממשלה 35",
            normalize: single_number,
            sql: sql_government_decisions,
            params: text_params,
        },
        TemplateSpec {
            name: "year_decisions",
            priority: 43,
            pattern: r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*ה?החלטות (?:שהתקבלו |של )?(?:בשנת |משנת |ב-?|מ-?)?(\d{4})$",
            expected_type: Multiple,
            description: "החלטות משנה מסוימת",
            sample: "החלטות משנת 2019",
            normalize: year_range,
            sql: sql_in_range,
            params: text_params,
        },
        TemplateSpec {
            name: "date_decisions",
            priority: 42,
            pattern: r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*ה?החלטות (?:שהתקבלו |של |מתאריך |בתאריך |מה-|מ-?|ב-?)?(\d{1,2}[./-]\d{1,2}[./-]\d{2,4}|\d{1,2}[./]\d{4}|(?:\d{1,2} )?ב?(?:ינואר|פברואר|מרץ|מרס|אפריל|מאי|יוני|יולי|אוגוסט|ספטמבר|אוקטובר|נובמבר|דצמבר) \d{4}|היום|אתמול|שלשום)$",
            expected_type: Multiple,
            description: "החלטות מתאריך או מחודש מסוים",
            sample: "החלטות מ-15/03/2023",
            normalize: normalize_single_date,
            sql: sql_in_range,
            params: text_params,
        },
        TemplateSpec {
            name: "topic_decisions",
            priority: 40,
            pattern: r"^(?:(?:מה|מהי|מהן|מהם|מי|הצג|הראה|את|כל|רשימת|אילו)\s+)*ה?החלטות (?:בנושא |בתחום |על |לגבי |בעניין |העוסקות ב-?|הנוגעות ל-?)(.+)$",
            expected_type: Multiple,
            description: "החלטות בנושא מסוים",
            sample: "החלטות בנושא אנרגיה",
            normalize: single_topic,
            sql: sql_topic_decisions,
            params: topic_then_text_params,
        },
    ]
}
