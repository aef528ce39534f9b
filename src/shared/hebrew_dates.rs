//! Date-token normalization for Hebrew queries.
//!
//! Accepted shapes: numeric day-first dates (`/`, `.` or `-`), ISO dates,
//! month/year, bare years, Hebrew month names with a year, and relative
//! expressions ("היום", "לפני 3 ימים", "שנתיים"). Anything else yields `None`;
//! callers treat that as "no date constraint".

use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static NUMERIC_DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[./-](\d{1,2})[./-](\d{4}|\d{2})$").unwrap());

static ISO_DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());

static MONTH_YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[./](\d{4})$").unwrap());

static YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})$").unwrap());

static HEBREW_MONTH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d{1,2})\s+)?(?:ב-?)?(\p{Hebrew}+)\s+(?:שנת\s+)?(\d{4}|\d{2})$").unwrap()
});

static RELATIVE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:לפני\s+)?(\d+)\s+(יום|ימים|שבוע|שבועות|חודש|חודשים|שנה|שנים)$").unwrap()
});

static LEADING_WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:בשנת|שנת|בתאריך|מתאריך|תאריך|עד|החל מ-?)\s*").unwrap());

static LETTER_PREFIX_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[במל]-?(\d)").unwrap());

const HEBREW_MONTHS: [(&str, u32); 13] = [
    ("ינואר", 1),
    ("פברואר", 2),
    ("מרץ", 3),
    ("מרס", 3),
    ("אפריל", 4),
    ("מאי", 5),
    ("יוני", 6),
    ("יולי", 7),
    ("אוגוסט", 8),
    ("ספטמבר", 9),
    ("אוקטובר", 10),
    ("נובמבר", 11),
    ("דצמבר", 12),
];

const MIN_YEAR: i32 = 1948;
const MAX_YEAR: i32 = 2100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalDate {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl CanonicalDate {
    pub fn year(year: i32) -> Option<Self> {
        (MIN_YEAR..=MAX_YEAR).contains(&year).then_some(Self {
            year,
            month: None,
            day: None,
        })
    }

    pub fn month(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)?;
        Self::year(year).map(|date| Self {
            month: Some(month),
            ..date
        })
    }

    pub fn full(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)?;
        Self::year(year).map(|date| Self {
            month: Some(month),
            day: Some(day),
            ..date
        })
    }

    pub fn from_naive(date: NaiveDate) -> Option<Self> {
        Self::full(date.year(), date.month(), date.day())
    }

    /// First calendar day covered by this date.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month.unwrap_or(1), self.day.unwrap_or(1))
    }

    /// Last calendar day covered by this date.
    pub fn last_day(&self) -> Option<NaiveDate> {
        match (self.month, self.day) {
            (Some(month), Some(day)) => NaiveDate::from_ymd_opt(self.year, month, day),
            (Some(month), None) => NaiveDate::from_ymd_opt(self.year, month, 1)?
                .checked_add_months(Months::new(1))?
                .pred_opt(),
            _ => NaiveDate::from_ymd_opt(self.year, 12, 31),
        }
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.month, self.day) {
            (Some(month), Some(day)) => write!(f, "{:04}-{:02}-{:02}", self.year, month, day),
            (Some(month), None) => write!(f, "{:04}-{:02}", self.year, month),
            _ => write!(f, "{:04}", self.year),
        }
    }
}

fn expand_year(raw: &str) -> Option<i32> {
    let value: i32 = raw.parse().ok()?;
    if raw.len() == 2 {
        Some(2000 + value)
    } else {
        Some(value)
    }
}

fn hebrew_month(word: &str) -> Option<u32> {
    HEBREW_MONTHS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, month)| *month)
}

fn relative_date(token: &str, today: NaiveDate) -> Option<NaiveDate> {
    let token = token.strip_prefix("לפני ").unwrap_or(token).trim();
    match token {
        "היום" => return Some(today),
        "אתמול" => return today.pred_opt(),
        "שלשום" => return today.checked_sub_signed(Duration::days(2)),
        "יום" => return today.pred_opt(),
        "יומיים" => return today.checked_sub_signed(Duration::days(2)),
        "שבוע" => return today.checked_sub_signed(Duration::weeks(1)),
        "שבועיים" => return today.checked_sub_signed(Duration::weeks(2)),
        "חודש" => return today.checked_sub_months(Months::new(1)),
        "חודשיים" => return today.checked_sub_months(Months::new(2)),
        "שנה" => return today.checked_sub_months(Months::new(12)),
        "שנתיים" => return today.checked_sub_months(Months::new(24)),
        _ => {}
    }

    let caps = RELATIVE_PATTERN.captures(token)?;
    let amount: u32 = caps[1].parse().ok()?;
    match &caps[2] {
        "יום" | "ימים" => today.checked_sub_signed(Duration::days(i64::from(amount))),
        "שבוע" | "שבועות" => today.checked_sub_signed(Duration::weeks(i64::from(amount))),
        "חודש" | "חודשים" => today.checked_sub_months(Months::new(amount)),
        _ => today.checked_sub_months(Months::new(amount.checked_mul(12)?)),
    }
}

/// Normalizes a date token against the local clock.
pub fn normalize_date(token: &str) -> Option<CanonicalDate> {
    normalize_date_at(token, Local::now().date_naive())
}

/// Normalizes a date token relative to `today`.
pub fn normalize_date_at(token: &str, today: NaiveDate) -> Option<CanonicalDate> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    match token {
        "השנה" => return CanonicalDate::year(today.year()),
        "שנה שעברה" | "השנה שעברה" | "בשנה שעברה" => {
            return CanonicalDate::year(today.year() - 1)
        }
        _ => {}
    }

    if let Some(date) = relative_date(token, today) {
        return CanonicalDate::from_naive(date);
    }

    let token = LEADING_WORD_PATTERN.replace(token, "");
    let token = LETTER_PREFIX_PATTERN.replace(token.trim(), "$1");
    let token = token.trim();

    if let Some(caps) = ISO_DATE_PATTERN.captures(token) {
        return CanonicalDate::full(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
    }

    if let Some(caps) = NUMERIC_DATE_PATTERN.captures(token) {
        return CanonicalDate::full(
            expand_year(&caps[3])?,
            caps[2].parse().ok()?,
            caps[1].parse().ok()?,
        );
    }

    if let Some(caps) = MONTH_YEAR_PATTERN.captures(token) {
        return CanonicalDate::month(caps[2].parse().ok()?, caps[1].parse().ok()?);
    }

    if let Some(caps) = YEAR_PATTERN.captures(token) {
        return CanonicalDate::year(caps[1].parse().ok()?);
    }

    if let Some(caps) = HEBREW_MONTH_PATTERN.captures(token) {
        let month = hebrew_month(&caps[2])?;
        let year = expand_year(&caps[3])?;
        return match caps.get(1) {
            Some(day) => CanonicalDate::full(year, month, day.as_str().parse().ok()?),
            None => CanonicalDate::month(year, month),
        };
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    fn render(token: &str) -> Option<String> {
        normalize_date_at(token, today()).map(|d| d.to_string())
    }

    #[test]
    fn test_numeric_separators_agree() {
        let expected = Some("2023-03-15".to_string());
        assert_eq!(render("15/03/2023"), expected);
        assert_eq!(render("15.03.2023"), expected);
        assert_eq!(render("15-03-2023"), expected);
        assert_eq!(render("2023-03-15"), expected);
    }

    #[test]
    fn test_two_digit_year_is_2000s() {
        assert_eq!(render("1/2/23").as_deref(), Some("2023-02-01"));
    }

    #[test]
    fn test_year_and_month_forms() {
        assert_eq!(render("2021").as_deref(), Some("2021"));
        assert_eq!(render("בשנת 2021").as_deref(), Some("2021"));
        assert_eq!(render("03/2022").as_deref(), Some("2022-03"));
        assert_eq!(render("מרץ 2023").as_deref(), Some("2023-03"));
        assert_eq!(render("בינואר 2020").as_deref(), Some("2020-01"));
        assert_eq!(render("15 במרץ 2023").as_deref(), Some("2023-03-15"));
    }

    #[test]
    fn test_relative_forms() {
        assert_eq!(render("היום").as_deref(), Some("2024-03-20"));
        assert_eq!(render("אתמול").as_deref(), Some("2024-03-19"));
        assert_eq!(render("שלשום").as_deref(), Some("2024-03-18"));
        assert_eq!(render("לפני 3 ימים").as_deref(), Some("2024-03-17"));
        assert_eq!(render("לפני שבועיים").as_deref(), Some("2024-03-06"));
        assert_eq!(render("לפני 2 חודשים").as_deref(), Some("2024-01-20"));
        assert_eq!(render("שנתיים").as_deref(), Some("2022-03-20"));
        assert_eq!(render("השנה").as_deref(), Some("2024"));
        assert_eq!(render("בשנה שעברה").as_deref(), Some("2023"));
    }

    #[test]
    fn test_unparseable_is_absent() {
        assert_eq!(render("31/02/2023"), None);
        assert_eq!(render("13/13/2023"), None);
        assert_eq!(render("מחר בבוקר"), None);
        assert_eq!(render(""), None);
        assert_eq!(render("1066"), None);
    }

    #[test]
    fn test_range_bounds() {
        let month = CanonicalDate::month(2024, 2).unwrap();
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29));

        let year = CanonicalDate::year(2023).unwrap();
        assert_eq!(year.last_day(), NaiveDate::from_ymd_opt(2023, 12, 31));
    }
}
