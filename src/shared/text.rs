//! Text cleanup applied before template matching.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ordinals::convert_ordinal;

static WHITESPACE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static POLITE_OPENER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:אני (?:רוצה|מחפש|מחפשת|מבקש|מבקשת)(?: לדעת)?|תן לי|תני לי|תנו לי|הצג לי|הציגי לי|הראה לי|הראי לי|תראה לי|תראי לי|מצא לי|מצאי לי|תמצא לי|חפש לי|חפש|אפשר לקבל|אפשר|האם תוכל לומר לי|תגיד לי|תגידי לי)\s+",
    )
    .unwrap()
});

static PLEASE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(?:בבקשה|בבקשתך|תודה)(?:\s|$)").unwrap());

static GOVERNMENT_ARTICLE_NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ממשלה\s+ה-?(\d+)").unwrap());

static GOVERNMENT_ORDINAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ממשלה\s+(ה[\p{Hebrew}]+)").unwrap());

static STRAY_PUNCTUATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;:!?()\[\]{}]|\s-\s").unwrap());

fn is_hebrew_mark(c: char) -> bool {
    matches!(c, '\u{0591}'..='\u{05BD}' | '\u{05BF}' | '\u{05C1}' | '\u{05C2}' | '\u{05C4}' | '\u{05C5}' | '\u{05C7}')
}

/// Strips niqqud and cantillation, unifies geresh/gershayim and maqaf,
/// collapses whitespace and trailing sentence punctuation.
pub fn normalize_query_text(text: &str) -> String {
    let unified: String = text
        .chars()
        .filter(|c| !is_hebrew_mark(*c))
        .map(|c| match c {
            '\u{05F3}' | '\u{2019}' | '\u{2018}' | '`' => '\'',
            '\u{05F4}' | '\u{201C}' | '\u{201D}' => '"',
            '\u{05BE}' | '\u{2013}' | '\u{2014}' => '-',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect();

    let collapsed = WHITESPACE_PATTERN.replace_all(unified.trim(), " ");
    collapsed
        .trim_end_matches(|c: char| matches!(c, '?' | '!' | '.' | ' '))
        .to_string()
}

fn relax_word(word: &str) -> &str {
    match word {
        "ההחלטה" | "החלטת" => "החלטה",
        "ההחלטות" | "החלטותיה" => "החלטות",
        "הממשלה" | "ממשלת" => "ממשלה",
        "מס'" | "מס" | "מס." | "מספרה" => "מספר",
        "שהתקבלו" | "שקיבלה" | "שהחליטה" => "של",
        other => other,
    }
}

/// Looser form used by the fuzzy matching pass.
pub fn relax_phrasing(text: &str) -> String {
    let normalized = normalize_query_text(text);
    let without_opener = POLITE_OPENER_PATTERN.replace(&normalized, "");
    let without_please = PLEASE_PATTERN.replace_all(&without_opener, " ");
    let without_punct = STRAY_PUNCTUATION_PATTERN.replace_all(&without_please, " ");

    let words: Vec<&str> = without_punct
        .split_whitespace()
        .map(relax_word)
        .collect();
    let joined = words.join(" ");

    let numbered = GOVERNMENT_ARTICLE_NUMBER_PATTERN.replace_all(&joined, "ממשלה $1");
    let ordinals = GOVERNMENT_ORDINAL_PATTERN.replace_all(&numbered, |caps: &regex::Captures| {
        match convert_ordinal(&caps[1]) {
            Some(number) => format!("ממשלה {}", number),
            None => caps[0].to_string(),
        }
    });

    WHITESPACE_PATTERN
        .replace_all(ordinals.trim(), " ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_niqqud_and_punctuation() {
        assert_eq!(normalize_query_text("  הַחְלָטָה   660?! "), "החלטה 660");
    }

    #[test]
    fn test_normalize_unifies_geresh() {
        assert_eq!(normalize_query_text("החלטה מס\u{05F3} 5"), "החלטה מס' 5");
        assert_eq!(normalize_query_text("צה\u{05F4}ל"), "צה\"ל");
    }

    #[test]
    fn test_relax_construct_forms_and_articles() {
        assert_eq!(relax_phrasing("ההחלטה 660 של הממשלה 37"), "החלטה 660 של ממשלה 37");
        assert_eq!(relax_phrasing("החלטת ממשלת 37 מס' 12"), "החלטה ממשלה 37 מספר 12");
    }

    #[test]
    fn test_relax_drops_openers() {
        assert_eq!(
            relax_phrasing("תן לי בבקשה את החלטה 5 של ממשלה 36"),
            "את החלטה 5 של ממשלה 36"
        );
    }

    #[test]
    fn test_relax_government_ordinal() {
        assert_eq!(relax_phrasing("החלטות הממשלה השלישית"), "החלטות ממשלה 3");
        assert_eq!(relax_phrasing("החלטות הממשלה ה-37"), "החלטות ממשלה 37");
    }

    #[test]
    fn test_relax_keeps_numeric_dates() {
        assert_eq!(relax_phrasing("החלטות מ-15-03-2023"), "החלטות מ-15-03-2023");
    }
}
