const ORDINALS: [(&str, &str, &str); 10] = [
    ("ראשון", "ראשונה", "1"),
    ("שני", "שנייה", "2"),
    ("שלישי", "שלישית", "3"),
    ("רביעי", "רביעית", "4"),
    ("חמישי", "חמישית", "5"),
    ("שישי", "שישית", "6"),
    ("שביעי", "שביעית", "7"),
    ("שמיני", "שמינית", "8"),
    ("תשיעי", "תשיעית", "9"),
    ("עשירי", "עשירית", "10"),
];

/// Hebrew ordinal word (first..tenth, either gender, optional article) to a digit string.
pub fn convert_ordinal(word: &str) -> Option<String> {
    let trimmed = word.trim().trim_start_matches("ה-");
    // "שניה" is the common defective spelling of "שנייה".
    let candidates = [trimmed, trimmed.strip_prefix('ה').unwrap_or(trimmed)];

    candidates.iter().find_map(|candidate| {
        let candidate = if *candidate == "שניה" { "שנייה" } else { candidate };
        ORDINALS
            .iter()
            .find(|(masculine, feminine, _)| candidate == *masculine || candidate == *feminine)
            .map(|(_, _, digits)| digits.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masculine_and_feminine() {
        assert_eq!(convert_ordinal("ראשון").as_deref(), Some("1"));
        assert_eq!(convert_ordinal("השלישית").as_deref(), Some("3"));
        assert_eq!(convert_ordinal("העשירי").as_deref(), Some("10"));
        assert_eq!(convert_ordinal("שניה").as_deref(), Some("2"));
    }

    #[test]
    fn test_unknown_word() {
        assert_eq!(convert_ordinal("הנוכחית"), None);
        assert_eq!(convert_ordinal(""), None);
    }
}
