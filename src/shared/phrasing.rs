//! Regex fragments for the phrasings that introduce a topic or a prime minister.
//!
//! Template patterns and the count formatter both splice these in with
//! `concat!`, so a question the templates accept is also understood when its
//! answer is rendered. Each fragment is a non-capturing group.

/// "בנושא X", "בתחום X", "על X", "לגבי X".
macro_rules! topic_marker {
    () => {
        "(?:בנושא|בתחום|על|לגבי)"
    };
}

/// "בתקופת [ראש הממשלה] X", "בראשות X", "של ראש הממשלה X". Ends with a space.
macro_rules! prime_minister_marker {
    () => {
        "(?:בתקופת (?:ראש ה?ממשלה )?|בראשות |של ראש ה?ממשלה )"
    };
}

pub(crate) use prime_minister_marker;
pub(crate) use topic_marker;

#[cfg(test)]
mod tests {
    use regex::Regex;

    #[test]
    fn test_topic_marker_alternatives() {
        let pattern = Regex::new(concat!("^", topic_marker!(), " (.+)$")).unwrap();
        for marker in ["בנושא", "בתחום", "על", "לגבי"] {
            let text = format!("{} חינוך", marker);
            assert_eq!(&pattern.captures(&text).unwrap()[1], "חינוך");
        }
        assert!(!pattern.is_match("בעניין חינוך"));
    }

    #[test]
    fn test_prime_minister_marker_alternatives() {
        let pattern = Regex::new(concat!("^", prime_minister_marker!(), r"(\p{Hebrew}+)$")).unwrap();
        for text in [
            "בתקופת נתניהו",
            "בתקופת ראש הממשלה נתניהו",
            "בראשות נתניהו",
            "של ראש הממשלה נתניהו",
        ] {
            assert_eq!(&pattern.captures(text).unwrap()[1], "נתניהו", "{}", text);
        }
    }
}
