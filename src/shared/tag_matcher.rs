//! Fuzzy resolution of free text onto the canonical policy-tag taxonomy.

use crate::domain::policy_tags::{taxonomy, PolicyTagTaxonomy};
use crate::shared::text::normalize_query_text;

pub const DEFAULT_TAG_THRESHOLD: f64 = 0.75;

const CONTAINMENT_SCORE: f64 = 1.0;
const REVERSE_CONTAINMENT_SCORE: f64 = 0.9;
const HEBREW_PREFIXES: [char; 7] = ['ה', 'ב', 'ל', 'ו', 'מ', 'ש', 'כ'];

/// Similarity in `[0, 1]` between two already-normalized strings.
pub trait SimilarityScorer: Send + Sync {
    fn score(&self, left: &str, right: &str) -> f64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EditDistanceScorer;

impl SimilarityScorer for EditDistanceScorer {
    fn score(&self, left: &str, right: &str) -> f64 {
        strsim::normalized_levenshtein(left, right)
    }
}

/// Jaccard overlap of whitespace tokens, ignoring single-letter prefixes.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenOverlapScorer;

impl SimilarityScorer for TokenOverlapScorer {
    fn score(&self, left: &str, right: &str) -> f64 {
        let left: Vec<&str> = left.split_whitespace().collect();
        let right: Vec<&str> = right.split_whitespace().collect();
        if left.is_empty() || right.is_empty() {
            return 0.0;
        }

        let shared = left
            .iter()
            .filter(|l| right.iter().any(|r| token_matches(l, r)))
            .count();
        let union = left.len() + right.len() - shared;
        shared as f64 / union as f64
    }
}

/// `text_token` equals `tag_token`, possibly behind one Hebrew prefix letter.
fn token_matches(text_token: &str, tag_token: &str) -> bool {
    if text_token == tag_token {
        return true;
    }
    let mut chars = text_token.chars();
    match chars.next() {
        Some(first) if HEBREW_PREFIXES.contains(&first) => chars.as_str() == tag_token,
        _ => false,
    }
}

/// Whether `needle` appears as a contiguous token run inside `haystack`.
fn contains_tokens(haystack: &[&str], needle: &[&str]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack
        .windows(needle.len())
        .any(|window| window.iter().zip(needle).all(|(h, n)| token_matches(h, n)))
}

pub struct TagMatcher {
    scorer: Box<dyn SimilarityScorer>,
    threshold: f64,
}

impl Default for TagMatcher {
    fn default() -> Self {
        Self::new(Box::new(EditDistanceScorer), DEFAULT_TAG_THRESHOLD)
    }
}

impl TagMatcher {
    pub fn new(scorer: Box<dyn SimilarityScorer>, threshold: f64) -> Self {
        Self { scorer, threshold }
    }

    fn score_candidate(&self, text: &str, text_tokens: &[&str], candidate: &str) -> f64 {
        let candidate_tokens: Vec<&str> = candidate.split_whitespace().collect();
        if contains_tokens(text_tokens, &candidate_tokens) {
            return CONTAINMENT_SCORE;
        }
        if text.chars().count() >= 3 && contains_tokens(&candidate_tokens, text_tokens) {
            return REVERSE_CONTAINMENT_SCORE;
        }
        self.scorer.score(text, candidate)
    }

    /// Best-scoring canonical tag at or above the threshold.
    pub fn match_in<'a>(&self, taxonomy: &'a PolicyTagTaxonomy, free_text: &str) -> Option<&'a str> {
        let text = normalize_query_text(free_text);
        let text_tokens: Vec<&str> = text.split_whitespace().collect();
        if text_tokens.is_empty() {
            return None;
        }

        // Longer candidates win ties so "השכלה גבוהה" beats a bare "השכלה".
        let mut best: Option<(f64, usize, &'a str)> = None;
        for tag in &taxonomy.tags {
            let candidates = std::iter::once(&tag.name).chain(tag.synonyms.iter());
            for candidate in candidates {
                let score = self.score_candidate(&text, &text_tokens, candidate);
                let length = candidate.chars().count();
                let better = match best {
                    None => true,
                    Some((best_score, best_length, _)) => {
                        score > best_score || (score == best_score && length > best_length)
                    }
                };
                if better {
                    best = Some((score, length, tag.name.as_str()));
                }
            }
        }

        best.filter(|(score, _, _)| *score >= self.threshold)
            .map(|(_, _, name)| name)
    }

    pub fn match_tag(&self, free_text: &str) -> Option<&'static str> {
        self.match_in(taxonomy(), free_text)
    }
}

/// Default matcher: normalized Levenshtein with a 0.75 threshold.
pub fn match_tag(free_text: &str) -> Option<&'static str> {
    TagMatcher::default().match_tag(free_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_quality_resolves() {
        assert_eq!(match_tag("איכות הסביבה"), Some("סביבה ואקלים"));
        assert_eq!(match_tag("הסביבה"), Some("סביבה ואקלים"));
    }

    #[test]
    fn test_unrelated_text_is_absent() {
        assert_eq!(match_tag("פיצה עם זיתים"), None);
        assert_eq!(match_tag(""), None);
    }

    #[test]
    fn test_prefix_tolerance() {
        assert_eq!(match_tag("בחינוך"), Some("חינוך"));
        assert_eq!(match_tag("לתחבורה ציבורית"), Some("תחבורה ציבורית ותשתיות תחבורה"));
    }

    #[test]
    fn test_longer_candidate_wins_tie() {
        assert_eq!(match_tag("השכלה גבוהה"), Some("השכלה גבוהה"));
    }

    #[test]
    fn test_niqqud_and_typo_tolerance() {
        assert_eq!(match_tag("חקלאוּת"), Some("חקלאות"));
        assert_eq!(match_tag("תיירוט"), Some("תיירות"));
    }

    #[test]
    fn test_swappable_scorer_and_threshold() {
        let strict = TagMatcher::new(Box::new(EditDistanceScorer), 0.99);
        assert_eq!(strict.match_tag("תיירוט"), None);

        let overlap = TagMatcher::new(Box::new(TokenOverlapScorer), 0.5);
        assert_eq!(overlap.match_tag("בריאות הציבור"), Some("בריאות ורפואה"));
    }
}
