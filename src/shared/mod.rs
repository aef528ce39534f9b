pub mod hebrew_dates;
pub mod ordinals;
pub mod phrasing;
pub mod tag_matcher;
pub mod text;

pub use hebrew_dates::{normalize_date, normalize_date_at, CanonicalDate};
pub use ordinals::convert_ordinal;
pub use tag_matcher::{match_tag, SimilarityScorer, TagMatcher};
pub use text::{normalize_query_text, relax_phrasing};
