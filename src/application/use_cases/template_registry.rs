//! Template Registry
//!
//! Deterministic, priority-ordered resolution of Hebrew questions into
//! parameterized SQL. Two passes run over the query:
//! - exact: over `normalize_query_text(query)`
//! - fuzzy: over `relax_phrasing(query)`, only when the exact pass found nothing
//!   and relaxing actually changed the text
//!
//! The first template that matches wins; there is no backtracking across
//! templates once a capture normalizer accepts a match.

mod templates;

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::domain::query::{ExpectedResultType, SqlConversion, TEMPLATE_CONFIDENCE};
use crate::shared::text::{normalize_query_text, relax_phrasing};

static PLACEHOLDER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\d+)").unwrap());

/// Number of distinct positional placeholders (`$1..$n`) in `sql`.
pub fn count_placeholders(sql: &str) -> usize {
    PLACEHOLDER_PATTERN
        .captures_iter(sql)
        .filter_map(|caps| caps[1].parse::<usize>().ok())
        .collect::<BTreeSet<_>>()
        .len()
}

pub trait Template: Send + Sync {
    fn name(&self) -> &'static str;
    fn priority(&self) -> u32;
    fn expected_type(&self) -> ExpectedResultType;
    /// Hebrew description of what the template answers.
    fn description(&self) -> &'static str;
    /// Canonical Hebrew phrasing, reused in guidance answers.
    fn sample(&self) -> &'static str;
    /// Normalized captures, or `None` when the text does not match.
    fn match_text(&self, text: &str) -> Option<Vec<String>>;
    fn build_sql(&self, captures: &[String]) -> String;
    fn build_params(&self, captures: &[String]) -> Vec<Value>;
}

/// Static description of a regex-backed template.
pub struct TemplateSpec {
    pub name: &'static str,
    pub priority: u32,
    pub pattern: &'static str,
    pub expected_type: ExpectedResultType,
    pub description: &'static str,
    pub sample: &'static str,
    /// Turns raw regex captures into template captures; may reject the match.
    pub normalize: fn(&Captures) -> Option<Vec<String>>,
    pub sql: fn(&[String]) -> String,
    pub params: fn(&[String]) -> Vec<Value>,
}

pub struct QueryTemplate {
    spec: TemplateSpec,
    pattern: Regex,
}

impl QueryTemplate {
    pub fn new(spec: TemplateSpec) -> std::result::Result<Self, regex::Error> {
        let pattern = Regex::new(spec.pattern)?;
        Ok(Self { spec, pattern })
    }
}

impl Template for QueryTemplate {
    fn name(&self) -> &'static str {
        self.spec.name
    }

    fn priority(&self) -> u32 {
        self.spec.priority
    }

    fn expected_type(&self) -> ExpectedResultType {
        self.spec.expected_type
    }

    fn description(&self) -> &'static str {
        self.spec.description
    }

    fn sample(&self) -> &'static str {
        self.spec.sample
    }

    fn match_text(&self, text: &str) -> Option<Vec<String>> {
        let caps = self.pattern.captures(text)?;
        (self.spec.normalize)(&caps)
    }

    fn build_sql(&self, captures: &[String]) -> String {
        (self.spec.sql)(captures)
    }

    fn build_params(&self, captures: &[String]) -> Vec<Value> {
        (self.spec.params)(captures)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPass {
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone)]
pub struct TemplateResolution {
    pub template_name: &'static str,
    pub expected_type: ExpectedResultType,
    pub sql: String,
    pub params: Vec<Value>,
    pub captures: Vec<String>,
    pub pass: MatchPass,
}

impl TemplateResolution {
    pub fn into_conversion(self) -> SqlConversion {
        let explanation = match self.pass {
            MatchPass::Exact => format!("השאלה זוהתה בתבנית קבועה ({})", self.template_name),
            MatchPass::Fuzzy => format!(
                "השאלה זוהתה בתבנית קבועה לאחר נרמול הניסוח ({})",
                self.template_name
            ),
        };
        SqlConversion {
            sql: self.sql,
            params: self.params,
            expected_type: self.expected_type,
            confidence: TEMPLATE_CONFIDENCE,
            template_used: Some(self.template_name.to_string()),
            explanation,
        }
    }
}

pub struct TemplateRegistry {
    templates: Vec<Box<dyn Template>>,
}

static BUILTIN: Lazy<TemplateRegistry> = Lazy::new(|| {
    let templates = templates::builtin_specs()
        .into_iter()
        .filter_map(|spec| {
            let name = spec.name;
            match QueryTemplate::new(spec) {
                Ok(template) => Some(Box::new(template) as Box<dyn Template>),
                Err(err) => {
                    error!(template = name, error = %err, "Template pattern failed to compile");
                    None
                }
            }
        })
        .collect();
    TemplateRegistry::new(templates)
});

impl TemplateRegistry {
    /// Stable-sorts by descending priority; equal priorities keep insertion order.
    pub fn new(mut templates: Vec<Box<dyn Template>>) -> Self {
        templates.sort_by_key(|t| std::cmp::Reverse(t.priority()));
        Self { templates }
    }

    pub fn builtin() -> &'static TemplateRegistry {
        &BUILTIN
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Template names in scan order.
    pub fn names(&self) -> Vec<&'static str> {
        self.templates.iter().map(|t| t.name()).collect()
    }

    pub fn templates(&self) -> &[Box<dyn Template>] {
        &self.templates
    }

    /// `(sample, description)` pairs for guidance text, most specific first.
    pub fn samples(&self, limit: usize) -> Vec<(&'static str, &'static str)> {
        self.templates
            .iter()
            .map(|t| (t.sample(), t.description()))
            .take(limit)
            .collect()
    }

    fn scan(&self, text: &str, pass: MatchPass) -> Option<TemplateResolution> {
        self.templates.iter().find_map(|template| {
            let captures = template.match_text(text)?;
            Some(TemplateResolution {
                template_name: template.name(),
                expected_type: template.expected_type(),
                sql: template.build_sql(&captures),
                params: template.build_params(&captures),
                captures,
                pass,
            })
        })
    }

    pub fn resolve(&self, query: &str) -> Option<TemplateResolution> {
        let exact = normalize_query_text(query);
        if exact.is_empty() {
            return None;
        }

        if let Some(resolution) = self.scan(&exact, MatchPass::Exact) {
            debug!(template = resolution.template_name, "Exact template match");
            return Some(resolution);
        }

        let relaxed = relax_phrasing(query);
        if relaxed == exact || relaxed.is_empty() {
            return None;
        }

        let resolution = self.scan(&relaxed, MatchPass::Fuzzy)?;
        debug!(
            template = resolution.template_name,
            relaxed = %relaxed,
            "Fuzzy template match"
        );
        Some(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> &'static TemplateRegistry {
        TemplateRegistry::builtin()
    }

    fn position(name: &str) -> usize {
        registry()
            .names()
            .iter()
            .position(|n| *n == name)
            .unwrap_or_else(|| panic!("missing template {}", name))
    }

    #[test]
    fn test_all_builtin_templates_compile() {
        assert_eq!(registry().len(), templates::builtin_specs().len());
        assert_eq!(registry().len(), 27);
    }

    #[test]
    fn test_names_are_unique() {
        let names: BTreeSet<&str> = registry().names().into_iter().collect();
        assert_eq!(names.len(), registry().len());
    }

    #[test]
    fn test_scan_order_is_descending_priority() {
        let priorities: Vec<u32> = registry().templates().iter().map(|t| t.priority()).collect();
        assert!(priorities.windows(2).all(|w| w[0] >= w[1]));
        assert!(position("decision_with_government") < position("decision_by_number"));
        assert!(position("count_topic_government") < position("count_topic"));
        assert!(position("topic_date_range") < position("date_range"));
    }

    #[test]
    fn test_every_sample_resolves_to_its_template() {
        for template in registry().templates() {
            let resolution = registry()
                .resolve(template.sample())
                .unwrap_or_else(|| panic!("sample of {} did not resolve", template.name()));
            assert_eq!(
                resolution.template_name,
                template.name(),
                "sample '{}' resolved elsewhere",
                template.sample()
            );
            assert_eq!(resolution.pass, MatchPass::Exact);
        }
    }

    #[test]
    fn test_placeholder_count_matches_params_for_every_sample() {
        for template in registry().templates() {
            let resolution = registry().resolve(template.sample()).unwrap();
            assert_eq!(
                count_placeholders(&resolution.sql),
                resolution.params.len(),
                "template {} built mismatched SQL: {}",
                template.name(),
                resolution.sql
            );
        }
    }

    #[test]
    fn test_placeholder_count_matches_params_for_optional_branches() {
        let cases = [
            ("כמה החלטות דקלרטיביות", "count_operativity", 1),
            ("כמה החלטות אופרטיביות של ממשלה 36", "count_operativity", 2),
            ("ההחלטות האחרונות", "latest_decisions", 1),
            ("החלטות בנושא חינוך של ממשלה 37", "government_topic", 2),
            ("החלטות ממשלה 37 בנושא חינוך", "government_topic", 2),
        ];
        for (query, name, param_count) in cases {
            let resolution = registry()
                .resolve(query)
                .unwrap_or_else(|| panic!("'{}' did not resolve", query));
            assert_eq!(resolution.template_name, name, "{}", query);
            assert_eq!(resolution.params.len(), param_count, "{}", query);
            assert_eq!(
                count_placeholders(&resolution.sql),
                resolution.params.len(),
                "'{}' built mismatched SQL: {}",
                query,
                resolution.sql
            );
        }
    }

    #[test]
    fn test_reversed_government_topic_binds_government_first() {
        let resolution = registry().resolve("החלטות בנושא חינוך של ממשלה 37").unwrap();
        assert_eq!(resolution.params, vec![json!("37"), json!("%חינוך%")]);
    }

    #[test]
    fn test_latest_decisions_without_count_uses_default_limit() {
        let resolution = registry().resolve("ההחלטות האחרונות").unwrap();
        assert_eq!(resolution.params, vec![json!(10)]);
    }

    #[test]
    fn test_every_topic_marker_reaches_count_templates() {
        for marker in ["בנושא", "בתחום", "על", "לגבי"] {
            let query = format!("כמה החלטות {} חינוך קיבלה ממשלה 37", marker);
            let resolution = registry().resolve(&query).unwrap();
            assert_eq!(resolution.template_name, "count_topic_government", "{}", query);
        }
        for query in [
            "כמה החלטות התקבלו בראשות נתניהו",
            "כמה החלטות של ראש הממשלה נתניהו",
        ] {
            let resolution = registry().resolve(query).unwrap();
            assert_eq!(resolution.template_name, "count_prime_minister", "{}", query);
        }
    }

    #[test]
    fn test_decision_with_government_scenario() {
        let resolution = registry().resolve("החלטה 660 של ממשלה 37").unwrap();
        assert_eq!(resolution.template_name, "decision_with_government");
        assert_eq!(resolution.expected_type, ExpectedResultType::Single);
        assert_eq!(resolution.captures, vec!["660".to_string(), "37".to_string()]);
        assert_eq!(resolution.params, vec![json!("660"), json!("37")]);
    }

    #[test]
    fn test_government_first_word_order_binds_same_params() {
        let resolution = registry().resolve("ממשלה 37 החלטה 660").unwrap();
        assert_eq!(resolution.template_name, "government_then_decision");
        assert_eq!(resolution.params, vec![json!("660"), json!("37")]);
    }

    #[test]
    fn test_count_topic_government_scenario() {
        let resolution = registry()
            .resolve("כמה החלטות בנושא חינוך קיבלה ממשלה 37")
            .unwrap();
        assert_eq!(resolution.template_name, "count_topic_government");
        assert_eq!(resolution.expected_type, ExpectedResultType::Count);
        assert_eq!(resolution.params, vec![json!("37"), json!("%חינוך%")]);
    }

    #[test]
    fn test_fuzzy_pass_handles_articles() {
        let resolution = registry().resolve("ההחלטה 660 של הממשלה 37").unwrap();
        assert_eq!(resolution.template_name, "decision_with_government");
        assert_eq!(resolution.pass, MatchPass::Fuzzy);
    }

    #[test]
    fn test_fuzzy_pass_handles_openers_and_ordinals() {
        let resolution = registry()
            .resolve("תן לי בבקשה את ההחלטה השלישית של הממשלה 36")
            .unwrap();
        assert_eq!(resolution.template_name, "nth_decision_of_government");
        assert_eq!(resolution.params, vec![json!("36"), json!(2)]);
    }

    #[test]
    fn test_topic_resolves_through_taxonomy() {
        let resolution = registry().resolve("החלטות בנושא איכות הסביבה").unwrap();
        assert_eq!(resolution.template_name, "topic_decisions");
        assert_eq!(resolution.params, vec![json!("%סביבה ואקלים%")]);
    }

    #[test]
    fn test_unknown_topic_falls_back_to_free_text() {
        let resolution = registry().resolve("החלטות בנושא רכבל לכנרת").unwrap();
        assert_eq!(resolution.params, vec![json!("%רכבל לכנרת%")]);
    }

    #[test]
    fn test_year_binds_as_date_range() {
        let resolution = registry().resolve("כמה החלטות התקבלו בשנת 2023").unwrap();
        assert_eq!(resolution.template_name, "count_year");
        assert_eq!(
            resolution.params,
            vec![json!("2023-01-01"), json!("2023-12-31")]
        );
    }

    #[test]
    fn test_reversed_date_range_is_rejected() {
        assert!(registry()
            .resolve("החלטות בין 01/01/2024 ל-01/01/2023")
            .is_none());
    }

    #[test]
    fn test_nonsense_does_not_match() {
        assert!(registry().resolve("מה מזג האוויר מחר בחיפה").is_none());
        assert!(registry().resolve("   ").is_none());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let first = registry().resolve("5 ההחלטות האחרונות בנושא בריאות").unwrap();
        let second = registry().resolve("5 ההחלטות האחרונות בנושא בריאות").unwrap();
        assert_eq!(first.template_name, second.template_name);
        assert_eq!(first.sql, second.sql);
        assert_eq!(first.params, second.params);
    }

    #[test]
    fn test_count_placeholders_counts_distinct() {
        assert_eq!(count_placeholders("SELECT 1 WHERE a = $1 OR b = $1 AND c = $2"), 2);
        assert_eq!(count_placeholders("SELECT 1"), 0);
    }

    #[test]
    fn test_into_conversion_carries_template_confidence() {
        let conversion = registry()
            .resolve("החלטה 660 של ממשלה 37")
            .unwrap()
            .into_conversion();
        assert_eq!(conversion.confidence, TEMPLATE_CONFIDENCE);
        assert_eq!(
            conversion.template_used.as_deref(),
            Some("decision_with_government")
        );
        assert!(!conversion.is_guidance());
    }
}
