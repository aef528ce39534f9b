use crate::domain::decision_schema::SCHEMA_DESCRIPTION;
use crate::domain::parameters::ExtractedParameters;
use crate::domain::policy_tags::taxonomy;

const EXTRACTION_TEMPLATE: &str = include_str!("../../../resources/prompts/parameter_extraction.md");
const SYNTHESIS_TEMPLATE: &str = include_str!("../../../resources/prompts/sql_synthesis.md");

fn policy_tag_list() -> String {
    taxonomy()
        .names()
        .map(|name| format!("- {}", name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn build_extraction_system_prompt() -> String {
    EXTRACTION_TEMPLATE.replace("{{policy_tags}}", &policy_tag_list())
}

pub(crate) fn build_extraction_user_prompt(query: &str) -> String {
    format!("Question: {}\nReturn only the JSON object.", query.trim())
}

pub(crate) fn build_synthesis_system_prompt() -> String {
    SYNTHESIS_TEMPLATE
        .replace("{{schema}}", SCHEMA_DESCRIPTION)
        .replace("{{policy_tags}}", &policy_tag_list())
}

pub(crate) fn build_synthesis_user_prompt(query: &str, params: &ExtractedParameters) -> String {
    let mut body = String::new();
    body.push_str(&format!("Question: {}\n", query.trim()));
    if params.is_empty() {
        body.push_str("Pre-extracted parameters: none\n");
    } else {
        body.push_str(&format!(
            "Pre-extracted parameters (already normalized, prefer these values):\n{}\n",
            params.to_json()
        ));
    }
    body.push_str("Return only the JSON object.");
    body
}
