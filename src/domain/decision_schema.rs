pub const DECISIONS_TABLE: &str = "israeli_government_decisions";

/// Columns for a single-decision card.
pub const CARD_COLUMNS: &str = "id, government_number, decision_number, decision_date, \
decision_title, summary, decision_content, tags_policy_area, tags_government_body, \
tags_location, operativity, prime_minister, committee, decision_url, decision_key";

/// List rows skip `decision_content`.
pub const LIST_COLUMNS: &str = "id, government_number, decision_number, decision_date, \
decision_title, summary, tags_policy_area, operativity, prime_minister, decision_url";

pub const OPERATIVE: &str = "אופרטיבית";
pub const DECLARATIVE: &str = "דקלרטיבית";

/// Schema text handed to the completion provider during synthesis.
pub const SCHEMA_DESCRIPTION: &str = r#"Table israeli_government_decisions (PostgreSQL):
- id (integer, primary key)
- government_number (text) e.g. '37'
- decision_number (text) e.g. '660'
- decision_date (date)
- decision_title (text, Hebrew)
- summary (text, Hebrew)
- decision_content (text, Hebrew, full body)
- tags_policy_area (text, semicolon-delimited canonical policy tags)
- tags_government_body (text, semicolon-delimited)
- tags_location (text, semicolon-delimited)
- operativity (text: 'אופרטיבית' or 'דקלרטיבית')
- prime_minister (text, Hebrew full name)
- committee (text)
- decision_url (text)
- decision_key (text, unique '<government>_<decision>')
Full-text indexes exist on decision_title, summary, decision_content and tags_policy_area."#;
