pub mod decision_schema;
pub mod error;
pub mod llm_config;
pub mod parameters;
pub mod policy_tags;
pub mod query;
