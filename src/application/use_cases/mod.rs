pub mod nl_query_service;
pub mod parameter_extractor;
pub mod prompts;
pub mod query_converter;
pub mod response_formatter;
pub mod sql_synthesizer;
pub mod sql_validator;
pub mod template_registry;
