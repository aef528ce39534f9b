pub mod use_cases;

pub use use_cases::nl_query_service::NlQueryService;
pub use use_cases::query_converter::QueryConverter;
