use std::sync::Arc;

use tracing::info;

use crate::application::use_cases::nl_query_service::NlQueryService;
use crate::application::use_cases::query_converter::QueryConverter;
use crate::application::use_cases::template_registry::TemplateRegistry;
use crate::domain::error::Result;
use crate::domain::policy_tags::taxonomy;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::{DecisionStore, PgDecisionStore};
use crate::infrastructure::llm_clients::{CompletionClient, RouterClient};

/// Shared, immutable handles for request handlers.
pub struct AppState {
    pub query_service: NlQueryService,
    pub admin_token: Option<String>,
}

pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let registry = TemplateRegistry::builtin();
    let taxonomy = taxonomy();
    info!(
        templates = registry.len(),
        policy_tags = taxonomy.tags.len(),
        taxonomy_version = %taxonomy.version,
        "Loaded template registry and policy taxonomy"
    );

    let store: Arc<dyn DecisionStore> = Arc::new(PgDecisionStore::connect_lazy(&config.database)?);
    let client: Arc<dyn CompletionClient> = Arc::new(RouterClient::new(config.llm.clone()));
    info!(
        provider = ?config.llm.provider,
        model = %config.llm.model,
        "Configured completion provider"
    );

    let list_limit = config.engine.default_limit.min(config.engine.max_limit);
    let converter = QueryConverter::new(client, list_limit);

    Ok(AppState {
        query_service: NlQueryService::new(converter, store),
        admin_token: config
            .admin
            .api_token
            .clone()
            .filter(|token| !token.trim().is_empty()),
    })
}
