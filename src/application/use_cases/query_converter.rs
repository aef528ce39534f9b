use std::sync::Arc;

use tracing::{debug, info};

use crate::application::use_cases::parameter_extractor::ParameterExtractor;
use crate::application::use_cases::sql_synthesizer::SqlSynthesizer;
use crate::application::use_cases::template_registry::TemplateRegistry;
use crate::domain::error::Result;
use crate::domain::query::SqlConversion;
use crate::infrastructure::llm_clients::CompletionClient;

/// Question to SQL: registry first, then extraction and synthesis.
pub struct QueryConverter {
    registry: &'static TemplateRegistry,
    extractor: ParameterExtractor,
    synthesizer: SqlSynthesizer,
}

impl QueryConverter {
    pub fn new(client: Arc<dyn CompletionClient>, list_limit: i64) -> Self {
        Self {
            registry: TemplateRegistry::builtin(),
            extractor: ParameterExtractor::new(client.clone()),
            synthesizer: SqlSynthesizer::new(client).with_list_limit(list_limit),
        }
    }

    /// Template-only conversion; never reaches the completion provider.
    pub fn convert_with_templates(&self, query: &str) -> Option<SqlConversion> {
        self.registry
            .resolve(query)
            .map(|resolution| resolution.into_conversion())
    }

    pub async fn convert(&self, query: &str) -> Result<SqlConversion> {
        if let Some(conversion) = self.convert_with_templates(query) {
            info!(
                template = conversion.template_used.as_deref().unwrap_or_default(),
                "Query answered by template"
            );
            return Ok(conversion);
        }

        debug!("No template matched, falling back to extraction and synthesis");
        let params = self.extractor.extract(query).await;
        let conversion = self.synthesizer.synthesize(query, &params).await?;
        info!(
            confidence = conversion.confidence,
            guidance = conversion.is_guidance(),
            "Query answered by synthesis"
        );
        Ok(conversion)
    }
}
