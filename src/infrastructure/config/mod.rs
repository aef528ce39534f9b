//! Layered service configuration.
//!
//! Precedence, lowest first: built-in defaults, the TOML file (`DQ_CONFIG` or
//! `decision-query.toml`), `DQ_`-prefixed environment variables with `__` as
//! the section separator (`DQ_LLM__API_KEY`), and finally a bare `DATABASE_URL`.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;

pub const DEFAULT_CONFIG_FILE: &str = "decision-query.toml";
pub const CONFIG_PATH_ENV: &str = "DQ_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub statement_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/decisions".to_string(),
            max_connections: 10,
            connect_timeout_secs: 5,
            statement_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Row cap for synthesized list queries when the question names none.
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 50,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Enables `/api/execute-sql` when set.
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: LLMConfig,
    pub engine: EngineConfig,
    pub admin: AdminConfig,
}

pub struct ConfigService;

impl ConfigService {
    /// Full provider stack rooted at `config_path`.
    pub fn figment(config_path: &str) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("DQ_").split("__"))
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL"])
                    .map(|_| "database.url".into()),
            )
    }

    pub fn load() -> Result<AppConfig> {
        if let Err(err) = dotenvy::dotenv() {
            debug!(error = %err, "No .env file loaded");
        }
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        debug!(path = %path, "Loading configuration");
        Self::from_figment(Self::figment(&path))
    }

    pub fn from_figment(figment: Figment) -> Result<AppConfig> {
        let config: AppConfig = figment.extract()?;
        Self::check(&config)?;
        Ok(config)
    }

    fn check(config: &AppConfig) -> Result<()> {
        if config.database.url.trim().is_empty() {
            return Err(AppError::ConfigError("database.url is empty".to_string()));
        }
        if config.engine.max_limit < 1 {
            return Err(AppError::ConfigError(
                "engine.max_limit must be at least 1".to_string(),
            ));
        }
        if config.engine.default_limit < 1 || config.engine.default_limit > config.engine.max_limit
        {
            return Err(AppError::ConfigError(format!(
                "engine.default_limit must be between 1 and {}",
                config.engine.max_limit
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm_config::LLMProvider;

    fn with_toml(toml: &str) -> Result<AppConfig> {
        ConfigService::from_figment(
            Figment::new()
                .merge(Serialized::defaults(AppConfig::default()))
                .merge(Toml::string(toml)),
        )
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = with_toml("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.statement_timeout_secs, 30);
        assert_eq!(config.llm.provider, LLMProvider::OpenAI);
        assert!(config.admin.api_token.is_none());
    }

    #[test]
    fn test_toml_overrides_sections() {
        let config = with_toml(
            r#"
            [server]
            port = 9000

            [llm]
            provider = "Gemini"
            base_url = "https://generativelanguage.googleapis.com/v1beta/models"
            model = "gemini-1.5-flash"

            [admin]
            api_token = "secret"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.provider, LLMProvider::Gemini);
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.admin.api_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_invalid_limits_rejected() {
        let err = with_toml("[engine]\ndefault_limit = 80\nmax_limit = 50").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_bad_types_are_config_errors() {
        let err = with_toml("[server]\nport = \"eighty\"").unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
