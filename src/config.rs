use config::{Config, ConfigBuilder, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};

use crate::crawler::{DEFAULT_MAX_DEPTH, DEFAULT_PAGE_SIZE};
use crate::enricher::DEFAULT_CONCURRENCY;
use crate::error::Result;
use crate::transfer::TransferMode;

const ENV_PREFIX: &str = "OWNERSHIP";
const MAX_PAGE_SIZE: i32 = 1000;
const MAX_CONCURRENCY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Account whose items may be selected and transferred.
    pub managed_owner: String,
    #[serde(default = "default_page_size")]
    pub page_size: i32,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub transfer_mode: TransferMode,
    /// User the service account impersonates, if any.
    #[serde(default)]
    pub subject: Option<String>,
}

fn default_page_size() -> i32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl AppConfig {
    pub fn new(managed_owner: impl Into<String>) -> Self {
        Self {
            managed_owner: managed_owner.into(),
            page_size: DEFAULT_PAGE_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            concurrency: DEFAULT_CONCURRENCY,
            transfer_mode: TransferMode::default(),
            subject: None,
        }
    }

    /// Rejects a blank managed owner and clamps numeric settings to ranges
    /// the Drive API accepts.
    pub fn validated(mut self) -> std::result::Result<Self, ConfigError> {
        self.managed_owner = self.managed_owner.trim().to_string();
        if self.managed_owner.is_empty() {
            return Err(ConfigError::Message(
                "managed_owner must not be empty".to_string(),
            ));
        }

        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        self.concurrency = self.concurrency.clamp(1, MAX_CONCURRENCY);
        self.max_depth = self.max_depth.max(1);
        self.subject = self
            .subject
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(self)
    }
}

/// Loads `Config.toml` from the working directory if present, then
/// `OWNERSHIP_*` environment variables on top.
pub fn load_configuration() -> Result<AppConfig> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));
    Ok(from_builder(builder)?)
}

fn from_builder(
    builder: ConfigBuilder<config::builder::DefaultState>,
) -> std::result::Result<AppConfig, ConfigError> {
    builder.build()?.try_deserialize::<AppConfig>()?.validated()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> std::result::Result<AppConfig, ConfigError> {
        from_builder(Config::builder().add_source(ConfigFile::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn test_defaults() {
        let config = parse(r#"managed_owner = "admin@example.com""#).unwrap();
        assert_eq!(config, AppConfig::new("admin@example.com"));
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.transfer_mode, TransferMode::PerItem);
    }

    #[test]
    fn test_full_file() {
        let config = parse(
            r#"
            managed_owner = " admin@example.com "
            page_size = 200
            max_depth = 10
            concurrency = 4
            transfer_mode = "all-or-nothing"
            subject = "admin@example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.managed_owner, "admin@example.com");
        assert_eq!(config.page_size, 200);
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.transfer_mode, TransferMode::AllOrNothing);
        assert_eq!(config.subject.as_deref(), Some("admin@example.com"));
    }

    #[test]
    fn test_values_are_clamped() {
        let config = parse(
            r#"
            managed_owner = "admin@example.com"
            page_size = 5000
            max_depth = 0
            concurrency = 0
            subject = ""
            "#,
        )
        .unwrap();
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.subject, None);
    }

    #[test]
    fn test_managed_owner_required() {
        assert!(parse("page_size = 10").is_err());
        assert!(parse(r#"managed_owner = "   ""#).is_err());
    }
}
