//! Конфигурация приложения из TOML
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "json"
//!
//! [[aspects]]
//! pointcut = "execution(* aopdemo.dao.*.*(..))"
//! message = "Executing @Before advice on"
//! ```

use std::path::{Path, PathBuf};

use aspect::{parse_pointcut, MethodPattern, PatternError};
use common::LoggingConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Единственное правило демо: любой метод любого DAO
pub const DEFAULT_POINTCUT: &str = "execution(* aopdemo.dao.*.*(..))";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("aspect #{index} has an invalid pointcut '{pointcut}': {source}")]
    InvalidPointcut {
        index: usize,
        pointcut: String,
        #[source]
        source: PatternError,
    },
}

/// Одно правило перехвата
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectConfig {
    pub pointcut: String,
    /// Текст advice; `None` - текст по умолчанию
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AspectConfig {
    pub fn new(pointcut: impl Into<String>) -> Self {
        Self {
            pointcut: pointcut.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn pattern(&self) -> Result<MethodPattern, PatternError> {
        parse_pointcut(&self.pointcut)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub aspects: Vec<AspectConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            aspects: vec![AspectConfig::new(DEFAULT_POINTCUT)],
        }
    }
}

impl AppConfig {
    /// Разобрать и проверить конфигурацию. Отсутствующая секция `aspects`
    /// дает правило по умолчанию, явный пустой список - демо без advice.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            aspects = config.aspects.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Проверить все pointcut выражения до первого вызова
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, aspect) in self.aspects.iter().enumerate() {
            let pattern = aspect
                .pattern()
                .map_err(|source| ConfigError::InvalidPointcut {
                    index,
                    pointcut: aspect.pointcut.clone(),
                    source,
                })?;
            debug!(index, pattern = %pattern, "validated aspect");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::LogFormat;

    #[test]
    fn test_default_config_has_dao_rule() {
        let config = AppConfig::default();
        assert_eq!(config.aspects, vec![AspectConfig::new(DEFAULT_POINTCUT)]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config = AppConfig::from_toml_str(
            r#"
            [logging]
            level = "debug"
            format = "json"

            [[aspects]]
            pointcut = "execution(public void add*())"
            message = "membership only"

            [[aspects]]
            pointcut = "execution(* aopdemo.dao..*.*(..))"
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.aspects.len(), 2);
        assert_eq!(config.aspects[0].message.as_deref(), Some("membership only"));
        assert_eq!(config.aspects[1].message, None);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.aspects[0].pointcut, DEFAULT_POINTCUT);
        assert_eq!(config.logging.level, "warn");

        let empty = AppConfig::from_toml_str("aspects = []").unwrap();
        assert!(empty.aspects.is_empty());
    }

    #[test]
    fn test_invalid_pointcut_reports_index() {
        let err = AppConfig::from_toml_str(
            r#"
            [[aspects]]
            pointcut = "execution(* *(..))"

            [[aspects]]
            pointcut = "execution(* aopdemo.dao.*.do%Work(..))"
            "#,
        )
        .unwrap_err();

        match err {
            ConfigError::InvalidPointcut { index, pointcut, .. } => {
                assert_eq!(index, 1);
                assert!(pointcut.contains("do%Work"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            AppConfig::from_toml_str("[[aspects]\npointcut ="),
            Err(ConfigError::Parse(_))
        ));
    }
}
