

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use super::error::{MediqueryError, Result};
use crate::toolkit::matching::emergency::DEFAULT_EMERGENCY_KEYWORDS;


pub const ENV_PREFIX: &str = "MEDIQUERY";


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediqueryConfig {

    pub max_distance_km: f64,
    pub top_diseases: usize,
    pub top_providers: usize,
    pub max_slots: usize,


    pub emergency_keywords: Vec<String>,


    pub knowledge_path: Option<String>,
    pub providers_path: Option<String>,
    pub audit_log_path: Option<String>,


    pub knowledge_cache_ttl_secs: u64,
    pub knowledge_cache_size: usize,
}

impl Default for MediqueryConfig {
    fn default() -> Self {
        Self {
            max_distance_km: crate::DEFAULT_MAX_DISTANCE_KM,
            top_diseases: crate::DEFAULT_TOP_DISEASES,
            top_providers: crate::DEFAULT_TOP_PROVIDERS,
            max_slots: crate::DEFAULT_MAX_SLOTS,

            emergency_keywords: DEFAULT_EMERGENCY_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),

            knowledge_path: None,
            providers_path: None,
            audit_log_path: None,

            knowledge_cache_ttl_secs: 300,
            knowledge_cache_size: 64,
        }
    }
}

impl MediqueryConfig {

    /// Layers defaults, an optional config file, then `MEDIQUERY_*` environment variables.
    pub fn load(file: Option<&str>) -> Result<Self> {
        Self::load_with_env(file, None)
    }

    /// `env` replaces the process environment when given.
    fn load_with_env(file: Option<&str>, env: Option<config::Map<String, String>>) -> Result<Self> {
        let defaults = Config::try_from(&Self::default()).map_err(config_error)?;

        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = file {
            builder = builder.add_source(File::with_name(path).required(false));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("emergency_keywords")
                    .source(env),
            )
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error)?;

        config.validate()?;
        Ok(config)
    }


    pub fn from_env() -> Result<Self> {
        let file = std::env::var("MEDIQUERY_CONFIG").ok();
        Self::load(file.as_deref())
    }


    pub fn validate(&self) -> Result<()> {
        if !self.max_distance_km.is_finite() || self.max_distance_km < 0.0 {
            return Err(MediqueryError::Configuration(format!(
                "max_distance_km must be a non-negative number, got {}",
                self.max_distance_km
            )));
        }
        for (name, value) in [
            ("top_diseases", self.top_diseases),
            ("top_providers", self.top_providers),
            ("max_slots", self.max_slots),
            ("knowledge_cache_size", self.knowledge_cache_size),
        ] {
            if value == 0 {
                return Err(MediqueryError::Configuration(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }
}

fn config_error(err: config::ConfigError) -> MediqueryError {
    MediqueryError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MediqueryConfig::default();
        assert_eq!(config.max_distance_km, 20.0);
        assert_eq!(config.top_diseases, 3);
        assert_eq!(config.top_providers, 10);
        assert_eq!(config.max_slots, 5);
        assert_eq!(config.emergency_keywords.len(), 7);
        assert!(config.knowledge_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mediquery.json");
        std::fs::write(&path, r#"{"max_distance_km": 35.5, "top_providers": 4}"#).unwrap();

        let config = MediqueryConfig::load(path.to_str()).unwrap();
        assert_eq!(config.max_distance_km, 35.5);
        assert_eq!(config.top_providers, 4);
        assert_eq!(config.top_diseases, 3);
    }

    #[test]
    fn test_env_overrides_defaults() {
        let env = [
            ("MEDIQUERY_TOP_PROVIDERS", "4"),
            ("MEDIQUERY_EMERGENCY_KEYWORDS", "collapse,seizure,severe"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = MediqueryConfig::load_with_env(None, Some(env)).unwrap();
        assert_eq!(config.top_providers, 4);
        assert_eq!(config.emergency_keywords, vec!["collapse", "seizure", "severe"]);
        assert_eq!(config.top_diseases, 3);
        assert_eq!(config.max_distance_km, 20.0);
    }

    #[test]
    fn test_env_rejects_invalid_limit() {
        let env = [("MEDIQUERY_MAX_SLOTS".to_string(), "0".to_string())]
            .into_iter()
            .collect();

        assert!(matches!(
            MediqueryConfig::load_with_env(None, Some(env)),
            Err(MediqueryError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = MediqueryConfig {
            top_diseases: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MediqueryError::Configuration(_))
        ));

        let config = MediqueryConfig {
            max_distance_km: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
