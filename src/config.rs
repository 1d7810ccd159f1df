//! Environment-based configuration.

use crate::domain::Category;
use crate::engine::OversellPolicy;
use crate::exchange::Credentials;
use std::collections::HashMap;
use thiserror::Error;

const DEFAULT_API_URL: &str = "https://api.bybit.com";
const DEFAULT_CATEGORIES: &str = "spot,linear";
const DEFAULT_FETCH_LIMIT: &str = "50";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub api_url: String,
    /// API key/secret; Debug on Credentials redacts the secret.
    pub credentials: Credentials,
    pub categories: Vec<Category>,
    pub fetch_limit: u32,
    pub oversell_policy: OversellPolicy,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let api_key = env_map
            .get("BYBIT_API_KEY")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("BYBIT_API_KEY".to_string()))?;

        let api_secret = env_map
            .get("BYBIT_API_SECRET")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("BYBIT_API_SECRET".to_string()))?;

        let api_url = env_map
            .get("BYBIT_API_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let categories: Vec<Category> = env_map
            .get("SYNC_CATEGORIES")
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_CATEGORIES)
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| Category::new(s.to_string()))
            .collect();
        if categories.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SYNC_CATEGORIES".to_string(),
                "must name at least one category".to_string(),
            ));
        }

        let fetch_limit = env_map
            .get("TRADE_FETCH_LIMIT")
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_FETCH_LIMIT)
            .parse::<u32>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "TRADE_FETCH_LIMIT".to_string(),
                    "must be a valid u32".to_string(),
                )
            })?;

        let oversell_policy = match env_map
            .get("OVERSELL_POLICY")
            .map(|s| s.as_str())
            .unwrap_or("allow")
        {
            "allow" => OversellPolicy::Allow,
            "reject" => OversellPolicy::Reject,
            other => {
                return Err(ConfigError::InvalidValue(
                    "OVERSELL_POLICY".to_string(),
                    format!("must be allow or reject, got {}", other),
                ))
            }
        };

        Ok(Config {
            database_path,
            api_url,
            credentials: Credentials::new(api_key, api_secret),
            categories,
            fetch_limit,
            oversell_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/test.db".to_string());
        map.insert("BYBIT_API_KEY".to_string(), "key".to_string());
        map.insert("BYBIT_API_SECRET".to_string(), "secret".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.api_url, "https://api.bybit.com");
        assert_eq!(config.categories, vec![Category::spot(), Category::linear()]);
        assert_eq!(config.fetch_limit, 50);
        assert_eq!(config.oversell_policy, OversellPolicy::Allow);
    }

    #[test]
    fn test_missing_database_path() {
        let mut env_map = setup_required_env();
        env_map.remove("DATABASE_PATH");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_api_key() {
        let mut env_map = setup_required_env();
        env_map.remove("BYBIT_API_KEY");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "BYBIT_API_KEY"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_api_secret() {
        let mut env_map = setup_required_env();
        env_map.remove("BYBIT_API_SECRET");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "BYBIT_API_SECRET"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_custom_categories() {
        let mut env_map = setup_required_env();
        env_map.insert("SYNC_CATEGORIES".to_string(), "spot".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.categories, vec![Category::spot()]);
    }

    #[test]
    fn test_empty_categories_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("SYNC_CATEGORIES".to_string(), " , ".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "SYNC_CATEGORIES"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_fetch_limit() {
        let mut env_map = setup_required_env();
        env_map.insert("TRADE_FETCH_LIMIT".to_string(), "lots".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "TRADE_FETCH_LIMIT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_oversell_policy_reject() {
        let mut env_map = setup_required_env();
        env_map.insert("OVERSELL_POLICY".to_string(), "reject".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.oversell_policy, OversellPolicy::Reject);
    }

    #[test]
    fn test_invalid_oversell_policy() {
        let mut env_map = setup_required_env();
        env_map.insert("OVERSELL_POLICY".to_string(), "shrug".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "OVERSELL_POLICY"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let mut env_map = setup_required_env();
        env_map.insert("BYBIT_API_SECRET".to_string(), "hunter2".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"), "got: {}", rendered);
    }
}
