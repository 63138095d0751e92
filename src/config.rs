use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::domain::Address;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub settlement_url: String,
    pub token_address: Address,
    /// Session account; commands and balance tracking need it.
    pub account: Option<Address>,
    pub poll_interval_ms: u64,
    pub display_decimals: usize,
    pub from_block: u64,
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
        let port = parse_or(&env_map, "PORT", "8080", "must be a valid u16")?;

        let settlement_url = env_map
            .get("SETTLEMENT_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("SETTLEMENT_URL".to_string()))?;

        let token_address = env_map
            .get("TOKEN_ADDRESS")
            .ok_or_else(|| ConfigError::MissingEnv("TOKEN_ADDRESS".to_string()))
            .and_then(|raw| parse_address("TOKEN_ADDRESS", raw))?;
        if token_address.is_native() {
            return Err(ConfigError::InvalidValue(
                "TOKEN_ADDRESS".to_string(),
                "must not be the native-asset sentinel".to_string(),
            ));
        }

        let account = env_map
            .get("ACCOUNT")
            .filter(|s| !s.trim().is_empty())
            .map(|raw| parse_address("ACCOUNT", raw))
            .transpose()?;

        let poll_interval_ms: u64 =
            parse_or(&env_map, "POLL_INTERVAL_MS", "2000", "must be a positive integer")?;
        if poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "POLL_INTERVAL_MS".to_string(),
                "must be a positive integer".to_string(),
            ));
        }

        let display_decimals: usize =
            parse_or(&env_map, "DISPLAY_DECIMALS", "2", "must be between 0 and 18")?;
        if display_decimals > 18 {
            return Err(ConfigError::InvalidValue(
                "DISPLAY_DECIMALS".to_string(),
                "must be between 0 and 18".to_string(),
            ));
        }

        let from_block = parse_or(&env_map, "FROM_BLOCK", "0", "must be a valid block number")?;

        Ok(Config {
            port,
            settlement_url,
            token_address,
            account,
            poll_interval_ms,
            display_decimals,
            from_block,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn parse_or<T: FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
    expected: &str,
) -> Result<T, ConfigError> {
    env_map
        .get(key)
        .map(|s| s.trim())
        .unwrap_or(default)
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), expected.to_string()))
}

fn parse_address(key: &str, raw: &str) -> Result<Address, ConfigError> {
    Address::from_str(raw)
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "0x3333333333333333333333333333333333333333";

    fn base_env() -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("SETTLEMENT_URL".to_string(), "http://localhost:8545".to_string());
        env.insert("TOKEN_ADDRESS".to_string(), TOKEN.to_string());
        env
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(base_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.token_address.as_str(), TOKEN);
        assert!(config.account.is_none());
        assert_eq!(config.poll_interval(), Duration::from_millis(2000));
        assert_eq!(config.display_decimals, 2);
        assert_eq!(config.from_block, 0);
    }

    #[test]
    fn test_missing_required() {
        let mut env = base_env();
        env.remove("SETTLEMENT_URL");
        let err = Config::from_env_map(env).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(ref k) if k == "SETTLEMENT_URL"));

        let mut env = base_env();
        env.remove("TOKEN_ADDRESS");
        assert!(matches!(
            Config::from_env_map(env),
            Err(ConfigError::MissingEnv(_))
        ));
    }

    #[test]
    fn test_account_is_parsed() {
        let mut env = base_env();
        env.insert(
            "ACCOUNT".to_string(),
            "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string(),
        );
        let config = Config::from_env_map(env).unwrap();
        assert_eq!(
            config.account.unwrap().as_str(),
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
        );
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("PORT", "eighty"),
            ("ACCOUNT", "0x12"),
            ("POLL_INTERVAL_MS", "0"),
            ("DISPLAY_DECIMALS", "19"),
            ("FROM_BLOCK", "-1"),
            ("TOKEN_ADDRESS", "0x0000000000000000000000000000000000000000"),
        ] {
            let mut env = base_env();
            env.insert(key.to_string(), value.to_string());
            let err = Config::from_env_map(env).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue(ref k, _) if k == key),
                "{} = {}",
                key,
                value
            );
        }
    }
}
