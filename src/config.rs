use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://catalog.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MEDIA_ROOT: &str = "./media";
const DEFAULT_FILE_SIZE_LIMIT: usize = 5 * 1024 * 1024;

/// Runtime settings, read from the environment (and `.env`) at start-up.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub max_connections: Option<u32>,
    pub bind_addr: String,
    /// Directory uploaded images are written to and served from.
    pub media_root: PathBuf,
    /// Upload limit in bytes.
    pub file_size_limit: usize,
    pub admin_enabled: bool,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be `true` or `false`, got {value:?}")]
    InvalidFlag { key: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenvy::dotenv().ok();
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => Some(parse_number("DATABASE_MAX_CONNECTIONS", value)?),
            None => None,
        };
        let file_size_limit = match lookup("FILE_SIZE_LIMIT") {
            Some(value) => parse_number("FILE_SIZE_LIMIT", value)?,
            None => DEFAULT_FILE_SIZE_LIMIT,
        };
        let admin_enabled = match lookup("ADMIN_ENABLED") {
            Some(value) => parse_flag("ADMIN_ENABLED", value)?,
            None => true,
        };

        Ok(Config {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned()),
            max_connections,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned()),
            media_root: lookup("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT)),
            file_size_limit,
            admin_enabled,
        })
    }
}

fn parse_number<T: std::str::FromStr + PartialOrd + Default>(
    key: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    match value.trim().parse::<T>() {
        Ok(number) if number > T::default() => Ok(number),
        _ => Err(ConfigError::InvalidNumber { key, value }),
    }
}

fn parse_flag(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.media_root, PathBuf::from("./media"));
        assert_eq!(config.file_size_limit, DEFAULT_FILE_SIZE_LIMIT);
        assert_eq!(config.max_connections, None);
        assert!(config.admin_enabled);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "1"),
            ("FILE_SIZE_LIMIT", "1024"),
            ("ADMIN_ENABLED", "false"),
            ("MEDIA_ROOT", "/tmp/media"),
        ])
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_connections, Some(1));
        assert_eq!(config.file_size_limit, 1024);
        assert!(!config.admin_enabled);
        assert_eq!(config.media_root, PathBuf::from("/tmp/media"));
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            config_from(&[("FILE_SIZE_LIMIT", "lots")]).unwrap_err(),
            ConfigError::InvalidNumber {
                key: "FILE_SIZE_LIMIT",
                value: "lots".to_string()
            }
        );
        assert!(config_from(&[("DATABASE_MAX_CONNECTIONS", "0")]).is_err());
        assert!(config_from(&[("ADMIN_ENABLED", "maybe")]).is_err());
    }
}
