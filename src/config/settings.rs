use crate::error::{Result, SigningError};
use crate::wallet::KeyFormat;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_EXPIRATION_SECS: u64 = 60;
const DEFAULT_KEY_PREFIX: &str = "EOS";
const DEFAULT_LOG_LEVEL: &str = "info";

const ENV_PREFIX: &str = "EOSIGN_";
const EXPIRATION_SECS_KEY: &str = "EOSIGN_EXPIRATION_SECS";
const KEY_FORMAT_KEY: &str = "EOSIGN_KEY_FORMAT";
const KEY_PREFIX_KEY: &str = "EOSIGN_KEY_PREFIX";
const LOG_LEVEL_KEY: &str = "EOSIGN_LOG_LEVEL";

/// Settings for the command-line tool. Resolved once in `main` and passed
/// down; the library itself never reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds added to the head block time for a new transaction
    pub expiration_secs: u64,
    /// How public keys are printed
    pub key_format: KeyFormat,
    /// Prefix for legacy public keys, `EOS` on mainnet
    pub key_prefix: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            expiration_secs: DEFAULT_EXPIRATION_SECS,
            key_format: KeyFormat::Legacy,
            key_prefix: String::from(DEFAULT_KEY_PREFIX),
            log_level: String::from(DEFAULT_LOG_LEVEL),
        }
    }
}

impl Config {
    /// Defaults, then `EOSIGN_*` environment variables
    pub fn new() -> Result<Config> {
        let mut config = Config::default();
        config.apply_overrides(env::vars())?;
        Ok(config)
    }

    /// Reads a TOML file, then applies `EOSIGN_*` environment variables on top
    pub fn load(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path)
            .map_err(|e| SigningError::Config(format!("{}: {e}", path.display())))?;
        let mut config = Config::from_toml_str(&text)?;
        config.apply_overrides(env::vars())?;
        Ok(config)
    }

    /// Parses TOML; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Config> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `EOSIGN_*` pairs; other keys are ignored
    pub fn apply_overrides<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if !key.starts_with(ENV_PREFIX) {
                continue;
            }
            match key.as_str() {
                EXPIRATION_SECS_KEY => {
                    self.expiration_secs = value.parse().map_err(|_| {
                        SigningError::Config(format!("{key} must be a number of seconds: {value}"))
                    })?;
                }
                KEY_FORMAT_KEY => {
                    self.key_format = KeyFormat::from_str(&value).map_err(SigningError::Config)?;
                }
                KEY_PREFIX_KEY => self.key_prefix = value,
                LOG_LEVEL_KEY => self.log_level = value,
                _ => {}
            }
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.expiration_secs == 0 {
            return Err(SigningError::Config(
                "expiration_secs must be at least 1".to_string(),
            ));
        }
        if self.key_prefix.is_empty() || !self.key_prefix.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(SigningError::Config(format!(
                "key_prefix must be upper-case letters: {:?}",
                self.key_prefix
            )));
        }
        self.log_level_filter()?;
        Ok(())
    }

    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expiration_secs)
    }

    pub fn log_level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| SigningError::Config(format!("unknown log level: {}", self.log_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.expiration(), Duration::from_secs(60));
        assert_eq!(config.key_format, KeyFormat::Legacy);
        assert_eq!(config.key_prefix, "EOS");
        assert_eq!(config.log_level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("key_format = \"modern\"\n").unwrap();
        assert_eq!(config.key_format, KeyFormat::Modern);
        assert_eq!(config.expiration_secs, 60);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "expiration_secs = 120\nkey_prefix = \"WAX\"\nlog_level = \"debug\""
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.expiration_secs, 120);
        assert_eq!(config.key_prefix, "WAX");
        assert_eq!(config.log_level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(SigningError::Config(_))));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::from_toml_str("expiration_secs = \"soon\""),
            Err(SigningError::Config(_))
        ));
        assert!(Config::from_toml_str("expiration_secs = 0").is_err());
        assert!(Config::from_toml_str("key_prefix = \"eos\"").is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(vars(&[
                ("EOSIGN_EXPIRATION_SECS", "30"),
                ("EOSIGN_KEY_FORMAT", "Modern"),
                ("EOSIGN_LOG_LEVEL", "warn"),
                ("HOME", "/root"),
            ]))
            .unwrap();
        assert_eq!(config.expiration_secs, 30);
        assert_eq!(config.key_format, KeyFormat::Modern);
        assert_eq!(config.log_level_filter().unwrap(), LevelFilter::Warn);
    }

    #[test]
    fn test_bad_overrides() {
        let mut config = Config::default();
        assert!(config
            .apply_overrides(vars(&[("EOSIGN_EXPIRATION_SECS", "later")]))
            .is_err());
        assert!(config
            .apply_overrides(vars(&[("EOSIGN_KEY_FORMAT", "r1")]))
            .is_err());

        let mut config = Config::default();
        assert!(config
            .apply_overrides(vars(&[("EOSIGN_LOG_LEVEL", "loud")]))
            .is_err());
    }
}
