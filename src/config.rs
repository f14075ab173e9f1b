use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::lexical::scanner::DEFAULT_MIN_LENGTH;

const DEFAULT_DB_PATH: &str = "./sift.db";
const DEFAULT_REPORT_PATH: &str = "output/sift-report.md";
const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_TOP_N: usize = 20;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// value has a default; CLI flags override individual fields per run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: String,
    /// Minimum fragment length in characters (SIFT_MIN_LENGTH, >= 1)
    pub min_length: usize,
    /// Whether the noise filter runs during comparison (SIFT_FILTER)
    pub filter_enabled: bool,
    /// Parallel extraction workers for `batch` (SIFT_CONCURRENCY, >= 1)
    pub concurrency: usize,
    /// Length of the ranked duplicate list (SIFT_TOP_N)
    pub top_n: usize,
    /// Where `compare` writes its Markdown report
    pub report_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            min_length: DEFAULT_MIN_LENGTH,
            filter_enabled: true,
            concurrency: DEFAULT_CONCURRENCY,
            top_n: DEFAULT_TOP_N,
            report_path: DEFAULT_REPORT_PATH.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. `load` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let min_length = parse_or(&lookup, "SIFT_MIN_LENGTH", defaults.min_length)?;
        if min_length == 0 {
            anyhow::bail!("SIFT_MIN_LENGTH must be at least 1");
        }

        let concurrency = parse_or(&lookup, "SIFT_CONCURRENCY", defaults.concurrency)?;
        if concurrency == 0 {
            anyhow::bail!("SIFT_CONCURRENCY must be at least 1");
        }

        let filter_enabled = match lookup("SIFT_FILTER") {
            Some(raw) => parse_switch(&raw)
                .with_context(|| format!("SIFT_FILTER has an invalid value: {raw}"))?,
            None => defaults.filter_enabled,
        };

        Ok(Self {
            db_path: lookup("SIFT_DB_PATH").unwrap_or(defaults.db_path),
            min_length,
            filter_enabled,
            concurrency,
            top_n: parse_or(&lookup, "SIFT_TOP_N", defaults.top_n)?,
            report_path: lookup("SIFT_REPORT_PATH").unwrap_or(defaults.report_path),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

fn parse_switch(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        other => anyhow::bail!("expected on/off, got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.min_length, 4);
        assert!(config.filter_enabled);
    }

    #[test]
    fn test_overrides_parse() {
        let config = config_from(&[
            ("SIFT_DB_PATH", "/tmp/x.db"),
            ("SIFT_MIN_LENGTH", "6"),
            ("SIFT_FILTER", "off"),
            ("SIFT_CONCURRENCY", "8"),
        ])
        .unwrap();
        assert_eq!(config.db_path, "/tmp/x.db");
        assert_eq!(config.min_length, 6);
        assert!(!config.filter_enabled);
        assert_eq!(config.concurrency, 8);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config_from(&[("SIFT_MIN_LENGTH", "0")]).is_err());
        assert!(config_from(&[("SIFT_MIN_LENGTH", "four")]).is_err());
        assert!(config_from(&[("SIFT_FILTER", "maybe")]).is_err());
        assert!(config_from(&[("SIFT_CONCURRENCY", "0")]).is_err());
    }
}
