// src/config.rs
// =============================================================================
// Runtime settings for discovery runs and for the HTTP server.
//
// Every value has a sensible default. They can be overridden with SCOUT_*
// environment variables (a .env file is loaded first if present), and the
// CLI flags in main.rs override those again.
//
// Rust concepts:
// - Generics with trait bounds: env_parse<T: FromStr> works for any number type
// - Option<T>: "not set" is a normal case, not an error
// =============================================================================

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::wordlist::Wordlist;

pub const DEFAULT_CT_ENDPOINT: &str = "https://crt.sh/";
pub const DEFAULT_PORT: u16 = 9382;

/// Knobs for one discovery run
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Base URL of the Certificate Transparency search service
    pub ct_endpoint: String,
    /// Timeout for the single CT request
    pub ct_timeout: Duration,
    /// Timeout for each individual DNS lookup
    pub dns_lookup_timeout: Duration,
    /// Deadline for the whole DNS sweep (labels + TXT record)
    pub dns_sweep_timeout: Duration,
    /// How many DNS lookups may be in flight at once
    pub dns_concurrency: usize,
    /// Hard limit for every source in a run
    pub run_timeout: Duration,
    /// Buffer size for streaming runs; extra results are dropped
    pub stream_capacity: usize,
    /// Labels tried by the DNS source
    pub wordlist: Wordlist,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            ct_endpoint: DEFAULT_CT_ENDPOINT.to_string(),
            ct_timeout: Duration::from_secs(30),
            dns_lookup_timeout: Duration::from_secs(2),
            dns_sweep_timeout: Duration::from_secs(30),
            dns_concurrency: 20,
            run_timeout: Duration::from_secs(30),
            stream_capacity: 100,
            wordlist: Wordlist::default(),
        }
    }
}

impl DiscoveryConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let wordlist = match env::var("SCOUT_WORDLIST") {
            Ok(path) => Wordlist::from_file(&PathBuf::from(path))?,
            Err(_) => defaults.wordlist,
        };

        Ok(Self {
            ct_endpoint: env::var("SCOUT_CT_ENDPOINT").unwrap_or(defaults.ct_endpoint),
            ct_timeout: env_duration("SCOUT_CT_TIMEOUT_SECS", Duration::from_secs)?
                .unwrap_or(defaults.ct_timeout),
            dns_lookup_timeout: env_duration("SCOUT_DNS_LOOKUP_TIMEOUT_MS", Duration::from_millis)?
                .unwrap_or(defaults.dns_lookup_timeout),
            dns_sweep_timeout: env_duration("SCOUT_DNS_SWEEP_TIMEOUT_SECS", Duration::from_secs)?
                .unwrap_or(defaults.dns_sweep_timeout),
            dns_concurrency: env_parse("SCOUT_DNS_CONCURRENCY")?
                .unwrap_or(defaults.dns_concurrency)
                .max(1),
            run_timeout: env_duration("SCOUT_RUN_TIMEOUT_SECS", Duration::from_secs)?
                .unwrap_or(defaults.run_timeout),
            stream_capacity: env_parse("SCOUT_STREAM_CAPACITY")?
                .unwrap_or(defaults.stream_capacity)
                .max(1),
            wordlist,
        })
    }
}

/// Where the HTTP API listens
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: env::var("SCOUT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("PORT")?.unwrap_or(DEFAULT_PORT),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Reads and parses an optional variable. Unset -> Ok(None), garbage -> Err.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(None),
    }
}

// Like env_parse, for timeouts. Zero is refused: it would expire immediately.
fn env_duration(key: &str, unit: fn(u64) -> Duration) -> Result<Option<Duration>> {
    match env_parse::<u64>(key)? {
        Some(0) => bail!("{} must be greater than zero", key),
        value => Ok(value.map(unit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.ct_endpoint, "https://crt.sh/");
        assert_eq!(config.ct_timeout, Duration::from_secs(30));
        assert_eq!(config.dns_concurrency, 20);
        assert_eq!(config.stream_capacity, 100);
        assert!(!config.wordlist.is_empty());
    }

    #[test]
    fn test_env_parse() {
        // Unique names so parallel tests don't step on each other
        env::set_var("SCOUT_TEST_PARSE_OK", " 42 ");
        env::set_var("SCOUT_TEST_PARSE_BAD", "forty-two");

        assert_eq!(env_parse::<u64>("SCOUT_TEST_PARSE_OK").unwrap(), Some(42));
        assert!(env_parse::<u64>("SCOUT_TEST_PARSE_BAD").is_err());
        assert_eq!(env_parse::<u64>("SCOUT_TEST_PARSE_UNSET").unwrap(), None);
    }

    #[test]
    fn test_env_duration_rejects_zero() {
        env::set_var("SCOUT_TEST_DURATION_ZERO", "0");
        env::set_var("SCOUT_TEST_DURATION_OK", "15");

        let err = env_duration("SCOUT_TEST_DURATION_ZERO", Duration::from_secs).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
        assert_eq!(
            env_duration("SCOUT_TEST_DURATION_OK", Duration::from_millis).unwrap(),
            Some(Duration::from_millis(15))
        );
        assert_eq!(env_duration("SCOUT_TEST_DURATION_UNSET", Duration::from_secs).unwrap(), None);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9382,
        };
        assert_eq!(config.addr(), "127.0.0.1:9382");
    }
}
