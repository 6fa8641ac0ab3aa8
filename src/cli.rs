// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Subcommands:
// - search: run every source, print the full result set at the end
// - stream: print each subdomain the moment it is found
// - serve:  start the HTTP API (JSON + Server-Sent Events)
//
// Settings come from DiscoveryConfig::from_env() first; the flags here
// override them for a single invocation.
//
// Rust concepts:
// - Derive macros: #[derive(Parser)] generates the parsing code for us
// - #[command(flatten)]: reuse one set of flags in several subcommands
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::DiscoveryConfig;
use crate::wordlist::Wordlist;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "subdomain-scout",
    version = "0.1.0",
    about = "Discover subdomains from Certificate Transparency logs and DNS brute force",
    long_about = "subdomain-scout asks Certificate Transparency logs for every certificate issued under a domain \
                  and, at the same time, tries a wordlist of common labels against DNS. \
                  Results from both are merged so each subdomain is reported once."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find subdomains and print them all once the search is done
    ///
    /// Example: subdomain-scout search example.com
    Search {
        /// Domain to search under (e.g., example.com)
        domain: String,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Find subdomains and print each one as soon as it is discovered
    ///
    /// Example: subdomain-scout stream example.com --json
    Stream {
        /// Domain to search under (e.g., example.com)
        domain: String,

        /// Print one JSON object per line instead of plain text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Run the HTTP API (POST /api/search, POST /api/stream)
    ///
    /// Example: subdomain-scout serve --port 9382
    Serve {
        /// Port to listen on (default: $PORT or 9382)
        #[arg(long)]
        port: Option<u16>,

        #[command(flatten)]
        tuning: TuningArgs,
    },
}

/// Flags shared by every subcommand that runs discovery
#[derive(Args, Debug, Default)]
pub struct TuningArgs {
    /// File with one subdomain label per line (replaces the built-in list)
    #[arg(long)]
    pub wordlist: Option<PathBuf>,

    /// Give up on any source after this many seconds (default: 30)
    // 0 would time every source out before it starts
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Maximum number of DNS lookups in flight at once (default: 20)
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl TuningArgs {
    /// Applies the flags that were given on top of `config`
    pub fn apply(&self, config: &mut DiscoveryConfig) -> Result<()> {
        if let Some(path) = &self.wordlist {
            config.wordlist = Wordlist::from_file(path)?;
        }

        if let Some(secs) = self.timeout {
            config.run_timeout = Duration::from_secs(secs);
            config.ct_timeout = config.ct_timeout.min(config.run_timeout);
            config.dns_sweep_timeout = config.dns_sweep_timeout.min(config.run_timeout);
        }

        if let Some(concurrency) = self.concurrency {
            config.dns_concurrency = concurrency.max(1);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from(["subdomain-scout", "search", "example.com", "--json", "--timeout", "10"])
            .unwrap();

        match cli.command {
            Commands::Search { domain, json, tuning } => {
                assert_eq!(domain, "example.com");
                assert!(json);
                assert_eq!(tuning.timeout, Some(10));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_port() {
        let cli = Cli::try_parse_from(["subdomain-scout", "serve", "--port", "8080"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: Some(8080), .. }));
    }

    #[test]
    fn test_domain_is_required() {
        assert!(Cli::try_parse_from(["subdomain-scout", "search"]).is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["subdomain-scout", "search", "example.com", "--timeout", "0"]).is_err());
        assert!(Cli::try_parse_from(["subdomain-scout", "stream", "example.com", "--timeout", "1"]).is_ok());
    }

    #[test]
    fn test_timeout_caps_source_timeouts() {
        let mut config = DiscoveryConfig::default();
        let tuning = TuningArgs {
            timeout: Some(5),
            concurrency: Some(0),
            ..Default::default()
        };

        tuning.apply(&mut config).unwrap();

        assert_eq!(config.run_timeout, Duration::from_secs(5));
        assert_eq!(config.ct_timeout, Duration::from_secs(5));
        assert_eq!(config.dns_sweep_timeout, Duration::from_secs(5));
        assert_eq!(config.dns_concurrency, 1);
    }
}
