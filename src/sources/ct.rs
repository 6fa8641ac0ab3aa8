// src/sources/ct.rs
// =============================================================================
// Certificate Transparency source.
//
// Every publicly trusted TLS certificate is logged. Searching those logs
// for "%.example.com" returns the names on every certificate ever issued
// under example.com, which is a great list of subdomains.
//
// Steps:
// 1. One GET to <endpoint>?q=%.<domain>&output=json (30s timeout)
// 2. Parse the JSON array of entries; `name_value` may hold several names
//    separated by newlines (one certificate, many SANs)
// 3. Clean each name up and keep only proper subdomains of the target
//
// Any failure (network, non-2xx, bad JSON) is logged and treated as
// "found nothing". One flaky upstream never fails the whole run.
//
// Rust concepts:
// - serde: #[derive(Deserialize)] reads only the JSON fields we declare
// - map_err: turn library errors into our own SourceError variants
// =============================================================================

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use super::Source;
use crate::domain::TargetDomain;
use crate::engine::{Emitter, SourceKind};
use crate::error::SourceError;

/// One row of the crt.sh JSON output (we only need the names)
#[derive(Debug, Clone, Deserialize)]
pub struct CtEntry {
    pub name_value: String,
}

pub struct CtSource {
    client: Client,
    endpoint: Url,
}

impl CtSource {
    /// Builds the source with its own HTTP client
    ///
    /// Parameters:
    ///   endpoint: base URL of the search service (e.g. "https://crt.sh/")
    ///   timeout: limit for the whole request, body included
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).with_context(|| format!("Invalid CT endpoint '{}'", endpoint))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for CT lookups")?;

        Ok(Self { client, endpoint })
    }

    /// Fetches the raw log entries for a domain
    pub async fn fetch_entries(&self, domain: &TargetDomain) -> Result<Vec<CtEntry>, SourceError> {
        // The query serializer escapes '%' as "%25" for us
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", &format!("%.{}", domain))
            .append_pair("output", "json");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| SourceError::Request {
                endpoint: self.endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                endpoint: self.endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| SourceError::Request {
            endpoint: self.endpoint.to_string(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|source| SourceError::Decode {
            endpoint: self.endpoint.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Source for CtSource {
    fn kind(&self) -> SourceKind {
        SourceKind::CertificateTransparency
    }

    async fn discover(&self, target: &TargetDomain, emitter: &Emitter) -> usize {
        let entries = match self.fetch_entries(target).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(domain = %target, error = %e, "CT lookup failed");
                return 0;
            }
        };

        debug!(domain = %target, entries = entries.len(), "CT log entries received");

        let names = extract_subdomains(&entries, target.as_str());
        for name in &names {
            emitter.emit(name);
        }

        info!(domain = %target, found = names.len(), "CT lookup finished");
        names.len()
    }
}

/// Turns raw CT entries into a clean, duplicate-free list of subdomains
///
/// For each name: lower-case and trim, skip empties and the root domain
/// itself, strip a leading "*.", then keep it only if it looks like
/// "<labels>.<domain>". Order of first appearance is preserved.
///
/// Example (domain = "example.com"):
///   ["*.dev.example.com", "EXAMPLE.COM", "www.example.com\nmail.example.com"]
///   -> ["dev.example.com", "www.example.com", "mail.example.com"]
pub fn extract_subdomains(entries: &[CtEntry], domain: &str) -> Vec<String> {
    let pattern = match Regex::new(&format!(r"^[a-z0-9_.\-]+\.{}$", regex::escape(domain))) {
        Ok(pattern) => pattern,
        Err(e) => {
            warn!(domain, error = %e, "could not build CT name filter");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut subdomains = Vec::new();

    for entry in entries {
        for name in entry.name_value.split('\n') {
            let name = name.trim().to_lowercase();

            if name.is_empty() || name == domain {
                continue;
            }

            let name = name.strip_prefix("*.").unwrap_or(&name);

            if pattern.is_match(name) && seen.insert(name.to_string()) {
                subdomains.push(name.to_string());
            }
        }
    }

    subdomains
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why regex::escape(domain)?
//    - In a regex "." matches any character
//    - Without escaping, "example.com" would also match "exampleXcom"
//
// 2. Why return 0 instead of an error on failure?
//    - The engine only needs names; a dead CT service just means fewer of them
//    - The failure is still logged with warn! so it isn't silent
// -----------------------------------------------------------------------------
