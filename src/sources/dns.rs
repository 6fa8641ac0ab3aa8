// src/sources/dns.rs
// =============================================================================
// DNS brute-force source.
//
// How it works:
// 1. For every label in the wordlist, try to resolve "<label>.<domain>"
// 2. Anything that returns at least one address is a subdomain
// 3. Afterwards, read the domain's TXT records; records that mention
//    "subdomain" sometimes list hostnames, so we pick those out too
//
// Limits:
// - At most `concurrency` lookups in flight (default 20) so we don't flood
//   the resolver or run out of sockets
// - Each lookup has its own timeout (default 2s)
// - The whole sweep has a deadline (default 30s); lookups still running
//   at the deadline are dropped
//
// A failed lookup only means "not found". It never stops the others.
//
// Rust concepts:
// - Traits as seams: Resolve hides the real resolver so tests can fake DNS
// - Streams: for_each_concurrent() drives many lookups with a cap
// - Deadlines: timeout_at() shares one end time across two phases
// =============================================================================

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

use super::Source;
use crate::domain::{is_valid_subdomain, TargetDomain};
use crate::engine::{Emitter, SourceKind};
use crate::error::SourceError;
use crate::wordlist::Wordlist;

/// The two DNS questions the source needs answered
///
/// The production implementation is SystemResolver; tests plug in fakes.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Addresses for a host name (A + AAAA)
    async fn lookup_host(&self, name: &str) -> Result<Vec<IpAddr>, SourceError>;

    /// Text records for a name, one string per record
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, SourceError>;
}

/// Resolver backed by the system's DNS configuration
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    /// Reads /etc/resolv.conf (or the platform equivalent), falling back to
    /// the library's default upstreams if that fails
    pub fn new(lookup_timeout: Duration) -> Self {
        let (config, mut opts) = match trust_dns_resolver::system_conf::read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                warn!(error = %e, "could not read system DNS config, using defaults");
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };

        opts.timeout = lookup_timeout;
        opts.attempts = 1;

        Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl Resolve for SystemResolver {
    async fn lookup_host(&self, name: &str) -> Result<Vec<IpAddr>, SourceError> {
        let lookup = self.inner.lookup_ip(name).await.map_err(|e| SourceError::Lookup {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        Ok(lookup.iter().collect())
    }

    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, SourceError> {
        let lookup = self.inner.txt_lookup(name).await.map_err(|e| SourceError::Lookup {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        // A single TXT record can be split into several character-strings;
        // glue them back together
        Ok(lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|chunk| String::from_utf8_lossy(chunk))
                    .collect::<String>()
            })
            .collect())
    }
}

pub struct DnsSource {
    resolver: Arc<dyn Resolve>,
    wordlist: Wordlist,
    lookup_timeout: Duration,
    sweep_timeout: Duration,
    concurrency: usize,
}

impl DnsSource {
    pub fn new(resolver: Arc<dyn Resolve>, wordlist: Wordlist) -> Self {
        Self {
            resolver,
            wordlist,
            lookup_timeout: Duration::from_secs(2),
            sweep_timeout: Duration::from_secs(30),
            concurrency: 20,
        }
    }

    pub fn with_timeouts(mut self, lookup: Duration, sweep: Duration) -> Self {
        self.lookup_timeout = lookup;
        self.sweep_timeout = sweep;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    // true if the name resolved to at least one address in time
    async fn resolves(&self, name: &str) -> bool {
        match timeout(self.lookup_timeout, self.resolver.lookup_host(name)).await {
            Ok(Ok(addrs)) => !addrs.is_empty(),
            Ok(Err(e)) => {
                debug!(error = %e, "lookup miss");
                false
            }
            Err(_) => {
                debug!(name, "lookup timed out");
                false
            }
        }
    }

    async fn txt_candidates(&self, target: &TargetDomain) -> Vec<String> {
        match timeout(self.lookup_timeout, self.resolver.lookup_txt(target.as_str())).await {
            Ok(Ok(records)) => subdomains_from_txt(&records, target.as_str()),
            Ok(Err(e)) => {
                debug!(error = %e, "no usable TXT records");
                Vec::new()
            }
            Err(_) => {
                debug!(domain = %target, "TXT lookup timed out");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Source for DnsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::DnsEnumeration
    }

    async fn discover(&self, target: &TargetDomain, emitter: &Emitter) -> usize {
        // One deadline covers both the label sweep and the TXT lookup
        let deadline = Instant::now() + self.sweep_timeout;

        // Names this source produced, shared by the concurrent lookups
        let found: Mutex<Vec<String>> = Mutex::new(Vec::new());
        let found_ref = &found;

        // Phase 1: "<label>.<domain>" for every label, `concurrency` at a time
        let sweep = stream::iter(self.wordlist.labels()).for_each_concurrent(self.concurrency, |label| {
            let name = format!("{}.{}", label, target);
            async move {
                if self.resolves(&name).await {
                    // Report right away so streaming clients see it now
                    emitter.emit(&name);
                    found_ref.lock().push(name);
                }
            }
        });

        // Dropping the sweep future cancels every lookup still in flight
        if timeout_at(deadline, sweep).await.is_err() {
            warn!(
                domain = %target,
                resolved = found.lock().len(),
                "DNS sweep deadline reached, abandoning outstanding lookups"
            );
        }

        // Phase 2: hostnames listed in the domain's TXT records.
        // timeout_at() polls its future once even after the deadline, so check first.
        if Instant::now() >= deadline {
            debug!(domain = %target, "no time left for the TXT lookup");
        } else {
            match timeout_at(deadline, self.txt_candidates(target)).await {
                Ok(names) => {
                    for name in names {
                        // Skip names the sweep already reported
                        {
                            let mut found = found.lock();
                            if found.contains(&name) {
                                continue;
                            }
                            found.push(name.clone());
                        }
                        emitter.emit(&name);
                    }
                }
                Err(_) => debug!(domain = %target, "no time left for the TXT lookup"),
            }
        }

        let total = found.lock().len();
        info!(domain = %target, found = total, labels = self.wordlist.len(), "DNS sweep finished");
        total
    }
}

/// Pulls hostnames under `domain` out of TXT records
///
/// Only records mentioning "subdomain" (any case) are considered. They are
/// split on whitespace and every token containing ".<domain>" that passes
/// is_valid_subdomain() is kept.
pub fn subdomains_from_txt(records: &[String], domain: &str) -> Vec<String> {
    let needle = format!(".{}", domain);

    records
        .iter()
        .filter(|record| record.to_lowercase().contains("subdomain"))
        .flat_map(|record| record.split_whitespace())
        .filter(|token| token.contains(&needle))
        .map(|token| token.trim().to_lowercase())
        .filter(|token| is_valid_subdomain(token, domain))
        .collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why for_each_concurrent instead of spawning a task per label?
//    - It runs up to N lookups at once inside this one future
//    - Dropping the future (at the deadline) cancels all of them together
//    - Spawned tasks would keep running after we stopped caring
//
// 2. Why is `found` a Mutex if everything runs in one task?
//    - The lookups are separate futures that each need to push results
//    - They only share `&found`, so pushing needs interior mutability
//
// 3. What does timeout() return?
//    - Ok(value) if the future finished in time
//    - Err(Elapsed) if it didn't; the inner future is dropped
//    - So Ok(Err(e)) means "answered in time, but with an error"
// -----------------------------------------------------------------------------
