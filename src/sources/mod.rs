// src/sources/mod.rs
// =============================================================================
// Discovery sources: independent strategies for finding subdomains.
//
// Submodules:
// - ct: asks a Certificate Transparency log search (crt.sh) for names
// - dns: tries every wordlist label against a DNS resolver
//
// Every source implements the Source trait, so the engine can run any mix
// of them side by side without knowing what they do inside.
//
// Rust concepts:
// - #[async_trait]: async methods on traits used as dyn Source
// =============================================================================

mod ct;
mod dns;

pub use ct::CtSource;
pub use dns::{DnsSource, SystemResolver};

// Only the test doubles implement the resolver seam from outside dns.rs
#[cfg(test)]
pub use dns::Resolve;

use async_trait::async_trait;

use crate::domain::TargetDomain;
use crate::engine::{Emitter, SourceKind};

/// A single discovery strategy
///
/// `discover` hands every candidate it finds to the emitter as soon as it
/// has it, and returns how many candidates it produced. Sources swallow
/// their own failures (logging them), so a broken source just finds nothing.
#[async_trait]
pub trait Source: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn discover(&self, target: &TargetDomain, emitter: &Emitter) -> usize;
}
