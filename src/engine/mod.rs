// src/engine/mod.rs
// =============================================================================
// The discovery engine: runs every source at the same time against one
// domain and merges what they find.
//
// Submodules:
// - result: SubdomainResult / SourceKind, what callers get back
// - dedup: the run-wide set that guarantees each name is reported once
// - sink: Collector (batch) and StreamSink (live), plus the Emitter handle
// - tracker: counts finished sources and closes the run exactly once
// - stream: DiscoveryStream, the consumer side of a streaming run
//
// One call to discover()/discover_streaming() is one "run". A run owns its
// own Deduplicator, CompletionTracker and sink. Nothing is shared between
// runs, so concurrent HTTP requests can't see each other's results.
//
// Timeouts:
//   Each source runs under `run_timeout`. When it expires the source is
//   cancelled, whatever it already reported stays in the results, and it
//   still counts as finished. A timeout never turns into an error.
//
// Rust concepts:
// - Arc<dyn Trait>: sources of different types shared across tasks
// - tokio::spawn: each source runs as its own task
// - Drop guards: a task reports "finished" even if it panics
// =============================================================================

mod dedup;
mod result;
mod sink;
mod stream;
mod tracker;

pub use dedup::Deduplicator;
pub use result::{SourceKind, SubdomainResult};
pub use sink::{Collector, Emitter, ResultSink, StreamSink};
pub use stream::{DiscoveryStream, StreamEvent};
pub use tracker::CompletionTracker;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::DiscoveryConfig;
use crate::domain::TargetDomain;
use crate::sources::{CtSource, DnsSource, Source, SystemResolver};

pub struct Discovery {
    sources: Vec<Arc<dyn Source>>,
    run_timeout: Duration,
    stream_capacity: usize,
}

impl Discovery {
    pub fn new(sources: Vec<Arc<dyn Source>>, run_timeout: Duration, stream_capacity: usize) -> Self {
        Self {
            sources,
            run_timeout,
            stream_capacity: stream_capacity.max(1),
        }
    }

    /// The standard setup: Certificate Transparency + DNS brute force
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self> {
        let ct = CtSource::new(&config.ct_endpoint, config.ct_timeout)?;

        let resolver = Arc::new(SystemResolver::new(config.dns_lookup_timeout));
        let dns = DnsSource::new(resolver, config.wordlist.clone())
            .with_timeouts(config.dns_lookup_timeout, config.dns_sweep_timeout)
            .with_concurrency(config.dns_concurrency);

        Ok(Self::new(
            vec![Arc::new(ct), Arc::new(dns)],
            config.run_timeout,
            config.stream_capacity,
        ))
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Batch mode: waits for every source, then returns all results
    ///
    /// Order is whatever order the sources happened to report in.
    pub async fn discover(&self, target: &TargetDomain) -> Vec<SubdomainResult> {
        // Fresh collector per run; results are only read after the barrier
        let collector = Arc::new(Collector::new());
        let handles = self.launch(target, collector.clone());

        // Barrier: every source task has ended (normally, by timeout, or by panic)
        for joined in join_all(handles).await {
            if let Err(e) = joined {
                warn!(domain = %target, error = %e, "source task ended abnormally");
            }
        }

        let results = collector.take();
        info!(domain = %target, results = results.len(), "discovery finished");
        results
    }

    /// Streaming mode: results arrive as soon as they are found
    ///
    /// The sources keep running in the background even if the returned
    /// stream is dropped early. The stream ends with `StreamEvent::Complete`.
    pub fn discover_streaming(&self, target: &TargetDomain) -> DiscoveryStream {
        let (sink, rx) = StreamSink::channel(self.stream_capacity);
        let sink = Arc::new(sink);

        // Handles are dropped on purpose: the tracker, not a join, ends the run
        let _detached = self.launch(target, sink);

        DiscoveryStream::new(rx)
    }

    // Spawns one task per source. The tracker finalizes `sink` once the
    // last of them has finished.
    fn launch(&self, target: &TargetDomain, sink: Arc<dyn ResultSink>) -> Vec<JoinHandle<()>> {
        // Per-run seen set: two concurrent runs must not hide names from each other
        let dedup = Arc::new(Deduplicator::new());

        // Closes the sink (and so the stream) after the last source reports
        let finalizing_sink = Arc::clone(&sink);
        let finished_dedup = Arc::clone(&dedup);
        let finished_target = target.clone();
        let tracker = CompletionTracker::new(self.sources.len(), move || {
            finalizing_sink.finalize();
            debug!(domain = %finished_target, unique = finished_dedup.len(), "all sources finished");
        });

        self.sources
            .iter()
            .enumerate()
            .map(|(id, source)| {
                // Everything the task needs is moved in; tasks must be 'static
                let source = Arc::clone(source);
                let emitter = Emitter::new(source.kind(), Arc::clone(&dedup), Arc::clone(&sink));
                let guard = tracker.guard(id);
                let target = target.clone();
                let run_timeout = self.run_timeout;

                tokio::spawn(async move {
                    // Reports this source as finished however the task ends
                    let _guard = guard;

                    match timeout(run_timeout, source.discover(&target, &emitter)).await {
                        Ok(found) => debug!(source = %source.kind(), found, "source finished"),
                        Err(_) => warn!(
                            source = %source.kind(),
                            domain = %target,
                            "source hit the run timeout, keeping partial results"
                        ),
                    }
                })
            })
            .collect()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Arc::clone instead of .clone()?
//    - Both do the same thing for an Arc: bump a reference count
//    - Arc::clone(&x) makes it obvious nothing big is being copied
//
// 2. What happens to a spawned task we never await?
//    - It keeps running; dropping a JoinHandle does not cancel the task
//    - That is how discover_streaming() returns before the sources finish
//
// 3. Why does timeout() cancel the source?
//    - When the time is up, timeout() drops the inner future
//    - Dropping a future stops it at its current .await, nothing more runs
// -----------------------------------------------------------------------------
