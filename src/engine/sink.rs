// src/engine/sink.rs
// =============================================================================
// Where accepted results go.
//
// - Collector: keeps everything in a Vec, read once all sources are done
// - StreamSink: forwards each result into a bounded channel right away
// - Emitter: the handle a source actually talks to. It tags candidates with
//   the source kind, runs them through the Deduplicator, and passes new
//   ones to whichever sink this run uses.
//
// Overflow policy for StreamSink (drop-newest):
//   If the channel is full, the result being pushed is dropped and counted.
//   The source never waits on a slow reader.
//
// Rust concepts:
// - Trait objects: Arc<dyn ResultSink> lets one Emitter feed either sink
// - Bounded channels: try_send() never waits, it fails when the buffer is full
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use super::dedup::Deduplicator;
use super::result::{SourceKind, SubdomainResult};

/// Receives every result the Deduplicator accepted
pub trait ResultSink: Send + Sync {
    fn accept(&self, result: SubdomainResult);

    /// Called once, after every source has finished
    fn finalize(&self) {}
}

/// Batch sink: gathers results for a single response
#[derive(Debug, Default)]
pub struct Collector {
    results: Mutex<Vec<SubdomainResult>>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes everything collected so far, leaving the collector empty
    pub fn take(&self) -> Vec<SubdomainResult> {
        std::mem::take(&mut *self.results.lock())
    }
}

impl ResultSink for Collector {
    fn accept(&self, result: SubdomainResult) {
        self.results.lock().push(result);
    }
}

/// Streaming sink: pushes results into a bounded channel
pub struct StreamSink {
    // None once finalized; dropping the last Sender closes the channel
    sender: Mutex<Option<mpsc::Sender<SubdomainResult>>>,
    dropped: AtomicUsize,
}

impl StreamSink {
    /// Creates the sink and the receiving end of its channel
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<SubdomainResult>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let sink = Self {
            sender: Mutex::new(Some(tx)),
            dropped: AtomicUsize::new(0),
        };
        (sink, rx)
    }

    /// How many results were discarded because the buffer was full
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl ResultSink for StreamSink {
    fn accept(&self, result: SubdomainResult) {
        let sender = self.sender.lock();
        let Some(tx) = sender.as_ref() else {
            return;
        };

        match tx.try_send(result) {
            Ok(()) => {}
            Err(TrySendError::Full(result)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(subdomain = %result.subdomain, "stream buffer full, dropping result");
            }
            // Reader went away; nothing left to deliver to
            Err(TrySendError::Closed(_)) => {}
        }
    }

    fn finalize(&self) {
        self.sender.lock().take();

        let dropped = self.dropped();
        if dropped > 0 {
            warn!(dropped, "stream buffer overflowed, some results were not delivered");
        }
    }
}

/// A source's handle into the current run
#[derive(Clone)]
pub struct Emitter {
    source: SourceKind,
    dedup: Arc<Deduplicator>,
    sink: Arc<dyn ResultSink>,
}

impl Emitter {
    pub fn new(source: SourceKind, dedup: Arc<Deduplicator>, sink: Arc<dyn ResultSink>) -> Self {
        Self { source, dedup, sink }
    }

    /// Offers a candidate to the run; returns true if it was new
    pub fn emit(&self, candidate: &str) -> bool {
        match self.dedup.submit(candidate) {
            Some(subdomain) => {
                self.sink.accept(SubdomainResult::new(subdomain, self.source));
                true
            }
            None => false,
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why drop results instead of waiting for the reader?
//    - A source waiting on a slow HTTP client would stall the whole run
//    - Batch mode uses Collector, which never drops anything
//
// 2. How does the stream know it's over?
//    - finalize() takes the Sender out and drops it
//    - Once every Sender is gone, the Receiver yields None
// -----------------------------------------------------------------------------
