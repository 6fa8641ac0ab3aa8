// src/engine/tracker.rs
// =============================================================================
// Knows how many sources a run started and fires a "we're done" action once
// all of them have finished.
//
// How it works:
// - Created with the number of sources and a one-shot finalize closure
// - Each source gets a CompletionGuard; dropping the guard reports that
//   source as finished (normal return, timeout, or panic all drop it)
// - When the last source reports, the closure runs, exactly once
// - A source reporting twice is ignored
//
// Rust concepts:
// - Drop: code that runs automatically when a value goes out of scope
// - FnOnce: a closure that may be called at most once
// =============================================================================

use std::sync::Arc;

use parking_lot::Mutex;

type Finalizer = Box<dyn FnOnce() + Send>;

struct TrackerState {
    finished: Vec<bool>,
    remaining: usize,
    finalizer: Option<Finalizer>,
}

pub struct CompletionTracker {
    state: Mutex<TrackerState>,
}

impl CompletionTracker {
    /// Creates a tracker for `producers` sources
    ///
    /// With zero sources there is nothing to wait for, so `on_complete`
    /// runs immediately.
    pub fn new(producers: usize, on_complete: impl FnOnce() + Send + 'static) -> Arc<Self> {
        let tracker = Arc::new(Self {
            state: Mutex::new(TrackerState {
                finished: vec![false; producers],
                remaining: producers,
                finalizer: Some(Box::new(on_complete)),
            }),
        });

        if producers == 0 {
            tracker.fire();
        }

        tracker
    }

    /// Marks source `producer` as finished
    ///
    /// Returns true only for the call that triggered finalization.
    pub fn finish(&self, producer: usize) -> bool {
        let finalizer = {
            let mut state = self.state.lock();

            match state.finished.get_mut(producer) {
                Some(done) if !*done => *done = true,
                // Already reported, or not a source we know about
                _ => return false,
            }

            state.remaining -= 1;
            if state.remaining > 0 {
                return false;
            }
            state.finalizer.take()
        };

        // Run outside the lock; the finalizer may do arbitrary work
        match finalizer {
            Some(finalize) => {
                finalize();
                true
            }
            None => false,
        }
    }

    /// Hands out the guard that reports `producer` when dropped
    pub fn guard(self: &Arc<Self>, producer: usize) -> CompletionGuard {
        CompletionGuard {
            tracker: Arc::clone(self),
            producer,
        }
    }

    fn fire(&self) {
        let finalizer = self.state.lock().finalizer.take();
        if let Some(finalize) = finalizer {
            finalize();
        }
    }
}

/// Reports one source as finished when it goes out of scope
pub struct CompletionGuard {
    tracker: Arc<CompletionTracker>,
    producer: usize,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.tracker.finish(self.producer);
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why run the finalizer outside the lock?
//    - The finalizer closes the result channel and logs
//    - Holding our lock while calling unknown code invites deadlocks
//
// 2. Why take() the finalizer out of an Option?
//    - FnOnce can only be called by value
//    - Option::take() moves it out and leaves None, so a second call finds nothing
// -----------------------------------------------------------------------------
