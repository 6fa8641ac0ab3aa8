// src/engine/stream.rs
// =============================================================================
// The consumer side of a streaming run.
//
// A DiscoveryStream yields each result as soon as a source finds it. When
// every source has finished (the channel closes), it yields one final
// `StreamEvent::Complete` and then ends. That explicit marker is what the
// SSE route turns into its `event: complete` frame.
//
// Rust concepts:
// - Implementing Stream by hand: poll_next() is the async version of next()
// =============================================================================

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use super::result::SubdomainResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A new, deduplicated subdomain
    Discovered(SubdomainResult),
    /// All sources are done; nothing else will follow
    Complete,
}

pub struct DiscoveryStream {
    rx: mpsc::Receiver<SubdomainResult>,
    completed: bool,
}

impl DiscoveryStream {
    pub(crate) fn new(rx: mpsc::Receiver<SubdomainResult>) -> Self {
        Self { rx, completed: false }
    }
}

impl Stream for DiscoveryStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.completed {
            return Poll::Ready(None);
        }

        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(result)) => Poll::Ready(Some(StreamEvent::Discovered(result))),
            Poll::Ready(None) => {
                self.completed = true;
                Poll::Ready(Some(StreamEvent::Complete))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
