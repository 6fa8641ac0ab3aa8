// src/error.rs
// =============================================================================
// Typed errors for the two places where we care *which* thing went wrong:
//
// - SourceError: an upstream source (CT endpoint, DNS resolver) failed.
//   These never escape a discovery run. The source logs them and reports
//   "found nothing" instead.
// - DomainError: the user gave us something that isn't a domain.
//   These are shown to the user (CLI message or HTTP 400 body).
//
// Everything else in the application uses anyhow::Result, like main.rs.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// The request never got a response (DNS failure, refused, timeout...)
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with a 2xx
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The body was not the JSON we expected
    #[error("could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// A DNS lookup failed (NXDOMAIN, no records, resolver error)
    #[error("lookup of {name} failed: {reason}")]
    Lookup { name: String, reason: String },
}

// The two messages below are exactly what the HTTP API returns in its
// `error` field, so keep them short and human readable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Domain is required")]
    Empty,

    #[error("Invalid domain format")]
    InvalidFormat,
}
