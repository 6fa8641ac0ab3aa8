// src/testutil.rs
// =============================================================================
// Test doubles shared by the unit tests in several modules.
//
// - ScriptedSource: a Source that emits a fixed list of names, optionally
//   waiting for / signalling other sources, or hanging forever afterwards
// - StaticResolver: a Resolve impl answering from an in-memory table
// - serve_ct_json / serve_status: a throwaway local HTTP server standing in
//   for crt.sh
// =============================================================================

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, StatusCode};
use axum::routing::get;
use axum::Router;
use tokio::sync::Notify;

use crate::domain::TargetDomain;
use crate::engine::{Emitter, SourceKind};
use crate::error::SourceError;
use crate::sources::{Resolve, Source};

pub struct ScriptedSource {
    kind: SourceKind,
    names: Vec<String>,
    wait_for: Option<Arc<Notify>>,
    notify_when_done: Option<Arc<Notify>>,
    stall: bool,
    finished: Arc<AtomicBool>,
}

impl ScriptedSource {
    pub fn new(kind: SourceKind, names: &[&str]) -> Self {
        Self {
            kind,
            names: names.iter().map(|n| n.to_string()).collect(),
            wait_for: None,
            notify_when_done: None,
            stall: false,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Don't emit anything until `notify` fires
    pub fn wait_for(mut self, notify: Arc<Notify>) -> Self {
        self.wait_for = Some(notify);
        self
    }

    /// Fire `notify` after the last name was emitted
    pub fn notify_when_done(mut self, notify: Arc<Notify>) -> Self {
        self.notify_when_done = Some(notify);
        self
    }

    /// Never return after emitting (simulates a hung upstream)
    pub fn stall_after_emitting(mut self) -> Self {
        self.stall = true;
        self
    }

    /// Set once every name has been handed to the emitter
    pub fn finished_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.finished)
    }
}

#[async_trait]
impl Source for ScriptedSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn discover(&self, _target: &TargetDomain, emitter: &Emitter) -> usize {
        if let Some(notify) = &self.wait_for {
            notify.notified().await;
        }

        for name in &self.names {
            emitter.emit(name);
        }
        self.finished.store(true, Ordering::SeqCst);

        if let Some(notify) = &self.notify_when_done {
            notify.notify_one();
        }

        if self.stall {
            std::future::pending::<()>().await;
        }

        self.names.len()
    }
}

#[derive(Default)]
pub struct StaticResolver {
    hosts: HashSet<String>,
    txt: Vec<String>,
    txt_fails: bool,
    delays: HashMap<String, Duration>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// `name` resolves to 127.0.0.1
    pub fn host(mut self, name: &str) -> Self {
        self.hosts.insert(name.to_string());
        self
    }

    /// Adds a TXT record returned for any name
    pub fn txt(mut self, record: &str) -> Self {
        self.txt.push(record.to_string());
        self
    }

    /// Makes every TXT lookup fail
    pub fn failing_txt(mut self) -> Self {
        self.txt_fails = true;
        self
    }

    /// Makes lookups of `name` (host or TXT) take `delay` before answering
    pub fn delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }
}

#[async_trait]
impl Resolve for StaticResolver {
    async fn lookup_host(&self, name: &str) -> Result<Vec<IpAddr>, SourceError> {
        if let Some(delay) = self.delays.get(name) {
            tokio::time::sleep(*delay).await;
        }

        if self.hosts.contains(name) {
            Ok(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
        } else {
            Err(SourceError::Lookup {
                name: name.to_string(),
                reason: "NXDOMAIN".to_string(),
            })
        }
    }

    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, SourceError> {
        if let Some(delay) = self.delays.get(name) {
            tokio::time::sleep(*delay).await;
        }

        if self.txt_fails {
            return Err(SourceError::Lookup {
                name: name.to_string(),
                reason: "SERVFAIL".to_string(),
            });
        }

        Ok(self.txt.clone())
    }
}

/// Starts a local server answering every GET / with `body` as JSON
///
/// Returns the base URL, e.g. "http://127.0.0.1:54321/".
pub async fn serve_ct_json(body: &'static str) -> String {
    let app = Router::new().route(
        "/",
        get(move || async move { ([(header::CONTENT_TYPE, "application/json")], body) }),
    );
    spawn_server(app).await
}

/// Starts a local server answering every GET / with the given status
pub async fn serve_status(status: u16) -> String {
    let status = StatusCode::from_u16(status).unwrap();
    let app = Router::new().route("/", get(move || async move { (status, "upstream error") }));
    spawn_server(app).await
}

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    format!("http://{}/", addr)
}
