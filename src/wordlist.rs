// src/wordlist.rs
// =============================================================================
// The list of labels the DNS source tries in front of the target domain.
//
// The built-in list covers the usual suspects (www, mail, api, vpn...).
// A custom list can be loaded from a file: one label per line, blank lines
// and lines starting with '#' are ignored.
//
// The list is plain data handed to the DNS source, so swapping it never
// touches the lookup logic.
// =============================================================================

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

/// Labels tried by default, most common first
pub const DEFAULT_LABELS: &[&str] = &[
    "www", "mail", "ftp", "admin", "api", "app", "blog", "cdn", "dev", "docs",
    "forum", "help", "m", "mobile", "news", "shop", "stage", "staging", "test", "webmail",
    "secure", "login", "cpanel", "whm", "mysql", "phpmyadmin", "ns1", "ns2", "ns3", "ns4",
    "mx", "mx1", "mx2", "smtp", "pop", "imap", "support", "portal", "assets", "static",
    "img", "images", "media", "files", "download", "downloads", "upload", "uploads", "backup", "backups",
    "dashboard", "control", "panel", "status", "stats", "analytics", "reports", "crm", "erp", "hr",
    "finance", "accounting", "billing", "payment", "payments", "store", "cart", "checkout", "order", "orders",
    "product", "products", "search", "find", "directory", "catalog", "inventory", "demo", "beta", "alpha",
    "preview", "old", "new", "v1", "v2", "v3", "vpn", "ssh", "sftp", "git",
    "svn", "repo", "repository", "ci", "build", "jenkins", "gitlab", "github", "bitbucket", "redmine",
    "jira", "wiki", "confluence", "sharepoint", "intranet", "extranet", "partner", "partners", "client", "clients",
    "customer", "customers", "vendor", "vendors", "supplier", "suppliers", "affiliate", "affiliates", "reseller", "resellers",
    "dealer", "dealers", "distributor", "distributors", "agent", "agents", "rep", "reps", "sales", "marketing",
    "promo", "promotion", "promotions", "campaign", "campaigns", "event", "events", "conference", "webinar", "training",
    "education", "learn", "learning", "course", "courses", "class", "classes", "school", "university", "college",
    "student", "students", "teacher", "teachers", "faculty", "staff", "employee", "employees", "member", "members",
    "user", "users", "guest", "guests", "public", "private", "internal", "external", "local", "remote",
    "cloud", "server", "servers", "host", "hosts", "node", "nodes", "cluster", "clusters", "db",
    "database", "databases", "data", "mirror", "cache", "proxy", "qa", "uat", "prod", "production",
    "autodiscover", "autoconfig", "email", "exchange", "owa", "auth", "oauth", "sso", "id", "accounts",
    "graphql", "rest", "grpc", "ws", "gateway", "lb", "monitor", "monitoring", "metrics", "grafana",
    "prometheus", "kibana", "elastic", "logs", "logging", "syslog", "sentry", "redis", "mongo", "postgres",
    "memcache", "k8s", "kubernetes", "docker", "registry", "harbor", "nexus", "artifactory", "sonar", "vault",
    "consul", "api-v1", "api-v2", "sandbox", "qa1", "dev1", "dev2", "test1", "test2", "staging2",
    "uat2", "preprod", "legacy", "video", "videos", "stream", "chat", "helpdesk", "community", "feedback",
    "careers", "jobs", "about", "investors", "press",
];

/// An ordered, duplicate-free list of subdomain labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wordlist {
    labels: Vec<String>,
}

impl Wordlist {
    /// Builds a wordlist from any sequence of labels
    ///
    /// Labels are trimmed and lower-cased. Empty labels, comments and
    /// repeats are dropped; the first occurrence keeps its position.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let labels = labels
            .into_iter()
            .map(|label| label.as_ref().trim().to_lowercase())
            .filter(|label| !label.is_empty() && !label.starts_with('#'))
            .filter(|label| seen.insert(label.clone()))
            .collect();

        Self { labels }
    }

    /// Reads a wordlist file (one label per line)
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read wordlist {}", path.display()))?;

        let wordlist = Self::new(content.lines());
        if wordlist.is_empty() {
            anyhow::bail!("Wordlist {} contains no labels", path.display());
        }

        Ok(wordlist)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for Wordlist {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS)
    }
}
