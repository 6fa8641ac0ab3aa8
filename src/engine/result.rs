// src/engine/result.rs
// =============================================================================
// The unit of discovery handed back to callers: a subdomain plus the source
// that found it first.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which discovery strategy produced a result
///
/// The serialized names are what the web UI displays, so they are spelled
/// out rather than snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "Certificate Transparency")]
    CertificateTransparency,
    #[serde(rename = "DNS Enumeration")]
    DnsEnumeration,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::CertificateTransparency => "Certificate Transparency",
            SourceKind::DnsEnumeration => "DNS Enumeration",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so width specifiers like {:<30} are honoured
        f.pad(self.label())
    }
}

/// One discovered subdomain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdomainResult {
    pub subdomain: String,
    pub source: SourceKind,
}

impl SubdomainResult {
    pub fn new(subdomain: impl Into<String>, source: SourceKind) -> Self {
        Self {
            subdomain: subdomain.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let result = SubdomainResult::new("www.example.com", SourceKind::CertificateTransparency);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"subdomain":"www.example.com","source":"Certificate Transparency"}"#
        );

        let back: SubdomainResult =
            serde_json::from_str(r#"{"subdomain":"mail.example.com","source":"DNS Enumeration"}"#)
                .unwrap();
        assert_eq!(back.source, SourceKind::DnsEnumeration);
    }
}
