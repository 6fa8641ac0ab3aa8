// src/domain.rs
// =============================================================================
// Domain name helpers shared by every part of the scanner.
//
// - TargetDomain: the root domain a run searches under (validated once)
// - normalize(): turns a raw name from any source into the form we dedupe on
// - is_valid_subdomain(): "is this really below the target domain?"
//
// Rust concepts:
// - Newtype pattern: TargetDomain wraps a String so an unvalidated string
//   can't be passed where a validated domain is expected
// - once_cell::Lazy: compile a regex once, on first use
// =============================================================================

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::DomainError;

// Same shape the web UI has always accepted: a label followed by a TLD,
// or a label followed by a two-part suffix such as "co.uk".
static DOMAIN_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9]*\.([a-zA-Z]{2,}|[a-zA-Z]{2,}\.[a-zA-Z]{2,})$")
        .expect("domain format regex is valid")
});

/// A validated, lower-cased root domain. Immutable for the life of a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetDomain(String);

impl TargetDomain {
    /// Validates user input and turns it into a target domain
    ///
    /// Leading/trailing whitespace is ignored. The stored form is lower-case
    /// because every candidate we compare against it is lower-cased too.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(DomainError::Empty);
        }

        if !DOMAIN_FORMAT.is_match(trimmed) {
            return Err(DomainError::InvalidFormat);
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizes a raw name into the key used for deduplication
///
/// Steps: trim whitespace, lower-case, drop a leading "*." wildcard marker.
/// "  *.API.Example.com " -> "api.example.com"
pub fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    match lowered.strip_prefix("*.") {
        Some(rest) => rest.to_string(),
        None => lowered,
    }
}

/// Checks that `subdomain` is a proper subdomain of `base_domain`
///
/// Rules:
///   - not empty, and not the base domain itself
///   - ends with ".<base_domain>" (so "notexample.com" doesn't match)
///   - has strictly more labels than the base domain
pub fn is_valid_subdomain(subdomain: &str, base_domain: &str) -> bool {
    if subdomain.is_empty() || subdomain == base_domain {
        return false;
    }

    let suffix = format!(".{}", base_domain);
    if !subdomain.ends_with(&suffix) {
        return false;
    }

    subdomain.split('.').count() > base_domain.split('.').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_subdomains() {
        assert!(is_valid_subdomain("api.example.com", "example.com"));
        assert!(is_valid_subdomain("a.b.example.com", "example.com"));
    }

    #[test]
    fn test_invalid_subdomains() {
        assert!(!is_valid_subdomain("example.com", "example.com"));
        assert!(!is_valid_subdomain("evil.com", "example.com"));
        assert!(!is_valid_subdomain("", "example.com"));
        // Ends with the domain text, but isn't below it
        assert!(!is_valid_subdomain("notexample.com", "example.com"));
    }

    #[test]
    fn test_normalize_strips_wildcard_and_case() {
        assert_eq!(normalize("  *.API.Example.com "), "api.example.com");
        assert_eq!(normalize("www.example.com"), "www.example.com");
        // Only the leading marker is removed
        assert_eq!(normalize("a.*.example.com"), "a.*.example.com");
    }

    #[test]
    fn test_parse_target_domain() {
        let domain = TargetDomain::parse("  Example.COM ").unwrap();
        assert_eq!(domain.as_str(), "example.com");

        assert!(TargetDomain::parse("example.co.uk").is_ok());
        assert_eq!(TargetDomain::parse("   "), Err(DomainError::Empty));
        assert_eq!(TargetDomain::parse("not a domain"), Err(DomainError::InvalidFormat));
        assert_eq!(TargetDomain::parse("localhost"), Err(DomainError::InvalidFormat));
    }
}
