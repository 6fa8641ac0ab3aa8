// src/engine/dedup.rs
// =============================================================================
// The run-wide "have we reported this one already?" set.
//
// Every source submits its candidates here. The first submission of a name
// wins and is reported; every later one (same source or another) is quietly
// dropped. That is what keeps the output free of duplicates and makes the
// source tag on a result belong to whoever got there first.
//
// Rust concepts:
// - Interior mutability: a Mutex lets &self methods change the set
// =============================================================================

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::domain::normalize;

#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: Mutex<HashSet<String>>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a candidate, returning the normalized name if it is new
    ///
    /// Check and insert happen under one lock, so two sources racing on the
    /// same name can never both get `Some`.
    pub fn submit(&self, candidate: &str) -> Option<String> {
        let name = normalize(candidate);
        if name.is_empty() {
            return None;
        }

        // HashSet::insert returns false when the value was already present
        if self.seen.lock().insert(name.clone()) {
            Some(name)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why &self and not &mut self in submit()?
//    - Many tasks share one Deduplicator through an Arc
//    - An Arc only hands out shared (&) references
//    - The Mutex gives us "interior mutability": safe mutation through &self
//
// 2. Why parking_lot::Mutex instead of std::sync::Mutex?
//    - lock() returns the guard directly, no poisoning Result to unwrap
//    - We never hold it across an .await, so a blocking mutex is fine
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_submission_wins() {
        let dedup = Deduplicator::new();
        assert_eq!(dedup.submit("www.example.com"), Some("www.example.com".to_string()));
        assert_eq!(dedup.submit("www.example.com"), None);
    }

    #[test]
    fn test_keys_are_normalized() {
        let dedup = Deduplicator::new();
        assert!(dedup.submit("*.API.example.com").is_some());
        assert!(dedup.submit(" api.example.com ").is_none());
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn test_empty_candidates_are_rejected() {
        let dedup = Deduplicator::new();
        assert!(dedup.submit("   ").is_none());
        assert_eq!(dedup.len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_accept_once() {
        let dedup = Arc::new(Deduplicator::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let dedup = Arc::clone(&dedup);
                tokio::spawn(async move {
                    (0..50)
                        .filter(|i| dedup.submit(&format!("host{}.example.com", i)).is_some())
                        .count()
                })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            accepted += handle.await.unwrap();
        }

        // 50 distinct names, no matter how many tasks raced for them
        assert_eq!(accepted, 50);
        assert_eq!(dedup.len(), 50);
    }
}
