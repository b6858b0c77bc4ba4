//! Composite cache key addressing one contribution slot.

use std::cmp::Ordering;
use std::fmt;

use tether_types::ContributorId;

/// Layer index for sources without sub-layers (a single restraint outfit).
pub const NO_LAYER: i8 = -1;

/// Addresses one contribution in a domain cache.
///
/// Equality and ordering are defined on `(priority, layer)` only; this
/// ordering is the sole tie-break mechanism in the engine — the lowest key
/// wins wherever a domain needs a single winner. Contributor and label ride
/// along for provenance and diagnostics.
#[derive(Debug, Clone)]
pub struct CacheKey {
    priority: u8,
    layer: i8,
    contributor: ContributorId,
    label: String,
}

impl CacheKey {
    pub fn new(
        priority: u8,
        layer: i8,
        contributor: ContributorId,
        label: impl Into<String>,
    ) -> Self {
        Self {
            priority,
            layer,
            contributor,
            label: label.into(),
        }
    }

    /// Key carrying only the ordering fields, for removal lookups.
    pub fn probe(priority: u8, layer: i8) -> Self {
        Self {
            priority,
            layer,
            contributor: ContributorId::local(),
            label: String::new(),
        }
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn layer(&self) -> i8 {
        self.layer
    }

    pub fn contributor(&self) -> &ContributorId {
        &self.contributor
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.layer == other.layer
    }
}

impl Eq for CacheKey {}

impl PartialOrd for CacheKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CacheKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.priority, self.layer).cmp(&(other.priority, other.layer))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "p{}/l{} '{}' (by {})",
            self.priority, self.layer, self.label, self.contributor
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(priority: u8, layer: i8) -> CacheKey {
        CacheKey::new(priority, layer, ContributorId::new("tester"), "item")
    }

    #[test]
    fn ordering_ignores_contributor_and_label() {
        let a = CacheKey::new(1, 0, ContributorId::new("alice"), "gag");
        let b = CacheKey::new(1, 0, ContributorId::new("bob"), "other");
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn lower_priority_sorts_first() {
        assert!(key(0, 2) < key(1, 0));
        assert!(key(1, 0) < key(1, 1));
        assert!(key(2, NO_LAYER) < key(2, 0));
    }

    #[test]
    fn display_is_stable() {
        let k = CacheKey::new(2, -1, ContributorId::new("alice"), "straitjacket");
        assert_eq!(format!("{k}"), "p2/l-1 'straitjacket' (by alice)");
    }
}
