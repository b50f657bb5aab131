//! Stable node identity.
//!
//! Every node in a document carries a `NodeId` assigned at construction.
//! Async lifecycle work (uploads, embed validation) resolves against the
//! id, never against a captured position, so intervening edits cannot
//! redirect a resolution to the wrong node.

use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one document node.
///
/// Ids are unique within a process and are never reused. They are runtime
/// state only: the persisted format does not carry them, and parsing a
/// document assigns fresh ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate the next id.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        NodeId(salt() ^ COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value, for logging and map keys.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Per-process random salt mixed into every id.
///
/// Keeps ids from colliding when two documents serialized by different
/// processes are ever merged by a host application.
fn salt() -> u64 {
    static SALT: OnceLock<u64> = OnceLock::new();
    // Only the low bits vary per allocation; keep the salt out of them.
    *SALT.get_or_init(|| rand::random::<u64>() & !0xffff_ffff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = NodeId::next();
        let b = NodeId::next();
        let c = NodeId::next();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn display_is_fixed_width_hex() {
        let id = NodeId::next();
        assert_eq!(format!("{id}").len(), 16);
    }
}
