//! # identity
//!
//! Stable per-session identifier registry for the introspection bridge.
//!
//! The supervising host correlates nodes across snapshots by an opaque
//! identifier that must stay stable for as long as the underlying element
//! instance is alive. This crate provides:
//! - [`ElementId`]: the opaque, copyable identifier handed to the host
//! - [`IdRegistry`]: a bidirectional mint-once registry, generic over the
//!   host key type
//!
//! The registry is append-mostly: identifiers are minted on first encounter,
//! reused on every later encounter, and never removed or reassigned. An
//! element that goes away leaves its identifier orphaned; callers decide what
//! "still alive" means when resolving an identifier back to an element.

mod registry;

pub use registry::IdRegistry;

use serde::Serialize;

/// Opaque identifier for an element within one page session.
///
/// The value has no semantic meaning; it is serialized as-is into outbound
/// snapshots so the host can match nodes to earlier snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ElementId(u64);

impl ElementId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl From<ElementId> for u64 {
    #[inline]
    fn from(id: ElementId) -> Self {
        id.as_raw()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "el{}", self.0)
    }
}
