//! Capability probe: the one narrow interface between the engine and the
//! framework's raw attachment markers.
//!
//! Frameworks attach internals to DOM objects under suffixed property names
//! (the suffix varies per page load), so detection is by prefix match over
//! the node's expando bag. Nothing outside this module touches the bag.

use crate::{FiberArena, StateNode};
use core_types::{DomKey, FiberKey};
use page::{Document, Expando};

/// Prefix of the mount-point marker on a DOM node hosting an internal tree.
pub const CONTAINER_PREFIX: &str = "__fiberContainer";

/// Prefix of the per-node marker linking a DOM element to its own fiber.
pub const NODE_PREFIX: &str = "__fiberNode";

/// Hop cap when searching a fiber's descendants for a rendered handle.
/// Bounds the walk through purely-logical (non-rendering) nodes.
pub const LOOKAHEAD_CAP: usize = 100;

/// Is this DOM node a mount point? Returns the internal tree's root fiber,
/// resolving a container fiber through its `current` pointer.
pub fn mount_root(doc: &Document, arena: &FiberArena, key: DomKey) -> Option<FiberKey> {
    if !doc.is_document(key) && !doc.is_element(key) {
        return None;
    }
    let (_, root) = container_marker(doc, key)?;
    match arena.get(root).and_then(|f| f.state_node) {
        Some(StateNode::Root { current }) => Some(current),
        _ => Some(root),
    }
}

/// The raw mount-point marker (property name + fiber), unresolved.
pub fn container_marker(doc: &Document, key: DomKey) -> Option<(&str, FiberKey)> {
    doc.expandos(key).iter().find_map(|(name, value)| match value {
        Expando::FiberRoot(f) if name.starts_with(CONTAINER_PREFIX) => {
            Some((name.as_str(), *f))
        }
        _ => None,
    })
}

/// The per-node fiber marker on an element, if present.
pub fn node_marker(doc: &Document, key: DomKey) -> Option<(&str, FiberKey)> {
    doc.expandos(key).iter().find_map(|(name, value)| match value {
        Expando::FiberNode(f) if name.starts_with(NODE_PREFIX) => Some((name.as_str(), *f)),
        _ => None,
    })
}

/// The DOM element a fiber renders to, if it has one.
pub fn rendered_element(arena: &FiberArena, key: FiberKey) -> Option<DomKey> {
    match arena.get(key)?.state_node {
        Some(StateNode::Element(el)) => Some(el),
        _ => None,
    }
}

/// First fiber, starting at `key` and following `child` links, that carries a
/// rendered handle. Capped at [`LOOKAHEAD_CAP`] hops.
pub fn first_with_rendered(arena: &FiberArena, key: FiberKey) -> Option<FiberKey> {
    let mut cursor = Some(key);
    for _ in 0..LOOKAHEAD_CAP {
        let k = cursor?;
        if rendered_element(arena, k).is_some() {
            return Some(k);
        }
        cursor = arena.get(k)?.child;
    }
    None
}
