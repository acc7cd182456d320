//! Diagnostic snapshot: a simpler full-document dump used for debugging the
//! bridge itself.
//!
//! Independent of the reconciliation engine: records raw structure plus the
//! framework attachment markers it finds, with no geometry offsets and no
//! visibility filtering. The whole capture runs inside a panic boundary;
//! diagnostics must never throw past it, and a partial tree is still useful.

use crate::node::RawRect;
use core_types::{DomKey, FiberKey};
use fiber::{FiberArena, StateNode, probe};
use page::{Document, Position};
use serde::Serialize;
use std::panic::{AssertUnwindSafe, catch_unwind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Document,
    Element,
}

#[derive(Debug, Serialize)]
pub struct DebugFiberNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub children: Vec<DebugFiberNode>,
}

/// Mount-point marker plus the minimal dump of the tree behind it.
#[derive(Debug, Serialize)]
pub struct MountDump {
    pub marker: String,
    pub tree: Vec<DebugFiberNode>,
}

/// Per-node fiber marker and the tag of the element it resolves to.
#[derive(Debug, Serialize)]
pub struct FiberMarkerDump {
    pub marker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DebugNode {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rect: Option<RawRect>,
    pub fixed: bool,
    pub sticky: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount: Option<MountDump>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<FiberMarkerDump>,
    pub children: Vec<DebugNode>,
}

#[derive(Debug, Serialize)]
pub struct DebugSnapshot {
    pub version: u32,
    pub children: Vec<DebugNode>,
}

/// Capture the diagnostic tree. Any panic during the walk is caught and
/// logged; whatever was already recorded is returned.
pub fn capture(doc: &Document, fibers: Option<&FiberArena>, version: u32) -> DebugSnapshot {
    let mut children = Vec::new();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        walk(doc, fibers, doc.root(), &mut children);
    }));
    if outcome.is_err() {
        log::error!(
            target: "tether.debug",
            "diagnostic capture panicked; emitting partial snapshot"
        );
    }
    DebugSnapshot { version, children }
}

fn walk(doc: &Document, fibers: Option<&FiberArena>, key: DomKey, out: &mut Vec<DebugNode>) {
    let (kind, tag, rect, fixed, sticky) = if doc.is_document(key) {
        (NodeKind::Document, None, None, false, false)
    } else if let Some(el) = doc.element(key) {
        (
            NodeKind::Element,
            Some(el.tag.clone()),
            Some(RawRect::from(el.rect)),
            el.style.position == Position::Fixed,
            el.style.position == Position::Sticky,
        )
    } else {
        return;
    };

    let mut node = DebugNode {
        kind,
        tag,
        rect,
        fixed,
        sticky,
        mount: None,
        fiber: None,
        children: Vec::new(),
    };

    if let Some(arena) = fibers {
        if let Some((marker, container)) = probe::container_marker(doc, key) {
            let root = match arena.get(container).and_then(|f| f.state_node) {
                Some(StateNode::Root { current }) => current,
                _ => container,
            };
            let mut tree = Vec::new();
            dump_fiber(doc, arena, root, &mut tree);
            node.mount = Some(MountDump {
                marker: marker.to_string(),
                tree,
            });
        }
        if let Some((marker, fiber_key)) = probe::node_marker(doc, key) {
            node.fiber = Some(FiberMarkerDump {
                marker: marker.to_string(),
                element: probe::rendered_element(arena, fiber_key)
                    .and_then(|el| doc.tag(el))
                    .map(str::to_string),
            });
        }
    }

    // push before descending so a panic mid-subtree keeps the spine
    out.push(node);
    if let Some(slot) = out.last_mut() {
        for child in doc.element_children(key) {
            walk(doc, fibers, child, &mut slot.children);
        }
    }
}

/// Minimal lock-step dump of an internal tree: names and rendered tags only.
fn dump_fiber(doc: &Document, arena: &FiberArena, key: FiberKey, out: &mut Vec<DebugFiberNode>) {
    let Some(node) = arena.get(key) else {
        return;
    };
    let tag = probe::rendered_element(arena, key)
        .and_then(|el| doc.tag(el))
        .map(str::to_string);
    out.push(DebugFiberNode {
        name: fiber::component_name(arena, key),
        tag,
        children: Vec::new(),
    });
    if let Some(slot) = out.last_mut() {
        if let Some(child) = node.child {
            dump_fiber(doc, arena, child, &mut slot.children);
        }
    }
    if let Some(sibling) = node.sibling {
        dump_fiber(doc, arena, sibling, out);
    }
}
