//! Document-order reconciliation walk.
//!
//! Plain DOM traversal, switching to the framework's internal tree at every
//! mount point. The fiber walk follows child/sibling links in lock-step with
//! the rendered elements; the cursor tracks the nearest emitted ancestor's
//! absolute page offset so each node's geometry comes out relative to it.

use crate::element::{Cursor, Emit, SnapOptions, WalkCtx, build_element};
use crate::node::{SnapNode, Snapshot};
use core_types::{DomKey, FiberKey};
use fiber::{ElementType, FiberArena, probe};
use identity::IdRegistry;
use page::Document;
use std::collections::HashSet;

/// One full reconciliation pass over the document.
pub fn snapshot(
    doc: &Document,
    fibers: Option<&FiberArena>,
    registry: &mut IdRegistry<DomKey>,
    options: SnapOptions,
    from_observer: bool,
) -> Snapshot {
    let scroll = doc.scroll();
    let mut ctx = WalkCtx {
        doc,
        fibers,
        registry,
        scroll,
        options,
        consumed: HashSet::new(),
        source_stack: Vec::new(),
    };
    let children = walk_dom(&mut ctx, doc.root(), Cursor::default());
    let (scroll_width, scroll_height) = doc.scroll_dimensions();
    log::trace!(
        target: "tether.snapshot",
        "snapshot pass produced {} root nodes (from_observer={from_observer})",
        children.len()
    );
    Snapshot {
        route: doc.route(),
        children,
        scroll_top: scroll.top,
        scroll_left: scroll.left,
        scroll_width,
        scroll_height,
        from_observer,
    }
}

fn walk_dom(ctx: &mut WalkCtx<'_>, key: DomKey, cursor: Cursor) -> Vec<SnapNode> {
    let doc = ctx.doc;
    if doc.tag(key) == Some("head") {
        return Vec::new();
    }

    if let Some(arena) = ctx.fibers {
        if let Some(root_fiber) = probe::mount_root(doc, arena, key) {
            let mut out = Vec::new();
            walk_fiber(ctx, root_fiber, cursor, &mut out);
            return out;
        }
    }

    let mut out = Vec::new();
    if doc.is_element(key) {
        match build_element(ctx, key, cursor, None, true) {
            Emit::None => {}
            Emit::Skip => {
                // a hidden element contributes nothing and the cursor stays,
                // but plain-DOM descent still reaches its children
                for child in doc.element_children(key) {
                    out.extend(walk_dom(ctx, child, cursor));
                }
            }
            Emit::Node { wrappers, node } => {
                let child_cursor = Cursor {
                    ox: node.rect.ox,
                    oy: node.rect.oy,
                };
                ctx.source_stack
                    .push(node.source.as_ref().map(|s| s.file.clone()));
                let mut children = Vec::new();
                for child in doc.element_children(key) {
                    children.extend(walk_dom(ctx, child, child_cursor));
                }
                ctx.source_stack.pop();
                out.push(finish(wrappers, node, children));
            }
        }
    } else {
        for child in doc.element_children(key) {
            out.extend(walk_dom(ctx, child, cursor));
        }
    }
    out
}

fn walk_fiber(ctx: &mut WalkCtx<'_>, key: FiberKey, cursor: Cursor, out: &mut Vec<SnapNode>) {
    let Some(arena) = ctx.fibers else {
        return;
    };
    let Some(fiber) = arena.get(key) else {
        return;
    };

    let mut skipped = false;
    let mut emitted: Option<(Vec<SnapNode>, SnapNode)> = None;

    if !fiber.is_purely_logical() {
        if let Some(rendering) = probe::first_with_rendered(arena, key) {
            if let Some(el) = probe::rendered_element(arena, rendering) {
                match build_element(ctx, el, cursor, Some(key), rendering == key) {
                    Emit::Skip => skipped = true,
                    Emit::None => {}
                    Emit::Node { wrappers, node } => emitted = Some((wrappers, node)),
                }
            }
        }
    }

    let is_svg = matches!(&fiber.element_type, Some(ElementType::Host(tag)) if tag == "svg");

    match emitted {
        Some((wrappers, node)) => {
            let child_cursor = Cursor {
                ox: node.rect.ox,
                oy: node.rect.oy,
            };
            let mut children = Vec::new();
            if let Some(child) = fiber.child {
                if !is_svg {
                    ctx.source_stack
                        .push(node.source.as_ref().map(|s| s.file.clone()));
                    walk_fiber(ctx, child, child_cursor, &mut children);
                    ctx.source_stack.pop();
                }
            }
            out.push(finish(wrappers, node, children));
        }
        None => {
            if let Some(child) = fiber.child {
                if !is_svg && !skipped {
                    walk_fiber(ctx, child, cursor, out);
                }
            }
        }
    }

    if let Some(sibling) = fiber.sibling {
        walk_fiber(ctx, sibling, cursor, out);
    }
}

/// Nest `children` under the physical node, then wrap it in its synthetic
/// debug-frame layers, innermost last.
fn finish(wrappers: Vec<SnapNode>, mut node: SnapNode, children: Vec<SnapNode>) -> SnapNode {
    node.children = children;
    let mut acc = node;
    for mut wrapper in wrappers.into_iter().rev() {
        wrapper.children = vec![acc];
        acc = wrapper;
    }
    acc
}
