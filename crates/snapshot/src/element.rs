//! Per-element node construction.
//!
//! Turns one candidate physical element (plus, when available, the framework
//! fiber associated with it) into either a node, a chain of debug-frame
//! nodes, or the skip sentinel. Every metadata step is best effort: absence
//! of any framework field only omits the corresponding output field.

use crate::geometry;
use crate::node::{PropValue, RawRect, SnapNode, SnapRect, SourceLoc};
use core_types::{DomKey, FiberKey, ScrollOffsets};
use fiber::{DebugFrame, FiberArena, PropBlob};
use identity::IdRegistry;
use page::Document;
use std::collections::{BTreeMap, HashSet};

/// Element attribute naming the source file an element came from.
pub const SOURCE_FILE_ATTR: &str = "data-source-file";
/// Element attribute carrying a 1-based `line:column` position string.
pub const SOURCE_POS_ATTR: &str = "data-source-pos";

#[derive(Clone, Copy, Debug)]
pub struct SnapOptions {
    /// Report framework source line/column numbers.
    pub source_lines: bool,
    /// Keep the untranslated viewport rect on every node.
    pub capture_raw_rects: bool,
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self {
            source_lines: true,
            capture_raw_rects: false,
        }
    }
}

/// Output cursor: absolute page offset of the nearest emitted ancestor.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Cursor {
    pub ox: f32,
    pub oy: f32,
}

pub(crate) struct WalkCtx<'a> {
    pub doc: &'a Document,
    pub fibers: Option<&'a FiberArena>,
    pub registry: &'a mut IdRegistry<DomKey>,
    pub scroll: ScrollOffsets,
    pub options: SnapOptions,
    /// Fibers whose explicit debug-info was already reported in this pass.
    pub consumed: HashSet<FiberKey>,
    /// Source files of the emitted ancestors, one entry per chain.
    pub source_stack: Vec<Option<String>>,
}

impl WalkCtx<'_> {
    fn ancestor_has_source_file(&self, file: &str) -> bool {
        self.source_stack.iter().flatten().any(|f| f == file)
    }
}

pub(crate) enum Emit {
    /// Hidden/collapsed: contributes nothing, caller must not descend via the
    /// fiber path.
    Skip,
    /// Excluded outright (scripts, unresolvable keys).
    None,
    /// A node, possibly wrapped in synthetic debug-frame layers
    /// (`wrappers` outer to inner; `node` is the physical one).
    Node {
        wrappers: Vec<SnapNode>,
        node: SnapNode,
    },
}

pub(crate) fn build_element(
    ctx: &mut WalkCtx<'_>,
    key: DomKey,
    cursor: Cursor,
    fiber_key: Option<FiberKey>,
    primary: bool,
) -> Emit {
    let doc = ctx.doc;
    let Some(el) = doc.element(key) else {
        return Emit::None;
    };
    if el.tag == "script" {
        return Emit::None;
    }

    // identifier is assigned before any filtering so it stays stable even
    // for elements that are currently hidden
    let elid = ctx.registry.assign(key);

    let rect = el.rect;
    let style = el.style;
    if primary && geometry::is_hidden(rect, &style) {
        return Emit::Skip;
    }

    let geo = geometry::resolve(rect, &style, ctx.scroll, (cursor.ox, cursor.oy), primary);
    let css = geometry::css_subset(&style, primary, geo.fixed_or_sticky);

    let mut props = BTreeMap::new();
    let mut source: Option<SourceLoc> = None;
    let mut owner: Option<String> = None;
    let mut frames: Option<Vec<DebugFrame>> = None;

    if let (Some(arena), Some(fk)) = (ctx.fibers, fiber_key) {
        if let Some(fnode) = arena.get(fk) {
            for (name, blob) in &fnode.props {
                if name == "className" || name == "children" {
                    continue;
                }
                props.insert(name.clone(), prop_value(blob));
            }
            if let Some(component_key) = &fnode.key {
                props.insert("key".to_string(), PropValue::Str(component_key.clone()));
            }

            // own debug source, falling back to the nearest owner's
            let debug_source = fnode.debug_source.as_ref().or_else(|| {
                fnode
                    .debug_owner
                    .and_then(|o| arena.get(o))
                    .and_then(|o| o.debug_source.as_ref())
            });
            if let Some(ds) = debug_source {
                source = Some(SourceLoc {
                    file: ds.file.clone(),
                    line: ctx.options.source_lines.then(|| ds.line.saturating_sub(1)),
                    column: ctx
                        .options
                        .source_lines
                        .then(|| ds.column.saturating_sub(1)),
                });
            }

            owner = fnode
                .debug_owner
                .and_then(|o| fiber::component_name(arena, o));
            frames = fiber::debug_frames(arena, fk, &mut ctx.consumed);
        }
    }

    // data-attribute fallback only runs when the fiber path found no source
    if source.is_none() {
        if let Some(file) = doc.attr(key, SOURCE_FILE_ATTR) {
            if let Some(pos) = doc.attr(key, SOURCE_POS_ATTR) {
                source = parse_source_pos(file, pos);
            }
            // the element starts a new logical component unless some
            // ancestor already reports the same source file
            if frames.is_none() && !ctx.ancestor_has_source_file(file) {
                if let Some(name) = component_from_file(file) {
                    frames = Some(vec![DebugFrame { name }]);
                }
            }
        }
    }

    let class = doc.attr(key, "class").map(str::to_string);
    let raw = ctx.options.capture_raw_rects.then(|| RawRect::from(rect));
    let rect_out = SnapRect {
        x: geo.x,
        y: geo.y,
        w: rect.width,
        h: rect.height,
        ox: geo.ox,
        oy: geo.oy,
    };

    match frames {
        Some(frames) if !frames.is_empty() => {
            let last = frames.len() - 1;
            let wrappers = frames[..last]
                .iter()
                .map(|frame| SnapNode::synthetic(frame.name.clone(), source.clone(), owner.clone()))
                .collect();
            let node = SnapNode {
                name: Some(frames[last].name.clone()),
                elid: primary.then_some(elid),
                rect: rect_out,
                class,
                scroll_top: el.scroll_top,
                scroll_left: el.scroll_left,
                props,
                css,
                source,
                owner,
                raw,
                ..SnapNode::default()
            };
            Emit::Node { wrappers, node }
        }
        _ => Emit::Node {
            wrappers: Vec::new(),
            node: SnapNode {
                tag: Some(el.tag.clone()),
                elid: primary.then_some(elid),
                rect: rect_out,
                class,
                scroll_top: el.scroll_top,
                scroll_left: el.scroll_left,
                props,
                css,
                source,
                owner,
                raw,
                ..SnapNode::default()
            },
        },
    }
}

fn prop_value(blob: &PropBlob) -> PropValue {
    match blob {
        PropBlob::Str(value) => PropValue::Str(value.clone()),
        PropBlob::Num(value) => PropValue::Num(*value),
        PropBlob::Opaque => PropValue::Elided,
    }
}

/// `"12:5"` (1-based) → zero-based source location.
fn parse_source_pos(file: &str, pos: &str) -> Option<SourceLoc> {
    let (line, column) = pos.split_once(':')?;
    let line: u32 = line.trim().parse().ok()?;
    let column: u32 = column.trim().parse().ok()?;
    Some(SourceLoc {
        file: file.to_string(),
        line: Some(line.saturating_sub(1)),
        column: Some(column.saturating_sub(1)),
    })
}

/// Component name from a file path: base name with its extension stripped.
/// A bare name without an extension yields nothing.
fn component_from_file(file: &str) -> Option<String> {
    let base = file.rsplit(['/', '\\']).next().unwrap_or(file);
    let (stem, _) = base.rsplit_once('.')?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_pos_parses_one_based_pairs() {
        let loc = parse_source_pos("src/hero.tsx", "12:5").unwrap();
        assert_eq!(loc.line, Some(11));
        assert_eq!(loc.column, Some(4));
        assert!(parse_source_pos("src/hero.tsx", "12").is_none());
        assert!(parse_source_pos("src/hero.tsx", "a:b").is_none());
    }

    #[test]
    fn component_name_from_file_paths() {
        assert_eq!(
            component_from_file("src/components/team-card.tsx"),
            Some("team-card".to_string())
        );
        assert_eq!(
            component_from_file("C:\\site\\nav.bar.jsx"),
            Some("nav.bar".to_string())
        );
        assert_eq!(component_from_file("src/noext"), None);
        assert_eq!(component_from_file(".tsx"), None);
    }
}
