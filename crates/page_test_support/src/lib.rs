//! Fixture builders for pages and fiber trees, shared by the snapshot and
//! bridge test suites. Test-only code: panicking on bad fixture input is fine
//! here.

use core_types::{DomKey, FiberKey};
use fiber::{DebugFrame, DebugSource, ElementType, FiberArena, FiberNode, PropBlob, StateNode};
use page::{ComputedStyle, Document, Expando, Rect};
use url::Url;

pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Rect {
    Rect::new(x, y, width, height)
}

/// A document with the usual html/head/body skeleton. Returns the body key.
pub fn blank_page(url: &str) -> (Document, DomKey) {
    let location = Url::parse(url).expect("fixture url must parse");
    let mut doc = Document::new(location);
    let html = doc.create_element(doc.root(), "html");
    doc.create_element(html, "head");
    let body = doc.create_element(html, "body");
    (doc, body)
}

pub struct ElementInit {
    pub tag: &'static str,
    pub class: Option<&'static str>,
    pub rect: Rect,
    pub style: ComputedStyle,
    pub scroll_top: f32,
    pub scroll_left: f32,
    pub attrs: Vec<(&'static str, &'static str)>,
}

impl Default for ElementInit {
    fn default() -> Self {
        Self {
            tag: "div",
            class: None,
            rect: Rect::zero(),
            style: ComputedStyle::initial(),
            scroll_top: 0.0,
            scroll_left: 0.0,
            attrs: Vec::new(),
        }
    }
}

pub fn add_element(doc: &mut Document, parent: DomKey, init: ElementInit) -> DomKey {
    let key = doc.create_element(parent, init.tag);
    if let Some(el) = doc.element_mut(key) {
        el.rect = init.rect;
        el.style = init.style;
        el.scroll_top = init.scroll_top;
        el.scroll_left = init.scroll_left;
    }
    if let Some(class) = init.class {
        doc.set_attr(key, "class", class);
    }
    for (name, value) in init.attrs {
        doc.set_attr(key, name, value);
    }
    key
}

#[derive(Default)]
pub struct FiberInit {
    pub element_type: Option<ElementType>,
    pub state_node: Option<StateNode>,
    pub key: Option<&'static str>,
    pub props: Vec<(&'static str, PropBlob)>,
    pub debug_source: Option<DebugSource>,
    pub debug_owner: Option<FiberKey>,
    pub debug_info: Option<Vec<&'static str>>,
}

pub fn add_fiber(arena: &mut FiberArena, init: FiberInit) -> FiberKey {
    arena.insert(FiberNode {
        element_type: init.element_type,
        state_node: init.state_node,
        key: init.key.map(str::to_string),
        props: init
            .props
            .into_iter()
            .map(|(name, blob)| (name.to_string(), blob))
            .collect(),
        debug_source: init.debug_source,
        debug_owner: init.debug_owner,
        debug_info: init.debug_info.map(|names| {
            names
                .into_iter()
                .map(|name| DebugFrame {
                    name: name.to_string(),
                })
                .collect()
        }),
        ..FiberNode::default()
    })
}

/// A host fiber rendering to the given element.
pub fn host_fiber(arena: &mut FiberArena, tag: &str, el: DomKey) -> FiberKey {
    arena.insert(FiberNode {
        element_type: Some(ElementType::Host(tag.to_string())),
        state_node: Some(StateNode::Element(el)),
        ..FiberNode::default()
    })
}

pub fn link_child(arena: &mut FiberArena, parent: FiberKey, child: FiberKey) {
    arena
        .get_mut(parent)
        .expect("fixture fiber must exist")
        .child = Some(child);
}

pub fn link_sibling(arena: &mut FiberArena, first: FiberKey, next: FiberKey) {
    arena
        .get_mut(first)
        .expect("fixture fiber must exist")
        .sibling = Some(next);
}

/// Mount an internal tree at a DOM node through a container fiber, the way a
/// framework does: suffixed marker resolving via `Root { current }`.
pub fn mount(doc: &mut Document, at: DomKey, arena: &mut FiberArena, root: FiberKey) {
    let container = arena.insert(FiberNode {
        state_node: Some(StateNode::Root { current: root }),
        ..FiberNode::default()
    });
    doc.set_expando(
        at,
        &format!("{}$t1", fiber::probe::CONTAINER_PREFIX),
        Expando::FiberRoot(container),
    );
}

/// Attach the per-node fiber marker an element would carry.
pub fn attach_node_marker(doc: &mut Document, el: DomKey, fiber_key: FiberKey) {
    doc.set_expando(
        el,
        &format!("{}$t1", fiber::probe::NODE_PREFIX),
        Expando::FiberNode(fiber_key),
    );
}

pub fn src(file: &str, line: u32, column: u32) -> DebugSource {
    DebugSource {
        file: file.to_string(),
        line,
        column,
    }
}
