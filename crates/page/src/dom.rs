//! DOM arena for the hosted page.
//!
//! Node keys are minted monotonically and never reused; detaching a node
//! unlinks it from its parent and marks it, but the slot stays occupied so
//! stale keys can only miss. That property is what makes the identity
//! registry's never-reassign invariant hold at the page layer.

use crate::style::{ComputedStyle, Rect, ScrollBehavior};
use core_types::{DomKey, FiberKey, ScrollOffsets};
use url::Url;

/// Duck-typed expando property a framework hangs off a DOM object.
///
/// Real frameworks use suffixed property names (probed by prefix); the value
/// is an opaque handle into the framework's internal tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expando {
    /// Mount-point marker: the internal tree rooted at this DOM node.
    FiberRoot(FiberKey),
    /// Per-node marker: the internal node rendered to this DOM node.
    FiberNode(FiberKey),
}

#[derive(Clone, Debug)]
pub struct ElementData {
    /// Lowercase tag name.
    pub tag: String,
    pub attributes: Vec<(String, Option<String>)>,
    pub style: ComputedStyle,
    /// Live viewport-relative bounding rect.
    pub rect: Rect,
    pub scroll_top: f32,
    pub scroll_left: f32,
}

#[derive(Clone, Debug)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Clone, Debug)]
struct DomNode {
    data: NodeData,
    parent: Option<DomKey>,
    children: Vec<DomKey>,
    expando: Vec<(String, Expando)>,
    detached: bool,
}

/// The hosted page: DOM arena plus document-level state (location, scrolling
/// element, scroll behavior).
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<DomNode>,
    root: DomKey,
    location: Url,
    scroll: ScrollOffsets,
    scroll_width: f32,
    scroll_height: f32,
    scroll_behavior: ScrollBehavior,
}

impl Document {
    pub fn new(location: Url) -> Self {
        let root = DomNode {
            data: NodeData::Document,
            parent: None,
            children: Vec::new(),
            expando: Vec::new(),
            detached: false,
        };
        Self {
            nodes: vec![root],
            root: DomKey(0),
            location,
            scroll: ScrollOffsets::default(),
            scroll_width: 0.0,
            scroll_height: 0.0,
            scroll_behavior: ScrollBehavior::Auto,
        }
    }

    pub fn root(&self) -> DomKey {
        self.root
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn navigate(&mut self, location: Url) {
        self.location = location;
    }

    /// The logical route: path + query + fragment.
    pub fn route(&self) -> String {
        let mut route = self.location.path().to_string();
        if let Some(query) = self.location.query() {
            route.push('?');
            route.push_str(query);
        }
        if let Some(fragment) = self.location.fragment() {
            route.push('#');
            route.push_str(fragment);
        }
        route
    }

    // --- construction ---

    pub fn create_element(&mut self, parent: DomKey, tag: &str) -> DomKey {
        self.insert(
            parent,
            NodeData::Element(ElementData {
                tag: tag.to_ascii_lowercase(),
                attributes: Vec::new(),
                style: ComputedStyle::initial(),
                rect: Rect::zero(),
                scroll_top: 0.0,
                scroll_left: 0.0,
            }),
        )
    }

    pub fn create_text(&mut self, parent: DomKey, text: &str) -> DomKey {
        self.insert(parent, NodeData::Text(text.to_string()))
    }

    fn insert(&mut self, parent: DomKey, data: NodeData) -> DomKey {
        let key = DomKey(self.nodes.len() as u32);
        self.nodes.push(DomNode {
            data,
            parent: Some(parent),
            children: Vec::new(),
            expando: Vec::new(),
            detached: false,
        });
        if let Some(p) = self.node_mut(parent) {
            p.children.push(key);
        }
        key
    }

    /// Unlink a node from its parent. The slot is kept; the key goes stale.
    pub fn detach(&mut self, key: DomKey) {
        let parent = self.node(key).and_then(|n| n.parent);
        if let Some(p) = parent {
            if let Some(parent_node) = self.node_mut(p) {
                parent_node.children.retain(|c| *c != key);
            }
        }
        if let Some(node) = self.node_mut(key) {
            node.detached = true;
        }
    }

    /// A node is attached while the chain up to the document root is intact.
    pub fn is_attached(&self, key: DomKey) -> bool {
        let mut cursor = Some(key);
        while let Some(k) = cursor {
            let Some(node) = self.node(k) else {
                return false;
            };
            if node.detached {
                return false;
            }
            if k == self.root {
                return true;
            }
            cursor = node.parent;
        }
        false
    }

    // --- accessors ---

    fn node(&self, key: DomKey) -> Option<&DomNode> {
        self.nodes.get(key.0 as usize)
    }

    fn node_mut(&mut self, key: DomKey) -> Option<&mut DomNode> {
        self.nodes.get_mut(key.0 as usize)
    }

    pub fn data(&self, key: DomKey) -> Option<&NodeData> {
        self.node(key).map(|n| &n.data)
    }

    pub fn is_document(&self, key: DomKey) -> bool {
        matches!(self.data(key), Some(NodeData::Document))
    }

    pub fn is_element(&self, key: DomKey) -> bool {
        matches!(self.data(key), Some(NodeData::Element(_)))
    }

    pub fn element(&self, key: DomKey) -> Option<&ElementData> {
        match self.data(key) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, key: DomKey) -> Option<&mut ElementData> {
        match self.node_mut(key).map(|n| &mut n.data) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn tag(&self, key: DomKey) -> Option<&str> {
        self.element(key).map(|el| el.tag.as_str())
    }

    pub fn parent(&self, key: DomKey) -> Option<DomKey> {
        self.node(key).and_then(|n| n.parent)
    }

    pub fn children(&self, key: DomKey) -> &[DomKey] {
        self.node(key).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Element children in document order, like the live `children` list.
    pub fn element_children(&self, key: DomKey) -> Vec<DomKey> {
        self.children(key)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    pub fn attr(&self, key: DomKey, name: &str) -> Option<&str> {
        self.element(key).and_then(|el| {
            el.attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .and_then(|(_, v)| v.as_deref())
        })
    }

    pub fn set_attr(&mut self, key: DomKey, name: &str, value: &str) {
        if let Some(el) = self.element_mut(key) {
            match el
                .attributes
                .iter()
                .position(|(k, _)| k.eq_ignore_ascii_case(name))
            {
                Some(i) => el.attributes[i].1 = Some(value.to_string()),
                None => el
                    .attributes
                    .push((name.to_string(), Some(value.to_string()))),
            }
        }
    }

    // --- expando properties ---

    pub fn set_expando(&mut self, key: DomKey, name: &str, value: Expando) {
        if let Some(node) = self.node_mut(key) {
            node.expando.push((name.to_string(), value));
        }
    }

    pub fn expandos(&self, key: DomKey) -> &[(String, Expando)] {
        self.node(key).map(|n| n.expando.as_slice()).unwrap_or(&[])
    }

    // --- scrolling element ---

    pub fn scroll(&self) -> ScrollOffsets {
        self.scroll
    }

    pub fn scroll_to(&mut self, top: f32, left: f32) {
        self.scroll = ScrollOffsets { top, left };
    }

    pub fn set_scroll_top(&mut self, top: f32) {
        self.scroll.top = top;
    }

    pub fn scroll_dimensions(&self) -> (f32, f32) {
        (self.scroll_width, self.scroll_height)
    }

    pub fn set_scroll_dimensions(&mut self, width: f32, height: f32) {
        self.scroll_width = width;
        self.scroll_height = height;
    }

    pub fn scroll_behavior(&self) -> ScrollBehavior {
        self.scroll_behavior
    }

    pub fn set_scroll_behavior(&mut self, behavior: ScrollBehavior) {
        self.scroll_behavior = behavior;
    }
}
