//! Component-framework internal tree ("fibers").
//!
//! The rendering framework keeps a bookkeeping node per logical component,
//! linked as a singly-linked child/sibling graph and attached to DOM objects
//! through suffixed expando properties. Everything here is a
//! documented-by-convention contract: every field is optional, and absence of
//! any of them only reduces metadata fidelity, never errors.

mod name;
pub mod probe;

pub use name::{component_name, debug_frames};

use core_types::{DomKey, FiberKey};

#[derive(Clone, Debug, PartialEq)]
pub enum ElementType {
    /// A host element, e.g. `Host("div")`.
    Host(String),
    /// A function/class component, by its function name.
    Function(String),
    /// A forward-ref-style component object wrapping a render function.
    ForwardRef {
        display_name: Option<String>,
        render_name: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateNode {
    /// The rendered DOM element this fiber resolves to.
    Element(DomKey),
    /// A container fiber; the real tree root is `current`.
    Root { current: FiberKey },
}

/// A framework prop value as the framework holds it. Anything that is not a
/// plain string or number is opaque to the bridge.
#[derive(Clone, Debug, PartialEq)]
pub enum PropBlob {
    Str(String),
    Num(f64),
    Opaque,
}

/// Source location as the framework reports it: 1-based line and column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugSource {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// One logical component layer reported for a single physical DOM position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugFrame {
    pub name: String,
}

#[derive(Clone, Debug, Default)]
pub struct FiberNode {
    pub child: Option<FiberKey>,
    pub sibling: Option<FiberKey>,
    pub element_type: Option<ElementType>,
    pub state_node: Option<StateNode>,
    pub key: Option<String>,
    pub props: Vec<(String, PropBlob)>,
    pub debug_source: Option<DebugSource>,
    pub debug_owner: Option<FiberKey>,
    pub debug_info: Option<Vec<DebugFrame>>,
}

impl FiberNode {
    /// A fiber with no type, no rendered handle, and no debug info is pure
    /// framework plumbing and is skipped by the walk.
    pub fn is_purely_logical(&self) -> bool {
        self.element_type.is_none() && self.state_node.is_none() && self.debug_info.is_none()
    }
}

#[derive(Clone, Debug, Default)]
pub struct FiberArena {
    nodes: Vec<FiberNode>,
}

impl FiberArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: FiberNode) -> FiberKey {
        let key = FiberKey(self.nodes.len() as u32);
        self.nodes.push(node);
        key
    }

    pub fn get(&self, key: FiberKey) -> Option<&FiberNode> {
        self.nodes.get(key.0 as usize)
    }

    pub fn get_mut(&mut self, key: FiberKey) -> Option<&mut FiberNode> {
        self.nodes.get_mut(key.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
