//! Live-page model: the hosted page as the bridge sees it.
//!
//! This is the platform seam. A real embedding keeps this model in sync with
//! the rendered page (rects, computed styles, scroll state, framework expando
//! properties); tests construct it directly. The bridge itself only ever
//! reads it, except for the scroll commands the host sends.

mod dom;
mod store;
mod style;

pub use dom::{Document, ElementData, Expando, NodeData};
pub use store::{MemoryStore, SessionStore};
pub use style::{
    ComputedStyle, Display, Overflow, Position, Rect, ScrollBehavior, Visibility,
};
