//! Geometry & visibility resolver.
//!
//! Pure functions of the element's live rect, computed style, current page
//! scroll, and the ancestor node's absolute page offset. No hidden state, so
//! the fixed/sticky matrix is unit-testable without a live page.

use crate::node::CssProps;
use core_types::ScrollOffsets;
use page::{ComputedStyle, Display, Overflow, Position, Rect, Visibility};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedGeometry {
    /// Position relative to the nearest ancestor node (viewport-anchored for
    /// fixed/sticky).
    pub x: f32,
    pub y: f32,
    /// Absolute page offset (viewport rect + page scroll), recorded for
    /// descendants' relative computation regardless of positioning.
    pub ox: f32,
    pub oy: f32,
    pub sticky: bool,
    pub fixed_or_sticky: bool,
}

/// Hidden: display none, visibility hidden, or a collapsed box under a
/// scrollable-overflow container.
pub fn is_hidden(rect: Rect, style: &ComputedStyle) -> bool {
    if style.display == Display::None || style.visibility == Visibility::Hidden {
        return true;
    }
    (rect.width == 0.0 || rect.height == 0.0)
        && matches!(style.overflow, Overflow::Scroll | Overflow::Hidden)
}

/// Offset rule: normal nodes are relative to the ancestor's absolute offset;
/// fixed nodes keep their viewport rect plus page scroll; sticky nodes get no
/// scroll compensation at all. The fixed/sticky asymmetry is intentional.
/// Fixed/sticky classification only applies to primary nodes.
pub fn resolve(
    rect: Rect,
    style: &ComputedStyle,
    scroll: ScrollOffsets,
    ancestor_offset: (f32, f32),
    primary: bool,
) -> ResolvedGeometry {
    let sticky = primary && style.position == Position::Sticky;
    let fixed_or_sticky = (primary && style.position == Position::Fixed) || sticky;

    let (ancestor_ox, ancestor_oy) = ancestor_offset;
    let x = if fixed_or_sticky {
        rect.x + if sticky { 0.0 } else { scroll.left }
    } else {
        rect.x + scroll.left - ancestor_ox
    };
    let y = if fixed_or_sticky {
        rect.y + if sticky { 0.0 } else { scroll.top }
    } else {
        rect.y + scroll.top - ancestor_oy
    };

    ResolvedGeometry {
        x,
        y,
        ox: rect.x + scroll.left,
        oy: rect.y + scroll.top,
        sticky,
        fixed_or_sticky,
    }
}

/// CSS subset: `position` only for primary fixed/sticky nodes, `z-index`
/// whenever it is not `auto`.
pub fn css_subset(style: &ComputedStyle, primary: bool, fixed_or_sticky: bool) -> CssProps {
    CssProps {
        position: (primary && fixed_or_sticky).then(|| style.position.as_css().to_string()),
        z_index: style.z_index,
    }
}
