//! Best-effort component-name and debug-info resolution.

use crate::{DebugFrame, ElementType, FiberArena};
use core_types::FiberKey;
use std::collections::HashSet;

/// Display name for a fiber, best effort.
///
/// Resolution order: explicit debug-info (first entry's name), then the
/// function name, then a forward-ref's display name, its render-function
/// name, or `"Anonymous"`. Host elements and bare fibers have no name.
pub fn component_name(arena: &FiberArena, key: FiberKey) -> Option<String> {
    let fiber = arena.get(key)?;
    if let Some(info) = &fiber.debug_info {
        if let Some(first) = info.first() {
            return Some(first.name.clone());
        }
    }
    match &fiber.element_type {
        Some(ElementType::Function(name)) => Some(name.clone()),
        Some(ElementType::ForwardRef {
            display_name,
            render_name,
        }) => Some(
            display_name
                .clone()
                .or_else(|| render_name.clone())
                .unwrap_or_else(|| "Anonymous".to_string()),
        ),
        _ => None,
    }
}

/// Debug frames for a fiber, best effort.
///
/// Explicit debug-info takes precedence and marks the fiber consumed so the
/// same layers are not re-reported later in the pass; otherwise a single
/// frame is derived from the resolved component name.
pub fn debug_frames(
    arena: &FiberArena,
    key: FiberKey,
    consumed: &mut HashSet<FiberKey>,
) -> Option<Vec<DebugFrame>> {
    let fiber = arena.get(key)?;
    if consumed.contains(&key) {
        return None;
    }
    if let Some(info) = &fiber.debug_info {
        consumed.insert(key);
        return Some(info.clone());
    }
    component_name(arena, key).map(|name| vec![DebugFrame { name }])
}
