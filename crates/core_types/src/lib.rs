/// Opaque handle to a node in the live page's DOM arena.
///
/// Keys are minted monotonically and never reused within a page session,
/// so a stale key can only miss, never alias a different node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DomKey(pub u32);

/// Opaque handle to a node in the component framework's internal tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FiberKey(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollOffsets {
    pub top: f32,
    pub left: f32,
}
