//! Tree reconciliation engine.
//!
//! Produces the unified node tree the supervising host consumes: a
//! document-order walk over the live page that, at framework mount points,
//! switches to walking the framework's internal tree in lock-step with the
//! DOM, merging both into one output tree. Every emitted node is annotated
//! with visually-accurate geometry, a stable identifier, and best-effort
//! source/component metadata.
//!
//! The walk is exception-free by construction: every metadata lookup has a
//! fallback, and a miss only lowers fidelity. The one deliberate panic
//! boundary in this crate is the diagnostic capture in [`debug`].

pub mod debug;
pub mod geometry;

mod element;
mod engine;
mod node;

pub use element::{SOURCE_FILE_ATTR, SOURCE_POS_ATTR, SnapOptions};
pub use engine::snapshot;
pub use node::{CssProps, PropValue, RawRect, SnapNode, SnapRect, Snapshot, SourceLoc};
