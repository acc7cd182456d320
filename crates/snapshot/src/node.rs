//! Output model: what one snapshot pass hands to the transport layer.
//!
//! Nodes are created fresh on every pass and never mutated afterwards. The
//! walk threads an explicit cursor instead of parent back-references, so
//! nothing has to be stripped before serialization.

use identity::ElementId;
use page::Rect;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Geometry of one node: `x`/`y` relative to the nearest ancestor node (or
/// the viewport for fixed/sticky), `ox`/`oy` the absolute page offset used by
/// descendants' relative computation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SnapRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub ox: f32,
    pub oy: f32,
}

/// Untranslated viewport rect, kept only when raw-rect capture is on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RawRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl From<Rect> for RawRect {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            w: rect.width,
            h: rect.height,
        }
    }
}

/// Minimal CSS subset: `position` only for primary fixed/sticky nodes,
/// `z-index` whenever it is not `auto`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CssProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(rename = "z-index", skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

impl CssProps {
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.z_index.is_none()
    }
}

/// Extracted component prop. Non-primitive values are elided rather than
/// serialized; on the wire an elided value is the marker string `"..."`.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    Str(String),
    Num(f64),
    Elided,
}

impl Serialize for PropValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropValue::Str(value) => serializer.serialize_str(value),
            PropValue::Num(value) => serializer.serialize_f64(*value),
            PropValue::Elided => serializer.serialize_str("..."),
        }
    }
}

/// Source location, zero-based. `line`/`column` are omitted when location
/// reporting is disabled by the negotiated options.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SourceLoc {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

/// One node of the output tree: a rendered element (`tag`) or a logical
/// component layer (`name`). Exactly one node per physical element carries
/// the identifier and real geometry; synthetic wrapper layers above it are
/// zero-size and identifier-less.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SnapNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elid: Option<ElementId>,
    pub rect: SnapRect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(rename = "st")]
    pub scroll_top: f32,
    #[serde(rename = "sl")]
    pub scroll_left: f32,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub props: BTreeMap<String, PropValue>,
    #[serde(skip_serializing_if = "CssProps::is_empty")]
    pub css: CssProps,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceLoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub children: Vec<SnapNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawRect>,
}

impl SnapNode {
    /// Synthetic wrapper layer in a debug-frame chain: carries only the
    /// layer name and shared source/owner metadata.
    pub(crate) fn synthetic(
        name: String,
        source: Option<SourceLoc>,
        owner: Option<String>,
    ) -> Self {
        Self {
            name: Some(name),
            source,
            owner,
            ..Self::default()
        }
    }
}

/// Snapshot envelope: the root of one reconciliation pass.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub route: String,
    pub children: Vec<SnapNode>,
    #[serde(rename = "st")]
    pub scroll_top: f32,
    #[serde(rename = "sl")]
    pub scroll_left: f32,
    #[serde(rename = "scrollWidth")]
    pub scroll_width: f32,
    #[serde(rename = "scrollHeight")]
    pub scroll_height: f32,
    pub from_observer: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elided_props_serialize_as_marker() {
        let mut props = BTreeMap::new();
        props.insert("title".to_string(), PropValue::Str("Hi".to_string()));
        props.insert("count".to_string(), PropValue::Num(3.0));
        props.insert("onClick".to_string(), PropValue::Elided);
        let value = serde_json::to_value(&props).unwrap();
        assert_eq!(value["title"], "Hi");
        assert_eq!(value["count"], 3.0);
        assert_eq!(value["onClick"], "...");
    }

    #[test]
    fn empty_metadata_is_omitted_from_the_wire() {
        let node = SnapNode {
            tag: Some("div".to_string()),
            elid: Some(identity::ElementId::from_raw(1)),
            ..SnapNode::default()
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["tag"], "div");
        assert_eq!(value["elid"], 1);
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("css"));
        assert!(!object.contains_key("props"));
        assert!(!object.contains_key("source"));
        assert!(!object.contains_key("name"));
        assert!(!object.contains_key("raw"));
    }

    #[test]
    fn source_without_location_keeps_only_the_file() {
        let source = SourceLoc {
            file: "src/components/hero.tsx".to_string(),
            line: None,
            column: None,
        };
        let value = serde_json::to_value(&source).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(value["file"], "src/components/hero.tsx");
    }
}
