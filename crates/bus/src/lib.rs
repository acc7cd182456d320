//! Cross-frame message channel: envelopes, sender-identity tags, and the
//! tolerant wire codec.
//!
//! Transport is fire-and-forget: delivery failure is not detectable and not
//! retried. Inbound traffic shares the channel with arbitrary cross-frame
//! messages, so nothing is trusted unless it carries the host's sender tag,
//! and anything malformed or unknown is silently ignored.

use serde::Deserialize;
use serde_json::{Value, json};
use snapshot::Snapshot;
use snapshot::debug::DebugSnapshot;
use std::sync::mpsc::{Receiver, Sender, channel};

/// Sender tag the supervising host puts on every inbound message.
pub const HOST_TAG: &str = "tether";

/// Sender tag this bridge puts on every outbound message.
pub const BRIDGE_TAG: &str = "tetherPage";

/// Options payload of a handshake, merged defensively: absent fields keep
/// their prior values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct OptionsPatch {
    #[serde(default)]
    pub source_lines: Option<bool>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum HostCommand {
    Hello { options: Option<OptionsPatch> },
    Scroll { top: f32, left: f32 },
    RequestSnap,
    RequestDebug,
    EnableObserver,
    DisableObserver,
    RequestSyncScroll,
}

#[derive(Debug)]
pub enum BridgeEvent {
    Hello,
    Snap(Box<Snapshot>),
    Debug(Box<DebugSnapshot>),
    RouteChange(String),
    SyncScroll { top: f32, left: f32 },
}

impl BridgeEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeEvent::Hello => "hello",
            BridgeEvent::Snap(_) => "snap",
            BridgeEvent::Debug(_) => "debug",
            BridgeEvent::RouteChange(_) => "route_change",
            BridgeEvent::SyncScroll { .. } => "sync_scroll",
        }
    }
}

/// Parse one raw inbound message. Wrong sender tag, unknown kind, or missing
/// payload fields all yield `None`.
pub fn parse_inbound(raw: &Value) -> Option<HostCommand> {
    if raw.get("from")?.as_str()? != HOST_TAG {
        return None;
    }
    let kind = raw.get("message")?.as_str()?;
    match kind {
        "hello" => {
            let options = raw
                .get("options")
                .and_then(|v| serde_json::from_value(v.clone()).ok());
            Some(HostCommand::Hello { options })
        }
        "scroll" => {
            let top = raw.get("scrollTop")?.as_f64()? as f32;
            let left = raw.get("scrollLeft")?.as_f64()? as f32;
            Some(HostCommand::Scroll { top, left })
        }
        "request_snap" => Some(HostCommand::RequestSnap),
        "request_debug" => Some(HostCommand::RequestDebug),
        "enable_observer" => Some(HostCommand::EnableObserver),
        "disable_observer" => Some(HostCommand::DisableObserver),
        "request_sync_scroll" => Some(HostCommand::RequestSyncScroll),
        other => {
            log::trace!(target: "tether.bus", "ignoring unknown message kind {other:?}");
            None
        }
    }
}

/// Build the tagged outbound envelope for an event.
pub fn outbound(event: &BridgeEvent) -> Value {
    let data = match event {
        BridgeEvent::Hello => json!({}),
        BridgeEvent::Snap(snap) => serde_json::to_value(snap).unwrap_or(Value::Null),
        BridgeEvent::Debug(dump) => serde_json::to_value(dump).unwrap_or(Value::Null),
        BridgeEvent::RouteChange(route) => Value::String(route.clone()),
        BridgeEvent::SyncScroll { top, left } => json!({
            "scrollTop": top,
            "scrollLeft": left,
        }),
    };
    json!({
        "from": BRIDGE_TAG,
        "message": event.kind(),
        "data": data,
    })
}

/// Channel pair between the bridge and its embedding. `evt_tx` is shareable
/// so the bridge can hold its own sender.
pub struct Bus {
    pub cmd_tx: Sender<Value>,
    pub cmd_rx: Receiver<Value>,
    pub evt_tx: Sender<Value>,
    pub evt_rx: Receiver<Value>,
}

impl Bus {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = channel();
        let (evt_tx, evt_rx) = channel();
        Self {
            cmd_tx,
            cmd_rx,
            evt_tx,
            evt_rx,
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
