//! The in-page agent tying everything together.
//!
//! One [`Bridge`] per hosted page load. It owns the supervision state, the
//! negotiated options, the identity registry, the mutation debounce, the
//! route poll, and the scroll-persistence schedule, and it dispatches host
//! commands to the snapshot engine. All of it runs cooperatively on one
//! thread; time is injected through `Instant` arguments so scheduling is
//! testable without real timers.

mod debounce;
mod route;

pub use debounce::Debounce;
pub use route::RoutePoll;

use bus::{BridgeEvent, HostCommand, OptionsPatch};
use core_types::DomKey;
use fiber::FiberArena;
use identity::{ElementId, IdRegistry};
use page::{Document, ScrollBehavior, SessionStore};
use serde_json::Value;
use snapshot::SnapOptions;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

/// Protocol version, reported in diagnostic snapshots.
pub const VERSION: u32 = 3;

/// Session-store key for the persisted vertical scroll offset.
pub const SCROLL_KEY: &str = "_tether_scroll_y";

/// Quiet window for coalescing mutation bursts.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Period of the route poll.
pub const ROUTE_POLL_PERIOD: Duration = Duration::from_secs(1);

/// Settle delay before a persisted scroll offset is restored.
pub const RESTORE_DELAY: Duration = Duration::from_millis(500);

/// Negotiated options. The handshake merges a patch into these; absent patch
/// fields keep prior values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BridgeOptions {
    /// Report framework source line/column numbers.
    pub source_lines: bool,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self { source_lines: true }
    }
}

impl BridgeOptions {
    pub fn merge(&mut self, patch: &OptionsPatch) {
        if let Some(source_lines) = patch.source_lines {
            self.source_lines = source_lines;
        }
    }
}

pub struct Bridge {
    supervised: bool,
    options: BridgeOptions,
    registry: IdRegistry<DomKey>,
    observer_enabled: bool,
    debounce: Debounce,
    route_poll: RoutePoll,
    pending_restore: Option<(Instant, f32)>,
    debug: bool,
    evt_tx: Sender<Value>,
}

impl Bridge {
    pub fn new(evt_tx: Sender<Value>) -> Self {
        log::debug!(target: "tether", "bridge version {VERSION} loaded, not yet active");
        Self {
            supervised: false,
            options: BridgeOptions::default(),
            registry: IdRegistry::new(),
            observer_enabled: false,
            debounce: Debounce::new(DEBOUNCE_WINDOW),
            route_poll: RoutePoll::new(ROUTE_POLL_PERIOD),
            pending_restore: None,
            debug: false,
            evt_tx,
        }
    }

    pub fn is_supervised(&self) -> bool {
        self.supervised
    }

    pub fn is_observer_enabled(&self) -> bool {
        self.observer_enabled
    }

    pub fn options(&self) -> BridgeOptions {
        self.options
    }

    /// Raw-rect capture for bridge debugging.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn registry(&self) -> &IdRegistry<DomKey> {
        &self.registry
    }

    /// The live element behind an identifier, or `None` once it is detached.
    pub fn element_by_id(&self, doc: &Document, id: ElementId) -> Option<DomKey> {
        self.registry
            .element_of(id)
            .filter(|key| doc.is_attached(*key))
    }

    // --- inbound ---

    /// Handle one raw cross-frame message. Untagged, unknown, or malformed
    /// messages are ignored without a reply.
    pub fn handle_message(&mut self, raw: &Value, doc: &mut Document, fibers: Option<&FiberArena>) {
        let Some(command) = bus::parse_inbound(raw) else {
            return;
        };
        self.handle_command(command, doc, fibers);
    }

    pub fn handle_command(
        &mut self,
        command: HostCommand,
        doc: &mut Document,
        fibers: Option<&FiberArena>,
    ) {
        match command {
            HostCommand::Hello { options } => {
                self.supervised = true;
                if let Some(patch) = options {
                    self.options.merge(&patch);
                }
                self.send(BridgeEvent::Hello);
            }
            HostCommand::Scroll { top, left } => {
                Self::neutralize_smooth_scroll(doc);
                doc.scroll_to(top, left);
            }
            HostCommand::RequestSnap => {
                self.snap(doc, fibers, false);
            }
            HostCommand::RequestDebug => {
                let dump = snapshot::debug::capture(doc, fibers, VERSION);
                self.send(BridgeEvent::Debug(Box::new(dump)));
            }
            HostCommand::EnableObserver => self.enable_observer(),
            HostCommand::DisableObserver => self.disable_observer(),
            HostCommand::RequestSyncScroll => {
                let scroll = doc.scroll();
                self.send(BridgeEvent::SyncScroll {
                    top: scroll.top,
                    left: scroll.left,
                });
            }
        }
    }

    // --- change detection ---

    /// Idempotent; re-enabling reuses the same watcher state.
    pub fn enable_observer(&mut self) {
        self.observer_enabled = true;
        log::debug!(target: "tether", "observer enabled");
    }

    /// Idempotent; also drops any pending debounced snapshot.
    pub fn disable_observer(&mut self) {
        self.observer_enabled = false;
        self.debounce.cancel();
        log::debug!(target: "tether", "observer disabled");
    }

    /// One observed mutation batch: re-arm the debounce while watching.
    pub fn on_mutation(&mut self, now: Instant) {
        if self.observer_enabled {
            self.debounce.poke(now);
        }
    }

    /// Timer tick: fires the due debounce, the route poll, and any pending
    /// scroll restore.
    pub fn tick(&mut self, doc: &mut Document, fibers: Option<&FiberArena>, now: Instant) {
        if self.debounce.fire_if_due(now) {
            self.snap(doc, fibers, true);
        }

        if self.supervised && self.route_poll.due(now) {
            let route = doc.route();
            if self.route_poll.observe(&route) {
                self.send(BridgeEvent::RouteChange(route));
            }
        }

        if let Some((deadline, top)) = self.pending_restore {
            if now >= deadline {
                self.pending_restore = None;
                Self::neutralize_smooth_scroll(doc);
                doc.set_scroll_top(top);
                log::debug!(target: "tether", "restored scroll offset {top}");
            }
        }
    }

    // --- scroll persistence ---

    /// Page-unload hook: persist the offset only while actively watching,
    /// otherwise clear any stale value.
    pub fn on_unload(&self, doc: &Document, store: &mut dyn SessionStore) {
        if self.observer_enabled {
            store.set(SCROLL_KEY, doc.scroll().top.to_string());
        } else {
            store.remove(SCROLL_KEY);
        }
    }

    /// Page-ready hook: schedule a one-shot restore after the settle delay.
    /// The stored value is read once and left in place.
    pub fn on_ready(&mut self, store: &dyn SessionStore, now: Instant) {
        if let Some(value) = store.get(SCROLL_KEY) {
            if let Ok(top) = value.parse::<f32>() {
                self.pending_restore = Some((now + RESTORE_DELAY, top));
            }
        }
    }

    // --- snapshotting ---

    fn snap(&mut self, doc: &Document, fibers: Option<&FiberArena>, from_observer: bool) {
        // an explicit request supersedes any pending debounced one
        self.debounce.cancel();
        let options = SnapOptions {
            source_lines: self.options.source_lines,
            capture_raw_rects: self.debug,
        };
        let started = Instant::now();
        let snap = snapshot::snapshot(doc, fibers, &mut self.registry, options, from_observer);
        log::debug!(target: "tether", "snapshot took {:?}", started.elapsed());
        self.send(BridgeEvent::Snap(Box::new(snap)));
    }

    fn neutralize_smooth_scroll(doc: &mut Document) {
        if doc.scroll_behavior() == ScrollBehavior::Smooth {
            doc.set_scroll_behavior(ScrollBehavior::Auto);
        }
    }

    fn send(&self, event: BridgeEvent) {
        // fire and forget; a closed channel means the embedding went away
        let _ = self.evt_tx.send(bus::outbound(&event));
    }
}
