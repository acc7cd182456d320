//! End-to-end scenarios driving a real `Bridge` over the loopback bus with a
//! fixture page and synthetic time.

use bridge::{Bridge, DEBOUNCE_WINDOW, RESTORE_DELAY, ROUTE_POLL_PERIOD, SCROLL_KEY, VERSION};
use bus::Bus;
use page::{Document, MemoryStore, ScrollBehavior, SessionStore};
use page_test_support::{ElementInit, add_element, blank_page, rect};
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use url::Url;

fn setup(url: &str) -> (Bus, Bridge, Document, core_types::DomKey) {
    let bus = Bus::new();
    let bridge = Bridge::new(bus.evt_tx.clone());
    let (doc, body) = blank_page(url);
    (bus, bridge, doc, body)
}

fn drain(bus: &Bus) -> Vec<Value> {
    bus.evt_rx.try_iter().collect()
}

fn kinds(events: &[Value]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| e["message"].as_str().map(str::to_string))
        .collect()
}

fn host(message: &str) -> Value {
    json!({"from": "tether", "message": message})
}

#[test]
fn handshake_flips_supervision_and_replies_hello() {
    let (bus, mut bridge, mut doc, _body) = setup("http://localhost/");
    assert!(!bridge.is_supervised());

    bridge.handle_message(&host("hello"), &mut doc, None);
    assert!(bridge.is_supervised());

    let events = drain(&bus);
    assert_eq!(kinds(&events), vec!["hello"]);
    assert_eq!(events[0]["from"], "tetherPage");
}

#[test]
fn handshake_options_merge_into_defaults() {
    let (_bus, mut bridge, mut doc, _body) = setup("http://localhost/");
    assert!(bridge.options().source_lines);

    let raw = json!({
        "from": "tether",
        "message": "hello",
        "options": {"source_lines": false},
    });
    bridge.handle_message(&raw, &mut doc, None);
    assert!(!bridge.options().source_lines);

    // a second handshake without options keeps the negotiated value
    bridge.handle_message(&host("hello"), &mut doc, None);
    assert!(!bridge.options().source_lines);
}

#[test]
fn foreign_and_unknown_messages_are_ignored() {
    let (bus, mut bridge, mut doc, _body) = setup("http://localhost/");
    bridge.handle_message(&json!({"from": "ads", "message": "hello"}), &mut doc, None);
    bridge.handle_message(&host("self_destruct"), &mut doc, None);
    bridge.handle_message(&json!(42), &mut doc, None);
    assert!(drain(&bus).is_empty());
    assert!(!bridge.is_supervised());
}

#[test]
fn snapshot_request_produces_the_wire_envelope() {
    let (bus, mut bridge, mut doc, body) = setup("http://localhost/teams");
    add_element(
        &mut doc,
        body,
        ElementInit {
            class: Some("a"),
            rect: rect(10.0, 20.0, 120.0, 40.0),
            ..ElementInit::default()
        },
    );
    doc.set_scroll_dimensions(800.0, 1600.0);

    bridge.handle_message(&host("request_snap"), &mut doc, None);
    let events = drain(&bus);
    assert_eq!(kinds(&events), vec!["snap"]);

    let data = &events[0]["data"];
    assert_eq!(data["route"], "/teams");
    assert_eq!(data["scrollHeight"], 1600.0);
    assert_eq!(data["from_observer"], false);

    let div = &data["children"][0]["children"][0]["children"][0];
    assert_eq!(div["tag"], "div");
    assert_eq!(div["class"], "a");
    assert!(div["elid"].as_u64().is_some());
    assert_eq!(div["rect"]["w"], 120.0);
    assert_eq!(div["children"], json!([]));
}

#[test]
fn mutation_bursts_coalesce_into_one_snapshot() {
    let (bus, mut bridge, mut doc, body) = setup("http://localhost/");
    add_element(&mut doc, body, ElementInit::default());
    let t0 = Instant::now();

    bridge.handle_message(&host("enable_observer"), &mut doc, None);
    assert!(bridge.is_observer_enabled());

    for i in 0..8 {
        let now = t0 + Duration::from_millis(i * 100);
        bridge.on_mutation(now);
        bridge.tick(&mut doc, None, now);
    }
    assert!(drain(&bus).is_empty());

    let last = t0 + Duration::from_millis(700);
    bridge.tick(&mut doc, None, last + Duration::from_millis(499));
    assert!(drain(&bus).is_empty());

    bridge.tick(&mut doc, None, last + DEBOUNCE_WINDOW);
    let events = drain(&bus);
    assert_eq!(kinds(&events), vec!["snap"]);
    assert_eq!(events[0]["data"]["from_observer"], true);

    // quiet period: no further snapshots
    bridge.tick(&mut doc, None, last + DEBOUNCE_WINDOW * 4);
    assert!(drain(&bus).is_empty());
}

#[test]
fn explicit_snapshot_bypasses_and_clears_the_debounce() {
    let (bus, mut bridge, mut doc, _body) = setup("http://localhost/");
    let t0 = Instant::now();

    bridge.handle_message(&host("enable_observer"), &mut doc, None);
    bridge.on_mutation(t0);
    bridge.handle_message(&host("request_snap"), &mut doc, None);

    let events = drain(&bus);
    assert_eq!(kinds(&events), vec!["snap"]);
    assert_eq!(events[0]["data"]["from_observer"], false);

    // the pending debounced snapshot was superseded
    bridge.tick(&mut doc, None, t0 + DEBOUNCE_WINDOW * 2);
    assert!(drain(&bus).is_empty());
}

#[test]
fn mutations_while_disabled_do_not_snapshot() {
    let (bus, mut bridge, mut doc, _body) = setup("http://localhost/");
    let t0 = Instant::now();

    bridge.on_mutation(t0);
    bridge.tick(&mut doc, None, t0 + DEBOUNCE_WINDOW * 2);
    assert!(drain(&bus).is_empty());

    // disabling drops a pending debounced snapshot too
    bridge.handle_message(&host("enable_observer"), &mut doc, None);
    bridge.on_mutation(t0);
    bridge.handle_message(&host("disable_observer"), &mut doc, None);
    assert!(!bridge.is_observer_enabled());
    bridge.tick(&mut doc, None, t0 + DEBOUNCE_WINDOW * 2);
    assert!(drain(&bus).is_empty());
}

#[test]
fn observer_toggling_is_idempotent() {
    let (_bus, mut bridge, mut doc, _body) = setup("http://localhost/");
    bridge.handle_message(&host("enable_observer"), &mut doc, None);
    bridge.handle_message(&host("enable_observer"), &mut doc, None);
    assert!(bridge.is_observer_enabled());
    bridge.handle_message(&host("disable_observer"), &mut doc, None);
    bridge.handle_message(&host("disable_observer"), &mut doc, None);
    assert!(!bridge.is_observer_enabled());
}

#[test]
fn route_changes_are_reported_once_per_change() {
    let (bus, mut bridge, mut doc, _body) = setup("http://localhost/a");
    let t0 = Instant::now();

    bridge.handle_message(&host("hello"), &mut doc, None);
    drain(&bus);

    // first poll interval reports the current route once
    bridge.tick(&mut doc, None, t0);
    assert!(drain(&bus).is_empty());
    bridge.tick(&mut doc, None, t0 + ROUTE_POLL_PERIOD);
    let events = drain(&bus);
    assert_eq!(kinds(&events), vec!["route_change"]);
    assert_eq!(events[0]["data"], "/a");

    // a client-side navigation is reported exactly once
    doc.navigate(Url::parse("http://localhost/b").unwrap());
    bridge.tick(&mut doc, None, t0 + ROUTE_POLL_PERIOD * 2);
    let events = drain(&bus);
    assert_eq!(kinds(&events), vec!["route_change"]);
    assert_eq!(events[0]["data"], "/b");

    bridge.tick(&mut doc, None, t0 + ROUTE_POLL_PERIOD * 3);
    assert!(drain(&bus).is_empty());
}

#[test]
fn route_poll_is_inert_while_unsupervised() {
    let (bus, mut bridge, mut doc, _body) = setup("http://localhost/a");
    let t0 = Instant::now();
    bridge.tick(&mut doc, None, t0);
    bridge.tick(&mut doc, None, t0 + ROUTE_POLL_PERIOD * 2);
    doc.navigate(Url::parse("http://localhost/b").unwrap());
    bridge.tick(&mut doc, None, t0 + ROUTE_POLL_PERIOD * 3);
    assert!(drain(&bus).is_empty());
}

#[test]
fn scroll_command_neutralizes_smooth_scrolling() {
    let (_bus, mut bridge, mut doc, _body) = setup("http://localhost/");
    doc.set_scroll_behavior(ScrollBehavior::Smooth);

    let raw = json!({
        "from": "tether",
        "message": "scroll",
        "scrollTop": 300.0,
        "scrollLeft": 12.0,
    });
    bridge.handle_message(&raw, &mut doc, None);
    assert_eq!(doc.scroll().top, 300.0);
    assert_eq!(doc.scroll().left, 12.0);
    assert_eq!(doc.scroll_behavior(), ScrollBehavior::Auto);
}

#[test]
fn sync_scroll_echoes_current_offsets() {
    let (bus, mut bridge, mut doc, _body) = setup("http://localhost/");
    doc.scroll_to(42.0, 7.0);
    bridge.handle_message(&host("request_sync_scroll"), &mut doc, None);

    let events = drain(&bus);
    assert_eq!(kinds(&events), vec!["sync_scroll"]);
    assert_eq!(events[0]["data"]["scrollTop"], 42.0);
    assert_eq!(events[0]["data"]["scrollLeft"], 7.0);
}

#[test]
fn debug_snapshot_reports_the_protocol_version() {
    let (bus, mut bridge, mut doc, _body) = setup("http://localhost/");
    bridge.handle_message(&host("request_debug"), &mut doc, None);
    let events = drain(&bus);
    assert_eq!(kinds(&events), vec!["debug"]);
    assert_eq!(events[0]["data"]["version"], VERSION);
}

#[test]
fn scroll_persists_across_reload_while_watching() {
    let mut store = MemoryStore::new();

    // first page load, watcher active, user scrolled down
    let (_bus, mut bridge, mut doc, _body) = setup("http://localhost/");
    bridge.handle_message(&host("enable_observer"), &mut doc, None);
    doc.scroll_to(500.0, 0.0);
    bridge.on_unload(&doc, &mut store);
    assert_eq!(store.get(SCROLL_KEY), Some("500".to_string()));

    // reload: fresh bridge and document
    let (_bus2, mut bridge2, mut doc2, _body2) = setup("http://localhost/");
    doc2.set_scroll_behavior(ScrollBehavior::Smooth);
    let t1 = Instant::now();
    bridge2.on_ready(&store, t1);

    bridge2.tick(&mut doc2, None, t1 + RESTORE_DELAY - Duration::from_millis(1));
    assert_eq!(doc2.scroll().top, 0.0);

    bridge2.tick(&mut doc2, None, t1 + RESTORE_DELAY);
    assert_eq!(doc2.scroll().top, 500.0);
    assert_eq!(doc2.scroll_behavior(), ScrollBehavior::Auto);
    // the restore path leaves the stored value in place
    assert_eq!(store.get(SCROLL_KEY), Some("500".to_string()));
}

#[test]
fn unload_without_watcher_clears_the_stored_offset() {
    let mut store = MemoryStore::new();
    store.set(SCROLL_KEY, "500".to_string());

    let (_bus, bridge, mut doc, _body) = setup("http://localhost/");
    doc.scroll_to(250.0, 0.0);
    bridge.on_unload(&doc, &mut store);
    assert_eq!(store.get(SCROLL_KEY), None);

    // next load finds nothing to restore
    let (_bus2, mut bridge2, mut doc2, _body2) = setup("http://localhost/");
    let t1 = Instant::now();
    bridge2.on_ready(&store, t1);
    bridge2.tick(&mut doc2, None, t1 + RESTORE_DELAY * 2);
    assert_eq!(doc2.scroll().top, 0.0);
}

#[test]
fn identifiers_stay_stable_and_are_never_reassigned() {
    let (bus, mut bridge, mut doc, body) = setup("http://localhost/");
    let div = add_element(
        &mut doc,
        body,
        ElementInit {
            rect: rect(0.0, 0.0, 10.0, 10.0),
            ..ElementInit::default()
        },
    );

    bridge.handle_message(&host("request_snap"), &mut doc, None);
    let first = drain(&bus);
    let elid = first[0]["data"]["children"][0]["children"][0]["children"][0]["elid"]
        .as_u64()
        .unwrap();

    bridge.handle_message(&host("request_snap"), &mut doc, None);
    let second = drain(&bus);
    let again = second[0]["data"]["children"][0]["children"][0]["children"][0]["elid"]
        .as_u64()
        .unwrap();
    assert_eq!(elid, again);

    let id = identity::ElementId::from_raw(elid);
    assert_eq!(bridge.element_by_id(&doc, id), Some(div));

    // once detached the identifier is orphaned, not recycled
    doc.detach(div);
    assert_eq!(bridge.element_by_id(&doc, id), None);

    let replacement = add_element(
        &mut doc,
        body,
        ElementInit {
            rect: rect(0.0, 0.0, 10.0, 10.0),
            ..ElementInit::default()
        },
    );
    bridge.handle_message(&host("request_snap"), &mut doc, None);
    let third = drain(&bus);
    let new_elid = third[0]["data"]["children"][0]["children"][0]["children"][0]["elid"]
        .as_u64()
        .unwrap();
    assert_ne!(new_elid, elid);
    let _ = replacement;
}
