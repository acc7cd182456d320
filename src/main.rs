use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use bridge::Bridge;
use bus::Bus;
use fiber::{DebugSource, ElementType, FiberArena, FiberNode, PropBlob, StateNode, probe};
use page::{Document, Expando, Rect};
use serde_json::json;
use url::Url;

/// Demo driver: builds a small supervised page with one framework mount,
/// performs the handshake, requests a snapshot, and prints the envelopes.
fn main() {
    env_logger::init();

    let Ok(location) = Url::parse("http://localhost:3000/teams?sort=rank") else {
        log::error!("demo location failed to parse");
        return;
    };
    let mut doc = Document::new(location);
    doc.set_scroll_dimensions(1280.0, 2400.0);

    let html = doc.create_element(doc.root(), "html");
    doc.create_element(html, "head");
    let body = doc.create_element(html, "body");
    let root_el = doc.create_element(body, "div");
    let card_el = doc.create_element(root_el, "section");
    doc.set_attr(card_el, "class", "team-card");

    if let Some(el) = doc.element_mut(body) {
        el.rect = Rect::new(0.0, 0.0, 1280.0, 2400.0);
    }
    if let Some(el) = doc.element_mut(root_el) {
        el.rect = Rect::new(0.0, 0.0, 1280.0, 2400.0);
    }
    if let Some(el) = doc.element_mut(card_el) {
        el.rect = Rect::new(40.0, 120.0, 320.0, 180.0);
    }

    // the framework side: App -> section, mounted at the root div
    let mut fibers = FiberArena::new();
    let host = fibers.insert(FiberNode {
        element_type: Some(ElementType::Host("section".to_string())),
        state_node: Some(StateNode::Element(card_el)),
        props: vec![
            ("team".to_string(), PropBlob::Str("Rovers".to_string())),
            ("rank".to_string(), PropBlob::Num(2.0)),
            ("onSelect".to_string(), PropBlob::Opaque),
        ],
        ..FiberNode::default()
    });
    let app = fibers.insert(FiberNode {
        element_type: Some(ElementType::Function("App".to_string())),
        child: Some(host),
        debug_source: Some(DebugSource {
            file: "src/app/page.tsx".to_string(),
            line: 14,
            column: 3,
        }),
        ..FiberNode::default()
    });
    let container = fibers.insert(FiberNode {
        state_node: Some(StateNode::Root { current: app }),
        ..FiberNode::default()
    });
    doc.set_expando(
        root_el,
        &format!("{}$demo", probe::CONTAINER_PREFIX),
        Expando::FiberRoot(container),
    );

    let bus = Bus::new();
    let mut bridge = Bridge::new(bus.evt_tx.clone());

    let hello = json!({"from": bus::HOST_TAG, "message": "hello"});
    bridge.handle_message(&hello, &mut doc, Some(&fibers));
    let request = json!({"from": bus::HOST_TAG, "message": "request_snap"});
    bridge.handle_message(&request, &mut doc, Some(&fibers));

    for event in bus.evt_rx.try_iter() {
        match serde_json::to_string_pretty(&event) {
            Ok(text) => println!("{text}"),
            Err(err) => log::error!("failed to render event: {err}"),
        }
    }
}
