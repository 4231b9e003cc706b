//! List demo - remove, insert and reorder items of an animated list

use animate::{AnimateOptions, AnimationRegistry, Easing};
use dom::serializer::SerializerConfig;
use dom::{DomSerializer, DomService};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let mut service = DomService::new();
    let list = service.parse_tree(&json!({
        "tag": "ul",
        "id": "list",
        "children": [
            { "tag": "li", "id": "a", "style": { "height": 40 }, "children": [ { "text": "A" } ] },
            { "tag": "li", "id": "b", "style": { "height": 40 }, "children": [ { "text": "B" } ] },
            { "tag": "li", "id": "c", "style": { "height": 40 }, "children": [ { "text": "C" } ] }
        ]
    }))?;

    let options = AnimateOptions::default()
        .with_duration(300.0)
        .with_easing("cubic-bezier(0.2, 0, 0, 1)".parse::<Easing>()?);

    let mut registry = AnimationRegistry::new();
    let mut event_rx = registry.attach(&mut service, list, options)?.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            println!("Event: {:?}", event);
        }
    });

    let serializer = DomSerializer::with_config(SerializerConfig {
        include_layout: true,
        ..Default::default()
    });

    // Remove the middle item
    let b = service.find_by_id("b").ok_or("item b missing")?;
    service.remove(b)?;
    registry.pump(&mut service);
    println!("Exiting:\n{}", serializer.serialize(service.arena(), list)?);

    service.advance(300.0);
    registry.pump(&mut service);
    println!("Settled:\n{}", serializer.serialize(service.arena(), list)?);

    // Insert a new item at the front
    let d = service.parse_fragment(&json!({
        "tag": "li",
        "id": "d",
        "style": { "height": 40 },
        "children": [ { "text": "D" } ]
    }))?;
    let first = service.children(list).first().copied();
    service.insert_before(list, d, first)?;
    registry.pump(&mut service);

    // Move the last item to the front
    if let Some(&last) = service.children(list).last() {
        let first = service.children(list).first().copied();
        service.insert_before(list, last, first)?;
        registry.pump(&mut service);
    }

    service.advance(450.0);
    registry.pump(&mut service);
    println!("Final:\n{}", serializer.serialize(service.arena(), list)?);

    // Let the event printer catch up
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

    Ok(())
}
