//=============================================================================
// File: src/components/request_map.rs
//=============================================================================
use api::map::MapView;
use dioxus::prelude::*;

/// Draws a [`MapView`]: an OpenStreetMap embed of the region with a pin over
/// every marker that falls inside it, plus a legend listing all markers.
#[component]
pub fn RequestMap(view: MapView) -> Element {
    let pins: Vec<(String, String)> = view
        .markers
        .iter()
        .filter_map(|marker| {
            let (left, top) = view.project(marker.coordinate)?;
            Some((
                marker.title.clone(),
                format!("left: {left:.3}%; top: {top:.3}%;"),
            ))
        })
        .collect();

    let legend: Vec<(String, String)> = view
        .markers
        .iter()
        .map(|marker| {
            let c = marker.coordinate;
            (
                marker.title.clone(),
                format!("{:.5}, {:.5}", c.latitude, c.longitude),
            )
        })
        .collect();

    rsx! {
        div {
            class: "map-container",
            iframe {
                class: "map-frame",
                title: "Map",
                src: "{view.embed_url()}",
            }
            for (title, style) in pins {
                div {
                    key: "{title}",
                    class: "map-marker",
                    style: "{style}",
                    title: "{title}",
                    span { class: "map-marker-label", "{title}" }
                }
            }
        }
        ul {
            class: "map-legend",
            for (title, position) in legend {
                li {
                    key: "{title}",
                    strong { "{title}: " }
                    "{position}"
                }
            }
        }
    }
}
