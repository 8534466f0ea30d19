// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser console trace output.

use alloc::format;

use livestamp_core::controller::Anchor;
use livestamp_core::dom::WatchRole;
use livestamp_core::engine::Discovery;
use livestamp_core::overlay::Label;
use livestamp_core::trace::{BroadcastEvent, MetadataEvent, OriginalTimeEvent, TraceSink};
use wasm_bindgen::JsValue;

/// Writes one `console.log` line per event.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    fn log(line: &str) {
        web_sys::console::log_1(&JsValue::from_str(&format!("livestamp {line}")));
    }
}

impl TraceSink for ConsoleSink {
    fn on_init(&mut self) {
        Self::log("[init]");
    }

    fn on_container_found(&mut self, discovery: Discovery) {
        Self::log(&format!("[container] {}", discovery.as_str()));
    }

    fn on_watch_start(&mut self, role: WatchRole) {
        Self::log(&format!("[watch:start] {}", role.as_str()));
    }

    fn on_watch_end(&mut self, role: WatchRole) {
        Self::log(&format!("[watch:end] {}", role.as_str()));
    }

    fn on_setup(&mut self) {
        Self::log("[setup]");
    }

    fn on_metadata(&mut self, e: &MetadataEvent<'_>) {
        let mut line = format!("[metadata] {}", e.outcome.as_str());
        if let Some(name) = e.name {
            line.push_str(&format!(" name={name:?}"));
        }
        if let Some(error) = e.error {
            line.push_str(&format!(" error={error:?}"));
        }
        Self::log(&line);
    }

    fn on_anchor_missing(&mut self, anchor: Anchor) {
        Self::log(&format!("[anchor:missing] {}", anchor.as_str()));
    }

    fn on_label_attached(&mut self, label: Label) {
        Self::log(&format!("[label] {}", label.as_str()));
    }

    fn on_broadcast(&mut self, e: &BroadcastEvent) {
        let start = e.start.map(|s| s.to_rfc3339()).unwrap_or_default();
        Self::log(&format!("[broadcast] {} start={start}", e.state.as_str()));
    }

    fn on_original_time(&mut self, e: &OriginalTimeEvent<'_>) {
        Self::log(&format!(
            "[original] elapsed={:?} at={} label={:?}",
            e.elapsed,
            e.at.to_rfc3339(),
            e.label,
        ));
    }

    fn on_delivery_ignored(&mut self, role: WatchRole) {
        Self::log(&format!("[ignored] {}", role.as_str()));
    }
}
