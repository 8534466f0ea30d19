// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event recording and JSON export.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps an owned copy of every
//! event as a [`RecordedEvent`]. [`RecorderSink::export_json`] writes the log
//! as a JSON array, one object per event tagged by `"event"`.

use std::io::{self, Write};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use livestamp_core::controller::Anchor;
use livestamp_core::dom::WatchRole;
use livestamp_core::engine::Discovery;
use livestamp_core::overlay::Label;
use livestamp_core::trace::{BroadcastEvent, MetadataEvent, OriginalTimeEvent, TraceSink};

/// An owned trace event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RecordedEvent {
    /// The bootstrap phase started.
    Init,
    /// The metadata container was located.
    ContainerFound {
        /// `immediate`, `inserted` or `replaced`.
        discovery: &'static str,
    },
    /// A subscription was created.
    WatchStart {
        /// Subscription role.
        role: &'static str,
    },
    /// A subscription was disconnected.
    WatchEnd {
        /// Subscription role.
        role: &'static str,
    },
    /// A live-timer setup began.
    Setup,
    /// The metadata reader ran.
    Metadata {
        /// `found`, `missing` or `invalid`.
        outcome: &'static str,
        /// Video title.
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Deserialization error text.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// A native time-display anchor was not rendered.
    AnchorMissing {
        /// Which anchor.
        anchor: &'static str,
    },
    /// An overlay label was inserted.
    LabelAttached {
        /// Which label.
        label: &'static str,
    },
    /// The broadcast state was classified.
    Broadcast {
        /// Classified state.
        state: &'static str,
        /// Publication start.
        start: Option<DateTime<FixedOffset>>,
    },
    /// The original-time label was rewritten.
    OriginalTime {
        /// Elapsed-time text read from the player.
        elapsed: String,
        /// Computed wall-clock instant.
        at: DateTime<FixedOffset>,
        /// Label text written.
        label: String,
    },
    /// A notification arrived for a role without a live subscription.
    DeliveryIgnored {
        /// Subscription role.
        role: &'static str,
    },
}

/// A [`TraceSink`] that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events in order.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Discards all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Writes the recorded events as a pretty-printed JSON array.
    pub fn export_json(&self, writer: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(writer, &self.events)?;
        Ok(())
    }

    fn push(&mut self, event: RecordedEvent) {
        self.events.push(event);
    }
}

impl TraceSink for RecorderSink {
    fn on_init(&mut self) {
        self.push(RecordedEvent::Init);
    }

    fn on_container_found(&mut self, discovery: Discovery) {
        self.push(RecordedEvent::ContainerFound {
            discovery: discovery.as_str(),
        });
    }

    fn on_watch_start(&mut self, role: WatchRole) {
        self.push(RecordedEvent::WatchStart {
            role: role.as_str(),
        });
    }

    fn on_watch_end(&mut self, role: WatchRole) {
        self.push(RecordedEvent::WatchEnd {
            role: role.as_str(),
        });
    }

    fn on_setup(&mut self) {
        self.push(RecordedEvent::Setup);
    }

    fn on_metadata(&mut self, e: &MetadataEvent<'_>) {
        self.push(RecordedEvent::Metadata {
            outcome: e.outcome.as_str(),
            name: e.name.map(str::to_owned),
            error: e.error.map(str::to_owned),
        });
    }

    fn on_anchor_missing(&mut self, anchor: Anchor) {
        self.push(RecordedEvent::AnchorMissing {
            anchor: anchor.as_str(),
        });
    }

    fn on_label_attached(&mut self, label: Label) {
        self.push(RecordedEvent::LabelAttached {
            label: label.as_str(),
        });
    }

    fn on_broadcast(&mut self, e: &BroadcastEvent) {
        self.push(RecordedEvent::Broadcast {
            state: e.state.as_str(),
            start: e.start,
        });
    }

    fn on_original_time(&mut self, e: &OriginalTimeEvent<'_>) {
        self.push(RecordedEvent::OriginalTime {
            elapsed: e.elapsed.to_owned(),
            at: e.at,
            label: e.label.to_owned(),
        });
    }

    fn on_delivery_ignored(&mut self, role: WatchRole) {
        self.push(RecordedEvent::DeliveryIgnored {
            role: role.as_str(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livestamp_core::config::Config;
    use livestamp_core::dom::Dom;
    use livestamp_core::engine::LiveStamp;
    use livestamp_core::format::PatternFormatter;
    use livestamp_core::memory::MemoryDom;
    use serde_json::Value;

    const ENDED: &str = r#"{"name":"Archive","publication":[{"isLiveBroadcast":true,
        "startDate":"2024-03-01T10:00:00Z","endDate":"2024-03-01T12:00:00Z"}]}"#;

    /// Runs a cold page load of an ended broadcast and one elapsed reading.
    fn record_session() -> RecorderSink {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let wrapper = dom.create_element("div");
        dom.add_class(wrapper, "ytp-time-wrapper");
        let current = dom.create_element("span");
        dom.add_class(current, "ytp-time-current");
        dom.append_child(&wrapper, &current);
        dom.append_child(&body, &wrapper);
        let container = dom.create_element("div");
        dom.set_id(container, "microformat");
        let script = dom.create_element("script");
        dom.set_text_content(&script, ENDED);
        dom.append_child(&container, &script);
        dom.append_child(&body, &container);

        let mut engine = LiveStamp::with_sink(
            dom,
            Config::youtube().with_debug(true),
            PatternFormatter::utc(),
            RecorderSink::new(),
        );
        engine.init();
        engine.dom_mut().set_text_content(&current, "10:00");
        engine.pump();
        engine.shutdown();

        RecorderSink {
            events: engine.sink().events().to_vec(),
        }
    }

    #[test]
    fn cold_load_sequence() {
        let sink = record_session();
        let start = DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z").unwrap();
        assert_eq!(
            sink.events(),
            &[
                RecordedEvent::Init,
                RecordedEvent::ContainerFound {
                    discovery: "immediate"
                },
                RecordedEvent::WatchStart { role: "navigation" },
                RecordedEvent::WatchStart { role: "metadata" },
                RecordedEvent::Setup,
                RecordedEvent::Metadata {
                    outcome: "found",
                    name: Some("Archive".into()),
                    error: None,
                },
                RecordedEvent::LabelAttached { label: "start" },
                RecordedEvent::LabelAttached { label: "original" },
                RecordedEvent::Broadcast {
                    state: "ended",
                    start: Some(start),
                },
                RecordedEvent::WatchStart { role: "elapsed" },
                RecordedEvent::OriginalTime {
                    elapsed: "10:00".into(),
                    at: DateTime::parse_from_rfc3339("2024-03-01T10:10:00Z").unwrap(),
                    label: " ( 2024/03/01 (Fri) 10:10:00 )".into(),
                },
                RecordedEvent::WatchEnd { role: "navigation" },
                RecordedEvent::WatchEnd { role: "metadata" },
                RecordedEvent::WatchEnd { role: "elapsed" },
            ]
        );
    }

    #[test]
    fn export_produces_tagged_json() {
        let sink = record_session();
        let mut out = Vec::new();
        sink.export_json(&mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), sink.events().len());

        assert_eq!(parsed[0]["event"], "init");
        assert_eq!(parsed[1]["event"], "container_found");
        assert_eq!(parsed[1]["discovery"], "immediate");
        assert_eq!(parsed[5]["name"], "Archive");
        assert!(parsed[5].get("error").is_none());
        assert_eq!(parsed[10]["event"], "original_time");
        assert_eq!(parsed[10]["at"], "2024-03-01T10:10:00+00:00");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        RecorderSink::new().export_json(&mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
