// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stream metadata model and reader.
//!
//! The host page embeds a JSON description of the video inside the metadata
//! container. Only the first entry of `publication` matters to the engine:
//! it is the live-broadcast window. The remaining fields are carried for
//! diagnostics.
//!
//! Metadata is re-read on every container mutation and never cached: the
//! container may be mid-update, so a missing or malformed payload simply
//! means "not yet available".

use alloc::string::{String, ToString as _};
use alloc::vec::Vec;

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::dom::{Dom, Lookup, Selector};
use crate::trace::{MetadataEvent, MetadataOutcome, Tracer};

/// Structured description of a video, as embedded in the page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamMetadata {
    /// Upload date, as published (unparsed).
    #[serde(default)]
    pub upload_date: Option<String>,
    /// Live-broadcast windows. Absent for videos that were never live.
    #[serde(default)]
    pub publication: Option<Vec<Publication>>,
    /// Video title.
    #[serde(default)]
    pub name: Option<String>,
    /// Video description.
    #[serde(default)]
    pub description: Option<String>,
    /// ISO 8601 duration string (e.g. `PT3723S`).
    #[serde(default)]
    pub duration: Option<String>,
    /// Embeddable player URL.
    #[serde(default)]
    pub embed_url: Option<String>,
    /// Category.
    #[serde(default)]
    pub genre: Option<String>,
    /// Channel name.
    #[serde(default)]
    pub author: Option<String>,
    /// View count, as published.
    #[serde(default)]
    pub interaction_count: Option<String>,
    /// Thumbnail URLs.
    #[serde(default)]
    pub thumbnail_url: Vec<String>,
}

/// A live-broadcast window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    /// Whether the host flags this as a live broadcast.
    #[serde(default)]
    pub is_live_broadcast: bool,
    /// When the broadcast started (or is scheduled to start).
    pub start_date: DateTime<FixedOffset>,
    /// When the broadcast ended. Absent while live or scheduled.
    #[serde(default)]
    pub end_date: Option<DateTime<FixedOffset>>,
}

/// Broadcast state derived from [`StreamMetadata`] on every read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BroadcastState {
    /// No publication: the video was never live.
    NotLive,
    /// Publication without an end date: live now, or scheduled.
    LiveOrScheduled,
    /// Publication with an end date: an archived broadcast.
    Ended,
}

impl BroadcastState {
    /// Returns a short label for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotLive => "not-live",
            Self::LiveOrScheduled => "live-or-scheduled",
            Self::Ended => "ended",
        }
    }
}

impl StreamMetadata {
    /// Returns the first publication window, if the video was ever live.
    #[must_use]
    pub fn live_window(&self) -> Option<&Publication> {
        self.publication.as_deref().and_then(<[Publication]>::first)
    }

    /// Classifies the broadcast from the first publication window.
    #[must_use]
    pub fn broadcast_state(&self) -> BroadcastState {
        match self.live_window() {
            None => BroadcastState::NotLive,
            Some(p) if p.end_date.is_none() => BroadcastState::LiveOrScheduled,
            Some(_) => BroadcastState::Ended,
        }
    }
}

/// Deserializes a metadata payload.
pub fn parse_metadata(payload: &str) -> Result<StreamMetadata, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Reads the metadata payload embedded in `container`.
///
/// The payload is the text of the first `payload_tag` element inside the
/// container. Returns [`Lookup::NotYetAvailable`] when that element is
/// missing or empty and [`Lookup::Invalid`] when its text does not
/// deserialize. Never panics.
pub fn read_metadata<D: Dom + ?Sized>(
    dom: &D,
    container: &D::Node,
    payload_tag: &str,
    tracer: &mut Tracer<'_>,
) -> Lookup<StreamMetadata> {
    let text = dom
        .locate(Some(container), &Selector::Tag(payload_tag))
        .and_then(|script| dom.text_content(&script))
        .filter(|text| !text.is_empty());
    let Some(text) = text else {
        tracer.metadata(&MetadataEvent {
            outcome: MetadataOutcome::Missing,
            name: None,
            error: None,
        });
        return Lookup::NotYetAvailable;
    };

    match parse_metadata(&text) {
        Ok(metadata) => {
            tracer.metadata(&MetadataEvent {
                outcome: MetadataOutcome::Found,
                name: metadata.name.as_deref(),
                error: None,
            });
            Lookup::Found(metadata)
        }
        Err(err) => {
            if tracer.is_armed() {
                let error = err.to_string();
                tracer.metadata(&MetadataEvent {
                    outcome: MetadataOutcome::Invalid,
                    name: None,
                    error: Some(&error),
                });
            }
            Lookup::Invalid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDom;
    use crate::trace::NoopSink;

    const ARCHIVED: &str = r#"{
        "@context": "https://schema.org",
        "@type": "VideoObject",
        "name": "Launch stream",
        "duration": "PT3723S",
        "uploadDate": "2024-03-01T09:00:00+09:00",
        "thumbnailUrl": ["https://i.example/1.jpg"],
        "publication": [{
            "@type": "BroadcastEvent",
            "isLiveBroadcast": true,
            "startDate": "2024-03-01T10:00:00+09:00",
            "endDate": "2024-03-01T11:02:03+09:00"
        }]
    }"#;

    fn container_with(payload: Option<&str>) -> (MemoryDom, crate::memory::NodeId) {
        let mut dom = MemoryDom::new();
        let container = dom.create_element("div");
        dom.set_id(container, "microformat");
        let body = dom.body();
        dom.append_child(&body, &container);
        if let Some(payload) = payload {
            let script = dom.create_element("script");
            dom.append_child(&container, &script);
            dom.set_text_content(&script, payload);
        }
        (dom, container)
    }

    fn read(dom: &MemoryDom, container: crate::memory::NodeId) -> Lookup<StreamMetadata> {
        let mut sink = NoopSink;
        read_metadata(dom, &container, "SCRIPT", &mut Tracer::new(&mut sink))
    }

    #[test]
    fn parses_archived_broadcast() {
        let metadata = parse_metadata(ARCHIVED).unwrap();
        assert_eq!(metadata.name.as_deref(), Some("Launch stream"));
        assert_eq!(metadata.thumbnail_url.len(), 1);
        let window = metadata.live_window().unwrap();
        assert!(window.is_live_broadcast);
        assert_eq!(
            window.start_date,
            DateTime::parse_from_rfc3339("2024-03-01T01:00:00Z").unwrap()
        );
        assert_eq!(metadata.broadcast_state(), BroadcastState::Ended);
    }

    #[test]
    fn classifies_broadcast_state() {
        let never_live = parse_metadata(r#"{"uploadDate":"2024-01-01"}"#).unwrap();
        assert_eq!(never_live.broadcast_state(), BroadcastState::NotLive);

        let empty_list = parse_metadata(r#"{"publication":[]}"#).unwrap();
        assert_eq!(empty_list.broadcast_state(), BroadcastState::NotLive);

        let live = parse_metadata(
            r#"{"publication":[{"isLiveBroadcast":true,"startDate":"2024-01-01T00:00:00Z"}]}"#,
        )
        .unwrap();
        assert_eq!(live.broadcast_state(), BroadcastState::LiveOrScheduled);
    }

    #[test]
    fn rejects_unparseable_start_date() {
        assert!(parse_metadata(r#"{"publication":[{"startDate":"yesterday"}]}"#).is_err());
    }

    #[test]
    fn reader_returns_found_for_valid_payload() {
        let (dom, container) = container_with(Some(ARCHIVED));
        let metadata = read(&dom, container).found().unwrap();
        assert_eq!(metadata.broadcast_state(), BroadcastState::Ended);
    }

    #[test]
    fn reader_without_script_is_not_yet_available() {
        let (dom, container) = container_with(None);
        assert_eq!(read(&dom, container), Lookup::NotYetAvailable);
    }

    #[test]
    fn reader_with_empty_script_is_not_yet_available() {
        let (dom, container) = container_with(Some(""));
        assert_eq!(read(&dom, container), Lookup::NotYetAvailable);
    }

    #[test]
    fn reader_with_malformed_json_is_invalid() {
        let (dom, container) = container_with(Some("{\"publication\": ["));
        assert_eq!(read(&dom, container), Lookup::Invalid);
    }
}
