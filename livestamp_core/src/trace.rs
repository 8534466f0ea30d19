// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics for the watchers and the live-timer controller.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! engine calls at each step. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. The engine arms it only
//! when [`Config::debug`](crate::config::Config::debug) is set; otherwise
//! every call is a single `Option` branch. Tracing never affects control
//! flow.

use chrono::{DateTime, FixedOffset};

use crate::controller::Anchor;
use crate::dom::WatchRole;
use crate::engine::Discovery;
use crate::metadata::BroadcastState;
use crate::overlay::Label;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// What the metadata reader produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataOutcome {
    /// A payload was parsed.
    Found,
    /// No payload element, or an empty one.
    Missing,
    /// The payload did not deserialize.
    Invalid,
}

impl MetadataOutcome {
    /// Returns a short lowercase name for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::Missing => "missing",
            Self::Invalid => "invalid",
        }
    }
}

/// Emitted after each metadata read.
#[derive(Clone, Copy, Debug)]
pub struct MetadataEvent<'a> {
    /// Reader outcome.
    pub outcome: MetadataOutcome,
    /// Video title, when found.
    pub name: Option<&'a str>,
    /// Deserialization error text, when invalid.
    pub error: Option<&'a str>,
}

/// Emitted once the broadcast state has been classified.
#[derive(Clone, Copy, Debug)]
pub struct BroadcastEvent {
    /// Classified state.
    pub state: BroadcastState,
    /// Publication start, if the video was ever live.
    pub start: Option<DateTime<FixedOffset>>,
}

/// Emitted each time the original-time label is rewritten.
#[derive(Clone, Copy, Debug)]
pub struct OriginalTimeEvent<'a> {
    /// The elapsed-time text read from the player.
    pub elapsed: &'a str,
    /// The computed wall-clock instant.
    pub at: DateTime<FixedOffset>,
    /// The label text written.
    pub label: &'a str,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives diagnostic events from the engine.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when the bootstrap phase starts.
    fn on_init(&mut self) {}

    /// Called when the metadata container has been located.
    fn on_container_found(&mut self, discovery: Discovery) {
        _ = discovery;
    }

    /// Called after a subscription is created.
    fn on_watch_start(&mut self, role: WatchRole) {
        _ = role;
    }

    /// Called after a subscription is disconnected.
    fn on_watch_end(&mut self, role: WatchRole) {
        _ = role;
    }

    /// Called at the start of every live-timer setup.
    fn on_setup(&mut self) {}

    /// Called after the metadata reader ran.
    fn on_metadata(&mut self, e: &MetadataEvent<'_>) {
        _ = e;
    }

    /// Called when a native time-display anchor is not rendered yet.
    fn on_anchor_missing(&mut self, anchor: Anchor) {
        _ = anchor;
    }

    /// Called when an overlay label is inserted into the page.
    fn on_label_attached(&mut self, label: Label) {
        _ = label;
    }

    /// Called once the broadcast state is known.
    fn on_broadcast(&mut self, e: &BroadcastEvent) {
        _ = e;
    }

    /// Called when the original-time label is rewritten.
    fn on_original_time(&mut self, e: &OriginalTimeEvent<'_>) {
        _ = e;
    }

    /// Called when a notification arrives for a role with no live subscription.
    fn on_delivery_ignored(&mut self, role: WatchRole) {
        _ = role;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// Each method checks the inner `Option` (one branch) before dispatching to
/// the sink.
pub struct Tracer<'a> {
    sink: Option<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("armed", &self.sink.is_some())
            .finish()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        Self { sink: Some(sink) }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self { sink: None }
    }

    /// Creates a tracer that dispatches to `sink` only when `enabled`.
    #[inline]
    #[must_use]
    pub fn armed_if(enabled: bool, sink: &'a mut dyn TraceSink) -> Self {
        if enabled { Self::new(sink) } else { Self::none() }
    }

    /// Returns `true` if events reach a sink.
    ///
    /// Lets callers skip building expensive event payloads.
    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.sink.is_some()
    }

    /// Emits an init event.
    #[inline]
    pub fn init(&mut self) {
        if let Some(s) = &mut self.sink {
            s.on_init();
        }
    }

    /// Emits a container-found event.
    #[inline]
    pub fn container_found(&mut self, discovery: Discovery) {
        if let Some(s) = &mut self.sink {
            s.on_container_found(discovery);
        }
    }

    /// Emits a watch-start event.
    #[inline]
    pub fn watch_start(&mut self, role: WatchRole) {
        if let Some(s) = &mut self.sink {
            s.on_watch_start(role);
        }
    }

    /// Emits a watch-end event.
    #[inline]
    pub fn watch_end(&mut self, role: WatchRole) {
        if let Some(s) = &mut self.sink {
            s.on_watch_end(role);
        }
    }

    /// Emits a setup event.
    #[inline]
    pub fn setup(&mut self) {
        if let Some(s) = &mut self.sink {
            s.on_setup();
        }
    }

    /// Emits a [`MetadataEvent`].
    #[inline]
    pub fn metadata(&mut self, e: &MetadataEvent<'_>) {
        if let Some(s) = &mut self.sink {
            s.on_metadata(e);
        }
    }

    /// Emits an anchor-missing event.
    #[inline]
    pub fn anchor_missing(&mut self, anchor: Anchor) {
        if let Some(s) = &mut self.sink {
            s.on_anchor_missing(anchor);
        }
    }

    /// Emits a label-attached event.
    #[inline]
    pub fn label_attached(&mut self, label: Label) {
        if let Some(s) = &mut self.sink {
            s.on_label_attached(label);
        }
    }

    /// Emits a [`BroadcastEvent`].
    #[inline]
    pub fn broadcast(&mut self, e: &BroadcastEvent) {
        if let Some(s) = &mut self.sink {
            s.on_broadcast(e);
        }
    }

    /// Emits an [`OriginalTimeEvent`].
    #[inline]
    pub fn original_time(&mut self, e: &OriginalTimeEvent<'_>) {
        if let Some(s) = &mut self.sink {
            s.on_original_time(e);
        }
    }

    /// Emits a delivery-ignored event.
    #[inline]
    pub fn delivery_ignored(&mut self, role: WatchRole) {
        if let Some(s) = &mut self.sink {
            s.on_delivery_ignored(role);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct RoleSink {
        started: Vec<WatchRole>,
        setups: u32,
    }

    impl TraceSink for RoleSink {
        fn on_watch_start(&mut self, role: WatchRole) {
            self.started.push(role);
        }

        fn on_setup(&mut self) {
            self.setups += 1;
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_init();
        sink.on_watch_start(WatchRole::Metadata);
        sink.on_anchor_missing(Anchor::TimeWrapper);
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_armed());
        tracer.setup();
        tracer.watch_end(WatchRole::Bootstrap);
    }

    #[test]
    fn tracer_dispatches_to_sink() {
        let mut sink = RoleSink::default();
        let mut tracer = Tracer::new(&mut sink);
        tracer.watch_start(WatchRole::ElapsedTime);
        tracer.setup();
        tracer.setup();
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.started, &[WatchRole::ElapsedTime]);
        assert_eq!(sink.setups, 2);
    }

    #[test]
    fn armed_if_respects_flag() {
        let mut sink = RoleSink::default();
        let mut tracer = Tracer::armed_if(false, &mut sink);
        tracer.setup();
        drop(tracer);
        assert_eq!(sink.setups, 0);

        let mut tracer = Tracer::armed_if(true, &mut sink);
        assert!(tracer.is_armed());
        tracer.setup();
        drop(tracer);
        assert_eq!(sink.setups, 1);
    }
}
