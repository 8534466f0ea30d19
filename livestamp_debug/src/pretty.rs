// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use livestamp_core::controller::Anchor;
use livestamp_core::dom::WatchRole;
use livestamp_core::engine::Discovery;
use livestamp_core::overlay::Label;
use livestamp_core::trace::{BroadcastEvent, MetadataEvent, OriginalTimeEvent, TraceSink};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_init(&mut self) {
        let _ = writeln!(self.writer, "[init]");
    }

    fn on_container_found(&mut self, discovery: Discovery) {
        let _ = writeln!(self.writer, "[container] found={}", discovery.as_str());
    }

    fn on_watch_start(&mut self, role: WatchRole) {
        let _ = writeln!(self.writer, "[watch:start] role={}", role.as_str());
    }

    fn on_watch_end(&mut self, role: WatchRole) {
        let _ = writeln!(self.writer, "[watch:end] role={}", role.as_str());
    }

    fn on_setup(&mut self) {
        let _ = writeln!(self.writer, "[setup]");
    }

    fn on_metadata(&mut self, e: &MetadataEvent<'_>) {
        let _ = write!(self.writer, "[metadata] outcome={}", e.outcome.as_str());
        if let Some(name) = e.name {
            let _ = write!(self.writer, " name={name:?}");
        }
        if let Some(error) = e.error {
            let _ = write!(self.writer, " error={error:?}");
        }
        let _ = writeln!(self.writer);
    }

    fn on_anchor_missing(&mut self, anchor: Anchor) {
        let _ = writeln!(self.writer, "[anchor] missing={}", anchor.as_str());
    }

    fn on_label_attached(&mut self, label: Label) {
        let _ = writeln!(self.writer, "[label] attached={}", label.as_str());
    }

    fn on_broadcast(&mut self, e: &BroadcastEvent) {
        match e.start {
            Some(start) => {
                let _ = writeln!(
                    self.writer,
                    "[broadcast] state={} start={}",
                    e.state.as_str(),
                    start.to_rfc3339(),
                );
            }
            None => {
                let _ = writeln!(self.writer, "[broadcast] state={}", e.state.as_str());
            }
        }
    }

    fn on_original_time(&mut self, e: &OriginalTimeEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[original] elapsed={:?} at={} label={:?}",
            e.elapsed,
            e.at.to_rfc3339(),
            e.label,
        );
    }

    fn on_delivery_ignored(&mut self, role: WatchRole) {
        let _ = writeln!(self.writer, "[ignored] role={}", role.as_str());
    }
}
