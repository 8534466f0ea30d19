// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Live-timer controller.
//!
//! [`LiveTimer::setup`] runs on every trigger (the first metadata read and
//! every payload replacement after it). Each run starts from a clean slate:
//!
//! 1. **Reset**: clear both labels; disconnect the elapsed-time watcher.
//! 2. **Read** metadata from the container. Missing or invalid ⇒ stop.
//! 3. **Locate** the native time wrapper and current-time display. Missing ⇒
//!    stop; the page has not rendered the player controls yet.
//! 4. **Attach** the overlay labels (only those not already in the page).
//! 5. **Classify** the broadcast:
//!    - never live ⇒ stop with empty labels;
//!    - live or scheduled ⇒ write the start time of day and stop;
//!    - ended ⇒ step 6.
//! 6. **Watch** the current-time display. Each new reading is converted to
//!    elapsed seconds, offset from the broadcast start, and written to the
//!    original-time label by [`LiveTimer::on_time_update`].
//!
//! Every early stop is a normal, transient state of an asynchronously
//! rendering page and is reported as a [`SetupOutcome`], never as an error.
//! Because step 1 always runs first, repeated setups on unchanged input
//! converge to the same labels and at most one live watcher.

use alloc::string::String;

use chrono::{DateTime, FixedOffset};

use crate::config::Config;
use crate::dom::{Dom, Lookup, Mutation, ObserveOptions, Selector, WatchRole};
use crate::elapsed::elapsed_delta;
use crate::format::DateFormatter;
use crate::metadata::{BroadcastState, read_metadata};
use crate::overlay::{Overlay, original_label_text, start_label_text};
use crate::trace::{BroadcastEvent, OriginalTimeEvent, Tracer};

/// A native time-display node the controller anchors to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// The wrapper around the native time display.
    TimeWrapper,
    /// The current-time text inside the wrapper.
    CurrentTime,
}

impl Anchor {
    /// Returns a short lowercase name for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TimeWrapper => "time-wrapper",
            Self::CurrentTime => "current-time",
        }
    }
}

/// The located native time display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeAnchor<N> {
    /// The time-wrapper widget; overlay labels are inserted here.
    pub wrapper: N,
    /// The current-time display; the elapsed-time watcher observes it.
    pub current: N,
}

/// Finds the native time wrapper and the current-time display within it.
///
/// Returns the first anchor that is not rendered yet as the error.
pub fn locate_anchor<D: Dom + ?Sized>(
    dom: &D,
    config: &Config,
) -> Result<TimeAnchor<D::Node>, Anchor> {
    let wrapper = dom
        .locate(None, &Selector::Class(config.time_wrapper_class))
        .ok_or(Anchor::TimeWrapper)?;
    let current = dom
        .locate(Some(&wrapper), &Selector::Class(config.current_time_class))
        .ok_or(Anchor::CurrentTime)?;
    Ok(TimeAnchor { wrapper, current })
}

/// Where a [`LiveTimer::setup`] run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupOutcome {
    /// No payload in the container yet.
    MetadataMissing,
    /// The payload did not deserialize.
    MetadataInvalid,
    /// The native time display is not rendered yet.
    AnchorMissing(Anchor),
    /// The video was never live; labels stay empty.
    NotLive,
    /// Live or scheduled; only the start-time label is written.
    LiveOrScheduled {
        /// Broadcast start.
        start: DateTime<FixedOffset>,
    },
    /// Ended broadcast; the elapsed-time watcher is installed.
    Watching {
        /// Broadcast start the watcher offsets from.
        start: DateTime<FixedOffset>,
    },
}

impl SetupOutcome {
    /// Returns the broadcast state, if setup got far enough to classify it.
    #[must_use]
    pub const fn broadcast_state(&self) -> Option<BroadcastState> {
        match self {
            Self::MetadataMissing | Self::MetadataInvalid | Self::AnchorMissing(_) => None,
            Self::NotLive => Some(BroadcastState::NotLive),
            Self::LiveOrScheduled { .. } => Some(BroadcastState::LiveOrScheduled),
            Self::Watching { .. } => Some(BroadcastState::Ended),
        }
    }
}

#[derive(Debug)]
struct ElapsedWatch<S> {
    subscription: S,
    start: DateTime<FixedOffset>,
}

/// The live-timer state machine.
///
/// Owns the overlay labels and at most one elapsed-time subscription.
pub struct LiveTimer<D: Dom + ?Sized> {
    overlay: Overlay<D::Node>,
    watch: Option<ElapsedWatch<D::Subscription>>,
}

impl<D: Dom + ?Sized> core::fmt::Debug for LiveTimer<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LiveTimer")
            .field("overlay", &self.overlay)
            .field("watch", &self.watch)
            .finish()
    }
}

impl<D: Dom + ?Sized> LiveTimer<D> {
    /// Creates a controller and its two (detached) labels.
    pub fn new(dom: &mut D) -> Self {
        Self {
            overlay: Overlay::new(dom),
            watch: None,
        }
    }

    /// Returns the overlay labels.
    #[must_use]
    pub fn overlay(&self) -> &Overlay<D::Node> {
        &self.overlay
    }

    /// Returns `true` while an elapsed-time subscription is live.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    /// Returns the broadcast start the live watcher offsets from.
    #[must_use]
    pub fn watch_start(&self) -> Option<DateTime<FixedOffset>> {
        self.watch.as_ref().map(|w| w.start)
    }

    /// Clears both labels and disconnects the elapsed-time watcher.
    pub fn reset(&mut self, dom: &mut D, tracer: &mut Tracer<'_>) {
        self.overlay.reset(dom);
        if let Some(watch) = self.watch.take() {
            dom.disconnect(watch.subscription);
            tracer.watch_end(WatchRole::ElapsedTime);
        }
    }

    /// Rebuilds the overlay from the metadata in `container`.
    pub fn setup(
        &mut self,
        dom: &mut D,
        container: &D::Node,
        config: &Config,
        formatter: &dyn DateFormatter,
        tracer: &mut Tracer<'_>,
    ) -> SetupOutcome {
        tracer.setup();
        self.reset(dom, tracer);

        let metadata = match read_metadata(dom, container, config.payload_tag, tracer) {
            Lookup::Found(metadata) => metadata,
            Lookup::NotYetAvailable => return SetupOutcome::MetadataMissing,
            Lookup::Invalid => return SetupOutcome::MetadataInvalid,
        };

        let anchor = match locate_anchor(dom, config) {
            Ok(anchor) => anchor,
            Err(missing) => {
                tracer.anchor_missing(missing);
                return SetupOutcome::AnchorMissing(missing);
            }
        };

        self.overlay.ensure_attached(dom, &anchor.wrapper, tracer);

        let state = metadata.broadcast_state();
        let window = metadata.live_window().copied();
        tracer.broadcast(&BroadcastEvent {
            state,
            start: window.map(|p| p.start_date),
        });

        match (state, window) {
            (BroadcastState::LiveOrScheduled, Some(publication)) => {
                let start = publication.start_date;
                let text = start_label_text(&formatter.time_of_day(start));
                self.overlay.set_start_label(dom, &text);
                SetupOutcome::LiveOrScheduled { start }
            }
            (BroadcastState::Ended, Some(publication)) => {
                let start = publication.start_date;
                let subscription =
                    dom.observe(&anchor.current, ObserveOptions::CHILDREN, WatchRole::ElapsedTime);
                tracer.watch_start(WatchRole::ElapsedTime);
                self.watch = Some(ElapsedWatch {
                    subscription,
                    start,
                });
                SetupOutcome::Watching { start }
            }
            _ => SetupOutcome::NotLive,
        }
    }

    /// Handles a batch of changes to the current-time display.
    ///
    /// Each record's first added node carries the new reading; records with
    /// no added node are skipped. Returns the last label text written, or
    /// `None` if nothing was written.
    pub fn on_time_update(
        &mut self,
        dom: &mut D,
        batch: &[Mutation<D::Node>],
        formatter: &dyn DateFormatter,
        tracer: &mut Tracer<'_>,
    ) -> Option<String> {
        let Some(start) = self.watch_start() else {
            tracer.delivery_ignored(WatchRole::ElapsedTime);
            return None;
        };

        let mut written = None;
        for record in batch {
            let Some(reading) = record.added.first() else {
                continue;
            };
            let elapsed = dom.text_content(reading).unwrap_or_default();
            let Some(at) = elapsed_delta(&elapsed).and_then(|d| start.checked_add_signed(d))
            else {
                continue;
            };
            let label = original_label_text(&formatter.date_time(at));
            self.overlay.set_original_label(dom, &label);
            tracer.original_time(&OriginalTimeEvent {
                elapsed: &elapsed,
                at,
                label: &label,
            });
            written = Some(label);
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PatternFormatter;
    use crate::memory::{MemoryDom, NodeId};
    use crate::overlay::Label;
    use alloc::string::ToString as _;
    use alloc::vec;

    const ENDED: &str = r#"{"publication":[{"isLiveBroadcast":true,
        "startDate":"2024-03-01T10:00:00+00:00","endDate":"2024-03-01T12:00:00+00:00"}]}"#;
    const LIVE: &str =
        r#"{"publication":[{"isLiveBroadcast":true,"startDate":"2024-03-01T10:00:00+00:00"}]}"#;
    const NEVER_LIVE: &str = r#"{"uploadDate":"2024-03-01"}"#;

    struct Page {
        dom: MemoryDom,
        container: NodeId,
        script: NodeId,
        current: NodeId,
    }

    fn page(payload: &str) -> Page {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let container = dom.create_element("div");
        dom.set_id(container, "microformat");
        let script = dom.create_element("script");
        dom.append_child(&container, &script);
        dom.set_text_content(&script, payload);
        dom.append_child(&body, &container);

        let wrapper = dom.create_element("div");
        dom.add_class(wrapper, "ytp-time-wrapper");
        let current = dom.create_element("span");
        dom.add_class(current, "ytp-time-current");
        dom.append_child(&wrapper, &current);
        dom.append_child(&body, &wrapper);
        Page {
            dom,
            container,
            script,
            current,
        }
    }

    fn label(dom: &MemoryDom, timer: &LiveTimer<MemoryDom>, which: Label) -> String {
        dom.text_content(timer.overlay().node(which))
            .unwrap_or_default()
    }

    fn setup(p: &mut Page, timer: &mut LiveTimer<MemoryDom>) -> SetupOutcome {
        timer.setup(
            &mut p.dom,
            &p.container,
            &Config::youtube(),
            &PatternFormatter::utc(),
            &mut Tracer::none(),
        )
    }

    fn tick(p: &mut Page, timer: &mut LiveTimer<MemoryDom>, reading: &str) -> Option<String> {
        p.dom.set_text_content(&p.current, reading);
        let (role, batch) = p.dom.take_batch()?;
        assert_eq!(role, WatchRole::ElapsedTime);
        timer.on_time_update(&mut p.dom, &batch, &PatternFormatter::utc(), &mut Tracer::none())
    }

    #[test]
    fn never_live_leaves_labels_empty() {
        let mut p = page(NEVER_LIVE);
        let mut timer = LiveTimer::new(&mut p.dom);
        assert_eq!(setup(&mut p, &mut timer), SetupOutcome::NotLive);
        assert_eq!(label(&p.dom, &timer, Label::Start), "");
        assert_eq!(label(&p.dom, &timer, Label::Original), "");
        assert!(!timer.is_watching());
        // Labels are attached even for non-live videos.
        assert!(p.dom.is_connected(timer.overlay().node(Label::Start)));
    }

    #[test]
    fn live_writes_start_time_without_watcher() {
        let mut p = page(LIVE);
        let mut timer = LiveTimer::new(&mut p.dom);
        let outcome = setup(&mut p, &mut timer);
        assert_eq!(outcome.broadcast_state(), Some(BroadcastState::LiveOrScheduled));
        assert_eq!(label(&p.dom, &timer, Label::Start), "10:00:00 + ");
        assert_eq!(label(&p.dom, &timer, Label::Original), "");
        assert!(!timer.is_watching());
        assert_eq!(p.dom.active_count(WatchRole::ElapsedTime), 0);
    }

    #[test]
    fn ended_offsets_readings_from_start() {
        let mut p = page(ENDED);
        let mut timer = LiveTimer::new(&mut p.dom);
        let outcome = setup(&mut p, &mut timer);
        assert!(matches!(outcome, SetupOutcome::Watching { .. }));
        assert_eq!(label(&p.dom, &timer, Label::Original), "");

        let written = tick(&mut p, &mut timer, "10:00");
        assert_eq!(written.as_deref(), Some(" ( 2024/03/01 (Fri) 10:10:00 )"));
        assert_eq!(label(&p.dom, &timer, Label::Original), " ( 2024/03/01 (Fri) 10:10:00 )");
        assert_eq!(label(&p.dom, &timer, Label::Start), "");

        tick(&mut p, &mut timer, "1:02:03");
        assert_eq!(label(&p.dom, &timer, Label::Original), " ( 2024/03/01 (Fri) 11:02:03 )");
    }

    #[test]
    fn records_without_added_nodes_are_ignored() {
        let mut p = page(ENDED);
        let mut timer = LiveTimer::new(&mut p.dom);
        setup(&mut p, &mut timer);
        tick(&mut p, &mut timer, "0:30");

        let batch = vec![Mutation {
            target: p.current,
            added: vec![],
        }];
        let written =
            timer.on_time_update(&mut p.dom, &batch, &PatternFormatter::utc(), &mut Tracer::none());
        assert_eq!(written, None);
        assert_eq!(label(&p.dom, &timer, Label::Original), " ( 2024/03/01 (Fri) 10:00:30 )");
    }

    #[test]
    fn placeholder_reading_counts_as_zero() {
        let mut p = page(ENDED);
        let mut timer = LiveTimer::new(&mut p.dom);
        setup(&mut p, &mut timer);
        tick(&mut p, &mut timer, "--:--");
        assert_eq!(label(&p.dom, &timer, Label::Original), " ( 2024/03/01 (Fri) 10:00:00 )");
    }

    #[test]
    fn missing_metadata_stops_before_attaching() {
        let mut p = page("");
        let mut timer = LiveTimer::new(&mut p.dom);
        assert_eq!(setup(&mut p, &mut timer), SetupOutcome::MetadataMissing);
        assert!(!p.dom.is_connected(timer.overlay().node(Label::Start)));

        p.dom.set_text_content(&p.script, "{not json");
        assert_eq!(setup(&mut p, &mut timer), SetupOutcome::MetadataInvalid);
    }

    #[test]
    fn missing_anchor_is_reported() {
        let mut dom = MemoryDom::new();
        let container = dom.create_element("div");
        let script = dom.create_element("script");
        dom.append_child(&container, &script);
        dom.set_text_content(&script, ENDED);
        let body = dom.body();
        dom.append_child(&body, &container);
        let mut timer = LiveTimer::new(&mut dom);
        let config = Config::youtube();
        let formatter = PatternFormatter::utc();

        let outcome = timer.setup(&mut dom, &container, &config, &formatter, &mut Tracer::none());
        assert_eq!(outcome, SetupOutcome::AnchorMissing(Anchor::TimeWrapper));

        let wrapper = dom.create_element("div");
        dom.add_class(wrapper, "ytp-time-wrapper");
        dom.append_child(&body, &wrapper);
        let outcome = timer.setup(&mut dom, &container, &config, &formatter, &mut Tracer::none());
        assert_eq!(outcome, SetupOutcome::AnchorMissing(Anchor::CurrentTime));
        assert!(!timer.is_watching());
    }

    #[test]
    fn repeated_setup_is_idempotent() {
        let mut p = page(ENDED);
        let mut timer = LiveTimer::new(&mut p.dom);
        setup(&mut p, &mut timer);
        let once = p.dom.children(p.dom.parent(p.current).unwrap()).to_vec();

        setup(&mut p, &mut timer);
        setup(&mut p, &mut timer);
        let thrice = p.dom.children(p.dom.parent(p.current).unwrap()).to_vec();
        assert_eq!(once, thrice);
        assert_eq!(p.dom.active_count(WatchRole::ElapsedTime), 1);
        assert_eq!(p.dom.created_subscriptions(), 3);
        assert_eq!(p.dom.cancelled_subscriptions(), 2);
    }

    #[test]
    fn setup_clears_stale_labels() {
        let mut p = page(ENDED);
        let mut timer = LiveTimer::new(&mut p.dom);
        setup(&mut p, &mut timer);
        tick(&mut p, &mut timer, "5");
        assert!(!label(&p.dom, &timer, Label::Original).is_empty());

        p.dom.set_text_content(&p.script, NEVER_LIVE);
        assert_eq!(setup(&mut p, &mut timer), SetupOutcome::NotLive);
        assert_eq!(label(&p.dom, &timer, Label::Original), "");
        assert!(!timer.is_watching());
        // The old watcher's records are gone with it.
        p.dom.set_text_content(&p.current, "6");
        assert!(!p.dom.has_pending());
    }

    #[test]
    fn update_without_watch_is_ignored() {
        let mut p = page(LIVE);
        let mut timer = LiveTimer::new(&mut p.dom);
        setup(&mut p, &mut timer);
        let text = p.dom.create_text("1:00");
        let batch = vec![Mutation {
            target: p.current,
            added: vec![text],
        }];
        let written =
            timer.on_time_update(&mut p.dom, &batch, &PatternFormatter::utc(), &mut Tracer::none());
        assert_eq!(written, None);
        assert_eq!(label(&p.dom, &timer, Label::Original), "");
    }

    #[test]
    fn reset_disconnects_the_watcher() {
        let mut p = page(ENDED);
        let mut timer = LiveTimer::new(&mut p.dom);
        setup(&mut p, &mut timer);
        assert_eq!(
            timer.watch_start().map(|s| s.to_string()).as_deref(),
            Some("2024-03-01 10:00:00 +00:00")
        );
        timer.reset(&mut p.dom, &mut Tracer::none());
        assert!(!timer.is_watching());
        assert!(p.dom.active_roles().is_empty());
    }
}
