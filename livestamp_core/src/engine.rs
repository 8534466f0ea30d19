// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Watcher wiring and mutation dispatch.
//!
//! [`LiveStamp`] is the page-lifetime engine. It owns the document, the
//! [`LiveTimer`] controller, and its long-lived subscriptions:
//!
//! - **Bootstrap**: [`init`](LiveStamp::init) looks the metadata container
//!   up directly. If the page has not rendered it yet, the whole body is
//!   observed until the container is inserted into the page region; the
//!   bootstrap subscription is then disconnected, exactly once.
//!
//! - **Metadata**: once the container is known it is observed for payload
//!   replacement, and the controller runs once immediately. Every later
//!   batch touching the payload element re-runs the controller.
//!
//! - **Navigation**: from the first discovery on, the body is observed for
//!   a different container inserted into the page region. Client-side
//!   navigation swaps the container out; the metadata subscription then
//!   moves to the new node and the controller runs again, so labels from
//!   the previous video never survive the swap.
//!
//! The backend delivers each batch of change records to
//! [`deliver`](LiveStamp::deliver) together with the subscription's
//! [`WatchRole`]. Batches for a role without a live subscription are
//! ignored.

use crate::config::Config;
use crate::controller::{LiveTimer, SetupOutcome};
use crate::dom::{Dom, Mutation, ObserveOptions, Selector, WatchRole};
use crate::format::{DateFormatter, PatternFormatter};
use crate::memory::MemoryDom;
use crate::trace::{NoopSink, TraceSink, Tracer};

/// How the metadata container was located.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Discovery {
    /// Present in the document when [`LiveStamp::init`] ran.
    Immediate,
    /// Inserted into the page region later, seen by the bootstrap watcher.
    Inserted,
    /// A new container replaced the watched one.
    Replaced,
}

impl Discovery {
    /// Returns a short lowercase name for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Inserted => "inserted",
            Self::Replaced => "replaced",
        }
    }
}

/// What [`LiveStamp::init`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitOutcome {
    /// The container was present; the first setup ran with this outcome.
    Found(SetupOutcome),
    /// The bootstrap watcher is waiting for the container.
    Waiting,
    /// The document has no body to observe yet.
    NoBody,
}

/// The page-lifetime engine.
pub struct LiveStamp<D: Dom, F = PatternFormatter, S = NoopSink> {
    dom: D,
    config: Config,
    formatter: F,
    sink: S,
    timer: LiveTimer<D>,
    container: Option<D::Node>,
    metadata_watch: Option<D::Subscription>,
    bootstrap_watch: Option<D::Subscription>,
    navigation_watch: Option<D::Subscription>,
    last_outcome: Option<SetupOutcome>,
}

impl<D: Dom, F, S> core::fmt::Debug for LiveStamp<D, F, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LiveStamp")
            .field("config", &self.config)
            .field("timer", &self.timer)
            .field("container", &self.container)
            .field("metadata_watch", &self.metadata_watch)
            .field("bootstrap_watch", &self.bootstrap_watch)
            .field("navigation_watch", &self.navigation_watch)
            .field("last_outcome", &self.last_outcome)
            .finish_non_exhaustive()
    }
}

impl<D: Dom, F: DateFormatter> LiveStamp<D, F, NoopSink> {
    /// Creates an engine that discards diagnostics.
    ///
    /// Nothing is observed until [`init`](Self::init) is called.
    pub fn new(dom: D, config: Config, formatter: F) -> Self {
        Self::with_sink(dom, config, formatter, NoopSink)
    }
}

impl<D: Dom, F: DateFormatter, S: TraceSink> LiveStamp<D, F, S> {
    /// Creates an engine that reports diagnostics to `sink` when
    /// [`Config::debug`] is set.
    pub fn with_sink(mut dom: D, config: Config, formatter: F, sink: S) -> Self {
        let timer = LiveTimer::new(&mut dom);
        Self {
            dom,
            config,
            formatter,
            sink,
            timer,
            container: None,
            metadata_watch: None,
            bootstrap_watch: None,
            navigation_watch: None,
            last_outcome: None,
        }
    }

    /// Returns the document.
    #[must_use]
    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// Returns the document for mutation.
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the live-timer controller.
    #[must_use]
    pub fn timer(&self) -> &LiveTimer<D> {
        &self.timer
    }

    /// Returns the trace sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the watched metadata container, once located.
    #[must_use]
    pub fn container(&self) -> Option<&D::Node> {
        self.container.as_ref()
    }

    /// Returns the outcome of the most recent controller run.
    #[must_use]
    pub fn last_outcome(&self) -> Option<SetupOutcome> {
        self.last_outcome
    }

    /// Returns `true` while the bootstrap watcher is waiting.
    #[must_use]
    pub fn is_bootstrapping(&self) -> bool {
        self.bootstrap_watch.is_some()
    }

    fn tracer(&mut self) -> Tracer<'_> {
        Tracer::armed_if(self.config.debug, &mut self.sink)
    }

    /// Injects the forced-visibility style, then locates the metadata
    /// container or starts waiting for it.
    pub fn init(&mut self) -> InitOutcome {
        self.tracer().init();
        self.dom.inject_style(self.config.style_rule);

        self.end_bootstrap();
        if let Some(container) = self.dom.element_by_id(self.config.container_id) {
            self.tracer().container_found(Discovery::Immediate);
            return InitOutcome::Found(self.watch_metadata(container));
        }

        let Some(body) = self.body() else {
            return InitOutcome::NoBody;
        };
        let subscription = self
            .dom
            .observe(&body, ObserveOptions::SUBTREE, WatchRole::Bootstrap);
        self.bootstrap_watch = Some(subscription);
        self.tracer().watch_start(WatchRole::Bootstrap);
        InitOutcome::Waiting
    }

    /// Starts watching `container` and runs the controller once.
    ///
    /// Any previously watched container is released first, and the
    /// navigation watcher is armed if it is not already.
    pub fn watch_metadata(&mut self, container: D::Node) -> SetupOutcome {
        if self.navigation_watch.is_none()
            && let Some(body) = self.body()
        {
            let subscription = self
                .dom
                .observe(&body, ObserveOptions::SUBTREE, WatchRole::Navigation);
            self.navigation_watch = Some(subscription);
            self.tracer().watch_start(WatchRole::Navigation);
        }
        if let Some(previous) = self.metadata_watch.take() {
            self.dom.disconnect(previous);
            self.tracer().watch_end(WatchRole::Metadata);
        }
        let subscription = self
            .dom
            .observe(&container, ObserveOptions::SUBTREE, WatchRole::Metadata);
        self.metadata_watch = Some(subscription);
        self.tracer().watch_start(WatchRole::Metadata);
        self.container = Some(container.clone());
        self.run_setup(&container)
    }

    /// Handles a batch of change records for the subscription with `role`.
    pub fn deliver(&mut self, role: WatchRole, batch: &[Mutation<D::Node>]) {
        match role {
            WatchRole::Bootstrap => self.on_bootstrap(batch),
            WatchRole::Metadata => self.on_metadata(batch),
            WatchRole::Navigation => self.on_navigation(batch),
            WatchRole::ElapsedTime => {
                let Self {
                    dom,
                    config,
                    formatter,
                    sink,
                    timer,
                    ..
                } = self;
                let mut tracer = Tracer::armed_if(config.debug, sink);
                timer.on_time_update(dom, batch, &*formatter, &mut tracer);
            }
        }
    }

    /// Disconnects every subscription and clears the labels.
    pub fn shutdown(&mut self) {
        self.end_bootstrap();
        if let Some(subscription) = self.navigation_watch.take() {
            self.dom.disconnect(subscription);
            self.tracer().watch_end(WatchRole::Navigation);
        }
        if let Some(subscription) = self.metadata_watch.take() {
            self.dom.disconnect(subscription);
            self.tracer().watch_end(WatchRole::Metadata);
        }
        let Self {
            dom,
            config,
            sink,
            timer,
            ..
        } = self;
        timer.reset(dom, &mut Tracer::armed_if(config.debug, sink));
        self.container = None;
    }

    fn body(&self) -> Option<D::Node> {
        self.dom.locate(None, &Selector::Tag("body"))
    }

    fn end_bootstrap(&mut self) {
        if let Some(subscription) = self.bootstrap_watch.take() {
            self.dom.disconnect(subscription);
            self.tracer().watch_end(WatchRole::Bootstrap);
        }
    }

    /// Returns the first container added directly to a region element.
    fn inserted_container(&self, batch: &[Mutation<D::Node>]) -> Option<D::Node> {
        batch
            .iter()
            .filter(|record| {
                self.dom
                    .tag_name(&record.target)
                    .is_some_and(|tag| tag.eq_ignore_ascii_case(self.config.region_tag))
            })
            .flat_map(|record| record.added.iter())
            .find(|node| self.dom.element_id(node).as_deref() == Some(self.config.container_id))
            .cloned()
    }

    fn on_bootstrap(&mut self, batch: &[Mutation<D::Node>]) {
        if self.bootstrap_watch.is_none() {
            self.tracer().delivery_ignored(WatchRole::Bootstrap);
            return;
        }
        let Some(container) = self.inserted_container(batch) else {
            return;
        };
        self.end_bootstrap();
        // The navigation watcher may have seen the same insertion first.
        if self.container.as_ref() != Some(&container) {
            self.tracer().container_found(Discovery::Inserted);
            self.watch_metadata(container);
        }
    }

    fn on_navigation(&mut self, batch: &[Mutation<D::Node>]) {
        if self.navigation_watch.is_none() {
            self.tracer().delivery_ignored(WatchRole::Navigation);
            return;
        }
        let Some(container) = self.inserted_container(batch) else {
            return;
        };
        if self.container.as_ref() == Some(&container) {
            return;
        }
        self.tracer().container_found(Discovery::Replaced);
        self.watch_metadata(container);
    }

    fn on_metadata(&mut self, batch: &[Mutation<D::Node>]) {
        let Some(container) = self.container.clone().filter(|_| self.metadata_watch.is_some())
        else {
            self.tracer().delivery_ignored(WatchRole::Metadata);
            return;
        };
        let payload_changed = batch.iter().any(|record| {
            self.dom
                .tag_name(&record.target)
                .is_some_and(|tag| tag.eq_ignore_ascii_case(self.config.payload_tag))
        });
        if payload_changed {
            self.run_setup(&container);
        }
    }

    fn run_setup(&mut self, container: &D::Node) -> SetupOutcome {
        let Self {
            dom,
            config,
            formatter,
            sink,
            timer,
            ..
        } = self;
        let mut tracer = Tracer::armed_if(config.debug, sink);
        let outcome = timer.setup(dom, container, config, &*formatter, &mut tracer);
        self.last_outcome = Some(outcome);
        outcome
    }
}

impl<F: DateFormatter, S: TraceSink> LiveStamp<MemoryDom, F, S> {
    /// Delivers queued change batches until none remain, the way a browser
    /// drains its observer microtasks. Returns the number of batches.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Some((role, batch)) = self.dom.take_batch() {
            self.deliver(role, &batch);
            delivered += 1;
        }
        delivered
    }
}
