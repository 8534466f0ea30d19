// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reactive engine that overlays the original wall-clock time onto the
//! elapsed-time display of an archived live stream.
//!
//! `livestamp_core` derives the overlay purely from metadata embedded in the
//! page (the stream's publication window) and from updates to the player's
//! on-screen elapsed-time counter. It is `no_std` compatible (with `alloc`)
//! and talks to the page only through the [`Dom`](dom::Dom) trait, so the
//! same state machine runs in a browser and against the in-memory
//! [`MemoryDom`](memory::MemoryDom).
//!
//! # Architecture
//!
//! The crate is organized around three cooperating watchers owned by one
//! [`LiveStamp`](engine::LiveStamp) engine:
//!
//! ```text
//!   LiveStamp::init()
//!       │
//!       ├─ container present ──────────────┐
//!       ▼                                  │
//!   Bootstrap watcher (document body)      │
//!       │ container inserted into region   │
//!       ▼                                  ▼
//!   Metadata watcher (container subtree) ──► LiveTimer::setup()
//!                                              │ reset, read, locate,
//!                                              │ attach, classify
//!                                              ▼
//!                                  Elapsed-time watcher (current time)
//!                                              │
//!                                              ▼
//!                                  LiveTimer::on_time_update() ──► Overlay
//! ```
//!
//! **[`metadata`]**: Stream metadata model, broadcast classification, and
//! the metadata reader.
//!
//! **[`elapsed`]**: Converts `[[HH:]MM:]SS` timecodes into seconds.
//!
//! **[`format`]**: The [`DateFormatter`](format::DateFormatter) collaborator
//! and a `chrono` pattern implementation.
//!
//! **[`dom`]**: The [`Dom`](dom::Dom) trait that backends implement, plus
//! selectors, mutation records and watcher roles.
//!
//! **[`overlay`]**: The two injected labels and their attachment rules.
//!
//! **[`controller`]**: The live-timer state machine and the single
//! elapsed-time watcher it owns.
//!
//! **[`engine`]**: Bootstrap and metadata watchers, mutation dispatch, and
//! teardown.
//!
//! **[`config`]**: Host-page identities and the debug switch.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait for diagnostic
//! output, with a [`Tracer`](trace::Tracer) wrapper armed by configuration.
//!
//! **[`memory`]**: In-memory document used by tests and harnesses.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod config;
pub mod controller;
pub mod dom;
pub mod elapsed;
pub mod engine;
pub mod format;
pub mod memory;
pub mod metadata;
pub mod overlay;
pub mod trace;
