// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON recording for livestamp diagnostics.
//!
//! This crate provides [`TraceSink`](livestamp_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: owned event log with JSON export.

pub mod pretty;
pub mod recorder;
