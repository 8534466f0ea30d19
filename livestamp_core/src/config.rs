// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-page identities and diagnostic settings.
//!
//! [`Config`] names every element the engine looks for and the style rule it
//! injects. The defaults target the YouTube watch page.

/// Configuration for the [`LiveStamp`](crate::engine::LiveStamp) engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Id of the metadata container element.
    pub container_id: &'static str,
    /// Tag name (upper-case) of the element carrying the JSON payload.
    pub payload_tag: &'static str,
    /// Tag name (upper-case) of the page region that (re)inserts the
    /// metadata container during client-side navigation.
    pub region_tag: &'static str,
    /// Class of the native time-wrapper widget.
    pub time_wrapper_class: &'static str,
    /// Class of the native current-time display inside the wrapper.
    pub current_time_class: &'static str,
    /// Style rule injected at init to keep the current-time display visible.
    pub style_rule: &'static str,
    /// Whether diagnostic trace events are forwarded to the sink.
    pub debug: bool,
}

impl Config {
    /// Configuration for the YouTube watch page.
    #[must_use]
    pub const fn youtube() -> Self {
        Self {
            container_id: "microformat",
            payload_tag: "SCRIPT",
            region_tag: "YTD-WATCH-FLEXY",
            time_wrapper_class: "ytp-time-wrapper",
            current_time_class: "ytp-time-current",
            style_rule: ".ytp-time-current { display: inline !important; }",
            debug: false,
        }
    }

    /// Returns this configuration with diagnostics switched on or off.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::youtube()
    }
}
