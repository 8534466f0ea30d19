// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content script for video watch pages.
//!
//! On load it starts the engine against the current document with the
//! YouTube page identities. Diagnostics go to the browser console in debug
//! builds only.
//!
//! Build with: `wasm-pack build --target web livestamp_extension`
//! and load the generated module from the extension's content script.

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

use livestamp_core::config::Config;
use wasm_bindgen::prelude::*;

/// The configuration the content script runs with.
#[must_use]
pub fn config() -> Config {
    Config::youtube().with_debug(cfg!(debug_assertions))
}

/// Entry point, called automatically by `wasm_bindgen(start)`.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    let running = livestamp_backend_web::start(config())?;
    // The engine lives for the rest of the page.
    core::mem::forget(running);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watches_youtube_pages() {
        let config = config();
        assert_eq!(config.container_id, "microformat");
        assert_eq!(config.debug, cfg!(debug_assertions));
    }
}
