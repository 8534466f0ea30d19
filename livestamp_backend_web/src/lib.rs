// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for livestamp.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`WebDom`]: document access and `MutationObserver` subscriptions
//! - [`IntlFormatter`]: `Intl.DateTimeFormat` label formatting
//! - [`ConsoleSink`]: trace output to the browser console
//! - [`start`]: wires a page-lifetime engine to the current document

#![no_std]

extern crate alloc;

mod console;
mod dom;
mod format;
mod observer;

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;

pub use console::ConsoleSink;
pub use dom::WebDom;
pub use format::IntlFormatter;
pub use livestamp_core::dom::Dom;
pub use observer::{Dispatch, ObserverHandle};

use livestamp_core::config::Config;
use livestamp_core::dom::{Mutation, WatchRole};
use livestamp_core::engine::{InitOutcome, LiveStamp};
use wasm_bindgen::JsValue;
use web_sys::Node;

/// The engine as wired by [`start`].
pub type WebLiveStamp = LiveStamp<WebDom, IntlFormatter, ConsoleSink>;

/// A started engine, shared with the observer callbacks.
#[derive(Debug)]
pub struct Running {
    /// The engine. Observer callbacks borrow it for each delivery.
    pub engine: Rc<RefCell<WebLiveStamp>>,
    /// What the initial lookup found.
    pub init: InitOutcome,
}

/// Starts watching the current document with `config`.
///
/// The returned engine must be kept alive for as long as the page should be
/// watched; dropping the last reference disconnects every observer.
pub fn start(config: Config) -> Result<Running, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("window has no document"))?;

    let engine = Rc::new_cyclic(|weak: &Weak<RefCell<WebLiveStamp>>| {
        let weak = weak.clone();
        let dispatch: Dispatch = Rc::new(move |role: WatchRole, batch: &[Mutation<Node>]| {
            let Some(engine) = weak.upgrade() else {
                return;
            };
            // Observer callbacks run as microtasks, never inside a delivery.
            if let Ok(mut engine) = engine.try_borrow_mut() {
                engine.deliver(role, batch);
            }
        });
        RefCell::new(LiveStamp::with_sink(
            WebDom::new(document, dispatch),
            config,
            IntlFormatter::new(),
            ConsoleSink,
        ))
    });
    let init = engine.borrow_mut().init();
    Ok(Running { engine, init })
}
