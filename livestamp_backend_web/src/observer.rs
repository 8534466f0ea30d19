// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `MutationObserver` subscriptions.
//!
//! [`ObserverHandle`] owns a browser `MutationObserver` together with the JS
//! closure it calls. Each batch of [`MutationRecord`]s is converted into
//! [`Mutation`] values and handed to a shared dispatcher tagged with the
//! subscription's [`WatchRole`].
//!
//! [`MutationRecord`]: web_sys::MutationRecord

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;

use js_sys::Array;
use livestamp_core::dom::{Mutation, ObserveOptions, WatchRole};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{MutationObserver, MutationObserverInit, MutationRecord, Node};

/// Receives every converted batch, whichever observer produced it.
pub type Dispatch = Rc<dyn Fn(WatchRole, &[Mutation<Node>])>;

type ObserverClosure = Closure<dyn FnMut(Array, MutationObserver)>;

/// An owned, live `MutationObserver` subscription.
///
/// Dropping the handle disconnects the observer and releases its closure.
/// A handle whose observer could not be created is inert: it never fires.
pub struct ObserverHandle {
    role: WatchRole,
    observer: Option<MutationObserver>,
    /// Kept alive for as long as the observer may call it.
    closure: Option<ObserverClosure>,
}

impl ObserverHandle {
    /// Starts observing child-list changes of `target`.
    ///
    /// `before_dispatch` runs at the start of every callback, before any
    /// records are converted.
    pub fn observe(
        target: &Node,
        options: ObserveOptions,
        role: WatchRole,
        dispatch: Dispatch,
        before_dispatch: Rc<dyn Fn()>,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(move |records: Array, _: MutationObserver| {
            before_dispatch();
            let batch = convert(&records);
            if !batch.is_empty() {
                dispatch(role, &batch);
            }
        }) as Box<dyn FnMut(Array, MutationObserver)>);

        let observer = MutationObserver::new(closure.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(options.subtree);
        observer.observe_with_options(target, &init)?;

        Ok(Self {
            role,
            observer: Some(observer),
            closure: Some(closure),
        })
    }

    /// Creates a handle that observes nothing.
    #[must_use]
    pub fn inert(role: WatchRole) -> Self {
        Self {
            role,
            observer: None,
            closure: None,
        }
    }

    /// Returns the role this subscription was created for.
    #[must_use]
    pub fn role(&self) -> WatchRole {
        self.role
    }

    /// Returns `true` if the observer is still connected.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.observer.is_some()
    }

    /// Stops the observer and drops queued records.
    ///
    /// The closure is kept until the handle is dropped, so this is safe to
    /// call from inside the observer's own callback.
    pub fn disconnect(&mut self) {
        if let Some(observer) = self.observer.take() {
            // Pending records are discarded, not delivered.
            let _ = observer.take_records();
            observer.disconnect();
        }
    }
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.disconnect();
        self.closure.take();
    }
}

impl core::fmt::Debug for ObserverHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObserverHandle")
            .field("role", &self.role)
            .field("live", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

/// Converts a JS array of `MutationRecord`s, skipping anything else.
fn convert(records: &Array) -> Vec<Mutation<Node>> {
    records
        .iter()
        .filter_map(|value| {
            let record: MutationRecord = value.dyn_into().ok()?;
            let target = record.target()?;
            let list = record.added_nodes();
            let added = (0..list.length()).filter_map(|i| list.item(i)).collect();
            Some(Mutation { target, added })
        })
        .collect()
}
