// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser document access.
//!
//! [`WebDom`] implements [`Dom`] over a `web_sys::Document`. Reads and writes
//! go straight to the page; failed DOM writes are ignored, matching the
//! page's own behavior when an element disappears mid-update.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use livestamp_core::dom::{Dom, ObserveOptions, Selector, WatchRole};
use wasm_bindgen::JsCast as _;
use web_sys::{Document, Element, Node};

use crate::observer::{Dispatch, ObserverHandle};

/// [`Dom`] implementation backed by the live page.
pub struct WebDom {
    document: Document,
    dispatch: Dispatch,
    /// Disconnected handles whose closures may still be on the stack.
    retired: Rc<RefCell<Vec<ObserverHandle>>>,
}

impl core::fmt::Debug for WebDom {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebDom")
            .field("document", &"Document")
            .field("retired", &self.retired.try_borrow().map(|r| r.len()).ok())
            .finish_non_exhaustive()
    }
}

impl WebDom {
    /// Creates a document accessor whose observers report to `dispatch`.
    #[must_use]
    pub fn new(document: Document, dispatch: Dispatch) -> Self {
        Self {
            document,
            dispatch,
            retired: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Returns the underlying document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn query(&self, root: Option<&Node>, css: &str) -> Option<Node> {
        let found = match root {
            None => self.document.query_selector(css),
            Some(node) => node.dyn_ref::<Element>()?.query_selector(css),
        };
        found.ok().flatten().map(Node::from)
    }
}

impl Dom for WebDom {
    type Node = Node;
    type Subscription = ObserverHandle;

    fn element_by_id(&self, id: &str) -> Option<Node> {
        self.document.get_element_by_id(id).map(Node::from)
    }

    fn locate(&self, root: Option<&Node>, selector: &Selector<'_>) -> Option<Node> {
        self.query(root, &alloc::format!("{selector}"))
    }

    fn tag_name(&self, node: &Node) -> Option<String> {
        node.dyn_ref::<Element>().map(Element::tag_name)
    }

    fn element_id(&self, node: &Node) -> Option<String> {
        let id = node.dyn_ref::<Element>()?.id();
        (!id.is_empty()).then_some(id)
    }

    fn text_content(&self, node: &Node) -> Option<String> {
        node.text_content()
    }

    fn set_text_content(&mut self, node: &Node, text: &str) {
        node.set_text_content(Some(text));
    }

    fn create_label(&mut self) -> Node {
        match self.document.create_element("span") {
            Ok(element) => element.into(),
            Err(_) => self.document.create_text_node("").into(),
        }
    }

    fn is_connected(&self, node: &Node) -> bool {
        node.is_connected()
    }

    fn prepend_child(&mut self, parent: &Node, child: &Node) {
        let _ = parent.insert_before(child, parent.first_child().as_ref());
    }

    fn append_child(&mut self, parent: &Node, child: &Node) {
        let _ = parent.append_child(child);
    }

    fn inject_style(&mut self, css: &str) {
        let Some(root) = self.document.document_element() else {
            return;
        };
        if let Ok(style) = self.document.create_element("style") {
            style.set_text_content(Some(css));
            let _ = root.append_child(&style);
        }
    }

    fn observe(
        &mut self,
        target: &Node,
        options: ObserveOptions,
        role: WatchRole,
    ) -> ObserverHandle {
        let retired = Rc::clone(&self.retired);
        // Runs at the top of each callback: every retired observer is
        // already disconnected, so none of them is the one executing.
        let release = Rc::new(move || {
            if let Ok(mut retired) = retired.try_borrow_mut() {
                retired.clear();
            }
        });
        ObserverHandle::observe(target, options, role, Rc::clone(&self.dispatch), release)
            .unwrap_or_else(|_| ObserverHandle::inert(role))
    }

    fn disconnect(&mut self, mut subscription: ObserverHandle) {
        subscription.disconnect();
        self.retired.borrow_mut().push(subscription);
    }
}
