// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory document.
//!
//! [`MemoryDom`] implements [`Dom`] over an arena of element and text nodes.
//! Child-list changes are queued per active subscription, in the order the
//! subscriptions were created, and handed out one batch at a time by
//! [`take_batch`](MemoryDom::take_batch). This mirrors how a browser batches
//! `MutationObserver` records until the next microtask, so tests can drive
//! the engine through arbitrary mutation sequences without a browser engine.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::dom::{Dom, Mutation, ObserveOptions, Selector, WatchRole};

/// Handle to a node in a [`MemoryDom`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// Subscription handle returned by [`MemoryDom::observe`](Dom::observe).
#[derive(Debug, PartialEq, Eq)]
pub struct MemorySubscription {
    id: u64,
    role: WatchRole,
}

impl MemorySubscription {
    /// Returns the role this subscription was created for.
    #[must_use]
    pub const fn role(&self) -> WatchRole {
        self.role
    }
}

#[derive(Clone, Debug)]
enum NodeKind {
    Element {
        tag: String,
        id: Option<String>,
        classes: Vec<String>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Observer {
    id: u64,
    target: NodeId,
    subtree: bool,
    role: WatchRole,
    pending: Vec<Mutation<NodeId>>,
}

/// An arena-backed document with `<html>`, `<head>` and `<body>`.
#[derive(Debug)]
pub struct MemoryDom {
    nodes: Vec<NodeData>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    observers: Vec<Observer>,
    next_subscription: u64,
    cancelled: u64,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Creates a document containing only `<html><head></head><body></body></html>`.
    #[must_use]
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            observers: Vec::new(),
            next_subscription: 0,
            cancelled: 0,
        };
        let root = dom.create_element("html");
        let head = dom.create_element("head");
        let body = dom.create_element("body");
        dom.link(root, head, None);
        dom.link(root, body, None);
        dom.root = root;
        dom.head = head;
        dom.body = body;
        dom
    }

    /// Returns the `<html>` element.
    #[must_use]
    pub const fn document_element(&self) -> NodeId {
        self.root
    }

    /// Returns the `<head>` element.
    #[must_use]
    pub const fn head(&self) -> NodeId {
        self.head
    }

    /// Returns the `<body>` element.
    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Creates a detached element. Tag names are stored upper-case.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element {
            tag: tag.to_ascii_uppercase(),
            id: None,
            classes: Vec::new(),
        })
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    /// Sets the `id` attribute of an element. No-op on text nodes.
    pub fn set_id(&mut self, node: NodeId, id: &str) {
        if let NodeKind::Element { id: slot, .. } = &mut self.nodes[node.0].kind {
            *slot = Some(id.into());
        }
    }

    /// Adds a class to an element. No-op on text nodes.
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let NodeKind::Element { classes, .. } = &mut self.nodes[node.0].kind {
            classes.push(class.into());
        }
    }

    /// Returns the parent of `node`, if attached to one.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Returns the children of `node` in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Detaches `node` from its parent, queueing a change record on the
    /// parent.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.unlink(node) {
            self.record(parent, Vec::new());
        }
    }

    /// Replaces all children of `parent` with `children`, queueing a single
    /// change record, like `Element.replaceChildren`.
    pub fn replace_children(&mut self, parent: NodeId, children: &[NodeId]) {
        for child in core::mem::take(&mut self.nodes[parent.0].children) {
            self.nodes[child.0].parent = None;
        }
        for &child in children {
            self.unlink(child);
            self.link(parent, child, None);
        }
        self.record(parent, children.to_vec());
    }

    /// Returns the text of every `<style>` element in document order.
    #[must_use]
    pub fn style_rules(&self) -> Vec<String> {
        let mut rules = Vec::new();
        for node in self.descendants(self.root) {
            if self.is_tag(node, "STYLE") {
                rules.push(self.collect_text(node));
            }
        }
        rules
    }

    /// Removes and returns the oldest subscription's pending batch.
    ///
    /// Batches are handed out in subscription-creation order, which matches
    /// how browsers invoke observer callbacks.
    pub fn take_batch(&mut self) -> Option<(WatchRole, Vec<Mutation<NodeId>>)> {
        self.observers
            .iter_mut()
            .find(|o| !o.pending.is_empty())
            .map(|o| (o.role, core::mem::take(&mut o.pending)))
    }

    /// Returns `true` if any subscription has undelivered records.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.observers.iter().any(|o| !o.pending.is_empty())
    }

    /// Returns the roles of all live subscriptions, in creation order.
    #[must_use]
    pub fn active_roles(&self) -> Vec<WatchRole> {
        self.observers.iter().map(|o| o.role).collect()
    }

    /// Returns the number of live subscriptions for `role`.
    #[must_use]
    pub fn active_count(&self, role: WatchRole) -> usize {
        self.observers.iter().filter(|o| o.role == role).count()
    }

    /// Returns the number of subscriptions ever created.
    #[must_use]
    pub const fn created_subscriptions(&self) -> u64 {
        self.next_subscription
    }

    /// Returns the number of subscriptions disconnected so far.
    #[must_use]
    pub const fn cancelled_subscriptions(&self) -> u64 {
        self.cancelled
    }

    // -- tree helpers ------------------------------------------------------

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId, at: Option<usize>) {
        let children = &mut self.nodes[parent.0].children;
        match at {
            Some(idx) => children.insert(idx.min(children.len()), child),
            None => children.push(child),
        }
        self.nodes[child.0].parent = Some(parent);
    }

    /// Detaches `node` without recording; returns the former parent.
    fn unlink(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes[node.0].parent.take()?;
        self.nodes[parent.0].children.retain(|&c| c != node);
        Some(parent)
    }

    /// Moves `child` under `parent`, recording removal from a previous
    /// parent and the insertion.
    fn insert(&mut self, parent: NodeId, child: NodeId, at: Option<usize>) {
        if let Some(old) = self.unlink(child) {
            self.record(old, Vec::new());
        }
        self.link(parent, child, at);
        self.record(parent, vec![child]);
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes[node.0].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn record(&mut self, target: NodeId, added: Vec<NodeId>) {
        let interested: Vec<usize> = self
            .observers
            .iter()
            .enumerate()
            .filter(|(_, o)| {
                o.target == target || (o.subtree && self.is_inclusive_ancestor(o.target, target))
            })
            .map(|(i, _)| i)
            .collect();
        for i in interested {
            self.observers[i].pending.push(Mutation {
                target,
                added: added.clone(),
            });
        }
    }

    /// Descendants of `root` in document order, excluding `root`.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[root.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    fn is_tag(&self, node: NodeId, wanted: &str) -> bool {
        matches!(
            &self.nodes[node.0].kind,
            NodeKind::Element { tag, .. } if tag.eq_ignore_ascii_case(wanted)
        )
    }

    fn matches(&self, node: NodeId, selector: &Selector<'_>) -> bool {
        let NodeKind::Element { tag, id, classes } = &self.nodes[node.0].kind else {
            return false;
        };
        match selector {
            Selector::Id(wanted) => id.as_deref() == Some(*wanted),
            Selector::Class(wanted) => classes.iter().any(|c| c == wanted),
            Selector::Tag(wanted) => tag.eq_ignore_ascii_case(wanted),
        }
    }

    fn collect_text(&self, node: NodeId) -> String {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element { .. } => {
                let mut out = String::new();
                for child in self.descendants(node) {
                    if let NodeKind::Text(text) = &self.nodes[child.0].kind {
                        out.push_str(text);
                    }
                }
                out
            }
        }
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;
    type Subscription = MemorySubscription;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let selector = Selector::Id(id);
        core::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&node| self.matches(node, &selector))
    }

    fn locate(&self, root: Option<&NodeId>, selector: &Selector<'_>) -> Option<NodeId> {
        match root {
            Some(&root) => self
                .descendants(root)
                .into_iter()
                .find(|&node| self.matches(node, selector)),
            None => core::iter::once(self.root)
                .chain(self.descendants(self.root))
                .find(|&node| self.matches(node, selector)),
        }
    }

    fn tag_name(&self, node: &NodeId) -> Option<String> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    fn element_id(&self, node: &NodeId) -> Option<String> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { id, .. } => id.clone(),
            NodeKind::Text(_) => None,
        }
    }

    fn text_content(&self, node: &NodeId) -> Option<String> {
        Some(self.collect_text(*node))
    }

    fn set_text_content(&mut self, node: &NodeId, text: &str) {
        let node = *node;
        if let NodeKind::Text(slot) = &mut self.nodes[node.0].kind {
            *slot = text.into();
            return;
        }
        let removed = core::mem::take(&mut self.nodes[node.0].children);
        for &child in &removed {
            self.nodes[child.0].parent = None;
        }
        let mut added = Vec::new();
        if !text.is_empty() {
            let child = self.create_text(text);
            self.link(node, child, None);
            added.push(child);
        }
        if !removed.is_empty() || !added.is_empty() {
            self.record(node, added);
        }
    }

    fn create_label(&mut self) -> NodeId {
        self.create_element("span")
    }

    fn is_connected(&self, node: &NodeId) -> bool {
        self.is_inclusive_ancestor(self.root, *node)
    }

    fn prepend_child(&mut self, parent: &NodeId, child: &NodeId) {
        self.insert(*parent, *child, Some(0));
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        self.insert(*parent, *child, None);
    }

    fn inject_style(&mut self, css: &str) {
        let style = self.create_element("style");
        let text = self.create_text(css);
        self.link(style, text, None);
        let root = self.root;
        self.insert(root, style, None);
    }

    fn observe(
        &mut self,
        target: &NodeId,
        options: ObserveOptions,
        role: WatchRole,
    ) -> MemorySubscription {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.observers.push(Observer {
            id,
            target: *target,
            subtree: options.subtree,
            role,
            pending: Vec::new(),
        });
        MemorySubscription { id, role }
    }

    fn disconnect(&mut self, subscription: MemorySubscription) {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != subscription.id);
        if self.observers.len() != before {
            self.cancelled += 1;
        }
    }
}
