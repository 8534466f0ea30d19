// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document contract for platform integrations.
//!
//! The engine never touches a concrete DOM API. Backends implement [`Dom`]
//! to provide the following pieces:
//!
//! - **Lookup**: [`element_by_id`](Dom::element_by_id) and
//!   [`locate`](Dom::locate) find nodes by [`Selector`]. Absence is a normal
//!   state of an asynchronously rendering page, never an error.
//!
//! - **Reads and writes**: text content, tag names, label creation and
//!   insertion, and one-off style injection.
//!
//! - **Observation**: [`observe`](Dom::observe) creates an owned
//!   subscription to child-list changes of a node. The backend delivers
//!   batches of [`Mutation`] records for that subscription to
//!   [`LiveStamp::deliver`](crate::engine::LiveStamp::deliver), tagged with
//!   the [`WatchRole`] given at subscription time.
//!   [`disconnect`](Dom::disconnect) consumes the handle and drops any
//!   notifications not yet delivered.
//!
//! # Ownership
//!
//! `Dom::Subscription` is deliberately not `Clone`: whoever creates a
//! subscription holds the only handle and is the only one able to cancel it.
//! The engine cancels a role's previous subscription before creating the
//! next one.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Tagged outcome of a lookup or parse step.
///
/// `NotYetAvailable` and `Invalid` are both transient from the engine's point
/// of view: a later mutation re-runs the lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The value is present and well-formed.
    Found(T),
    /// The value is absent, typically because the page has not rendered it.
    NotYetAvailable,
    /// The value is present but malformed.
    Invalid,
}

impl<T> Lookup<T> {
    /// Converts to an `Option`, discarding the reason for absence.
    #[must_use]
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotYetAvailable | Self::Invalid => None,
        }
    }

    /// Returns `true` for [`Lookup::Found`].
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Maps the found value, keeping the absence reason.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotYetAvailable => Lookup::NotYetAvailable,
            Self::Invalid => Lookup::Invalid,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NotYetAvailable, Self::Found)
    }
}

/// Identifies nodes for [`Dom::locate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Selector<'a> {
    /// Matches an element by its `id` attribute.
    Id(&'a str),
    /// Matches an element carrying the given class.
    Class(&'a str),
    /// Matches an element by tag name, ignoring ASCII case.
    Tag(&'a str),
}

impl fmt::Display for Selector<'_> {
    /// Formats the selector in CSS syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Class(class) => write!(f, ".{class}"),
            Self::Tag(tag) => {
                for c in tag.chars() {
                    write!(f, "{}", c.to_ascii_lowercase())?;
                }
                Ok(())
            }
        }
    }
}

/// Which watcher a subscription belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WatchRole {
    /// Watches the document body for the metadata container's insertion.
    Bootstrap,
    /// Watches the metadata container for payload replacement.
    Metadata,
    /// Watches the document body for a replacement metadata container
    /// after the first one was found.
    Navigation,
    /// Watches the native current-time display for new readings.
    ElapsedTime,
}

impl WatchRole {
    /// Returns a short label for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bootstrap => "bootstrap",
            Self::Metadata => "metadata",
            Self::Navigation => "navigation",
            Self::ElapsedTime => "elapsed",
        }
    }
}

/// Options for [`Dom::observe`].
///
/// Only child-list changes are ever observed; attribute and character-data
/// changes are not.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObserveOptions {
    /// Also report child-list changes of every descendant of the target.
    pub subtree: bool,
}

impl ObserveOptions {
    /// Observe the target's own children only.
    pub const CHILDREN: Self = Self { subtree: false };
    /// Observe the target and all of its descendants.
    pub const SUBTREE: Self = Self { subtree: true };
}

/// One child-list change record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mutation<N> {
    /// The node whose children changed.
    pub target: N,
    /// Nodes inserted by this change, in insertion order.
    pub added: Vec<N>,
}

/// A hierarchical document the engine can read, write and observe.
///
/// Implemented by the browser backend on top of `web_sys` and by
/// [`MemoryDom`](crate::memory::MemoryDom) for tests.
pub trait Dom {
    /// Handle to a node. Equality is node identity.
    type Node: Clone + PartialEq + fmt::Debug;

    /// Owned change-observation subscription.
    type Subscription: fmt::Debug;

    /// Returns the element with the given id, if it is in the document.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Returns the first descendant of `root` (or of the whole document when
    /// `root` is `None`) matching `selector`, in document order.
    fn locate(&self, root: Option<&Self::Node>, selector: &Selector<'_>) -> Option<Self::Node>;

    /// Returns the upper-case tag name of an element, `None` for non-elements.
    fn tag_name(&self, node: &Self::Node) -> Option<String>;

    /// Returns the `id` attribute of an element, `None` if unset or not an element.
    fn element_id(&self, node: &Self::Node) -> Option<String>;

    /// Returns the concatenated text of the node and its descendants.
    fn text_content(&self, node: &Self::Node) -> Option<String>;

    /// Replaces all children of `node` with a single text node.
    fn set_text_content(&mut self, node: &Self::Node, text: &str);

    /// Creates a detached inline element used as an overlay label.
    fn create_label(&mut self) -> Self::Node;

    /// Returns `true` if `node` is attached to the document.
    fn is_connected(&self, node: &Self::Node) -> bool;

    /// Inserts `child` before the first existing child of `parent`.
    fn prepend_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Inserts `child` after the last existing child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Adds a style sheet containing `css` to the document.
    fn inject_style(&mut self, css: &str);

    /// Starts observing child-list changes of `target`.
    fn observe(
        &mut self,
        target: &Self::Node,
        options: ObserveOptions,
        role: WatchRole,
    ) -> Self::Subscription;

    /// Stops a subscription and discards its undelivered notifications.
    fn disconnect(&mut self, subscription: Self::Subscription);
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString as _;

    #[test]
    fn selector_formats_as_css() {
        assert_eq!(Selector::Id("microformat").to_string(), "#microformat");
        assert_eq!(Selector::Class("ytp-time-wrapper").to_string(), ".ytp-time-wrapper");
        assert_eq!(Selector::Tag("SCRIPT").to_string(), "script");
    }

    #[test]
    fn lookup_from_option() {
        assert_eq!(Lookup::from(Some(3)), Lookup::Found(3));
        assert_eq!(Lookup::<u8>::from(None), Lookup::NotYetAvailable);
    }

    #[test]
    fn lookup_map_keeps_absence_reason() {
        assert_eq!(Lookup::Found(2).map(|v| v * 2), Lookup::Found(4));
        assert_eq!(Lookup::<u8>::Invalid.map(|v| v * 2), Lookup::Invalid);
        assert_eq!(Lookup::<u8>::Invalid.found(), None);
        assert!(!Lookup::<u8>::NotYetAvailable.is_found());
    }
}
