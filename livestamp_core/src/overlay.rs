// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay labels.
//!
//! [`Overlay`] owns the two label nodes injected around the player's native
//! time display: the start-time label reads to the left of it and the
//! original-time label to the right. The nodes are created once and reused
//! across every reset; they are inserted only when not already in the
//! document, so repeated attachment never duplicates them.

use alloc::format;
use alloc::string::String;

use crate::dom::Dom;
use crate::trace::Tracer;

/// Identifies one of the two overlay labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    /// Broadcast start time, left of the native display.
    Start,
    /// Computed wall-clock time, right of the native display.
    Original,
}

impl Label {
    /// Returns a short lowercase name for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Original => "original",
        }
    }
}

/// Which labels [`Overlay::ensure_attached`] inserted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Attached {
    /// The start-time label was inserted.
    pub start: bool,
    /// The original-time label was inserted.
    pub original: bool,
}

/// The start-time and original-time label nodes.
#[derive(Clone, Debug)]
pub struct Overlay<N> {
    start: N,
    original: N,
}

impl<N: Clone + PartialEq + core::fmt::Debug> Overlay<N> {
    /// Creates both (detached) label nodes.
    pub fn new<D: Dom<Node = N> + ?Sized>(dom: &mut D) -> Self {
        Self {
            start: dom.create_label(),
            original: dom.create_label(),
        }
    }

    /// Returns the node backing `label`.
    #[must_use]
    pub fn node(&self, label: Label) -> &N {
        match label {
            Label::Start => &self.start,
            Label::Original => &self.original,
        }
    }

    /// Clears both labels. Safe to call while detached.
    pub fn reset<D: Dom<Node = N> + ?Sized>(&self, dom: &mut D) {
        dom.set_text_content(&self.start, "");
        dom.set_text_content(&self.original, "");
    }

    /// Inserts whichever labels are not in the document: the start label
    /// before the wrapper's first child, the original label after its last.
    pub fn ensure_attached<D: Dom<Node = N> + ?Sized>(
        &self,
        dom: &mut D,
        wrapper: &N,
        tracer: &mut Tracer<'_>,
    ) -> Attached {
        let mut attached = Attached::default();
        if !dom.is_connected(&self.start) {
            dom.prepend_child(wrapper, &self.start);
            tracer.label_attached(Label::Start);
            attached.start = true;
        }
        if !dom.is_connected(&self.original) {
            dom.append_child(wrapper, &self.original);
            tracer.label_attached(Label::Original);
            attached.original = true;
        }
        attached
    }

    /// Sets the start-time label text.
    pub fn set_start_label<D: Dom<Node = N> + ?Sized>(&self, dom: &mut D, text: &str) {
        dom.set_text_content(&self.start, text);
    }

    /// Sets the original-time label text.
    pub fn set_original_label<D: Dom<Node = N> + ?Sized>(&self, dom: &mut D, text: &str) {
        dom.set_text_content(&self.original, text);
    }
}

/// Start-time label text: the time of day followed by a `+` marker, read as
/// "elapsed since".
#[must_use]
pub fn start_label_text(time_of_day: &str) -> String {
    format!("{time_of_day} + ")
}

/// Original-time label text: the date and time in parentheses.
#[must_use]
pub fn original_label_text(date_time: &str) -> String {
    format!(" ( {date_time} )")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryDom, NodeId};
    use alloc::vec;

    fn wrapper(dom: &mut MemoryDom) -> (NodeId, NodeId) {
        let wrapper = dom.create_element("div");
        let current = dom.create_element("span");
        dom.append_child(&wrapper, &current);
        let body = dom.body();
        dom.append_child(&body, &wrapper);
        (wrapper, current)
    }

    #[test]
    fn labels_surround_existing_children() {
        let mut dom = MemoryDom::new();
        let (wrapper, current) = wrapper(&mut dom);
        let overlay = Overlay::new(&mut dom);

        let attached = overlay.ensure_attached(&mut dom, &wrapper, &mut Tracer::none());
        assert_eq!(attached, Attached { start: true, original: true });
        assert_eq!(
            dom.children(wrapper),
            &[*overlay.node(Label::Start), current, *overlay.node(Label::Original)]
        );
    }

    #[test]
    fn attachment_is_idempotent() {
        let mut dom = MemoryDom::new();
        let (wrapper, _) = wrapper(&mut dom);
        let overlay = Overlay::new(&mut dom);
        overlay.ensure_attached(&mut dom, &wrapper, &mut Tracer::none());

        let again = overlay.ensure_attached(&mut dom, &wrapper, &mut Tracer::none());
        assert_eq!(again, Attached::default());
        assert_eq!(dom.children(wrapper).len(), 3);
    }

    #[test]
    fn detached_labels_move_to_a_new_wrapper() {
        let mut dom = MemoryDom::new();
        let (old, _) = wrapper(&mut dom);
        let overlay = Overlay::new(&mut dom);
        overlay.ensure_attached(&mut dom, &old, &mut Tracer::none());
        dom.remove(old);

        let (fresh, current) = wrapper(&mut dom);
        let attached = overlay.ensure_attached(&mut dom, &fresh, &mut Tracer::none());
        assert_eq!(attached, Attached { start: true, original: true });
        assert_eq!(
            dom.children(fresh).to_vec(),
            vec![*overlay.node(Label::Start), current, *overlay.node(Label::Original)]
        );
    }

    #[test]
    fn reset_clears_text_even_when_detached() {
        let mut dom = MemoryDom::new();
        let overlay = Overlay::new(&mut dom);
        overlay.set_start_label(&mut dom, "10:00:00 + ");
        overlay.set_original_label(&mut dom, " ( x )");
        overlay.reset(&mut dom);
        assert_eq!(
            dom.text_content(overlay.node(Label::Start)).as_deref(),
            Some("")
        );
        assert_eq!(
            dom.text_content(overlay.node(Label::Original)).as_deref(),
            Some("")
        );
    }

    #[test]
    fn label_texts() {
        assert_eq!(start_label_text("10:00:00"), "10:00:00 + ");
        assert_eq!(
            original_label_text("2024/03/01 (Fri) 10:10:00"),
            " ( 2024/03/01 (Fri) 10:10:00 )"
        );
    }
}
