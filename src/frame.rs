//! Search state and the checkpoint stack used for backtracking.
//!
//! A [`Frame`] is the whole state of one point in the search: the open
//! points, the open (partially connected) sections and the closed sections
//! gathered so far. Saving a frame copies all three sets at once, so a saved
//! state is always a consistent triple.

use crate::core::{PointId, Section};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Snapshot of the aggregation state.
///
/// # Invariants
/// - Every point anchoring a section of `open_sections` is in `open_points`.
/// - A point leaves `open_points` only when its last open section closes.
/// - `linkage` holds closed sections only.
///
/// All sets are ordered, so iteration (and therefore the search) is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frame {
    open_points: BTreeSet<PointId>,
    open_sections: BTreeSet<Section>,
    linkage: BTreeSet<Section>,
}

impl Frame {
    /// Creates an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Points that still have unconnected material.
    #[inline]
    pub fn open_points(&self) -> &BTreeSet<PointId> {
        &self.open_points
    }

    /// Sections that still carry at least one open connector.
    #[inline]
    pub fn open_sections(&self) -> &BTreeSet<Section> {
        &self.open_sections
    }

    /// Fully connected sections of the linkage under construction.
    #[inline]
    pub fn linkage(&self) -> &BTreeSet<Section> {
        &self.linkage
    }

    /// Returns true if nothing is open and nothing has been linked.
    pub fn is_empty(&self) -> bool {
        self.open_points.is_empty() && self.open_sections.is_empty() && self.linkage.is_empty()
    }

    /// Checks whether `section` is currently open in this frame.
    #[inline]
    pub fn is_open_section(&self, section: &Section) -> bool {
        self.open_sections.contains(section)
    }

    /// Checks whether `point` anchors an open or linked section.
    ///
    /// Open points that have no section in play yet (nucleation points not
    /// reached so far) do not count.
    pub fn anchors(&self, point: PointId) -> bool {
        self.open_sections.iter().any(|s| s.point() == point)
            || self.linkage.iter().any(|s| s.point() == point)
    }

    /// Number of sections in play (open plus linked).
    pub fn section_count(&self) -> usize {
        self.open_sections.len() + self.linkage.len()
    }

    /// Marks `point` as open.
    pub(crate) fn open_point(&mut self, point: PointId) {
        self.open_points.insert(point);
    }

    /// Adds an open section to the frame, opening its point.
    pub(crate) fn open_section(&mut self, section: Section) {
        debug_assert!(section.is_open(), "only open sections may be opened");
        self.open_points.insert(section.point());
        self.open_sections.insert(section);
    }

    /// Replaces `old` by its successor `new`.
    ///
    /// `old` leaves the open set unconditionally. An open successor is added
    /// to the open set and its point (re)opened; a closed one joins the
    /// linkage and its point is closed unless another open section still
    /// anchors on it.
    ///
    /// Returns whether `new` is still open.
    pub(crate) fn replace(&mut self, old: &Section, new: Section) -> bool {
        self.open_sections.remove(old);
        let point = new.point();
        if new.is_open() {
            self.open_points.insert(point);
            self.open_sections.insert(new);
            true
        } else {
            self.linkage.insert(new);
            if !self.open_sections.iter().any(|s| s.point() == point) {
                self.open_points.remove(&point);
            }
            false
        }
    }
}

/// Stack of saved frames, one per recursion level.
///
/// Every [`CheckpointStack::save`] must be matched by exactly one
/// [`CheckpointStack::restore`].
#[derive(Debug, Clone, Default)]
pub struct CheckpointStack {
    saved: Vec<Frame>,
}

impl CheckpointStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves a copy of `frame`.
    pub fn save(&mut self, frame: &Frame) {
        self.saved.push(frame.clone());
    }

    /// Restores the most recently saved frame into `frame`, discarding it
    /// from the stack.
    ///
    /// # Panics
    /// If the stack is empty: a restore without a matching save means the
    /// engine's bracketing is broken.
    pub fn restore(&mut self, frame: &mut Frame) {
        match self.saved.pop() {
            Some(saved) => *frame = saved,
            None => panic!("checkpoint stack underflow: pop without matching push"),
        }
    }

    /// Current depth (number of outstanding checkpoints).
    #[inline]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Returns true if no checkpoint is outstanding.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Connector, Link, LinkId, LinkType};

    fn section(point: u64, connectors: &[(&str, &str)]) -> Section {
        Section::new(
            PointId::new(point),
            connectors
                .iter()
                .map(|(t, p)| Connector::new(*t, *p).into())
                .collect(),
        )
    }

    fn link(from: u64, to: u64) -> Link {
        Link {
            id: LinkId::new(0),
            link_type: LinkType::new("S"),
            from: PointId::new(from),
            to: PointId::new(to),
        }
    }

    #[test]
    fn replace_with_open_successor() {
        let mut frame = Frame::new();
        let old = section(0, &[("S", "+"), ("O", "+")]);
        frame.open_section(old.clone());

        let new = old.with_link(0, link(0, 1));
        assert!(frame.replace(&old, new.clone()));
        assert!(!frame.is_open_section(&old));
        assert!(frame.is_open_section(&new));
        assert!(frame.open_points().contains(&PointId::new(0)));
        assert!(frame.linkage().is_empty());
    }

    #[test]
    fn replace_with_closed_successor_closes_point() {
        let mut frame = Frame::new();
        let old = section(0, &[("S", "+")]);
        frame.open_section(old.clone());

        let new = old.with_link(0, link(0, 1));
        assert!(!frame.replace(&old, new.clone()));
        assert!(frame.open_sections().is_empty());
        assert!(frame.linkage().contains(&new));
        assert!(frame.open_points().is_empty());
    }

    #[test]
    fn point_stays_open_while_another_section_is_open() {
        let mut frame = Frame::new();
        let first = section(0, &[("S", "+")]);
        let second = section(0, &[("O", "-")]);
        frame.open_section(first.clone());
        frame.open_section(second);

        frame.replace(&first, first.with_link(0, link(0, 1)));
        assert!(frame.open_points().contains(&PointId::new(0)));
    }

    #[test]
    fn replace_reopens_point_of_fresh_section() {
        let mut frame = Frame::new();
        let fresh = section(5, &[("S", "-"), ("O", "+")]);
        // `fresh` was never opened: it comes straight from the store.
        assert!(frame.replace(&fresh, fresh.with_link(0, link(1, 5))));
        assert!(frame.open_points().contains(&PointId::new(5)));
        assert!(frame.anchors(PointId::new(5)));
    }

    #[test]
    fn open_point_alone_is_not_an_anchor() {
        let mut frame = Frame::new();
        frame.open_point(PointId::new(3));
        assert!(frame.open_points().contains(&PointId::new(3)));
        assert!(!frame.anchors(PointId::new(3)));
    }

    #[test]
    fn restore_returns_exact_saved_state() {
        let mut frame = Frame::new();
        let mut stack = CheckpointStack::new();
        frame.open_point(PointId::new(0));
        let s = section(0, &[("S", "+")]);
        frame.open_section(s.clone());
        let before = frame.clone();

        stack.save(&frame);
        assert_eq!(stack.depth(), 1);
        frame.replace(&s, s.with_link(0, link(0, 1)));
        assert_ne!(frame, before);

        stack.restore(&mut frame);
        assert_eq!(frame, before);
        assert!(stack.is_empty());
    }

    #[test]
    #[should_panic(expected = "checkpoint stack underflow")]
    fn restore_on_empty_stack_panics() {
        let mut stack = CheckpointStack::new();
        let mut frame = Frame::new();
        stack.restore(&mut frame);
    }
}
