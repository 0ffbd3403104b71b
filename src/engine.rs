//! The aggregation engine: depth-first assembly of sections into linkages.
//!
//! Starting from a nucleation point, the engine repeatedly picks an open
//! connector, asks the policy for compatible connectors, and tries every
//! resulting connection. Each attempt is bracketed by a checkpoint save and
//! restore, so sibling branches always start from the same state. A path
//! ends as a solution when no open section is left.
//!
//! # Determinism
//! - Nucleation points are examined in point order.
//! - Open sections are iterated in section order (ordered sets).
//! - Candidate sections: open sections of the frame first (section order),
//!   then the store's lookup order.
//!
//! # Citations
//! - Backtracking search: Knuth, "The Art of Computer Programming", Vol. 4, Fascicle 5 (2019)
//! - Link grammar linkages: Sleator & Temperley, "Parsing English with a Link Grammar" (1991)

use crate::core::{Connector, Link, PointId, Section};
use crate::error::{AggregateError, AggregateResult};
use crate::frame::{CheckpointStack, Frame};
use crate::policy::{JoinProposal, Policy};
use crate::solution::{Solution, SolutionSet};
use crate::store::GraphStore;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Counters collected during one `aggregate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Checkpoints saved.
    pub pushes: u64,
    /// Checkpoints restored.
    pub pops: u64,
    /// Connections applied that closed a cycle.
    pub cycle_joins: u64,
    /// Connections applied that attached new material.
    pub tree_joins: u64,
    /// Proposals vetoed by the policy.
    pub vetoes: u64,
    /// Sections found with a connector that has no candidate.
    pub dead_ends: u64,
    /// Paths halted by `recurse`.
    pub halts: u64,
    /// Completed linkages (including duplicates).
    pub solutions_found: u64,
    /// Completed linkages that were already in the solution set.
    pub duplicates: u64,
    /// Deepest checkpoint depth reached.
    pub max_depth: usize,
}

/// Aggregation engine over a graph store.
///
/// The engine owns the live [`Frame`] and the checkpoint stack for the
/// duration of an [`Aggregate::aggregate`] call; both are empty again when it
/// returns.
pub struct Aggregate<'s> {
    store: &'s mut dyn GraphStore,
    frame: Frame,
    stack: CheckpointStack,
    nuclei: BTreeSet<PointId>,
    solutions: SolutionSet,
    stats: SearchStats,
}

impl<'s> Aggregate<'s> {
    /// Creates an engine reading from and interning into `store`.
    pub fn new(store: &'s mut dyn GraphStore) -> Self {
        Self {
            store,
            frame: Frame::new(),
            stack: CheckpointStack::new(),
            nuclei: BTreeSet::new(),
            solutions: SolutionSet::new(),
            stats: SearchStats::default(),
        }
    }

    /// The live frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Number of outstanding checkpoints.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Counters of the most recent `aggregate` call.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Builds every distinct linkage reachable from `nuclei`.
    ///
    /// All nucleation points are opened before the search starts. The search
    /// is seeded from the first nucleation point (in point order) that has
    /// an open section; each of its open sections is explored as a separate
    /// branch. Only linkages anchoring every nucleation point are kept.
    ///
    /// # Errors
    /// - [`AggregateError::EmptyNuclei`] if `nuclei` is empty.
    /// - [`AggregateError::UnknownPoint`] if a nucleation point is not in the store.
    /// - [`AggregateError::NoStartingSection`] if a nucleation point has no
    ///   section at all, or if none has an open section.
    ///
    /// A search that finds nothing returns an empty set, not an error.
    #[tracing::instrument(skip(self, nuclei, policy), fields(nuclei = nuclei.len()))]
    pub fn aggregate<P: Policy>(
        &mut self,
        nuclei: &BTreeSet<PointId>,
        policy: &mut P,
    ) -> AggregateResult<SolutionSet> {
        let first = *nuclei.iter().next().ok_or(AggregateError::EmptyNuclei)?;
        if let Some(&unknown) = nuclei.iter().find(|&&p| !self.store.contains_point(p)) {
            return Err(AggregateError::UnknownPoint(unknown));
        }
        if let Some(&bare) = nuclei
            .iter()
            .find(|&&p| self.store.sections_of(p).is_empty())
        {
            return Err(AggregateError::NoStartingSection { point: bare });
        }

        let seeds = nuclei
            .iter()
            .map(|&point| {
                let open: Vec<Section> = self
                    .store
                    .sections_of(point)
                    .into_iter()
                    .filter(Section::is_open)
                    .collect();
                (point, open)
            })
            .find(|(_, open)| !open.is_empty());
        let Some((nucleus, sections)) = seeds else {
            return Err(AggregateError::NoStartingSection { point: first });
        };
        debug!(%nucleus, sections = sections.len(), "seeding aggregation");

        policy.reset();
        self.frame = Frame::new();
        self.stack = CheckpointStack::new();
        self.nuclei = nuclei.clone();
        self.solutions = SolutionSet::new();
        self.stats = SearchStats::default();
        for &point in nuclei {
            self.frame.open_point(point);
        }

        for section in sections {
            self.push(policy);
            self.frame.open_section(section);
            self.extend(policy);
            self.pop(policy);
        }

        debug_assert!(self.stack.is_empty(), "unbalanced checkpoint stack");
        self.frame = Frame::new();
        debug!(
            solutions = self.solutions.len(),
            found = self.stats.solutions_found,
            duplicates = self.stats.duplicates,
            max_depth = self.stats.max_depth,
            "aggregation finished"
        );
        Ok(std::mem::take(&mut self.solutions))
    }

    /// Explores the current frame one step further.
    ///
    /// Returns `false` when this path is finished: halted by the policy,
    /// completed as a solution, or stuck on an unconnectable section.
    fn extend<P: Policy>(&mut self, policy: &mut P) -> bool {
        if !policy.recurse(&self.frame) {
            self.stats.halts += 1;
            trace!(depth = self.stack.depth(), "path halted by policy");
            return false;
        }

        if self.frame.open_sections().is_empty() {
            self.record_solution();
            return false;
        }

        // Connecting mutates the open set; iterate over a copy.
        let snapshot: Vec<Section> = self.frame.open_sections().iter().cloned().collect();
        for section in &snapshot {
            if !self.extend_section(section, policy) {
                return false;
            }
        }
        true
    }

    /// Attempts every open connector of `section`.
    ///
    /// Returns `false` as soon as one connector has no candidate at all: the
    /// section can never close in this state, and neither can the path.
    fn extend_section<P: Policy>(&mut self, section: &Section, policy: &mut P) -> bool {
        let open: Vec<(usize, Connector)> = section
            .open_connectors()
            .map(|(idx, c)| (idx, c.clone()))
            .collect();
        for (slot, connector) in &open {
            let joints = policy.joints(&*self.store, connector);
            if joints.is_empty() {
                self.stats.dead_ends += 1;
                trace!(%section, %connector, "no joints; section is unconnectable");
                return false;
            }
            for candidate in &joints {
                self.join_connector(section, *slot, candidate, true, policy);
                self.join_connector(section, *slot, candidate, false, policy);
            }
        }
        true
    }

    /// Tries to join slot `from_slot` of `from` to every other section that
    /// holds `candidate` open, restricted to one cycle partition.
    ///
    /// With `close_cycle` the other section must already be open in the
    /// frame; without it, it must not be.
    fn join_connector<P: Policy>(
        &mut self,
        from: &Section,
        from_slot: usize,
        candidate: &Connector,
        close_cycle: bool,
        policy: &mut P,
    ) {
        let Some(from_connector) = from.connector_at(from_slot) else {
            return;
        };
        for (to, to_slot) in self.candidate_sections(from, candidate) {
            let proposal = JoinProposal {
                close_cycle,
                from_section: from,
                from_connector,
                to_section: &to,
                to_connector: candidate,
            };
            if !policy.connect(&self.frame, &proposal) {
                self.stats.vetoes += 1;
                continue;
            }
            if self.frame.is_open_section(&to) != close_cycle {
                continue;
            }

            self.push(policy);
            if close_cycle {
                self.stats.cycle_joins += 1;
            } else {
                self.stats.tree_joins += 1;
            }
            trace!(%from, %to, close_cycle, depth = self.stack.depth(), "connecting");
            self.connect_section(from, from_slot, &to, to_slot, policy);
            self.extend(policy);
            self.pop(policy);
        }
    }

    /// Sections other than `from` holding `connector` in an open slot, paired
    /// with the index of the first such slot.
    fn candidate_sections(&self, from: &Section, connector: &Connector) -> Vec<(Section, usize)> {
        let mut found: Vec<(Section, usize)> = Vec::new();
        let open = self.frame.open_sections().iter().cloned();
        for section in open.chain(self.store.sections_with(connector)) {
            if &section == from || found.iter().any(|(s, _)| *s == section) {
                continue;
            }
            if let Some(slot) = section.find_open(connector) {
                found.push((section, slot));
            }
        }
        found
    }

    /// Resolves `from[from_slot]` against `to[to_slot]` with a single link.
    fn connect_section<P: Policy>(
        &mut self,
        from: &Section,
        from_slot: usize,
        to: &Section,
        to_slot: usize,
        policy: &mut P,
    ) {
        let (Some(from_connector), Some(to_connector)) =
            (from.connector_at(from_slot), to.connector_at(to_slot))
        else {
            return;
        };
        let link = policy.make_link(
            &mut *self.store,
            from_connector,
            to_connector,
            from.point(),
            to.point(),
        );
        self.make_link(from, from_slot, &link);
        self.make_link(to, to_slot, &link);
    }

    /// Replaces slot `slot` of `section` with `link` and updates the frame.
    ///
    /// Returns whether the resulting section is still open.
    fn make_link(&mut self, section: &Section, slot: usize, link: &Link) -> bool {
        let linked = section.with_link(slot, link.clone());
        self.frame.replace(section, linked)
    }

    /// Records the current linkage if it anchors every nucleation point.
    fn record_solution(&mut self) {
        let linkage = self.frame.linkage();
        debug_assert!(linkage.iter().all(|s| !s.is_open()), "open section in linkage");
        if let Some(missing) = self
            .nuclei
            .iter()
            .find(|&&p| !linkage.iter().any(|s| s.point() == p))
        {
            trace!(%missing, "linkage does not reach every nucleation point");
            return;
        }
        self.stats.solutions_found += 1;
        let solution = Solution::new(linkage.clone());
        if self.solutions.insert(solution) {
            debug!(
                sections = linkage.len(),
                total = self.solutions.len(),
                "new solution"
            );
        } else {
            self.stats.duplicates += 1;
        }
    }

    /// Saves the frame and notifies the policy.
    fn push<P: Policy>(&mut self, policy: &mut P) {
        policy.push(&self.frame);
        self.stack.save(&self.frame);
        self.stats.pushes += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.stack.depth());
    }

    /// Restores the frame and notifies the policy.
    ///
    /// # Panics
    /// On a pop without a matching push.
    fn pop<P: Policy>(&mut self, policy: &mut P) {
        self.stack.restore(&mut self.frame);
        self.stats.pops += 1;
        policy.pop(&self.frame);
    }
}

/// Runs one aggregation over `store`.
///
/// Shorthand for `Aggregate::new(store).aggregate(nuclei, policy)`.
pub fn aggregate<P: Policy>(
    store: &mut dyn GraphStore,
    nuclei: &BTreeSet<PointId>,
    policy: &mut P,
) -> AggregateResult<SolutionSet> {
    Aggregate::new(store).aggregate(nuclei, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Slot;
    use crate::pole::PoleTable;
    use crate::policy::StandardPolicy;
    use crate::store::MemoryStore;

    fn policy() -> StandardPolicy {
        StandardPolicy::new(PoleTable::symmetric([("+", "-")]))
    }

    fn c(ty: &str, pole: &str) -> Connector {
        Connector::new(ty, pole)
    }

    /// Policy that forwards to `StandardPolicy` and records what the engine
    /// asked for.
    struct Recording {
        inner: StandardPolicy,
        pushes: usize,
        pops: usize,
        depth: usize,
        max_depth: usize,
        links: usize,
    }

    impl Recording {
        fn new(inner: StandardPolicy) -> Self {
            Self {
                inner,
                pushes: 0,
                pops: 0,
                depth: 0,
                max_depth: 0,
                links: 0,
            }
        }
    }

    impl Policy for Recording {
        fn reset(&mut self) {
            self.inner.reset();
        }

        fn recurse(&mut self, frame: &Frame) -> bool {
            self.inner.recurse(frame)
        }

        fn joints(&self, store: &dyn GraphStore, connector: &Connector) -> Vec<Connector> {
            self.inner.joints(store, connector)
        }

        fn connect(&self, frame: &Frame, proposal: &JoinProposal<'_>) -> bool {
            self.inner.connect(frame, proposal)
        }

        fn make_link(
            &mut self,
            store: &mut dyn GraphStore,
            from_connector: &Connector,
            to_connector: &Connector,
            from_point: PointId,
            to_point: PointId,
        ) -> Link {
            self.links += 1;
            self.inner
                .make_link(store, from_connector, to_connector, from_point, to_point)
        }

        fn push(&mut self, frame: &Frame) {
            self.pushes += 1;
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
            self.inner.push(frame);
        }

        fn pop(&mut self, frame: &Frame) {
            self.pops += 1;
            self.depth -= 1;
            self.inner.pop(frame);
        }
    }

    fn ring() -> (MemoryStore, PointId, PointId, PointId) {
        let mut store = MemoryStore::new();
        let a = store.add_point("a");
        let b = store.add_point("b");
        let cc = store.add_point("c");
        store.add_connectors(a, [c("X", "+"), c("Z", "-")]).unwrap();
        store.add_connectors(b, [c("X", "-"), c("Y", "+")]).unwrap();
        store.add_connectors(cc, [c("Y", "-"), c("Z", "+")]).unwrap();
        (store, a, b, cc)
    }

    #[test]
    fn empty_nuclei_is_an_error() {
        let mut store = MemoryStore::new();
        let result = aggregate(&mut store, &BTreeSet::new(), &mut policy());
        assert!(matches!(result, Err(AggregateError::EmptyNuclei)));
    }

    #[test]
    fn unknown_nucleus_is_an_error() {
        let mut store = MemoryStore::new();
        let ghost = PointId::new(9);
        let result = aggregate(&mut store, &BTreeSet::from([ghost]), &mut policy());
        assert!(matches!(result, Err(AggregateError::UnknownPoint(p)) if p == ghost));
    }

    #[test]
    fn nucleus_without_sections_is_an_error() {
        let mut store = MemoryStore::new();
        let a = store.add_point("a");
        let result = aggregate(&mut store, &BTreeSet::from([a]), &mut policy());
        assert!(matches!(
            result,
            Err(AggregateError::NoStartingSection { point }) if point == a
        ));
    }

    #[test]
    fn nucleus_with_only_closed_sections_is_an_error() {
        let mut store = MemoryStore::new();
        let a = store.add_point("a");
        let b = store.add_point("b");
        let link = store.intern_link(&crate::core::LinkType::new("S"), a, b);
        store.add_section(a, vec![Slot::Linked(link)]).unwrap();
        let result = aggregate(&mut store, &BTreeSet::from([a]), &mut policy());
        assert!(matches!(result, Err(AggregateError::NoStartingSection { .. })));
    }

    #[test]
    fn any_nucleus_without_sections_is_an_error() {
        let mut store = MemoryStore::new();
        let a = store.add_point("a");
        let b = store.add_point("b");
        let ghost = store.add_point("ghost");
        store.add_connectors(a, [c("S", "+")]).unwrap();
        store.add_connectors(b, [c("S", "-")]).unwrap();

        let result = aggregate(&mut store, &BTreeSet::from([a, ghost]), &mut policy());
        assert!(matches!(
            result,
            Err(AggregateError::NoStartingSection { point }) if point == ghost
        ));
    }

    #[test]
    fn reused_policy_gives_identical_results() {
        let mut store = MemoryStore::new();
        let a = store.add_point("a");
        let b = store.add_point("b");
        store.add_connectors(a, [c("S", "+")]).unwrap();
        store.add_connectors(b, [c("S", "-")]).unwrap();
        let nuclei = BTreeSet::from([a]);

        let config = crate::config::AggregateConfig::default().with_max_steps(3);
        let mut shared = StandardPolicy::from_config(&config).unwrap();
        let first = aggregate(&mut store, &nuclei, &mut shared).unwrap();
        let second = aggregate(&mut store, &nuclei, &mut shared).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn expired_time_budget_halts_the_search() {
        let mut store = MemoryStore::new();
        let a = store.add_point("a");
        let b = store.add_point("b");
        store.add_connectors(a, [c("S", "+")]).unwrap();
        store.add_connectors(b, [c("S", "-")]).unwrap();

        let config = crate::config::AggregateConfig::default()
            .with_time_budget(std::time::Duration::ZERO);
        let mut expired = StandardPolicy::from_config(&config).unwrap();
        let mut engine = Aggregate::new(&mut store);
        let solutions = engine.aggregate(&BTreeSet::from([a]), &mut expired).unwrap();
        assert!(solutions.is_empty());
        assert_eq!(engine.stats().halts, 1);
        assert_eq!(engine.stats().tree_joins, 0);
    }

    #[test]
    fn every_nucleus_must_be_anchored() {
        let mut store = MemoryStore::new();
        let lonely = store.add_point("lonely");
        let a = store.add_point("a");
        let b = store.add_point("b");
        store.add_connectors(a, [c("S", "+")]).unwrap();
        store.add_connectors(b, [c("S", "-")]).unwrap();
        store.add_connectors(lonely, [c("Q", "+")]).unwrap();

        let both = aggregate(&mut store, &BTreeSet::from([a, b]), &mut policy()).unwrap();
        assert_eq!(both.len(), 1);

        // `lonely` comes first but its only section can never close.
        let stranded = aggregate(&mut store, &BTreeSet::from([lonely, b]), &mut policy()).unwrap();
        assert!(stranded.is_empty());
    }

    #[test]
    fn later_nucleus_can_seed_the_search() {
        let mut store = MemoryStore::new();
        let wall = store.add_point("wall");
        let a = store.add_point("a");
        let b = store.add_point("b");
        let link = store.intern_link(&crate::core::LinkType::new("K"), wall, a);
        store.add_section(wall, vec![Slot::Linked(link)]).unwrap();
        store.add_connectors(a, [c("S", "+")]).unwrap();
        store.add_connectors(b, [c("S", "-")]).unwrap();

        // `wall` has only a closed section, so `a` seeds; `wall` is never
        // anchored by the resulting linkage.
        let result = aggregate(&mut store, &BTreeSet::from([wall, a]), &mut policy()).unwrap();
        assert!(result.is_empty());
        let result = aggregate(&mut store, &BTreeSet::from([a]), &mut policy()).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn stack_is_balanced_and_frame_cleared() {
        let (mut store, a, _, _) = ring();
        let mut recording = Recording::new(policy());
        let mut engine = Aggregate::new(&mut store);
        let solutions = engine.aggregate(&BTreeSet::from([a]), &mut recording).unwrap();
        assert_eq!(solutions.len(), 1);
        assert_eq!(recording.pushes, recording.pops);
        assert_eq!(recording.depth, 0);
        assert_eq!(engine.depth(), 0);
        assert!(engine.frame().is_empty());

        let stats = engine.stats();
        assert_eq!(stats.pushes, stats.pops);
        assert_eq!(stats.pushes as usize, recording.pushes);
        assert_eq!(stats.max_depth, recording.max_depth);
        assert!(stats.cycle_joins >= 1);
        assert!(stats.tree_joins >= 2);
        assert!(stats.duplicates >= 1);
    }

    #[test]
    fn applied_joins_respect_cycle_partition() {
        // Capture (close_cycle, candidate-is-open) for every applied join by
        // checking membership right before the link is made.
        struct Checked {
            inner: StandardPolicy,
            seen: std::cell::RefCell<Vec<(bool, bool)>>,
            applied: Vec<(bool, bool)>,
        }

        impl Policy for Checked {
            fn reset(&mut self) {
                self.inner.reset()
            }
            fn recurse(&mut self, frame: &Frame) -> bool {
                self.inner.recurse(frame)
            }
            fn joints(&self, store: &dyn GraphStore, connector: &Connector) -> Vec<Connector> {
                self.inner.joints(store, connector)
            }
            fn connect(&self, frame: &Frame, proposal: &JoinProposal<'_>) -> bool {
                let ok = self.inner.connect(frame, proposal);
                if ok {
                    let open = frame.is_open_section(proposal.to_section);
                    self.seen.borrow_mut().push((proposal.close_cycle, open));
                }
                ok
            }
            fn make_link(
                &mut self,
                store: &mut dyn GraphStore,
                from_connector: &Connector,
                to_connector: &Connector,
                from_point: PointId,
                to_point: PointId,
            ) -> Link {
                if let Some(last) = self.seen.borrow().last() {
                    self.applied.push(*last);
                }
                self.inner
                    .make_link(store, from_connector, to_connector, from_point, to_point)
            }
            fn push(&mut self, frame: &Frame) {
                self.inner.push(frame)
            }
            fn pop(&mut self, frame: &Frame) {
                self.inner.pop(frame)
            }
        }

        let (mut store, a, _, _) = ring();
        let mut checked = Checked {
            inner: policy(),
            seen: std::cell::RefCell::new(Vec::new()),
            applied: Vec::new(),
        };
        aggregate(&mut store, &BTreeSet::from([a]), &mut checked).unwrap();
        assert!(!checked.applied.is_empty());
        for (close_cycle, was_open) in &checked.applied {
            assert_eq!(close_cycle, was_open);
        }
        assert!(checked.applied.iter().any(|(cycle, _)| *cycle));
        assert!(checked.applied.iter().any(|(cycle, _)| !*cycle));
    }

    #[test]
    fn self_join_is_never_proposed() {
        // One section holding both ends of the same link type.
        let mut store = MemoryStore::new();
        let a = store.add_point("a");
        store.add_connectors(a, [c("S", "+"), c("S", "-")]).unwrap();
        let mut recording = Recording::new(policy());
        let result = aggregate(&mut store, &BTreeSet::from([a]), &mut recording).unwrap();
        assert!(result.is_empty());
        assert_eq!(recording.links, 0);
        assert_eq!(recording.pushes, 1);
        assert_eq!(store.link_count(), 0);
    }

    #[test]
    fn alternative_starting_sections_are_separate_branches() {
        let mut store = MemoryStore::new();
        let wall = store.add_point("wall");
        let cat = store.add_point("cat");
        let dog = store.add_point("dog");
        store.add_connectors(wall, [c("W", "+")]).unwrap();
        store.add_connectors(wall, [c("Q", "+")]).unwrap();
        store.add_connectors(cat, [c("W", "-")]).unwrap();
        store.add_connectors(dog, [c("Q", "-")]).unwrap();

        let solutions = aggregate(&mut store, &BTreeSet::from([wall]), &mut policy()).unwrap();
        assert_eq!(solutions.len(), 2);
        let anchored: Vec<BTreeSet<PointId>> = solutions.iter().map(Solution::points).collect();
        assert!(anchored.contains(&BTreeSet::from([wall, cat])));
        assert!(anchored.contains(&BTreeSet::from([wall, dog])));
    }

    #[test]
    fn branching_tree_is_enumerated() {
        // wall links to a subject; the subject takes one of two objects.
        let mut store = MemoryStore::new();
        let wall = store.add_point("wall");
        let verb = store.add_point("sees");
        let cat = store.add_point("cat");
        let dog = store.add_point("dog");
        store.add_connectors(wall, [c("W", "+")]).unwrap();
        store.add_connectors(verb, [c("W", "-"), c("O", "+")]).unwrap();
        store.add_connectors(cat, [c("O", "-")]).unwrap();
        store.add_connectors(dog, [c("O", "-")]).unwrap();

        let solutions = aggregate(&mut store, &BTreeSet::from([wall]), &mut policy()).unwrap();
        assert_eq!(solutions.len(), 2);
        for solution in &solutions {
            assert!(solution.is_closed());
            assert_eq!(solution.len(), 3);
            assert_eq!(solution.links().len(), 2);
        }
    }

    #[test]
    fn repeated_points_grow_until_the_depth_budget() {
        // A chain element that can attach copies of itself forever.
        let mut store = MemoryStore::new();
        let head = store.add_point("head");
        let link = store.add_point("link");
        store.add_connectors(head, [c("L", "+")]).unwrap();
        store.add_connectors(link, [c("L", "-"), c("L", "+")]).unwrap();
        store.add_connectors(link, [c("L", "-")]).unwrap();

        let config = crate::config::AggregateConfig::default()
            .with_repeated_points(true)
            .with_max_depth(4);
        let mut bounded = StandardPolicy::from_config(&config).unwrap();
        let mut engine = Aggregate::new(&mut store);
        let solutions = engine.aggregate(&BTreeSet::from([head]), &mut bounded).unwrap();
        assert!(engine.stats().halts > 0);
        assert!(engine.stats().max_depth <= 5);
        assert!(!solutions.is_empty());
        for solution in &solutions {
            assert!(solution.is_closed());
            assert!(solution.anchors(head));
        }
    }
}
