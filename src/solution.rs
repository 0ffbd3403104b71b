//! Solutions and the deduplicated solution set.
//!
//! A solution is the linkage captured when a search path has no open section
//! left. Two paths that reach the same set of sections, in whatever order,
//! produce the same solution.

use crate::core::{Link, PointId, Section};
use crate::error::AggregateResult;
use crate::fingerprint::{Canonicalizable, HashValue, DOMAIN_SECTION_V0, DOMAIN_SOLUTION_V0};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A complete linkage: a set of fully connected sections.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Solution {
    sections: BTreeSet<Section>,
}

impl Solution {
    /// Wraps a linkage.
    pub fn new(sections: BTreeSet<Section>) -> Self {
        Self { sections }
    }

    /// Sections of the linkage, in section order.
    #[inline]
    pub fn sections(&self) -> &BTreeSet<Section> {
        &self.sections
    }

    /// Number of sections.
    #[inline]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns true if the linkage holds no section.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Checks that no section has an open connector left.
    pub fn is_closed(&self) -> bool {
        self.sections.iter().all(|s| !s.is_open())
    }

    /// Points anchoring the sections.
    pub fn points(&self) -> BTreeSet<PointId> {
        self.sections.iter().map(Section::point).collect()
    }

    /// Checks whether `point` anchors some section.
    pub fn anchors(&self, point: PointId) -> bool {
        self.sections.iter().any(|s| s.point() == point)
    }

    /// Distinct links of the linkage.
    pub fn links(&self) -> BTreeSet<Link> {
        self.sections
            .iter()
            .flat_map(|s| s.links().cloned())
            .collect()
    }

    /// Deterministic fingerprint of the linkage.
    pub fn fingerprint(&self) -> HashValue {
        Canonicalizable::fingerprint(self, DOMAIN_SOLUTION_V0)
    }

    /// Consumes the solution, returning its sections in order.
    pub fn into_sections(self) -> Vec<Section> {
        self.sections.into_iter().collect()
    }
}

impl Canonicalizable for Solution {
    fn write_canonical(&self, out: &mut Vec<u8>) {
        // Section fingerprints are sorted so the encoding does not depend on
        // the ID-based order of the set.
        let mut hashes: Vec<HashValue> = self
            .sections
            .iter()
            .map(|s| s.fingerprint(DOMAIN_SECTION_V0))
            .collect();
        hashes.sort();
        out.extend_from_slice(&(hashes.len() as u64).to_le_bytes());
        for hash in &hashes {
            out.extend_from_slice(hash.as_bytes());
        }
    }
}

/// Deduplicated set of solutions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SolutionSet {
    solutions: BTreeSet<Solution>,
}

impl SolutionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a solution. Returns `false` if an equal one was already present.
    pub fn insert(&mut self, solution: Solution) -> bool {
        self.solutions.insert(solution)
    }

    /// Checks membership.
    pub fn contains(&self, solution: &Solution) -> bool {
        self.solutions.contains(solution)
    }

    /// Number of distinct solutions.
    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    /// Returns true if no solution was found.
    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Iterates over solutions in order.
    pub fn iter(&self) -> impl Iterator<Item = &Solution> {
        self.solutions.iter()
    }

    /// Fingerprints of every solution, sorted.
    pub fn fingerprints(&self) -> Vec<HashValue> {
        let mut out: Vec<_> = self.solutions.iter().map(Solution::fingerprint).collect();
        out.sort();
        out
    }

    /// Transportable form: one collection of sections per solution.
    pub fn into_nested(self) -> Vec<Vec<Section>> {
        self.solutions
            .into_iter()
            .map(Solution::into_sections)
            .collect()
    }

    /// Serializes the set to CBOR bytes.
    pub fn to_cbor(&self) -> AggregateResult<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Deserializes a set from CBOR bytes.
    pub fn from_cbor(bytes: &[u8]) -> AggregateResult<Self> {
        Ok(serde_cbor::from_slice(bytes)?)
    }
}

impl IntoIterator for SolutionSet {
    type Item = Solution;
    type IntoIter = std::collections::btree_set::IntoIter<Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.into_iter()
    }
}

impl<'a> IntoIterator for &'a SolutionSet {
    type Item = &'a Solution;
    type IntoIter = std::collections::btree_set::Iter<'a, Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Connector, LinkId, LinkType};

    fn linked(point: u64, other: u64) -> Section {
        let link = Link {
            id: LinkId::new(0),
            link_type: LinkType::new("S"),
            from: PointId::new(point.min(other)),
            to: PointId::new(point.max(other)),
        };
        Section::new(PointId::new(point), vec![link.into()])
    }

    #[test]
    fn dedup_ignores_discovery_order() {
        let mut set = SolutionSet::new();
        let first = Solution::new([linked(0, 1), linked(1, 0)].into_iter().collect());
        let second = Solution::new([linked(1, 0), linked(0, 1)].into_iter().collect());
        assert!(set.insert(first));
        assert!(!set.insert(second));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn closure_and_anchors() {
        let closed = Solution::new([linked(0, 1), linked(1, 0)].into_iter().collect());
        assert!(closed.is_closed());
        assert!(closed.anchors(PointId::new(1)));
        assert!(!closed.anchors(PointId::new(2)));
        assert_eq!(closed.links().len(), 1);
        assert_eq!(closed.points().len(), 2);

        let open = Solution::new(
            [Section::new(PointId::new(0), vec![Connector::new("S", "+").into()])]
                .into_iter()
                .collect(),
        );
        assert!(!open.is_closed());
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = Solution::new([linked(0, 1), linked(1, 0)].into_iter().collect());
        let b = Solution::new([linked(0, 2), linked(2, 0)].into_iter().collect());
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn cbor_preserves_the_set() {
        let mut set = SolutionSet::new();
        set.insert(Solution::new([linked(0, 1), linked(1, 0)].into_iter().collect()));
        set.insert(Solution::new([linked(0, 2), linked(2, 0)].into_iter().collect()));
        let bytes = set.to_cbor().expect("serialization should succeed");
        let decoded = SolutionSet::from_cbor(&bytes).expect("deserialization should succeed");
        assert_eq!(decoded, set);
        assert_eq!(decoded.fingerprints(), set.fingerprints());
    }

    #[test]
    fn nested_form() {
        let mut set = SolutionSet::new();
        set.insert(Solution::new([linked(0, 1), linked(1, 0)].into_iter().collect()));
        let nested = set.into_nested();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].len(), 2);
    }
}
