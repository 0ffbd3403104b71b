//! Graph store contract and an in-memory implementation.
//!
//! The engine never owns graph content. It reads sections and interns links
//! through [`GraphStore`], which is append-only: interning returns an
//! identity and never edits anything that was handed out before.

use crate::core::{Connector, Link, LinkId, LinkType, Point, PointId, Section, Slot};
use crate::error::StoreError;
use std::collections::{BTreeMap, HashMap};

/// Storage and lookup facility consumed by the aggregation engine.
///
/// # Contract
/// - Lookups reflect everything added or interned so far (read-your-writes).
/// - [`GraphStore::intern_link`] is idempotent: the same arguments always
///   return the same [`Link`].
/// - Lookup order is deterministic for a given sequence of insertions.
pub trait GraphStore {
    /// Sections anchored on `point` (incoming sections of a point).
    fn sections_of(&self, point: PointId) -> Vec<Section>;

    /// Sections holding `connector` in an open slot.
    fn sections_with(&self, connector: &Connector) -> Vec<Section>;

    /// Returns the connector if some stored section holds it in an open slot.
    ///
    /// Existence check by structural value; never creates anything.
    fn lookup_connector(&self, connector: &Connector) -> Option<Connector>;

    /// Interns the link `(link_type, from, to)`.
    fn intern_link(&mut self, link_type: &LinkType, from: PointId, to: PointId) -> Link;

    /// Returns the interned link `(link_type, from, to)` without creating it.
    fn lookup_link(&self, link_type: &LinkType, from: PointId, to: PointId) -> Option<Link>;

    /// Links having `point` as an endpoint (incoming links of a point).
    fn links_of(&self, point: PointId) -> Vec<Link>;

    /// Checks whether `point` is known to the store.
    fn contains_point(&self, point: PointId) -> bool;
}

/// In-memory graph store.
///
/// Points, sections and links are kept in insertion order; secondary indexes
/// map points and connectors to the sections and links referring to them.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    points: BTreeMap<PointId, Point>,
    names: HashMap<String, PointId>,
    sections: Vec<Section>,
    by_point: HashMap<PointId, Vec<usize>>,
    by_connector: HashMap<Connector, Vec<usize>>,
    section_index: HashMap<Section, usize>,
    links: Vec<Link>,
    link_index: HashMap<(LinkType, PointId, PointId), usize>,
    links_by_point: HashMap<PointId, Vec<usize>>,
    next_point: u64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named point, or returns the existing one with that name.
    pub fn add_point(&mut self, name: impl Into<String>) -> PointId {
        let name = name.into();
        if let Some(&id) = self.names.get(&name) {
            return id;
        }
        let id = PointId::new(self.next_point);
        self.next_point += 1;
        self.names.insert(name.clone(), id);
        self.points.insert(id, Point { id, name });
        id
    }

    /// Looks up a point by ID.
    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.points.get(&id)
    }

    /// Looks up a point by name.
    pub fn point_named(&self, name: &str) -> Option<PointId> {
        self.names.get(name).copied()
    }

    /// Adds a section anchored on `point`. Adding an identical section again
    /// returns the stored value and changes nothing.
    pub fn add_section(&mut self, point: PointId, slots: Vec<Slot>) -> Result<Section, StoreError> {
        if !self.points.contains_key(&point) {
            return Err(StoreError::UnknownPoint(point));
        }
        if slots.is_empty() {
            return Err(StoreError::EmptySection(point));
        }
        let section = Section::new(point, slots);
        if self.section_index.contains_key(&section) {
            return Ok(section);
        }
        let idx = self.sections.len();
        self.by_point.entry(point).or_default().push(idx);
        for (_, connector) in section.open_connectors() {
            let holders = self.by_connector.entry(connector.clone()).or_default();
            // A section holding the same connector twice is indexed once.
            if holders.last() != Some(&idx) {
                holders.push(idx);
            }
        }
        self.section_index.insert(section.clone(), idx);
        self.sections.push(section.clone());
        Ok(section)
    }

    /// Convenience: adds a section made only of open connectors.
    pub fn add_connectors<I>(&mut self, point: PointId, connectors: I) -> Result<Section, StoreError>
    where
        I: IntoIterator<Item = Connector>,
    {
        self.add_section(point, connectors.into_iter().map(Slot::Open).collect())
    }

    /// Returns the number of points.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Returns the number of stored sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Returns the number of interned links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Iterates over all stored sections in insertion order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }
}

impl GraphStore for MemoryStore {
    fn sections_of(&self, point: PointId) -> Vec<Section> {
        self.by_point
            .get(&point)
            .map(|idxs| idxs.iter().map(|&i| self.sections[i].clone()).collect())
            .unwrap_or_default()
    }

    fn sections_with(&self, connector: &Connector) -> Vec<Section> {
        self.by_connector
            .get(connector)
            .map(|idxs| idxs.iter().map(|&i| self.sections[i].clone()).collect())
            .unwrap_or_default()
    }

    fn lookup_connector(&self, connector: &Connector) -> Option<Connector> {
        self.by_connector
            .get(connector)
            .filter(|idxs| !idxs.is_empty())
            .map(|_| connector.clone())
    }

    fn intern_link(&mut self, link_type: &LinkType, from: PointId, to: PointId) -> Link {
        let key = (link_type.clone(), from, to);
        if let Some(&idx) = self.link_index.get(&key) {
            return self.links[idx].clone();
        }
        let idx = self.links.len();
        let link = Link {
            id: LinkId::new(idx as u64),
            link_type: link_type.clone(),
            from,
            to,
        };
        self.links.push(link.clone());
        self.link_index.insert(key, idx);
        self.links_by_point.entry(from).or_default().push(idx);
        if to != from {
            self.links_by_point.entry(to).or_default().push(idx);
        }
        link
    }

    fn lookup_link(&self, link_type: &LinkType, from: PointId, to: PointId) -> Option<Link> {
        self.link_index
            .get(&(link_type.clone(), from, to))
            .map(|&idx| self.links[idx].clone())
    }

    fn links_of(&self, point: PointId) -> Vec<Link> {
        self.links_by_point
            .get(&point)
            .map(|idxs| idxs.iter().map(|&i| self.links[i].clone()).collect())
            .unwrap_or_default()
    }

    fn contains_point(&self, point: PointId) -> bool {
        self.points.contains_key(&point)
    }
}
