//! Core data structures for section aggregation.
//!
//! A section is a point together with an ordered sequence of slots. Each slot
//! is either an open connector (a typed, polarized edge requirement) or a
//! resolved link. Sections are values: connecting one never edits it in
//! place, it produces a new section with one slot replaced.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a point (the anchor node of a section).
///
/// # Invariant
/// - `PointId`s are unique within a given graph store.
/// - Equality and hash are based solely on the inner `u64`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(u64);

impl PointId {
    /// Creates a new `PointId` from a raw `u64`.
    ///
    /// Prefer the store's point creation methods; the caller must ensure
    /// uniqueness.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw `u64` representation.
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Hash for PointId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PointId({})", self.0)
    }
}

/// A named point held by a graph store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Unique identifier.
    pub id: PointId,
    /// Human-readable name (e.g. a word, or "LEFT-WALL").
    pub name: String,
}

/// Type tag shared by a connector and the link that resolves it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkType(String);

impl LinkType {
    /// Creates a link type from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directional tag on a connector (e.g. `+` / `-`).
///
/// Which poles match is never decided here; see [`crate::pole::PoleTable`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pole(String);

impl Pole {
    /// Creates a pole from its tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the pole tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An unresolved edge requirement: a link type and a pole.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Connector {
    /// Type of link this connector wants.
    pub link_type: LinkType,
    /// Polarity deciding which connectors it may join.
    pub pole: Pole,
}

impl Connector {
    /// Creates a connector from a link type and pole.
    pub fn new(link_type: impl Into<String>, pole: impl Into<String>) -> Self {
        Self {
            link_type: LinkType::new(link_type),
            pole: Pole::new(pole),
        }
    }

    /// Returns a connector of the same link type with a different pole.
    pub fn with_pole(&self, pole: Pole) -> Self {
        Self {
            link_type: self.link_type.clone(),
            pole,
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.link_type, self.pole)
    }
}

/// Identity of an interned link.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(u64);

impl LinkId {
    /// Creates a new `LinkId` from a raw `u64`.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw `u64` representation.
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

/// A resolved edge of a given type between two points.
///
/// Links are interned by the graph store: the same `(link_type, from, to)`
/// triple always carries the same `id`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Interned identity.
    pub id: LinkId,
    /// Type of the link.
    pub link_type: LinkType,
    /// Tail point.
    pub from: PointId,
    /// Head point.
    pub to: PointId,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}->{})", self.link_type, self.from.0, self.to.0)
    }
}

/// One position in a section's slot sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Slot {
    /// Unresolved connector.
    Open(Connector),
    /// Connector already replaced by a link.
    Linked(Link),
}

impl Slot {
    /// Returns the connector if the slot is still open.
    #[inline]
    pub fn as_connector(&self) -> Option<&Connector> {
        match self {
            Slot::Open(connector) => Some(connector),
            Slot::Linked(_) => None,
        }
    }

    /// Returns the link if the slot is resolved.
    #[inline]
    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Slot::Open(_) => None,
            Slot::Linked(link) => Some(link),
        }
    }

    /// Checks whether this slot is an open connector.
    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self, Slot::Open(_))
    }
}

impl From<Connector> for Slot {
    fn from(connector: Connector) -> Self {
        Slot::Open(connector)
    }
}

impl From<Link> for Slot {
    fn from(link: Link) -> Self {
        Slot::Linked(link)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Open(connector) => write!(f, "{connector}"),
            Slot::Linked(link) => write!(f, "{link}"),
        }
    }
}

/// A point plus its ordered slot sequence.
///
/// Sections are immutable values. Equality, ordering and hashing are
/// structural, so two sections with the same point and the same slots are the
/// same section wherever they were built.
///
/// # Invariants
/// - A section is open iff at least one slot is an open connector.
/// - [`Section::with_link`] returns a new value; `self` is never modified.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Section {
    point: PointId,
    slots: Vec<Slot>,
}

impl Section {
    /// Creates a section anchored on `point`.
    pub fn new(point: PointId, slots: Vec<Slot>) -> Self {
        Self { point, slots }
    }

    /// Returns the anchor point.
    #[inline]
    pub fn point(&self) -> PointId {
        self.point
    }

    /// Returns the ordered slot sequence.
    #[inline]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Checks whether any slot is still an open connector.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.slots.iter().any(Slot::is_open)
    }

    /// Iterates over `(slot index, connector)` for every open slot, in slot
    /// order.
    pub fn open_connectors(&self) -> impl Iterator<Item = (usize, &Connector)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_connector().map(|c| (idx, c)))
    }

    /// Iterates over the links already resolved in this section.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.slots.iter().filter_map(Slot::as_link)
    }

    /// Returns the connector at `index` if that slot is open.
    #[inline]
    pub fn connector_at(&self, index: usize) -> Option<&Connector> {
        self.slots.get(index).and_then(Slot::as_connector)
    }

    /// Returns the index of the first open slot holding `connector`.
    pub fn find_open(&self, connector: &Connector) -> Option<usize> {
        self.open_connectors()
            .find(|(_, c)| *c == connector)
            .map(|(idx, _)| idx)
    }

    /// Builds the section obtained by replacing slot `index` with `link`.
    ///
    /// Every other slot is copied unchanged.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn with_link(&self, index: usize, link: Link) -> Self {
        assert!(index < self.slots.len(), "slot index out of bounds");
        let slots = self
            .slots
            .iter()
            .enumerate()
            .map(|(idx, slot)| {
                if idx == index {
                    Slot::Linked(link.clone())
                } else {
                    slot.clone()
                }
            })
            .collect();
        Self {
            point: self.point,
            slots,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [", self.point.0)?;
        for (idx, slot) in self.slots.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{slot}")?;
        }
        f.write_str("]")
    }
}
