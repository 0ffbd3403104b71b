//! Pole compatibility table.
//!
//! Two connectors are complementary iff their link types are equal and their
//! poles form a registered pair. The table is data, supplied by configuration
//! or by a policy; nothing about `+`/`-` is hardcoded in the engine.

use crate::core::{Connector, Pole};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Direction in which a link is laid down between two connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The initiating side is the link's tail.
    Forward,
    /// The candidate side is the link's tail.
    Reverse,
    /// The pair was declared both ways (or is a self pair); the caller picks.
    Either,
}

/// Relation between poles deciding which connectors may be joined.
///
/// `declared` keeps the pairs as written; `matches` is the relation actually
/// consulted, which also holds the mirrored pairs of a symmetric table.
///
/// # Determinism
/// Both sets are ordered, so [`PoleTable::complements`] yields poles in the
/// same order across runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoleTable {
    declared: BTreeSet<(Pole, Pole)>,
    matches: BTreeSet<(Pole, Pole)>,
}

impl PoleTable {
    /// Creates an empty table (nothing matches).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a symmetric table: each `(a, b)` also lets `b` match `a`.
    pub fn symmetric<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let mut table = Self::new();
        for (from, to) in pairs {
            table.insert_symmetric(Pole::new(from), Pole::new(to));
        }
        table
    }

    /// Builds a directed table: `(a, b)` lets `a` look for `b`, not the reverse.
    ///
    /// A connector whose pole never appears on the left has no joints, so a
    /// section carrying it is unconnectable.
    pub fn directed<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let mut table = Self::new();
        for (from, to) in pairs {
            table.insert(Pole::new(from), Pole::new(to));
        }
        table
    }

    /// Registers the directed pair `from -> to`.
    pub fn insert(&mut self, from: Pole, to: Pole) {
        self.matches.insert((from.clone(), to.clone()));
        self.declared.insert((from, to));
    }

    /// Registers `from -> to` and its mirror.
    pub fn insert_symmetric(&mut self, from: Pole, to: Pole) {
        self.matches.insert((to.clone(), from.clone()));
        self.insert(from, to);
    }

    /// Returns true if no pair is registered.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Returns the number of registered (directed) matching pairs.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Returns every pole that `pole` may join, in pole order.
    pub fn complements<'a>(&'a self, pole: &'a Pole) -> impl Iterator<Item = &'a Pole> + 'a {
        self.matches
            .iter()
            .filter(move |(from, _)| from == pole)
            .map(|(_, to)| to)
    }

    /// Checks whether `from` may be joined to `to`.
    pub fn matches(&self, from: &Pole, to: &Pole) -> bool {
        self.matches.contains(&(from.clone(), to.clone()))
    }

    /// Checks whether two connectors are complementary.
    pub fn is_complementary(&self, from: &Connector, to: &Connector) -> bool {
        from.link_type == to.link_type && self.matches(&from.pole, &to.pole)
    }

    /// Decides the direction of a link joining a `from` pole to a `to` pole.
    ///
    /// The direction follows the pair as it was declared, so a connection
    /// gets the same orientation whichever side initiated it.
    pub fn orient(&self, from: &Pole, to: &Pole) -> Orientation {
        let forward = self.declared.contains(&(from.clone(), to.clone()));
        let reverse = self.declared.contains(&(to.clone(), from.clone()));
        match (forward, reverse) {
            (true, false) => Orientation::Forward,
            (false, true) => Orientation::Reverse,
            _ => Orientation::Either,
        }
    }
}
