//! linkgen: exhaustive aggregation of sections into closed linkages.
//!
//! This crate assembles typed graph fragments into fully connected
//! structures:
//! - A **section** is a point (an anchor node) with an ordered sequence of
//!   slots, each an open **connector** (link type + pole) or a resolved link.
//! - Two connectors join when their link types agree and their poles are a
//!   registered pair in a [`PoleTable`].
//! - A **linkage** is a set of sections in which every connector has been
//!   replaced by a link.
//!
//! Starting from one or more nucleation points, the [`Aggregate`] engine runs
//! a depth-first backtracking search over every way of joining open
//! connectors, bracketing each branch with a checkpoint of its [`Frame`].
//! All executive decisions (which connectors may match, whether a connection
//! is admissible, when to stop) come from a [`Policy`].
//!
//! # References
//!
//! - Sleator & Temperley, "Parsing English with a Link Grammar" (1991) – connectors, linkages
//! - Vepstas, "Sheaves: A Topological Approach to Big Data" (2017) – sections as germs of a sheaf
//!
//! # Example
//!
//! ```
//! use linkgen::prelude::*;
//! use std::collections::BTreeSet;
//!
//! let mut store = MemoryStore::new();
//! let wall = store.add_point("LEFT-WALL");
//! let word = store.add_point("hello");
//! store.add_connectors(wall, [Connector::new("W", "+")]).unwrap();
//! store.add_connectors(word, [Connector::new("W", "-")]).unwrap();
//!
//! let mut policy = StandardPolicy::from_config(&AggregateConfig::default()).unwrap();
//! let solutions = aggregate(&mut store, &BTreeSet::from([wall]), &mut policy).unwrap();
//! assert_eq!(solutions.len(), 1);
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod frame;
pub mod pole;
pub mod policy;
pub mod solution;
pub mod store;

pub use crate::config::AggregateConfig;
pub use crate::core::{Connector, Link, LinkId, LinkType, Point, PointId, Pole, Section, Slot};
pub use crate::engine::{aggregate, Aggregate, SearchStats};
pub use crate::error::{AggregateError, AggregateResult, ConfigError, StoreError};
pub use crate::fingerprint::{Canonicalizable, HashValue};
pub use crate::frame::{CheckpointStack, Frame};
pub use crate::pole::{Orientation, PoleTable};
pub use crate::policy::{JoinProposal, Policy, StandardPolicy};
pub use crate::solution::{Solution, SolutionSet};
pub use crate::store::{GraphStore, MemoryStore};

/// Prelude for convenient usage.
pub mod prelude {
    pub use crate::config::AggregateConfig;
    pub use crate::core::{Connector, Link, LinkType, Pole, PointId, Section, Slot};
    pub use crate::engine::{aggregate, Aggregate, SearchStats};
    pub use crate::error::{AggregateError, AggregateResult};
    pub use crate::fingerprint::HashValue;
    pub use crate::frame::Frame;
    pub use crate::pole::PoleTable;
    pub use crate::policy::{JoinProposal, Policy, StandardPolicy};
    pub use crate::solution::{Solution, SolutionSet};
    pub use crate::store::{GraphStore, MemoryStore};
}
