//! Decision policy: the executive callbacks of the aggregation engine.
//!
//! At every branch point the engine needs a list of branches to try, a
//! decision whether a particular branch is admissible, and a decision whether
//! to keep going at all. All of these come from a [`Policy`]. The engine
//! itself only enumerates, applies and backtracks.

pub mod standard;

pub use standard::StandardPolicy;

use crate::core::{Connector, Link, PointId, Section};
use crate::frame::Frame;
use crate::store::GraphStore;

/// A connection the engine is about to try.
///
/// `close_cycle` says which partition the attempt belongs to: `true` joins a
/// section already open in the frame (closing a loop), `false` attaches new
/// material.
#[derive(Debug, Clone, Copy)]
pub struct JoinProposal<'a> {
    /// Whether this attempt closes a cycle.
    pub close_cycle: bool,
    /// Section initiating the connection.
    pub from_section: &'a Section,
    /// Open connector of `from_section` being resolved.
    pub from_connector: &'a Connector,
    /// Candidate section on the other side.
    pub to_section: &'a Section,
    /// Open connector of `to_section` being resolved.
    pub to_connector: &'a Connector,
}

/// Executive decision-making callbacks.
///
/// Every method is required. The documented defaults are what a policy
/// should do when it has no opinion:
/// - `recurse`: return `true`.
/// - `connect`: return `true`.
/// - `push` / `pop` / `reset`: do nothing.
///
/// The `frame` passed to a callback is only valid for that call; a policy
/// must not keep it.
pub trait Policy {
    /// Called once at the start of every aggregation, before seeding.
    ///
    /// Per-search state (counters, deadlines) must be cleared here so that
    /// reusing a policy yields the same result for the same search.
    fn reset(&mut self);

    /// Called once on entry to every recursion step. `false` halts the path.
    fn recurse(&mut self, frame: &Frame) -> bool;

    /// Connectors elsewhere in the store that `connector` may be joined to.
    ///
    /// An empty list means the connector can never be resolved in this state.
    fn joints(&self, store: &dyn GraphStore, connector: &Connector) -> Vec<Connector>;

    /// Admissibility veto for one proposed pairing.
    ///
    /// Must be a pure function of its inputs.
    fn connect(&self, frame: &Frame, proposal: &JoinProposal<'_>) -> bool;

    /// Builds (and interns) the link resolving `from_connector` against
    /// `to_connector`. Identical inputs must yield the identical link.
    fn make_link(
        &mut self,
        store: &mut dyn GraphStore,
        from_connector: &Connector,
        to_connector: &Connector,
        from_point: PointId,
        to_point: PointId,
    ) -> Link;

    /// Fired after the engine saves its state.
    fn push(&mut self, frame: &Frame);

    /// Fired after the engine restores its state.
    fn pop(&mut self, frame: &Frame);
}
