//! Configuration-driven policy.
//!
//! `StandardPolicy` matches connectors through a [`PoleTable`], bounds the
//! search with the budgets of an [`AggregateConfig`], and refuses to attach a
//! point twice unless repeated points are allowed.

use super::{JoinProposal, Policy};
use crate::config::AggregateConfig;
use crate::core::{Connector, Link, PointId};
use crate::error::ConfigError;
use crate::frame::Frame;
use crate::pole::{Orientation, PoleTable};
use crate::store::GraphStore;
use std::time::{Duration, Instant};
use tracing::debug;

/// Policy built from an [`AggregateConfig`].
#[derive(Debug, Clone)]
pub struct StandardPolicy {
    poles: PoleTable,
    max_depth: Option<usize>,
    max_steps: Option<u64>,
    time_budget: Option<Duration>,
    allow_repeated_points: bool,
    depth: usize,
    steps: u64,
    started: Option<Instant>,
}

impl StandardPolicy {
    /// Creates an unbounded policy over `poles`.
    pub fn new(poles: PoleTable) -> Self {
        Self {
            poles,
            max_depth: None,
            max_steps: None,
            time_budget: None,
            allow_repeated_points: false,
            depth: 0,
            steps: 0,
            started: None,
        }
    }

    /// Creates a policy from a validated configuration.
    pub fn from_config(config: &AggregateConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            poles: config.pole_table(),
            max_depth: config.max_depth,
            max_steps: config.max_steps,
            time_budget: config.time_budget(),
            allow_repeated_points: config.allow_repeated_points,
            ..Self::new(PoleTable::new())
        })
    }

    /// The pole table in use.
    pub fn poles(&self) -> &PoleTable {
        &self.poles
    }

    /// Current checkpoint depth as seen through `push`/`pop`.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of `recurse` calls so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl Policy for StandardPolicy {
    fn reset(&mut self) {
        self.depth = 0;
        self.steps = 0;
        self.started = None;
    }

    fn recurse(&mut self, _frame: &Frame) -> bool {
        self.steps += 1;
        if let Some(max) = self.max_steps {
            if self.steps > max {
                debug!(steps = self.steps, max, "step budget exhausted");
                return false;
            }
        }
        if let Some(budget) = self.time_budget {
            let started = *self.started.get_or_insert_with(Instant::now);
            if started.elapsed() >= budget {
                debug!(?budget, "time budget exhausted");
                return false;
            }
        }
        match self.max_depth {
            Some(max) => self.depth <= max,
            None => true,
        }
    }

    fn joints(&self, store: &dyn GraphStore, connector: &Connector) -> Vec<Connector> {
        self.poles
            .complements(&connector.pole)
            .map(|pole| connector.with_pole(pole.clone()))
            .filter_map(|candidate| store.lookup_connector(&candidate))
            .collect()
    }

    fn connect(&self, frame: &Frame, proposal: &JoinProposal<'_>) -> bool {
        if !self
            .poles
            .is_complementary(proposal.from_connector, proposal.to_connector)
        {
            return false;
        }
        if proposal.close_cycle || self.allow_repeated_points {
            return true;
        }
        !frame.anchors(proposal.to_section.point())
    }

    fn make_link(
        &mut self,
        store: &mut dyn GraphStore,
        from_connector: &Connector,
        to_connector: &Connector,
        from_point: PointId,
        to_point: PointId,
    ) -> Link {
        let (tail, head) = match self.poles.orient(&from_connector.pole, &to_connector.pole) {
            Orientation::Forward => (from_point, to_point),
            Orientation::Reverse => (to_point, from_point),
            Orientation::Either => (from_point.min(to_point), from_point.max(to_point)),
        };
        store.intern_link(&from_connector.link_type, tail, head)
    }

    fn push(&mut self, _frame: &Frame) {
        self.depth += 1;
    }

    fn pop(&mut self, _frame: &Frame) {
        self.depth = self.depth.saturating_sub(1);
    }
}
