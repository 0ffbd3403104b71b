//! Configuration for the standard aggregation policy.
//!
//! Covers the pole-compatibility table and the cooperative search budgets
//! (depth, steps, wall-clock). Configurations persist as CBOR.

use crate::core::Pole;
use crate::error::{AggregateResult, ConfigError};
use crate::pole::PoleTable;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings consumed by [`crate::policy::StandardPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateConfig {
    /// Declared pole pairs `(from, to)`.
    /// Default: `[("+", "-")]`
    pub pole_pairs: Vec<(String, String)>,

    /// Also register the mirror of every declared pair.
    /// Default: true
    #[serde(default = "AggregateConfig::default_symmetric")]
    pub symmetric_poles: bool,

    /// Deepest checkpoint depth at which `recurse` still continues.
    /// Default: unlimited
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Maximum number of `recurse` calls over the whole search.
    /// Default: unlimited
    #[serde(default)]
    pub max_steps: Option<u64>,

    /// Wall-clock budget, measured from the first `recurse` call.
    /// Default: unlimited
    #[serde(default)]
    pub time_budget_ms: Option<u64>,

    /// Whether a tree-extending connection may attach a section whose point
    /// already anchors an open or linked section. Without a depth or step budget
    /// this can make the search unbounded.
    /// Default: false
    #[serde(default)]
    pub allow_repeated_points: bool,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            pole_pairs: vec![("+".to_string(), "-".to_string())],
            symmetric_poles: true,
            max_depth: None,
            max_steps: None,
            time_budget_ms: None,
            allow_repeated_points: false,
        }
    }
}

impl AggregateConfig {
    fn default_symmetric() -> bool {
        true
    }

    /// Sets the depth budget.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sets the step budget.
    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget_ms = Some(u64::try_from(budget.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Allows or forbids attaching points that already anchor a section.
    pub fn with_repeated_points(mut self, allow: bool) -> Self {
        self.allow_repeated_points = allow;
        self
    }

    /// Replaces the declared pole pairs.
    pub fn with_pole_pairs<I, A, B>(mut self, pairs: I, symmetric: bool) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.pole_pairs = pairs
            .into_iter()
            .map(|(a, b)| (a.into(), b.into()))
            .collect();
        self.symmetric_poles = symmetric;
        self
    }

    /// Returns the wall-clock budget as a `Duration`.
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pole_pairs.is_empty() {
            return Err(ConfigError::NoPolePairs);
        }
        if self
            .pole_pairs
            .iter()
            .any(|(a, b)| a.is_empty() || b.is_empty())
        {
            return Err(ConfigError::EmptyPole);
        }
        if self.max_depth == Some(0) {
            return Err(ConfigError::ZeroDepth);
        }
        if self.max_steps == Some(0) {
            return Err(ConfigError::ZeroSteps);
        }
        Ok(())
    }

    /// Builds the pole table described by this configuration.
    pub fn pole_table(&self) -> PoleTable {
        let mut table = PoleTable::new();
        for (from, to) in &self.pole_pairs {
            let (from, to) = (Pole::new(from.clone()), Pole::new(to.clone()));
            if self.symmetric_poles {
                table.insert_symmetric(from, to);
            } else {
                table.insert(from, to);
            }
        }
        table
    }

    /// Serializes the configuration to CBOR bytes.
    pub fn to_cbor(&self) -> AggregateResult<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Deserializes and validates a configuration from CBOR bytes.
    pub fn from_cbor(bytes: &[u8]) -> AggregateResult<Self> {
        let config: Self = serde_cbor::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration to a file (CBOR).
    pub fn save_to_file(&self, path: &std::path::Path) -> AggregateResult<()> {
        let bytes = self.to_cbor()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Loads and validates a configuration from a file (CBOR).
    pub fn load_from_file(path: &std::path::Path) -> AggregateResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_cbor(&bytes)
    }
}
