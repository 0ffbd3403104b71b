//! Error types for aggregation, storage and configuration.
//!
//! Only setup failures are errors. A connector without candidates, a vetoed
//! connection or a halted path simply prunes a branch and is never reported
//! through these types.

use crate::core::PointId;
use thiserror::Error;

/// Result type alias for aggregation operations.
pub type AggregateResult<T> = Result<T, AggregateError>;

/// Errors that abort an aggregation call.
#[derive(Error, Debug)]
pub enum AggregateError {
    /// `aggregate` was called without any nucleation point.
    #[error("no nucleation points supplied")]
    EmptyNuclei,

    /// A nucleation point is not known to the graph store.
    #[error("unknown nucleation point: {0}")]
    UnknownPoint(PointId),

    /// No nucleation point has an open section to start from.
    #[error("can't find sections: no open section attached to nucleation point {point}")]
    NoStartingSection {
        /// First nucleation point (in point order) that was examined.
        point: PointId,
    },

    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// CBOR encoding or decoding failed.
    #[error("CBOR codec failure: {0}")]
    Codec(#[from] serde_cbor::Error),

    /// Reading or writing a file failed.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the in-memory graph store while authoring content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The section's point was never added to the store.
    #[error("unknown point: {0}")]
    UnknownPoint(PointId),

    /// A section must carry at least one slot.
    #[error("section at {0} has no slots")]
    EmptySection(PointId),
}

/// Configuration validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No pole pair was declared, so no connector could ever match.
    #[error("at least one pole pair is required")]
    NoPolePairs,

    /// A declared pole tag is empty.
    #[error("pole tags must be non-empty")]
    EmptyPole,

    /// `max_depth = 0` halts every path before it starts.
    #[error("max_depth must be at least 1")]
    ZeroDepth,

    /// `max_steps = 0` halts every path before it starts.
    #[error("max_steps must be at least 1")]
    ZeroSteps,
}
