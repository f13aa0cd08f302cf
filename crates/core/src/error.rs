//! Error type for the simulation core.

use thiserror::Error;

/// Errors surfaced by the simulation core.
///
/// Every variant is a precondition violation reported at the call site;
/// capacity shortfalls are deliberately absent because placing fewer agents
/// than requested is an observable outcome of the capacity check, not an
/// error. Terrain generation faults never reach callers either: the grid
/// recovers locally with an all-flatland fallback.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SimError {
    /// Elevation map dimensions must be positive.
    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested map width.
        width: usize,
        /// Requested map height.
        height: usize,
    },

    /// Terrain thresholds must satisfy `0 < water < flatland < 1`.
    #[error("invalid terrain thresholds: water {water}, flatland {flatland}")]
    InvalidThresholds {
        /// Rejected water cut-off.
        water: f64,
        /// Rejected flatland cut-off.
        flatland: f64,
    },

    /// The addressed cell holds no agent.
    #[error("no agent at ({row}, {col})")]
    NoAgentAt {
        /// Addressed row.
        row: usize,
        /// Addressed column.
        col: usize,
    },

    /// A relocation transaction is already in flight.
    #[error("a relocation is already in progress")]
    RelocationInProgress,

    /// No relocation transaction is in flight.
    #[error("no relocation in progress")]
    RelocationNotStarted,
}
