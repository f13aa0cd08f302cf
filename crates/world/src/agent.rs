//! Agents of the segregation model.

use segscape_core::GroupId;
use serde::{Deserialize, Serialize};

/// A resident agent: group membership, a tolerance threshold, and the last
/// computed happiness value.
///
/// The grid is the single source of truth for placement; the position held
/// here is a denormalized copy maintained by the grid's placement operations,
/// never by the agent itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    group: GroupId,
    tolerance: f64,
    happiness: f64,
    position: Option<(usize, usize)>,
}

impl Agent {
    /// Create an unplaced agent with zero happiness.
    pub fn new(group: GroupId, tolerance: f64) -> Self {
        Self {
            group,
            tolerance,
            happiness: 0.0,
            position: None,
        }
    }

    /// Group this agent belongs to.
    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Happiness threshold in `[0, 1]`.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Last computed happiness in `[0, 1]`.
    pub fn happiness(&self) -> f64 {
        self.happiness
    }

    /// Denormalized grid coordinates, `None` until first placed.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.position
    }

    /// An agent is happy when the same-group share of its neighborhood meets
    /// its tolerance.
    pub fn is_happy(&self) -> bool {
        self.happiness >= self.tolerance
    }

    /// Fraction of same-group agents among the neighbor sequence.
    ///
    /// Empty slots count against the fraction; an empty sequence (isolated
    /// cell) is judged maximally happy at 1.0. Pure: the stored happiness is
    /// only overwritten by [`Agent::set_happiness`] during the write phase.
    pub fn compute_happiness(&self, neighbors: &[Option<&Agent>]) -> f64 {
        if neighbors.is_empty() {
            return 1.0;
        }
        let same_group = neighbors
            .iter()
            .flatten()
            .filter(|neighbor| neighbor.group == self.group)
            .count();
        same_group as f64 / neighbors.len() as f64
    }

    pub(crate) fn set_happiness(&mut self, happiness: f64) {
        self.happiness = happiness;
    }

    pub(crate) fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance;
    }

    pub(crate) fn set_position(&mut self, row: usize, col: usize) {
        self.position = Some((row, col));
    }
}
