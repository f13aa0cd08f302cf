//! Simulation orchestration.
//!
//! The engine owns the grid and the configuration, wires population
//! placement to terrain regeneration, and recomputes happiness after every
//! write pass. External collaborators only ever see shared references to the
//! grid; all mutation funnels through the engine's command surface.

use crate::agent::Agent;
use crate::grid::TerrainGrid;
use crate::terrain::TerrainStats;
use rand::{rngs::StdRng, Rng};
use segscape_core::{scoped_rng, ConfigPatch, GroupId, SimConfig, SimError, TerrainThresholds};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Stream domain for the placement/relocation RNG, keeping it independent of
/// any other consumer of the placement seed.
const PLACEMENT_RNG_DOMAIN: u64 = 0x9E37_79B9_7F4A_7C15;

/// Stream domain for palette padding, so growing the group count never
/// perturbs the placement stream.
const COLOR_RNG_DOMAIN: u64 = 0xC0FF_EE00_5EED_5EED;

/// Partial terrain reconfiguration: thresholds, seed, or both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainUpdate {
    /// Replacement terrain thresholds.
    pub thresholds: Option<TerrainThresholds>,
    /// Replacement noise seed.
    pub seed: Option<u64>,
}

/// Result of comparing the requested population against walkable capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityCheck {
    /// True when the requested population meets or exceeds walkable capacity.
    /// Equality counts as exceeding: in the worst placement ordering the last
    /// agent has no candidate cell left.
    pub exceeds: bool,
    /// Total agents requested across all groups.
    pub requested: usize,
    /// Walkable tile count (flatland + mountain).
    pub capacity: usize,
    /// All tiles regardless of walkability.
    pub total_capacity: usize,
    /// Per-class tile counts behind the capacity figure.
    pub stats: TerrainStats,
}

/// An in-flight relocation: the lifted agent and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Relocation {
    agent: Agent,
    origin: (usize, usize),
}

impl Relocation {
    /// The lifted agent, as it looked when the transaction began.
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Coordinates the agent was lifted from.
    pub fn origin(&self) -> (usize, usize) {
        self.origin
    }
}

type Hook = Box<dyn FnMut()>;

/// Central coordinator for the segregation simulation.
pub struct SimulationEngine {
    config: SimConfig,
    grid: TerrainGrid,
    rng: StdRng,
    color_rng: StdRng,
    relocation: Option<Relocation>,
    on_config_changed: Option<Hook>,
    on_agent_moved: Option<Hook>,
}

impl SimulationEngine {
    /// Build an engine from a configuration, generate terrain, place the
    /// population, and compute initial happiness.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let mut config = config;
        let rng = scoped_rng(config.placement_seed, PLACEMENT_RNG_DOMAIN);
        let mut color_rng = scoped_rng(config.placement_seed, COLOR_RNG_DOMAIN);
        config.normalize(&mut color_rng);
        config.terrain_thresholds.validate()?;

        let grid = TerrainGrid::new(config.grid_size, config.terrain_thresholds, config.noise_seed)?;
        let mut engine = Self {
            config,
            grid,
            rng,
            color_rng,
            relocation: None,
            on_config_changed: None,
            on_agent_moved: None,
        };
        engine.populate_grid();
        engine.update_all_happiness();
        Ok(engine)
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Read-only view of the grid.
    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    /// Tile counts per terrain class.
    pub fn terrain_stats(&self) -> TerrainStats {
        self.grid.terrain_stats()
    }

    /// The relocation currently in flight, if any.
    pub fn relocation(&self) -> Option<&Relocation> {
        self.relocation.as_ref()
    }

    /// Register the hook fired after reset, configuration and terrain updates.
    pub fn set_on_config_changed(&mut self, hook: impl FnMut() + 'static) {
        self.on_config_changed = Some(Box::new(hook));
    }

    /// Register the hook fired after a relocation transaction completes.
    pub fn set_on_agent_moved(&mut self, hook: impl FnMut() + 'static) {
        self.on_agent_moved = Some(Box::new(hook));
    }

    fn fire_config_changed(&mut self) {
        if let Some(hook) = self.on_config_changed.as_mut() {
            hook();
        }
    }

    fn fire_agent_moved(&mut self) {
        if let Some(hook) = self.on_agent_moved.as_mut() {
            hook();
        }
    }

    /// Place the configured population onto walkable cells.
    ///
    /// Walkable positions are shuffled once (Fisher-Yates over the row-major
    /// list), then consumed in group order. A rejected candidate is skipped
    /// without counting toward the group quota; exhausting the candidate list
    /// is a silent shortfall surfaced only by [`SimulationEngine::check_capacity`].
    fn populate_grid(&mut self) {
        let mut positions = self.grid.walkable_cells();
        for i in (1..positions.len()).rev() {
            let j = self.rng.gen_range(0..=i);
            positions.swap(i, j);
        }

        let mut candidates = positions.into_iter();
        'groups: for group in 0..self.config.group_count {
            let quota = self.config.group_sizes[group];
            let tolerance = self.config.tolerances[group];
            let mut placed = 0;
            while placed < quota {
                let (row, col) = match candidates.next() {
                    Some(position) => position,
                    None => break 'groups,
                };
                if self.grid.set_agent(row, col, Some(Agent::new(GroupId(group), tolerance))) {
                    placed += 1;
                }
            }
        }
        debug!(total = self.grid.total_agents(), "population placed");
    }

    /// Recompute happiness for every placed agent.
    ///
    /// A pure read pass over neighbor snapshots followed by a write pass;
    /// the two never overlap.
    fn update_all_happiness(&mut self) {
        let updates: Vec<(usize, usize, f64)> = self
            .grid
            .agent_cells()
            .map(|(row, col, agent)| {
                let happiness = agent.compute_happiness(&self.grid.neighbors(row, col));
                (row, col, happiness)
            })
            .collect();

        for (row, col, happiness) in updates {
            if let Some(agent) = self.grid.agent_mut(row, col) {
                agent.set_happiness(happiness);
            }
        }
    }

    /// Full reinitialization: fresh terrain from the current configuration,
    /// a redrawn population, and recomputed happiness.
    ///
    /// The placement RNG is reseeded, so resetting twice under the same
    /// configuration reproduces the same layout.
    pub fn reset(&mut self) -> Result<(), SimError> {
        self.rng = scoped_rng(self.config.placement_seed, PLACEMENT_RNG_DOMAIN);
        self.grid = TerrainGrid::new(
            self.config.grid_size,
            self.config.terrain_thresholds,
            self.config.noise_seed,
        )?;
        self.relocation = None;
        self.populate_grid();
        self.update_all_happiness();
        self.fire_config_changed();
        Ok(())
    }

    /// Merge a partial configuration update.
    ///
    /// Never fails. When a group's tolerance changes, every placed agent of
    /// that group has its tolerance overwritten and happiness is recomputed
    /// for the whole population. The grid and population are otherwise left
    /// alone; callers follow up with [`SimulationEngine::reset`] or
    /// [`SimulationEngine::update_terrain_config`] when a rebuild is wanted.
    pub fn update_config(&mut self, patch: ConfigPatch) {
        self.config.apply(patch, &mut self.color_rng);

        let tolerances = self.config.tolerances.clone();
        let mut tolerance_changed = false;
        for agent in self.grid.agents_mut() {
            if let Some(&tolerance) = tolerances.get(agent.group().0) {
                if agent.tolerance() != tolerance {
                    agent.set_tolerance(tolerance);
                    tolerance_changed = true;
                }
            }
        }
        if tolerance_changed {
            self.update_all_happiness();
        }
        self.fire_config_changed();
    }

    /// Apply a terrain reconfiguration, then redraw the population from
    /// scratch.
    ///
    /// The grid layer attempts in-place agent preservation while
    /// regenerating, but the engine contract favors group-size consistency
    /// over agent identity: after the terrain settles, the population is
    /// cleared and re-placed. Invalid thresholds are rejected before any
    /// mutation.
    pub fn update_terrain_config(&mut self, update: TerrainUpdate) -> Result<(), SimError> {
        if let Some(thresholds) = update.thresholds {
            thresholds.validate()?;
        }

        if let Some(thresholds) = update.thresholds {
            self.config.terrain_thresholds = thresholds;
            self.grid.update_thresholds(thresholds, &mut self.rng);
        }
        if let Some(seed) = update.seed {
            self.config.noise_seed = seed;
            self.grid.set_noise_seed(seed, &mut self.rng);
        }

        self.grid.clear_agents();
        self.populate_grid();
        self.update_all_happiness();
        self.fire_config_changed();
        Ok(())
    }

    /// Compare the requested population against walkable capacity.
    pub fn check_capacity(&self) -> CapacityCheck {
        let requested: usize = self.config.group_sizes.iter().sum();
        let stats = self.grid.terrain_stats();
        let capacity = stats.walkable();
        CapacityCheck {
            exceeds: requested >= capacity,
            requested,
            capacity,
            total_capacity: self.grid.capacity(),
            stats,
        }
    }

    /// Mean happiness across placed agents; 0.0 for an empty population.
    pub fn average_happiness(&self) -> f64 {
        let (count, total) = self
            .grid
            .agents()
            .fold((0usize, 0.0), |(count, total), agent| {
                (count + 1, total + agent.happiness())
            });
        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    }

    /// Sum of happiness across placed agents.
    pub fn social_welfare(&self) -> f64 {
        self.grid.agents().map(Agent::happiness).sum()
    }

    /// Begin a relocation: lift the agent at `(row, col)` off the grid.
    ///
    /// Fails when the cell holds no agent or another relocation is already
    /// in flight. The lifted agent is queryable through
    /// [`SimulationEngine::relocation`] until the transaction ends.
    pub fn begin_relocation(&mut self, row: usize, col: usize) -> Result<(), SimError> {
        if self.relocation.is_some() {
            return Err(SimError::RelocationInProgress);
        }
        let agent = match self.grid.agent(row, col) {
            Some(agent) => agent.clone(),
            None => return Err(SimError::NoAgentAt { row, col }),
        };
        self.grid.set_agent(row, col, None);
        self.relocation = Some(Relocation {
            agent,
            origin: (row, col),
        });
        Ok(())
    }

    /// End the in-flight relocation at the given target cell.
    ///
    /// Places the agent at the target when it is a valid empty walkable
    /// cell, otherwise restores it to its origin. Either way happiness is
    /// recomputed for the whole population (neighbors of both cells are
    /// affected) and the agent-moved hook fires. Returns whether the target
    /// placement happened.
    pub fn end_relocation(&mut self, target_row: usize, target_col: usize) -> Result<bool, SimError> {
        let Relocation { agent, origin } = self
            .relocation
            .take()
            .ok_or(SimError::RelocationNotStarted)?;

        let placed = self.grid.is_empty(target_row, target_col)
            && self.grid.set_agent(target_row, target_col, Some(agent.clone()));
        if !placed {
            let (row, col) = origin;
            if !self.grid.set_agent(row, col, Some(agent)) {
                debug!(row, col, "failed to restore relocated agent to its origin");
            }
        }

        self.update_all_happiness();
        self.fire_agent_moved();
        Ok(placed)
    }
}
