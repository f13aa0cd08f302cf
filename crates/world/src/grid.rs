//! Spatial grid: tiles, walkability, and agent placement.
//!
//! The grid owns every tile and the noise field that generated them. All
//! placement goes through [`TerrainGrid::set_agent`] so the water invariant
//! and the denormalized agent position can never drift apart.

use crate::agent::Agent;
use crate::elevation::{ElevationConfig, ElevationMap};
use crate::noise::SimplexNoise;
use crate::terrain::{Terrain, TerrainStats};
use rand::{rngs::StdRng, Rng};
use segscape_core::{SimError, TerrainThresholds};
use tracing::{debug, instrument, warn};

/// One grid cell: a terrain class and at most one agent.
#[derive(Debug, Clone)]
pub struct Tile {
    terrain: Terrain,
    agent: Option<Agent>,
}

impl Tile {
    fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            agent: None,
        }
    }

    /// Terrain class of this tile.
    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Agent occupying this tile, if any.
    pub fn agent(&self) -> Option<&Agent> {
        self.agent.as_ref()
    }

    /// Whether an agent occupies this tile.
    pub fn has_agent(&self) -> bool {
        self.agent.is_some()
    }

    /// Whether agents may occupy this tile.
    pub fn is_walkable(&self) -> bool {
        self.terrain.is_walkable()
    }

    fn agent_mut(&mut self) -> Option<&mut Agent> {
        self.agent.as_mut()
    }

    fn take_agent(&mut self) -> Option<Agent> {
        self.agent.take()
    }
}

/// Square grid of terrain tiles with agent occupancy.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    size: usize,
    tiles: Vec<Tile>,
    noise: SimplexNoise,
    thresholds: TerrainThresholds,
    elevation_config: ElevationConfig,
    degraded: bool,
}

impl TerrainGrid {
    /// Create a grid and generate its terrain immediately.
    ///
    /// A zero size is a precondition violation. Internal generation faults
    /// are recovered fail-open: the grid falls back to all-flatland tiles and
    /// flags itself [`TerrainGrid::is_degraded`].
    pub fn new(size: usize, thresholds: TerrainThresholds, seed: u64) -> Result<Self, SimError> {
        if size == 0 {
            return Err(SimError::InvalidDimensions {
                width: size,
                height: size,
            });
        }

        let mut grid = Self {
            size,
            tiles: Vec::new(),
            noise: SimplexNoise::new(seed),
            thresholds,
            elevation_config: ElevationConfig::default(),
            degraded: false,
        };
        grid.generate_terrain();
        Ok(grid)
    }

    /// Regenerate every tile's terrain class from the noise field.
    ///
    /// Existing occupancy is discarded; callers that need to preserve agents
    /// snapshot them first (see [`TerrainGrid::update_thresholds`]).
    #[instrument(skip(self), fields(size = self.size, seed = self.noise.seed()))]
    fn generate_terrain(&mut self) {
        debug!("generating terrain");
        match ElevationMap::generate(&self.noise, self.size, self.size, &self.elevation_config) {
            Ok(elevation) => {
                let size = self.size;
                self.tiles = (0..size * size)
                    .map(|idx| {
                        let value = elevation.get(idx / size, idx % size);
                        Tile::new(Terrain::from_elevation(value, &self.thresholds))
                    })
                    .collect();
                self.degraded = false;
            }
            Err(error) => {
                warn!(%error, "terrain generation failed, falling back to all-flatland tiles");
                self.tiles = vec![Tile::new(Terrain::Flatland); self.size * self.size];
                self.degraded = true;
            }
        }
    }

    /// Grid edge length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total cell count regardless of walkability.
    pub fn capacity(&self) -> usize {
        self.size * self.size
    }

    /// Current terrain thresholds.
    pub fn thresholds(&self) -> TerrainThresholds {
        self.thresholds
    }

    /// True when the last generation fell back to all-flatland terrain.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    /// Whether `(row, col)` addresses a cell inside the grid.
    pub fn is_valid_position(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    /// Tile at `(row, col)`, or `None` outside the grid.
    pub fn tile(&self, row: usize, col: usize) -> Option<&Tile> {
        if self.is_valid_position(row, col) {
            Some(&self.tiles[self.index(row, col)])
        } else {
            None
        }
    }

    /// Agent at `(row, col)`, or `None` if absent or out of bounds.
    pub fn agent(&self, row: usize, col: usize) -> Option<&Agent> {
        self.tile(row, col).and_then(Tile::agent)
    }

    pub(crate) fn agent_mut(&mut self, row: usize, col: usize) -> Option<&mut Agent> {
        if !self.is_valid_position(row, col) {
            return None;
        }
        let idx = self.index(row, col);
        self.tiles[idx].agent_mut()
    }

    /// Whether the tile at `(row, col)` exists and is walkable.
    pub fn is_walkable(&self, row: usize, col: usize) -> bool {
        self.tile(row, col).map_or(false, Tile::is_walkable)
    }

    /// Whether the tile at `(row, col)` is walkable and unoccupied.
    pub fn is_empty(&self, row: usize, col: usize) -> bool {
        self.tile(row, col)
            .map_or(false, |tile| tile.is_walkable() && !tile.has_agent())
    }

    /// Place or clear an agent at `(row, col)`.
    ///
    /// Fails with `false` and no mutation when the position is invalid or a
    /// non-walkable tile would receive an agent. On success the stored
    /// agent's denormalized position is updated to `(row, col)`.
    pub fn set_agent(&mut self, row: usize, col: usize, agent: Option<Agent>) -> bool {
        if !self.is_valid_position(row, col) {
            return false;
        }
        let idx = self.index(row, col);
        match agent {
            Some(mut agent) => {
                if !self.tiles[idx].is_walkable() {
                    return false;
                }
                agent.set_position(row, col);
                self.tiles[idx].agent = Some(agent);
                true
            }
            None => {
                self.tiles[idx].agent = None;
                true
            }
        }
    }

    /// Move an agent between cells, all-or-nothing.
    ///
    /// Fails with `false` when the source holds no agent or the destination
    /// is not walkable-and-empty; on failure neither cell changes.
    pub fn move_agent(
        &mut self,
        from_row: usize,
        from_col: usize,
        to_row: usize,
        to_col: usize,
    ) -> bool {
        if !self.is_empty(to_row, to_col) {
            return false;
        }
        if !self.is_valid_position(from_row, from_col) {
            return false;
        }
        let from_idx = self.index(from_row, from_col);
        let mut agent = match self.tiles[from_idx].take_agent() {
            Some(agent) => agent,
            None => return false,
        };
        agent.set_position(to_row, to_col);
        let to_idx = self.index(to_row, to_col);
        self.tiles[to_idx].agent = Some(agent);
        true
    }

    /// Agent slots of the valid 8-directional neighborhood.
    ///
    /// Out-of-grid neighbors are omitted entirely; in-grid neighbors without
    /// an agent (including water tiles) contribute `None`. Edge and corner
    /// cells therefore yield fewer than 8 entries.
    pub fn neighbors(&self, row: usize, col: usize) -> Vec<Option<&Agent>> {
        let mut neighbors = Vec::with_capacity(8);
        for (nr, nc) in self.neighbor_positions(row, col) {
            neighbors.push(self.agent(nr, nc));
        }
        neighbors
    }

    /// Coordinates of the valid 8-directional neighborhood.
    pub fn neighbor_positions(&self, row: usize, col: usize) -> Vec<(usize, usize)> {
        let mut positions = Vec::with_capacity(8);
        for dr in -1i64..=1 {
            for dc in -1i64..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let nr = row as i64 + dr;
                let nc = col as i64 + dc;
                if nr < 0 || nc < 0 {
                    continue;
                }
                let (nr, nc) = (nr as usize, nc as usize);
                if self.is_valid_position(nr, nc) {
                    positions.push((nr, nc));
                }
            }
        }
        positions
    }

    /// All placed agents in row-major order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.tiles.iter().filter_map(Tile::agent)
    }

    pub(crate) fn agents_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.tiles.iter_mut().filter_map(Tile::agent_mut)
    }

    /// All placed agents with their coordinates, row-major.
    pub fn agent_cells(&self) -> impl Iterator<Item = (usize, usize, &Agent)> {
        let size = self.size;
        self.tiles.iter().enumerate().filter_map(move |(idx, tile)| {
            tile.agent().map(|agent| (idx / size, idx % size, agent))
        })
    }

    /// Number of placed agents.
    pub fn total_agents(&self) -> usize {
        self.agents().count()
    }

    /// Coordinates of every walkable cell, row-major.
    pub fn walkable_cells(&self) -> Vec<(usize, usize)> {
        self.cells_matching(|tile| tile.is_walkable())
    }

    /// Coordinates of every walkable, unoccupied cell, row-major.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells_matching(|tile| tile.is_walkable() && !tile.has_agent())
    }

    fn cells_matching(&self, predicate: impl Fn(&Tile) -> bool) -> Vec<(usize, usize)> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| predicate(tile))
            .map(|(idx, _)| (idx / self.size, idx % self.size))
            .collect()
    }

    /// Uniformly random walkable, unoccupied cell.
    pub fn random_empty_cell(&self, rng: &mut StdRng) -> Option<(usize, usize)> {
        let cells = self.empty_cells();
        if cells.is_empty() {
            None
        } else {
            Some(cells[rng.gen_range(0..cells.len())])
        }
    }

    /// Tile counts per terrain class.
    pub fn terrain_stats(&self) -> TerrainStats {
        let mut stats = TerrainStats::default();
        for tile in &self.tiles {
            stats.record(tile.terrain());
        }
        stats
    }

    /// Remove every agent from the grid.
    pub fn clear_agents(&mut self) {
        for tile in &mut self.tiles {
            tile.agent = None;
        }
    }

    /// Apply new thresholds and regenerate the terrain, preserving agents
    /// where possible.
    ///
    /// Each previously placed agent is restored to its original cell when
    /// that cell is still walkable-and-empty, otherwise relocated to a
    /// uniformly random empty walkable cell; agents that fit nowhere are
    /// dropped. Dropping is a capacity-loss outcome, not an error.
    pub fn update_thresholds(&mut self, thresholds: TerrainThresholds, rng: &mut StdRng) {
        self.thresholds = thresholds;
        self.regenerate(rng);
    }

    /// Re-seed the noise field and regenerate at the current thresholds.
    pub fn set_noise_seed(&mut self, seed: u64, rng: &mut StdRng) {
        self.noise.set_seed(seed);
        self.regenerate(rng);
    }

    fn regenerate(&mut self, rng: &mut StdRng) {
        let mut displaced = Vec::new();
        let size = self.size;
        for (idx, tile) in self.tiles.iter_mut().enumerate() {
            if let Some(agent) = tile.take_agent() {
                displaced.push((idx / size, idx % size, agent));
            }
        }

        self.generate_terrain();

        let mut dropped = 0usize;
        for (row, col, agent) in displaced {
            if self.is_empty(row, col) {
                self.set_agent(row, col, Some(agent));
            } else if let Some((new_row, new_col)) = self.random_empty_cell(rng) {
                self.set_agent(new_row, new_col, Some(agent));
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            debug!(dropped, "agents dropped during terrain regeneration");
        }
    }
}
