//! Simulation configuration.
//!
//! Configuration is a plain in-memory structure; mutating it is the sole
//! trigger for terrain regeneration and repopulation at the engine layer.
//! Partial updates are merged and then normalized so the per-group arrays
//! always have exactly `group_count` entries.

use crate::color::Color;
use crate::error::SimError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Identifier of an agent group, in `[0, group_count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub usize);

/// Elevation cut-offs separating water, flatland and mountain tiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainThresholds {
    /// Elevations strictly below this value classify as water.
    pub water: f64,
    /// Elevations at or above `water` and strictly below this value classify
    /// as flatland; everything above is mountain.
    pub flatland: f64,
}

impl Default for TerrainThresholds {
    fn default() -> Self {
        Self {
            water: 0.3,
            flatland: 0.7,
        }
    }
}

impl TerrainThresholds {
    /// Check `0 < water < flatland < 1`.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.water > 0.0 && self.water < self.flatland && self.flatland < 1.0 {
            Ok(())
        } else {
            Err(SimError::InvalidThresholds {
                water: self.water,
                flatland: self.flatland,
            })
        }
    }
}

/// Full simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Grid edge length; the grid is `grid_size` × `grid_size` cells.
    pub grid_size: usize,
    /// Number of agent groups (K).
    pub group_count: usize,
    /// Display color per group, kept at length `group_count`.
    pub colors: Vec<Color>,
    /// Requested number of agents per group, kept at length `group_count`.
    pub group_sizes: Vec<usize>,
    /// Happiness threshold per group in `[0, 1]`, kept at length `group_count`.
    pub tolerances: Vec<f64>,
    /// Elevation cut-offs for terrain classification.
    pub terrain_thresholds: TerrainThresholds,
    /// Seed for the terrain noise field.
    pub noise_seed: u64,
    /// Seed for the placement shuffle and relocation fallback stream,
    /// independent of the terrain seed.
    pub placement_seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            group_count: 2,
            colors: vec![Color::rgb(0xFF, 0x41, 0x36), Color::rgb(0x00, 0x74, 0xD9)],
            group_sizes: vec![50, 50],
            tolerances: vec![0.3, 0.3],
            terrain_thresholds: TerrainThresholds::default(),
            noise_seed: 12345,
            placement_seed: 7,
        }
    }
}

/// Partial configuration update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPatch {
    /// New grid edge length.
    pub grid_size: Option<usize>,
    /// New group count.
    pub group_count: Option<usize>,
    /// Replacement group palette.
    pub colors: Option<Vec<Color>>,
    /// Replacement per-group agent counts.
    pub group_sizes: Option<Vec<usize>>,
    /// Replacement per-group tolerances.
    pub tolerances: Option<Vec<f64>>,
    /// Replacement terrain thresholds; silently skipped if invalid.
    pub terrain_thresholds: Option<TerrainThresholds>,
    /// New terrain noise seed.
    pub noise_seed: Option<u64>,
    /// New placement stream seed.
    pub placement_seed: Option<u64>,
}

impl SimConfig {
    /// Merge a partial update and normalize the result.
    ///
    /// Never fails: unrecognizable values are dropped (invalid thresholds)
    /// or clamped, and the per-group arrays are padded/truncated so the
    /// configuration stays internally consistent.
    pub fn apply(&mut self, patch: ConfigPatch, rng: &mut impl Rng) {
        if let Some(grid_size) = patch.grid_size {
            self.grid_size = grid_size;
        }
        if let Some(group_count) = patch.group_count {
            self.group_count = group_count;
        }
        if let Some(colors) = patch.colors {
            self.colors = colors;
        }
        if let Some(group_sizes) = patch.group_sizes {
            self.group_sizes = group_sizes;
        }
        if let Some(tolerances) = patch.tolerances {
            self.tolerances = tolerances;
        }
        if let Some(thresholds) = patch.terrain_thresholds {
            if thresholds.validate().is_ok() {
                self.terrain_thresholds = thresholds;
            }
        }
        if let Some(noise_seed) = patch.noise_seed {
            self.noise_seed = noise_seed;
        }
        if let Some(placement_seed) = patch.placement_seed {
            self.placement_seed = placement_seed;
        }
        self.normalize(rng);
    }

    /// Clamp scalar fields and pad/truncate the per-group arrays to
    /// `group_count` entries.
    ///
    /// Missing sizes pad with 10, tolerances with 0.3, colors with a freshly
    /// generated random color; tolerances are clamped into `[0, 1]`.
    pub fn normalize(&mut self, rng: &mut impl Rng) {
        self.grid_size = self.grid_size.max(1);
        self.group_count = self.group_count.max(1);

        let k = self.group_count;
        while self.colors.len() < k {
            self.colors.push(Color::random(rng));
        }
        self.colors.truncate(k);
        while self.group_sizes.len() < k {
            self.group_sizes.push(10);
        }
        self.group_sizes.truncate(k);
        while self.tolerances.len() < k {
            self.tolerances.push(0.3);
        }
        self.tolerances.truncate(k);

        for tolerance in &mut self.tolerances {
            *tolerance = tolerance.clamp(0.0, 1.0);
        }
    }
}
