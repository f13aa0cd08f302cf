//! Terrain classification.
//!
//! Elevation values map onto three tile classes via the configured
//! thresholds. Water is the only class that refuses agents.

use segscape_core::TerrainThresholds;
use serde::{Deserialize, Serialize};

/// Terrain classification of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Below the water threshold; never walkable.
    Water,
    /// Between the water and flatland thresholds.
    Flatland,
    /// At or above the flatland threshold.
    Mountain,
}

impl Terrain {
    /// All terrain classes (for iteration).
    pub fn all() -> &'static [Terrain] {
        &[Terrain::Water, Terrain::Flatland, Terrain::Mountain]
    }

    /// Canonical lowercase string key for configs/logging.
    pub const fn as_str(self) -> &'static str {
        match self {
            Terrain::Water => "water",
            Terrain::Flatland => "flatland",
            Terrain::Mountain => "mountain",
        }
    }

    /// Whether agents may occupy tiles of this class.
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Terrain::Water)
    }

    /// Classify an elevation value against the given thresholds.
    pub fn from_elevation(elevation: f64, thresholds: &TerrainThresholds) -> Self {
        if elevation < thresholds.water {
            Terrain::Water
        } else if elevation < thresholds.flatland {
            Terrain::Flatland
        } else {
            Terrain::Mountain
        }
    }
}

/// Tile counts per terrain class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainStats {
    /// Number of water tiles.
    pub water: usize,
    /// Number of flatland tiles.
    pub flatland: usize,
    /// Number of mountain tiles.
    pub mountain: usize,
}

impl TerrainStats {
    /// Tiles agents may occupy.
    pub fn walkable(&self) -> usize {
        self.flatland + self.mountain
    }

    /// All counted tiles.
    pub fn total(&self) -> usize {
        self.water + self.flatland + self.mountain
    }

    pub(crate) fn record(&mut self, terrain: Terrain) {
        match terrain {
            Terrain::Water => self.water += 1,
            Terrain::Flatland => self.flatland += 1,
            Terrain::Mountain => self.mountain += 1,
        }
    }
}
