//! Elevation map generation.
//!
//! Converts fractal noise into a per-cell elevation field in `[0, 1]`,
//! ready for terrain classification.

use crate::noise::{Octave, SimplexNoise};
use segscape_core::SimError;
use serde::{Deserialize, Serialize};

/// Parameters for elevation map generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationConfig {
    /// Octaves combined into the fractal sample.
    pub octaves: Vec<Octave>,
    /// Power-curve redistribution exponent applied after combination.
    pub exponent: f64,
    /// Width of the sampled noise window; grid coordinates are normalized to
    /// a centered `[-0.5, 0.5] * scale` range.
    pub scale: f64,
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self {
            octaves: vec![
                Octave::new(1.0, 1.0),
                Octave::new(2.0, 0.5),
                Octave::new(4.0, 0.25),
                Octave::new(8.0, 0.125),
            ],
            exponent: 2.0,
            scale: 1.0,
        }
    }
}

/// Per-cell elevation values in `[0, 1]`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationMap {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl ElevationMap {
    /// Generate an elevation map by sampling fractal noise per cell.
    ///
    /// Returns `InvalidDimensions` when either dimension is zero; this is a
    /// precondition violation, not a recoverable generation fault.
    pub fn generate(
        noise: &SimplexNoise,
        width: usize,
        height: usize,
        config: &ElevationConfig,
    ) -> Result<Self, SimError> {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidDimensions { width, height });
        }

        let mut values = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                // Center-normalize so the noise window is independent of grid size.
                let nx = (col as f64 / width as f64 - 0.5) * config.scale;
                let ny = (row as f64 / height as f64 - 0.5) * config.scale;

                let elevation = noise.fractal(nx, ny, &config.octaves);
                values.push(elevation.powf(config.exponent).clamp(0.0, 1.0));
            }
        }

        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Elevation at `(row, col)`.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.height, "row out of bounds");
        assert!(col < self.width, "col out of bounds");
        self.values[row * self.width + col]
    }

    /// Map width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Map height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Smallest elevation in the map.
    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest elevation in the map.
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Mean elevation across the map.
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_dimensions() {
        let noise = SimplexNoise::new(1);
        let config = ElevationConfig::default();

        assert_eq!(
            ElevationMap::generate(&noise, 0, 10, &config),
            Err(SimError::InvalidDimensions {
                width: 0,
                height: 10
            })
        );
        assert_eq!(
            ElevationMap::generate(&noise, 10, 0, &config),
            Err(SimError::InvalidDimensions {
                width: 10,
                height: 0
            })
        );
    }

    #[test]
    fn test_values_clamped_to_unit_interval() {
        let noise = SimplexNoise::new(31337);
        let map = ElevationMap::generate(&noise, 32, 32, &ElevationConfig::default())
            .expect("generation succeeds for positive dimensions");

        assert!(map.min() >= 0.0);
        assert!(map.max() <= 1.0);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let noise = SimplexNoise::new(2024);
        let config = ElevationConfig::default();

        let a = ElevationMap::generate(&noise, 16, 16, &config).expect("valid dimensions");
        let b = ElevationMap::generate(&noise, 16, 16, &config).expect("valid dimensions");
        assert_eq!(a, b);
    }

    #[test]
    fn test_summary_statistics_ordering() {
        let noise = SimplexNoise::new(5);
        let map = ElevationMap::generate(&noise, 24, 24, &ElevationConfig::default())
            .expect("valid dimensions");

        assert!(map.min() <= map.mean());
        assert!(map.mean() <= map.max());
    }

    #[test]
    #[should_panic(expected = "row out of bounds")]
    fn test_get_panics_out_of_bounds() {
        let noise = SimplexNoise::new(1);
        let map = ElevationMap::generate(&noise, 4, 4, &ElevationConfig::default())
            .expect("valid dimensions");
        map.get(4, 0);
    }
}
