//! Seeded 2D simplex noise.
//!
//! Deterministic noise source for terrain elevation: the permutation table is
//! a pure function of the seed, so two fields with the same seed produce
//! bit-identical values at every coordinate.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// The classic 12-direction gradient set. Only the x/y components are used
/// for 2D sampling.
const GRAD3: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

/// One octave of fractal noise: a frequency multiplier and its weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Octave {
    /// Coordinate multiplier for this octave.
    pub frequency: f64,
    /// Contribution weight for this octave.
    pub amplitude: f64,
}

impl Octave {
    /// Build an octave from a frequency/amplitude pair.
    pub const fn new(frequency: f64, amplitude: f64) -> Self {
        Self {
            frequency,
            amplitude,
        }
    }
}

/// Seeded 2D simplex noise field.
#[derive(Debug, Clone)]
pub struct SimplexNoise {
    seed: u64,
    /// Base permutation of 0..=255, duplicated to 512 entries so corner
    /// lookups never wrap.
    perm: [u8; 512],
    /// `perm` reduced mod 12, indexing into [`GRAD3`].
    perm_mod12: [u8; 512],
}

impl SimplexNoise {
    /// Create a noise field for the given seed.
    pub fn new(seed: u64) -> Self {
        let mut noise = Self {
            seed,
            perm: [0; 512],
            perm_mod12: [0; 512],
        };
        noise.rebuild_tables();
        noise
    }

    /// Current seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Re-seed in place, regenerating the permutation tables. No history of
    /// prior permutations is kept.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.rebuild_tables();
    }

    fn rebuild_tables(&mut self) {
        let mut base: [u8; 256] = std::array::from_fn(|i| i as u8);

        // Seeded Fisher-Yates shuffle; the table is a function of the seed only.
        let mut rng = StdRng::seed_from_u64(self.seed);
        for i in (1..base.len()).rev() {
            let j = rng.gen_range(0..=i);
            base.swap(i, j);
        }

        for i in 0..512 {
            self.perm[i] = base[i & 255];
            self.perm_mod12[i] = self.perm[i] % 12;
        }
    }

    /// Raw 2D simplex noise, approximately in `[-1, 1]`.
    pub fn sample(&self, xin: f64, yin: f64) -> f64 {
        // Skew/unskew factors for the triangular simplex lattice.
        let f2 = 0.5 * (3.0_f64.sqrt() - 1.0);
        let g2 = (3.0 - 3.0_f64.sqrt()) / 6.0;

        // Skew the input to locate the containing lattice cell.
        let s = (xin + yin) * f2;
        let i = (xin + s).floor() as i64;
        let j = (yin + s).floor() as i64;
        let t = (i + j) as f64 * g2;
        let x0 = xin - (i as f64 - t);
        let y0 = yin - (j as f64 - t);

        // Corner ordering: lower triangle traverses (1, 0) first.
        let (i1, j1) = if x0 > y0 { (1usize, 0usize) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + g2;
        let y1 = y0 - j1 as f64 + g2;
        let x2 = x0 - 1.0 + 2.0 * g2;
        let y2 = y0 - 1.0 + 2.0 * g2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let gi0 = self.perm_mod12[ii + self.perm[jj] as usize] as usize;
        let gi1 = self.perm_mod12[ii + i1 + self.perm[jj + j1] as usize] as usize;
        let gi2 = self.perm_mod12[ii + 1 + self.perm[jj + 1] as usize] as usize;

        let corner = |x: f64, y: f64, gi: usize| -> f64 {
            let t = 0.5 - x * x - y * y;
            if t < 0.0 {
                0.0
            } else {
                let t = t * t;
                t * t * (GRAD3[gi][0] * x + GRAD3[gi][1] * y)
            }
        };

        // Scale so the summed corner contributions span roughly [-1, 1].
        70.0 * (corner(x0, y0, gi0) + corner(x1, y1, gi1) + corner(x2, y2, gi2))
    }

    /// Noise mapped from `[-1, 1]` to `[0, 1]`.
    pub fn sample01(&self, x: f64, y: f64) -> f64 {
        (self.sample(x, y) + 1.0) / 2.0
    }

    /// Amplitude-weighted sum of `sample01` across octaves, normalized by the
    /// total amplitude so the result stays in `[0, 1]`.
    ///
    /// An empty octave slice yields 0.0.
    pub fn fractal(&self, x: f64, y: f64, octaves: &[Octave]) -> f64 {
        let mut value = 0.0;
        let mut total_amplitude = 0.0;

        for octave in octaves {
            value += self.sample01(x * octave.frequency, y * octave.frequency) * octave.amplitude;
            total_amplitude += octave.amplitude;
        }

        if total_amplitude == 0.0 {
            return 0.0;
        }
        value / total_amplitude
    }
}
