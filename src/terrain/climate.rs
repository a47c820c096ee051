//! Seed-derived climate fields and per-cell jitter

use noise::{NoiseFn, Simplex};
use rand::distributions::Standard;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::DVec2;

pub const MIN_ELEVATION: f64 = 0.0;
pub const MAX_ELEVATION: f64 = 1.0;

/// Temperatures are in fahrenheit.
pub const MIN_TEMPERATURE: f64 = -20.0;
pub const MAX_TEMPERATURE: f64 = 100.0;

/// Rainfall in centimeters.
pub const MIN_RAINFALL: f64 = 0.0;
pub const MAX_RAINFALL: f64 = 1500.0;

/// Spatial scale of each climate field (world units per noise unit).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateParams {
    pub elevation_scale: f64,
    pub temperature_scale: f64,
    pub rainfall_scale: f64,
}

impl Default for ClimateParams {
    fn default() -> Self {
        Self {
            elevation_scale: 1000.0,
            temperature_scale: 2000.0,
            rainfall_scale: 1500.0,
        }
    }
}

/// SHA-256 over the concatenated parts.
fn derive_seed(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// One smoothed noise field mapped into a fixed physical range.
#[derive(Clone)]
pub struct ClimateField {
    noise: Simplex,
    scale: f64,
    min: f64,
    max: f64,
}

impl ClimateField {
    /// Build a field from `seed + suffix`.
    pub fn new(seed: &str, suffix: &str, scale: f64, min: f64, max: f64) -> Self {
        let digest = derive_seed(&[seed.as_bytes(), suffix.as_bytes()]);
        let noise_seed = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
        Self {
            noise: Simplex::new(noise_seed),
            scale,
            min,
            max,
        }
    }

    /// Sample at world position, mapped from [-1, 1] into `[min, max]`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let n = self.noise.get([x / self.scale, y / self.scale]);
        let mid = 0.5 * (self.max + self.min);
        let half = 0.5 * (self.max - self.min);
        (mid + half * n).clamp(self.min, self.max)
    }

    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

/// Climate values at one world position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClimateSample {
    pub elevation: f64,
    pub temperature: f64,
    pub rainfall: f64,
}

/// Per-cell jitter keyed by `(seed, epoch, row, col)`.
///
/// Each cell seeds its own ChaCha stream, so a point's offset does not depend
/// on which cells were generated before it.
#[derive(Clone)]
struct JitterSource {
    /// Hasher already fed with `seed + "pts"`.
    base: Sha256,
    epoch: u64,
}

impl JitterSource {
    fn new(seed: &str) -> Self {
        let mut base = Sha256::new();
        base.update(seed.as_bytes());
        base.update(b"pts");
        Self { base, epoch: 0 }
    }

    fn offset(&self, row: i32, col: i32) -> DVec2 {
        let mut hasher = self.base.clone();
        hasher.update(self.epoch.to_le_bytes());
        hasher.update(row.to_le_bytes());
        hasher.update(col.to_le_bytes());
        let mut rng = ChaCha8Rng::from_seed(hasher.finalize().into());

        let a: f64 = rng.sample(Standard);
        let b: f64 = rng.sample(Standard);
        let c: f64 = rng.sample(Standard);
        let d: f64 = rng.sample(Standard);
        DVec2::new(a - b, c - d)
    }
}

/// Elevation, temperature and rainfall fields plus the jitter source for one seed.
#[derive(Clone)]
pub struct ClimateSamplerSet {
    seed: String,
    elevation: ClimateField,
    temperature: ClimateField,
    rainfall: ClimateField,
    jitter: JitterSource,
}

impl ClimateSamplerSet {
    pub fn new(seed: &str, params: &ClimateParams) -> Self {
        Self {
            seed: seed.to_string(),
            elevation: ClimateField::new(
                seed, "elev", params.elevation_scale, MIN_ELEVATION, MAX_ELEVATION,
            ),
            temperature: ClimateField::new(
                seed, "temp", params.temperature_scale, MIN_TEMPERATURE, MAX_TEMPERATURE,
            ),
            rainfall: ClimateField::new(
                seed, "rain", params.rainfall_scale, MIN_RAINFALL, MAX_RAINFALL,
            ),
            jitter: JitterSource::new(seed),
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn elevation(&self, x: f64, y: f64) -> f64 {
        self.elevation.sample(x, y)
    }

    pub fn temperature(&self, x: f64, y: f64) -> f64 {
        self.temperature.sample(x, y)
    }

    pub fn rainfall(&self, x: f64, y: f64) -> f64 {
        self.rainfall.sample(x, y)
    }

    /// All three fields at once
    pub fn sample(&self, x: f64, y: f64) -> ClimateSample {
        ClimateSample {
            elevation: self.elevation(x, y),
            temperature: self.temperature(x, y),
            rainfall: self.rainfall(x, y),
        }
    }

    /// Jitter for grid cell `(row, col)`, each component in (-1, 1).
    /// Callers scale it by the jitter fraction and tile size.
    pub fn jitter(&self, row: i32, col: i32) -> DVec2 {
        self.jitter.offset(row, col)
    }

    pub fn epoch(&self) -> u64 {
        self.jitter.epoch
    }

    /// Same samplers continuing from `epoch`, so later reshuffles never
    /// revisit earlier draws.
    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.jitter.epoch = epoch;
        self
    }

    /// Advance the jitter epoch so subsequent draws differ from all earlier ones.
    pub fn reshuffle(&mut self) {
        self.jitter.epoch += 1;
    }
}
