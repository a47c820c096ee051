//! Map generation configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::terrain::climate::ClimateParams;

/// Configuration for a [`WorldMap`](super::WorldMap).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// World-space edge length of one grid cell.
    pub tile_size: f64,
    /// Maximum displacement of a point from its nominal grid position, as a
    /// fraction of `tile_size`.
    pub jitter: f64,
    /// Climate noise parameters.
    pub climate: ClimateParams,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_size: 64.0,
            jitter: 0.5,
            climate: ClimateParams::default(),
        }
    }
}

impl MapConfig {
    /// Default config with a custom tile size.
    pub fn with_tile_size(tile_size: f64) -> Self {
        Self {
            tile_size,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tile_size.is_finite() || self.tile_size <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "tile_size must be positive, got {}",
                self.tile_size
            )));
        }
        if !(0.0..1.0).contains(&self.jitter) {
            return Err(Error::InvalidConfig(format!(
                "jitter must be in [0, 1), got {}",
                self.jitter
            )));
        }
        let scales = [
            ("elevation_scale", self.climate.elevation_scale),
            ("temperature_scale", self.climate.temperature_scale),
            ("rainfall_scale", self.climate.rainfall_scale),
        ];
        for (name, scale) in scales {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(Error::InvalidConfig(format!("{} must be positive, got {}", name, scale)));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file (sync)
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
