//! Climate sampling and biome classification

pub mod climate;
pub use climate::{ClimateField, ClimateParams, ClimateSample, ClimateSamplerSet};

pub mod biome;
pub use biome::{Biome, BiomeCatalog, BiomeId, RawBiome};
