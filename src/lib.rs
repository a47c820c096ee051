//! Biomap - infinite, seed-deterministic 2D biome maps over a jittered grid
//! with Delaunay/Voronoi tessellation

pub mod core;
pub mod math;
pub mod terrain;
pub mod tessellation;
pub mod world;
