//! World map: block cache, lazy generation and tessellation driver

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;

use super::block::{block_range_bounds, block_range_covering, Block, BlockCoord, GridPoint};
use super::cache::BlockCache;
use super::config::MapConfig;
use crate::core::{Error, Result};
use crate::math::{GridRange, Rect};
use crate::tessellation::{Tessellation, Triangulation, Voronoi};
use crate::terrain::biome::{Biome, BiomeCatalog};
use crate::terrain::climate::ClimateSamplerSet;

/// Cells to scan around the rounded query cell so that no point outside the
/// window can beat the query cell's own point.
///
/// The query lies within half a tile of its cell centre, and every point lies
/// within `jitter` tiles of its nominal position per axis. The cell's own point
/// is therefore at most `sqrt(2) * (0.5 + jitter)` tiles away, and a point `k`
/// cells out is at least `k - 0.5 - jitter` tiles away.
fn nearest_search_radius(jitter: f64) -> i32 {
    ((1.0 + std::f64::consts::SQRT_2) * (0.5 + jitter)).ceil() as i32 - 1
}

/// Location of a view point inside the block cache
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PointRef {
    block: BlockCoord,
    offset: usize,
}

/// Infinite, seed-deterministic biome map generated block by block.
///
/// Coverage only grows: blocks are generated the first time a requested
/// bounds touches them and are kept for the lifetime of the map. The points of
/// all blocks inside the view block range back one triangulation; point index
/// `i` of the triangulation is [`view_point(i)`](Self::view_point).
pub struct WorldMap {
    config: MapConfig,
    samplers: ClimateSamplerSet,
    catalog: Arc<BiomeCatalog>,
    blocks: BlockCache,
    view_block_range: GridRange,
    view_bounds: Rect,
    view_points: Vec<PointRef>,
    tessellation: Tessellation,
}

impl WorldMap {
    /// Build a map with default config and the built-in biome catalog.
    pub fn new(seed: &str, bounds: Rect, tile_size: f64) -> Result<Self> {
        let catalog = Arc::new(BiomeCatalog::builtin()?);
        Self::with_config(seed, bounds, MapConfig::with_tile_size(tile_size), catalog)
    }

    pub fn with_config(
        seed: &str,
        bounds: Rect,
        config: MapConfig,
        catalog: Arc<BiomeCatalog>,
    ) -> Result<Self> {
        config.validate()?;
        bounds.validate()?;
        if catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        let samplers = ClimateSamplerSet::new(seed, &config.climate);
        let range = block_range_covering(&bounds, config.tile_size);

        let mut blocks = BlockCache::new();
        for (row, col) in range.iter() {
            let block = generate_block(BlockCoord::new(row, col), &config, &samplers, &catalog)?;
            blocks.insert(block);
        }

        let (view_points, coords) = gather(&range, &blocks, &HashMap::new());
        let view_bounds = block_range_bounds(&range, config.tile_size);
        let tessellation = Tessellation::build(coords, view_bounds)?;

        log::info!(
            "Built world map: seed={:?} tile_size={} blocks={} points={}",
            seed,
            config.tile_size,
            blocks.len(),
            view_points.len()
        );

        Ok(Self {
            config,
            samplers,
            catalog,
            blocks,
            view_block_range: range,
            view_bounds,
            view_points,
            tessellation,
        })
    }

    /// Extend coverage to include `bounds`.
    ///
    /// Missing blocks are generated and the tessellation is rebuilt only when
    /// the view block range changes; otherwise this is a no-op. On error no
    /// state changes.
    pub fn grow(&mut self, bounds: Rect) -> Result<()> {
        bounds.validate()?;

        let required = block_range_covering(&bounds, self.config.tile_size);
        let range = self.view_block_range.union(&required);
        if range == self.view_block_range {
            return Ok(());
        }

        let mut staged = HashMap::new();
        for (row, col) in range.iter() {
            let coord = BlockCoord::new(row, col);
            if !self.blocks.contains(coord) {
                let block = generate_block(coord, &self.config, &self.samplers, &self.catalog)?;
                staged.insert(coord, block);
            }
        }

        self.commit(range, staged)?;
        debug_assert!(self.view_bounds.contains_rect(&bounds));
        Ok(())
    }

    /// Regenerate positions and climate of every block in the view range with
    /// fresh jitter draws. Point identity is not preserved.
    pub fn rebuild(&mut self) -> Result<()> {
        let mut samplers = self.samplers.clone();
        samplers.reshuffle();

        let range = self.view_block_range;
        let mut staged = HashMap::with_capacity(range.len());
        for (row, col) in range.iter() {
            let coord = BlockCoord::new(row, col);
            let mut block = match self.blocks.get(coord) {
                Some(cached) => cached.clone(),
                None => Block::new(coord, self.config.tile_size, self.config.jitter),
            };
            block.clear();
            block.fill(&samplers);
            block.update_climate(&samplers, &self.catalog)?;
            staged.insert(coord, block);
        }

        self.commit(range, staged)?;
        self.samplers = samplers;
        log::info!("Rebuilt {} blocks (jitter epoch {})", range.len(), self.samplers.epoch());
        Ok(())
    }

    /// Swap in samplers for `seed` and recompute climate and biome of every
    /// cached point. Positions and the tessellation are untouched.
    ///
    /// The jitter epoch carries over, so a later [`rebuild`](Self::rebuild)
    /// still draws positions no earlier rebuild produced.
    pub fn reseed(&mut self, seed: &str) -> Result<()> {
        let samplers = ClimateSamplerSet::new(seed, &self.config.climate)
            .with_epoch(self.samplers.epoch());
        for block in self.blocks.iter_mut() {
            block.update_climate(&samplers, &self.catalog)?;
        }
        self.samplers = samplers;
        log::info!("Reseeded {} blocks with seed {:?}", self.blocks.len(), seed);
        Ok(())
    }

    /// [`reseed`](Self::reseed) with a fresh random seed.
    pub fn randomize(&mut self) -> Result<()> {
        let seed = random_seed();
        self.reseed(&seed)
    }

    /// Replace the biome catalog and reclassify every cached point.
    pub fn set_catalog(&mut self, catalog: Arc<BiomeCatalog>) -> Result<()> {
        if catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        for block in self.blocks.iter_mut() {
            block.update_climate(&self.samplers, &catalog)?;
        }
        log::debug!("Reclassified {} blocks against {} biomes", self.blocks.len(), catalog.len());
        self.catalog = catalog;
        Ok(())
    }

    /// Tessellate the view of `range` (staged blocks shadow cached ones) and,
    /// only if that succeeds, commit blocks and view state together.
    fn commit(&mut self, range: GridRange, staged: HashMap<BlockCoord, Block>) -> Result<()> {
        let (view_points, coords) = gather(&range, &self.blocks, &staged);
        let view_bounds = block_range_bounds(&range, self.config.tile_size);
        self.tessellation.set_points(coords, view_bounds)?;

        log::debug!(
            "View block range {:?} -> {:?}: {} blocks generated, {} points",
            self.view_block_range,
            range,
            staged.len(),
            view_points.len()
        );

        for (_, block) in staged {
            self.blocks.insert(block);
        }
        self.view_block_range = range;
        self.view_bounds = view_bounds;
        self.view_points = view_points;
        Ok(())
    }

    /// Point owning the grid cell under world position `(x, y)`, if generated.
    pub fn point_at(&self, x: f64, y: f64) -> Option<&GridPoint> {
        let row = (y / self.config.tile_size).floor() as i32;
        let col = (x / self.config.tile_size).floor() as i32;
        self.point_at_cell(row, col)
    }

    /// Point for grid cell `(row, col)`, if its block is generated.
    pub fn point_at_cell(&self, row: i32, col: i32) -> Option<&GridPoint> {
        self.blocks
            .get(BlockCoord::containing(row, col))?
            .point_at(row, col)
    }

    /// Generated point closest to `(x, y)`; the point whose Voronoi cell
    /// contains the position. Exact for any jitter the config accepts.
    pub fn nearest_point(&self, x: f64, y: f64) -> Option<&GridPoint> {
        let row = (y / self.config.tile_size).round() as i32;
        let col = (x / self.config.tile_size).round() as i32;
        let radius = nearest_search_radius(self.config.jitter);

        let mut best: Option<(&GridPoint, f64)> = None;
        for dr in -radius..=radius {
            for dc in -radius..=radius {
                let Some(p) = self.point_at_cell(row + dr, col + dc) else {
                    continue;
                };
                let d = (p.x - x) * (p.x - x) + (p.y - y) * (p.y - y);
                if best.is_none_or(|(_, best_d)| d < best_d) {
                    best = Some((p, d));
                }
            }
        }
        best.map(|(p, _)| p)
    }

    fn resolve(&self, r: &PointRef) -> &GridPoint {
        self.blocks
            .get(r.block)
            .and_then(|block| block.point(r.offset))
            .unwrap_or_else(|| panic!("missing block {:?} backing view point", r.block))
    }

    /// Points backing the triangulation, index-aligned with it
    pub fn view_points(&self) -> impl Iterator<Item = &GridPoint> {
        self.view_points.iter().map(move |r| self.resolve(r))
    }

    pub fn view_point(&self, index: usize) -> Option<&GridPoint> {
        self.view_points.get(index).map(|r| self.resolve(r))
    }

    pub fn view_point_count(&self) -> usize {
        self.view_points.len()
    }

    pub fn seed(&self) -> &str {
        self.samplers.seed()
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn tile_size(&self) -> f64 {
        self.config.tile_size
    }

    pub fn samplers(&self) -> &ClimateSamplerSet {
        &self.samplers
    }

    pub fn catalog(&self) -> &Arc<BiomeCatalog> {
        &self.catalog
    }

    /// Catalog entry for a point's biome
    pub fn biome(&self, point: &GridPoint) -> Option<&Biome> {
        self.catalog.get(point.biome?)
    }

    /// Block-aligned world rectangle of the current view block range
    pub fn view_bounds(&self) -> Rect {
        self.view_bounds
    }

    pub fn view_block_range(&self) -> GridRange {
        self.view_block_range
    }

    /// Number of cached blocks
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block(&self, coord: BlockCoord) -> Option<&Block> {
        self.blocks.get(coord)
    }

    pub fn tessellation(&self) -> &Tessellation {
        &self.tessellation
    }

    pub fn triangulation(&self) -> &Triangulation {
        self.tessellation.triangulation()
    }

    /// Flat coordinate buffer, `2 * view_point_count()` long
    pub fn coords(&self) -> &[f64] {
        self.tessellation.coords()
    }

    /// Voronoi diagram clipped to [`view_bounds`](Self::view_bounds)
    pub fn voronoi(&mut self) -> &Voronoi {
        self.tessellation.voronoi()
    }
}

fn generate_block(
    coord: BlockCoord,
    config: &MapConfig,
    samplers: &ClimateSamplerSet,
    catalog: &BiomeCatalog,
) -> Result<Block> {
    let mut block = Block::new(coord, config.tile_size, config.jitter);
    block.fill(samplers);
    block.update_climate(samplers, catalog)?;
    log::trace!("Generated block {:?}", coord);
    Ok(block)
}

/// Point refs and flat coordinates for every block in `range`, row-major by
/// block then by point.
fn gather(
    range: &GridRange,
    cache: &BlockCache,
    staged: &HashMap<BlockCoord, Block>,
) -> (Vec<PointRef>, Vec<f64>) {
    let mut refs = Vec::new();
    let mut coords = Vec::new();

    for (row, col) in range.iter() {
        let coord = BlockCoord::new(row, col);
        let block = staged
            .get(&coord)
            .or_else(|| cache.get(coord))
            .unwrap_or_else(|| panic!("missing block {:?} in view range {:?}", coord, range));

        for (offset, p) in block.indexed_points() {
            refs.push(PointRef { block: coord, offset });
            coords.push(p.x);
            coords.push(p.y);
        }
    }
    (refs, coords)
}

/// 64 bytes from the OS RNG, base64 encoded.
fn random_seed() -> String {
    let mut bytes = [0u8; 64];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}
