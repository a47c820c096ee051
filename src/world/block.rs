//! Fixed-size blocks of grid cells, the unit of lazy generation

use crate::core::{DVec2, Error, Result};
use crate::math::{GridRange, Rect};
use crate::terrain::biome::{BiomeCatalog, BiomeId};
use crate::terrain::climate::ClimateSamplerSet;

/// Tile rows per block
pub const BLOCK_ROWS: i32 = 8;

/// Tile columns per block
pub const BLOCK_COLS: i32 = 8;

/// Integer coordinate identifying a block in the block grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockCoord {
    pub row: i32,
    pub col: i32,
}

impl BlockCoord {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Block containing tile `(row, col)`
    pub fn containing(row: i32, col: i32) -> Self {
        Self {
            row: row.div_euclid(BLOCK_ROWS),
            col: col.div_euclid(BLOCK_COLS),
        }
    }

    /// Inclusive tile range covered by this block
    pub fn tile_range(&self) -> GridRange {
        let row_start = self.row * BLOCK_ROWS;
        let col_start = self.col * BLOCK_COLS;
        GridRange::new(
            row_start,
            row_start + BLOCK_ROWS - 1,
            col_start,
            col_start + BLOCK_COLS - 1,
        )
    }
}

/// Block range covering `bounds` at the given tile size.
pub fn block_range_covering(bounds: &Rect, tile_size: f64) -> GridRange {
    GridRange::covering(bounds, tile_size).coarsen(BLOCK_ROWS, BLOCK_COLS)
}

/// World rectangle spanned by a block range. Always block-aligned.
pub fn block_range_bounds(range: &GridRange, tile_size: f64) -> Rect {
    let block_w = BLOCK_COLS as f64 * tile_size;
    let block_h = BLOCK_ROWS as f64 * tile_size;
    Rect {
        left: range.col_start as f64 * block_w,
        right: (range.col_end as f64 + 1.0) * block_w,
        top: range.row_start as f64 * block_h,
        bottom: (range.row_end as f64 + 1.0) * block_h,
    }
}

/// A generated map point. Identity is its `(row, col)` grid cell.
#[derive(Clone, Debug, PartialEq)]
pub struct GridPoint {
    pub row: i32,
    pub col: i32,
    pub x: f64,
    pub y: f64,
    pub elevation: f64,
    pub temperature: f64,
    pub rainfall: f64,
    /// Unset until climate has been computed
    pub biome: Option<BiomeId>,
}

impl GridPoint {
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Un-jittered position of the point's grid cell
    pub fn nominal_position(&self, tile_size: f64) -> DVec2 {
        DVec2::new(self.col as f64 * tile_size, self.row as f64 * tile_size)
    }
}

/// Rectangular chunk of `BLOCK_ROWS x BLOCK_COLS` tiles and their points.
///
/// Points are stored row-major at offset `(row - row_start) * cols + (col - col_start)`.
#[derive(Clone, Debug)]
pub struct Block {
    coord: BlockCoord,
    range: GridRange,
    tile_size: f64,
    /// Max jitter as a fraction of tile size
    jitter: f64,
    points: Vec<Option<GridPoint>>,
}

impl Block {
    /// Allocate an empty block; call [`fill`](Self::fill) to generate points.
    pub fn new(coord: BlockCoord, tile_size: f64, jitter: f64) -> Self {
        let range = coord.tile_range();
        Self {
            coord,
            range,
            tile_size,
            jitter,
            points: vec![None; range.len()],
        }
    }

    pub fn coord(&self) -> BlockCoord {
        self.coord
    }

    pub fn range(&self) -> GridRange {
        self.range
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// Number of generated points
    pub fn len(&self) -> usize {
        self.points.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.points.iter().all(Option::is_none)
    }

    /// Whether every cell has a point
    pub fn is_filled(&self) -> bool {
        self.points.iter().all(Option::is_some)
    }

    /// Create points for every empty cell. Existing points are not moved.
    ///
    /// Returns the number of points created.
    pub fn fill(&mut self, samplers: &ClimateSamplerSet) -> usize {
        let mut created = 0;
        for (offset, (row, col)) in self.range.iter().enumerate() {
            if self.points[offset].is_some() {
                continue;
            }
            let j = samplers.jitter(row, col) * self.jitter;
            self.points[offset] = Some(GridPoint {
                row,
                col,
                x: self.tile_size * (col as f64 + j.x),
                y: self.tile_size * (row as f64 + j.y),
                elevation: 0.0,
                temperature: 0.0,
                rainfall: 0.0,
                biome: None,
            });
            created += 1;
        }
        created
    }

    /// Drop all points so the next `fill` regenerates them.
    pub fn clear(&mut self) {
        self.points.iter_mut().for_each(|p| *p = None);
    }

    /// Resample climate at each point's current position and classify its biome.
    pub fn update_climate(&mut self, samplers: &ClimateSamplerSet, catalog: &BiomeCatalog) -> Result<()> {
        if catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        for p in self.points.iter_mut().flatten() {
            let climate = samplers.sample(p.x, p.y);
            p.elevation = climate.elevation;
            p.temperature = climate.temperature;
            p.rainfall = climate.rainfall;
            p.biome = Some(catalog.classify(climate.temperature, climate.rainfall, Some(climate.elevation))?);
        }
        Ok(())
    }

    /// Point for global grid cell `(row, col)`; `None` outside this block.
    pub fn point_at(&self, row: i32, col: i32) -> Option<&GridPoint> {
        let offset = self.range.offset_of(row, col)?;
        self.points[offset].as_ref()
    }

    /// Point at a block-local row-major offset
    pub fn point(&self, offset: usize) -> Option<&GridPoint> {
        self.points.get(offset)?.as_ref()
    }

    /// Generated points in row-major order
    pub fn points(&self) -> impl Iterator<Item = &GridPoint> {
        self.points.iter().flatten()
    }

    /// Generated points with their block-local offsets
    pub fn indexed_points(&self) -> impl Iterator<Item = (usize, &GridPoint)> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(offset, p)| p.as_ref().map(|p| (offset, p)))
    }
}
