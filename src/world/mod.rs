//! Block-based world generation

pub mod config;
pub mod block;
pub mod cache;
pub mod map;

pub use config::MapConfig;
pub use block::{Block, BlockCoord, GridPoint, BLOCK_COLS, BLOCK_ROWS};
pub use cache::BlockCache;
pub use map::WorldMap;
