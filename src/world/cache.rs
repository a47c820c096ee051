//! Block cache
//!
//! Maps block coordinates to generated blocks. Blocks are never evicted:
//! once generated, a block keeps its points for the lifetime of the map.

use std::collections::HashMap;

use super::block::{Block, BlockCoord};

#[derive(Default)]
pub struct BlockCache {
    blocks: HashMap<BlockCoord, Block>,
}

impl BlockCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, coord: BlockCoord) -> Option<&Block> {
        self.blocks.get(&coord)
    }

    pub fn get_mut(&mut self, coord: BlockCoord) -> Option<&mut Block> {
        self.blocks.get_mut(&coord)
    }

    /// Insert a block, returning the block it replaced, if any
    pub fn insert(&mut self, block: Block) -> Option<Block> {
        self.blocks.insert(block.coord(), block)
    }

    pub fn contains(&self, coord: BlockCoord) -> bool {
        self.blocks.contains_key(&coord)
    }

    /// Number of cached blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total generated points across all cached blocks
    pub fn point_count(&self) -> usize {
        self.blocks.values().map(Block::len).sum()
    }

    /// Cached block coordinates, in no particular order
    pub fn coords(&self) -> impl Iterator<Item = &BlockCoord> {
        self.blocks.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        self.blocks.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_block(row: i32, col: i32) -> Block {
        Block::new(BlockCoord::new(row, col), 16.0, 0.5)
    }

    #[test]
    fn test_cache_new() {
        let cache = BlockCache::new();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.point_count(), 0);
    }

    #[test]
    fn test_cache_insert_and_get() {
        let mut cache = BlockCache::new();
        let coord = BlockCoord::new(-1, 2);
        assert!(cache.insert(make_block(-1, 2)).is_none());

        assert_eq!(cache.len(), 1);
        assert!(cache.contains(coord));
        assert_eq!(cache.get(coord).unwrap().coord(), coord);
        assert!(cache.get_mut(coord).is_some());
        assert!(cache.get(BlockCoord::new(0, 0)).is_none());
    }

    #[test]
    fn test_cache_insert_replace() {
        let mut cache = BlockCache::new();
        cache.insert(make_block(0, 0));
        let replaced = cache.insert(make_block(0, 0));
        assert!(replaced.is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_coords() {
        let mut cache = BlockCache::new();
        cache.insert(make_block(0, 0));
        cache.insert(make_block(0, 1));
        cache.insert(make_block(3, -3));

        let mut coords: Vec<_> = cache.coords().copied().collect();
        coords.sort();
        assert_eq!(
            coords,
            vec![BlockCoord::new(0, 0), BlockCoord::new(0, 1), BlockCoord::new(3, -3)]
        );
        assert_eq!(cache.iter().count(), 3);
    }
}
