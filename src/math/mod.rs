//! Planar math utilities

pub mod rect;
pub mod grid;

pub use rect::Rect;
pub use grid::GridRange;
