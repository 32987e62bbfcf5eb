//! # Splitter Module
//!
//! Image partitioning: grid geometry and the tile entity.

pub mod grid;
pub mod tile;

// Re-export commonly used types for convenience
pub use grid::{GRID_COLS, GRID_ROWS, Rect, TILE_COUNT, partition, tile_rects};
pub use tile::{Tile, sanitize_description};
