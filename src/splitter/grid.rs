//! # 3x3 Grid Partitioner
//!
//! Cuts a decoded raster image into nine equally sized tiles.
//!
//! ## Geometry
//!
//! Tile dimensions are `floor(width/3) x floor(height/3)` for every tile.
//! Integer division means up to `width mod 3` trailing pixel columns and
//! `height mod 3` trailing rows are dropped, never redistributed. Tiles are
//! produced in row-major order (row outer, column inner) and assigned
//! `id = row*3 + col`, so id 0 is top-left and id 8 is bottom-right.
//!
//! Partitioning is all-or-nothing: a decode failure yields an error and no
//! tiles, never a partial set.

use std::io::Cursor;

use image::{ImageFormat, imageops};

use crate::error::{SliceError, SliceResult};
use crate::splitter::tile::Tile;

/// Number of grid columns. The grid is fixed; this is not configurable.
pub const GRID_COLS: u32 = 3;
/// Number of grid rows.
pub const GRID_ROWS: u32 = 3;
/// Total tile count of a successful split.
pub const TILE_COUNT: usize = (GRID_COLS * GRID_ROWS) as usize;

/// Rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Compute the nine source rectangles for an image of the given size.
///
/// Pure geometry, row-major order. The rectangle at index `row*3 + col`
/// starts at `(col*tile_w, row*tile_h)` where `tile_w = w/3` and
/// `tile_h = h/3` in integer division.
pub fn tile_rects(in_w: u32, in_h: u32) -> Vec<Rect> {
    let tile_w = in_w / GRID_COLS;
    let tile_h = in_h / GRID_ROWS;

    let mut rects = Vec::with_capacity(TILE_COUNT);
    for row in 0..GRID_ROWS {
        for col in 0..GRID_COLS {
            rects.push(Rect {
                x: col * tile_w,
                y: row * tile_h,
                w: tile_w,
                h: tile_h,
            });
        }
    }
    rects
}

/// Split encoded image bytes into nine PNG tiles.
///
/// Decodes the input with the `image` crate (any format it recognizes),
/// copies each grid rectangle into an independent RGBA buffer and re-encodes
/// it as a standalone PNG of exactly that size.
///
/// # Errors
///
/// Returns [`SliceError::Decode`] if the bytes are not a decodable raster
/// image or the image is smaller than 3x3 pixels (less than one pixel per
/// tile per axis). No tiles are produced on failure.
pub fn partition(data: &[u8]) -> SliceResult<Vec<Tile>> {
    let img = image::load_from_memory(data).map_err(|e| SliceError::decode(e.to_string()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    if width < GRID_COLS || height < GRID_ROWS {
        return Err(SliceError::decode(format!(
            "image {}x{} is too small to split into a {}x{} grid",
            width, height, GRID_COLS, GRID_ROWS
        )));
    }

    log::debug!(
        "splitting {}x{} image into {} tiles of {}x{}",
        width,
        height,
        TILE_COUNT,
        width / GRID_COLS,
        height / GRID_ROWS
    );

    let mut tiles = Vec::with_capacity(TILE_COUNT);
    for (id, rect) in tile_rects(width, height).into_iter().enumerate() {
        // crop_imm borrows the source; to_image copies the view into a
        // fresh buffer so the tile owns its pixels.
        let piece = imageops::crop_imm(&rgba, rect.x, rect.y, rect.w, rect.h).to_image();

        let mut png = Vec::new();
        piece
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| SliceError::decode(format!("re-encoding tile {} failed: {}", id, e)))?;

        tiles.push(Tile {
            id,
            col: id as u32 % GRID_COLS,
            row: id as u32 / GRID_COLS,
            width: rect.w,
            height: rect.h,
            png,
            description: None,
        });
    }

    Ok(tiles)
}
