//! # Archive Builder
//!
//! Bundles a set of tiles into one deflate-compressed zip blob.
//!
//! Entry names follow the slice naming rule ([`Tile::file_name`]). An empty
//! tile set is a no-op: no archive is produced and no error is raised. On
//! failure no partial archive is ever returned.

use std::io::{Cursor, Write};

use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::error::{SliceError, SliceResult};
use crate::splitter::Tile;

/// File name for an archive of every tile.
pub const ALL_ARCHIVE_NAME: &str = "all_slices.zip";

/// File name for an archive of the selected subset.
pub const SELECTED_ARCHIVE_NAME: &str = "selected_slices.zip";

/// Build a zip archive with one entry per tile.
///
/// Returns `Ok(None)` for an empty input set. Entries appear in input
/// order, named `slice_<id+1><_desc>.png`.
///
/// # Errors
///
/// Returns [`SliceError::Archive`] if writing any entry fails; the partial
/// buffer is discarded.
pub fn build_archive<'a, I>(tiles: I) -> SliceResult<Option<Vec<u8>>>
where
    I: IntoIterator<Item = &'a Tile>,
{
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = 0usize;
    for tile in tiles {
        writer
            .start_file(tile.file_name(), options)
            .map_err(|e| SliceError::archive(e.to_string()))?;
        writer
            .write_all(&tile.png)
            .map_err(|e| SliceError::archive(e.to_string()))?;
        entries += 1;
    }

    if entries == 0 {
        return Ok(None);
    }

    let cursor = writer
        .finish()
        .map_err(|e| SliceError::archive(e.to_string()))?;

    let bytes = cursor.into_inner();
    log::debug!("built archive with {} entries ({} bytes)", entries, bytes.len());
    Ok(Some(bytes))
}
