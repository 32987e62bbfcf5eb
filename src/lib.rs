//! # GridSplit Library
//!
//! Split one raster image into a fixed 3x3 grid of PNG slices, optionally
//! caption each slice through the Gemini multimodal API, and bundle slices
//! into a zip archive for download.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `splitter`: grid geometry and the image partitioner
//! - `describe`: per-slice caption requests against the Gemini API
//! - `archive`: zip bundling of named slice entries
//! - `session`: reducer-style workflow state with stale-result guarding
//! - `config`: configuration management and validation
//! - `error`: failure taxonomy for the whole pipeline
//!
//! ## Example
//!
//! ```rust,no_run
//! use gridsplit::{SliceOptions, run_split};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let options = SliceOptions {
//!     input: "photo.png".to_string(),
//!     out_dir: "slices".to_string(),
//!     describe: false,
//!     archive: true,
//!     selection: Vec::new(),
//!     model: gridsplit::describe::DEFAULT_MODEL.to_string(),
//! };
//!
//! run_split(options).await?;
//! # Ok(())
//! # }
//! ```

// External crate imports
use anyhow::Result;
use futures_util::future::join_all;

// Internal module imports
pub mod archive;
pub mod config;
pub mod describe;
pub mod error;
pub mod session;
pub mod splitter;

/// Re-export error types for convenience
pub use error::{Recoverable, SliceError, SliceResult};

/// Re-export the core entities for convenience
pub use session::{AppState, Event};
pub use splitter::{Tile, partition};

use describe::{Describer, GeminiDescriber, describe_or_placeholder};
use session::{
    ARCHIVE_FAILED_ALERT, DECODE_FAILED_BANNER, FILE_READ_FAILED_BANNER, GridPhase,
};

/// Options for one split run.
///
/// This is the library-level counterpart of [`config::SplitConfig`]:
/// selection entries here are zero-based tile ids.
#[derive(Debug, Clone)]
pub struct SliceOptions {
    /// Path of the source image file.
    pub input: String,

    /// Directory slice files and archives are written into. Created if it
    /// does not exist.
    pub out_dir: String,

    /// Whether to request an AI caption for every slice. Requires the
    /// `GEMINI_API_KEY` environment variable.
    pub describe: bool,

    /// Whether to write a zip archive next to the slice files.
    pub archive: bool,

    /// Zero-based tile ids to include in the archive. Empty selects all
    /// nine, and the archive is named accordingly
    /// (`all_slices.zip` vs `selected_slices.zip`).
    pub selection: Vec<usize>,

    /// Gemini model id used for captions.
    pub model: String,
}

/// Issue description requests for every tile that still wants one and fold
/// the completions back into the session state.
///
/// The nine requests run concurrently and independently; completions are
/// applied in whatever order they arrive, tagged with the generation they
/// were spawned under so stale results after a reset are dropped. Tiles
/// that already reached a terminal description state are skipped.
pub async fn describe_tiles(describer: &dyn Describer, state: AppState) -> AppState {
    let generation = state.generation;
    let pending: Vec<(usize, Vec<u8>)> = state
        .tiles
        .iter()
        .filter(|tile_state| state.wants_describe(tile_state.tile.id))
        .map(|tile_state| (tile_state.tile.id, tile_state.tile.png.clone()))
        .collect();

    let mut state = state;
    for (id, _) in &pending {
        state = state.apply(Event::DescribeRequested { id: *id });
    }

    let requests = pending.iter().map(|(id, png)| async move {
        (*id, describe_or_placeholder(describer, png).await)
    });

    for (id, text) in join_all(requests).await {
        state = state.apply(Event::DescribeFinished {
            generation,
            id,
            text,
        });
    }
    state
}

/// Main entry point for split runs.
///
/// Reads the input file, partitions it into nine tiles, optionally captions
/// them, writes one PNG per slice into the output directory and, when
/// requested, a zip archive of all or selected slices.
///
/// # Errors
///
/// Returns an error if the input cannot be read or decoded, or if writing
/// the outputs fails. A failed archive build is reported to the user and
/// logged but does not fail the run; previously written slices stay on
/// disk. Caption failures never surface here at all; affected slices
/// carry a placeholder text instead.
pub async fn run_split(options: SliceOptions) -> Result<()> {
    let mut state = AppState::new().apply(Event::ImageLoaded);

    let data = match std::fs::read(&options.input) {
        Ok(data) => data,
        Err(e) => {
            let failed = state.apply(Event::SplitFailed {
                message: FILE_READ_FAILED_BANNER.to_string(),
            });
            if let Some(banner) = &failed.banner {
                eprintln!("{}", banner);
            }
            return Err(SliceError::file_read(&options.input, e).into());
        }
    };

    let tiles = match splitter::partition(&data) {
        Ok(tiles) => tiles,
        Err(e) => {
            let failed = state.apply(Event::SplitFailed {
                message: DECODE_FAILED_BANNER.to_string(),
            });
            if let Some(banner) = &failed.banner {
                eprintln!("{}", banner);
            }
            return Err(e.into());
        }
    };
    state = state.apply(Event::SplitFinished { tiles });
    debug_assert_eq!(state.phase, GridPhase::Ready);

    let (tile_w, tile_h) = state
        .tiles
        .first()
        .map(|t| (t.tile.width, t.tile.height))
        .unwrap_or_default();
    println!(
        "Split {} into {} slices of {}x{}",
        options.input,
        state.tiles.len(),
        tile_w,
        tile_h
    );

    if options.describe {
        let describer = GeminiDescriber::from_env(&options.model)?;
        state = describe_tiles(&describer, state).await;
        for tile_state in &state.tiles {
            if let Some(description) = &tile_state.tile.description {
                println!("  slice {}: {}", tile_state.tile.id + 1, description);
            }
        }
    }

    for id in &options.selection {
        state = state.apply(Event::SelectionToggled { id: *id });
    }

    let out_dir = std::path::Path::new(&options.out_dir);
    std::fs::create_dir_all(out_dir)
        .map_err(|e| SliceError::io("creating output directory", e))?;

    for tile in state.all_tiles() {
        let path = out_dir.join(tile.file_name());
        std::fs::write(&path, &tile.png)
            .map_err(|e| SliceError::io(format!("writing {}", path.display()), e))?;
    }
    println!(
        "Wrote {} slice files to {}",
        state.tiles.len(),
        out_dir.display()
    );

    if options.archive {
        let (tiles, archive_name) = if options.selection.is_empty() {
            (state.all_tiles(), archive::ALL_ARCHIVE_NAME)
        } else {
            (state.selected_tiles(), archive::SELECTED_ARCHIVE_NAME)
        };

        match archive::build_archive(tiles) {
            Ok(Some(bytes)) => {
                let path = out_dir.join(archive_name);
                std::fs::write(&path, bytes)
                    .map_err(|e| SliceError::io(format!("writing {}", path.display()), e))?;
                println!("Wrote {}", path.display());
            }
            Ok(None) => {}
            Err(e) => {
                // Archive failure leaves the written slices untouched and
                // does not abort the run.
                log::error!("{}", e);
                eprintln!("{}", ARCHIVE_FAILED_ALERT);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoDescriber;

    #[async_trait]
    impl Describer for EchoDescriber {
        async fn describe(&self, png: &[u8]) -> SliceResult<String> {
            Ok(format!("タイル{}", png[0]))
        }
    }

    /// Records which tiles actually reached the service.
    struct RecordingDescriber(std::sync::Mutex<Vec<u8>>);

    #[async_trait]
    impl Describer for RecordingDescriber {
        async fn describe(&self, png: &[u8]) -> SliceResult<String> {
            self.0.lock().unwrap().push(png[0]);
            Ok(format!("タイル{}", png[0]))
        }
    }

    fn ready_state() -> AppState {
        let tiles = (0..9)
            .map(|id| Tile {
                id,
                col: (id % 3) as u32,
                row: (id / 3) as u32,
                width: 4,
                height: 4,
                png: vec![id as u8; 8],
                description: None,
            })
            .collect();
        AppState::new()
            .apply(Event::ImageLoaded)
            .apply(Event::SplitFinished { tiles })
    }

    #[tokio::test]
    async fn test_describe_tiles_fills_every_tile() {
        let state = describe_tiles(&EchoDescriber, ready_state()).await;
        for (id, tile_state) in state.tiles.iter().enumerate() {
            assert!(!tile_state.describing);
            assert_eq!(
                tile_state.tile.description.as_deref(),
                Some(format!("タイル{}", id).as_str())
            );
        }
    }

    #[tokio::test]
    async fn test_describe_tiles_skips_terminal_tiles() {
        let mut state = ready_state();
        let generation = state.generation;
        state = state
            .apply(Event::DescribeRequested { id: 4 })
            .apply(Event::DescribeFinished {
                generation,
                id: 4,
                text: "既存".to_string(),
            });

        let describer = RecordingDescriber(std::sync::Mutex::new(Vec::new()));
        let state = describe_tiles(&describer, state).await;

        // The described tile kept its text and never reached the service.
        assert_eq!(state.tiles[4].tile.description.as_deref(), Some("既存"));
        assert_eq!(state.tiles[0].tile.description.as_deref(), Some("タイル0"));
        let submitted = describer.0.lock().unwrap();
        assert_eq!(submitted.len(), 8);
        assert!(!submitted.contains(&4));
    }
}
