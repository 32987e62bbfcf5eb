//! # Configuration Module
//!
//! Configuration structure and validation for split runs. This is the
//! common seam between the CLI and the core library.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Range | Description |
//! |-----------|------|-------|-------------|
//! | `input` | `String` | Any readable path | Source image file |
//! | `out_dir` | `String` | Any writable path | Where slice files land |
//! | `describe` | `bool` | true/false | Caption every slice via Gemini |
//! | `archive` | `bool` | true/false | Bundle slices into a zip |
//! | `selection` | `Vec<usize>` | 1-9 each | Slice numbers for the archive |
//! | `model` | `String` | Gemini model id | Caption model |
//!
//! Selection numbers are 1-based here because that is what users type on
//! the command line; [`SplitConfig::to_slice_options`] converts them to the
//! zero-based tile ids the library uses.

use crate::SliceOptions;
use crate::describe::DEFAULT_MODEL;
use crate::splitter::TILE_COUNT;

/// Configuration for one split run.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Path of the source image file.
    pub input: String,

    /// Directory slice files (and any archive) are written into.
    pub out_dir: String,

    /// Whether to request an AI caption for every slice.
    pub describe: bool,

    /// Whether to bundle slices into a zip archive.
    pub archive: bool,

    /// 1-based slice numbers to include in the archive. Empty means all
    /// slices.
    pub selection: Vec<usize>,

    /// Gemini model id used for captions.
    pub model: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            input: String::new(),
            out_dir: ".".to_string(),
            describe: false,
            archive: false,
            selection: Vec::new(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl SplitConfig {
    /// Create a new configuration with the specified parameters.
    pub fn new(
        input: String,
        out_dir: String,
        describe: bool,
        archive: bool,
        selection: Vec<usize>,
        model: String,
    ) -> Self {
        Self {
            input,
            out_dir,
            describe,
            archive,
            selection,
            model,
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.input.is_empty() {
            return Err("Input image path must not be empty".to_string());
        }
        if !self.selection.is_empty() && !self.archive {
            return Err("A selection only makes sense together with an archive".to_string());
        }
        for number in &self.selection {
            if !(1..=TILE_COUNT).contains(number) {
                return Err(format!(
                    "Slice numbers must be between 1 and {}, got {}",
                    TILE_COUNT, number
                ));
            }
        }
        Ok(())
    }

    /// Convert to [`SliceOptions`] for use with the core library.
    pub fn to_slice_options(&self) -> SliceOptions {
        SliceOptions {
            input: self.input.clone(),
            out_dir: self.out_dir.clone(),
            describe: self.describe,
            archive: self.archive,
            selection: self.selection.iter().map(|number| number - 1).collect(),
            model: self.model.clone(),
        }
    }
}
