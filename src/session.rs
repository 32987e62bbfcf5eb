//! # Split Session State
//!
//! The workflow state machine, expressed as a reducer over immutable
//! snapshots. Every event produces a new [`AppState`]; nothing is mutated in
//! place, so concurrent description completions for different tiles never
//! contend over shared state.
//!
//! ## State machines
//!
//! Grid level: `NoImage -> Processing -> Ready`, with a decode failure
//! falling back to `NoImage` plus a banner, and `Reset` returning to
//! `NoImage` from anywhere.
//!
//! Per tile: undescribed -> describing -> described. A described tile is
//! terminal: it is never re-submitted, even when the stored text is the
//! failure placeholder.
//!
//! ## Stale completions
//!
//! Description requests are detached tasks identified by tile id. A
//! generation counter increments whenever the tile set is replaced or
//! discarded; completions carry the generation they were spawned under and
//! are dropped when it no longer matches.

use std::collections::BTreeSet;

use crate::splitter::Tile;

/// Banner shown when the dropped file cannot be read.
pub const FILE_READ_FAILED_BANNER: &str = "ファイルの読み込みに失敗しました。";

/// Banner shown when the image cannot be decoded or split.
pub const DECODE_FAILED_BANNER: &str = "画像の処理中にエラーが発生しました。";

/// Alert shown when archive construction fails.
pub const ARCHIVE_FAILED_ALERT: &str = "ZIPファイルの作成に失敗しました。";

/// Grid-level phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridPhase {
    /// No image loaded; the session is waiting for input.
    NoImage,
    /// An image is being read and partitioned.
    Processing,
    /// Nine tiles are available. Terminal until reset.
    Ready,
}

/// One tile plus its transient description flag.
#[derive(Debug, Clone)]
pub struct TileState {
    pub tile: Tile,
    /// True only while a description request is outstanding.
    pub describing: bool,
}

impl TileState {
    fn new(tile: Tile) -> Self {
        Self {
            tile,
            describing: false,
        }
    }

    /// Whether the tile reached a terminal description state.
    pub fn is_described(&self) -> bool {
        self.tile.description.is_some()
    }
}

/// Events the reducer understands.
#[derive(Debug)]
pub enum Event {
    /// A file was picked and is being read/partitioned.
    ImageLoaded,
    /// Partitioning finished; all nine tiles exist.
    SplitFinished { tiles: Vec<Tile> },
    /// Reading or partitioning failed.
    SplitFailed { message: String },
    /// A description request was issued for one tile.
    DescribeRequested { id: usize },
    /// A detached description task completed.
    DescribeFinished {
        generation: u64,
        id: usize,
        text: String,
    },
    /// The user toggled one tile's selection.
    SelectionToggled { id: usize },
    /// The user toggled the select-all control.
    SelectAllToggled,
    /// Discard everything and wait for a new image.
    Reset,
}

/// Immutable snapshot of the whole session.
#[derive(Debug, Clone)]
pub struct AppState {
    pub phase: GridPhase,
    pub tiles: Vec<TileState>,
    /// Tile ids currently selected for bulk download.
    pub selected: BTreeSet<usize>,
    /// User-visible error banner, if any.
    pub banner: Option<String>,
    /// Identity of the current tile set; see module docs.
    pub generation: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Fresh session with no image loaded.
    pub fn new() -> Self {
        Self {
            phase: GridPhase::NoImage,
            tiles: Vec::new(),
            selected: BTreeSet::new(),
            banner: None,
            generation: 0,
        }
    }

    /// Apply one event, producing the next snapshot. The receiver is left
    /// untouched.
    pub fn apply(&self, event: Event) -> AppState {
        let mut next = self.clone();
        match event {
            Event::ImageLoaded => {
                next.phase = GridPhase::Processing;
                next.tiles.clear();
                next.selected.clear();
                next.banner = None;
                next.generation += 1;
            }
            Event::SplitFinished { tiles } => {
                next.phase = GridPhase::Ready;
                next.tiles = tiles.into_iter().map(TileState::new).collect();
            }
            Event::SplitFailed { message } => {
                next.phase = GridPhase::NoImage;
                next.tiles.clear();
                next.selected.clear();
                next.banner = Some(message);
            }
            Event::DescribeRequested { id } => {
                if let Some(state) = next.tiles.get_mut(id) {
                    if !state.is_described() && !state.describing {
                        state.describing = true;
                    }
                }
            }
            Event::DescribeFinished {
                generation,
                id,
                text,
            } => {
                if generation != next.generation {
                    log::debug!("dropping stale description for tile {}", id);
                    return next;
                }
                if let Some(state) = next.tiles.get_mut(id) {
                    state.describing = false;
                    // First completion wins; a described tile is terminal.
                    if state.tile.description.is_none() {
                        state.tile.description = Some(text);
                    }
                }
            }
            Event::SelectionToggled { id } => {
                if id < next.tiles.len() && !next.selected.remove(&id) {
                    next.selected.insert(id);
                }
            }
            Event::SelectAllToggled => {
                if !next.tiles.is_empty() && next.selected.len() == next.tiles.len() {
                    next.selected.clear();
                } else {
                    next.selected = (0..next.tiles.len()).collect();
                }
            }
            Event::Reset => {
                let generation = next.generation + 1;
                next = AppState::new();
                next.generation = generation;
            }
        }
        next
    }

    /// Whether a description request should be issued for this tile.
    /// False once the tile is terminal or already in flight.
    pub fn wants_describe(&self, id: usize) -> bool {
        self.tiles
            .get(id)
            .is_some_and(|state| !state.is_described() && !state.describing)
    }

    /// Tiles in the current selection, in id order.
    pub fn selected_tiles(&self) -> Vec<&Tile> {
        self.selected
            .iter()
            .filter_map(|id| self.tiles.get(*id))
            .map(|state| &state.tile)
            .collect()
    }

    /// All tiles, in id order.
    pub fn all_tiles(&self) -> Vec<&Tile> {
        self.tiles.iter().map(|state| &state.tile).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(id: usize) -> Tile {
        Tile {
            id,
            col: (id % 3) as u32,
            row: (id / 3) as u32,
            width: 10,
            height: 10,
            png: vec![0u8; 8],
            description: None,
        }
    }

    fn ready_state() -> AppState {
        AppState::new()
            .apply(Event::ImageLoaded)
            .apply(Event::SplitFinished {
                tiles: (0..9).map(tile).collect(),
            })
    }

    #[test]
    fn test_grid_phase_transitions() {
        let state = AppState::new();
        assert_eq!(state.phase, GridPhase::NoImage);

        let state = state.apply(Event::ImageLoaded);
        assert_eq!(state.phase, GridPhase::Processing);

        let state = state.apply(Event::SplitFinished {
            tiles: (0..9).map(tile).collect(),
        });
        assert_eq!(state.phase, GridPhase::Ready);
        assert_eq!(state.tiles.len(), 9);

        let state = state.apply(Event::Reset);
        assert_eq!(state.phase, GridPhase::NoImage);
        assert!(state.tiles.is_empty());
    }

    #[test]
    fn test_split_failure_returns_to_no_image_with_banner() {
        let state = AppState::new()
            .apply(Event::ImageLoaded)
            .apply(Event::SplitFailed {
                message: DECODE_FAILED_BANNER.to_string(),
            });
        assert_eq!(state.phase, GridPhase::NoImage);
        assert_eq!(state.banner.as_deref(), Some(DECODE_FAILED_BANNER));
        assert!(state.tiles.is_empty());
    }

    #[test]
    fn test_apply_leaves_receiver_untouched() {
        let state = ready_state();
        let _ = state.apply(Event::DescribeRequested { id: 4 });
        assert!(!state.tiles[4].describing);
        let _ = state.apply(Event::SelectionToggled { id: 1 });
        assert!(state.selected.is_empty());
    }

    #[test]
    fn test_describe_lifecycle() {
        let state = ready_state();
        let generation = state.generation;
        assert!(state.wants_describe(4));

        let state = state.apply(Event::DescribeRequested { id: 4 });
        assert!(state.tiles[4].describing);
        assert!(!state.wants_describe(4));

        let state = state.apply(Event::DescribeFinished {
            generation,
            id: 4,
            text: "街並み".to_string(),
        });
        assert!(!state.tiles[4].describing);
        assert_eq!(state.tiles[4].tile.description.as_deref(), Some("街並み"));
    }

    #[test]
    fn test_described_tile_is_never_rerequested() {
        let state = ready_state();
        let generation = state.generation;
        let state = state
            .apply(Event::DescribeRequested { id: 0 })
            .apply(Event::DescribeFinished {
                generation,
                id: 0,
                text: "森".to_string(),
            });

        // Terminal: a later request must not re-enter the in-flight state,
        // and a later completion must not overwrite the text.
        assert!(!state.wants_describe(0));
        let state = state.apply(Event::DescribeRequested { id: 0 });
        assert!(!state.tiles[0].describing);

        let state = state.apply(Event::DescribeFinished {
            generation,
            id: 0,
            text: "湖".to_string(),
        });
        assert_eq!(state.tiles[0].tile.description.as_deref(), Some("森"));
    }

    #[test]
    fn test_failure_placeholder_is_terminal_and_clears_flag() {
        let state = ready_state();
        let generation = state.generation;
        let state = state
            .apply(Event::DescribeRequested { id: 2 })
            .apply(Event::DescribeFinished {
                generation,
                id: 2,
                text: crate::describe::FAILURE_PLACEHOLDER.to_string(),
            });
        assert!(!state.tiles[2].describing);
        assert!(state.tiles[2].is_described());
        assert!(!state.wants_describe(2));
    }

    #[test]
    fn test_stale_generation_completion_is_dropped() {
        let state = ready_state();
        let old_generation = state.generation;
        let state = state.apply(Event::DescribeRequested { id: 1 });

        // Reset discards the tile set; the in-flight completion arrives late.
        let state = state.apply(Event::Reset);
        assert!(state.generation > old_generation);

        let state = state.apply(Event::DescribeFinished {
            generation: old_generation,
            id: 1,
            text: "遅い結果".to_string(),
        });
        assert!(state.tiles.is_empty());

        // Same guard when a new image replaced the tiles and reused id 1.
        let state = state.apply(Event::ImageLoaded).apply(Event::SplitFinished {
            tiles: (0..9).map(tile).collect(),
        });
        let state = state.apply(Event::DescribeFinished {
            generation: old_generation,
            id: 1,
            text: "遅い結果".to_string(),
        });
        assert!(state.tiles[1].tile.description.is_none());
    }

    #[test]
    fn test_selection_toggle() {
        let state = ready_state();
        let state = state
            .apply(Event::SelectionToggled { id: 3 })
            .apply(Event::SelectionToggled { id: 7 });
        assert_eq!(state.selected_tiles().len(), 2);
        assert_eq!(state.selected_tiles()[0].id, 3);

        let state = state.apply(Event::SelectionToggled { id: 3 });
        assert_eq!(state.selected_tiles().len(), 1);
        assert_eq!(state.selected_tiles()[0].id, 7);

        // Out-of-range ids are ignored.
        let state = state.apply(Event::SelectionToggled { id: 42 });
        assert_eq!(state.selected.len(), 1);
    }

    #[test]
    fn test_select_all_toggles_off_when_everything_selected() {
        let state = ready_state().apply(Event::SelectAllToggled);
        assert_eq!(state.selected.len(), 9);

        let state = state.apply(Event::SelectAllToggled);
        assert!(state.selected.is_empty());

        // Partial selection flips to full, not to empty.
        let state = state
            .apply(Event::SelectionToggled { id: 0 })
            .apply(Event::SelectAllToggled);
        assert_eq!(state.selected.len(), 9);
    }

    #[test]
    fn test_new_image_discards_previous_tiles_and_selection() {
        let state = ready_state()
            .apply(Event::SelectionToggled { id: 0 })
            .apply(Event::ImageLoaded);
        assert_eq!(state.phase, GridPhase::Processing);
        assert!(state.tiles.is_empty());
        assert!(state.selected.is_empty());
    }
}
