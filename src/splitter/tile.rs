//! Tile entity and slice naming.

/// One of the nine sub-images produced by a split.
///
/// Tiles are created as a group by [`crate::splitter::partition`] and own
/// their pixel data exclusively: no tile shares memory with the source image
/// or with another tile.
#[derive(Debug, Clone)]
pub struct Tile {
    /// Zero-based index in row-major scan order (0 = top-left, 8 = bottom-right).
    pub id: usize,
    /// Grid column in [0,2]. Always `id % 3`.
    pub col: u32,
    /// Grid row in [0,2]. Always `id / 3`.
    pub row: u32,
    /// Tile width in pixels. Identical for all nine tiles of one split.
    pub width: u32,
    /// Tile height in pixels. Identical for all nine tiles of one split.
    pub height: u32,
    /// PNG-encoded payload.
    pub png: Vec<u8>,
    /// AI-generated caption. Absent until a description request finishes;
    /// set at most once and never overwritten afterwards.
    pub description: Option<String>,
}

impl Tile {
    /// File name for this slice: `slice_<n>.png` with 1-based numbering,
    /// with the sanitized description appended as `_<desc>` when present.
    pub fn file_name(&self) -> String {
        match &self.description {
            Some(desc) => format!("slice_{}_{}.png", self.id + 1, sanitize_description(desc)),
            None => format!("slice_{}.png", self.id + 1),
        }
    }
}

/// Strip a description down to characters safe for a file name.
///
/// Keeps ASCII alphanumerics plus the Japanese scripts a caption is written
/// in: Hiragana (U+3040..U+309F), Katakana (U+30A0..U+30FF) and CJK
/// ideographs (U+4E00..U+9FAF). Everything else is dropped.
pub fn sanitize_description(text: &str) -> String {
    text.chars().filter(|c| is_filename_safe(*c)).collect()
}

fn is_filename_safe(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || ('\u{3040}'..='\u{309f}').contains(&c)
        || ('\u{30a0}'..='\u{30ff}').contains(&c)
        || ('\u{4e00}'..='\u{9faf}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_with_description(id: usize, description: Option<&str>) -> Tile {
        Tile {
            id,
            col: (id % 3) as u32,
            row: (id / 3) as u32,
            width: 100,
            height: 100,
            png: Vec::new(),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn test_file_name_without_description() {
        assert_eq!(tile_with_description(0, None).file_name(), "slice_1.png");
        assert_eq!(tile_with_description(8, None).file_name(), "slice_9.png");
    }

    #[test]
    fn test_file_name_with_description() {
        let tile = tile_with_description(3, Some("青い空"));
        assert_eq!(tile.file_name(), "slice_4_青い空.png");
    }

    #[test]
    fn test_file_name_strips_unsafe_characters() {
        let tile = tile_with_description(0, Some("cat / 猫!?"));
        assert_eq!(tile.file_name(), "slice_1_cat猫.png");
    }

    #[test]
    fn test_sanitize_keeps_ascii_alphanumerics() {
        assert_eq!(sanitize_description("Tile09az"), "Tile09az");
        assert_eq!(sanitize_description("a b\tc"), "abc");
    }

    #[test]
    fn test_sanitize_keeps_japanese_scripts() {
        // Hiragana, Katakana, Kanji all survive.
        assert_eq!(sanitize_description("ひらがなカタカナ漢字"), "ひらがなカタカナ漢字");
    }

    #[test]
    fn test_sanitize_strips_punctuation_and_symbols() {
        assert_eq!(sanitize_description("夕焼け（オレンジ色）"), "夕焼けオレンジ色");
        assert_eq!(sanitize_description("!@#$%^&*()"), "");
    }
}
