//! Fixed-table glyph metrics cache

use nalgebra::Vector2;

/// Number of slots in the glyph table: ASCII codes 0-127
pub const GLYPH_TABLE_SIZE: usize = 128;

/// Layout data for one rasterized character
#[derive(Debug, Clone)]
pub struct Glyph {
    /// GPU texture holding the glyph's single-channel bitmap
    pub texture: glow::NativeTexture,
    /// Bitmap size in pixels
    pub size: Vector2<f32>,
    /// Offset from the pen position to the bitmap's bottom-left corner;
    /// the vertical component is negative for descenders
    pub bearing: Vector2<f32>,
    /// Horizontal pen advance to the next character, in pixels; never
    /// negative, layout must not move the pen backwards
    pub advance: f32,
}

impl Glyph {
    /// Build a glyph entry, clamping the advance to zero.
    ///
    /// Rasterizers may report tiny negative advances for degenerate glyphs;
    /// the table guarantees advance >= 0 for every entry.
    pub(crate) fn new(
        texture: glow::NativeTexture,
        size: Vector2<f32>,
        bearing: Vector2<f32>,
        advance: f32,
    ) -> Self {
        Self {
            texture,
            size,
            bearing,
            advance: advance.max(0.0),
        }
    }
}

/// Glyph cache indexed directly by character code.
///
/// A fixed 128-slot table instead of an ordered map: lookup is one bounds
/// check and an index. Built once during renderer setup, immutable after.
pub struct GlyphTable {
    slots: Vec<Option<Glyph>>,
}

impl GlyphTable {
    pub(crate) fn new() -> Self {
        Self {
            slots: vec![None; GLYPH_TABLE_SIZE],
        }
    }

    pub(crate) fn insert(&mut self, code: usize, glyph: Glyph) {
        self.slots[code] = Some(glyph);
    }

    /// Look up the glyph for a character.
    ///
    /// Characters outside the cached range (codes >= 128) resolve to `None`;
    /// the renderer skips them without advancing the pen.
    pub fn get(&self, ch: char) -> Option<&Glyph> {
        self.slots.get(ch as usize).and_then(Option::as_ref)
    }

    /// Number of populated slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True when no glyph has been cached
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Sum of advances for a string at the given scale.
    ///
    /// Uncached characters contribute nothing, matching the skip policy
    /// `draw` renders with.
    pub fn line_width(&self, text: &str, scale: f32) -> f32 {
        text.chars()
            .filter_map(|ch| self.get(ch))
            .map(|glyph| glyph.advance * scale)
            .sum()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Glyph> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::num::NonZeroU32;

    fn test_glyph(advance: f32) -> Glyph {
        Glyph {
            texture: glow::NativeTexture(NonZeroU32::new(1).unwrap()),
            size: Vector2::new(10.0, 16.0),
            bearing: Vector2::new(1.0, -2.0),
            advance,
        }
    }

    #[test]
    fn test_empty_table_has_no_glyphs() {
        let table = GlyphTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert!(table.get('A').is_none());
    }

    #[test]
    fn test_lookup_returns_inserted_glyph() {
        let mut table = GlyphTable::new();
        table.insert('A' as usize, test_glyph(12.0));

        let glyph = table.get('A').unwrap();
        assert_relative_eq!(glyph.advance, 12.0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_lookup_outside_ascii_is_none() {
        let mut table = GlyphTable::new();
        for code in 0..GLYPH_TABLE_SIZE {
            table.insert(code, test_glyph(8.0));
        }

        assert_eq!(table.len(), GLYPH_TABLE_SIZE);
        assert!(table.get('é').is_none());
        assert!(table.get('日').is_none());
    }

    #[test]
    fn test_line_width_empty_string_is_zero() {
        let mut table = GlyphTable::new();
        table.insert('A' as usize, test_glyph(12.0));

        assert_relative_eq!(table.line_width("", 1.0), 0.0);
    }

    #[test]
    fn test_line_width_accumulates_scaled_advances() {
        let mut table = GlyphTable::new();
        table.insert('a' as usize, test_glyph(10.0));
        table.insert('b' as usize, test_glyph(6.0));

        assert_relative_eq!(table.line_width("ab", 1.0), 16.0);
        assert_relative_eq!(table.line_width("ab", 2.0), 32.0);
    }

    #[test]
    fn test_negative_advance_is_clamped_to_zero() {
        let glyph = Glyph::new(
            glow::NativeTexture(NonZeroU32::new(1).unwrap()),
            Vector2::new(4.0, 4.0),
            Vector2::new(0.0, 0.0),
            -1.5,
        );
        assert_relative_eq!(glyph.advance, 0.0);

        let mut table = GlyphTable::new();
        table.insert('x' as usize, glyph);
        assert!(table.iter().all(|g| g.advance >= 0.0));
    }

    #[test]
    fn test_iter_visits_every_populated_slot() {
        let mut table = GlyphTable::new();
        table.insert(0, test_glyph(1.0));
        table.insert('A' as usize, test_glyph(2.0));
        table.insert(GLYPH_TABLE_SIZE - 1, test_glyph(3.0));

        // Release paths free exactly what iter yields, so it must cover
        // every populated slot including the table edges.
        assert_eq!(table.iter().count(), 3);
    }

    #[test]
    fn test_line_width_skips_uncached_characters() {
        let mut table = GlyphTable::new();
        table.insert('a' as usize, test_glyph(10.0));

        assert_relative_eq!(table.line_width("aéa", 1.0), 20.0);
    }
}
