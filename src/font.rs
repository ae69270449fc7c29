//! Fixed-grid bitmap font split from a horizontal sprite sheet.

use glam::Vec2;
use miette::{miette, Result};
use serde::Deserialize;

use crate::{
    canvas::Canvas,
    sprite::{DrawParams, Sprite},
};

/// A font is a sprite sheet of equally sized glyphs plus its metadata.
#[derive(Debug)]
pub struct Font {
    /// Sheet all glyphs are sub-rectangles of.
    sheet: Sprite,
    /// Width and height of a single glyph in pixels.
    glyph_size: (u32, u32),
    /// First char ASCII value.
    first_char: u32,
    /// Last char ASCII value.
    last_char: u32,
}

impl Font {
    /// Combine a decoded glyph sheet with its metadata.
    ///
    /// # Errors
    ///
    /// - When the sheet is too small for the declared character range.
    pub fn from_parts(sheet: Sprite, metadata: FontMetadata) -> Result<Self> {
        let FontMetadata {
            glyph_size,
            first_char,
            last_char,
        } = metadata;

        let first_char = first_char as u32;
        let last_char = last_char as u32;
        let glyphs = last_char.saturating_sub(first_char) + 1;

        if glyphs * glyph_size.width > sheet.width() || glyph_size.height > sheet.height() {
            return Err(miette!(
                "Font sheet of {}x{} is too small for {glyphs} glyphs of {}x{}",
                sheet.width(),
                sheet.height(),
                glyph_size.width,
                glyph_size.height,
            ));
        }

        Ok(Self {
            sheet,
            glyph_size: (glyph_size.width, glyph_size.height),
            first_char,
            last_char,
        })
    }

    /// Width of the rendered text in pixels.
    #[must_use]
    pub fn measure(&self, text: &str, scale: f32) -> f32 {
        text.chars().count() as f32 * self.glyph_size.0 as f32 * scale
    }

    /// Height of a rendered line in pixels.
    #[must_use]
    pub fn line_height(&self, scale: f32) -> f32 {
        self.glyph_size.1 as f32 * scale
    }

    /// Draw a single line of text centered at `center`.
    ///
    /// Characters outside of the glyph range advance the cursor without
    /// drawing, which makes spaces work for free.
    pub fn draw(&self, canvas: &mut Canvas, center: Vec2, text: &str, scale: f32, tint: [f32; 3]) {
        let advance = self.glyph_size.0 as f32 * scale;
        let total = self.measure(text, scale);

        // Center of the first glyph
        let mut position = Vec2::new(center.x - total / 2.0 + advance / 2.0, center.y);

        for ch in text.chars() {
            if let Some(offset) = self.glyph_offset(ch) {
                self.sheet.draw_region_with(
                    canvas,
                    offset,
                    0,
                    self.glyph_size.0,
                    self.glyph_size.1,
                    position,
                    DrawParams {
                        scale,
                        tint,
                        ..DrawParams::default()
                    },
                );
            }

            position.x += advance;
        }
    }

    /// Horizontal offset of the character on the sheet, if it has a glyph.
    fn glyph_offset(&self, ch: char) -> Option<u32> {
        let index = ch as u32;
        (self.first_char..=self.last_char)
            .contains(&index)
            .then(|| (index - self.first_char) * self.glyph_size.0)
    }
}

/// Font metadata to load from TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontMetadata {
    /// Width and height of a single character.
    pub glyph_size: GlyphSize,
    /// First character in the image.
    #[serde(default = "FontMetadata::default_first_char")]
    pub first_char: char,
    /// Last character in the image.
    #[serde(default = "FontMetadata::default_last_char")]
    pub last_char: char,
}

/// Dimensions of a single glyph on the sheet.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GlyphSize {
    /// Width of a glyph in pixels.
    pub width: u32,
    /// Height of a glyph in pixels.
    pub height: u32,
}

impl FontMetadata {
    /// Default for the `first_char` field.
    #[inline]
    fn default_first_char() -> char {
        '!'
    }

    /// Default for the `last_char` field.
    #[inline]
    fn default_last_char() -> char {
        '~'
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::{Font, FontMetadata};
    use crate::{canvas::Canvas, sprite::Sprite};

    /// Tiny two-glyph font of 2x2 white glyphs covering 'a' and 'b'.
    fn test_font() -> Font {
        let metadata: FontMetadata = toml::from_str(
            r#"
            glyph_size = { width = 2, height = 2 }
            first_char = "a"
            last_char = "b"
            "#,
        )
        .unwrap();

        Font::from_parts(Sprite::from_pixels(4, 2, vec![0xFFFFFFFF; 8]), metadata).unwrap()
    }

    #[test]
    fn metadata_range_defaults() {
        let metadata: FontMetadata =
            toml::from_str("glyph_size = { width = 8, height = 8 }").unwrap();

        assert_eq!(metadata.first_char, '!');
        assert_eq!(metadata.last_char, '~');
    }

    #[test]
    fn sheet_too_small_is_rejected() {
        let metadata: FontMetadata = toml::from_str(
            r#"
            glyph_size = { width = 8, height = 8 }
            "#,
        )
        .unwrap();

        assert!(Font::from_parts(Sprite::from_pixels(16, 8, vec![0; 128]), metadata).is_err());
    }

    #[test]
    fn measure_is_monospaced() {
        let font = test_font();

        assert_eq!(font.measure("ab", 1.0), 4.0);
        assert_eq!(font.measure("ab", 2.0), 8.0);
        assert_eq!(font.measure("", 1.0), 0.0);
    }

    #[test]
    fn glyphs_map_to_sheet_columns() {
        let font = test_font();

        assert_eq!(font.glyph_offset('a'), Some(0));
        assert_eq!(font.glyph_offset('b'), Some(2));
        assert_eq!(font.glyph_offset('z'), None);
    }

    #[test]
    fn unknown_characters_advance_without_drawing() {
        let font = test_font();
        let mut canvas = Canvas::new(8, 4);

        // Spaces are outside the glyph range, must not panic
        font.draw(&mut canvas, Vec2::new(4.0, 2.0), "a b", 1.0, [1.0; 3]);

        assert!(canvas.raw_buffer().iter().any(|pixel| *pixel != 0));
    }
}
