//! Blittable sprite definition and PNG decoding.

use std::io::Cursor;

use glam::Vec2;
use miette::{miette, IntoDiagnostic, Result, WrapErr};
use png::{BitDepth, ColorType, Decoder, Transformations};

use crate::canvas::Canvas;

/// Modifiers applied when drawing a sprite.
#[derive(Debug, Clone, Copy)]
pub struct DrawParams {
    /// Uniform nearest-neighbor scale factor.
    pub scale: f32,
    /// Opacity multiplier in `0..=1`.
    pub alpha: f32,
    /// Per-channel color multipliers in `0..=1`.
    pub tint: [f32; 3],
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            alpha: 1.0,
            tint: [1.0, 1.0, 1.0],
        }
    }
}

impl DrawParams {
    /// Only change the opacity.
    #[must_use]
    pub fn alpha(alpha: f32) -> Self {
        Self {
            alpha,
            ..Self::default()
        }
    }
}

/// Decoded RGBA image that can be drawn on the canvas.
#[derive(Debug, Clone)]
pub struct Sprite {
    /// Width of the image in pixels.
    width: u32,
    /// Height of the image in pixels.
    height: u32,
    /// Pixels packed as `0xAARRGGBB`.
    pixels: Vec<u32>,
}

impl Sprite {
    /// Decode a sprite from in-memory PNG bytes.
    ///
    /// # Errors
    ///
    /// - When the bytes are not a valid PNG.
    /// - When the PNG does not normalize to 8 bit RGBA.
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(Cursor::new(bytes));

        // Discard text chunks
        decoder.set_ignore_text_chunk(true);
        // Make it faster by not checking if it's correct
        decoder.ignore_checksums(true);

        // Convert indexed and grayscale images to RGBA
        decoder
            .set_transformations(Transformations::normalize_to_color8() | Transformations::ALPHA);

        let mut reader = decoder
            .read_info()
            .into_diagnostic()
            .wrap_err("Error parsing PNG header")?;

        // Ensure we can use the PNG colors
        let (color_type, bits) = reader.output_color_type();
        if color_type != ColorType::Rgba || bits != BitDepth::Eight {
            return Err(miette!(
                "PNG does not normalize to 8 bit RGBA, got {color_type:?} at {bits:?}"
            ));
        }

        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader
            .next_frame(&mut buf)
            .into_diagnostic()
            .wrap_err("Error reading PNG frame")?;

        // Pack the RGBA bytes
        let pixels = buf[..info.buffer_size()]
            .chunks_exact(4)
            .map(|rgba| {
                (u32::from(rgba[3]) << 24)
                    | (u32::from(rgba[0]) << 16)
                    | (u32::from(rgba[1]) << 8)
                    | u32::from(rgba[2])
            })
            .collect();

        Ok(Self {
            width: info.width,
            height: info.height,
            pixels,
        })
    }

    /// Create a sprite directly from packed `0xAARRGGBB` pixels.
    ///
    /// # Panics
    ///
    /// - When the pixel count doesn't match the dimensions.
    #[must_use]
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        assert_eq!(
            pixels.len(),
            (width * height) as usize,
            "Pixel count doesn't match sprite dimensions"
        );

        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width of the image in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the image in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size of the image in pixels as a float vector.
    #[inline]
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Draw the full sprite with its center at `center`.
    #[inline]
    pub fn draw(&self, canvas: &mut Canvas, center: Vec2) {
        self.draw_with(canvas, center, DrawParams::default());
    }

    /// Draw the full sprite with its center at `center`, applying modifiers.
    #[inline]
    pub fn draw_with(&self, canvas: &mut Canvas, center: Vec2, params: DrawParams) {
        self.draw_region_with(canvas, 0, 0, self.width, self.height, center, params);
    }

    /// Draw a sub-rectangle of the sprite with its center at `center`.
    ///
    /// The source rectangle is clamped to the sprite, the destination to the
    /// canvas; nothing is drawn for invisible modifiers.
    pub fn draw_region_with(
        &self,
        canvas: &mut Canvas,
        src_x: u32,
        src_y: u32,
        src_width: u32,
        src_height: u32,
        center: Vec2,
        params: DrawParams,
    ) {
        let DrawParams { scale, alpha, tint } = params;
        if alpha <= 0.0 || scale <= 0.0 {
            return;
        }

        // Clamp the source rectangle to the sprite
        let src_x = src_x.min(self.width);
        let src_y = src_y.min(self.height);
        let src_width = src_width.min(self.width - src_x);
        let src_height = src_height.min(self.height - src_y);

        let out_width = (src_width as f32 * scale).round() as i32;
        let out_height = (src_height as f32 * scale).round() as i32;
        if out_width == 0 || out_height == 0 {
            return;
        }

        let left = (center.x - out_width as f32 / 2.0).round() as i32;
        let top = (center.y - out_height as f32 / 2.0).round() as i32;

        let plain = (scale - 1.0).abs() < f32::EPSILON && alpha >= 1.0 && tint == [1.0, 1.0, 1.0];

        for out_y in 0..out_height {
            let target_y = top + out_y;
            if target_y < 0 || target_y >= canvas.height() as i32 {
                continue;
            }

            let sample_y = src_y + ((out_y as f32 / scale) as u32).min(src_height - 1);

            for out_x in 0..out_width {
                let target_x = left + out_x;
                let sample_x = src_x + ((out_x as f32 / scale) as u32).min(src_width - 1);
                let pixel = self.pixels[(sample_x + sample_y * self.width) as usize];

                let pixel = if plain {
                    pixel
                } else {
                    modulate(pixel, alpha, tint)
                };

                canvas.blend_pixel(target_x, target_y, pixel);
            }
        }
    }
}

/// Multiply a packed pixel's channels by opacity and tint factors.
#[inline]
fn modulate(pixel: u32, alpha: f32, tint: [f32; 3]) -> u32 {
    let channel = |shift: u32, factor: f32| {
        let value = (pixel >> shift & 0xFF) as f32 * factor;
        (value as u32).min(0xFF) << shift
    };

    channel(24, alpha) | channel(16, tint[0]) | channel(8, tint[1]) | channel(0, tint[2])
}
