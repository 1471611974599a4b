//! Text measurement seam.

use crate::style::font::FontFace;

/// Measures text for layout.
///
/// Implemented by the rendering backend so that layout widths match the
/// advances used when glyphs are drawn. Layout floors the returned width to
/// whole pixels.
pub trait FontMetrics {
    /// Total advance width of `text` drawn with `face`, in pixels, with DPI
    /// scaling already applied (see [`FontFace::pixel_size`]).
    fn text_width(&self, text: &str, face: &FontFace) -> f32;
}

/// Fixed-ratio metrics: every character advances `0.6 ×` the pixel size.
///
/// Used when no typeface is available at all, and in tests where geometry
/// must be exact without a font file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateFontMetrics;

impl ApproximateFontMetrics {
    /// Advance of one character relative to the pixel size.
    pub const CHAR_WIDTH_RATIO: f32 = 0.6;
}

impl FontMetrics for ApproximateFontMetrics {
    #[allow(clippy::cast_precision_loss)]
    fn text_width(&self, text: &str, face: &FontFace) -> f32 {
        text.chars().count() as f32 * face.pixel_size() * Self::CHAR_WIDTH_RATIO
    }
}
