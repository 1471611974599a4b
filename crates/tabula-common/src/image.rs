//! Decoded image data shared between image acquisition, layout, and drawing.

use std::fmt;

/// A decoded raster image in straight (non-premultiplied) RGBA.
///
/// Layout only ever looks at the natural bounds; the rasterizer reads the
/// pixels. Values are shared behind `Arc` once fetched so that an image cache
/// and several cells can point at the same buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct LoadedImage {
    width: u32,
    height: u32,
    rgba_data: Vec<u8>,
}

impl LoadedImage {
    /// Create a new `LoadedImage` from decoded RGBA pixel data.
    ///
    /// `rgba_data` must hold `width * height * 4` bytes.
    #[must_use]
    pub const fn new(width: u32, height: u32, rgba_data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba_data,
        }
    }

    /// A single-color image, mostly useful for tests and placeholders.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = (width as usize) * (height as usize);
        let mut rgba_data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            rgba_data.extend_from_slice(&rgba);
        }
        Self::new(width, height, rgba_data)
    }

    /// Natural width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Natural height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA pixel data, row-major.
    #[must_use]
    pub fn rgba_data(&self) -> &[u8] {
        &self.rgba_data
    }

    /// True when either natural dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba_data.len())
            .finish()
    }
}
