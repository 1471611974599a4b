//! Errors surfaced by rendering and encoding.

use std::io;

use thiserror::Error;

/// A failure anywhere between table construction and the encoded bytes.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Table construction failed (font, image fetch, or cache write).
    #[error(transparent)]
    Layout(#[from] tabula_layout::Error),

    /// The requested output format is not PNG or JPEG.
    #[error("unknown image type '{0}'")]
    UnknownFormat(String),

    /// The image encoder rejected the canvas.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    /// A 0×0 (or otherwise empty) image has no encoded form.
    #[error("cannot encode an empty {width}x{height} image")]
    EmptyImage {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// Writing the encoded image failed.
    #[error("failed to write image: {0}")]
    Io(#[from] io::Error),

    /// The canvas could not be allocated for the composed size.
    #[error("cannot allocate a {width}x{height} canvas")]
    Canvas {
        /// Requested width in pixels.
        width: i32,
        /// Requested height in pixels.
        height: i32,
    },
}

/// Result alias for rendering operations.
pub type Result<T, E = RenderError> = std::result::Result<T, E>;
