//! PNG and JPEG output.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use strum_macros::{Display, EnumString};

use crate::error::{RenderError, Result};

/// Output format of a rendered table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ImageType {
    /// Lossless, keeps transparency.
    #[default]
    #[strum(serialize = "png")]
    Png,
    /// Lossy; transparent pixels come out black.
    #[strum(serialize = "jpeg", serialize = "jpg")]
    Jpeg,
}

impl ImageType {
    /// Parse a format name (`png`, `jpeg`, `jpg`; any case).
    ///
    /// # Errors
    ///
    /// [`RenderError::UnknownFormat`] for any other name.
    pub fn parse(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| RenderError::UnknownFormat(name.to_string()))
    }

    /// Guess the format from a file extension.
    ///
    /// # Errors
    ///
    /// [`RenderError::UnknownFormat`] when the path has no extension or an
    /// unrecognized one.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::parse(extension)
    }
}

/// Encode `image` into an in-memory buffer.
///
/// # Errors
///
/// [`RenderError::EmptyImage`] for an image without pixels, and
/// [`RenderError::Encode`] if the encoder rejects the image.
pub fn encode(image: &RgbaImage, image_type: ImageType) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    write(&mut bytes, image, image_type)?;
    Ok(bytes)
}

/// Encode `image` into `writer`.
///
/// # Errors
///
/// [`RenderError::EmptyImage`] for an image without pixels, and
/// [`RenderError::Encode`] if encoding or the underlying write fails.
pub fn write<W: Write>(writer: W, image: &RgbaImage, image_type: ImageType) -> Result<()> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyImage { width, height });
    }
    match image_type {
        ImageType::Png => PngEncoder::new(writer).write_image(
            image.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        )?,
        ImageType::Jpeg => {
            let rgb: RgbImage = image.convert();
            JpegEncoder::new(writer).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
    }
    Ok(())
}

/// Encode `image` into a new file at `path`, replacing any existing file.
///
/// # Errors
///
/// [`RenderError::Io`] if the file cannot be created or flushed, and
/// [`RenderError::EmptyImage`] or [`RenderError::Encode`] if encoding fails.
/// An empty image leaves no file behind.
pub fn save(path: impl AsRef<Path>, image: &RgbaImage, image_type: ImageType) -> Result<()> {
    let path = path.as_ref();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyImage { width, height });
    }
    let file = File::create(path).map_err(|e| {
        io::Error::new(e.kind(), format!("cannot create '{}': {e}", path.display()))
    })?;
    let mut writer = BufWriter::new(file);
    write(&mut writer, image, image_type)?;
    writer.flush()?;
    log::debug!("wrote {image_type} image to {}", path.display());
    Ok(())
}
