//! Image acquisition: fetch bytes, detect the format, decode, and cache.
//!
//! ```text
//! url ──fetch_resource──▶ bytes ──detect_format──▶ ImageDecoder ──▶ LoadedImage
//! ```
//!
//! [`ImageFetcher`] is the [`ImageSource`] the table image uses by default;
//! [`MemoryImageCache`] is the default [`ImageCache`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use tabula_common::image::LoadedImage;
use tabula_common::net::fetch_resource;
use tabula_common::warning::warn_once;
use tabula_layout::{Error, ImageCache, ImageSource, Result};

/// Detected image format.
///
/// The `image` crate tells raster sub-formats (PNG, JPEG, GIF, …) apart on
/// its own, so only SVG needs to be singled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// SVG vector image, rasterized at its intrinsic size.
    Svg,
    /// Anything the `image` crate can decode.
    Raster,
}

/// Drop the fragment (`#…`) and query (`?…`) from a URL.
#[must_use]
pub fn strip_url_decorations(url: &str) -> &str {
    let without_fragment = url.split_once('#').map_or(url, |(base, _)| base);
    without_fragment
        .split_once('?')
        .map_or(without_fragment, |(base, _)| base)
}

/// Decide how to decode `bytes` fetched from `url`.
///
/// A `.svg` extension or an `image/svg` data URL wins; otherwise the first
/// 256 non-whitespace bytes are sniffed for an XML or `<svg` prologue.
#[must_use]
pub fn detect_format(url: &str, bytes: &[u8]) -> ImageFormat {
    let has_svg_extension = Path::new(strip_url_decorations(url))
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
    if has_svg_extension || url.starts_with("data:image/svg") {
        return ImageFormat::Svg;
    }

    let head: Vec<u8> = bytes
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take(256)
        .copied()
        .collect();
    if head.starts_with(b"<?xml") || head.starts_with(b"<svg") {
        ImageFormat::Svg
    } else {
        ImageFormat::Raster
    }
}

/// Turns encoded bytes into straight-alpha RGBA pixels.
pub trait ImageDecoder: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this decoder handles `format`.
    fn supports(&self, format: ImageFormat) -> bool;

    /// Decode `bytes`.
    ///
    /// # Errors
    ///
    /// A human-readable reason when the bytes cannot be decoded.
    fn decode(&self, bytes: &[u8]) -> Result<LoadedImage, String>;
}

/// Rasterizes SVG documents via usvg and resvg.
pub struct SvgDecoder;

impl ImageDecoder for SvgDecoder {
    fn name(&self) -> &'static str {
        "SVG (resvg)"
    }

    fn supports(&self, format: ImageFormat) -> bool {
        format == ImageFormat::Svg
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn decode(&self, bytes: &[u8]) -> Result<LoadedImage, String> {
        let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
            .map_err(|e| format!("failed to parse SVG: {e}"))?;

        let size = tree.size();
        let (width, height) = (size.width().ceil() as u32, size.height().ceil() as u32);
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| format!("SVG has unusable dimensions {width}x{height}"))?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        // Pixmaps are premultiplied; LoadedImage is straight alpha.
        let rgba_data = pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let color = pixel.demultiply();
                [color.red(), color.green(), color.blue(), color.alpha()]
            })
            .collect();
        Ok(LoadedImage::new(width, height, rgba_data))
    }
}

/// Decodes PNG, JPEG, GIF, and the other formats of the `image` crate.
pub struct RasterDecoder;

impl ImageDecoder for RasterDecoder {
    fn name(&self) -> &'static str {
        "raster (image crate)"
    }

    fn supports(&self, format: ImageFormat) -> bool {
        format == ImageFormat::Raster
    }

    fn decode(&self, bytes: &[u8]) -> Result<LoadedImage, String> {
        let rgba = image::load_from_memory(bytes)
            .map_err(|e| format!("could not decode image ({e})"))?
            .into_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(LoadedImage::new(width, height, rgba.into_raw()))
    }
}

/// Detects the format of fetched bytes and hands them to the first decoder
/// that supports it.
pub struct ImageLoaderPipeline {
    decoders: Vec<Box<dyn ImageDecoder>>,
}

impl ImageLoaderPipeline {
    /// A pipeline with the SVG and raster decoders.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoders: vec![Box::new(SvgDecoder), Box::new(RasterDecoder)],
        }
    }

    /// Decode `bytes` fetched from `url`.
    ///
    /// # Errors
    ///
    /// A human-readable reason when no decoder supports the detected format
    /// or decoding fails.
    pub fn decode(&self, bytes: &[u8], url: &str) -> Result<LoadedImage, String> {
        let format = detect_format(url, bytes);
        let decoder = self
            .decoders
            .iter()
            .find(|decoder| decoder.supports(format))
            .ok_or_else(|| format!("no decoder available for format {format:?}"))?;
        debug!("decoding '{url}' with {}", decoder.name());
        decoder.decode(bytes)
    }
}

impl Default for ImageLoaderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetches images over HTTP(S), from `data:` URLs, or from local files, and
/// decodes them.
///
/// Relative file paths are resolved against the base directory, when one is
/// set, instead of the process working directory.
#[derive(Default)]
pub struct ImageFetcher {
    base_dir: Option<PathBuf>,
    pipeline: ImageLoaderPipeline,
}

impl ImageFetcher {
    /// A fetcher that resolves relative paths against the working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative file paths against `base_dir`.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// The location bytes are actually read from for `url`.
    #[must_use]
    pub fn resolve(&self, url: &str) -> String {
        let is_remote = url.starts_with("http://")
            || url.starts_with("https://")
            || url.starts_with("data:")
            || url.starts_with("file://");
        match &self.base_dir {
            Some(base) if !is_remote && Path::new(url).is_relative() => {
                base.join(url).to_string_lossy().into_owned()
            }
            _ => url.to_string(),
        }
    }
}

impl ImageSource for ImageFetcher {
    fn fetch(&self, url: &str) -> Result<LoadedImage> {
        let failed = |reason: String| Error::ImageFetchFailed {
            url: url.to_string(),
            reason,
        };

        let resolved = self.resolve(url);
        if !resolved.starts_with("data:") && resolved.contains('#') {
            warn_once(
                "image",
                &format!("ignoring fragment identifier in '{url}'"),
            );
        }
        let location = if resolved.starts_with("data:") {
            resolved.as_str()
        } else {
            strip_url_decorations(&resolved)
        };

        let bytes = fetch_resource(location).map_err(|e| failed(e.to_string()))?;
        let image = self.pipeline.decode(&bytes, &resolved).map_err(failed)?;
        debug!(
            "fetched '{url}' ({}x{})",
            image.width(),
            image.height()
        );
        Ok(image)
    }
}

/// Process-local image cache keyed by URL.
#[derive(Debug, Default)]
pub struct MemoryImageCache {
    images: Mutex<HashMap<String, Arc<LoadedImage>>>,
}

impl MemoryImageCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no images.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached image.
    pub fn clear(&self) {
        self.images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl ImageCache for MemoryImageCache {
    fn get(&self, url: &str) -> Option<Arc<LoadedImage>> {
        self.images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    fn set(&self, url: &str, image: Arc<LoadedImage>) -> Result<()> {
        let _ = self
            .images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), image);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_query_and_fragment() {
        assert_eq!(strip_url_decorations("a/b.svg?w=10#icon"), "a/b.svg");
        assert_eq!(strip_url_decorations("a/b.png"), "a/b.png");
    }

    #[test]
    fn detects_svg_by_extension_mime_and_content() {
        assert_eq!(detect_format("logo.SVG", b""), ImageFormat::Svg);
        assert_eq!(detect_format("logo.svg?v=2", b""), ImageFormat::Svg);
        assert_eq!(
            detect_format("data:image/svg+xml;base64,AAAA", b""),
            ImageFormat::Svg
        );
        assert_eq!(
            detect_format("blob", b"\n  <svg xmlns='http://www.w3.org/2000/svg'/>"),
            ImageFormat::Svg
        );
        assert_eq!(detect_format("photo.png", b"\x89PNG"), ImageFormat::Raster);
    }

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let fetcher = ImageFetcher::new().with_base_dir("/tables");
        assert_eq!(fetcher.resolve("img/a.png"), "/tables/img/a.png");
        assert_eq!(fetcher.resolve("/abs/a.png"), "/abs/a.png");
        assert_eq!(
            fetcher.resolve("https://example.com/a.png"),
            "https://example.com/a.png"
        );
        assert_eq!(ImageFetcher::new().resolve("img/a.png"), "img/a.png");
    }

    #[test]
    fn undecodable_bytes_fail_the_fetch() {
        let err = ImageFetcher::new()
            .fetch("data:image/png;base64,aGVsbG8=")
            .unwrap_err();
        assert!(matches!(err, Error::ImageFetchFailed { .. }));
    }

    #[test]
    fn decodes_inline_svg() {
        let svg = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='4' height='2'%3E%3Crect width='4' height='2' fill='red'/%3E%3C/svg%3E";
        let image = ImageFetcher::new().fetch(svg).unwrap();
        assert_eq!((image.width(), image.height()), (4, 2));
        assert_eq!(&image.rgba_data()[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn memory_cache_round_trips() {
        let cache = MemoryImageCache::new();
        assert!(cache.get("a").is_none());
        cache
            .set("a", Arc::new(LoadedImage::solid(1, 1, [0, 0, 0, 255])))
            .unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").map(|image| image.width()), Some(1));
        cache.clear();
        assert!(cache.is_empty());
    }
}
