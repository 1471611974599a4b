//! Table layout.
//!
//! ```text
//! Row[] ──cascade──▶ ResolvedCell ──size──▶ Table (column widths, row heights)
//!                         │
//!                         └── Image ──acquire──▶ ResolvedImage (fitted size)
//! ```
//!
//! Everything outside the engine (fonts, image bytes, the image cache) is
//! reached through the traits in this module, bundled per build in a
//! [`LayoutContext`].

pub mod box_model;
pub mod cell;
pub mod image;
pub mod table;

use std::sync::Arc;

use tabula_common::image::LoadedImage;

use crate::error::Result;
use crate::style::font::FontLoader;
use crate::text::metrics::FontMetrics;

/// Produces decoded images for URLs that are not in the cache.
///
/// Called synchronously during table construction; any timeout policy is the
/// implementation's.
pub trait ImageSource {
    /// Fetch and decode the image at `url`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::ImageFetchFailed`] on transport or decode failure.
    fn fetch(&self, url: &str) -> Result<LoadedImage>;
}

/// Decoded images keyed by URL, shared across renders.
///
/// Methods take `&self`; implementations that are shared between threads
/// bring their own locking.
pub trait ImageCache {
    /// Look up a previously stored image.
    fn get(&self, url: &str) -> Option<Arc<LoadedImage>>;

    /// Store an image.
    ///
    /// # Errors
    ///
    /// [`crate::Error::CacheWriteFailed`] if the image could not be stored.
    fn set(&self, url: &str, image: Arc<LoadedImage>) -> Result<()>;
}

/// Backends available while building a table.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    /// Text measurement.
    pub metrics: &'a dyn FontMetrics,
    /// Typeface loading; `None` makes any font descriptor an error.
    pub fonts: Option<&'a dyn FontLoader>,
    /// Image fetching; `None` makes any uncached URL an error.
    pub images: Option<&'a dyn ImageSource>,
    /// Image cache consulted before fetching.
    pub cache: Option<&'a dyn ImageCache>,
}

impl<'a> LayoutContext<'a> {
    /// A context with only text measurement.
    #[must_use]
    pub fn new(metrics: &'a dyn FontMetrics) -> Self {
        Self {
            metrics,
            fonts: None,
            images: None,
            cache: None,
        }
    }

    /// Use `fonts` to load typefaces.
    #[must_use]
    pub fn with_fonts(mut self, fonts: &'a dyn FontLoader) -> Self {
        self.fonts = Some(fonts);
        self
    }

    /// Use `images` to fetch images.
    #[must_use]
    pub fn with_images(mut self, images: &'a dyn ImageSource) -> Self {
        self.images = Some(images);
        self
    }

    /// Consult `cache` before fetching.
    #[must_use]
    pub fn with_cache(mut self, cache: &'a dyn ImageCache) -> Self {
        self.cache = Some(cache);
        self
    }
}
