//! Cell images: acquisition, sizing, and placement next to text.
//!
//! An image relates to the text of its cell in one of five ways, decided
//! once from the image's own alignment:
//!
//! ```text
//!   Above        Below        Left         Right        Detached
//! ┌───────┐    ┌───────┐    ┌───┬───┐    ┌───┬───┐    ┌───────┐
//! │  img  │    │ text  │    │img│txt│    │txt│img│    │img    │
//! ├───────┤    ├───────┤    │   │   │    │   │   │    │ (text │
//! │ text  │    │  img  │    └───┴───┘    └───┴───┘    │  over)│
//! └───────┘    └───────┘                              └───────┘
//! ```
//!
//! Stacked images (above/below) are positioned horizontally by the cell's
//! alignment; images beside the text are positioned vertically by the
//! cell's vertical alignment. A detached image sits at the inner origin
//! (plus its padding) and does not push the text anywhere.

use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tabula_common::image::LoadedImage;

use super::LayoutContext;
use super::box_model::{Point, Rect, Size};
use crate::error::{Error, Result};
use crate::style::values::{Align, Edges, VAlign};

/// An image attached to a cell, as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    /// Source identifier: `http(s)://` URL, `data:` URL, or local path.
    /// Also the image cache key.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// Decoded pixels, if the caller already has them. Takes precedence over
    /// `url`.
    #[serde(skip)]
    pub data: Option<Arc<LoadedImage>>,
    /// Requested draw size. A zero axis is derived from the natural size,
    /// keeping the aspect ratio.
    pub size: Size,
    /// Put the image left or right of the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    /// Put the image above or below the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valign: Option<VAlign>,
    /// Space around the image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<Edges>,
}

impl Image {
    /// An image to be fetched from `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// An image from already-decoded pixels.
    #[must_use]
    pub fn from_data(data: Arc<LoadedImage>) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    /// Request a draw size; `0` on an axis derives it from the other.
    #[must_use]
    pub const fn with_size(mut self, width: i32, height: i32) -> Self {
        self.size = Size::new(width, height);
        self
    }

    /// Place the image beside the text.
    #[must_use]
    pub const fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    /// Place the image above or below the text.
    #[must_use]
    pub const fn with_valign(mut self, valign: VAlign) -> Self {
        self.valign = Some(valign);
        self
    }

    /// Space around the image.
    #[must_use]
    pub const fn with_padding(mut self, padding: Edges) -> Self {
        self.padding = Some(padding);
        self
    }

    /// How the image flows with the text.
    #[must_use]
    pub const fn flow(&self) -> ImageFlow {
        match (self.valign, self.align) {
            (Some(VAlign::Top), _) => ImageFlow::Above,
            (Some(VAlign::Bottom), _) => ImageFlow::Below,
            (_, Some(Align::Left)) => ImageFlow::Left,
            (_, Some(Align::Right)) => ImageFlow::Right,
            _ => ImageFlow::Detached,
        }
    }

    /// Get the decoded pixels: attached data first, then the cache, then the
    /// image source (writing the result back to the cache).
    ///
    /// Returns `Ok(None)` for an image with neither data nor URL. A failed
    /// cache write does not fail acquisition; it is appended to
    /// `cache_errors`.
    ///
    /// # Errors
    ///
    /// [`Error::ImageFetchFailed`] if the image has to be fetched and there
    /// is no image source or the source fails.
    pub fn acquire(
        &self,
        context: &LayoutContext<'_>,
        cache_errors: &mut Vec<Error>,
    ) -> Result<Option<Arc<LoadedImage>>> {
        if let Some(data) = &self.data {
            return Ok(Some(Arc::clone(data)));
        }
        if self.url.is_empty() {
            return Ok(None);
        }

        if let Some(hit) = context.cache.and_then(|cache| cache.get(&self.url)) {
            debug!("image cache hit: {}", self.url);
            return Ok(Some(hit));
        }

        let source = context.images.ok_or_else(|| Error::ImageFetchFailed {
            url: self.url.clone(),
            reason: "no image source configured".to_string(),
        })?;
        let data = Arc::new(source.fetch(&self.url)?);
        debug!(
            "fetched image {} ({}x{})",
            self.url,
            data.width(),
            data.height()
        );

        let stored = context
            .cache
            .map_or(Ok(()), |cache| cache.set(&self.url, Arc::clone(&data)));
        if let Err(err) = stored {
            warn!("{err}");
            cache_errors.push(err);
        }
        Ok(Some(data))
    }
}

/// Where an image sits relative to the text of its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFlow {
    /// Stacked on top of the text.
    Above,
    /// Stacked below the text.
    Below,
    /// Beside the text, on the left.
    Left,
    /// Beside the text, on the right.
    Right,
    /// Drawn at the inner origin without reserving space.
    Detached,
}

impl ImageFlow {
    /// Above or below the text.
    #[must_use]
    pub const fn is_stacked(self) -> bool {
        matches!(self, Self::Above | Self::Below)
    }

    /// Left or right of the text.
    #[must_use]
    pub const fn is_beside(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round_half_even(value: f64) -> i32 {
    value.round_ties_even() as i32
}

/// A cell image after acquisition: pixels plus a finalized draw size.
///
/// Each cell owns its own copy, so fitting one cell's image never resizes
/// the same [`Image`] used in another cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImage {
    data: Arc<LoadedImage>,
    size: Size,
    padding: Edges,
    flow: ImageFlow,
}

impl ResolvedImage {
    /// Finalize the draw size of `image` against the natural size of `data`.
    ///
    /// Missing axes are taken from the natural size, then both axes are
    /// rescaled uniformly by `min(width / natural width, height / natural
    /// height)` so the aspect ratio is preserved.
    #[must_use]
    pub fn new(image: &Image, data: Arc<LoadedImage>) -> Self {
        let natural = natural_size(&data);
        let size = if natural.is_empty() {
            Size::ZERO
        } else {
            let requested = Size::new(
                if image.size.width == 0 { natural.width } else { image.size.width },
                if image.size.height == 0 { natural.height } else { image.size.height },
            );
            let scale = scale_between(requested, natural);
            Size::new(
                round_half_even(f64::from(natural.width) * scale),
                round_half_even(f64::from(natural.height) * scale),
            )
        };
        Self {
            data,
            size,
            padding: image.padding.unwrap_or_default(),
            flow: image.flow(),
        }
    }

    /// Decoded pixels.
    #[must_use]
    pub const fn data(&self) -> &Arc<LoadedImage> {
        &self.data
    }

    /// Draw size, without padding.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Padding around the image.
    #[must_use]
    pub const fn padding(&self) -> Edges {
        self.padding
    }

    /// How the image flows with the text.
    #[must_use]
    pub const fn flow(&self) -> ImageFlow {
        self.flow
    }

    /// Draw size plus padding.
    #[must_use]
    pub fn bound_size(&self) -> Size {
        self.size + self.padding.size()
    }

    /// Factor applied to the natural size when drawing.
    #[must_use]
    pub fn scale(&self) -> f64 {
        let natural = natural_size(&self.data);
        if natural.is_empty() {
            0.0
        } else {
            scale_between(self.size, natural)
        }
    }

    /// Shrink the image to fit `max_width` (padding included) and return the
    /// bound size.
    ///
    /// Only applies when `max_width` is positive and smaller than the current
    /// bound width. Scaling uses the horizontal factor on both axes with
    /// round-half-to-even. Once fitted, fitting again to the same width
    /// changes nothing.
    pub fn fit(&mut self, max_width: Option<i32>) -> Size {
        let bound = self.bound_size();
        let limit = max_width.filter(|w| *w > 0 && *w < bound.width && self.size.width > 0);
        if let Some(max_width) = limit {
            let target = f64::from(max_width - self.padding.size().width);
            let scale = target / f64::from(self.size.width);
            self.size = Size::new(
                round_half_even(f64::from(self.size.width) * scale),
                round_half_even(f64::from(self.size.height) * scale),
            );
            debug!("image fitted to {max_width}px: {:?}", self.size);
        }
        self.bound_size()
    }
}

#[allow(clippy::cast_possible_wrap)]
fn natural_size(data: &LoadedImage) -> Size {
    Size::new(data.width() as i32, data.height() as i32)
}

fn scale_between(size: Size, natural: Size) -> f64 {
    (f64::from(size.width) / f64::from(natural.width))
        .min(f64::from(size.height) / f64::from(natural.height))
}

/// Result of placing an image against a block of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Top-left corner of the image (padding applied).
    pub image_origin: Point,
    /// Horizontal offset of the text from the inner left edge.
    pub text_offset_x: i32,
    /// Top of the first text line.
    pub text_y: i32,
}

/// Position an image of `bound` size (padding included) and the text block
/// inside `inner`.
///
/// `block_y` is the top of the combined text+image block as already chosen
/// by the cell's vertical alignment; `text_height` is the height of all text
/// lines.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn place(
    flow: ImageFlow,
    bound: Size,
    padding: Edges,
    cell_align: Align,
    cell_valign: VAlign,
    text_height: i32,
    inner: Rect,
    block_y: i32,
) -> Placement {
    let mut x = padding.left;
    let mut y = padding.top;
    let mut text_y = block_y;
    let mut text_offset_x = 0;

    match flow {
        ImageFlow::Above | ImageFlow::Below => {
            if flow == ImageFlow::Above {
                y += block_y;
                text_y += bound.height;
            } else {
                y += block_y + text_height;
            }
            x += match cell_align {
                Align::Right => inner.max_x() - bound.width,
                Align::Center => inner.x + (inner.width - bound.width) / 2,
                Align::Left => inner.x,
            };
        }
        ImageFlow::Left | ImageFlow::Right => {
            if flow == ImageFlow::Left {
                x += inner.x;
                text_offset_x = bound.width;
            } else {
                x += inner.max_x() - bound.width;
            }
            match cell_valign {
                VAlign::Bottom => {
                    y += inner.max_y() - bound.height;
                    text_y = inner.max_y() - text_height;
                }
                VAlign::Middle => {
                    y += inner.y + (inner.height - bound.height) / 2;
                    text_y = inner.y + (inner.height - text_height) / 2;
                }
                VAlign::Top => y += inner.y,
            }
        }
        ImageFlow::Detached => {
            x += inner.x;
            y += inner.y;
        }
    }

    Placement {
        image_origin: Point::new(x, y),
        text_offset_x,
        text_y,
    }
}
