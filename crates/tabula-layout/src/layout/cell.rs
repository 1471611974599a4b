//! Cells and rows: caller input, cascade resolution, sizing, and painting.

use serde::{Deserialize, Serialize};

use super::LayoutContext;
use super::box_model::{Point, Rect, Size};
use super::image::{Image, ImageFlow, Placement, ResolvedImage, place};
use crate::error::{Error, Result};
use crate::paint::display_list::{DisplayCommand, DisplayList};
use crate::style::Style;
use crate::style::values::{Align, Border, Color, VAlign};
use crate::text::metrics::FontMetrics;
use crate::text::{Wrapped, wrap};

/// One table cell as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cell {
    /// Text content, optionally with `<text>` markup.
    pub text: String,
    /// Image shown with the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    /// Cell style; unset fields inherit from the row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    /// Treat `<text>` tags as literal text.
    #[serde(alias = "ignore_inline_style")]
    pub ignore_markup: bool,
}

impl Cell {
    /// A plain text cell.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the cell style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Attach an image.
    #[must_use]
    pub fn with_image(mut self, image: Image) -> Self {
        self.image = Some(image);
        self
    }

    /// Disable markup parsing.
    #[must_use]
    pub const fn ignoring_markup(mut self) -> Self {
        self.ignore_markup = true;
        self
    }

    /// Cascade the cell style from `parent` and acquire the image.
    ///
    /// # Errors
    ///
    /// [`Error::FontUnavailable`] from the cascade and
    /// [`Error::ImageFetchFailed`] from image acquisition. Cache write
    /// failures are appended to `cache_errors` instead.
    pub fn resolve(
        &self,
        parent: &Style,
        context: &LayoutContext<'_>,
        cache_errors: &mut Vec<Error>,
    ) -> Result<ResolvedCell> {
        let style = self
            .style
            .as_ref()
            .unwrap_or(&Style::default())
            .inherit(parent, context.fonts)?;
        let image = match &self.image {
            Some(image) => image
                .acquire(context, cache_errors)?
                .map(|data| ResolvedImage::new(image, data)),
            None => None,
        };
        Ok(ResolvedCell {
            text: self.text.clone(),
            style,
            image,
            ignore_markup: self.ignore_markup,
        })
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// A row of cells as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Row {
    /// Cells from left to right.
    pub cells: Vec<Cell>,
    /// Row style; unset fields inherit from the table default, and cells
    /// inherit from it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

impl Row {
    /// A row of cells without a style.
    #[must_use]
    pub const fn new(cells: Vec<Cell>) -> Self {
        Self { cells, style: None }
    }

    /// Set the row style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }
}

impl<C: Into<Cell>> FromIterator<C> for Row {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// A cell with its effective style and its own copy of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCell {
    /// Text content.
    pub text: String,
    /// Effective style after the cascade.
    pub style: Style,
    /// Acquired image, if any.
    pub image: Option<ResolvedImage>,
    /// Treat `<text>` tags as literal text.
    pub ignore_markup: bool,
}

impl ResolvedCell {
    fn flow(&self) -> ImageFlow {
        self.image
            .as_ref()
            .map_or(ImageFlow::Detached, ResolvedImage::flow)
    }

    /// Bound size of the image after fitting it to the style's max width.
    pub fn image_size(&mut self) -> Size {
        let limit = self.style.content_limit();
        self.image
            .as_mut()
            .map_or(Size::ZERO, |image| image.fit(limit))
    }

    /// Wrap the text into the max width minus `x_offset` (the width taken by
    /// an image beside the text).
    #[must_use]
    pub fn wrap(&self, x_offset: i32, metrics: &dyn FontMetrics) -> Wrapped {
        let Some(face) = self.style.face() else {
            return Wrapped::default();
        };
        let max_width = self.style.max_width.unwrap_or(0) - x_offset;
        wrap(&self.text, max_width, &face, metrics, self.ignore_markup)
    }

    /// Outer size of the cell: content plus margin, border, and padding.
    ///
    /// Zero for a cell without a font.
    pub fn size(&mut self, metrics: &dyn FontMetrics) -> Size {
        if self.style.font.is_none() {
            return Size::ZERO;
        }

        let image = self.image_size();
        let (beside, stacked) = match self.flow() {
            ImageFlow::Left | ImageFlow::Right => (image, Size::ZERO),
            ImageFlow::Above | ImageFlow::Below => (Size::ZERO, image),
            ImageFlow::Detached => (Size::ZERO, Size::ZERO),
        };

        let wrapped = self.wrap(beside.width, metrics);
        let pitch = self.style.line_pitch();
        let text_height = line_count(&wrapped) * pitch;
        let border = self.style.border_size();

        Size::new(
            wrapped.max_width.max(stacked.width) + border.width + beside.width,
            text_height.max(beside.height) + border.height + stacked.height,
        )
    }

    /// Append the drawing commands for this cell inside `bounds`.
    ///
    /// Background and border are always drawn; the image and text only when
    /// the style has a font.
    pub fn paint(&mut self, bounds: Rect, metrics: &dyn FontMetrics, list: &mut DisplayList) {
        if let Some(background) = self.style.background {
            list.fill_rect(bounds, background);
        }
        if let Some(border) = &self.style.border {
            paint_border(border, bounds, list);
        }
        let Some(face) = self.style.face() else {
            return;
        };

        let image_size = self.image_size();
        let flow = self.flow();
        let beside_width = if flow.is_beside() { image_size.width } else { 0 };
        let stacked_height = if flow.is_stacked() { image_size.height } else { 0 };

        let pitch = self.style.line_pitch();
        let wrapped = self.wrap(beside_width, metrics);
        let inner = self.style.inner_bounds(bounds);
        let text_height = line_count(&wrapped) * pitch;
        let align = self.style.align_or_default();
        let valign = self.style.valign_or_default();

        let block_y = match valign {
            VAlign::Middle => inner.y + (inner.height - text_height - stacked_height) / 2,
            VAlign::Bottom => inner.max_y() - text_height - stacked_height,
            VAlign::Top => inner.y,
        };

        let placement = match &self.image {
            Some(image) => {
                let placement = place(
                    flow,
                    image_size,
                    image.padding(),
                    align,
                    valign,
                    text_height,
                    inner,
                    block_y,
                );
                list.push(DisplayCommand::DrawImage {
                    origin: placement.image_origin,
                    image: image.data().clone(),
                    scale: image.scale(),
                });
                placement
            }
            None => Placement {
                image_origin: inner.origin(),
                text_offset_x: 0,
                text_y: block_y,
            },
        };

        let default_color = self.style.color.unwrap_or(Color::BLACK);
        let mut y = placement.text_y;
        for line in &wrapped.lines {
            let width = line.width();
            let mut x = match align {
                Align::Right => {
                    let reserved = if flow == ImageFlow::Right { beside_width } else { 0 };
                    inner.max_x() - width - reserved
                }
                Align::Center => {
                    inner.x + placement.text_offset_x + (inner.width - width - beside_width) / 2
                }
                Align::Left => inner.x + placement.text_offset_x,
            };
            for run in line.runs() {
                if let Some(background) = run.style.background {
                    list.fill_rect(Rect::new(x, y, run.width, pitch), background);
                }
                if !run.value.trim().is_empty() {
                    list.push(DisplayCommand::DrawText {
                        origin: Point::new(x + run.style.padding, y),
                        text: run.value.clone(),
                        color: run.style.color.unwrap_or(default_color),
                        face,
                    });
                }
                x += run.width;
            }
            y += pitch;
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn line_count(wrapped: &Wrapped) -> i32 {
    wrapped.line_count() as i32
}

/// Stroke each visible border edge along the matching side of `bounds`.
fn paint_border(border: &Border, bounds: Rect, list: &mut DisplayList) {
    let min = bounds.origin();
    let max = bounds.max();
    let edges = [
        (border.top, Point::new(min.x, min.y), Point::new(max.x, min.y)),
        (border.right, Point::new(max.x, min.y), Point::new(max.x, max.y)),
        (border.bottom, Point::new(min.x, max.y), Point::new(max.x, max.y)),
        (border.left, Point::new(min.x, min.y), Point::new(min.x, max.y)),
    ];
    for (line, from, to) in edges {
        if let (true, Some(color)) = (line.is_visible(), line.color) {
            list.stroke_rect(Rect::from_corners(from, to), color, line.width);
        }
    }
}
