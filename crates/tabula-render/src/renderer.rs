//! Software rasterizer for composed tables.
//!
//! Executes a `DisplayList` onto a tiny-skia pixmap, using fontdue for glyphs.
//!
//! ```text
//! Table → compose → DisplayList → Rasterizer → RgbaImage
//! ```
//!
//! The rasterizer knows nothing about styles or the table grid. It simply
//! executes drawing commands in order.

use image::{Rgba, RgbaImage};
use tabula_common::image::LoadedImage;
use tabula_common::warning::warn_once;
use tabula_layout::{Color, DisplayCommand, DisplayList, FontFace, Point, Rect, Size};
use tiny_skia::{
    ColorU8, FilterQuality, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8,
    Stroke, Transform,
};

use crate::error::{RenderError, Result};
use crate::fonts::FontRegistry;

/// Draws display commands onto an RGBA canvas that starts out transparent.
pub struct Rasterizer<'a> {
    pixmap: Pixmap,
    fonts: &'a FontRegistry,
}

impl<'a> Rasterizer<'a> {
    /// Allocate a transparent canvas of `size`.
    ///
    /// # Errors
    ///
    /// [`RenderError::Canvas`] when either dimension is zero, negative, or
    /// too large to allocate.
    pub fn new(size: Size, fonts: &'a FontRegistry) -> Result<Self> {
        let canvas = || RenderError::Canvas {
            width: size.width,
            height: size.height,
        };
        let width = u32::try_from(size.width).map_err(|_| canvas())?;
        let height = u32::try_from(size.height).map_err(|_| canvas())?;
        let pixmap = Pixmap::new(width, height).ok_or_else(canvas)?;
        Ok(Self { pixmap, fonts })
    }

    /// Execute every command of `display_list`, back to front.
    pub fn render(&mut self, display_list: &DisplayList) {
        for command in display_list.commands() {
            self.execute_command(command);
        }
    }

    fn execute_command(&mut self, command: &DisplayCommand) {
        match command {
            DisplayCommand::FillStrokeRect {
                rect,
                fill,
                stroke,
                stroke_width,
            } => {
                if let Some(fill) = fill {
                    self.fill_rect(*rect, *fill);
                }
                if let Some(stroke) = stroke {
                    self.stroke_rect(*rect, *stroke, *stroke_width);
                }
            }
            DisplayCommand::DrawImage {
                origin,
                image,
                scale,
            } => self.draw_image(*origin, image, *scale),
            DisplayCommand::DrawText {
                origin,
                text,
                color,
                face,
            } => self.draw_text(*origin, text, *color, face),
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if let Some(area) = to_skia_rect(rect) {
            self.pixmap
                .fill_rect(area, &solid(color, false), Transform::identity(), None);
        }
    }

    /// Stroke `rect` centered on its outline. A zero-width or zero-height
    /// rectangle strokes the single segment from its origin to its far corner.
    #[allow(clippy::cast_precision_loss)]
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: i32) {
        if width <= 0 {
            return;
        }
        let path = if rect.width == 0 || rect.height == 0 {
            let mut builder = PathBuilder::new();
            builder.move_to(rect.x as f32, rect.y as f32);
            builder.line_to(rect.max_x() as f32, rect.max_y() as f32);
            builder.finish()
        } else {
            to_skia_rect(rect).map(PathBuilder::from_rect)
        };
        let Some(path) = path else {
            return;
        };
        let stroke = Stroke {
            width: width as f32,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &solid(color, true), &stroke, Transform::identity(), None);
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn draw_image(&mut self, origin: Point, image: &LoadedImage, scale: f64) {
        if image.is_empty() || scale <= 0.0 {
            return;
        }
        let Some(source) = premultiplied_pixmap(image) else {
            return;
        };
        let scale = scale as f32;
        let transform =
            Transform::from_scale(scale, scale).post_translate(origin.x as f32, origin.y as f32);
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
    }

    /// Draw one run with its baseline one pixel size below `origin.y`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss
    )]
    fn draw_text(&mut self, origin: Point, text: &str, color: Color, face: &FontFace) {
        let Some(font) = self.fonts.font(face.handle) else {
            warn_once("render", "no typeface available; text is not drawn");
            return;
        };
        let size = face.pixel_size();
        let baseline = origin.y + size.round() as i32;
        let mut cursor_x = origin.x as f32;

        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let (metrics, bitmap) = font.rasterize(ch, size);
            let glyph_x = cursor_x.round() as i32 + metrics.xmin;
            let glyph_y = baseline - metrics.ymin - metrics.height as i32;

            for (row, coverage) in bitmap.chunks(metrics.width.max(1)).enumerate() {
                for (column, &alpha) in coverage.iter().enumerate() {
                    if alpha > 0 {
                        self.blend_pixel(
                            glyph_x + column as i32,
                            glyph_y + row as i32,
                            color,
                            alpha,
                        );
                    }
                }
            }
            cursor_x += metrics.advance_width;
        }
    }

    /// Source-over blend of `color` at `coverage` onto one premultiplied pixel.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn blend_pixel(&mut self, x: i32, y: i32, color: Color, coverage: u8) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        let width = self.pixmap.width();
        if x >= width || y >= self.pixmap.height() {
            return;
        }
        let index = (y * width + x) as usize;
        let pixels = self.pixmap.pixels_mut();
        let dst = pixels[index];

        let alpha = u32::from(coverage) * u32::from(color.a) / 255;
        let inverse = 255 - alpha;
        let mix = |src: u8, dst: u8| ((u32::from(src) * alpha + u32::from(dst) * inverse) / 255) as u8;
        let blended = PremultipliedColorU8::from_rgba(
            mix(color.r, dst.red()),
            mix(color.g, dst.green()),
            mix(color.b, dst.blue()),
            mix(255, dst.alpha()),
        );
        if let Some(blended) = blended {
            pixels[index] = blended;
        }
    }

    /// Canvas size in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    /// Finish drawing and return straight-alpha RGBA pixels.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        RgbaImage::from_fn(self.pixmap.width(), self.pixmap.height(), |x, y| {
            let color = self
                .pixmap
                .pixel(x, y)
                .map_or(ColorU8::from_rgba(0, 0, 0, 0), |pixel| pixel.demultiply());
            Rgba([color.red(), color.green(), color.blue(), color.alpha()])
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    if rect.width <= 0 || rect.height <= 0 {
        return None;
    }
    tiny_skia::Rect::from_xywh(
        rect.x as f32,
        rect.y as f32,
        rect.width as f32,
        rect.height as f32,
    )
}

fn solid(color: Color, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = anti_alias;
    paint
}

/// Copy straight-alpha pixels into a premultiplied pixmap.
fn premultiplied_pixmap(image: &LoadedImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())?;
    let data = image
        .rgba_data()
        .chunks_exact(4)
        .flat_map(|px| {
            let color = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect();
    Pixmap::from_vec(data, size)
}
