//! The table image pipeline and its configuration.
//!
//! ```text
//! TableImageBuilder ──build──▶ TableImage ──render(rows)──▶ Rendered ──encode/save──▶ bytes
//! ```
//!
//! Every builder option sets one field of the default body style, the
//! outermost cascade parent of every row and cell.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use log::debug;
use tabula_layout::style::{DEFAULT_BORDER_WIDTH, DEFAULT_COLOR};
use tabula_layout::{
    Align, Border, Cell, Color, Edges, Error, Font, FontDescriptor, ImageCache, ImageSource,
    LayoutContext, Line, Row, Style, StyleDefaults, Table, VAlign, compose,
};

use crate::encode::{self, ImageType};
use crate::error::{RenderError, Result};
use crate::fonts::FontRegistry;
use crate::image_loader::{ImageFetcher, MemoryImageCache};
use crate::renderer::Rasterizer;

/// Renders rows of cells to RGBA images.
///
/// Holds the default styles, the font registry, and the image source and
/// cache. A single instance can render any number of tables.
pub struct TableImage {
    defaults: StyleDefaults,
    fonts: Arc<FontRegistry>,
    images: Box<dyn ImageSource + Send + Sync>,
    cache: Option<Arc<dyn ImageCache + Send + Sync>>,
}

impl TableImage {
    /// Start configuring a table image.
    #[must_use]
    pub fn builder() -> TableImageBuilder {
        TableImageBuilder::new()
    }

    /// A table image with the default styles and no font folder.
    ///
    /// # Errors
    ///
    /// Same as [`TableImageBuilder::build`].
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// The resolved default styles (body, caption, footer).
    #[must_use]
    pub const fn defaults(&self) -> &StyleDefaults {
        &self.defaults
    }

    /// The font registry used for loading, measuring, and drawing.
    #[must_use]
    pub const fn fonts(&self) -> &Arc<FontRegistry> {
        &self.fonts
    }

    /// Resolve styles, acquire images, and size the grid without drawing.
    ///
    /// # Errors
    ///
    /// [`Error::FontUnavailable`] or [`Error::ImageFetchFailed`] from table
    /// construction. Cache write failures are recorded on the table instead.
    pub fn layout(
        &self,
        rows: &[Row],
        caption: Option<&Cell>,
        footer: Option<&Cell>,
    ) -> Result<Table> {
        let fonts = self.fonts.as_ref();
        let mut context = LayoutContext::new(fonts)
            .with_fonts(fonts)
            .with_images(self.images.as_ref());
        if let Some(cache) = &self.cache {
            context = context.with_cache(cache.as_ref());
        }
        Table::build(rows, caption, footer, &self.defaults, &context).map_err(RenderError::from)
    }

    /// Lay the table out and rasterize it.
    ///
    /// # Errors
    ///
    /// Everything [`TableImage::layout`] can fail with, plus
    /// [`RenderError::Canvas`] when the composed canvas is too large to
    /// allocate. An empty composition renders to a 0×0 image.
    pub fn render(
        &self,
        rows: &[Row],
        caption: Option<&Cell>,
        footer: Option<&Cell>,
    ) -> Result<Rendered> {
        let mut table = self.layout(rows, caption, footer)?;
        let composition = compose(&mut table, &self.defaults.body, self.fonts.as_ref());
        debug!(
            "composed {}x{} canvas with {} draw commands",
            composition.size.width,
            composition.size.height,
            composition.display_list.len()
        );

        let image = if composition.size.is_empty() {
            RgbaImage::new(0, 0)
        } else {
            let mut rasterizer = Rasterizer::new(composition.size, &self.fonts)?;
            rasterizer.render(&composition.display_list);
            rasterizer.into_image()
        };
        let cache_errors = table.take_cache_errors();
        Ok(Rendered {
            image,
            table,
            cache_errors,
        })
    }
}

/// A rendered table: the pixels, the laid-out grid, and any image cache
/// writes that failed along the way.
pub struct Rendered {
    image: RgbaImage,
    table: Table,
    cache_errors: Vec<Error>,
}

impl Rendered {
    /// The rendered pixels.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// The laid-out table the pixels were drawn from.
    #[must_use]
    pub const fn table(&self) -> &Table {
        &self.table
    }

    /// Image cache writes that failed. The image is complete regardless.
    #[must_use]
    pub fn cache_errors(&self) -> &[Error] {
        &self.cache_errors
    }

    /// Take the pixels, ignoring cache write failures.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Take the pixels, treating a failed cache write as an error.
    ///
    /// # Errors
    ///
    /// The first [`Error::CacheWriteFailed`] recorded during layout.
    pub fn into_result(self) -> Result<RgbaImage> {
        match self.cache_errors.into_iter().next() {
            Some(error) => Err(error.into()),
            None => Ok(self.image),
        }
    }

    /// Encode the pixels.
    ///
    /// # Errors
    ///
    /// See [`encode::encode`].
    pub fn encode(&self, image_type: ImageType) -> Result<Vec<u8>> {
        encode::encode(&self.image, image_type)
    }

    /// Encode the pixels into a file.
    ///
    /// # Errors
    ///
    /// See [`encode::save`].
    pub fn save(&self, path: impl AsRef<Path>, image_type: ImageType) -> Result<()> {
        encode::save(path, &self.image, image_type)
    }
}

/// Configures a [`TableImage`].
///
/// Starts from the default styles: `#212121` text on a 1px `#212121` border,
/// 10px padding, 13pt text at line height 1.2, left/middle aligned.
#[must_use]
pub struct TableImageBuilder {
    style: Style,
    caption: Style,
    footer: Style,
    font_folder: Option<PathBuf>,
    typeface: Option<Vec<u8>>,
    registry: Option<Arc<FontRegistry>>,
    system_fonts: bool,
    image_source: Option<Box<dyn ImageSource + Send + Sync>>,
    image_base_dir: Option<PathBuf>,
    image_cache: Option<Arc<dyn ImageCache + Send + Sync>>,
}

impl Default for TableImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableImageBuilder {
    /// A builder with the default styles, system font fallback, and an
    /// in-memory image cache.
    pub fn new() -> Self {
        Self {
            style: Style::table_default(),
            caption: Style::caption_default(),
            footer: Style::footer_default(),
            font_folder: None,
            typeface: None,
            registry: None,
            system_fonts: true,
            image_source: None,
            image_base_dir: None,
            image_cache: Some(Arc::new(MemoryImageCache::new())),
        }
    }

    fn font_mut(&mut self) -> &mut Font {
        self.style.font.get_or_insert_with(Font::default)
    }

    fn border_or_default(&self) -> Border {
        self.style
            .border
            .unwrap_or_else(|| Border::uniform(Line::new(DEFAULT_COLOR, DEFAULT_BORDER_WIDTH)))
    }

    /// Font size in points.
    pub fn font_size(mut self, size: f64) -> Self {
        self.font_mut().size = Some(size);
        self
    }

    /// Line-height multiplier.
    pub fn line_height(mut self, line_height: f64) -> Self {
        self.style.line_height = Some(line_height);
        self
    }

    /// Cell padding.
    pub fn padding(mut self, padding: Edges) -> Self {
        self.style.padding = Some(padding);
        self
    }

    /// Cell margin.
    pub fn margin(mut self, margin: Edges) -> Self {
        self.style.margin = Some(margin);
        self
    }

    /// Text color.
    pub fn color(mut self, color: Color) -> Self {
        self.style.color = Some(color);
        self
    }

    /// Color of every border edge, keeping their widths.
    pub fn border_color(mut self, color: Color) -> Self {
        self.style.border = Some(self.border_or_default().with_color(color));
        self
    }

    /// Width of every border edge, keeping their colors.
    pub fn border_width(mut self, width: i32) -> Self {
        self.style.border = Some(self.border_or_default().with_width(width));
        self
    }

    /// The whole border.
    pub fn border(mut self, border: Border) -> Self {
        self.style.border = Some(border);
        self
    }

    /// Background color.
    pub fn background(mut self, color: Color) -> Self {
        self.style.background = Some(color);
        self
    }

    /// Horizontal alignment.
    pub fn align(mut self, align: Align) -> Self {
        self.style.align = Some(align);
        self
    }

    /// Vertical alignment.
    pub fn valign(mut self, valign: VAlign) -> Self {
        self.style.valign = Some(valign);
        self
    }

    /// Folder that font descriptors are resolved against.
    ///
    /// Ignored when a registry is supplied with [`Self::font_registry`].
    pub fn font_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.font_folder = Some(folder.into());
        self
    }

    /// Typeface to load from the font folder.
    pub fn font_descriptor(mut self, descriptor: FontDescriptor) -> Self {
        self.font_mut().descriptor = Some(descriptor);
        self
    }

    /// Raw font bytes to register and use directly, bypassing the folder.
    pub fn typeface(mut self, bytes: Vec<u8>) -> Self {
        self.typeface = Some(bytes);
        self
    }

    /// Rendering DPI; text is scaled by `72 / dpi`.
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.font_mut().dpi = Some(dpi);
        self
    }

    /// Share a font registry (and its loaded faces) between table images.
    pub fn font_registry(mut self, registry: Arc<FontRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the default body style wholesale.
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Replace the caption default style.
    pub fn caption_style(mut self, style: Style) -> Self {
        self.caption = style;
        self
    }

    /// Replace the footer default style.
    pub fn footer_style(mut self, style: Style) -> Self {
        self.footer = style;
        self
    }

    /// Whether runs without a typeface fall back to a system font.
    pub fn system_fonts(mut self, enabled: bool) -> Self {
        self.system_fonts = enabled;
        self
    }

    /// Fetch images with `source` instead of the built-in fetcher.
    pub fn image_source(mut self, source: impl ImageSource + Send + Sync + 'static) -> Self {
        self.image_source = Some(Box::new(source));
        self
    }

    /// Resolve relative image paths against `dir` (built-in fetcher only).
    pub fn image_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_base_dir = Some(dir.into());
        self
    }

    /// Cache fetched images in `cache`.
    pub fn image_cache(mut self, cache: Arc<dyn ImageCache + Send + Sync>) -> Self {
        self.image_cache = Some(cache);
        self
    }

    /// Fetch every image on every render.
    pub fn no_image_cache(mut self) -> Self {
        self.image_cache = None;
        self
    }

    /// Resolve the default typefaces and finish configuration.
    ///
    /// The body font's typeface and DPI carry over to the caption and footer
    /// defaults unless those name their own.
    ///
    /// # Errors
    ///
    /// [`Error::FontUnavailable`] when a descriptor is configured and cannot
    /// be loaded, or when the typeface bytes are not a font.
    pub fn build(self) -> Result<TableImage> {
        let fonts = self.registry.unwrap_or_else(|| {
            let mut registry = FontRegistry::new();
            if let Some(folder) = self.font_folder {
                registry = registry.with_folder(folder);
            }
            if self.system_fonts {
                registry = registry.with_system_fallback();
            }
            Arc::new(registry)
        });

        let mut body = self.style;
        if let Some(bytes) = self.typeface {
            let handle = fonts.register(bytes)?;
            body.font.get_or_insert_with(Font::default).handle = Some(handle);
        }
        body.load_font(Some(fonts.as_ref()))?;

        let mut defaults = StyleDefaults {
            caption: share_typeface(self.caption, &body),
            footer: share_typeface(self.footer, &body),
            body,
        };
        defaults.load_fonts(Some(fonts.as_ref()))?;

        let images: Box<dyn ImageSource + Send + Sync> = match self.image_source {
            Some(source) => source,
            None => Box::new(
                self.image_base_dir
                    .map_or_else(ImageFetcher::new, |dir| ImageFetcher::new().with_base_dir(dir)),
            ),
        };

        Ok(TableImage {
            defaults,
            fonts,
            images,
            cache: self.image_cache,
        })
    }
}

fn share_typeface(mut style: Style, body: &Style) -> Style {
    if let Some(body_font) = &body.font {
        let font = style.font.get_or_insert_with(Font::default);
        if font.descriptor.is_none() && font.handle.is_none() {
            font.descriptor.clone_from(&body_font.descriptor);
            font.handle = body_font.handle;
        }
        font.dpi = font.dpi.or(body_font.dpi);
    }
    style
}
