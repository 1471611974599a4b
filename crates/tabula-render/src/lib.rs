//! Rendering backends and the table image pipeline for Tabula.
//!
//! # Scope
//!
//! This crate provides:
//! - **Fonts** - a fontdue-backed registry that loads typefaces from a font
//!   folder and measures text for layout
//! - **Images** - fetching (HTTP, `data:` URLs, files), SVG/raster decoding,
//!   and an in-memory image cache
//! - **Rasterization** - executing a display list onto a tiny-skia canvas
//! - **Encoding** - PNG and JPEG output
//! - **Pipeline** - [`TableImage`], which ties layout and all of the above
//!   together behind one configurable entry point
//!
//! ```no_run
//! use tabula_layout::{Cell, Row};
//! use tabula_render::{ImageType, TableImage};
//!
//! # fn main() -> Result<(), tabula_render::RenderError> {
//! let table = TableImage::builder().font_size(14.0).build()?;
//! let rows = vec![
//!     Row::from_iter(["Id", "Name"]),
//!     Row::from_iter(["1", "Ada"]),
//! ];
//! let caption = Cell::new("Users");
//! table
//!     .render(&rows, Some(&caption), None)?
//!     .save("users.png", ImageType::Png)?;
//! # Ok(())
//! # }
//! ```

pub mod encode;
pub mod error;
pub mod fonts;
pub mod image_loader;
pub mod renderer;
pub mod table_image;

pub use encode::{ImageType, encode, save, write};
pub use error::{RenderError, Result};
pub use fonts::FontRegistry;
pub use image_loader::{ImageFetcher, MemoryImageCache};
pub use renderer::Rasterizer;
pub use table_image::{Rendered, TableImage, TableImageBuilder};
