//! Layout engine of the Tabula table renderer.
//!
//! Turns rows of cells (text, optional image, cascading styles) into a
//! canvas size and a display list, without touching fonts or pixels
//! directly:
//!
//! ```text
//! Row[] ─▶ style cascade ─▶ text wrap / image fit ─▶ Table ─▶ compose ─▶ DisplayList
//! ```
//!
//! - [`style`]: style values, fonts, and the cascade
//! - [`text`]: inline markup, word separation, and wrapping
//! - [`layout`]: box model, images, cells, and the table grid
//! - [`paint`]: display list and composer
//!
//! Fonts, image bytes, and caches are reached through [`FontLoader`],
//! [`FontMetrics`], [`ImageSource`], and [`ImageCache`]; the
//! `tabula-render` crate provides the real implementations.

pub mod error;
pub mod layout;
pub mod paint;
pub mod style;
pub mod text;

pub use error::{Error, Result};
pub use layout::box_model::{Point, Rect, Size};
pub use layout::cell::{Cell, ResolvedCell, Row};
pub use layout::image::{Image, ImageFlow, ResolvedImage};
pub use layout::table::Table;
pub use layout::{ImageCache, ImageSource, LayoutContext};
pub use paint::{Composition, DisplayCommand, DisplayList, compose};
pub use style::font::{Font, FontDescriptor, FontFace, FontFamily, FontHandle, FontLoader, FontStyle};
pub use style::values::{Align, Border, Color, Edges, Line, VAlign};
pub use style::{Style, StyleDefaults};
pub use text::metrics::{ApproximateFontMetrics, FontMetrics};
pub use text::{TextRun, Word, Wrapped, wrap};
