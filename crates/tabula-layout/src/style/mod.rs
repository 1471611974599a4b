//! Styles and the style cascade.
//!
//! A [`Style`] is a bag of optional fields. `None` means "inherit from the
//! parent"; `Some` is authoritative even when the value is zero, so an
//! explicit `Border::none()` or `Edges::ZERO` stops inheritance instead of
//! being mistaken for "unset".
//!
//! Cascade order for a body cell is cell ← row ← table default. The caption
//! and footer cascade from their own defaults ([`StyleDefaults`]).

pub mod font;
pub mod values;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use font::{Font, FontFace, FontLoader};
use values::{Align, Border, Color, Edges, Line, VAlign};

pub use font::DEFAULT_FONT_SIZE;

/// Line-height multiplier used by the default styles.
pub const DEFAULT_LINE_HEIGHT: f64 = 1.2;

/// Padding (all sides for the body, top/bottom for caption and footer).
pub const DEFAULT_PADDING: i32 = 10;

/// Border width of the body default.
pub const DEFAULT_BORDER_WIDTH: i32 = 1;

/// Text and border color of the default styles.
pub const DEFAULT_COLOR: Color = Color::rgb(0x21, 0x21, 0x21);

/// Visual properties of a table, row, or cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Text color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Fill behind the box (inside the margin).
    #[serde(skip_serializing_if = "Option::is_none", alias = "bg_color")]
    pub background: Option<Color>,
    /// Per-edge border lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    /// Outer inset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Edges>,
    /// Inner inset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<Edges>,
    /// Multiplier applied to the font size to get the line pitch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    /// Maximum content width in pixels; zero or negative means unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<i32>,
    /// Horizontal alignment of text (and of stacked images).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    /// Vertical alignment of text (and of side-by-side images).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valign: Option<VAlign>,
    /// Font reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

impl Style {
    /// Default style of table body cells: dark text, 1px border, padding 10,
    /// left/middle, 13pt.
    #[must_use]
    pub fn table_default() -> Self {
        Self {
            color: Some(DEFAULT_COLOR),
            border: Some(Border::uniform(Line::new(
                DEFAULT_COLOR,
                DEFAULT_BORDER_WIDTH,
            ))),
            line_height: Some(DEFAULT_LINE_HEIGHT),
            padding: Some(Edges::uniform(DEFAULT_PADDING)),
            align: Some(Align::Left),
            valign: Some(VAlign::Middle),
            font: Some(Font::sized(DEFAULT_FONT_SIZE)),
            ..Self::default()
        }
    }

    /// Default style of the caption: no border, vertical padding only,
    /// left/top.
    #[must_use]
    pub fn caption_default() -> Self {
        Self {
            border: Some(Border::none()),
            padding: Some(Edges::vertical(DEFAULT_PADDING)),
            valign: Some(VAlign::Top),
            ..Self::table_default()
        }
    }

    /// Default style of the footer: like the caption but right-aligned.
    #[must_use]
    pub fn footer_default() -> Self {
        Self {
            align: Some(Align::Right),
            ..Self::caption_default()
        }
    }

    /// Resolve this style against `parent`, producing a new style.
    ///
    /// Every unset field takes the parent's value. Border, margin, and
    /// padding are taken wholesale. The font cascades field by field when
    /// both sides have one (see [`Font::inherit`]); in every case the
    /// resulting font is loaded through `fonts` if it names a typeface
    /// without a handle.
    ///
    /// # Errors
    ///
    /// [`crate::Error::FontUnavailable`] if the resolved font names a
    /// typeface that cannot be loaded.
    pub fn inherit(&self, parent: &Self, fonts: Option<&dyn FontLoader>) -> Result<Self> {
        let font = match (&self.font, &parent.font) {
            (None, None) => None,
            (None, Some(inherited)) => Some(inherited.clone()),
            (Some(own), None) => Some(own.clone()),
            (Some(own), Some(inherited)) => Some(own.inherit(inherited)),
        };

        let mut resolved = Self {
            color: self.color.or(parent.color),
            background: self.background.or(parent.background),
            border: self.border.or(parent.border),
            margin: self.margin.or(parent.margin),
            padding: self.padding.or(parent.padding),
            line_height: self.line_height.or(parent.line_height),
            max_width: self.max_width.or(parent.max_width),
            align: self.align.or(parent.align),
            valign: self.valign.or(parent.valign),
            font,
        };
        resolved.load_font(fonts)?;
        Ok(resolved)
    }

    /// Load the font's typeface if it names one and has no handle yet.
    ///
    /// # Errors
    ///
    /// [`crate::Error::FontUnavailable`] as for [`Font::load`].
    pub fn load_font(&mut self, fonts: Option<&dyn FontLoader>) -> Result<()> {
        match self.font.as_mut() {
            Some(font) => {
                let had_handle = font.handle.is_some();
                font.load(fonts)?;
                if !had_handle && font.handle.is_some() {
                    debug!("loaded typeface {:?}", font.descriptor);
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// The face used for text in this style, if it has a font at all.
    #[must_use]
    pub fn face(&self) -> Option<FontFace> {
        self.font.as_ref().map(Font::face)
    }

    /// Line pitch in pixels: `round(font size × line height)`.
    ///
    /// A missing line height counts as 1.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn line_pitch(&self) -> i32 {
        let size = self
            .font
            .as_ref()
            .and_then(|font| font.size)
            .unwrap_or(DEFAULT_FONT_SIZE);
        let multiplier = self.line_height.unwrap_or(1.0);
        (size * multiplier).round() as i32
    }

    /// Maximum content width if one is set and positive.
    #[must_use]
    pub fn content_limit(&self) -> Option<i32> {
        self.max_width.filter(|width| *width > 0)
    }

    /// Horizontal alignment, left when unset.
    #[must_use]
    pub fn align_or_default(&self) -> Align {
        self.align.unwrap_or(Align::Left)
    }

    /// Vertical alignment, top when unset.
    #[must_use]
    pub fn valign_or_default(&self) -> VAlign {
        self.valign.unwrap_or(VAlign::Top)
    }
}

/// The three outermost cascade parents of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDefaults {
    /// Parent of every row style.
    pub body: Style,
    /// Parent of the caption cell style.
    pub caption: Style,
    /// Parent of the footer cell style.
    pub footer: Style,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            body: Style::table_default(),
            caption: Style::caption_default(),
            footer: Style::footer_default(),
        }
    }
}

impl StyleDefaults {
    /// Load the typefaces of all three defaults.
    ///
    /// # Errors
    ///
    /// [`crate::Error::FontUnavailable`] for the first default whose
    /// typeface cannot be loaded.
    pub fn load_fonts(&mut self, fonts: Option<&dyn FontLoader>) -> Result<()> {
        self.body.load_font(fonts)?;
        self.caption.load_font(fonts)?;
        self.footer.load_font(fonts)
    }
}
