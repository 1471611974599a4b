//! Font references and the font-loading seam.
//!
//! A [`Font`] in a style names a typeface by [`FontDescriptor`] and, once
//! loaded, carries an opaque [`FontHandle`] issued by a [`FontLoader`]. The
//! layout engine never touches font files; it only passes handles back to the
//! metrics and drawing backends.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Font size used when no style in the cascade sets one.
pub const DEFAULT_FONT_SIZE: f64 = 13.0;

/// DPI at which a font size maps 1:1 to pixels.
pub const REFERENCE_DPI: u32 = 72;

/// Generic family of a typeface, part of its file name in a font folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    /// Sans-serif faces.
    #[default]
    Sans,
    /// Serif faces.
    Serif,
    /// Monospaced faces.
    Mono,
}

/// Weight/slant variant of a typeface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    /// Regular upright.
    #[default]
    Normal,
    /// Bold upright.
    Bold,
    /// Regular italic.
    Italic,
    /// Bold italic.
    BoldItalic,
}

impl FontStyle {
    /// Whether the variant is bold.
    #[must_use]
    pub const fn is_bold(self) -> bool {
        matches!(self, Self::Bold | Self::BoldItalic)
    }

    /// Whether the variant is italic.
    #[must_use]
    pub const fn is_italic(self) -> bool {
        matches!(self, Self::Italic | Self::BoldItalic)
    }
}

/// Names a typeface to be loaded by a [`FontLoader`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FontDescriptor {
    /// Base name, e.g. `"Roboto"`.
    pub name: String,
    /// Generic family.
    pub family: FontFamily,
    /// Weight/slant variant.
    pub style: FontStyle,
}

impl FontDescriptor {
    /// A regular sans descriptor with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Same name and family, different variant.
    #[must_use]
    pub const fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    /// Same name and variant, different family.
    #[must_use]
    pub const fn with_family(mut self, family: FontFamily) -> Self {
        self.family = family;
        self
    }

    /// File name of this face inside a font folder.
    ///
    /// `<name><family><weight>[i].ttf`, where family is `s`, `r`, or `m`
    /// (sans, serif, mono) and weight is `b` or `r`: `Roboto` bold sans is
    /// `Robotosb.ttf`, `Go` italic mono is `Gomri.ttf`.
    #[must_use]
    pub fn file_name(&self) -> String {
        let family = match self.family {
            FontFamily::Sans => 's',
            FontFamily::Serif => 'r',
            FontFamily::Mono => 'm',
        };
        let weight = if self.style.is_bold() { 'b' } else { 'r' };
        let italic = if self.style.is_italic() { "i" } else { "" };
        format!("{}{family}{weight}{italic}.ttf", self.name)
    }
}

impl fmt::Display for FontDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}, {:?})", self.name, self.family, self.style)
    }
}

/// Opaque reference to a loaded typeface, issued by a [`FontLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontHandle(u32);

impl FontHandle {
    /// Wrap a loader-specific identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The loader-specific identifier.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// Resolves typeface descriptors to handles. Implementations cache: loading
/// the same descriptor twice must return the same handle without touching
/// the filesystem again.
pub trait FontLoader {
    /// Load (or look up) the typeface named by `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FontUnavailable`] if the face cannot be found or parsed.
    fn load(&self, descriptor: &FontDescriptor) -> Result<FontHandle>;
}

/// Font reference inside a style: size, DPI, descriptor, and the cached
/// handle once loaded.
///
/// Every field is optional so that the cascade can fill gaps one field at a
/// time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Font {
    /// Size in points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    /// Rendering DPI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpi: Option<u32>,
    /// Typeface to load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<FontDescriptor>,
    /// Loaded typeface. Never serialized; attached by [`Font::load`] or by
    /// registering typeface bytes with a backend.
    #[serde(skip)]
    pub handle: Option<FontHandle>,
}

impl Font {
    /// A font reference that only sets a size.
    #[must_use]
    pub const fn sized(size: f64) -> Self {
        Self {
            size: Some(size),
            dpi: None,
            descriptor: None,
            handle: None,
        }
    }

    /// Set the descriptor.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: FontDescriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    /// Attach an already-loaded handle.
    #[must_use]
    pub const fn with_handle(mut self, handle: FontHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Set the DPI.
    #[must_use]
    pub const fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    /// Load the typeface if a descriptor is set and no handle is attached yet.
    ///
    /// A no-op when a handle is already present or when there is nothing to
    /// load.
    ///
    /// # Errors
    ///
    /// [`Error::FontUnavailable`] when a descriptor is set but `loader` is
    /// `None`, or when the loader fails.
    pub fn load(&mut self, loader: Option<&dyn FontLoader>) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }
        let Some(descriptor) = &self.descriptor else {
            return Ok(());
        };
        let Some(loader) = loader else {
            return Err(Error::FontUnavailable {
                descriptor: descriptor.to_string(),
                reason: "no font loader configured".to_string(),
            });
        };
        self.handle = Some(loader.load(descriptor)?);
        Ok(())
    }

    /// Fill unset fields from `parent`.
    ///
    /// The handle belongs to the descriptor it was loaded for, so a font that
    /// names its own descriptor never picks up the parent's handle.
    #[must_use]
    pub fn inherit(&self, parent: &Self) -> Self {
        let handle = match (&self.descriptor, self.handle) {
            (_, Some(handle)) => Some(handle),
            (Some(_), None) => None,
            (None, None) => parent.handle,
        };
        Self {
            size: self.size.or(parent.size),
            dpi: self.dpi.or(parent.dpi),
            descriptor: self.descriptor.clone().or_else(|| parent.descriptor.clone()),
            handle,
        }
    }

    /// The face text is measured and drawn with.
    #[must_use]
    pub fn face(&self) -> FontFace {
        FontFace {
            handle: self.handle,
            size: self.size.unwrap_or(DEFAULT_FONT_SIZE),
            dpi: self.dpi,
        }
    }
}

/// Everything a metrics or drawing backend needs to shape a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontFace {
    /// Loaded typeface, or `None` for the backend's fallback face.
    pub handle: Option<FontHandle>,
    /// Size in points.
    pub size: f64,
    /// Rendering DPI, `None` for [`REFERENCE_DPI`].
    pub dpi: Option<u32>,
}

impl FontFace {
    /// Size in pixels after DPI scaling:
    /// `size × REFERENCE_DPI / dpi`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn pixel_size(&self) -> f32 {
        let size = match self.dpi {
            Some(dpi) if dpi > 0 => self.size * f64::from(REFERENCE_DPI) / f64::from(dpi),
            _ => self.size,
        };
        size as f32
    }
}
