//! Typeface registry backed by fontdue.
//!
//! One [`FontRegistry`] serves both sides of the layout seam: it loads
//! descriptors into [`FontHandle`]s ([`FontLoader`]) and measures text with
//! the same per-glyph advances the rasterizer later draws with
//! ([`FontMetrics`]).
//!
//! Faces are looked up in a font folder by descriptor file name
//! (`Robotosb.ttf`), with `<name>.ttf` as a second try. Runs without a handle
//! use a fallback face discovered in the usual system font locations.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use fontdue::{Font, FontSettings};
use log::debug;
use tabula_common::warning::warn_once;
use tabula_layout::{
    ApproximateFontMetrics, Error, FontDescriptor, FontFace, FontHandle, FontLoader, FontMetrics,
    Result,
};

/// Common system font paths searched for the fallback face.
const FONT_SEARCH_PATHS: &[&str] = &[
    // macOS
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/SFNS.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    // Windows
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// Loaded faces plus the descriptor → handle index.
///
/// Handles are indices into `faces`, so they stay valid for the registry's
/// lifetime.
#[derive(Default)]
struct Faces {
    faces: Vec<Arc<Font>>,
    by_descriptor: HashMap<FontDescriptor, FontHandle>,
}

/// Loads, caches, and measures typefaces.
///
/// Safe to share between threads; each descriptor is read from disk at most
/// once.
#[derive(Default)]
pub struct FontRegistry {
    folder: Option<PathBuf>,
    fallback: Option<Arc<Font>>,
    faces: RwLock<Faces>,
}

impl FontRegistry {
    /// An empty registry: no folder, no fallback face.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve descriptors against files in `folder`.
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    /// Use the first readable font in the system font locations for runs
    /// without a typeface handle.
    #[must_use]
    pub fn with_system_fallback(mut self) -> Self {
        self.fallback = load_font_from_paths(FONT_SEARCH_PATHS).map(Arc::new);
        if self.fallback.is_none() {
            warn_once(
                "fonts",
                &format!(
                    "no system font found in {} locations; text without a typeface will not be drawn",
                    FONT_SEARCH_PATHS.len()
                ),
            );
        }
        self
    }

    /// Use `bytes` as the face for runs without a typeface handle.
    ///
    /// # Errors
    ///
    /// [`Error::FontUnavailable`] if the bytes are not a usable font.
    pub fn with_fallback_bytes(mut self, bytes: Vec<u8>) -> Result<Self> {
        self.fallback = Some(Arc::new(parse_font(bytes, "<fallback>")?));
        Ok(self)
    }

    /// The folder descriptors are resolved against, if any.
    #[must_use]
    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    /// Whether a fallback face is available.
    #[must_use]
    pub const fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Register a typeface from raw font bytes and return its handle.
    ///
    /// # Errors
    ///
    /// [`Error::FontUnavailable`] if the bytes are not a usable font.
    pub fn register(&self, bytes: Vec<u8>) -> Result<FontHandle> {
        let font = parse_font(bytes, "<registered typeface>")?;
        let mut faces = self.faces.write().unwrap_or_else(PoisonError::into_inner);
        Ok(push_face(&mut faces, font))
    }

    /// Number of faces loaded so far (the fallback face not included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.faces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .faces
            .len()
    }

    /// Whether no face has been loaded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The face drawn for `handle`: the registered face, or the fallback
    /// face when `handle` is `None` or unknown.
    #[must_use]
    pub fn font(&self, handle: Option<FontHandle>) -> Option<Arc<Font>> {
        handle
            .and_then(|handle| {
                let faces = self.faces.read().unwrap_or_else(PoisonError::into_inner);
                usize::try_from(handle.id())
                    .ok()
                    .and_then(|index| faces.faces.get(index).cloned())
            })
            .or_else(|| self.fallback.clone())
    }

    fn load_from_folder(&self, descriptor: &FontDescriptor) -> Result<Font> {
        let unavailable = |reason: String| Error::FontUnavailable {
            descriptor: descriptor.to_string(),
            reason,
        };
        let folder = self
            .folder
            .as_ref()
            .ok_or_else(|| unavailable("no font folder configured".to_string()))?;

        let candidates = [
            folder.join(descriptor.file_name()),
            folder.join(format!("{}.ttf", descriptor.name)),
        ];
        let (path, bytes) = candidates
            .iter()
            .find_map(|path| fs::read(path).ok().map(|bytes| (path, bytes)))
            .ok_or_else(|| {
                unavailable(format!(
                    "neither '{}' nor '{}' could be read",
                    candidates[0].display(),
                    candidates[1].display()
                ))
            })?;

        debug!("loading font {descriptor} from {}", path.display());
        parse_font(bytes, &descriptor.to_string())
    }
}

impl FontLoader for FontRegistry {
    fn load(&self, descriptor: &FontDescriptor) -> Result<FontHandle> {
        if let Some(handle) = self
            .faces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_descriptor
            .get(descriptor)
        {
            return Ok(*handle);
        }

        let font = self.load_from_folder(descriptor)?;
        let mut faces = self.faces.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have loaded the same descriptor meanwhile.
        if let Some(handle) = faces.by_descriptor.get(descriptor) {
            return Ok(*handle);
        }
        let handle = push_face(&mut faces, font);
        let _ = faces.by_descriptor.insert(descriptor.clone(), handle);
        Ok(handle)
    }
}

impl FontMetrics for FontRegistry {
    fn text_width(&self, text: &str, face: &FontFace) -> f32 {
        let Some(font) = self.font(face.handle) else {
            warn_once(
                "fonts",
                "no typeface available; measuring text with approximate metrics",
            );
            return ApproximateFontMetrics.text_width(text, face);
        };
        let size = face.pixel_size();
        // Matches the cursor advance in the rasterizer.
        text.chars()
            .filter(|ch| !ch.is_control())
            .map(|ch| font.metrics(ch, size).advance_width)
            .sum()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn push_face(faces: &mut Faces, font: Font) -> FontHandle {
    let handle = FontHandle::new(faces.faces.len() as u32);
    faces.faces.push(Arc::new(font));
    handle
}

fn parse_font(bytes: Vec<u8>, label: &str) -> Result<Font> {
    Font::from_bytes(bytes, FontSettings::default()).map_err(|reason| Error::FontUnavailable {
        descriptor: label.to_string(),
        reason: reason.to_string(),
    })
}

/// Try to load a font from a list of filesystem paths.
fn load_font_from_paths(paths: &[&str]) -> Option<Font> {
    paths.iter().find_map(|path| {
        let font = fs::read(path)
            .ok()
            .and_then(|data| Font::from_bytes(data, FontSettings::default()).ok())?;
        debug!("loaded fallback font: {path}");
        Some(font)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_folder_is_unavailable() {
        let registry = FontRegistry::new();
        let err = registry.load(&FontDescriptor::new("Roboto")).unwrap_err();
        assert!(matches!(err, Error::FontUnavailable { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn missing_file_names_both_candidates() {
        let registry = FontRegistry::new().with_folder("/definitely/not/here");
        let Error::FontUnavailable { reason, .. } =
            registry.load(&FontDescriptor::new("Roboto")).unwrap_err()
        else {
            panic!("expected FontUnavailable");
        };
        assert!(reason.contains("Robotosr.ttf"));
        assert!(reason.contains("Roboto.ttf"));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let registry = FontRegistry::new();
        assert!(registry.register(vec![0, 1, 2, 3]).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn no_face_measures_approximately() {
        let registry = FontRegistry::new();
        let face = FontFace {
            handle: None,
            size: 10.0,
            dpi: None,
        };
        assert!((registry.text_width("abcde", &face) - 30.0).abs() < 1e-3);
        assert!(registry.font(None).is_none());
    }
}
