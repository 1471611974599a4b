//! Style value types: colors, alignment, insets, and borders.

pub mod color;

pub use color::{Color, InvalidColor};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::layout::box_model::Size;

/// Horizontal alignment of a cell's content, or of an image beside text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(try_from = "String", into = "String")]
pub enum Align {
    /// Flush with the left inner edge.
    Left,
    /// Flush with the right inner edge.
    Right,
    /// Centered between the inner edges.
    Center,
}

/// Vertical alignment of a cell's content, or of an image above/below text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(try_from = "String", into = "String")]
pub enum VAlign {
    /// Flush with the top inner edge.
    Top,
    /// Flush with the bottom inner edge.
    Bottom,
    /// Centered between the top and bottom inner edges.
    Middle,
}

macro_rules! string_conversions {
    ($($ty:ty),*) => {$(
        impl TryFrom<String> for $ty {
            type Error = strum::ParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.to_string()
            }
        }
    )*};
}

string_conversions!(Align, VAlign);

/// Four integer insets, used for margin and padding.
///
/// Insets accumulate independently per edge when margin, border, and padding
/// are stacked (see [`Edges::add`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Edges {
    /// Top inset in pixels.
    pub top: i32,
    /// Right inset in pixels.
    pub right: i32,
    /// Bottom inset in pixels.
    pub bottom: i32,
    /// Left inset in pixels.
    pub left: i32,
}

impl Edges {
    /// No inset on any edge.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Insets in CSS order: top, right, bottom, left.
    #[must_use]
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same inset on all four edges.
    #[must_use]
    pub const fn uniform(inset: i32) -> Self {
        Self::new(inset, inset, inset, inset)
    }

    /// Left and right only.
    #[must_use]
    pub const fn horizontal(x: i32) -> Self {
        Self::new(0, x, 0, x)
    }

    /// Top and bottom only.
    #[must_use]
    pub const fn vertical(y: i32) -> Self {
        Self::new(y, 0, y, 0)
    }

    /// `x` on left/right, `y` on top/bottom.
    #[must_use]
    pub const fn symmetric(x: i32, y: i32) -> Self {
        Self::new(y, x, y, x)
    }

    /// Edge-wise sum.
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self::new(
            self.top + other.top,
            self.right + other.right,
            self.bottom + other.bottom,
            self.left + other.left,
        )
    }

    /// Total horizontal and vertical extent: `(left + right, top + bottom)`.
    #[must_use]
    pub const fn size(self) -> Size {
        Size::new(self.left + self.right, self.top + self.bottom)
    }
}

/// One border edge. A width of 0 means the edge is not drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Line {
    /// Stroke color. An edge without a color is not drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Stroke width in pixels.
    pub width: i32,
}

impl Line {
    /// A visible edge.
    #[must_use]
    pub const fn new(color: Color, width: i32) -> Self {
        Self {
            color: Some(color),
            width,
        }
    }

    /// Whether this edge produces any pixels.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.width > 0 && self.color.is_some()
    }
}

/// Four independently colored and sized border edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Border {
    /// Top edge.
    pub top: Line,
    /// Right edge.
    pub right: Line,
    /// Bottom edge.
    pub bottom: Line,
    /// Left edge.
    pub left: Line,
}

impl Border {
    /// The same line on all four edges.
    #[must_use]
    pub const fn uniform(line: Line) -> Self {
        Self {
            top: line,
            right: line,
            bottom: line,
            left: line,
        }
    }

    /// An explicit "no border": every edge has width 0.
    ///
    /// This is distinct from an absent border, which inherits.
    #[must_use]
    pub const fn none() -> Self {
        Self::uniform(Line {
            color: None,
            width: 0,
        })
    }

    /// Recolor every edge.
    #[must_use]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.top.color = Some(color);
        self.right.color = Some(color);
        self.bottom.color = Some(color);
        self.left.color = Some(color);
        self
    }

    /// Resize every edge.
    #[must_use]
    pub const fn with_width(mut self, width: i32) -> Self {
        self.top.width = width;
        self.right.width = width;
        self.bottom.width = width;
        self.left.width = width;
        self
    }

    /// Edge widths as insets.
    #[must_use]
    pub const fn edges(&self) -> Edges {
        Edges::new(
            self.top.width,
            self.right.width,
            self.bottom.width,
            self.left.width,
        )
    }

    /// Total horizontal and vertical border extent.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.edges().size()
    }
}
