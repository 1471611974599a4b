//! Box model geometry.
//!
//! Every styled box (the table, each cell, the caption and footer) is an
//! outer rectangle shrunk by three nested insets:
//!
//! ```text
//! ┌───────────────────────────────┐
//! │            margin             │
//! │   ┌───────────────────────┐   │
//! │   │        border         │   │
//! │   │   ┌───────────────┐   │   │
//! │   │   │    padding    │   │   │
//! │   │   │   ┌───────┐   │   │   │
//! │   │   │   │ inner │   │   │   │
//! │   │   │   └───────┘   │   │   │
//! │   │   └───────────────┘   │   │
//! │   └───────────────────────┘   │
//! └───────────────────────────────┘
//! ```
//!
//! All arithmetic is integer pixels. None of it checks for inversion: an
//! outer rectangle smaller than [`Style::border_size`] yields a degenerate
//! inner rectangle, never an error.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::style::Style;
use crate::style::values::Edges;

/// A position in canvas pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// The canvas origin.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// A point at `(x, y)`.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Size {
    /// Horizontal extent.
    pub width: i32,
    /// Vertical extent.
    pub height: i32,
}

impl Size {
    /// Zero extent on both axes.
    pub const ZERO: Self = Self::new(0, 0);

    /// A size of `width × height`.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Per-axis maximum.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// True when either axis is zero or negative.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

impl Add for Size {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.width + rhs.width, self.height + rhs.height)
    }
}

impl Sub for Size {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.width - rhs.width, self.height - rhs.height)
    }
}

/// An axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Horizontal extent.
    pub width: i32,
    /// Vertical extent.
    pub height: i32,
}

impl Rect {
    /// A rectangle at `(x, y)` of `width × height`.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at `origin` of `size`.
    #[must_use]
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Build from the min and max corners.
    #[must_use]
    pub const fn from_corners(min: Point, max: Point) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Bottom-right corner (exclusive).
    #[must_use]
    pub const fn max(&self) -> Point {
        Point::new(self.max_x(), self.max_y())
    }

    /// Right edge (exclusive).
    #[must_use]
    pub const fn max_x(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[must_use]
    pub const fn max_y(&self) -> i32 {
        self.y + self.height
    }

    /// Width and height.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Shrink by `edges` on each side.
    #[must_use]
    pub const fn inset(&self, edges: Edges) -> Self {
        Self::new(
            self.x + edges.left,
            self.y + edges.top,
            self.width - edges.left - edges.right,
            self.height - edges.top - edges.bottom,
        )
    }
}

impl Style {
    /// Margin, border, and padding stacked into one inset.
    #[must_use]
    pub fn border_padding(&self) -> Edges {
        let margin = self.margin.unwrap_or_default();
        let border = self.border.unwrap_or_default().edges();
        let padding = self.padding.unwrap_or_default();
        margin.add(border).add(padding)
    }

    /// Total horizontal and vertical inset:
    /// `margin + border + padding` on both sides of each axis.
    #[must_use]
    pub fn border_size(&self) -> Size {
        self.border_padding().size()
    }

    /// Offset of the inner area from the outer top-left corner.
    #[must_use]
    pub fn inner_start(&self) -> Point {
        let edges = self.border_padding();
        Point::new(edges.left, edges.top)
    }

    /// Offset of the inner area from the outer bottom-right corner.
    #[must_use]
    pub fn inner_end(&self) -> Point {
        let edges = self.border_padding();
        Point::new(edges.right, edges.bottom)
    }

    /// The content rectangle inside `outer`.
    #[must_use]
    pub fn inner_bounds(&self, outer: Rect) -> Rect {
        outer.inset(self.border_padding())
    }
}
