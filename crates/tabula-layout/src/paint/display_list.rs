//! Display list: the drawing commands a composed table produces.
//!
//! Layout never touches pixels. Painting a table appends commands here in
//! back-to-front order, and a backend replays them onto a canvas.

use std::sync::Arc;

use tabula_common::image::LoadedImage;

use crate::layout::box_model::{Point, Rect};
use crate::style::font::FontFace;
use crate::style::values::Color;

/// A single drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCommand {
    /// Fill and/or stroke a rectangle.
    ///
    /// Backgrounds are fills without a stroke. Border edges are degenerate
    /// (zero-width or zero-height) rectangles stroked along the box edge, so
    /// half of the stroke falls outside the box.
    FillStrokeRect {
        /// Rectangle in canvas pixels.
        rect: Rect,
        /// Interior color.
        fill: Option<Color>,
        /// Outline color.
        stroke: Option<Color>,
        /// Outline width in pixels; 0 disables the stroke.
        stroke_width: i32,
    },

    /// Draw a decoded image with its top-left corner at `origin`, scaled
    /// uniformly by `scale`.
    DrawImage {
        /// Top-left corner in canvas pixels.
        origin: Point,
        /// Pixels to draw.
        image: Arc<LoadedImage>,
        /// Uniform scale applied to the natural size.
        scale: f64,
    },

    /// Draw one run of text.
    ///
    /// `origin` is the top-left of the run's line box; backends place the
    /// baseline one pixel size below it.
    DrawText {
        /// Top-left of the run.
        origin: Point,
        /// Characters to draw.
        text: String,
        /// Glyph color.
        color: Color,
        /// Face and size.
        face: FontFace,
    },
}

/// Drawing commands in painting order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    commands: Vec<DisplayCommand>,
}

impl DisplayList {
    /// Create an empty display list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Add a command to the display list.
    pub fn push(&mut self, command: DisplayCommand) {
        self.commands.push(command);
    }

    /// Fill `rect` with `color`.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(DisplayCommand::FillStrokeRect {
            rect,
            fill: Some(color),
            stroke: None,
            stroke_width: 0,
        });
    }

    /// Stroke the outline of `rect`.
    pub fn stroke_rect(&mut self, rect: Rect, color: Color, width: i32) {
        self.push(DisplayCommand::FillStrokeRect {
            rect,
            fill: None,
            stroke: Some(color),
            stroke_width: width,
        });
    }

    /// Get the commands in painting order.
    #[must_use]
    pub fn commands(&self) -> &[DisplayCommand] {
        &self.commands
    }

    /// Take the commands out of the list.
    #[must_use]
    pub fn into_commands(self) -> Vec<DisplayCommand> {
        self.commands
    }

    /// Get the number of commands.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the display list is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
