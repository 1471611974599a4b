//! Table layout: cascade every cell, then size the grid.
//!
//! Column widths and row heights are independent maxima: a column is as wide
//! as its widest cell, a row as tall as its tallest cell. Rows with fewer
//! cells than the widest row leave the remaining columns alone.
//!
//! ```text
//!            col 0     col 1     col 2
//!          ┌─────────┬─────────┬─────────┐
//!  caption │ spans the table width       │
//!          ├─────────┼─────────┼─────────┤
//!  row 0   │ (0, 0)  │ (0, 1)  │ (0, 2)  │
//!          ├─────────┼─────────┼─────────┤
//!  row 1   │ (1, 0)  │ (1, 1)  │         │
//!          ├─────────┴─────────┴─────────┤
//!  footer  │ spans the table width       │
//!          └─────────────────────────────┘
//! ```

use log::debug;

use super::LayoutContext;
use super::box_model::{Rect, Size};
use super::cell::{Cell, ResolvedCell, Row};
use crate::error::{Error, Result};
use crate::style::{Style, StyleDefaults};

/// A laid-out table. Built fresh for every render and discarded afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    rows: Vec<Vec<ResolvedCell>>,
    caption: Option<ResolvedCell>,
    footer: Option<ResolvedCell>,
    column_widths: Vec<i32>,
    row_heights: Vec<i32>,
    caption_size: Size,
    footer_size: Size,
    cache_errors: Vec<Error>,
}

impl Table {
    /// Resolve styles and images for every cell and size the grid.
    ///
    /// Row styles cascade from `defaults.body`, cell styles from their row;
    /// the caption and footer cascade from their own defaults. Caption and
    /// footer max widths are clamped to the table width (minus their own
    /// insets) when unset or wider than that.
    ///
    /// # Errors
    ///
    /// The first [`Error::FontUnavailable`] or [`Error::ImageFetchFailed`]
    /// aborts the build. Cache write failures do not; see
    /// [`Table::cache_errors`].
    pub fn build(
        rows: &[Row],
        caption: Option<&Cell>,
        footer: Option<&Cell>,
        defaults: &StyleDefaults,
        context: &LayoutContext<'_>,
    ) -> Result<Self> {
        let columns = rows.iter().map(|row| row.cells.len()).max().unwrap_or(0);
        let mut table = Self {
            rows: Vec::with_capacity(rows.len()),
            caption: None,
            footer: None,
            column_widths: vec![0; columns],
            row_heights: vec![0; rows.len()],
            caption_size: Size::ZERO,
            footer_size: Size::ZERO,
            cache_errors: Vec::new(),
        };

        for (row_index, row) in rows.iter().enumerate() {
            let row_style = row
                .style
                .as_ref()
                .unwrap_or(&Style::default())
                .inherit(&defaults.body, context.fonts)?;

            let mut cells = Vec::with_capacity(row.cells.len());
            for (column, cell) in row.cells.iter().enumerate() {
                let mut resolved = cell.resolve(&row_style, context, &mut table.cache_errors)?;
                let size = resolved.size(context.metrics);
                table.column_widths[column] = table.column_widths[column].max(size.width);
                table.row_heights[row_index] = table.row_heights[row_index].max(size.height);
                cells.push(resolved);
            }
            table.rows.push(cells);
        }

        if let Some(caption) = caption {
            let (cell, size) = table.resolve_span(caption, &defaults.caption, context)?;
            table.caption = Some(cell);
            table.caption_size = size;
        }
        if let Some(footer) = footer {
            let (cell, size) = table.resolve_span(footer, &defaults.footer, context)?;
            table.footer = Some(cell);
            table.footer_size = size;
        }

        debug!(
            "table layout: columns {:?}, rows {:?}, caption {:?}, footer {:?}",
            table.column_widths, table.row_heights, table.caption_size, table.footer_size
        );
        Ok(table)
    }

    /// Resolve a caption or footer cell against the current table width.
    fn resolve_span(
        &mut self,
        cell: &Cell,
        default: &Style,
        context: &LayoutContext<'_>,
    ) -> Result<(ResolvedCell, Size)> {
        let mut resolved = cell.resolve(default, context, &mut self.cache_errors)?;

        let available = self.size().width - resolved.style.border_size().width;
        let unset = resolved.style.content_limit().is_none();
        if unset || resolved.style.max_width.is_some_and(|max| max > available) {
            resolved.style.max_width = Some(available);
        }

        let size = resolved.size(context.metrics);
        Ok((resolved, size))
    }

    /// Overall size: the widest of rows, caption, and footer, and the sum of
    /// their heights.
    #[must_use]
    pub fn size(&self) -> Size {
        let rows = self.rows_size();
        Size::new(
            rows.width
                .max(self.caption_size.width)
                .max(self.footer_size.width),
            rows.height + self.caption_size.height + self.footer_size.height,
        )
    }

    /// Size of the cell grid alone.
    #[must_use]
    pub fn rows_size(&self) -> Size {
        Size::new(
            self.column_widths.iter().sum(),
            self.row_heights.iter().sum(),
        )
    }

    /// Bounds of the cell at (`row`, `column`) relative to the top-left of
    /// the grid, or `None` outside the grid.
    #[must_use]
    pub fn cell_bounds(&self, row: usize, column: usize) -> Option<Rect> {
        let width = *self.column_widths.get(column)?;
        let height = *self.row_heights.get(row)?;
        let x = self.column_widths[..column].iter().sum();
        let y = self.row_heights[..row].iter().sum();
        Some(Rect::new(x, y, width, height))
    }

    /// Resolved widths, one per column.
    #[must_use]
    pub fn column_widths(&self) -> &[i32] {
        &self.column_widths
    }

    /// Resolved heights, one per row.
    #[must_use]
    pub fn row_heights(&self) -> &[i32] {
        &self.row_heights
    }

    /// Size of the caption, zero without one.
    #[must_use]
    pub const fn caption_size(&self) -> Size {
        self.caption_size
    }

    /// Size of the footer, zero without one.
    #[must_use]
    pub const fn footer_size(&self) -> Size {
        self.footer_size
    }

    /// Resolved body cells, row by row.
    #[must_use]
    pub fn rows(&self) -> &[Vec<ResolvedCell>] {
        &self.rows
    }

    /// Mutable access for painting.
    pub(crate) fn parts_mut(
        &mut self,
    ) -> (
        &mut [Vec<ResolvedCell>],
        Option<&mut ResolvedCell>,
        Option<&mut ResolvedCell>,
    ) {
        (
            &mut self.rows,
            self.caption.as_mut(),
            self.footer.as_mut(),
        )
    }

    /// Resolved caption.
    #[must_use]
    pub const fn caption(&self) -> Option<&ResolvedCell> {
        self.caption.as_ref()
    }

    /// Resolved footer.
    #[must_use]
    pub const fn footer(&self) -> Option<&ResolvedCell> {
        self.footer.as_ref()
    }

    /// Image cache writes that failed during the build.
    #[must_use]
    pub fn cache_errors(&self) -> &[Error] {
        &self.cache_errors
    }

    /// Take the recorded cache write failures.
    pub fn take_cache_errors(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.cache_errors)
    }
}
