//! Composer: places caption, rows, and footer on one canvas.
//!
//! ```text
//! (0,0)
//!   ┌──────────────────────────────┐  ◀─ canvas = table size + table insets
//!   │  inner_start                 │
//!   │    ┌────────────────────┐    │
//!   │    │ caption            │    │
//!   │    ├──────┬──────┬──────┤    │
//!   │    │ cell │ cell │ cell │    │  ◀─ rows start below the caption
//!   │    ├──────┴──────┴──────┤    │
//!   │    │ footer             │    │  ◀─ footer starts below the rows
//!   │    └────────────────────┘    │
//!   └──────────────────────────────┘
//! ```

use super::display_list::DisplayList;
use crate::layout::box_model::{Point, Rect, Size};
use crate::layout::table::Table;
use crate::style::Style;
use crate::text::metrics::FontMetrics;

/// A canvas size and the commands that paint it.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Canvas size in pixels.
    pub size: Size,
    /// Drawing commands in painting order.
    pub display_list: DisplayList,
}

/// Lay `table` out on a canvas whose insets come from `style` (the table
/// default style) and produce its display list.
#[must_use]
pub fn compose(table: &mut Table, style: &Style, metrics: &dyn FontMetrics) -> Composition {
    let table_size = table.size();
    let size = table_size + style.border_size();
    let mut list = DisplayList::new();

    if let Some(background) = style.background {
        list.fill_rect(Rect::from_origin_size(Point::ORIGIN, size), background);
    }

    let start = style.inner_start();
    let caption_height = table.caption_size().height;
    let rows_height = table.rows_size().height;
    let footer_height = table.footer_size().height;

    let cell_bounds: Vec<Vec<Rect>> = table
        .rows()
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            (0..cells.len())
                .filter_map(|column| table.cell_bounds(row, column))
                .collect()
        })
        .collect();

    let rows_origin = Point::new(start.x, start.y + caption_height);
    let (rows, caption, footer) = table.parts_mut();

    if let Some(caption) = caption {
        let bounds = Rect::new(start.x, start.y, table_size.width, caption_height);
        caption.paint(bounds, metrics, &mut list);
    }

    for (cells, bounds) in rows.iter_mut().zip(&cell_bounds) {
        for (cell, bounds) in cells.iter_mut().zip(bounds) {
            let bounds = Rect::from_origin_size(bounds.origin() + rows_origin, bounds.size());
            cell.paint(bounds, metrics, &mut list);
        }
    }

    if let Some(footer) = footer {
        let bounds = Rect::new(
            start.x,
            rows_origin.y + rows_height,
            table_size.width,
            footer_height,
        );
        footer.paint(bounds, metrics, &mut list);
    }

    Composition {
        size,
        display_list: list,
    }
}
