//! Integration tests for box model, cell, image, and table layout.
//!
//! Text is measured with `ApproximateFontMetrics` at size 10 (6px per
//! character) and a line height of 1.2 (12px per line).

use std::cell::{Cell as Counter, RefCell};
use std::collections::HashMap;
use std::sync::Arc;

use quickcheck_macros::quickcheck;
use tabula_common::image::LoadedImage;
use tabula_layout::layout::image::{ImageFlow, place};
use tabula_layout::{
    Align, ApproximateFontMetrics, Border, Cell, Color, DisplayCommand, Edges, Error, Font, Image,
    ImageCache, ImageSource, LayoutContext, Point, Rect, ResolvedImage, Row, Size, Style,
    StyleDefaults, Table, VAlign, compose,
};

const METRICS: ApproximateFontMetrics = ApproximateFontMetrics;

/// No margin, border, or padding; 10pt text, 12px lines.
fn bare_style() -> Style {
    Style {
        color: Some(Color::BLACK),
        border: Some(Border::none()),
        margin: Some(Edges::ZERO),
        padding: Some(Edges::ZERO),
        line_height: Some(1.2),
        align: Some(Align::Left),
        valign: Some(VAlign::Top),
        font: Some(Font::sized(10.0)),
        ..Style::default()
    }
}

fn bare_defaults() -> StyleDefaults {
    StyleDefaults {
        body: bare_style(),
        caption: bare_style(),
        footer: bare_style(),
    }
}

fn build(rows: &[Row]) -> Table {
    Table::build(
        rows,
        None,
        None,
        &bare_defaults(),
        &LayoutContext::new(&METRICS),
    )
    .unwrap()
}

fn solid(width: u32, height: u32) -> Arc<LoadedImage> {
    Arc::new(LoadedImage::solid(width, height, [255, 0, 0, 255]))
}

fn text_origins(commands: &[DisplayCommand]) -> Vec<(String, Point)> {
    commands
        .iter()
        .filter_map(|command| match command {
            DisplayCommand::DrawText { origin, text, .. } => Some((text.clone(), *origin)),
            _ => None,
        })
        .collect()
}

fn image_origins(commands: &[DisplayCommand]) -> Vec<Point> {
    commands
        .iter()
        .filter_map(|command| match command {
            DisplayCommand::DrawImage { origin, .. } => Some(*origin),
            _ => None,
        })
        .collect()
}

// Box model

#[test]
fn test_inner_bounds_stack_all_insets() {
    let style = Style {
        margin: Some(Edges::new(1, 2, 3, 4)),
        border: Some(Border::uniform(tabula_layout::Line::new(Color::BLACK, 1))),
        padding: Some(Edges::symmetric(5, 6)),
        ..Style::default()
    };

    assert_eq!(style.border_size(), Size::new(2 + 4 + 2 + 10, 1 + 3 + 2 + 12));
    assert_eq!(style.inner_start(), Point::new(4 + 1 + 5, 1 + 1 + 6));
    assert_eq!(style.inner_end(), Point::new(2 + 1 + 5, 3 + 1 + 6));
    assert_eq!(
        style.inner_bounds(Rect::new(100, 100, 50, 40)),
        Rect::new(110, 108, 50 - 18, 40 - 18)
    );
}

#[test]
fn test_missing_insets_count_as_zero() {
    let style = Style::default();
    assert_eq!(style.border_size(), Size::ZERO);
    let outer = Rect::new(3, 4, 5, 6);
    assert_eq!(style.inner_bounds(outer), outer);
}

#[quickcheck]
fn prop_inner_bounds_shrink_by_border_size(
    insets: (u8, u8, u8, u8),
    border: u8,
    extra: (u8, u8),
    origin: (i16, i16),
) -> bool {
    let style = Style {
        margin: Some(Edges::uniform(i32::from(border % 7))),
        border: Some(Border::none().with_width(i32::from(border % 5))),
        padding: Some(Edges::new(
            i32::from(insets.0),
            i32::from(insets.1),
            i32::from(insets.2),
            i32::from(insets.3),
        )),
        ..Style::default()
    };
    let min = style.border_size();
    let outer = Rect::new(
        i32::from(origin.0),
        i32::from(origin.1),
        min.width + i32::from(extra.0),
        min.height + i32::from(extra.1),
    );
    style.inner_bounds(outer).size() == outer.size() - style.border_size()
}

// Cells

#[test]
fn test_text_cell_size() {
    let table = build(&[Row::from_iter(["hello"])]);
    assert_eq!(table.size(), Size::new(30, 12));
}

#[test]
fn test_single_line_cell_at_13pt() {
    let cell = Cell::new("Id").with_style(Style {
        font: Some(Font::sized(13.0)),
        ..Style::default()
    });
    let defaults = StyleDefaults {
        body: bare_style(),
        ..StyleDefaults::default()
    };
    let table = Table::build(
        &[Row::new(vec![cell])],
        None,
        None,
        &defaults,
        &LayoutContext::new(&METRICS),
    )
    .unwrap();

    // 2 × 13 × 0.6 = 15.6 → 15px wide; round(13 × 1.2) = 16px tall.
    assert_eq!(table.column_widths(), [15]);
    assert_eq!(table.row_heights(), [16]);
}

#[test]
fn test_cell_without_font_is_empty() {
    let defaults = StyleDefaults {
        body: Style {
            font: None,
            ..bare_style()
        },
        ..bare_defaults()
    };
    let table = Table::build(
        &[Row::from_iter(["invisible"])],
        None,
        None,
        &defaults,
        &LayoutContext::new(&METRICS),
    )
    .unwrap();
    assert_eq!(table.size(), Size::ZERO);
}

#[test]
fn test_max_width_wraps_cell_text() {
    let cell = Cell::new("aaa bbb").with_style(Style {
        max_width: Some(24),
        ..Style::default()
    });
    let table = build(&[Row::new(vec![cell])]);
    // "aaa " fits in 24px, "bbb" moves to the second line.
    assert_eq!(table.size(), Size::new(24, 24));
}

#[test]
fn test_cell_insets_add_to_size() {
    let cell = Cell::new("ab").with_style(Style {
        padding: Some(Edges::symmetric(3, 4)),
        border: Some(Border::uniform(tabula_layout::Line::new(Color::BLACK, 1))),
        ..Style::default()
    });
    let table = build(&[Row::new(vec![cell])]);
    assert_eq!(table.size(), Size::new(12 + 6 + 2, 12 + 8 + 2));
}

// Table grid

#[test]
fn test_columns_and_rows_take_independent_maxima() {
    let rows = [
        Row::from_iter(["a", "bbb"]),
        Row::from_iter(["cc"]),
        Row::new(vec![Cell::new("x\ny")]),
    ];
    let table = build(&rows);

    assert_eq!(table.column_widths(), [12, 18]);
    assert_eq!(table.row_heights(), [12, 12, 24]);
    assert_eq!(table.size(), Size::new(30, 48));
    assert_eq!(table.cell_bounds(0, 1), Some(Rect::new(12, 0, 18, 12)));
    assert_eq!(table.cell_bounds(2, 0), Some(Rect::new(0, 24, 12, 24)));
    // The grid defines bounds even where a short row has no cell.
    assert_eq!(table.cell_bounds(1, 1), Some(Rect::new(12, 12, 18, 12)));
    assert_eq!(table.cell_bounds(3, 0), None);
    assert_eq!(table.cell_bounds(0, 2), None);
}

#[test]
fn test_row_style_cascades_to_cells() {
    let row = Row::from_iter(["ab", "cd"]).with_style(Style {
        padding: Some(Edges::uniform(2)),
        ..Style::default()
    });
    let table = build(&[row]);
    assert_eq!(table.column_widths(), [16, 16]);
    assert!(
        table.rows()[0]
            .iter()
            .all(|cell| cell.style.padding == Some(Edges::uniform(2)))
    );
}

#[test]
fn test_caption_wraps_to_table_width() {
    let rows = [Row::from_iter(["aa", "bbb"])];
    let caption = Cell::new("aaaa bbbb");
    let table = Table::build(
        &rows,
        Some(&caption),
        None,
        &bare_defaults(),
        &LayoutContext::new(&METRICS),
    )
    .unwrap();

    assert_eq!(table.caption().and_then(|c| c.style.max_width), Some(30));
    assert_eq!(table.caption_size(), Size::new(30, 24));
    assert_eq!(table.size(), Size::new(30, 36));
}

#[test]
fn test_unbreakable_caption_widens_table() {
    let rows = [Row::from_iter(["aa"])];
    let caption = Cell::new("abcdefghij");
    let footer = Cell::new("xyz");
    let table = Table::build(
        &rows,
        Some(&caption),
        Some(&footer),
        &bare_defaults(),
        &LayoutContext::new(&METRICS),
    )
    .unwrap();

    assert_eq!(table.caption_size(), Size::new(60, 12));
    // The footer is clamped against the widened table.
    assert_eq!(table.footer().and_then(|c| c.style.max_width), Some(60));
    assert_eq!(table.size(), Size::new(60, 36));
}

#[test]
fn test_explicit_caption_max_width_is_kept_when_smaller() {
    let caption = Cell::new("aa bb").with_style(Style {
        max_width: Some(18),
        ..Style::default()
    });
    let table = Table::build(
        &[Row::from_iter(["aaaaaaaaaa"])],
        Some(&caption),
        None,
        &bare_defaults(),
        &LayoutContext::new(&METRICS),
    )
    .unwrap();
    assert_eq!(table.caption().and_then(|c| c.style.max_width), Some(18));
    assert_eq!(table.caption_size(), Size::new(18, 24));
}

#[quickcheck]
fn prop_table_is_at_least_as_wide_as_its_parts(cells: Vec<Vec<u8>>, caption: u8, footer: u8) -> bool {
    let rows: Vec<Row> = cells
        .iter()
        .map(|row| {
            row.iter()
                .map(|n| "x".repeat(usize::from(*n % 12)))
                .map(Cell::new)
                .collect()
        })
        .collect();
    let caption = Cell::new("c".repeat(usize::from(caption % 30)));
    let footer = Cell::new("f".repeat(usize::from(footer % 30)));
    let table = Table::build(
        &rows,
        Some(&caption),
        Some(&footer),
        &bare_defaults(),
        &LayoutContext::new(&METRICS),
    )
    .unwrap();

    let width = table.size().width;
    table.column_widths().iter().all(|w| width >= *w)
        && width >= table.caption_size().width
        && width >= table.footer_size().width
}

// Images

#[test]
fn test_natural_size_fills_missing_axis_with_half_even_rounding() {
    let image = Image::from_data(solid(10, 5)).with_size(5, 0);
    let resolved = ResolvedImage::new(&image, solid(10, 5));
    // 5 × 0.5 = 2.5 rounds to even.
    assert_eq!(resolved.size(), Size::new(5, 2));

    let resolved = ResolvedImage::new(&Image::from_data(solid(10, 5)), solid(10, 5));
    assert_eq!(resolved.size(), Size::new(10, 5));
    assert!((resolved.scale() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_fit_downscales_once() {
    let image = Image::from_data(solid(200, 100)).with_padding(Edges::horizontal(5));
    let mut resolved = ResolvedImage::new(&image, solid(200, 100));
    assert_eq!(resolved.bound_size(), Size::new(210, 100));

    assert_eq!(resolved.fit(Some(60)), Size::new(60, 25));
    assert_eq!(resolved.size(), Size::new(50, 25));
    assert_eq!(resolved.fit(Some(60)), Size::new(60, 25));
    assert!((resolved.scale() - 0.25).abs() < f64::EPSILON);

    // A wider limit or no limit leaves the fitted size alone.
    assert_eq!(resolved.fit(Some(1000)), Size::new(60, 25));
    assert_eq!(resolved.fit(None), Size::new(60, 25));
}

#[test]
fn test_image_flow_is_decided_by_image_alignment() {
    let image = Image::default();
    assert_eq!(image.flow(), ImageFlow::Detached);
    assert_eq!(image.clone().with_align(Align::Left).flow(), ImageFlow::Left);
    assert_eq!(image.clone().with_align(Align::Center).flow(), ImageFlow::Detached);
    assert_eq!(
        image.clone().with_align(Align::Right).with_valign(VAlign::Bottom).flow(),
        ImageFlow::Below
    );
    assert_eq!(image.with_valign(VAlign::Middle).flow(), ImageFlow::Detached);
}

#[test]
fn test_image_left_of_right_aligned_text() {
    let cell = Cell::new("ab")
        .with_image(Image::from_data(solid(20, 10)).with_align(Align::Left))
        .with_style(Style {
            align: Some(Align::Right),
            ..Style::default()
        });
    let mut table = build(&[Row::new(vec![cell])]);
    assert_eq!(table.size(), Size::new(32, 12));

    let composition = compose(&mut table, &bare_style(), &METRICS);
    let commands = composition.display_list.commands();
    assert_eq!(image_origins(commands), [Point::new(0, 0)]);
    assert_eq!(text_origins(commands), [("ab".to_string(), Point::new(20, 0))]);

    let placement = place(
        ImageFlow::Left,
        Size::new(20, 10),
        Edges::ZERO,
        Align::Right,
        VAlign::Top,
        12,
        Rect::new(0, 0, 32, 12),
        0,
    );
    assert_eq!(placement.text_offset_x, 20);
}

#[test]
fn test_centered_text_beside_left_image_centers_in_the_free_area() {
    let cell = Cell::new("ab")
        .with_image(Image::from_data(solid(20, 10)).with_align(Align::Left))
        .with_style(Style {
            align: Some(Align::Center),
            ..Style::default()
        });
    let mut table = build(&[Row::new(vec![cell]), Row::from_iter(["abcdefghij"])]);
    assert_eq!(table.column_widths(), [60]);

    let composition = compose(&mut table, &bare_style(), &METRICS);
    let commands = composition.display_list.commands();
    assert_eq!(image_origins(commands), [Point::new(0, 0)]);
    // The free area starts after the image: 20 + (60 - 20 - 12) / 2 = 34.
    // Centering over the whole inner width would put the text at 14, on
    // top of the image.
    assert_eq!(text_origins(commands)[0], ("ab".to_string(), Point::new(34, 0)));
}

#[test]
fn test_image_right_reserves_space_for_right_aligned_text() {
    let cell = Cell::new("ab")
        .with_image(Image::from_data(solid(20, 30)).with_align(Align::Right))
        .with_style(Style {
            align: Some(Align::Right),
            valign: Some(VAlign::Middle),
            ..Style::default()
        });
    let mut table = build(&[Row::new(vec![cell])]);
    assert_eq!(table.size(), Size::new(32, 30));

    let composition = compose(&mut table, &bare_style(), &METRICS);
    let commands = composition.display_list.commands();
    assert_eq!(image_origins(commands), [Point::new(12, 0)]);
    // Text is centered vertically on its own: (30 - 12) / 2 = 9.
    assert_eq!(text_origins(commands), [("ab".to_string(), Point::new(0, 9))]);
}

#[test]
fn test_image_above_centered_text() {
    let cell = Cell::new("ab")
        .with_image(
            Image::from_data(solid(40, 10))
                .with_valign(VAlign::Top)
                .with_padding(Edges::uniform(1)),
        )
        .with_style(Style {
            align: Some(Align::Center),
            ..Style::default()
        });
    let mut table = build(&[Row::new(vec![cell])]);
    assert_eq!(table.size(), Size::new(42, 12 + 12));

    let composition = compose(&mut table, &bare_style(), &METRICS);
    let commands = composition.display_list.commands();
    assert_eq!(image_origins(commands), [Point::new(1, 1)]);
    assert_eq!(text_origins(commands), [("ab".to_string(), Point::new(15, 12))]);
}

#[test]
fn test_image_below_text() {
    let cell = Cell::new("ab")
        .with_image(Image::from_data(solid(10, 10)).with_valign(VAlign::Bottom));
    let mut table = build(&[Row::new(vec![cell])]);
    assert_eq!(table.size(), Size::new(12, 22));

    let composition = compose(&mut table, &bare_style(), &METRICS);
    let commands = composition.display_list.commands();
    assert_eq!(image_origins(commands), [Point::new(0, 12)]);
    assert_eq!(text_origins(commands), [("ab".to_string(), Point::new(0, 0))]);
}

#[test]
fn test_detached_image_reserves_no_space() {
    let cell = Cell::new("ab").with_image(
        Image::from_data(solid(50, 50)).with_padding(Edges::new(2, 0, 0, 3)),
    );
    let mut table = build(&[Row::new(vec![cell])]);
    assert_eq!(table.size(), Size::new(12, 12));

    let composition = compose(&mut table, &bare_style(), &METRICS);
    assert_eq!(
        image_origins(composition.display_list.commands()),
        [Point::new(3, 2)]
    );
}

#[test]
fn test_stacked_image_is_fitted_to_max_width() {
    let cell = Cell::new("ab")
        .with_image(Image::from_data(solid(200, 100)).with_valign(VAlign::Top))
        .with_style(Style {
            max_width: Some(50),
            ..Style::default()
        });
    let mut table = build(&[Row::new(vec![cell])]);
    assert_eq!(table.size(), Size::new(50, 25 + 12));

    let image = table.rows()[0][0].image.clone().unwrap();
    assert_eq!(image.size(), Size::new(50, 25));

    // Painting fits again and must not shrink further.
    let _ = compose(&mut table, &bare_style(), &METRICS);
    assert_eq!(table.rows()[0][0].image.as_ref().unwrap().size(), Size::new(50, 25));
}

#[test]
fn test_shared_image_is_fitted_per_cell() {
    let image = Image::from_data(solid(100, 100)).with_valign(VAlign::Top);
    let narrow = Cell::new("")
        .with_image(image.clone())
        .with_style(Style {
            max_width: Some(20),
            ..Style::default()
        });
    let wide = Cell::new("").with_image(image.clone());
    let table = build(&[Row::new(vec![narrow, wide])]);

    assert_eq!(table.column_widths(), [20, 100]);
    assert_eq!(image.size, Size::ZERO);
}

// Image acquisition

#[derive(Default)]
struct CountingSource {
    fetches: Counter<u32>,
}

impl ImageSource for CountingSource {
    fn fetch(&self, url: &str) -> tabula_layout::Result<LoadedImage> {
        self.fetches.set(self.fetches.get() + 1);
        if url.ends_with(".broken") {
            return Err(Error::ImageFetchFailed {
                url: url.to_string(),
                reason: "decode error".to_string(),
            });
        }
        Ok(LoadedImage::solid(8, 4, [0, 0, 255, 255]))
    }
}

#[derive(Default)]
struct MapCache {
    images: RefCell<HashMap<String, Arc<LoadedImage>>>,
    read_only: bool,
}

impl ImageCache for MapCache {
    fn get(&self, url: &str) -> Option<Arc<LoadedImage>> {
        self.images.borrow().get(url).cloned()
    }

    fn set(&self, url: &str, image: Arc<LoadedImage>) -> tabula_layout::Result<()> {
        if self.read_only {
            return Err(Error::CacheWriteFailed {
                url: url.to_string(),
                reason: "read-only cache".to_string(),
            });
        }
        let _ = self.images.borrow_mut().insert(url.to_string(), image);
        Ok(())
    }
}

fn image_row(url: &str) -> Row {
    Row::new(vec![Cell::new("").with_image(Image::new(url).with_valign(VAlign::Top))])
}

#[test]
fn test_url_without_source_fails() {
    let err = Table::build(
        &[image_row("https://example.com/a.png")],
        None,
        None,
        &bare_defaults(),
        &LayoutContext::new(&METRICS),
    )
    .unwrap_err();
    assert!(matches!(err, Error::ImageFetchFailed { .. }), "{err}");
}

#[test]
fn test_fetch_failure_aborts_build() {
    let source = CountingSource::default();
    let context = LayoutContext::new(&METRICS).with_images(&source);
    let result = Table::build(
        &[image_row("a.png"), image_row("b.broken"), image_row("c.png")],
        None,
        None,
        &bare_defaults(),
        &context,
    );
    assert!(matches!(result, Err(Error::ImageFetchFailed { .. })));
    assert_eq!(source.fetches.get(), 2);
}

#[test]
fn test_fetched_images_are_cached() {
    let source = CountingSource::default();
    let cache = MapCache::default();
    let context = LayoutContext::new(&METRICS)
        .with_images(&source)
        .with_cache(&cache);

    let table = Table::build(
        &[image_row("a.png"), image_row("a.png")],
        None,
        None,
        &bare_defaults(),
        &context,
    )
    .unwrap();

    assert_eq!(source.fetches.get(), 1);
    assert!(cache.images.borrow().contains_key("a.png"));
    assert_eq!(table.row_heights(), [4 + 12, 4 + 12]);
    assert!(table.cache_errors().is_empty());
}

#[test]
fn test_cache_write_failure_is_deferred() {
    let source = CountingSource::default();
    let cache = MapCache {
        read_only: true,
        ..MapCache::default()
    };
    let context = LayoutContext::new(&METRICS)
        .with_images(&source)
        .with_cache(&cache);

    let mut table = Table::build(&[image_row("a.png")], None, None, &bare_defaults(), &context)
        .unwrap();

    assert_eq!(table.column_widths(), [8]);
    let errors = table.take_cache_errors();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::CacheWriteFailed { .. }));
    assert!(table.cache_errors().is_empty());
}

#[test]
fn test_attached_data_skips_cache_and_source() {
    let source = CountingSource::default();
    let cache = MapCache::default();
    let context = LayoutContext::new(&METRICS)
        .with_images(&source)
        .with_cache(&cache);
    let mut image = Image::new("a.png").with_valign(VAlign::Top);
    image.data = Some(solid(3, 3));

    let table = Table::build(
        &[Row::new(vec![Cell::new("").with_image(image)])],
        None,
        None,
        &bare_defaults(),
        &context,
    )
    .unwrap();
    assert_eq!(source.fetches.get(), 0);
    assert!(cache.images.borrow().is_empty());
    assert_eq!(table.column_widths(), [3]);
}
