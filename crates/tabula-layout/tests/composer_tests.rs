//! Integration tests for composing a table into a display list.

use tabula_layout::{
    Align, ApproximateFontMetrics, Border, Cell, Color, DisplayCommand, Edges, Font, LayoutContext,
    Line, Point, Rect, Row, Size, Style, StyleDefaults, Table, compose,
};

const METRICS: ApproximateFontMetrics = ApproximateFontMetrics;

fn bare_style() -> Style {
    Style {
        color: Some(Color::BLACK),
        border: Some(Border::none()),
        margin: Some(Edges::ZERO),
        padding: Some(Edges::ZERO),
        line_height: Some(1.2),
        font: Some(Font::sized(10.0)),
        ..Style::default()
    }
}

fn text_origins(commands: &[DisplayCommand]) -> Vec<(&str, Point)> {
    commands
        .iter()
        .filter_map(|command| match command {
            DisplayCommand::DrawText { origin, text, .. } => Some((text.as_str(), *origin)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_canvas_includes_table_insets_and_background() {
    let defaults = StyleDefaults {
        body: bare_style(),
        ..StyleDefaults::default()
    };
    let mut table = Table::build(
        &[Row::from_iter(["ab"])],
        None,
        None,
        &defaults,
        &LayoutContext::new(&METRICS),
    )
    .unwrap();

    let style = Style {
        background: Some(Color::WHITE),
        ..Style::table_default()
    };
    let composition = compose(&mut table, &style, &METRICS);

    assert_eq!(composition.size, Size::new(12 + 22, 12 + 22));
    assert_eq!(
        composition.display_list.commands()[0],
        DisplayCommand::FillStrokeRect {
            rect: Rect::new(0, 0, 34, 34),
            fill: Some(Color::WHITE),
            stroke: None,
            stroke_width: 0,
        }
    );
    // Cell content starts at the table's inner origin: 1px border + 10px padding.
    assert_eq!(
        text_origins(composition.display_list.commands()),
        [("ab", Point::new(11, 11))]
    );
}

#[test]
fn test_zero_inset_canvas_is_the_text_block() {
    let defaults = StyleDefaults {
        body: bare_style(),
        caption: bare_style(),
        footer: bare_style(),
    };
    let mut table = Table::build(
        &[Row::new(vec![Cell::new("hello\nworld!")])],
        None,
        None,
        &defaults,
        &LayoutContext::new(&METRICS),
    )
    .unwrap();

    let composition = compose(&mut table, &bare_style(), &METRICS);
    assert_eq!(composition.size, Size::new(36, 24));
    assert_eq!(
        text_origins(composition.display_list.commands()),
        [("hello", Point::new(0, 0)), ("world!", Point::new(0, 12))]
    );
}

#[test]
fn test_caption_rows_and_footer_are_stacked() {
    let defaults = StyleDefaults {
        body: bare_style(),
        caption: bare_style(),
        footer: Style {
            align: Some(Align::Right),
            ..bare_style()
        },
    };
    let mut table = Table::build(
        &[Row::from_iter(["abcdefgh"])],
        Some(&Cell::new("cap")),
        Some(&Cell::new("foot")),
        &defaults,
        &LayoutContext::new(&METRICS),
    )
    .unwrap();

    let style = Style {
        margin: Some(Edges::uniform(5)),
        ..bare_style()
    };
    let composition = compose(&mut table, &style, &METRICS);

    assert_eq!(composition.size, Size::new(48 + 10, 36 + 10));
    assert_eq!(
        text_origins(composition.display_list.commands()),
        [
            ("cap", Point::new(5, 5)),
            ("abcdefgh", Point::new(5, 17)),
            // The footer spans the table width, so right alignment puts it
            // flush with the right edge of the rows.
            ("foot", Point::new(5 + 48 - 24, 29)),
        ]
    );
}

#[test]
fn test_border_edges_are_stroked_along_the_cell() {
    let defaults = StyleDefaults {
        body: Style {
            border: Some(Border::uniform(Line::new(Color::BLACK, 1))),
            ..bare_style()
        },
        ..StyleDefaults::default()
    };
    let mut table = Table::build(
        &[Row::from_iter(["ab"])],
        None,
        None,
        &defaults,
        &LayoutContext::new(&METRICS),
    )
    .unwrap();
    let composition = compose(&mut table, &bare_style(), &METRICS);

    let strokes: Vec<Rect> = composition
        .display_list
        .commands()
        .iter()
        .filter_map(|command| match command {
            DisplayCommand::FillStrokeRect {
                rect,
                stroke: Some(_),
                ..
            } => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(
        strokes,
        [
            Rect::new(0, 0, 14, 0),
            Rect::new(14, 0, 0, 14),
            Rect::new(0, 14, 14, 0),
            Rect::new(0, 0, 0, 14),
        ]
    );
}

#[test]
fn test_missing_edges_are_not_stroked() {
    let border = Border {
        bottom: Line::new(Color::BLACK, 2),
        ..Border::none()
    };
    let defaults = StyleDefaults {
        body: Style {
            border: Some(border),
            ..bare_style()
        },
        ..StyleDefaults::default()
    };
    let mut table = Table::build(
        &[Row::from_iter(["ab"])],
        None,
        None,
        &defaults,
        &LayoutContext::new(&METRICS),
    )
    .unwrap();
    assert_eq!(table.size(), Size::new(12, 14));

    let composition = compose(&mut table, &bare_style(), &METRICS);
    let strokes = composition
        .display_list
        .commands()
        .iter()
        .filter(|command| matches!(command, DisplayCommand::FillStrokeRect { stroke: Some(_), .. }))
        .count();
    assert_eq!(strokes, 1);
}

#[test]
fn test_run_backgrounds_are_filled_behind_text() {
    let defaults = StyleDefaults {
        body: bare_style(),
        ..StyleDefaults::default()
    };
    let mut table = Table::build(
        &[Row::from_iter(["a<text bgcolor='#ff0' padding='2'>bc</text>"])],
        None,
        None,
        &defaults,
        &LayoutContext::new(&METRICS),
    )
    .unwrap();
    let composition = compose(&mut table, &bare_style(), &METRICS);
    let commands = composition.display_list.commands();

    assert!(commands.contains(&DisplayCommand::FillStrokeRect {
        rect: Rect::new(6, 0, 16, 12),
        fill: Some(Color::rgb(255, 255, 0)),
        stroke: None,
        stroke_width: 0,
    }));
    // Padded runs draw their glyphs inside the padding.
    assert_eq!(
        text_origins(commands),
        [("a", Point::new(0, 0)), ("bc", Point::new(8, 0))]
    );
}
