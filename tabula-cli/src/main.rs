//! Tabula CLI - render JSON table documents to PNG or JPEG
//!
//! Usage:
//!   tabula <table.json> -o <out.png>          Render with the default styles
//!   tabula <table.json> -o out.jpg --font-size 16 --align center
//!   tabula <table.json> -o out.png --dump-layout
//!
//! The document is `{ "rows": [...], "caption": ..., "footer": ... }`. A row
//! is either an array of cells or `{ "cells": [...], "style": {...} }`; a
//! cell is either a string or `{ "text": ..., "image": ..., "style": ... }`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use owo_colors::OwoColorize;
use serde::Deserialize;
use tabula_layout::{Align, Cell, Color, Edges, FontDescriptor, Row, Style, Table, VAlign};
use tabula_render::{ImageType, TableImage, TableImageBuilder};

/// Tabula - render tables of styled text and images to PNG or JPEG
#[derive(Parser, Debug)]
#[command(name = "tabula")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Render a table with the default styles
    tabula users.json -o users.png

    # Larger text, centered, on a white background
    tabula users.json -o users.jpg --font-size 16 --align center --background '#fff'

    # Load Roboto (Robotosr.ttf) from a font folder
    tabula users.json -o users.png --font-dir ./fonts --font Roboto

    # Print the resolved grid
    tabula users.json -o users.png --dump-layout
"#)]
struct Cli {
    /// JSON table document
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output image path
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Output format (png, jpeg); guessed from the output extension when omitted
    #[arg(short, long)]
    format: Option<ImageType>,

    /// Folder that font files are loaded from
    #[arg(long, value_name = "DIR")]
    font_dir: Option<PathBuf>,

    /// Font name to load from the font folder
    #[arg(long, value_name = "NAME")]
    font: Option<String>,

    /// Font size in points
    #[arg(long)]
    font_size: Option<f64>,

    /// Rendering DPI
    #[arg(long)]
    dpi: Option<u32>,

    /// Line-height multiplier
    #[arg(long)]
    line_height: Option<f64>,

    /// Cell padding on all sides
    #[arg(long)]
    padding: Option<i32>,

    /// Cell margin on all sides
    #[arg(long)]
    margin: Option<i32>,

    /// Text color
    #[arg(long)]
    color: Option<Color>,

    /// Background color
    #[arg(long)]
    background: Option<Color>,

    /// Border color
    #[arg(long)]
    border_color: Option<Color>,

    /// Border width in pixels
    #[arg(long)]
    border_width: Option<i32>,

    /// Horizontal alignment (left, center, right)
    #[arg(long)]
    align: Option<Align>,

    /// Vertical alignment (top, middle, bottom)
    #[arg(long)]
    valign: Option<VAlign>,

    /// Do not fall back to a system font for unstyled text
    #[arg(long)]
    no_system_fonts: bool,

    /// Print column widths, row heights, and caption/footer sizes
    #[arg(long)]
    dump_layout: bool,

    /// Log layout decisions
    #[arg(short, long)]
    verbose: bool,
}

/// A table document as read from JSON.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Document {
    rows: Vec<RowInput>,
    #[serde(default)]
    caption: Option<CellInput>,
    #[serde(default)]
    footer: Option<CellInput>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CellInput {
    Text(String),
    Cell(Cell),
}

impl From<CellInput> for Cell {
    fn from(input: CellInput) -> Self {
        match input {
            CellInput::Text(text) => Self::new(text),
            CellInput::Cell(cell) => cell,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RowInput {
    Cells(Vec<CellInput>),
    Styled {
        cells: Vec<CellInput>,
        #[serde(default)]
        style: Option<Style>,
    },
}

impl From<RowInput> for Row {
    fn from(input: RowInput) -> Self {
        match input {
            RowInput::Cells(cells) => cells.into_iter().collect(),
            RowInput::Styled { cells, style } => Self {
                cells: cells.into_iter().map(Cell::from).collect(),
                style,
            },
        }
    }
}

/// Rows, caption, and footer ready for layout.
struct Parsed {
    rows: Vec<Row>,
    caption: Option<Cell>,
    footer: Option<Cell>,
}

fn parse_document(json: &str) -> Result<Parsed> {
    let document: Document = serde_json::from_str(json)?;
    Ok(Parsed {
        rows: document.rows.into_iter().map(Row::from).collect(),
        caption: document.caption.map(Cell::from),
        footer: document.footer.map(Cell::from),
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "warn" }),
    )
    .init();

    let json = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read '{}'", cli.input.display()))?;
    let parsed = parse_document(&json)
        .with_context(|| format!("'{}' is not a table document", cli.input.display()))?;

    let format = match cli.format {
        Some(format) => format,
        None => ImageType::from_path(&cli.output)
            .context("cannot guess the output format; pass --format")?,
    };

    let table = configure(&cli).build().context("failed to configure fonts")?;
    let rendered = table
        .render(&parsed.rows, parsed.caption.as_ref(), parsed.footer.as_ref())
        .context("failed to render table")?;

    if cli.dump_layout {
        dump_layout(rendered.table());
    }
    for error in rendered.cache_errors() {
        warn!("{error}");
    }

    rendered
        .save(&cli.output, format)
        .with_context(|| format!("failed to write '{}'", cli.output.display()))?;

    let (width, height) = rendered.image().dimensions();
    println!(
        "{} {} ({width}x{height}, {format})",
        "Wrote".green().bold(),
        cli.output.display()
    );
    Ok(())
}

/// Apply the command-line style options to a table image builder.
fn configure(cli: &Cli) -> TableImageBuilder {
    let base_dir = cli.input.parent().unwrap_or_else(|| Path::new("."));
    let mut builder = TableImage::builder()
        .system_fonts(!cli.no_system_fonts)
        .image_base_dir(base_dir);

    if let Some(dir) = &cli.font_dir {
        builder = builder.font_folder(dir);
    }
    if let Some(name) = &cli.font {
        builder = builder.font_descriptor(FontDescriptor::new(name.as_str()));
    }
    if let Some(size) = cli.font_size {
        builder = builder.font_size(size);
    }
    if let Some(dpi) = cli.dpi {
        builder = builder.dpi(dpi);
    }
    if let Some(line_height) = cli.line_height {
        builder = builder.line_height(line_height);
    }
    if let Some(padding) = cli.padding {
        builder = builder.padding(Edges::uniform(padding));
    }
    if let Some(margin) = cli.margin {
        builder = builder.margin(Edges::uniform(margin));
    }
    if let Some(color) = cli.color {
        builder = builder.color(color);
    }
    if let Some(color) = cli.background {
        builder = builder.background(color);
    }
    if let Some(color) = cli.border_color {
        builder = builder.border_color(color);
    }
    if let Some(width) = cli.border_width {
        builder = builder.border_width(width);
    }
    if let Some(align) = cli.align {
        builder = builder.align(align);
    }
    if let Some(valign) = cli.valign {
        builder = builder.valign(valign);
    }
    builder
}

fn dump_layout(table: &Table) {
    let size = table.size();
    println!("{}", "=== Layout ===".cyan().bold());
    println!("  table:   {}x{}", size.width, size.height);
    println!("  columns: {:?}", table.column_widths());
    println!("  rows:    {:?}", table.row_heights());
    if table.caption().is_some() {
        let caption = table.caption_size();
        println!("  caption: {}x{}", caption.width, caption.height);
    }
    if table.footer().is_some() {
        let footer = table.footer_size();
        println!("  footer:  {}x{}", footer.width, footer.height);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_in_both_shapes() {
        let parsed = parse_document(
            r##"{
                "rows": [
                    ["Id", {"text": "Name", "style": {"align": "right"}}],
                    {"cells": ["1", "Ada"], "style": {"color": "#f00"}}
                ],
                "caption": "Users"
            }"##,
        )
        .unwrap();

        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].cells[0], Cell::new("Id"));
        assert_eq!(
            parsed.rows[0].cells[1].style.as_ref().and_then(|s| s.align),
            Some(Align::Right)
        );
        assert_eq!(
            parsed.rows[1].style.as_ref().and_then(|s| s.color),
            Some(Color::rgb(255, 0, 0))
        );
        assert_eq!(parsed.caption, Some(Cell::new("Users")));
        assert!(parsed.footer.is_none());
    }

    #[test]
    fn rejects_unknown_document_fields() {
        assert!(parse_document(r#"{"rows": [], "header": "x"}"#).is_err());
    }

    #[test]
    fn options_set_default_style_fields() {
        let cli = Cli::parse_from([
            "tabula",
            "tables/users.json",
            "-o",
            "out.png",
            "--font-size",
            "20",
            "--align",
            "CENTER",
            "--border-width",
            "2",
            "--no-system-fonts",
        ]);
        let table = configure(&cli).build().unwrap();
        let body = &table.defaults().body;

        assert_eq!(body.font.as_ref().and_then(|font| font.size), Some(20.0));
        assert_eq!(body.align, Some(Align::Center));
        assert_eq!(body.border.map(|border| border.top.width), Some(2));
        // Untouched options keep their defaults.
        assert_eq!(body.padding, Some(Edges::uniform(10)));
    }
}
