//! Inline markup scanner.
//!
//! Cell text may color individual runs with a single tag:
//!
//! ```text
//! plain <text color="#f00" bgcolor="#eee" padding="2">styled</text> plain
//! ```
//!
//! The scanner makes one pass over the input. A `<text …>` opening that is
//! not followed by a well-formed tag (non-empty single-line content and a
//! closing `</text>`) is left in the surrounding plain text verbatim.
//! Segments are returned in source order and their spans tile the input.

use std::ops::Range;

use tabula_common::warning::warn_once;

use crate::style::values::Color;

const OPEN: &str = "<text";
const CLOSE: &str = "</text>";

/// Inline style of a run of text. Runs with equal styles are merged when
/// they end up next to each other on a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RunStyle {
    /// Text color; `None` uses the cell color.
    pub color: Option<Color>,
    /// Fill behind the run.
    pub background: Option<Color>,
    /// Extra horizontal space on each side of the run, in pixels.
    pub padding: i32,
}

/// A slice of the input with a uniform inline style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Visible text (tag syntax stripped).
    pub text: &'a str,
    /// Inline style, default for untagged text.
    pub style: RunStyle,
    /// Byte range of the segment in the input, tag syntax included.
    pub span: Range<usize>,
}

impl<'a> Segment<'a> {
    fn plain(input: &'a str, span: Range<usize>) -> Self {
        Self {
            text: &input[span.clone()],
            style: RunStyle::default(),
            span,
        }
    }
}

/// Split `input` into plain and tagged segments.
///
/// With `ignore_markup`, or when no well-formed tag occurs, the whole input
/// is one plain segment (an empty input yields one empty segment).
#[must_use]
pub fn scan(input: &str, ignore_markup: bool) -> Vec<Segment<'_>> {
    if ignore_markup {
        return vec![Segment::plain(input, 0..input.len())];
    }

    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;
    while let Some(offset) = input[cursor..].find(OPEN) {
        let start = cursor + offset;
        match parse_tag(input, start) {
            Some(tag) => {
                if start > plain_start {
                    segments.push(Segment::plain(input, plain_start..start));
                }
                cursor = tag.span.end;
                plain_start = cursor;
                segments.push(tag);
            }
            None => cursor = start + OPEN.len(),
        }
    }

    if plain_start < input.len() || segments.is_empty() {
        segments.push(Segment::plain(input, plain_start..input.len()));
    }
    segments
}

/// Parse a tag starting at `start` (which points at `<text`).
fn parse_tag(input: &str, start: usize) -> Option<Segment<'_>> {
    let after_name = start + OPEN.len();
    let rest = &input[after_name..];

    // `<textarea>` and friends are not tags.
    let first = rest.chars().next()?;
    if first != '>' && !first.is_whitespace() {
        return None;
    }

    let open_end = after_name + find_tag_end(rest)?;
    let content_start = open_end + 1;
    let content_len = input[content_start..].find(CLOSE)?;
    let content = &input[content_start..content_start + content_len];
    if content.is_empty() || content.contains('\n') {
        return None;
    }

    Some(Segment {
        text: content,
        style: parse_attributes(&input[after_name..open_end]),
        span: start..content_start + content_len + CLOSE.len(),
    })
}

/// Offset of the `>` closing the opening tag, skipping quoted values.
fn find_tag_end(rest: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in rest.char_indices() {
        match (quote, c) {
            (_, '\n') => return None,
            (None, '>') => return Some(i),
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            _ => {}
        }
    }
    None
}

/// Parse `name="value"` pairs. Unknown names and malformed values are
/// skipped with a warning.
fn parse_attributes(source: &str) -> RunStyle {
    let mut style = RunStyle::default();
    for (name, value) in Attributes::new(source) {
        match name {
            "color" => style.color = parse_color(name, value),
            "bgcolor" => style.background = parse_color(name, value),
            "padding" => style.padding = value.trim().parse().unwrap_or(0),
            other => warn_once(
                "markup",
                &format!("ignoring unknown attribute '{other}' on <text>"),
            ),
        }
    }
    style
}

fn parse_color(name: &str, value: &str) -> Option<Color> {
    match value.parse() {
        Ok(color) => Some(color),
        Err(_) => {
            warn_once(
                "markup",
                &format!("ignoring invalid {name} '{value}' on <text>"),
            );
            None
        }
    }
}

/// Iterator over `name=quoted` pairs of an opening tag.
struct Attributes<'a> {
    rest: &'a str,
}

impl<'a> Attributes<'a> {
    const fn new(source: &'a str) -> Self {
        Self { rest: source }
    }
}

impl<'a> Iterator for Attributes<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let trimmed = self.rest.trim_start();
            if trimmed.is_empty() {
                return None;
            }
            let name_len = trimmed
                .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
                .unwrap_or(trimmed.len());
            let name = &trimmed[..name_len];
            let after_name = &trimmed[name_len..];

            let quoted = after_name.strip_prefix('=').and_then(|v| {
                let quote = v.chars().next().filter(|q| matches!(q, '"' | '\''))?;
                let body = &v[1..];
                let end = body.find(quote)?;
                Some((&body[..end], &body[end + 1..]))
            });

            match quoted {
                Some((value, rest)) if !name.is_empty() => {
                    self.rest = rest;
                    return Some((name, value));
                }
                _ => {
                    // Skip the malformed token and keep going.
                    let skip = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
                    warn_once(
                        "markup",
                        &format!("ignoring malformed attribute '{}'", &trimmed[..skip]),
                    );
                    self.rest = &trimmed[skip..];
                }
            }
        }
    }
}
