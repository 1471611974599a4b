//! Rich-text segmentation and line wrapping.
//!
//! Wrapping runs in three steps:
//!
//! 1. [`markup::scan`] splits the raw cell text into plain and `<text>`
//!    tagged segments.
//! 2. [`segment::separate`] cuts the segments into wrap-atomic words and
//!    measures them.
//! 3. [`wrap`] packs words greedily into lines no wider than the budget,
//!    merging neighbouring runs that share a style.

pub mod markup;
pub mod metrics;
pub mod segment;

use std::ops::Range;

use markup::RunStyle;
use metrics::FontMetrics;
use segment::Piece;

use crate::style::font::FontFace;

/// Measured width of `text`, floored to whole pixels.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn measure(text: &str, face: &FontFace, metrics: &dyn FontMetrics) -> i32 {
    metrics.text_width(text, face).floor() as i32
}

/// A styled substring with its measured width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    /// The characters of the run.
    pub value: String,
    /// Pixel width, including `2 × padding`.
    pub width: i32,
    /// Inline style from markup.
    pub style: RunStyle,
    /// Byte range of the source text this run came from.
    pub span: Range<usize>,
}

impl TextRun {
    /// Measure `value` and build a run.
    #[must_use]
    pub fn measured(
        value: &str,
        style: RunStyle,
        span: Range<usize>,
        face: &FontFace,
        metrics: &dyn FontMetrics,
    ) -> Self {
        Self {
            value: value.to_string(),
            width: measure(value, face, metrics) + 2 * style.padding,
            style,
            span,
        }
    }

    /// Append `other` (which must share this run's style) and re-measure.
    fn absorb(&mut self, other: &Self, face: &FontFace, metrics: &dyn FontMetrics) {
        self.value.push_str(&other.value);
        self.width = measure(&self.value, face, metrics) + 2 * self.style.padding;
        self.span = self.span.start.min(other.span.start)..self.span.end.max(other.span.end);
    }
}

/// A sequence of runs kept together: a wrap-atomic word, or a whole line
/// after wrapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Word(pub Vec<TextRun>);

impl Word {
    /// Sum of run widths.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.0.iter().map(|run| run.width).sum()
    }

    /// The text of all runs, concatenated.
    #[must_use]
    pub fn text(&self) -> String {
        self.0.iter().map(|run| run.value.as_str()).collect()
    }

    /// True when there are no runs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The runs in order.
    #[must_use]
    pub fn runs(&self) -> &[TextRun] {
        &self.0
    }

    /// Append a run, merging it into the last one when the styles match.
    fn push_coalesced(&mut self, run: TextRun, face: &FontFace, metrics: &dyn FontMetrics) {
        match self.0.last_mut() {
            Some(last) if last.style == run.style => last.absorb(&run, face, metrics),
            _ => self.0.push(run),
        }
    }
}

/// Result of wrapping a text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wrapped {
    /// Lines in order. Never empty.
    pub lines: Vec<Word>,
    /// Width of the widest line.
    pub max_width: i32,
}

impl Wrapped {
    /// Number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Wrap `text` into lines at most `max_width` pixels wide.
///
/// A `max_width` of zero or less disables width wrapping. A newline always
/// ends a line (and is not part of any line). A word wider than the budget is
/// put on a line of its own rather than split. Empty text yields one empty
/// line.
#[must_use]
pub fn wrap(
    text: &str,
    max_width: i32,
    face: &FontFace,
    metrics: &dyn FontMetrics,
    ignore_markup: bool,
) -> Wrapped {
    let segments = markup::scan(text, ignore_markup);
    let pieces = segment::separate(&segments, face, metrics);

    let mut lines = Vec::new();
    let mut line = Word::default();
    for piece in pieces {
        match piece {
            Piece::LineBreak => lines.push(std::mem::take(&mut line)),
            Piece::Word(word) => {
                if max_width > 0 && !line.is_empty() && line.width() + word.width() > max_width {
                    lines.push(std::mem::take(&mut line));
                }
                for run in word.0 {
                    line.push_coalesced(run, face, metrics);
                }
            }
        }
    }
    lines.push(line);

    let max_width = lines.iter().map(Word::width).max().unwrap_or(0);
    Wrapped { lines, max_width }
}
