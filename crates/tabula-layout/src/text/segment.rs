//! Word separation.
//!
//! A word is the unit the wrapper never splits. Boundaries fall:
//!
//! - around every whitespace character, each of which is a word of its own
//!   (a newline becomes a forced line break instead, and starts no word)
//! - between a punctuation character and a non-punctuation character
//! - around every double-width (CJK) character, which is a word of its own
//!
//! Zero-width characters (combining marks, joiners) never start a word; they
//! stay attached to whatever precedes them. Words may span markup segments,
//! in which case they carry one run per segment.

use std::mem;
use std::ops::Range;

use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};
use unicode_width::UnicodeWidthChar;

use super::markup::Segment;
use super::metrics::FontMetrics;
use super::{TextRun, Word};
use crate::style::font::FontFace;

/// Output of word separation.
#[derive(Debug, Clone, PartialEq)]
pub enum Piece {
    /// A wrap-atomic word.
    Word(Word),
    /// A literal newline: always ends the current line.
    LineBreak,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Class {
    Space,
    Wide,
    Punct,
    Other,
}

fn classify(c: char) -> Class {
    if c.is_whitespace() {
        Class::Space
    } else if c.width() == Some(2) {
        Class::Wide
    } else if is_punctuation(c) {
        Class::Punct
    } else {
        Class::Other
    }
}

fn is_zero_width(c: char) -> bool {
    !c.is_whitespace() && matches!(c.width(), None | Some(0))
}

/// Unicode general category P*. ASCII symbols such as `$+<=>^`|~` are
/// category S* and do not count.
fn is_punctuation(c: char) -> bool {
    c.general_category_group() == GeneralCategoryGroup::Punctuation
}

/// Builds words across segment boundaries.
struct Separator<'m> {
    face: FontFace,
    metrics: &'m dyn FontMetrics,
    pieces: Vec<Piece>,
    /// Runs of the word being built, from earlier segments.
    word: Vec<TextRun>,
    /// Byte range of the pending text in the current segment.
    pending: Option<(usize, usize)>,
    /// Class of the last non-zero-width character of the pending word.
    last: Option<Class>,
}

impl Separator<'_> {
    /// Move the pending text of `segment` into the current word.
    fn flush_pending(&mut self, segment: &Segment<'_>) {
        if let Some((start, end)) = self.pending.take() {
            let value = &segment.text[start..end];
            self.word.push(TextRun::measured(
                value,
                segment.style,
                span_of(segment, start, end),
                &self.face,
                self.metrics,
            ));
        }
    }

    /// Close the current word.
    fn finish_word(&mut self, segment: &Segment<'_>) {
        self.flush_pending(segment);
        if !self.word.is_empty() {
            self.pieces
                .push(Piece::Word(Word(mem::take(&mut self.word))));
        }
        self.last = None;
    }

    fn segment(&mut self, segment: &Segment<'_>) {
        for (start, c) in segment.text.char_indices() {
            let end = start + c.len_utf8();

            if is_zero_width(c) {
                match self.pending.as_mut() {
                    Some(pending) => pending.1 = end,
                    None if self.last.is_some() || !self.word.is_empty() => {
                        self.pending = Some((start, end));
                    }
                    // Nothing to attach to: a lone mark starts an ordinary word.
                    None => {
                        self.pending = Some((start, end));
                        self.last = Some(Class::Other);
                    }
                }
                continue;
            }

            let class = classify(c);
            match class {
                Class::Space => {
                    self.finish_word(segment);
                    if c == '\n' {
                        self.pieces.push(Piece::LineBreak);
                    } else {
                        // Kept open so trailing marks attach to it.
                        self.pending = Some((start, end));
                        self.last = Some(Class::Space);
                    }
                }
                Class::Wide => {
                    self.finish_word(segment);
                    self.pending = Some((start, end));
                    self.last = Some(Class::Wide);
                }
                Class::Punct | Class::Other => {
                    let boundary = match self.last {
                        Some(Class::Wide | Class::Space) => true,
                        Some(last) => last != class,
                        None => false,
                    };
                    if boundary {
                        self.finish_word(segment);
                    }
                    match self.pending.as_mut() {
                        Some(pending) => pending.1 = end,
                        None => self.pending = Some((start, end)),
                    }
                    self.last = Some(class);
                }
            }
        }
        // The word may continue into the next segment.
        self.flush_pending(segment);
    }
}

/// Source span of `segment.text[start..end]`. Tagged segments report the
/// whole tag, plain segments the exact bytes.
fn span_of(segment: &Segment<'_>, start: usize, end: usize) -> Range<usize> {
    if segment.span.len() == segment.text.len() {
        segment.span.start + start..segment.span.start + end
    } else {
        segment.span.clone()
    }
}

/// Split segments into measured words and line breaks.
#[must_use]
pub fn separate(
    segments: &[Segment<'_>],
    face: &FontFace,
    metrics: &dyn FontMetrics,
) -> Vec<Piece> {
    let mut separator = Separator {
        face: *face,
        metrics,
        pieces: Vec::new(),
        word: Vec::new(),
        pending: None,
        last: None,
    };
    for segment in segments {
        separator.segment(segment);
    }
    if !separator.word.is_empty() {
        separator
            .pieces
            .push(Piece::Word(Word(mem::take(&mut separator.word))));
    }
    separator.pieces
}
