//! Integration tests for rich-text wrapping.
//!
//! All tests measure with `ApproximateFontMetrics` at size 10, so every
//! character is exactly 6px wide.

use quickcheck_macros::quickcheck;
use tabula_layout::text::markup::RunStyle;
use tabula_layout::{ApproximateFontMetrics, Color, Font, FontFace, Wrapped, wrap};

fn face() -> FontFace {
    Font::sized(10.0).face()
}

fn wrap_text(text: &str, max_width: i32) -> Wrapped {
    wrap(text, max_width, &face(), &ApproximateFontMetrics, false)
}

fn line_texts(wrapped: &Wrapped) -> Vec<String> {
    wrapped.lines.iter().map(tabula_layout::Word::text).collect()
}

#[test]
fn test_unbounded_text_is_one_line() {
    let wrapped = wrap_text("the quick brown fox", 0);
    assert_eq!(line_texts(&wrapped), ["the quick brown fox"]);
    assert_eq!(wrapped.max_width, 19 * 6);
    // Same-style words collapse into a single run.
    assert_eq!(wrapped.lines[0].runs().len(), 1);
}

#[test]
fn test_empty_text_is_one_empty_line() {
    let wrapped = wrap_text("", 100);
    assert_eq!(wrapped.line_count(), 1);
    assert!(wrapped.lines[0].is_empty());
    assert_eq!(wrapped.max_width, 0);
}

#[test]
fn test_greedy_wrap_at_word_boundaries() {
    // "aaa bbb ccc" is 66px; at 45px "aaa bbb" (42px) fits, then " ccc"
    // would overflow.
    let wrapped = wrap_text("aaa bbb ccc", 45);
    assert_eq!(line_texts(&wrapped), ["aaa bbb", " ccc"]);
    assert_eq!(wrapped.max_width, 42);
}

#[test]
fn test_overlong_word_gets_its_own_line() {
    let wrapped = wrap_text("a extraordinarily b", 30);
    assert_eq!(line_texts(&wrapped), ["a ", "extraordinarily", " b"]);
    assert_eq!(wrapped.max_width, 15 * 6);
}

#[test]
fn test_newline_always_breaks() {
    let wrapped = wrap_text("one\ntwo", 0);
    assert_eq!(line_texts(&wrapped), ["one", "two"]);

    let wrapped = wrap_text("one\n\nthree\n", 1000);
    assert_eq!(line_texts(&wrapped), ["one", "", "three", ""]);
}

#[test]
fn test_markup_runs() {
    let wrapped = wrap_text("A <text color='#f00'>red</text> word", 0);
    assert_eq!(wrapped.line_count(), 1);
    let runs = wrapped.lines[0].runs();
    let values: Vec<&str> = runs.iter().map(|r| r.value.as_str()).collect();
    assert_eq!(values, ["A ", "red", " word"]);
    assert_eq!(runs[0].style, RunStyle::default());
    assert_eq!(runs[1].style.color, Some(Color::rgb(255, 0, 0)));
    assert_eq!(runs[2].style, RunStyle::default());
    assert_eq!(wrapped.max_width, 10 * 6);
}

#[test]
fn test_markup_word_is_never_split() {
    let wrapped = wrap_text("A <text color='#f00'>red</text> word", 40);
    assert_eq!(line_texts(&wrapped), ["A red ", "word"]);
    let red: Vec<_> = wrapped
        .lines
        .iter()
        .flat_map(|line| line.runs())
        .filter(|run| run.style.color.is_some())
        .collect();
    assert_eq!(red.len(), 1);
    assert_eq!(red[0].value, "red");
}

#[test]
fn test_ignore_markup_measures_tags() {
    let text = "<text color='red'>x</text>";
    let wrapped = wrap(text, 0, &face(), &ApproximateFontMetrics, true);
    assert_eq!(line_texts(&wrapped), [text]);
}

#[test]
fn test_run_padding_adds_width() {
    let wrapped = wrap_text("<text bgcolor='#eee' padding='5'>ab</text>c", 0);
    let runs = wrapped.lines[0].runs();
    assert_eq!(runs[0].width, 12 + 10);
    assert_eq!(runs[0].style.padding, 5);
    assert_eq!(wrapped.max_width, 12 + 10 + 6);
}

#[test]
fn test_wide_characters_wrap_individually() {
    let wrapped = wrap_text("中文字", 25);
    // Each CJK glyph counts as one character for the approximate metrics.
    assert_eq!(line_texts(&wrapped), ["中文字"]);
    let wrapped = wrap_text("中文字", 13);
    assert_eq!(line_texts(&wrapped), ["中文", "字"]);
}

#[quickcheck]
fn prop_unbounded_is_single_line(words: Vec<u8>) -> bool {
    let text: String = words
        .iter()
        .map(|b| if b % 4 == 0 { ' ' } else { char::from(b'a' + b % 26) })
        .collect();
    let wrapped = wrap_text(&text, 0);
    wrapped.line_count() == 1 && wrapped.max_width == i32::try_from(text.len() * 6).unwrap()
}

#[quickcheck]
fn prop_newlines_force_lines(text: String, max_width: i16) -> bool {
    let wrapped = wrap_text(&text, i32::from(max_width));
    wrapped.line_count() > text.matches('\n').count()
}

#[quickcheck]
fn prop_lines_respect_budget(words: Vec<u8>, max_width: u8) -> bool {
    let text: String = words
        .iter()
        .map(|b| if b % 3 == 0 { ' ' } else { 'x' })
        .collect();
    let max_width = i32::from(max_width) + 1;
    let wrapped = wrap_text(&text, max_width);
    // A line may only overflow when it holds a single unsplittable word.
    wrapped.lines.iter().all(|line| {
        let text = line.text();
        line.width() <= max_width || text == " " || !text.contains(' ')
    })
}
