//! Approximate text measurement.
//!
//! Width estimates use per-family/weight character-width factors; actual
//! width depends on the backend font, but these factors keep bounds, caret
//! placement and hit testing consistent without a layout engine.

use crate::options::{FontFamily, FontSpec, FontWeight, TextAlign};
use kurbo::{Point, Size};

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Minimum width of a text block (so empty text stays selectable).
pub const MIN_TEXT_WIDTH: f64 = 20.0;

/// Average character width as a fraction of the font size.
fn char_width_factor(family: FontFamily, weight: FontWeight) -> f64 {
    match (family, weight) {
        (FontFamily::SansSerif, FontWeight::Regular) => 0.52,
        (FontFamily::SansSerif, FontWeight::Bold) => 0.55,
        (FontFamily::Serif, FontWeight::Regular) => 0.50,
        (FontFamily::Serif, FontWeight::Bold) => 0.54,
        (FontFamily::Monospace, _) => 0.60,
    }
}

/// Width of a single line of text.
pub fn line_width(line: &str, font: &FontSpec) -> f64 {
    line.chars().count() as f64 * font.size * char_width_factor(font.family, font.weight)
}

/// Height of one text line.
pub fn line_height(font: &FontSpec) -> f64 {
    font.size * LINE_HEIGHT_FACTOR
}

/// Split text into newline-delimited lines, counting a trailing newline as
/// an extra empty line (`str::lines` drops it).
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.is_empty() {
        lines.push("");
    }
    lines
}

/// Measure a text block: widest line by height of all lines.
pub fn measure(text: &str, font: &FontSpec) -> Size {
    let lines = split_lines(text);
    let width = lines
        .iter()
        .map(|line| line_width(line, font))
        .fold(0.0, f64::max)
        .max(MIN_TEXT_WIDTH);
    let height = lines.len() as f64 * line_height(font);
    Size::new(width, height)
}

/// Caret position within a text block, measured from the block's top-left
/// corner. The caret sits after `cursor` characters; its horizontal offset
/// is the width of the substring before it on its line, shifted by the
/// alignment of that line within the block.
pub fn caret_position(text: &str, cursor: usize, font: &FontSpec) -> Point {
    let block_width = measure(text, font).width;
    let lines = split_lines(text);
    let mut remaining = cursor;

    for (i, line) in lines.iter().enumerate() {
        let len = line.chars().count();
        if remaining <= len {
            let prefix = match line.char_indices().nth(remaining) {
                Some((byte, _)) => &line[..byte],
                None => line,
            };
            let shift = match font.align {
                TextAlign::Left => 0.0,
                TextAlign::Center => (block_width - line_width(line, font)) / 2.0,
                TextAlign::Right => block_width - line_width(line, font),
            };
            return Point::new(
                shift + line_width(prefix, font),
                i as f64 * line_height(font),
            );
        }
        // Skip this line plus its trailing newline
        remaining -= len + 1;
    }

    // Cursor beyond the buffer: clamp to the end of the last line
    Point::new(
        lines
            .last()
            .map(|line| line_width(line, font))
            .unwrap_or(0.0),
        lines.len().saturating_sub(1) as f64 * line_height(font),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_minimum_width() {
        let size = measure("", &FontSpec::default());
        assert!((size.width - MIN_TEXT_WIDTH).abs() < f64::EPSILON);
        assert!((size.height - line_height(&FontSpec::default())).abs() < f64::EPSILON);
    }

    #[test]
    fn test_widest_line_wins() {
        let font = FontSpec::default();
        let size = measure("hi\nlonger line\nok", &font);
        assert!((size.width - line_width("longer line", &font)).abs() < f64::EPSILON);
        assert!((size.height - 3.0 * line_height(&font)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_trailing_newline_counts_as_line() {
        let font = FontSpec::default();
        let size = measure("hi\n", &font);
        assert!((size.height - 2.0 * line_height(&font)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_caret_on_first_line() {
        let font = FontSpec::default();
        let caret = caret_position("hello", 2, &font);
        assert!((caret.x - line_width("he", &font)).abs() < f64::EPSILON);
        assert!(caret.y.abs() < f64::EPSILON);
    }

    #[test]
    fn test_caret_on_second_line() {
        let font = FontSpec::default();
        // Cursor after "ab\ncd" = 5 chars, on line 1 after "cd"
        let caret = caret_position("ab\ncd", 5, &font);
        assert!((caret.x - line_width("cd", &font)).abs() < f64::EPSILON);
        assert!((caret.y - line_height(&font)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_caret_right_aligned() {
        let mut font = FontSpec::default();
        font.align = TextAlign::Right;
        let text = "wide line\nx";
        let block = measure(text, &font).width;
        // Caret at the start of the short second line
        let caret = caret_position(text, 10, &font);
        assert!((caret.x - (block - line_width("x", &font))).abs() < 1e-9);
    }
}
