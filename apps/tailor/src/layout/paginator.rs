//! Greedy word-wrap and page breaking for plain-text export.
//!
//! All lengths are PDF points. The cursor runs from the top edge of the page
//! downwards; a line is placed at the cursor and advances it by `line_height`.
//! Before a line is placed, a cursor past `bottom_bound` closes the page.

use std::mem;

use super::font_metrics::{get_metrics, FontFamily, FontMetricTable};

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// Page size, margins and font for one export.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
    pub margin_top: f32,
    /// Widest a wrapped line may be.
    pub max_width: f32,
    pub line_height: f32,
    /// Cursor position past which no further line is placed on the page.
    pub bottom_bound: f32,
    pub font: FontFamily,
    pub font_size: f32,
}

/// A4 portrait, 11pt Helvetica.
impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin_left: 50.0,
            margin_top: 60.0,
            max_width: 500.0,
            line_height: 17.0,
            bottom_bound: 770.0,
            font: FontFamily::Helvetica,
            font_size: 11.0,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pages
// ────────────────────────────────────────────────────────────────────────────

/// One wrapped line and the cursor position it was placed at.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    /// Distance from the top edge of the page.
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

impl Page {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Wraps `text` and distributes the lines over pages.
///
/// Always returns at least one page; blank text gives a single empty page.
pub fn paginate(text: &str, geometry: &PageGeometry) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut current = Page::default();
    let mut y = geometry.margin_top;

    for line in wrap_text(text, geometry) {
        if y > geometry.bottom_bound && !current.lines.is_empty() {
            pages.push(mem::take(&mut current));
            y = geometry.margin_top;
        }
        current.lines.push(PlacedLine { text: line, y });
        y += geometry.line_height;
    }

    pages.push(current);
    pages
}

// ────────────────────────────────────────────────────────────────────────────
// Wrapping
// ────────────────────────────────────────────────────────────────────────────

/// Splits `text` into lines no wider than `geometry.max_width`.
///
/// Input line breaks are kept, so a blank input line stays an empty line. Runs of
/// whitespace inside a line collapse to one space. Trailing line breaks are dropped.
pub fn wrap_text(text: &str, geometry: &PageGeometry) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let metrics = get_metrics(geometry.font);
    let max_em = geometry.max_width / geometry.font_size;
    let mut lines = Vec::new();

    for paragraph in text.trim_end_matches(['\r', '\n']).split('\n') {
        wrap_paragraph(paragraph, metrics, max_em, &mut lines);
    }
    lines
}

fn wrap_paragraph(paragraph: &str, metrics: &FontMetricTable, max_em: f32, out: &mut Vec<String>) {
    let mut line = String::new();
    let mut width = 0.0_f32;

    for word in paragraph.split_whitespace() {
        let word_w = metrics.measure_str(word);

        if word_w > max_em {
            if !line.is_empty() {
                out.push(mem::take(&mut line));
            }
            let mut pieces = break_word(word, metrics, max_em);
            // The tail of a broken word can still take following words.
            line = pieces.pop().unwrap_or_default();
            width = metrics.measure_str(&line);
            out.extend(pieces);
            continue;
        }

        if line.is_empty() {
            line.push_str(word);
            width = word_w;
        } else if width + metrics.space_width + word_w > max_em {
            out.push(mem::replace(&mut line, word.to_string()));
            width = word_w;
        } else {
            line.push(' ');
            line.push_str(word);
            width += metrics.space_width + word_w;
        }
    }

    out.push(line);
}

/// Cuts a word wider than the line at character boundaries. A glyph wider than
/// the whole line still gets a piece of its own.
fn break_word(word: &str, metrics: &FontMetricTable, max_em: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0_f32;

    for c in word.chars() {
        let w = metrics.measure_char(c);
        if !piece.is_empty() && width + w > max_em {
            pieces.push(mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
