//! Measured text blocks.
//!
//! A block is wrapped to its width up front so the layout cursor knows its
//! exact height before deciding where it goes.

use crate::font_metrics;

pub const LINE_HEIGHT: f32 = 1.25;

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub size: f32,
    pub bold: bool,
}

impl TextLine {
    pub fn height(&self) -> f32 {
        self.size * LINE_HEIGHT
    }
}

/// Lines of already-wrapped text, drawn top to bottom.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` wrapped to `max_width`. Blank text adds nothing.
    pub fn push(mut self, text: &str, size: f32, bold: bool, max_width: f32) -> Self {
        let metrics = font_metrics::get_metrics(bold);
        for line in wrap_text(text, size, max_width, metrics) {
            self.lines.push(TextLine { text: line, size, bold });
        }
        self
    }

    pub fn height(&self) -> f32 {
        self.lines.iter().map(TextLine::height).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Greedy word wrap. Words wider than the line stay whole on their own line.
pub fn wrap_text(
    text: &str,
    size: f32,
    max_width: f32,
    metrics: &font_metrics::FontMetrics,
) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let tentative = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if metrics.string_width(&tentative, size) > max_width && !current.is_empty() {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = tentative;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}
