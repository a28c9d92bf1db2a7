//! FILENAME: cellset-renderer/src/surface.rs
//! PURPOSE: The drawing and text-measurement contract the renderer paints on.
//! CONTEXT: Any 2D backend can host the renderer as long as `measure` and
//! `draw_text` agree for the same `Font`. `RecordingSurface` is a
//! deterministic implementation that records draw calls instead of painting,
//! used for layout previews and by the tests.

use crate::geometry::Rect;
use crate::style::{Color, Font};

pub trait Surface {
    fn current_font(&self) -> Font;

    fn set_font(&mut self, font: &Font);

    /// Advance width of `text` in `font`.
    fn measure(&self, font: &Font, text: &str) -> f64;

    /// Height of one line of `font`.
    fn line_height(&self, font: &Font) -> f64;

    /// Draws `text` with its left edge at `x` and its baseline at `baseline`.
    fn draw_text(&mut self, text: &str, x: f64, baseline: f64, font: &Font, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);
}

// ============================================================================
// RECORDING SURFACE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        text: String,
        x: f64,
        baseline: f64,
        font: Font,
        color: Color,
    },
    Fill {
        rect: Rect,
        color: Color,
    },
}

/// Monospaced metrics: every character advances `char_width`, and a line is
/// as tall as the font size.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    font: Font,
    char_width: f64,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(font: Font, char_width: f64) -> Self {
        RecordingSurface {
            font,
            char_width,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Every text draw as `(text, x, baseline)`, in drawing order.
    pub fn texts(&self) -> Vec<(&str, f64, f64)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, x, baseline, .. } => Some((text.as_str(), *x, *baseline)),
                DrawOp::Fill { .. } => None,
            })
            .collect()
    }

    /// First draw of `text`, as `(x, baseline, color)`.
    pub fn find_text(&self, needle: &str) -> Option<(f64, f64, Color)> {
        self.ops.iter().find_map(|op| match op {
            DrawOp::Text {
                text,
                x,
                baseline,
                color,
                ..
            } if text == needle => Some((*x, *baseline, *color)),
            _ => None,
        })
    }

    pub fn fills(&self) -> Vec<(Rect, Color)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Fill { rect, color } => Some((*rect, *color)),
                DrawOp::Text { .. } => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn current_font(&self) -> Font {
        self.font.clone()
    }

    fn set_font(&mut self, font: &Font) {
        self.font = font.clone();
    }

    fn measure(&self, _font: &Font, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }

    fn line_height(&self, font: &Font) -> f64 {
        f64::from(font.size)
    }

    fn draw_text(&mut self, text: &str, x: f64, baseline: f64, font: &Font, color: Color) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            baseline,
            font: font.clone(),
            color,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::Fill { rect, color });
    }
}
