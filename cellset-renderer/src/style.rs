//! FILENAME: cellset-renderer/src/style.rs
//! PURPOSE: Visual vocabulary shared by the renderer and its surface.
//! CONTEXT: Fonts, colours, horizontal alignment and the header palette.
//! Colour policy is injected through `Palette`; nothing here picks a theme.

use serde::{Deserialize, Serialize};

/// Horizontal placement of text inside its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HorizontalAlignment {
    Left,
    Center,
    #[default]
    Right,
}

impl HorizontalAlignment {
    /// Offset from the column's left edge at which text of `text_width`
    /// starts inside a column of `column_width`.
    pub fn offset(self, column_width: f64, text_width: f64) -> f64 {
        match self {
            HorizontalAlignment::Left => 0.0,
            HorizontalAlignment::Center => (column_width - text_width) / 2.0,
            HorizontalAlignment::Right => column_width - text_width,
        }
    }
}

/// RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8, // Alpha channel (255 = opaque)
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub const fn black() -> Self {
        Color::new(0, 0, 0)
    }

    pub const fn white() -> Self {
        Color::new(255, 255, 255)
    }

    pub const fn blue() -> Self {
        Color::new(0, 0, 255)
    }
}

/// Font description handed to the surface for measuring and drawing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    /// Size in surface units.
    pub size: u16,
    pub bold: bool,
    pub italic: bool,
}

impl Font {
    pub fn new(family: impl Into<String>, size: u16) -> Self {
        Font {
            family: family.into(),
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

impl Default for Font {
    fn default() -> Self {
        Font::new("system-ui", 11)
    }
}

// ============================================================================
// PALETTE
// ============================================================================

/// Header band colours, one per hierarchy, cycling when hierarchies outnumber
/// colours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Palette { colors }
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Colour for the hierarchy at `index`. An empty palette paints white.
    pub fn color_for(&self, index: usize) -> Color {
        if self.colors.is_empty() {
            return Color::white();
        }
        self.colors[index % self.colors.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new(vec![
            Color::new(0xdd, 0xe8, 0xf5),
            Color::new(0xe4, 0xf1, 0xdc),
            Color::new(0xf8, 0xec, 0xd4),
            Color::new(0xef, 0xde, 0xef),
            Color::new(0xf1, 0xf1, 0xf1),
        ])
    }
}
