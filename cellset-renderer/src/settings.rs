//! FILENAME: cellset-renderer/src/settings.rs
//! PURPOSE: The user-facing configuration of a cell-set renderer.
//! CONTEXT: Serializable so that the hosting report can persist it with its
//! own format. Missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};

use crate::number_format::NumberFormat;
use crate::style::{Color, Font, HorizontalAlignment, Palette};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// Font of row and column headers. `None` adopts the surface's font on
    /// the first render.
    pub header_font: Option<Font>,

    /// Font of body cells. `None` adopts the surface's font on the first
    /// render.
    pub body_font: Option<Font>,

    /// Alignment of body cells, and of column header labels within the
    /// columns they span.
    pub body_alignment: HorizontalAlignment,

    /// Overrides the cell set's own formatting of numeric cells.
    pub body_format: Option<NumberFormat>,

    /// Header band colours, one per hierarchy.
    pub palette: Palette,

    /// Text colour of the member under the pointer.
    pub selection_color: Color,

    pub foreground: Color,
}

impl Default for RendererSettings {
    fn default() -> Self {
        RendererSettings {
            header_font: None,
            body_font: None,
            body_alignment: HorizontalAlignment::Right,
            body_format: None,
            palette: Palette::default(),
            selection_color: Color::blue(),
            foreground: Color::black(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_use_defaults() {
        let json = r#"{ "body_alignment": "Center", "body_format": { "Percentage": { "decimal_places": 1 } } }"#;
        let settings: RendererSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.body_alignment, HorizontalAlignment::Center);
        assert_eq!(
            settings.body_format,
            Some(NumberFormat::Percentage { decimal_places: 1 })
        );
        assert_eq!(settings.selection_color, Color::blue());
        assert!(settings.header_font.is_none());
    }

    #[test]
    fn test_settings_round_trip() {
        let settings = RendererSettings {
            header_font: Some(Font::new("Serif", 14).bold()),
            ..RendererSettings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: RendererSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
