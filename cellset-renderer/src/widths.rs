//! FILENAME: cellset-renderer/src/widths.rs
//! PURPOSE: Minimum content width of every column of a cell set.
//! CONTEXT: Header labels and body cells are both measured so that column
//! headers and data line up. A header band only counts toward the column it
//! starts in, following the same merge rule as the header layout.

use olap_engine::CellSet;

use crate::header::header_bands;
use crate::number_format::{format_cell, NumberFormat};
use crate::style::Font;
use crate::surface::Surface;

/// Horizontal breathing room added to every measured label.
pub const PADDING: f64 = 10.0;

/// One width per column position. Empty when there are no columns or no
/// rows, which callers treat as "nothing to render".
pub fn column_widths(
    cell_set: &CellSet,
    surface: &mut dyn Surface,
    header_font: &Font,
    body_font: &Font,
    body_format: Option<&NumberFormat>,
) -> Vec<f64> {
    let column_count = cell_set.column_count();
    let row_count = cell_set.row_count();
    if column_count == 0 || row_count == 0 {
        return Vec::new();
    }

    let catalog = cell_set.catalog();
    let mut widths = vec![0.0_f64; column_count];

    surface.set_font(header_font);
    for bands in header_bands(cell_set.columns()) {
        for band in bands {
            let label = surface.measure(header_font, catalog.display_name(band.member));
            let width = &mut widths[band.first_position];
            *width = width.max(label + PADDING);
        }
    }

    surface.set_font(body_font);
    for row in 0..row_count {
        for (column, width) in widths.iter_mut().enumerate() {
            let Some(cell) = cell_set.cell(column, row) else {
                continue;
            };
            let text = format_cell(cell, body_format);
            *width = width.max(surface.measure(body_font, &text) + PADDING);
        }
    }

    widths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use olap_engine::{AxisLocation, CatalogBuilder, Cell, CellSetAxis, CellValue};
    use smallvec::smallvec;

    fn cell_set(cells: Vec<Cell>) -> CellSet {
        let mut b = CatalogBuilder::new("c");
        let d = b.add_dimension("[D]", "D").unwrap();
        let long = b.add_member(d, None, "[D].[Long]", "LongLabel").unwrap();
        let short = b.add_member(d, None, "[D].[S]", "S").unwrap();
        let catalog = b.build();
        let columns = CellSetAxis::new(
            AxisLocation::Columns,
            vec![d],
            vec![smallvec![long], smallvec![short]],
        )
        .unwrap();
        let rows = CellSetAxis::new(AxisLocation::Rows, vec![d], vec![smallvec![short]]).unwrap();
        CellSet::new(catalog, columns, rows, cells).unwrap()
    }

    #[test]
    fn test_widths_cover_header_and_body() {
        let set = cell_set(vec![
            Cell::number(1.0),
            Cell::new(CellValue::Text("a much longer value".to_string())),
        ]);
        let mut surface = RecordingSurface::new(Font::default(), 2.0);
        let widths = column_widths(&set, &mut surface, &Font::default(), &Font::default(), None);
        // "LongLabel" = 9 chars, "a much longer value" = 19 chars.
        assert_eq!(widths, vec![28.0, 48.0]);
    }

    #[test]
    fn test_body_format_is_measured() {
        let set = cell_set(vec![Cell::number(1234.0), Cell::number(1.0)]);
        let mut surface = RecordingSurface::new(Font::default(), 1.0);
        let format = NumberFormat::Number {
            decimal_places: 4,
            use_thousands_separator: true,
        };
        let widths =
            column_widths(&set, &mut surface, &Font::default(), &Font::default(), Some(&format));
        // "LongLabel" = 9, "1,234.0000" = 10
        assert_eq!(widths[0], 20.0);
    }
}
