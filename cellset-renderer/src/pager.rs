//! FILENAME: cellset-renderer/src/pager.rs
//! PURPOSE: Splits the row axis into height-bounded pages.
//! CONTEXT: Every page repeats the column headers, so the rows that fit are
//! whatever remains of the page height below them.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Height of one body row, never below 1.
    pub row_height: f64,
    pub column_header_height: f64,
    /// Rows per page; 0 when the page is too small for a single row.
    pub rows_per_page: usize,
}

impl PageGeometry {
    pub fn measure(
        header_line_height: f64,
        body_line_height: f64,
        column_header_height: f64,
        page_height: f64,
    ) -> Self {
        let mut row_height = header_line_height.max(body_line_height);
        // Zero at tiny zoom levels; NaN from a broken surface.
        if !(row_height > 0.0) {
            row_height = 1.0;
        }
        let fitting = ((page_height - column_header_height) / row_height).floor();
        let rows_per_page = if fitting >= 1.0 { fitting as usize } else { 0 };
        PageGeometry {
            row_height,
            column_header_height,
            rows_per_page,
        }
    }

    pub fn fits_rows(&self) -> bool {
        self.rows_per_page > 0
    }

    /// Row indices shown on `page_index`, clipped to `total_rows`.
    pub fn page_rows(&self, page_index: usize, total_rows: usize) -> Range<usize> {
        let start = self.rows_per_page.saturating_mul(page_index).min(total_rows);
        let end = start.saturating_add(self.rows_per_page).min(total_rows);
        start..end
    }

    /// Whether rows remain beyond `page_index`.
    pub fn has_more_after(&self, page_index: usize, total_rows: usize) -> bool {
        self.fits_rows()
            && self
                .rows_per_page
                .saturating_mul(page_index.saturating_add(1))
                < total_rows
    }

    pub fn page_count(&self, total_rows: usize) -> usize {
        if !self.fits_rows() {
            return 0;
        }
        total_rows.div_ceil(self.rows_per_page)
    }
}
