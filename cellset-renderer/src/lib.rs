//! FILENAME: cellset-renderer/src/lib.rs
//! Cell Set Renderer - paginated grid layout and drill navigation for OLAP
//! query results.
//!
//! Architecture:
//! - `header`: Merges repeated members into spanning bands and lays them out
//! - `widths`: Column widths from header labels and body cells
//! - `pager`: Rows per page and page slicing
//! - `regions`: Member rectangles for pointer hit testing
//! - `renderer`: Ties it together on a `Surface`, owns the working query
//!
//! Drawing goes through the `Surface` trait; `RecordingSurface` records draw
//! calls with monospaced metrics.

pub mod error;
pub mod geometry;
pub mod header;
pub mod number_format;
pub mod pager;
pub mod regions;
pub mod renderer;
pub mod settings;
pub mod style;
pub mod surface;
pub mod widths;

pub use error::RendererError;
pub use geometry::{Point, Rect};
pub use header::{
    header_bands, layout_column_headers, layout_row_headers, AxisLayout, Band, HierarchyLayout,
    LayoutItem, Orientation,
};
pub use number_format::{format_cell, format_number, CurrencyPosition, NumberFormat};
pub use pager::PageGeometry;
pub use regions::MemberRegionMap;
pub use renderer::{
    CellSetRenderer, PageOutcome, RendererEvent, SharedBackend, EMPTY_CELL_SET_MESSAGE,
};
pub use settings::RendererSettings;
pub use style::{Color, Font, HorizontalAlignment, Palette};
pub use surface::{DrawOp, RecordingSurface, Surface};
pub use widths::{column_widths, PADDING};
