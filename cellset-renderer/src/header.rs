//! FILENAME: cellset-renderer/src/header.rs
//! Header Layout - hierarchical row and column headers for one axis.
//!
//! Algorithm:
//! 1. Split each hierarchy slot of the axis into bands: a band is a run of
//!    consecutive positions showing the same member in that slot while every
//!    outer slot also stays unchanged. A band is drawn once and spans its run.
//! 2. Offset each band by its depth below the slot's base depth (the depth of
//!    the first position's member), so drilled children sit one line below
//!    (columns) or one indent to the right of (rows) their parent.
//! 3. Stack hierarchies: column hierarchies stack vertically, row hierarchies
//!    horizontally. The axis thickness is the sum of hierarchy thicknesses.

use olap_engine::{Catalog, CellSetAxis, DimensionId, MemberId};

use crate::geometry::Rect;
use crate::style::Font;
use crate::surface::Surface;
use crate::widths::PADDING;

// ============================================================================
// BANDS
// ============================================================================

/// A run of positions sharing one header member in one hierarchy slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub member: MemberId,
    pub first_position: usize,
    pub span: usize,
}

/// Bands for every hierarchy slot of `axis`, outermost slot first.
pub fn header_bands(axis: &CellSetAxis) -> Vec<Vec<Band>> {
    let slots = axis.hierarchy_count();
    let mut bands: Vec<Vec<Band>> = vec![Vec::new(); slots];
    let mut previous: Option<&[MemberId]> = None;

    for (index, position) in axis.positions().iter().enumerate() {
        let members = position.members.as_slice();
        // Once an outer slot changes, every inner slot starts a new band.
        let mut outer_changed = previous.is_none();
        for (slot, member) in members.iter().enumerate() {
            let same = !outer_changed
                && previous.and_then(|p| p.get(slot)).is_some_and(|m| m == member);
            if same {
                if let Some(band) = bands[slot].last_mut() {
                    band.span += 1;
                }
            } else {
                outer_changed = true;
                bands[slot].push(Band {
                    member: *member,
                    first_position: index,
                    span: 1,
                });
            }
        }
        previous = Some(members);
    }
    bands
}

// ============================================================================
// LAYOUT ITEMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Columns,
    Rows,
}

/// One header label: the member, its text and its bounds. Column bounds are
/// relative to the top-left of the hierarchy's band; row bounds are relative to
/// the left of the hierarchy's band and the top of the axis' first row.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutItem {
    pub member: MemberId,
    pub text: String,
    pub bounds: Rect,
    pub first_position: usize,
    pub span: usize,
    pub relative_depth: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyLayout {
    pub dimension: DimensionId,
    pub base_depth: u32,
    pub items: Vec<LayoutItem>,
    /// Height (columns) or width (rows) of this hierarchy's header band.
    pub thickness: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisLayout {
    pub orientation: Orientation,
    pub hierarchies: Vec<HierarchyLayout>,
}

impl AxisLayout {
    /// Total header height (columns) or width (rows).
    pub fn thickness(&self) -> f64 {
        self.hierarchies.iter().map(|h| h.thickness).sum()
    }

    /// Offset of the band of hierarchy `index` from the start of the header.
    pub fn offset_of(&self, index: usize) -> f64 {
        self.hierarchies.iter().take(index).map(|h| h.thickness).sum()
    }
}

fn base_depth(axis: &CellSetAxis, catalog: &Catalog, slot: usize) -> u32 {
    axis.member_at(0, slot)
        .and_then(|m| catalog.member(m))
        .map(|m| m.depth)
        .unwrap_or(0)
}

fn relative_depth(catalog: &Catalog, member: MemberId, base: u32) -> u32 {
    catalog
        .member(member)
        .map(|m| m.depth.saturating_sub(base))
        .unwrap_or(0)
}

/// Lays out column headers over already-computed column widths. Every line is
/// `line_height` tall; a band is as wide as the columns it spans.
pub fn layout_column_headers(
    axis: &CellSetAxis,
    catalog: &Catalog,
    line_height: f64,
    column_widths: &[f64],
) -> AxisLayout {
    let mut column_starts = Vec::with_capacity(column_widths.len() + 1);
    let mut running = 0.0;
    column_starts.push(running);
    for width in column_widths {
        running += width;
        column_starts.push(running);
    }
    let start_of = |index: usize| {
        column_starts
            .get(index)
            .copied()
            .unwrap_or(running)
    };

    let hierarchies = header_bands(axis)
        .into_iter()
        .enumerate()
        .map(|(slot, bands)| {
            let base = base_depth(axis, catalog, slot);
            let mut max_depth: Option<u32> = None;
            let items: Vec<LayoutItem> = bands
                .into_iter()
                .map(|band| {
                    let depth = relative_depth(catalog, band.member, base);
                    max_depth = Some(max_depth.map_or(depth, |d| d.max(depth)));
                    let x = start_of(band.first_position);
                    let width = start_of(band.first_position + band.span) - x;
                    LayoutItem {
                        member: band.member,
                        text: catalog.display_name(band.member).to_string(),
                        bounds: Rect::new(x, f64::from(depth) * line_height, width, line_height),
                        first_position: band.first_position,
                        span: band.span,
                        relative_depth: depth,
                    }
                })
                .collect();

            HierarchyLayout {
                dimension: axis.hierarchies()[slot],
                base_depth: base,
                thickness: max_depth.map_or(0.0, |d| f64::from(d + 1) * line_height),
                items,
            }
        })
        .collect();

    AxisLayout {
        orientation: Orientation::Columns,
        hierarchies,
    }
}

/// Lays out row headers. Each depth level indents by `line_height`; a band
/// is as tall as the rows it spans and as wide as its padded label.
pub fn layout_row_headers(
    axis: &CellSetAxis,
    catalog: &Catalog,
    surface: &dyn Surface,
    font: &Font,
    line_height: f64,
    row_height: f64,
) -> AxisLayout {
    let hierarchies = header_bands(axis)
        .into_iter()
        .enumerate()
        .map(|(slot, bands)| {
            let base = base_depth(axis, catalog, slot);
            let mut thickness: f64 = 0.0;
            let items: Vec<LayoutItem> = bands
                .into_iter()
                .map(|band| {
                    let depth = relative_depth(catalog, band.member, base);
                    let text = catalog.display_name(band.member).to_string();
                    let bounds = Rect::new(
                        f64::from(depth) * line_height,
                        band.first_position as f64 * row_height,
                        surface.measure(font, &text) + PADDING,
                        band.span as f64 * row_height,
                    );
                    thickness = thickness.max(bounds.right());
                    LayoutItem {
                        member: band.member,
                        text,
                        bounds,
                        first_position: band.first_position,
                        span: band.span,
                        relative_depth: depth,
                    }
                })
                .collect();

            HierarchyLayout {
                dimension: axis.hierarchies()[slot],
                base_depth: base,
                items,
                thickness,
            }
        })
        .collect();

    AxisLayout {
        orientation: Orientation::Rows,
        hierarchies,
    }
}
