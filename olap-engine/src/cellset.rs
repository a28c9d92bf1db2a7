//! FILENAME: olap-engine/src/cellset.rs
//! PURPOSE: The result grid produced by executing a query.
//! CONTEXT: A `CellSet` is an immutable snapshot: two axes of positions (each
//! position a tuple of members, one per hierarchy on the axis) and a dense,
//! row-major block of cells. Re-executing a query produces a new cell set;
//! an existing one is never patched in place.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::catalog::{Catalog, DimensionId, MemberId};
use crate::error::CellSetError;
use crate::query::AxisLocation;

/// Raw value of a cell as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Error(String),
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The backend's default textual form of this value.
    pub fn display_value(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Error(e) => format!("#{}", e.to_uppercase()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub value: CellValue,
    pub formatted_value: String,
}

impl Cell {
    /// A cell whose formatted value is the default display of `value`.
    pub fn new(value: CellValue) -> Self {
        let formatted_value = value.display_value();
        Cell {
            value,
            formatted_value,
        }
    }

    pub fn with_formatted(value: CellValue, formatted_value: impl Into<String>) -> Self {
        Cell {
            value,
            formatted_value: formatted_value.into(),
        }
    }

    pub fn number(value: f64) -> Self {
        Cell::new(CellValue::Number(value))
    }

    pub fn empty() -> Self {
        Cell::new(CellValue::Empty)
    }
}

/// One tuple of members addressing a line along an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ordinal: usize,
    pub members: SmallVec<[MemberId; 4]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellSetAxis {
    location: AxisLocation,
    hierarchies: Vec<DimensionId>,
    positions: Vec<Position>,
}

impl CellSetAxis {
    /// Builds an axis, checking every tuple has one member per hierarchy.
    pub fn new(
        location: AxisLocation,
        hierarchies: Vec<DimensionId>,
        tuples: Vec<SmallVec<[MemberId; 4]>>,
    ) -> Result<Self, CellSetError> {
        let mut positions = Vec::with_capacity(tuples.len());
        for (ordinal, members) in tuples.into_iter().enumerate() {
            if members.len() != hierarchies.len() {
                return Err(CellSetError::PositionArity {
                    location,
                    position: ordinal,
                    expected: hierarchies.len(),
                    actual: members.len(),
                });
            }
            positions.push(Position { ordinal, members });
        }
        Ok(CellSetAxis {
            location,
            hierarchies,
            positions,
        })
    }

    pub fn empty(location: AxisLocation) -> Self {
        CellSetAxis {
            location,
            hierarchies: Vec::new(),
            positions: Vec::new(),
        }
    }

    pub fn location(&self) -> AxisLocation {
        self.location
    }

    pub fn hierarchies(&self) -> &[DimensionId] {
        &self.hierarchies
    }

    pub fn hierarchy_count(&self) -> usize {
        self.hierarchies.len()
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Member at `slot` of the position at `index`.
    pub fn member_at(&self, index: usize, slot: usize) -> Option<MemberId> {
        self.positions.get(index)?.members.get(slot).copied()
    }
}

// ============================================================================
// CELL SET
// ============================================================================

#[derive(Debug, Clone)]
pub struct CellSet {
    catalog: Arc<Catalog>,
    columns: CellSetAxis,
    rows: CellSetAxis,
    /// Row-major: `cells[row * column_count + column]`.
    cells: Vec<Cell>,
}

impl CellSet {
    pub fn new(
        catalog: Arc<Catalog>,
        columns: CellSetAxis,
        rows: CellSetAxis,
        cells: Vec<Cell>,
    ) -> Result<Self, CellSetError> {
        let expected = columns.position_count() * rows.position_count();
        if cells.len() != expected {
            return Err(CellSetError::CellCountMismatch {
                columns: columns.position_count(),
                rows: rows.position_count(),
                expected,
                actual: cells.len(),
            });
        }
        Ok(CellSet {
            catalog,
            columns,
            rows,
            cells,
        })
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn columns(&self) -> &CellSetAxis {
        &self.columns
    }

    pub fn rows(&self) -> &CellSetAxis {
        &self.rows
    }

    pub fn axis(&self, location: AxisLocation) -> Option<&CellSetAxis> {
        match location {
            AxisLocation::Columns => Some(&self.columns),
            AxisLocation::Rows => Some(&self.rows),
            AxisLocation::Filter => None,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.position_count()
    }

    pub fn row_count(&self) -> usize {
        self.rows.position_count()
    }

    pub fn cell(&self, column: usize, row: usize) -> Option<&Cell> {
        if column >= self.column_count() {
            return None;
        }
        self.cells.get(row * self.column_count() + column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;
    use smallvec::smallvec;

    #[test]
    fn test_cell_addressing_is_column_then_row() {
        let mut b = CatalogBuilder::new("c");
        let d = b.add_dimension("[D]", "D").unwrap();
        let a = b.add_member(d, None, "[D].[A]", "A").unwrap();
        let c = b.add_member(d, None, "[D].[C]", "C").unwrap();
        let catalog = b.build();

        let columns =
            CellSetAxis::new(AxisLocation::Columns, vec![d], vec![smallvec![a], smallvec![c]])
                .unwrap();
        let rows = CellSetAxis::new(AxisLocation::Rows, vec![d], vec![smallvec![a]]).unwrap();
        let set = CellSet::new(catalog, columns, rows, vec![Cell::number(1.0), Cell::number(2.5)])
            .unwrap();

        assert_eq!(set.cell(1, 0).unwrap().formatted_value, "2.5");
        assert_eq!(set.cell(0, 0).unwrap().formatted_value, "1");
        assert!(set.cell(2, 0).is_none());
        assert!(set.cell(0, 1).is_none());
    }

    #[test]
    fn test_cell_count_must_match_axes() {
        let catalog = CatalogBuilder::new("c").build();
        let err = CellSet::new(
            catalog,
            CellSetAxis::empty(AxisLocation::Columns),
            CellSetAxis::empty(AxisLocation::Rows),
            vec![Cell::empty()],
        )
        .unwrap_err();
        assert!(matches!(err, CellSetError::CellCountMismatch { expected: 0, actual: 1, .. }));
    }

    #[test]
    fn test_position_arity_checked() {
        let err = CellSetAxis::new(
            AxisLocation::Rows,
            vec![DimensionId(0), DimensionId(1)],
            vec![smallvec![MemberId(0)]],
        )
        .unwrap_err();
        assert!(matches!(err, CellSetError::PositionArity { expected: 2, actual: 1, .. }));
    }
}
