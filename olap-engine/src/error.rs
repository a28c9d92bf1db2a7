//! FILENAME: olap-engine/src/error.rs

use thiserror::Error;

use crate::query::AxisLocation;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Unknown dimension id: {0}")]
    UnknownDimension(u32),

    #[error("Unknown parent member id: {0}")]
    UnknownParent(u32),

    #[error("Parent '{parent}' belongs to a different dimension than '{member}'")]
    ParentInOtherDimension { parent: String, member: String },

    #[error("Duplicate unique name: {0}")]
    DuplicateUniqueName(String),
}

/// Failures reported by a query execution backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Query execution failed: {0}")]
    Execution(String),

    #[error("Unknown member: {0}")]
    UnknownMember(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Dimension '{0}' is not part of the query's catalog")]
    DimensionNotInCatalog(String),

    #[error("Dimension '{0}' is already placed on an axis")]
    DimensionAlreadyOnAxis(String),

    #[error("Dimension '{0}' is not placed on any axis of the query")]
    UnknownDimension(String),

    #[error("Member '{member}' does not belong to dimension '{dimension}'")]
    MemberNotInDimension { member: String, dimension: String },

    #[error("Query has no {0:?} axis")]
    AxisMissing(AxisLocation),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CellSetError {
    #[error("Expected {expected} cells for a {columns}x{rows} cell set, got {actual}")]
    CellCountMismatch {
        columns: usize,
        rows: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Position {position} on the {location:?} axis has {actual} members, expected {expected}")]
    PositionArity {
        location: AxisLocation,
        position: usize,
        expected: usize,
        actual: usize,
    },
}
