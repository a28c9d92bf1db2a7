//! FILENAME: olap-engine/src/lib.rs
//! OLAP query model for the cell-set renderer.
//!
//! Layers:
//! - `catalog`: Immutable cube metadata shared by every query copy
//! - `query`: Mutable query definition (axes, dimensions, selections)
//! - `cellset`: Immutable result grid produced by executing a query
//! - `backend`: Execution contract plus an in-memory cube
//! - `mutator`: Deep copy and drill expand/collapse
//! - `events`: Typed change notification

pub mod backend;
pub mod catalog;
pub mod cellset;
pub mod error;
pub mod events;
pub mod mutator;
pub mod query;

pub use backend::{expand_selections, MemoryBackend, OlapBackend};
pub use catalog::{Catalog, CatalogBuilder, Dimension, DimensionId, Member, MemberId};
pub use cellset::{Cell, CellSet, CellSetAxis, CellValue, Position};
pub use error::{BackendError, CatalogError, CellSetError, QueryError};
pub use events::{EventChannel, SubscriptionId};
pub use mutator::{deep_copy, is_descendant, toggle_expand_collapse, ToggleOutcome};
pub use query::{AxisLocation, Query, QueryAxis, QueryDimension, Selection, SelectionOperator};
