//! FILENAME: olap-engine/src/backend.rs
//! PURPOSE: The contract with whatever actually executes queries.
//! CONTEXT: `OlapBackend` is the seam to an OLAP server. `MemoryBackend` is an
//! in-process cube over a catalog: it expands selection operators, cross-joins
//! the dimensions of each axis and asks a caller-supplied closure for cell
//! values. Embedders use it for previews; the test suites use it everywhere.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, info};
use smallvec::SmallVec;

use crate::catalog::{Catalog, MemberId};
use crate::cellset::{Cell, CellSet, CellSetAxis, CellValue};
use crate::error::BackendError;
use crate::query::{AxisLocation, Query, Selection, SelectionOperator};

pub trait OlapBackend {
    /// Runs the query and returns a fresh result grid.
    fn execute(&self, query: &Query) -> Result<CellSet, BackendError>;

    /// Direct children of a member, in backend order.
    fn children_of(&self, member: MemberId) -> Result<Vec<MemberId>, BackendError>;
}

impl<T: OlapBackend + ?Sized> OlapBackend for Arc<T> {
    fn execute(&self, query: &Query) -> Result<CellSet, BackendError> {
        (**self).execute(query)
    }

    fn children_of(&self, member: MemberId) -> Result<Vec<MemberId>, BackendError> {
        (**self).children_of(member)
    }
}

/// Computes a cell from its coordinates: column members, then row members,
/// then slicer members.
pub type CellFn = dyn Fn(&[MemberId]) -> CellValue + Send + Sync;

// ============================================================================
// IN-MEMORY CUBE
// ============================================================================

pub struct MemoryBackend {
    catalog: Arc<Catalog>,
    values: Box<CellFn>,
    execution_failure: Mutex<Option<String>>,
    children_failure: Mutex<Option<String>>,
    executions: AtomicUsize,
}

impl MemoryBackend {
    pub fn new(
        catalog: Arc<Catalog>,
        values: impl Fn(&[MemberId]) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        MemoryBackend {
            catalog,
            values: Box::new(values),
            execution_failure: Mutex::new(None),
            children_failure: Mutex::new(None),
            executions: AtomicUsize::new(0),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Makes every following `execute` fail with `message` (None to recover).
    pub fn set_execution_failure(&self, message: Option<String>) {
        if let Ok(mut guard) = self.execution_failure.lock() {
            *guard = message;
        }
    }

    /// Makes every following `children_of` fail with `message`.
    pub fn set_children_failure(&self, message: Option<String>) {
        if let Ok(mut guard) = self.children_failure.lock() {
            *guard = message;
        }
    }

    /// Number of successful executions so far.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    fn configured_failure(slot: &Mutex<Option<String>>) -> Option<String> {
        slot.lock().ok().and_then(|guard| guard.clone())
    }

    fn build_axis(&self, query: &Query, location: AxisLocation) -> Result<CellSetAxis, BackendError> {
        let Some(axis) = query.axis(location) else {
            return Ok(CellSetAxis::empty(location));
        };

        let hierarchies: Vec<_> = axis.dimensions().iter().map(|d| d.dimension()).collect();
        let per_dimension: Vec<Vec<MemberId>> = axis
            .dimensions()
            .iter()
            .map(|d| expand_selections(&self.catalog, d.selections()))
            .collect();

        let tuples = cross_join(&per_dimension);
        CellSetAxis::new(location, hierarchies, tuples)
            .map_err(|e| BackendError::Execution(e.to_string()))
    }
}

impl OlapBackend for MemoryBackend {
    fn execute(&self, query: &Query) -> Result<CellSet, BackendError> {
        if let Some(message) = Self::configured_failure(&self.execution_failure) {
            return Err(BackendError::Execution(message));
        }
        if !Arc::ptr_eq(query.catalog(), &self.catalog) {
            return Err(BackendError::Execution(format!(
                "query '{}' is bound to cube '{}', not '{}'",
                query.name(),
                query.catalog().name(),
                self.catalog.name()
            )));
        }

        let columns = self.build_axis(query, AxisLocation::Columns)?;
        let rows = self.build_axis(query, AxisLocation::Rows)?;
        let slicer: Vec<MemberId> = query
            .axis(AxisLocation::Filter)
            .map(|axis| {
                axis.dimensions()
                    .iter()
                    .filter_map(|d| d.selections().first().map(|s| s.member))
                    .collect()
            })
            .unwrap_or_default();

        let mut cells = Vec::with_capacity(columns.position_count() * rows.position_count());
        let mut coordinates: Vec<MemberId> = Vec::new();
        for row in rows.positions() {
            for column in columns.positions() {
                coordinates.clear();
                coordinates.extend_from_slice(&column.members);
                coordinates.extend_from_slice(&row.members);
                coordinates.extend_from_slice(&slicer);
                cells.push(Cell::new((self.values)(&coordinates)));
            }
        }

        info!(
            "Executed query '{}': {} columns x {} rows",
            query.name(),
            columns.position_count(),
            rows.position_count()
        );
        self.executions.fetch_add(1, Ordering::SeqCst);
        CellSet::new(Arc::clone(&self.catalog), columns, rows, cells)
            .map_err(|e| BackendError::Execution(e.to_string()))
    }

    fn children_of(&self, member: MemberId) -> Result<Vec<MemberId>, BackendError> {
        if let Some(message) = Self::configured_failure(&self.children_failure) {
            return Err(BackendError::Unavailable(message));
        }
        let Some(m) = self.catalog.member(member) else {
            return Err(BackendError::UnknownMember(format!("#{}", member.0)));
        };
        debug!("Fetching children of {}", m.unique_name);
        Ok(m.children().to_vec())
    }
}

/// Members contributed by a dimension's selections, de-duplicated and in
/// hierarchy order.
pub fn expand_selections(catalog: &Catalog, selections: &[Selection]) -> Vec<MemberId> {
    let mut members: Vec<MemberId> = Vec::new();
    for selection in selections {
        for member in expand_selection(catalog, selection) {
            if !members.contains(&member) {
                members.push(member);
            }
        }
    }
    members.sort_by(|a, b| catalog.compare_hierarchy(*a, *b));
    members
}

fn expand_selection(catalog: &Catalog, selection: &Selection) -> Vec<MemberId> {
    let member = selection.member;
    match selection.operator {
        SelectionOperator::Member => vec![member],
        SelectionOperator::Children => catalog.children(member).to_vec(),
        SelectionOperator::IncludeChildren => {
            let mut out = vec![member];
            out.extend_from_slice(catalog.children(member));
            out
        }
        SelectionOperator::Siblings => match catalog.member(member) {
            Some(m) => match m.parent {
                Some(parent) => catalog.children(parent).to_vec(),
                None => catalog
                    .dimension(m.dimension)
                    .map(|d| d.roots().to_vec())
                    .unwrap_or_default(),
            },
            None => Vec::new(),
        },
        SelectionOperator::Descendants => {
            let mut out = vec![member];
            out.extend(catalog.descendants(member));
            out
        }
        SelectionOperator::Ancestors => {
            let mut out: Vec<MemberId> = catalog.ancestors(member).collect();
            out.reverse();
            out.push(member);
            out
        }
    }
}

/// Cartesian product of per-dimension member lists, outermost dimension
/// varying slowest. No dimensions, or any empty list, yields no tuples.
fn cross_join(per_dimension: &[Vec<MemberId>]) -> Vec<SmallVec<[MemberId; 4]>> {
    if per_dimension.is_empty() || per_dimension.iter().any(|d| d.is_empty()) {
        return Vec::new();
    }
    let mut tuples: Vec<SmallVec<[MemberId; 4]>> = vec![SmallVec::new()];
    for members in per_dimension {
        let mut next = Vec::with_capacity(tuples.len() * members.len());
        for tuple in &tuples {
            for member in members {
                let mut extended = tuple.clone();
                extended.push(*member);
                next.push(extended);
            }
        }
        tuples = next;
    }
    tuples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;

    fn fixture() -> (Arc<Catalog>, Vec<MemberId>) {
        let mut b = CatalogBuilder::new("Sales");
        let time = b.add_dimension("[Time]", "Time").unwrap();
        let year = b.add_member(time, None, "[Time].[2024]", "2024").unwrap();
        let q1 = b.add_member(time, Some(year), "[Time].[2024].[Q1]", "Q1").unwrap();
        let q2 = b.add_member(time, Some(year), "[Time].[2024].[Q2]", "Q2").unwrap();
        let jan = b.add_member(time, Some(q1), "[Time].[2024].[Q1].[Jan]", "Jan").unwrap();
        (b.build(), vec![year, q1, q2, jan])
    }

    #[test]
    fn test_operator_expansion() {
        let (catalog, m) = fixture();
        let (year, q1, q2, jan) = (m[0], m[1], m[2], m[3]);
        let expand = |member, operator| expand_selections(&catalog, &[Selection::new(member, operator)]);

        assert_eq!(expand(year, SelectionOperator::Children), vec![q1, q2]);
        assert_eq!(expand(year, SelectionOperator::IncludeChildren), vec![year, q1, q2]);
        assert_eq!(expand(q2, SelectionOperator::Siblings), vec![q1, q2]);
        assert_eq!(expand(year, SelectionOperator::Descendants), vec![year, q1, jan, q2]);
        assert_eq!(expand(jan, SelectionOperator::Ancestors), vec![year, q1, jan]);
    }

    #[test]
    fn test_overlapping_selections_deduplicated() {
        let (catalog, m) = fixture();
        let selections = [
            Selection::new(m[1], SelectionOperator::Member),
            Selection::new(m[0], SelectionOperator::IncludeChildren),
        ];
        assert_eq!(expand_selections(&catalog, &selections), vec![m[0], m[1], m[2]]);
    }

    #[test]
    fn test_cross_join_outer_varies_slowest() {
        let a = vec![MemberId(0), MemberId(1)];
        let b = vec![MemberId(5), MemberId(6)];
        let tuples = cross_join(&[a, b]);
        let flat: Vec<Vec<u32>> = tuples
            .iter()
            .map(|t| t.iter().map(|m| m.0).collect())
            .collect();
        assert_eq!(flat, vec![vec![0, 5], vec![0, 6], vec![1, 5], vec![1, 6]]);
        assert!(cross_join(&[]).is_empty());
    }

    #[test]
    fn test_children_failure_is_reported() {
        let (catalog, m) = fixture();
        let backend = MemoryBackend::new(catalog, |_| CellValue::Empty);
        backend.set_children_failure(Some("connection reset".to_string()));
        assert_eq!(
            backend.children_of(m[0]),
            Err(BackendError::Unavailable("connection reset".to_string()))
        );
        backend.set_children_failure(None);
        assert_eq!(backend.children_of(m[0]).unwrap(), vec![m[1], m[2]]);
    }
}
