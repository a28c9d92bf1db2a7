//! FILENAME: olap-engine/src/query.rs
//! Query Definition - The mutable description of what to ask the cube.
//!
//! A `Query` owns its axes, the dimensions placed on each axis and the member
//! selections of each dimension. Catalog metadata (dimensions, members) is
//! only referenced through handles, so independent query copies can share one
//! `Arc<Catalog>` while diverging freely in their own selections.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, DimensionId, MemberId};
use crate::error::QueryError;

// ============================================================================
// AXES AND SELECTIONS
// ============================================================================

/// Where a dimension is placed in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AxisLocation {
    Columns,
    Rows,
    /// Slicer axis: constrains the result without producing positions.
    Filter,
}

/// Which members a selection contributes, relative to its member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SelectionOperator {
    /// The member only.
    #[default]
    Member,
    /// The member's direct children, not the member.
    Children,
    /// The member followed by its direct children.
    IncludeChildren,
    /// The member and every other child of its parent.
    Siblings,
    /// The member and everything below it.
    Descendants,
    /// The path from the hierarchy root down to the member.
    Ancestors,
}

/// A chosen member plus its inclusion operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub member: MemberId,
    #[serde(default)]
    pub operator: SelectionOperator,
}

impl Selection {
    pub fn new(member: MemberId, operator: SelectionOperator) -> Self {
        Selection { member, operator }
    }
}

/// A dimension as configured within one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDimension {
    dimension: DimensionId,
    selections: Vec<Selection>,
}

impl QueryDimension {
    pub fn new(dimension: DimensionId) -> Self {
        QueryDimension {
            dimension,
            selections: Vec::new(),
        }
    }

    pub fn dimension(&self) -> DimensionId {
        self.dimension
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn create_selection(&self, member: MemberId, operator: SelectionOperator) -> Selection {
        Selection::new(member, operator)
    }

    /// Appends a selection. Returns false when an identical one exists.
    pub fn add_selection(&mut self, selection: Selection) -> bool {
        if self.selections.contains(&selection) {
            return false;
        }
        self.selections.push(selection);
        true
    }

    /// Removes every selection matching `predicate`, returning how many went.
    pub fn remove_selections(&mut self, mut predicate: impl FnMut(&Selection) -> bool) -> usize {
        let before = self.selections.len();
        self.selections.retain(|s| !predicate(s));
        before - self.selections.len()
    }

    pub fn clear_selections(&mut self) {
        self.selections.clear();
    }

    pub fn contains_member(&self, member: MemberId) -> bool {
        self.selections.iter().any(|s| s.member == member)
    }

    /// Restores canonical order: ancestors before descendants, siblings in
    /// backend order. The sort is stable for equal members.
    pub fn sort_selections(&mut self, catalog: &Catalog) {
        self.selections
            .sort_by(|a, b| catalog.compare_hierarchy(a.member, b.member));
    }
}

/// One axis of the query and the dimensions contributing to it, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAxis {
    location: AxisLocation,
    dimensions: Vec<QueryDimension>,
}

impl QueryAxis {
    pub fn new(location: AxisLocation) -> Self {
        QueryAxis {
            location,
            dimensions: Vec::new(),
        }
    }

    pub fn location(&self) -> AxisLocation {
        self.location
    }

    pub fn dimensions(&self) -> &[QueryDimension] {
        &self.dimensions
    }

    pub fn push_dimension(&mut self, dimension: QueryDimension) {
        self.dimensions.push(dimension);
    }

    pub fn find_dimension(&self, dimension: DimensionId) -> Option<&QueryDimension> {
        self.dimensions.iter().find(|d| d.dimension == dimension)
    }

    pub fn find_dimension_mut(&mut self, dimension: DimensionId) -> Option<&mut QueryDimension> {
        self.dimensions.iter_mut().find(|d| d.dimension == dimension)
    }
}

// ============================================================================
// QUERY
// ============================================================================

/// A query bound to one cube. Not `Clone`: use [`crate::mutator::deep_copy`]
/// to obtain an independent working copy.
#[derive(Debug)]
pub struct Query {
    name: String,
    catalog: Arc<Catalog>,
    axes: BTreeMap<AxisLocation, QueryAxis>,
}

impl Query {
    /// Creates a query with empty column and row axes.
    pub fn new(name: impl Into<String>, catalog: Arc<Catalog>) -> Self {
        let mut axes = BTreeMap::new();
        for location in [AxisLocation::Columns, AxisLocation::Rows] {
            axes.insert(location, QueryAxis::new(location));
        }
        Query {
            name: name.into(),
            catalog,
            axes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn axis(&self, location: AxisLocation) -> Option<&QueryAxis> {
        self.axes.get(&location)
    }

    pub fn axis_mut(&mut self, location: AxisLocation) -> Option<&mut QueryAxis> {
        self.axes.get_mut(&location)
    }

    /// Axes in location order (columns, rows, filter).
    pub fn axes(&self) -> impl Iterator<Item = &QueryAxis> {
        self.axes.values()
    }

    /// Replaces the axis at the same location.
    pub fn insert_axis(&mut self, axis: QueryAxis) {
        self.axes.insert(axis.location, axis);
    }

    /// Places a catalog dimension on an axis, creating the axis if needed.
    pub fn add_dimension(
        &mut self,
        location: AxisLocation,
        dimension: DimensionId,
    ) -> Result<&mut QueryDimension, QueryError> {
        let Some(dim) = self.catalog.dimension(dimension) else {
            return Err(QueryError::DimensionNotInCatalog(format!("#{}", dimension.0)));
        };
        if self.location_of(dimension).is_some() {
            return Err(QueryError::DimensionAlreadyOnAxis(dim.unique_name.clone()));
        }

        let axis = self
            .axes
            .entry(location)
            .or_insert_with(|| QueryAxis::new(location));
        axis.dimensions.push(QueryDimension::new(dimension));
        let index = axis.dimensions.len() - 1;
        Ok(&mut axis.dimensions[index])
    }

    /// Axis holding the given dimension, if it is placed at all.
    pub fn location_of(&self, dimension: DimensionId) -> Option<AxisLocation> {
        self.axes
            .values()
            .find(|axis| axis.find_dimension(dimension).is_some())
            .map(|axis| axis.location)
    }

    pub fn dimension(&self, dimension: DimensionId) -> Option<&QueryDimension> {
        self.axes.values().find_map(|axis| axis.find_dimension(dimension))
    }

    pub fn dimension_mut(&mut self, dimension: DimensionId) -> Option<&mut QueryDimension> {
        self.axes
            .values_mut()
            .find_map(|axis| axis.find_dimension_mut(dimension))
    }

    /// Adds a selection to the member's dimension and restores canonical
    /// order. Returns false if the same selection was already present.
    pub fn select(
        &mut self,
        member: MemberId,
        operator: SelectionOperator,
    ) -> Result<bool, QueryError> {
        let catalog = Arc::clone(&self.catalog);
        let Some(m) = catalog.member(member) else {
            return Err(QueryError::Backend(crate::error::BackendError::UnknownMember(
                format!("#{}", member.0),
            )));
        };
        let dimension_name = catalog
            .dimension(m.dimension)
            .map(|d| d.unique_name.clone())
            .unwrap_or_default();
        let target = self
            .dimension_mut(m.dimension)
            .ok_or(QueryError::UnknownDimension(dimension_name))?;

        let added = target.add_selection(Selection::new(member, operator));
        target.sort_selections(&catalog);
        Ok(added)
    }
}
