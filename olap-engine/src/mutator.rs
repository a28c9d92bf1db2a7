//! FILENAME: olap-engine/src/mutator.rs
//! Query Mutator - drill-down edits applied to a query definition.
//!
//! - `is_descendant`: strict ancestry test along parent links
//! - `deep_copy`: structural copy sharing only catalog metadata
//! - `toggle_expand_collapse`: show or hide a member's children on its axis

use std::sync::Arc;

use log::{debug, info, warn};

use crate::backend::OlapBackend;
use crate::catalog::{Catalog, DimensionId, MemberId};
use crate::error::QueryError;
use crate::query::{AxisLocation, Query, QueryAxis, QueryDimension, Selection, SelectionOperator};

/// Result of a drill toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The member's children were added to its dimension.
    Expanded { added: usize },
    /// Every selected descendant of the member was removed.
    Collapsed { removed: usize },
    /// The member is not selected in any column or row dimension, so there is
    /// nothing to expand into. The query was not touched.
    NoEligibleDimension,
    /// No member was selected to toggle.
    NothingSelected,
}

/// True iff `parent` is a strict ancestor of `candidate`. A member is never
/// its own descendant.
pub fn is_descendant(catalog: &Catalog, parent: MemberId, candidate: MemberId) -> bool {
    if candidate == parent {
        return false;
    }
    catalog.ancestors(candidate).any(|ancestor| ancestor == parent)
}

/// Builds an independent copy of `query`. Axes, query dimensions and
/// selections are new objects; the catalog is shared.
pub fn deep_copy(query: &Query) -> Result<Query, QueryError> {
    let catalog = query.catalog();
    let mut copy = Query::new(query.name(), Arc::clone(catalog));

    for axis in query.axes() {
        let mut copied_axis = QueryAxis::new(axis.location());
        for dimension in axis.dimensions() {
            if catalog.dimension(dimension.dimension()).is_none() {
                return Err(QueryError::DimensionNotInCatalog(format!(
                    "#{}",
                    dimension.dimension().0
                )));
            }
            let mut copied_dimension = QueryDimension::new(dimension.dimension());
            for selection in dimension.selections() {
                let copied = copied_dimension.create_selection(selection.member, selection.operator);
                copied_dimension.add_selection(copied);
            }
            copied_axis.push_dimension(copied_dimension);
        }
        copy.insert_axis(copied_axis);
    }

    debug!("Copied query '{}'", query.name());
    Ok(copy)
}

/// Expands `member` if none of its descendants are currently selected,
/// otherwise collapses it. Children are fetched before anything is modified,
/// so a backend failure leaves the query exactly as it was.
pub fn toggle_expand_collapse(
    query: &mut Query,
    member: MemberId,
    backend: &dyn OlapBackend,
) -> Result<ToggleOutcome, QueryError> {
    let catalog = Arc::clone(query.catalog());

    let mut is_leaf = true;
    let mut containing: Option<(AxisLocation, DimensionId)> = None;
    for location in [AxisLocation::Columns, AxisLocation::Rows] {
        let Some(axis) = query.axis(location) else {
            continue;
        };
        for dimension in axis.dimensions() {
            for selection in dimension.selections() {
                if is_descendant(&catalog, member, selection.member) {
                    is_leaf = false;
                }
                if selection.member == member {
                    containing = Some((location, dimension.dimension()));
                }
            }
        }
    }

    let Some((location, dimension)) = containing else {
        warn!(
            "Cannot toggle {}: it is not selected on the column or row axis",
            catalog.describe(member)
        );
        return Ok(ToggleOutcome::NoEligibleDimension);
    };

    let children = if is_leaf {
        Some(backend.children_of(member)?)
    } else {
        None
    };

    let target = query
        .axis_mut(location)
        .and_then(|axis| axis.find_dimension_mut(dimension))
        .ok_or(QueryError::AxisMissing(location))?;

    let outcome = match children {
        Some(children) => {
            let mut added = 0;
            for child in children {
                if target.add_selection(Selection::new(child, SelectionOperator::Member)) {
                    added += 1;
                }
            }
            target.sort_selections(&catalog);
            ToggleOutcome::Expanded { added }
        }
        None => {
            let removed =
                target.remove_selections(|s| is_descendant(&catalog, member, s.member));
            ToggleOutcome::Collapsed { removed }
        }
    };

    info!("Toggled {}: {:?}", catalog.describe(member), outcome);
    Ok(outcome)
}
