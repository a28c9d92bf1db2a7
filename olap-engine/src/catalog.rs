//! FILENAME: olap-engine/src/catalog.rs
//! PURPOSE: Immutable cube metadata: dimensions and their member hierarchies.
//! CONTEXT: Members live in an arena owned by `Catalog` and are addressed by
//! `MemberId`. A catalog is built once, wrapped in an `Arc`, and then shared
//! read-only by every query copy and every cell set produced from it. Member
//! identity is handle equality, never string comparison.

use std::cmp::Ordering;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::CatalogError;

/// Handle to a member inside one catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub u32);

/// Handle to a dimension inside one catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DimensionId(pub u32);

// ============================================================================
// METADATA NODES
// ============================================================================

#[derive(Debug, Clone)]
pub struct Dimension {
    pub id: DimensionId,
    pub unique_name: String,
    pub name: String,
    roots: Vec<MemberId>,
}

impl Dimension {
    /// Top-level members of the dimension's hierarchy, in backend order.
    pub fn roots(&self) -> &[MemberId] {
        &self.roots
    }
}

/// A node in a dimension hierarchy.
#[derive(Debug, Clone)]
pub struct Member {
    pub id: MemberId,
    pub dimension: DimensionId,

    /// Identity within the cube, e.g. `[Time].[2024].[Q1]`.
    pub unique_name: String,

    /// Label shown in headers.
    pub name: String,

    /// Distance from the hierarchy root (roots are depth 0).
    pub depth: u32,

    /// Lookup link to the parent. Not ownership: the catalog owns every node.
    pub parent: Option<MemberId>,

    /// Position among its siblings, as defined by the backend.
    pub ordinal: u32,

    children: Vec<MemberId>,
}

impl Member {
    pub fn children(&self) -> &[MemberId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug)]
pub struct Catalog {
    name: String,
    dimensions: Vec<Dimension>,
    members: Vec<Member>,
    members_by_name: FxHashMap<String, MemberId>,
    dimensions_by_name: FxHashMap<String, DimensionId>,
}

impl Catalog {
    /// Name of the cube this catalog describes.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self, id: DimensionId) -> Option<&Dimension> {
        self.dimensions.get(id.0 as usize)
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(id.0 as usize)
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.dimensions.iter()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn find_member(&self, unique_name: &str) -> Option<MemberId> {
        self.members_by_name.get(unique_name).copied()
    }

    pub fn find_dimension(&self, unique_name: &str) -> Option<DimensionId> {
        self.dimensions_by_name.get(unique_name).copied()
    }

    /// Direct children of a member. Unknown members have none.
    pub fn children(&self, id: MemberId) -> &[MemberId] {
        self.member(id).map(|m| m.children()).unwrap_or(&[])
    }

    /// Strict ancestors of a member, nearest first.
    pub fn ancestors(&self, id: MemberId) -> Ancestors<'_> {
        Ancestors {
            catalog: self,
            next: self.member(id).and_then(|m| m.parent),
        }
    }

    /// All strict descendants of a member in depth-first, backend order.
    pub fn descendants(&self, id: MemberId) -> Vec<MemberId> {
        let mut out = Vec::new();
        let mut stack: Vec<MemberId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Display label for a member; empty when the handle is foreign.
    pub fn display_name(&self, id: MemberId) -> &str {
        self.member(id).map(|m| m.name.as_str()).unwrap_or("")
    }

    /// Describes a member for error messages and logs.
    pub fn describe(&self, id: MemberId) -> String {
        match self.member(id) {
            Some(m) => m.unique_name.clone(),
            None => format!("#{}", id.0),
        }
    }

    /// Hierarchy-aware ordering: dimension first, then the root-to-member
    /// ordinal path, so ancestors sort before descendants and siblings keep
    /// backend order.
    pub fn compare_hierarchy(&self, a: MemberId, b: MemberId) -> Ordering {
        let (Some(ma), Some(mb)) = (self.member(a), self.member(b)) else {
            return a.cmp(&b);
        };
        ma.dimension
            .cmp(&mb.dimension)
            .then_with(|| self.ordinal_path(a).cmp(&self.ordinal_path(b)))
    }

    fn ordinal_path(&self, id: MemberId) -> SmallVec<[u32; 8]> {
        let mut path: SmallVec<[u32; 8]> = SmallVec::new();
        let mut cursor = self.member(id);
        while let Some(member) = cursor {
            path.push(member.ordinal);
            cursor = member.parent.and_then(|p| self.member(p));
        }
        path.reverse();
        path
    }
}

/// Iterator over a member's ancestors. See [`Catalog::ancestors`].
pub struct Ancestors<'a> {
    catalog: &'a Catalog,
    next: Option<MemberId>,
}

impl Iterator for Ancestors<'_> {
    type Item = MemberId;

    fn next(&mut self) -> Option<MemberId> {
        let current = self.next?;
        self.next = self.catalog.member(current).and_then(|m| m.parent);
        Some(current)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Assembles a catalog. Parents must be added before their children, which
/// keeps depths consistent and makes cycles impossible.
pub struct CatalogBuilder {
    catalog: Catalog,
}

impl CatalogBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        CatalogBuilder {
            catalog: Catalog {
                name: name.into(),
                dimensions: Vec::new(),
                members: Vec::new(),
                members_by_name: FxHashMap::default(),
                dimensions_by_name: FxHashMap::default(),
            },
        }
    }

    pub fn add_dimension(
        &mut self,
        unique_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<DimensionId, CatalogError> {
        let unique_name = unique_name.into();
        if self.catalog.dimensions_by_name.contains_key(&unique_name) {
            return Err(CatalogError::DuplicateUniqueName(unique_name));
        }
        let id = DimensionId(self.catalog.dimensions.len() as u32);
        self.catalog.dimensions_by_name.insert(unique_name.clone(), id);
        self.catalog.dimensions.push(Dimension {
            id,
            unique_name,
            name: name.into(),
            roots: Vec::new(),
        });
        Ok(id)
    }

    pub fn add_member(
        &mut self,
        dimension: DimensionId,
        parent: Option<MemberId>,
        unique_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<MemberId, CatalogError> {
        let unique_name = unique_name.into();
        if self.catalog.dimension(dimension).is_none() {
            return Err(CatalogError::UnknownDimension(dimension.0));
        }
        if self.catalog.members_by_name.contains_key(&unique_name) {
            return Err(CatalogError::DuplicateUniqueName(unique_name));
        }

        let id = MemberId(self.catalog.members.len() as u32);
        let (depth, ordinal) = match parent {
            Some(parent_id) => {
                let parent_member = self
                    .catalog
                    .members
                    .get_mut(parent_id.0 as usize)
                    .ok_or(CatalogError::UnknownParent(parent_id.0))?;
                if parent_member.dimension != dimension {
                    return Err(CatalogError::ParentInOtherDimension {
                        parent: parent_member.unique_name.clone(),
                        member: unique_name,
                    });
                }
                let ordinal = parent_member.children.len() as u32;
                parent_member.children.push(id);
                (parent_member.depth + 1, ordinal)
            }
            None => {
                let dim = &mut self.catalog.dimensions[dimension.0 as usize];
                let ordinal = dim.roots.len() as u32;
                dim.roots.push(id);
                (0, ordinal)
            }
        };

        self.catalog.members_by_name.insert(unique_name.clone(), id);
        self.catalog.members.push(Member {
            id,
            dimension,
            unique_name,
            name: name.into(),
            depth,
            parent,
            ordinal,
            children: Vec::new(),
        });
        Ok(id)
    }

    pub fn build(self) -> Arc<Catalog> {
        Arc::new(self.catalog)
    }
}
