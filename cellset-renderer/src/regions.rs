//! FILENAME: cellset-renderer/src/regions.rs
//! PURPOSE: Where each header member was last drawn, for pointer hit testing.
//! CONTEXT: A member may be drawn in several places (e.g. a spanning row
//! header repeated at the top of the next page), so each member keeps a small
//! set of rectangles. Lookup scans members in the order they were recorded.

use olap_engine::MemberId;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, Default)]
pub struct MemberRegionMap {
    index: FxHashMap<MemberId, usize>,
    entries: Vec<(MemberId, SmallVec<[Rect; 2]>)>,
}

impl MemberRegionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, member: MemberId, region: Rect) {
        let slot = match self.index.get(&member) {
            Some(&slot) => slot,
            None => {
                self.entries.push((member, SmallVec::new()));
                let slot = self.entries.len() - 1;
                self.index.insert(member, slot);
                slot
            }
        };
        let regions = &mut self.entries[slot].1;
        if !regions.contains(&region) {
            regions.push(region);
        }
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.entries.clear();
    }

    pub fn regions_of(&self, member: MemberId) -> &[Rect] {
        self.index
            .get(&member)
            .map(|&slot| self.entries[slot].1.as_slice())
            .unwrap_or(&[])
    }

    /// First recorded member with a region containing `point`.
    pub fn hit_test(&self, point: Point) -> Option<MemberId> {
        self.entries
            .iter()
            .find(|(_, regions)| regions.iter().any(|r| r.contains(point)))
            .map(|(member, _)| *member)
    }

    /// Number of members with at least one region.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MemberId, &[Rect])> {
        self.entries.iter().map(|(m, r)| (*m, r.as_slice()))
    }
}
