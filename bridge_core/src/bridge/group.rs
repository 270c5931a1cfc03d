//! # Girder Groups
//!
//! A group is a contiguous run of spans sharing one set of girder lines. It
//! references its boundary piers by ID, so inserting or removing piers
//! elsewhere never invalidates it; the pier indices it covers are resolved
//! through the bridge.
//!
//! Girder naming and top width are partitioned into contiguous girder ranges
//! ([`GirderRange`]). The ranges always cover `0..girder_count` exactly.

use serde::{Deserialize, Serialize};

use super::girder::Girder;
use super::types::{MemberEnd, TopWidthType};
use crate::ids::{GroupId, PierId};

/// A value shared by girders `first..=last`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GirderRange<T> {
    pub first: usize,
    pub last: usize,
    pub value: T,
}

impl<T> GirderRange<T> {
    pub fn new(first: usize, last: usize, value: T) -> Self {
        GirderRange { first, last, value }
    }

    pub fn contains(&self, girder: usize) -> bool {
        self.first <= girder && girder <= self.last
    }
}

/// Girders sharing one girder type name
pub type GirderTypeGroup = GirderRange<String>;

/// Girders sharing one top width
pub type TopWidthGroup = GirderRange<TopWidth>;

/// Top flange width definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopWidth {
    pub kind: TopWidthType,
    pub left_ft: f64,
    pub right_ft: f64,
}

impl Default for TopWidth {
    fn default() -> Self {
        TopWidth {
            kind: TopWidthType::Symmetric,
            left_ft: 3.0,
            right_ft: 3.0,
        }
    }
}

// =============================================================================
// RANGE HELPERS
// =============================================================================

fn value_at<T>(ranges: &[GirderRange<T>], girder: usize) -> Option<&T> {
    ranges.iter().find(|r| r.contains(girder)).map(|r| &r.value)
}

/// Fit the ranges to `count` girders: trailing ranges are dropped and the
/// last one is stretched or trimmed to end at `count - 1`.
fn fit_ranges<T: Clone>(ranges: &mut Vec<GirderRange<T>>, count: usize, fallback: T) {
    if count == 0 {
        ranges.clear();
        return;
    }
    ranges.retain(|r| r.first < count);
    match ranges.last_mut() {
        Some(last) => last.last = count - 1,
        None => ranges.push(GirderRange::new(0, count - 1, fallback)),
    }
}

fn join_ranges<T>(ranges: &mut Vec<GirderRange<T>>, count: usize, value: T) {
    ranges.clear();
    if count > 0 {
        ranges.push(GirderRange::new(0, count - 1, value));
    }
}

fn expand_ranges<T: Clone>(ranges: &mut Vec<GirderRange<T>>, count: usize) {
    let expanded = (0..count)
        .filter_map(|g| value_at(ranges, g).map(|v| GirderRange::new(g, g, v.clone())))
        .collect();
    *ranges = expanded;
}

fn ranges_cover<T>(ranges: &[GirderRange<T>], count: usize) -> bool {
    let mut next = 0;
    for r in ranges {
        if r.first != next || r.last < r.first {
            return false;
        }
        next = r.last + 1;
    }
    next == count
}

// =============================================================================
// GIRDER GROUP
// =============================================================================

#[derive(Debug, Clone)]
pub struct GirderGroup {
    pub(crate) index: usize,
    pub(crate) id: GroupId,
    pub(crate) start_pier: PierId,
    pub(crate) end_pier: PierId,
    pub(crate) girders: Vec<Girder>,
    pub(crate) type_groups: Vec<GirderTypeGroup>,
    pub(crate) top_width_groups: Vec<TopWidthGroup>,
    /// Slab offset (in) at the start and end of each girder
    pub(crate) slab_offsets_in: Vec<[f64; 2]>,
}

impl GirderGroup {
    pub(crate) fn new(id: GroupId, start_pier: PierId, end_pier: PierId) -> Self {
        GirderGroup {
            index: 0,
            id,
            start_pier,
            end_pier,
            girders: Vec::new(),
            type_groups: Vec::new(),
            top_width_groups: Vec::new(),
            slab_offsets_in: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn start_pier_id(&self) -> PierId {
        self.start_pier
    }

    pub fn end_pier_id(&self) -> PierId {
        self.end_pier
    }

    pub fn pier_id(&self, end: MemberEnd) -> PierId {
        match end {
            MemberEnd::Start => self.start_pier,
            MemberEnd::End => self.end_pier,
        }
    }

    pub fn girder_count(&self) -> usize {
        self.girders.len()
    }

    pub fn girders(&self) -> &[Girder] {
        &self.girders
    }

    pub fn girder(&self, index: usize) -> Option<&Girder> {
        self.girders.get(index)
    }

    pub fn type_groups(&self) -> &[GirderTypeGroup] {
        &self.type_groups
    }

    pub fn top_width_groups(&self) -> &[TopWidthGroup] {
        &self.top_width_groups
    }

    /// Girder type name of girder `index`
    pub fn girder_name(&self, index: usize) -> Option<&str> {
        value_at(&self.type_groups, index).map(String::as_str)
    }

    pub fn top_width(&self, index: usize) -> Option<&TopWidth> {
        value_at(&self.top_width_groups, index)
    }

    /// Slab offset as stored on the group, without bridge-level resolution
    pub fn stored_slab_offset_in(&self, girder: usize, end: MemberEnd) -> Option<f64> {
        self.slab_offsets_in.get(girder).map(|s| s[end.slot()])
    }

    pub(crate) fn set_slab_offset(&mut self, girder: usize, end: MemberEnd, value_in: f64) {
        if let Some(s) = self.slab_offsets_in.get_mut(girder) {
            s[end.slot()] = value_in;
        }
    }

    pub(crate) fn set_all_slab_offsets(&mut self, value_in: f64) {
        self.slab_offsets_in.iter_mut().for_each(|s| *s = [value_in; 2]);
    }

    // -------------------------------------------------------------------------
    // Partitions
    // -------------------------------------------------------------------------

    /// One girder type for every girder
    pub(crate) fn join_girder_types(&mut self, name: impl Into<String>) {
        join_ranges(&mut self.type_groups, self.girders.len(), name.into());
    }

    /// One girder type range per girder
    pub(crate) fn expand_girder_types(&mut self) {
        expand_ranges(&mut self.type_groups, self.girders.len());
    }

    pub(crate) fn set_girder_type_name(&mut self, range: usize, name: impl Into<String>) -> bool {
        match self.type_groups.get_mut(range) {
            Some(r) => {
                r.value = name.into();
                true
            }
            None => false,
        }
    }

    pub(crate) fn join_top_widths(&mut self, top_width: TopWidth) {
        join_ranges(&mut self.top_width_groups, self.girders.len(), top_width);
    }

    pub(crate) fn expand_top_widths(&mut self) {
        expand_ranges(&mut self.top_width_groups, self.girders.len());
    }

    pub(crate) fn set_top_width(&mut self, range: usize, top_width: TopWidth) -> bool {
        match self.top_width_groups.get_mut(range) {
            Some(r) => {
                r.value = top_width;
                true
            }
            None => false,
        }
    }

    /// Bring partitions and per-girder data in line with the girder list.
    pub(crate) fn fit_to_girders(&mut self, default_name: &str, default_top_width: TopWidth, default_slab_in: f64) {
        let count = self.girders.len();
        fit_ranges(&mut self.type_groups, count, default_name.to_string());
        fit_ranges(&mut self.top_width_groups, count, default_top_width);
        let fill = self.slab_offsets_in.last().copied().unwrap_or([default_slab_in; 2]);
        self.slab_offsets_in.resize(count, fill);
        for (i, g) in self.girders.iter_mut().enumerate() {
            g.index = i;
        }
    }

    pub(crate) fn partitions_valid(&self) -> bool {
        let count = self.girders.len();
        ranges_cover(&self.type_groups, count)
            && ranges_cover(&self.top_width_groups, count)
            && self.slab_offsets_in.len() == count
    }

    pub(crate) fn same_as(&self, other: &GirderGroup) -> bool {
        self.index == other.index
            && self.id == other.id
            && self.start_pier == other.start_pier
            && self.end_pier == other.end_pier
            && self.girders == other.girders
            && self.type_groups == other.type_groups
            && self.top_width_groups == other.top_width_groups
            && self.slab_offsets_in == other.slab_offsets_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::girder::SegmentData;
    use crate::ids::{GirderId, SegmentId};

    fn group_with(count: usize) -> GirderGroup {
        let mut group = GirderGroup::new(GroupId(0), PierId(0), PierId(1));
        for i in 0..count {
            group
                .girders
                .push(Girder::new(GirderId(i as u64), SegmentId(i as u64), SegmentData::default()));
        }
        group.fit_to_girders("W74G", TopWidth::default(), 10.0);
        group
    }

    #[test]
    fn test_fit_creates_single_ranges() {
        let group = group_with(4);
        assert_eq!(group.type_groups().len(), 1);
        assert_eq!(group.type_groups()[0].last, 3);
        assert_eq!(group.girder_name(2), Some("W74G"));
        assert_eq!(group.stored_slab_offset_in(3, MemberEnd::End), Some(10.0));
        assert!(group.partitions_valid());
    }

    #[test]
    fn test_expand_then_shrink() {
        let mut group = group_with(4);
        group.expand_girder_types();
        assert_eq!(group.type_groups().len(), 4);
        assert!(group.set_girder_type_name(3, "WF100G"));

        group.girders.truncate(2);
        group.fit_to_girders("W74G", TopWidth::default(), 10.0);
        assert_eq!(group.type_groups().len(), 2);
        assert_eq!(group.type_groups()[1].last, 1);
        assert!(group.partitions_valid());
    }

    #[test]
    fn test_grow_extends_last_range() {
        let mut group = group_with(2);
        group.set_slab_offset(1, MemberEnd::Start, 9.0);
        for i in 2..5 {
            group
                .girders
                .push(Girder::new(GirderId(i), SegmentId(i), SegmentData::default()));
        }
        group.fit_to_girders("W74G", TopWidth::default(), 10.0);
        assert_eq!(group.type_groups()[0].last, 4);
        assert_eq!(group.stored_slab_offset_in(4, MemberEnd::Start), Some(9.0));
        assert_eq!(group.girders()[4].index(), 4);
    }

    #[test]
    fn test_ranges_cover_detects_gaps() {
        let ranges = vec![GirderRange::new(0, 1, ()), GirderRange::new(3, 4, ())];
        assert!(!ranges_cover(&ranges, 5));
        let ranges = vec![GirderRange::new(0, 1, ()), GirderRange::new(2, 4, ())];
        assert!(ranges_cover(&ranges, 5));
    }
}
