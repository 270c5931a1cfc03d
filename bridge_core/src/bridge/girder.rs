//! # Girders, Segments and Closure Joints
//!
//! A girder is an ordered chain of precast segments. Consecutive segments are
//! joined by a closure joint that sits at a support: an interior pier with a
//! closure connection or a temporary support with a closure connection.
//!
//! ```text
//!  group start                                             group end
//!      |==== seg 0 ====|cj 0|==== seg 1 ====|cj 1|== seg 2 ==|
//!                      ^ TS 3               ^ pier 2
//! ```
//!
//! Segment extents are never stored. Segment `i` starts at the support of
//! closure `i - 1` (or the group's start pier) and ends at the support of
//! closure `i` (or the group's end pier), so moving a pier or a temporary
//! support cannot leave a segment with stale ends.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::SegmentVariation;
use crate::ids::{ClosureId, GirderId, IdAllocator, PierId, SegmentId, TempSupportId};

/// A support a closure joint can sit on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportRef {
    Pier(PierId),
    TemporarySupport(TempSupportId),
}

impl fmt::Display for SupportRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupportRef::Pier(id) => write!(f, "{}", id),
            SupportRef::TemporarySupport(id) => write!(f, "{}", id),
        }
    }
}

/// Segment attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SegmentData {
    pub variation: SegmentVariation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub(crate) id: SegmentId,
    pub(crate) data: SegmentData,
}

impl Segment {
    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn data(&self) -> &SegmentData {
        &self.data
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosureJoint {
    pub(crate) id: ClosureId,
    pub(crate) support: SupportRef,
}

impl ClosureJoint {
    pub fn id(&self) -> ClosureId {
        self.id
    }

    pub fn support(&self) -> SupportRef {
        self.support
    }
}

/// One girder line within a group.
#[derive(Debug, Clone, PartialEq)]
pub struct Girder {
    pub(crate) index: usize,
    pub(crate) id: GirderId,
    pub(crate) segments: Vec<Segment>,
    pub(crate) closures: Vec<ClosureJoint>,
}

/// Old-to-new ID pairs produced when a girder is replicated.
#[derive(Debug, Default)]
pub(crate) struct ReplicatedIds {
    pub segments: Vec<(SegmentId, SegmentId)>,
    pub closures: Vec<(ClosureId, ClosureId)>,
}

impl Girder {
    /// A girder made of a single segment
    pub(crate) fn new(id: GirderId, segment: SegmentId, data: SegmentData) -> Self {
        Girder {
            index: 0,
            id,
            segments: vec![Segment { id: segment, data }],
            closures: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> GirderId {
        self.id
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn closures(&self) -> &[ClosureJoint] {
        &self.closures
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Index of the closure joint sitting on `support`
    pub fn closure_at(&self, support: SupportRef) -> Option<usize> {
        self.closures.iter().position(|c| c.support == support)
    }

    /// Segments on either side of the closure at `support`
    pub fn segments_at(&self, support: SupportRef) -> Option<(SegmentId, SegmentId)> {
        let k = self.closure_at(support)?;
        Some((self.segments[k].id, self.segments[k + 1].id))
    }

    /// Split segment `position` with a new closure at `support`. The new
    /// segment takes the place ahead of the closure and copies the split
    /// segment's data. Returns the ID of the segment that was split.
    pub(crate) fn split(
        &mut self,
        position: usize,
        support: SupportRef,
        segment: SegmentId,
        closure: ClosureId,
    ) -> SegmentId {
        let position = position.min(self.segments.len() - 1);
        let source = self.segments[position].clone();
        self.segments.insert(
            position + 1,
            Segment {
                id: segment,
                data: source.data,
            },
        );
        self.closures.insert(position, ClosureJoint { id: closure, support });
        source.id
    }

    /// Remove closure `index` and merge the segment ahead of it into the one
    /// back of it. Returns the removed closure and segment IDs.
    pub(crate) fn join(&mut self, index: usize) -> (ClosureId, SegmentId) {
        let closure = self.closures.remove(index);
        let segment = self.segments.remove(index + 1);
        (closure.id, segment.id)
    }

    /// Copy this girder's structure with fresh IDs.
    pub(crate) fn replicate(&self, ids: &mut IdAllocator) -> (Girder, ReplicatedIds) {
        let mut map = ReplicatedIds::default();
        let segments = self
            .segments
            .iter()
            .map(|s| {
                let id = ids.next_segment_id();
                map.segments.push((s.id, id));
                Segment {
                    id,
                    data: s.data.clone(),
                }
            })
            .collect();
        let closures = self
            .closures
            .iter()
            .map(|c| {
                let id = ids.next_closure_id();
                map.closures.push((c.id, id));
                ClosureJoint { id, support: c.support }
            })
            .collect();
        let girder = Girder {
            index: 0,
            id: ids.next_girder_id(),
            segments,
            closures,
        };
        (girder, map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn girder() -> Girder {
        Girder::new(GirderId(0), SegmentId(0), SegmentData::default())
    }

    #[test]
    fn test_split_then_join_restores_single_segment() {
        let mut g = girder();
        let ts = SupportRef::TemporarySupport(TempSupportId(4));
        let split = g.split(0, ts, SegmentId(1), ClosureId(0));
        assert_eq!(split, SegmentId(0));
        assert_eq!(g.segment_count(), 2);
        assert_eq!(g.segments_at(ts), Some((SegmentId(0), SegmentId(1))));

        let (closure, segment) = g.join(0);
        assert_eq!(closure, ClosureId(0));
        assert_eq!(segment, SegmentId(1));
        assert_eq!(g.segment_count(), 1);
        assert!(g.closures().is_empty());
    }

    #[test]
    fn test_split_keeps_closures_ordered() {
        let mut g = girder();
        let a = SupportRef::TemporarySupport(TempSupportId(0));
        let b = SupportRef::Pier(PierId(1));
        g.split(0, b, SegmentId(1), ClosureId(0));
        // a lies back of b, so it splits segment 0
        g.split(0, a, SegmentId(2), ClosureId(1));
        assert_eq!(g.closures()[0].support(), a);
        assert_eq!(g.closures()[1].support(), b);
        let ids: Vec<_> = g.segments().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![SegmentId(0), SegmentId(2), SegmentId(1)]);
    }

    #[test]
    fn test_replicate_uses_fresh_ids() {
        let mut ids = IdAllocator::new();
        ids.update_next_id(crate::ids::EntityKind::Segment, 10);
        let mut g = girder();
        g.split(0, SupportRef::Pier(PierId(2)), SegmentId(5), ClosureId(3));
        let (copy, map) = g.replicate(&mut ids);
        assert_eq!(copy.segment_count(), 2);
        assert_eq!(map.segments, vec![(SegmentId(0), SegmentId(11)), (SegmentId(5), SegmentId(12))]);
        assert_eq!(map.closures, vec![(ClosureId(3), ClosureId(0))]);
        assert_eq!(copy.closures()[0].support(), SupportRef::Pier(PierId(2)));
    }
}
