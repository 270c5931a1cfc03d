//! Girder-level edits that need the whole bridge: splitting and joining
//! segments at supports, changing a group's girder count, and keeping
//! timeline references for segments and closures in step.

use tracing::debug;

use super::girder::{Girder, SupportRef};
use super::types::SegmentConnection;
use super::BridgeDescription;
use crate::errors::{BridgeError, BridgeResult};
use crate::ids::{SegmentId, TempSupportId};
use crate::timeline::{check_event, EventIndex, Timeline};

impl BridgeDescription {
    pub(crate) fn station_of_support(&self, support: SupportRef) -> Option<f64> {
        match support {
            SupportRef::Pier(id) => self.pier_index_of(id).map(|i| self.piers[i].station()),
            SupportRef::TemporarySupport(id) => self
                .temp_supports
                .iter()
                .find(|t| t.id == id)
                .map(|t| t.station()),
        }
    }

    /// Closure slot for a new joint at `station` in group `group`.
    fn closure_position(&self, group: usize, station: f64) -> usize {
        self.groups[group]
            .girders
            .first()
            .map(|g| {
                g.closures
                    .iter()
                    .filter(|c| self.station_of_support(c.support).is_some_and(|s| s < station))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Split every girder of `group` with a closure joint at `support`.
    ///
    /// The new segment inherits the erection event of the segment it was
    /// split from; the closure is cast in `closure_event`, or in that same
    /// erection event when none is given.
    pub(crate) fn split_group_at(
        &mut self,
        timeline: &mut dyn Timeline,
        group: usize,
        support: SupportRef,
        station: f64,
        closure_event: Option<EventIndex>,
    ) {
        let position = self.closure_position(group, station);
        for g in 0..self.groups[group].girders.len() {
            let segment = self.ids.next_segment_id();
            let closure = self.ids.next_closure_id();
            let split = self.groups[group].girders[g].split(position, support, segment, closure);
            let erection = timeline.segment_erection_event(split);
            if let Some(event) = erection {
                timeline.register_segment_erection(event, segment);
            }
            if let Some(event) = closure_event.or(erection) {
                timeline.register_closure_casting(event, closure);
            }
        }
        debug!(group, %support, position, "split segments");
    }

    /// Remove the closure joint at `support` from every girder of `group`.
    pub(crate) fn join_group_at(&mut self, timeline: &mut dyn Timeline, group: usize, support: SupportRef) {
        for girder in &mut self.groups[group].girders {
            if let Some(k) = girder.closure_at(support) {
                let (closure, segment) = girder.join(k);
                timeline.remove_closure(closure);
                timeline.remove_segment(segment);
            }
        }
        debug!(group, %support, "joined segments");
    }

    /// Forget every segment and closure of `girder` in the timeline.
    pub(crate) fn retire_girder(timeline: &mut dyn Timeline, girder: &Girder) {
        for s in &girder.segments {
            timeline.remove_segment(s.id);
        }
        for c in &girder.closures {
            timeline.remove_closure(c.id);
        }
    }

    /// Add girders (copies of the last one) or drop girders from the end.
    pub(crate) fn resize_group_girders(&mut self, timeline: &mut dyn Timeline, group: usize, count: usize) {
        let current = self.groups[group].girders.len();
        if count > current {
            let Some(template) = self.groups[group].girders.last().cloned() else {
                return;
            };
            for _ in current..count {
                let (girder, map) = template.replicate(&mut self.ids);
                for (old, new) in map.segments {
                    if let Some(event) = timeline.segment_erection_event(old) {
                        timeline.register_segment_erection(event, new);
                    }
                }
                for (old, new) in map.closures {
                    if let Some(event) = timeline.closure_casting_event(old) {
                        timeline.register_closure_casting(event, new);
                    }
                }
                self.groups[group].girders.push(girder);
            }
        } else {
            for girder in self.groups[group].girders.drain(count..) {
                Self::retire_girder(timeline, &girder);
            }
        }
        let name = self.settings.girder_name.clone();
        let top_width = self.settings.top_width;
        let slab = self.settings.slab_offset_in;
        self.groups[group].fit_to_girders(&name, top_width, slab);
    }

    /// Register each girder's segments of `group` with the events used by
    /// girder 0 of `template` (first segment event for every segment).
    pub(crate) fn copy_segment_events(&self, timeline: &mut dyn Timeline, template: usize, group: usize) {
        let event = self.groups[template]
            .girders
            .first()
            .and_then(|g| g.segments.first())
            .and_then(|s| timeline.segment_erection_event(s.id));
        if let Some(event) = event {
            for girder in &self.groups[group].girders {
                for s in &girder.segments {
                    timeline.register_segment_erection(event, s.id);
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Public girder edits
    // -------------------------------------------------------------------------

    /// Change the number of girders in one group.
    ///
    /// Fails when the bridge uses one girder count for every group; change
    /// the bridge-level count instead.
    pub fn set_group_girder_count(
        &mut self,
        timeline: &mut dyn Timeline,
        group: usize,
        count: usize,
    ) -> BridgeResult<()> {
        const OP: &str = "set group girder count";
        if group >= self.groups.len() {
            return Err(BridgeError::not_found("Girder group", group));
        }
        if count == 0 {
            return Err(BridgeError::invalid_input("count", "0", "A group needs at least one girder"));
        }
        if self.settings.same_number_of_girders {
            return Err(self.reject(OP, "the bridge uses the same number of girders in every group"));
        }
        self.resize_group_girders(timeline, group, count);
        self.finish_edit();
        debug!(group, count, "group girder count changed");
        Ok(())
    }

    /// Change how segments meet at an interior pier. Switching between a
    /// continuous segment and a closure joint splits or joins every girder
    /// of the group at the pier.
    pub fn set_segment_connection(
        &mut self,
        timeline: &mut dyn Timeline,
        pier: usize,
        connection: SegmentConnection,
        closure_event: Option<EventIndex>,
    ) -> BridgeResult<()> {
        const OP: &str = "set segment connection";
        let p = self.piers.get(pier).ok_or_else(|| BridgeError::not_found("Pier", pier))?;
        let Some(prev_span) = p.prev_span else {
            return Err(self.reject(OP, format!("pier {} is the first pier", pier)));
        };
        let group = self.group_of_span(prev_span)?;
        let (_, end) = self.group_range(group)?;
        if pier >= end {
            return Err(self.reject(OP, format!("pier {} is a group boundary pier", pier)));
        }
        check_event(timeline, "closure_event", closure_event)?;

        let id = p.id;
        let station = p.station();
        let old = p.data.segment_connection;
        let support = SupportRef::Pier(id);
        if connection.has_closure() && !old.has_closure() {
            self.split_group_at(timeline, group, support, station, closure_event);
        } else if !connection.has_closure() && old.has_closure() {
            self.join_group_at(timeline, group, support);
        }
        self.piers[pier].data.segment_connection = connection;
        self.finish_edit();
        Ok(())
    }

    /// Segments of girder 0 on either side of a closure-joint temporary support
    pub fn segments_at_temporary_support(&self, id: TempSupportId) -> Option<(SegmentId, SegmentId)> {
        let ts = self.temp_supports.iter().find(|t| t.id == id)?;
        let group = self.group_of_span(ts.span).ok()?;
        self.groups[group]
            .girders
            .first()?
            .segments_at(SupportRef::TemporarySupport(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{InsertSpan, PierFace};
    use crate::timeline::{NullTimeline, TimelineRegistry};

    fn two_span() -> BridgeDescription {
        let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        bridge
            .insert_span(&mut NullTimeline, InsertSpan::new(1, PierFace::Ahead, 100.0))
            .unwrap();
        bridge
    }

    #[test]
    fn test_closure_at_interior_pier_splits_every_girder() {
        let mut bridge = two_span();
        let mut timeline = TimelineRegistry::with_events(["Erect", "Cast"]);
        bridge
            .set_segment_connection(&mut timeline, 1, SegmentConnection::ContinuousClosureJoint, Some(1))
            .unwrap();

        let group = bridge.girder_group(0).unwrap();
        assert!(group.girders().iter().all(|g| g.segment_count() == 2));
        assert_eq!(timeline.events[1].cast_closures.len(), group.girder_count());

        bridge
            .set_segment_connection(&mut timeline, 1, SegmentConnection::ContinuousSegment, None)
            .unwrap();
        let group = bridge.girder_group(0).unwrap();
        assert!(group.girders().iter().all(|g| g.segment_count() == 1));
        assert!(timeline.events[1].cast_closures.is_empty());
    }

    #[test]
    fn test_segment_connection_rejected_at_abutment() {
        let mut bridge = two_span();
        let result = bridge.set_segment_connection(
            &mut NullTimeline,
            0,
            SegmentConnection::ContinuousClosureJoint,
            None,
        );
        assert!(matches!(result, Err(BridgeError::Precondition { .. })));
        assert_eq!(bridge, two_span());
    }

    #[test]
    fn test_group_girder_count_copies_segment_events() {
        let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        let mut timeline = TimelineRegistry::with_events(["Erect girders"]);
        let last = bridge.girder_group(0).unwrap().girders().last().unwrap().segments()[0].id();
        timeline.register_segment_erection(0, last);

        bridge.set_group_girder_count(&mut timeline, 0, 7).unwrap();
        assert_eq!(bridge.girder_group(0).unwrap().girder_count(), 7);
        assert_eq!(timeline.events[0].erect_segments.len(), 3);
        assert_eq!(bridge.piers()[0].face(PierFace::Ahead).spacing.spacings_ft.len(), 6);

        bridge.set_group_girder_count(&mut timeline, 0, 4).unwrap();
        assert!(timeline.events[0].erect_segments.is_empty());
        assert_eq!(bridge.spans()[0].data().camber_in.len(), 4);
    }

    #[test]
    fn test_group_girder_count_blocked_by_bridge_setting() {
        let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        bridge
            .set_same_number_of_girders(&mut NullTimeline, true)
            .unwrap();
        assert!(bridge
            .set_group_girder_count(&mut NullTimeline, 0, 3)
            .is_err());
    }
}
