//! # Temporary Support Placement
//!
//! Temporary supports are kept sorted by station and each is assigned to the
//! span whose piers bracket it. The assignment is a cache: it is recomputed
//! by [`BridgeDescription::update_assignments`] after every edit that changes
//! stations or the span sequence.
//!
//! A support with a closure-joint connection splits every girder of its
//! group. Moving such a support across another support or into another span
//! is done as a removal followed by a re-insertion so the segments are
//! joined and split again in the right place.

use tracing::debug;

use super::girder::SupportRef;
use super::temporary_support::{TemporarySupport, TemporarySupportData, TemporarySupportEvents};
use super::types::TemporarySupportType;
use super::BridgeDescription;
use crate::errors::{BridgeError, BridgeResult};
use crate::ids::TempSupportId;
use crate::timeline::{check_event, EventIndex, Timeline};
use crate::units::same_station;

impl BridgeDescription {
    /// Sort temporary supports by station and assign each one to the first
    /// span whose piers bracket it.
    ///
    /// The sort is stable, so supports sharing a station keep their
    /// relative order.
    pub fn update_assignments(&mut self) {
        self.temp_supports
            .sort_by(|a, b| a.data.station_ft.total_cmp(&b.data.station_ft));
        let piers = &self.piers;
        let last_span = self.spans.len().saturating_sub(1);
        for (i, ts) in self.temp_supports.iter_mut().enumerate() {
            let station = ts.data.station_ft;
            ts.index = i;
            ts.span = (0..self.spans.len())
                .find(|&s| piers[s].station() <= station && station <= piers[s + 1].station())
                .unwrap_or(if piers.first().is_some_and(|p| station < p.station()) {
                    0
                } else {
                    last_span
                });
        }
    }

    /// Span strictly containing `station_ft`, away from both of its piers
    pub(crate) fn span_strictly_containing(&self, station_ft: f64) -> Option<usize> {
        (0..self.spans.len()).find(|&s| {
            let back = self.piers[s].station();
            let ahead = self.piers[s + 1].station();
            back < station_ft
                && station_ft < ahead
                && !same_station(back, station_ft)
                && !same_station(ahead, station_ft)
        })
    }

    fn check_temp_support_data(&self, op: &str, data: &TemporarySupportData, ignore: Option<TempSupportId>) -> BridgeResult<usize> {
        if !data.station_ft.is_finite() {
            return Err(BridgeError::invalid_input(
                "station_ft",
                data.station_ft.to_string(),
                "Station must be finite",
            ));
        }
        if data.support_type == TemporarySupportType::StrongBack && !data.has_closure() {
            return Err(BridgeError::invalid_input(
                "connection",
                data.connection.to_string(),
                "A strong back must carry a closure joint",
            ));
        }
        let Some(span) = self.span_strictly_containing(data.station_ft) else {
            return Err(self.reject(op, format!("station {} is not inside a span", data.station_ft)));
        };
        if self
            .temp_supports
            .iter()
            .any(|t| Some(t.id) != ignore && same_station(t.station(), data.station_ft))
        {
            return Err(self.reject(
                op,
                format!("a temporary support already sits at station {}", data.station_ft),
            ));
        }
        Ok(span)
    }

    /// Place a support without validation. Registers its events and splits
    /// the group when it carries a closure joint.
    fn place_temp_support(
        &mut self,
        timeline: &mut dyn Timeline,
        id: TempSupportId,
        data: TemporarySupportData,
        events: Option<(EventIndex, EventIndex)>,
        closure_event: Option<EventIndex>,
    ) {
        let station = data.station_ft;
        let closure = data.has_closure();
        self.temp_supports.push(TemporarySupport::new(id, data));
        self.update_assignments();
        let Some(index) = self.temp_supports.iter().position(|t| t.id == id) else {
            return;
        };
        self.adopt_bridge_values_at_temp_support(index);
        if let Some((erect, remove)) = events {
            timeline.register_temp_support_events(id, erect, remove);
        }
        if closure {
            if let Ok(group) = self.group_of_span(self.temp_supports[index].span) {
                self.split_group_at(timeline, group, SupportRef::TemporarySupport(id), station, closure_event);
            }
        }
    }

    /// Remove a support without validation. Joins the segments at it and
    /// drops its timeline references.
    pub(crate) fn take_temp_support(&mut self, timeline: &mut dyn Timeline, index: usize) -> TemporarySupport {
        let (id, span, closure) = {
            let ts = &self.temp_supports[index];
            (ts.id, ts.span, ts.has_closure())
        };
        if closure {
            if let Ok(group) = self.group_of_span(span) {
                self.join_group_at(timeline, group, SupportRef::TemporarySupport(id));
            }
        }
        timeline.remove_temp_support(id);
        self.temp_supports.remove(index)
    }

    /// Casting event of the closure joint at a temporary support
    fn closure_event_at(&self, timeline: &dyn Timeline, index: usize) -> Option<EventIndex> {
        let ts = &self.temp_supports[index];
        let group = self.group_of_span(ts.span).ok()?;
        let girder = self.groups[group].girders.first()?;
        let k = girder.closure_at(SupportRef::TemporarySupport(ts.id))?;
        timeline.closure_casting_event(girder.closures[k].id)
    }

    // -------------------------------------------------------------------------
    // Public edits
    // -------------------------------------------------------------------------

    /// Add a temporary support. The station must lie strictly inside a span.
    pub fn add_temporary_support(
        &mut self,
        timeline: &mut dyn Timeline,
        data: TemporarySupportData,
        events: TemporarySupportEvents,
    ) -> BridgeResult<TempSupportId> {
        const OP: &str = "add temporary support";
        self.check_temp_support_data(OP, &data, None)?;
        check_event(timeline, "erect", Some(events.erect))?;
        check_event(timeline, "remove", Some(events.remove))?;
        check_event(timeline, "closure", events.closure)?;

        let id = self.ids.next_temp_support_id();
        let station = data.station_ft;
        self.place_temp_support(timeline, id, data, Some((events.erect, events.remove)), events.closure);
        self.finish_edit();
        debug!(%id, station, "temporary support added");
        Ok(id)
    }

    /// Remove a temporary support, joining the segments at it.
    pub fn remove_temporary_support(
        &mut self,
        timeline: &mut dyn Timeline,
        id: TempSupportId,
    ) -> BridgeResult<TemporarySupportData> {
        let index = self
            .temp_supports
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| BridgeError::not_found("Temporary support", id))?;
        let removed = self.take_temp_support(timeline, index);
        self.finish_edit();
        debug!(%id, "temporary support removed");
        Ok(removed.data)
    }

    /// Replace a temporary support's data.
    ///
    /// A support that stays in its span without passing another support,
    /// and keeps its connection, is updated in place. Anything else removes
    /// it and places it again under the same ID with the same events.
    pub fn set_temporary_support(
        &mut self,
        timeline: &mut dyn Timeline,
        id: TempSupportId,
        data: TemporarySupportData,
    ) -> BridgeResult<()> {
        const OP: &str = "set temporary support";
        let index = self
            .temp_supports
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| BridgeError::not_found("Temporary support", id))?;
        let span = self.check_temp_support_data(OP, &data, Some(id))?;

        let old = &self.temp_supports[index];
        let (lo, hi) = if old.station() <= data.station_ft {
            (old.station(), data.station_ft)
        } else {
            (data.station_ft, old.station())
        };
        let crosses = self
            .temp_supports
            .iter()
            .any(|t| t.id != id && lo <= t.station() && t.station() <= hi);

        if span == old.span && !crosses && old.connection() == data.connection {
            self.temp_supports[index].data = data;
            self.adopt_bridge_values_at_temp_support(index);
            self.finish_edit();
            debug!(%id, "temporary support updated in place");
            return Ok(());
        }

        let events = timeline.temp_support_events(id);
        let closure_event = self.closure_event_at(timeline, index);
        self.take_temp_support(timeline, index);
        self.place_temp_support(timeline, id, data, events, closure_event);
        self.finish_edit();
        debug!(%id, "temporary support re-placed");
        Ok(())
    }

    /// Move a temporary support to a new station.
    pub fn move_temporary_support(
        &mut self,
        timeline: &mut dyn Timeline,
        id: TempSupportId,
        station_ft: f64,
    ) -> BridgeResult<()> {
        let data = self
            .find_temporary_support(id)
            .map(|t| TemporarySupportData {
                station_ft,
                ..t.data.clone()
            })
            .ok_or_else(|| BridgeError::not_found("Temporary support", id))?;
        self.set_temporary_support(timeline, id, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{InsertSpan, PierFace, TemporarySupportConnection};
    use crate::timeline::{NullTimeline, TimelineRegistry};

    fn bridge_and_timeline() -> (BridgeDescription, TimelineRegistry) {
        let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        bridge
            .insert_span(&mut NullTimeline, InsertSpan::new(1, PierFace::Ahead, 100.0))
            .unwrap();
        let timeline = TimelineRegistry::with_events(["Erect towers", "Erect girders", "Cast closures", "Remove towers"]);
        (bridge, timeline)
    }

    #[test]
    fn test_assignments_follow_station() {
        let (mut bridge, mut timeline) = bridge_and_timeline();
        let events = TemporarySupportEvents::new(0, 3);
        let b = bridge
            .add_temporary_support(&mut timeline, TemporarySupportData::new(150.0), events)
            .unwrap();
        let a = bridge
            .add_temporary_support(&mut timeline, TemporarySupportData::new(40.0), events)
            .unwrap();

        let supports = bridge.temporary_supports();
        assert_eq!(supports[0].id(), a);
        assert_eq!(supports[0].span(), 0);
        assert_eq!(supports[1].id(), b);
        assert_eq!(supports[1].span(), 1);
        assert_eq!(timeline.events[0].erect_temp_supports.len(), 2);
        assert_eq!(timeline.events[3].remove_temp_supports.len(), 2);
    }

    #[test]
    fn test_add_rejects_station_at_pier_or_off_bridge() {
        let (mut bridge, mut timeline) = bridge_and_timeline();
        let before = bridge.clone();
        let events = TemporarySupportEvents::new(0, 3);
        for station in [100.0, -5.0, 250.0, 0.0] {
            let result = bridge.add_temporary_support(&mut timeline, TemporarySupportData::new(station), events);
            assert!(matches!(result, Err(BridgeError::Precondition { .. })), "station {}", station);
        }
        assert_eq!(bridge, before);
    }

    #[test]
    fn test_strong_back_needs_closure() {
        let (mut bridge, mut timeline) = bridge_and_timeline();
        let data = TemporarySupportData::new(50.0).with_support_type(TemporarySupportType::StrongBack);
        let result = bridge.add_temporary_support(&mut timeline, data, TemporarySupportEvents::new(0, 3));
        assert!(matches!(result, Err(BridgeError::InvalidInput { .. })));
    }

    #[test]
    fn test_closure_joint_splits_and_joins() {
        let (mut bridge, mut timeline) = bridge_and_timeline();
        let events = TemporarySupportEvents::new(0, 3).with_closure(2);
        let id = bridge
            .add_temporary_support(&mut timeline, TemporarySupportData::closure_joint(60.0), events)
            .unwrap();
        let group = bridge.girder_group(0).unwrap();
        assert!(group.girders().iter().all(|g| g.segment_count() == 2));
        assert_eq!(timeline.events[2].cast_closures.len(), group.girder_count());
        assert!(bridge.segments_at_temporary_support(id).is_some());

        bridge.remove_temporary_support(&mut timeline, id).unwrap();
        let group = bridge.girder_group(0).unwrap();
        assert!(group.girders().iter().all(|g| g.segment_count() == 1));
        assert!(timeline.events[2].cast_closures.is_empty());
        assert!(timeline.events[0].erect_temp_supports.is_empty());
    }

    #[test]
    fn test_move_within_span_updates_in_place() {
        let (mut bridge, mut timeline) = bridge_and_timeline();
        let id = bridge
            .add_temporary_support(
                &mut timeline,
                TemporarySupportData::closure_joint(60.0),
                TemporarySupportEvents::new(0, 3),
            )
            .unwrap();
        let segments = bridge.segments_at_temporary_support(id);
        bridge.move_temporary_support(&mut timeline, id, 70.0).unwrap();
        assert_eq!(bridge.find_temporary_support(id).unwrap().station(), 70.0);
        assert_eq!(bridge.segments_at_temporary_support(id), segments);
    }

    #[test]
    fn test_move_across_pier_replaces_support() {
        let (mut bridge, mut timeline) = bridge_and_timeline();
        let id = bridge
            .add_temporary_support(
                &mut timeline,
                TemporarySupportData::closure_joint(60.0),
                TemporarySupportEvents::new(0, 3).with_closure(2),
            )
            .unwrap();
        bridge.move_temporary_support(&mut timeline, id, 160.0).unwrap();

        let ts = bridge.find_temporary_support(id).unwrap();
        assert_eq!(ts.span(), 1);
        assert_eq!(timeline.temp_support_events(id), Some((0, 3)));
        assert_eq!(timeline.events[2].cast_closures.len(), bridge.girder_group(0).unwrap().girder_count());
        assert_eq!(bridge.girder_group(0).unwrap().girders()[0].segment_count(), 2);
    }

    #[test]
    fn test_connection_change_joins_segments() {
        let (mut bridge, mut timeline) = bridge_and_timeline();
        let id = bridge
            .add_temporary_support(
                &mut timeline,
                TemporarySupportData::closure_joint(60.0),
                TemporarySupportEvents::new(0, 3),
            )
            .unwrap();
        let data = TemporarySupportData::closure_joint(60.0)
            .with_connection(TemporarySupportConnection::ContinuousSegment);
        bridge.set_temporary_support(&mut timeline, id, data).unwrap();
        assert_eq!(bridge.closure_joint_count(), 0);
        assert!(bridge.find_temporary_support(id).is_some());
    }

    #[test]
    fn test_duplicate_station_rejected() {
        let (mut bridge, mut timeline) = bridge_and_timeline();
        let events = TemporarySupportEvents::new(0, 3);
        bridge
            .add_temporary_support(&mut timeline, TemporarySupportData::new(50.0), events)
            .unwrap();
        assert!(bridge
            .add_temporary_support(&mut timeline, TemporarySupportData::new(50.0), events)
            .is_err());
    }
}
