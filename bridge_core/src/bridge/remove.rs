//! # Removing Spans and Girder Groups
//!
//! Removing a span also removes one of its piers; the other pier survives and
//! takes over any group boundary the removed pier held. Piers and temporary
//! supports ahead of the removed span move back by its length, except when
//! the first span is removed together with the first pier.

use tracing::debug;

use super::deck;
use super::girder::SupportRef;
use super::types::RemovePier;
use super::BridgeDescription;
use crate::errors::{BridgeError, BridgeResult};
use crate::timeline::Timeline;

impl BridgeDescription {
    /// Remove the temporary supports in spans `spans`, last first.
    fn remove_temp_supports_in(&mut self, timeline: &mut dyn Timeline, spans: std::ops::Range<usize>) {
        for index in (0..self.temp_supports.len()).rev() {
            if spans.contains(&self.temp_supports[index].span) {
                self.take_temp_support(timeline, index);
            }
        }
    }

    /// Join the girders of `group` at pier `pier` if they have a closure there.
    fn join_at_pier(&mut self, timeline: &mut dyn Timeline, group: usize, pier: usize) {
        if self.piers[pier].segment_connection().has_closure() {
            let support = SupportRef::Pier(self.piers[pier].id);
            self.join_group_at(timeline, group, support);
        }
    }

    /// Remove span `span` and one of its piers.
    pub fn remove_span(&mut self, timeline: &mut dyn Timeline, span: usize, pier: RemovePier) -> BridgeResult<()> {
        const OP: &str = "remove span";
        if span >= self.spans.len() {
            return Err(BridgeError::not_found("Span", span));
        }
        if self.spans.len() == 1 {
            return Err(self.reject(OP, "the bridge must keep at least one span"));
        }
        let g = self.group_of_span(span)?;
        let (start, end) = self.group_range(g)?;

        // ---- validated: mutate from here on ----

        let (removed, survivor) = match pier {
            RemovePier::PrevPier => (span, span + 1),
            RemovePier::NextPier => (span + 1, span),
        };
        let length = self.span_length_unchecked(span);
        let removed_station = self.piers[removed].station();
        let removed_id = self.piers[removed].id;
        let survivor_id = self.piers[survivor].id;

        self.remove_temp_supports_in(timeline, span..span + 1);

        let delete_group = end - start == 1;
        if delete_group {
            let group = self.groups.remove(g);
            for girder in &group.girders {
                Self::retire_girder(timeline, girder);
            }
            // g now indexes the group that followed the deleted one
            if removed == start && g > 0 {
                self.groups[g - 1].end_pier = survivor_id;
            }
            if removed == end && g < self.groups.len() {
                self.groups[g].start_pier = survivor_id;
            }
        } else if removed == start || removed == end {
            self.join_at_pier(timeline, g, survivor);
            if removed == start {
                self.groups[g].start_pier = survivor_id;
                if g > 0 {
                    self.groups[g - 1].end_pier = survivor_id;
                }
            } else {
                self.groups[g].end_pier = survivor_id;
                if g + 1 < self.groups.len() {
                    self.groups[g + 1].start_pier = survivor_id;
                }
            }
        } else {
            self.join_at_pier(timeline, g, removed);
        }

        deck::rekey_for_span_removal(&mut self.neg_moment_rebar, removed, self.piers.len());
        self.spans.remove(span);
        self.piers.remove(removed);
        timeline.remove_pier(removed_id);
        self.renumber_all();

        if !(removed == 0 && span == 0) {
            self.shift_piers(removed.., -length);
            self.shift_temp_supports(|st| st > removed_station, -length);
        }
        self.finish_edit();
        debug!(span, pier = %pier, %removed_id, length, group_deleted = delete_group, "span removed");
        Ok(())
    }

    /// Remove group `group` and its spans. `pier` picks which boundary pier
    /// goes with it; the other one stays and joins the neighbouring groups.
    pub fn remove_girder_group(&mut self, timeline: &mut dyn Timeline, group: usize, pier: RemovePier) -> BridgeResult<()> {
        const OP: &str = "remove girder group";
        let (s, e) = self.group_range(group)?;
        if self.groups.len() == 1 {
            return Err(self.reject(OP, "the bridge must keep at least one girder group"));
        }

        // ---- validated: mutate from here on ----

        let length = self.piers[e].station() - self.piers[s].station();
        let end_station = self.piers[e].station();
        self.remove_temp_supports_in(timeline, s..e);

        let removed: Vec<usize> = match pier {
            RemovePier::PrevPier => (s..e).collect(),
            RemovePier::NextPier => (s + 1..=e).collect(),
        };
        let survivor_id = match pier {
            RemovePier::PrevPier => self.piers[e].id,
            RemovePier::NextPier => self.piers[s].id,
        };

        let deleted = self.groups.remove(group);
        for girder in &deleted.girders {
            Self::retire_girder(timeline, girder);
        }
        match pier {
            RemovePier::PrevPier if group > 0 => self.groups[group - 1].end_pier = survivor_id,
            RemovePier::NextPier if group < self.groups.len() => self.groups[group].start_pier = survivor_id,
            _ => {}
        }

        deck::rekey_for_group_removal(&mut self.neg_moment_rebar, &removed);
        for &index in removed.iter().rev() {
            let p = self.piers.remove(index);
            timeline.remove_pier(p.id);
        }
        self.spans.drain(s..e);
        self.renumber_all();
        let last = self.piers.len() - 1;
        self.neg_moment_rebar.retain(|r| r.pier_index > 0 && r.pier_index < last);

        let first_group_back = group == 0 && pier == RemovePier::PrevPier;
        if !first_group_back {
            let from = match pier {
                RemovePier::PrevPier => s,
                RemovePier::NextPier => s + 1,
            };
            self.shift_piers(from.., -length);
            self.shift_temp_supports(|st| st > end_station, -length);
        }
        self.finish_edit();
        debug!(group, pier = %pier, spans = e - s, length, "girder group removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{
        CreateGirderGroup, InsertSpan, MemberEnd, NegMomentRebar, PierFace, SegmentConnection, TemporarySupportData,
        TemporarySupportEvents,
    };
    use crate::timeline::{NullTimeline, TimelineRegistry};

    fn stations(bridge: &BridgeDescription) -> Vec<f64> {
        bridge.piers().iter().map(|p| p.station()).collect()
    }

    fn four_span() -> BridgeDescription {
        let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        for _ in 0..3 {
            bridge.append_span(&mut NullTimeline, 100.0).unwrap();
        }
        bridge
    }

    /// Groups of 5, 3 and 5 girders over piers at 0/100/200/300/400 with a
    /// support at 250 in the 3-girder group.
    fn mixed_girder_counts() -> BridgeDescription {
        let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        bridge
            .create_girder_group(&mut NullTimeline, CreateGirderGroup::new(0, MemberEnd::End, vec![100.0, 100.0], 3))
            .unwrap();
        bridge
            .create_girder_group(&mut NullTimeline, CreateGirderGroup::new(1, MemberEnd::End, vec![100.0], 5))
            .unwrap();
        bridge
            .add_temporary_support(
                &mut NullTimeline,
                TemporarySupportData::new(250.0),
                TemporarySupportEvents::new(0, 0),
            )
            .unwrap();
        let counts: Vec<usize> = bridge.girder_groups().iter().map(|g| g.girder_count()).collect();
        assert_eq!(counts, vec![5, 3, 5]);
        bridge
    }

    fn assert_support_fits_group(bridge: &BridgeDescription, station: f64) {
        let ts = &bridge.temporary_supports()[0];
        assert_eq!(ts.station(), station);
        let group = bridge.girder_group_for_span(ts.span()).unwrap();
        assert_eq!(group.girder_count(), 3);
        assert_eq!(ts.data.spacing.girder_count(), 3);
        assert!(bridge.validate().is_ok());
    }

    #[test]
    fn test_remove_span_keeps_neighbour_support_spacing() {
        let mut bridge = mixed_girder_counts();
        bridge.remove_span(&mut NullTimeline, 0, RemovePier::NextPier).unwrap();
        assert_eq!(stations(&bridge), vec![0.0, 100.0, 200.0, 300.0]);
        assert_support_fits_group(&bridge, 150.0);
    }

    #[test]
    fn test_remove_group_keeps_neighbour_support_spacing() {
        let mut bridge = mixed_girder_counts();
        bridge.remove_girder_group(&mut NullTimeline, 0, RemovePier::NextPier).unwrap();
        assert_eq!(bridge.group_count(), 2);
        assert_support_fits_group(&bridge, 150.0);
    }

    #[test]
    fn test_remove_first_span_without_shift_keeps_support_spacing() {
        let mut bridge = mixed_girder_counts();
        bridge.remove_span(&mut NullTimeline, 0, RemovePier::PrevPier).unwrap();
        assert_eq!(stations(&bridge), vec![100.0, 200.0, 300.0, 400.0]);
        assert_support_fits_group(&bridge, 250.0);
    }

    #[test]
    fn test_remove_only_span_rejected() {
        let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        let result = bridge.remove_span(&mut NullTimeline, 0, RemovePier::NextPier);
        assert!(matches!(result, Err(BridgeError::Precondition { .. })));
        assert_eq!(bridge.span_count(), 1);
    }

    #[test]
    fn test_remove_interior_span_shifts_ahead() {
        let mut bridge = four_span();
        bridge.remove_span(&mut NullTimeline, 1, RemovePier::NextPier).unwrap();
        assert_eq!(stations(&bridge), vec![0.0, 100.0, 200.0, 300.0]);
        assert_eq!(bridge.group_pier_range(0), Some((0, 3)));
    }

    #[test]
    fn test_remove_first_span_does_not_shift() {
        let mut bridge = four_span();
        bridge.remove_span(&mut NullTimeline, 0, RemovePier::PrevPier).unwrap();
        assert_eq!(stations(&bridge), vec![100.0, 200.0, 300.0, 400.0]);
        assert_eq!(bridge.group_pier_range(0), Some((0, 3)));
    }

    #[test]
    fn test_remove_span_removes_its_temporary_supports() {
        let mut bridge = four_span();
        let mut timeline = TimelineRegistry::with_events(["Erect", "Remove"]);
        let events = TemporarySupportEvents::new(0, 1);
        bridge
            .add_temporary_support(&mut timeline, TemporarySupportData::closure_joint(150.0), events)
            .unwrap();
        bridge
            .add_temporary_support(&mut timeline, TemporarySupportData::new(250.0), events)
            .unwrap();

        bridge.remove_span(&mut timeline, 1, RemovePier::PrevPier).unwrap();
        let ts: Vec<f64> = bridge.temporary_supports().iter().map(|t| t.station()).collect();
        assert_eq!(ts, vec![150.0]);
        assert_eq!(bridge.closure_joint_count(), 0);
        assert_eq!(timeline.events[0].erect_temp_supports.len(), 1);
    }

    #[test]
    fn test_remove_single_span_group_retargets_neighbour() {
        let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        bridge
            .create_girder_group(&mut NullTimeline, CreateGirderGroup::new(0, MemberEnd::End, vec![50.0], 5))
            .unwrap();
        bridge
            .create_girder_group(&mut NullTimeline, CreateGirderGroup::new(1, MemberEnd::End, vec![80.0], 5))
            .unwrap();
        assert_eq!(bridge.group_count(), 3);

        bridge.remove_span(&mut NullTimeline, 1, RemovePier::PrevPier).unwrap();
        assert_eq!(bridge.group_count(), 2);
        assert_eq!(stations(&bridge), vec![0.0, 100.0, 180.0]);
        assert_eq!(bridge.group_pier_range(0), Some((0, 1)));
        assert_eq!(bridge.group_pier_range(1), Some((1, 2)));
    }

    #[test]
    fn test_remove_group_boundary_pier_joins_closure_at_survivor() {
        let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        bridge.append_span(&mut NullTimeline, 100.0).unwrap();
        bridge
            .set_segment_connection(&mut NullTimeline, 1, SegmentConnection::ContinuousClosureJoint, None)
            .unwrap();
        assert_eq!(bridge.closure_joint_count(), 1);

        bridge.remove_span(&mut NullTimeline, 1, RemovePier::NextPier).unwrap();
        assert_eq!(bridge.closure_joint_count(), 0);
        assert_eq!(bridge.piers()[1].segment_connection(), SegmentConnection::ContinuousSegment);
    }

    #[test]
    fn test_rebar_rekeyed_on_removal() {
        let mut bridge = four_span();
        bridge.add_neg_moment_rebar(NegMomentRebar::new(1, "#5", 12.0)).unwrap();
        bridge.add_neg_moment_rebar(NegMomentRebar::new(3, "#6", 12.0)).unwrap();
        bridge.remove_span(&mut NullTimeline, 1, RemovePier::NextPier).unwrap();
        let keys: Vec<usize> = bridge.neg_moment_rebar().iter().map(|r| r.pier_index).collect();
        assert_eq!(keys, vec![1, 2]);
    }

    #[test]
    fn test_remove_group_keeps_shared_pier() {
        let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        bridge
            .create_girder_group(&mut NullTimeline, CreateGirderGroup::new(0, MemberEnd::End, vec![50.0, 50.0], 5))
            .unwrap();
        bridge
            .create_girder_group(&mut NullTimeline, CreateGirderGroup::new(1, MemberEnd::End, vec![120.0], 5))
            .unwrap();
        assert_eq!(stations(&bridge), vec![0.0, 100.0, 150.0, 200.0, 320.0]);

        bridge.remove_girder_group(&mut NullTimeline, 1, RemovePier::NextPier).unwrap();
        assert_eq!(stations(&bridge), vec![0.0, 100.0, 220.0]);
        assert_eq!(bridge.group_count(), 2);
        assert_eq!(bridge.group_pier_range(1), Some((1, 2)));
    }

    #[test]
    fn test_remove_first_group_back_does_not_shift() {
        let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        bridge
            .insert_span(&mut NullTimeline, InsertSpan::new(1, PierFace::Ahead, 60.0).with_new_group())
            .unwrap();
        bridge.remove_girder_group(&mut NullTimeline, 0, RemovePier::PrevPier).unwrap();
        assert_eq!(stations(&bridge), vec![100.0, 160.0]);
        assert_eq!(bridge.group_count(), 1);
    }

    #[test]
    fn test_remove_last_group_rejected() {
        let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        assert!(bridge
            .remove_girder_group(&mut NullTimeline, 0, RemovePier::NextPier)
            .is_err());
        assert!(bridge
            .remove_girder_group(&mut NullTimeline, 3, RemovePier::NextPier)
            .is_err());
    }
}
