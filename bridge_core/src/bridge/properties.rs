//! Property tests: random edit sequences must keep the model consistent,
//! rejected edits must leave it untouched, and inserting a span then
//! removing it again must restore the model exactly. Whatever the edits
//! reach must also load back equal after a save.
//!
//! Lengths and offsets are whole feet so station arithmetic is exact.

use std::collections::HashSet;

use proptest::prelude::*;
use proptest::sample::Index;

use super::*;
use crate::errors::BridgeResult;
use crate::ids::EntityKind;
use crate::persist::{load_bridge, save_bridge, PropertyReader, PropertyUnit, PropertyWriter};
use crate::timeline::{NullTimeline, Timeline, TimelineRegistry};

#[derive(Debug, Clone)]
enum Edit {
    Insert { pier: Index, face: PierFace, length: u32, new_group: bool },
    CreateGroup { group: Index, end: MemberEnd, lengths: Vec<u32>, count: usize },
    AddSupport { span: Index, at: f64, closure: bool },
    RemoveSupport { support: Index },
    Connection { pier: Index, closure: bool },
    RemoveSpan { span: Index, pier: RemovePier },
    RemoveGroup { group: Index, pier: RemovePier },
    MovePier { pier: Index, delta: i32, option: MovePierOption },
    SpanLength { span: Index, length: u32 },
    GirderCount { group: Index, count: usize },
    Rebar { pier: Index },
}

fn face_strategy() -> impl Strategy<Value = PierFace> {
    prop_oneof![Just(PierFace::Back), Just(PierFace::Ahead)]
}

fn remove_pier_strategy() -> impl Strategy<Value = RemovePier> {
    prop_oneof![Just(RemovePier::PrevPier), Just(RemovePier::NextPier)]
}

fn move_option_strategy() -> impl Strategy<Value = MovePierOption> {
    prop::sample::select(MovePierOption::ALL.to_vec())
}

/// Edits whose station arithmetic stays on whole feet.
fn topology_edit_strategy() -> impl Strategy<Value = Edit> {
    let end = prop_oneof![Just(MemberEnd::Start), Just(MemberEnd::End)];
    prop_oneof![
        (any::<Index>(), face_strategy(), 10u32..200, any::<bool>())
            .prop_map(|(pier, face, length, new_group)| Edit::Insert { pier, face, length, new_group }),
        (any::<Index>(), end, prop::collection::vec(10u32..150, 1..3), 1usize..7)
            .prop_map(|(group, end, lengths, count)| Edit::CreateGroup { group, end, lengths, count }),
        (any::<Index>(), 0.1f64..0.9, any::<bool>()).prop_map(|(span, at, closure)| Edit::AddSupport { span, at, closure }),
        any::<Index>().prop_map(|support| Edit::RemoveSupport { support }),
        (any::<Index>(), any::<bool>()).prop_map(|(pier, closure)| Edit::Connection { pier, closure }),
        (any::<Index>(), remove_pier_strategy()).prop_map(|(span, pier)| Edit::RemoveSpan { span, pier }),
        (any::<Index>(), remove_pier_strategy()).prop_map(|(group, pier)| Edit::RemoveGroup { group, pier }),
        (any::<Index>(), -150i32..150, move_option_strategy())
            .prop_map(|(pier, delta, option)| Edit::MovePier { pier, delta, option }),
        (any::<Index>(), 1usize..7).prop_map(|(group, count)| Edit::GirderCount { group, count }),
        any::<Index>().prop_map(|pier| Edit::Rebar { pier }),
    ]
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        9 => topology_edit_strategy(),
        1 => (any::<Index>(), 10u32..200).prop_map(|(span, length)| Edit::SpanLength { span, length }),
    ]
}

fn timeline() -> TimelineRegistry {
    TimelineRegistry::with_events(["Erect", "Cast", "Remove"])
}

fn apply(bridge: &mut BridgeDescription, timeline: &mut TimelineRegistry, edit: &Edit) -> BridgeResult<()> {
    match edit {
        Edit::Insert { pier, face, length, new_group } => {
            let mut req = InsertSpan::new(pier.index(bridge.pier_count()), *face, f64::from(*length));
            if *new_group {
                req = req.with_new_group();
            }
            bridge.insert_span(timeline, req).map(|_| ())
        }
        Edit::CreateGroup { group, end, lengths, count } => {
            let lengths = lengths.iter().map(|&l| f64::from(l)).collect();
            let req = CreateGirderGroup::new(group.index(bridge.group_count()), *end, lengths, *count).with_erection_event(0);
            bridge.create_girder_group(timeline, req).map(|_| ())
        }
        Edit::AddSupport { span, at, closure } => {
            let span = span.index(bridge.span_count());
            let start = bridge.piers()[span].station();
            let length = bridge.span_length(span).unwrap_or_default();
            let station = start + (length * at).floor().max(1.0);
            let data = if *closure {
                TemporarySupportData::closure_joint(station)
            } else {
                TemporarySupportData::new(station)
            };
            bridge
                .add_temporary_support(timeline, data, TemporarySupportEvents::new(0, 2))
                .map(|_| ())
        }
        Edit::RemoveSupport { support } => {
            if bridge.temporary_support_count() == 0 {
                return Ok(());
            }
            let id = bridge.temporary_supports()[support.index(bridge.temporary_support_count())].id();
            bridge.remove_temporary_support(timeline, id).map(|_| ())
        }
        Edit::Connection { pier, closure } => {
            let connection = if *closure {
                SegmentConnection::ContinuousClosureJoint
            } else {
                SegmentConnection::ContinuousSegment
            };
            bridge.set_segment_connection(timeline, pier.index(bridge.pier_count()), connection, Some(1))
        }
        Edit::RemoveSpan { span, pier } => bridge.remove_span(timeline, span.index(bridge.span_count()), *pier),
        Edit::RemoveGroup { group, pier } => {
            bridge.remove_girder_group(timeline, group.index(bridge.group_count()), *pier)
        }
        Edit::MovePier { pier, delta, option } => {
            let pier = pier.index(bridge.pier_count());
            let station = bridge.piers()[pier].station() + f64::from(*delta);
            bridge.move_pier(pier, station, *option).map(|_| ())
        }
        Edit::SpanLength { span, length } => bridge.set_span_length(span.index(bridge.span_count()), f64::from(*length)),
        Edit::GirderCount { group, count } => {
            bridge.set_group_girder_count(timeline, group.index(bridge.group_count()), *count)
        }
        Edit::Rebar { pier } => {
            let record = NegMomentRebar::new(pier.index(bridge.pier_count()), "#5", 12.0);
            bridge.add_neg_moment_rebar(record)
        }
    }
}

/// Every live ID, tagged with its kind
fn live_ids(bridge: &BridgeDescription) -> HashSet<(EntityKind, u64)> {
    let mut ids = HashSet::new();
    ids.extend(bridge.piers().iter().map(|p| (EntityKind::Pier, p.id().value())));
    ids.extend(
        bridge
            .temporary_supports()
            .iter()
            .map(|t| (EntityKind::TemporarySupport, t.id().value())),
    );
    for group in bridge.girder_groups() {
        ids.insert((EntityKind::GirderGroup, group.id().value()));
        for girder in group.girders() {
            ids.insert((EntityKind::Girder, girder.id().value()));
            ids.extend(girder.segments().iter().map(|s| (EntityKind::Segment, s.id().value())));
            ids.extend(girder.closures().iter().map(|c| (EntityKind::ClosureJoint, c.id().value())));
        }
    }
    ids
}

/// Ordering, counts, group coverage and support assignment
fn check_structure(bridge: &BridgeDescription) -> Result<(), TestCaseError> {
    prop_assert_eq!(bridge.pier_count(), bridge.span_count() + 1);
    for w in bridge.piers().windows(2) {
        prop_assert!(w[0].station() < w[1].station());
    }

    let mut next_start = 0;
    for g in 0..bridge.group_count() {
        let (start, end) = bridge.group_pier_range(g).ok_or_else(|| TestCaseError::fail("group range"))?;
        prop_assert_eq!(start, next_start);
        prop_assert!(start < end);
        next_start = end;
    }
    prop_assert_eq!(next_start, bridge.pier_count() - 1);

    for ts in bridge.temporary_supports() {
        let span = &bridge.spans()[ts.span()];
        prop_assert!(bridge.piers()[span.prev_pier()].station() <= ts.station());
        prop_assert!(ts.station() <= bridge.piers()[span.next_pier()].station());
    }
    prop_assert!(bridge.validate().is_ok(), "{:?}", bridge.violations());
    Ok(())
}

fn build(edits: &[Edit]) -> (BridgeDescription, TimelineRegistry) {
    let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
    let mut timeline = timeline();
    for edit in edits {
        let _ = apply(&mut bridge, &mut timeline, edit);
    }
    (bridge, timeline)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]

    #[test]
    fn test_edits_preserve_structure(edits in prop::collection::vec(edit_strategy(), 1..24)) {
        let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        let mut timeline = timeline();
        let mut ever_issued = live_ids(&bridge);
        let mut live = ever_issued.clone();

        for edit in &edits {
            let before = bridge.clone();
            let peeks: Vec<u64> = EntityKind::ALL.iter().map(|&k| bridge.ids().peek(k)).collect();
            let timeline_before = timeline.clone();

            if apply(&mut bridge, &mut timeline, edit).is_err() {
                prop_assert_eq!(&bridge, &before, "rejected {:?} changed the model", edit);
                prop_assert_eq!(&timeline, &timeline_before);
            }
            check_structure(&bridge)?;

            // IDs are never reused and the allocator never goes back
            let now = live_ids(&bridge);
            for id in now.difference(&live) {
                prop_assert!(!ever_issued.contains(id), "{:?} reissued by {:?}", id, edit);
            }
            ever_issued.extend(now.iter().copied());
            live = now;
            for (&kind, &peek) in EntityKind::ALL.iter().zip(&peeks) {
                prop_assert!(bridge.ids().peek(kind) >= peek);
            }
        }
    }

    #[test]
    fn test_insert_then_remove_restores_model(
        edits in prop::collection::vec(topology_edit_strategy(), 0..10),
        pier in any::<Index>(),
        face in face_strategy(),
        length in 1u32..200,
        new_group in any::<bool>(),
    ) {
        let (mut bridge, mut timeline) = build(&edits);
        let before = bridge.clone();
        let timeline_before = timeline.clone();

        let mut req = InsertSpan::new(pier.index(bridge.pier_count()), face, f64::from(length));
        if new_group {
            req = req.with_new_group();
        }
        match bridge.insert_span(&mut timeline, req) {
            Ok(span) => {
                prop_assert_eq!(bridge.span_count(), before.span_count() + 1);
                let which = match face {
                    PierFace::Back => RemovePier::PrevPier,
                    PierFace::Ahead => RemovePier::NextPier,
                };
                let removed = bridge.remove_span(&mut timeline, span, which);
                prop_assert!(removed.is_ok(), "{:?}", removed);
            }
            // only a new group at a pier inside a group is refused
            Err(e) => prop_assert!(new_group, "{}", e),
        }
        prop_assert_eq!(&bridge, &before);
        prop_assert_eq!(&timeline, &timeline_before);
    }

    #[test]
    fn test_saved_model_loads_back_equal(edits in prop::collection::vec(edit_strategy(), 0..16)) {
        let (bridge, timeline) = build(&edits);
        let mut writer = PropertyWriter::new();
        save_bridge(&bridge, &mut writer).unwrap();
        let json = serde_json::to_string(&writer.finish().unwrap()).unwrap();
        let tree: PropertyUnit = serde_json::from_str(&json).unwrap();

        let mut reloaded_timeline = timeline.clone();
        let loaded = load_bridge(&mut PropertyReader::new(&tree), &mut reloaded_timeline);
        prop_assert!(loaded.is_ok(), "{:?}", loaded.err());
        let loaded = loaded.unwrap();
        prop_assert_eq!(&loaded, &bridge);
        prop_assert_eq!(&reloaded_timeline, &timeline);
        for &kind in EntityKind::ALL {
            prop_assert_eq!(loaded.ids().peek(kind), bridge.ids().peek(kind));
        }
    }
}

// ============================================================================
// Worked examples
// ============================================================================

#[test]
fn test_span_added_ahead_of_last_pier() {
    let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
    bridge
        .insert_span(&mut NullTimeline, InsertSpan::new(1, PierFace::Ahead, 80.0))
        .unwrap();
    assert_eq!(bridge.span_count(), 2);
    let stations: Vec<f64> = bridge.piers().iter().map(|p| p.station()).collect();
    assert_eq!(stations, vec![0.0, 100.0, 180.0]);
    assert_eq!(bridge.group_count(), 1);
    assert_eq!(bridge.group_span_range(0), Some(0..2));
}

#[test]
fn test_group_created_at_end() {
    let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
    bridge
        .create_girder_group(&mut NullTimeline, CreateGirderGroup::new(0, MemberEnd::End, vec![60.0], 4))
        .unwrap();
    assert_eq!(bridge.group_count(), 2);
    assert_eq!(bridge.girder_groups()[1].girder_count(), 4);
    assert_eq!(bridge.pier_count(), 3);
    assert_eq!(bridge.piers()[2].station(), 160.0);
}

#[test]
fn test_removing_span_takes_its_closure_support() {
    let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
    let mut timeline = timeline();
    bridge.append_span(&mut timeline, 100.0).unwrap();
    bridge.append_span(&mut timeline, 100.0).unwrap();
    let id = bridge
        .add_temporary_support(
            &mut timeline,
            TemporarySupportData::closure_joint(150.0),
            TemporarySupportEvents::new(0, 2),
        )
        .unwrap();
    assert_eq!(bridge.girder_groups()[0].girders()[0].segment_count(), 2);

    bridge.remove_span(&mut timeline, 1, RemovePier::PrevPier).unwrap();
    assert_eq!(bridge.span_count(), 2);
    assert_eq!(bridge.temporary_support_count(), 0);
    assert!(bridge.find_temporary_support(id).is_none());
    assert_eq!(bridge.closure_joint_count(), 0);
    assert_eq!(bridge.girder_groups()[0].girders()[0].segment_count(), 1);
    assert!(timeline.temp_support_events(id).is_none());
}
