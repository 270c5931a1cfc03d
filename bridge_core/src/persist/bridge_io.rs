//! # Bridge Persistence
//!
//! Saving walks the model into nested units. Loading runs in two steps:
//! [`RawBridge::read`] pulls everything out of the property bag without
//! checking it, then [`RawBridge::build`] restores the ID allocator, rewires
//! the chain, repairs per-girder value counts, copies bridge values down and
//! validates. Any failure drops the half-built model.
//!
//! ```text
//! BridgeDescription (v3)
//! ├── Settings
//! ├── Piers        Pier* ── BackFace, AheadFace
//! ├── Spans        Span*
//! ├── GirderGroups GirderGroup* ── Girder* ── Segment*, Closure*
//! ├── TemporarySupports TemporarySupport*
//! └── NegMomentRebar Rebar*          (v3)
//! ```
//!
//! Version 1 files carry no camber or bearing settings and version 2 files
//! no deck rebar; missing values take their defaults.

use tracing::{debug, warn};

use crate::bridge::{
    BridgeDescription, BridgeSettings, ClosureJoint, Girder, GirderGroup, NegMomentRebar, Pier, PierData,
    PierFace, PierFaceData, Segment, Span, SpanData, TemporarySupport, TemporarySupportData,
};
use crate::errors::{BridgeError, BridgeResult};
use crate::ids::{ClosureId, EntityKind, GirderId, GroupId, IdAllocator, PierId, SegmentId, TempSupportId};
use crate::timeline::Timeline;

use super::property_bag::{LoadExt, SaveExt, StructuredLoad, StructuredSave};

pub const BRIDGE_UNIT: &str = "BridgeDescription";
/// Current bridge unit version
pub const BRIDGE_UNIT_VERSION: u32 = 3;

/// First version with camber and bearing settings
const CAMBER_VERSION: u32 = 2;
/// First version with negative-moment deck rebar
const REBAR_VERSION: u32 = 3;

fn face_unit(face: PierFace) -> &'static str {
    match face {
        PierFace::Back => "BackFace",
        PierFace::Ahead => "AheadFace",
    }
}

// ============================================================================
// Save
// ============================================================================

/// Write `bridge` as one [`BRIDGE_UNIT`] unit.
pub fn save_bridge(bridge: &BridgeDescription, save: &mut dyn StructuredSave) -> BridgeResult<()> {
    save.begin_unit(BRIDGE_UNIT, BRIDGE_UNIT_VERSION)?;
    save.put_record("IdAllocator", &bridge.ids)?;
    save_settings(&bridge.settings, save)?;

    save.begin_unit("Piers", 1)?;
    save.put("Count", bridge.piers.len())?;
    for pier in &bridge.piers {
        save_pier(pier, save)?;
    }
    save.end_unit()?;

    save.begin_unit("Spans", 1)?;
    save.put("Count", bridge.spans.len())?;
    for span in &bridge.spans {
        save.begin_unit("Span", 1)?;
        save.put_record("Camber", &span.data.camber_in)?;
        save.end_unit()?;
    }
    save.end_unit()?;

    save.begin_unit("GirderGroups", 1)?;
    save.put("Count", bridge.groups.len())?;
    for group in &bridge.groups {
        save_group(group, save)?;
    }
    save.end_unit()?;

    save.begin_unit("TemporarySupports", 1)?;
    save.put("Count", bridge.temp_supports.len())?;
    for ts in &bridge.temp_supports {
        save_temp_support(ts, save)?;
    }
    save.end_unit()?;

    save.begin_unit("NegMomentRebar", 1)?;
    save.put("Count", bridge.neg_moment_rebar.len())?;
    for r in &bridge.neg_moment_rebar {
        save.begin_unit("Rebar", 1)?;
        save.put("Pier", r.pier_index)?;
        save.put_record("Layer", &r.layer)?;
        save.put("BarSize", r.bar_size.as_str())?;
        save.put("Spacing", r.spacing_in)?;
        save.put("CutoffBack", r.cutoff_back_ft)?;
        save.put("CutoffAhead", r.cutoff_ahead_ft)?;
        save.end_unit()?;
    }
    save.end_unit()?;

    save.end_unit()?;
    debug!(
        piers = bridge.piers.len(),
        groups = bridge.groups.len(),
        temporary_supports = bridge.temp_supports.len(),
        "bridge saved"
    );
    Ok(())
}

fn save_settings(s: &BridgeSettings, save: &mut dyn StructuredSave) -> BridgeResult<()> {
    save.begin_unit("Settings", 1)?;
    save.put("SameNumberOfGirders", s.same_number_of_girders)?;
    save.put("GirderCount", s.girder_count)?;
    save.put("SameGirderName", s.same_girder_name)?;
    save.put("GirderName", s.girder_name.as_str())?;
    save.put_record("SpacingType", &s.spacing_type)?;
    save.put("GirderSpacing", s.girder_spacing_ft)?;
    save.put_record("MeasurementLocation", &s.measurement_location)?;
    save.put_record("MeasurementType", &s.measurement_type)?;
    save.put_record("RefGirder", &s.ref_girder)?;
    save.put("RefGirderOffset", s.ref_girder_offset_ft)?;
    save.put_record("RefGirderOffsetType", &s.ref_girder_offset_type)?;
    save.put_record("TopWidth", &s.top_width)?;
    save.put_record("SlabOffsetType", &s.slab_offset_type)?;
    save.put("SlabOffset", s.slab_offset_in)?;
    save.put("Fillet", s.fillet_in)?;
    save.put_record("CamberType", &s.camber_type)?;
    save.put("Camber", s.camber_in)?;
    save.put_record("BearingType", &s.bearing_type)?;
    save.put_record("Bearing", &s.bearing)?;
    save.end_unit()
}

fn save_pier(pier: &Pier, save: &mut dyn StructuredSave) -> BridgeResult<()> {
    save.begin_unit("Pier", 1)?;
    save.put("ID", pier.id.value())?;
    save.put("Station", pier.data.station_ft)?;
    save.put_record("BoundaryCondition", &pier.data.boundary_condition)?;
    save.put_record("SegmentConnection", &pier.data.segment_connection)?;
    for face in PierFace::ALL {
        let data = pier.data.face(face);
        save.begin_unit(face_unit(face), 1)?;
        save.put_record("Spacing", &data.spacing)?;
        save.put_record("Bearing", &data.bearing)?;
        save.put("EndDistance", data.end_distance_ft)?;
        save.put("BearingOffset", data.bearing_offset_ft)?;
        save.put_record("Diaphragm", &data.diaphragm)?;
        save.end_unit()?;
    }
    save.end_unit()
}

fn save_group(group: &GirderGroup, save: &mut dyn StructuredSave) -> BridgeResult<()> {
    save.begin_unit("GirderGroup", 1)?;
    save.put("ID", group.id.value())?;
    save.put("StartPier", group.start_pier.value())?;
    save.put("EndPier", group.end_pier.value())?;
    save.put_record("GirderTypes", &group.type_groups)?;
    save.put_record("TopWidths", &group.top_width_groups)?;
    save.put_record("SlabOffsets", &group.slab_offsets_in)?;
    save.put("GirderCount", group.girders.len())?;
    for girder in &group.girders {
        save.begin_unit("Girder", 1)?;
        save.put("ID", girder.id.value())?;
        save.put("SegmentCount", girder.segments.len())?;
        save.put("ClosureCount", girder.closures.len())?;
        for segment in &girder.segments {
            save.begin_unit("Segment", 1)?;
            save.put("ID", segment.id.value())?;
            save.put_record("Data", &segment.data)?;
            save.end_unit()?;
        }
        for closure in &girder.closures {
            save.begin_unit("Closure", 1)?;
            save.put("ID", closure.id.value())?;
            save.put_record("Support", &closure.support)?;
            save.end_unit()?;
        }
        save.end_unit()?;
    }
    save.end_unit()
}

fn save_temp_support(ts: &TemporarySupport, save: &mut dyn StructuredSave) -> BridgeResult<()> {
    let d = &ts.data;
    save.begin_unit("TemporarySupport", 1)?;
    save.put("ID", ts.id.value())?;
    save.put("Station", d.station_ft)?;
    save.put_record("SupportType", &d.support_type)?;
    save.put_record("Connection", &d.connection)?;
    save.put_record("Spacing", &d.spacing)?;
    save.put("EndDistance", d.end_distance_ft)?;
    save.put("BearingOffset", d.bearing_offset_ft)?;
    save.put("SupportWidth", d.support_width_ft)?;
    save.put("ElevationAdjustment", d.elevation_adjustment_ft)?;
    save.end_unit()
}

// ============================================================================
// Load
// ============================================================================

/// Bridge data as read from a property bag, before any checking.
#[derive(Debug, Clone)]
pub struct RawBridge {
    pub version: u32,
    pub(crate) ids: IdAllocator,
    pub(crate) settings: BridgeSettings,
    pub(crate) piers: Vec<Pier>,
    pub(crate) spans: Vec<Span>,
    pub(crate) groups: Vec<GirderGroup>,
    pub(crate) temp_supports: Vec<TemporarySupport>,
    pub(crate) neg_moment_rebar: Vec<NegMomentRebar>,
}

/// Read a bridge unit and build a checked model from it.
pub fn load_bridge(load: &mut dyn StructuredLoad, timeline: &mut dyn Timeline) -> BridgeResult<BridgeDescription> {
    RawBridge::read(load)?.build(timeline)
}

/// Enter unit `name` and read its `Count` property.
fn begin_list(load: &mut dyn StructuredLoad, name: &str) -> BridgeResult<usize> {
    load.begin_unit(name)?;
    load.get_usize("Count")
}

impl RawBridge {
    pub fn read(load: &mut dyn StructuredLoad) -> BridgeResult<Self> {
        load.begin_unit(BRIDGE_UNIT)?;
        let version = load.version();
        if !(1..=BRIDGE_UNIT_VERSION).contains(&version) {
            return Err(BridgeError::version_mismatch(version, BRIDGE_UNIT_VERSION));
        }
        let ids = load.get_record_or("IdAllocator", IdAllocator::default())?;
        let settings = read_settings(load, version)?;

        let count = begin_list(load, "Piers")?;
        let piers = (0..count).map(|_| read_pier(load)).collect::<BridgeResult<Vec<_>>>()?;
        load.end_unit()?;

        let count = begin_list(load, "Spans")?;
        let mut spans = Vec::with_capacity(count);
        for _ in 0..count {
            load.begin_unit("Span")?;
            let camber_in = if version >= CAMBER_VERSION {
                load.get_record("Camber")?
            } else {
                Vec::new()
            };
            spans.push(Span::new(SpanData { camber_in }));
            load.end_unit()?;
        }
        load.end_unit()?;

        let count = begin_list(load, "GirderGroups")?;
        let groups = (0..count).map(|_| read_group(load)).collect::<BridgeResult<Vec<_>>>()?;
        load.end_unit()?;

        let count = begin_list(load, "TemporarySupports")?;
        let temp_supports = (0..count)
            .map(|_| read_temp_support(load))
            .collect::<BridgeResult<Vec<_>>>()?;
        load.end_unit()?;

        let mut neg_moment_rebar = Vec::new();
        if version >= REBAR_VERSION {
            let count = begin_list(load, "NegMomentRebar")?;
            for _ in 0..count {
                load.begin_unit("Rebar")?;
                neg_moment_rebar.push(NegMomentRebar {
                    pier_index: load.get_usize("Pier")?,
                    layer: load.get_record("Layer")?,
                    bar_size: load.get_text("BarSize")?,
                    spacing_in: load.get_f64("Spacing")?,
                    cutoff_back_ft: load.get_f64("CutoffBack")?,
                    cutoff_ahead_ft: load.get_f64("CutoffAhead")?,
                });
                load.end_unit()?;
            }
            load.end_unit()?;
        }

        load.end_unit()?;
        Ok(RawBridge {
            version,
            ids,
            settings,
            piers,
            spans,
            groups,
            temp_supports,
            neg_moment_rebar,
        })
    }

    /// Turn the raw data into a consistent model.
    ///
    /// Counts that disagree with a group's girder count are resized, the
    /// bridge values are copied down where their selectors are active, and
    /// anything that cannot be repaired fails the load.
    pub fn build(self, timeline: &mut dyn Timeline) -> BridgeResult<BridgeDescription> {
        self.settings.validate()?;
        let mut bridge = BridgeDescription {
            piers: self.piers,
            spans: self.spans,
            groups: self.groups,
            temp_supports: self.temp_supports,
            settings: self.settings,
            neg_moment_rebar: self.neg_moment_rebar,
            ids: self.ids,
        };
        bridge.observe_ids();
        bridge.renumber_all();
        bridge.renumber_groups();
        for group in &mut bridge.groups {
            for (i, girder) in group.girders.iter_mut().enumerate() {
                girder.index = i;
            }
        }

        let structural = bridge.structural_violations();
        if !structural.is_empty() {
            return Err(BridgeError::InvariantViolation { violations: structural });
        }

        bridge.update_assignments();
        let repairs = bridge.violations();
        if !repairs.is_empty() {
            warn!(count = repairs.len(), first = %repairs[0], "repairing loaded bridge");
            bridge.normalize();
            bridge.update_assignments();
        }
        let remaining = bridge.violations();
        if !remaining.is_empty() {
            return Err(BridgeError::InvariantViolation { violations: remaining });
        }

        bridge.copy_down_from_settings(timeline);
        bridge.validate()?;
        debug!(
            version = self.version,
            piers = bridge.piers.len(),
            groups = bridge.groups.len(),
            "bridge loaded"
        );
        Ok(bridge)
    }
}

impl BridgeDescription {
    /// Advance the allocator past every ID in the model.
    fn observe_ids(&mut self) {
        let ids = &mut self.ids;
        for p in &self.piers {
            ids.update_next_id(EntityKind::Pier, p.id.value());
        }
        for t in &self.temp_supports {
            ids.update_next_id(EntityKind::TemporarySupport, t.id.value());
        }
        for g in &self.groups {
            ids.update_next_id(EntityKind::GirderGroup, g.id.value());
            for girder in &g.girders {
                ids.update_next_id(EntityKind::Girder, girder.id.value());
                for s in &girder.segments {
                    ids.update_next_id(EntityKind::Segment, s.id.value());
                }
                for c in &girder.closures {
                    ids.update_next_id(EntityKind::ClosureJoint, c.id.value());
                }
            }
        }
    }
}

fn read_settings(load: &mut dyn StructuredLoad, version: u32) -> BridgeResult<BridgeSettings> {
    load.begin_unit("Settings")?;
    let defaults = BridgeSettings::default();
    let mut s = BridgeSettings {
        same_number_of_girders: load.get_bool("SameNumberOfGirders")?,
        girder_count: load.get_usize("GirderCount")?,
        same_girder_name: load.get_bool("SameGirderName")?,
        girder_name: load.get_text("GirderName")?,
        spacing_type: load.get_record("SpacingType")?,
        girder_spacing_ft: load.get_f64("GirderSpacing")?,
        measurement_location: load.get_record("MeasurementLocation")?,
        measurement_type: load.get_record("MeasurementType")?,
        ref_girder: load.get_record("RefGirder")?,
        ref_girder_offset_ft: load.get_f64("RefGirderOffset")?,
        ref_girder_offset_type: load.get_record("RefGirderOffsetType")?,
        top_width: load.get_record("TopWidth")?,
        slab_offset_type: load.get_record("SlabOffsetType")?,
        slab_offset_in: load.get_f64("SlabOffset")?,
        fillet_in: load.get_f64("Fillet")?,
        ..defaults
    };
    if version >= CAMBER_VERSION {
        s.camber_type = load.get_record("CamberType")?;
        s.camber_in = load.get_f64("Camber")?;
        s.bearing_type = load.get_record("BearingType")?;
        s.bearing = load.get_record("Bearing")?;
    }
    load.end_unit()?;
    Ok(s)
}

fn read_pier(load: &mut dyn StructuredLoad) -> BridgeResult<Pier> {
    load.begin_unit("Pier")?;
    let id = PierId(load.get_u64("ID")?);
    let mut data = PierData::new(load.get_f64("Station")?);
    data.boundary_condition = load.get_record("BoundaryCondition")?;
    data.segment_connection = load.get_record("SegmentConnection")?;
    for face in PierFace::ALL {
        load.begin_unit(face_unit(face))?;
        *data.face_mut(face) = PierFaceData {
            spacing: load.get_record("Spacing")?,
            bearing: load.get_record("Bearing")?,
            end_distance_ft: load.get_f64("EndDistance")?,
            bearing_offset_ft: load.get_f64("BearingOffset")?,
            diaphragm: load.get_record("Diaphragm")?,
        };
        load.end_unit()?;
    }
    load.end_unit()?;
    Ok(Pier::new(id, data))
}

fn read_group(load: &mut dyn StructuredLoad) -> BridgeResult<GirderGroup> {
    load.begin_unit("GirderGroup")?;
    let id = GroupId(load.get_u64("ID")?);
    let start = PierId(load.get_u64("StartPier")?);
    let end = PierId(load.get_u64("EndPier")?);
    let mut group = GirderGroup::new(id, start, end);
    group.type_groups = load.get_record("GirderTypes")?;
    group.top_width_groups = load.get_record("TopWidths")?;
    group.slab_offsets_in = load.get_record("SlabOffsets")?;

    let count = load.get_usize("GirderCount")?;
    for index in 0..count {
        load.begin_unit("Girder")?;
        let id = GirderId(load.get_u64("ID")?);
        let segment_count = load.get_usize("SegmentCount")?;
        let closure_count = load.get_usize("ClosureCount")?;
        let mut segments = Vec::with_capacity(segment_count);
        for _ in 0..segment_count {
            load.begin_unit("Segment")?;
            segments.push(Segment {
                id: SegmentId(load.get_u64("ID")?),
                data: load.get_record("Data")?,
            });
            load.end_unit()?;
        }
        let mut closures = Vec::with_capacity(closure_count);
        for _ in 0..closure_count {
            load.begin_unit("Closure")?;
            closures.push(ClosureJoint {
                id: ClosureId(load.get_u64("ID")?),
                support: load.get_record("Support")?,
            });
            load.end_unit()?;
        }
        group.girders.push(Girder {
            index,
            id,
            segments,
            closures,
        });
        load.end_unit()?;
    }
    load.end_unit()?;
    Ok(group)
}

fn read_temp_support(load: &mut dyn StructuredLoad) -> BridgeResult<TemporarySupport> {
    load.begin_unit("TemporarySupport")?;
    let id = TempSupportId(load.get_u64("ID")?);
    let data = TemporarySupportData {
        station_ft: load.get_f64("Station")?,
        support_type: load.get_record("SupportType")?,
        connection: load.get_record("Connection")?,
        spacing: load.get_record("Spacing")?,
        end_distance_ft: load.get_f64("EndDistance")?,
        bearing_offset_ft: load.get_f64("BearingOffset")?,
        support_width_ft: load.get_f64("SupportWidth")?,
        elevation_adjustment_ft: load.get_f64("ElevationAdjustment")?,
    };
    load.end_unit()?;
    Ok(TemporarySupport::new(id, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{
        CamberType, CreateGirderGroup, GirderSpacing, InsertSpan, MemberEnd, SegmentConnection, TemporarySupportEvents,
    };
    use crate::persist::{Entry, PropertyReader, PropertyUnit, PropertyValue, PropertyWriter};
    use crate::timeline::{NullTimeline, TimelineRegistry};

    fn sample(timeline: &mut TimelineRegistry) -> BridgeDescription {
        let mut bridge = BridgeDescription::new(0.0, 120.0).unwrap();
        bridge.append_span(timeline, 140.0).unwrap();
        bridge
            .create_girder_group(timeline, CreateGirderGroup::new(0, MemberEnd::End, vec![90.0], 6))
            .unwrap();
        bridge
            .insert_span(timeline, InsertSpan::new(0, PierFace::Back, 40.0).with_new_group())
            .unwrap();
        bridge
            .set_segment_connection(timeline, 2, SegmentConnection::ContinuousClosureJoint, Some(1))
            .unwrap();
        bridge
            .add_temporary_support(
                timeline,
                TemporarySupportData::closure_joint(60.0),
                TemporarySupportEvents::new(0, 2),
            )
            .unwrap();
        bridge
            .add_neg_moment_rebar(NegMomentRebar::new(2, "#6", 9.0))
            .unwrap();
        bridge.set_camber_type(CamberType::Span);
        bridge.set_span_camber(1, 0.75).unwrap();
        bridge
    }

    fn save(bridge: &BridgeDescription) -> PropertyUnit {
        let mut writer = PropertyWriter::new();
        save_bridge(bridge, &mut writer).unwrap();
        writer.finish().unwrap()
    }

    fn load(tree: &PropertyUnit) -> BridgeResult<BridgeDescription> {
        let mut reader = PropertyReader::new(tree);
        load_bridge(&mut reader, &mut NullTimeline)
    }

    /// Apply `f` to every unit in the tree, depth first
    fn visit(unit: &mut PropertyUnit, f: &mut dyn FnMut(&mut PropertyUnit)) {
        f(unit);
        for entry in &mut unit.entries {
            if let Entry::Unit(child) = entry {
                visit(child, f);
            }
        }
    }

    fn drop_properties(unit: &mut PropertyUnit, names: &[&str]) {
        unit.entries.retain(|e| match e {
            Entry::Property { name, .. } => !names.contains(&name.as_str()),
            Entry::Unit(u) => !names.contains(&u.name.as_str()),
        });
    }

    fn set_first(unit: &mut PropertyUnit, unit_name: &str, property: &str, value: PropertyValue) {
        let mut done = false;
        visit(unit, &mut |u| {
            if done || u.name != unit_name {
                return;
            }
            for e in &mut u.entries {
                if let Entry::Property { name, value: v } = e {
                    if name == property {
                        *v = value.clone();
                        done = true;
                    }
                }
            }
        });
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut timeline = TimelineRegistry::with_events(["Erect", "Cast", "Remove"]);
        let bridge = sample(&mut timeline);
        let json = serde_json::to_string_pretty(&save(&bridge)).unwrap();
        let tree: PropertyUnit = serde_json::from_str(&json).unwrap();

        let loaded = load(&tree).unwrap();
        assert_eq!(loaded, bridge);
        assert_eq!(loaded.closure_joint_count(), 2);
        for kind in EntityKind::ALL {
            assert_eq!(loaded.ids().peek(*kind), bridge.ids().peek(*kind));
        }
    }

    #[test]
    fn test_future_and_legacy_versions_rejected() {
        let bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        let mut tree = save(&bridge);
        for version in [0, BRIDGE_UNIT_VERSION + 1] {
            visit(&mut tree, &mut |u| {
                if u.name == BRIDGE_UNIT {
                    u.version = version;
                }
            });
            assert!(matches!(load(&tree), Err(BridgeError::VersionMismatch { .. })));
        }
    }

    #[test]
    fn test_version_1_fills_defaults() {
        let bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        let mut tree = save(&bridge);
        visit(&mut tree, &mut |u| {
            match u.name.as_str() {
                BRIDGE_UNIT => {
                    u.version = 1;
                    drop_properties(u, &["NegMomentRebar"]);
                }
                "Settings" => drop_properties(u, &["CamberType", "Camber", "BearingType", "Bearing"]),
                "Span" => drop_properties(u, &["Camber"]),
                _ => {}
            }
        });
        let loaded = load(&tree).unwrap();
        assert_eq!(loaded.settings().camber_type, CamberType::Bridge);
        assert_eq!(loaded.spans()[0].data().camber_in.len(), loaded.girder_groups()[0].girder_count());
        assert_eq!(loaded, bridge);
    }

    #[test]
    fn test_missing_property_fails_load() {
        let bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        let mut tree = save(&bridge);
        visit(&mut tree, &mut |u| {
            if u.name == "Pier" {
                drop_properties(u, &["Station"]);
            }
        });
        assert!(matches!(load(&tree), Err(BridgeError::MissingProperty { .. })));
    }

    #[test]
    fn test_support_outside_its_span_fails_load() {
        let mut timeline = TimelineRegistry::with_events(["Erect", "Cast", "Remove"]);
        let bridge = sample(&mut timeline);
        let mut tree = save(&bridge);
        set_first(&mut tree, "TemporarySupport", "Station", PropertyValue::Float(5000.0));
        assert!(matches!(load(&tree), Err(BridgeError::InvariantViolation { .. })));
    }

    #[test]
    fn test_spacing_count_repaired() {
        let bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        let mut tree = save(&bridge);
        let short = serde_json::to_string(&GirderSpacing::uniform(2, 8.0)).unwrap();
        set_first(&mut tree, "AheadFace", "Spacing", PropertyValue::Text(short));

        let loaded = load(&tree).unwrap();
        let count = loaded.girder_groups()[0].girder_count();
        assert_eq!(loaded.piers()[0].face(PierFace::Ahead).spacing.girder_count(), count);
    }

    #[test]
    fn test_ids_never_below_loaded_entities() {
        let bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        let mut tree = save(&bridge);
        visit(&mut tree, &mut |u| drop_properties(u, &["IdAllocator"]));
        let mut loaded = load(&tree).unwrap();
        let id = loaded.ids.next_pier_id();
        assert!(loaded.piers().iter().all(|p| p.id() != id));
    }
}
