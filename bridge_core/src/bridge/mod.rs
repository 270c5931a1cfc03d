//! # Bridge Description
//!
//! [`BridgeDescription`] owns the whole topology: the station-ordered pier
//! and span chain, the girder group partition, the temporary support set,
//! bridge-wide settings and the ID allocator. Entities are stored in plain
//! vectors; cross references are indices (rewritten in one sweep by
//! [`BridgeDescription::renumber_all`]) or stable IDs (group boundary piers,
//! closure joint supports).
//!
//! ```text
//!  P0 ---- S0 ---- P1 ---- S1 ---- P2 ---- S2 ---- P3
//!  |<------ group 0 ------>|<------- group 1 ------>|
//!                   ^ TS0 (in S0)
//! ```
//!
//! Every public mutation validates first and mutates second, so a returned
//! `Err` leaves the model untouched. In debug builds each successful edit
//! ends with a full structural validation.
//!
//! ## Example
//!
//! ```rust
//! use bridge_core::bridge::{BridgeDescription, InsertSpan, PierFace};
//! use bridge_core::timeline::NullTimeline;
//!
//! let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
//! bridge
//!     .insert_span(&mut NullTimeline, InsertSpan::new(1, PierFace::Ahead, 80.0))
//!     .unwrap();
//!
//! let stations: Vec<f64> = bridge.piers().iter().map(|p| p.station()).collect();
//! assert_eq!(stations, vec![0.0, 100.0, 180.0]);
//! assert_eq!(bridge.group_count(), 1);
//! ```

mod cascade;
mod chain;
mod deck;
mod girder;
mod girders;
mod group;
mod insert;
mod move_pier;
mod pier;
#[cfg(test)]
mod properties;
mod query;
mod remove;
mod span;
mod supports;
mod temporary_support;
mod types;
mod validate;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use cascade::CopyDown;
pub use chain::renumber_chain;
pub use deck::NegMomentRebar;
pub use girder::{ClosureJoint, Girder, Segment, SegmentData, SupportRef};
pub use group::{GirderGroup, GirderRange, GirderTypeGroup, TopWidth, TopWidthGroup};
pub use insert::{CreateGirderGroup, InsertSpan};
pub use pier::{BearingData, DiaphragmData, DiaphragmLoad, GirderSpacing, Pier, PierData, PierFaceData};
pub use span::{Span, SpanData};
pub use temporary_support::{TemporarySupport, TemporarySupportData, TemporarySupportEvents};
pub use types::*;

use crate::errors::{BridgeError, BridgeResult};
use crate::ids::{IdAllocator, PierId};
use crate::timeline::{check_event, EventIndex, NullTimeline, Timeline};

// =============================================================================
// DEFAULTS
// =============================================================================

/// Length of a new span when none can be derived (ft)
pub const DEFAULT_SPAN_LENGTH_FT: f64 = 100.0;
/// Slab offset for new girders (in)
pub const DEFAULT_SLAB_OFFSET_IN: f64 = 10.0;
/// Fillet depth (in)
pub const DEFAULT_FILLET_IN: f64 = 0.75;
/// Girder end distance from the pier centerline (ft)
pub const DEFAULT_END_DISTANCE_FT: f64 = 0.5;
/// Bearing offset from the pier centerline (ft)
pub const DEFAULT_BEARING_OFFSET_FT: f64 = 1.0;
/// Temporary support width (ft)
pub const DEFAULT_SUPPORT_WIDTH_FT: f64 = 1.0;
/// Girder spacing (ft)
pub const DEFAULT_GIRDER_SPACING_FT: f64 = 8.0;
/// Girders per group
pub const DEFAULT_GIRDER_COUNT: usize = 5;
/// Girder type name
pub const DEFAULT_GIRDER_NAME: &str = "W74G";

// =============================================================================
// BRIDGE SETTINGS
// =============================================================================

/// Bridge-wide values and the selectors that decide whether they apply to
/// every group, pier and span.
///
/// Settings are changed through the setters on [`BridgeDescription`], which
/// copy the value down when the matching selector is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeSettings {
    pub same_number_of_girders: bool,
    pub girder_count: usize,

    pub same_girder_name: bool,
    pub girder_name: String,

    pub spacing_type: GirderSpacingType,
    pub girder_spacing_ft: f64,
    pub measurement_location: MeasurementLocation,
    pub measurement_type: MeasurementType,
    pub ref_girder: Option<usize>,
    pub ref_girder_offset_ft: f64,
    pub ref_girder_offset_type: OffsetMeasurement,
    pub top_width: TopWidth,

    pub slab_offset_type: SlabOffsetType,
    pub slab_offset_in: f64,
    pub fillet_in: f64,

    pub camber_type: CamberType,
    pub camber_in: f64,

    pub bearing_type: BearingType,
    pub bearing: BearingData,
}

impl BridgeSettings {
    /// Spacing record for `girder_count` girders at the bridge-wide spacing
    pub fn bridge_spacing(&self, girder_count: usize) -> GirderSpacing {
        GirderSpacing {
            spacings_ft: vec![self.girder_spacing_ft; girder_count.saturating_sub(1)],
            measurement_location: self.measurement_location,
            measurement_type: self.measurement_type,
            ref_girder: self.ref_girder.filter(|&r| r < girder_count),
            ref_girder_offset_ft: self.ref_girder_offset_ft,
            ref_girder_offset_type: self.ref_girder_offset_type,
        }
    }

    pub(crate) fn validate(&self) -> BridgeResult<()> {
        if self.girder_count == 0 {
            return Err(BridgeError::invalid_input("girder_count", "0", "At least one girder is required"));
        }
        for (field, value) in [
            ("girder_spacing_ft", self.girder_spacing_ft),
            ("slab_offset_in", self.slab_offset_in),
            ("fillet_in", self.fillet_in),
            ("camber_in", self.camber_in),
        ] {
            if !value.is_finite() {
                return Err(BridgeError::invalid_input(field, value.to_string(), "Value must be finite"));
            }
        }
        if self.girder_spacing_ft <= 0.0 {
            return Err(BridgeError::invalid_input(
                "girder_spacing_ft",
                self.girder_spacing_ft.to_string(),
                "Spacing must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for BridgeSettings {
    fn default() -> Self {
        BridgeSettings {
            same_number_of_girders: false,
            girder_count: DEFAULT_GIRDER_COUNT,
            same_girder_name: true,
            girder_name: DEFAULT_GIRDER_NAME.to_string(),
            spacing_type: GirderSpacingType::Uniform,
            girder_spacing_ft: DEFAULT_GIRDER_SPACING_FT,
            measurement_location: MeasurementLocation::default(),
            measurement_type: MeasurementType::default(),
            ref_girder: None,
            ref_girder_offset_ft: 0.0,
            ref_girder_offset_type: OffsetMeasurement::default(),
            top_width: TopWidth::default(),
            slab_offset_type: SlabOffsetType::Bridge,
            slab_offset_in: DEFAULT_SLAB_OFFSET_IN,
            fillet_in: DEFAULT_FILLET_IN,
            camber_type: CamberType::Bridge,
            camber_in: 0.0,
            bearing_type: BearingType::Bridge,
            bearing: BearingData::default(),
        }
    }
}

// =============================================================================
// BRIDGE DESCRIPTION
// =============================================================================

/// The bridge topology and everything hanging off it.
#[derive(Debug, Clone)]
pub struct BridgeDescription {
    pub(crate) piers: Vec<Pier>,
    pub(crate) spans: Vec<Span>,
    pub(crate) groups: Vec<GirderGroup>,
    pub(crate) temp_supports: Vec<TemporarySupport>,
    pub(crate) settings: BridgeSettings,
    pub(crate) neg_moment_rebar: Vec<NegMomentRebar>,
    pub(crate) ids: IdAllocator,
}

impl BridgeDescription {
    /// A one-span bridge with default settings and no construction events.
    pub fn new(start_station_ft: f64, span_length_ft: f64) -> BridgeResult<Self> {
        BridgeDescription::create_first_span(
            BridgeSettings::default(),
            PierData::new(start_station_ft),
            SpanData::new(),
            Some(PierData::new(start_station_ft + span_length_ft)),
            &mut NullTimeline,
            None,
        )
    }

    /// Build the first span of a bridge: two piers, one span, one group with
    /// `settings.girder_count` girders.
    ///
    /// When `second` is `None` the second pier is a copy of `first` placed
    /// [`DEFAULT_SPAN_LENGTH_FT`] ahead. Both piers are registered with
    /// `erection_event` when one is given.
    pub fn create_first_span(
        settings: BridgeSettings,
        first: PierData,
        span: SpanData,
        second: Option<PierData>,
        timeline: &mut dyn Timeline,
        erection_event: Option<EventIndex>,
    ) -> BridgeResult<Self> {
        settings.validate()?;
        check_event(timeline, "erection_event", erection_event)?;
        let second = second.unwrap_or_else(|| PierData {
            station_ft: first.station_ft + DEFAULT_SPAN_LENGTH_FT,
            ..first.clone()
        });
        if !first.station_ft.is_finite() || !second.station_ft.is_finite() {
            return Err(BridgeError::invalid_input(
                "station_ft",
                format!("{} / {}", first.station_ft, second.station_ft),
                "Stations must be finite",
            ));
        }
        if second.station_ft <= first.station_ft {
            return Err(BridgeError::invalid_input(
                "station_ft",
                second.station_ft.to_string(),
                "Second pier must be ahead of the first pier",
            ));
        }

        let bridge = BridgeDescription::assemble(settings, first, span, second);
        if let Some(event) = erection_event {
            for pier in [bridge.piers[0].id, bridge.piers[1].id] {
                timeline.register_pier_erection(event, pier);
            }
        }
        debug!(start = bridge.piers[0].station(), end = bridge.piers[1].station(), "created first span");
        Ok(bridge)
    }

    /// Build a validated one-span bridge.
    fn assemble(settings: BridgeSettings, first: PierData, span: SpanData, second: PierData) -> Self {
        let mut bridge = BridgeDescription {
            piers: Vec::new(),
            spans: Vec::new(),
            groups: Vec::new(),
            temp_supports: Vec::new(),
            settings,
            neg_moment_rebar: Vec::new(),
            ids: IdAllocator::new(),
        };

        let p0 = bridge.ids.next_pier_id();
        let p1 = bridge.ids.next_pier_id();
        bridge.piers.push(Pier::new(p0, first));
        bridge.piers.push(Pier::new(p1, second));
        bridge.spans.push(Span::new(span));
        bridge.renumber_all();

        let count = bridge.settings.girder_count;
        let name = bridge.settings.girder_name.clone();
        let top_width = bridge.settings.top_width;
        let slab = bridge.settings.slab_offset_in;
        let group = bridge.build_group(p0, p1, count, &name, top_width, &[[slab; 2]]);
        bridge.groups.push(group);

        for index in 0..2 {
            bridge.adopt_bridge_values_at_pier(index);
        }
        bridge.adopt_bridge_values_at_span(0);
        bridge.finish_edit();
        bridge
    }

    /// Bridge-wide settings. Change them through the setters so dependent
    /// values are copied down.
    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// ID allocator state
    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    pub fn neg_moment_rebar(&self) -> &[NegMomentRebar] {
        &self.neg_moment_rebar
    }

    /// Add a negative-moment rebar record at an interior pier.
    pub fn add_neg_moment_rebar(&mut self, record: NegMomentRebar) -> BridgeResult<()> {
        let last = self.piers.len() - 1;
        if record.pier_index == 0 || record.pier_index >= last {
            return Err(self.reject(
                "add negative moment rebar",
                format!("pier {} is not an interior pier", record.pier_index),
            ));
        }
        self.neg_moment_rebar.push(record);
        Ok(())
    }

    pub fn remove_neg_moment_rebar(&mut self, index: usize) -> BridgeResult<NegMomentRebar> {
        if index >= self.neg_moment_rebar.len() {
            return Err(BridgeError::not_found("Negative moment rebar", index));
        }
        Ok(self.neg_moment_rebar.remove(index))
    }

    // -------------------------------------------------------------------------
    // Shared internals
    // -------------------------------------------------------------------------

    /// Log and build a precondition error.
    pub(crate) fn reject(&self, operation: &str, reason: impl Into<String>) -> BridgeError {
        let reason = reason.into();
        warn!(operation, %reason, "edit rejected");
        BridgeError::precondition(operation, reason)
    }

    pub(crate) fn pier_index_of(&self, id: PierId) -> Option<usize> {
        self.piers.iter().position(|p| p.id == id)
    }

    /// Pier indices `(start, end)` of group `group`
    pub(crate) fn group_range(&self, group: usize) -> BridgeResult<(usize, usize)> {
        let g = self
            .groups
            .get(group)
            .ok_or_else(|| BridgeError::not_found("Girder group", group))?;
        let start = self.pier_index_of(g.start_pier);
        let end = self.pier_index_of(g.end_pier);
        match (start, end) {
            (Some(s), Some(e)) => Ok((s, e)),
            _ => Err(BridgeError::Internal {
                message: format!("group {} references a missing pier", g.id),
            }),
        }
    }

    /// Index of the group holding span `span`
    pub(crate) fn group_of_span(&self, span: usize) -> BridgeResult<usize> {
        (0..self.groups.len())
            .find(|&g| matches!(self.group_range(g), Ok((s, e)) if s <= span && span < e))
            .ok_or_else(|| BridgeError::Internal {
                message: format!("span {} is not covered by a girder group", span),
            })
    }

    pub(crate) fn span_length_unchecked(&self, span: usize) -> f64 {
        let s = &self.spans[span];
        self.piers[s.next_pier].station() - self.piers[s.prev_pier].station()
    }

    /// New group between two piers with `count` fresh single-segment girders.
    pub(crate) fn build_group(
        &mut self,
        start: PierId,
        end: PierId,
        count: usize,
        name: &str,
        top_width: TopWidth,
        slab_offsets_in: &[[f64; 2]],
    ) -> GirderGroup {
        let mut group = GirderGroup::new(self.ids.next_group_id(), start, end);
        for _ in 0..count {
            let girder = Girder::new(
                self.ids.next_girder_id(),
                self.ids.next_segment_id(),
                SegmentData::default(),
            );
            group.girders.push(girder);
        }
        group.slab_offsets_in = slab_offsets_in.iter().copied().take(count).collect();
        group.join_girder_types(name);
        group.join_top_widths(top_width);
        group.fit_to_girders(name, top_width, self.settings.slab_offset_in);
        group
    }

    /// Resize per-girder data to each group's girder count and keep group
    /// boundary piers free of segment connections.
    pub(crate) fn normalize(&mut self) {
        let spacing_ft = self.settings.girder_spacing_ft;
        let camber_in = self.settings.camber_in;
        let name = self.settings.girder_name.clone();
        let top_width = self.settings.top_width;
        let slab_in = self.settings.slab_offset_in;

        for g in 0..self.groups.len() {
            let Ok((start, end)) = self.group_range(g) else {
                continue;
            };
            let count = self.groups[g].girder_count();
            for p in start..=end {
                let pier = &mut self.piers[p];
                if p > start {
                    pier.data.face_mut(PierFace::Back).spacing.set_girder_count(count, spacing_ft);
                }
                if p < end {
                    pier.data.face_mut(PierFace::Ahead).spacing.set_girder_count(count, spacing_ft);
                }
            }
            self.piers[start].data.segment_connection = SegmentConnection::ContinuousSegment;
            self.piers[end].data.segment_connection = SegmentConnection::ContinuousSegment;
            for span in &mut self.spans[start..end] {
                span.data.set_girder_count(count, camber_in);
            }
            for ts in self.temp_supports.iter_mut().filter(|t| t.span >= start && t.span < end) {
                ts.data.spacing.set_girder_count(count, spacing_ft);
            }
            self.groups[g].fit_to_girders(&name, top_width, slab_in);
        }
    }

    pub(crate) fn renumber_groups(&mut self) {
        for (i, g) in self.groups.iter_mut().enumerate() {
            g.index = i;
        }
    }

    /// Common tail of every structural edit.
    pub(crate) fn finish_edit(&mut self) {
        self.renumber_groups();
        // normalize sizes support data by the span each support sits in
        self.update_assignments();
        self.normalize();
        self.debug_check();
    }

    #[cfg(debug_assertions)]
    pub(crate) fn debug_check(&self) {
        let violations = self.violations();
        if !violations.is_empty() {
            tracing::error!(?violations, "bridge invariants broken after edit");
        }
        debug_assert!(violations.is_empty(), "bridge invariants broken: {:?}", violations);
    }

    #[cfg(not(debug_assertions))]
    pub(crate) fn debug_check(&self) {}
}

impl Default for BridgeDescription {
    fn default() -> Self {
        BridgeDescription::assemble(
            BridgeSettings::default(),
            PierData::new(0.0),
            SpanData::new(),
            PierData::new(DEFAULT_SPAN_LENGTH_FT),
        )
    }
}

/// Structural equality. Allocator high-water marks are not compared, and
/// pier faces without an attached span are ignored.
impl PartialEq for BridgeDescription {
    fn eq(&self, other: &Self) -> bool {
        self.settings == other.settings
            && self.neg_moment_rebar == other.neg_moment_rebar
            && self.piers.len() == other.piers.len()
            && self.spans.len() == other.spans.len()
            && self.groups.len() == other.groups.len()
            && self.temp_supports.len() == other.temp_supports.len()
            && self.piers.iter().zip(&other.piers).all(|(a, b)| a.same_as(b))
            && self.spans.iter().zip(&other.spans).all(|(a, b)| a.same_as(b))
            && self.groups.iter().zip(&other.groups).all(|(a, b)| a.same_as(b))
            && self.temp_supports.iter().zip(&other.temp_supports).all(|(a, b)| a.same_as(b))
    }
}
