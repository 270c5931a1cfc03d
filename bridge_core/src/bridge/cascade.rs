//! # Attribute Cascade
//!
//! Bridge-wide values and the selectors that make them apply everywhere.
//! When a selector is active every group, pier face, span and temporary
//! support carries the bridge value:
//!
//! | Item          | Selector                       | Targets                          |
//! |---------------|--------------------------------|----------------------------------|
//! | girder count  | `same_number_of_girders`       | girders of every group           |
//! | girder name   | `same_girder_name`             | girder type ranges               |
//! | spacing       | spacing type is bridge-wide    | pier faces, temporary supports, top widths |
//! | slab offset   | slab offset type `Bridge`      | group slab offsets               |
//! | camber        | camber type `Bridge`           | span camber                      |
//! | bearing       | bearing type `Bridge`          | pier face bearings               |
//!
//! Bridge-level setters copy their item down when its selector is active.
//! Element-level setters for an item under an active selector are rejected,
//! so the bridge value cannot be overridden piecemeal. Topology edits never
//! cascade; the entities they create are initialised from the bridge values.
//!
//! ## Example
//!
//! ```rust
//! use bridge_core::bridge::{BridgeDescription, CopyDown};
//! use bridge_core::timeline::NullTimeline;
//!
//! let mut bridge = BridgeDescription::new(0.0, 120.0).unwrap();
//! bridge.set_same_number_of_girders(&mut NullTimeline, true).unwrap();
//! bridge.set_girder_count(&mut NullTimeline, 7).unwrap();
//! assert_eq!(bridge.girder_group(0).unwrap().girder_count(), 7);
//!
//! // Re-applying the selected items is a no-op on a consistent bridge
//! let before = bridge.clone();
//! bridge.copy_down(&mut NullTimeline, CopyDown::ALL);
//! assert_eq!(bridge, before);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::group::TopWidth;
use super::pier::{BearingData, PierFaceData};
use super::types::{BearingType, BoundaryCondition, CamberType, GirderSpacingType, MemberEnd, PierFace, SlabOffsetType};
use super::{BridgeDescription, BridgeSettings};
use crate::errors::{BridgeError, BridgeResult};
use crate::timeline::{NullTimeline, Timeline};

// =============================================================================
// COPY DOWN SELECTION
// =============================================================================

/// Items to copy from the bridge level down to groups, piers and spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CopyDown {
    pub girder_count: bool,
    pub girder_name: bool,
    pub spacing: bool,
    pub slab_offset: bool,
    pub camber: bool,
    pub bearing: bool,
}

impl CopyDown {
    pub const ALL: CopyDown = CopyDown {
        girder_count: true,
        girder_name: true,
        spacing: true,
        slab_offset: true,
        camber: true,
        bearing: true,
    };

    pub const NONE: CopyDown = CopyDown {
        girder_count: false,
        girder_name: false,
        spacing: false,
        slab_offset: false,
        camber: false,
        bearing: false,
    };

    /// The items whose bridge-wide selector is active
    pub fn from_settings(settings: &BridgeSettings) -> Self {
        CopyDown {
            girder_count: settings.same_number_of_girders,
            girder_name: settings.same_girder_name,
            spacing: settings.spacing_type.is_bridge_spacing(),
            slab_offset: settings.slab_offset_type == SlabOffsetType::Bridge,
            camber: settings.camber_type == CamberType::Bridge,
            bearing: settings.bearing_type == BearingType::Bridge,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == CopyDown::NONE
    }
}

impl BridgeDescription {
    // =========================================================================
    // CASCADE
    // =========================================================================

    /// Overwrite element-level values with the bridge values for the
    /// selected items.
    pub fn copy_down(&mut self, timeline: &mut dyn Timeline, selection: CopyDown) {
        if selection.girder_count {
            let count = self.settings.girder_count;
            for g in 0..self.groups.len() {
                if self.groups[g].girder_count() != count {
                    self.resize_group_girders(timeline, g, count);
                }
            }
        }
        if selection.girder_name {
            let name = self.settings.girder_name.clone();
            for group in &mut self.groups {
                group.join_girder_types(name.as_str());
            }
        }
        if selection.spacing {
            let top_width = self.settings.top_width;
            for group in &mut self.groups {
                group.join_top_widths(top_width);
            }
        }
        if selection.slab_offset {
            let slab = self.settings.slab_offset_in;
            for group in &mut self.groups {
                group.set_all_slab_offsets(slab);
            }
        }
        if selection.camber {
            for s in 0..self.spans.len() {
                self.adopt_bridge_camber(s);
            }
        }
        if selection.spacing || selection.bearing {
            for p in 0..self.piers.len() {
                self.adopt_pier_values(p, selection.spacing, selection.bearing);
            }
        }
        if selection.spacing {
            for t in 0..self.temp_supports.len() {
                self.adopt_bridge_values_at_temp_support(t);
            }
        }
        self.finish_edit();
        debug!(?selection, "copied bridge values down");
    }

    /// Copy down every item whose selector is active.
    pub fn copy_down_from_settings(&mut self, timeline: &mut dyn Timeline) {
        let selection = CopyDown::from_settings(&self.settings);
        self.copy_down(timeline, selection);
    }

    fn adopt_pier_values(&mut self, index: usize, spacing: bool, bearing: bool) {
        for face in PierFace::ALL {
            let span = match face {
                PierFace::Back => self.piers[index].prev_span,
                PierFace::Ahead => self.piers[index].next_span,
            };
            let Some(span) = span else { continue };
            let Ok(group) = self.group_of_span(span) else { continue };
            let bridge_spacing = self.settings.bridge_spacing(self.groups[group].girder_count());
            let bridge_bearing = self.settings.bearing.clone();
            let data = self.piers[index].data.face_mut(face);
            if spacing {
                data.spacing = bridge_spacing;
            }
            if bearing {
                data.bearing = bridge_bearing;
            }
        }
    }

    fn adopt_bridge_camber(&mut self, span: usize) {
        let Ok(group) = self.group_of_span(span) else {
            return;
        };
        let count = self.groups[group].girder_count();
        self.spans[span].data.camber_in = vec![self.settings.camber_in; count];
    }

    /// Initialise the span-facing data of pier `index` from the bridge
    /// values whose selectors are active.
    pub(crate) fn adopt_bridge_values_at_pier(&mut self, index: usize) {
        let spacing = self.settings.spacing_type.is_bridge_spacing();
        let bearing = self.settings.bearing_type == BearingType::Bridge;
        if spacing || bearing {
            self.adopt_pier_values(index, spacing, bearing);
        }
    }

    pub(crate) fn adopt_bridge_values_at_span(&mut self, index: usize) {
        if self.settings.camber_type == CamberType::Bridge {
            self.adopt_bridge_camber(index);
        }
    }

    /// Initialise temporary support `index` spacing from the bridge value.
    pub(crate) fn adopt_bridge_values_at_temp_support(&mut self, index: usize) {
        if !self.settings.spacing_type.is_bridge_spacing() {
            return;
        }
        let Ok(group) = self.group_of_span(self.temp_supports[index].span) else {
            return;
        };
        let spacing = self.settings.bridge_spacing(self.groups[group].girder_count());
        self.temp_supports[index].data.spacing = spacing;
    }

    /// Apply the bridge values to a group created by a topology edit.
    pub(crate) fn adopt_bridge_values_in_group(&mut self, group: usize) {
        let s = &self.settings;
        let (name, top_width, slab) = (s.girder_name.clone(), s.top_width, s.slab_offset_in);
        let selection = CopyDown::from_settings(s);
        let g = &mut self.groups[group];
        if selection.girder_name {
            g.join_girder_types(name);
        }
        if selection.spacing {
            g.join_top_widths(top_width);
        }
        if selection.slab_offset {
            g.set_all_slab_offsets(slab);
        }
    }

    // =========================================================================
    // BRIDGE-LEVEL SETTERS
    // =========================================================================

    /// Use one girder count for every group. Turning it on copies the
    /// bridge count to every group.
    pub fn set_same_number_of_girders(&mut self, timeline: &mut dyn Timeline, enabled: bool) -> BridgeResult<()> {
        self.settings.same_number_of_girders = enabled;
        if enabled {
            self.copy_down(timeline, CopyDown { girder_count: true, ..CopyDown::NONE });
        }
        Ok(())
    }

    pub fn set_girder_count(&mut self, timeline: &mut dyn Timeline, count: usize) -> BridgeResult<()> {
        if count == 0 {
            return Err(BridgeError::invalid_input("girder_count", "0", "At least one girder is required"));
        }
        self.settings.girder_count = count;
        if self.settings.same_number_of_girders {
            self.copy_down(timeline, CopyDown { girder_count: true, ..CopyDown::NONE });
        }
        Ok(())
    }

    pub fn set_same_girder_name(&mut self, enabled: bool) {
        self.settings.same_girder_name = enabled;
        if enabled {
            self.copy_down(&mut NullTimeline, CopyDown { girder_name: true, ..CopyDown::NONE });
        }
    }

    pub fn set_girder_name(&mut self, name: impl Into<String>) -> BridgeResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BridgeError::invalid_input("girder_name", name, "Girder name cannot be empty"));
        }
        self.settings.girder_name = name;
        if self.settings.same_girder_name {
            self.copy_down(&mut NullTimeline, CopyDown { girder_name: true, ..CopyDown::NONE });
        }
        Ok(())
    }

    pub fn set_girder_spacing_type(&mut self, spacing_type: GirderSpacingType) {
        self.settings.spacing_type = spacing_type;
        self.copy_spacing_if_bridge();
    }

    /// Bridge-wide girder spacing (ft)
    pub fn set_girder_spacing(&mut self, spacing_ft: f64) -> BridgeResult<()> {
        if !spacing_ft.is_finite() || spacing_ft <= 0.0 {
            return Err(BridgeError::invalid_input(
                "girder_spacing_ft",
                spacing_ft.to_string(),
                "Spacing must be positive",
            ));
        }
        self.settings.girder_spacing_ft = spacing_ft;
        self.copy_spacing_if_bridge();
        Ok(())
    }

    /// Bridge-wide top flange width
    pub fn set_top_width(&mut self, top_width: TopWidth) {
        self.settings.top_width = top_width;
        self.copy_spacing_if_bridge();
    }

    fn copy_spacing_if_bridge(&mut self) {
        if self.settings.spacing_type.is_bridge_spacing() {
            self.copy_down(&mut NullTimeline, CopyDown { spacing: true, ..CopyDown::NONE });
        }
    }

    pub fn set_slab_offset_type(&mut self, slab_offset_type: SlabOffsetType) {
        self.settings.slab_offset_type = slab_offset_type;
        if slab_offset_type == SlabOffsetType::Bridge {
            self.copy_down(&mut NullTimeline, CopyDown { slab_offset: true, ..CopyDown::NONE });
        }
    }

    /// Bridge-wide slab offset (in)
    pub fn set_slab_offset(&mut self, slab_offset_in: f64) -> BridgeResult<()> {
        check_finite("slab_offset_in", slab_offset_in)?;
        self.settings.slab_offset_in = slab_offset_in;
        if self.settings.slab_offset_type == SlabOffsetType::Bridge {
            self.copy_down(&mut NullTimeline, CopyDown { slab_offset: true, ..CopyDown::NONE });
        }
        Ok(())
    }

    pub fn set_fillet(&mut self, fillet_in: f64) -> BridgeResult<()> {
        check_finite("fillet_in", fillet_in)?;
        self.settings.fillet_in = fillet_in;
        Ok(())
    }

    pub fn set_camber_type(&mut self, camber_type: CamberType) {
        self.settings.camber_type = camber_type;
        if camber_type == CamberType::Bridge {
            self.copy_down(&mut NullTimeline, CopyDown { camber: true, ..CopyDown::NONE });
        }
    }

    /// Bridge-wide camber (in)
    pub fn set_camber(&mut self, camber_in: f64) -> BridgeResult<()> {
        check_finite("camber_in", camber_in)?;
        self.settings.camber_in = camber_in;
        if self.settings.camber_type == CamberType::Bridge {
            self.copy_down(&mut NullTimeline, CopyDown { camber: true, ..CopyDown::NONE });
        }
        Ok(())
    }

    pub fn set_bearing_type(&mut self, bearing_type: BearingType) {
        self.settings.bearing_type = bearing_type;
        if bearing_type == BearingType::Bridge {
            self.copy_down(&mut NullTimeline, CopyDown { bearing: true, ..CopyDown::NONE });
        }
    }

    pub fn set_bearing(&mut self, bearing: BearingData) {
        self.settings.bearing = bearing;
        if self.settings.bearing_type == BearingType::Bridge {
            self.copy_down(&mut NullTimeline, CopyDown { bearing: true, ..CopyDown::NONE });
        }
    }

    // =========================================================================
    // ELEMENT-LEVEL SETTERS
    // =========================================================================

    fn group_index(&self, group: usize) -> BridgeResult<usize> {
        if group < self.groups.len() {
            Ok(group)
        } else {
            Err(BridgeError::not_found("Girder group", group))
        }
    }

    /// Rename one girder type range of a group.
    pub fn set_group_girder_name(&mut self, group: usize, range: usize, name: impl Into<String>) -> BridgeResult<()> {
        const OP: &str = "set group girder name";
        let g = self.group_index(group)?;
        if self.settings.same_girder_name {
            return Err(self.reject(OP, "the bridge uses one girder name"));
        }
        if !self.groups[g].set_girder_type_name(range, name) {
            return Err(BridgeError::not_found("Girder type range", range));
        }
        Ok(())
    }

    /// One girder type range per girder.
    pub fn expand_group_girder_names(&mut self, group: usize) -> BridgeResult<()> {
        let g = self.group_index(group)?;
        if self.settings.same_girder_name {
            return Err(self.reject("expand girder names", "the bridge uses one girder name"));
        }
        self.groups[g].expand_girder_types();
        Ok(())
    }

    /// One girder type range for the whole group.
    pub fn join_group_girder_names(&mut self, group: usize, name: impl Into<String>) -> BridgeResult<()> {
        let g = self.group_index(group)?;
        if self.settings.same_girder_name {
            return Err(self.reject("join girder names", "the bridge uses one girder name"));
        }
        self.groups[g].join_girder_types(name);
        Ok(())
    }

    pub fn set_group_top_width(&mut self, group: usize, range: usize, top_width: TopWidth) -> BridgeResult<()> {
        const OP: &str = "set group top width";
        let g = self.group_index(group)?;
        if self.settings.spacing_type.is_bridge_spacing() {
            return Err(self.reject(OP, "the bridge uses one spacing and top width"));
        }
        if !self.groups[g].set_top_width(range, top_width) {
            return Err(BridgeError::not_found("Top width range", range));
        }
        Ok(())
    }

    pub fn expand_group_top_widths(&mut self, group: usize) -> BridgeResult<()> {
        let g = self.group_index(group)?;
        if self.settings.spacing_type.is_bridge_spacing() {
            return Err(self.reject("expand top widths", "the bridge uses one spacing and top width"));
        }
        self.groups[g].expand_top_widths();
        Ok(())
    }

    pub fn join_group_top_widths(&mut self, group: usize, top_width: TopWidth) -> BridgeResult<()> {
        let g = self.group_index(group)?;
        if self.settings.spacing_type.is_bridge_spacing() {
            return Err(self.reject("join top widths", "the bridge uses one spacing and top width"));
        }
        self.groups[g].join_top_widths(top_width);
        Ok(())
    }

    /// Slab offset for every girder of a group (group slab offset type).
    pub fn set_group_slab_offset(&mut self, group: usize, slab_offset_in: f64) -> BridgeResult<()> {
        let g = self.group_index(group)?;
        check_finite("slab_offset_in", slab_offset_in)?;
        if self.settings.slab_offset_type != SlabOffsetType::Group {
            return Err(self.reject(
                "set group slab offset",
                format!("slab offset type is {}", self.settings.slab_offset_type),
            ));
        }
        self.groups[g].set_all_slab_offsets(slab_offset_in);
        Ok(())
    }

    /// Slab offset at one end of one girder (girder slab offset type).
    pub fn set_girder_slab_offset(
        &mut self,
        group: usize,
        girder: usize,
        end: MemberEnd,
        slab_offset_in: f64,
    ) -> BridgeResult<()> {
        let g = self.group_index(group)?;
        check_finite("slab_offset_in", slab_offset_in)?;
        if self.settings.slab_offset_type != SlabOffsetType::Girder {
            return Err(self.reject(
                "set girder slab offset",
                format!("slab offset type is {}", self.settings.slab_offset_type),
            ));
        }
        if girder >= self.groups[g].girder_count() {
            return Err(BridgeError::not_found("Girder", girder));
        }
        self.groups[g].set_slab_offset(girder, end, slab_offset_in);
        Ok(())
    }

    /// Camber for every girder in a span (span camber type).
    pub fn set_span_camber(&mut self, span: usize, camber_in: f64) -> BridgeResult<()> {
        check_finite("camber_in", camber_in)?;
        if span >= self.spans.len() {
            return Err(BridgeError::not_found("Span", span));
        }
        if self.settings.camber_type != CamberType::Span {
            return Err(self.reject("set span camber", format!("camber type is {}", self.settings.camber_type)));
        }
        self.spans[span].data.camber_in.iter_mut().for_each(|c| *c = camber_in);
        Ok(())
    }

    /// Camber of one girder in a span (girder camber type).
    pub fn set_girder_camber(&mut self, span: usize, girder: usize, camber_in: f64) -> BridgeResult<()> {
        check_finite("camber_in", camber_in)?;
        if span >= self.spans.len() {
            return Err(BridgeError::not_found("Span", span));
        }
        if self.settings.camber_type != CamberType::Girder {
            return Err(self.reject("set girder camber", format!("camber type is {}", self.settings.camber_type)));
        }
        let slot = self.spans[span]
            .data
            .camber_in
            .get_mut(girder)
            .ok_or_else(|| BridgeError::not_found("Girder", girder))?;
        *slot = camber_in;
        Ok(())
    }

    /// Replace the data on one face of a pier. Spacing and bearing under an
    /// active bridge-wide selector keep the bridge values.
    pub fn set_pier_face(&mut self, pier: usize, face: PierFace, data: PierFaceData) -> BridgeResult<()> {
        if pier >= self.piers.len() {
            return Err(BridgeError::not_found("Pier", pier));
        }
        for (field, value) in [
            ("end_distance_ft", data.end_distance_ft),
            ("bearing_offset_ft", data.bearing_offset_ft),
        ] {
            check_finite(field, value)?;
        }
        if data.spacing.spacings_ft.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(BridgeError::invalid_input(
                "spacing",
                format!("{:?}", data.spacing.spacings_ft),
                "Spacings must be positive",
            ));
        }
        *self.piers[pier].data.face_mut(face) = data;
        self.piers[pier].data.clamp_end_distances();
        self.adopt_bridge_values_at_pier(pier);
        self.finish_edit();
        Ok(())
    }

    pub fn set_boundary_condition(&mut self, pier: usize, condition: BoundaryCondition) -> BridgeResult<()> {
        const OP: &str = "set boundary condition";
        let p = self.piers.get(pier).ok_or_else(|| BridgeError::not_found("Pier", pier))?;
        if p.is_abutment() && !BoundaryCondition::ABUTMENT.contains(&condition) {
            return Err(self.reject(OP, format!("{} is not valid at an abutment", condition)));
        }
        if !self.is_boundary_pier(pier) {
            return Err(self.reject(OP, format!("pier {} is interior to a girder group", pier)));
        }
        self.piers[pier].data.boundary_condition = condition;
        Ok(())
    }

    // =========================================================================
    // RESOLVED VALUES
    // =========================================================================

    /// Slab offset at one end of a girder, honouring the slab offset type
    pub fn slab_offset(&self, group: usize, girder: usize, end: MemberEnd) -> Option<f64> {
        let stored = self.groups.get(group)?.stored_slab_offset_in(girder, end)?;
        Some(match self.settings.slab_offset_type {
            SlabOffsetType::Bridge => self.settings.slab_offset_in,
            SlabOffsetType::Group | SlabOffsetType::Girder => stored,
        })
    }

    /// Camber of a girder in a span, honouring the camber type
    pub fn camber(&self, span: usize, girder: usize) -> Option<f64> {
        let stored = self.spans.get(span)?.camber_in(girder)?;
        Some(match self.settings.camber_type {
            CamberType::Bridge => self.settings.camber_in,
            CamberType::Span | CamberType::Girder => stored,
        })
    }

    /// Bearing data on a pier face, honouring the bearing type
    pub fn bearing(&self, pier: usize, face: PierFace) -> Option<&BearingData> {
        let p = self.piers.get(pier)?;
        if !p.has_span(face) {
            return None;
        }
        Some(match self.settings.bearing_type {
            BearingType::Bridge => &self.settings.bearing,
            BearingType::Pier | BearingType::Girder => &p.face(face).bearing,
        })
    }
}

fn check_finite(field: &str, value: f64) -> BridgeResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(BridgeError::invalid_input(field, value.to_string(), "Value must be finite"))
    }
}
