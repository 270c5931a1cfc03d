//! # Piers
//!
//! A [`Pier`] is a permanent support at a station. Its identity (ID, index,
//! adjacent spans) is owned by the bridge model; its attributes live in a
//! [`PierData`] that callers may build freely and hand to edit operations as
//! a template.
//!
//! Each pier has a back and an ahead face. Only faces adjacent to a span are
//! meaningful: the first pier's back face and the last pier's ahead face are
//! carried along but ignored by comparisons and validation.

use serde::{Deserialize, Serialize};

use super::types::{
    BearingShape, BoundaryCondition, MeasurementLocation, MeasurementType, OffsetMeasurement, PierFace,
    SegmentConnection,
};
use super::{DEFAULT_BEARING_OFFSET_FT, DEFAULT_END_DISTANCE_FT, DEFAULT_GIRDER_COUNT, DEFAULT_GIRDER_SPACING_FT};
use crate::ids::PierId;

// =============================================================================
// GIRDER SPACING
// =============================================================================

/// Girder spacing across a pier face or temporary support.
///
/// `spacings_ft` holds one value per gap, so a face serving `n` girders has
/// `n - 1` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GirderSpacing {
    pub spacings_ft: Vec<f64>,
    pub measurement_location: MeasurementLocation,
    pub measurement_type: MeasurementType,
    /// Girder located by the reference offset; `None` is the center of the girder system
    pub ref_girder: Option<usize>,
    pub ref_girder_offset_ft: f64,
    pub ref_girder_offset_type: OffsetMeasurement,
}

impl GirderSpacing {
    /// Equal spacing for `girder_count` girders
    pub fn uniform(girder_count: usize, spacing_ft: f64) -> Self {
        GirderSpacing {
            spacings_ft: vec![spacing_ft; girder_count.saturating_sub(1)],
            measurement_location: MeasurementLocation::default(),
            measurement_type: MeasurementType::default(),
            ref_girder: None,
            ref_girder_offset_ft: 0.0,
            ref_girder_offset_type: OffsetMeasurement::default(),
        }
    }

    /// Number of girders this spacing serves
    pub fn girder_count(&self) -> usize {
        self.spacings_ft.len() + 1
    }

    /// Resize for `girder_count` girders. New gaps repeat the last spacing,
    /// or `default_ft` when there is none.
    pub fn set_girder_count(&mut self, girder_count: usize, default_ft: f64) {
        let gaps = girder_count.saturating_sub(1);
        let fill = self.spacings_ft.last().copied().unwrap_or(default_ft);
        self.spacings_ft.resize(gaps, fill);
        if let Some(r) = self.ref_girder {
            if r >= girder_count {
                self.ref_girder = None;
            }
        }
    }

    /// Replace every gap with one spacing
    pub fn join_all(&mut self, spacing_ft: f64) {
        self.spacings_ft.iter_mut().for_each(|s| *s = spacing_ft);
    }

    /// Total width between exterior girders
    pub fn total_width_ft(&self) -> f64 {
        self.spacings_ft.iter().sum()
    }
}

impl Default for GirderSpacing {
    fn default() -> Self {
        GirderSpacing::uniform(DEFAULT_GIRDER_COUNT, DEFAULT_GIRDER_SPACING_FT)
    }
}

// =============================================================================
// BEARINGS & DIAPHRAGMS
// =============================================================================

/// Bearing geometry under each girder at a pier face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BearingData {
    pub shape: BearingShape,
    /// Bearings per girder
    pub count: usize,
    /// Spacing between multiple bearings (ft)
    pub spacing_ft: f64,
    pub length_in: f64,
    pub width_in: f64,
    pub height_in: f64,
    pub recess_height_in: f64,
    pub sole_plate_height_in: f64,
}

impl Default for BearingData {
    fn default() -> Self {
        BearingData {
            shape: BearingShape::Rectangular,
            count: 1,
            spacing_ft: 0.0,
            length_in: 12.0,
            width_in: 18.0,
            height_in: 2.0,
            recess_height_in: 0.0,
            sole_plate_height_in: 0.0,
        }
    }
}

/// How diaphragm weight is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DiaphragmLoad {
    #[default]
    ApplyAtBearing,
    ApplyAtPier,
    DontApply,
}

/// End diaphragm at a pier face. `None` dimensions are computed downstream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiaphragmData {
    pub height_ft: Option<f64>,
    pub width_ft: Option<f64>,
    pub load: DiaphragmLoad,
    /// Load location measured from the pier centerline (ft)
    pub load_location_ft: f64,
}

// =============================================================================
// PIER FACE
// =============================================================================

/// Per-face girder support data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PierFaceData {
    pub spacing: GirderSpacing,
    pub bearing: BearingData,
    /// Distance from the pier centerline to the girder end (ft)
    pub end_distance_ft: f64,
    /// Distance from the pier centerline to the bearing centerline (ft)
    pub bearing_offset_ft: f64,
    pub diaphragm: DiaphragmData,
}

impl PierFaceData {
    /// Keep the girder end from passing the bearing line.
    pub fn clamp_end_distance(&mut self) {
        if self.bearing_offset_ft < self.end_distance_ft {
            self.end_distance_ft = self.bearing_offset_ft;
        }
    }
}

impl Default for PierFaceData {
    fn default() -> Self {
        PierFaceData {
            spacing: GirderSpacing::default(),
            bearing: BearingData::default(),
            end_distance_ft: DEFAULT_END_DISTANCE_FT,
            bearing_offset_ft: DEFAULT_BEARING_OFFSET_FT,
            diaphragm: DiaphragmData::default(),
        }
    }
}

// =============================================================================
// PIER
// =============================================================================

/// Pier attributes, independent of where the pier sits in the chain.
///
/// ## Example
///
/// ```rust
/// use bridge_core::bridge::{BoundaryCondition, PierData, PierFace};
///
/// let pier = PierData::new(250.0).with_boundary_condition(BoundaryCondition::Roller);
/// assert_eq!(pier.station_ft, 250.0);
/// assert_eq!(pier.face(PierFace::Ahead).end_distance_ft, 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PierData {
    pub station_ft: f64,
    pub boundary_condition: BoundaryCondition,
    pub segment_connection: SegmentConnection,
    pub faces: [PierFaceData; 2],
}

impl PierData {
    pub fn new(station_ft: f64) -> Self {
        PierData {
            station_ft,
            boundary_condition: BoundaryCondition::default(),
            segment_connection: SegmentConnection::default(),
            faces: [PierFaceData::default(), PierFaceData::default()],
        }
    }

    pub fn with_boundary_condition(mut self, condition: BoundaryCondition) -> Self {
        self.boundary_condition = condition;
        self
    }

    pub fn with_segment_connection(mut self, connection: SegmentConnection) -> Self {
        self.segment_connection = connection;
        self
    }

    pub fn with_face(mut self, face: PierFace, data: PierFaceData) -> Self {
        self.faces[face.slot()] = data;
        self
    }

    pub fn face(&self, face: PierFace) -> &PierFaceData {
        &self.faces[face.slot()]
    }

    pub fn face_mut(&mut self, face: PierFace) -> &mut PierFaceData {
        &mut self.faces[face.slot()]
    }

    /// Copy the data of face `from` onto the opposite face.
    pub(crate) fn mirror_face(&mut self, from: PierFace) {
        let source = self.faces[from.slot()].clone();
        self.faces[from.opposite().slot()] = source;
    }

    pub(crate) fn clamp_end_distances(&mut self) {
        self.faces.iter_mut().for_each(PierFaceData::clamp_end_distance);
    }
}

impl Default for PierData {
    fn default() -> Self {
        PierData::new(0.0)
    }
}

/// A pier in the bridge chain.
#[derive(Debug, Clone)]
pub struct Pier {
    pub(crate) index: usize,
    pub(crate) id: PierId,
    pub(crate) prev_span: Option<usize>,
    pub(crate) next_span: Option<usize>,
    pub(crate) data: PierData,
}

impl Pier {
    pub(crate) fn new(id: PierId, data: PierData) -> Self {
        Pier {
            index: 0,
            id,
            prev_span: None,
            next_span: None,
            data,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> PierId {
        self.id
    }

    pub fn station(&self) -> f64 {
        self.data.station_ft
    }

    /// Span back of this pier; `None` for the first pier
    pub fn prev_span(&self) -> Option<usize> {
        self.prev_span
    }

    /// Span ahead of this pier; `None` for the last pier
    pub fn next_span(&self) -> Option<usize> {
        self.next_span
    }

    /// First or last pier of the bridge
    pub fn is_abutment(&self) -> bool {
        self.prev_span.is_none() || self.next_span.is_none()
    }

    /// True when a span is attached on `face`
    pub fn has_span(&self, face: PierFace) -> bool {
        match face {
            PierFace::Back => self.prev_span.is_some(),
            PierFace::Ahead => self.next_span.is_some(),
        }
    }

    pub fn boundary_condition(&self) -> BoundaryCondition {
        self.data.boundary_condition
    }

    pub fn segment_connection(&self) -> SegmentConnection {
        self.data.segment_connection
    }

    pub fn face(&self, face: PierFace) -> &PierFaceData {
        self.data.face(face)
    }

    pub fn data(&self) -> &PierData {
        &self.data
    }

    /// Attribute equality, ignoring faces with no span attached.
    pub(crate) fn same_as(&self, other: &Pier) -> bool {
        self.id == other.id
            && self.data.station_ft == other.data.station_ft
            && self.data.boundary_condition == other.data.boundary_condition
            && self.data.segment_connection == other.data.segment_connection
            && self.prev_span == other.prev_span
            && self.next_span == other.next_span
            && PierFace::ALL
                .iter()
                .filter(|f| self.has_span(**f))
                .all(|f| self.face(*f) == other.face(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_resize_repeats_last_gap() {
        let mut spacing = GirderSpacing::uniform(3, 7.0);
        spacing.spacings_ft[1] = 9.0;
        spacing.set_girder_count(5, 8.0);
        assert_eq!(spacing.spacings_ft, vec![7.0, 9.0, 9.0, 9.0]);
        spacing.set_girder_count(2, 8.0);
        assert_eq!(spacing.spacings_ft, vec![7.0]);
        assert_eq!(spacing.girder_count(), 2);
    }

    #[test]
    fn test_spacing_resize_from_empty_uses_default() {
        let mut spacing = GirderSpacing::uniform(1, 7.0);
        assert!(spacing.spacings_ft.is_empty());
        spacing.set_girder_count(3, 6.5);
        assert_eq!(spacing.spacings_ft, vec![6.5, 6.5]);
    }

    #[test]
    fn test_ref_girder_dropped_when_out_of_range() {
        let mut spacing = GirderSpacing::uniform(6, 7.0);
        spacing.ref_girder = Some(5);
        spacing.set_girder_count(4, 7.0);
        assert_eq!(spacing.ref_girder, None);
    }

    #[test]
    fn test_end_distance_clamped_to_bearing_offset() {
        let mut face = PierFaceData {
            end_distance_ft: 1.5,
            bearing_offset_ft: 1.0,
            ..Default::default()
        };
        face.clamp_end_distance();
        assert_eq!(face.end_distance_ft, 1.0);
    }

    #[test]
    fn test_mirror_face() {
        let mut pier = PierData::new(0.0);
        pier.face_mut(PierFace::Ahead).bearing_offset_ft = 2.0;
        pier.mirror_face(PierFace::Ahead);
        assert_eq!(pier.face(PierFace::Back).bearing_offset_ft, 2.0);
    }
}
