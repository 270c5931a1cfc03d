//! Enumerations shared across the bridge model.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! display_via_name {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.display_name())
                }
            }
        )*
    };
}

// =============================================================================
// EDIT SELECTORS
// =============================================================================

/// Side of a pier: `Back` faces decreasing station, `Ahead` increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PierFace {
    #[default]
    Back,
    Ahead,
}

impl PierFace {
    pub const ALL: [PierFace; 2] = [PierFace::Back, PierFace::Ahead];

    pub fn opposite(self) -> PierFace {
        match self {
            PierFace::Back => PierFace::Ahead,
            PierFace::Ahead => PierFace::Back,
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            PierFace::Back => 0,
            PierFace::Ahead => 1,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PierFace::Back => "Back",
            PierFace::Ahead => "Ahead",
        }
    }
}

/// End of a member (span, group, segment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MemberEnd {
    #[default]
    Start,
    End,
}

impl MemberEnd {
    pub const ALL: [MemberEnd; 2] = [MemberEnd::Start, MemberEnd::End];

    pub(crate) fn slot(self) -> usize {
        match self {
            MemberEnd::Start => 0,
            MemberEnd::End => 1,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MemberEnd::Start => "Start",
            MemberEnd::End => "End",
        }
    }
}

/// Which boundary pier of a span (or group) is deleted with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RemovePier {
    #[default]
    PrevPier,
    NextPier,
}

impl RemovePier {
    pub fn display_name(&self) -> &'static str {
        match self {
            RemovePier::PrevPier => "Previous Pier",
            RemovePier::NextPier => "Next Pier",
        }
    }
}

/// How the rest of the bridge reacts when one pier is moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MovePierOption {
    /// Translate the whole bridge
    MoveBridge,
    /// Change the length of the span back of the pier; piers ahead follow
    AdjustPrevSpan,
    /// Change the length of the span ahead of the pier; piers back follow
    AdjustNextSpan,
    /// Only this pier moves; both adjacent spans change length
    #[default]
    AdjustAdjacentSpans,
}

impl MovePierOption {
    pub const ALL: [MovePierOption; 4] = [
        MovePierOption::MoveBridge,
        MovePierOption::AdjustPrevSpan,
        MovePierOption::AdjustNextSpan,
        MovePierOption::AdjustAdjacentSpans,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            MovePierOption::MoveBridge => "Move bridge",
            MovePierOption::AdjustPrevSpan => "Adjust previous span",
            MovePierOption::AdjustNextSpan => "Adjust next span",
            MovePierOption::AdjustAdjacentSpans => "Adjust adjacent spans",
        }
    }
}

// =============================================================================
// CONNECTIONS
// =============================================================================

/// Boundary condition at a pier that terminates a girder group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BoundaryCondition {
    #[default]
    Hinge,
    Roller,
    ContinuousAfterDeck,
    ContinuousBeforeDeck,
    IntegralAfterDeck,
    IntegralBeforeDeck,
    IntegralAfterDeckHingeBack,
    IntegralBeforeDeckHingeBack,
    IntegralAfterDeckHingeAhead,
    IntegralBeforeDeckHingeAhead,
}

impl BoundaryCondition {
    pub const ALL: [BoundaryCondition; 10] = [
        BoundaryCondition::Hinge,
        BoundaryCondition::Roller,
        BoundaryCondition::ContinuousAfterDeck,
        BoundaryCondition::ContinuousBeforeDeck,
        BoundaryCondition::IntegralAfterDeck,
        BoundaryCondition::IntegralBeforeDeck,
        BoundaryCondition::IntegralAfterDeckHingeBack,
        BoundaryCondition::IntegralBeforeDeckHingeBack,
        BoundaryCondition::IntegralAfterDeckHingeAhead,
        BoundaryCondition::IntegralBeforeDeckHingeAhead,
    ];

    /// Conditions that make sense at the first or last pier of the bridge
    pub const ABUTMENT: [BoundaryCondition; 4] = [
        BoundaryCondition::Hinge,
        BoundaryCondition::Roller,
        BoundaryCondition::IntegralAfterDeck,
        BoundaryCondition::IntegralBeforeDeck,
    ];

    /// True when girders are made continuous over the pier
    pub fn is_continuous(&self) -> bool {
        matches!(
            self,
            BoundaryCondition::ContinuousAfterDeck | BoundaryCondition::ContinuousBeforeDeck
        )
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            BoundaryCondition::IntegralAfterDeck
                | BoundaryCondition::IntegralBeforeDeck
                | BoundaryCondition::IntegralAfterDeckHingeBack
                | BoundaryCondition::IntegralBeforeDeckHingeBack
                | BoundaryCondition::IntegralAfterDeckHingeAhead
                | BoundaryCondition::IntegralBeforeDeckHingeAhead
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BoundaryCondition::Hinge => "Hinge",
            BoundaryCondition::Roller => "Roller",
            BoundaryCondition::ContinuousAfterDeck => "Continuous after deck placement",
            BoundaryCondition::ContinuousBeforeDeck => "Continuous before deck placement",
            BoundaryCondition::IntegralAfterDeck => "Integral after deck placement",
            BoundaryCondition::IntegralBeforeDeck => "Integral before deck placement",
            BoundaryCondition::IntegralAfterDeckHingeBack => "Hinged back, integral ahead after deck placement",
            BoundaryCondition::IntegralBeforeDeckHingeBack => "Hinged back, integral ahead before deck placement",
            BoundaryCondition::IntegralAfterDeckHingeAhead => "Integral back, hinged ahead after deck placement",
            BoundaryCondition::IntegralBeforeDeckHingeAhead => "Integral back, hinged ahead before deck placement",
        }
    }
}

/// How segments meet at an interior pier of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SegmentConnection {
    /// One segment runs continuously over the pier
    #[default]
    ContinuousSegment,
    /// One segment, made integral with the pier
    IntegralSegment,
    /// Two segments joined by a cast-in-place closure at the pier
    ContinuousClosureJoint,
    /// Closure joint cast integrally with the pier
    IntegralClosureJoint,
}

impl SegmentConnection {
    pub const ALL: [SegmentConnection; 4] = [
        SegmentConnection::ContinuousSegment,
        SegmentConnection::IntegralSegment,
        SegmentConnection::ContinuousClosureJoint,
        SegmentConnection::IntegralClosureJoint,
    ];

    /// True when segments are jointed at the pier
    pub fn has_closure(&self) -> bool {
        matches!(
            self,
            SegmentConnection::ContinuousClosureJoint | SegmentConnection::IntegralClosureJoint
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SegmentConnection::ContinuousSegment => "Continuous segment",
            SegmentConnection::IntegralSegment => "Integral segment",
            SegmentConnection::ContinuousClosureJoint => "Continuous closure joint",
            SegmentConnection::IntegralClosureJoint => "Integral closure joint",
        }
    }
}

/// Kind of temporary support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TemporarySupportType {
    #[default]
    ErectionTower,
    /// Hangs segment ends from each other; only valid at a closure joint
    StrongBack,
}

impl TemporarySupportType {
    pub const ALL: [TemporarySupportType; 2] = [TemporarySupportType::ErectionTower, TemporarySupportType::StrongBack];

    pub fn display_name(&self) -> &'static str {
        match self {
            TemporarySupportType::ErectionTower => "Erection tower",
            TemporarySupportType::StrongBack => "Strong back",
        }
    }
}

/// How segments meet at a temporary support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TemporarySupportConnection {
    #[default]
    ContinuousSegment,
    ClosureJoint,
}

impl TemporarySupportConnection {
    pub fn display_name(&self) -> &'static str {
        match self {
            TemporarySupportConnection::ContinuousSegment => "Continuous segment",
            TemporarySupportConnection::ClosureJoint => "Closure joint",
        }
    }
}

// =============================================================================
// BRIDGE-LEVEL SETTING SELECTORS
// =============================================================================

/// Girder spacing layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GirderSpacingType {
    /// Same spacing everywhere (bridge-wide)
    #[default]
    Uniform,
    /// Spacing defined per pier face
    General,
    /// Adjacent girders, same joint spacing everywhere (bridge-wide)
    UniformAdjacent,
    /// Adjacent girders, joint spacing defined per pier face
    GeneralAdjacent,
    /// Adjacent girders at constant spacing (bridge-wide)
    ConstantAdjacent,
}

impl GirderSpacingType {
    /// True when one spacing value applies to the whole bridge
    pub fn is_bridge_spacing(&self) -> bool {
        matches!(
            self,
            GirderSpacingType::Uniform | GirderSpacingType::UniformAdjacent | GirderSpacingType::ConstantAdjacent
        )
    }

    pub fn is_adjacent(&self) -> bool {
        matches!(
            self,
            GirderSpacingType::UniformAdjacent | GirderSpacingType::GeneralAdjacent | GirderSpacingType::ConstantAdjacent
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GirderSpacingType::Uniform => "Uniform spacing",
            GirderSpacingType::General => "General spacing",
            GirderSpacingType::UniformAdjacent => "Uniform adjacent",
            GirderSpacingType::GeneralAdjacent => "General adjacent",
            GirderSpacingType::ConstantAdjacent => "Constant adjacent",
        }
    }
}

/// Where girder spacing is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MeasurementLocation {
    CenterlinePier,
    #[default]
    CenterlineBearing,
}

/// Direction in which girder spacing is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MeasurementType {
    #[default]
    NormalToItem,
    AlongItem,
}

/// Datum for the reference girder offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OffsetMeasurement {
    #[default]
    Alignment,
    Bridge,
}

/// Scope of slab offset input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SlabOffsetType {
    #[default]
    Bridge,
    Group,
    Girder,
}

impl SlabOffsetType {
    pub fn display_name(&self) -> &'static str {
        match self {
            SlabOffsetType::Bridge => "Same for entire bridge",
            SlabOffsetType::Group => "Unique per group",
            SlabOffsetType::Girder => "Unique per girder",
        }
    }
}

/// Scope of assumed excess camber input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CamberType {
    #[default]
    Bridge,
    Span,
    Girder,
}

impl CamberType {
    pub fn display_name(&self) -> &'static str {
        match self {
            CamberType::Bridge => "Same for entire bridge",
            CamberType::Span => "Unique per span",
            CamberType::Girder => "Unique per girder",
        }
    }
}

/// Scope of bearing input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BearingType {
    #[default]
    Bridge,
    Pier,
    Girder,
}

impl BearingType {
    pub fn display_name(&self) -> &'static str {
        match self {
            BearingType::Bridge => "Same for entire bridge",
            BearingType::Pier => "Unique per pier",
            BearingType::Girder => "Unique per girder",
        }
    }
}

/// Bearing plan shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BearingShape {
    #[default]
    Rectangular,
    Round,
}

/// How the girder top width is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TopWidthType {
    #[default]
    Symmetric,
    CenteredCG,
    Asymmetric,
}

/// Depth variation of a precast segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SegmentVariation {
    #[default]
    None,
    Linear,
    Parabolic,
    DoubleLinear,
    DoubleParabolic,
}

/// Deck rebar mat layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RebarLayer {
    #[default]
    Top,
    Bottom,
}

display_via_name!(
    PierFace,
    MemberEnd,
    RemovePier,
    MovePierOption,
    BoundaryCondition,
    SegmentConnection,
    TemporarySupportType,
    TemporarySupportConnection,
    GirderSpacingType,
    SlabOffsetType,
    CamberType,
    BearingType,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pier_face_opposite() {
        assert_eq!(PierFace::Back.opposite(), PierFace::Ahead);
        assert_eq!(PierFace::Ahead.opposite(), PierFace::Back);
    }

    #[test]
    fn test_segment_connection_closures() {
        assert!(!SegmentConnection::ContinuousSegment.has_closure());
        assert!(!SegmentConnection::IntegralSegment.has_closure());
        assert!(SegmentConnection::ContinuousClosureJoint.has_closure());
        assert!(SegmentConnection::IntegralClosureJoint.has_closure());
    }

    #[test]
    fn test_spacing_type_scope() {
        assert!(GirderSpacingType::Uniform.is_bridge_spacing());
        assert!(!GirderSpacingType::General.is_bridge_spacing());
        assert!(GirderSpacingType::ConstantAdjacent.is_adjacent());
    }

    #[test]
    fn test_enum_serialization() {
        let json = serde_json::to_string(&BoundaryCondition::ContinuousAfterDeck).unwrap();
        assert_eq!(json, "\"ContinuousAfterDeck\"");
        let roundtrip: BoundaryCondition = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, BoundaryCondition::ContinuousAfterDeck);
    }

    #[test]
    fn test_display() {
        assert_eq!(MovePierOption::AdjustPrevSpan.to_string(), "Adjust previous span");
        assert_eq!(RemovePier::NextPier.to_string(), "Next Pier");
    }
}
