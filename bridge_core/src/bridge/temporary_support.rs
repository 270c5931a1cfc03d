//! Temporary supports: erection towers and strong backs used during staged
//! construction. They are not part of the pier/span indexing; the span that
//! holds each one is re-derived from its station after every edit.

use serde::{Deserialize, Serialize};

use super::pier::GirderSpacing;
use super::types::{TemporarySupportConnection, TemporarySupportType};
use super::{DEFAULT_BEARING_OFFSET_FT, DEFAULT_END_DISTANCE_FT, DEFAULT_SUPPORT_WIDTH_FT};
use crate::ids::TempSupportId;
use crate::timeline::EventIndex;

/// Temporary support attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporarySupportData {
    pub station_ft: f64,
    pub support_type: TemporarySupportType,
    pub connection: TemporarySupportConnection,
    /// Segment spacing at the support
    pub spacing: GirderSpacing,
    pub end_distance_ft: f64,
    pub bearing_offset_ft: f64,
    pub support_width_ft: f64,
    pub elevation_adjustment_ft: f64,
}

impl TemporarySupportData {
    pub fn new(station_ft: f64) -> Self {
        TemporarySupportData {
            station_ft,
            support_type: TemporarySupportType::default(),
            connection: TemporarySupportConnection::default(),
            spacing: GirderSpacing::default(),
            end_distance_ft: DEFAULT_END_DISTANCE_FT,
            bearing_offset_ft: DEFAULT_BEARING_OFFSET_FT,
            support_width_ft: DEFAULT_SUPPORT_WIDTH_FT,
            elevation_adjustment_ft: 0.0,
        }
    }

    /// Erection tower with a closure joint
    pub fn closure_joint(station_ft: f64) -> Self {
        TemporarySupportData::new(station_ft).with_connection(TemporarySupportConnection::ClosureJoint)
    }

    /// Strong back (always a closure joint)
    pub fn strong_back(station_ft: f64) -> Self {
        TemporarySupportData {
            support_type: TemporarySupportType::StrongBack,
            ..TemporarySupportData::closure_joint(station_ft)
        }
    }

    pub fn with_connection(mut self, connection: TemporarySupportConnection) -> Self {
        self.connection = connection;
        self
    }

    pub fn with_support_type(mut self, support_type: TemporarySupportType) -> Self {
        self.support_type = support_type;
        self
    }

    pub fn has_closure(&self) -> bool {
        self.connection == TemporarySupportConnection::ClosureJoint
    }
}

/// Construction events attached to a temporary support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TemporarySupportEvents {
    pub erect: EventIndex,
    pub remove: EventIndex,
    /// Casting event for the closure joint; defaults to the erection event
    /// of the segment being split
    pub closure: Option<EventIndex>,
}

impl TemporarySupportEvents {
    pub fn new(erect: EventIndex, remove: EventIndex) -> Self {
        TemporarySupportEvents {
            erect,
            remove,
            closure: None,
        }
    }

    pub fn with_closure(mut self, event: EventIndex) -> Self {
        self.closure = Some(event);
        self
    }
}

/// A temporary support placed on the bridge.
#[derive(Debug, Clone)]
pub struct TemporarySupport {
    pub(crate) index: usize,
    pub(crate) id: TempSupportId,
    pub(crate) span: usize,
    pub(crate) data: TemporarySupportData,
}

impl TemporarySupport {
    pub(crate) fn new(id: TempSupportId, data: TemporarySupportData) -> Self {
        TemporarySupport {
            index: 0,
            id,
            span: 0,
            data,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> TempSupportId {
        self.id
    }

    /// Span holding this support, derived from the station
    pub fn span(&self) -> usize {
        self.span
    }

    pub fn station(&self) -> f64 {
        self.data.station_ft
    }

    pub fn support_type(&self) -> TemporarySupportType {
        self.data.support_type
    }

    pub fn connection(&self) -> TemporarySupportConnection {
        self.data.connection
    }

    pub fn has_closure(&self) -> bool {
        self.data.has_closure()
    }

    pub fn data(&self) -> &TemporarySupportData {
        &self.data
    }

    pub(crate) fn same_as(&self, other: &TemporarySupport) -> bool {
        self.id == other.id && self.index == other.index && self.span == other.span && self.data == other.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_back_is_closure_joint() {
        let data = TemporarySupportData::strong_back(50.0);
        assert_eq!(data.support_type, TemporarySupportType::StrongBack);
        assert!(data.has_closure());
    }

    #[test]
    fn test_default_is_continuous_tower() {
        let data = TemporarySupportData::new(10.0);
        assert_eq!(data.support_type, TemporarySupportType::ErectionTower);
        assert!(!data.has_closure());
    }
}
