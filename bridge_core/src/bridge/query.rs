//! Read-only views over the bridge.

use std::ops::Range;

use super::girder::{ClosureJoint, Girder, Segment};
use super::group::GirderGroup;
use super::pier::Pier;
use super::span::Span;
use super::temporary_support::TemporarySupport;
use super::types::{BoundaryCondition, SegmentConnection};
use super::BridgeDescription;
use crate::ids::{ClosureId, GirderId, GroupId, PierId, SegmentId, TempSupportId};

impl BridgeDescription {
    // -------------------------------------------------------------------------
    // Containers
    // -------------------------------------------------------------------------

    pub fn piers(&self) -> &[Pier] {
        &self.piers
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn girder_groups(&self) -> &[GirderGroup] {
        &self.groups
    }

    /// Temporary supports in station order
    pub fn temporary_supports(&self) -> &[TemporarySupport] {
        &self.temp_supports
    }

    pub fn pier_count(&self) -> usize {
        self.piers.len()
    }

    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn temporary_support_count(&self) -> usize {
        self.temp_supports.len()
    }

    pub fn pier(&self, index: usize) -> Option<&Pier> {
        self.piers.get(index)
    }

    pub fn span(&self, index: usize) -> Option<&Span> {
        self.spans.get(index)
    }

    pub fn girder_group(&self, index: usize) -> Option<&GirderGroup> {
        self.groups.get(index)
    }

    pub fn temporary_support(&self, index: usize) -> Option<&TemporarySupport> {
        self.temp_supports.get(index)
    }

    // -------------------------------------------------------------------------
    // Lookup by ID
    // -------------------------------------------------------------------------

    pub fn find_pier(&self, id: PierId) -> Option<&Pier> {
        self.piers.iter().find(|p| p.id == id)
    }

    pub fn find_girder_group(&self, id: GroupId) -> Option<&GirderGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn find_temporary_support(&self, id: TempSupportId) -> Option<&TemporarySupport> {
        self.temp_supports.iter().find(|t| t.id == id)
    }

    pub fn find_girder(&self, id: GirderId) -> Option<&Girder> {
        self.all_girders().find(|g| g.id == id)
    }

    pub fn find_segment(&self, id: SegmentId) -> Option<&Segment> {
        self.all_girders().flat_map(|g| &g.segments).find(|s| s.id == id)
    }

    pub fn find_closure_joint(&self, id: ClosureId) -> Option<&ClosureJoint> {
        self.all_girders().flat_map(|g| &g.closures).find(|c| c.id == id)
    }

    fn all_girders(&self) -> impl Iterator<Item = &Girder> {
        self.groups.iter().flat_map(|g| &g.girders)
    }

    // -------------------------------------------------------------------------
    // Stations
    // -------------------------------------------------------------------------

    /// Length of span `index` (ft)
    pub fn span_length(&self, index: usize) -> Option<f64> {
        (index < self.spans.len()).then(|| self.span_length_unchecked(index))
    }

    /// Overall bridge length, first pier to last pier (ft)
    pub fn length(&self) -> f64 {
        let (start, end) = self.station_range();
        end - start
    }

    /// Stations of the first and last pier
    pub fn station_range(&self) -> (f64, f64) {
        let first = self.piers.first().map_or(0.0, |p| p.station());
        let last = self.piers.last().map_or(0.0, |p| p.station());
        (first, last)
    }

    pub fn is_on_bridge(&self, station_ft: f64) -> bool {
        let (start, end) = self.station_range();
        start <= station_ft && station_ft <= end
    }

    /// Pier within `tolerance_ft` of `station_ft`
    pub fn pier_at_station(&self, station_ft: f64, tolerance_ft: f64) -> Option<&Pier> {
        self.piers
            .iter()
            .find(|p| (p.station() - station_ft).abs() <= tolerance_ft)
    }

    pub fn temporary_support_at_station(&self, station_ft: f64, tolerance_ft: f64) -> Option<&TemporarySupport> {
        self.temp_supports
            .iter()
            .find(|t| (t.station() - station_ft).abs() <= tolerance_ft)
    }

    /// Span containing `station_ft`; a station at an interior pier belongs to
    /// the span ahead of it.
    pub fn span_at_station(&self, station_ft: f64) -> Option<usize> {
        if !self.is_on_bridge(station_ft) {
            return None;
        }
        let ahead = self.piers.iter().filter(|p| p.station() <= station_ft).count();
        Some(ahead.saturating_sub(1).min(self.spans.len() - 1))
    }

    // -------------------------------------------------------------------------
    // Groups
    // -------------------------------------------------------------------------

    /// Group holding span `span`
    pub fn girder_group_for_span(&self, span: usize) -> Option<&GirderGroup> {
        if span >= self.spans.len() {
            return None;
        }
        self.group_of_span(span).ok().map(|g| &self.groups[g])
    }

    /// Indices of the first and last pier of group `group`
    pub fn group_pier_range(&self, group: usize) -> Option<(usize, usize)> {
        self.group_range(group).ok()
    }

    /// Spans covered by group `group`
    pub fn group_span_range(&self, group: usize) -> Option<Range<usize>> {
        self.group_range(group).ok().map(|(s, e)| s..e)
    }

    pub fn group_length(&self, group: usize) -> Option<f64> {
        let (s, e) = self.group_range(group).ok()?;
        Some(self.piers[e].station() - self.piers[s].station())
    }

    pub fn prev_girder_group(&self, group: usize) -> Option<&GirderGroup> {
        group.checked_sub(1).and_then(|g| self.groups.get(g))
    }

    pub fn next_girder_group(&self, group: usize) -> Option<&GirderGroup> {
        self.groups.get(group + 1)
    }

    /// True when pier `index` starts or ends a group
    pub fn is_boundary_pier(&self, index: usize) -> bool {
        (0..self.groups.len()).any(|g| matches!(self.group_range(g), Ok((s, e)) if s == index || e == index))
    }

    /// True when pier `index` is interior to a group
    pub fn is_interior_pier(&self, index: usize) -> bool {
        index < self.piers.len() && !self.is_boundary_pier(index)
    }

    /// Connection choices that make sense at pier `index`
    pub fn boundary_conditions_at(&self, index: usize) -> &'static [BoundaryCondition] {
        match self.piers.get(index) {
            Some(p) if p.is_abutment() => &BoundaryCondition::ABUTMENT,
            Some(_) => &BoundaryCondition::ALL,
            None => &[],
        }
    }

    pub fn segment_connections_at(&self, index: usize) -> &'static [SegmentConnection] {
        if self.is_interior_pier(index) {
            &SegmentConnection::ALL
        } else {
            &[]
        }
    }

    /// Smallest girder count over all groups
    pub fn min_girder_count(&self) -> usize {
        self.groups.iter().map(|g| g.girder_count()).min().unwrap_or(0)
    }

    // -------------------------------------------------------------------------
    // Temporary supports and closures
    // -------------------------------------------------------------------------

    pub fn temporary_supports_in_span(&self, span: usize) -> impl Iterator<Item = &TemporarySupport> {
        self.temp_supports.iter().filter(move |t| t.span == span)
    }

    /// Closure joints per girder over the whole bridge
    pub fn closure_joint_count(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.girders.first().map_or(0, |gdr| gdr.closures.len()))
            .sum()
    }

    /// Stations at the start and end of a segment of girder `girder` in
    /// group `group`
    pub fn segment_stations(&self, group: usize, girder: usize, segment: usize) -> Option<(f64, f64)> {
        let (s, e) = self.group_range(group).ok()?;
        let gdr = self.groups[group].girders.get(girder)?;
        if segment >= gdr.segments.len() {
            return None;
        }
        let start = match segment.checked_sub(1) {
            Some(k) => self.station_of_support(gdr.closures[k].support)?,
            None => self.piers[s].station(),
        };
        let end = match gdr.closures.get(segment) {
            Some(c) => self.station_of_support(c.support)?,
            None => self.piers[e].station(),
        };
        Some((start, end))
    }
}
