//! # Inserting Spans and Girder Groups
//!
//! A new span is always added beside a reference pier. The new pier takes
//! the reference pier's station and everything ahead of the insertion point
//! moves up by the new span length, so the spans already on the bridge keep
//! their lengths. Inserting back of the first pier is the exception: the new
//! pier is placed behind the bridge and nothing moves.
//!
//! ```text
//!  insert 40 ft ahead of P1:
//!
//!  P0 ---100--- P1 ---100--- P2          P0 ---100--- P1 --40-- Pn ---100--- P2'
//!  0            100          200   =>    0            100       140          240
//! ```

use tracing::debug;

use super::deck;
use super::group::GirderGroup;
use super::pier::{Pier, PierData};
use super::span::{Span, SpanData};
use super::types::{MemberEnd, PierFace, SegmentConnection};
use super::{BridgeDescription, DEFAULT_SPAN_LENGTH_FT};
use crate::errors::{BridgeError, BridgeResult};
use crate::ids::PierId;
use crate::timeline::{check_event, EventIndex, Timeline};
use crate::units::same_station;

// =============================================================================
// REQUESTS
// =============================================================================

/// Add one span beside an existing pier.
///
/// ## Example
///
/// ```rust
/// use bridge_core::bridge::{BridgeDescription, InsertSpan, PierFace};
/// use bridge_core::timeline::NullTimeline;
///
/// let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
/// let span = bridge
///     .insert_span(&mut NullTimeline, InsertSpan::new(0, PierFace::Back, 30.0).with_new_group())
///     .unwrap();
/// assert_eq!(span, 0);
/// assert_eq!(bridge.piers()[0].station(), -30.0);
/// assert_eq!(bridge.group_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InsertSpan {
    pub ref_pier: usize,
    pub face: PierFace,
    /// New span length (ft). Zero or negative derives the length from the
    /// station of `pier`, or uses [`DEFAULT_SPAN_LENGTH_FT`] without one.
    pub length_ft: f64,
    /// Span template; defaults to a copy of the adjacent span
    pub span: Option<SpanData>,
    /// Pier template; defaults to a copy of the reference pier
    pub pier: Option<PierData>,
    /// Put the new span in a new girder group
    pub create_group: bool,
    pub erection_event: Option<EventIndex>,
}

impl InsertSpan {
    pub fn new(ref_pier: usize, face: PierFace, length_ft: f64) -> Self {
        InsertSpan {
            ref_pier,
            face,
            length_ft,
            span: None,
            pier: None,
            create_group: false,
            erection_event: None,
        }
    }

    pub fn with_span(mut self, span: SpanData) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_pier(mut self, pier: PierData) -> Self {
        self.pier = Some(pier);
        self
    }

    pub fn with_new_group(mut self) -> Self {
        self.create_group = true;
        self
    }

    pub fn with_erection_event(mut self, event: EventIndex) -> Self {
        self.erection_event = Some(event);
        self
    }
}

/// Add a run of spans at one end of a group and wrap them in a new group.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateGirderGroup {
    pub ref_group: usize,
    /// End of the reference group the new group attaches to
    pub end: MemberEnd,
    /// Lengths of the new spans in station order (ft)
    pub span_lengths_ft: Vec<f64>,
    pub girder_count: usize,
    pub erection_event: Option<EventIndex>,
}

impl CreateGirderGroup {
    pub fn new(ref_group: usize, end: MemberEnd, span_lengths_ft: Vec<f64>, girder_count: usize) -> Self {
        CreateGirderGroup {
            ref_group,
            end,
            span_lengths_ft,
            girder_count,
            erection_event: None,
        }
    }

    pub fn with_erection_event(mut self, event: EventIndex) -> Self {
        self.erection_event = Some(event);
        self
    }
}

// =============================================================================
// INSERT SPAN
// =============================================================================

impl BridgeDescription {
    /// Insert a span beside `req.ref_pier`. Returns the index of the new span.
    pub fn insert_span(&mut self, timeline: &mut dyn Timeline, req: InsertSpan) -> BridgeResult<usize> {
        const OP: &str = "insert span";
        let Some(ref_pier) = self.piers.get(req.ref_pier) else {
            return Err(BridgeError::not_found("Pier", req.ref_pier));
        };
        let ref_station = ref_pier.station();
        let length_ft = self.insert_length(&req, ref_station)?;
        check_event(timeline, "erection_event", req.erection_event)?;

        let r = req.ref_pier;
        let last = self.piers.len() - 1;
        let ref_span = match (r, req.face) {
            (0, _) => 0,
            (r, _) if r == last => self.spans.len() - 1,
            (r, PierFace::Back) => r - 1,
            (r, PierFace::Ahead) => r,
        };
        let ref_group = self.group_of_span(ref_span)?;
        let (start, end) = self.group_range(ref_group)?;
        if req.create_group && r != start && r != end {
            return Err(self.reject(OP, format!("pier {} is not a girder group boundary", r)));
        }

        // ---- validated: mutate from here on ----

        let ref_id = self.piers[r].id;
        let mut pier_data = req.pier.clone().unwrap_or_else(|| self.piers[r].data.clone());
        let cloned_from_ref = req.pier.is_none();
        pier_data.segment_connection = SegmentConnection::ContinuousSegment;
        let span_data = req.span.clone().unwrap_or_else(|| self.spans[ref_span].data.clone());

        let at_start = r == 0 && req.face == PierFace::Back;
        pier_data.station_ft = if at_start { ref_station - length_ft } else { ref_station };

        let new_id = self.ids.next_pier_id();
        let new_index = match req.face {
            PierFace::Back => r,
            PierFace::Ahead => r + 1,
        };
        self.piers.insert(new_index, Pier::new(new_id, pier_data));
        self.spans.insert(r, Span::new(span_data));
        self.renumber_all();
        deck::rekey_for_insert(&mut self.neg_moment_rebar, new_index, 1);

        if !at_start {
            self.shift_piers(r + 1.., length_ft);
            self.shift_temp_supports(|st| st > ref_station, length_ft);
        }

        // Group boundaries
        let group = &mut self.groups[ref_group];
        if req.create_group {
            if group.start_pier == ref_id && req.face == PierFace::Ahead {
                group.start_pier = new_id;
            }
            if group.end_pier == ref_id && req.face == PierFace::Back {
                group.end_pier = new_id;
            }
        } else {
            if group.start_pier == ref_id && req.face == PierFace::Back {
                group.start_pier = new_id;
            }
            if group.end_pier == ref_id && req.face == PierFace::Ahead {
                group.end_pier = new_id;
            }
        }

        self.mirror_end_pier_faces(r, req.face, new_index, cloned_from_ref, last);

        if req.create_group {
            let (first, second) = match req.face {
                PierFace::Back => (new_id, ref_id),
                PierFace::Ahead => (ref_id, new_id),
            };
            let at = if r == start { ref_group } else { ref_group + 1 };
            let group = self.copy_group(ref_group, first, second, self.groups[ref_group].girder_count());
            self.groups.insert(at, group);
            self.renumber_groups();
            self.copy_segment_events(timeline, if at <= ref_group { ref_group + 1 } else { ref_group }, at);
            self.adopt_bridge_values_in_group(at);
        }

        if let Some(event) = req.erection_event {
            timeline.register_pier_erection(event, new_id);
        }
        let ref_index = if req.face == PierFace::Back { r + 1 } else { r };
        self.update_assignments();
        self.adopt_bridge_values_at_pier(new_index);
        self.adopt_bridge_values_at_pier(ref_index);
        self.adopt_bridge_values_at_span(r);
        self.finish_edit();
        debug!(ref_pier = r, face = %req.face, length_ft, new_group = req.create_group, "span inserted");
        Ok(r)
    }

    /// Add a span at the end of the bridge.
    pub fn append_span(&mut self, timeline: &mut dyn Timeline, length_ft: f64) -> BridgeResult<usize> {
        let last = self.piers.len() - 1;
        self.insert_span(timeline, InsertSpan::new(last, PierFace::Ahead, length_ft))
    }

    fn insert_length(&self, req: &InsertSpan, ref_station: f64) -> BridgeResult<f64> {
        if !req.length_ft.is_finite() {
            return Err(BridgeError::invalid_input(
                "length_ft",
                req.length_ft.to_string(),
                "Span length must be finite",
            ));
        }
        if req.length_ft > 0.0 {
            return Ok(req.length_ft);
        }
        let Some(pier) = &req.pier else {
            return Ok(DEFAULT_SPAN_LENGTH_FT);
        };
        let derived = (pier.station_ft - ref_station).abs();
        if !derived.is_finite() || same_station(derived, 0.0) {
            return Err(BridgeError::invalid_input(
                "pier.station_ft",
                pier.station_ft.to_string(),
                "Cannot derive a span length from a pier at the reference station",
            ));
        }
        Ok(derived)
    }

    /// An end pier only carries data on the face toward the bridge. When a
    /// span is added beside it, fill the face that just became meaningful.
    fn mirror_end_pier_faces(&mut self, r: usize, face: PierFace, new_index: usize, cloned: bool, last: usize) {
        let ref_index = if face == PierFace::Back { r + 1 } else { r };
        let defined = if r == 0 && r != last {
            PierFace::Ahead
        } else if r == last {
            PierFace::Back
        } else {
            return;
        };
        if face != defined {
            self.piers[ref_index].data.mirror_face(defined);
        } else if cloned {
            self.piers[new_index].data.mirror_face(defined);
        }
        self.piers[ref_index].data.clamp_end_distances();
        self.piers[new_index].data.clamp_end_distances();
    }

    /// A group between two piers with `count` fresh girders and the
    /// naming, top width and slab offsets of group `template`.
    fn copy_group(&mut self, template: usize, start: PierId, end: PierId, count: usize) -> GirderGroup {
        let source = self.groups[template].clone();
        let name = source
            .type_groups
            .first()
            .map_or_else(|| self.settings.girder_name.clone(), |r| r.value.clone());
        let top_width = source
            .top_width_groups
            .first()
            .map_or(self.settings.top_width, |r| r.value);
        let mut group = self.build_group(start, end, count, &name, top_width, &source.slab_offsets_in);
        if count == source.girder_count() {
            group.type_groups = source.type_groups;
            group.top_width_groups = source.top_width_groups;
        }
        let name = self.settings.girder_name.clone();
        group.fit_to_girders(&name, self.settings.top_width, self.settings.slab_offset_in);
        group
    }

    // =========================================================================
    // CREATE GIRDER GROUP
    // =========================================================================

    /// Add `req.span_lengths_ft.len()` spans at one end of a group and put
    /// them in a new group. Returns the index of the new group.
    pub fn create_girder_group(&mut self, timeline: &mut dyn Timeline, req: CreateGirderGroup) -> BridgeResult<usize> {
        const OP: &str = "create girder group";
        let (s, e) = self.group_range(req.ref_group)?;
        if req.span_lengths_ft.is_empty() {
            return Err(BridgeError::invalid_input("span_lengths_ft", "[]", "At least one span is required"));
        }
        if let Some(bad) = req.span_lengths_ft.iter().find(|l| !l.is_finite() || **l <= 0.0) {
            return Err(BridgeError::invalid_input(
                "span_lengths_ft",
                bad.to_string(),
                "Span lengths must be positive",
            ));
        }
        if req.girder_count == 0 {
            return Err(BridgeError::invalid_input("girder_count", "0", "At least one girder is required"));
        }
        if self.settings.same_number_of_girders && req.girder_count != self.settings.girder_count {
            return Err(self.reject(
                OP,
                format!("the bridge uses {} girders in every group", self.settings.girder_count),
            ));
        }
        check_event(timeline, "erection_event", req.erection_event)?;

        // ---- validated: mutate from here on ----

        let g = req.ref_group;
        let k = req.span_lengths_ft.len();
        let total: f64 = req.span_lengths_ft.iter().sum();
        let last = self.piers.len() - 1;

        let (boundary, template_span, defined) = match req.end {
            MemberEnd::End => (e, e - 1, PierFace::Back),
            MemberEnd::Start => (s, s, PierFace::Ahead),
        };
        if (req.end == MemberEnd::End && e == last) || (req.end == MemberEnd::Start && s == 0) {
            self.piers[boundary].data.mirror_face(defined);
        }
        let mut template = self.piers[boundary].data.clone();
        template.segment_connection = SegmentConnection::ContinuousSegment;
        let span_template = self.spans[template_span].data.clone();
        let boundary_station = self.piers[boundary].station();

        let stations: Vec<f64> = match req.end {
            MemberEnd::End => req
                .span_lengths_ft
                .iter()
                .scan(boundary_station, |st, l| {
                    *st += l;
                    Some(*st)
                })
                .collect(),
            MemberEnd::Start if s == 0 => (0..k)
                .map(|i| boundary_station - req.span_lengths_ft[i..].iter().sum::<f64>())
                .collect(),
            MemberEnd::Start => (0..k)
                .map(|i| boundary_station + req.span_lengths_ft[..i].iter().sum::<f64>())
                .collect(),
        };
        let (first_new, first_span) = match req.end {
            MemberEnd::End => (e + 1, e),
            MemberEnd::Start => (s, s),
        };

        let mut new_ids = Vec::with_capacity(k);
        for (i, station) in stations.into_iter().enumerate() {
            let id = self.ids.next_pier_id();
            let data = PierData {
                station_ft: station,
                ..template.clone()
            };
            self.piers.insert(first_new + i, Pier::new(id, data));
            self.spans.insert(first_span + i, Span::new(span_template.clone()));
            new_ids.push(id);
        }
        self.renumber_all();
        deck::rekey_for_insert(&mut self.neg_moment_rebar, first_new, k);

        let boundary_id = self.piers[if req.end == MemberEnd::End { e } else { s + k }].id;
        let (first_id, last_id) = (new_ids[0], new_ids[k - 1]);
        let (group_start, group_end, at) = match req.end {
            MemberEnd::End => {
                if e != last {
                    self.shift_piers(e + k + 1.., total);
                    self.shift_temp_supports(|st| st > boundary_station, total);
                    self.groups[g + 1].start_pier = last_id;
                }
                (boundary_id, last_id, g + 1)
            }
            MemberEnd::Start => {
                if s != 0 {
                    self.shift_piers(s + k.., total);
                    self.shift_temp_supports(|st| st > boundary_station, total);
                    self.groups[g - 1].end_pier = first_id;
                }
                (first_id, boundary_id, g)
            }
        };

        let group = self.copy_group(g, group_start, group_end, req.girder_count);
        self.groups.insert(at, group);
        self.renumber_groups();
        let template_group = if at <= g { g + 1 } else { g };
        self.copy_segment_events(timeline, template_group, at);
        self.adopt_bridge_values_in_group(at);

        if let Some(event) = req.erection_event {
            for &id in &new_ids {
                timeline.register_pier_erection(event, id);
            }
        }
        self.update_assignments();
        for p in first_new.saturating_sub(1)..(first_new + k + 1).min(self.piers.len()) {
            self.adopt_bridge_values_at_pier(p);
        }
        for span in first_span..first_span + k {
            self.adopt_bridge_values_at_span(span);
        }
        self.finish_edit();
        debug!(ref_group = g, end = %req.end, spans = k, total, "girder group created");
        Ok(at)
    }
}
