//! Structural validation.
//!
//! [`BridgeDescription::violations`] checks every structural invariant and
//! reports each broken one as a sentence. Edits run it after every change in
//! debug builds; loading runs it unconditionally.

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use super::girder::SupportRef;
use super::types::{PierFace, SegmentConnection};
use super::BridgeDescription;
use crate::errors::{BridgeError, BridgeResult};
use crate::ids::EntityKind;

/// Report duplicates and IDs the allocator has not issued yet.
fn check_unique<T>(out: &mut Vec<String>, kind: EntityKind, ids: impl Iterator<Item = T>, peek: u64, value: impl Fn(T) -> u64)
where
    T: Copy + Eq + Hash + Display,
{
    let mut seen = HashSet::new();
    for id in ids {
        if value(id) >= peek {
            out.push(format!("{} {} was never issued (next is {})", kind, id, peek));
        }
        if !seen.insert(id) {
            out.push(format!("{} {} is used twice", kind, id));
        }
    }
}

impl BridgeDescription {
    /// Every broken structural invariant, or an empty list.
    pub fn violations(&self) -> Vec<String> {
        let mut out = self.structural_violations();
        if !out.is_empty() {
            return out;
        }
        self.check_temp_supports(&mut out);
        self.check_girders(&mut out);
        self.check_attribute_counts(&mut out);
        for r in &self.neg_moment_rebar {
            if r.pier_index == 0 || r.pier_index + 1 >= self.piers.len() {
                out.push(format!("negative moment rebar at pier {} is not at an interior pier", r.pier_index));
            }
        }
        out
    }

    /// Chain wiring, ID uniqueness and group coverage. Everything else in
    /// the model is resolved through these, and none of them can be repaired.
    pub(crate) fn structural_violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.check_chain(&mut out);
        self.check_ids(&mut out);
        // group checks resolve indices through the chain
        if out.is_empty() {
            self.check_groups(&mut out);
        }
        out
    }

    /// Ok when the model satisfies every structural invariant.
    pub fn validate(&self) -> BridgeResult<()> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(BridgeError::InvariantViolation { violations })
        }
    }

    fn check_chain(&self, out: &mut Vec<String>) {
        if self.piers.len() < 2 {
            out.push(format!("bridge has {} piers, at least 2 are required", self.piers.len()));
        }
        if self.piers.len() != self.spans.len() + 1 {
            out.push(format!("{} piers for {} spans", self.piers.len(), self.spans.len()));
            return;
        }
        let span_count = self.spans.len();
        for (i, p) in self.piers.iter().enumerate() {
            let prev = i.checked_sub(1);
            let next = (i < span_count).then_some(i);
            if p.index != i || p.prev_span != prev || p.next_span != next {
                out.push(format!("pier {} ({}) is wired incorrectly", i, p.id));
            }
            if !p.station().is_finite() {
                out.push(format!("pier {} station is not finite", i));
            }
        }
        for (i, s) in self.spans.iter().enumerate() {
            if s.index != i || s.prev_pier != i || s.next_pier != i + 1 {
                out.push(format!("span {} is wired incorrectly", i));
            }
        }
        for w in self.piers.windows(2) {
            if w[0].station() >= w[1].station() {
                out.push(format!(
                    "pier {} at {} is not ahead of pier {} at {}",
                    w[1].index,
                    w[1].station(),
                    w[0].index,
                    w[0].station()
                ));
            }
        }
    }

    fn check_ids(&self, out: &mut Vec<String>) {
        let ids = &self.ids;
        let groups = &self.groups;
        let girders = move || groups.iter().flat_map(|g| g.girders.iter());
        check_unique(out, EntityKind::Pier, self.piers.iter().map(|p| p.id), ids.peek(EntityKind::Pier), |id| {
            id.value()
        });
        check_unique(
            out,
            EntityKind::TemporarySupport,
            self.temp_supports.iter().map(|t| t.id),
            ids.peek(EntityKind::TemporarySupport),
            |id| id.value(),
        );
        check_unique(out, EntityKind::GirderGroup, groups.iter().map(|g| g.id), ids.peek(EntityKind::GirderGroup), |id| {
            id.value()
        });
        check_unique(out, EntityKind::Girder, girders().map(|g| g.id), ids.peek(EntityKind::Girder), |id| id.value());
        check_unique(
            out,
            EntityKind::Segment,
            girders().flat_map(|g| g.segments.iter()).map(|s| s.id),
            ids.peek(EntityKind::Segment),
            |id| id.value(),
        );
        check_unique(
            out,
            EntityKind::ClosureJoint,
            girders().flat_map(|g| g.closures.iter()).map(|c| c.id),
            ids.peek(EntityKind::ClosureJoint),
            |id| id.value(),
        );
    }

    fn check_groups(&self, out: &mut Vec<String>) {
        if self.groups.is_empty() {
            out.push("bridge has no girder groups".to_string());
            return;
        }
        let last_pier = self.piers.len() - 1;
        let mut expected_start = 0;
        for (g, group) in self.groups.iter().enumerate() {
            if group.index != g {
                out.push(format!("group {} has index {}", g, group.index));
            }
            let Ok((start, end)) = self.group_range(g) else {
                out.push(format!("group {} references a missing pier", group.id));
                return;
            };
            if start != expected_start {
                out.push(format!("group {} starts at pier {}, expected pier {}", g, start, expected_start));
            }
            if start >= end {
                out.push(format!("group {} runs from pier {} to pier {}", g, start, end));
            }
            if group.girders.is_empty() {
                out.push(format!("group {} has no girders", g));
            }
            if !group.partitions_valid() {
                out.push(format!("group {} girder partitions do not cover its girders", g));
            }
            for p in [start, end] {
                if self.piers[p].segment_connection() != SegmentConnection::ContinuousSegment {
                    out.push(format!("boundary pier {} carries a segment connection", p));
                }
            }
            expected_start = end;
        }
        if expected_start != last_pier {
            out.push(format!("last group ends at pier {}, expected pier {}", expected_start, last_pier));
        }
    }

    fn check_temp_supports(&self, out: &mut Vec<String>) {
        for (i, ts) in self.temp_supports.iter().enumerate() {
            if ts.index != i {
                out.push(format!("temporary support {} has index {}", ts.id, ts.index));
            }
            if let Some(prev) = i.checked_sub(1).map(|p| &self.temp_supports[p]) {
                if prev.station() > ts.station() {
                    out.push(format!("temporary supports {} and {} are out of order", prev.id, ts.id));
                }
            }
            let Some(span) = self.spans.get(ts.span) else {
                out.push(format!("temporary support {} is assigned to missing span {}", ts.id, ts.span));
                continue;
            };
            let back = self.piers[span.prev_pier].station();
            let ahead = self.piers[span.next_pier].station();
            if !(back < ts.station() && ts.station() < ahead) {
                out.push(format!(
                    "temporary support {} at {} is outside span {} ({}..{})",
                    ts.id,
                    ts.station(),
                    ts.span,
                    back,
                    ahead
                ));
            }
        }
    }

    fn check_girders(&self, out: &mut Vec<String>) {
        for (g, group) in self.groups.iter().enumerate() {
            let Ok((start, end)) = self.group_range(g) else {
                continue;
            };
            let (lo, hi) = (self.piers[start].station(), self.piers[end].station());

            // Supports that must carry a closure joint, in station order
            let mut expected: Vec<(f64, SupportRef)> = Vec::new();
            for p in &self.piers[start + 1..end] {
                if p.segment_connection().has_closure() {
                    expected.push((p.station(), SupportRef::Pier(p.id)));
                }
            }
            for ts in self.temp_supports.iter().filter(|t| t.has_closure() && start <= t.span && t.span < end) {
                expected.push((ts.station(), SupportRef::TemporarySupport(ts.id)));
            }
            expected.sort_by(|a, b| a.0.total_cmp(&b.0));
            let expected: Vec<SupportRef> = expected.into_iter().map(|(_, s)| s).collect();

            for (i, girder) in group.girders.iter().enumerate() {
                if girder.index != i {
                    out.push(format!("girder {} of group {} has index {}", i, g, girder.index));
                }
                if girder.segments.is_empty() || girder.closures.len() + 1 != girder.segments.len() {
                    out.push(format!(
                        "girder {} of group {} has {} segments and {} closures",
                        i,
                        g,
                        girder.segments.len(),
                        girder.closures.len()
                    ));
                }
                let supports: Vec<SupportRef> = girder.closures.iter().map(|c| c.support).collect();
                if supports != expected {
                    out.push(format!(
                        "girder {} of group {} has closures at {:?}, expected {:?}",
                        i, g, supports, expected
                    ));
                }
                for c in &girder.closures {
                    match self.station_of_support(c.support) {
                        Some(st) if lo < st && st < hi => {}
                        _ => out.push(format!("closure {} at {} is not inside group {}", c.id, c.support, g)),
                    }
                }
            }
        }
    }

    fn check_attribute_counts(&self, out: &mut Vec<String>) {
        for (g, group) in self.groups.iter().enumerate() {
            let Ok((start, end)) = self.group_range(g) else {
                continue;
            };
            let count = group.girder_count();
            for p in start..=end {
                let faces: &[PierFace] = if p == start {
                    &[PierFace::Ahead]
                } else if p == end {
                    &[PierFace::Back]
                } else {
                    &PierFace::ALL
                };
                for &face in faces {
                    let n = self.piers[p].face(face).spacing.girder_count();
                    if n != count {
                        out.push(format!("pier {} {} face spacing serves {} girders, group has {}", p, face, n, count));
                    }
                }
            }
            for s in start..end {
                let n = self.spans[s].data.camber_in.len();
                if n != count {
                    out.push(format!("span {} has {} camber values, group has {} girders", s, n, count));
                }
            }
            for ts in self.temp_supports.iter().filter(|t| start <= t.span && t.span < end) {
                let n = ts.data.spacing.girder_count();
                if n != count {
                    out.push(format!("temporary support {} spacing serves {} girders, group has {}", ts.id, n, count));
                }
            }
        }
    }
}
