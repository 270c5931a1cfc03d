//! Pier/span chain renumbering and station shifting.

use std::ops::RangeBounds;

use super::pier::Pier;
use super::span::Span;
use super::BridgeDescription;

/// Assign `0..n` indices and wire every pier to its adjacent spans and every
/// span to its two piers, in one pass.
///
/// Span `i` always connects pier `i` and pier `i + 1`; the first pier has no
/// previous span and the last pier no next span.
pub fn renumber_chain(piers: &mut [Pier], spans: &mut [Span]) {
    let span_count = spans.len();
    for (i, pier) in piers.iter_mut().enumerate() {
        pier.index = i;
        pier.prev_span = i.checked_sub(1).filter(|&s| s < span_count);
        pier.next_span = (i < span_count).then_some(i);
    }
    for (i, span) in spans.iter_mut().enumerate() {
        span.index = i;
        span.prev_pier = i;
        span.next_pier = i + 1;
    }
}

impl BridgeDescription {
    /// Re-index the pier/span chain. Every structural edit calls this before
    /// anything reads an index.
    pub fn renumber_all(&mut self) {
        renumber_chain(&mut self.piers, &mut self.spans);
    }

    pub(crate) fn shift_piers(&mut self, range: impl RangeBounds<usize>, delta_ft: f64) {
        let len = self.piers.len();
        let start = match range.start_bound() {
            std::ops::Bound::Included(&s) => s,
            std::ops::Bound::Excluded(&s) => s + 1,
            std::ops::Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            std::ops::Bound::Included(&e) => e + 1,
            std::ops::Bound::Excluded(&e) => e,
            std::ops::Bound::Unbounded => len,
        };
        for pier in self.piers.iter_mut().take(end.min(len)).skip(start) {
            pier.data.station_ft += delta_ft;
        }
    }

    /// Shift temporary supports whose station satisfies `select`.
    pub(crate) fn shift_temp_supports(&mut self, select: impl Fn(f64) -> bool, delta_ft: f64) {
        for ts in self.temp_supports.iter_mut().filter(|t| select(t.data.station_ft)) {
            ts.data.station_ft += delta_ft;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{PierData, SpanData};
    use crate::ids::PierId;

    fn chain(n: usize) -> (Vec<Pier>, Vec<Span>) {
        let piers = (0..n)
            .map(|i| Pier::new(PierId(i as u64), PierData::new(i as f64 * 100.0)))
            .collect();
        let spans = (0..n.saturating_sub(1)).map(|_| Span::new(SpanData::new())).collect();
        (piers, spans)
    }

    #[test]
    fn test_renumber_wires_adjacency() {
        let (mut piers, mut spans) = chain(4);
        renumber_chain(&mut piers, &mut spans);

        assert_eq!(piers[0].prev_span(), None);
        assert_eq!(piers[0].next_span(), Some(0));
        assert_eq!(piers[2].prev_span(), Some(1));
        assert_eq!(piers[2].next_span(), Some(2));
        assert_eq!(piers[3].next_span(), None);
        assert_eq!(spans[1].prev_pier(), 1);
        assert_eq!(spans[1].next_pier(), 2);
        assert!(piers.iter().enumerate().all(|(i, p)| p.index() == i));
    }

    #[test]
    fn test_renumber_after_insertion_in_middle() {
        let (mut piers, mut spans) = chain(3);
        renumber_chain(&mut piers, &mut spans);
        piers.insert(1, Pier::new(PierId(9), PierData::new(50.0)));
        spans.insert(1, Span::new(SpanData::new()));
        renumber_chain(&mut piers, &mut spans);

        assert_eq!(piers[1].id(), PierId(9));
        assert_eq!(piers[1].index(), 1);
        assert_eq!(piers[3].prev_span(), Some(2));
        assert_eq!(spans[2].next_pier(), 3);
        assert_eq!(piers[3].next_span(), None);
    }

    #[test]
    fn test_shift_piers_range() {
        let mut bridge = BridgeDescription::new(0.0, 100.0).unwrap();
        bridge.shift_piers(1.., 25.0);
        assert_eq!(bridge.piers()[0].station(), 0.0);
        assert_eq!(bridge.piers()[1].station(), 125.0);
    }
}
