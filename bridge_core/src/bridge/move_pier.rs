//! Station edits: moving a pier and changing a span length.
//!
//! Both edits only change stations. New stations are computed and checked
//! first; the model is untouched when a pier would pass its neighbour or a
//! temporary support would leave its span.

use tracing::debug;

use super::types::MovePierOption;
use super::BridgeDescription;
use crate::errors::{BridgeError, BridgeResult};
use crate::units::same_station;

impl BridgeDescription {
    /// Check proposed stations against the current span assignments.
    fn check_stations(&self, op: &str, piers: &[f64], temp_supports: &[f64]) -> BridgeResult<()> {
        for (i, w) in piers.windows(2).enumerate() {
            if w[0] >= w[1] {
                return Err(self.reject(
                    op,
                    format!("pier {} at {} would not be ahead of pier {} at {}", i + 1, w[1], i, w[0]),
                ));
            }
        }
        for (ts, &station) in self.temp_supports.iter().zip(temp_supports) {
            let (back, ahead) = (piers[ts.span], piers[ts.span + 1]);
            if !(back < station && station < ahead) {
                return Err(self.reject(
                    op,
                    format!("temporary support {} at {} would leave span {}", ts.id, station, ts.span),
                ));
            }
        }
        Ok(())
    }

    fn apply_stations(&mut self, piers: Vec<f64>, temp_supports: Vec<f64>) {
        for (p, st) in self.piers.iter_mut().zip(piers) {
            p.data.station_ft = st;
        }
        for (t, st) in self.temp_supports.iter_mut().zip(temp_supports) {
            t.data.station_ft = st;
        }
    }

    /// Move pier `pier` to `station_ft`.
    ///
    /// Returns `Ok(false)` when the pier is already there.
    pub fn move_pier(&mut self, pier: usize, station_ft: f64, option: MovePierOption) -> BridgeResult<bool> {
        const OP: &str = "move pier";
        if pier >= self.piers.len() {
            return Err(BridgeError::not_found("Pier", pier));
        }
        if !station_ft.is_finite() {
            return Err(BridgeError::invalid_input("station", station_ft.to_string(), "Station must be finite"));
        }
        let old = self.piers[pier].station();
        if same_station(old, station_ft) {
            return Ok(false);
        }
        let delta = station_ft - old;

        let mut piers: Vec<f64> = self.piers.iter().map(|p| p.station()).collect();
        let mut supports: Vec<f64> = self.temp_supports.iter().map(|t| t.station()).collect();
        let moved_piers = match option {
            MovePierOption::MoveBridge => 0..piers.len(),
            MovePierOption::AdjustPrevSpan => pier..piers.len(),
            MovePierOption::AdjustNextSpan => 0..pier + 1,
            MovePierOption::AdjustAdjacentSpans => pier..pier + 1,
        };
        let moves_support = |st: f64| match option {
            MovePierOption::MoveBridge => true,
            MovePierOption::AdjustPrevSpan => st > old,
            MovePierOption::AdjustNextSpan => st < old,
            MovePierOption::AdjustAdjacentSpans => false,
        };
        for st in &mut piers[moved_piers] {
            *st += delta;
        }
        for st in supports.iter_mut().filter(|st| moves_support(**st)) {
            *st += delta;
        }
        self.check_stations(OP, &piers, &supports)?;

        self.apply_stations(piers, supports);
        self.finish_edit();
        debug!(pier, from = old, to = station_ft, option = %option, "pier moved");
        Ok(true)
    }

    /// Set the length of span `span`. Piers ahead of the span move with its
    /// far end. Temporary supports in a shortened span are scaled into it.
    pub fn set_span_length(&mut self, span: usize, length_ft: f64) -> BridgeResult<()> {
        if span >= self.spans.len() {
            return Err(BridgeError::not_found("Span", span));
        }
        if !(length_ft.is_finite() && length_ft > 0.0) {
            return Err(BridgeError::invalid_input(
                "span length",
                length_ft.to_string(),
                "Span length must be positive",
            ));
        }
        let start = self.piers[span].station();
        let end = self.piers[span + 1].station();
        let old_length = end - start;
        let delta = length_ft - old_length;
        if same_station(delta, 0.0) {
            return Ok(());
        }

        let scale = length_ft / old_length;
        for ts in &mut self.temp_supports {
            let st = ts.data.station_ft;
            if st > end {
                ts.data.station_ft += delta;
            } else if ts.span == span && delta < 0.0 {
                ts.data.station_ft = start + (st - start) * scale;
            }
        }
        self.shift_piers(span + 1.., delta);
        self.finish_edit();
        debug!(span, from = old_length, to = length_ft, "span length changed");
        Ok(())
    }
}
