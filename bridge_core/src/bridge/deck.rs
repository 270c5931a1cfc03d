//! Supplemental negative-moment deck reinforcement over interior piers.
//!
//! Records are keyed by pier index, so every edit that inserts or removes a
//! pier re-keys them.

use serde::{Deserialize, Serialize};

use super::types::RebarLayer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegMomentRebar {
    pub pier_index: usize,
    pub layer: RebarLayer,
    pub bar_size: String,
    pub spacing_in: f64,
    /// Cutoff distance back of the pier (ft)
    pub cutoff_back_ft: f64,
    /// Cutoff distance ahead of the pier (ft)
    pub cutoff_ahead_ft: f64,
}

impl NegMomentRebar {
    pub fn new(pier_index: usize, bar_size: impl Into<String>, spacing_in: f64) -> Self {
        NegMomentRebar {
            pier_index,
            layer: RebarLayer::Top,
            bar_size: bar_size.into(),
            spacing_in,
            cutoff_back_ft: 10.0,
            cutoff_ahead_ft: 10.0,
        }
    }
}

/// A pier was inserted at `index`.
pub(crate) fn rekey_for_insert(records: &mut [NegMomentRebar], index: usize, count: usize) {
    for r in records.iter_mut().filter(|r| r.pier_index >= index) {
        r.pier_index += count;
    }
}

/// Pier `index` is being removed from a bridge of `pier_count` piers.
///
/// Removing an end pier turns its neighbour into the new end pier, and end
/// piers carry no negative moment, so the neighbour's records go instead.
pub(crate) fn rekey_for_span_removal(records: &mut Vec<NegMomentRebar>, index: usize, pier_count: usize) {
    let key = if index == 0 {
        1
    } else if index + 1 == pier_count {
        index - 1
    } else {
        index
    };
    records.retain(|r| r.pier_index != key);
    for r in records.iter_mut().filter(|r| r.pier_index > key) {
        r.pier_index -= 1;
    }
}

/// Piers `removed` (ascending indices) are being deleted together.
pub(crate) fn rekey_for_group_removal(records: &mut Vec<NegMomentRebar>, removed: &[usize]) {
    records.retain(|r| !removed.contains(&r.pier_index));
    for r in records.iter_mut() {
        let below = removed.iter().filter(|&&i| i < r.pier_index).count();
        r.pier_index -= below;
    }
}
