//! Spans. A span's length is never stored; it is the difference between the
//! stations of its two piers.

use serde::{Deserialize, Serialize};

/// Span attributes that are not inherited from the bridge level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpanData {
    /// Assumed excess camber per girder (in)
    pub camber_in: Vec<f64>,
}

impl SpanData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize the per-girder values, repeating the last one (or `default_in`)
    pub(crate) fn set_girder_count(&mut self, girder_count: usize, default_in: f64) {
        let fill = self.camber_in.last().copied().unwrap_or(default_in);
        self.camber_in.resize(girder_count, fill);
    }
}

/// A span between two consecutive piers.
#[derive(Debug, Clone)]
pub struct Span {
    pub(crate) index: usize,
    pub(crate) prev_pier: usize,
    pub(crate) next_pier: usize,
    pub(crate) data: SpanData,
}

impl Span {
    pub(crate) fn new(data: SpanData) -> Self {
        Span {
            index: 0,
            prev_pier: 0,
            next_pier: 0,
            data,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn prev_pier(&self) -> usize {
        self.prev_pier
    }

    pub fn next_pier(&self) -> usize {
        self.next_pier
    }

    pub fn data(&self) -> &SpanData {
        &self.data
    }

    pub fn camber_in(&self, girder: usize) -> Option<f64> {
        self.data.camber_in.get(girder).copied()
    }

    pub(crate) fn same_as(&self, other: &Span) -> bool {
        self.index == other.index
            && self.prev_pier == other.prev_pier
            && self.next_pier == other.next_pier
            && self.data == other.data
    }
}
