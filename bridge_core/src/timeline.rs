//! # Timeline References
//!
//! The construction timeline is an external collaborator. The bridge model
//! only tells it which piers, temporary supports, segments and closure joints
//! are erected, removed or cast in which event, and forgets nothing on its
//! behalf: whenever an entity is destroyed the matching `remove_*` call is
//! made so no event keeps a dangling ID.
//!
//! Edit operations receive the timeline as `&mut dyn Timeline`. The model
//! checks every event index against [`Timeline::event_count`] before it
//! mutates anything, so implementations may treat an out-of-range index as a
//! defect.
//!
//! [`TimelineRegistry`] is a plain in-memory implementation used by project
//! files, the CLI and tests. [`NullTimeline`] accepts every call and records
//! nothing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{BridgeError, BridgeResult};
use crate::ids::{ClosureId, PierId, SegmentId, TempSupportId};

/// Index of an event in the construction timeline
pub type EventIndex = usize;

/// Registration interface consumed by the bridge model.
pub trait Timeline {
    /// Number of events; valid indices are `0..event_count()`
    fn event_count(&self) -> usize;

    fn register_pier_erection(&mut self, event: EventIndex, pier: PierId);
    fn pier_erection_event(&self, pier: PierId) -> Option<EventIndex>;
    fn remove_pier(&mut self, pier: PierId);

    fn register_temp_support_events(&mut self, support: TempSupportId, erect: EventIndex, remove: EventIndex);
    fn temp_support_events(&self, support: TempSupportId) -> Option<(EventIndex, EventIndex)>;
    fn remove_temp_support(&mut self, support: TempSupportId);

    fn register_closure_casting(&mut self, event: EventIndex, closure: ClosureId);
    fn closure_casting_event(&self, closure: ClosureId) -> Option<EventIndex>;
    fn remove_closure(&mut self, closure: ClosureId);

    fn register_segment_erection(&mut self, event: EventIndex, segment: SegmentId);
    fn segment_erection_event(&self, segment: SegmentId) -> Option<EventIndex>;
    fn remove_segment(&mut self, segment: SegmentId);
}

/// Check an optional event index against the timeline.
pub(crate) fn check_event(timeline: &dyn Timeline, field: &str, event: Option<EventIndex>) -> BridgeResult<()> {
    match event {
        Some(index) if index >= timeline.event_count() => Err(BridgeError::invalid_input(
            field,
            index.to_string(),
            format!("Timeline has {} events", timeline.event_count()),
        )),
        _ => Ok(()),
    }
}

// ============================================================================
// In-memory registry
// ============================================================================

/// One construction event and everything that references it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub name: String,
    #[serde(default)]
    pub erect_piers: BTreeSet<PierId>,
    #[serde(default)]
    pub erect_temp_supports: BTreeSet<TempSupportId>,
    #[serde(default)]
    pub remove_temp_supports: BTreeSet<TempSupportId>,
    #[serde(default)]
    pub erect_segments: BTreeSet<SegmentId>,
    #[serde(default)]
    pub cast_closures: BTreeSet<ClosureId>,
}

impl TimelineEvent {
    pub fn new(name: impl Into<String>) -> Self {
        TimelineEvent {
            name: name.into(),
            ..Default::default()
        }
    }

    /// True when no entity references this event
    pub fn is_empty(&self) -> bool {
        self.erect_piers.is_empty()
            && self.erect_temp_supports.is_empty()
            && self.remove_temp_supports.is_empty()
            && self.erect_segments.is_empty()
            && self.cast_closures.is_empty()
    }
}

/// Ordered list of construction events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineRegistry {
    pub events: Vec<TimelineEvent>,
}

impl TimelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with one event per name, in order
    pub fn with_events<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TimelineRegistry {
            events: names.into_iter().map(TimelineEvent::new).collect(),
        }
    }

    /// Append an event, returning its index
    pub fn add_event(&mut self, name: impl Into<String>) -> EventIndex {
        self.events.push(TimelineEvent::new(name));
        self.events.len() - 1
    }

    pub fn event(&self, index: EventIndex) -> Option<&TimelineEvent> {
        self.events.get(index)
    }

    fn event_mut(&mut self, index: EventIndex, what: &str) -> Option<&mut TimelineEvent> {
        let count = self.events.len();
        let event = self.events.get_mut(index);
        if event.is_none() {
            warn!(index, count, what, "timeline event out of range");
        }
        event
    }

    fn find<T: Ord>(&self, id: &T, set: impl Fn(&TimelineEvent) -> &BTreeSet<T>) -> Option<EventIndex> {
        self.events.iter().position(|e| set(e).contains(id))
    }
}

impl Timeline for TimelineRegistry {
    fn event_count(&self) -> usize {
        self.events.len()
    }

    fn register_pier_erection(&mut self, event: EventIndex, pier: PierId) {
        self.remove_pier(pier);
        if let Some(e) = self.event_mut(event, "pier erection") {
            e.erect_piers.insert(pier);
        }
    }

    fn pier_erection_event(&self, pier: PierId) -> Option<EventIndex> {
        self.find(&pier, |e| &e.erect_piers)
    }

    fn remove_pier(&mut self, pier: PierId) {
        for e in &mut self.events {
            e.erect_piers.remove(&pier);
        }
    }

    fn register_temp_support_events(&mut self, support: TempSupportId, erect: EventIndex, remove: EventIndex) {
        self.remove_temp_support(support);
        if let Some(e) = self.event_mut(erect, "temporary support erection") {
            e.erect_temp_supports.insert(support);
        }
        if let Some(e) = self.event_mut(remove, "temporary support removal") {
            e.remove_temp_supports.insert(support);
        }
    }

    fn temp_support_events(&self, support: TempSupportId) -> Option<(EventIndex, EventIndex)> {
        let erect = self.find(&support, |e| &e.erect_temp_supports)?;
        let remove = self.find(&support, |e| &e.remove_temp_supports)?;
        Some((erect, remove))
    }

    fn remove_temp_support(&mut self, support: TempSupportId) {
        for e in &mut self.events {
            e.erect_temp_supports.remove(&support);
            e.remove_temp_supports.remove(&support);
        }
    }

    fn register_closure_casting(&mut self, event: EventIndex, closure: ClosureId) {
        self.remove_closure(closure);
        if let Some(e) = self.event_mut(event, "closure casting") {
            e.cast_closures.insert(closure);
        }
    }

    fn closure_casting_event(&self, closure: ClosureId) -> Option<EventIndex> {
        self.find(&closure, |e| &e.cast_closures)
    }

    fn remove_closure(&mut self, closure: ClosureId) {
        for e in &mut self.events {
            e.cast_closures.remove(&closure);
        }
    }

    fn register_segment_erection(&mut self, event: EventIndex, segment: SegmentId) {
        self.remove_segment(segment);
        if let Some(e) = self.event_mut(event, "segment erection") {
            e.erect_segments.insert(segment);
        }
    }

    fn segment_erection_event(&self, segment: SegmentId) -> Option<EventIndex> {
        self.find(&segment, |e| &e.erect_segments)
    }

    fn remove_segment(&mut self, segment: SegmentId) {
        for e in &mut self.events {
            e.erect_segments.remove(&segment);
        }
    }
}

/// A timeline that accepts every registration and remembers none.
///
/// Useful when editing a bridge whose construction sequence is not modeled.
/// It reports `usize::MAX` events so any event index is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTimeline;

impl Timeline for NullTimeline {
    fn event_count(&self) -> usize {
        usize::MAX
    }
    fn register_pier_erection(&mut self, _event: EventIndex, _pier: PierId) {}
    fn pier_erection_event(&self, _pier: PierId) -> Option<EventIndex> {
        None
    }
    fn remove_pier(&mut self, _pier: PierId) {}
    fn register_temp_support_events(&mut self, _support: TempSupportId, _erect: EventIndex, _remove: EventIndex) {}
    fn temp_support_events(&self, _support: TempSupportId) -> Option<(EventIndex, EventIndex)> {
        None
    }
    fn remove_temp_support(&mut self, _support: TempSupportId) {}
    fn register_closure_casting(&mut self, _event: EventIndex, _closure: ClosureId) {}
    fn closure_casting_event(&self, _closure: ClosureId) -> Option<EventIndex> {
        None
    }
    fn remove_closure(&mut self, _closure: ClosureId) {}
    fn register_segment_erection(&mut self, _event: EventIndex, _segment: SegmentId) {}
    fn segment_erection_event(&self, _segment: SegmentId) -> Option<EventIndex> {
        None
    }
    fn remove_segment(&mut self, _segment: SegmentId) {}
}
