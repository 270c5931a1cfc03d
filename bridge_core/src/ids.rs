//! # Identifier Allocation
//!
//! Every entity the model creates gets a stable ID from an [`IdAllocator`].
//! Counters only ever move forward, so an ID retired by a removal is never
//! handed out again within a session. Loading persisted data feeds every
//! observed ID back through [`IdAllocator::update_next_id`] so loaded IDs are
//! never reissued either.
//!
//! ## Example
//!
//! ```rust
//! use bridge_core::ids::{EntityKind, IdAllocator};
//!
//! let mut ids = IdAllocator::new();
//! assert_eq!(ids.next_id(EntityKind::Pier, true), 0);
//! assert_eq!(ids.next_id(EntityKind::Pier, false), 1); // peek
//! ids.update_next_id(EntityKind::Pier, 41);
//! assert_eq!(ids.next_pier_id().value(), 42);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Typed IDs
// ============================================================================

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw numeric value
            pub fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

entity_id!(
    /// Stable identity of a pier
    PierId,
    "P"
);
entity_id!(
    /// Stable identity of a temporary support
    TempSupportId,
    "TS"
);
entity_id!(
    /// Stable identity of a girder group
    GroupId,
    "G"
);
entity_id!(
    /// Stable identity of a girder
    GirderId,
    "Gdr"
);
entity_id!(
    /// Stable identity of a precast segment
    SegmentId,
    "Seg"
);
entity_id!(
    /// Stable identity of a closure joint
    ClosureId,
    "CJ"
);

// ============================================================================
// Allocator
// ============================================================================

/// Kinds of entity that draw IDs from the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Pier,
    TemporarySupport,
    GirderGroup,
    Girder,
    Segment,
    ClosureJoint,
}

impl EntityKind {
    /// All entity kinds
    pub const ALL: &'static [EntityKind] = &[
        EntityKind::Pier,
        EntityKind::TemporarySupport,
        EntityKind::GirderGroup,
        EntityKind::Girder,
        EntityKind::Segment,
        EntityKind::ClosureJoint,
    ];

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::Pier => "Pier",
            EntityKind::TemporarySupport => "Temporary Support",
            EntityKind::GirderGroup => "Girder Group",
            EntityKind::Girder => "Girder",
            EntityKind::Segment => "Segment",
            EntityKind::ClosureJoint => "Closure Joint",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Per-kind monotonic ID counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next_pier: u64,
    next_temporary_support: u64,
    next_girder_group: u64,
    next_girder: u64,
    next_segment: u64,
    next_closure_joint: u64,
}

impl IdAllocator {
    /// Create an allocator with every counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&mut self, kind: EntityKind) -> &mut u64 {
        match kind {
            EntityKind::Pier => &mut self.next_pier,
            EntityKind::TemporarySupport => &mut self.next_temporary_support,
            EntityKind::GirderGroup => &mut self.next_girder_group,
            EntityKind::Girder => &mut self.next_girder,
            EntityKind::Segment => &mut self.next_segment,
            EntityKind::ClosureJoint => &mut self.next_closure_joint,
        }
    }

    /// The value the next call to [`next_id`](Self::next_id) will return.
    pub fn peek(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::Pier => self.next_pier,
            EntityKind::TemporarySupport => self.next_temporary_support,
            EntityKind::GirderGroup => self.next_girder_group,
            EntityKind::Girder => self.next_girder,
            EntityKind::Segment => self.next_segment,
            EntityKind::ClosureJoint => self.next_closure_joint,
        }
    }

    /// Return the current counter for `kind`, advancing it when `increment`
    /// is true.
    pub fn next_id(&mut self, kind: EntityKind, increment: bool) -> u64 {
        let counter = self.counter(kind);
        let id = *counter;
        if increment {
            *counter += 1;
        }
        id
    }

    /// Advance the counter for `kind` past an ID observed in loaded data.
    pub fn update_next_id(&mut self, kind: EntityKind, observed: u64) {
        let counter = self.counter(kind);
        *counter = (*counter).max(observed.saturating_add(1));
    }

    pub fn next_pier_id(&mut self) -> PierId {
        PierId(self.next_id(EntityKind::Pier, true))
    }

    pub fn next_temp_support_id(&mut self) -> TempSupportId {
        TempSupportId(self.next_id(EntityKind::TemporarySupport, true))
    }

    pub fn next_group_id(&mut self) -> GroupId {
        GroupId(self.next_id(EntityKind::GirderGroup, true))
    }

    pub fn next_girder_id(&mut self) -> GirderId {
        GirderId(self.next_id(EntityKind::Girder, true))
    }

    pub fn next_segment_id(&mut self) -> SegmentId {
        SegmentId(self.next_id(EntityKind::Segment, true))
    }

    pub fn next_closure_id(&mut self) -> ClosureId {
        ClosureId(self.next_id(EntityKind::ClosureJoint, true))
    }
}
