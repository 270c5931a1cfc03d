//! # bridge_core - Bridge Topology Model
//!
//! `bridge_core` models the layout of a girder bridge: a station-ordered
//! chain of piers and spans, its partition into girder groups, temporary
//! supports used during erection, and the precast segments and closure
//! joints each girder is built from. Every edit keeps the model structurally
//! consistent or leaves it untouched and returns an error.
//!
//! ## Design Philosophy
//!
//! - **Validate, then mutate**: preconditions are checked before any
//!   container is touched
//! - **Stable identity**: entities keep their IDs through renumbering
//! - **Serializable**: plain data types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use bridge_core::bridge::{BridgeDescription, CreateGirderGroup, MemberEnd};
//! use bridge_core::timeline::TimelineRegistry;
//!
//! let mut timeline = TimelineRegistry::with_events(["Erect piers", "Erect girders"]);
//! let mut bridge = BridgeDescription::new(0.0, 120.0).unwrap();
//! bridge
//!     .create_girder_group(&mut timeline, CreateGirderGroup::new(0, MemberEnd::End, vec![140.0, 120.0], 5))
//!     .unwrap();
//!
//! assert_eq!(bridge.span_count(), 3);
//! assert_eq!(bridge.group_count(), 2);
//! assert!(bridge.validate().is_ok());
//! ```
//!
//! ## Modules
//!
//! - [`bridge`] - The topology model and its edit operations
//! - [`ids`] - Typed entity IDs and the ID allocator
//! - [`timeline`] - Construction event references
//! - [`persist`] - Structured save/load of the model
//! - [`project`] - Project container and metadata
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - [`file_io`] - File operations with atomic saves and locking

pub mod bridge;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod ids;
pub mod persist;
pub mod project;
pub mod timeline;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use bridge::{BridgeDescription, BridgeSettings};
pub use errors::{BridgeError, BridgeResult};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_project, save_project, FileLock};
pub use ids::IdAllocator;
pub use project::{Project, ProjectMetadata};
pub use timeline::{NullTimeline, Timeline, TimelineRegistry};
