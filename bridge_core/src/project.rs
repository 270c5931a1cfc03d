//! # Project Data Structures
//!
//! A [`Project`] is one bridge together with its construction timeline and
//! the file header metadata. On disk it is a [`ProjectDocument`]: the bridge
//! is stored as its property tree (see [`crate::persist`]) so that loading
//! goes through the same repair and validation pass as any other source.
//!
//! ```text
//! ProjectDocument (.bdg, JSON)
//! ├── meta: ProjectMetadata (schema version, engineer, job info, timestamps)
//! ├── timeline: TimelineRegistry (construction events)
//! └── bridge: PropertyUnit (BridgeDescription unit tree)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use bridge_core::project::{Project, ProjectDocument};
//!
//! let project = Project::new("Jane Engineer", "25-042", "State DOT");
//! let document = project.to_document().unwrap();
//! let json = serde_json::to_string_pretty(&document).unwrap();
//!
//! let parsed: ProjectDocument = serde_json::from_str(&json).unwrap();
//! let restored = Project::from_document(parsed).unwrap();
//! assert_eq!(restored.bridge, project.bridge);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bridge::BridgeDescription;
use crate::errors::BridgeResult;
use crate::persist::{load_bridge, save_bridge, PropertyReader, PropertyUnit, PropertyWriter};
use crate::timeline::TimelineRegistry;

/// Current schema version for .bdg files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// A bridge and its construction timeline.
#[derive(Debug, Clone)]
pub struct Project {
    pub meta: ProjectMetadata,
    pub timeline: TimelineRegistry,
    pub bridge: BridgeDescription,
}

impl Project {
    /// Create a project holding a default one-span bridge and an empty
    /// timeline.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bridge_core::project::Project;
    ///
    /// let project = Project::new("John Doe", "25-001", "Client Corp");
    /// assert_eq!(project.meta.engineer, "John Doe");
    /// assert_eq!(project.bridge.span_count(), 1);
    /// ```
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            timeline: TimelineRegistry::new(),
            bridge: BridgeDescription::default(),
        }
    }

    pub fn with_bridge(mut self, bridge: BridgeDescription) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn with_timeline(mut self, timeline: TimelineRegistry) -> Self {
        self.timeline = timeline;
        self
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// The serializable form of the project.
    pub fn to_document(&self) -> BridgeResult<ProjectDocument> {
        let mut writer = PropertyWriter::new();
        save_bridge(&self.bridge, &mut writer)?;
        Ok(ProjectDocument {
            meta: self.meta.clone(),
            timeline: self.timeline.clone(),
            bridge: writer.finish()?,
        })
    }

    /// Rebuild a project from its document. The bridge is repaired and
    /// validated; an invalid bridge fails the whole load.
    pub fn from_document(document: ProjectDocument) -> BridgeResult<Self> {
        let ProjectDocument {
            meta,
            mut timeline,
            bridge,
        } = document;
        let bridge = load_bridge(&mut PropertyReader::new(&bridge), &mut timeline)?;
        Ok(Project { meta, timeline, bridge })
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible engineer
    pub engineer: String,

    /// Job/project number
    pub job_id: String,

    /// Client name
    pub client: String,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// On-disk form of a [`Project`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub meta: ProjectMetadata,
    #[serde(default)]
    pub timeline: TimelineRegistry,
    pub bridge: PropertyUnit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{InsertSpan, PierFace, TemporarySupportData, TemporarySupportEvents};
    use crate::errors::BridgeError;
    use crate::persist::{Entry, PropertyValue};

    #[test]
    fn test_project_creation() {
        let project = Project::new("John Doe", "25-001", "Acme Corp");
        assert_eq!(project.meta.engineer, "John Doe");
        assert_eq!(project.meta.job_id, "25-001");
        assert_eq!(project.meta.client, "Acme Corp");
        assert_eq!(project.meta.version, SCHEMA_VERSION);
        assert!(project.bridge.validate().is_ok());
    }

    #[test]
    fn test_document_roundtrip() {
        let mut timeline = TimelineRegistry::with_events(["Erect piers", "Erect girders", "Remove towers"]);
        let mut bridge = BridgeDescription::new(100.0, 150.0).unwrap();
        bridge
            .insert_span(&mut timeline, InsertSpan::new(1, PierFace::Ahead, 120.0).with_erection_event(0))
            .unwrap();
        bridge
            .add_temporary_support(
                &mut timeline,
                TemporarySupportData::new(300.0),
                TemporarySupportEvents::new(1, 2),
            )
            .unwrap();
        let project = Project::new("Jane Engineer", "25-042", "Test Client")
            .with_bridge(bridge)
            .with_timeline(timeline);

        let json = serde_json::to_string_pretty(&project.to_document().unwrap()).unwrap();
        assert!(json.contains("Jane Engineer"));
        assert!(json.contains("Remove towers"));

        let document: ProjectDocument = serde_json::from_str(&json).unwrap();
        let restored = Project::from_document(document).unwrap();
        assert_eq!(restored.meta, project.meta);
        assert_eq!(restored.timeline, project.timeline);
        assert_eq!(restored.bridge, project.bridge);
    }

    #[test]
    fn test_invalid_bridge_fails_document_load() {
        let project = Project::new("Engineer", "25-001", "Client");
        let mut document = project.to_document().unwrap();

        // swap the first pier's station far ahead of the second
        fn push_station(unit: &mut PropertyUnit) -> bool {
            for entry in &mut unit.entries {
                match entry {
                    Entry::Property { name, value } if name == "Station" && unit.name == "Pier" => {
                        *value = PropertyValue::Float(1.0e4);
                        return true;
                    }
                    Entry::Unit(child) => {
                        if push_station(child) {
                            return true;
                        }
                    }
                    _ => {}
                }
            }
            false
        }
        assert!(push_station(&mut document.bridge));

        let result = Project::from_document(document);
        assert!(matches!(result, Err(BridgeError::InvariantViolation { .. })));
    }
}
