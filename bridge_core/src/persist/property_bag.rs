//! # Property Bags
//!
//! The structured save/load contract: named, versioned units holding typed
//! properties and nested units. [`StructuredSave`] and [`StructuredLoad`]
//! are the abstract interface the bridge model persists through;
//! [`PropertyWriter`] and [`PropertyReader`] implement it over an in-memory
//! [`PropertyUnit`] tree that serializes to JSON.
//!
//! Units are read back in the order they were written. Properties inside a
//! unit are looked up by name, so a loader can probe for optional fields
//! with [`StructuredLoad::has_property`].
//!
//! ## Example
//!
//! ```rust
//! use bridge_core::persist::{LoadExt, PropertyReader, PropertyWriter, SaveExt, StructuredLoad, StructuredSave};
//!
//! let mut writer = PropertyWriter::new();
//! writer.begin_unit("Span", 2).unwrap();
//! writer.put("Length", 120.0).unwrap();
//! writer.end_unit().unwrap();
//! let tree = writer.finish().unwrap();
//!
//! let mut reader = PropertyReader::new(&tree);
//! reader.begin_unit("Span").unwrap();
//! assert_eq!(reader.version(), 2);
//! assert_eq!(reader.get_f64("Length").unwrap(), 120.0);
//! reader.end_unit().unwrap();
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{BridgeError, BridgeResult};

/// Name of the implicit unit at the root of every tree
pub const ROOT_UNIT: &str = "Document";

// ============================================================================
// Values
// ============================================================================

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int(_) => "int",
            PropertyValue::UInt(_) => "uint",
            PropertyValue::Float(_) => "float",
            PropertyValue::Text(_) => "text",
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<u64> for PropertyValue {
    fn from(v: u64) -> Self {
        PropertyValue::UInt(v)
    }
}

impl From<usize> for PropertyValue {
    fn from(v: usize) -> Self {
        PropertyValue::UInt(v as u64)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Text(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Text(v)
    }
}

// ============================================================================
// Contract
// ============================================================================

/// Sink for structured data.
pub trait StructuredSave {
    fn begin_unit(&mut self, name: &str, version: u32) -> BridgeResult<()>;
    fn end_unit(&mut self) -> BridgeResult<()>;
    fn put_property(&mut self, name: &str, value: PropertyValue) -> BridgeResult<()>;
}

/// Source of structured data.
pub trait StructuredLoad {
    /// Enter the next unit, which must be called `name`.
    fn begin_unit(&mut self, name: &str) -> BridgeResult<()>;
    fn end_unit(&mut self) -> BridgeResult<()>;
    /// Version of the current unit
    fn version(&self) -> u32;
    /// Name of the current unit
    fn unit_name(&self) -> &str;
    fn get_property(&mut self, name: &str) -> BridgeResult<PropertyValue>;
    fn has_property(&self, name: &str) -> bool;
}

/// Convenience writers.
pub trait SaveExt: StructuredSave {
    fn put(&mut self, name: &str, value: impl Into<PropertyValue>) -> BridgeResult<()> {
        self.put_property(name, value.into())
    }

    /// Store any serde value (enums, small records) as JSON text.
    fn put_record<T: Serialize>(&mut self, name: &str, value: &T) -> BridgeResult<()> {
        let json = serde_json::to_string(value).map_err(|e| BridgeError::SerializationError {
            reason: format!("property '{}': {}", name, e),
        })?;
        self.put_property(name, PropertyValue::Text(json))
    }
}

impl<S: StructuredSave + ?Sized> SaveExt for S {}

/// Typed readers.
pub trait LoadExt: StructuredLoad {
    fn wrong_type(&self, name: &str, found: &PropertyValue, expected: &str) -> BridgeError {
        BridgeError::SerializationError {
            reason: format!(
                "property '{}' in unit '{}' is {}, expected {}",
                name,
                self.unit_name(),
                found.type_name(),
                expected
            ),
        }
    }

    fn get_bool(&mut self, name: &str) -> BridgeResult<bool> {
        match self.get_property(name)? {
            PropertyValue::Bool(v) => Ok(v),
            other => Err(self.wrong_type(name, &other, "bool")),
        }
    }

    fn get_u64(&mut self, name: &str) -> BridgeResult<u64> {
        match self.get_property(name)? {
            PropertyValue::UInt(v) => Ok(v),
            PropertyValue::Int(v) if v >= 0 => Ok(v as u64),
            other => Err(self.wrong_type(name, &other, "uint")),
        }
    }

    fn get_usize(&mut self, name: &str) -> BridgeResult<usize> {
        let v = self.get_u64(name)?;
        usize::try_from(v).map_err(|e| BridgeError::SerializationError {
            reason: format!("property '{}': {}", name, e),
        })
    }

    fn get_i64(&mut self, name: &str) -> BridgeResult<i64> {
        match self.get_property(name)? {
            PropertyValue::Int(v) => Ok(v),
            PropertyValue::UInt(v) if i64::try_from(v).is_ok() => Ok(v as i64),
            other => Err(self.wrong_type(name, &other, "int")),
        }
    }

    /// Floats also accept integer values.
    fn get_f64(&mut self, name: &str) -> BridgeResult<f64> {
        match self.get_property(name)? {
            PropertyValue::Float(v) => Ok(v),
            PropertyValue::Int(v) => Ok(v as f64),
            PropertyValue::UInt(v) => Ok(v as f64),
            other => Err(self.wrong_type(name, &other, "float")),
        }
    }

    fn get_text(&mut self, name: &str) -> BridgeResult<String> {
        match self.get_property(name)? {
            PropertyValue::Text(v) => Ok(v),
            other => Err(self.wrong_type(name, &other, "text")),
        }
    }

    fn get_record<T: DeserializeOwned>(&mut self, name: &str) -> BridgeResult<T> {
        let json = self.get_text(name)?;
        serde_json::from_str(&json).map_err(|e| BridgeError::SerializationError {
            reason: format!("property '{}' in unit '{}': {}", name, self.unit_name(), e),
        })
    }

    /// Read a record that older versions did not write.
    fn get_record_or<T: DeserializeOwned>(&mut self, name: &str, default: T) -> BridgeResult<T> {
        if self.has_property(name) {
            self.get_record(name)
        } else {
            Ok(default)
        }
    }
}

impl<L: StructuredLoad + ?Sized> LoadExt for L {}

// ============================================================================
// In-memory tree
// ============================================================================

/// One entry of a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Entry {
    Property { name: String, value: PropertyValue },
    Unit(PropertyUnit),
}

/// A named, versioned unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyUnit {
    pub name: String,
    pub version: u32,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl PropertyUnit {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        PropertyUnit {
            name: name.into(),
            version,
            entries: Vec::new(),
        }
    }

    fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.entries.iter().find_map(|e| match e {
            Entry::Property { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }

    /// Child units in order
    pub fn units(&self) -> impl Iterator<Item = &PropertyUnit> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Unit(u) => Some(u),
            Entry::Property { .. } => None,
        })
    }
}

/// Builds a [`PropertyUnit`] tree.
#[derive(Debug)]
pub struct PropertyWriter {
    stack: Vec<PropertyUnit>,
}

impl PropertyWriter {
    pub fn new() -> Self {
        PropertyWriter {
            stack: vec![PropertyUnit::new(ROOT_UNIT, 0)],
        }
    }

    /// The finished tree. Fails when a unit is still open.
    pub fn finish(mut self) -> BridgeResult<PropertyUnit> {
        if self.stack.len() != 1 {
            let open = self.stack.last().map(|u| u.name.clone()).unwrap_or_default();
            return Err(BridgeError::Internal {
                message: format!("unit '{}' was never closed", open),
            });
        }
        self.stack.pop().ok_or_else(|| BridgeError::Internal {
            message: "property writer has no root unit".to_string(),
        })
    }

    fn current(&mut self) -> BridgeResult<&mut PropertyUnit> {
        self.stack.last_mut().ok_or_else(|| BridgeError::Internal {
            message: "property writer has no root unit".to_string(),
        })
    }
}

impl Default for PropertyWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl StructuredSave for PropertyWriter {
    fn begin_unit(&mut self, name: &str, version: u32) -> BridgeResult<()> {
        self.stack.push(PropertyUnit::new(name, version));
        Ok(())
    }

    fn end_unit(&mut self) -> BridgeResult<()> {
        if self.stack.len() < 2 {
            return Err(BridgeError::Internal {
                message: "end_unit without a matching begin_unit".to_string(),
            });
        }
        let unit = self.stack.pop().ok_or_else(|| BridgeError::Internal {
            message: "property writer has no open unit".to_string(),
        })?;
        self.current()?.entries.push(Entry::Unit(unit));
        Ok(())
    }

    fn put_property(&mut self, name: &str, value: PropertyValue) -> BridgeResult<()> {
        self.current()?.entries.push(Entry::Property {
            name: name.to_string(),
            value,
        });
        Ok(())
    }
}

#[derive(Debug)]
struct Cursor<'a> {
    unit: &'a PropertyUnit,
    next: usize,
}

/// Reads a [`PropertyUnit`] tree.
#[derive(Debug)]
pub struct PropertyReader<'a> {
    stack: Vec<Cursor<'a>>,
}

impl<'a> PropertyReader<'a> {
    pub fn new(root: &'a PropertyUnit) -> Self {
        PropertyReader {
            stack: vec![Cursor { unit: root, next: 0 }],
        }
    }

    fn top(&self) -> &Cursor<'a> {
        // the root cursor is never popped
        &self.stack[self.stack.len() - 1]
    }
}

impl StructuredLoad for PropertyReader<'_> {
    fn begin_unit(&mut self, name: &str) -> BridgeResult<()> {
        let top = self.top();
        let unit = top.unit;
        let found = unit.entries[top.next..]
            .iter()
            .enumerate()
            .find_map(|(offset, e)| match e {
                Entry::Unit(u) => Some((top.next + offset, u)),
                Entry::Property { .. } => None,
            });
        let Some((position, child)) = found else {
            return Err(BridgeError::unexpected_unit(name, format!("end of '{}'", unit.name)));
        };
        if child.name != name {
            return Err(BridgeError::unexpected_unit(name, child.name.clone()));
        }
        let last = self.stack.len() - 1;
        self.stack[last].next = position + 1;
        self.stack.push(Cursor { unit: child, next: 0 });
        Ok(())
    }

    fn end_unit(&mut self) -> BridgeResult<()> {
        if self.stack.len() < 2 {
            return Err(BridgeError::Internal {
                message: "end_unit without a matching begin_unit".to_string(),
            });
        }
        self.stack.pop();
        Ok(())
    }

    fn version(&self) -> u32 {
        self.top().unit.version
    }

    fn unit_name(&self) -> &str {
        &self.top().unit.name
    }

    fn get_property(&mut self, name: &str) -> BridgeResult<PropertyValue> {
        let unit = self.top().unit;
        unit.property(name)
            .cloned()
            .ok_or_else(|| BridgeError::missing_property(unit.name.clone(), name))
    }

    fn has_property(&self, name: &str) -> bool {
        self.top().unit.property(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PropertyUnit {
        let mut w = PropertyWriter::new();
        w.begin_unit("Outer", 3).unwrap();
        w.put("Flag", true).unwrap();
        w.put("Count", 2usize).unwrap();
        w.begin_unit("Inner", 1).unwrap();
        w.put("Name", "W74G").unwrap();
        w.end_unit().unwrap();
        w.begin_unit("Inner", 2).unwrap();
        w.put("Offset", -1i64).unwrap();
        w.end_unit().unwrap();
        w.end_unit().unwrap();
        w.finish().unwrap()
    }

    #[test]
    fn test_units_read_in_order() {
        let tree = sample();
        let mut r = PropertyReader::new(&tree);
        r.begin_unit("Outer").unwrap();
        assert_eq!(r.version(), 3);
        assert!(r.get_bool("Flag").unwrap());
        assert_eq!(r.get_usize("Count").unwrap(), 2);

        r.begin_unit("Inner").unwrap();
        assert_eq!(r.get_text("Name").unwrap(), "W74G");
        r.end_unit().unwrap();
        r.begin_unit("Inner").unwrap();
        assert_eq!(r.version(), 2);
        assert_eq!(r.get_i64("Offset").unwrap(), -1);
        r.end_unit().unwrap();
        r.end_unit().unwrap();
    }

    #[test]
    fn test_missing_property() {
        let tree = sample();
        let mut r = PropertyReader::new(&tree);
        r.begin_unit("Outer").unwrap();
        assert!(!r.has_property("Length"));
        let err = r.get_f64("Length").unwrap_err();
        assert_eq!(err, BridgeError::missing_property("Outer", "Length"));
    }

    #[test]
    fn test_unexpected_unit() {
        let tree = sample();
        let mut r = PropertyReader::new(&tree);
        let err = r.begin_unit("Bridge").unwrap_err();
        assert!(matches!(err, BridgeError::UnexpectedUnit { .. }));

        r.begin_unit("Outer").unwrap();
        r.begin_unit("Inner").unwrap();
        r.end_unit().unwrap();
        r.begin_unit("Inner").unwrap();
        r.end_unit().unwrap();
        // no third unit
        assert!(r.begin_unit("Inner").is_err());
    }

    #[test]
    fn test_wrong_type_reported() {
        let tree = sample();
        let mut r = PropertyReader::new(&tree);
        r.begin_unit("Outer").unwrap();
        let err = r.get_text("Flag").unwrap_err();
        assert!(err.to_string().contains("expected text"));
        // integers widen to floats
        assert_eq!(r.get_f64("Count").unwrap(), 2.0);
    }

    #[test]
    fn test_unbalanced_writer() {
        let mut w = PropertyWriter::new();
        w.begin_unit("Open", 1).unwrap();
        assert!(w.finish().is_err());

        let mut w = PropertyWriter::new();
        assert!(w.end_unit().is_err());
    }

    #[test]
    fn test_records_and_json() {
        use crate::bridge::{BoundaryCondition, GirderSpacing};

        let mut w = PropertyWriter::new();
        w.begin_unit("Pier", 1).unwrap();
        w.put_record("Boundary", &BoundaryCondition::Roller).unwrap();
        w.put_record("Spacing", &GirderSpacing::uniform(3, 7.5)).unwrap();
        w.end_unit().unwrap();
        let tree = w.finish().unwrap();

        let json = serde_json::to_string(&tree).unwrap();
        let tree: PropertyUnit = serde_json::from_str(&json).unwrap();

        let mut r = PropertyReader::new(&tree);
        r.begin_unit("Pier").unwrap();
        let bc: BoundaryCondition = r.get_record("Boundary").unwrap();
        assert_eq!(bc, BoundaryCondition::Roller);
        let spacing: GirderSpacing = r.get_record("Spacing").unwrap();
        assert_eq!(spacing.spacings_ft, vec![7.5, 7.5]);
        let missing: f64 = r.get_record_or("Camber", 0.25).unwrap();
        assert_eq!(missing, 0.25);
    }
}
