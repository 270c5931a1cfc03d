//! # Persistence
//!
//! The bridge model is written through a small structured save/load
//! contract ([`StructuredSave`] / [`StructuredLoad`]): named, versioned units
//! holding named properties. [`PropertyWriter`] and [`PropertyReader`] back
//! the contract with an in-memory [`PropertyUnit`] tree that serializes to
//! JSON, which is what project files store.
//!
//! ```rust
//! use bridge_core::bridge::BridgeDescription;
//! use bridge_core::persist::{load_bridge, save_bridge, PropertyReader, PropertyWriter};
//! use bridge_core::timeline::NullTimeline;
//!
//! let bridge = BridgeDescription::new(0.0, 120.0).unwrap();
//! let mut writer = PropertyWriter::new();
//! save_bridge(&bridge, &mut writer).unwrap();
//! let tree = writer.finish().unwrap();
//!
//! let loaded = load_bridge(&mut PropertyReader::new(&tree), &mut NullTimeline).unwrap();
//! assert_eq!(loaded, bridge);
//! ```

mod bridge_io;
mod property_bag;

pub use bridge_io::{load_bridge, save_bridge, RawBridge, BRIDGE_UNIT, BRIDGE_UNIT_VERSION};
pub use property_bag::{
    Entry, LoadExt, PropertyReader, PropertyUnit, PropertyValue, PropertyWriter, SaveExt, StructuredLoad,
    StructuredSave, ROOT_UNIT,
};
