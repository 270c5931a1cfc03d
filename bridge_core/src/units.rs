//! # Unit Types
//!
//! Lightweight wrappers for the few units the bridge model deals in. Stations
//! and lengths are stored as plain `f64` feet on the model (fields carry a
//! `_ft` / `_in` suffix); these types exist for conversion and display.
//!
//! ## Example
//!
//! ```rust
//! use bridge_core::units::{Feet, Inches, Station};
//!
//! let offset: Feet = Inches(10.0).into();
//! assert!((offset.0 - 10.0 / 12.0).abs() < 1e-12);
//!
//! assert_eq!(Station(1234.5).to_string(), "12+34.50");
//! assert_eq!("12+34.50".parse::<Station>().unwrap(), Station(1234.5));
//! ```

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::BridgeError;

/// Two stations closer than this (ft) are the same location.
pub const STATION_TOLERANCE_FT: f64 = 1.0e-6;

/// Compare two stations within [`STATION_TOLERANCE_FT`].
pub fn same_station(a: f64, b: f64) -> bool {
    (a - b).abs() <= STATION_TOLERANCE_FT
}

// ============================================================================
// Length Units
// ============================================================================

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl From<Feet> for Inches {
    fn from(ft: Feet) -> Self {
        Inches(ft.0 * 12.0)
    }
}

impl From<Inches> for Feet {
    fn from(inches: Inches) -> Self {
        Feet(inches.0 / 12.0)
    }
}

impl Add for Feet {
    type Output = Feet;
    fn add(self, rhs: Feet) -> Feet {
        Feet(self.0 + rhs.0)
    }
}

impl Sub for Feet {
    type Output = Feet;
    fn sub(self, rhs: Feet) -> Feet {
        Feet(self.0 - rhs.0)
    }
}

impl fmt::Display for Feet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} ft", self.0)
    }
}

impl fmt::Display for Inches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} in", self.0)
    }
}

// ============================================================================
// Stationing
// ============================================================================

/// A longitudinal station in feet, displayed in `sta+offset` form
/// (`12+34.50` is 1234.5 ft).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Station(pub f64);

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0.0 { "-" } else { "" };
        let abs = self.0.abs();
        let mut hundreds = (abs / 100.0).floor();
        let mut rest = abs - hundreds * 100.0;
        // 99.999 would otherwise print as "+100.00"
        if (rest * 100.0).round() >= 10_000.0 {
            hundreds += 1.0;
            rest = 0.0;
        }
        write!(f, "{}{}+{:05.2}", sign, hundreds as i64, rest)
    }
}

impl FromStr for Station {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let bad = || BridgeError::invalid_input("station", text, "Expected 'sta+offset' or a number in feet");

        let Some((sta, offset)) = text.split_once('+') else {
            return text.parse::<f64>().map(Station).map_err(|_| bad());
        };
        let negative = sta.starts_with('-');
        let hundreds: f64 = sta.trim_start_matches('-').parse().map_err(|_| bad())?;
        let offset: f64 = offset.parse().map_err(|_| bad())?;
        if !(0.0..100.0).contains(&offset) {
            return Err(bad());
        }
        let value = hundreds * 100.0 + offset;
        Ok(Station(if negative { -value } else { value }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feet_inches_conversion() {
        let inches: Inches = Feet(1.5).into();
        assert_eq!(inches.0, 18.0);
        let feet: Feet = Inches(6.0).into();
        assert_eq!(feet.0, 0.5);
    }

    #[test]
    fn test_station_display() {
        assert_eq!(Station(0.0).to_string(), "0+00.00");
        assert_eq!(Station(180.0).to_string(), "1+80.00");
        assert_eq!(Station(99.999).to_string(), "1+00.00");
        assert_eq!(Station(-50.0).to_string(), "-0+50.00");
    }

    #[test]
    fn test_station_parse() {
        assert_eq!("1+80.00".parse::<Station>().unwrap(), Station(180.0));
        assert_eq!("250".parse::<Station>().unwrap(), Station(250.0));
        assert_eq!("-0+50".parse::<Station>().unwrap(), Station(-50.0));
        assert!("1+120".parse::<Station>().is_err());
        assert!("abc".parse::<Station>().is_err());
    }

    #[test]
    fn test_same_station() {
        assert!(same_station(100.0, 100.0 + 1.0e-9));
        assert!(!same_station(100.0, 100.001));
    }
}
