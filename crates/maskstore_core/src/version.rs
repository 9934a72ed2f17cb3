//! Schema version numbers.
//!
//! Persisted snapshots carry their schema version as a decimal JSON number
//! (`2`, `3`, `3.1`). Comparing those as floats is fragile, so they are
//! parsed into an integer part and a fixed-scale fraction and compared
//! as exact decimals.

use crate::error::{CoreError, CoreResult};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Fractional digits a version can carry.
const FRACTION_DIGITS: usize = 9;
const FRACTION_SCALE: u32 = 1_000_000_000;

/// A schema version, ordered as a decimal number.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SchemaVersion {
    major: u32,
    /// Digits after the point, in billionths.
    fraction: u32,
}

/// The schema version written by this build.
pub const CURRENT_VERSION: SchemaVersion = SchemaVersion::new(3, 1);

impl SchemaVersion {
    /// The version assumed for snapshots that carry no version at all.
    pub const INITIAL: SchemaVersion = SchemaVersion::new(0, 0);

    /// Creates a version from its integer part and the digits written
    /// after the point: `new(3, 1)` is 3.1 and `new(3, 11)` is 3.11.
    ///
    /// Fractions needing a leading zero (2.05) only come from parsing.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        let mut fraction = minor;
        while fraction >= FRACTION_SCALE {
            fraction /= 10;
        }
        while fraction != 0 && fraction < FRACTION_SCALE / 10 {
            fraction *= 10;
        }
        Self { major, fraction }
    }

    /// Returns the integer part.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Parses a version from a JSON value.
    ///
    /// Accepts non-negative numbers and numeric strings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidVersion` for anything else.
    pub fn from_json(value: &Value) -> CoreResult<Self> {
        match value {
            Value::Number(n) => n.to_string().parse(),
            Value::String(s) => s.trim().parse(),
            other => Err(CoreError::invalid_version(format!(
                "expected a number, got {other}"
            ))),
        }
    }

    /// The digits after the point, without trailing zeros.
    fn fraction_digits(self) -> String {
        let padded = format!("{:0width$}", self.fraction, width = FRACTION_DIGITS);
        padded.trim_end_matches('0').to_string()
    }

    fn to_json_number(self) -> serde_json::Number {
        if self.fraction == 0 {
            return serde_json::Number::from(self.major);
        }
        // Nine fractional digits stay within f64's exact decimal range.
        self.to_string()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .unwrap_or_else(|| serde_json::Number::from(self.major))
    }
}

impl FromStr for SchemaVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let invalid = || CoreError::invalid_version(format!("{s:?} is not a decimal version"));

        let (major, fraction) = match s.split_once('.') {
            Some((major, fraction)) if !fraction.is_empty() => (major, fraction),
            Some(_) => return Err(invalid()),
            None => (s, ""),
        };
        if major.is_empty() || !major.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let major: u32 = major.parse().map_err(|_| invalid())?;

        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > FRACTION_DIGITS {
            return Err(invalid());
        }
        let padded = format!("{fraction:0<width$}", width = FRACTION_DIGITS);
        let fraction: u32 = padded.parse().map_err(|_| invalid())?;

        Ok(Self { major, fraction })
    }
}

impl fmt::Debug for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaVersion({self})")
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fraction == 0 {
            write!(f, "{}", self.major)
        } else {
            write!(f, "{}.{}", self.major, self.fraction_digits())
        }
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_number().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_integer_and_decimal() {
        assert_eq!("2".parse::<SchemaVersion>().unwrap(), SchemaVersion::new(2, 0));
        assert_eq!("3.0".parse::<SchemaVersion>().unwrap(), SchemaVersion::new(3, 0));
        assert_eq!("3.1".parse::<SchemaVersion>().unwrap(), SchemaVersion::new(3, 1));
        assert_eq!("3.10".parse::<SchemaVersion>().unwrap(), SchemaVersion::new(3, 1));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<SchemaVersion>().is_err());
        assert!("-1".parse::<SchemaVersion>().is_err());
        assert!("abc".parse::<SchemaVersion>().is_err());
        assert!("1e3".parse::<SchemaVersion>().is_err());
        assert!("3.x".parse::<SchemaVersion>().is_err());
        assert!("3.".parse::<SchemaVersion>().is_err());
        assert!(".5".parse::<SchemaVersion>().is_err());
        assert!("+3".parse::<SchemaVersion>().is_err());
        assert!("3.0000000001".parse::<SchemaVersion>().is_err());
    }

    #[test]
    fn leading_zero_fractions_sit_below_the_next_tenth() {
        let v: SchemaVersion = "2.05".parse().unwrap();
        assert!(v > SchemaVersion::new(2, 0));
        assert!(v < SchemaVersion::new(2, 1));
        assert!(v < SchemaVersion::new(3, 0));
        assert_eq!(v.to_string(), "2.05");

        let v: SchemaVersion = "3.01".parse().unwrap();
        assert!(v > SchemaVersion::new(3, 0) && v < CURRENT_VERSION);
    }

    #[test]
    fn multi_digit_fractions_compare_as_decimals() {
        let v311: SchemaVersion = "3.11".parse().unwrap();
        let v32: SchemaVersion = "3.2".parse().unwrap();
        assert!(v311 < v32);
        assert!(v311 > CURRENT_VERSION);
        assert_eq!(v311, SchemaVersion::new(3, 11));
        assert_eq!(SchemaVersion::new(3, 10), CURRENT_VERSION);
    }

    #[test]
    fn ordering_is_numeric() {
        let v2 = SchemaVersion::new(2, 0);
        let v3 = SchemaVersion::new(3, 0);
        let v31 = SchemaVersion::new(3, 1);
        assert!(SchemaVersion::INITIAL < v2);
        assert!(v2 < v3);
        assert!(v3 < v31);
        assert!(v31 <= CURRENT_VERSION);
        assert!(SchemaVersion::new(3, 2) > CURRENT_VERSION);
    }

    #[test]
    fn from_json_number() {
        assert_eq!(
            SchemaVersion::from_json(&json!(3.1)).unwrap(),
            SchemaVersion::new(3, 1)
        );
        assert_eq!(
            SchemaVersion::from_json(&json!(2)).unwrap(),
            SchemaVersion::new(2, 0)
        );
        assert_eq!(
            SchemaVersion::from_json(&json!("3.1")).unwrap(),
            SchemaVersion::new(3, 1)
        );
        assert!(SchemaVersion::from_json(&json!(null)).is_err());
        assert!(SchemaVersion::from_json(&json!(-2)).is_err());
    }

    #[test]
    fn serializes_as_decimal_number() {
        assert_eq!(serde_json::to_value(CURRENT_VERSION).unwrap(), json!(3.1));
        assert_eq!(
            serde_json::to_value(SchemaVersion::new(2, 0)).unwrap(),
            json!(2)
        );
        let back: SchemaVersion = serde_json::from_value(json!(3.1)).unwrap();
        assert_eq!(back, CURRENT_VERSION);
    }

    #[test]
    fn display() {
        assert_eq!(CURRENT_VERSION.to_string(), "3.1");
        assert_eq!(SchemaVersion::new(3, 0).to_string(), "3");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn decimal_version() -> impl Strategy<Value = SchemaVersion> {
            (0u32..1000, "[0-9]{0,9}").prop_map(|(major, fraction)| {
                let text = if fraction.is_empty() {
                    major.to_string()
                } else {
                    format!("{major}.{fraction}")
                };
                text.parse::<SchemaVersion>().unwrap()
            })
        }

        proptest! {
            #[test]
            fn json_round_trip(version in decimal_version()) {
                let value = serde_json::to_value(version).unwrap();
                prop_assert_eq!(SchemaVersion::from_json(&value).unwrap(), version);
            }

            #[test]
            fn ordering_matches_decimal_value(a in decimal_version(), b in decimal_version()) {
                let as_f64 = |v: SchemaVersion| v.to_string().parse::<f64>().unwrap();
                prop_assert_eq!(a.cmp(&b), as_f64(a).total_cmp(&as_f64(b)));
            }
        }
    }
}
