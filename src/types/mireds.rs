//! Color temperature control.

use serde::{Deserialize, Serialize};

/// Color temperature in mireds (micro reciprocal degrees).
///
/// Mireds are `1_000_000 / kelvin`, so lower values are cooler (more blue)
/// and higher values are warmer (more yellow/orange). Typical values:
/// - 153: Daylight (6500K)
/// - 250: Neutral white (4000K)
/// - 370: Warm white (2700K)
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u16", into = "u16")]
pub struct Mireds {
    pub(crate) mireds: u16,
}

impl TryFrom<u16> for Mireds {
    type Error = String;

    fn try_from(mireds: u16) -> Result<Self, Self::Error> {
        Mireds::create(mireds).ok_or_else(|| "color temperature must be above 0 mireds".to_string())
    }
}

impl From<Mireds> for u16 {
    fn from(temp: Mireds) -> Self {
        temp.mireds
    }
}

impl Mireds {
    /// Create a new Mireds with the given value.
    ///
    /// Returns `None` for zero, which has no kelvin equivalent.
    ///
    /// # Examples
    ///
    /// ```
    /// use smart_light_group::Mireds;
    ///
    /// assert!(Mireds::create(0).is_none());
    /// assert_eq!(Mireds::create(320).unwrap().value(), 320);
    /// ```
    pub fn create(mireds: u16) -> Option<Self> {
        if mireds > 0 { Some(Mireds { mireds }) } else { None }
    }

    /// Get the mired value.
    pub fn value(&self) -> u16 {
        self.mireds
    }

    /// Convert a kelvin temperature into mireds.
    ///
    /// # Examples
    ///
    /// ```
    /// use smart_light_group::Mireds;
    ///
    /// assert_eq!(Mireds::from_kelvin(4000).unwrap().value(), 250);
    /// assert!(Mireds::from_kelvin(0).is_none());
    /// ```
    pub fn from_kelvin(kelvin: u32) -> Option<Self> {
        if kelvin == 0 {
            return None;
        }
        let mireds = (1_000_000.0 / kelvin as f64).round();
        if mireds < 1.0 || mireds > f64::from(u16::MAX) {
            return None;
        }
        Self::create(mireds as u16)
    }

    /// Convert into a kelvin temperature.
    pub fn to_kelvin(&self) -> u32 {
        (1_000_000.0 / f64::from(self.mireds)).round() as u32
    }

    /// Clamp into an inclusive mired range.
    pub fn clamp(self, min: Mireds, max: Mireds) -> Mireds {
        Mireds {
            mireds: self.mireds.clamp(min.mireds, max.mireds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde() {
        let temp: Mireds = serde_json::from_str("370").unwrap();
        assert_eq!(temp.value(), 370);
        assert_eq!(serde_json::to_string(&temp).unwrap(), "370");
        assert!(serde_json::from_str::<Mireds>("0").is_err());
    }
}
