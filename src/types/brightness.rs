//! Brightness level for group and member lights.

use serde::{Deserialize, Serialize};

/// Brightness level from 0 to 255.
///
/// A brightness of 0 sent to a dimmable light switches it off.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Brightness {
    pub(crate) value: u8,
}

impl Brightness {
    pub const MAX: u8 = 255;

    pub fn new() -> Self {
        Brightness { value: Self::MAX }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Create a brightness from a percentage (0-100).
    ///
    /// Returns None if the percentage is above 100.
    ///
    /// # Examples
    ///
    /// ```
    /// use smart_light_group::Brightness;
    ///
    /// assert_eq!(Brightness::from_percent(10).unwrap().value(), 26);
    /// assert_eq!(Brightness::from_percent(90).unwrap().value(), 230);
    /// assert!(Brightness::from_percent(101).is_none());
    /// ```
    pub fn from_percent(percent: u8) -> Option<Self> {
        if percent > 100 {
            return None;
        }
        let value = (f32::from(percent) * f32::from(Self::MAX) / 100.0).round() as u8;
        Some(Brightness { value })
    }

    pub fn percent(&self) -> u8 {
        (f32::from(self.value) * 100.0 / f32::from(Self::MAX)).round() as u8
    }

    pub fn is_off(&self) -> bool {
        self.value == 0
    }
}

impl From<u8> for Brightness {
    fn from(value: u8) -> Self {
        Brightness { value }
    }
}
