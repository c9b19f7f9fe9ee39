//! White channel control.

use serde::{Deserialize, Serialize};

/// White channel intensity from 0 to 255.
///
/// RGBW fixtures carry a dedicated white LED next to the color LEDs. Mixing
/// it in gives a cleaner white than driving red, green and blue together.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct WhiteValue {
    pub(crate) value: u8,
}

impl WhiteValue {
    pub const MAX: u8 = 255;

    /// Create a new WhiteValue at full intensity.
    pub fn new() -> Self {
        WhiteValue { value: Self::MAX }
    }

    /// Get the white value.
    pub fn value(&self) -> u8 {
        self.value
    }
}

impl From<u8> for WhiteValue {
    fn from(value: u8) -> Self {
        WhiteValue { value }
    }
}
