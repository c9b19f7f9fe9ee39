//! RGB color representation.

use serde::{Deserialize, Serialize};

/// An RGB color with red, green, and blue components (0-255 each).
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Color {
    pub(crate) red: u8,
    pub(crate) green: u8,
    pub(crate) blue: u8,
}

impl Color {
    /// Create a color with the given RGB values.
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    /// The part of this color all three channels share, i.e. the amount a
    /// dedicated white LED could take over.
    pub fn white_component(&self) -> u8 {
        self.red.min(self.green).min(self.blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_component() {
        assert_eq!(Color::rgb(200, 180, 255).white_component(), 180);
        assert_eq!(Color::rgb(0, 0, 255).white_component(), 0);
    }
}
