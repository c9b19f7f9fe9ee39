//! Hue and Saturation color representation.

use serde::{Deserialize, Serialize};

use super::{Brightness, Color};

/// Hue and Saturation color representation.
///
/// - Hue: The color angle on the color wheel (0-360 degrees)
/// - Saturation: The intensity of the color (0-100 percent)
///
/// This is the color model group commands are expressed in. Low saturations
/// are close to white, which is what the white-light crossover decisions
/// look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HsValues")]
pub struct HueSaturation {
    hue: f32,
    saturation: f32,
}

// Unchecked wire form, validated through `HueSaturation::create`
#[derive(Deserialize)]
struct HsValues {
    hue: f32,
    saturation: f32,
}

impl TryFrom<HsValues> for HueSaturation {
    type Error = String;

    fn try_from(values: HsValues) -> Result<Self, Self::Error> {
        HueSaturation::create(values.hue, values.saturation).ok_or_else(|| {
            format!(
                "hue/saturation out of range: {}, {}",
                values.hue, values.saturation
            )
        })
    }
}

impl HueSaturation {
    pub const MAX_HUE: f32 = 360.0;
    pub const MAX_SATURATION: f32 = 100.0;

    /// Create a new HueSaturation with the given values.
    ///
    /// # Arguments
    ///
    /// * `hue` - Hue angle in degrees (0-360)
    /// * `saturation` - Saturation percentage (0-100)
    ///
    /// Returns `None` if values are outside valid ranges.
    ///
    /// # Examples
    ///
    /// ```
    /// use smart_light_group::HueSaturation;
    ///
    /// assert!(HueSaturation::create(240.0, 90.0).is_some()); // Blue
    /// assert!(HueSaturation::create(0.0, 5.0).is_some());    // Nearly white
    /// assert!(HueSaturation::create(361.0, 50.0).is_none()); // Invalid hue
    /// assert!(HueSaturation::create(180.0, 101.0).is_none()); // Invalid saturation
    /// ```
    pub fn create(hue: f32, saturation: f32) -> Option<Self> {
        if Self::is_valid_hue(hue) && Self::is_valid_saturation(saturation) {
            Some(HueSaturation { hue, saturation })
        } else {
            None
        }
    }

    pub(crate) fn is_valid_hue(hue: f32) -> bool {
        (0.0..=Self::MAX_HUE).contains(&hue)
    }

    pub(crate) fn is_valid_saturation(saturation: f32) -> bool {
        (0.0..=Self::MAX_SATURATION).contains(&saturation)
    }

    /// Get the hue value.
    pub fn hue(&self) -> f32 {
        self.hue
    }

    /// Get the saturation value.
    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    /// Convert to RGB Color at full value.
    ///
    /// # Examples
    ///
    /// ```
    /// use smart_light_group::HueSaturation;
    ///
    /// let hs = HueSaturation::create(0.0, 100.0).unwrap();
    /// let color = hs.to_color();
    /// assert_eq!(color.red(), 255);
    /// assert_eq!(color.green(), 0);
    /// assert_eq!(color.blue(), 0);
    /// ```
    pub fn to_color(&self) -> Color {
        self.to_color_at(&Brightness::new())
    }

    /// Convert to RGB Color, using the brightness as the HSV value.
    pub fn to_color_at(&self, brightness: &Brightness) -> Color {
        let s = self.saturation / 100.0;
        let v = f32::from(brightness.value()) / 255.0;

        if s == 0.0 {
            let gray = (v * 255.0).round() as u8;
            return Color::rgb(gray, gray, gray);
        }

        let h = (self.hue % 360.0) / 60.0;
        let i = h.floor() as i32;
        let f = h - i as f32;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match i % 6 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        Color::rgb(
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
        )
    }
}

impl From<&HueSaturation> for Color {
    fn from(hs: &HueSaturation) -> Self {
        hs.to_color()
    }
}
