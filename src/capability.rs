//! Member capabilities and light classification.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// A single feature a member light declares.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    OnOff,
    Brightness,
    ColorTemperature,
    HueSaturation,
    WhiteValue,
}

impl Capability {
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// The set of features a member light declares.
///
/// On/off is the universal baseline and is always contained, even in a set
/// built from an empty list.
///
/// # Examples
///
/// ```
/// use smart_light_group::{Capabilities, Capability};
///
/// let caps = Capabilities::from([Capability::Brightness, Capability::HueSaturation]);
/// assert!(caps.contains(Capability::OnOff));
/// assert!(caps.contains(Capability::HueSaturation));
/// assert!(!caps.contains(Capability::ColorTemperature));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Capability>", into = "Vec<Capability>")]
pub struct Capabilities {
    bits: u8,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::on_off()
    }
}

impl Capabilities {
    /// A set containing only on/off.
    pub fn on_off() -> Self {
        Capabilities {
            bits: Capability::OnOff.bit(),
        }
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.bits & capability.bit() != 0
    }

    pub fn insert(&mut self, capability: Capability) {
        self.bits |= capability.bit();
    }

    /// Combine with another set.
    pub fn union(&self, other: &Self) -> Self {
        Capabilities {
            bits: self.bits | other.bits,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::iter().filter(|c| self.contains(*c))
    }

    /// Classify this set into the light class used for command routing.
    pub fn classify(&self) -> LightClass {
        classify(self)
    }
}

impl<const N: usize> From<[Capability; N]> for Capabilities {
    fn from(capabilities: [Capability; N]) -> Self {
        capabilities.into_iter().collect()
    }
}

impl From<Vec<Capability>> for Capabilities {
    fn from(capabilities: Vec<Capability>) -> Self {
        capabilities.into_iter().collect()
    }
}

impl From<Capabilities> for Vec<Capability> {
    fn from(capabilities: Capabilities) -> Self {
        capabilities.iter().collect()
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut caps = Capabilities::on_off();
        for capability in iter {
            caps.insert(capability);
        }
        caps
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|c| c.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Classification of member lights, from plainest to richest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LightClass {
    OnOff,               // Regular white on/off light
    Dimmable,            // Dimmable white
    Temperature,         // Tunable white
    Color,               // RGB strip
    ColorAndWhite,       // RGBW strip
    TemperatureAndColor, // Full color bulb with native white temperatures
}

impl LightClass {
    /// Whether lights of this class render arbitrary colors.
    pub fn is_color(&self) -> bool {
        matches!(
            self,
            LightClass::Color | LightClass::ColorAndWhite | LightClass::TemperatureAndColor
        )
    }

    /// Whether lights of this class only render white.
    pub fn is_white_only(&self) -> bool {
        !self.is_color()
    }
}

/// Classify a capability set, picking the richest class it satisfies.
///
/// # Examples
///
/// ```
/// use smart_light_group::{classify, Capabilities, Capability, LightClass};
///
/// assert_eq!(classify(&Capabilities::from([])), LightClass::OnOff);
/// assert_eq!(
///     classify(&Capabilities::from([Capability::Brightness, Capability::ColorTemperature])),
///     LightClass::Temperature,
/// );
/// ```
pub fn classify(capabilities: &Capabilities) -> LightClass {
    let color = capabilities.contains(Capability::HueSaturation);
    let temp = capabilities.contains(Capability::ColorTemperature);
    let white = capabilities.contains(Capability::WhiteValue);

    if color && temp {
        LightClass::TemperatureAndColor
    } else if color && white {
        LightClass::ColorAndWhite
    } else if color {
        LightClass::Color
    } else if temp {
        LightClass::Temperature
    } else if capabilities.contains(Capability::Brightness) {
        LightClass::Dimmable
    } else {
        LightClass::OnOff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_classify_richest_wins() {
        use Capability::*;

        let cases = [
            (vec![], LightClass::OnOff),
            (vec![OnOff], LightClass::OnOff),
            (vec![WhiteValue], LightClass::OnOff),
            (vec![Brightness], LightClass::Dimmable),
            (vec![Brightness, ColorTemperature], LightClass::Temperature),
            (vec![Brightness, HueSaturation], LightClass::Color),
            (vec![Brightness, HueSaturation, WhiteValue], LightClass::ColorAndWhite),
            (
                vec![Brightness, ColorTemperature, HueSaturation, WhiteValue],
                LightClass::TemperatureAndColor,
            ),
        ];

        for (caps, expected) in cases {
            assert_eq!(classify(&Capabilities::from(caps.clone())), expected, "{caps:?}");
        }
    }

    #[test]
    fn test_serde_as_list() {
        let caps: Capabilities = serde_json::from_str(r#"["brightness", "hue_saturation"]"#).unwrap();
        assert!(caps.contains(Capability::OnOff));
        assert!(caps.contains(Capability::Brightness));

        let json = serde_json::to_string(&caps).unwrap();
        assert_eq!(json, r#"["on_off","brightness","hue_saturation"]"#);
    }

    #[test]
    fn test_union_and_display() {
        let a = Capabilities::from([Capability::Brightness]);
        let b = Capabilities::from([Capability::ColorTemperature]);
        assert_eq!(a.union(&b).to_string(), "[on_off, brightness, color_temperature]");
        assert_eq!(Capability::from_str("white_value").unwrap(), Capability::WhiteValue);
    }
}
