//! Crossover thresholds and fallback values of a group.

use serde::Serialize;

use crate::config::ThresholdConfig;
use crate::errors::Error;
use crate::types::{Brightness, HueSaturation, Mireds, WhiteValue};

type Result<T> = std::result::Result<T, Error>;

/// Coefficients of the linear color temperature <-> hue/saturation mapping.
///
/// The midpoint of the white temperature bounds maps to saturation 0. Toward
/// the cool bound the hue is `cool_hue`, toward the warm bound `warm_hue`,
/// and the saturation grows linearly up to `saturation_at_bounds`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemperatureMapping {
    pub cool_hue: f32,
    pub warm_hue: f32,
    pub saturation_at_bounds: f32,
}

/// Validated, immutable thresholds and defaults of one group.
///
/// Constructed once per group and handed to translation and aggregation by
/// reference.
///
/// # Example
///
/// ```
/// use smart_light_group::{Brightness, Thresholds};
///
/// let thresholds = Thresholds::default();
/// assert!(thresholds.non_dimmable_on(&Brightness::from(230)));
/// assert!(!thresholds.non_dimmable_on(&Brightness::from(26)));
/// assert!(thresholds.is_white_saturation(5.0));
/// assert!(!thresholds.is_white_saturation(90.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thresholds {
    default_brightness: Brightness,
    default_color_temp: Mireds,
    default_hs_color: HueSaturation,
    default_white_value: WhiteValue,
    lower_bound_color_temp: Mireds,
    upper_bound_color_temp: Mireds,
    upper_bound_saturation_white_lights: f32,
    lower_bound_brightness_non_dimmable_lights: Brightness,
    auto_adapt_white_value: bool,
    auto_convert_color_temperature_to_hs: bool,
    temperature_mapping: TemperatureMapping,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            default_brightness: Brightness::from(255),
            default_color_temp: Mireds { mireds: 320 },
            default_hs_color: HueSaturation::create(50.0, 40.0).unwrap_or_default(),
            default_white_value: WhiteValue::from(255),
            lower_bound_color_temp: Mireds { mireds: 175 },
            upper_bound_color_temp: Mireds { mireds: 450 },
            upper_bound_saturation_white_lights: 55.0,
            lower_bound_brightness_non_dimmable_lights: Brightness::from(205),
            auto_adapt_white_value: true,
            auto_convert_color_temperature_to_hs: true,
            temperature_mapping: TemperatureMapping {
                cool_hue: 220.0,
                warm_hue: 35.0,
                saturation_at_bounds: 40.0,
            },
        }
    }
}

impl Thresholds {
    /// Validate raw settings.
    ///
    /// Fails with [`Error::Configuration`] naming the first offending key.
    pub fn from_config(config: &ThresholdConfig) -> Result<Self> {
        let default_brightness = byte("default_brightness", config.default_brightness)?;
        let default_white_value = byte("default_white_value", config.default_white_value)?;
        let default_color_temp = mireds("default_color_temp", config.default_color_temp)?;

        let default_hue = hue("default_hue", config.default_hue)?;
        let default_saturation = saturation("default_saturation", config.default_saturation)?;
        let default_hs_color = HueSaturation::create(default_hue, default_saturation)
            .ok_or_else(|| Error::configuration("default_hue", "invalid hue/saturation pair"))?;

        let lower_bound_color_temp = mireds(
            "lower_bound_color_temperature_white_lights",
            config.lower_bound_color_temperature_white_lights,
        )?;
        let upper_bound_color_temp = mireds(
            "upper_bound_color_temperature_white_lights",
            config.upper_bound_color_temperature_white_lights,
        )?;
        if lower_bound_color_temp >= upper_bound_color_temp {
            return Err(Error::configuration(
                "lower_bound_color_temperature_white_lights",
                format!(
                    "must be below the upper bound ({} >= {})",
                    lower_bound_color_temp.value(),
                    upper_bound_color_temp.value()
                ),
            ));
        }

        let upper_bound_saturation_white_lights = saturation(
            "upper_bound_saturation_white_lights",
            config.upper_bound_saturation_white_lights,
        )?;
        let lower_bound_brightness_non_dimmable_lights = byte(
            "lower_bound_brightness_non_dimmable_lights",
            config.lower_bound_brightness_non_dimmable_lights,
        )?;

        let cool_hue = hue("cool_white_hue", config.cool_white_hue)?;
        let warm_hue = hue("warm_white_hue", config.warm_white_hue)?;
        let saturation_at_bounds =
            saturation("white_saturation_at_bounds", config.white_saturation_at_bounds)?;
        if saturation_at_bounds <= 0.0 || saturation_at_bounds > upper_bound_saturation_white_lights
        {
            return Err(Error::configuration(
                "white_saturation_at_bounds",
                format!(
                    "must be above 0 and at most upper_bound_saturation_white_lights ({upper_bound_saturation_white_lights})"
                ),
            ));
        }

        Ok(Thresholds {
            default_brightness: Brightness::from(default_brightness),
            default_color_temp,
            default_hs_color,
            default_white_value: WhiteValue::from(default_white_value),
            lower_bound_color_temp,
            upper_bound_color_temp,
            upper_bound_saturation_white_lights,
            lower_bound_brightness_non_dimmable_lights: Brightness::from(
                lower_bound_brightness_non_dimmable_lights,
            ),
            auto_adapt_white_value: config.auto_adapt_white_value,
            auto_convert_color_temperature_to_hs: config.auto_convert_color_temperature_to_hs,
            temperature_mapping: TemperatureMapping {
                cool_hue,
                warm_hue,
                saturation_at_bounds,
            },
        })
    }

    pub fn default_brightness(&self) -> Brightness {
        self.default_brightness
    }

    pub fn default_color_temp(&self) -> Mireds {
        self.default_color_temp
    }

    pub fn default_hs_color(&self) -> HueSaturation {
        self.default_hs_color
    }

    pub fn default_white_value(&self) -> WhiteValue {
        self.default_white_value
    }

    pub fn lower_bound_color_temp(&self) -> Mireds {
        self.lower_bound_color_temp
    }

    pub fn upper_bound_color_temp(&self) -> Mireds {
        self.upper_bound_color_temp
    }

    pub fn upper_bound_saturation_white_lights(&self) -> f32 {
        self.upper_bound_saturation_white_lights
    }

    pub fn lower_bound_brightness_non_dimmable_lights(&self) -> Brightness {
        self.lower_bound_brightness_non_dimmable_lights
    }

    pub fn auto_adapt_white_value(&self) -> bool {
        self.auto_adapt_white_value
    }

    pub fn auto_convert_color_temperature_to_hs(&self) -> bool {
        self.auto_convert_color_temperature_to_hs
    }

    pub fn temperature_mapping(&self) -> &TemperatureMapping {
        &self.temperature_mapping
    }

    /// Whether a color of this saturation is white enough for white lights.
    pub fn is_white_saturation(&self, saturation: f32) -> bool {
        saturation <= self.upper_bound_saturation_white_lights
    }

    /// Whether a color temperature lies within the white bounds.
    pub fn is_white_temperature(&self, temp: &Mireds) -> bool {
        (self.lower_bound_color_temp..=self.upper_bound_color_temp).contains(temp)
    }

    /// Whether a non-dimmable light should be on at this group brightness.
    pub fn non_dimmable_on(&self, brightness: &Brightness) -> bool {
        *brightness >= self.lower_bound_brightness_non_dimmable_lights
    }

    /// Brightness reported for an on/off-only light that is on.
    ///
    /// Halfway between the non-dimmable bound and full brightness, so that
    /// feeding it back through [`Thresholds::non_dimmable_on`] keeps the
    /// light on.
    pub fn non_dimmable_brightness_estimate(&self) -> Brightness {
        let lower = u16::from(self.lower_bound_brightness_non_dimmable_lights.value());
        Brightness::from(((lower + u16::from(Brightness::MAX)) / 2) as u8)
    }
}

fn byte(field: &str, value: i64) -> Result<u8> {
    u8::try_from(value)
        .map_err(|_| Error::configuration(field, format!("{value} is outside 0..=255")))
}

fn mireds(field: &str, value: i64) -> Result<Mireds> {
    u16::try_from(value)
        .ok()
        .and_then(Mireds::create)
        .ok_or_else(|| Error::configuration(field, format!("{value} is not a positive mired value")))
}

fn hue(field: &str, value: f32) -> Result<f32> {
    if HueSaturation::is_valid_hue(value) {
        Ok(value)
    } else {
        Err(Error::configuration(field, format!("{value} is outside 0..=360")))
    }
}

fn saturation(field: &str, value: f32) -> Result<f32> {
    if HueSaturation::is_valid_saturation(value) {
        Ok(value)
    } else {
        Err(Error::configuration(field, format!("{value} is outside 0..=100")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_default_thresholds() {
        let thresholds = Thresholds::from_config(&ThresholdConfig::default()).unwrap();
        assert_eq!(thresholds, Thresholds::default());
    }

    #[test]
    fn test_inverted_color_temp_bounds() {
        let config = ThresholdConfig {
            lower_bound_color_temperature_white_lights: 450,
            upper_bound_color_temperature_white_lights: 175,
            ..Default::default()
        };
        assert!(matches!(
            Thresholds::from_config(&config),
            Err(Error::Configuration { ref field, .. })
                if field == "lower_bound_color_temperature_white_lights"
        ));

        let equal = ThresholdConfig {
            lower_bound_color_temperature_white_lights: 300,
            upper_bound_color_temperature_white_lights: 300,
            ..Default::default()
        };
        assert!(Thresholds::from_config(&equal).is_err());
    }

    #[test]
    fn test_defaults_out_of_domain() {
        let cases = [
            (
                ThresholdConfig { default_brightness: 256, ..Default::default() },
                "default_brightness",
            ),
            (
                ThresholdConfig { default_white_value: -1, ..Default::default() },
                "default_white_value",
            ),
            (
                ThresholdConfig { default_hue: 361.0, ..Default::default() },
                "default_hue",
            ),
            (
                ThresholdConfig { default_saturation: 100.5, ..Default::default() },
                "default_saturation",
            ),
            (
                ThresholdConfig { default_color_temp: 0, ..Default::default() },
                "default_color_temp",
            ),
            (
                ThresholdConfig { upper_bound_saturation_white_lights: 120.0, ..Default::default() },
                "upper_bound_saturation_white_lights",
            ),
            (
                ThresholdConfig {
                    lower_bound_brightness_non_dimmable_lights: 300,
                    ..Default::default()
                },
                "lower_bound_brightness_non_dimmable_lights",
            ),
            (
                ThresholdConfig { white_saturation_at_bounds: 60.0, ..Default::default() },
                "white_saturation_at_bounds",
            ),
        ];

        for (config, expected_field) in cases {
            match Thresholds::from_config(&config) {
                Err(Error::Configuration { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("expected configuration error for {expected_field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_crossover_helpers() {
        let thresholds = Thresholds::default();
        assert!(thresholds.non_dimmable_on(&Brightness::from(205)));
        assert!(!thresholds.non_dimmable_on(&Brightness::from(204)));
        assert!(thresholds.is_white_saturation(55.0));
        assert!(!thresholds.is_white_saturation(55.1));
        assert!(thresholds.is_white_temperature(&Mireds { mireds: 175 }));
        assert!(thresholds.is_white_temperature(&Mireds { mireds: 450 }));
        assert!(!thresholds.is_white_temperature(&Mireds { mireds: 153 }));
        assert_eq!(thresholds.non_dimmable_brightness_estimate().value(), 230);
    }
}
