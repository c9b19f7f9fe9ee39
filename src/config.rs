//! Group configuration as supplied by the host.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::thresholds::Thresholds;

type Result<T> = std::result::Result<T, Error>;

pub const DEFAULT_NAME: &str = "Smart Light Group";

/// Configuration of one light group.
///
/// Every threshold key is optional and falls back to the documented default.
///
/// # Example
///
/// ```
/// use smart_light_group::GroupConfig;
///
/// let config = GroupConfig::from_json(r#"{
///     "name": "Living Room",
///     "entities": ["light.main", "light.hue_lamp"],
///     "lower_bound_brightness_non_dimmable_lights": 180
/// }"#).unwrap();
///
/// assert_eq!(config.name, "Living Room");
/// assert_eq!(config.thresholds.lower_bound_brightness_non_dimmable_lights, 180);
/// assert_eq!(config.thresholds.upper_bound_color_temperature_white_lights, 450);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub entities: Vec<String>,
    #[serde(flatten)]
    pub thresholds: ThresholdConfig,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

impl GroupConfig {
    /// Create a configuration with default thresholds.
    pub fn new(name: &str, entities: &[&str]) -> Self {
        GroupConfig {
            name: name.to_string(),
            entities: entities.iter().map(|e| e.to_string()).collect(),
            thresholds: ThresholdConfig::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::JsonLoad)
    }

    /// Check the entity list and build the validated thresholds.
    pub fn validate(&self) -> Result<Thresholds> {
        if self.entities.is_empty() {
            return Err(Error::configuration("entities", "at least one entity is required"));
        }

        let mut seen = HashSet::new();
        for entity in &self.entities {
            if entity.trim().is_empty() {
                return Err(Error::configuration("entities", "entity ids must not be empty"));
            }
            if !seen.insert(entity.as_str()) {
                return Err(Error::configuration(
                    "entities",
                    format!("{entity} is listed more than once"),
                ));
            }
        }

        Thresholds::from_config(&self.thresholds)
    }
}

/// Raw threshold settings, validated into [`Thresholds`].
///
/// Numeric fields are deliberately wide so that out-of-domain values are
/// reported as configuration errors naming the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub default_brightness: i64,
    pub default_color_temp: i64,
    pub default_hue: f32,
    pub default_saturation: f32,
    pub default_white_value: i64,
    #[serde(alias = "lower_bound_color_temp")]
    pub lower_bound_color_temperature_white_lights: i64,
    #[serde(alias = "upper_bound_color_temp")]
    pub upper_bound_color_temperature_white_lights: i64,
    pub upper_bound_saturation_white_lights: f32,
    pub lower_bound_brightness_non_dimmable_lights: i64,
    pub auto_adapt_white_value: bool,
    pub auto_convert_color_temperature_to_hs: bool,
    // Coefficients of the color temperature <-> hue/saturation mapping
    pub cool_white_hue: f32,
    pub warm_white_hue: f32,
    pub white_saturation_at_bounds: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        ThresholdConfig {
            default_brightness: 255,
            default_color_temp: 320,
            default_hue: 50.0,
            default_saturation: 40.0,
            default_white_value: 255,
            lower_bound_color_temperature_white_lights: 175,
            upper_bound_color_temperature_white_lights: 450,
            upper_bound_saturation_white_lights: 55.0,
            lower_bound_brightness_non_dimmable_lights: 205,
            auto_adapt_white_value: true,
            auto_convert_color_temperature_to_hs: true,
            cool_white_hue: 220.0,
            warm_white_hue: 35.0,
            white_saturation_at_bounds: 40.0,
        }
    }
}
