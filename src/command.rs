//! Group commands and the per-member commands they are translated into.

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::thresholds::Thresholds;
use crate::types::{Brightness, HueSaturation, Mireds, PowerState, WhiteValue};

type Result<T> = std::result::Result<T, Error>;

/// A state change requested for the whole group.
///
/// Commands can combine several attributes. Any command that does not
/// switch the group off is a "turn on" request for the attributes it sets.
///
/// # Creating Commands
///
/// 1. **From a single attribute** using the [`From`] trait:
///    ```
///    use smart_light_group::{GroupCommand, Brightness};
///    let command = GroupCommand::from(&Brightness::from(230));
///    assert!(command.is_valid());
///    ```
///
/// 2. **Builder pattern** for combining multiple attributes:
///    ```
///    use smart_light_group::{GroupCommand, Brightness, HueSaturation};
///    let mut command = GroupCommand::new();
///    command.brightness(&Brightness::from(128));
///    command.hs_color(&HueSaturation::create(240.0, 90.0).unwrap());
///    assert!(command.is_valid());
///    ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GroupCommand {
    pub(crate) power: Option<PowerState>,
    pub(crate) brightness: Option<Brightness>,
    pub(crate) color_temp: Option<Mireds>,
    pub(crate) hs_color: Option<HueSaturation>,
    pub(crate) white_value: Option<WhiteValue>,
    /// Transition time in seconds, passed through to member commands
    pub(crate) transition: Option<f32>,
}

/// How a command's color relates to white-only lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whiteness {
    /// The command sets no color at all
    Unspecified,
    /// The color is close enough to white for white lights to join in
    White,
    /// The color is too saturated (or too far off the white temperatures)
    Colored,
}

impl GroupCommand {
    /// Create a new empty command.
    ///
    /// At least one attribute must be set for the command to be routable.
    ///
    /// # Examples
    ///
    /// ```
    /// use smart_light_group::GroupCommand;
    ///
    /// let command = GroupCommand::new();
    /// assert_eq!(command.is_valid(), false);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turn_on() -> Self {
        Self::from(&PowerState::On)
    }

    pub fn turn_off() -> Self {
        Self::from(&PowerState::Off)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::JsonLoad)
    }

    /// Check if this command carries at least one routable attribute.
    ///
    /// A transition alone is not routable; it only modifies other attributes.
    ///
    /// # Examples
    ///
    /// ```
    /// use smart_light_group::{GroupCommand, WhiteValue};
    ///
    /// let mut command = GroupCommand::new();
    /// command.transition(2.0);
    /// assert_eq!(command.is_valid(), false);
    ///
    /// command.white_value(&WhiteValue::from(100));
    /// assert_eq!(command.is_valid(), true);
    /// ```
    pub fn is_valid(&self) -> bool {
        self.power.is_some()
            || self.brightness.is_some()
            || self.color_temp.is_some()
            || self.hs_color.is_some()
            || self.white_value.is_some()
    }

    /// Set the power state.
    pub fn power(&mut self, power: &PowerState) {
        self.power = Some(*power);
    }

    /// Set the brightness level.
    pub fn brightness(&mut self, brightness: &Brightness) {
        self.brightness = Some(*brightness);
    }

    /// Set the color temperature.
    pub fn color_temp(&mut self, temp: &Mireds) {
        self.color_temp = Some(*temp);
    }

    /// Set the color using hue and saturation.
    pub fn hs_color(&mut self, hs: &HueSaturation) {
        self.hs_color = Some(*hs);
    }

    /// Set the white channel level.
    pub fn white_value(&mut self, white: &WhiteValue) {
        self.white_value = Some(*white);
    }

    /// Set the transition time in seconds.
    pub fn transition(&mut self, seconds: f32) {
        self.transition = Some(seconds);
    }

    pub fn get_power(&self) -> Option<PowerState> {
        self.power
    }

    pub fn get_brightness(&self) -> Option<Brightness> {
        self.brightness
    }

    pub fn get_color_temp(&self) -> Option<Mireds> {
        self.color_temp
    }

    pub fn get_hs_color(&self) -> Option<HueSaturation> {
        self.hs_color
    }

    pub fn get_white_value(&self) -> Option<WhiteValue> {
        self.white_value
    }

    pub fn get_transition(&self) -> Option<f32> {
        self.transition
    }

    /// Whether this command switches the group off.
    pub fn is_off(&self) -> bool {
        self.power == Some(PowerState::Off)
    }

    /// Judge the command's color against the white thresholds.
    ///
    /// Hue/saturation is primary when both color models are set.
    ///
    /// # Examples
    ///
    /// ```
    /// use smart_light_group::{GroupCommand, HueSaturation, Thresholds, Whiteness};
    ///
    /// let thresholds = Thresholds::default();
    /// let blue = GroupCommand::from(&HueSaturation::create(240.0, 90.0).unwrap());
    /// let white = GroupCommand::from(&HueSaturation::create(0.0, 5.0).unwrap());
    ///
    /// assert_eq!(blue.whiteness(&thresholds), Whiteness::Colored);
    /// assert_eq!(white.whiteness(&thresholds), Whiteness::White);
    /// assert_eq!(GroupCommand::turn_on().whiteness(&thresholds), Whiteness::Unspecified);
    /// ```
    pub fn whiteness(&self, thresholds: &Thresholds) -> Whiteness {
        let white = match (&self.hs_color, &self.color_temp) {
            (Some(hs), _) => thresholds.is_white_saturation(hs.saturation()),
            (None, Some(temp)) => thresholds.is_white_temperature(temp),
            (None, None) => return Whiteness::Unspecified,
        };
        if white {
            Whiteness::White
        } else {
            Whiteness::Colored
        }
    }
}

impl From<&PowerState> for GroupCommand {
    fn from(power: &PowerState) -> Self {
        let mut c = GroupCommand::new();
        c.power(power);
        c
    }
}

impl From<&Brightness> for GroupCommand {
    fn from(brightness: &Brightness) -> Self {
        let mut c = GroupCommand::new();
        c.brightness(brightness);
        c
    }
}

impl From<&Mireds> for GroupCommand {
    fn from(temp: &Mireds) -> Self {
        let mut c = GroupCommand::new();
        c.color_temp(temp);
        c
    }
}

impl From<&HueSaturation> for GroupCommand {
    fn from(hs: &HueSaturation) -> Self {
        let mut c = GroupCommand::new();
        c.hs_color(hs);
        c
    }
}

impl From<&WhiteValue> for GroupCommand {
    fn from(white: &WhiteValue) -> Self {
        let mut c = GroupCommand::new();
        c.white_value(white);
        c
    }
}

/// Attributes of a turn-on command sent to one member.
///
/// Only attributes the member declares are ever set.
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LightAttributes {
    pub brightness: Option<Brightness>,
    pub color_temp: Option<Mireds>,
    pub hs_color: Option<HueSaturation>,
    pub white_value: Option<WhiteValue>,
    pub transition: Option<f32>,
}

/// A command for a single member light.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum MemberCommand {
    TurnOn(LightAttributes),
    TurnOff {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        transition: Option<f32>,
    },
}

impl MemberCommand {
    pub fn is_on(&self) -> bool {
        matches!(self, MemberCommand::TurnOn(_))
    }

    /// Attributes of a turn-on command.
    pub fn attributes(&self) -> Option<&LightAttributes> {
        match self {
            MemberCommand::TurnOn(attributes) => Some(attributes),
            MemberCommand::TurnOff { .. } => None,
        }
    }
}

/// The outcome of translating a group command for one member.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Send this command to the member
    Forward(MemberCommand),
    /// Leave the member untouched
    Suppress,
}

impl Decision {
    pub fn command(&self) -> Option<&MemberCommand> {
        match self {
            Decision::Forward(command) => Some(command),
            Decision::Suppress => None,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Decision::Suppress)
    }

    /// Whether this decision switches the member on.
    pub fn turns_on(&self) -> bool {
        self.command().is_some_and(MemberCommand::is_on)
    }

    /// Whether this decision switches the member off.
    pub fn turns_off(&self) -> bool {
        self.command().is_some_and(|c| !c.is_on())
    }
}
