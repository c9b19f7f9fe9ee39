//! Member lights and their last known state.

use serde::{Deserialize, Serialize};

use crate::capability::{Capabilities, Capability, LightClass};
use crate::command::MemberCommand;
use crate::types::{Brightness, HueSaturation, Mireds, PowerState, WhiteValue};

/// Last known state of a member light, as reported by the host.
///
/// # Examples
///
/// ```
/// use smart_light_group::{Brightness, MemberState};
///
/// let state = MemberState::on().with_brightness(Brightness::from(128));
/// assert!(state.is_on());
/// assert_eq!(state.brightness, Some(Brightness::from(128)));
/// assert!(state.available);
/// ```
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MemberState {
    #[serde(default)]
    pub power: PowerState,
    pub brightness: Option<Brightness>,
    pub color_temp: Option<Mireds>,
    pub hs_color: Option<HueSaturation>,
    pub white_value: Option<WhiteValue>,
    /// Effect currently running, if any
    pub effect: Option<String>,
    /// Effects the light offers
    pub effect_list: Option<Vec<String>>,
    #[serde(default = "available")]
    pub available: bool,
}

fn available() -> bool {
    true
}

impl Default for MemberState {
    fn default() -> Self {
        Self::off()
    }
}

impl MemberState {
    pub fn off() -> Self {
        MemberState {
            power: PowerState::Off,
            brightness: None,
            color_temp: None,
            hs_color: None,
            white_value: None,
            effect: None,
            effect_list: None,
            available: true,
        }
    }

    pub fn on() -> Self {
        MemberState {
            power: PowerState::On,
            ..Self::off()
        }
    }

    /// A member the host currently cannot reach.
    pub fn unavailable() -> Self {
        MemberState {
            available: false,
            ..Self::off()
        }
    }

    pub fn with_brightness(mut self, brightness: Brightness) -> Self {
        self.brightness = Some(brightness);
        self
    }

    pub fn with_color_temp(mut self, color_temp: Mireds) -> Self {
        self.color_temp = Some(color_temp);
        self
    }

    pub fn with_hs_color(mut self, hs_color: HueSaturation) -> Self {
        self.hs_color = Some(hs_color);
        self
    }

    pub fn with_white_value(mut self, white_value: WhiteValue) -> Self {
        self.white_value = Some(white_value);
        self
    }

    pub fn with_effect(mut self, effect: &str) -> Self {
        self.effect = Some(effect.to_string());
        self
    }

    pub fn with_effect_list<S: AsRef<str>>(mut self, effects: &[S]) -> Self {
        self.effect_list = Some(effects.iter().map(|e| e.as_ref().to_string()).collect());
        self
    }

    pub fn is_on(&self) -> bool {
        self.power.is_on()
    }

    /// Drop every field the capabilities do not declare.
    ///
    /// Effects are not a capability and are always kept.
    pub fn restricted_to(mut self, capabilities: &Capabilities) -> Self {
        if !capabilities.contains(Capability::Brightness) {
            self.brightness = None;
        }
        if !capabilities.contains(Capability::ColorTemperature) {
            self.color_temp = None;
        }
        if !capabilities.contains(Capability::HueSaturation) {
            self.hs_color = None;
        }
        if !capabilities.contains(Capability::WhiteValue) {
            self.white_value = None;
        }
        self
    }

    /// Apply a command the way a light would.
    ///
    /// Lets hosts without state reporting track members optimistically.
    ///
    /// # Examples
    ///
    /// ```
    /// use smart_light_group::{Brightness, LightAttributes, MemberCommand, MemberState};
    ///
    /// let mut state = MemberState::off();
    /// let attributes = LightAttributes {
    ///     brightness: Some(Brightness::from(200)),
    ///     ..Default::default()
    /// };
    /// state.apply(&MemberCommand::TurnOn(attributes));
    /// assert!(state.is_on());
    /// assert_eq!(state.brightness, Some(Brightness::from(200)));
    ///
    /// state.apply(&MemberCommand::TurnOff { transition: None });
    /// assert!(!state.is_on());
    /// ```
    pub fn apply(&mut self, command: &MemberCommand) {
        match command {
            MemberCommand::TurnOn(attributes) => {
                self.power = PowerState::On;
                if let Some(brightness) = attributes.brightness {
                    self.brightness = Some(brightness);
                }
                if let Some(temp) = attributes.color_temp {
                    self.color_temp = Some(temp);
                    self.hs_color = None;
                }
                if let Some(hs) = attributes.hs_color {
                    self.hs_color = Some(hs);
                    self.color_temp = None;
                }
                if let Some(white) = attributes.white_value {
                    self.white_value = Some(white);
                }
            }
            MemberCommand::TurnOff { .. } => self.power = PowerState::Off,
        }
    }
}

/// Supported color temperature range of a member, in mireds.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct MiredRange {
    pub min: Mireds,
    pub max: Mireds,
}

impl Default for MiredRange {
    fn default() -> Self {
        MiredRange {
            min: Mireds { mireds: Self::DEFAULT_MIN },
            max: Mireds { mireds: Self::DEFAULT_MAX },
        }
    }
}

impl MiredRange {
    pub const DEFAULT_MIN: u16 = 153;
    pub const DEFAULT_MAX: u16 = 500;

    /// Returns None if `min` is above `max`.
    pub fn create(min: Mireds, max: Mireds) -> Option<Self> {
        if min <= max {
            Some(MiredRange { min, max })
        } else {
            None
        }
    }

    pub fn clamp(&self, temp: Mireds) -> Mireds {
        temp.clamp(self.min, self.max)
    }
}

/// What the host knows about a light when the group is built.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct MemberInfo {
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub state: MemberState,
    pub mired_range: Option<MiredRange>,
}

impl MemberInfo {
    pub fn new(capabilities: Capabilities, state: MemberState) -> Self {
        MemberInfo {
            capabilities,
            state,
            mired_range: None,
        }
    }

    pub fn with_mired_range(mut self, range: MiredRange) -> Self {
        self.mired_range = Some(range);
        self
    }
}

/// A light belonging to a group.
///
/// The light is classified once, when it is registered. Afterwards only its
/// state changes.
///
/// # Example
///
/// ```
/// use smart_light_group::{Capabilities, Capability, LightClass, Member, MemberInfo, MemberState};
///
/// let info = MemberInfo::new(
///     Capabilities::from([Capability::Brightness, Capability::HueSaturation]),
///     MemberState::off(),
/// );
/// let member = Member::new("light.hue_lamp", info);
/// assert_eq!(member.id(), "light.hue_lamp");
/// assert_eq!(member.class(), LightClass::Color);
/// ```
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Member {
    id: String,
    capabilities: Capabilities,
    class: LightClass,
    mired_range: MiredRange,
    state: MemberState,
    #[serde(skip)]
    last_changed: u64,
}

impl Member {
    pub fn new(id: &str, info: MemberInfo) -> Self {
        let capabilities = info.capabilities;
        Member {
            id: id.to_string(),
            capabilities,
            class: capabilities.classify(),
            mired_range: info.mired_range.unwrap_or_default(),
            state: info.state.restricted_to(&capabilities),
            last_changed: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn class(&self) -> LightClass {
        self.class
    }

    pub fn mired_range(&self) -> &MiredRange {
        &self.mired_range
    }

    pub fn state(&self) -> &MemberState {
        &self.state
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn is_on(&self) -> bool {
        self.state.is_on()
    }

    pub fn is_available(&self) -> bool {
        self.state.available
    }

    /// Sequence number of the last state change; higher is more recent.
    pub fn last_changed(&self) -> u64 {
        self.last_changed
    }

    /// Replace the state with a new report.
    ///
    /// Returns `true` if anything changed. Fields for undeclared capabilities
    /// are dropped.
    pub fn update_state(&mut self, state: MemberState, sequence: u64) -> bool {
        let state = state.restricted_to(&self.capabilities);
        if self.state == state {
            return false;
        }
        self.state = state;
        self.last_changed = sequence;
        true
    }
}
