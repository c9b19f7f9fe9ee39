//! Routing of group commands to member lights.
//!
//! A group command is translated into one [`Decision`] per member, based on
//! the member's [`LightClass`]. White-only lights join in for white colors
//! and stay out of saturated ones; color lights get whatever color model
//! they understand; lights being switched on get default values for every
//! attribute the command leaves open.
//!
//! All decisions are computed before anything is dispatched.

use log::debug;
use serde::Serialize;

use crate::capability::{Capability, LightClass};
use crate::command::{Decision, GroupCommand, LightAttributes, MemberCommand, Whiteness};
use crate::convert::{color_temperature_to_hs, hs_to_color_temperature, white_value_for};
use crate::errors::Error;
use crate::member::Member;
use crate::thresholds::Thresholds;
use crate::types::{Brightness, HueSaturation, WhiteValue};

type Result<T> = std::result::Result<T, Error>;

/// Per-member decisions for one group command, in member order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Translation {
    decisions: Vec<(String, Decision)>,
}

impl Translation {
    /// Get the decision for a member.
    pub fn decision(&self, member_id: &str) -> Option<&Decision> {
        self.decisions
            .iter()
            .find(|(id, _)| id == member_id)
            .map(|(_, decision)| decision)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Decision)> {
        self.decisions.iter().map(|(id, d)| (id.as_str(), d))
    }

    /// Commands that have to be dispatched.
    pub fn forwarded(&self) -> impl Iterator<Item = (&str, &MemberCommand)> {
        self.iter()
            .filter_map(|(id, decision)| decision.command().map(|command| (id, command)))
    }

    pub fn forwarded_count(&self) -> usize {
        self.forwarded().count()
    }

    pub fn suppressed_count(&self) -> usize {
        self.decisions.len() - self.forwarded_count()
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

/// Translate a group command into a decision for every member.
///
/// Fails with [`Error::UnroutableCommand`] if the command sets no routable
/// attribute. Otherwise every member gets a decision, possibly
/// [`Decision::Suppress`].
///
/// # Example
///
/// ```
/// use smart_light_group::{
///     translate, Capabilities, Capability, Decision, GroupCommand, HueSaturation, Member,
///     MemberInfo, MemberState, Thresholds,
/// };
///
/// let members = vec![
///     Member::new("light.main", MemberInfo::default()),
///     Member::new(
///         "light.hue_lamp",
///         MemberInfo::new(
///             Capabilities::from([Capability::Brightness, Capability::HueSaturation]),
///             MemberState::off(),
///         ),
///     ),
/// ];
///
/// let blue = GroupCommand::from(&HueSaturation::create(240.0, 90.0).unwrap());
/// let translation = translate(&blue, &members, &Thresholds::default()).unwrap();
///
/// assert_eq!(translation.decision("light.main"), Some(&Decision::Suppress));
/// assert!(translation.decision("light.hue_lamp").unwrap().turns_on());
/// ```
pub fn translate(
    command: &GroupCommand,
    members: &[Member],
    thresholds: &Thresholds,
) -> Result<Translation> {
    if !command.is_valid() {
        return Err(Error::UnroutableCommand);
    }

    let router = Router::new(command, thresholds);
    let decisions = members
        .iter()
        .map(|member| {
            let decision = router.decide(member);
            debug!(
                "{} ({}): {:?} -> {:?}",
                member.id(),
                member.class(),
                command,
                decision
            );
            (member.id().to_string(), decision)
        })
        .collect();

    Ok(Translation { decisions })
}

struct Router<'a> {
    command: &'a GroupCommand,
    thresholds: &'a Thresholds,
    whiteness: Whiteness,
}

impl<'a> Router<'a> {
    fn new(command: &'a GroupCommand, thresholds: &'a Thresholds) -> Self {
        Router {
            command,
            thresholds,
            whiteness: command.whiteness(thresholds),
        }
    }

    fn decide(&self, member: &Member) -> Decision {
        // Off reaches every member, reachable or not. Brightness 0 is off
        // for every class.
        if self.command.is_off() || self.command.brightness.is_some_and(|b| b.is_off()) {
            return self.off();
        }

        if !member.is_available() {
            return Decision::Suppress;
        }

        let decision = match member.class() {
            LightClass::OnOff => self.on_off(member),
            LightClass::Dimmable => self.dimmable(member),
            LightClass::Temperature => self.temperature(member),
            LightClass::Color | LightClass::ColorAndWhite => self.color(member),
            LightClass::TemperatureAndColor => self.temperature_and_color(member),
        };

        match decision {
            Decision::Forward(MemberCommand::TurnOn(attributes)) => {
                Decision::Forward(MemberCommand::TurnOn(restrict(attributes, member)))
            }
            other => other,
        }
    }

    fn off(&self) -> Decision {
        Decision::Forward(MemberCommand::TurnOff {
            transition: self.command.transition,
        })
    }

    fn on(&self, attributes: LightAttributes) -> Decision {
        Decision::Forward(MemberCommand::TurnOn(LightAttributes {
            transition: self.command.transition,
            ..attributes
        }))
    }

    // A colored command never lights up a white-only light. One that is
    // already on goes dark so the group shows the color alone.
    fn stand_down(&self, member: &Member) -> Decision {
        if member.is_on() {
            self.off()
        } else {
            Decision::Suppress
        }
    }

    fn on_off(&self, member: &Member) -> Decision {
        if self.whiteness == Whiteness::Colored {
            return self.stand_down(member);
        }
        match self.command.brightness {
            Some(b) if !self.thresholds.non_dimmable_on(&b) => self.off(),
            _ => self.on(LightAttributes::default()),
        }
    }

    // A hue/saturation above the white bound. Color temperatures never
    // count here; dimmable and tunable lights take any of them.
    fn is_saturated(&self) -> bool {
        self.command
            .hs_color
            .is_some_and(|hs| !self.thresholds.is_white_saturation(hs.saturation()))
    }

    fn dimmable(&self, member: &Member) -> Decision {
        if self.is_saturated() {
            return self.stand_down(member);
        }
        self.on(LightAttributes {
            brightness: self.brightness_for(member),
            ..Default::default()
        })
    }

    fn temperature(&self, member: &Member) -> Decision {
        if self.is_saturated() {
            return self.stand_down(member);
        }

        let converted = || {
            self.command
                .hs_color
                .filter(|_| self.thresholds.auto_convert_color_temperature_to_hs())
                .and_then(|hs| hs_to_color_temperature(&hs, self.thresholds))
        };
        let color_temp = self
            .command
            .color_temp
            .or_else(converted)
            .or_else(|| self.default_when_off(member, self.thresholds.default_color_temp()))
            .map(|temp| member.mired_range().clamp(temp));

        self.on(LightAttributes {
            brightness: self.brightness_for(member),
            color_temp,
            ..Default::default()
        })
    }

    fn color(&self, member: &Member) -> Decision {
        let brightness = self.brightness_for(member);
        let auto_convert = self.thresholds.auto_convert_color_temperature_to_hs();

        let (hs_color, color_changed) = match (self.command.hs_color, self.command.color_temp) {
            (Some(hs), _) => (Some(hs), true),
            (None, Some(temp)) if auto_convert => {
                (Some(color_temperature_to_hs(&temp, self.thresholds)), true)
            }
            _ => (
                self.default_when_off(member, self.thresholds.default_hs_color()),
                false,
            ),
        };

        let white_value = self.white_value_for(member, hs_color, brightness, color_changed);
        self.on(LightAttributes {
            brightness,
            hs_color,
            white_value,
            ..Default::default()
        })
    }

    fn temperature_and_color(&self, member: &Member) -> Decision {
        let brightness = self.brightness_for(member);

        let (hs_color, color_temp, color_changed) =
            match (self.command.hs_color, self.command.color_temp) {
                (Some(hs), _) => (Some(hs), None, true),
                (None, Some(temp)) => (None, Some(member.mired_range().clamp(temp)), true),
                _ => (
                    None,
                    self.default_when_off(member, self.thresholds.default_color_temp())
                        .map(|temp| member.mired_range().clamp(temp)),
                    false,
                ),
            };

        let color = hs_color.or_else(|| {
            color_temp.map(|temp| color_temperature_to_hs(&temp, self.thresholds))
        });
        let white_value = self.white_value_for(member, color, brightness, color_changed);

        self.on(LightAttributes {
            brightness,
            color_temp,
            hs_color,
            white_value,
            ..Default::default()
        })
    }

    // The command's brightness, or the default when the light is being
    // switched on without one.
    fn brightness_for(&self, member: &Member) -> Option<Brightness> {
        self.command
            .brightness
            .or_else(|| self.default_when_off(member, self.thresholds.default_brightness()))
    }

    fn white_value_for(
        &self,
        member: &Member,
        color: Option<HueSaturation>,
        brightness: Option<Brightness>,
        color_changed: bool,
    ) -> Option<WhiteValue> {
        if !member.supports(Capability::WhiteValue) {
            return None;
        }
        if let Some(white) = self.command.white_value {
            return Some(white);
        }

        let adapt = self.thresholds.auto_adapt_white_value()
            && (color_changed || self.command.brightness.is_some());
        if adapt {
            let color = color.or(member.state().hs_color);
            if let Some(color) = color {
                let level = brightness
                    .or(member.state().brightness)
                    .unwrap_or_else(|| self.thresholds.default_brightness());
                return Some(white_value_for(&color, &level, self.thresholds));
            }
        }

        self.default_when_off(member, self.thresholds.default_white_value())
    }

    fn default_when_off<T>(&self, member: &Member, value: T) -> Option<T> {
        (!member.is_on()).then_some(value)
    }
}

// Strip attributes the member does not declare.
fn restrict(mut attributes: LightAttributes, member: &Member) -> LightAttributes {
    if !member.supports(Capability::Brightness) {
        attributes.brightness = None;
    }
    if !member.supports(Capability::ColorTemperature) {
        attributes.color_temp = None;
    }
    if !member.supports(Capability::HueSaturation) {
        attributes.hs_color = None;
    }
    if !member.supports(Capability::WhiteValue) {
        attributes.white_value = None;
    }
    attributes
}
