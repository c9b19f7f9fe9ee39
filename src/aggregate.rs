//! Combining member states into the state the group reports.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::capability::{Capabilities, Capability, LightClass};
use crate::member::{Member, MiredRange};
use crate::thresholds::Thresholds;
use crate::types::{Brightness, HueSaturation, Mireds, WhiteValue};

/// The state of a group as seen from outside.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AggregatedState {
    pub is_on: bool,
    pub available: bool,
    pub brightness: Option<Brightness>,
    pub hs_color: Option<HueSaturation>,
    pub color_temp: Option<Mireds>,
    pub white_value: Option<WhiteValue>,
    pub effect: Option<String>,
    pub effect_list: Option<Vec<String>>,
    pub min_mireds: Mireds,
    pub max_mireds: Mireds,
    pub capabilities: Capabilities,
    pub entity_ids: Vec<String>,
}

impl Default for AggregatedState {
    fn default() -> Self {
        let range = MiredRange::default();
        AggregatedState {
            is_on: false,
            available: false,
            brightness: None,
            hs_color: None,
            color_temp: None,
            white_value: None,
            effect: None,
            effect_list: None,
            min_mireds: range.min,
            max_mireds: range.max,
            capabilities: Capabilities::default(),
            entity_ids: Vec::new(),
        }
    }
}

/// Compute the group state from its members.
///
/// The result only depends on the members' states, their order and the
/// thresholds.
///
/// # Example
///
/// ```
/// use smart_light_group::{aggregate, Brightness, Member, MemberInfo, MemberState, Thresholds};
///
/// let mut main = Member::new("light.main", MemberInfo::default());
/// main.update_state(MemberState::on(), 1);
///
/// let state = aggregate(&[main], &Thresholds::default());
/// assert!(state.is_on);
/// // On/off lights report an estimate above the non-dimmable bound
/// assert_eq!(state.brightness, Some(Brightness::from(230)));
/// ```
pub fn aggregate(members: &[Member], thresholds: &Thresholds) -> AggregatedState {
    let on: Vec<&Member> = members.iter().filter(|m| m.is_on()).collect();

    let brightness = on
        .iter()
        .filter_map(|m| m.state().brightness)
        .max()
        .or_else(|| {
            on.iter()
                .any(|m| !m.supports(Capability::Brightness))
                .then(|| thresholds.non_dimmable_brightness_estimate())
        });

    // Most recently changed color light reporting a color; the first
    // registered wins ties
    let color_source = on
        .iter()
        .filter(|m| m.class() != LightClass::OnOff && m.class() != LightClass::Dimmable)
        .filter(|m| m.state().hs_color.is_some() || m.state().color_temp.is_some())
        .fold(None::<&Member>, |best, m| match best {
            Some(b) if b.last_changed() >= m.last_changed() => Some(b),
            _ => Some(m),
        });

    let white_values: Vec<u32> = on
        .iter()
        .filter_map(|m| m.state().white_value)
        .map(|w| u32::from(w.value()))
        .collect();
    let white_value = (!white_values.is_empty()).then(|| {
        let sum: u32 = white_values.iter().sum();
        WhiteValue::from((sum as f32 / white_values.len() as f32).round() as u8)
    });

    let effect_list: BTreeSet<&str> = members
        .iter()
        .filter_map(|m| m.state().effect_list.as_ref())
        .flatten()
        .map(String::as_str)
        .collect();

    let ranges: Vec<&MiredRange> = members
        .iter()
        .filter(|m| m.supports(Capability::ColorTemperature))
        .map(Member::mired_range)
        .collect();
    let default_range = MiredRange::default();
    let min_mireds = ranges.iter().map(|r| r.min).min().unwrap_or(default_range.min);
    let max_mireds = ranges.iter().map(|r| r.max).max().unwrap_or(default_range.max);

    AggregatedState {
        is_on: !on.is_empty(),
        available: members.iter().any(Member::is_available),
        brightness,
        hs_color: color_source.and_then(|m| m.state().hs_color),
        color_temp: color_source.and_then(|m| m.state().color_temp),
        white_value,
        effect: most_common_effect(&on),
        effect_list: (!effect_list.is_empty())
            .then(|| effect_list.into_iter().map(str::to_string).collect()),
        min_mireds,
        max_mireds,
        capabilities: members
            .iter()
            .fold(Capabilities::on_off(), |caps, m| caps.union(m.capabilities())),
        entity_ids: members.iter().map(|m| m.id().to_string()).collect(),
    }
}

/// The effect most on members run; the first seen wins ties.
fn most_common_effect(on: &[&Member]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for effect in on.iter().filter_map(|m| m.state().effect.as_deref()) {
        match counts.iter_mut().find(|(e, _)| *e == effect) {
            Some((_, n)) => *n += 1,
            None => counts.push((effect, 1)),
        }
    }
    counts
        .into_iter()
        .fold(None::<(&str, usize)>, |best, (e, n)| match best {
            Some((_, b)) if b >= n => best,
            _ => Some((e, n)),
        })
        .map(|(e, _)| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Decision, GroupCommand};
    use crate::member::MemberInfo;
    use crate::member::MemberState;
    use crate::translate::translate;

    fn member(id: &str, caps: &[Capability], state: MemberState) -> Member {
        Member::new(id, MemberInfo::new(Capabilities::from(caps.to_vec()), state))
    }

    fn hs(hue: f32, saturation: f32) -> HueSaturation {
        HueSaturation::create(hue, saturation).unwrap()
    }

    const COLOR: [Capability; 2] = [Capability::Brightness, Capability::HueSaturation];

    #[test]
    fn test_all_off() {
        let members = vec![
            member("light.a", &[], MemberState::off()),
            member("light.b", &COLOR, MemberState::off()),
        ];
        let state = aggregate(&members, &Thresholds::default());
        assert!(!state.is_on);
        assert!(state.available);
        assert_eq!(state.brightness, None);
        assert_eq!(state.hs_color, None);
        assert_eq!(state.entity_ids, vec!["light.a", "light.b"]);
        assert!(state.capabilities.contains(Capability::HueSaturation));
    }

    #[test]
    fn test_max_brightness_of_on_members() {
        let members = vec![
            member("light.a", &[Capability::Brightness], MemberState::on().with_brightness(Brightness::from(40))),
            member("light.b", &[Capability::Brightness], MemberState::on().with_brightness(Brightness::from(120))),
            member("light.c", &[Capability::Brightness], MemberState::off().with_brightness(Brightness::from(250))),
            member("light.d", &[], MemberState::on()),
        ];
        let state = aggregate(&members, &Thresholds::default());
        assert_eq!(state.brightness, Some(Brightness::from(120)));
    }

    #[test]
    fn test_most_recent_color_wins() {
        let mut a = member("light.a", &COLOR, MemberState::off());
        let mut b = member("light.b", &COLOR, MemberState::off());
        a.update_state(MemberState::on().with_hs_color(hs(10.0, 80.0)), 1);
        b.update_state(MemberState::on().with_hs_color(hs(200.0, 80.0)), 2);

        let state = aggregate(&[a.clone(), b.clone()], &Thresholds::default());
        assert_eq!(state.hs_color, Some(hs(200.0, 80.0)));

        a.update_state(MemberState::on().with_hs_color(hs(90.0, 80.0)), 3);
        let state = aggregate(&[a, b], &Thresholds::default());
        assert_eq!(state.hs_color, Some(hs(90.0, 80.0)));
    }

    #[test]
    fn test_color_tie_goes_to_registration_order() {
        let a = member("light.a", &COLOR, MemberState::on().with_hs_color(hs(10.0, 80.0)));
        let b = member("light.b", &COLOR, MemberState::on().with_hs_color(hs(200.0, 80.0)));
        let state = aggregate(&[a, b], &Thresholds::default());
        assert_eq!(state.hs_color, Some(hs(10.0, 80.0)));
    }

    #[test]
    fn test_color_comes_from_member_reporting_color() {
        let mut a = member("light.a", &COLOR, MemberState::off());
        let mut b = member("light.b", &COLOR, MemberState::off());
        a.update_state(MemberState::on().with_hs_color(hs(10.0, 80.0)), 1);
        // Newer, but reports no color yet
        b.update_state(MemberState::on().with_brightness(Brightness::from(90)), 2);

        let state = aggregate(&[a, b], &Thresholds::default());
        assert_eq!(state.hs_color, Some(hs(10.0, 80.0)));
    }

    #[test]
    fn test_effects() {
        let members = vec![
            member("light.a", &COLOR, MemberState::on().with_effect("random").with_effect_list(&["random", "colorloop"])),
            member("light.b", &COLOR, MemberState::on().with_effect("colorloop").with_effect_list(&["colorloop"])),
            member("light.c", &COLOR, MemberState::on().with_effect("colorloop")),
            member("light.d", &[], MemberState::off().with_effect("random").with_effect_list(&["strobe"])),
        ];
        let state = aggregate(&members, &Thresholds::default());
        assert_eq!(state.effect.as_deref(), Some("colorloop"));
        assert_eq!(
            state.effect_list,
            Some(vec!["colorloop".to_string(), "random".to_string(), "strobe".to_string()])
        );

        // Ties go to the first member running an effect
        let state = aggregate(&members[..2], &Thresholds::default());
        assert_eq!(state.effect.as_deref(), Some("random"));

        let state = aggregate(&[member("light.e", &[], MemberState::on())], &Thresholds::default());
        assert_eq!(state.effect, None);
        assert_eq!(state.effect_list, None);
    }

    #[test]
    fn test_white_value_mean() {
        let caps = [Capability::HueSaturation, Capability::WhiteValue];
        let members = vec![
            member("light.a", &caps, MemberState::on().with_white_value(WhiteValue::from(100))),
            member("light.b", &caps, MemberState::on().with_white_value(WhiteValue::from(201))),
            member("light.c", &caps, MemberState::off().with_white_value(WhiteValue::from(0))),
        ];
        let state = aggregate(&members, &Thresholds::default());
        assert_eq!(state.white_value, Some(WhiteValue::from(151)));
    }

    #[test]
    fn test_mired_range() {
        let thresholds = Thresholds::default();
        let state = aggregate(&[member("light.a", &[], MemberState::off())], &thresholds);
        assert_eq!(state.min_mireds.value(), 153);
        assert_eq!(state.max_mireds.value(), 500);

        let range = MiredRange::create(Mireds::create(200).unwrap(), Mireds::create(454).unwrap()).unwrap();
        let info = MemberInfo::new(Capabilities::from([Capability::ColorTemperature]), MemberState::off())
            .with_mired_range(range);
        let state = aggregate(&[Member::new("light.ct", info)], &thresholds);
        assert_eq!(state.min_mireds.value(), 200);
        assert_eq!(state.max_mireds.value(), 454);
    }

    #[test]
    fn test_unavailable_group() {
        let members = vec![member("light.a", &[], MemberState::unavailable())];
        let state = aggregate(&members, &Thresholds::default());
        assert!(!state.available);
        assert!(!state.is_on);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let members = vec![
            member("light.a", &[], MemberState::on()),
            member("light.b", &COLOR, MemberState::on().with_hs_color(hs(240.0, 90.0))),
        ];
        let thresholds = Thresholds::default();
        assert_eq!(aggregate(&members, &thresholds), aggregate(&members, &thresholds));
    }

    #[test]
    fn test_round_trip_through_members() {
        let thresholds = Thresholds::default();
        let mut members = vec![
            member("light.main", &[], MemberState::off()),
            member("light.dimmer", &[Capability::Brightness], MemberState::off()),
            member("light.hue_lamp", &COLOR, MemberState::off()),
        ];

        let mut command = GroupCommand::from(&hs(30.0, 10.0));
        command.brightness(&Brightness::from(230));
        let translation = translate(&command, &members, &thresholds).unwrap();

        for (sequence, member) in members.iter_mut().enumerate() {
            if let Some(c) = translation.decision(member.id()).and_then(Decision::command) {
                let mut state = member.state().clone();
                state.apply(c);
                member.update_state(state, sequence as u64 + 1);
            }
        }

        let state = aggregate(&members, &thresholds);
        assert!(state.is_on);
        assert!(members.iter().all(Member::is_on));
        assert_eq!(state.brightness, Some(Brightness::from(230)));
        assert_eq!(state.hs_color, Some(hs(30.0, 10.0)));
    }
}
