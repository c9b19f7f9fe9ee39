//! Color conversions used when routing commands to lights that cannot
//! render the requested color model.
//!
//! Everything here is a pure function of its arguments and the group's
//! [`Thresholds`].

use crate::thresholds::Thresholds;
use crate::types::{Brightness, HueSaturation, Mireds, WhiteValue};

/// Map a color temperature onto an equivalent hue/saturation pair.
///
/// The temperature is clamped into the white bounds first. The midpoint of
/// the bounds is pure white (saturation 0); saturation grows linearly toward
/// either bound, with the cool hue below the midpoint and the warm hue above.
///
/// # Examples
///
/// ```
/// use smart_light_group::{color_temperature_to_hs, Mireds, Thresholds};
///
/// let thresholds = Thresholds::default();
///
/// // Coolest white bound: cool hue at full mapping saturation
/// let cool = color_temperature_to_hs(&Mireds::create(175).unwrap(), &thresholds);
/// assert_eq!(cool.hue(), 220.0);
/// assert_eq!(cool.saturation(), 40.0);
///
/// // Warmer than the warm bound is clamped
/// let warm = color_temperature_to_hs(&Mireds::create(500).unwrap(), &thresholds);
/// assert_eq!(warm.hue(), 35.0);
/// assert_eq!(warm.saturation(), 40.0);
/// ```
pub fn color_temperature_to_hs(temp: &Mireds, thresholds: &Thresholds) -> HueSaturation {
    let (mid, half) = white_span(thresholds);
    let mapping = thresholds.temperature_mapping();

    let lower = f32::from(thresholds.lower_bound_color_temp().value());
    let upper = f32::from(thresholds.upper_bound_color_temp().value());
    let t = f32::from(temp.value()).clamp(lower, upper);

    let (hue, offset) = if t < mid {
        (mapping.cool_hue, mid - t)
    } else {
        (mapping.warm_hue, t - mid)
    };
    let saturation = (offset / half * mapping.saturation_at_bounds)
        .clamp(0.0, HueSaturation::MAX_SATURATION);

    HueSaturation::create(hue, saturation).unwrap_or_default()
}

/// Map a hue/saturation pair back onto a color temperature.
///
/// Inverse of [`color_temperature_to_hs`]. Returns `None` when the color is
/// too saturated to count as white; saturations beyond the mapping's edge
/// saturation land on the nearest bound.
pub fn hs_to_color_temperature(hs: &HueSaturation, thresholds: &Thresholds) -> Option<Mireds> {
    if !thresholds.is_white_saturation(hs.saturation()) {
        return None;
    }

    let (mid, half) = white_span(thresholds);
    let mapping = thresholds.temperature_mapping();

    let fraction = (hs.saturation() / mapping.saturation_at_bounds).min(1.0);
    let toward_cool =
        hue_distance(hs.hue(), mapping.cool_hue) < hue_distance(hs.hue(), mapping.warm_hue);

    let t = if toward_cool {
        mid - fraction * half
    } else {
        mid + fraction * half
    };
    Mireds::create(t.round() as u16)
}

/// White channel level for a color at a brightness.
///
/// The share all RGB channels have in common moves to the white LED. Colors
/// above the white saturation bound get no white at all.
pub fn white_value_for(
    hs: &HueSaturation,
    brightness: &Brightness,
    thresholds: &Thresholds,
) -> WhiteValue {
    if !thresholds.is_white_saturation(hs.saturation()) {
        return WhiteValue::from(0);
    }
    WhiteValue::from(hs.to_color_at(brightness).white_component())
}

pub fn mired_to_kelvin(temp: &Mireds) -> u32 {
    temp.to_kelvin()
}

pub fn kelvin_to_mired(kelvin: u32) -> Option<Mireds> {
    Mireds::from_kelvin(kelvin)
}

// Midpoint and half width of the white temperature bounds, in mireds.
fn white_span(thresholds: &Thresholds) -> (f32, f32) {
    let lower = f32::from(thresholds.lower_bound_color_temp().value());
    let upper = f32::from(thresholds.upper_bound_color_temp().value());
    ((lower + upper) / 2.0, (upper - lower) / 2.0)
}

fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mireds(value: u16) -> Mireds {
        Mireds::create(value).unwrap()
    }

    #[test]
    fn test_midpoint_is_white() {
        let thresholds = Thresholds::default();
        // (175 + 450) / 2 = 312.5
        let hs = color_temperature_to_hs(&mireds(312), &thresholds);
        assert_eq!(hs.hue(), 220.0);
        assert!(hs.saturation() < 0.2);

        let hs = color_temperature_to_hs(&mireds(313), &thresholds);
        assert_eq!(hs.hue(), 35.0);
        assert!(hs.saturation() < 0.2);
    }

    #[test]
    fn test_temperature_round_trip() {
        let thresholds = Thresholds::default();
        for value in (175..=450).step_by(5) {
            let hs = color_temperature_to_hs(&mireds(value), &thresholds);
            assert!(thresholds.is_white_saturation(hs.saturation()));

            let back = hs_to_color_temperature(&hs, &thresholds).unwrap();
            assert!(
                back.value().abs_diff(value) <= 1,
                "{value} came back as {}",
                back.value()
            );
        }
    }

    #[test]
    fn test_saturated_color_has_no_temperature() {
        let thresholds = Thresholds::default();
        let blue = HueSaturation::create(240.0, 90.0).unwrap();
        assert_eq!(hs_to_color_temperature(&blue, &thresholds), None);
    }

    #[test]
    fn test_hue_picks_side() {
        let thresholds = Thresholds::default();
        let bluish = HueSaturation::create(200.0, 50.0).unwrap();
        assert_eq!(hs_to_color_temperature(&bluish, &thresholds), Some(mireds(175)));

        let orange = HueSaturation::create(20.0, 50.0).unwrap();
        assert_eq!(hs_to_color_temperature(&orange, &thresholds), Some(mireds(450)));

        // 350 degrees wraps around to within 45 of the warm hue
        let reddish = HueSaturation::create(350.0, 20.0).unwrap();
        let temp = hs_to_color_temperature(&reddish, &thresholds).unwrap();
        assert!(temp.value() > 312);
    }

    #[test]
    fn test_white_value() {
        let thresholds = Thresholds::default();
        let white = HueSaturation::create(0.0, 0.0).unwrap();
        assert_eq!(white_value_for(&white, &Brightness::from(255), &thresholds).value(), 255);
        assert_eq!(white_value_for(&white, &Brightness::from(128), &thresholds).value(), 128);

        let blue = HueSaturation::create(240.0, 90.0).unwrap();
        assert_eq!(white_value_for(&blue, &Brightness::from(255), &thresholds).value(), 0);

        let pale = HueSaturation::create(30.0, 50.0).unwrap();
        let white = white_value_for(&pale, &Brightness::from(255), &thresholds).value();
        assert!(white > 100 && white < 150);
    }

    #[test]
    fn test_kelvin() {
        assert_eq!(mired_to_kelvin(&mireds(250)), 4000);
        assert_eq!(kelvin_to_mired(2700).unwrap().value(), 370);
    }
}
