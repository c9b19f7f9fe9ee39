//! Value types for light control parameters.

mod brightness;
mod color;
mod hue_saturation;
mod mireds;
mod power;
mod white;

pub use brightness::Brightness;
pub use color::Color;
pub use hue_saturation::HueSaturation;
pub use mireds::Mireds;
pub use power::PowerState;
pub use white::WhiteValue;
