//! Power state for light control.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Power state for a light.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PowerState {
    /// The light is emitting
    On,
    /// The light is dark
    #[default]
    Off,
}

impl PowerState {
    pub fn is_on(&self) -> bool {
        matches!(self, PowerState::On)
    }
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on { PowerState::On } else { PowerState::Off }
    }
}
