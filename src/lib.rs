//! # smart_light_group
//!
//! A light group that makes a mix of plain, dimmable, tunable-white and color
//! lights behave like a single light.
//!
//! Ordinary groups send the same command to every member. That breaks down
//! when the members differ: a blue color command switches on a plain white
//! ceiling light, and a dimmed group switches on lights that cannot dim.
//! This crate classifies each member by its capabilities once and routes
//! every group command member by member:
//!
//! - White-only lights join in for colors close to white and stay out of (or
//!   leave) saturated ones.
//! - On/off-only lights follow the group brightness across a threshold.
//! - Color lights get whatever color model they understand, converting
//!   between color temperature and hue/saturation where needed.
//! - Lights being switched on get configured defaults for attributes the
//!   command leaves open.
//!
//! The group also folds member states back into one [`AggregatedState`].
//!
//! ## Quick Start
//!
//! ```
//! use std::collections::HashMap;
//! use smart_light_group::{
//!     Capabilities, Capability, Decision, GroupCommand, GroupConfig, HueSaturation, Member,
//!     MemberInfo, MemberState, translate,
//! };
//!
//! let config = GroupConfig::from_json(
//!     r#"{"name": "Living Room", "entities": ["light.main", "light.hue_lamp"]}"#,
//! )
//! .unwrap();
//! let thresholds = config.validate().unwrap();
//!
//! let registry = HashMap::from([
//!     ("light.main", MemberInfo::default()),
//!     (
//!         "light.hue_lamp",
//!         MemberInfo::new(
//!             Capabilities::from([Capability::Brightness, Capability::HueSaturation]),
//!             MemberState::off(),
//!         ),
//!     ),
//! ]);
//! let members: Vec<Member> = config
//!     .entities
//!     .iter()
//!     .map(|id| Member::new(id, registry[id.as_str()].clone()))
//!     .collect();
//!
//! // A saturated blue leaves the white ceiling light alone
//! let blue = GroupCommand::from(&HueSaturation::create(240.0, 90.0).unwrap());
//! let translation = translate(&blue, &members, &thresholds).unwrap();
//! assert_eq!(translation.decision("light.main"), Some(&Decision::Suppress));
//! assert!(translation.decision("light.hue_lamp").unwrap().turns_on());
//! ```
//!
//! For a stateful group with dispatching, listeners and a member event
//! stream, see [`LightGroup`].
//!
//! ## Runtime Selection
//!
//! [`LightGroup`] is runtime-agnostic. Select the runtime with feature flags:
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime
//!
//! ```toml
//! [dependencies]
//! smart-light-group = { version = "0.1", default-features = false, features = ["runtime-async-std"] }
//! ```

mod aggregate;
mod capability;
mod command;
mod config;
mod convert;
mod errors;
mod group;
mod history;
mod member;
pub mod runtime;
mod thresholds;
mod translate;
mod types;

pub use crate::aggregate::{AggregatedState, aggregate};
pub use crate::capability::{Capabilities, Capability, LightClass, classify};
pub use crate::command::{Decision, GroupCommand, LightAttributes, MemberCommand, Whiteness};
pub use crate::config::{DEFAULT_NAME, GroupConfig, ThresholdConfig};
pub use crate::convert::{
    color_temperature_to_hs, hs_to_color_temperature, kelvin_to_mired, mired_to_kelvin,
    white_value_for,
};
pub use crate::errors::Error;
pub use crate::group::{Dispatcher, LightGroup, MemberEvent, MemberRegistry};
pub use crate::history::{CommandHistory, EventKind, HistoryEntry, HistorySummary};
pub use crate::member::{Member, MemberInfo, MemberState, MiredRange};
pub use crate::thresholds::{TemperatureMapping, Thresholds};
pub use crate::translate::{Translation, translate};
pub use crate::types::{Brightness, Color, HueSaturation, Mireds, PowerState, WhiteValue};
