//! Simulate a smart light group from the command line.
//!
//! Members are simulated in memory: every command the group dispatches is
//! applied to the member's state and reported back to the group as a state
//! change, the way a host would.
//!
//! Run with: cargo run --example group_cli -- --help

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use futures::channel::mpsc::{self, UnboundedSender};
use smart_light_group::{
    Brightness, Capabilities, Capability, Dispatcher, Error, GroupCommand, GroupConfig,
    HueSaturation, LightGroup, MemberCommand, MemberEvent, MemberInfo, MemberState, WhiteValue,
    kelvin_to_mired,
};

#[derive(Parser)]
#[command(name = "group-cli")]
#[command(about = "Route commands through a simulated smart light group", long_about = None)]
struct Cli {
    /// Group configuration (JSON). Defaults to a sample living room.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Member capabilities and states (JSON map of entity id to member info)
    #[arg(short, long, global = true)]
    members: Option<PathBuf>,

    /// Print group diagnostics after the command
    #[arg(short, long, global = true)]
    diagnostics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn the group on
    On,

    /// Turn the group off
    Off,

    /// Set brightness in percent (0-100)
    Brightness {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: u8,
    },

    /// Set a color by hue (0-360) and saturation (0-100)
    Color { hue: f32, saturation: f32 },

    /// Set a color temperature in Kelvin
    Temperature {
        #[arg(value_parser = clap::value_parser!(u32).range(1000..=10000))]
        kelvin: u32,
    },

    /// Set the white channel (0-255)
    White { value: u8 },

    /// Send a raw group command (JSON)
    Raw { json: String },

    /// Blue, white, blue again: watch the white lights step in and out
    Scenario,
}

/// Applies dispatched commands to simulated members and reports them back.
struct Loopback {
    states: Mutex<HashMap<String, MemberState>>,
    events: UnboundedSender<MemberEvent>,
}

impl Dispatcher for Loopback {
    fn send_command(&self, member_id: &str, command: &MemberCommand) -> Result<(), Error> {
        println!(
            "  -> {member_id}: {}",
            serde_json::to_string(command).map_err(Error::JsonLoad)?
        );

        let mut states = self
            .states
            .lock()
            .map_err(|_| Error::dispatch(member_id, "simulator state poisoned"))?;
        let state = states.entry(member_id.to_string()).or_default();
        state.apply(command);

        self.events
            .unbounded_send(MemberEvent::new(member_id, state.clone()))
            .map_err(|e| Error::dispatch(member_id, e.to_string()))
    }
}

fn sample_config() -> GroupConfig {
    GroupConfig::new(
        "Living Room",
        &[
            "light.main",
            "light.dimmer",
            "light.ambiance",
            "light.hue_lamp",
            "light.rgbw_strip",
        ],
    )
}

fn sample_members() -> HashMap<String, MemberInfo> {
    let info = |caps: &[Capability]| MemberInfo::new(Capabilities::from(caps.to_vec()), MemberState::off());
    HashMap::from([
        ("light.main".to_string(), info(&[])),
        ("light.dimmer".to_string(), info(&[Capability::Brightness])),
        (
            "light.ambiance".to_string(),
            info(&[Capability::Brightness, Capability::ColorTemperature]),
        ),
        (
            "light.hue_lamp".to_string(),
            info(&[
                Capability::Brightness,
                Capability::ColorTemperature,
                Capability::HueSaturation,
            ]),
        ),
        (
            "light.rgbw_strip".to_string(),
            info(&[
                Capability::Brightness,
                Capability::HueSaturation,
                Capability::WhiteValue,
            ]),
        ),
    ])
}

fn color(hue: f32, saturation: f32) -> Result<GroupCommand, Box<dyn std::error::Error>> {
    let hs = HueSaturation::create(hue, saturation)
        .ok_or_else(|| format!("invalid color {hue},{saturation}"))?;
    Ok(GroupCommand::from(&hs))
}

fn commands(command: &Commands) -> Result<Vec<GroupCommand>, Box<dyn std::error::Error>> {
    Ok(match command {
        Commands::On => vec![GroupCommand::turn_on()],
        Commands::Off => vec![GroupCommand::turn_off()],
        Commands::Brightness { percent } => {
            let brightness = Brightness::from_percent(*percent).ok_or("invalid brightness")?;
            vec![GroupCommand::from(&brightness)]
        }
        Commands::Color { hue, saturation } => vec![color(*hue, *saturation)?],
        Commands::Temperature { kelvin } => {
            let temp = kelvin_to_mired(*kelvin).ok_or("invalid temperature")?;
            vec![GroupCommand::from(&temp)]
        }
        Commands::White { value } => vec![GroupCommand::from(&WhiteValue::from(*value))],
        Commands::Raw { json } => vec![GroupCommand::from_json(json)?],
        Commands::Scenario => vec![
            color(240.0, 90.0)?,
            color(0.0, 5.0)?,
            color(240.0, 90.0)?,
        ],
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GroupConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => sample_config(),
    };
    let registry: HashMap<String, MemberInfo> = match &cli.members {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => sample_members(),
    };

    let (tx, mut rx) = mpsc::unbounded();
    let loopback = Loopback {
        states: Mutex::new(
            registry
                .iter()
                .map(|(id, info)| (id.clone(), info.state.clone()))
                .collect(),
        ),
        events: tx,
    };

    let group = LightGroup::new(&config, &registry, loopback)?;
    group
        .subscribe(|state| {
            println!(
                "  group: {}",
                serde_json::to_string(state).unwrap_or_default()
            );
        })
        .await;

    for command in commands(&cli.command)? {
        println!("{}", serde_json::to_string(&command)?);
        let translation = group.handle_command(&command).await?;
        for (member_id, decision) in translation.iter() {
            if decision.is_suppressed() {
                println!("  -- {member_id}: suppressed");
            }
        }

        while let Ok(Some(event)) = rx.try_next() {
            group.member_state_changed(&event.member_id, event.state).await?;
        }
    }

    if cli.diagnostics {
        println!("{}", serde_json::to_string_pretty(&group.diagnostics().await)?);
    }
    Ok(())
}
