//! Bits shared by the demo programs.
#![allow(dead_code)]

use anyhow::{Context, Result};
use clap::Args;
use mpris_chapters::{select_player, Binding, BusType, Options, PlayerProxy, PlayerRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Args, Debug)]
pub struct Connect {
    /// Short name of the player to use, like `vlc`. Defaults to the first usable one.
    #[arg(short, long)]
    pub player: Option<String>,

    /// D-Bus binding: auto, zbus or libdbus.
    #[arg(long, default_value_t = Binding::Auto)]
    pub binding: Binding,

    /// Look for players on the system bus instead of the session bus.
    #[arg(long)]
    pub system: bool,
}

impl Connect {
    pub fn options(&self) -> Options {
        let bus = if self.system {
            BusType::System
        } else {
            BusType::Session
        };
        Options::default().with_bus(bus).with_binding(self.binding)
    }

    pub fn registry(&self) -> Result<PlayerRegistry> {
        PlayerRegistry::with_options(&self.options()).context("Failed to connect to D-Bus")
    }

    /// Discover players and connect to the requested one.
    pub fn player(&self) -> Result<PlayerProxy> {
        let registry = self.registry()?;
        let players = registry
            .discover()
            .context("Could not fetch list of players")?;
        select_player(&registry, &players, self.player.as_deref())
            .context("Could not find a player to control")
    }
}

/// Log to stderr, filtered by `RUST_LOG`.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Print the error with its causes and exit.
pub fn exit_with(error: anyhow::Error) -> ! {
    println!("Error: {}", error);
    for (i, cause) in error.chain().skip(1).enumerate() {
        print!("{}", "  ".repeat(i + 1));
        println!("Caused by: {}", cause);
    }
    std::process::exit(1);
}
