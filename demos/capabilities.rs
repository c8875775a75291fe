use anyhow::{Context, Result};
use clap::Parser;
use mpris_chapters::{Error, PlayerProxy};

mod common;

const VALUE_INDENTATION: usize = 25;

/// Print the capabilities of every running player.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    connect: common::Connect,
}

fn main() {
    common::init_logging();
    if let Err(error) = print_capabilities_for_all_players(Cli::parse()) {
        common::exit_with(error);
    }
}

fn print_capabilities_for_all_players(cli: Cli) -> Result<()> {
    let registry = cli.connect.registry()?;
    let players = registry
        .discover()
        .context("Could not fetch list of players")?;

    for (name, bus_name) in &players {
        if cli.connect.player.as_deref().map_or(false, |wanted| wanted != name) {
            continue;
        }
        let proxy = registry.create(bus_name, name)?;
        print_capabilities_for_player(name, &proxy);
        println!();
    }

    Ok(())
}

fn print_capabilities_for_player(name: &str, proxy: &PlayerProxy) {
    let heading = proxy
        .with_player(|player| {
            format!(
                "{} ({})",
                player.player_identity_name(),
                player.unique_name()
            )
        })
        .unwrap_or_else(|| name.to_owned());
    println!(">> Player: {heading}");

    println!();
    print_value("CanControl", proxy.can_control());
    print_value("CanSeek", proxy.can_seek());
    print_value("CanPause", proxy.can_pause());
    print_value("CanPlay", proxy.can_play());
    print_value("PlaybackStatus", proxy.playback_status());
    print_value("Usable", proxy.is_usable().map(Some));
}

fn print_value<T: std::fmt::Display>(name: &str, value: Result<Option<T>, Error>) {
    match value {
        Ok(Some(value)) => println!("\t{:>width$}: {}", name, value, width = VALUE_INDENTATION),
        Ok(None) => println!("\t{:>width$}: (no player)", name, width = VALUE_INDENTATION),
        Err(error) => println!("\t{:>width$}: Error: {}", name, error, width = VALUE_INDENTATION),
    }
}
