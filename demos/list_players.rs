use anyhow::{Context, Result};
use clap::Parser;

mod common;

/// List the MPRIS players that can be connected to.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    connect: common::Connect,
}

fn main() {
    common::init_logging();
    if let Err(error) = list_players(Cli::parse()) {
        common::exit_with(error);
    }
}

fn list_players(cli: Cli) -> Result<()> {
    let registry = cli.connect.registry()?;
    println!("Using the {} binding", registry.binding());

    let players = registry
        .discover()
        .context("Could not fetch list of players")?;
    if players.is_empty() {
        println!("No MPRIS enabled players are running");
    }

    for (name, bus_name) in &players {
        let proxy = registry.create(bus_name, name)?;
        let described = proxy.with_player(|player| {
            println!(
                "{:<20} {} ({}, {})",
                name,
                player.player_identity_name(),
                bus_name,
                player.unique_name()
            )
        });
        if described.is_none() {
            println!("{name:<20} {bus_name}");
        }
    }

    let unusable = registry.unusable();
    if !unusable.is_empty() {
        println!();
        println!("Ignored, could not connect:");
        for bus_name in unusable.iter() {
            println!("  {bus_name}");
        }
    }

    Ok(())
}
