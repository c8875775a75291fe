use anyhow::{Context, Result};
use clap::Parser;
use mpris_chapters::time::{to_hhmmss, to_microsecs};

mod common;

/// Jump to an absolute position in the currently playing track.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Position in HH:MM:SS format, like 01:02:03.
    #[arg(value_parser = to_microsecs)]
    position: i64,

    #[command(flatten)]
    connect: common::Connect,
}

fn main() {
    common::init_logging();
    if let Err(error) = set_position(Cli::parse()) {
        common::exit_with(error);
    }
}

fn set_position(cli: Cli) -> Result<()> {
    let player = cli.connect.player()?;
    let position = u64::try_from(cli.position).context("Position cannot be negative")?;

    player
        .set_position(position)
        .context("Could not set the position")?;

    if let Some(name) = player.ext_name() {
        println!("Moved {name} to {}", to_hhmmss(cli.position)?);
    }
    Ok(())
}
