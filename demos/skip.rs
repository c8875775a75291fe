use anyhow::{Context, Result};
use clap::Parser;
use mpris_chapters::time::{to_hhmmss, to_microsecs, Direction};

mod common;

/// Skip forward (or backward with -r) by an offset, in the currently playing track.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Skip backwards instead.
    #[arg(short)]
    r: bool,

    /// Offset in HH:MM:SS format.
    #[arg(value_parser = to_microsecs)]
    offset: i64,

    #[command(flatten)]
    connect: common::Connect,
}

fn main() {
    common::init_logging();
    if let Err(error) = skip(Cli::parse()) {
        common::exit_with(error);
    }
}

fn skip(cli: Cli) -> Result<()> {
    let direction = if cli.r {
        Direction::Reverse
    } else {
        Direction::Forward
    };
    let player = cli.connect.player()?;

    player
        .seek(direction.apply(cli.offset))
        .context("Could not seek")?;

    if let Some(position) = player.position()? {
        println!("Now at {}", to_hhmmss(position)?);
    }
    Ok(())
}
