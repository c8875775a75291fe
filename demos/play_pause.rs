use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

mod common;

/// Toggle between playing and paused.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    connect: common::Connect,
}

fn main() {
    common::init_logging();
    match play_pause(Cli::parse()) {
        Ok(status) => println!("Player is now {}.", status.to_lowercase()),
        Err(error) => common::exit_with(error),
    }
}

fn play_pause(cli: Cli) -> Result<String> {
    let player = cli.connect.player()?;

    if player.can_pause()? != Some(true) {
        // Nothing loaded, or a stream that cannot be paused.
        bail!("Media cannot be paused");
    }
    player
        .play_pause()
        .context("Could not control player")?;

    // The reply to PlayPause can arrive before the player has updated its properties.
    thread::sleep(Duration::from_millis(50));

    player
        .playback_status()
        .context("Could not get playback status")?
        .context("Player went away")
}
